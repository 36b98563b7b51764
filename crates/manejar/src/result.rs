//! Result and error types for Manejar.

use thiserror::Error;

/// Result type for Manejar operations
pub type ManejarResult<T> = Result<T, ManejarError>;

/// Errors that can occur in Manejar
#[derive(Debug, Error)]
pub enum ManejarError {
    /// Locator string carries no recognized strategy prefix
    #[error("Invalid locator '{locator}': no recognized strategy prefix")]
    InvalidLocator {
        /// The offending locator string
        locator: String,
    },

    /// Placeholder count does not match the supplied substitution arguments
    #[error("Locator template '{template}' expects {placeholders} argument(s), got {supplied}")]
    PlaceholderMismatch {
        /// The locator template
        template: String,
        /// Number of placeholders in the template
        placeholders: usize,
        /// Number of arguments supplied
        supplied: usize,
    },

    /// A single-element operation found no matching element
    #[error("No element found for locator '{locator}'")]
    ElementNotFound {
        /// The resolved locator
        locator: String,
    },

    /// Operation timed out
    #[error("Operation timed out after {ms}ms: {condition}")]
    Timeout {
        /// Timeout in milliseconds
        ms: u64,
        /// Condition that never held
        condition: String,
    },

    /// An alert accessor was used while no alert is open
    #[error("No alert is currently open")]
    NoAlert,

    /// A window handle could not be found or switched to
    #[error("Window not found: {message}")]
    WindowNotFound {
        /// Error message
        message: String,
    },

    /// Browser name not in the supported set
    #[error("Browser name is not valid: '{name}'")]
    UnknownBrowser {
        /// The offending name
        name: String,
    },

    /// Environment name not in the supported set
    #[error("Environment name is not valid: '{name}'")]
    UnknownEnvironment {
        /// The offending name
        name: String,
    },

    /// Browser kind is known but not launchable with this backend
    #[error("Browser '{name}' is not supported by the CDP backend")]
    UnsupportedBrowser {
        /// Browser kind name
        name: String,
    },

    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunchError {
        /// Error message
        message: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    NavigationError {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// Script evaluation error
    #[error("Script evaluation failed: {message}")]
    ScriptError {
        /// Error message
        message: String,
    },

    /// Generic driver-side error
    #[error("Driver error: {message}")]
    DriverError {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
