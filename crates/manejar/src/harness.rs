//! Test harness: browser/environment selection, session lifecycle, and
//! report-artifact housekeeping.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;
#[cfg(feature = "browser")]
use tracing::info;
use uuid::Uuid;

use crate::result::{ManejarError, ManejarResult};
use crate::wait::WaitPolicy;

#[cfg(feature = "browser")]
use crate::cdp::{ChromiumDriver, LaunchOptions};
#[cfg(feature = "browser")]
use crate::page::Page;

/// File kept in place when an artifact directory is cleaned
pub const ENVIRONMENT_PROPERTIES: &str = "environment.properties";

/// Supported browser selections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BrowserKind {
    /// Chrome with a visible window
    Chrome,
    /// Chrome without a visible window
    HeadlessChrome,
    /// Firefox with a visible window
    Firefox,
    /// Firefox without a visible window
    HeadlessFirefox,
    /// Microsoft Edge
    Edge,
    /// Safari
    Safari,
}

impl BrowserKind {
    /// Whether this selection runs without a visible window
    #[must_use]
    pub const fn is_headless(&self) -> bool {
        matches!(self, Self::HeadlessChrome | Self::HeadlessFirefox)
    }

    /// The selection keyword, as accepted by [`BrowserKind::from_str`]
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Chrome => "chrome",
            Self::HeadlessChrome => "h_chrome",
            Self::Firefox => "firefox",
            Self::HeadlessFirefox => "h_firefox",
            Self::Edge => "edge",
            Self::Safari => "safari",
        }
    }
}

impl FromStr for BrowserKind {
    type Err = ManejarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "chrome" => Ok(Self::Chrome),
            "h_chrome" => Ok(Self::HeadlessChrome),
            "firefox" => Ok(Self::Firefox),
            "h_firefox" => Ok(Self::HeadlessFirefox),
            "edge" => Ok(Self::Edge),
            "safari" => Ok(Self::Safari),
            _ => Err(ManejarError::UnknownBrowser {
                name: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for BrowserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Deployment environments a test run can target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    /// Development
    Dev,
    /// Testing
    Testing,
    /// Staging
    Staging,
    /// Production
    Live,
}

impl Environment {
    /// Base URL for this environment
    #[must_use]
    pub const fn base_url(&self) -> &'static str {
        match self {
            Self::Dev => "https://www.lazada.vn/",
            Self::Testing => "https://demo.nopcommerce.com/",
            Self::Staging => "https://tiki.vn/",
            Self::Live => "https://shopee.vn/",
        }
    }
}

impl FromStr for Environment {
    type Err = ManejarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dev" => Ok(Self::Dev),
            "testing" | "test" => Ok(Self::Testing),
            "staging" => Ok(Self::Staging),
            "live" | "production" => Ok(Self::Live),
            _ => Err(ManejarError::UnknownEnvironment {
                name: s.to_string(),
            }),
        }
    }
}

/// Configuration for one harness-managed browser session.
///
/// Defaults: headed Chrome against [`Environment::Dev`], a maximized-size
/// window at the screen origin, and the default [`WaitPolicy`].
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Browser selection
    pub browser: BrowserKind,
    /// Target environment
    pub environment: Environment,
    /// Window width in pixels
    pub window_width: u32,
    /// Window height in pixels
    pub window_height: u32,
    /// Window x position in pixels
    pub window_x: i32,
    /// Window y position in pixels
    pub window_y: i32,
    /// Explicit browser binary (None = auto-detect)
    pub executable: Option<String>,
    /// Wait policy handed to the page facade
    pub policy: WaitPolicy,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            browser: BrowserKind::Chrome,
            environment: Environment::Dev,
            window_width: 1920,
            window_height: 1080,
            window_x: 0,
            window_y: 0,
            executable: None,
            policy: WaitPolicy::default(),
        }
    }
}

impl HarnessConfig {
    /// Create a config with the default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a config from the `BROWSER` and `ENVIRONMENT` variables.
    ///
    /// Unset variables fall back to the defaults; set-but-unrecognized values
    /// are hard errors.
    ///
    /// # Errors
    ///
    /// Returns [`ManejarError::UnknownBrowser`] or
    /// [`ManejarError::UnknownEnvironment`] on unrecognized values.
    pub fn from_env() -> ManejarResult<Self> {
        let mut config = Self::default();
        if let Ok(browser) = std::env::var("BROWSER") {
            config.browser = browser.parse()?;
        }
        if let Ok(environment) = std::env::var("ENVIRONMENT") {
            config.environment = environment.parse()?;
        }
        Ok(config)
    }

    /// Set the browser selection
    #[must_use]
    pub const fn with_browser(mut self, browser: BrowserKind) -> Self {
        self.browser = browser;
        self
    }

    /// Set the target environment
    #[must_use]
    pub const fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Set window dimensions
    #[must_use]
    pub const fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.window_width = width;
        self.window_height = height;
        self
    }

    /// Set an explicit browser binary
    #[must_use]
    pub fn with_executable(mut self, path: impl Into<String>) -> Self {
        self.executable = Some(path.into());
        self
    }

    /// Set the wait policy
    #[must_use]
    pub const fn with_policy(mut self, policy: WaitPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The base URL of the configured environment
    #[must_use]
    pub const fn base_url(&self) -> &'static str {
        self.environment.base_url()
    }
}

#[cfg(feature = "browser")]
impl HarnessConfig {
    /// Launch the configured browser and navigate to the environment URL.
    ///
    /// # Errors
    ///
    /// Returns [`ManejarError::UnsupportedBrowser`] for non-Chrome
    /// selections, and [`ManejarError::BrowserLaunchError`] when the browser
    /// fails to start.
    pub async fn launch(&self) -> ManejarResult<Page<ChromiumDriver>> {
        match self.browser {
            BrowserKind::Chrome | BrowserKind::HeadlessChrome => {}
            other => {
                return Err(ManejarError::UnsupportedBrowser {
                    name: other.name().to_string(),
                })
            }
        }
        let mut options = LaunchOptions::default()
            .with_headless(self.browser.is_headless())
            .with_window_size(self.window_width, self.window_height)
            .with_window_position(self.window_x, self.window_y);
        if let Some(ref path) = self.executable {
            options = options.with_executable(path.clone());
        }
        info!(browser = %self.browser, url = self.base_url(), "starting session");
        let mut driver = ChromiumDriver::launch(options).await?;
        {
            use crate::driver::PageDriver;
            driver.set_implicit_wait(self.policy.long()).await?;
        }
        let mut page = Page::with_policy(driver, self.policy);
        page.open_url(self.base_url()).await?;
        Ok(page)
    }
}

/// Delete cookies and end the session
#[cfg(feature = "browser")]
pub async fn teardown(mut page: Page<ChromiumDriver>) -> ManejarResult<()> {
    page.delete_cookies().await?;
    page.quit().await?;
    info!("session ended");
    Ok(())
}

/// Remove the regular files in an artifact directory, except the one named
/// [`ENVIRONMENT_PROPERTIES`]. Subdirectories are left in place.
///
/// A missing directory is not an error; nothing to clean.
///
/// # Errors
///
/// Returns [`ManejarError::Io`] when a file cannot be removed.
pub fn clean_artifact_dir(dir: &Path) -> ManejarResult<()> {
    if !dir.is_dir() {
        return Ok(());
    }
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if path.file_name().and_then(|n| n.to_str()) == Some(ENVIRONMENT_PROPERTIES) {
            continue;
        }
        std::fs::remove_file(&path)?;
        debug!(path = %path.display(), "removed stale artifact");
    }
    Ok(())
}

/// Report folders cleaned at suite start, relative to the project root
pub const REPORT_DIRS: [&str; 2] = ["allure-results", "logs"];

/// Clean every standard report folder under `root`.
///
/// Each folder is cleaned with [`clean_artifact_dir`], so
/// [`ENVIRONMENT_PROPERTIES`] files survive.
///
/// # Errors
///
/// Returns [`ManejarError::Io`] when an entry cannot be removed.
pub fn clean_report_dirs(root: &Path) -> ManejarResult<()> {
    for dir in REPORT_DIRS {
        clean_artifact_dir(&root.join(dir))?;
    }
    Ok(())
}

/// Random email address for registration-style tests
#[must_use]
pub fn random_email() -> String {
    format!("user{}@mail.test", random_number())
}

/// Random six-digit number
#[must_use]
pub fn random_number() -> u32 {
    let id = Uuid::new_v4().as_u128();
    u32::try_from(id % 900_000).unwrap_or(0) + 100_000
}

/// Install the global tracing subscriber, filtered by `RUST_LOG`.
///
/// Safe to call from every test; the first install wins and later calls
/// are no-ops.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
