//! Manejar: page-object helpers for browser end-to-end tests
//!
//! Manejar (Spanish: "to drive/handle") wraps a browser-driver session in a
//! semantic element-action facade: prefixed locator strings resolve to typed
//! lookup strategies, element operations carry explicit waits, and a test
//! harness manages browser selection, environment URLs, and soft-assertion
//! recording.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                     MANEJAR Architecture                        │
//! ├────────────────────────────────────────────────────────────────┤
//! │  ┌──────────┐   ┌────────────┐   ┌────────────┐   ┌─────────┐  │
//! │  │ Locator  │   │ Page       │   │ PageDriver │   │ Browser │  │
//! │  │ strings  │──►│ facade     │──►│ trait      │──►│ (CDP)   │  │
//! │  │ "id=..." │   │ + waits    │   │ + mock     │   │         │  │
//! │  └──────────┘   └────────────┘   └────────────┘   └─────────┘  │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use manejar::{ElementHandle, Locator, MockDriver, Page, Strategy};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> manejar::ManejarResult<()> {
//! let mut driver = MockDriver::new();
//! driver.add_element(
//!     Locator::new(Strategy::Id, "submit"),
//!     ElementHandle::new("button"),
//! );
//!
//! let mut page = Page::new(driver);
//! page.click("id=submit").await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

mod driver;
mod harness;
mod locator;
mod page;
mod result;
mod verify;
mod wait;

/// Chromium backend over the Chrome `DevTools` Protocol
#[cfg(feature = "browser")]
#[allow(
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::missing_const_for_fn,
    clippy::doc_markdown
)]
pub mod cdp;

pub use driver::{AlertInfo, Cookie, ElementHandle, MockDriver, MockSelect, PageDriver};
pub use harness::{
    clean_artifact_dir, clean_report_dirs, init_tracing, random_email, random_number,
    BrowserKind, Environment, HarnessConfig, ENVIRONMENT_PROPERTIES, REPORT_DIRS,
};
#[cfg(feature = "browser")]
pub use harness::teardown;
pub use locator::{format_template, Locator, Strategy};
pub use page::{Page, CUSTOM_DROPDOWN_PAUSE};
pub use result::{ManejarError, ManejarResult};
pub use verify::{TestOutcome, VerificationFailure, VerificationLog, Verifier};
pub use wait::{
    WaitPolicy, DEFAULT_LONG_TIMEOUT_MS, DEFAULT_POLL_INTERVAL_MS,
    DEFAULT_SHORT_TIMEOUT_MS, JQUERY_IDLE_PROBE, READY_STATE_PROBE,
};

#[cfg(feature = "browser")]
pub use cdp::{ChromiumDriver, LaunchOptions};
