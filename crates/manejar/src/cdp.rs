//! Chromium-backed [`PageDriver`] over the Chrome `DevTools` Protocol.
//!
//! Element operations are lowered to JavaScript through the locator query
//! expressions, evaluated in the active document (the top document, or an
//! iframe's `contentDocument` after a frame switch). The implicit element
//! wait is emulated by polling the query until the configured deadline.
//!
//! Only compiled with the `browser` feature; the rest of the crate tests
//! against [`MockDriver`](crate::driver::MockDriver) instead.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig as CdpConfig};
use chromiumoxide::cdp::browser_protocol::network::{
    ClearBrowserCookiesParams, CookieParam,
};
use chromiumoxide::cdp::browser_protocol::page::{
    EventJavascriptDialogOpening, HandleJavaScriptDialogParams,
};
use chromiumoxide::page::Page as CdpPage;
use futures::StreamExt;
use serde::Deserialize;
use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::driver::{AlertInfo, Cookie, ElementHandle, PageDriver};
use crate::locator::Locator;
use crate::result::{ManejarError, ManejarResult};
use crate::wait::{DEFAULT_LONG_TIMEOUT_MS, DEFAULT_POLL_INTERVAL_MS};

/// Browser launch options
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    /// Run without a visible window
    pub headless: bool,
    /// Window width in pixels
    pub window_width: u32,
    /// Window height in pixels
    pub window_height: u32,
    /// Window x position in pixels
    pub window_x: i32,
    /// Window y position in pixels
    pub window_y: i32,
    /// Path to the browser binary (None = auto-detect)
    pub executable: Option<String>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            headless: true,
            window_width: 1920,
            window_height: 1080,
            window_x: 0,
            window_y: 0,
            executable: None,
            sandbox: true,
        }
    }
}

impl LaunchOptions {
    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set window dimensions
    #[must_use]
    pub const fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.window_width = width;
        self.window_height = height;
        self
    }

    /// Set window position
    #[must_use]
    pub const fn with_window_position(mut self, x: i32, y: i32) -> Self {
        self.window_x = x;
        self.window_y = y;
        self
    }

    /// Set an explicit browser binary
    #[must_use]
    pub fn with_executable(mut self, path: impl Into<String>) -> Self {
        self.executable = Some(path.into());
        self
    }

    /// Disable the sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }
}

/// Element descriptor produced by the snapshot script
#[derive(Debug, Deserialize)]
struct ElementSnapshot {
    tag_name: String,
    text: String,
    displayed: bool,
    selected: bool,
    enabled: bool,
}

impl From<ElementSnapshot> for ElementHandle {
    fn from(snapshot: ElementSnapshot) -> Self {
        Self {
            tag_name: snapshot.tag_name,
            text: if snapshot.text.is_empty() {
                None
            } else {
                Some(snapshot.text)
            },
            displayed: snapshot.displayed,
            selected: snapshot.selected,
            enabled: snapshot.enabled,
        }
    }
}

// Maps a DOM element to the ElementSnapshot shape.
const DESCRIBE_FN: &str = "(el) => { \
     const style = window.getComputedStyle(el); \
     const rect = el.getBoundingClientRect(); \
     return { \
       tag_name: el.tagName.toLowerCase(), \
       text: (el.textContent || '').trim(), \
       displayed: style.display !== 'none' && style.visibility !== 'hidden' \
         && rect.width > 0 && rect.height > 0, \
       selected: !!(el.checked || el.selected), \
       enabled: !el.disabled, \
     }; \
   }";

/// [`PageDriver`] implementation controlling a real Chromium instance
#[derive(Debug)]
pub struct ChromiumDriver {
    browser: Browser,
    page: CdpPage,
    #[allow(dead_code)]
    handler: tokio::task::JoinHandle<()>,
    #[allow(dead_code)]
    dialog_listener: tokio::task::JoinHandle<()>,
    pending_dialog: Arc<Mutex<Option<AlertInfo>>>,
    frame_root: Option<String>,
    implicit_wait: Duration,
    poll_interval: Duration,
}

impl ChromiumDriver {
    /// Launch a browser and open a blank page.
    ///
    /// # Errors
    ///
    /// Returns [`ManejarError::BrowserLaunchError`] when the browser cannot
    /// be configured or started.
    pub async fn launch(options: LaunchOptions) -> ManejarResult<Self> {
        let mut builder = CdpConfig::builder()
            .window_size(options.window_width, options.window_height)
            .arg(format!(
                "--window-position={},{}",
                options.window_x, options.window_y
            ));

        if !options.headless {
            builder = builder.with_head();
        }
        if !options.sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(ref path) = options.executable {
            builder = builder.chrome_executable(path);
        }

        let config = builder
            .build()
            .map_err(|e| ManejarError::BrowserLaunchError { message: e })?;

        let (browser, mut handler) =
            Browser::launch(config)
                .await
                .map_err(|e| ManejarError::BrowserLaunchError {
                    message: e.to_string(),
                })?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = browser.new_page("about:blank").await.map_err(|e| {
            ManejarError::BrowserLaunchError {
                message: e.to_string(),
            }
        })?;

        let pending_dialog = Arc::new(Mutex::new(None));
        let dialog_listener =
            Self::spawn_dialog_listener(&page, Arc::clone(&pending_dialog)).await?;

        debug!(
            headless = options.headless,
            width = options.window_width,
            height = options.window_height,
            "browser launched"
        );

        Ok(Self {
            browser,
            page,
            handler,
            dialog_listener,
            pending_dialog,
            frame_root: None,
            implicit_wait: Duration::from_millis(DEFAULT_LONG_TIMEOUT_MS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        })
    }

    async fn spawn_dialog_listener(
        page: &CdpPage,
        slot: Arc<Mutex<Option<AlertInfo>>>,
    ) -> ManejarResult<tokio::task::JoinHandle<()>> {
        let mut dialogs = page
            .event_listener::<EventJavascriptDialogOpening>()
            .await
            .map_err(|e| ManejarError::DriverError {
                message: e.to_string(),
            })?;
        Ok(tokio::spawn(async move {
            while let Some(event) = dialogs.next().await {
                if let Ok(mut pending) = slot.lock() {
                    *pending = Some(AlertInfo {
                        text: event.message.clone(),
                    });
                }
            }
        }))
    }

    /// JS expression for the active document (top document or current frame)
    fn root(&self) -> &str {
        self.frame_root.as_deref().unwrap_or("document")
    }

    async fn eval(&self, script: &str) -> ManejarResult<serde_json::Value> {
        let result =
            self.page
                .evaluate(script)
                .await
                .map_err(|e| ManejarError::ScriptError {
                    message: e.to_string(),
                })?;
        Ok(result.value().cloned().unwrap_or(serde_json::Value::Null))
    }

    /// Evaluate `body` with `el` bound to the locator's first match.
    ///
    /// Yields `Value::Null` when no element matches; the body's return value
    /// otherwise.
    async fn eval_on_element(
        &self,
        locator: &Locator,
        body: &str,
    ) -> ManejarResult<serde_json::Value> {
        let script = format!(
            "(() => {{ const el = {query}; if (el == null) return null; {body} }})()",
            query = locator.to_query_in(self.root()),
        );
        self.eval(&script).await
    }

    /// Evaluate `body` with `el` bound to the locator's match at `index`
    async fn eval_on_indexed(
        &self,
        locator: &Locator,
        index: usize,
        body: &str,
    ) -> ManejarResult<serde_json::Value> {
        let script = format!(
            "(() => {{ const el = ({query})[{index}]; if (el == null) return null; {body} }})()",
            query = locator.to_query_all_in(self.root()),
        );
        self.eval(&script).await
    }

    /// Snapshot the first match without waiting
    async fn snapshot_first(&self, locator: &Locator) -> ManejarResult<Option<ElementHandle>> {
        let body = format!("return ({DESCRIBE_FN})(el);");
        let value = self.eval_on_element(locator, &body).await?;
        Self::decode_snapshot(value)
    }

    fn decode_snapshot(value: serde_json::Value) -> ManejarResult<Option<ElementHandle>> {
        if value.is_null() {
            return Ok(None);
        }
        let snapshot: ElementSnapshot = serde_json::from_value(value)?;
        Ok(Some(snapshot.into()))
    }

    /// Find the first match, erroring when the implicit wait expires
    async fn require(&self, locator: &Locator) -> ManejarResult<ElementHandle> {
        self.find(locator)
            .await?
            .ok_or_else(|| ManejarError::ElementNotFound {
                locator: locator.to_string(),
            })
    }

    async fn handle_dialog(&mut self, accept: bool, text: Option<&str>) -> ManejarResult<()> {
        let taken = self
            .pending_dialog
            .lock()
            .map_or(None, |mut pending| pending.take());
        if taken.is_none() {
            return Err(ManejarError::NoAlert);
        }
        let mut builder = HandleJavaScriptDialogParams::builder().accept(accept);
        if let Some(text) = text {
            builder = builder.prompt_text(text);
        }
        let params = builder
            .build()
            .map_err(|e| ManejarError::DriverError { message: e })?;
        self.page
            .execute(params)
            .await
            .map_err(|e| ManejarError::DriverError {
                message: e.to_string(),
            })?;
        Ok(())
    }

    async fn page_by_handle(&self, handle: &str) -> ManejarResult<CdpPage> {
        let pages = self
            .browser
            .pages()
            .await
            .map_err(|e| ManejarError::DriverError {
                message: e.to_string(),
            })?;
        for page in pages {
            if page.target_id().inner() == handle {
                return Ok(page);
            }
        }
        Err(ManejarError::WindowNotFound {
            message: format!("no window with handle '{handle}'"),
        })
    }
}

#[async_trait]
impl PageDriver for ChromiumDriver {
    async fn navigate(&mut self, url: &str) -> ManejarResult<()> {
        self.page
            .goto(url)
            .await
            .map_err(|e| ManejarError::NavigationError {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        // Navigation resets frame context, as it does in a real browser.
        self.frame_root = None;
        Ok(())
    }

    async fn current_url(&self) -> ManejarResult<String> {
        let url = self.page.url().await.map_err(|e| ManejarError::DriverError {
            message: e.to_string(),
        })?;
        Ok(url.unwrap_or_default())
    }

    async fn title(&self) -> ManejarResult<String> {
        let title = self
            .page
            .get_title()
            .await
            .map_err(|e| ManejarError::DriverError {
                message: e.to_string(),
            })?;
        Ok(title.unwrap_or_default())
    }

    async fn page_source(&self) -> ManejarResult<String> {
        self.page
            .content()
            .await
            .map_err(|e| ManejarError::DriverError {
                message: e.to_string(),
            })
    }

    async fn back(&mut self) -> ManejarResult<()> {
        self.eval("history.back()").await?;
        Ok(())
    }

    async fn refresh(&mut self) -> ManejarResult<()> {
        self.page
            .reload()
            .await
            .map_err(|e| ManejarError::DriverError {
                message: e.to_string(),
            })?;
        self.frame_root = None;
        Ok(())
    }

    async fn find(&self, locator: &Locator) -> ManejarResult<Option<ElementHandle>> {
        let deadline = Instant::now() + self.implicit_wait;
        loop {
            if let Some(element) = self.snapshot_first(locator).await? {
                return Ok(Some(element));
            }
            if Instant::now() >= deadline {
                return Ok(None);
            }
            sleep(self.poll_interval).await;
        }
    }

    async fn find_all(&self, locator: &Locator) -> ManejarResult<Vec<ElementHandle>> {
        let script = format!(
            "({query}).map({DESCRIBE_FN})",
            query = locator.to_query_all_in(self.root()),
        );
        let deadline = Instant::now() + self.implicit_wait;
        loop {
            let value = self.eval(&script).await?;
            let snapshots: Vec<ElementSnapshot> = serde_json::from_value(value)?;
            if !snapshots.is_empty() {
                return Ok(snapshots.into_iter().map(Into::into).collect());
            }
            if Instant::now() >= deadline {
                return Ok(Vec::new());
            }
            sleep(self.poll_interval).await;
        }
    }

    async fn click(&mut self, locator: &Locator) -> ManejarResult<()> {
        self.require(locator).await?;
        self.eval_on_element(locator, "el.click(); return true;")
            .await?;
        Ok(())
    }

    async fn click_index(&mut self, locator: &Locator, index: usize) -> ManejarResult<()> {
        let clicked = self
            .eval_on_indexed(locator, index, "el.click(); return true;")
            .await?;
        if clicked.is_null() {
            return Err(ManejarError::ElementNotFound {
                locator: format!("{locator}[{index}]"),
            });
        }
        Ok(())
    }

    async fn clear(&mut self, locator: &Locator) -> ManejarResult<()> {
        self.require(locator).await?;
        self.eval_on_element(
            locator,
            "el.value = ''; \
             el.dispatchEvent(new Event('input', { bubbles: true })); \
             return true;",
        )
        .await?;
        Ok(())
    }

    async fn type_text(&mut self, locator: &Locator, text: &str) -> ManejarResult<()> {
        self.require(locator).await?;
        let body = format!(
            "el.focus(); el.value += {text:?}; \
             el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
             el.dispatchEvent(new Event('change', {{ bubbles: true }})); \
             return true;"
        );
        self.eval_on_element(locator, &body).await?;
        Ok(())
    }

    async fn scroll_into_view_index(
        &mut self,
        locator: &Locator,
        index: usize,
    ) -> ManejarResult<()> {
        let scrolled = self
            .eval_on_indexed(
                locator,
                index,
                "if (el.scrollIntoViewIfNeeded) el.scrollIntoViewIfNeeded(); \
                 else el.scrollIntoView(); \
                 return true;",
            )
            .await?;
        if scrolled.is_null() {
            return Err(ManejarError::ElementNotFound {
                locator: format!("{locator}[{index}]"),
            });
        }
        Ok(())
    }

    async fn text(&self, locator: &Locator) -> ManejarResult<String> {
        Ok(self.require(locator).await?.text.unwrap_or_default())
    }

    async fn attribute(
        &self,
        locator: &Locator,
        name: &str,
    ) -> ManejarResult<Option<String>> {
        self.require(locator).await?;
        let body = format!("return el.getAttribute({name:?});");
        let value = self.eval_on_element(locator, &body).await?;
        Ok(value.as_str().map(ToString::to_string))
    }

    async fn css_value(&self, locator: &Locator, name: &str) -> ManejarResult<String> {
        self.require(locator).await?;
        let body =
            format!("return window.getComputedStyle(el).getPropertyValue({name:?});");
        let value = self.eval_on_element(locator, &body).await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    async fn is_displayed(&self, locator: &Locator) -> ManejarResult<bool> {
        Ok(self.require(locator).await?.displayed)
    }

    async fn is_selected(&self, locator: &Locator) -> ManejarResult<bool> {
        Ok(self.require(locator).await?.selected)
    }

    async fn is_enabled(&self, locator: &Locator) -> ManejarResult<bool> {
        Ok(self.require(locator).await?.enabled)
    }

    async fn select_by_visible_text(
        &mut self,
        locator: &Locator,
        text: &str,
    ) -> ManejarResult<()> {
        self.require(locator).await?;
        let body = format!(
            "const options = Array.from(el.options || []); \
             const index = options.findIndex(o => o.textContent.trim() === {text:?}); \
             if (index < 0) return false; \
             el.selectedIndex = index; \
             el.dispatchEvent(new Event('change', {{ bubbles: true }})); \
             return true;"
        );
        let selected = self.eval_on_element(locator, &body).await?;
        if selected == serde_json::Value::Bool(true) {
            Ok(())
        } else {
            Err(ManejarError::ElementNotFound {
                locator: format!("{locator} option '{text}'"),
            })
        }
    }

    async fn first_selected_text(&self, locator: &Locator) -> ManejarResult<String> {
        self.require(locator).await?;
        let value = self
            .eval_on_element(
                locator,
                "const option = (el.selectedOptions || [])[0]; \
                 return option ? option.textContent.trim() : '';",
            )
            .await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    async fn is_multiple(&self, locator: &Locator) -> ManejarResult<bool> {
        self.require(locator).await?;
        let value = self
            .eval_on_element(locator, "return !!el.multiple;")
            .await?;
        Ok(value == serde_json::Value::Bool(true))
    }

    async fn execute_js(&self, script: &str) -> ManejarResult<serde_json::Value> {
        self.eval(script).await
    }

    async fn active_alert(&self) -> ManejarResult<Option<AlertInfo>> {
        Ok(self
            .pending_dialog
            .lock()
            .map_or(None, |pending| pending.clone()))
    }

    async fn accept_alert(&mut self) -> ManejarResult<()> {
        self.handle_dialog(true, None).await
    }

    async fn dismiss_alert(&mut self) -> ManejarResult<()> {
        self.handle_dialog(false, None).await
    }

    async fn send_alert_text(&mut self, text: &str) -> ManejarResult<()> {
        self.handle_dialog(true, Some(text)).await
    }

    async fn window_handles(&self) -> ManejarResult<Vec<String>> {
        let pages = self
            .browser
            .pages()
            .await
            .map_err(|e| ManejarError::DriverError {
                message: e.to_string(),
            })?;
        Ok(pages
            .iter()
            .map(|p| p.target_id().inner().clone())
            .collect())
    }

    async fn current_window(&self) -> ManejarResult<String> {
        Ok(self.page.target_id().inner().clone())
    }

    async fn switch_to_window(&mut self, handle: &str) -> ManejarResult<()> {
        let page = self.page_by_handle(handle).await?;
        page.bring_to_front()
            .await
            .map_err(|e| ManejarError::DriverError {
                message: e.to_string(),
            })?;
        self.dialog_listener.abort();
        self.pending_dialog = Arc::new(Mutex::new(None));
        self.dialog_listener =
            Self::spawn_dialog_listener(&page, Arc::clone(&self.pending_dialog)).await?;
        self.page = page;
        self.frame_root = None;
        Ok(())
    }

    async fn close_window(&mut self) -> ManejarResult<()> {
        let current = self.page.target_id().inner().clone();
        self.page
            .clone()
            .close()
            .await
            .map_err(|e| ManejarError::DriverError {
                message: e.to_string(),
            })?;
        // Refocus the first remaining window, if any.
        let handles = self.window_handles().await?;
        if let Some(next) = handles.iter().find(|h| **h != current) {
            let next = next.clone();
            self.switch_to_window(&next).await?;
        }
        Ok(())
    }

    async fn switch_to_frame(&mut self, locator: &Locator) -> ManejarResult<()> {
        self.require(locator).await?;
        let query = locator.to_query_in(self.root());
        self.frame_root = Some(format!("({query}).contentDocument"));
        Ok(())
    }

    async fn switch_to_default_content(&mut self) -> ManejarResult<()> {
        self.frame_root = None;
        Ok(())
    }

    async fn cookies(&self) -> ManejarResult<Vec<Cookie>> {
        let cookies = self
            .page
            .get_cookies()
            .await
            .map_err(|e| ManejarError::DriverError {
                message: e.to_string(),
            })?;
        Ok(cookies
            .into_iter()
            .map(|c| Cookie {
                name: c.name,
                value: c.value,
                domain: Some(c.domain),
                path: Some(c.path),
            })
            .collect())
    }

    async fn add_cookies(&mut self, cookies: &[Cookie]) -> ManejarResult<()> {
        let mut params = Vec::with_capacity(cookies.len());
        for cookie in cookies {
            let mut builder = CookieParam::builder()
                .name(cookie.name.clone())
                .value(cookie.value.clone());
            if let Some(ref domain) = cookie.domain {
                builder = builder.domain(domain.clone());
            }
            if let Some(ref path) = cookie.path {
                builder = builder.path(path.clone());
            }
            params.push(
                builder
                    .build()
                    .map_err(|e| ManejarError::DriverError { message: e })?,
            );
        }
        self.page
            .set_cookies(params)
            .await
            .map_err(|e| ManejarError::DriverError {
                message: e.to_string(),
            })?;
        Ok(())
    }

    async fn delete_cookies(&mut self) -> ManejarResult<()> {
        self.page
            .execute(ClearBrowserCookiesParams::default())
            .await
            .map_err(|e| ManejarError::DriverError {
                message: e.to_string(),
            })?;
        Ok(())
    }

    async fn set_implicit_wait(&mut self, timeout: Duration) -> ManejarResult<()> {
        self.implicit_wait = timeout;
        Ok(())
    }

    async fn quit(&mut self) -> ManejarResult<()> {
        self.browser
            .close()
            .await
            .map_err(|e| ManejarError::DriverError {
                message: e.to_string(),
            })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod launch_options_tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let options = LaunchOptions::default();
            assert!(options.headless);
            assert!(options.sandbox);
            assert_eq!(options.window_width, 1920);
            assert_eq!(options.window_height, 1080);
            assert_eq!((options.window_x, options.window_y), (0, 0));
            assert!(options.executable.is_none());
        }

        #[test]
        fn test_builder_setters() {
            let options = LaunchOptions::default()
                .with_headless(false)
                .with_window_size(1280, 720)
                .with_window_position(100, 50)
                .with_executable("/usr/bin/chromium")
                .with_no_sandbox();
            assert!(!options.headless);
            assert!(!options.sandbox);
            assert_eq!(options.window_width, 1280);
            assert_eq!((options.window_x, options.window_y), (100, 50));
            assert_eq!(options.executable.as_deref(), Some("/usr/bin/chromium"));
        }
    }

    mod snapshot_tests {
        use super::*;

        #[test]
        fn test_decode_null_is_absent() {
            let decoded =
                ChromiumDriver::decode_snapshot(serde_json::Value::Null).unwrap();
            assert!(decoded.is_none());
        }

        #[test]
        fn test_decode_element_descriptor() {
            let value = serde_json::json!({
                "tag_name": "button",
                "text": "Submit",
                "displayed": true,
                "selected": false,
                "enabled": true,
            });
            let element = ChromiumDriver::decode_snapshot(value).unwrap().unwrap();
            assert_eq!(element.tag_name, "button");
            assert_eq!(element.text.as_deref(), Some("Submit"));
            assert!(element.displayed);
        }

        #[test]
        fn test_empty_text_becomes_none() {
            let value = serde_json::json!({
                "tag_name": "input",
                "text": "",
                "displayed": false,
                "selected": true,
                "enabled": false,
            });
            let element = ChromiumDriver::decode_snapshot(value).unwrap().unwrap();
            assert!(element.text.is_none());
            assert!(!element.displayed);
            assert!(element.selected);
        }
    }
}
