//! Abstract browser-driver trait and the mock implementation used by unit tests.
//!
//! The facade never creates a browser session; it consumes one through
//! [`PageDriver`]. Implementations:
//!
//! - `ChromiumDriver` — real CDP control via chromiumoxide (feature `browser`)
//! - [`MockDriver`] — in-memory page model with a recorded call history

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use crate::locator::Locator;
use crate::result::{ManejarError, ManejarResult};

/// Driver-agnostic view of a located element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementHandle {
    /// Element tag name, lower-case
    pub tag_name: String,
    /// Trimmed text content, if any
    pub text: Option<String>,
    /// Whether the element is rendered on the visible page
    pub displayed: bool,
    /// Whether a checkbox/radio/option is currently selected
    pub selected: bool,
    /// Whether the element accepts interaction
    pub enabled: bool,
}

impl ElementHandle {
    /// Create a visible, enabled, unselected element
    #[must_use]
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            text: None,
            displayed: true,
            selected: false,
            enabled: true,
        }
    }

    /// Set the text content
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Mark the element present in the DOM but not rendered
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.displayed = false;
        self
    }

    /// Mark the element selected
    #[must_use]
    pub const fn selected(mut self) -> Self {
        self.selected = true;
        self
    }

    /// Mark the element disabled
    #[must_use]
    pub const fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// An open browser alert
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertInfo {
    /// Message displayed by the alert
    pub text: String,
}

/// A browser cookie
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    /// Cookie name
    pub name: String,
    /// Cookie value
    pub value: String,
    /// Cookie domain, if set
    pub domain: Option<String>,
    /// Cookie path, if set
    pub path: Option<String>,
}

impl Cookie {
    /// Create a cookie with just a name and value
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: None,
            path: None,
        }
    }
}

/// Abstract driver trait naming the browser primitives the facade consumes.
///
/// The facade receives an already-initialized session through this trait and
/// owns no lifecycle beyond delegating `quit`.
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Navigate to a URL
    async fn navigate(&mut self, url: &str) -> ManejarResult<()>;
    /// Current page URL
    async fn current_url(&self) -> ManejarResult<String>;
    /// Current page title
    async fn title(&self) -> ManejarResult<String>;
    /// Full page source
    async fn page_source(&self) -> ManejarResult<String>;
    /// Go back in history
    async fn back(&mut self) -> ManejarResult<()>;
    /// Reload the current page
    async fn refresh(&mut self) -> ManejarResult<()>;

    /// First element matching the locator, if any
    async fn find(&self, locator: &Locator) -> ManejarResult<Option<ElementHandle>>;
    /// All elements matching the locator; empty on zero matches
    async fn find_all(&self, locator: &Locator) -> ManejarResult<Vec<ElementHandle>>;

    /// Click the first matching element
    async fn click(&mut self, locator: &Locator) -> ManejarResult<()>;
    /// Click the element at `index` among the locator's matches
    async fn click_index(&mut self, locator: &Locator, index: usize) -> ManejarResult<()>;
    /// Clear the value of the first matching element
    async fn clear(&mut self, locator: &Locator) -> ManejarResult<()>;
    /// Type text into the first matching element
    async fn type_text(&mut self, locator: &Locator, text: &str) -> ManejarResult<()>;
    /// Scroll the element at `index` among the locator's matches into view
    async fn scroll_into_view_index(
        &mut self,
        locator: &Locator,
        index: usize,
    ) -> ManejarResult<()>;

    /// Text content of the first matching element
    async fn text(&self, locator: &Locator) -> ManejarResult<String>;
    /// Attribute value of the first matching element
    async fn attribute(
        &self,
        locator: &Locator,
        name: &str,
    ) -> ManejarResult<Option<String>>;
    /// Computed CSS value of the first matching element
    async fn css_value(&self, locator: &Locator, name: &str) -> ManejarResult<String>;
    /// Whether the first matching element is rendered on the visible page
    async fn is_displayed(&self, locator: &Locator) -> ManejarResult<bool>;
    /// Whether the first matching element is selected
    async fn is_selected(&self, locator: &Locator) -> ManejarResult<bool>;
    /// Whether the first matching element is enabled
    async fn is_enabled(&self, locator: &Locator) -> ManejarResult<bool>;

    /// Select the option with the given visible text in a `<select>`
    async fn select_by_visible_text(
        &mut self,
        locator: &Locator,
        text: &str,
    ) -> ManejarResult<()>;
    /// Visible text of the first selected option in a `<select>`
    async fn first_selected_text(&self, locator: &Locator) -> ManejarResult<String>;
    /// Whether a `<select>` allows multiple selection
    async fn is_multiple(&self, locator: &Locator) -> ManejarResult<bool>;

    /// Evaluate a JavaScript expression in the page
    async fn execute_js(&self, script: &str) -> ManejarResult<serde_json::Value>;

    /// The currently open alert, if any
    async fn active_alert(&self) -> ManejarResult<Option<AlertInfo>>;
    /// Accept the open alert
    async fn accept_alert(&mut self) -> ManejarResult<()>;
    /// Dismiss the open alert
    async fn dismiss_alert(&mut self) -> ManejarResult<()>;
    /// Type text into the open prompt
    async fn send_alert_text(&mut self, text: &str) -> ManejarResult<()>;

    /// All open window handles
    async fn window_handles(&self) -> ManejarResult<Vec<String>>;
    /// Handle of the focused window
    async fn current_window(&self) -> ManejarResult<String>;
    /// Focus the window with the given handle
    async fn switch_to_window(&mut self, handle: &str) -> ManejarResult<()>;
    /// Close the focused window
    async fn close_window(&mut self) -> ManejarResult<()>;
    /// Switch element resolution into the frame matched by the locator
    async fn switch_to_frame(&mut self, locator: &Locator) -> ManejarResult<()>;
    /// Switch element resolution back to the top document
    async fn switch_to_default_content(&mut self) -> ManejarResult<()>;

    /// All cookies for the current page
    async fn cookies(&self) -> ManejarResult<Vec<Cookie>>;
    /// Add cookies to the session
    async fn add_cookies(&mut self, cookies: &[Cookie]) -> ManejarResult<()>;
    /// Delete all cookies
    async fn delete_cookies(&mut self) -> ManejarResult<()>;
    /// Set the driver's implicit element-query wait
    async fn set_implicit_wait(&mut self, timeout: Duration) -> ManejarResult<()>;
    /// End the session
    async fn quit(&mut self) -> ManejarResult<()>;
}

/// Per-select state tracked by the mock
#[derive(Debug, Clone, Default)]
pub struct MockSelect {
    /// Visible text of the currently selected option
    pub selected: String,
    /// Whether the select allows multiple selection
    pub multiple: bool,
}

/// A window known to the mock driver
#[derive(Debug, Clone)]
struct MockWindow {
    id: String,
    title: String,
}

/// Mock driver for unit testing the facade without a browser.
///
/// Every trait call is appended to a history of `"method:detail"` entries so
/// tests can assert on exactly which driver primitives ran, and how often.
#[derive(Debug, Default)]
pub struct MockDriver {
    url: String,
    source: String,
    elements: Vec<(Locator, ElementHandle)>,
    selects: HashMap<Locator, MockSelect>,
    js_results: HashMap<String, serde_json::Value>,
    alert: Option<AlertInfo>,
    windows: Vec<MockWindow>,
    current_window: String,
    frame: Option<Locator>,
    cookies: Vec<Cookie>,
    implicit_wait: Duration,
    implicit_wait_log: Vec<u64>,
    quit_called: bool,
    call_history: Mutex<Vec<String>>,
}

impl MockDriver {
    /// Create a mock driver with a single open window
    #[must_use]
    pub fn new() -> Self {
        Self {
            windows: vec![MockWindow {
                id: "window-0".to_string(),
                title: String::new(),
            }],
            current_window: "window-0".to_string(),
            implicit_wait: Duration::from_secs(30),
            ..Self::default()
        }
    }

    /// Register an element under a locator
    pub fn add_element(&mut self, locator: Locator, element: ElementHandle) {
        self.elements.push((locator, element));
    }

    /// Drop all elements registered under a locator
    pub fn remove_elements(&mut self, locator: &Locator) {
        self.elements.retain(|(l, _)| l != locator);
    }

    /// Register select-element state under a locator
    pub fn set_select(&mut self, locator: Locator, state: MockSelect) {
        self.selects.insert(locator, state);
    }

    /// Script an evaluation result for an exact script string
    pub fn set_js_result(&mut self, script: impl Into<String>, value: serde_json::Value) {
        self.js_results.insert(script.into(), value);
    }

    /// Open an alert with the given message
    pub fn open_alert(&mut self, text: impl Into<String>) {
        self.alert = Some(AlertInfo { text: text.into() });
    }

    /// Open an additional window
    pub fn open_window(&mut self, id: impl Into<String>, title: impl Into<String>) {
        self.windows.push(MockWindow {
            id: id.into(),
            title: title.into(),
        });
    }

    /// Set the title of the focused window
    pub fn set_title(&mut self, title: impl Into<String>) {
        let title = title.into();
        if let Some(w) = self
            .windows
            .iter_mut()
            .find(|w| w.id == self.current_window)
        {
            w.title = title;
        }
    }

    /// Set the page source
    pub fn set_page_source(&mut self, source: impl Into<String>) {
        self.source = source.into();
    }

    /// The recorded call history
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.call_history.lock().map(|h| h.clone()).unwrap_or_default()
    }

    /// Whether any recorded call starts with `prefix`
    #[must_use]
    pub fn was_called(&self, prefix: &str) -> bool {
        self.history().iter().any(|c| c.starts_with(prefix))
    }

    /// Number of recorded calls starting with `prefix`
    #[must_use]
    pub fn count_calls(&self, prefix: &str) -> usize {
        self.history().iter().filter(|c| c.starts_with(prefix)).count()
    }

    /// Implicit-wait values applied so far, in order, in milliseconds
    #[must_use]
    pub fn implicit_wait_log(&self) -> &[u64] {
        &self.implicit_wait_log
    }

    /// The implicit wait currently in effect
    #[must_use]
    pub const fn implicit_wait(&self) -> Duration {
        self.implicit_wait
    }

    /// Whether `quit` was called
    #[must_use]
    pub const fn quit_called(&self) -> bool {
        self.quit_called
    }

    /// The cookies currently in the session
    #[must_use]
    pub fn cookie_jar(&self) -> &[Cookie] {
        &self.cookies
    }

    fn record(&self, entry: impl Into<String>) {
        if let Ok(mut history) = self.call_history.lock() {
            history.push(entry.into());
        }
    }

    // Owns a copy of the locator so the returned borrows are tied to
    // `&self` alone.
    fn matches(&self, locator: &Locator) -> impl Iterator<Item = &ElementHandle> + '_ {
        let locator = locator.clone();
        self.elements
            .iter()
            .filter(move |(l, _)| *l == locator)
            .map(|(_, e)| e)
    }

    fn first_mut(&mut self, locator: &Locator) -> ManejarResult<&mut ElementHandle> {
        let locator_str = locator.to_string();
        self.elements
            .iter_mut()
            .find(|(l, _)| l == locator)
            .map(|(_, e)| e)
            .ok_or(ManejarError::ElementNotFound {
                locator: locator_str,
            })
    }

    fn first(&self, locator: &Locator) -> ManejarResult<&ElementHandle> {
        self.matches(locator)
            .next()
            .ok_or_else(|| ManejarError::ElementNotFound {
                locator: locator.to_string(),
            })
    }
}

#[async_trait]
impl PageDriver for MockDriver {
    async fn navigate(&mut self, url: &str) -> ManejarResult<()> {
        self.record(format!("navigate:{url}"));
        self.url = url.to_string();
        Ok(())
    }

    async fn current_url(&self) -> ManejarResult<String> {
        Ok(self.url.clone())
    }

    async fn title(&self) -> ManejarResult<String> {
        Ok(self
            .windows
            .iter()
            .find(|w| w.id == self.current_window)
            .map(|w| w.title.clone())
            .unwrap_or_default())
    }

    async fn page_source(&self) -> ManejarResult<String> {
        Ok(self.source.clone())
    }

    async fn back(&mut self) -> ManejarResult<()> {
        self.record("back");
        Ok(())
    }

    async fn refresh(&mut self) -> ManejarResult<()> {
        self.record("refresh");
        Ok(())
    }

    async fn find(&self, locator: &Locator) -> ManejarResult<Option<ElementHandle>> {
        self.record(format!("find:{locator}"));
        Ok(self.matches(locator).next().cloned())
    }

    async fn find_all(&self, locator: &Locator) -> ManejarResult<Vec<ElementHandle>> {
        self.record(format!("find_all:{locator}"));
        Ok(self.matches(locator).cloned().collect())
    }

    async fn click(&mut self, locator: &Locator) -> ManejarResult<()> {
        self.record(format!("click:{locator}"));
        // Checkbox/radio semantics: a click flips the selection state.
        let element = self.first_mut(locator)?;
        element.selected = !element.selected;
        Ok(())
    }

    async fn click_index(&mut self, locator: &Locator, index: usize) -> ManejarResult<()> {
        self.record(format!("click_index:{locator}:{index}"));
        let locator_str = locator.to_string();
        self.elements
            .iter_mut()
            .filter(|(l, _)| l == locator)
            .nth(index)
            .map(|(_, e)| e.selected = !e.selected)
            .ok_or(ManejarError::ElementNotFound {
                locator: locator_str,
            })
    }

    async fn clear(&mut self, locator: &Locator) -> ManejarResult<()> {
        self.record(format!("clear:{locator}"));
        self.first_mut(locator)?.text = None;
        Ok(())
    }

    async fn type_text(&mut self, locator: &Locator, text: &str) -> ManejarResult<()> {
        self.record(format!("type:{locator}:{text}"));
        let element = self.first_mut(locator)?;
        let mut value = element.text.take().unwrap_or_default();
        value.push_str(text);
        element.text = Some(value);
        Ok(())
    }

    async fn scroll_into_view_index(
        &mut self,
        locator: &Locator,
        index: usize,
    ) -> ManejarResult<()> {
        self.record(format!("scroll_into_view:{locator}:{index}"));
        Ok(())
    }

    async fn text(&self, locator: &Locator) -> ManejarResult<String> {
        Ok(self.first(locator)?.text.clone().unwrap_or_default())
    }

    async fn attribute(
        &self,
        locator: &Locator,
        name: &str,
    ) -> ManejarResult<Option<String>> {
        self.record(format!("attribute:{locator}:{name}"));
        self.first(locator)?;
        Ok(None)
    }

    async fn css_value(&self, locator: &Locator, name: &str) -> ManejarResult<String> {
        self.record(format!("css_value:{locator}:{name}"));
        self.first(locator)?;
        Ok(String::new())
    }

    async fn is_displayed(&self, locator: &Locator) -> ManejarResult<bool> {
        Ok(self.first(locator)?.displayed)
    }

    async fn is_selected(&self, locator: &Locator) -> ManejarResult<bool> {
        Ok(self.first(locator)?.selected)
    }

    async fn is_enabled(&self, locator: &Locator) -> ManejarResult<bool> {
        Ok(self.first(locator)?.enabled)
    }

    async fn select_by_visible_text(
        &mut self,
        locator: &Locator,
        text: &str,
    ) -> ManejarResult<()> {
        self.record(format!("select:{locator}:{text}"));
        self.selects.entry(locator.clone()).or_default().selected = text.to_string();
        Ok(())
    }

    async fn first_selected_text(&self, locator: &Locator) -> ManejarResult<String> {
        Ok(self
            .selects
            .get(locator)
            .map(|s| s.selected.clone())
            .unwrap_or_default())
    }

    async fn is_multiple(&self, locator: &Locator) -> ManejarResult<bool> {
        Ok(self.selects.get(locator).is_some_and(|s| s.multiple))
    }

    async fn execute_js(&self, script: &str) -> ManejarResult<serde_json::Value> {
        self.record(format!("execute_js:{script}"));
        Ok(self
            .js_results
            .get(script)
            .cloned()
            .unwrap_or(serde_json::Value::Null))
    }

    async fn active_alert(&self) -> ManejarResult<Option<AlertInfo>> {
        Ok(self.alert.clone())
    }

    async fn accept_alert(&mut self) -> ManejarResult<()> {
        self.record("accept_alert");
        self.alert.take().map(|_| ()).ok_or(ManejarError::NoAlert)
    }

    async fn dismiss_alert(&mut self) -> ManejarResult<()> {
        self.record("dismiss_alert");
        self.alert.take().map(|_| ()).ok_or(ManejarError::NoAlert)
    }

    async fn send_alert_text(&mut self, text: &str) -> ManejarResult<()> {
        self.record(format!("alert_text:{text}"));
        if self.alert.is_some() {
            Ok(())
        } else {
            Err(ManejarError::NoAlert)
        }
    }

    async fn window_handles(&self) -> ManejarResult<Vec<String>> {
        Ok(self.windows.iter().map(|w| w.id.clone()).collect())
    }

    async fn current_window(&self) -> ManejarResult<String> {
        Ok(self.current_window.clone())
    }

    async fn switch_to_window(&mut self, handle: &str) -> ManejarResult<()> {
        self.record(format!("switch_window:{handle}"));
        if self.windows.iter().any(|w| w.id == handle) {
            self.current_window = handle.to_string();
            Ok(())
        } else {
            Err(ManejarError::WindowNotFound {
                message: format!("no window with handle '{handle}'"),
            })
        }
    }

    async fn close_window(&mut self) -> ManejarResult<()> {
        self.record(format!("close_window:{}", self.current_window));
        let current = self.current_window.clone();
        self.windows.retain(|w| w.id != current);
        if let Some(first) = self.windows.first() {
            self.current_window = first.id.clone();
        }
        Ok(())
    }

    async fn switch_to_frame(&mut self, locator: &Locator) -> ManejarResult<()> {
        self.record(format!("switch_frame:{locator}"));
        self.first(locator)?;
        self.frame = Some(locator.clone());
        Ok(())
    }

    async fn switch_to_default_content(&mut self) -> ManejarResult<()> {
        self.record("default_content");
        self.frame = None;
        Ok(())
    }

    async fn cookies(&self) -> ManejarResult<Vec<Cookie>> {
        Ok(self.cookies.clone())
    }

    async fn add_cookies(&mut self, cookies: &[Cookie]) -> ManejarResult<()> {
        self.record(format!("add_cookies:{}", cookies.len()));
        self.cookies.extend_from_slice(cookies);
        Ok(())
    }

    async fn delete_cookies(&mut self) -> ManejarResult<()> {
        self.record("delete_cookies");
        self.cookies.clear();
        Ok(())
    }

    async fn set_implicit_wait(&mut self, timeout: Duration) -> ManejarResult<()> {
        let ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self.record(format!("implicit_wait:{ms}"));
        self.implicit_wait = timeout;
        self.implicit_wait_log.push(ms);
        Ok(())
    }

    async fn quit(&mut self) -> ManejarResult<()> {
        self.record("quit");
        self.quit_called = true;
        self.windows.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locator(raw: &str) -> Locator {
        Locator::parse(raw).unwrap()
    }

    mod element_handle_tests {
        use super::*;

        #[test]
        fn test_builder_defaults() {
            let element = ElementHandle::new("button");
            assert_eq!(element.tag_name, "button");
            assert!(element.displayed);
            assert!(element.enabled);
            assert!(!element.selected);
        }

        #[test]
        fn test_builder_modifiers() {
            let element = ElementHandle::new("input")
                .with_text("hello")
                .hidden()
                .selected()
                .disabled();
            assert_eq!(element.text.as_deref(), Some("hello"));
            assert!(!element.displayed);
            assert!(element.selected);
            assert!(!element.enabled);
        }
    }

    mod mock_query_tests {
        use super::*;

        #[tokio::test]
        async fn test_find_missing_is_none() {
            let driver = MockDriver::new();
            assert!(driver.find(&locator("id=nope")).await.unwrap().is_none());
        }

        #[tokio::test]
        async fn test_find_all_missing_is_empty() {
            let driver = MockDriver::new();
            assert!(driver.find_all(&locator("css=li")).await.unwrap().is_empty());
        }

        #[tokio::test]
        async fn test_lookup_outlives_the_locator_borrow() {
            let mut driver = MockDriver::new();
            driver.add_element(
                locator("id=msg"),
                ElementHandle::new("div").with_text("hola"),
            );
            let element = {
                let short_lived = locator("id=msg");
                driver.find(&short_lived).await.unwrap().unwrap()
            };
            assert_eq!(element.text.as_deref(), Some("hola"));
            assert_eq!(driver.text(&locator("id=msg")).await.unwrap(), "hola");
        }

        #[tokio::test]
        async fn test_find_all_returns_every_match() {
            let mut driver = MockDriver::new();
            driver.add_element(locator("css=li"), ElementHandle::new("li"));
            driver.add_element(locator("css=li"), ElementHandle::new("li"));
            driver.add_element(locator("css=p"), ElementHandle::new("p"));
            assert_eq!(driver.find_all(&locator("css=li")).await.unwrap().len(), 2);
        }
    }

    mod mock_action_tests {
        use super::*;

        #[tokio::test]
        async fn test_click_missing_element_fails() {
            let mut driver = MockDriver::new();
            let err = driver.click(&locator("id=gone")).await.unwrap_err();
            assert!(matches!(err, ManejarError::ElementNotFound { .. }));
        }

        #[tokio::test]
        async fn test_click_flips_selection() {
            let mut driver = MockDriver::new();
            driver.add_element(locator("id=cb"), ElementHandle::new("input"));
            driver.click(&locator("id=cb")).await.unwrap();
            assert!(driver.is_selected(&locator("id=cb")).await.unwrap());
            driver.click(&locator("id=cb")).await.unwrap();
            assert!(!driver.is_selected(&locator("id=cb")).await.unwrap());
        }

        #[tokio::test]
        async fn test_type_appends_and_clear_resets() {
            let mut driver = MockDriver::new();
            driver.add_element(locator("name=q"), ElementHandle::new("input"));
            driver.type_text(&locator("name=q"), "abc").await.unwrap();
            driver.type_text(&locator("name=q"), "def").await.unwrap();
            assert_eq!(driver.text(&locator("name=q")).await.unwrap(), "abcdef");
            driver.clear(&locator("name=q")).await.unwrap();
            assert_eq!(driver.text(&locator("name=q")).await.unwrap(), "");
        }
    }

    mod mock_history_tests {
        use super::*;

        #[tokio::test]
        async fn test_history_records_calls_in_order() {
            let mut driver = MockDriver::new();
            driver.navigate("https://example.com").await.unwrap();
            driver.find(&locator("id=x")).await.unwrap();
            let history = driver.history();
            assert_eq!(history[0], "navigate:https://example.com");
            assert_eq!(history[1], "find:id=x");
        }

        #[tokio::test]
        async fn test_count_calls() {
            let mut driver = MockDriver::new();
            driver.add_element(locator("id=cb"), ElementHandle::new("input"));
            driver.click(&locator("id=cb")).await.unwrap();
            driver.click(&locator("id=cb")).await.unwrap();
            assert_eq!(driver.count_calls("click:"), 2);
            assert!(driver.was_called("click:id=cb"));
        }

        #[tokio::test]
        async fn test_implicit_wait_log() {
            let mut driver = MockDriver::new();
            driver
                .set_implicit_wait(Duration::from_secs(5))
                .await
                .unwrap();
            driver
                .set_implicit_wait(Duration::from_secs(30))
                .await
                .unwrap();
            assert_eq!(driver.implicit_wait_log(), &[5_000, 30_000]);
            assert_eq!(driver.implicit_wait(), Duration::from_secs(30));
        }
    }

    mod mock_window_tests {
        use super::*;

        #[tokio::test]
        async fn test_switch_to_unknown_window_fails() {
            let mut driver = MockDriver::new();
            let err = driver.switch_to_window("window-9").await.unwrap_err();
            assert!(matches!(err, ManejarError::WindowNotFound { .. }));
        }

        #[tokio::test]
        async fn test_close_window_refocuses_remaining() {
            let mut driver = MockDriver::new();
            driver.open_window("window-1", "Popup");
            driver.switch_to_window("window-1").await.unwrap();
            driver.close_window().await.unwrap();
            assert_eq!(driver.current_window().await.unwrap(), "window-0");
        }

        #[tokio::test]
        async fn test_title_follows_focused_window() {
            let mut driver = MockDriver::new();
            driver.set_title("Main");
            driver.open_window("window-1", "Popup");
            assert_eq!(driver.title().await.unwrap(), "Main");
            driver.switch_to_window("window-1").await.unwrap();
            assert_eq!(driver.title().await.unwrap(), "Popup");
        }
    }

    mod mock_alert_tests {
        use super::*;

        #[tokio::test]
        async fn test_accept_without_alert_fails() {
            let mut driver = MockDriver::new();
            assert!(matches!(
                driver.accept_alert().await.unwrap_err(),
                ManejarError::NoAlert
            ));
        }

        #[tokio::test]
        async fn test_alert_lifecycle() {
            let mut driver = MockDriver::new();
            driver.open_alert("Are you sure?");
            let alert = driver.active_alert().await.unwrap().unwrap();
            assert_eq!(alert.text, "Are you sure?");
            driver.accept_alert().await.unwrap();
            assert!(driver.active_alert().await.unwrap().is_none());
        }
    }
}
