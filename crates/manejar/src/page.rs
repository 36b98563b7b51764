//! Element Action Facade: semantic operations over a [`PageDriver`] session.
//!
//! Every operation resolves a prefixed locator string (optionally after `%s`
//! substitution via the `*_with` variants), then performs one primitive action
//! against the matching element(s). No operation catches or retries; element
//! not-found, timeout, and locator configuration errors propagate to the
//! caller (fail-fast, as befits a test-assertion context).

use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::driver::{AlertInfo, Cookie, ElementHandle, PageDriver};
use crate::locator::Locator;
use crate::result::{ManejarError, ManejarResult};
use crate::wait::{WaitPolicy, JQUERY_IDLE_PROBE, READY_STATE_PROBE};

/// Fixed pause applied after scrolling a custom-dropdown option into view
pub const CUSTOM_DROPDOWN_PAUSE: Duration = Duration::from_secs(5);

/// Facade over a live browser-driver session.
///
/// Holds the driver handle (it never creates one) and the [`WaitPolicy`] used
/// by every blocking wait. All calls are sequential and blocking; the absence
/// check temporarily overrides the driver's implicit wait, so do not run
/// absence checks concurrently against the same session.
#[derive(Debug)]
pub struct Page<D: PageDriver> {
    driver: D,
    policy: WaitPolicy,
}

impl<D: PageDriver> Page<D> {
    /// Wrap an already-initialized driver session with the default wait policy
    pub fn new(driver: D) -> Self {
        Self::with_policy(driver, WaitPolicy::default())
    }

    /// Wrap a driver session with an explicit wait policy
    pub fn with_policy(driver: D, policy: WaitPolicy) -> Self {
        Self { driver, policy }
    }

    /// The wait policy in effect
    #[must_use]
    pub const fn policy(&self) -> WaitPolicy {
        self.policy
    }

    /// Borrow the underlying driver
    pub const fn driver(&self) -> &D {
        &self.driver
    }

    /// Mutably borrow the underlying driver
    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    /// Unwrap back into the driver session
    pub fn into_driver(self) -> D {
        self.driver
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    /// Navigate to a URL
    pub async fn open_url(&mut self, url: &str) -> ManejarResult<()> {
        debug!(url, "open url");
        self.driver.navigate(url).await
    }

    /// Current page title
    pub async fn title(&self) -> ManejarResult<String> {
        self.driver.title().await
    }

    /// Current page URL
    pub async fn current_url(&self) -> ManejarResult<String> {
        self.driver.current_url().await
    }

    /// Full page source
    pub async fn page_source(&self) -> ManejarResult<String> {
        self.driver.page_source().await
    }

    /// Go back in history
    pub async fn back(&mut self) -> ManejarResult<()> {
        self.driver.back().await
    }

    /// Reload the current page
    pub async fn refresh(&mut self) -> ManejarResult<()> {
        self.driver.refresh().await
    }

    // ------------------------------------------------------------------
    // Element queries
    // ------------------------------------------------------------------

    /// Find the first element matching the locator.
    ///
    /// # Errors
    ///
    /// [`ManejarError::ElementNotFound`] when no element matches.
    pub async fn find(&self, locator: &str) -> ManejarResult<ElementHandle> {
        let locator = Locator::parse(locator)?;
        self.find_resolved(&locator).await
    }

    /// All elements matching the locator; empty on zero matches
    pub async fn find_all(&self, locator: &str) -> ManejarResult<Vec<ElementHandle>> {
        let locator = Locator::parse(locator)?;
        self.driver.find_all(&locator).await
    }

    /// Number of elements matching the locator
    pub async fn count(&self, locator: &str) -> ManejarResult<usize> {
        Ok(self.find_all(locator).await?.len())
    }

    async fn find_resolved(&self, locator: &Locator) -> ManejarResult<ElementHandle> {
        self.driver
            .find(locator)
            .await?
            .ok_or_else(|| ManejarError::ElementNotFound {
                locator: locator.to_string(),
            })
    }

    // ------------------------------------------------------------------
    // Element actions
    // ------------------------------------------------------------------

    /// Click the first matching element
    pub async fn click(&mut self, locator: &str) -> ManejarResult<()> {
        let locator = Locator::parse(locator)?;
        self.click_resolved(&locator).await
    }

    /// Click with a dynamic locator
    pub async fn click_with(&mut self, template: &str, args: &[&str]) -> ManejarResult<()> {
        let locator = Locator::parse_with(template, args)?;
        self.click_resolved(&locator).await
    }

    async fn click_resolved(&mut self, locator: &Locator) -> ManejarResult<()> {
        debug!(%locator, "click");
        self.driver.click(locator).await
    }

    /// Clear the element, then type the value into it
    pub async fn send_keys(&mut self, locator: &str, value: &str) -> ManejarResult<()> {
        let locator = Locator::parse(locator)?;
        self.send_keys_resolved(&locator, value).await
    }

    /// Clear-then-type with a dynamic locator
    pub async fn send_keys_with(
        &mut self,
        template: &str,
        args: &[&str],
        value: &str,
    ) -> ManejarResult<()> {
        let locator = Locator::parse_with(template, args)?;
        self.send_keys_resolved(&locator, value).await
    }

    async fn send_keys_resolved(&mut self, locator: &Locator, value: &str) -> ManejarResult<()> {
        debug!(%locator, "send keys");
        self.driver.clear(locator).await?;
        self.driver.type_text(locator, value).await
    }

    /// Click the first matching element through script execution
    pub async fn click_js(&mut self, locator: &str) -> ManejarResult<()> {
        let locator = Locator::parse(locator)?;
        let script = format!(
            "(() => {{ const el = {}; if (el) el.click(); return !!el; }})()",
            locator.to_query()
        );
        let clicked = self.driver.execute_js(&script).await?;
        if clicked == serde_json::Value::Bool(true) {
            Ok(())
        } else {
            Err(ManejarError::ElementNotFound {
                locator: locator.to_string(),
            })
        }
    }

    // ------------------------------------------------------------------
    // Element reads
    // ------------------------------------------------------------------

    /// Text content of the first matching element
    pub async fn text(&self, locator: &str) -> ManejarResult<String> {
        let locator = Locator::parse(locator)?;
        self.driver.text(&locator).await
    }

    /// Text content with a dynamic locator
    pub async fn text_with(&self, template: &str, args: &[&str]) -> ManejarResult<String> {
        let locator = Locator::parse_with(template, args)?;
        self.driver.text(&locator).await
    }

    /// Attribute value of the first matching element
    pub async fn attribute(
        &self,
        locator: &str,
        name: &str,
    ) -> ManejarResult<Option<String>> {
        let locator = Locator::parse(locator)?;
        self.driver.attribute(&locator, name).await
    }

    /// Computed CSS value of the first matching element
    pub async fn css_value(&self, locator: &str, name: &str) -> ManejarResult<String> {
        let locator = Locator::parse(locator)?;
        self.driver.css_value(&locator, name).await
    }

    /// Whether the first matching element is rendered on the visible page
    pub async fn is_displayed(&self, locator: &str) -> ManejarResult<bool> {
        let locator = Locator::parse(locator)?;
        self.driver.is_displayed(&locator).await
    }

    /// Visibility with a dynamic locator
    pub async fn is_displayed_with(
        &self,
        template: &str,
        args: &[&str],
    ) -> ManejarResult<bool> {
        let locator = Locator::parse_with(template, args)?;
        self.driver.is_displayed(&locator).await
    }

    /// Whether the first matching element is selected
    pub async fn is_selected(&self, locator: &str) -> ManejarResult<bool> {
        let locator = Locator::parse(locator)?;
        self.driver.is_selected(&locator).await
    }

    // ------------------------------------------------------------------
    // Dropdowns
    // ------------------------------------------------------------------

    /// Select the option with the given visible text in a `<select>`
    pub async fn select_dropdown(&mut self, locator: &str, item_text: &str) -> ManejarResult<()> {
        let locator = Locator::parse(locator)?;
        debug!(%locator, item_text, "select dropdown");
        self.driver.select_by_visible_text(&locator, item_text).await
    }

    /// Dropdown select with a dynamic locator
    pub async fn select_dropdown_with(
        &mut self,
        template: &str,
        args: &[&str],
        item_text: &str,
    ) -> ManejarResult<()> {
        let locator = Locator::parse_with(template, args)?;
        self.driver.select_by_visible_text(&locator, item_text).await
    }

    /// Visible text of the first selected option in a `<select>`
    pub async fn first_selected_option(&self, locator: &str) -> ManejarResult<String> {
        let locator = Locator::parse(locator)?;
        self.driver.first_selected_text(&locator).await
    }

    /// Whether a `<select>` allows multiple selection
    pub async fn is_multiple(&self, locator: &str) -> ManejarResult<bool> {
        let locator = Locator::parse(locator)?;
        self.driver.is_multiple(&locator).await
    }

    /// Select an option from a non-`<select>` dropdown widget.
    ///
    /// Clicks the opening control, waits for the candidate options to become
    /// visible, linearly scans for the one whose text equals `expected`,
    /// scrolls it into view via script, pauses [`CUSTOM_DROPDOWN_PAUSE`], then
    /// clicks it. No matching option is a silent no-op.
    pub async fn select_custom_dropdown(
        &mut self,
        parent: &str,
        child: &str,
        expected: &str,
    ) -> ManejarResult<()> {
        let parent = Locator::parse(parent)?;
        let child = Locator::parse(child)?;
        debug!(%parent, %child, expected, "select custom dropdown");
        self.click_resolved(&parent).await?;
        self.wait_for_all_visible_resolved(&child).await?;
        let items = self.driver.find_all(&child).await?;
        for (index, item) in items.iter().enumerate() {
            if item.text.as_deref() == Some(expected) {
                self.driver.scroll_into_view_index(&child, index).await?;
                sleep(CUSTOM_DROPDOWN_PAUSE).await;
                self.driver.click_index(&child, index).await?;
                break;
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Checkboxes and radios
    // ------------------------------------------------------------------

    /// Ensure a checkbox/radio is selected, clicking only when it is not.
    ///
    /// Idempotent: an already-selected control is not clicked.
    pub async fn check(&mut self, locator: &str) -> ManejarResult<()> {
        let locator = Locator::parse(locator)?;
        self.check_resolved(&locator).await
    }

    /// Check with a dynamic locator
    pub async fn check_with(&mut self, template: &str, args: &[&str]) -> ManejarResult<()> {
        let locator = Locator::parse_with(template, args)?;
        self.check_resolved(&locator).await
    }

    async fn check_resolved(&mut self, locator: &Locator) -> ManejarResult<()> {
        if !self.driver.is_selected(locator).await? {
            self.click_resolved(locator).await?;
        }
        Ok(())
    }

    /// Ensure a checkbox is not selected, clicking only when it is
    pub async fn uncheck(&mut self, locator: &str) -> ManejarResult<()> {
        let locator = Locator::parse(locator)?;
        if self.driver.is_selected(&locator).await? {
            self.click_resolved(&locator).await?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Waits
    // ------------------------------------------------------------------

    /// Block until the first matching element is visible
    pub async fn wait_for_visible(&self, locator: &str) -> ManejarResult<()> {
        let locator = Locator::parse(locator)?;
        let deadline = Instant::now() + self.policy.long();
        loop {
            if let Some(element) = self.driver.find(&locator).await? {
                if element.displayed {
                    return Ok(());
                }
            }
            if Instant::now() >= deadline {
                return Err(self.timeout(format!("element visible: {locator}")));
            }
            sleep(self.policy.poll_interval()).await;
        }
    }

    /// Block until the first matching element is present in the DOM
    pub async fn wait_for_present(&self, locator: &str) -> ManejarResult<()> {
        let locator = Locator::parse(locator)?;
        let deadline = Instant::now() + self.policy.long();
        loop {
            if self.driver.find(&locator).await?.is_some() {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(self.timeout(format!("element present: {locator}")));
            }
            sleep(self.policy.poll_interval()).await;
        }
    }

    /// Block until the first matching element is visible and enabled
    pub async fn wait_for_clickable(&self, locator: &str) -> ManejarResult<()> {
        let locator = Locator::parse(locator)?;
        self.wait_for_clickable_resolved(&locator).await
    }

    /// Clickability wait with a dynamic locator
    pub async fn wait_for_clickable_with(
        &self,
        template: &str,
        args: &[&str],
    ) -> ManejarResult<()> {
        let locator = Locator::parse_with(template, args)?;
        self.wait_for_clickable_resolved(&locator).await
    }

    async fn wait_for_clickable_resolved(&self, locator: &Locator) -> ManejarResult<()> {
        let deadline = Instant::now() + self.policy.long();
        loop {
            if let Some(element) = self.driver.find(locator).await? {
                if element.displayed && element.enabled {
                    return Ok(());
                }
            }
            if Instant::now() >= deadline {
                return Err(self.timeout(format!("element clickable: {locator}")));
            }
            sleep(self.policy.poll_interval()).await;
        }
    }

    /// Block until no matching element is visible
    pub async fn wait_for_invisible(&self, locator: &str) -> ManejarResult<()> {
        let locator = Locator::parse(locator)?;
        let deadline = Instant::now() + self.policy.long();
        loop {
            match self.driver.find(&locator).await? {
                None => return Ok(()),
                Some(element) if !element.displayed => return Ok(()),
                Some(_) => {}
            }
            if Instant::now() >= deadline {
                return Err(self.timeout(format!("element invisible: {locator}")));
            }
            sleep(self.policy.poll_interval()).await;
        }
    }

    /// Block until at least one element matches and every match is visible
    pub async fn wait_for_all_visible(&self, locator: &str) -> ManejarResult<()> {
        let locator = Locator::parse(locator)?;
        self.wait_for_all_visible_resolved(&locator).await
    }

    /// List-visibility wait with a dynamic locator
    pub async fn wait_for_all_visible_with(
        &self,
        template: &str,
        args: &[&str],
    ) -> ManejarResult<()> {
        let locator = Locator::parse_with(template, args)?;
        self.wait_for_all_visible_resolved(&locator).await
    }

    async fn wait_for_all_visible_resolved(&self, locator: &Locator) -> ManejarResult<()> {
        let deadline = Instant::now() + self.policy.long();
        loop {
            let elements = self.driver.find_all(locator).await?;
            if !elements.is_empty() && elements.iter().all(|e| e.displayed) {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(self.timeout(format!("all elements visible: {locator}")));
            }
            sleep(self.policy.poll_interval()).await;
        }
    }

    /// Whether the element is absent from the visible page.
    ///
    /// Temporarily applies the short timeout as the driver's implicit wait,
    /// queries matching elements, restores the long timeout, then returns
    /// `true` when nothing matched or the first match is not visible. Missing
    /// and hidden are intentionally coalesced; callers needing the
    /// distinction should use [`Page::find_all`] and inspect the handles.
    pub async fn is_undisplayed(&mut self, locator: &str) -> ManejarResult<bool> {
        let locator = Locator::parse(locator)?;
        self.is_undisplayed_resolved(&locator).await
    }

    /// Absence check with a dynamic locator
    pub async fn is_undisplayed_with(
        &mut self,
        template: &str,
        args: &[&str],
    ) -> ManejarResult<bool> {
        let locator = Locator::parse_with(template, args)?;
        self.is_undisplayed_resolved(&locator).await
    }

    async fn is_undisplayed_resolved(&mut self, locator: &Locator) -> ManejarResult<bool> {
        self.driver.set_implicit_wait(self.policy.short()).await?;
        let found = self.driver.find_all(locator).await;
        // Restore the long timeout before propagating a query failure.
        self.driver.set_implicit_wait(self.policy.long()).await?;
        let elements = found?;
        Ok(elements.first().map_or(true, |e| !e.displayed))
    }

    /// Block until the page reports ready: `document.readyState` is
    /// `complete` and no tracked requests are in flight
    pub async fn wait_for_page_ready(&self) -> ManejarResult<()> {
        let deadline = Instant::now() + self.policy.long();
        loop {
            let state = self.driver.execute_js(READY_STATE_PROBE).await?;
            let idle = self.driver.execute_js(JQUERY_IDLE_PROBE).await?;
            if state == serde_json::Value::Bool(true) && idle == serde_json::Value::Bool(true)
            {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(self.timeout("page ready".to_string()));
            }
            sleep(self.policy.poll_interval()).await;
        }
    }

    /// Fixed, unconditional pause
    pub async fn sleep_for(&self, duration: Duration) {
        sleep(duration).await;
    }

    fn timeout(&self, condition: String) -> ManejarError {
        ManejarError::Timeout {
            ms: self.policy.long_ms,
            condition,
        }
    }

    // ------------------------------------------------------------------
    // Alerts
    // ------------------------------------------------------------------

    /// Block until an alert is open, then return it
    pub async fn wait_for_alert(&self) -> ManejarResult<AlertInfo> {
        let deadline = Instant::now() + self.policy.long();
        loop {
            if let Some(alert) = self.driver.active_alert().await? {
                return Ok(alert);
            }
            if Instant::now() >= deadline {
                return Err(self.timeout("alert present".to_string()));
            }
            sleep(self.policy.poll_interval()).await;
        }
    }

    /// Wait for an alert and accept it
    pub async fn accept_alert(&mut self) -> ManejarResult<()> {
        self.wait_for_alert().await?;
        self.driver.accept_alert().await
    }

    /// Wait for an alert and dismiss it
    pub async fn dismiss_alert(&mut self) -> ManejarResult<()> {
        self.wait_for_alert().await?;
        self.driver.dismiss_alert().await
    }

    /// Wait for an alert and return its message
    pub async fn alert_text(&self) -> ManejarResult<String> {
        Ok(self.wait_for_alert().await?.text)
    }

    /// Wait for a prompt and type into it
    pub async fn send_keys_to_alert(&mut self, value: &str) -> ManejarResult<()> {
        self.wait_for_alert().await?;
        self.driver.send_alert_text(value).await
    }

    // ------------------------------------------------------------------
    // Windows and frames
    // ------------------------------------------------------------------

    /// Handle of the focused window
    pub async fn current_window(&self) -> ManejarResult<String> {
        self.driver.current_window().await
    }

    /// Switch focus to the window whose handle differs from `current_id`.
    ///
    /// Only well-defined with exactly two open windows; with more, the first
    /// differing handle wins.
    pub async fn switch_to_other_window(&mut self, current_id: &str) -> ManejarResult<()> {
        for handle in self.driver.window_handles().await? {
            if handle != current_id {
                return self.driver.switch_to_window(&handle).await;
            }
        }
        Err(ManejarError::WindowNotFound {
            message: format!("no window other than '{current_id}'"),
        })
    }

    /// Switch into each window in turn, stopping at the first whose title
    /// equals `expected`
    pub async fn switch_to_window_by_title(&mut self, expected: &str) -> ManejarResult<()> {
        for handle in self.driver.window_handles().await? {
            self.driver.switch_to_window(&handle).await?;
            if self.driver.title().await? == expected {
                return Ok(());
            }
        }
        Err(ManejarError::WindowNotFound {
            message: format!("no window titled '{expected}'"),
        })
    }

    /// Close every window except the one with `parent_id`, then refocus it
    pub async fn close_other_windows(&mut self, parent_id: &str) -> ManejarResult<()> {
        for handle in self.driver.window_handles().await? {
            if handle != parent_id {
                self.driver.switch_to_window(&handle).await?;
                self.driver.close_window().await?;
            }
        }
        self.driver.switch_to_window(parent_id).await
    }

    /// Switch element resolution into the frame matched by the locator
    pub async fn switch_to_frame(&mut self, locator: &str) -> ManejarResult<()> {
        let locator = Locator::parse(locator)?;
        self.driver.switch_to_frame(&locator).await
    }

    /// Switch element resolution back to the top document
    pub async fn switch_to_default_content(&mut self) -> ManejarResult<()> {
        self.driver.switch_to_default_content().await
    }

    // ------------------------------------------------------------------
    // Cookies and teardown
    // ------------------------------------------------------------------

    /// All cookies for the current page
    pub async fn cookies(&self) -> ManejarResult<Vec<Cookie>> {
        self.driver.cookies().await
    }

    /// Add cookies to the session
    pub async fn add_cookies(&mut self, cookies: &[Cookie]) -> ManejarResult<()> {
        self.driver.add_cookies(cookies).await
    }

    /// Delete all cookies
    pub async fn delete_cookies(&mut self) -> ManejarResult<()> {
        self.driver.delete_cookies().await
    }

    /// End the underlying session
    pub async fn quit(&mut self) -> ManejarResult<()> {
        self.driver.quit().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{MockDriver, MockSelect};

    fn locator(raw: &str) -> Locator {
        Locator::parse(raw).unwrap()
    }

    fn fast_policy() -> WaitPolicy {
        WaitPolicy::new().with_long(200).with_short(50).with_poll_interval(10)
    }

    mod action_tests {
        use super::*;

        #[tokio::test]
        async fn test_click_routes_to_driver() {
            let mut driver = MockDriver::new();
            driver.add_element(locator("id=submit"), ElementHandle::new("button"));
            let mut page = Page::new(driver);
            page.click("id=submit").await.unwrap();
            assert!(page.driver().was_called("click:id=submit"));
        }

        #[tokio::test]
        async fn test_click_invalid_locator_is_config_error() {
            let mut page = Page::new(MockDriver::new());
            let err = page.click("bogus=submit").await.unwrap_err();
            assert!(matches!(err, ManejarError::InvalidLocator { .. }));
        }

        #[tokio::test]
        async fn test_click_with_dynamic_locator() {
            let mut driver = MockDriver::new();
            driver.add_element(
                locator("xpath=//button[text()='OK']"),
                ElementHandle::new("button"),
            );
            let mut page = Page::new(driver);
            page.click_with("XPATH=//button[text()='%s']", &["OK"])
                .await
                .unwrap();
            assert!(page.driver().was_called("click:xpath=//button[text()='OK']"));
        }

        #[tokio::test]
        async fn test_send_keys_clears_first() {
            let mut driver = MockDriver::new();
            driver.add_element(
                locator("name=q"),
                ElementHandle::new("input").with_text("old"),
            );
            let mut page = Page::new(driver);
            page.send_keys("name=q", "new").await.unwrap();
            let history = page.driver().history();
            let clear_at = history.iter().position(|c| c.starts_with("clear:")).unwrap();
            let type_at = history.iter().position(|c| c.starts_with("type:")).unwrap();
            assert!(clear_at < type_at);
            assert_eq!(page.text("name=q").await.unwrap(), "new");
        }

        #[tokio::test]
        async fn test_find_missing_fails() {
            let page = Page::new(MockDriver::new());
            let err = page.find("id=absent").await.unwrap_err();
            assert!(matches!(err, ManejarError::ElementNotFound { .. }));
        }

        #[tokio::test]
        async fn test_find_all_missing_is_empty() {
            let page = Page::new(MockDriver::new());
            assert!(page.find_all("css=li").await.unwrap().is_empty());
            assert_eq!(page.count("css=li").await.unwrap(), 0);
        }

        #[tokio::test]
        async fn test_click_js_reports_missing_element() {
            let mut page = Page::new(MockDriver::new());
            // Unscripted JS results evaluate to null, meaning no element.
            let err = page.click_js("id=absent").await.unwrap_err();
            assert!(matches!(err, ManejarError::ElementNotFound { .. }));
        }
    }

    mod dropdown_tests {
        use super::*;

        #[tokio::test]
        async fn test_select_and_read_back() {
            let mut driver = MockDriver::new();
            driver.set_select(
                locator("id=country"),
                MockSelect {
                    selected: "none".to_string(),
                    multiple: false,
                },
            );
            let mut page = Page::new(driver);
            page.select_dropdown("id=country", "Vietnam").await.unwrap();
            assert_eq!(
                page.first_selected_option("id=country").await.unwrap(),
                "Vietnam"
            );
            assert!(!page.is_multiple("id=country").await.unwrap());
        }
    }

    mod checkbox_tests {
        use super::*;

        #[tokio::test]
        async fn test_check_clicks_unselected_once() {
            let mut driver = MockDriver::new();
            driver.add_element(locator("id=terms"), ElementHandle::new("input"));
            let mut page = Page::new(driver);
            page.check("id=terms").await.unwrap();
            assert!(page.is_selected("id=terms").await.unwrap());
            assert_eq!(page.driver().count_calls("click:"), 1);
        }

        #[tokio::test]
        async fn test_check_is_idempotent() {
            let mut driver = MockDriver::new();
            driver.add_element(locator("id=terms"), ElementHandle::new("input"));
            let mut page = Page::new(driver);
            page.check("id=terms").await.unwrap();
            page.check("id=terms").await.unwrap();
            // Two checks on the same element yield exactly one click.
            assert_eq!(page.driver().count_calls("click:"), 1);
            assert!(page.is_selected("id=terms").await.unwrap());
        }

        #[tokio::test]
        async fn test_check_skips_already_selected() {
            let mut driver = MockDriver::new();
            driver.add_element(
                locator("id=terms"),
                ElementHandle::new("input").selected(),
            );
            let mut page = Page::new(driver);
            page.check("id=terms").await.unwrap();
            assert_eq!(page.driver().count_calls("click:"), 0);
        }

        #[tokio::test]
        async fn test_uncheck_only_clicks_selected() {
            let mut driver = MockDriver::new();
            driver.add_element(
                locator("id=news"),
                ElementHandle::new("input").selected(),
            );
            let mut page = Page::new(driver);
            page.uncheck("id=news").await.unwrap();
            page.uncheck("id=news").await.unwrap();
            assert_eq!(page.driver().count_calls("click:"), 1);
            assert!(!page.is_selected("id=news").await.unwrap());
        }
    }

    mod wait_tests {
        use super::*;

        #[tokio::test]
        async fn test_wait_for_visible_succeeds_immediately() {
            let mut driver = MockDriver::new();
            driver.add_element(locator("id=banner"), ElementHandle::new("div"));
            let page = Page::with_policy(driver, fast_policy());
            page.wait_for_visible("id=banner").await.unwrap();
        }

        #[tokio::test(start_paused = true)]
        async fn test_wait_for_visible_times_out_on_hidden() {
            let mut driver = MockDriver::new();
            driver.add_element(locator("id=banner"), ElementHandle::new("div").hidden());
            let page = Page::with_policy(driver, fast_policy());
            let err = page.wait_for_visible("id=banner").await.unwrap_err();
            assert!(matches!(err, ManejarError::Timeout { ms: 200, .. }));
        }

        #[tokio::test(start_paused = true)]
        async fn test_wait_for_present_times_out_on_missing() {
            let page = Page::with_policy(MockDriver::new(), fast_policy());
            let err = page.wait_for_present("id=ghost").await.unwrap_err();
            assert!(matches!(err, ManejarError::Timeout { .. }));
        }

        #[tokio::test(start_paused = true)]
        async fn test_wait_for_clickable_requires_enabled() {
            let mut driver = MockDriver::new();
            driver.add_element(locator("id=go"), ElementHandle::new("button").disabled());
            let page = Page::with_policy(driver, fast_policy());
            let err = page.wait_for_clickable("id=go").await.unwrap_err();
            assert!(matches!(err, ManejarError::Timeout { .. }));
        }

        #[tokio::test]
        async fn test_wait_for_invisible_passes_for_hidden_and_missing() {
            let mut driver = MockDriver::new();
            driver.add_element(locator("id=spinner"), ElementHandle::new("div").hidden());
            let page = Page::with_policy(driver, fast_policy());
            page.wait_for_invisible("id=spinner").await.unwrap();
            page.wait_for_invisible("id=ghost").await.unwrap();
        }

        #[tokio::test]
        async fn test_wait_for_all_visible() {
            let mut driver = MockDriver::new();
            driver.add_element(locator("css=li"), ElementHandle::new("li"));
            driver.add_element(locator("css=li"), ElementHandle::new("li"));
            let page = Page::with_policy(driver, fast_policy());
            page.wait_for_all_visible("css=li").await.unwrap();
        }

        #[tokio::test(start_paused = true)]
        async fn test_wait_for_all_visible_fails_when_one_hidden() {
            let mut driver = MockDriver::new();
            driver.add_element(locator("css=li"), ElementHandle::new("li"));
            driver.add_element(locator("css=li"), ElementHandle::new("li").hidden());
            let page = Page::with_policy(driver, fast_policy());
            assert!(page.wait_for_all_visible("css=li").await.is_err());
        }

        #[tokio::test]
        async fn test_page_ready_when_both_probes_hold() {
            let mut driver = MockDriver::new();
            driver.set_js_result(READY_STATE_PROBE, serde_json::Value::Bool(true));
            driver.set_js_result(JQUERY_IDLE_PROBE, serde_json::Value::Bool(true));
            let page = Page::with_policy(driver, fast_policy());
            page.wait_for_page_ready().await.unwrap();
        }

        #[tokio::test(start_paused = true)]
        async fn test_page_ready_requires_both_probes() {
            let mut driver = MockDriver::new();
            driver.set_js_result(READY_STATE_PROBE, serde_json::Value::Bool(true));
            driver.set_js_result(JQUERY_IDLE_PROBE, serde_json::Value::Bool(false));
            let page = Page::with_policy(driver, fast_policy());
            assert!(page.wait_for_page_ready().await.is_err());
        }
    }

    mod absence_tests {
        use super::*;

        #[tokio::test]
        async fn test_absent_element_is_undisplayed() {
            let mut page = Page::with_policy(MockDriver::new(), fast_policy());
            assert!(page.is_undisplayed("id=ghost").await.unwrap());
        }

        #[tokio::test]
        async fn test_hidden_element_is_undisplayed() {
            let mut driver = MockDriver::new();
            driver.add_element(locator("id=note"), ElementHandle::new("div").hidden());
            let mut page = Page::with_policy(driver, fast_policy());
            assert!(page.is_undisplayed("id=note").await.unwrap());
        }

        #[tokio::test]
        async fn test_visible_element_is_not_undisplayed() {
            let mut driver = MockDriver::new();
            driver.add_element(locator("id=note"), ElementHandle::new("div"));
            let mut page = Page::with_policy(driver, fast_policy());
            assert!(!page.is_undisplayed("id=note").await.unwrap());
        }

        #[tokio::test]
        async fn test_long_timeout_restored_in_all_cases() {
            for hidden in [None, Some(false), Some(true)] {
                let mut driver = MockDriver::new();
                if let Some(hidden) = hidden {
                    let element = if hidden {
                        ElementHandle::new("div").hidden()
                    } else {
                        ElementHandle::new("div")
                    };
                    driver.add_element(locator("id=note"), element);
                }
                let mut page = Page::with_policy(driver, fast_policy());
                page.is_undisplayed("id=note").await.unwrap();
                // Short applied, then long restored, in that order.
                assert_eq!(page.driver().implicit_wait_log(), &[50, 200]);
                assert_eq!(
                    page.driver().implicit_wait(),
                    Duration::from_millis(200)
                );
            }
        }
    }

    mod alert_tests {
        use super::*;

        #[tokio::test]
        async fn test_accept_open_alert() {
            let mut driver = MockDriver::new();
            driver.open_alert("Done");
            let mut page = Page::with_policy(driver, fast_policy());
            assert_eq!(page.alert_text().await.unwrap(), "Done");
            page.accept_alert().await.unwrap();
            assert!(page.driver().was_called("accept_alert"));
        }

        #[tokio::test(start_paused = true)]
        async fn test_alert_wait_times_out() {
            let page = Page::with_policy(MockDriver::new(), fast_policy());
            let err = page.wait_for_alert().await.unwrap_err();
            assert!(matches!(err, ManejarError::Timeout { .. }));
        }

        #[tokio::test]
        async fn test_send_keys_to_prompt() {
            let mut driver = MockDriver::new();
            driver.open_alert("Name?");
            let mut page = Page::with_policy(driver, fast_policy());
            page.send_keys_to_alert("manejar").await.unwrap();
            assert!(page.driver().was_called("alert_text:manejar"));
        }
    }

    mod window_tests {
        use super::*;

        #[tokio::test]
        async fn test_switch_to_other_window_with_two_open() {
            let mut driver = MockDriver::new();
            driver.open_window("window-1", "Popup");
            let mut page = Page::new(driver);
            let parent = page.current_window().await.unwrap();
            page.switch_to_other_window(&parent).await.unwrap();
            assert_eq!(page.current_window().await.unwrap(), "window-1");
            // And back again.
            page.switch_to_other_window("window-1").await.unwrap();
            assert_eq!(page.current_window().await.unwrap(), "window-0");
        }

        #[tokio::test]
        async fn test_switch_to_other_window_fails_alone() {
            let mut page = Page::new(MockDriver::new());
            let err = page.switch_to_other_window("window-0").await.unwrap_err();
            assert!(matches!(err, ManejarError::WindowNotFound { .. }));
        }

        #[tokio::test]
        async fn test_switch_by_title_stops_at_first_match() {
            let mut driver = MockDriver::new();
            driver.set_title("Home");
            driver.open_window("window-1", "Checkout");
            driver.open_window("window-2", "Checkout");
            let mut page = Page::new(driver);
            page.switch_to_window_by_title("Checkout").await.unwrap();
            assert_eq!(page.current_window().await.unwrap(), "window-1");
        }

        #[tokio::test]
        async fn test_switch_by_title_missing_fails() {
            let mut page = Page::new(MockDriver::new());
            assert!(page.switch_to_window_by_title("Nowhere").await.is_err());
        }

        #[tokio::test]
        async fn test_close_other_windows_keeps_parent() {
            let mut driver = MockDriver::new();
            driver.open_window("window-1", "Popup A");
            driver.open_window("window-2", "Popup B");
            let mut page = Page::new(driver);
            page.close_other_windows("window-0").await.unwrap();
            assert_eq!(
                page.driver().history().iter().filter(|c| c.starts_with("close_window")).count(),
                2
            );
            assert_eq!(page.current_window().await.unwrap(), "window-0");
        }
    }

    mod frame_tests {
        use super::*;

        #[tokio::test]
        async fn test_switch_to_frame_and_back() {
            let mut driver = MockDriver::new();
            driver.add_element(locator("id=payment"), ElementHandle::new("iframe"));
            let mut page = Page::new(driver);
            page.switch_to_frame("id=payment").await.unwrap();
            assert!(page.driver().was_called("switch_frame:id=payment"));
            page.switch_to_default_content().await.unwrap();
            assert!(page.driver().was_called("default_content"));
        }

        #[tokio::test]
        async fn test_switch_to_missing_frame_fails() {
            let mut page = Page::new(MockDriver::new());
            let err = page.switch_to_frame("id=ghost").await.unwrap_err();
            assert!(matches!(err, ManejarError::ElementNotFound { .. }));
        }
    }

    mod custom_dropdown_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_selects_matching_option() {
            let mut driver = MockDriver::new();
            driver.add_element(locator("css=.dropdown"), ElementHandle::new("div"));
            for label in ["Hanoi", "Da Nang", "Saigon"] {
                driver.add_element(
                    locator("css=.dropdown li"),
                    ElementHandle::new("li").with_text(label),
                );
            }
            let mut page = Page::with_policy(driver, fast_policy());
            page.select_custom_dropdown("css=.dropdown", "css=.dropdown li", "Saigon")
                .await
                .unwrap();
            assert!(page.driver().was_called("scroll_into_view:css=.dropdown li:2"));
            assert!(page.driver().was_called("click_index:css=.dropdown li:2"));
        }

        #[tokio::test(start_paused = true)]
        async fn test_no_match_is_silent_noop() {
            let mut driver = MockDriver::new();
            driver.add_element(locator("css=.dropdown"), ElementHandle::new("div"));
            driver.add_element(
                locator("css=.dropdown li"),
                ElementHandle::new("li").with_text("Hanoi"),
            );
            let mut page = Page::with_policy(driver, fast_policy());
            page.select_custom_dropdown("css=.dropdown", "css=.dropdown li", "Hue")
                .await
                .unwrap();
            assert_eq!(page.driver().count_calls("click_index:"), 0);
        }
    }

    mod navigation_tests {
        use super::*;

        #[tokio::test]
        async fn test_open_url_and_read_back() {
            let mut page = Page::new(MockDriver::new());
            page.open_url("https://demo.nopcommerce.com/").await.unwrap();
            assert_eq!(
                page.current_url().await.unwrap(),
                "https://demo.nopcommerce.com/"
            );
        }

        #[tokio::test]
        async fn test_cookie_round_trip() {
            let mut page = Page::new(MockDriver::new());
            page.add_cookies(&[Cookie::new("session", "abc123")])
                .await
                .unwrap();
            assert_eq!(page.cookies().await.unwrap().len(), 1);
            page.delete_cookies().await.unwrap();
            assert!(page.cookies().await.unwrap().is_empty());
        }
    }
}
