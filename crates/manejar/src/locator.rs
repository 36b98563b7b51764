//! Locator resolution: prefixed locator strings into typed (strategy, selector) pairs.
//!
//! A locator string has the form `"<prefix>=<rest>"` where the prefix picks the
//! lookup strategy (`xpath`, `css`, `id`, `name`, `class`, `tagName`,
//! case-insensitive) and `<rest>` passes verbatim to that strategy. Exactly one
//! prefix must match; an unrecognized prefix is a configuration error, never a
//! fallback to a default strategy.
//!
//! Locator strings may carry `%s` positional placeholders which are substituted
//! from caller-supplied arguments *before* prefix resolution.

use serde::{Deserialize, Serialize};

use crate::result::{ManejarError, ManejarResult};

/// Lookup strategy for locating elements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strategy {
    /// XPath expression
    XPath,
    /// CSS selector
    Css,
    /// Element id attribute
    Id,
    /// Element name attribute
    Name,
    /// Element class attribute
    Class,
    /// Element tag name
    TagName,
}

impl Strategy {
    /// All strategies in their fixed prefix-checking order
    pub const ALL: [Self; 6] = [
        Self::XPath,
        Self::Css,
        Self::Id,
        Self::Name,
        Self::Class,
        Self::TagName,
    ];

    /// The locator-string prefix keyword for this strategy
    #[must_use]
    pub const fn prefix(&self) -> &'static str {
        match self {
            Self::XPath => "xpath",
            Self::Css => "css",
            Self::Id => "id",
            Self::Name => "name",
            Self::Class => "class",
            Self::TagName => "tagName",
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.prefix())
    }
}

/// A resolved locator: immutable (strategy, selector) pair
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locator {
    strategy: Strategy,
    selector: String,
}

impl Locator {
    /// Create a locator directly from a strategy and selector value
    #[must_use]
    pub fn new(strategy: Strategy, selector: impl Into<String>) -> Self {
        Self {
            strategy,
            selector: selector.into(),
        }
    }

    /// Resolve a prefixed locator string.
    ///
    /// Prefixes are checked in the fixed order of [`Strategy::ALL`],
    /// case-insensitively on the keyword. The remainder after `=` becomes the
    /// selector value, verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`ManejarError::InvalidLocator`] when no recognized prefix
    /// matches.
    pub fn parse(raw: &str) -> ManejarResult<Self> {
        for strategy in Strategy::ALL {
            let prefix = strategy.prefix();
            if raw.len() > prefix.len()
                && raw.as_bytes()[prefix.len()] == b'='
                && raw[..prefix.len()].eq_ignore_ascii_case(prefix)
            {
                return Ok(Self {
                    strategy,
                    selector: raw[prefix.len() + 1..].to_string(),
                });
            }
        }
        Err(ManejarError::InvalidLocator {
            locator: raw.to_string(),
        })
    }

    /// Resolve a locator template after `%s` positional substitution.
    ///
    /// # Errors
    ///
    /// Returns [`ManejarError::PlaceholderMismatch`] when the placeholder and
    /// argument counts differ, or [`ManejarError::InvalidLocator`] when the
    /// formatted string carries no recognized prefix.
    pub fn parse_with(template: &str, args: &[&str]) -> ManejarResult<Self> {
        Self::parse(&format_template(template, args)?)
    }

    /// The lookup strategy
    #[must_use]
    pub const fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// The selector value (prefix stripped)
    #[must_use]
    pub fn selector(&self) -> &str {
        &self.selector
    }

    /// Lower non-XPath strategies to an equivalent CSS selector.
    ///
    /// Returns `None` for XPath locators, which have no CSS form.
    #[must_use]
    pub fn css_selector(&self) -> Option<String> {
        match self.strategy {
            Strategy::XPath => None,
            Strategy::Css => Some(self.selector.clone()),
            Strategy::Id => Some(format!("[id={:?}]", self.selector)),
            Strategy::Name => Some(format!("[name={:?}]", self.selector)),
            Strategy::Class => Some(format!("[class~={:?}]", self.selector)),
            Strategy::TagName => Some(self.selector.clone()),
        }
    }

    /// JavaScript expression selecting the first matching element under `root`
    /// (an expression evaluating to a document or element, e.g. `"document"`).
    #[must_use]
    pub fn to_query_in(&self, root: &str) -> String {
        self.css_selector().map_or_else(
            || {
                format!(
                    "{root}.evaluate({:?}, {root}, null, XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue",
                    self.selector
                )
            },
            |css| format!("{root}.querySelector({css:?})"),
        )
    }

    /// JavaScript expression selecting the first matching element in the page
    #[must_use]
    pub fn to_query(&self) -> String {
        self.to_query_in("document")
    }

    /// JavaScript expression producing an array of all matching elements under `root`
    #[must_use]
    pub fn to_query_all_in(&self, root: &str) -> String {
        self.css_selector().map_or_else(
            || {
                format!(
                    "(() => {{ const r = {root}.evaluate({:?}, {root}, null, \
                     XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null); const out = []; \
                     for (let i = 0; i < r.snapshotLength; i++) out.push(r.snapshotItem(i)); \
                     return out; }})()",
                    self.selector
                )
            },
            |css| format!("Array.from({root}.querySelectorAll({css:?}))"),
        )
    }

    /// JavaScript expression producing an array of all matching elements in the page
    #[must_use]
    pub fn to_query_all(&self) -> String {
        self.to_query_all_in("document")
    }

    /// JavaScript expression counting matching elements in the page
    #[must_use]
    pub fn to_count_query(&self) -> String {
        format!("{}.length", self.to_query_all())
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.strategy, self.selector)
    }
}

/// Substitute `%s` placeholders in a locator template positionally.
///
/// `%%` escapes a literal percent sign; any other `%` sequence passes through
/// verbatim. The placeholder count must match the argument count exactly.
///
/// # Errors
///
/// Returns [`ManejarError::PlaceholderMismatch`] on a count mismatch.
pub fn format_template(template: &str, args: &[&str]) -> ManejarResult<String> {
    let mut out = String::with_capacity(template.len());
    let mut used = 0;
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.peek() {
            Some('s') => {
                chars.next();
                match args.get(used) {
                    Some(arg) => out.push_str(arg),
                    None => {
                        return Err(mismatch(template, args));
                    }
                }
                used += 1;
            }
            Some('%') => {
                chars.next();
                out.push('%');
            }
            _ => out.push('%'),
        }
    }
    if used != args.len() {
        return Err(mismatch(template, args));
    }
    Ok(out)
}

fn mismatch(template: &str, args: &[&str]) -> ManejarError {
    let placeholders = count_placeholders(template);
    ManejarError::PlaceholderMismatch {
        template: template.to_string(),
        placeholders,
        supplied: args.len(),
    }
}

fn count_placeholders(template: &str) -> usize {
    let mut count = 0;
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '%' {
            match chars.peek() {
                Some('s') => {
                    chars.next();
                    count += 1;
                }
                Some('%') => {
                    chars.next();
                }
                _ => {}
            }
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    mod parse_tests {
        use super::*;

        #[test]
        fn test_parse_all_prefixes() {
            let cases = [
                ("xpath=//div", Strategy::XPath, "//div"),
                ("css=button.primary", Strategy::Css, "button.primary"),
                ("id=submit-btn", Strategy::Id, "submit-btn"),
                ("name=email", Strategy::Name, "email"),
                ("class=active", Strategy::Class, "active"),
                ("tagName=input", Strategy::TagName, "input"),
            ];
            for (raw, strategy, selector) in cases {
                let locator = Locator::parse(raw).unwrap();
                assert_eq!(locator.strategy(), strategy, "prefix of {raw}");
                assert_eq!(locator.selector(), selector, "selector of {raw}");
            }
        }

        #[test]
        fn test_parse_case_insensitive_prefix() {
            for raw in ["XPATH=//div", "Xpath=//div", "xPath=//div", "xpAtH=//div"] {
                let locator = Locator::parse(raw).unwrap();
                assert_eq!(locator.strategy(), Strategy::XPath);
                assert_eq!(locator.selector(), "//div");
            }
            let locator = Locator::parse("TAGNAME=input").unwrap();
            assert_eq!(locator.strategy(), Strategy::TagName);
        }

        #[test]
        fn test_parse_unrecognized_prefix_is_hard_error() {
            for raw in ["link=home", "partial=text", "//div", "", "id", "id:x"] {
                let err = Locator::parse(raw).unwrap_err();
                assert!(
                    matches!(err, ManejarError::InvalidLocator { .. }),
                    "expected InvalidLocator for {raw:?}"
                );
            }
        }

        #[test]
        fn test_parse_selector_passes_verbatim() {
            let locator = Locator::parse("xpath=//a[contains(@href, '=')]").unwrap();
            assert_eq!(locator.selector(), "//a[contains(@href, '=')]");
        }

        #[test]
        fn test_parse_empty_selector_allowed() {
            let locator = Locator::parse("css=").unwrap();
            assert_eq!(locator.selector(), "");
        }

        #[test]
        fn test_display_round_trips() {
            let locator = Locator::parse("id=submit-btn").unwrap();
            assert_eq!(locator.to_string(), "id=submit-btn");
        }
    }

    mod template_tests {
        use super::*;

        #[test]
        fn test_dynamic_button_locator() {
            let locator =
                Locator::parse_with("XPATH=//button[text()='%s']", &["OK"]).unwrap();
            assert_eq!(locator.strategy(), Strategy::XPath);
            assert_eq!(locator.selector(), "//button[text()='OK']");
        }

        #[test]
        fn test_multiple_placeholders_in_order() {
            let formatted =
                format_template("xpath=//tr[%s]/td[%s]", &["2", "3"]).unwrap();
            assert_eq!(formatted, "xpath=//tr[2]/td[3]");
        }

        #[test]
        fn test_too_few_arguments_fails() {
            let err = Locator::parse_with("xpath=//a[text()='%s']", &[]).unwrap_err();
            assert!(matches!(err, ManejarError::PlaceholderMismatch { .. }));
        }

        #[test]
        fn test_too_many_arguments_fails() {
            let err =
                Locator::parse_with("xpath=//a[text()='%s']", &["a", "b"]).unwrap_err();
            assert!(matches!(
                err,
                ManejarError::PlaceholderMismatch {
                    placeholders: 1,
                    supplied: 2,
                    ..
                }
            ));
        }

        #[test]
        fn test_percent_escape() {
            let formatted = format_template("css=div[width='100%%']", &[]).unwrap();
            assert_eq!(formatted, "css=div[width='100%']");
        }

        #[test]
        fn test_lone_percent_passes_through() {
            let formatted = format_template("css=a%b", &[]).unwrap();
            assert_eq!(formatted, "css=a%b");
        }

        #[test]
        fn test_substitution_happens_before_resolution() {
            // The strategy prefix itself can come from substitution.
            let locator = Locator::parse_with("%s=//div", &["xpath"]).unwrap();
            assert_eq!(locator.strategy(), Strategy::XPath);
        }
    }

    mod query_tests {
        use super::*;

        #[test]
        fn test_css_lowering() {
            assert_eq!(
                Locator::parse("id=submit").unwrap().css_selector().unwrap(),
                "[id=\"submit\"]"
            );
            assert_eq!(
                Locator::parse("name=email").unwrap().css_selector().unwrap(),
                "[name=\"email\"]"
            );
            assert_eq!(
                Locator::parse("class=active").unwrap().css_selector().unwrap(),
                "[class~=\"active\"]"
            );
            assert_eq!(
                Locator::parse("tagName=input").unwrap().css_selector().unwrap(),
                "input"
            );
            assert!(Locator::parse("xpath=//div").unwrap().css_selector().is_none());
        }

        #[test]
        fn test_css_query() {
            let query = Locator::parse("css=button.primary").unwrap().to_query();
            assert!(query.contains("querySelector"));
            assert!(query.contains("button.primary"));
        }

        #[test]
        fn test_xpath_query() {
            let query = Locator::parse("xpath=//button[@id='x']").unwrap().to_query();
            assert!(query.contains("evaluate"));
            assert!(query.contains("FIRST_ORDERED_NODE_TYPE"));
        }

        #[test]
        fn test_xpath_query_all_collects_snapshot() {
            let query = Locator::parse("xpath=//li").unwrap().to_query_all();
            assert!(query.contains("ORDERED_NODE_SNAPSHOT_TYPE"));
            assert!(query.contains("snapshotItem"));
        }

        #[test]
        fn test_count_query() {
            let query = Locator::parse("css=li").unwrap().to_count_query();
            assert!(query.ends_with(".length"));
        }

        #[test]
        fn test_query_in_custom_root() {
            let query = Locator::parse("css=span")
                .unwrap()
                .to_query_in("frameDoc");
            assert!(query.starts_with("frameDoc.querySelector"));
        }
    }
}
