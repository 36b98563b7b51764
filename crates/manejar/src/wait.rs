//! Wait policy: the per-session short/long timeout pair and page-ready probes.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default long timeout for wait operations (30 seconds)
pub const DEFAULT_LONG_TIMEOUT_MS: u64 = 30_000;

/// Default short timeout used by the absence check (5 seconds)
pub const DEFAULT_SHORT_TIMEOUT_MS: u64 = 5_000;

/// Default polling interval (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Wait durations threaded through every facade wait operation.
///
/// One policy value is held per session; there is no per-call override. The
/// absence check temporarily applies [`WaitPolicy::short`] as the driver's
/// implicit wait and restores [`WaitPolicy::long`] afterwards, so absence
/// checks must not run concurrently against the same session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitPolicy {
    /// Long timeout in milliseconds, used by every blocking wait
    pub long_ms: u64,
    /// Short timeout in milliseconds, used by the absence check
    pub short_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            long_ms: DEFAULT_LONG_TIMEOUT_MS,
            short_ms: DEFAULT_SHORT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitPolicy {
    /// Create a policy with the default durations
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the long timeout in milliseconds
    #[must_use]
    pub const fn with_long(mut self, ms: u64) -> Self {
        self.long_ms = ms;
        self
    }

    /// Set the short timeout in milliseconds
    #[must_use]
    pub const fn with_short(mut self, ms: u64) -> Self {
        self.short_ms = ms;
        self
    }

    /// Set the polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, ms: u64) -> Self {
        self.poll_interval_ms = ms;
        self
    }

    /// Long timeout as a Duration
    #[must_use]
    pub const fn long(&self) -> Duration {
        Duration::from_millis(self.long_ms)
    }

    /// Short timeout as a Duration
    #[must_use]
    pub const fn short(&self) -> Duration {
        Duration::from_millis(self.short_ms)
    }

    /// Polling interval as a Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// JavaScript probe: `document.readyState` has reached `complete`
pub const READY_STATE_PROBE: &str = "document.readyState === 'complete'";

/// JavaScript probe: no jQuery requests in flight.
///
/// A page without jQuery counts as idle; the document ready-state probe still
/// gates page readiness on its own.
pub const JQUERY_IDLE_PROBE: &str =
    "window.jQuery == null || window.jQuery.active === 0";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = WaitPolicy::default();
        assert_eq!(policy.long(), Duration::from_secs(30));
        assert_eq!(policy.short(), Duration::from_secs(5));
        assert_eq!(policy.poll_interval(), Duration::from_millis(50));
    }

    #[test]
    fn test_builder_setters() {
        let policy = WaitPolicy::new()
            .with_long(10_000)
            .with_short(1_000)
            .with_poll_interval(25);
        assert_eq!(policy.long_ms, 10_000);
        assert_eq!(policy.short_ms, 1_000);
        assert_eq!(policy.poll_interval_ms, 25);
    }

    #[test]
    fn test_probes_are_expressions() {
        // Probes are bare expressions, not statements, so any JS-evaluating
        // driver can feed them to evaluate() directly.
        assert!(!READY_STATE_PROBE.contains("return"));
        assert!(!JQUERY_IDLE_PROBE.contains("return"));
    }
}
