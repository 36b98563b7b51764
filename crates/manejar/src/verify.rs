//! Verification recording: soft checks that log their outcome and accumulate
//! failures instead of aborting the test at the first mismatch.
//!
//! A test obtains a [`Verifier`] scoped to its name, runs any number of
//! checks, and asserts once at the end that the log is clean. Every check
//! emits a PASSED or FAILED event through `tracing` as it runs.

use std::fmt::Debug;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

/// One recorded verification failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationFailure {
    /// Test case the failure belongs to
    pub test_case: String,
    /// Description of the failed check
    pub message: String,
}

/// Accumulated verification results, shared across the checks of a test run.
///
/// Failures are appended in check order and never dropped until
/// [`VerificationLog::clear`].
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct VerificationLog {
    passed: usize,
    failures: Vec<VerificationFailure>,
}

impl VerificationLog {
    /// Create an empty log
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start recording checks under a test-case name
    pub fn verifier(&mut self, test_case: impl Into<String>) -> Verifier<'_> {
        Verifier {
            log: self,
            test_case: test_case.into(),
        }
    }

    /// Number of checks that passed
    #[must_use]
    pub const fn passed_count(&self) -> usize {
        self.passed
    }

    /// All recorded failures, in check order
    #[must_use]
    pub fn failures(&self) -> &[VerificationFailure] {
        &self.failures
    }

    /// Failures recorded under one test case
    pub fn failures_for<'a>(
        &'a self,
        test_case: &'a str,
    ) -> impl Iterator<Item = &'a VerificationFailure> + 'a {
        self.failures.iter().filter(move |f| f.test_case == test_case)
    }

    /// Whether no check has failed
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Summarize the checks recorded under one test case
    #[must_use]
    pub fn outcome(&self, test_case: &str) -> TestOutcome {
        let failure_messages: Vec<String> = self
            .failures_for(test_case)
            .map(|f| f.message.clone())
            .collect();
        TestOutcome {
            test_case: test_case.to_string(),
            failed: failure_messages.len(),
            failure_messages,
        }
    }

    /// Discard every recorded result
    pub fn clear(&mut self) {
        self.passed = 0;
        self.failures.clear();
    }

    fn record(&mut self, test_case: &str, passed: bool, message: &str) {
        if passed {
            self.passed += 1;
            info!(test = test_case, message, "PASSED");
        } else {
            error!(test = test_case, message, "FAILED");
            self.failures.push(VerificationFailure {
                test_case: test_case.to_string(),
                message: message.to_string(),
            });
        }
    }
}

/// Check recorder scoped to one test case.
///
/// Every method returns the check's boolean outcome so callers can branch on
/// it; the result is recorded either way.
#[derive(Debug)]
pub struct Verifier<'a> {
    log: &'a mut VerificationLog,
    test_case: String,
}

impl Verifier<'_> {
    /// Record whether `condition` holds
    pub fn verify_true(&mut self, condition: bool, message: &str) -> bool {
        self.log.record(&self.test_case, condition, message);
        condition
    }

    /// Record whether `condition` does not hold
    pub fn verify_false(&mut self, condition: bool, message: &str) -> bool {
        self.log.record(&self.test_case, !condition, message);
        !condition
    }

    /// Record whether `actual` equals `expected`, capturing both values in
    /// the failure message
    pub fn verify_eq<T: PartialEq + Debug>(
        &mut self,
        actual: &T,
        expected: &T,
        message: &str,
    ) -> bool {
        let passed = actual == expected;
        if passed {
            self.log.record(&self.test_case, true, message);
        } else {
            let detail =
                format!("{message} (expected {expected:?}, got {actual:?})");
            self.log.record(&self.test_case, false, &detail);
        }
        passed
    }

    /// The test case this verifier records under
    #[must_use]
    pub fn test_case(&self) -> &str {
        &self.test_case
    }
}

/// Serializable summary of one test case's checks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestOutcome {
    /// Test case name
    pub test_case: String,
    /// Number of failed checks
    pub failed: usize,
    /// Messages of the failed checks, in check order
    pub failure_messages: Vec<String>,
}

impl TestOutcome {
    /// Whether every check under this test case passed
    #[must_use]
    pub const fn is_passed(&self) -> bool {
        self.failed == 0
    }
}
