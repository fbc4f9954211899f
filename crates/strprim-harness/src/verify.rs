//! Output comparison and verification.

use serde::{Deserialize, Serialize};

/// Result of verifying a single fixture case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationResult {
    /// Function family of the fixture set.
    pub family: String,
    /// Function under test.
    pub symbol: String,
    /// Mode the case ran under.
    pub mode: String,
    /// Name of the test case.
    pub case_name: String,
    /// POSIX/C spec section reference.
    pub spec_section: String,
    /// Whether the case passed.
    pub passed: bool,
    /// Expected output.
    pub expected: String,
    /// Actual output from our implementation.
    pub actual: String,
    pub expected_errno: i32,
    pub actual_errno: i32,
    /// Healing action applied, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub healing_action: Option<String>,
    /// Diff if the case failed.
    pub diff: Option<String>,
}

/// Aggregate verification summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationSummary {
    /// Total cases run.
    pub total: usize,
    /// Cases passed.
    pub passed: usize,
    /// Cases failed.
    pub failed: usize,
    /// Individual results.
    pub results: Vec<VerificationResult>,
}

impl VerificationSummary {
    /// Build a summary from a list of results.
    #[must_use]
    pub fn from_results(results: Vec<VerificationResult>) -> Self {
        let total = results.len();
        let passed = results.iter().filter(|r| r.passed).count();
        let failed = total - passed;
        Self {
            total,
            passed,
            failed,
            results,
        }
    }

    /// Returns true if all cases passed.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    /// Results that did not pass.
    pub fn failures(&self) -> impl Iterator<Item = &VerificationResult> {
        self.results.iter().filter(|r| !r.passed)
    }

    /// Sort results into a stable order for reproducible reports.
    pub fn sort(&mut self) {
        self.results.sort_by(|a, b| {
            a.family
                .cmp(&b.family)
                .then_with(|| a.symbol.cmp(&b.symbol))
                .then_with(|| a.mode.cmp(&b.mode))
                .then_with(|| a.case_name.cmp(&b.case_name))
        });
    }
}
