//! Test execution engine.

use std::time::Instant;

use crate::exec::execute_fixture_case;
use crate::fixtures::{FixtureCase, FixtureSet};
use crate::structured_log::{LogEmitter, LogEntry, LogLevel, Outcome, StreamKind};
use crate::verify::VerificationResult;
use crate::diff;

/// Runs a fixture set and collects verification results.
pub struct TestRunner {
    /// Name of the test campaign.
    pub campaign: String,
    /// Mode being tested (strict or hardened).
    pub mode: String,
}

impl TestRunner {
    /// Create a new test runner.
    #[must_use]
    pub fn new(campaign: impl Into<String>, mode: impl Into<String>) -> Self {
        Self {
            campaign: campaign.into(),
            mode: mode.into(),
        }
    }

    /// Run all fixtures in a set and return results.
    pub fn run(&self, fixture_set: &FixtureSet) -> Vec<VerificationResult> {
        fixture_set
            .cases
            .iter()
            .filter(|case| case.applies_to(&self.mode))
            .map(|case| self.verify_case(&fixture_set.family, case))
            .collect()
    }

    /// Like [`TestRunner::run`], emitting one structured log line per case.
    pub fn run_logged(
        &self,
        fixture_set: &FixtureSet,
        emitter: &mut LogEmitter,
    ) -> std::io::Result<Vec<VerificationResult>> {
        let mut results = Vec::new();
        for case in fixture_set.cases.iter().filter(|c| c.applies_to(&self.mode)) {
            let t0 = Instant::now();
            let result = self.verify_case(&fixture_set.family, case);
            let latency_ns = u64::try_from(t0.elapsed().as_nanos()).unwrap_or(u64::MAX);

            let (level, outcome) = if result.passed {
                (LogLevel::Info, Outcome::Pass)
            } else {
                (LogLevel::Error, Outcome::Fail)
            };
            let mut entry = LogEntry::new(String::new(), level, "fixture_case")
                .with_stream(StreamKind::Conformance)
                .with_mode(self.mode.to_ascii_lowercase())
                .with_api(&fixture_set.family, &case.function)
                .with_outcome(outcome)
                .with_errno(result.actual_errno)
                .with_latency_ns(latency_ns)
                .with_details(serde_json::json!({
                    "case": result.case_name,
                    "expected": result.expected,
                    "actual": result.actual,
                }));
            if let Some(action) = &result.healing_action {
                entry = entry.with_healing_action(action);
            }
            emitter.emit_entry(entry)?;
            results.push(result);
        }
        Ok(results)
    }

    fn verify_case(&self, family: &str, case: &FixtureCase) -> VerificationResult {
        // Fixture cases with mode=both execute under the runner's active mode.
        let case_name = if case.mode.eq_ignore_ascii_case("both") {
            format!("{} [{}]", case.name, self.mode)
        } else {
            case.name.clone()
        };

        let (actual, actual_errno, healing_action, diff) =
            match execute_fixture_case(&case.function, &case.inputs, &self.mode) {
                Ok(run) => {
                    let mut notes = Vec::new();
                    if run.output != case.expected_output {
                        notes.push(diff::render_diff(&case.expected_output, &run.output));
                    }
                    if run.errno != case.expected_errno {
                        notes.push(format!(
                            "errno mismatch: expected {}, got {}",
                            case.expected_errno, run.errno
                        ));
                    }
                    let diff = (!notes.is_empty()).then(|| notes.join("\n"));
                    (
                        run.output,
                        run.errno,
                        run.healing_action.map(str::to_string),
                        diff,
                    )
                }
                Err(err) => {
                    let actual = format!("unsupported:{err}");
                    let diff = Some(diff::render_diff(&case.expected_output, &actual));
                    (actual, -1, None, diff)
                }
            };

        VerificationResult {
            family: family.to_string(),
            symbol: case.function.clone(),
            mode: self.mode.clone(),
            case_name,
            spec_section: case.spec_section.clone(),
            passed: actual == case.expected_output && actual_errno == case.expected_errno,
            expected: case.expected_output.clone(),
            actual,
            expected_errno: case.expected_errno,
            actual_errno,
            healing_action,
            diff,
        }
    }
}
