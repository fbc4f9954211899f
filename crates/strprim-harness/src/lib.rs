//! Conformance testing harness for strprim.
//!
//! This crate provides:
//! - Fixture capture: record host libc behavior as JSON reference data
//! - Fixture verify: compare our implementation against captured fixtures
//! - Structured logs: JSONL evidence lines and artifact indexes
//! - Report generation: human-readable + machine-readable conformance reports

#![deny(unsafe_code)]

pub mod capture;
pub mod diff;
pub mod exec;
pub mod fixtures;
pub mod report;
pub mod runner;
pub mod structured_log;
pub mod verify;

pub use exec::execute_fixture_case;
pub use fixtures::{FixtureCase, FixtureSet};
pub use report::ConformanceReport;
pub use runner::TestRunner;
pub use verify::VerificationResult;
