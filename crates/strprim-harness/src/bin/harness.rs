//! CLI entrypoint for the strprim conformance harness.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use strprim_harness::capture;
use strprim_harness::fixtures::load_fixture_sets;
use strprim_harness::structured_log::{
    ArtifactIndex, LogEmitter, LogEntry, LogLevel, Outcome, StreamKind, now_utc, validate_log_file,
};
use strprim_harness::verify::VerificationSummary;
use strprim_harness::{ConformanceReport, TestRunner};

/// Conformance tooling for strprim.
#[derive(Debug, Parser)]
#[command(name = "strprim-harness")]
#[command(about = "Conformance testing harness for strprim")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Capture host libc behavior as fixture files.
    Capture {
        /// Output directory for fixture JSON files.
        #[arg(long)]
        output: PathBuf,
        /// Function family to capture (e.g., "string").
        #[arg(long, default_value = "string")]
        family: String,
    },
    /// Verify our implementation against captured fixtures.
    Verify {
        /// Fixture JSON file, or a directory of them.
        #[arg(long)]
        fixture: PathBuf,
        /// Output report path (markdown); a JSON twin is written beside it.
        #[arg(long)]
        report: Option<PathBuf>,
        /// Structured JSONL log output path.
        #[arg(long)]
        log: Option<PathBuf>,
        /// Artifact index output path (requires --report or --log).
        #[arg(long)]
        artifact_index: Option<PathBuf>,
        /// Optional fixed timestamp string for deterministic report generation.
        #[arg(long)]
        timestamp: Option<String>,
    },
    /// Validate a structured JSONL log file.
    ValidateLog {
        /// JSONL log path.
        #[arg(long)]
        log: PathBuf,
    },
    /// Print the message for each error code.
    Strerror {
        /// Error codes to describe.
        #[arg(required = true, allow_negative_numbers = true)]
        codes: Vec<i32>,
    },
}

const CAMPAIGN: &str = "fixture-verify";

fn ensure_parent(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Capture { output, family } => {
            eprintln!("Capturing {family} fixtures to {}", output.display());
            std::fs::create_dir_all(&output)?;
            let set = capture::capture_family(&family, &now_utc())?;
            let path = output.join(format!("{family}_host.v1.json"));
            std::fs::write(&path, set.to_json()?)?;
            eprintln!("Captured {} cases to {}", set.cases.len(), path.display());
        }
        Command::Verify {
            fixture,
            report,
            log,
            artifact_index,
            timestamp,
        } => {
            eprintln!("Verifying against fixtures in {}", fixture.display());
            let fixture_sets = load_fixture_sets(&fixture)?;
            let run_id = timestamp.clone().unwrap_or_else(now_utc);

            let mut emitter = match &log {
                Some(path) => {
                    ensure_parent(path)?;
                    Some(LogEmitter::to_file(path, CAMPAIGN, &run_id)?)
                }
                None => None,
            };

            let mut results = Vec::new();
            for mode in ["strict", "hardened"] {
                let runner = TestRunner::new(CAMPAIGN, mode);
                for set in &fixture_sets {
                    match emitter.as_mut() {
                        Some(emitter) => results.extend(runner.run_logged(set, emitter)?),
                        None => results.extend(runner.run(set)),
                    }
                }
            }

            // Stabilize report ordering for reproducible golden-output hashing.
            let mut summary = VerificationSummary::from_results(results);
            summary.sort();
            let report_doc = ConformanceReport {
                title: String::from("strprim Conformance Report"),
                mode: String::from("strict+hardened"),
                timestamp: timestamp.unwrap_or_else(now_utc),
                summary,
            };

            eprintln!(
                "Verification complete: total={}, passed={}, failed={}",
                report_doc.summary.total, report_doc.summary.passed, report_doc.summary.failed
            );

            let mut artifacts = Vec::new();
            if let Some(report_path) = &report {
                eprintln!("Writing report to {}", report_path.display());
                ensure_parent(report_path)?;
                std::fs::write(report_path, report_doc.to_markdown())?;
                let json_path = report_path.with_extension("json");
                std::fs::write(&json_path, report_doc.to_json())?;
                artifacts.push((report_path.clone(), "report"));
                artifacts.push((json_path, "report"));
            }

            if let Some(emitter) = emitter.as_mut() {
                let outcome = if report_doc.summary.all_passed() {
                    Outcome::Pass
                } else {
                    Outcome::Fail
                };
                let refs = artifacts
                    .iter()
                    .map(|(path, _)| path.display().to_string())
                    .collect();
                emitter.emit_entry(
                    LogEntry::new(String::new(), LogLevel::Info, "verify_summary")
                        .with_stream(StreamKind::Conformance)
                        .with_outcome(outcome)
                        .with_artifacts(refs)
                        .with_details(serde_json::json!({
                            "total": report_doc.summary.total,
                            "passed": report_doc.summary.passed,
                            "failed": report_doc.summary.failed,
                        })),
                )?;
                emitter.flush()?;
            }
            if let Some(log_path) = &log {
                artifacts.push((log_path.clone(), "log"));
            }

            if let Some(index_path) = artifact_index {
                if artifacts.is_empty() {
                    return Err("--artifact-index needs --report or --log".into());
                }
                let mut index = ArtifactIndex::new(&run_id, CAMPAIGN);
                for (path, kind) in &artifacts {
                    index.add_file(path, *kind)?;
                }
                ensure_parent(&index_path)?;
                std::fs::write(&index_path, index.to_json()?)?;
                eprintln!("Wrote artifact index to {}", index_path.display());
            }

            if !report_doc.summary.all_passed() {
                for failure in report_doc.summary.failures() {
                    eprintln!(
                        "FAIL {} ({}): expected {:?} errno {}, got {:?} errno {}",
                        failure.case_name,
                        failure.symbol,
                        failure.expected,
                        failure.expected_errno,
                        failure.actual,
                        failure.actual_errno
                    );
                }
                return Err("Conformance verification failed".into());
            }
        }
        Command::ValidateLog { log } => {
            let (lines, errors) = validate_log_file(&log)?;
            for err in &errors {
                eprintln!("{err}");
            }
            if !errors.is_empty() {
                return Err(format!("{} invalid entries in {}", errors.len(), log.display()).into());
            }
            eprintln!("{} valid log lines in {}", lines, log.display());
        }
        Command::Strerror { codes } => {
            for code in codes {
                println!("{code}: {}", strprim_core::string::strerror(code));
            }
        }
    }

    Ok(())
}
