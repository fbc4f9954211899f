//! Integration test: structured logging contract
//!
//! Validates that:
//! 1. LogEmitter writes JSONL that passes validation, with sequenced trace ids.
//! 2. The validator catches missing fields and invalid enum values.
//! 3. ArtifactIndex serializes correctly and hashes files.
//! 4. A logged fixture run produces one valid line per case.
//!
//! Run: cargo test -p strprim-harness --test structured_log_test

use strprim_harness::FixtureSet;
use strprim_harness::TestRunner;
use strprim_harness::structured_log::{
    ArtifactIndex, LogEmitter, LogEntry, LogLevel, Outcome, StreamKind, sha256_hex,
    validate_log_file, validate_log_line,
};

#[test]
fn emitter_writes_valid_jsonl() {
    let dir = std::env::temp_dir().join(format!("strprim_log_test_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let log_path = dir.join("test_output.jsonl");

    {
        let mut emitter = LogEmitter::to_file(&log_path, "log-contract", "run-integ").unwrap();
        emitter.emit(LogLevel::Info, "test_start").unwrap();
        emitter
            .emit_entry(
                LogEntry::new("", LogLevel::Info, "validation_pass")
                    .with_stream(StreamKind::Unit)
                    .with_mode("strict")
                    .with_api("string", "memcpy")
                    .with_outcome(Outcome::Pass)
                    .with_latency_ns(15),
            )
            .unwrap();
        emitter.emit(LogLevel::Info, "test_end").unwrap();
        emitter.flush().unwrap();
    }

    let (line_count, errors) = validate_log_file(&log_path).unwrap();
    assert_eq!(line_count, 3, "Expected 3 log lines");
    assert!(
        errors.is_empty(),
        "Emitter output should validate: {:?}",
        errors
    );

    let content = std::fs::read_to_string(&log_path).unwrap();
    let lines: Vec<serde_json::Value> = content
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert!(lines[0]["trace_id"].as_str().unwrap().ends_with("::001"));
    assert!(lines[1]["trace_id"].as_str().unwrap().ends_with("::002"));
    assert!(lines[2]["trace_id"].as_str().unwrap().ends_with("::003"));
    assert_eq!(lines[1]["symbol"], "memcpy");

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn validation_catches_missing_fields() {
    // Missing trace_id
    let line = r#"{"timestamp":"2026-01-01T00:00:00Z","level":"info","event":"test"}"#;
    let errors = validate_log_line(line, 1).unwrap_err();
    assert!(errors.iter().any(|e| e.field == "trace_id"));

    // Missing timestamp
    let line = r#"{"trace_id":"a::b::c","level":"info","event":"test"}"#;
    let errors = validate_log_line(line, 2).unwrap_err();
    assert!(errors.iter().any(|e| e.field == "timestamp"));

    // Missing both level and event
    let line = r#"{"timestamp":"2026-01-01T00:00:00Z","trace_id":"a::b::c"}"#;
    let errors = validate_log_line(line, 3).unwrap_err();
    assert!(errors.len() >= 2);
}

#[test]
fn validation_catches_invalid_enums() {
    let line = r#"{"timestamp":"T","trace_id":"a::b::c","level":"critical","event":"e"}"#;
    assert!(validate_log_line(line, 1).is_err());

    let line =
        r#"{"timestamp":"T","trace_id":"a::b::c","level":"info","event":"e","mode":"turbo"}"#;
    assert!(validate_log_line(line, 2).is_err());

    let line =
        r#"{"timestamp":"T","trace_id":"a::b::c","level":"info","event":"e","outcome":"maybe"}"#;
    assert!(validate_log_line(line, 3).is_err());

    let line =
        r#"{"timestamp":"T","trace_id":"a::b::c","level":"info","event":"e","stream":"radio"}"#;
    assert!(validate_log_line(line, 4).is_err());
}

#[test]
fn validation_rejects_flat_trace_ids() {
    let line = r#"{"timestamp":"T","trace_id":"run-7","level":"info","event":"e"}"#;
    let errors = validate_log_line(line, 1).unwrap_err();
    assert_eq!(errors[0].field, "trace_id");
}

#[test]
fn valid_log_line_accepts_full_entry() {
    let line = r#"{"timestamp":"2026-02-11T00:00:00Z","trace_id":"fixture-verify::run-1::005","level":"warn","event":"fixture_case","campaign":"fixture-verify","stream":"conformance","mode":"hardened","family":"string/core","symbol":"strcpy","healing_action":"TruncateWithNull","outcome":"pass","errno":0,"latency_ns":150,"artifact_refs":["reports/conformance.md"],"details":{"case":"strcpy_overflow [hardened]"}}"#;
    let entry = validate_log_line(line, 1).unwrap();
    assert_eq!(entry.healing_action.as_deref(), Some("TruncateWithNull"));
    assert_eq!(entry.outcome, Some(Outcome::Pass));
}

#[test]
fn artifact_index_roundtrip() {
    let mut idx = ArtifactIndex::new("run-001", "fixture-verify");
    idx.add("logs/test.jsonl", "log", "abc123def456");
    idx.add("reports/conformance.md", "report", "789abc");

    let json = idx.to_json().unwrap();
    let restored: ArtifactIndex = serde_json::from_str(&json).unwrap();

    assert_eq!(restored.index_version, 1);
    assert_eq!(restored.run_id, "run-001");
    assert_eq!(restored.campaign, "fixture-verify");
    assert_eq!(restored.artifacts.len(), 2);
    assert_eq!(restored.artifacts[0].kind, "log");
    assert_eq!(restored.artifacts[1].kind, "report");
}

#[test]
fn artifact_index_hashes_files() {
    let dir = std::env::temp_dir().join(format!("strprim_artifact_test_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("report.md");
    std::fs::write(&path, b"abc").unwrap();

    let mut idx = ArtifactIndex::new("run-002", "fixture-verify");
    idx.add_file(&path, "report").unwrap();
    assert_eq!(idx.artifacts[0].sha256, sha256_hex(b"abc"));
    assert_eq!(
        idx.artifacts[0].sha256,
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
    assert_eq!(idx.artifacts[0].size_bytes, Some(3));

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn logged_fixture_run_emits_one_line_per_case() {
    let set = FixtureSet::from_json(
        r#"{
            "version":"v1",
            "family":"string/core",
            "captured_at":"2026-02-09T00:00:00Z",
            "cases":[
                {"name":"len","function":"strlen","spec_section":"C11 7.24.6.3","inputs":{"s":"abc"},"expected_output":"3","expected_errno":0,"mode":"both"},
                {"name":"overflow","function":"strcpy","spec_section":"C11 7.24.2.3","inputs":{"src":"hello","dst_len":3},"expected_output":"[104, 101, 0]","expected_errno":0,"mode":"hardened"},
                {"name":"strict_only","function":"strlen","spec_section":"C11 7.24.6.3","inputs":{"s":"a"},"expected_output":"1","expected_errno":0,"mode":"strict"}
            ]
        }"#,
    )
    .unwrap();

    let mut emitter = LogEmitter::to_buffer("fixture-verify", "run-3");
    let results = TestRunner::new("fixture-verify", "hardened")
        .run_logged(&set, &mut emitter)
        .unwrap();
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r.passed));

    let text = String::from_utf8(emitter.buffered().unwrap().to_vec()).unwrap();
    let entries: Vec<LogEntry> = text
        .lines()
        .enumerate()
        .map(|(i, line)| validate_log_line(line, i + 1).unwrap())
        .collect();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[1].symbol.as_deref(), Some("strcpy"));
    assert_eq!(entries[1].healing_action.as_deref(), Some("TruncateWithNull"));
}
