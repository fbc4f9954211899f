use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use strprim_core::errno;
use strprim_core::string::guarded;
use strprim_membrane::{HealingAction, SafetyLevel};

#[derive(Clone, Copy)]
enum Op {
    Strcpy,
    Strncpy,
    Strcat,
    Strncat,
    Memcpy,
    Memset,
}

#[derive(Clone, Copy)]
struct Case {
    op: Op,
    dest: &'static [u8],
    src: &'static [u8],
    n: usize,
    strict_errno: i32,
    hardened_errno: i32,
    hardened_dest: &'static [u8],
    hardened_heal: &'static str,
}

struct Outcome {
    errno: i32,
    dest: Vec<u8>,
    heal: &'static str,
}

fn workspace_root() -> PathBuf {
    let manifest = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    manifest.parent().unwrap().parent().unwrap().to_path_buf()
}

fn op_name(op: Op) -> &'static str {
    match op {
        Op::Strcpy => "strcpy",
        Op::Strncpy => "strncpy",
        Op::Strcat => "strcat",
        Op::Strncat => "strncat",
        Op::Memcpy => "memcpy",
        Op::Memset => "memset",
    }
}

fn run(case: Case, level: SafetyLevel) -> Outcome {
    let mut dest = case.dest.to_vec();
    errno::set_errno(0);
    let result = match case.op {
        Op::Strcpy => guarded::strcpy(&mut dest, case.src, level),
        Op::Strncpy => guarded::strncpy(&mut dest, case.src, case.n, level),
        Op::Strcat => guarded::strcat(&mut dest, case.src, level),
        Op::Strncat => guarded::strncat(&mut dest, case.src, case.n, level),
        Op::Memcpy => guarded::memcpy(&mut dest, case.src, case.n, level),
        Op::Memset => guarded::memset(&mut dest, 0x2A, case.n, level),
    };
    let heal = match &result {
        Ok(out) => out.action.name(),
        Err(_) => HealingAction::None.name(),
    };
    Outcome {
        errno: errno::get_errno(),
        dest,
        heal,
    }
}

fn matrix_cases() -> Vec<Case> {
    vec![
        Case {
            op: Op::Strcpy,
            dest: b"\0\0\0\0\0\0",
            src: b"abc\0",
            n: 0,
            strict_errno: 0,
            hardened_errno: 0,
            hardened_dest: b"abc\0\0\0",
            hardened_heal: "None",
        },
        Case {
            op: Op::Strcpy,
            dest: b"\0\0\0",
            src: b"abcdef\0",
            n: 0,
            strict_errno: errno::ERANGE,
            hardened_errno: 0,
            hardened_dest: b"ab\0",
            hardened_heal: "TruncateWithNull",
        },
        Case {
            op: Op::Strncpy,
            dest: b"\xff\xff",
            src: b"xyz\0",
            n: 4,
            strict_errno: errno::ERANGE,
            hardened_errno: 0,
            hardened_dest: b"xy",
            hardened_heal: "ClampSize",
        },
        Case {
            op: Op::Strcat,
            dest: b"ab\0\0\0",
            src: b"cdef\0",
            n: 0,
            strict_errno: errno::ERANGE,
            hardened_errno: 0,
            hardened_dest: b"abcd\0",
            hardened_heal: "TruncateWithNull",
        },
        Case {
            op: Op::Strcat,
            dest: b"abc",
            src: b"d\0",
            n: 0,
            strict_errno: errno::EINVAL,
            hardened_errno: errno::EINVAL,
            hardened_dest: b"abc",
            hardened_heal: "None",
        },
        Case {
            op: Op::Strncat,
            dest: b"a\0\0\0\0",
            src: b"bcdef\0",
            n: 2,
            strict_errno: 0,
            hardened_errno: 0,
            hardened_dest: b"abc\0\0",
            hardened_heal: "None",
        },
        Case {
            op: Op::Memcpy,
            dest: b"\0\0\0",
            src: b"12345",
            n: 5,
            strict_errno: errno::ERANGE,
            hardened_errno: 0,
            hardened_dest: b"123",
            hardened_heal: "ClampSize",
        },
        Case {
            op: Op::Memset,
            dest: b"\0\0",
            src: b"",
            n: 9,
            strict_errno: errno::ERANGE,
            hardened_errno: 0,
            hardened_dest: b"**",
            hardened_heal: "ClampSize",
        },
    ]
}

#[test]
fn guarded_matrix_matches_expected_and_emits_structured_logs() {
    let root = workspace_root();
    let out_dir = root.join("target/conformance");
    fs::create_dir_all(&out_dir).expect("create target/conformance");

    let log_path = out_dir.join("guarded_contract_matrix.log.jsonl");

    let mut log_lines = Vec::new();
    let mut mismatches = Vec::new();

    for level in [SafetyLevel::Strict, SafetyLevel::Hardened] {
        for (idx, case) in matrix_cases().into_iter().enumerate() {
            let t0 = Instant::now();
            let got = run(case, level);
            let timing_ns = t0.elapsed().as_nanos();

            let ok = match level {
                SafetyLevel::Hardened => {
                    got.errno == case.hardened_errno
                        && got.dest == case.hardened_dest
                        && got.heal == case.hardened_heal
                }
                _ => got.errno == case.strict_errno && got.heal == "None",
            };
            if !ok {
                mismatches.push(format!(
                    "{}:{}#{} errno={} heal={} dest={:?}",
                    level,
                    op_name(case.op),
                    idx,
                    got.errno,
                    got.heal,
                    got.dest
                ));
            }

            log_lines.push(format!(
                "{{\"trace_id\":\"guarded-contract:{}:{}:{}\",\"mode\":\"{}\",\"symbol\":\"{}\",\"errno\":{},\"healing_action\":\"{}\",\"timing_ns\":{},\"status\":\"{}\"}}",
                level,
                op_name(case.op),
                idx,
                level,
                op_name(case.op),
                got.errno,
                got.heal,
                timing_ns,
                if ok { "ok" } else { "mismatch" }
            ));
        }
    }

    fs::write(&log_path, format!("{}\n", log_lines.join("\n"))).expect("write jsonl log");

    assert!(
        mismatches.is_empty(),
        "guarded matrix mismatch(es): {:?}",
        mismatches
    );
}

#[test]
fn strict_violations_leave_destination_untouched() {
    for case in matrix_cases() {
        if case.strict_errno == 0 {
            continue;
        }
        let got = run(case, SafetyLevel::Strict);
        assert_eq!(got.dest, case.dest, "{} modified its destination", op_name(case.op));
    }
}
