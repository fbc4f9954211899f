//! Fixture execution against the strprim implementation.
//!
//! Decodes a fixture's JSON inputs, runs the named primitive under the
//! requested mode, and renders the result as a comparable string:
//!
//! - lengths and counts: decimal (`"5"`)
//! - positions: decimal index, or `"null"` when nothing was found
//! - comparisons: sign only (`"-1"`, `"0"`, `"1"`)
//! - mutated buffers: Rust debug form of the whole buffer (`"[97, 0, 0]"`)
//! - token sequences: JSON array with one entry per token, a string when the
//!   token is UTF-8 and a byte array otherwise (`["a",[128]]`)
//! - detected contract violations: `"error"`, with errno set accordingly

use serde_json::Value;
use strprim_core::StringError;
use strprim_core::string::{
    self, AsciiCaseFold, ByteOrder, CharRangePolicy, Guarded, TokenCursor, Tokenizer, guarded,
};
use strprim_membrane::SafetyLevel;
use thiserror::Error;

/// Functions [`execute_fixture_case`] understands.
pub const SUPPORTED_FUNCTIONS: &[&str] = &[
    "strlen", "strcpy", "strncpy", "strcat", "strncat", "strcmp", "strncmp", "strchr", "strrchr",
    "strstr", "strtok", "strtok_r", "memcpy", "memmove", "memset", "memcmp", "strdup", "strerror",
    "strspn", "strcspn", "strpbrk", "strcoll", "strxfrm",
];

/// Why a fixture case could not be executed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExecError {
    #[error("unsupported function '{0}'")]
    UnsupportedFunction(String),
    #[error("unsupported mode '{0}'")]
    UnsupportedMode(String),
    #[error("missing input '{0}'")]
    MissingInput(&'static str),
    #[error("input '{field}' must be {expected}")]
    InvalidInput {
        field: &'static str,
        expected: &'static str,
    },
}

/// Outcome of one fixture execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseExecution {
    pub output: String,
    pub errno: i32,
    /// Name of the healing action when hardened mode repaired the call.
    pub healing_action: Option<&'static str>,
}

impl CaseExecution {
    fn plain(output: String) -> Self {
        Self {
            output,
            errno: 0,
            healing_action: None,
        }
    }

    fn violation(err: StringError) -> Self {
        Self {
            output: String::from("error"),
            errno: err.errno(),
            healing_action: None,
        }
    }
}

/// Map a fixture mode name to a safety level.
pub fn parse_mode(mode: &str) -> Result<SafetyLevel, ExecError> {
    match mode.to_ascii_lowercase().as_str() {
        "strict" => Ok(SafetyLevel::Strict),
        "hardened" => Ok(SafetyLevel::Hardened),
        _ => Err(ExecError::UnsupportedMode(mode.to_string())),
    }
}

/// Execute one fixture case under `mode` (`strict` or `hardened`).
pub fn execute_fixture_case(
    function: &str,
    inputs: &Value,
    mode: &str,
) -> Result<CaseExecution, ExecError> {
    let level = parse_mode(mode)?;
    let run = match function {
        "strlen" => CaseExecution::plain(string::strlen(&bytes(inputs, "s")?).to_string()),
        "strcmp" => CaseExecution::plain(render_sign(string::strcmp(
            &bytes(inputs, "s1")?,
            &bytes(inputs, "s2")?,
        ))),
        "strncmp" => CaseExecution::plain(render_sign(string::strncmp(
            &bytes(inputs, "s1")?,
            &bytes(inputs, "s2")?,
            size(inputs, "n")?,
        ))),
        "strcoll" => {
            let (s1, s2) = (bytes(inputs, "s1")?, bytes(inputs, "s2")?);
            let result = match collation(inputs)? {
                Collation::Bytes => string::strcoll_with(&s1, &s2, &ByteOrder),
                Collation::AsciiCaseFold => string::strcoll_with(&s1, &s2, &AsciiCaseFold),
            };
            CaseExecution::plain(render_sign(result))
        }
        "strchr" | "strrchr" => {
            let s = bytes(inputs, "s")?;
            let c = int(inputs, "c")?;
            let policy = char_policy(inputs)?;
            let found = if function == "strchr" {
                string::strchr_code(&s, c, policy)
            } else {
                string::strrchr_code(&s, c, policy)
            };
            CaseExecution::plain(render_index(found))
        }
        "strstr" => CaseExecution::plain(render_index(string::strstr(
            &bytes(inputs, "haystack")?,
            &bytes(inputs, "needle")?,
        ))),
        "strspn" => CaseExecution::plain(
            string::strspn(&bytes(inputs, "s")?, &bytes(inputs, "set")?).to_string(),
        ),
        "strcspn" => CaseExecution::plain(
            string::strcspn(&bytes(inputs, "s")?, &bytes(inputs, "set")?).to_string(),
        ),
        "strpbrk" => CaseExecution::plain(render_index(string::strpbrk(
            &bytes(inputs, "s")?,
            &bytes(inputs, "set")?,
        ))),
        "memcmp" => match string::memcmp(&bytes(inputs, "a")?, &bytes(inputs, "b")?, size(inputs, "n")?) {
            Ok(result) => CaseExecution::plain(render_sign(result)),
            Err(err) => CaseExecution::violation(err),
        },
        "strcpy" => {
            let mut dest = dest_buffer(inputs)?;
            let src = bytes(inputs, "src")?;
            let result = guarded::strcpy(&mut dest, &src, level);
            buffer_outcome(result, &dest)
        }
        "strncpy" => {
            let mut dest = dest_buffer(inputs)?;
            let src = bytes(inputs, "src")?;
            let result = guarded::strncpy(&mut dest, &src, size(inputs, "n")?, level);
            buffer_outcome(result, &dest)
        }
        "strcat" => {
            let mut dest = dest_buffer(inputs)?;
            let src = bytes(inputs, "src")?;
            let result = guarded::strcat(&mut dest, &src, level);
            buffer_outcome(result, &dest)
        }
        "strncat" => {
            let mut dest = dest_buffer(inputs)?;
            let src = bytes(inputs, "src")?;
            let result = guarded::strncat(&mut dest, &src, size(inputs, "n")?, level);
            buffer_outcome(result, &dest)
        }
        "memcpy" => {
            let mut dest = dest_buffer(inputs)?;
            let src = bytes(inputs, "src")?;
            let result = guarded::memcpy(&mut dest, &src, size(inputs, "n")?, level);
            buffer_outcome(result, &dest)
        }
        "memmove" => {
            let mut buf = bytes(inputs, "buf")?;
            let result = guarded::memmove(
                &mut buf,
                size(inputs, "dest_off")?,
                size(inputs, "src_off")?,
                size(inputs, "n")?,
                level,
            );
            buffer_outcome(result, &buf)
        }
        "memset" => {
            let mut dest = dest_buffer(inputs)?;
            let result = guarded::memset(&mut dest, int(inputs, "c")?, size(inputs, "n")?, level);
            buffer_outcome(result, &dest)
        }
        "strdup" => match guarded::strdup(&bytes(inputs, "s")?, level) {
            Ok(out) => CaseExecution {
                output: render_bytes(&out.value),
                errno: 0,
                healing_action: healed_name(&out),
            },
            Err(err) => CaseExecution::violation(err),
        },
        "strtok" => {
            let mut s = bytes(inputs, "s")?;
            let delims = bytes(inputs, "delim")?;
            CaseExecution::plain(render_tokens(&tokenize_stateful(&mut s, &delims)))
        }
        "strtok_r" => {
            let mut s = bytes(inputs, "s")?;
            let delims = bytes(inputs, "delim")?;
            let mut cursor = TokenCursor::anchored();
            let mut tokens = Vec::new();
            while let Some(token) = string::strtok_r(&mut s, &delims, &mut cursor) {
                tokens.push(s[token.range()].to_vec());
            }
            CaseExecution::plain(render_tokens(&tokens))
        }
        "strerror" => CaseExecution::plain(string::strerror(int(inputs, "code")?).to_string()),
        "strxfrm" => {
            let mut dest = dest_buffer(inputs)?;
            let src = bytes(inputs, "src")?;
            let n = size(inputs, "n")?;
            let result = match collation(inputs)? {
                Collation::Bytes => string::strxfrm_with(&mut dest, &src, n, &ByteOrder),
                Collation::AsciiCaseFold => {
                    string::strxfrm_with(&mut dest, &src, n, &AsciiCaseFold)
                }
            };
            match result {
                Ok(len) => CaseExecution::plain(format!("{len} {}", render_bytes(&dest))),
                Err(err) => CaseExecution::violation(err),
            }
        }
        other => return Err(ExecError::UnsupportedFunction(other.to_string())),
    };
    Ok(run)
}

fn healed_name<T>(out: &Guarded<T>) -> Option<&'static str> {
    out.was_healed().then(|| out.action.name())
}

fn buffer_outcome(result: strprim_core::Result<Guarded<usize>>, buf: &[u8]) -> CaseExecution {
    match result {
        Ok(out) => CaseExecution {
            output: render_bytes(buf),
            errno: 0,
            healing_action: healed_name(&out),
        },
        Err(err) => CaseExecution::violation(err),
    }
}

fn tokenize_stateful(s: &mut [u8], delims: &[u8]) -> Vec<Vec<u8>> {
    let mut tokenizer = Tokenizer::new();
    let mut tokens = Vec::new();
    let mut next = tokenizer.strtok(Some(s), delims);
    while let Some(token) = next {
        tokens.push(tokenizer.token_bytes(token).to_vec());
        next = tokenizer.strtok(None, delims);
    }
    tokens
}

enum Collation {
    Bytes,
    AsciiCaseFold,
}

fn collation(inputs: &Value) -> Result<Collation, ExecError> {
    match inputs.get("collation").and_then(Value::as_str) {
        None | Some("bytes") => Ok(Collation::Bytes),
        Some("ascii_casefold") => Ok(Collation::AsciiCaseFold),
        Some(_) => Err(ExecError::InvalidInput {
            field: "collation",
            expected: "\"bytes\" or \"ascii_casefold\"",
        }),
    }
}

fn char_policy(inputs: &Value) -> Result<CharRangePolicy, ExecError> {
    match inputs.get("policy").and_then(Value::as_str) {
        None | Some("reject") => Ok(CharRangePolicy::Reject),
        Some("truncate") => Ok(CharRangePolicy::Truncate),
        Some(_) => Err(ExecError::InvalidInput {
            field: "policy",
            expected: "\"reject\" or \"truncate\"",
        }),
    }
}

// ---------------------------------------------------------------------------
// Input decoding
// ---------------------------------------------------------------------------

/// A byte-string input: a JSON array of bytes, or a JSON string plus NUL.
pub(crate) fn bytes(inputs: &Value, field: &'static str) -> Result<Vec<u8>, ExecError> {
    let invalid = ExecError::InvalidInput {
        field,
        expected: "a byte array or a string",
    };
    match inputs.get(field) {
        None => Err(ExecError::MissingInput(field)),
        Some(Value::String(s)) => {
            let mut out = s.as_bytes().to_vec();
            out.push(0);
            Ok(out)
        }
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| v.as_u64().and_then(|n| u8::try_from(n).ok()))
            .collect::<Option<Vec<u8>>>()
            .ok_or(invalid),
        Some(_) => Err(invalid),
    }
}

pub(crate) fn size(inputs: &Value, field: &'static str) -> Result<usize, ExecError> {
    let value = inputs.get(field).ok_or(ExecError::MissingInput(field))?;
    value
        .as_u64()
        .and_then(|n| usize::try_from(n).ok())
        .ok_or(ExecError::InvalidInput {
            field,
            expected: "a non-negative integer",
        })
}

pub(crate) fn int(inputs: &Value, field: &'static str) -> Result<i32, ExecError> {
    let value = inputs.get(field).ok_or(ExecError::MissingInput(field))?;
    value
        .as_i64()
        .and_then(|n| i32::try_from(n).ok())
        .ok_or(ExecError::InvalidInput {
            field,
            expected: "a 32-bit integer",
        })
}

/// Largest destination a fixture may request.
pub const MAX_DST_LEN: usize = 1 << 20;

/// Destination buffer from `dst` (initial contents) and/or `dst_len`.
///
/// `dst_len`, when present, sets the final length: the contents are
/// zero-padded or cut to fit. Lengths above [`MAX_DST_LEN`] are rejected.
pub(crate) fn dest_buffer(inputs: &Value) -> Result<Vec<u8>, ExecError> {
    let mut buf = match inputs.get("dst") {
        Some(_) => bytes(inputs, "dst")?,
        None if inputs.get("dst_len").is_some() => Vec::new(),
        None => return Err(ExecError::MissingInput("dst_len")),
    };
    if inputs.get("dst_len").is_some() {
        let len = size(inputs, "dst_len")?;
        let too_large = ExecError::InvalidInput {
            field: "dst_len",
            expected: "a length of at most 1 MiB",
        };
        if len > MAX_DST_LEN {
            return Err(too_large);
        }
        buf.try_reserve_exact(len.saturating_sub(buf.len()))
            .map_err(|_| too_large)?;
        buf.resize(len, 0);
    }
    Ok(buf)
}

// ---------------------------------------------------------------------------
// Output rendering
// ---------------------------------------------------------------------------

pub(crate) fn render_bytes(bytes: &[u8]) -> String {
    format!("{bytes:?}")
}

pub(crate) fn render_index(index: Option<usize>) -> String {
    index.map_or_else(|| String::from("null"), |i| i.to_string())
}

pub(crate) fn render_sign(value: i32) -> String {
    value.signum().to_string()
}

pub(crate) fn render_tokens(tokens: &[Vec<u8>]) -> String {
    let rendered: Vec<Value> = tokens
        .iter()
        .map(|t| match std::str::from_utf8(t) {
            Ok(text) => Value::from(text),
            Err(_) => Value::from(t.clone()),
        })
        .collect();
    serde_json::to_string(&rendered).unwrap_or_default()
}
