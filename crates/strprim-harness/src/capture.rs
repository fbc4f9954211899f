//! Host libc fixture capture.
//!
//! Runs a fixed set of well-defined test vectors against the host C library
//! and serializes inputs/outputs as a [`FixtureSet`] for later verification.
//! Only calls whose behavior C defines are captured; contract violations
//! cannot be observed on the host without undefined behavior.

#![allow(unsafe_code)]

use serde_json::{Value, json};
use thiserror::Error;

use crate::exec::{self, ExecError};
use crate::fixtures::{FixtureCase, FixtureSet};

/// Why a vector could not be captured.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("host capture is not available on this platform")]
    Unsupported,
    #[error("unknown capture family '{0}'")]
    UnknownFamily(String),
    #[error("vector '{name}' is not well-defined on the host: {reason}")]
    IllDefined { name: String, reason: &'static str },
    #[error("vector '{name}': {source}")]
    Input {
        name: String,
        #[source]
        source: ExecError,
    },
}

/// A named input vector for one function.
#[derive(Debug, Clone)]
pub struct CaptureVector {
    pub name: String,
    pub function: &'static str,
    pub spec_section: &'static str,
    pub inputs: Value,
}

fn vector(name: &str, function: &'static str, spec_section: &'static str, inputs: Value) -> CaptureVector {
    CaptureVector {
        name: name.to_string(),
        function,
        spec_section,
        inputs,
    }
}

/// Families [`capture_family`] knows how to capture.
pub const CAPTURE_FAMILIES: &[&str] = &["string"];

/// Default vectors for the `string` family.
#[must_use]
pub fn string_vectors() -> Vec<CaptureVector> {
    let mut v = vec![
        vector("strlen_basic", "strlen", "C11 7.24.6.3", json!({"s": "hello"})),
        vector("strlen_empty", "strlen", "C11 7.24.6.3", json!({"s": ""})),
        vector("strlen_embedded_nul", "strlen", "C11 7.24.6.3", json!({"s": [97, 0, 98, 0]})),
        vector("strcmp_equal", "strcmp", "C11 7.24.4.2", json!({"s1": "abc", "s2": "abc"})),
        vector("strcmp_less", "strcmp", "C11 7.24.4.2", json!({"s1": "abc", "s2": "abd"})),
        vector("strcmp_prefix", "strcmp", "C11 7.24.4.2", json!({"s1": "ab", "s2": "abc"})),
        vector("strcmp_unsigned", "strcmp", "C11 7.24.4.2", json!({"s1": [200, 0], "s2": [100, 0]})),
        vector("strncmp_bounded", "strncmp", "C11 7.24.4.4", json!({"s1": "abcdef", "s2": "abcxyz", "n": 3})),
        vector("strncmp_zero", "strncmp", "C11 7.24.4.4", json!({"s1": "a", "s2": "b", "n": 0})),
        vector("strchr_found", "strchr", "C11 7.24.5.2", json!({"s": "hello", "c": 108})),
        vector("strchr_terminator", "strchr", "C11 7.24.5.2", json!({"s": "hello", "c": 0})),
        vector("strchr_missing", "strchr", "C11 7.24.5.2", json!({"s": "hello", "c": 122})),
        vector("strrchr_found", "strrchr", "C11 7.24.5.5", json!({"s": "hello", "c": 108})),
        vector("strrchr_terminator", "strrchr", "C11 7.24.5.5", json!({"s": "abc", "c": 0})),
        vector("strstr_found", "strstr", "C11 7.24.5.7", json!({"haystack": "hello world", "needle": "world"})),
        vector("strstr_empty_needle", "strstr", "C11 7.24.5.7", json!({"haystack": "abc", "needle": ""})),
        vector("strstr_missing", "strstr", "C11 7.24.5.7", json!({"haystack": "abc", "needle": "abd"})),
        vector("strspn_basic", "strspn", "C11 7.24.5.6", json!({"s": "aabbcx", "set": "abc"})),
        vector("strcspn_basic", "strcspn", "C11 7.24.5.3", json!({"s": "hello, world", "set": ", "})),
        vector("strcspn_empty_set", "strcspn", "C11 7.24.5.3", json!({"s": "hello", "set": ""})),
        vector("strpbrk_found", "strpbrk", "C11 7.24.5.4", json!({"s": "hello, world", "set": " ,"})),
        vector("strpbrk_missing", "strpbrk", "C11 7.24.5.4", json!({"s": "hello", "set": "xyz"})),
        vector("memcmp_equal", "memcmp", "C11 7.24.4.1", json!({"a": [1, 2, 3], "b": [1, 2, 3], "n": 3})),
        vector("memcmp_past_nul", "memcmp", "C11 7.24.4.1", json!({"a": [0, 1], "b": [0, 2], "n": 2})),
        vector("memcmp_unsigned", "memcmp", "C11 7.24.4.1", json!({"a": [128], "b": [127], "n": 1})),
        vector("strcpy_fits", "strcpy", "C11 7.24.2.3", json!({"src": "hello", "dst_len": 8})),
        vector("strncpy_pads", "strncpy", "C11 7.24.2.4", json!({"src": "ab", "dst_len": 6, "n": 5})),
        vector("strncpy_truncates", "strncpy", "C11 7.24.2.4", json!({"src": "abcdef", "dst_len": 4, "n": 3})),
        vector("strcat_basic", "strcat", "C11 7.24.3.1", json!({"dst": "foo", "dst_len": 8, "src": "bar"})),
        vector("strncat_bounded", "strncat", "C11 7.24.3.2", json!({"dst": "hi", "dst_len": 8, "src": "there", "n": 3})),
        vector("memcpy_basic", "memcpy", "C11 7.24.2.1", json!({"src": [1, 2, 3], "dst_len": 4, "n": 3})),
        vector("memmove_forward", "memmove", "C11 7.24.2.2", json!({"buf": "abcdefgh", "dest_off": 2, "src_off": 0, "n": 5})),
        vector("memmove_backward", "memmove", "C11 7.24.2.2", json!({"buf": "abcdefgh", "dest_off": 0, "src_off": 2, "n": 5})),
        vector("memset_low_byte", "memset", "C11 7.24.6.1", json!({"dst_len": 4, "c": 321, "n": 3})),
        vector("strdup_basic", "strdup", "POSIX strdup", json!({"s": "hello"})),
        vector("strcoll_c_locale", "strcoll", "C11 7.24.4.3", json!({"s1": "apple", "s2": "banana"})),
        vector("strxfrm_fits", "strxfrm", "C11 7.24.4.5", json!({"src": "abc", "dst_len": 8, "n": 8})),
        vector("strxfrm_length_query", "strxfrm", "C11 7.24.4.5", json!({"src": "hello", "dst_len": 0, "n": 0})),
        vector("strtok_r_collapses_delims", "strtok_r", "POSIX strtok_r", json!({"s": "a,,b,,c", "delim": ","})),
        vector("strtok_r_whitespace", "strtok_r", "POSIX strtok_r", json!({"s": " a b\tc\n", "delim": " \t\n"})),
        vector("strtok_r_no_tokens", "strtok_r", "POSIX strtok_r", json!({"s": ",,,,", "delim": ","})),
    ];
    for code in strprim_core::string::known_errnos() {
        v.push(vector(
            &format!("strerror_{code}"),
            "strerror",
            "C11 7.24.6.2",
            json!({"code": code}),
        ));
    }
    v
}

/// Capture the named family against the host C library.
pub fn capture_family(family: &str, captured_at: &str) -> Result<FixtureSet, CaptureError> {
    match family {
        "string" => capture_vectors("string/host", &string_vectors(), captured_at),
        other => Err(CaptureError::UnknownFamily(other.to_string())),
    }
}

/// Capture arbitrary vectors against the host C library.
pub fn capture_vectors(
    family: &str,
    vectors: &[CaptureVector],
    captured_at: &str,
) -> Result<FixtureSet, CaptureError> {
    let cases = vectors
        .iter()
        .map(|v| {
            host::run(v).map(|output| FixtureCase {
                name: v.name.clone(),
                function: v.function.to_string(),
                spec_section: v.spec_section.to_string(),
                inputs: v.inputs.clone(),
                expected_output: output,
                expected_errno: 0,
                mode: String::from("both"),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(FixtureSet {
        version: String::from("v1"),
        family: family.to_string(),
        captured_at: captured_at.to_string(),
        cases,
    })
}

fn ill_defined(v: &CaptureVector, reason: &'static str) -> CaptureError {
    CaptureError::IllDefined {
        name: v.name.clone(),
        reason,
    }
}

fn input_error(v: &CaptureVector) -> impl Fn(ExecError) -> CaptureError + '_ {
    move |source| CaptureError::Input {
        name: v.name.clone(),
        source,
    }
}

#[cfg(not(unix))]
mod host {
    use super::{CaptureError, CaptureVector};

    pub(super) fn run(_v: &CaptureVector) -> Result<String, CaptureError> {
        Err(CaptureError::Unsupported)
    }
}

#[cfg(unix)]
mod host {
    use std::ffi::{CStr, c_char};

    use super::{CaptureError, CaptureVector, exec, ill_defined, input_error};

    fn terminated(v: &CaptureVector, s: &[u8]) -> Result<(), CaptureError> {
        if s.contains(&0) {
            Ok(())
        } else {
            Err(ill_defined(v, "string input is not NUL-terminated"))
        }
    }

    fn c_str(
        v: &CaptureVector,
        field: &'static str,
    ) -> Result<Vec<u8>, CaptureError> {
        let s = exec::bytes(&v.inputs, field).map_err(input_error(v))?;
        terminated(v, &s)?;
        Ok(s)
    }

    fn offset(base: *const c_char, found: *const c_char) -> Option<usize> {
        if found.is_null() {
            None
        } else {
            // Both pointers address the same live buffer.
            Some(found as usize - base as usize)
        }
    }

    fn required_len(s: &[u8]) -> usize {
        s.iter().position(|&b| b == 0).unwrap_or(s.len()) + 1
    }

    pub(super) fn run(v: &CaptureVector) -> Result<String, CaptureError> {
        let inputs = &v.inputs;
        let size = |field| exec::size(inputs, field).map_err(input_error(v));
        let int = |field| exec::int(inputs, field).map_err(input_error(v));

        // SAFETY (all blocks below): every string argument was checked to carry
        // a NUL inside its buffer, every length argument was checked against
        // the buffers it covers, and destination buffers are sized for the
        // bytes C writes.
        let out = match v.function {
            "strlen" => {
                let s = c_str(v, "s")?;
                unsafe { libc::strlen(s.as_ptr().cast()) }.to_string()
            }
            "strcmp" => {
                let (a, b) = (c_str(v, "s1")?, c_str(v, "s2")?);
                exec::render_sign(unsafe { libc::strcmp(a.as_ptr().cast(), b.as_ptr().cast()) })
            }
            "strncmp" => {
                let (a, b) = (c_str(v, "s1")?, c_str(v, "s2")?);
                let n = size("n")?;
                exec::render_sign(unsafe {
                    libc::strncmp(a.as_ptr().cast(), b.as_ptr().cast(), n)
                })
            }
            "strcoll" => {
                let (a, b) = (c_str(v, "s1")?, c_str(v, "s2")?);
                exec::render_sign(unsafe { libc::strcoll(a.as_ptr().cast(), b.as_ptr().cast()) })
            }
            "strchr" | "strrchr" => {
                let s = c_str(v, "s")?;
                let c = int("c")?;
                if !(0..=255).contains(&c) {
                    return Err(ill_defined(v, "character code outside 0..=255"));
                }
                let base: *const c_char = s.as_ptr().cast();
                let found = unsafe {
                    if v.function == "strchr" {
                        libc::strchr(base, c)
                    } else {
                        libc::strrchr(base, c)
                    }
                };
                exec::render_index(offset(base, found))
            }
            "strstr" => {
                let (h, n) = (c_str(v, "haystack")?, c_str(v, "needle")?);
                let base: *const c_char = h.as_ptr().cast();
                exec::render_index(offset(base, unsafe { libc::strstr(base, n.as_ptr().cast()) }))
            }
            "strpbrk" => {
                let (s, set) = (c_str(v, "s")?, c_str(v, "set")?);
                let base: *const c_char = s.as_ptr().cast();
                exec::render_index(offset(base, unsafe { libc::strpbrk(base, set.as_ptr().cast()) }))
            }
            "strspn" | "strcspn" => {
                let (s, set) = (c_str(v, "s")?, c_str(v, "set")?);
                let n = unsafe {
                    if v.function == "strspn" {
                        libc::strspn(s.as_ptr().cast(), set.as_ptr().cast())
                    } else {
                        libc::strcspn(s.as_ptr().cast(), set.as_ptr().cast())
                    }
                };
                n.to_string()
            }
            "memcmp" => {
                let a = exec::bytes(inputs, "a").map_err(input_error(v))?;
                let b = exec::bytes(inputs, "b").map_err(input_error(v))?;
                let n = size("n")?;
                if a.len() < n || b.len() < n {
                    return Err(ill_defined(v, "memcmp length exceeds an input"));
                }
                exec::render_sign(unsafe { libc::memcmp(a.as_ptr().cast(), b.as_ptr().cast(), n) })
            }
            "strcpy" => {
                let src = c_str(v, "src")?;
                let mut dest = exec::dest_buffer(inputs).map_err(input_error(v))?;
                if dest.len() < required_len(&src) {
                    return Err(ill_defined(v, "destination too small"));
                }
                unsafe { libc::strcpy(dest.as_mut_ptr().cast(), src.as_ptr().cast()) };
                exec::render_bytes(&dest)
            }
            "strncpy" => {
                let src = c_str(v, "src")?;
                let mut dest = exec::dest_buffer(inputs).map_err(input_error(v))?;
                let n = size("n")?;
                if dest.len() < n {
                    return Err(ill_defined(v, "destination too small"));
                }
                unsafe { libc::strncpy(dest.as_mut_ptr().cast(), src.as_ptr().cast(), n) };
                exec::render_bytes(&dest)
            }
            "strcat" | "strncat" => {
                let src = c_str(v, "src")?;
                let mut dest = exec::dest_buffer(inputs).map_err(input_error(v))?;
                terminated(v, &dest)?;
                let bound = if v.function == "strncat" { size("n")? } else { usize::MAX };
                let appended = (required_len(&src) - 1).min(bound);
                if dest.len() < required_len(&dest) + appended {
                    return Err(ill_defined(v, "destination too small"));
                }
                unsafe {
                    if v.function == "strcat" {
                        libc::strcat(dest.as_mut_ptr().cast(), src.as_ptr().cast());
                    } else {
                        libc::strncat(dest.as_mut_ptr().cast(), src.as_ptr().cast(), bound);
                    }
                }
                exec::render_bytes(&dest)
            }
            "memcpy" => {
                let src = exec::bytes(inputs, "src").map_err(input_error(v))?;
                let mut dest = exec::dest_buffer(inputs).map_err(input_error(v))?;
                let n = size("n")?;
                if dest.len() < n || src.len() < n {
                    return Err(ill_defined(v, "copy length exceeds a buffer"));
                }
                unsafe { libc::memcpy(dest.as_mut_ptr().cast(), src.as_ptr().cast(), n) };
                exec::render_bytes(&dest)
            }
            "memmove" => {
                let mut buf = exec::bytes(inputs, "buf").map_err(input_error(v))?;
                let (dest, src, n) = (size("dest_off")?, size("src_off")?, size("n")?);
                if dest.max(src).checked_add(n).is_none_or(|end| end > buf.len()) {
                    return Err(ill_defined(v, "move range exceeds the buffer"));
                }
                let base = buf.as_mut_ptr();
                unsafe { libc::memmove(base.add(dest).cast(), base.add(src).cast(), n) };
                exec::render_bytes(&buf)
            }
            "memset" => {
                let mut dest = exec::dest_buffer(inputs).map_err(input_error(v))?;
                let (c, n) = (int("c")?, size("n")?);
                if dest.len() < n {
                    return Err(ill_defined(v, "fill length exceeds the buffer"));
                }
                unsafe { libc::memset(dest.as_mut_ptr().cast(), c, n) };
                exec::render_bytes(&dest)
            }
            "strdup" => {
                let s = c_str(v, "s")?;
                let copy = unsafe { libc::strdup(s.as_ptr().cast()) };
                if copy.is_null() {
                    return Err(ill_defined(v, "host strdup returned NULL"));
                }
                let bytes = unsafe { CStr::from_ptr(copy) }.to_bytes_with_nul().to_vec();
                unsafe { libc::free(copy.cast()) };
                exec::render_bytes(&bytes)
            }
            "strxfrm" => {
                let src = c_str(v, "src")?;
                let mut dest = exec::dest_buffer(inputs).map_err(input_error(v))?;
                let n = size("n")?;
                if dest.len() < n {
                    return Err(ill_defined(v, "destination too small"));
                }
                let len = unsafe { libc::strxfrm(dest.as_mut_ptr().cast(), src.as_ptr().cast(), n) };
                format!("{len} {}", exec::render_bytes(&dest))
            }
            "strtok" | "strtok_r" => {
                let mut s = c_str(v, "s")?;
                let delims = c_str(v, "delim")?;
                let mut tokens = Vec::new();
                let mut save: *mut c_char = std::ptr::null_mut();
                let mut next = unsafe {
                    libc::strtok_r(s.as_mut_ptr().cast(), delims.as_ptr().cast(), &mut save)
                };
                while !next.is_null() {
                    tokens.push(unsafe { CStr::from_ptr(next) }.to_bytes().to_vec());
                    next = unsafe {
                        libc::strtok_r(std::ptr::null_mut(), delims.as_ptr().cast(), &mut save)
                    };
                }
                exec::render_tokens(&tokens)
            }
            "strerror" => {
                let code = int("code")?;
                let mut buf = [0 as c_char; 256];
                let rc = unsafe { libc::strerror_r(code, buf.as_mut_ptr(), buf.len()) };
                if rc != 0 {
                    return Err(ill_defined(v, "host strerror_r failed"));
                }
                unsafe { CStr::from_ptr(buf.as_ptr()) }
                    .to_string_lossy()
                    .into_owned()
            }
            _ => return Err(ill_defined(v, "function has no host capture")),
        };
        Ok(out)
    }
}
