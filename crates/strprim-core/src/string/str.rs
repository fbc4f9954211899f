//! String operations: strlen, strcmp, strncmp, strcpy, strncpy, strcat, strncat,
//! strchr, strrchr, strstr, strspn, strcspn, strpbrk, strdup.
//!
//! These are safe Rust implementations operating on byte slices that represent
//! NUL-terminated C strings. In this safe Rust model, strings are `&[u8]` slices
//! where a NUL byte (`0x00`) marks the logical end of the string. A slice with
//! no NUL is treated as if the terminator sat one past its last byte.

use std::collections::TryReserveError;

use crate::error::{Result, StringError};

/// How a C `int` character code outside `0..=255` is handled by
/// [`strchr_code`] and [`strrchr_code`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharRangePolicy {
    /// Out-of-range codes never match.
    #[default]
    Reject,
    /// The code is truncated to its low 8 bits before comparing, as a C
    /// `(char)c` conversion would.
    Truncate,
}

impl CharRangePolicy {
    /// Map a character code to the byte searched for, or `None` if the code
    /// can never match.
    #[must_use]
    pub const fn normalize(self, c: i32) -> Option<u8> {
        match self {
            Self::Reject if c < 0 || c > u8::MAX as i32 => None,
            _ => Some(c as u8),
        }
    }
}

/// Membership table for a NUL-terminated set of bytes.
///
/// The terminator itself is never a member, so scans stop at it naturally.
#[derive(Clone)]
pub(crate) struct ByteSet([bool; 256]);

impl ByteSet {
    pub(crate) fn from_terminated(set: &[u8]) -> Self {
        let mut table = [false; 256];
        for &b in &set[..strlen(set)] {
            table[usize::from(b)] = true;
        }
        Self(table)
    }

    #[inline]
    pub(crate) fn contains(&self, b: u8) -> bool {
        self.0[usize::from(b)]
    }
}

/// Returns the length of a NUL-terminated byte string (not counting the NUL).
///
/// Equivalent to C `strlen`. Scans `s` for the first `0x00` byte and returns
/// its index. If no NUL is found, returns the full slice length.
pub fn strlen(s: &[u8]) -> usize {
    s.iter().position(|&b| b == 0).unwrap_or(s.len())
}

/// Compares two NUL-terminated byte strings lexicographically.
///
/// Equivalent to C `strcmp`. Compares unsigned bytes until a difference is
/// found or both strings reach a NUL terminator.
///
/// Returns the difference of the first mismatching bytes (`s1[i] - s2[i]`),
/// or zero if the strings are equal.
pub fn strcmp(s1: &[u8], s2: &[u8]) -> i32 {
    let mut i = 0;
    loop {
        let a = s1.get(i).copied().unwrap_or(0);
        let b = s2.get(i).copied().unwrap_or(0);

        if a != b {
            return i32::from(a) - i32::from(b);
        }
        if a == 0 {
            return 0;
        }
        i += 1;
    }
}

/// Compares at most `n` bytes of two NUL-terminated byte strings.
///
/// Equivalent to C `strncmp`. Like [`strcmp`], but stops after `n` bytes.
/// `n == 0` always compares equal.
pub fn strncmp(s1: &[u8], s2: &[u8], n: usize) -> i32 {
    for i in 0..n {
        let a = s1.get(i).copied().unwrap_or(0);
        let b = s2.get(i).copied().unwrap_or(0);

        if a != b {
            return i32::from(a) - i32::from(b);
        }
        if a == 0 {
            return 0;
        }
    }
    0
}

/// Copies a NUL-terminated string from `src` into `dest`.
///
/// Equivalent to C `strcpy`. Copies bytes from `src` until (and including)
/// the NUL terminator. Returns the number of bytes copied (including the NUL).
///
/// # Errors
///
/// [`StringError::DestinationTooSmall`] if `dest` cannot hold the string plus
/// its terminator. Nothing is written in that case.
pub fn strcpy(dest: &mut [u8], src: &[u8]) -> Result<usize> {
    let src_len = strlen(src);
    if dest.len() <= src_len {
        return Err(StringError::DestinationTooSmall {
            needed: src_len + 1,
            available: dest.len(),
        });
    }
    dest[..src_len].copy_from_slice(&src[..src_len]);
    dest[src_len] = 0;
    Ok(src_len + 1)
}

/// Copies at most `n` bytes from `src` into `dest`.
///
/// Equivalent to C `strncpy`. If `src` is shorter than `n`, the remainder of
/// `dest[..n]` is filled with NUL bytes. If `src` is `n` or longer, `dest` will
/// NOT be NUL-terminated: that is the contract, not a defect.
///
/// Returns `n`, the number of bytes written.
///
/// # Errors
///
/// [`StringError::DestinationTooSmall`] if `dest.len() < n`.
pub fn strncpy(dest: &mut [u8], src: &[u8], n: usize) -> Result<usize> {
    if dest.len() < n {
        return Err(StringError::DestinationTooSmall {
            needed: n,
            available: dest.len(),
        });
    }
    let copy_len = strlen(src).min(n);

    dest[..copy_len].copy_from_slice(&src[..copy_len]);
    dest[copy_len..n].fill(0);

    Ok(n)
}

/// Appends `src` to the end of the NUL-terminated string in `dest`.
///
/// Equivalent to C `strcat`. Finds the NUL in `dest`, then copies `src`
/// (up to and including its NUL) after it.
///
/// Returns the total length of the resulting string (not counting the NUL).
///
/// # Errors
///
/// [`StringError::Unterminated`] if `dest` holds no NUL, and
/// [`StringError::DestinationTooSmall`] if the result does not fit.
pub fn strcat(dest: &mut [u8], src: &[u8]) -> Result<usize> {
    let src_len = strlen(src);
    append(dest, &src[..src_len])
}

/// Appends at most `n` bytes from `src` to the NUL-terminated string in `dest`.
///
/// Equivalent to C `strncat`. Unlike [`strncpy`], always NUL-terminates the
/// result.
///
/// Returns the total length of the resulting string (not counting the NUL).
///
/// # Errors
///
/// Same as [`strcat`].
pub fn strncat(dest: &mut [u8], src: &[u8], n: usize) -> Result<usize> {
    let src_len = strlen(src).min(n);
    append(dest, &src[..src_len])
}

fn append(dest: &mut [u8], tail: &[u8]) -> Result<usize> {
    let dest_len = terminated_len(dest)?;
    let total = dest_len + tail.len();
    if dest.len() <= total {
        return Err(StringError::DestinationTooSmall {
            needed: total + 1,
            available: dest.len(),
        });
    }
    dest[dest_len..total].copy_from_slice(tail);
    dest[total] = 0;
    Ok(total)
}

/// Length of a string that must carry its own terminator.
pub(crate) fn terminated_len(s: &[u8]) -> Result<usize> {
    s.iter()
        .position(|&b| b == 0)
        .ok_or(StringError::Unterminated { len: s.len() })
}

/// Locates the first occurrence of `c` in the NUL-terminated string `s`.
///
/// Equivalent to C `strchr`. Returns the index of the first byte equal to `c`,
/// or `None` if not found before the NUL terminator. If `c` is `0`, returns
/// the index of the NUL terminator (`s.len()` for an unterminated slice).
pub fn strchr(s: &[u8], c: u8) -> Option<usize> {
    for (i, &b) in s.iter().enumerate() {
        if b == c {
            return Some(i);
        }
        if b == 0 {
            return None;
        }
    }
    (c == 0).then_some(s.len())
}

/// Locates the last occurrence of `c` in the NUL-terminated string `s`.
///
/// Equivalent to C `strrchr`. One forward pass that remembers the most recent
/// match; the terminator counts as a match for `c == 0`.
pub fn strrchr(s: &[u8], c: u8) -> Option<usize> {
    let mut last = None;
    for (i, &b) in s.iter().enumerate() {
        if b == c {
            last = Some(i);
        }
        if b == 0 {
            return last;
        }
    }
    if c == 0 { Some(s.len()) } else { last }
}

/// [`strchr`] for a C `int` character code, normalized by `policy`.
pub fn strchr_code(s: &[u8], c: i32, policy: CharRangePolicy) -> Option<usize> {
    policy.normalize(c).and_then(|b| strchr(s, b))
}

/// [`strrchr`] for a C `int` character code, normalized by `policy`.
pub fn strrchr_code(s: &[u8], c: i32, policy: CharRangePolicy) -> Option<usize> {
    policy.normalize(c).and_then(|b| strrchr(s, b))
}

/// Finds the first occurrence of the NUL-terminated substring `needle` in
/// the NUL-terminated string `haystack`.
///
/// Equivalent to C `strstr`. Returns the byte index where `needle` starts,
/// or `None` if not found. An empty needle matches at 0.
pub fn strstr(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    let h_len = strlen(haystack);
    let n_len = strlen(needle);

    if n_len == 0 {
        return Some(0);
    }
    if n_len > h_len {
        return None;
    }

    let haystack = &haystack[..h_len];
    let needle = &needle[..n_len];

    haystack.windows(n_len).position(|window| window == needle)
}

/// Returns the length of the initial segment of `s` consisting entirely of
/// bytes in `accept`.
///
/// Equivalent to C `strspn`.
pub fn strspn(s: &[u8], accept: &[u8]) -> usize {
    let accept = ByteSet::from_terminated(accept);
    s.iter().take_while(|&&b| accept.contains(b)).count()
}

/// Returns the length of the initial segment of `s` consisting entirely of
/// bytes NOT in `reject`.
///
/// Equivalent to C `strcspn`.
pub fn strcspn(s: &[u8], reject: &[u8]) -> usize {
    let reject = ByteSet::from_terminated(reject);
    s.iter()
        .take_while(|&&b| b != 0 && !reject.contains(b))
        .count()
}

/// Locates the first occurrence of any byte from `accept` in `s`.
///
/// Equivalent to C `strpbrk`. Returns the index of the first match, or `None`.
pub fn strpbrk(s: &[u8], accept: &[u8]) -> Option<usize> {
    let accept = ByteSet::from_terminated(accept);
    s.iter()
        .take_while(|&&b| b != 0)
        .position(|&b| accept.contains(b))
}

/// Duplicates a NUL-terminated string into a new `Vec<u8>`.
///
/// Equivalent to C `strdup`. The result holds exactly `strlen(s) + 1` bytes,
/// the last one being the terminator. Ownership passes to the caller.
///
/// # Errors
///
/// [`StringError::AllocationFailure`] if the allocation cannot be satisfied;
/// no partial buffer is returned.
pub fn strdup(s: &[u8]) -> Result<Vec<u8>> {
    strdup_with(s, |out, n| out.try_reserve_exact(n))
}

pub(crate) fn strdup_with<F>(s: &[u8], reserve: F) -> Result<Vec<u8>>
where
    F: FnOnce(&mut Vec<u8>, usize) -> std::result::Result<(), TryReserveError>,
{
    let len = strlen(s);
    let requested = len + 1;
    let mut out = Vec::new();
    reserve(&mut out, requested).map_err(|_| StringError::AllocationFailure { requested })?;
    out.extend_from_slice(&s[..len]);
    out.push(0);
    Ok(out)
}
