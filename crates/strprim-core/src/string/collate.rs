//! Locale-sensitive comparison: strcoll and strxfrm.
//!
//! Collation rules come from a [`CollationPolicy`]. The default policy is
//! [`ByteOrder`], which matches the C/POSIX locale: `strcoll` behaves like
//! `strcmp` and `strxfrm` is a bounded copy.

use crate::error::{Result, StringError};

use super::str::{strcmp, strlen};

/// A collation rule set.
///
/// Implementations must keep `collate` consistent with `transform_into`: for
/// any strings `a` and `b`, `strcmp` of their transformed forms has the same
/// sign as `collate(a, b)`.
pub trait CollationPolicy {
    /// Compare two NUL-terminated strings. Negative, zero, or positive.
    fn collate(&self, a: &[u8], b: &[u8]) -> i32;

    /// Write the transformed form of the NUL-terminated string `src` into
    /// `out`, truncating to `out.len()` bytes, and return the full length of
    /// the transformed form (excluding any terminator).
    fn transform_into(&self, src: &[u8], out: &mut [u8]) -> usize;
}

/// The C/POSIX locale: plain unsigned byte order.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ByteOrder;

impl CollationPolicy for ByteOrder {
    fn collate(&self, a: &[u8], b: &[u8]) -> i32 {
        strcmp(a, b)
    }

    fn transform_into(&self, src: &[u8], out: &mut [u8]) -> usize {
        let len = strlen(src);
        let written = len.min(out.len());
        out[..written].copy_from_slice(&src[..written]);
        len
    }
}

/// Orders ASCII letters without regard to case; other bytes keep byte order.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AsciiCaseFold;

impl CollationPolicy for AsciiCaseFold {
    fn collate(&self, a: &[u8], b: &[u8]) -> i32 {
        let mut i = 0;
        loop {
            let x = a.get(i).copied().unwrap_or(0).to_ascii_lowercase();
            let y = b.get(i).copied().unwrap_or(0).to_ascii_lowercase();
            if x != y {
                return i32::from(x) - i32::from(y);
            }
            if x == 0 {
                return 0;
            }
            i += 1;
        }
    }

    fn transform_into(&self, src: &[u8], out: &mut [u8]) -> usize {
        let len = strlen(src);
        for (slot, &b) in out.iter_mut().zip(&src[..len]) {
            *slot = b.to_ascii_lowercase();
        }
        len
    }
}

/// Policy used by [`strcoll`] and [`strxfrm`].
pub type DefaultCollation = ByteOrder;

/// Compares two strings under the default collation.
///
/// Equivalent to C `strcoll` in the "C" locale.
pub fn strcoll(a: &[u8], b: &[u8]) -> i32 {
    strcoll_with(a, b, &DefaultCollation::default())
}

/// [`strcoll`] under an explicit policy.
pub fn strcoll_with<P: CollationPolicy + ?Sized>(a: &[u8], b: &[u8], policy: &P) -> i32 {
    policy.collate(a, b)
}

/// Transforms `src` into `dest` under the default collation.
///
/// Equivalent to C `strxfrm`. Returns the length of the full transformed
/// string. When that length is below `n`, the transform and a NUL are written
/// into `dest`; otherwise at most `n` bytes are written, without a NUL, and
/// the caller should retry with a buffer of at least `len + 1` bytes. `n == 0`
/// writes nothing and acts as a pure length query.
///
/// # Errors
///
/// [`StringError::DestinationTooSmall`] if `dest.len() < n`.
pub fn strxfrm(dest: &mut [u8], src: &[u8], n: usize) -> Result<usize> {
    strxfrm_with(dest, src, n, &DefaultCollation::default())
}

/// [`strxfrm`] under an explicit policy.
pub fn strxfrm_with<P: CollationPolicy + ?Sized>(
    dest: &mut [u8],
    src: &[u8],
    n: usize,
    policy: &P,
) -> Result<usize> {
    if dest.len() < n {
        return Err(StringError::DestinationTooSmall {
            needed: n,
            available: dest.len(),
        });
    }
    let total = policy.transform_into(src, &mut dest[..n]);
    if total < n {
        dest[total] = 0;
    }
    Ok(total)
}
