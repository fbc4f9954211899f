//! Memory operations: memcpy, memmove, memset, memcmp.
//!
//! These are safe Rust implementations operating on byte slices.
//! They correspond to the `<string.h>` memory functions in POSIX/C.
//!
//! Unlike the string operations, NUL bytes carry no meaning here: every
//! function processes exactly `n` bytes or rejects the call.

use crate::error::{Result, StringError};

/// Copies `n` bytes from `src` to `dest`.
///
/// Equivalent to C `memcpy`. The borrow checker guarantees the two slices do
/// not overlap; use [`memmove`] for moves within one buffer.
///
/// Returns `n`.
///
/// # Errors
///
/// [`StringError::DestinationTooSmall`] or [`StringError::SourceTooSmall`] if
/// either region is shorter than `n`. Nothing is written in that case.
pub fn memcpy(dest: &mut [u8], src: &[u8], n: usize) -> Result<usize> {
    ensure_dest(dest.len(), n)?;
    ensure_src(src.len(), n)?;
    dest[..n].copy_from_slice(&src[..n]);
    Ok(n)
}

/// Moves `n` bytes inside `buf` from offset `src` to offset `dest`.
///
/// Equivalent to C `memmove` where both pointers address the same object.
/// The result is as if the source bytes were first copied to a temporary
/// buffer. Copies ascend when `dest < src` and descend otherwise, so no
/// source byte is overwritten before it is read.
///
/// Returns `n`.
///
/// # Errors
///
/// [`StringError::RangeOutOfBounds`] if either range leaves the buffer.
pub fn memmove(buf: &mut [u8], dest: usize, src: usize, n: usize) -> Result<usize> {
    ensure_range(buf.len(), src, n)?;
    ensure_range(buf.len(), dest, n)?;

    if n == 0 || dest == src {
        return Ok(n);
    }
    if dest < src {
        for i in 0..n {
            buf[dest + i] = buf[src + i];
        }
    } else {
        for i in (0..n).rev() {
            buf[dest + i] = buf[src + i];
        }
    }
    Ok(n)
}

/// Fills the first `n` bytes of `dest` with the low 8 bits of `value`.
///
/// Equivalent to C `memset(dest, c, n)`.
///
/// Returns `n`.
pub fn memset(dest: &mut [u8], value: i32, n: usize) -> Result<usize> {
    ensure_dest(dest.len(), n)?;
    dest[..n].fill(value as u8);
    Ok(n)
}

/// Compares the first `n` bytes of `a` and `b` as unsigned values.
///
/// Equivalent to C `memcmp`. Returns the difference of the first mismatching
/// bytes, or zero. Embedded NULs are compared like any other byte.
pub fn memcmp(a: &[u8], b: &[u8], n: usize) -> Result<i32> {
    ensure_src(a.len(), n)?;
    ensure_src(b.len(), n)?;
    Ok(a[..n]
        .iter()
        .zip(&b[..n])
        .find(|(x, y)| x != y)
        .map_or(0, |(&x, &y)| i32::from(x) - i32::from(y)))
}

fn ensure_dest(available: usize, needed: usize) -> Result<()> {
    if available < needed {
        return Err(StringError::DestinationTooSmall { needed, available });
    }
    Ok(())
}

fn ensure_src(available: usize, needed: usize) -> Result<()> {
    if available < needed {
        return Err(StringError::SourceTooSmall { needed, available });
    }
    Ok(())
}

fn ensure_range(buffer_len: usize, offset: usize, len: usize) -> Result<()> {
    match offset.checked_add(len) {
        Some(end) if end <= buffer_len => Ok(()),
        _ => Err(StringError::RangeOutOfBounds {
            offset,
            len,
            buffer_len,
        }),
    }
}
