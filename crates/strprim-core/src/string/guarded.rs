//! Mode-aware entry points for the mutating primitives.
//!
//! Each function takes the [`SafetyLevel`] to apply. In strict mode a contract
//! violation is returned as an error and errno is set. In hardened mode the
//! membrane's healing policy repairs the call instead (clamping sizes or
//! truncating with a terminator) and the chosen action is returned with the
//! result. Off skips counting but still rejects violations.

use strprim_membrane::{
    GuardEvent, HealingAction, SafetyLevel, global_healing_policy, global_metrics,
};

use crate::errno::set_errno;
use crate::error::{Result, StringError};

use super::{mem, str};

/// Result of a guarded call together with the healing applied, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Guarded<T> {
    pub value: T,
    pub action: HealingAction,
}

impl<T> Guarded<T> {
    const fn clean(value: T) -> Self {
        Self {
            value,
            action: HealingAction::None,
        }
    }

    #[must_use]
    pub const fn was_healed(&self) -> bool {
        self.action.is_heal()
    }
}

/// Safety level resolved from `STRPRIM_MODE`.
pub fn current_level() -> SafetyLevel {
    strprim_membrane::safety_level()
}

fn enter(level: SafetyLevel) {
    if level.validation_enabled() {
        global_metrics().record(GuardEvent::Call);
    }
}

fn report<T>(level: SafetyLevel, err: StringError) -> Result<Guarded<T>> {
    set_errno(err.errno());
    if level.validation_enabled() {
        global_metrics().record(GuardEvent::ViolationReported);
    }
    Err(err)
}

fn healed<T>(value: T, action: HealingAction) -> Result<Guarded<T>> {
    global_healing_policy().record(&action);
    global_metrics().record(GuardEvent::ViolationHealed);
    Ok(Guarded { value, action })
}

/// Copy as much of `bytes` as fits before a terminator.
fn truncate_into(dest: &mut [u8], at: usize, bytes: &[u8]) -> Option<(usize, HealingAction)> {
    let remaining = dest.len().checked_sub(at).filter(|&r| r > 0)?;
    let action = global_healing_policy().heal_string_bounds(bytes.len(), Some(remaining));
    let HealingAction::TruncateWithNull { truncated, .. } = action else {
        return None;
    };
    dest[at..at + truncated].copy_from_slice(&bytes[..truncated]);
    dest[at + truncated] = 0;
    Some((at + truncated, action))
}

/// Clamp `requested` to the bytes actually available.
fn clamp(requested: usize, src: Option<usize>, dst: Option<usize>) -> Option<(usize, HealingAction)> {
    match global_healing_policy().heal_copy_bounds(requested, src, dst) {
        action @ HealingAction::ClampSize { clamped, .. } => Some((clamped, action)),
        _ => None,
    }
}

/// Guarded [`str::strcpy`]. Hardened mode truncates to the destination.
pub fn strcpy(dest: &mut [u8], src: &[u8], level: SafetyLevel) -> Result<Guarded<usize>> {
    enter(level);
    match str::strcpy(dest, src) {
        Ok(n) => Ok(Guarded::clean(n)),
        Err(err @ StringError::DestinationTooSmall { .. }) if level.heals_enabled() => {
            let src_len = str::strlen(src);
            match truncate_into(dest, 0, &src[..src_len]) {
                Some((len, action)) => healed(len + 1, action),
                None => report(level, err),
            }
        }
        Err(err) => report(level, err),
    }
}

/// Guarded [`str::strncpy`]. Hardened mode clamps `n` to the destination.
pub fn strncpy(dest: &mut [u8], src: &[u8], n: usize, level: SafetyLevel) -> Result<Guarded<usize>> {
    enter(level);
    match str::strncpy(dest, src, n) {
        Ok(n) => Ok(Guarded::clean(n)),
        Err(err) if level.heals_enabled() => match clamp(n, None, Some(dest.len())) {
            Some((clamped, action)) => {
                let written = str::strncpy(dest, src, clamped)?;
                healed(written, action)
            }
            None => report(level, err),
        },
        Err(err) => report(level, err),
    }
}

/// Guarded [`str::strcat`]. Hardened mode appends what fits and terminates.
pub fn strcat(dest: &mut [u8], src: &[u8], level: SafetyLevel) -> Result<Guarded<usize>> {
    let len = str::strlen(src);
    guarded_append(dest, &src[..len], level, |dest| str::strcat(dest, src))
}

/// Guarded [`str::strncat`]. Hardened mode appends what fits and terminates.
pub fn strncat(dest: &mut [u8], src: &[u8], n: usize, level: SafetyLevel) -> Result<Guarded<usize>> {
    let len = str::strlen(src).min(n);
    guarded_append(dest, &src[..len], level, |dest| str::strncat(dest, src, n))
}

fn guarded_append<F>(dest: &mut [u8], tail: &[u8], level: SafetyLevel, op: F) -> Result<Guarded<usize>>
where
    F: FnOnce(&mut [u8]) -> Result<usize>,
{
    enter(level);
    match op(dest) {
        Ok(total) => Ok(Guarded::clean(total)),
        Err(err @ StringError::DestinationTooSmall { .. }) if level.heals_enabled() => {
            let healing = str::terminated_len(dest)
                .ok()
                .and_then(|at| truncate_into(dest, at, tail));
            match healing {
                Some((total, action)) => healed(total, action),
                None => report(level, err),
            }
        }
        Err(err) => report(level, err),
    }
}

/// Guarded [`mem::memcpy`]. Hardened mode clamps `n` to both regions.
pub fn memcpy(dest: &mut [u8], src: &[u8], n: usize, level: SafetyLevel) -> Result<Guarded<usize>> {
    enter(level);
    match mem::memcpy(dest, src, n) {
        Ok(n) => Ok(Guarded::clean(n)),
        Err(err) if level.heals_enabled() => match clamp(n, Some(src.len()), Some(dest.len())) {
            Some((clamped, action)) => {
                let copied = mem::memcpy(dest, src, clamped)?;
                healed(copied, action)
            }
            None => report(level, err),
        },
        Err(err) => report(level, err),
    }
}

/// Guarded [`mem::memmove`]. Hardened mode clamps `n` so both ranges fit,
/// provided both offsets lie inside the buffer.
pub fn memmove(
    buf: &mut [u8],
    dest: usize,
    src: usize,
    n: usize,
    level: SafetyLevel,
) -> Result<Guarded<usize>> {
    enter(level);
    match mem::memmove(buf, dest, src, n) {
        Ok(n) => Ok(Guarded::clean(n)),
        Err(err) if level.heals_enabled() && dest <= buf.len() && src <= buf.len() => {
            let healing = clamp(n, Some(buf.len() - src), Some(buf.len() - dest));
            match healing {
                Some((clamped, action)) => {
                    let moved = mem::memmove(buf, dest, src, clamped)?;
                    healed(moved, action)
                }
                None => report(level, err),
            }
        }
        Err(err) => report(level, err),
    }
}

/// Guarded [`mem::memset`]. Hardened mode clamps `n` to the destination.
pub fn memset(dest: &mut [u8], value: i32, n: usize, level: SafetyLevel) -> Result<Guarded<usize>> {
    enter(level);
    match mem::memset(dest, value, n) {
        Ok(n) => Ok(Guarded::clean(n)),
        Err(err) if level.heals_enabled() => match clamp(n, None, Some(dest.len())) {
            Some((clamped, action)) => {
                let filled = mem::memset(dest, value, clamped)?;
                healed(filled, action)
            }
            None => report(level, err),
        },
        Err(err) => report(level, err),
    }
}

/// Guarded [`str::strdup`]. Hardened mode answers an allocation failure with
/// an empty terminated string.
pub fn strdup(s: &[u8], level: SafetyLevel) -> Result<Guarded<Vec<u8>>> {
    dup_guarded(str::strdup(s), level)
}

fn dup_guarded(dup: Result<Vec<u8>>, level: SafetyLevel) -> Result<Guarded<Vec<u8>>> {
    enter(level);
    match dup {
        Ok(copy) => Ok(Guarded::clean(copy)),
        Err(err) => {
            if level.validation_enabled() {
                global_metrics().record(GuardEvent::AllocationFailure);
            }
            if level.heals_enabled() {
                healed(vec![0], HealingAction::ReturnSafeDefault)
            } else {
                report(level, err)
            }
        }
    }
}
