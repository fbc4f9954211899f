//! Runtime mode configuration.
//!
//! The runtime mode is read once from the `STRPRIM_MODE` environment
//! variable:
//! - `strict` (default): contract violations (short destination, short source,
//!   missing terminator) are reported to the caller as errors. Nothing is
//!   rewritten.
//! - `hardened`: guarded entry points repair violations deterministically
//!   and record each repair.
//!
//! `Off` is not reachable from the environment. Benchmarks pick it through
//! [`SafetyLevel::from_str_loose`] to measure the guarded path without
//! bookkeeping.

use std::sync::atomic::{AtomicU8, Ordering};

/// Environment variable holding the runtime mode.
pub const MODE_ENV_VAR: &str = "STRPRIM_MODE";

/// Runtime operating mode for the guarded entry points.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SafetyLevel {
    /// Contract violations surface as errors.
    #[default]
    Strict,
    /// Contract violations are healed and recorded.
    Hardened,
    /// No bookkeeping. Benchmark baseline only.
    Off,
}

impl SafetyLevel {
    /// Parse any accepted spelling (case-insensitive); unknown input is Strict.
    #[must_use]
    pub fn from_str_loose(s: &str) -> Self {
        let s = s.trim().to_ascii_lowercase();
        match s.as_str() {
            "off" | "none" | "disabled" => Self::Off,
            _ => Self::from_env_value(&s),
        }
    }

    /// Parse an environment value: strict or hardened spellings only.
    #[must_use]
    pub fn from_env_value(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "hardened" | "repair" | "tsm" | "full" => Self::Hardened,
            // strict, default, abi, and anything unrecognized
            _ => Self::Strict,
        }
    }

    /// Canonical lowercase name, as used in fixtures and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Hardened => "hardened",
            Self::Off => "off",
        }
    }

    /// Returns true if guarded entry points should heal violations.
    #[must_use]
    pub const fn heals_enabled(self) -> bool {
        matches!(self, Self::Hardened)
    }

    /// Returns true if calls are counted and violations recorded.
    #[must_use]
    pub const fn validation_enabled(self) -> bool {
        !matches!(self, Self::Off)
    }

    const fn code(self) -> u8 {
        match self {
            Self::Strict => 1,
            Self::Hardened => 2,
            Self::Off => 3,
        }
    }

    const fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Strict),
            2 => Some(Self::Hardened),
            3 => Some(Self::Off),
            _ => None,
        }
    }
}

impl std::fmt::Display for SafetyLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolve-once cell for the process mode.
///
/// Holds 0 until a resolver claims it, [`ModeCell::RESOLVING`] while the
/// winner reads the environment, then the level's code. Readers that arrive
/// mid-resolution see Strict rather than blocking.
struct ModeCell(AtomicU8);

impl ModeCell {
    const UNRESOLVED: u8 = 0;
    const RESOLVING: u8 = u8::MAX;

    const fn new() -> Self {
        Self(AtomicU8::new(Self::UNRESOLVED))
    }

    fn get_or_resolve(&self, resolve: impl FnOnce() -> SafetyLevel) -> SafetyLevel {
        let current = self.0.load(Ordering::Acquire);
        if let Some(level) = SafetyLevel::from_code(current) {
            return level;
        }
        if current == Self::RESOLVING {
            return SafetyLevel::Strict;
        }

        match self.0.compare_exchange(
            Self::UNRESOLVED,
            Self::RESOLVING,
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            Ok(_) => {
                let level = resolve();
                self.0.store(level.code(), Ordering::Release);
                level
            }
            Err(seen) => SafetyLevel::from_code(seen).unwrap_or_default(),
        }
    }
}

static PROCESS_MODE: ModeCell = ModeCell::new();

/// The process safety level: `STRPRIM_MODE` on first call, cached thereafter.
#[must_use]
pub fn safety_level() -> SafetyLevel {
    PROCESS_MODE.get_or_resolve(|| {
        std::env::var(MODE_ENV_VAR)
            .map(|v| SafetyLevel::from_env_value(&v))
            .unwrap_or_default()
    })
}
