//! Self-healing policy engine.
//!
//! In hardened mode a contract violation is not reported to the caller.
//! A deterministic healing action is chosen instead, applied by the guarded
//! entry point, and counted here.

use std::sync::atomic::{AtomicU64, Ordering};

/// Actions the membrane can take to heal an unsafe operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HealingAction {
    /// Clamp a size/length parameter to fit within known bounds.
    ClampSize { requested: usize, clamped: usize },
    /// Truncate output and ensure null termination for string ops.
    TruncateWithNull { requested: usize, truncated: usize },
    /// Return a safe default value instead of performing the operation.
    ReturnSafeDefault,
    /// No healing needed; the operation is valid.
    None,
}

impl HealingAction {
    /// Returns true if this action represents an actual healing (not None).
    #[must_use]
    pub const fn is_heal(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// Stable name used in structured logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ClampSize { .. } => "ClampSize",
            Self::TruncateWithNull { .. } => "TruncateWithNull",
            Self::ReturnSafeDefault => "ReturnSafeDefault",
            Self::None => "None",
        }
    }
}

/// Decides healing actions and counts the ones applied.
pub struct HealingPolicy {
    total: AtomicU64,
    by_kind: [AtomicU64; 3],
}

/// Point-in-time copy of the healing counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HealingSnapshot {
    pub total_heals: u64,
    pub size_clamps: u64,
    pub null_truncations: u64,
    pub safe_defaults: u64,
}

const CLAMP: usize = 0;
const TRUNCATE: usize = 1;
const SAFE_DEFAULT: usize = 2;

impl HealingPolicy {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            total: AtomicU64::new(0),
            by_kind: [const { AtomicU64::new(0) }; 3],
        }
    }

    /// Count an applied action. `HealingAction::None` is ignored.
    pub fn record(&self, action: &HealingAction) {
        let slot = match action {
            HealingAction::ClampSize { .. } => CLAMP,
            HealingAction::TruncateWithNull { .. } => TRUNCATE,
            HealingAction::ReturnSafeDefault => SAFE_DEFAULT,
            HealingAction::None => return,
        };
        self.total.fetch_add(1, Ordering::Relaxed);
        self.by_kind[slot].fetch_add(1, Ordering::Relaxed);
    }

    /// Healing for a raw copy or fill of `requested` bytes.
    ///
    /// `src_remaining` / `dst_remaining` are the bytes actually available on
    /// each side; `None` means that side is unconstrained.
    #[must_use]
    pub fn heal_copy_bounds(
        &self,
        requested: usize,
        src_remaining: Option<usize>,
        dst_remaining: Option<usize>,
    ) -> HealingAction {
        match src_remaining.into_iter().chain(dst_remaining).min() {
            Some(available) if requested > available => HealingAction::ClampSize {
                requested,
                clamped: available,
            },
            _ => HealingAction::None,
        }
    }

    /// Healing for writing a `src_len`-byte string plus its terminator into
    /// `dst_remaining` bytes. The truncated length leaves room for the NUL.
    #[must_use]
    pub fn heal_string_bounds(&self, src_len: usize, dst_remaining: Option<usize>) -> HealingAction {
        match dst_remaining {
            Some(remaining) if src_len >= remaining => HealingAction::TruncateWithNull {
                requested: src_len,
                truncated: remaining.saturating_sub(1),
            },
            _ => HealingAction::None,
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> HealingSnapshot {
        let kind = |slot: usize| self.by_kind[slot].load(Ordering::Relaxed);
        HealingSnapshot {
            total_heals: self.total.load(Ordering::Relaxed),
            size_clamps: kind(CLAMP),
            null_truncations: kind(TRUNCATE),
            safe_defaults: kind(SAFE_DEFAULT),
        }
    }
}

impl Default for HealingPolicy {
    fn default() -> Self {
        Self::new()
    }
}

/// Global healing policy instance.
static GLOBAL_POLICY: HealingPolicy = HealingPolicy::new();

/// Access the global healing policy.
#[must_use]
pub fn global_healing_policy() -> &'static HealingPolicy {
    &GLOBAL_POLICY
}
