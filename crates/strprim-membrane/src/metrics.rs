//! Guarded-call counters.
//!
//! Relaxed atomics; advisory only, never used for synchronization.

use std::sync::atomic::{AtomicU64, Ordering};

/// Something a guarded entry point observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GuardEvent {
    /// A guarded entry point was invoked.
    Call,
    /// A contract violation was returned to the caller as an error.
    ViolationReported,
    /// A contract violation was healed in hardened mode.
    ViolationHealed,
    /// `strdup` could not allocate.
    AllocationFailure,
}

impl GuardEvent {
    const COUNT: usize = 4;

    const fn slot(self) -> usize {
        match self {
            Self::Call => 0,
            Self::ViolationReported => 1,
            Self::ViolationHealed => 2,
            Self::AllocationFailure => 3,
        }
    }
}

/// Per-event counters for the guarded entry points.
pub struct MembraneMetrics {
    counters: [AtomicU64; GuardEvent::COUNT],
}

impl MembraneMetrics {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            counters: [const { AtomicU64::new(0) }; GuardEvent::COUNT],
        }
    }

    pub fn record(&self, event: GuardEvent) {
        self.counters[event.slot()].fetch_add(1, Ordering::Relaxed);
    }

    #[must_use]
    pub fn count(&self, event: GuardEvent) -> u64 {
        self.counters[event.slot()].load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            calls: self.count(GuardEvent::Call),
            violations_reported: self.count(GuardEvent::ViolationReported),
            violations_healed: self.count(GuardEvent::ViolationHealed),
            allocation_failures: self.count(GuardEvent::AllocationFailure),
        }
    }
}

impl Default for MembraneMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time copy of every counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub calls: u64,
    pub violations_reported: u64,
    pub violations_healed: u64,
    pub allocation_failures: u64,
}

static GLOBAL_METRICS: MembraneMetrics = MembraneMetrics::new();

/// Process-wide counters shared by every guarded call.
#[must_use]
pub fn global_metrics() -> &'static MembraneMetrics {
    &GLOBAL_METRICS
}
