//! Safety membrane for strprim.
//!
//! Sits between callers and the strict string primitives. It decides how a
//! contract violation is handled (report vs. heal) and keeps the counters that
//! make those decisions observable.
//!
//! - **Configuration** (`config`): runtime safety level from `STRPRIM_MODE`
//! - **Self-healing engine** (`heal`): deterministic repair policies
//! - **Metrics** (`metrics`): atomic counters for observability

#![deny(unsafe_code)]

pub mod config;
pub mod heal;
pub mod metrics;

pub use config::{SafetyLevel, safety_level};
pub use heal::{HealingAction, HealingPolicy, HealingSnapshot, global_healing_policy};
pub use metrics::{GuardEvent, MembraneMetrics, MetricsSnapshot, global_metrics};
