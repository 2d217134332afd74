//! Near real-time estimation of a managed runtime's heap allocation rate.
//!
//! An [`AllocationRateMeter`] samples a [`RuntimeStatsProvider`] on its own
//! background thread and hands every estimated rate, in bytes per second, to
//! a callback. Ticks whose counters cannot be reconciled are skipped.

mod config;
mod error;
mod meter;

pub use config::{MeterConfig, DEFAULT_INTERVAL_MS, INTERVAL_ENV_VAR};
pub use error::{MeterError, Result};
#[cfg(feature = "process-stats")]
pub use meter::ProcessStatsProvider;
pub use meter::{
    estimate, AllocationRateMeter, AllocationRateMeterHandle, Estimate, MeterState, Rate,
    RateCallback, RateEstimator, RuntimeStatsProvider, Sampler, Snapshot, Strategy,
};
