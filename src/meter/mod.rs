mod estimator;
#[cfg(feature = "process-stats")]
mod process;
mod provider;
mod sampler;
mod snapshot;
mod types;

pub use estimator::{estimate, RateEstimator};
#[cfg(feature = "process-stats")]
pub use process::ProcessStatsProvider;
pub use provider::RuntimeStatsProvider;
pub use sampler::{AllocationRateMeter, AllocationRateMeterHandle, RateCallback};
pub use snapshot::Sampler;
pub use types::{Estimate, MeterState, Rate, Snapshot, Strategy};
