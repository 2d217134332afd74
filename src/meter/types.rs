use serde::{Deserialize, Serialize};

/// Allocation rate in bytes per second.
pub type Rate = i64;

/// One reading of every counter the estimator needs, taken in a single tick.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Monotonic clock reading in milliseconds.
    pub timestamp_ms: u64,
    /// Bytes currently live on the heap.
    pub heap_used: u64,
    /// Completed collection cycles since process start.
    pub gc_cycles: u64,
    /// Bytes allocated by all live threads since process start, `None` when
    /// the runtime cannot report per-thread allocation.
    pub thread_allocated_total: Option<u128>,
}

/// Which signal produced an estimate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    HeapDelta,
    ThreadAllocated,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Estimate {
    pub rate: Rate,
    pub strategy: Strategy,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeterState {
    Idle,
    Running,
    Stopping,
    Stopped,
}

impl MeterState {
    pub(crate) fn as_u8(self) -> u8 {
        match self {
            MeterState::Idle => 0,
            MeterState::Running => 1,
            MeterState::Stopping => 2,
            MeterState::Stopped => 3,
        }
    }

    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            0 => MeterState::Idle,
            1 => MeterState::Running,
            2 => MeterState::Stopping,
            _ => MeterState::Stopped,
        }
    }
}
