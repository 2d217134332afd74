use std::time::Instant;

use log::trace;

use super::provider::RuntimeStatsProvider;
use super::types::Snapshot;
use crate::error::Result;

/// Captures snapshots from a provider, timestamped against a fixed monotonic origin.
pub struct Sampler<P> {
    provider: P,
    origin: Instant,
}

impl<P: RuntimeStatsProvider> Sampler<P> {
    pub fn new(provider: P) -> Self {
        Sampler {
            provider,
            origin: Instant::now(),
        }
    }

    pub fn sample(&mut self) -> Result<Snapshot> {
        let heap_used = self.provider.heap_used()?;
        let gc_cycles = self.provider.gc_cycles()?;
        let thread_allocated_total = self
            .provider
            .thread_allocated_bytes()?
            .map(|per_thread| sum_allocated(&per_thread));
        let timestamp_ms = self.origin.elapsed().as_millis().min(u64::MAX as u128) as u64;

        let snapshot = Snapshot {
            timestamp_ms,
            heap_used,
            gc_cycles,
            thread_allocated_total,
        };
        trace!("captured {:?}", snapshot);
        Ok(snapshot)
    }
}

// Lifetime totals of many threads can exceed 64 bits.
fn sum_allocated(per_thread: &[u64]) -> u128 {
    per_thread.iter().map(|bytes| *bytes as u128).sum()
}
