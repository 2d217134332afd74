//! Reconciles the two allocation signals into a single rate.
//!
//! The heap delta between two snapshots is the accurate signal, but any
//! collection in between invalidates it. The per-thread allocation aggregate
//! survives collections but loses the totals of threads that exited, so it is
//! only used as the fallback. When neither signal is trustworthy the tick is
//! skipped rather than reported with a misleading value.

use bytesize::ByteSize;
use log::{debug, trace};

use super::types::{Estimate, Rate, Snapshot, Strategy};

/// Rate of the current tick, or `None` when the tick must be skipped.
pub fn estimate(prev: Option<&Snapshot>, cur: &Snapshot) -> Option<Rate> {
    RateEstimator::evaluate(prev, cur).map(|estimate| estimate.rate)
}

pub struct RateEstimator;

impl RateEstimator {
    pub fn evaluate(prev: Option<&Snapshot>, cur: &Snapshot) -> Option<Estimate> {
        let prev = prev?;

        if cur.timestamp_ms <= prev.timestamp_ms {
            debug!(
                "skipping tick, clock did not advance ({}ms -> {}ms)",
                prev.timestamp_ms, cur.timestamp_ms
            );
            return None;
        }
        let multiplier = 1000.0 / (cur.timestamp_ms - prev.timestamp_ms) as f64;

        let estimate = if let Some(delta) = heap_delta(prev, cur) {
            Estimate {
                rate: scale(delta, multiplier),
                strategy: Strategy::HeapDelta,
            }
        } else if let Some(delta) = thread_allocated_delta(prev, cur) {
            Estimate {
                rate: scale(delta, multiplier),
                strategy: Strategy::ThreadAllocated,
            }
        } else {
            debug!(
                "skipping tick, counters inconsistent (gc {} -> {}, heap {} -> {})",
                prev.gc_cycles, cur.gc_cycles, prev.heap_used, cur.heap_used
            );
            return None;
        };

        trace!(
            "allocation rate {}/s via {:?}",
            ByteSize(estimate.rate.max(0) as u64),
            estimate.strategy
        );
        Some(estimate)
    }
}

// Only usable when no collection ran and the heap did not shrink.
fn heap_delta(prev: &Snapshot, cur: &Snapshot) -> Option<i64> {
    if cur.gc_cycles != prev.gc_cycles || cur.heap_used < prev.heap_used {
        return None;
    }
    i64::try_from(cur.heap_used - prev.heap_used).ok()
}

fn thread_allocated_delta(prev: &Snapshot, cur: &Snapshot) -> Option<i64> {
    let (prev_total, cur_total) = (prev.thread_allocated_total?, cur.thread_allocated_total?);
    if cur_total < prev_total {
        // a thread that allocated has exited
        return None;
    }
    i64::try_from(cur_total - prev_total).ok()
}

fn scale(delta: i64, multiplier: f64) -> Rate {
    (delta as f64 * multiplier).round() as Rate
}
