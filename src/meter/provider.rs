use crate::error::Result;

/// Source of the runtime counters sampled on every tick.
///
/// Implementations must answer on demand without blocking under normal
/// conditions. A reading that cannot be completed is reported as an error,
/// never replaced by a made-up value; the meter stops on the first such error.
pub trait RuntimeStatsProvider: Send + 'static {
    /// Bytes currently in use on the heap.
    fn heap_used(&mut self) -> Result<u64>;

    /// Cumulative number of completed collection cycles since process start.
    fn gc_cycles(&mut self) -> Result<u64>;

    /// Cumulative allocated bytes of every live thread, one entry per thread.
    ///
    /// Returns `Ok(None)` when the runtime does not track per-thread
    /// allocation, which disables the thread based estimate.
    fn thread_allocated_bytes(&mut self) -> Result<Option<Vec<u64>>>;
}

impl<P: RuntimeStatsProvider + ?Sized> RuntimeStatsProvider for Box<P> {
    fn heap_used(&mut self) -> Result<u64> {
        (**self).heap_used()
    }

    fn gc_cycles(&mut self) -> Result<u64> {
        (**self).gc_cycles()
    }

    fn thread_allocated_bytes(&mut self) -> Result<Option<Vec<u64>>> {
        (**self).thread_allocated_bytes()
    }
}
