use sysinfo::{Pid, System};

use super::provider::RuntimeStatsProvider;
use crate::error::{MeterError, Result};

/// Reads the resident memory of the current process through `sysinfo`.
///
/// A native process has no collector and no per-thread allocation counters,
/// so this provider reports a constant cycle count and leaves the thread
/// aggregate unavailable. Only growth of the resident set yields a rate.
pub struct ProcessStatsProvider {
    system: System,
    pid: Pid,
}

impl ProcessStatsProvider {
    pub fn new() -> Result<Self> {
        let pid = sysinfo::get_current_pid()
            .map_err(|err| MeterError::counter_unavailable("heap_used", err))?;
        Ok(Self::for_pid(pid))
    }

    pub fn for_pid(pid: Pid) -> Self {
        ProcessStatsProvider {
            system: System::new(),
            pid,
        }
    }
}

impl RuntimeStatsProvider for ProcessStatsProvider {
    fn heap_used(&mut self) -> Result<u64> {
        if !self.system.refresh_process(self.pid) {
            return Err(MeterError::counter_unavailable(
                "heap_used",
                format!("process {} no longer found", self.pid),
            ));
        }
        self.system
            .process(self.pid)
            .map(|process| process.memory())
            .ok_or_else(|| {
                MeterError::counter_unavailable(
                    "heap_used",
                    format!("process {} no longer found", self.pid),
                )
            })
    }

    fn gc_cycles(&mut self) -> Result<u64> {
        Ok(0)
    }

    fn thread_allocated_bytes(&mut self) -> Result<Option<Vec<u64>>> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_process_memory() {
        let mut provider = ProcessStatsProvider::new().unwrap();

        let heap_used = provider.heap_used().unwrap();

        assert!(heap_used > 0, "expected a resident set, got {}", heap_used);
        assert_eq!(0, provider.gc_cycles().unwrap());
        assert_eq!(None, provider.thread_allocated_bytes().unwrap());
    }

    #[test]
    fn test_vanished_process() {
        let mut provider = ProcessStatsProvider::for_pid(Pid::from_u32(u32::MAX - 1));

        let result = provider.heap_used();

        assert_eq!(
            Err(MeterError::counter_unavailable("heap_used", "")),
            result
        );
    }
}
