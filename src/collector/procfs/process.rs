//! Process collector for the per-process sources in `/proc/[pid]/`.

use crate::collector::procfs::CollectError;
use crate::collector::procfs::parser::{
    CpuTimes, ProcIo, ProcMemory, parse_proc_io, parse_proc_stat_times, parse_proc_status,
};
use crate::collector::traits::FileSystem;
use crate::config::ProcessTarget;

/// Reads `stat`, `status` and `io` of monitored processes.
pub struct ProcessCollector<F: FileSystem> {
    fs: F,
}

impl<F: FileSystem> ProcessCollector<F> {
    pub fn new(fs: F) -> Self {
        Self { fs }
    }

    /// Collects utime and stime from `/proc/[pid]/stat`.
    pub fn collect_cpu(&self, target: &ProcessTarget) -> Result<CpuTimes, CollectError> {
        let content = self.fs.read_to_string(&target.stat_path())?;
        Ok(parse_proc_stat_times(&content)?)
    }

    /// Collects VmSize and VmRSS from `/proc/[pid]/status`.
    pub fn collect_memory(&self, target: &ProcessTarget) -> Result<ProcMemory, CollectError> {
        let content = self.fs.read_to_string(&target.status_path())?;
        Ok(parse_proc_status(&content))
    }

    /// Collects I/O counters from `/proc/[pid]/io`.
    ///
    /// Reading another user's `io` fails with permission denied unless running as root.
    pub fn collect_io(&self, target: &ProcessTarget) -> Result<ProcIo, CollectError> {
        let content = self.fs.read_to_string(&target.io_path())?;
        Ok(parse_proc_io(&content))
    }
}
