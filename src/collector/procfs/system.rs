//! System collector for the system-wide sources in `/proc/`.

use crate::collector::procfs::CollectError;
use crate::collector::procfs::parser::{
    CpuTimes, MemInfo, NetDevCounters, parse_global_cpu, parse_meminfo, parse_net_dev,
};
use crate::collector::traits::FileSystem;
use std::path::{Path, PathBuf};

/// Reads `/proc/stat`, `/proc/meminfo` and `/proc/net/dev`.
pub struct SystemCollector<F: FileSystem> {
    fs: F,
    proc_path: PathBuf,
}

impl<F: FileSystem> SystemCollector<F> {
    /// Creates a new system collector.
    ///
    /// # Arguments
    /// * `fs` - Filesystem implementation (real or mock)
    /// * `proc_path` - Base path to proc filesystem (usually "/proc")
    pub fn new(fs: F, proc_path: impl AsRef<Path>) -> Self {
        Self {
            fs,
            proc_path: proc_path.as_ref().to_path_buf(),
        }
    }

    pub fn stat_path(&self) -> PathBuf {
        self.proc_path.join("stat")
    }

    pub fn meminfo_path(&self) -> PathBuf {
        self.proc_path.join("meminfo")
    }

    pub fn net_dev_path(&self) -> PathBuf {
        self.proc_path.join("net/dev")
    }

    /// Collects aggregate CPU ticks from `/proc/stat`.
    pub fn collect_cpu(&self) -> Result<CpuTimes, CollectError> {
        let content = self.fs.read_to_string(&self.stat_path())?;
        Ok(parse_global_cpu(&content)?)
    }

    /// Collects memory totals from `/proc/meminfo`.
    pub fn collect_meminfo(&self) -> Result<MemInfo, CollectError> {
        let content = self.fs.read_to_string(&self.meminfo_path())?;
        Ok(parse_meminfo(&content))
    }

    /// Collects per-interface byte counters from `/proc/net/dev`, in file order.
    pub fn collect_net_dev(&self) -> Result<Vec<NetDevCounters>, CollectError> {
        let content = self.fs.read_to_string(&self.net_dev_path())?;
        Ok(parse_net_dev(&content))
    }
}
