//! Tick collector that dispatches the enabled readers in a fixed order.
//!
//! The `Collector` turns one tick into the ordered list of rows for that tick:
//! cpu, then memory, then network, then io, system-wide rows before the
//! per-process ones.

use std::fmt::Write as _;
use std::io::{self, Write};
use std::path::Path;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::collector::procfs::parser::{CpuTimes, MemInfo, NetDevCounters, ProcIo, ProcMemory};
use crate::collector::procfs::{CollectError, ProcessCollector, SystemCollector};
use crate::collector::traits::FileSystem;
use crate::config::MonitorConfig;
use crate::model::{MetricCategory, Metrics, Row};

/// Summary of one written tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    /// Timestamp shared by every row of the tick (ms since epoch).
    pub timestamp: i64,
    /// Number of CSV lines written.
    pub rows: usize,
    /// Reader invocations that fell back to the sentinel.
    pub fallbacks: usize,
    /// Time spent reading and writing.
    pub elapsed: Duration,
}

/// Rows of one tick, in dispatch order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tick {
    pub rows: Vec<Row>,
    pub fallbacks: usize,
}

impl From<CpuTimes> for Metrics {
    fn from(t: CpuTimes) -> Self {
        Metrics::Cpu {
            user_time: t.user,
            system_time: t.system,
        }
    }
}

impl From<MemInfo> for Metrics {
    fn from(m: MemInfo) -> Self {
        Metrics::SystemMemory {
            mem_total: m.mem_total,
            mem_free: m.mem_free,
            cached: m.cached,
        }
    }
}

impl From<ProcMemory> for Metrics {
    fn from(m: ProcMemory) -> Self {
        Metrics::ProcessMemory {
            vm_size: m.vm_size,
            vm_rss: m.vm_rss,
        }
    }
}

impl From<NetDevCounters> for Metrics {
    fn from(n: NetDevCounters) -> Self {
        Metrics::Network {
            interface: n.interface,
            receive: n.rx_bytes,
            transmit: n.tx_bytes,
        }
    }
}

impl From<ProcIo> for Metrics {
    fn from(io: ProcIo) -> Self {
        Metrics::Io {
            rchar: io.rchar,
            wchar: io.wchar,
            read_bytes: io.read_bytes,
            write_bytes: io.write_bytes,
        }
    }
}

/// Collects the rows of a tick for an immutable [`MonitorConfig`].
pub struct Collector<F: FileSystem> {
    config: MonitorConfig,
    system: SystemCollector<F>,
    process: ProcessCollector<F>,
}

impl<F: FileSystem + Clone> Collector<F> {
    /// Creates a new collector.
    ///
    /// # Arguments
    /// * `fs` - Filesystem implementation (real or mock)
    /// * `config` - Enabled categories and targets; its proc root locates every source
    pub fn new(fs: F, config: MonitorConfig) -> Self {
        let system = SystemCollector::new(fs.clone(), config.proc_root());
        Self {
            system,
            process: ProcessCollector::new(fs),
            config,
        }
    }
}

impl<F: FileSystem> Collector<F> {
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Runs every enabled reader once and returns the rows in dispatch order.
    ///
    /// Read failures never escape: the affected row carries the sentinel and
    /// the failure is counted in [`Tick::fallbacks`].
    pub fn collect_tick(&self, timestamp: i64) -> Tick {
        let mut tick = Tick::default();
        let targets = self.config.targets();

        if self.config.is_enabled(MetricCategory::Cpu) {
            let path = self.system.stat_path();
            let times = resolve(self.system.collect_cpu(), &path, &mut tick.fallbacks)
                .unwrap_or_else(CpuTimes::unavailable);
            tick.rows.push(row(&path, timestamp, times));

            for target in targets {
                let path = target.stat_path();
                let times = resolve(self.process.collect_cpu(target), &path, &mut tick.fallbacks)
                    .unwrap_or_else(CpuTimes::unavailable);
                tick.rows.push(row(&path, timestamp, times));
            }
        }

        if self.config.is_enabled(MetricCategory::Memory) {
            let path = self.system.meminfo_path();
            let info = resolve(self.system.collect_meminfo(), &path, &mut tick.fallbacks)
                .unwrap_or_else(MemInfo::unavailable);
            tick.rows.push(row(&path, timestamp, info));

            for target in targets {
                let path = target.status_path();
                let mem = resolve(
                    self.process.collect_memory(target),
                    &path,
                    &mut tick.fallbacks,
                )
                .unwrap_or_else(ProcMemory::unavailable);
                tick.rows.push(row(&path, timestamp, mem));
            }
        }

        if self.config.is_enabled(MetricCategory::Network) {
            let path = self.system.net_dev_path();
            let devices = resolve(self.system.collect_net_dev(), &path, &mut tick.fallbacks)
                .unwrap_or_else(|| vec![NetDevCounters::unavailable()]);
            for device in devices {
                tick.rows.push(row(&path, timestamp, device));
            }
        }

        if self.config.is_enabled(MetricCategory::Io) {
            for target in targets {
                let path = target.io_path();
                let io = resolve(self.process.collect_io(target), &path, &mut tick.fallbacks)
                    .unwrap_or_else(ProcIo::unavailable);
                tick.rows.push(row(&path, timestamp, io));
            }
        }

        tick
    }

    /// Collects a tick and writes its rows to `out` as one contiguous block.
    pub fn write_tick(&self, timestamp: i64, out: &mut dyn Write) -> io::Result<TickReport> {
        let start = Instant::now();
        let tick = self.collect_tick(timestamp);

        let mut buf = String::new();
        for row in &tick.rows {
            // Writing into a String cannot fail.
            let _ = writeln!(buf, "{}", row.csv_line());
        }
        out.write_all(buf.as_bytes())?;
        out.flush()?;

        let report = TickReport {
            timestamp,
            rows: tick.rows.len(),
            fallbacks: tick.fallbacks,
            elapsed: start.elapsed(),
        };
        debug!(
            "Tick {}: {} rows, {} fallbacks, {:?}",
            report.timestamp, report.rows, report.fallbacks, report.elapsed
        );
        Ok(report)
    }
}

/// Logs a failed read and counts it, leaving the sentinel choice to the caller.
fn resolve<T>(result: Result<T, CollectError>, path: &Path, fallbacks: &mut usize) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            debug!("{}: {}, reporting -1", path.display(), e);
            *fallbacks += 1;
            None
        }
    }
}

fn row(path: &Path, timestamp: i64, metrics: impl Into<Metrics>) -> Row {
    Row::new(path.display().to_string(), timestamp, metrics.into())
}
