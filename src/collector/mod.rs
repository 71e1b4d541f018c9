//! Metrics collection from the Linux `/proc` filesystem.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          Collector                           │
//! │  ┌──────────────────────┐   ┌─────────────────────────────┐  │
//! │  │  ProcessCollector    │   │     SystemCollector         │  │
//! │  │  - /proc/[pid]/stat  │   │  - /proc/stat               │  │
//! │  │  - /proc/[pid]/status│   │  - /proc/meminfo            │  │
//! │  │  - /proc/[pid]/io    │   │  - /proc/net/dev            │  │
//! │  └──────────┬───────────┘   └──────────────┬──────────────┘  │
//! │             └───────────────┬──────────────┘                 │
//! │                      ┌──────▼──────┐                         │
//! │                      │  FileSystem │ (trait)                 │
//! │                      └──────┬──────┘                         │
//! └─────────────────────────────┼────────────────────────────────┘
//!                        ┌──────┴───────┐
//!                 ┌──────▼──────┐ ┌─────▼───────┐
//!                 │   RealFs    │ │   MockFs    │
//!                 │  (Linux)    │ │  (Testing)  │
//!                 └─────────────┘ └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```
//! use procfs_csv::collector::{Collector, MockFs};
//! use procfs_csv::config::classify;
//!
//! let config = classify(["--cpu", "--memory", "1234"], "/proc").unwrap();
//! let collector = Collector::new(MockFs::typical_system(), config);
//! let tick = collector.collect_tick(0);
//! assert_eq!(tick.rows.len(), 4);
//! ```

#[allow(clippy::module_inception)]
mod collector;
pub mod mock;
pub mod procfs;
pub mod traits;

pub use collector::{Collector, Tick, TickReport};
pub use mock::MockFs;
pub use procfs::CollectError;
pub use traits::{FileSystem, RealFs};
