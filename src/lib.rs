//! procfs-csv: periodic `/proc` sampler that prints wide CSV rows.
//!
//! Provides:
//! - `config`: classification of metric selectors and process ids
//! - `collector`: `/proc` readers and the per-tick dispatch
//! - `model`: metric categories and the 16-column output row
//! - `scheduler`: fixed-interval trigger with skip-on-overlap

pub mod collector;
pub mod config;
pub mod model;
pub mod scheduler;
