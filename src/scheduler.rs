//! Fixed-interval tick trigger with skip-on-overlap.
//!
//! Each trigger tries to take the [`SingleFlight`] permit. When it is free the
//! tick runs on its own worker thread and holds the permit until its rows are
//! written; when it is taken the trigger is dropped, never queued.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, warn};

use crate::collector::{Collector, FileSystem, TickReport};

/// Guard that lets at most one tick sample at a time.
#[derive(Debug, Default, Clone)]
pub struct SingleFlight {
    busy: Arc<AtomicBool>,
}

/// Held for the duration of a tick; releases the [`SingleFlight`] on drop.
#[derive(Debug)]
pub struct FlightPermit {
    busy: Arc<AtomicBool>,
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves Idle -> Sampling, or returns `None` if a tick is already sampling.
    pub fn try_acquire(&self) -> Option<FlightPermit> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| FlightPermit {
                busy: Arc::clone(&self.busy),
            })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

impl Drop for FlightPermit {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

/// Result of one trigger.
#[derive(Debug)]
pub enum TickOutcome {
    /// The tick is sampling on the returned worker.
    Started(JoinHandle<io::Result<TickReport>>),
    /// A previous tick was still sampling; this trigger was dropped.
    Skipped,
}

/// When to trigger ticks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    pub interval: Duration,
    /// Stop after this many triggers, skipped ones included.
    pub max_ticks: Option<u64>,
}

/// Totals of a [`Sampler::run`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub triggered: u64,
    pub skipped: u64,
    pub completed: u64,
    pub rows: u64,
}

impl RunSummary {
    fn record(&mut self, report: TickReport) {
        self.completed += 1;
        self.rows += report.rows as u64;
    }
}

/// Drives a [`Collector`] into a shared writer, one tick at a time.
pub struct Sampler<F: FileSystem, W: Write + Send> {
    collector: Arc<Collector<F>>,
    out: Arc<Mutex<W>>,
    flight: SingleFlight,
}

impl<F, W> Sampler<F, W>
where
    F: FileSystem + 'static,
    W: Write + Send + 'static,
{
    pub fn new(collector: Collector<F>, out: W) -> Self {
        Self {
            collector: Arc::new(collector),
            out: Arc::new(Mutex::new(out)),
            flight: SingleFlight::new(),
        }
    }

    pub fn flight(&self) -> &SingleFlight {
        &self.flight
    }

    /// Fires one tick unless another is still sampling.
    ///
    /// The tick captures its timestamp when its worker starts and writes all of
    /// its rows under the writer lock.
    pub fn trigger(&self) -> io::Result<TickOutcome> {
        let Some(permit) = self.flight.try_acquire() else {
            warn!("Previous tick still sampling, skipping this one");
            return Ok(TickOutcome::Skipped);
        };

        let collector = Arc::clone(&self.collector);
        let out = Arc::clone(&self.out);
        let handle = thread::Builder::new()
            .name("procfs-tick".to_string())
            .spawn(move || {
                let _permit = permit;
                let timestamp = Utc::now().timestamp_millis();
                let mut out = out.lock().unwrap_or_else(PoisonError::into_inner);
                collector.write_tick(timestamp, &mut *out)
            })?;

        Ok(TickOutcome::Started(handle))
    }

    /// Triggers ticks on `schedule` until `running` is cleared or the tick
    /// budget is spent, then waits for the last tick to finish.
    ///
    /// Returns the first write error, which ends the run.
    pub fn run(&self, schedule: &Schedule, running: &AtomicBool) -> io::Result<RunSummary> {
        let mut summary = RunSummary::default();
        let mut in_flight: Option<JoinHandle<io::Result<TickReport>>> = None;

        while running.load(Ordering::SeqCst) {
            if let Some(handle) = in_flight.take_if(|h| h.is_finished()) {
                summary.record(reap(handle)?);
            }

            summary.triggered += 1;
            match self.trigger()? {
                TickOutcome::Started(handle) => {
                    if let Some(previous) = in_flight.replace(handle) {
                        summary.record(reap(previous)?);
                    }
                }
                TickOutcome::Skipped => summary.skipped += 1,
            }

            if schedule.max_ticks.is_some_and(|max| summary.triggered >= max) {
                debug!("Tick budget of {} reached", summary.triggered);
                break;
            }

            sleep_while_running(schedule.interval, running);
        }

        if let Some(handle) = in_flight {
            summary.record(reap(handle)?);
        }

        Ok(summary)
    }
}

fn reap(handle: JoinHandle<io::Result<TickReport>>) -> io::Result<TickReport> {
    handle
        .join()
        .map_err(|_| io::Error::other("tick worker panicked"))?
}

/// Sleeps for `interval` in short slices so a shutdown request is seen promptly.
fn sleep_while_running(interval: Duration, running: &AtomicBool) {
    let sleep_interval = Duration::from_millis(100);
    let mut remaining = interval;
    while remaining > Duration::ZERO && running.load(Ordering::SeqCst) {
        let sleep_time = remaining.min(sleep_interval);
        thread::sleep(sleep_time);
        remaining = remaining.saturating_sub(sleep_time);
    }
}
