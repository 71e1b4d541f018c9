//! procfs-csv - samples /proc on a fixed interval and prints CSV rows.
//!
//! The header and rows go to stdout; every diagnostic goes to stderr.

use std::ffi::OsString;
use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use clap::Parser;
use tracing::{Level, debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use procfs_csv::collector::{Collector, FileSystem, RealFs};
use procfs_csv::config::{MonitorConfig, classify};
use procfs_csv::model::write_header;
use procfs_csv::scheduler::{Sampler, Schedule};

/// Exit code for rejected arguments, same as clap's usage errors.
const EXIT_CONFIG: u8 = 2;
const EXIT_SUCCESS: u8 = 0;
const EXIT_FAILURE: u8 = 1;

/// Periodic /proc sampler with CSV output.
#[derive(Parser, Debug)]
#[command(
    name = "procfs-csv",
    about = "Samples /proc on a fixed interval and prints CSV rows",
    version
)]
struct Args {
    /// Sampling interval in seconds.
    #[arg(short, long, default_value = "1", value_parser = clap::value_parser!(u64).range(1..))]
    interval: u64,

    /// Path to /proc filesystem (for sampling a mounted copy).
    #[arg(long, default_value = "/proc")]
    proc_path: String,

    /// Stop after this many ticks. Runs until Ctrl-C if omitted.
    #[arg(short, long)]
    count: Option<u64>,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is info level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,

    /// Metrics (--cpu, --memory, --network, --io) and process ids, in any order.
    /// Must come after the options above.
    #[arg(
        value_name = "SELECTOR",
        num_args = 0..,
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    selectors: Vec<String>,
}

/// Parses the command line.
///
/// clap consumes a bare `--` as its end-of-options marker, which would hide it
/// from [`classify`]. Such a token is put back so it is rejected as a metric.
fn parse_args<I, T>(raw: I) -> Result<Args, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let raw: Vec<OsString> = raw.into_iter().map(Into::into).collect();
    let mut args = Args::try_parse_from(&raw)?;

    let escapes = raw.iter().skip(1).filter(|a| *a == "--").count();
    let kept = args.selectors.iter().filter(|s| *s == "--").count();
    if escapes > kept {
        args.selectors.insert(0, "--".to_string());
    }

    Ok(args)
}

fn log_level(verbose: u8, quiet: bool) -> Level {
    if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }
}

/// Advisories must survive `-q`, which only lets errors through.
fn advisory_level(quiet: bool) -> Level {
    if quiet { Level::ERROR } else { Level::WARN }
}

/// Initializes the tracing subscriber on stderr with the appropriate log level.
fn init_logging(verbose: u8, quiet: bool) {
    let level = log_level(verbose, quiet);

    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = format!("procfs_csv={}", level).parse() {
        filter = filter.add_directive(directive);
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Describes the enabled categories and targets for the startup log.
fn describe_config(config: &MonitorConfig) -> String {
    let metrics: Vec<&str> = config.categories().iter().map(|c| c.name()).collect();
    let pids: Vec<&str> = config.targets().iter().map(|t| t.pid()).collect();
    if pids.is_empty() {
        format!("metrics={}", metrics.join("+"))
    } else {
        format!("metrics={}, pids={}", metrics.join("+"), pids.join(","))
    }
}

fn main() -> ExitCode {
    let args = parse_args(std::env::args_os()).unwrap_or_else(|e| e.exit());

    init_logging(args.verbose, args.quiet);

    ExitCode::from(run(&args))
}

/// Validates the selectors, then samples until shutdown. Returns the exit code.
fn run(args: &Args) -> u8 {
    let config = match classify(&args.selectors, &args.proc_path) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return EXIT_CONFIG;
        }
    };

    for advisory in config.advisories() {
        if advisory_level(args.quiet) == Level::ERROR {
            error!("{}", advisory);
        } else {
            warn!("{}", advisory);
        }
    }

    info!("procfs-csv {} starting", env!("CARGO_PKG_VERSION"));
    info!(
        "Config: interval={}s, proc={}, {}",
        args.interval,
        args.proc_path,
        describe_config(&config)
    );

    let fs = RealFs::new();
    for target in config.targets() {
        if !fs.exists(target.stem()) {
            warn!(
                "Process {} not found under {}, its rows will report -1",
                target.pid(),
                args.proc_path
            );
        }
    }

    {
        let mut stdout = io::stdout().lock();
        if let Err(e) = write_header(&mut stdout).and_then(|_| stdout.flush()) {
            error!("Failed to write header: {}", e);
            return EXIT_FAILURE;
        }
    }

    let sampler = Sampler::new(Collector::new(fs, config), io::stdout());
    let schedule = Schedule {
        interval: Duration::from_secs(args.interval),
        max_ticks: args.count,
    };

    // Setup graceful shutdown
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    if let Err(e) = ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::SeqCst);
    }) {
        warn!("Failed to set Ctrl-C handler: {}", e);
    }

    info!("Starting sampling loop");

    match sampler.run(&schedule, &running) {
        Ok(summary) => {
            info!(
                "Shutdown complete: {} ticks, {} skipped, {} rows",
                summary.triggered, summary.skipped, summary.rows
            );
            EXIT_SUCCESS
        }
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
            debug!("Output closed by reader, stopping");
            EXIT_SUCCESS
        }
        Err(e) => {
            error!("Sampling stopped: {}", e);
            EXIT_FAILURE
        }
    }
}
