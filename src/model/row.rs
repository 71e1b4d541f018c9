//! The wide CSV row every reader is flattened into.
//!
//! Each line carries all sixteen columns. A reader only fills the columns of
//! its own metric category; the rest hold [`SENTINEL`].

use std::borrow::Cow;
use std::io::{self, Write};

/// Placeholder for a column that does not apply or could not be read.
pub const SENTINEL: &str = "-1";

/// Number of columns in every emitted line, header included.
pub const COLUMN_COUNT: usize = 16;

/// Column names, in output order.
pub const HEADER: [&str; COLUMN_COUNT] = [
    "SourceFile",
    "Timestamp",
    "userTime",
    "systemTime",
    "MemTotal",
    "MemFree",
    "Cached",
    "VmSize",
    "VmRSS",
    "Interface",
    "Receive",
    "Transmit",
    "rchar",
    "wchar",
    "read_bytes",
    "write_bytes",
];

const SOURCE_FILE: usize = 0;
const TIMESTAMP: usize = 1;
const USER_TIME: usize = 2;
const SYSTEM_TIME: usize = 3;
const MEM_TOTAL: usize = 4;
const MEM_FREE: usize = 5;
const CACHED: usize = 6;
const VM_SIZE: usize = 7;
const VM_RSS: usize = 8;
const INTERFACE: usize = 9;
const RECEIVE: usize = 10;
const TRANSMIT: usize = 11;
const RCHAR: usize = 12;
const WCHAR: usize = 13;
const READ_BYTES: usize = 14;
const WRITE_BYTES: usize = 15;

/// Returns the header as a single comma-separated line (no newline).
pub fn header_line() -> String {
    HEADER.join(",")
}

/// Quotes `value` when it contains a comma, a double quote or a line break.
///
/// Embedded double quotes are doubled. Anything else is returned as is.
pub fn quote_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

/// Writes the header line to `out`.
pub fn write_header(out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "{}", header_line())
}

/// Values produced by one reader invocation.
///
/// Every value is the raw text taken from the source file, or [`SENTINEL`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Metrics {
    /// User and system ticks, system-wide or for one process.
    Cpu { user_time: String, system_time: String },
    /// `/proc/meminfo` totals in kB.
    SystemMemory {
        mem_total: String,
        mem_free: String,
        cached: String,
    },
    /// `/proc/[pid]/status` sizes in kB.
    ProcessMemory { vm_size: String, vm_rss: String },
    /// One interface line of `/proc/net/dev`.
    Network {
        interface: String,
        receive: String,
        transmit: String,
    },
    /// `/proc/[pid]/io` counters.
    Io {
        rchar: String,
        wchar: String,
        read_bytes: String,
        write_bytes: String,
    },
}

/// One output line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub source_file: String,
    /// Milliseconds since the Unix epoch, shared by all rows of a tick.
    pub timestamp: i64,
    pub metrics: Metrics,
}

impl Row {
    pub fn new(source_file: impl Into<String>, timestamp: i64, metrics: Metrics) -> Self {
        Self {
            source_file: source_file.into(),
            timestamp,
            metrics,
        }
    }

    /// Maps the row onto the fixed column layout.
    pub fn columns(&self) -> [String; COLUMN_COUNT] {
        let mut cols: [String; COLUMN_COUNT] = std::array::from_fn(|_| SENTINEL.to_string());
        cols[SOURCE_FILE] = self.source_file.clone();
        cols[TIMESTAMP] = self.timestamp.to_string();

        match &self.metrics {
            Metrics::Cpu {
                user_time,
                system_time,
            } => {
                cols[USER_TIME] = user_time.clone();
                cols[SYSTEM_TIME] = system_time.clone();
            }
            Metrics::SystemMemory {
                mem_total,
                mem_free,
                cached,
            } => {
                cols[MEM_TOTAL] = mem_total.clone();
                cols[MEM_FREE] = mem_free.clone();
                cols[CACHED] = cached.clone();
            }
            Metrics::ProcessMemory { vm_size, vm_rss } => {
                cols[VM_SIZE] = vm_size.clone();
                cols[VM_RSS] = vm_rss.clone();
            }
            Metrics::Network {
                interface,
                receive,
                transmit,
            } => {
                cols[INTERFACE] = interface.clone();
                cols[RECEIVE] = receive.clone();
                cols[TRANSMIT] = transmit.clone();
            }
            Metrics::Io {
                rchar,
                wchar,
                read_bytes,
                write_bytes,
            } => {
                cols[RCHAR] = rchar.clone();
                cols[WCHAR] = wchar.clone();
                cols[READ_BYTES] = read_bytes.clone();
                cols[WRITE_BYTES] = write_bytes.clone();
            }
        }

        cols
    }

    /// Formats the row as a comma-joined line without the trailing newline.
    ///
    /// Values that would split the line are quoted by [`quote_field`].
    pub fn csv_line(&self) -> String {
        let cols = self.columns();
        let fields: Vec<Cow<'_, str>> = cols.iter().map(|c| quote_field(c)).collect();
        fields.join(",")
    }
}
