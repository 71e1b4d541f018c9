//! Parsers for `/proc` filesystem files.
//!
//! These are pure functions that parse the content of various `/proc` files.
//! Values are kept as the raw text the kernel wrote; a field that cannot be
//! found holds [`SENTINEL`]. A parser only returns an error when the file has
//! none of the structure it needs.

use std::collections::HashMap;

use crate::model::SENTINEL;

/// Error type for parsing failures.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
}

impl ParseError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Parse error: {}", self.message)
    }
}

impl std::error::Error for ParseError {}

/// Field name to raw value, as read during one reader invocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sample {
    values: HashMap<String, String>,
}

impl Sample {
    /// Creates a sample where every field in `fields` holds `default`.
    pub fn with_defaults(fields: &[&str], default: &str) -> Self {
        Self {
            values: fields
                .iter()
                .map(|f| (f.to_string(), default.to_string()))
                .collect(),
        }
    }

    pub fn set(&mut self, field: &str, value: impl Into<String>) {
        self.values.insert(field.to_string(), value.into());
    }

    /// Returns the value of `field`, or [`SENTINEL`] if it was never recorded.
    pub fn value(&self, field: &str) -> &str {
        self.values.get(field).map(String::as_str).unwrap_or(SENTINEL)
    }

    /// Moves the value of `field` out, or [`SENTINEL`].
    pub fn take(&mut self, field: &str) -> String {
        self.values
            .remove(field)
            .unwrap_or_else(|| SENTINEL.to_string())
    }
}

/// Extracts `Name: value` fields from `lines`.
///
/// For every line starting with `<prefix>:` the text after the colon is reduced
/// to its ASCII digits. A later line for the same prefix overwrites an earlier
/// one, even when it leaves no digits and records an empty value. Lines with
/// more than one colon are ignored. Prefixes that never match keep `default`.
pub fn extract_fields<I, S>(lines: I, prefixes: &[&str], default: &str) -> Sample
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut sample = Sample::with_defaults(prefixes, default);

    for line in lines {
        let line = line.as_ref();
        for prefix in prefixes {
            let Some(rest) = line
                .strip_prefix(prefix)
                .and_then(|rest| rest.strip_prefix(':'))
            else {
                continue;
            };
            if rest.contains(':') {
                continue;
            }
            let digits: String = rest.chars().filter(char::is_ascii_digit).collect();
            sample.set(prefix, digits);
        }
    }

    sample
}

/// User and system time in clock ticks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CpuTimes {
    pub user: String,
    pub system: String,
}

impl CpuTimes {
    pub fn unavailable() -> Self {
        Self {
            user: SENTINEL.to_string(),
            system: SENTINEL.to_string(),
        }
    }
}

/// Parses the aggregate `cpu ` line of `/proc/stat`.
///
/// Format: `cpu  user nice system idle iowait irq softirq ...`
/// Only the first aggregate line is considered; per-core `cpuN` lines are skipped.
pub fn parse_global_cpu(content: &str) -> Result<CpuTimes, ParseError> {
    let line = content
        .lines()
        .find(|line| line.starts_with("cpu "))
        .ok_or_else(|| ParseError::new("missing aggregate cpu line in stat"))?;

    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < 4 {
        return Err(ParseError::new(format!(
            "not enough fields in cpu line: expected 4+, got {}",
            parts.len()
        )));
    }

    Ok(CpuTimes {
        user: parts[1].to_string(),
        system: parts[3].to_string(),
    })
}

/// Splits a `/proc/[pid]/stat` line into tokens.
///
/// The command name sits in parentheses and may contain spaces, so everything
/// from the first '(' to the last ')' stays one token.
fn stat_tokens(line: &str) -> Vec<&str> {
    if let (Some(open), Some(close)) = (line.find('('), line.rfind(')'))
        && open < close
    {
        let mut tokens: Vec<&str> = line[..open].split_whitespace().collect();
        tokens.push(&line[open..=close]);
        tokens.extend(line[close + 1..].split_whitespace());
        return tokens;
    }
    line.split_whitespace().collect()
}

/// Parses utime and stime from `/proc/[pid]/stat`.
///
/// Token 13 is utime and token 14 is stime, counting the pid as token 0.
pub fn parse_proc_stat_times(content: &str) -> Result<CpuTimes, ParseError> {
    let line = content
        .lines()
        .next()
        .ok_or_else(|| ParseError::new("empty stat"))?;

    let tokens = stat_tokens(line);
    if tokens.len() < 15 {
        return Err(ParseError::new(format!(
            "not enough fields in stat: expected 15+, got {}",
            tokens.len()
        )));
    }

    Ok(CpuTimes {
        user: tokens[13].to_string(),
        system: tokens[14].to_string(),
    })
}

pub const MEMINFO_FIELDS: [&str; 3] = ["MemTotal", "MemFree", "Cached"];

/// System memory totals from `/proc/meminfo`, in kB.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemInfo {
    pub mem_total: String,
    pub mem_free: String,
    pub cached: String,
}

impl MemInfo {
    pub fn unavailable() -> Self {
        Self::from_sample(Sample::default())
    }

    fn from_sample(mut sample: Sample) -> Self {
        Self {
            mem_total: sample.take("MemTotal"),
            mem_free: sample.take("MemFree"),
            cached: sample.take("Cached"),
        }
    }
}

/// Parses `/proc/meminfo` content.
///
/// `SwapCached:` does not match `Cached`, the prefix must start the line.
pub fn parse_meminfo(content: &str) -> MemInfo {
    MemInfo::from_sample(extract_fields(content.lines(), &MEMINFO_FIELDS, SENTINEL))
}

pub const STATUS_FIELDS: [&str; 2] = ["VmSize", "VmRSS"];

/// Virtual and resident size of a process from `/proc/[pid]/status`, in kB.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcMemory {
    pub vm_size: String,
    pub vm_rss: String,
}

impl ProcMemory {
    pub fn unavailable() -> Self {
        Self::from_sample(Sample::default())
    }

    fn from_sample(mut sample: Sample) -> Self {
        Self {
            vm_size: sample.take("VmSize"),
            vm_rss: sample.take("VmRSS"),
        }
    }
}

/// Parses `/proc/[pid]/status` content.
///
/// Kernel threads have no `Vm*` lines; their values stay at the sentinel.
pub fn parse_proc_status(content: &str) -> ProcMemory {
    ProcMemory::from_sample(extract_fields(content.lines(), &STATUS_FIELDS, SENTINEL))
}

/// Receive and transmit byte counters of one interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetDevCounters {
    pub interface: String,
    pub rx_bytes: String,
    pub tx_bytes: String,
}

impl NetDevCounters {
    pub fn unavailable() -> Self {
        Self {
            interface: SENTINEL.to_string(),
            rx_bytes: SENTINEL.to_string(),
            tx_bytes: SENTINEL.to_string(),
        }
    }
}

/// Parses `/proc/net/dev` content.
///
/// Format:
/// Inter-|   Receive                                                |  Transmit
///  face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed
///    lo: 1234567     1234    0    0    0     0          0         0  1234567     1234    0    0    0     0       0          0
///
/// The first two lines are always the header. Lines without a colon are
/// skipped. A line with fewer than 9 counters is not dropped: it still yields
/// an entry, with the sentinel for the counters it lacks.
pub fn parse_net_dev(content: &str) -> Vec<NetDevCounters> {
    let mut devices = Vec::new();

    for line in content.lines().skip(2) {
        let Some((interface, counters)) = line.split_once(':') else {
            continue;
        };

        let values: Vec<&str> = counters.split_whitespace().collect();
        let get_val = |idx: usize| -> String {
            values
                .get(idx)
                .map(|s| s.to_string())
                .unwrap_or_else(|| SENTINEL.to_string())
        };

        devices.push(NetDevCounters {
            interface: interface.trim().to_string(),
            rx_bytes: get_val(0),
            tx_bytes: get_val(8),
        });
    }

    devices
}

pub const IO_FIELDS: [&str; 4] = ["rchar", "wchar", "read_bytes", "write_bytes"];

/// Parsed data from `/proc/[pid]/io`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcIo {
    pub rchar: String,
    pub wchar: String,
    pub read_bytes: String,
    pub write_bytes: String,
}

impl ProcIo {
    pub fn unavailable() -> Self {
        Self::from_sample(Sample::default())
    }

    fn from_sample(mut sample: Sample) -> Self {
        Self {
            rchar: sample.take("rchar"),
            wchar: sample.take("wchar"),
            read_bytes: sample.take("read_bytes"),
            write_bytes: sample.take("write_bytes"),
        }
    }
}

/// Parses `/proc/[pid]/io` content.
///
/// Format is `key: value` pairs, one per line. The value is everything after
/// the colon and the whitespace following it, up to any further colon.
pub fn parse_proc_io(content: &str) -> ProcIo {
    let mut sample = Sample::with_defaults(&IO_FIELDS, SENTINEL);

    for line in content.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        if !IO_FIELDS.contains(&key) {
            continue;
        }
        let value = value.trim_start();
        let value = value.split(':').next().unwrap_or(value);
        if !value.is_empty() {
            sample.set(key, value);
        }
    }

    ProcIo::from_sample(sample)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_fields_strips_units() {
        let sample = extract_fields(["MemTotal:   8000 kB"], &["MemTotal"], SENTINEL);
        assert_eq!(sample.value("MemTotal"), "8000");
    }

    #[test]
    fn test_extract_fields_missing_keeps_default() {
        let sample = extract_fields(["Foo: 1"], &["MemTotal", "Cached"], "n/a");
        assert_eq!(sample.value("MemTotal"), "n/a");
        assert_eq!(sample.value("Cached"), "n/a");
    }

    #[test]
    fn test_extract_fields_last_match_wins() {
        let lines = ["VmRSS:  10 kB", "VmSize: 5 kB", "VmRSS:  20 kB"];
        let sample = extract_fields(lines, &STATUS_FIELDS, SENTINEL);
        assert_eq!(sample.value("VmRSS"), "20");
        assert_eq!(sample.value("VmSize"), "5");
    }

    #[test]
    fn test_extract_fields_requires_colon_after_prefix() {
        let lines = ["SwapCached: 99 kB", "CachedX: 5 kB", "Cached 7 kB"];
        let sample = extract_fields(lines, &["Cached"], SENTINEL);
        assert_eq!(sample.value("Cached"), SENTINEL);
    }

    #[test]
    fn test_extract_fields_ignores_multi_colon() {
        let lines = ["MemFree: 12 kB", "MemFree: 1:2"];
        let sample = extract_fields(lines, &["MemFree"], SENTINEL);
        assert_eq!(sample.value("MemFree"), "12");
    }

    #[test]
    fn test_extract_fields_later_empty_match_overwrites() {
        let lines = ["MemFree: 12 kB", "MemFree: kB"];
        let sample = extract_fields(lines, &["MemFree"], SENTINEL);
        assert_eq!(sample.value("MemFree"), "");
    }

    #[test]
    fn test_sample_unknown_field_is_sentinel() {
        let sample = Sample::default();
        assert_eq!(sample.value("anything"), SENTINEL);
    }

    #[test]
    fn test_parse_global_cpu() {
        let content = "\
cpu  1000 200 300 4000 50 0 6 0 0 0
cpu0 500 100 150 2000 25 0 3 0 0 0
intr 12345
";
        let times = parse_global_cpu(content).unwrap();
        assert_eq!(times.user, "1000");
        assert_eq!(times.system, "300");
    }

    #[test]
    fn test_parse_global_cpu_skips_per_core_lines() {
        let content = "cpu0 1 2 3 4\ncpu  10 20 30 40\ncpu  99 99 99 99\n";
        let times = parse_global_cpu(content).unwrap();
        assert_eq!(times.user, "10");
        assert_eq!(times.system, "30");
    }

    #[test]
    fn test_parse_global_cpu_errors() {
        assert!(parse_global_cpu("cpu0 1 2 3 4\nctxt 5\n").is_err());
        assert!(parse_global_cpu("cpu  1 2\n").is_err());
        assert!(parse_global_cpu("").is_err());
    }

    #[test]
    fn test_parse_proc_stat_times() {
        let content = "1234 (bash) S 1233 1234 1234 34816 1235 4194304 5000 50000 10 20 100 50 200 100 20 0 1 0 100000";
        let times = parse_proc_stat_times(content).unwrap();
        assert_eq!(times.user, "100");
        assert_eq!(times.system, "50");
    }

    #[test]
    fn test_parse_proc_stat_times_with_spaces_in_comm() {
        let content = "5000 (Web Content) S 4999 5000 4999 0 -1 4194304 100000 0 500 0 5000 1000 0 0 20 0";
        let times = parse_proc_stat_times(content).unwrap();
        assert_eq!(times.user, "5000");
        assert_eq!(times.system, "1000");
    }

    #[test]
    fn test_parse_proc_stat_times_with_parentheses_in_comm() {
        let content = "5001 (test(1)) S 1 5001 5001 0 -1 4194304 1000 0 0 0 10 5 0 0 20 0";
        let times = parse_proc_stat_times(content).unwrap();
        assert_eq!(times.user, "10");
        assert_eq!(times.system, "5");
    }

    #[test]
    fn test_parse_proc_stat_times_short_or_empty() {
        assert!(parse_proc_stat_times("1 (init) S 0 1 1").is_err());
        assert!(parse_proc_stat_times("").is_err());
    }

    #[test]
    fn test_parse_meminfo() {
        let content = "\
MemTotal:       16384000 kB
MemFree:         8192000 kB
Buffers:          512000 kB
Cached:          2048000 kB
SwapCached:            7 kB
";
        let info = parse_meminfo(content);
        assert_eq!(info.mem_total, "16384000");
        assert_eq!(info.mem_free, "8192000");
        assert_eq!(info.cached, "2048000");
    }

    #[test]
    fn test_parse_meminfo_partial() {
        let info = parse_meminfo("MemTotal:   8000 kB\n");
        assert_eq!(info.mem_total, "8000");
        assert_eq!(info.mem_free, SENTINEL);
        assert_eq!(info.cached, SENTINEL);
    }

    #[test]
    fn test_parse_proc_status() {
        let content = "\
Name:\tbash
VmPeak:\t   30000 kB
VmSize:\t   25000 kB
VmRSS:\t    8000 kB
Threads:\t1
";
        let mem = parse_proc_status(content);
        assert_eq!(mem.vm_size, "25000");
        assert_eq!(mem.vm_rss, "8000");
    }

    #[test]
    fn test_parse_proc_status_kernel_thread() {
        let mem = parse_proc_status("Name:\tkthreadd\nState:\tS (sleeping)\n");
        assert_eq!(mem, ProcMemory::unavailable());
    }

    #[test]
    fn test_parse_net_dev() {
        let content = "\
Inter-|   Receive                                                |  Transmit
 face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed
    lo: 1234567     1234    0    0    0     0          0         0  1234567     1234    0    0    0     0       0          0
  eth0: 98765432   65432    0    0    0     0          0         0 12345678   54321    0    0    0     0       0          0
";
        let devices = parse_net_dev(content);
        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0].interface, "lo");
        assert_eq!(devices[0].rx_bytes, "1234567");
        assert_eq!(devices[1].interface, "eth0");
        assert_eq!(devices[1].rx_bytes, "98765432");
        assert_eq!(devices[1].tx_bytes, "12345678");
    }

    #[test]
    fn test_parse_net_dev_single_interface() {
        let content = "h1\nh2\neth0: 500 0 0 0 0 0 0 0 700 0 0 0 0 0 0 0\n";
        let devices = parse_net_dev(content);
        assert_eq!(
            devices,
            vec![NetDevCounters {
                interface: "eth0".into(),
                rx_bytes: "500".into(),
                tx_bytes: "700".into(),
            }]
        );
    }

    #[test]
    fn test_parse_net_dev_skips_exactly_two_lines() {
        // The first two lines are dropped even if they look like interfaces.
        let content = "a: 1 2 3 4 5 6 7 8 9\nb: 1 2 3 4 5 6 7 8 9\nc: 1 2 3 4 5 6 7 8 9\n";
        let devices = parse_net_dev(content);
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].interface, "c");
        assert_eq!(devices[0].tx_bytes, "9");
    }

    #[test]
    fn test_parse_net_dev_short_line() {
        let content = "h1\nh2\nwlan0: 42 1 0\n\nnot an interface\n";
        let devices = parse_net_dev(content);
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].interface, "wlan0");
        assert_eq!(devices[0].rx_bytes, "42");
        assert_eq!(devices[0].tx_bytes, SENTINEL);
    }

    #[test]
    fn test_parse_net_dev_header_only() {
        let content = "h1\nh2\n";
        assert!(parse_net_dev(content).is_empty());
    }

    #[test]
    fn test_parse_proc_io() {
        let content = "\
rchar: 1000000
wchar: 500000
syscr: 5000
syscw: 2500
read_bytes: 100000
write_bytes: 50000
cancelled_write_bytes: 1000
";
        let io = parse_proc_io(content);
        assert_eq!(io.rchar, "1000000");
        assert_eq!(io.wchar, "500000");
        assert_eq!(io.read_bytes, "100000");
        assert_eq!(io.write_bytes, "50000");
    }

    #[test]
    fn test_parse_proc_io_partial() {
        let io = parse_proc_io("rchar: 12\nwchar:\n");
        assert_eq!(io.rchar, "12");
        assert_eq!(io.wchar, SENTINEL);
        assert_eq!(io.read_bytes, SENTINEL);
        assert_eq!(io.write_bytes, SENTINEL);
    }
}
