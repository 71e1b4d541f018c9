//! Pre-built mock filesystem scenarios for testing.
//!
//! These scenarios provide realistic `/proc` states for the readers and the
//! tick collector.

use super::filesystem::MockFs;

/// `/proc/net/dev` with loopback and one ethernet interface.
const NET_DEV: &str = "\
Inter-|   Receive                                                |  Transmit
 face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed
    lo: 1234567     1234    0    0    0     0          0         0  1234567     1234    0    0    0     0       0          0
  eth0: 98765432   65432    0    0    0     0          0         0 12345678   54321    0    0    0     0       0          0
";

impl MockFs {
    /// Creates a typical system with two processes.
    ///
    /// Includes: bash (PID 1234, readable io) and a browser content process
    /// (PID 5000, command name with a space, io not accessible).
    pub fn typical_system() -> Self {
        let mut fs = Self::new();

        fs.add_file(
            "/proc/stat",
            "\
cpu  10000 500 3000 80000 1000 200 100 0 0 0
cpu0 2500 125 750 20000 250 50 25 0 0 0
cpu1 2500 125 750 20000 250 50 25 0 0 0
cpu2 2500 125 750 20000 250 50 25 0 0 0
cpu3 2500 125 750 20000 250 50 25 0 0 0
intr 1000000 50 0 0 0 0 0 0 0 1 0 0 0 100 0 0 1000
ctxt 500000
btime 1700000000
processes 10000
procs_running 2
procs_blocked 0
",
        );
        fs.add_file(
            "/proc/meminfo",
            "\
MemTotal:       16384000 kB
MemFree:         8192000 kB
MemAvailable:   12000000 kB
Buffers:          512000 kB
Cached:          2048000 kB
SwapCached:            0 kB
Active:          4096000 kB
Inactive:        2048000 kB
SwapTotal:       4096000 kB
SwapFree:        4096000 kB
",
        );
        fs.add_file("/proc/net/dev", NET_DEV);

        fs.add_process(
            1234,
            "1234 (bash) S 1233 1234 1234 34816 1235 4194304 5000 50000 10 20 100 50 200 100 20 0 1 0 100000 25000000 2000 18446744073709551615 0 0 0 0 0 0 65536 3670020 1266777851 0 0 0 17 2 0 0 5 0 0\n",
            "\
Name:\tbash
Pid:\t1234
PPid:\t1233
VmPeak:\t   30000 kB
VmSize:\t   25000 kB
VmRSS:\t    8000 kB
VmData:\t    2000 kB
Threads:\t1
",
            "\
rchar: 1000000
wchar: 500000
syscr: 5000
syscw: 2500
read_bytes: 100000
write_bytes: 50000
cancelled_write_bytes: 1000
",
        );

        fs.add_process(
            5000,
            "5000 (Web Content) S 4999 5000 4999 0 -1 4194304 100000 0 500 0 5000 1000 0 0 20 0 20 0 500000 2000000000 50000 18446744073709551615 0 0 0 0 0 0 0 0 0 0 0 0 17 0 0 0 0 0 0\n",
            "\
Name:\tWeb Content
Pid:\t5000
VmSize:\t 2000000 kB
VmRSS:\t  200000 kB
",
            "",
        );

        fs
    }

    /// A system where only the per-process files of PID 1234 exist.
    ///
    /// Every system-wide source is missing, as on a partially mounted `/proc`.
    pub fn process_only() -> Self {
        let mut fs = Self::new();
        fs.add_process(
            1234,
            "1234 (bash) S 1233 1234 1234 34816 1235 4194304 5000 50000 10 20 100 50 200 100 20 0 1 0\n",
            "VmSize:\t   25000 kB\nVmRSS:\t    8000 kB\n",
            "rchar: 1\nwchar: 2\nread_bytes: 3\nwrite_bytes: 4\n",
        );
        fs
    }
}
