//! Classification of the invocation's metric selectors and process ids.
//!
//! Grammar, tokens in any order:
//! - `--<category>` enables a category (`cpu`, `memory`, `network`, `io`, any case)
//! - a run of ASCII digits names a process to monitor
//!
//! The result is an immutable [`MonitorConfig`] handed to the collector.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::model::MetricCategory;

/// Fatal problems with the invocation, detected before sampling starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// `--name` where name is not a known category.
    UnknownMetric(String),
    /// A token that is neither a category flag nor a process id.
    InvalidArgument(String),
    /// `io` selected without any process id.
    MissingTarget(MetricCategory),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::UnknownMetric(name) => write!(f, "unknown metric type: {}", name),
            ConfigError::InvalidArgument(arg) => write!(f, "invalid argument: {}", arg),
            ConfigError::MissingTarget(category) => write!(
                f,
                "'{}' metric requires at least one process id to monitor",
                category
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Non-fatal findings reported once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advisory {
    /// Process ids were given together with `network`, which is system-wide only.
    PidsIgnoredForNetwork(usize),
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Advisory::PidsIgnoredForNetwork(count) => write!(
                f,
                "{} process id(s) ignored for 'network' metric",
                count
            ),
        }
    }
}

/// A process to sample, addressed by its `/proc/[pid]` directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessTarget {
    pid: String,
    stem: PathBuf,
}

impl ProcessTarget {
    /// Builds the target for `pid` under `proc_root`.
    ///
    /// The id is kept exactly as typed so the emitted paths match the invocation.
    pub fn new(pid: impl Into<String>, proc_root: &Path) -> Self {
        let pid = pid.into();
        let stem = proc_root.join(&pid);
        Self { pid, stem }
    }

    pub fn pid(&self) -> &str {
        &self.pid
    }

    /// The `/proc/[pid]` directory.
    pub fn stem(&self) -> &Path {
        &self.stem
    }

    pub fn stat_path(&self) -> PathBuf {
        self.stem.join("stat")
    }

    pub fn status_path(&self) -> PathBuf {
        self.stem.join("status")
    }

    pub fn io_path(&self) -> PathBuf {
        self.stem.join("io")
    }
}

/// Immutable run configuration produced by [`classify`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    proc_root: PathBuf,
    categories: BTreeSet<MetricCategory>,
    targets: Vec<ProcessTarget>,
    advisories: Vec<Advisory>,
}

impl MonitorConfig {
    pub fn proc_root(&self) -> &Path {
        &self.proc_root
    }

    pub fn categories(&self) -> &BTreeSet<MetricCategory> {
        &self.categories
    }

    pub fn is_enabled(&self, category: MetricCategory) -> bool {
        self.categories.contains(&category)
    }

    /// Monitored processes in the order they were given.
    pub fn targets(&self) -> &[ProcessTarget] {
        &self.targets
    }

    pub fn advisories(&self) -> &[Advisory] {
        &self.advisories
    }
}

fn is_pid(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit())
}

/// Classifies the raw selector tokens into a [`MonitorConfig`].
///
/// Defaults to `cpu` when no category is named. Fails on unknown categories,
/// malformed tokens, and `io` without a process id.
pub fn classify<I, S>(args: I, proc_root: impl AsRef<Path>) -> Result<MonitorConfig, ConfigError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let proc_root = proc_root.as_ref();
    let mut categories = BTreeSet::new();
    let mut pids: Vec<String> = Vec::new();

    for arg in args {
        let arg = arg.as_ref();
        if let Some(name) = arg.strip_prefix("--") {
            categories.insert(name.parse::<MetricCategory>()?);
        } else if is_pid(arg) {
            pids.push(arg.to_string());
        } else {
            return Err(ConfigError::InvalidArgument(arg.to_string()));
        }
    }

    if categories.is_empty() {
        categories.insert(MetricCategory::Cpu);
    }

    let mut advisories = Vec::new();
    if categories.contains(&MetricCategory::Network) && !pids.is_empty() {
        advisories.push(Advisory::PidsIgnoredForNetwork(pids.len()));
    }

    if categories.contains(&MetricCategory::Io) && pids.is_empty() {
        return Err(ConfigError::MissingTarget(MetricCategory::Io));
    }

    let targets = pids
        .into_iter()
        .map(|pid| ProcessTarget::new(pid, proc_root))
        .collect();

    Ok(MonitorConfig {
        proc_root: proc_root.to_path_buf(),
        categories,
        targets,
        advisories,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_cpu() {
        let config = classify(Vec::<String>::new(), "/proc").unwrap();
        assert_eq!(
            config.categories().iter().copied().collect::<Vec<_>>(),
            vec![MetricCategory::Cpu]
        );
        assert!(config.targets().is_empty());
        assert!(config.advisories().is_empty());
    }

    #[test]
    fn test_pids_only_still_default_to_cpu() {
        let config = classify(["42"], "/proc").unwrap();
        assert!(config.is_enabled(MetricCategory::Cpu));
        assert_eq!(config.targets().len(), 1);
        assert_eq!(config.targets()[0].stat_path(), Path::new("/proc/42/stat"));
    }

    #[test]
    fn test_order_independent() {
        let a = classify(["--cpu", "123", "--memory"], "/proc").unwrap();
        let b = classify(["123", "--memory", "--cpu"], "/proc").unwrap();
        assert_eq!(a, b);
        assert!(a.is_enabled(MetricCategory::Cpu));
        assert!(a.is_enabled(MetricCategory::Memory));
        assert!(!a.is_enabled(MetricCategory::Network));
    }

    #[test]
    fn test_category_case_insensitive() {
        let config = classify(["--MEMORY", "--Network"], "/proc").unwrap();
        assert!(config.is_enabled(MetricCategory::Memory));
        assert!(config.is_enabled(MetricCategory::Network));
        assert!(!config.is_enabled(MetricCategory::Cpu));
    }

    #[test]
    fn test_unknown_metric() {
        let err = classify(["--disk"], "/proc").unwrap_err();
        assert_eq!(err, ConfigError::UnknownMetric("disk".to_string()));
        assert_eq!(err.to_string(), "unknown metric type: disk");
    }

    #[test]
    fn test_bare_double_dash_is_unknown_metric() {
        let err = classify(["--"], "/proc").unwrap_err();
        assert_eq!(err, ConfigError::UnknownMetric(String::new()));
    }

    #[test]
    fn test_invalid_argument() {
        for bad in ["abc", "-cpu", "12a", "", "+5", "-1"] {
            let err = classify([bad], "/proc").unwrap_err();
            assert_eq!(err, ConfigError::InvalidArgument(bad.to_string()), "{bad:?}");
        }
    }

    #[test]
    fn test_io_requires_pid() {
        let err = classify(["--io"], "/proc").unwrap_err();
        assert_eq!(err, ConfigError::MissingTarget(MetricCategory::Io));

        let err = classify(["--cpu", "--IO"], "/proc").unwrap_err();
        assert_eq!(err, ConfigError::MissingTarget(MetricCategory::Io));

        assert!(classify(["--io", "7"], "/proc").is_ok());
    }

    #[test]
    fn test_network_with_pids_is_advisory() {
        let config = classify(["--network", "1", "2"], "/proc").unwrap();
        assert_eq!(config.advisories(), &[Advisory::PidsIgnoredForNetwork(2)]);
        assert_eq!(config.targets().len(), 2);

        let config = classify(["--network"], "/proc").unwrap();
        assert!(config.advisories().is_empty());
    }

    #[test]
    fn test_targets_keep_order_and_spelling() {
        let config = classify(["300", "--cpu", "0042", "300"], "/host/proc").unwrap();
        let pids: Vec<&str> = config.targets().iter().map(|t| t.pid()).collect();
        assert_eq!(pids, vec!["300", "0042", "300"]);

        let target = &config.targets()[1];
        assert_eq!(target.stem(), Path::new("/host/proc/0042"));
        assert_eq!(target.stat_path(), Path::new("/host/proc/0042/stat"));
        assert_eq!(target.status_path(), Path::new("/host/proc/0042/status"));
        assert_eq!(target.io_path(), Path::new("/host/proc/0042/io"));
        assert_eq!(config.proc_root(), Path::new("/host/proc"));
    }
}
