use std::fmt;
use std::str::FromStr;

use crate::config::ConfigError;

/// Kind of metric a run can be asked to sample.
///
/// Ordering follows the dispatch order of a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MetricCategory {
    Cpu,
    Memory,
    Network,
    Io,
}

impl MetricCategory {
    pub const ALL: [MetricCategory; 4] = [
        MetricCategory::Cpu,
        MetricCategory::Memory,
        MetricCategory::Network,
        MetricCategory::Io,
    ];

    pub fn name(self) -> &'static str {
        match self {
            MetricCategory::Cpu => "cpu",
            MetricCategory::Memory => "memory",
            MetricCategory::Network => "network",
            MetricCategory::Io => "io",
        }
    }
}

impl fmt::Display for MetricCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MetricCategory {
    type Err = ConfigError;

    /// Parses a category name, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.name() == lower)
            .ok_or(ConfigError::UnknownMetric(lower))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!("CPU".parse::<MetricCategory>().unwrap(), MetricCategory::Cpu);
        assert_eq!(
            "Network".parse::<MetricCategory>().unwrap(),
            MetricCategory::Network
        );
        assert_eq!("io".parse::<MetricCategory>().unwrap(), MetricCategory::Io);
    }

    #[test]
    fn test_parse_unknown() {
        let err = "disk".parse::<MetricCategory>().unwrap_err();
        assert_eq!(err, ConfigError::UnknownMetric("disk".to_string()));
    }

    #[test]
    fn test_display_roundtrips_name() {
        for c in MetricCategory::ALL {
            assert_eq!(c.to_string().parse::<MetricCategory>().unwrap(), c);
        }
    }
}
