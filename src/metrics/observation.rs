use crate::facts::{DependencyFactKey, LabelSet, UpdateFactKey};
use chrono::{DateTime, Utc};

/// The gauge families every repository exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricFamily {
    Dependency,
    DependencyUpdate,
    LastSuccessfulTimestamp,
}

impl MetricFamily {
    pub const ALL: [Self; 3] = [Self::LastSuccessfulTimestamp, Self::Dependency, Self::DependencyUpdate];

    /// Metric name, without the namespace prefix
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Dependency => "dependency",
            Self::DependencyUpdate => "dependency_update",
            Self::LastSuccessfulTimestamp => "last_successful_timestamp",
        }
    }

    #[must_use]
    pub const fn help(self) -> &'static str {
        match self {
            Self::Dependency => "Installed dependency",
            Self::DependencyUpdate => "Available update of an installed dependency",
            Self::LastSuccessfulTimestamp => "Timestamp of the last successful execution",
        }
    }
}

/// One series of a repository's metrics, as yielded by a scrape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation<'a> {
    Dependency { key: &'a DependencyFactKey, count: u64 },
    Update { key: &'a UpdateFactKey, count: u64 },
    LastSuccessfulRun(Option<DateTime<Utc>>),
}

impl Observation<'_> {
    #[must_use]
    pub const fn family(&self) -> MetricFamily {
        match self {
            Self::Dependency { .. } => MetricFamily::Dependency,
            Self::Update { .. } => MetricFamily::DependencyUpdate,
            Self::LastSuccessfulRun(_) => MetricFamily::LastSuccessfulTimestamp,
        }
    }

    #[must_use]
    pub fn labels(&self) -> LabelSet {
        match self {
            Self::Dependency { key, .. } => key.labels(),
            Self::Update { key, .. } => key.labels(),
            Self::LastSuccessfulRun(_) => LabelSet::new(),
        }
    }

    /// Gauge value: the observation count, or Unix seconds for the last run (0 if none)
    #[must_use]
    #[expect(clippy::cast_precision_loss, reason = "gauge values are exported as f64")]
    pub fn value(&self) -> f64 {
        match self {
            Self::Dependency { count, .. } | Self::Update { count, .. } => *count as f64,
            Self::LastSuccessfulRun(ts) => ts.map_or(0.0, |ts| ts.timestamp() as f64),
        }
    }
}
