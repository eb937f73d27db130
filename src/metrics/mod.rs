//! Per-repository metric storage and its Prometheus exposition
//!
//! A [`RepositoryMetricSet`] counts how many times each distinct fact was observed
//! for one repository and remembers when the last run for it finished. Its
//! [`enumerate`](RepositoryMetricSet::enumerate) method is the scrape contract
//! that delivery builds on: [`encode_repository`] and [`encode_repositories`]
//! render the observations in the text exposition format.

mod exposition;
mod observation;
mod repository_metrics;

pub use exposition::{encode_repositories, encode_repository};
pub use observation::{MetricFamily, Observation};
pub use repository_metrics::RepositoryMetricSet;
