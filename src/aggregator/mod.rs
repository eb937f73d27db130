//! Stream aggregation of Renovate log lines into per-repository metrics
//!
//! The [`Aggregator`] reads newline-delimited JSON, decodes every line, and applies
//! the facts it carries to the [`RepositoryMetricSet`](crate::metrics::RepositoryMetricSet)
//! of the repository the line names. Lines that cannot be used are skipped and
//! counted. Only a failure of the stream itself, including a line longer than
//! the configured buffer, ends a run early, and even then the metrics gathered so
//! far are handed back in the [`Aggregation`].

mod line_reader;
mod stream_aggregator;

pub use line_reader::read_line_bounded;
pub use stream_aggregator::{Aggregation, AggregationStats, Aggregator, LineOutcome};
