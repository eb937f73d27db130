use super::line_reader::read_line_bounded;
use crate::Result;
use crate::config::Config;
use crate::facts::{Extraction, Extractor};
use crate::metrics::RepositoryMetricSet;
use crate::records::LogRecord;
use ohno::{AppError, IntoAppError};
use std::collections::HashMap;
use std::io::BufRead;

/// Log target for the aggregator
const LOG_TARGET: &str = "aggregator";

/// What happened to a single input line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    /// A dependency configuration was applied to the repository's metrics
    Applied { dependencies: usize, updates: usize },

    /// The repository's last successful run was stamped
    Completion,

    /// The record named a repository but carried nothing to record
    NoFact,

    /// Empty or whitespace-only line
    Blank,

    /// The record names no repository
    Unattributed,

    /// The line is not a JSON object
    Malformed,

    /// A completion record whose timestamp could not be parsed
    InvalidCompletion,
}

/// Line counts by outcome
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregationStats {
    pub lines: usize,
    pub applied: usize,
    pub completions: usize,
    pub no_fact: usize,
    pub blank: usize,
    pub unattributed: usize,
    pub malformed: usize,
    pub invalid_completions: usize,
}

impl AggregationStats {
    const fn record(&mut self, outcome: LineOutcome) {
        self.lines += 1;
        match outcome {
            LineOutcome::Applied { .. } => self.applied += 1,
            LineOutcome::Completion => self.completions += 1,
            LineOutcome::NoFact => self.no_fact += 1,
            LineOutcome::Blank => self.blank += 1,
            LineOutcome::Unattributed => self.unattributed += 1,
            LineOutcome::Malformed => self.malformed += 1,
            LineOutcome::InvalidCompletion => self.invalid_completions += 1,
        }
    }

    /// Lines that were read but contributed nothing
    #[must_use]
    pub const fn skipped(&self) -> usize {
        self.blank + self.unattributed + self.malformed + self.invalid_completions
    }
}

/// The result of reading a whole stream
///
/// A stream error does not discard what was aggregated before it.
#[derive(Debug)]
pub struct Aggregation {
    pub repositories: HashMap<String, RepositoryMetricSet>,
    pub stats: AggregationStats,
    pub error: Option<AppError>,
}

impl Aggregation {
    /// The aggregated repositories, or the stream error if one ended the run
    ///
    /// # Errors
    ///
    /// Returns the stream error, dropping the partial results
    pub fn into_result(self) -> Result<HashMap<String, RepositoryMetricSet>> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.repositories),
        }
    }
}

/// Routes log lines to the metric set of the repository they name
#[derive(Debug)]
pub struct Aggregator {
    extractor: Extractor,
    buffer_size: usize,
    repositories: HashMap<String, RepositoryMetricSet>,
    stats: AggregationStats,
}

impl Aggregator {
    #[must_use]
    pub fn new(extractor: Extractor, buffer_size: usize) -> Self {
        Self {
            extractor,
            buffer_size,
            repositories: HashMap::new(),
            stats: AggregationStats::default(),
        }
    }

    /// # Errors
    ///
    /// Returns an error if the configured vulnerability branch pattern does not compile
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(Extractor::from_config(config)?, config.buffer_size))
    }

    /// Interpret one line, without its terminator
    ///
    /// Never fails: lines that cannot be used are reported through the returned outcome.
    pub fn ingest_line(&mut self, line: &[u8]) -> LineOutcome {
        let outcome = self.apply_line(line);
        self.stats.record(outcome);
        outcome
    }

    fn apply_line(&mut self, line: &[u8]) -> LineOutcome {
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        if line.iter().all(u8::is_ascii_whitespace) {
            return LineOutcome::Blank;
        }

        let record = match LogRecord::decode(line) {
            Ok(record) => record,
            Err(e) => {
                log::debug!(target: LOG_TARGET, "Skipping line {}: {e}", self.stats.lines + 1);
                return LineOutcome::Malformed;
            }
        };

        let Some(repository) = record.repository() else {
            return LineOutcome::Unattributed;
        };

        let metrics = self.repositories.entry(repository.to_owned()).or_insert_with(|| {
            log::debug!(target: LOG_TARGET, "Tracking repository '{repository}'");
            RepositoryMetricSet::new()
        });

        let extraction = match self.extractor.extract(&record) {
            Ok(extraction) => extraction,
            Err(e) => {
                log::debug!(target: LOG_TARGET, "Skipping completion of '{repository}' on line {}: {e}", self.stats.lines + 1);
                return LineOutcome::InvalidCompletion;
            }
        };

        match extraction {
            Extraction::Config(facts) => {
                let dependencies = facts.len();
                let mut updates = 0;
                for fact in facts {
                    let _ = metrics.upsert_dependency(fact.key);
                    updates += fact.updates.len();
                    for update in fact.updates {
                        let _ = metrics.upsert_update(update);
                    }
                }

                log::trace!(target: LOG_TARGET, "Recorded {dependencies} dependencies and {updates} updates for '{repository}'");
                LineOutcome::Applied { dependencies, updates }
            }

            Extraction::Completion(timestamp) => {
                log::debug!(target: LOG_TARGET, "Repository '{repository}' finished at {timestamp}");
                metrics.record_completion(timestamp);
                LineOutcome::Completion
            }

            Extraction::NoFact => LineOutcome::NoFact,
        }
    }

    /// Ingest every line of a stream until end of input
    ///
    /// # Errors
    ///
    /// Returns an error if reading fails or a line exceeds the buffer size. Lines
    /// ingested before the failure stay recorded.
    pub fn ingest<R: BufRead>(&mut self, mut reader: R) -> Result<()> {
        let mut line = Vec::new();
        while read_line_bounded(&mut reader, &mut line, self.buffer_size)
            .into_app_err_with(|| format!("reading line {} of the log stream", self.stats.lines + 1))?
        {
            let _ = self.ingest_line(&line);
        }

        Ok(())
    }

    /// Ingest a whole stream and hand over everything that was aggregated
    pub fn aggregate<R: BufRead>(mut self, reader: R) -> Aggregation {
        let error = self.ingest(reader).err();

        log::info!(
            target: LOG_TARGET,
            "Read {} lines for {} repositories ({} applied, {} completions, {} skipped)",
            self.stats.lines,
            self.repositories.len(),
            self.stats.applied,
            self.stats.completions,
            self.stats.skipped()
        );

        if let Some(e) = &error {
            log::warn!(target: LOG_TARGET, "Log stream ended early: {e}");
        }

        Aggregation {
            repositories: self.repositories,
            stats: self.stats,
            error,
        }
    }

    #[must_use]
    pub const fn repositories(&self) -> &HashMap<String, RepositoryMetricSet> {
        &self.repositories
    }

    #[must_use]
    pub fn repository(&self, name: &str) -> Option<&RepositoryMetricSet> {
        self.repositories.get(name)
    }

    #[must_use]
    pub const fn stats(&self) -> &AggregationStats {
        &self.stats
    }
}
