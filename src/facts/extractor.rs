use super::{DependencyFactKey, UpdateFactKey};
use crate::Result;
use crate::config::Config;
use crate::records::{DependencyEntry, LogRecord};
use chrono::{DateTime, Utc};
use ohno::{IntoAppError, app_err};
use regex::Regex;

/// Log target for the extractor
const LOG_TARGET: &str = " extractor";

/// Message Renovate logs once it is done with a repository
pub const DEFAULT_COMPLETION_MESSAGE: &str = "Repository finished";

/// Branch names Renovate uses for vulnerability fixes end with this suffix
pub const DEFAULT_VULNERABILITY_BRANCH_PATTERN: &str = "-vulnerability$";

/// What a single log record contributes
#[derive(Debug)]
pub enum Extraction<'a> {
    /// The record carried a dependency configuration
    Config(Vec<DependencyFacts<'a>>),

    /// The record marked a completed run at the given time
    Completion(DateTime<Utc>),

    /// Nothing actionable
    NoFact,
}

/// One dependency found in a configuration record, with the facts derived from it
#[derive(Debug)]
pub struct DependencyFacts<'a> {
    pub manager: &'a str,
    pub package_file: &'a str,
    pub dependency: &'a DependencyEntry,
    pub key: DependencyFactKey,
    pub updates: Vec<UpdateFactKey>,
}

/// Turns decoded log records into dependency, update and completion facts
#[derive(Debug, Clone)]
pub struct Extractor {
    completion_message: String,
    vulnerability_branch: Regex,
}

impl Extractor {
    /// Create an extractor recognizing the given completion message and vulnerability branch pattern
    ///
    /// # Errors
    ///
    /// Returns an error if the branch pattern is not a valid regular expression.
    pub fn new(completion_message: impl Into<String>, vulnerability_branch_pattern: &str) -> Result<Self> {
        let vulnerability_branch = Regex::new(vulnerability_branch_pattern)
            .into_app_err_with(|| format!("compiling vulnerability branch pattern '{vulnerability_branch_pattern}'"))?;

        Ok(Self {
            completion_message: completion_message.into(),
            vulnerability_branch,
        })
    }

    /// # Errors
    ///
    /// Returns an error if the configured branch pattern is not a valid regular expression.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.completion_message.as_str(), &config.vulnerability_branch_pattern)
    }

    /// Extract the facts carried by a record
    ///
    /// A configuration takes precedence over the completion marker.
    ///
    /// # Errors
    ///
    /// Returns an error only for a completion record whose timestamp is missing or
    /// is not RFC 3339. Malformed release timestamps never fail extraction.
    pub fn extract<'a>(&self, record: &'a LogRecord) -> Result<Extraction<'a>> {
        if let Some(config) = &record.config {
            let facts = config
                .iter()
                .flat_map(|(manager, files)| files.iter().map(move |file| (manager.as_str(), file)))
                .flat_map(|(manager, file)| file.deps.iter().map(move |dep| (manager, file.package_file.as_str(), dep)))
                .map(|(manager, package_file, dependency)| self.dependency_facts(manager, package_file, dependency))
                .collect();

            return Ok(Extraction::Config(facts));
        }

        if record.message() == self.completion_message {
            return completion_time(record).map(Extraction::Completion);
        }

        Ok(Extraction::NoFact)
    }

    /// Whether a branch name marks a vulnerability fix
    #[must_use]
    pub fn is_vulnerability_fix(&self, branch_name: &str) -> bool {
        self.vulnerability_branch.is_match(branch_name)
    }

    fn dependency_facts<'a>(&self, manager: &'a str, package_file: &'a str, dependency: &'a DependencyEntry) -> DependencyFacts<'a> {
        let updates = dependency
            .updates
            .iter()
            .map(|update| {
                UpdateFactKey::new(
                    manager,
                    package_file,
                    dependency,
                    update,
                    self.is_vulnerability_fix(&update.branch_name),
                    release_timestamp(&update.release_timestamp),
                )
            })
            .collect();

        DependencyFacts {
            manager,
            package_file,
            dependency,
            key: DependencyFactKey::new(manager, package_file, dependency),
            updates,
        }
    }
}

#[cfg(test)]
impl Default for Extractor {
    fn default() -> Self {
        Self::new(DEFAULT_COMPLETION_MESSAGE, DEFAULT_VULNERABILITY_BRANCH_PATTERN).expect("default vulnerability branch pattern should compile")
    }
}

/// Parse a release timestamp into Unix seconds, falling back to the epoch
#[must_use]
pub fn release_timestamp(raw: &str) -> i64 {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(ts) => ts.timestamp(),
        Err(e) => {
            log::trace!(target: LOG_TARGET, "Using the epoch for release timestamp '{raw}': {e}");
            0
        }
    }
}

fn completion_time(record: &LogRecord) -> Result<DateTime<Utc>> {
    let raw = record.time.as_deref().ok_or_else(|| app_err!("completion record has no timestamp"))?;

    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.to_utc())
        .into_app_err_with(|| format!("parsing completion timestamp '{raw}'"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn config_record(updates: &str) -> LogRecord {
        let line = format!(
            r#"{{"repository":"acme/web","msg":"packageFiles with updates","config":{{"npm":[{{"packageFile":"package.json","deps":[{{"depName":"lodash","currentValue":"4.17.20","depType":"dependencies","updates":{updates}}}]}}]}}}}"#
        );
        LogRecord::decode(line.as_bytes()).unwrap()
    }

    fn config_facts<'a>(extraction: Extraction<'a>) -> Vec<DependencyFacts<'a>> {
        match extraction {
            Extraction::Config(facts) => facts,
            other => panic!("expected configuration facts, got {other:?}"),
        }
    }

    #[test]
    fn test_extract_config_facts() {
        let record = config_record(
            r#"[{"newVersion":"4.17.21","updateType":"patch","releaseTimestamp":"2021-02-20T15:42:16.891Z","branchName":"renovate/lodash-4.x"}]"#,
        );
        let facts = config_facts(Extractor::default().extract(&record).unwrap());

        assert_eq!(facts.len(), 1);
        let dep = &facts[0];
        assert_eq!(dep.manager, "npm");
        assert_eq!(dep.package_file, "package.json");
        assert_eq!(dep.dependency.dep_name, "lodash");
        assert_eq!(dep.key.dep_type, "dependencies");
        assert_eq!(dep.key.warning, "");

        assert_eq!(dep.updates.len(), 1);
        let update = &dep.updates[0];
        assert_eq!(update.new_version, "4.17.21");
        assert_eq!(update.update_type, "patch");
        assert!(!update.vulnerability_fix);
        assert_eq!(update.release_timestamp, 1_613_835_736);
    }

    #[test]
    fn test_extract_flattens_managers_and_files() {
        let record = LogRecord::decode(
            br#"{"repository":"acme/web","config":{
                "npm":[{"packageFile":"package.json","deps":[{"depName":"a"},{"depName":"b"}]},{"packageFile":"web/package.json","deps":[{"depName":"c"}]}],
                "cargo":[{"packageFile":"Cargo.toml","deps":[{"depName":"serde"}]}]
            }}"#,
        )
        .unwrap();
        let facts = config_facts(Extractor::default().extract(&record).unwrap());

        let triples: Vec<_> = facts
            .iter()
            .map(|f| (f.manager, f.package_file, f.dependency.dep_name.as_str()))
            .collect();
        assert_eq!(
            triples,
            [
                ("cargo", "Cargo.toml", "serde"),
                ("npm", "package.json", "a"),
                ("npm", "package.json", "b"),
                ("npm", "web/package.json", "c"),
            ]
        );
    }

    #[test]
    fn test_vulnerability_classification() {
        let extractor = Extractor::default();

        assert!(extractor.is_vulnerability_fix("update-lodash-vulnerability"));
        assert!(!extractor.is_vulnerability_fix("update-lodash"));
        assert!(!extractor.is_vulnerability_fix("update-lodash-vulnerability-2"));
        assert!(!extractor.is_vulnerability_fix(""));
    }

    #[test]
    fn test_vulnerability_flag_on_update_fact() {
        let record = config_record(r#"[{"newVersion":"4.17.21","branchName":"renovate/npm-lodash-vulnerability"}]"#);
        let facts = config_facts(Extractor::default().extract(&record).unwrap());

        assert!(facts[0].updates[0].vulnerability_fix);
    }

    #[test]
    fn test_custom_vulnerability_pattern() {
        let extractor = Extractor::new(DEFAULT_COMPLETION_MESSAGE, "^security/").unwrap();

        assert!(extractor.is_vulnerability_fix("security/lodash"));
        assert!(!extractor.is_vulnerability_fix("update-lodash-vulnerability"));
    }

    #[test]
    fn test_invalid_vulnerability_pattern() {
        let _ = Extractor::new(DEFAULT_COMPLETION_MESSAGE, "(unclosed").unwrap_err();
    }

    #[test]
    fn test_malformed_release_timestamp_falls_back_to_epoch() {
        let record = config_record(r#"[{"newVersion":"4.17.21","releaseTimestamp":"last tuesday"},{"newVersion":"5.0.0"}]"#);
        let facts = config_facts(Extractor::default().extract(&record).unwrap());

        assert_eq!(facts[0].updates.len(), 2);
        assert_eq!(facts[0].updates[0].release_timestamp, 0);
        assert_eq!(facts[0].updates[1].release_timestamp, 0);
    }

    #[test]
    fn test_release_timestamp_with_offset() {
        assert_eq!(release_timestamp("1970-01-01T01:00:00+01:00"), 0);
        assert_eq!(release_timestamp("2023-03-24T05:34:48Z"), 1_679_636_088);
    }

    #[test]
    fn test_extract_completion() {
        let record = LogRecord::decode(br#"{"repository":"acme/web","msg":"Repository finished","time":"2023-03-24T05:34:48.000Z"}"#).unwrap();

        match Extractor::default().extract(&record).unwrap() {
            Extraction::Completion(ts) => assert_eq!(ts, Utc.with_ymd_and_hms(2023, 3, 24, 5, 34, 48).unwrap()),
            other => panic!("expected completion, got {other:?}"),
        }
    }

    #[test]
    fn test_extract_completion_with_bad_timestamp_fails() {
        let record = LogRecord::decode(br#"{"repository":"acme/web","msg":"Repository finished","time":"yesterday"}"#).unwrap();
        let _ = Extractor::default().extract(&record).unwrap_err();

        let record = LogRecord::decode(br#"{"repository":"acme/web","msg":"Repository finished"}"#).unwrap();
        let _ = Extractor::default().extract(&record).unwrap_err();
    }

    #[test]
    fn test_config_takes_precedence_over_completion() {
        let record =
            LogRecord::decode(br#"{"repository":"acme/web","msg":"Repository finished","time":"garbage","config":{}}"#).unwrap();

        let facts = config_facts(Extractor::default().extract(&record).unwrap());
        assert!(facts.is_empty());
    }

    #[test]
    fn test_other_records_carry_no_fact() {
        let record = LogRecord::decode(br#"{"repository":"acme/web","msg":"Dependency extraction complete"}"#).unwrap();

        assert!(matches!(Extractor::default().extract(&record).unwrap(), Extraction::NoFact));
    }

    #[test]
    fn test_from_default_config_matches_defaults() {
        let extractor = Extractor::from_config(&Config::default()).unwrap();

        assert!(extractor.is_vulnerability_fix("renovate/npm-lodash-vulnerability"));
        assert!(!extractor.is_vulnerability_fix("renovate/lodash-5.x"));

        let record = LogRecord::decode(br#"{"repository":"acme/web","msg":"Repository finished","time":"2023-03-24T05:34:48.000Z"}"#).unwrap();
        assert!(matches!(extractor.extract(&record).unwrap(), Extraction::Completion(_)));
    }
}
