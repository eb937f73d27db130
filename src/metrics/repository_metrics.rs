use super::Observation;
use crate::facts::{DependencyFactKey, UpdateFactKey};
use chrono::{DateTime, Utc};
use core::iter;
use std::collections::HashMap;

/// Deduplicated metric observations for a single repository
///
/// Fact keys are the map keys, so observing the same fact again only bumps its
/// count. Keys are never removed. Upserts need `&mut self` while [`Self::enumerate`]
/// only borrows, so a scrape can never see a key without its value.
#[derive(Debug, Clone, Default)]
pub struct RepositoryMetricSet {
    dependencies: HashMap<DependencyFactKey, u64>,
    updates: HashMap<UpdateFactKey, u64>,
    last_successful_run: Option<DateTime<Utc>>,
}

impl RepositoryMetricSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one observation of an installed dependency, returning its new count
    pub fn upsert_dependency(&mut self, key: DependencyFactKey) -> u64 {
        let count = self.dependencies.entry(key).or_insert(0);
        *count += 1;
        *count
    }

    /// Record one observation of an available update, returning its new count
    pub fn upsert_update(&mut self, key: UpdateFactKey) -> u64 {
        let count = self.updates.entry(key).or_insert(0);
        *count += 1;
        *count
    }

    /// Overwrite the last successful run, even with an earlier time
    pub const fn record_completion(&mut self, timestamp: DateTime<Utc>) {
        self.last_successful_run = Some(timestamp);
    }

    #[must_use]
    pub const fn last_successful_run(&self) -> Option<DateTime<Utc>> {
        self.last_successful_run
    }

    #[cfg(test)]
    #[must_use]
    pub fn dependency_count(&self, key: &DependencyFactKey) -> Option<u64> {
        self.dependencies.get(key).copied()
    }

    #[cfg(test)]
    #[must_use]
    pub fn update_count(&self, key: &UpdateFactKey) -> Option<u64> {
        self.updates.get(key).copied()
    }

    /// Number of distinct dependency series
    #[must_use]
    pub fn dependency_series(&self) -> usize {
        self.dependencies.len()
    }

    /// Number of distinct update series
    #[must_use]
    pub fn update_series(&self) -> usize {
        self.updates.len()
    }

    /// Every current observation: the last-run gauge, then all dependency and update facts
    ///
    /// The iterator is lazy and can be cloned or re-created to scrape again.
    pub fn enumerate(&self) -> impl Iterator<Item = Observation<'_>> + Clone + '_ {
        iter::once(Observation::LastSuccessfulRun(self.last_successful_run))
            .chain(
                self.dependencies
                    .iter()
                    .map(|(key, &count)| Observation::Dependency { key, count }),
            )
            .chain(self.updates.iter().map(|(key, &count)| Observation::Update { key, count }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::MetricFamily;
    use chrono::TimeZone;

    fn dependency(name: &str, version: &str) -> DependencyFactKey {
        DependencyFactKey {
            manager: "npm".into(),
            package_file: "package.json".into(),
            dep_name: name.into(),
            current_version: version.into(),
            dep_type: "dependencies".into(),
            warning: String::new(),
        }
    }

    fn update(release_timestamp: i64) -> UpdateFactKey {
        UpdateFactKey {
            manager: "npm".into(),
            package_file: "package.json".into(),
            dep_name: "lodash".into(),
            current_version: "4.17.20".into(),
            dep_type: "dependencies".into(),
            update_type: "patch".into(),
            new_version: "4.17.21".into(),
            vulnerability_fix: false,
            release_timestamp,
        }
    }

    #[test]
    fn test_upsert_dependency_counts_observations() {
        let mut metrics = RepositoryMetricSet::new();

        assert_eq!(metrics.upsert_dependency(dependency("lodash", "4.17.20")), 1);
        assert_eq!(metrics.upsert_dependency(dependency("lodash", "4.17.20")), 2);
        assert_eq!(metrics.upsert_dependency(dependency("lodash", "4.17.20")), 3);
        assert_eq!(metrics.upsert_dependency(dependency("lodash", "4.17.19")), 1);

        assert_eq!(metrics.dependency_series(), 2);
        assert_eq!(metrics.dependency_count(&dependency("lodash", "4.17.20")), Some(3));
        assert_eq!(metrics.dependency_count(&dependency("react", "18.0.0")), None);
    }

    #[test]
    fn test_update_namespace_is_independent() {
        let mut metrics = RepositoryMetricSet::new();

        let _ = metrics.upsert_dependency(dependency("lodash", "4.17.20"));
        assert_eq!(metrics.upsert_update(update(100)), 1);
        assert_eq!(metrics.upsert_update(update(100)), 2);
        assert_eq!(metrics.upsert_update(update(200)), 1);

        assert_eq!(metrics.dependency_series(), 1);
        assert_eq!(metrics.update_series(), 2);
        assert_eq!(metrics.update_count(&update(100)), Some(2));
    }

    #[test]
    fn test_completion_overwrites_regardless_of_order() {
        let earlier = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2023, 6, 1, 0, 0, 0).unwrap();
        let mut metrics = RepositoryMetricSet::new();
        assert_eq!(metrics.last_successful_run(), None);

        metrics.record_completion(earlier);
        metrics.record_completion(later);
        assert_eq!(metrics.last_successful_run(), Some(later));

        metrics.record_completion(earlier);
        assert_eq!(metrics.last_successful_run(), Some(earlier));
    }

    #[test]
    fn test_enumerate_yields_everything() {
        let mut metrics = RepositoryMetricSet::new();
        let _ = metrics.upsert_dependency(dependency("lodash", "4.17.20"));
        let _ = metrics.upsert_dependency(dependency("lodash", "4.17.20"));
        let _ = metrics.upsert_dependency(dependency("react", "18.0.0"));
        let _ = metrics.upsert_update(update(100));
        metrics.record_completion(Utc.timestamp_opt(1_679_636_088, 0).unwrap());

        let observations: Vec<_> = metrics.enumerate().collect();
        assert_eq!(observations.len(), 4);

        let count_of = |family| observations.iter().filter(|o| o.family() == family).count();
        assert_eq!(count_of(MetricFamily::LastSuccessfulTimestamp), 1);
        assert_eq!(count_of(MetricFamily::Dependency), 2);
        assert_eq!(count_of(MetricFamily::DependencyUpdate), 1);

        let lodash = observations
            .iter()
            .find(|o| matches!(o, Observation::Dependency { key, .. } if key.dep_name == "lodash"))
            .unwrap();
        assert!((lodash.value() - 2.0).abs() < f64::EPSILON);

        let last_run = observations.iter().find(|o| o.family() == MetricFamily::LastSuccessfulTimestamp).unwrap();
        assert!((last_run.value() - 1_679_636_088.0).abs() < f64::EPSILON);
        assert!(last_run.labels().is_empty());
    }

    #[test]
    fn test_enumerate_is_restartable() {
        let mut metrics = RepositoryMetricSet::new();
        let _ = metrics.upsert_dependency(dependency("lodash", "4.17.20"));

        let scrape = metrics.enumerate();
        assert_eq!(scrape.clone().count(), 2);
        assert_eq!(scrape.count(), 2);
        assert_eq!(metrics.enumerate().count(), 2);
    }

    #[test]
    fn test_empty_set_still_reports_last_run() {
        let metrics = RepositoryMetricSet::new();
        let observations: Vec<_> = metrics.enumerate().collect();

        assert_eq!(observations, [Observation::LastSuccessfulRun(None)]);
        assert!(observations[0].value().abs() < f64::EPSILON);
    }
}
