use super::{MetricFamily, RepositoryMetricSet};
use crate::Result;
use crate::facts::LabelSet;
use core::fmt;
use ohno::IntoAppError;
use prometheus_client::collector::Collector;
use prometheus_client::encoding::{DescriptorEncoder, EncodeMetric, text};
use prometheus_client::metrics::MetricType;
use prometheus_client::metrics::gauge::ConstGauge;
use prometheus_client::registry::Registry;

/// Label naming the repository when several repositories share one exposition
const REPOSITORY_LABEL: &str = "repository";

/// The samples of one or more metric sets, registered as a single collector
///
/// Every family is described once, no matter how many repositories contribute to it.
/// Label values are stored already escaped, since the text encoder writes them verbatim.
#[derive(Debug)]
struct Exposition {
    families: Vec<(MetricFamily, Vec<(LabelSet, f64)>)>,
}

impl Exposition {
    fn collect<'a>(repositories: impl IntoIterator<Item = (Option<&'a str>, &'a RepositoryMetricSet)>) -> Self {
        let mut families: Vec<_> = MetricFamily::ALL.into_iter().map(|family| (family, Vec::new())).collect();

        for (repository, metrics) in repositories {
            for observation in metrics.enumerate() {
                let mut labels: LabelSet = repository
                    .iter()
                    .map(|name| (REPOSITORY_LABEL, escape_label_value(name)))
                    .collect();
                labels.extend(
                    observation
                        .labels()
                        .into_iter()
                        .map(|(name, value)| (name, escape_label_value(&value))),
                );

                if let Some((_, samples)) = families.iter_mut().find(|(family, _)| *family == observation.family()) {
                    samples.push((labels, observation.value()));
                }
            }
        }

        for (_, samples) in &mut families {
            samples.sort_by(|(left, _), (right, _)| left.cmp(right));
        }

        Self { families }
    }

    fn encode_family(encoder: &mut DescriptorEncoder<'_>, family: MetricFamily, samples: &[(LabelSet, f64)]) -> Result<(), fmt::Error> {
        if samples.is_empty() {
            return Ok(());
        }

        let mut metric_encoder = encoder.encode_descriptor(family.name(), family.help(), None, MetricType::Gauge)?;
        if let [(labels, value)] = samples
            && labels.is_empty()
        {
            return ConstGauge::new(*value).encode(metric_encoder);
        }

        for (labels, value) in samples {
            ConstGauge::new(*value).encode(metric_encoder.encode_family(labels)?)?;
        }

        Ok(())
    }
}

impl Collector for Exposition {
    fn encode(&self, mut encoder: DescriptorEncoder<'_>) -> Result<(), fmt::Error> {
        for (family, samples) in &self.families {
            Self::encode_family(&mut encoder, *family, samples)?;
        }
        Ok(())
    }
}

/// Escape a label value for the text exposition format
fn escape_label_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str(r"\\"),
            '"' => escaped.push_str(r#"\""#),
            '\n' => escaped.push_str(r"\n"),
            c => escaped.push(c),
        }
    }
    escaped
}

fn encode_registry(namespace: &str, exposition: Exposition) -> Result<String> {
    let mut registry = Registry::with_prefix(namespace);
    registry.register_collector(Box::new(exposition));

    let mut buffer = String::new();
    text::encode(&mut buffer, &registry).into_app_err("encoding metrics in the Prometheus text format")?;
    Ok(buffer)
}

/// Render a single repository's metrics without a repository label
///
/// This is the body pushed to a gateway group that already names the repository.
///
/// # Errors
///
/// Returns an error if text encoding fails
pub fn encode_repository(namespace: &str, metrics: &RepositoryMetricSet) -> Result<String> {
    encode_registry(namespace, Exposition::collect([(None, metrics)]))
}

/// Render many repositories' metrics, each series labeled with its repository
///
/// # Errors
///
/// Returns an error if text encoding fails
pub fn encode_repositories<'a>(namespace: &str, repositories: impl IntoIterator<Item = (&'a str, &'a RepositoryMetricSet)>) -> Result<String> {
    encode_registry(
        namespace,
        Exposition::collect(repositories.into_iter().map(|(name, metrics)| (Some(name), metrics))),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::{DependencyFactKey, UpdateFactKey};
    use chrono::{TimeZone, Utc};

    fn sample_metrics() -> RepositoryMetricSet {
        let mut metrics = RepositoryMetricSet::new();
        let _ = metrics.upsert_dependency(DependencyFactKey {
            manager: "npm".into(),
            package_file: "package.json".into(),
            dep_name: "lodash".into(),
            current_version: "4.17.20".into(),
            dep_type: "dependencies".into(),
            warning: String::new(),
        });
        let _ = metrics.upsert_update(UpdateFactKey {
            manager: "npm".into(),
            package_file: "package.json".into(),
            dep_name: "lodash".into(),
            current_version: "4.17.20".into(),
            dep_type: "dependencies".into(),
            update_type: "patch".into(),
            new_version: "4.17.21".into(),
            vulnerability_fix: true,
            release_timestamp: 1_613_835_736,
        });
        metrics.record_completion(Utc.timestamp_opt(1_679_636_088, 0).unwrap());
        metrics
    }

    #[test]
    fn test_encode_repository_has_all_families() {
        let text = encode_repository("renovate", &sample_metrics()).unwrap();

        assert!(text.contains("# HELP renovate_dependency Installed dependency"), "{text}");
        assert!(text.contains("# TYPE renovate_dependency gauge"), "{text}");
        assert!(text.contains("# HELP renovate_dependency_update Available update of an installed dependency"), "{text}");
        assert!(text.contains("# HELP renovate_last_successful_timestamp Timestamp of the last successful execution"), "{text}");
        assert!(text.contains("renovate_last_successful_timestamp 1679636088"), "{text}");
        assert!(text.contains("depName=\"lodash\""), "{text}");
        assert!(text.contains("vulnerabilityFix=\"true\""), "{text}");
        assert!(text.contains("releaseTimestamp=\"1613835736\""), "{text}");
        assert!(!text.contains("repository="), "{text}");
    }

    #[test]
    fn test_encode_repository_without_facts() {
        let text = encode_repository("renovate", &RepositoryMetricSet::new()).unwrap();

        assert!(text.contains("renovate_last_successful_timestamp 0"), "{text}");
        assert!(!text.contains("renovate_dependency"), "{text}");
    }

    #[test]
    fn test_encode_repositories_labels_each_series() {
        let first = sample_metrics();
        let second = RepositoryMetricSet::new();
        let text = encode_repositories("deps", [("org/b", &second), ("org/a", &first)]).unwrap();

        assert_eq!(text.matches("# TYPE deps_last_successful_timestamp gauge").count(), 1, "{text}");
        assert!(text.contains("deps_last_successful_timestamp{repository=\"org/a\"} 1679636088"), "{text}");
        assert!(text.contains("deps_last_successful_timestamp{repository=\"org/b\"} 0"), "{text}");
        assert!(text.contains("deps_dependency{repository=\"org/a\",manager=\"npm\""), "{text}");

        let a = text.find("repository=\"org/a\"").unwrap();
        let b = text.find("repository=\"org/b\"").unwrap();
        assert!(a < b, "{text}");
    }

    fn warned_metrics() -> RepositoryMetricSet {
        let mut metrics = RepositoryMetricSet::new();
        let _ = metrics.upsert_dependency(DependencyFactKey {
            manager: "npm".into(),
            package_file: "package.json".into(),
            dep_name: "react".into(),
            current_version: "17.0.2".into(),
            dep_type: "devDependencies".into(),
            warning: "bad \"quote\" \\ and\nnewline".into(),
        });
        metrics
    }

    #[test]
    fn test_escape_label_value() {
        assert_eq!(escape_label_value("plain"), "plain");
        assert_eq!(escape_label_value(r"a\b"), r"a\\b");
        assert_eq!(escape_label_value(r#"say "hi""#), r#"say \"hi\""#);
        assert_eq!(escape_label_value("one\ntwo"), r"one\ntwo");
    }

    #[test]
    fn test_encode_repository_escapes_label_values() {
        let text = encode_repository("renovate", &warned_metrics()).unwrap();

        assert!(text.contains(r#"warning="bad \"quote\" \\ and\nnewline"} 1"#), "{text}");
        assert!(!text.contains("and\nnewline"), "{text}");

        // every sample stays on a single line
        let samples: Vec<_> = text.lines().filter(|line| !line.starts_with('#')).collect();
        assert_eq!(samples.len(), 2, "{text}");
        assert!(samples.iter().all(|line| line.starts_with("renovate_")), "{text}");
    }

    #[test]
    fn test_encode_repositories_escapes_label_values() {
        let metrics = warned_metrics();
        let text = encode_repositories("renovate", [("org/\"odd\"\nname", &metrics)]).unwrap();

        assert!(
            text.contains(r#"renovate_dependency{repository="org/\"odd\"\nname",manager="npm""#),
            "{text}"
        );
        assert!(text.contains(r#"warning="bad \"quote\" \\ and\nnewline"} 1"#), "{text}");
        assert!(!text.contains("and\nnewline"), "{text}");
        assert!(!text.contains("\nname"), "{text}");
    }
}
