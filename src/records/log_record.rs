use super::{AlertPackageRule, PackageFileEntry};
use crate::Result;
use ohno::IntoAppError;
use serde::Deserialize;
use std::collections::BTreeMap;

/// One decoded line of Renovate's JSON log
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub hostname: Option<String>,

    #[serde(default)]
    pub pid: Option<i64>,

    #[serde(default)]
    pub level: Option<i64>,

    #[serde(default, rename = "msg")]
    pub message: Option<String>,

    #[serde(default)]
    pub log_context: Option<String>,

    #[serde(default)]
    pub time: Option<String>,

    #[serde(default)]
    pub repository: Option<String>,

    #[serde(default)]
    pub base_branch: Option<String>,

    /// Dependency configuration keyed by package manager (`npm`, `cargo`, ...)
    #[serde(default)]
    pub config: Option<BTreeMap<String, Vec<PackageFileEntry>>>,

    #[serde(default, deserialize_with = "super::nullable")]
    pub alert_package_rules: Vec<AlertPackageRule>,
}

impl LogRecord {
    /// Decode a single JSON log line
    ///
    /// # Errors
    ///
    /// Returns an error if the line is not a valid JSON object.
    pub fn decode(line: &[u8]) -> Result<Self> {
        serde_json::from_slice(line).into_app_err("decoding JSON log line")
    }

    /// The repository this record belongs to, if it names one
    #[must_use]
    pub fn repository(&self) -> Option<&str> {
        self.repository.as_deref().filter(|name| !name.is_empty())
    }

    /// The log message, empty when the record has none
    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_deref().unwrap_or_default()
    }
}
