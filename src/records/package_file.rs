use serde::Deserialize;

/// A manifest file and the dependencies Renovate found in it
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageFileEntry {
    #[serde(default, deserialize_with = "super::nullable")]
    pub package_file: String,

    #[serde(default, deserialize_with = "super::nullable")]
    pub deps: Vec<DependencyEntry>,
}

/// One dependency declared in a package file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyEntry {
    #[serde(default, deserialize_with = "super::nullable")]
    pub dep_name: String,

    #[serde(default, deserialize_with = "super::nullable")]
    pub current_value: String,

    /// Classifier such as `dependencies` or `devDependencies`
    #[serde(default, deserialize_with = "super::nullable")]
    pub dep_type: String,

    #[serde(default, deserialize_with = "super::nullable")]
    pub updates: Vec<UpdateEntry>,

    #[serde(default, deserialize_with = "super::nullable")]
    pub warnings: Vec<Warning>,

    #[serde(default, deserialize_with = "super::nullable")]
    pub datasource: String,

    #[serde(default, deserialize_with = "super::nullable")]
    pub package_name: String,

    #[serde(default, deserialize_with = "super::nullable")]
    pub versioning: String,

    #[serde(default, deserialize_with = "super::nullable")]
    pub skip_reason: String,
}

impl DependencyEntry {
    /// Message of the first warning whose topic is this dependency, if any
    #[must_use]
    pub fn warning_message(&self) -> Option<&str> {
        self.warnings
            .iter()
            .find(|warning| warning.topic == self.dep_name)
            .map(|warning| warning.message.as_str())
    }
}

/// An available upgrade for a dependency
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEntry {
    #[serde(default, deserialize_with = "super::nullable")]
    pub new_version: String,

    /// `major`, `minor`, `patch`, `digest`, ...
    #[serde(default, deserialize_with = "super::nullable")]
    pub update_type: String,

    /// RFC 3339 release time as reported by the datasource; not guaranteed to parse
    #[serde(default, deserialize_with = "super::nullable")]
    pub release_timestamp: String,

    #[serde(default, deserialize_with = "super::nullable")]
    pub branch_name: String,

    #[serde(default, deserialize_with = "super::nullable")]
    pub bucket: String,

    #[serde(default, deserialize_with = "super::nullable")]
    pub new_value: String,

    #[serde(default)]
    pub new_major: Option<u64>,

    #[serde(default)]
    pub new_minor: Option<u64>,

    #[serde(default, deserialize_with = "super::nullable")]
    pub new_digest: String,
}

/// A warning Renovate attached while looking up a dependency
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Warning {
    #[serde(default, deserialize_with = "super::nullable")]
    pub topic: String,

    #[serde(default, deserialize_with = "super::nullable")]
    pub message: String,
}
