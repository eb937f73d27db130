use crate::records::{DependencyEntry, UpdateEntry};

/// Label name/value pairs of one exported series
pub type LabelSet = Vec<(&'static str, String)>;

/// Identity of an installed-dependency observation
///
/// Two observations with equal keys are the same fact and share one series.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DependencyFactKey {
    pub manager: String,
    pub package_file: String,
    pub dep_name: String,
    pub current_version: String,
    pub dep_type: String,
    pub warning: String,
}

impl DependencyFactKey {
    #[must_use]
    pub fn new(manager: &str, package_file: &str, dependency: &DependencyEntry) -> Self {
        Self {
            manager: manager.to_owned(),
            package_file: package_file.to_owned(),
            dep_name: dependency.dep_name.clone(),
            current_version: dependency.current_value.clone(),
            dep_type: dependency.dep_type.clone(),
            warning: dependency.warning_message().unwrap_or_default().to_owned(),
        }
    }

    #[must_use]
    pub fn labels(&self) -> LabelSet {
        vec![
            ("manager", self.manager.clone()),
            ("packageFile", self.package_file.clone()),
            ("depName", self.dep_name.clone()),
            ("depType", self.dep_type.clone()),
            ("currentVersion", self.current_version.clone()),
            ("warning", self.warning.clone()),
        ]
    }
}

/// Identity of an available-update observation
///
/// The release timestamp is part of the identity: the same upgrade reported with a
/// different release time is a different fact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UpdateFactKey {
    pub manager: String,
    pub package_file: String,
    pub dep_name: String,
    pub current_version: String,
    pub dep_type: String,
    pub update_type: String,
    pub new_version: String,
    pub vulnerability_fix: bool,

    /// Unix seconds; 0 when the reported timestamp could not be parsed
    pub release_timestamp: i64,
}

impl UpdateFactKey {
    #[must_use]
    pub fn new(
        manager: &str,
        package_file: &str,
        dependency: &DependencyEntry,
        update: &UpdateEntry,
        vulnerability_fix: bool,
        release_timestamp: i64,
    ) -> Self {
        Self {
            manager: manager.to_owned(),
            package_file: package_file.to_owned(),
            dep_name: dependency.dep_name.clone(),
            current_version: dependency.current_value.clone(),
            dep_type: dependency.dep_type.clone(),
            update_type: update.update_type.clone(),
            new_version: update.new_version.clone(),
            vulnerability_fix,
            release_timestamp,
        }
    }

    #[must_use]
    pub fn labels(&self) -> LabelSet {
        vec![
            ("manager", self.manager.clone()),
            ("packageFile", self.package_file.clone()),
            ("depName", self.dep_name.clone()),
            ("depType", self.dep_type.clone()),
            ("currentVersion", self.current_version.clone()),
            ("updateType", self.update_type.clone()),
            ("newVersion", self.new_version.clone()),
            ("vulnerabilityFix", self.vulnerability_fix.to_string()),
            ("releaseTimestamp", self.release_timestamp.to_string()),
        ]
    }
}
