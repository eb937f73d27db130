use serde::Deserialize;

/// A vulnerability alert rule as Renovate logs it
///
/// These rules are decoded so that they survive a round trip through the model,
/// but no metric is derived from them.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertPackageRule {
    #[serde(default, deserialize_with = "super::nullable")]
    pub match_datasources: Vec<String>,

    #[serde(default, deserialize_with = "super::nullable")]
    pub match_package_names: Vec<String>,

    #[serde(default, deserialize_with = "super::nullable")]
    pub match_files: Vec<String>,

    #[serde(default, deserialize_with = "super::nullable")]
    pub match_current_version: String,

    #[serde(default, deserialize_with = "super::nullable")]
    pub allowed_version: String,
}
