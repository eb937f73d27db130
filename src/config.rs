use crate::Result;
use camino::{Utf8Path, Utf8PathBuf};
use core::time::Duration;
use ohno::{IntoAppError, app_err, bail};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::sync::LazyLock;

/// The default configuration TOML content, embedded from `default_config.toml`
pub const DEFAULT_CONFIG_TOML: &str = include_str!("../default_config.toml");

/// File name, without extension, searched for when no configuration path is given
pub const CONFIG_FILE_STEM: &str = "renovate-metrics";

static METRIC_NAMESPACE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new("^[a-zA-Z_:][a-zA-Z0-9_:]*$").expect("invalid regex"));

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Prefix applied to every exported metric name
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Longest accepted log line in bytes
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,

    /// Log message marking a finished run
    #[serde(default = "default_completion_message")]
    pub completion_message: String,

    /// Regular expression flagging vulnerability-fix branches
    #[serde(default = "default_vulnerability_branch_pattern")]
    pub vulnerability_branch_pattern: String,

    /// Base URL of the Prometheus push gateway
    #[serde(default = "default_push_gateway_url")]
    pub push_gateway_url: String,

    /// Job name used as the top-level grouping key on the push gateway
    #[serde(default = "default_push_job")]
    pub push_job: String,

    /// Timeout for each push gateway request
    #[serde(default = "default_push_timeout", with = "humantime_serde")]
    pub push_timeout: Duration,
}

fn default_namespace() -> String {
    "renovate".into()
}

const fn default_buffer_size() -> usize {
    10 * 1024 * 1024
}

fn default_completion_message() -> String {
    crate::facts::DEFAULT_COMPLETION_MESSAGE.into()
}

fn default_vulnerability_branch_pattern() -> String {
    crate::facts::DEFAULT_VULNERABILITY_BRANCH_PATTERN.into()
}

fn default_push_gateway_url() -> String {
    "http://localhost:9091".into()
}

fn default_push_job() -> String {
    "renovate".into()
}

const fn default_push_timeout() -> Duration {
    Duration::from_secs(30)
}

impl Config {
    /// Load configuration from a file or use defaults
    ///
    /// Without an explicit path, `renovate-metrics.[toml|yml|yaml|json]` is looked up
    /// in `base_dir`. Returns the configuration together with the file it came from.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or fails validation
    pub fn load(base_dir: &Utf8Path, config_path: Option<&Utf8PathBuf>) -> Result<(Self, Option<Utf8PathBuf>)> {
        let (final_path, text) = if let Some(path) = config_path {
            let text = fs::read_to_string(path).into_app_err_with(|| format!("reading renovate-metrics configuration from {path}"))?;
            (path.clone(), text)
        } else {
            let candidates = ["toml", "yml", "yaml", "json"].map(|ext| base_dir.join(format!("{CONFIG_FILE_STEM}.{ext}")));

            let mut found = None;
            for path in &candidates {
                match fs::read_to_string(path) {
                    Ok(text) => {
                        found = Some((path.clone(), text));
                        break;
                    }
                    Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                    Err(e) => return Err(e).into_app_err_with(|| format!("reading renovate-metrics configuration from {path}")),
                }
            }

            let Some(result) = found else {
                return Ok((Self::default(), None));
            };
            result
        };

        let extension = final_path.extension().unwrap_or_default();
        let config: Self = match extension {
            "toml" => toml::from_str(&text).into_app_err_with(|| format!("parsing TOML configuration from {final_path}"))?,
            "yml" | "yaml" => serde_yaml::from_str(&text).into_app_err_with(|| format!("parsing YAML configuration from {final_path}"))?,
            "json" => serde_json::from_str(&text).into_app_err_with(|| format!("parsing JSON configuration from {final_path}"))?,
            _ => return Err(app_err!("unsupported configuration file extension: {extension}")),
        };

        config.validate()?;
        Ok((config, Some(final_path)))
    }

    /// Save configuration to a file, picking the format from the extension
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or serialization fails
    pub fn save(&self, output_path: &Utf8Path) -> Result<()> {
        let extension = output_path.extension().unwrap_or_default();
        let text = match extension {
            "toml" => toml::to_string_pretty(self)
                .into_app_err_with(|| format!("serializing configuration to TOML for saving to {output_path}"))?,
            "yml" | "yaml" => serde_yaml::to_string(self)
                .into_app_err_with(|| format!("serializing configuration to YAML for saving to {output_path}"))?,
            "json" => serde_json::to_string_pretty(self)
                .into_app_err_with(|| format!("serializing configuration to JSON for saving to {output_path}"))?,
            _ => return Err(app_err!("unsupported configuration file extension: {extension}")),
        };

        fs::write(output_path, text).into_app_err_with(|| format!("writing configuration to {output_path}"))?;
        Ok(())
    }

    /// Save the default configuration, keeping its comments when writing TOML
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written
    pub fn save_default(output_path: &Utf8Path) -> Result<()> {
        if output_path.extension() == Some("toml") {
            fs::write(output_path, DEFAULT_CONFIG_TOML).into_app_err_with(|| format!("writing default configuration to {output_path}"))?;
            Ok(())
        } else {
            Self::default().save(output_path)
        }
    }

    /// Check that every value is usable
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid setting
    pub fn validate(&self) -> Result<()> {
        if !METRIC_NAMESPACE_REGEX.is_match(&self.namespace) {
            bail!("namespace '{}' is not a valid Prometheus metric name prefix", self.namespace);
        }

        if self.buffer_size == 0 {
            bail!("buffer_size must be greater than zero");
        }

        if self.completion_message.is_empty() {
            bail!("completion_message must not be empty");
        }

        let _ = Regex::new(&self.vulnerability_branch_pattern)
            .into_app_err_with(|| format!("vulnerability_branch_pattern '{}' is not a valid regular expression", self.vulnerability_branch_pattern))?;

        let url = url::Url::parse(&self.push_gateway_url)
            .into_app_err_with(|| format!("push_gateway_url '{}' is not a valid URL", self.push_gateway_url))?;
        if !matches!(url.scheme(), "http" | "https") {
            bail!("push_gateway_url must use http or https, got '{}'", url.scheme());
        }

        if self.push_job.is_empty() {
            bail!("push_job must not be empty");
        }

        if self.push_timeout.is_zero() {
            bail!("push_timeout must be greater than zero");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        toml::from_str(DEFAULT_CONFIG_TOML).expect("default_config.toml should be valid TOML that deserializes to Config")
    }
}
