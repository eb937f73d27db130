use crate::Result;
use crate::config::Config;
use crate::metrics::{RepositoryMetricSet, encode_repository};
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use core::time::Duration;
use ohno::{IntoAppError, app_err, bail};
use reqwest::header::CONTENT_TYPE;
use url::Url;

const LOG_TARGET: &str = "      push";

/// Content type of the text exposition format accepted by the gateway
const TEXT_FORMAT: &str = "text/plain; version=0.0.4; charset=utf-8";

/// A Prometheus push gateway, grouping metrics by job and repository
#[derive(Debug, Clone)]
pub struct PushGateway {
    client: reqwest::Client,
    base: Url,
    job: String,
}

impl PushGateway {
    /// # Errors
    ///
    /// Returns an error if the URL does not parse or the HTTP client cannot be created
    pub fn new(base_url: &str, job: impl Into<String>, timeout: Duration) -> Result<Self> {
        let base = Url::parse(base_url).into_app_err_with(|| format!("parsing push gateway URL '{base_url}'"))?;
        if base.cannot_be_a_base() {
            bail!("push gateway URL '{base_url}' cannot hold a path");
        }

        let client = reqwest::Client::builder()
            .user_agent(concat!("renovate-metrics/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .into_app_err("unable to create HTTP client")?;

        Ok(Self {
            client,
            base,
            job: job.into(),
        })
    }

    /// # Errors
    ///
    /// Returns an error if the configured URL does not parse or the HTTP client cannot be created
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.push_gateway_url, config.push_job.as_str(), config.push_timeout)
    }

    /// URL of the group holding a repository's metrics
    ///
    /// Grouping values are base64url-encoded, so repository names may contain `/`.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL cannot hold a path
    pub fn group_url(&self, repository: &str) -> Result<Url> {
        let job = encode_grouping_value(&self.job);
        let repository = encode_grouping_value(repository);

        let mut url = self.base.clone();
        let _ = url
            .path_segments_mut()
            .map_err(|()| app_err!("push gateway URL '{}' cannot hold a path", self.base))?
            .pop_if_empty()
            .extend(["metrics", "job@base64", job.as_str(), "repository@base64", repository.as_str()]);
        Ok(url)
    }

    /// Delete every series previously pushed for a repository
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the gateway does not answer with success
    pub async fn delete(&self, repository: &str) -> Result<()> {
        let url = self.group_url(repository)?;
        log::debug!(target: LOG_TARGET, "Deleting {url}");

        let response = self
            .client
            .delete(url)
            .send()
            .await
            .into_app_err_with(|| format!("deleting pushed metrics of '{repository}'"))?;

        if !response.status().is_success() {
            bail!("push gateway refused to delete metrics of '{repository}': HTTP {}", response.status());
        }

        Ok(())
    }

    /// Replace a repository's group with the given exposition text
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the gateway does not answer with success
    pub async fn push(&self, repository: &str, body: String) -> Result<()> {
        let url = self.group_url(repository)?;
        log::debug!(target: LOG_TARGET, "Pushing {} bytes to {url}", body.len());

        let response = self
            .client
            .put(url)
            .header(CONTENT_TYPE, TEXT_FORMAT)
            .body(body)
            .send()
            .await
            .into_app_err_with(|| format!("pushing metrics of '{repository}'"))?;

        if !response.status().is_success() {
            bail!("push gateway refused metrics of '{repository}': HTTP {}", response.status());
        }

        Ok(())
    }

    /// Clear a repository's previously pushed series, then push its current metrics
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails or either request fails
    pub async fn replace(&self, repository: &str, metrics: &RepositoryMetricSet, namespace: &str) -> Result<()> {
        let body = encode_repository(namespace, metrics)?;

        self.delete(repository).await?;
        self.push(repository, body).await?;

        log::info!(
            target: LOG_TARGET,
            "Pushed {} dependencies and {} updates for '{repository}'",
            metrics.dependency_series(),
            metrics.update_series()
        );
        Ok(())
    }
}

/// Encode a grouping key value; the gateway spells an empty value as `=`
fn encode_grouping_value(value: &str) -> String {
    if value.is_empty() {
        "=".to_owned()
    } else {
        URL_SAFE_NO_PAD.encode(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway(base_url: &str) -> PushGateway {
        PushGateway::new(base_url, "renovate", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_group_url() {
        let url = gateway("http://localhost:9091").group_url("acme/web").unwrap();
        assert_eq!(url.as_str(), "http://localhost:9091/metrics/job@base64/cmVub3ZhdGU/repository@base64/YWNtZS93ZWI");
    }

    #[test]
    fn test_group_url_keeps_base_path() {
        let url = gateway("https://gateway.example.com/prometheus/").group_url("acme/api").unwrap();
        assert_eq!(
            url.as_str(),
            "https://gateway.example.com/prometheus/metrics/job@base64/cmVub3ZhdGU/repository@base64/YWNtZS9hcGk"
        );
    }

    #[test]
    fn test_encode_grouping_value() {
        assert_eq!(encode_grouping_value(""), "=");
        assert_eq!(encode_grouping_value("group/sub group"), "Z3JvdXAvc3ViIGdyb3Vw");
    }

    #[test]
    fn test_rejects_bad_url() {
        let _ = PushGateway::new("not a url", "renovate", Duration::from_secs(5)).unwrap_err();
        let _ = PushGateway::new("mailto:metrics@example.com", "renovate", Duration::from_secs(5)).unwrap_err();
    }
}
