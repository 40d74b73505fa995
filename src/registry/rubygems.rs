//! HTTP client for the rubygems.org versions API.

use super::{RegistryApi, ReleaseMetadata};
use crate::constants::{HTTP_TIMEOUT, REGISTRY_MAX_ATTEMPTS, REGISTRY_RETRY_BASE_MS, RUBYGEMS_API_URL};
use crate::core::DocketError;
use crate::utils::BlockingRuntime;
use crate::utils::backoff::retry_schedule;
use anyhow::{Context, Result};
use reqwest::StatusCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio_retry::RetryIf;
use tracing::{debug, warn};

/// Registry client fetching `GET {base}/versions/{package}.json`.
///
/// Rate limiting (429), server errors and transport failures are retried with
/// exponential backoff, up to [`REGISTRY_MAX_ATTEMPTS`] attempts in total.
/// A 404 is an answer ("no such package"), not a failure, and is never retried.
#[derive(Debug, Clone)]
pub struct RubygemsClient {
    client: reqwest::Client,
    runtime: BlockingRuntime,
    base_url: String,
    max_attempts: usize,
    retry_base_ms: u64,
    attempts: Arc<AtomicUsize>,
}

impl RubygemsClient {
    pub fn new(runtime: BlockingRuntime) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .user_agent(concat!("docket/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build registry HTTP client")?;

        Ok(Self {
            client,
            runtime,
            base_url: RUBYGEMS_API_URL.to_string(),
            max_attempts: REGISTRY_MAX_ATTEMPTS,
            retry_base_ms: REGISTRY_RETRY_BASE_MS,
            attempts: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Overrides the base URL (for testing with wiremock).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn with_retry_base_ms(mut self, retry_base_ms: u64) -> Self {
        self.retry_base_ms = retry_base_ms;
        self
    }

    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Total HTTP attempts made by this client (and its clones).
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Fetches every published release of `package`, retrying transient failures.
    pub async fn fetch(&self, package: &str) -> Result<Vec<ReleaseMetadata>> {
        let url = format!("{}/versions/{package}.json", self.base_url);
        let strategy = retry_schedule(self.retry_base_ms, self.max_attempts);

        let outcome = RetryIf::spawn(
            strategy,
            || self.request(package, &url),
            |e: &DocketError| matches!(e, DocketError::RegistryUnavailable { .. }),
        )
        .await;

        match outcome {
            Ok(Some(releases)) => Ok(releases),
            Ok(None) => {
                debug!("[registry:{package}] not found");
                Ok(Vec::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn request(&self, package: &str, url: &str) -> Result<Option<Vec<ReleaseMetadata>>, DocketError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        debug!("[registry:{package}] GET {url} (attempt {attempt})");

        let unavailable = |reason: String| DocketError::RegistryUnavailable {
            package: package.to_string(),
            reason,
        };

        let response = self.client.get(url).send().await.map_err(|e| unavailable(e.to_string()))?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            warn!("[registry:{package}] transient response {status}");
            return Err(unavailable(format!("HTTP {status}")));
        }
        if !status.is_success() {
            return Err(DocketError::Other {
                message: format!("Registry returned HTTP {status} for `{package}`"),
            });
        }

        let body = response.text().await.map_err(|e| unavailable(e.to_string()))?;
        let releases = serde_json::from_str::<Vec<ReleaseMetadata>>(&body).map_err(|e| {
            DocketError::Other {
                message: format!("Malformed registry response for `{package}`: {e}"),
            }
        })?;
        Ok(Some(releases))
    }
}

impl RegistryApi for RubygemsClient {
    fn fetch_releases(&self, package: &str) -> Result<Vec<ReleaseMetadata>> {
        self.runtime.block_on(self.fetch(package))
    }
}
