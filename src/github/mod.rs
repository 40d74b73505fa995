//! GitHub REST and raw-content client.
//!
//! Raw file reads are anonymous. Everything under the REST API (tags,
//! organisation repositories, branches, pull requests) requires a token; calls
//! made without one fail with [`DocketError::GithubTokenRequired`] before any
//! request is sent.
//!
//! All methods are async. Blocking domain code reaches them through
//! [`crate::utils::BlockingRuntime`].

use crate::constants::{GITHUB_API_URL, GITHUB_RAW_URL, HTTP_TIMEOUT};
use crate::core::DocketError;
use anyhow::{Context, Result};
use reqwest::{RequestBuilder, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

const PAGE_SIZE: usize = 100;

#[derive(Debug, Deserialize)]
struct Named {
    name: String,
}

#[derive(Debug, Deserialize)]
struct PullRequest {
    html_url: String,
}

#[derive(Debug, Deserialize)]
struct RateLimit {
    rate: RateLimitWindow,
}

#[derive(Debug, Deserialize)]
struct RateLimitWindow {
    remaining: u64,
}

#[derive(Debug, Clone)]
pub struct GithubClient {
    client: reqwest::Client,
    token: Option<String>,
    api_url: String,
    raw_url: String,
}

impl GithubClient {
    pub fn new(token: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .user_agent(concat!("docket/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build GitHub HTTP client")?;

        Ok(Self {
            client,
            token: token.filter(|t| !t.trim().is_empty()),
            api_url: GITHUB_API_URL.to_string(),
            raw_url: GITHUB_RAW_URL.to_string(),
        })
    }

    /// Client authenticated with `GITHUB_TOKEN` when it is set.
    pub fn from_env() -> Result<Self> {
        Self::new(std::env::var("GITHUB_TOKEN").ok())
    }

    #[must_use]
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into().trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn with_raw_url(mut self, url: impl Into<String>) -> Self {
        self.raw_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Reads `path` of `org/repo` at `reference`; `None` on 404.
    pub async fn raw_file(&self, org: &str, repo: &str, reference: &str, path: &str) -> Result<Option<String>> {
        let url = format!("{}/{org}/{repo}/{reference}/{path}", self.raw_url);
        self.fetch_text(&url).await
    }

    /// GETs `url` as text; `None` on 404, error on any other non-success status.
    pub async fn fetch_text(&self, url: &str) -> Result<Option<String>> {
        debug!("GET {url}");
        let response = self.client.get(url).send().await.map_err(|e| DocketError::SourceRequest {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let body = response.text().await.map_err(|e| DocketError::SourceRequest {
                    url: url.to_string(),
                    reason: e.to_string(),
                })?;
                Ok(Some(body))
            }
            status => Err(DocketError::SourceRequest {
                url: url.to_string(),
                reason: format!("HTTP {status}"),
            }
            .into()),
        }
    }

    /// All tag names of `org/repo`.
    pub async fn tags(&self, org: &str, repo: &str) -> Result<Vec<String>> {
        let names: Vec<Named> = self.paginate("tags", &format!("repos/{org}/{repo}/tags")).await?;
        Ok(names.into_iter().map(|n| n.name).collect())
    }

    /// Names of every repository owned by `org`.
    pub async fn org_repositories(&self, org: &str) -> Result<Vec<String>> {
        let names: Vec<Named> = self.paginate("organization repositories", &format!("orgs/{org}/repos")).await?;
        Ok(names.into_iter().map(|n| n.name).collect())
    }

    /// Whether `branch` exists in `repository` (`owner/name`).
    pub async fn branch_exists(&self, repository: &str, branch: &str) -> Result<bool> {
        let operation = "branch lookup";
        let url = format!("{}/repos/{repository}/branches/{branch}", self.api_url);
        let response = self.send(operation, self.authorized(operation, self.client.get(&url))?).await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            status if status.is_success() => Ok(true),
            status => Err(api_error(operation, status, response).await),
        }
    }

    /// Opens a pull request and returns its web URL.
    pub async fn create_pull_request(
        &self,
        repository: &str,
        base: &str,
        head: &str,
        title: &str,
        body: &str,
    ) -> Result<String> {
        let operation = "pull request creation";
        let url = format!("{}/repos/{repository}/pulls", self.api_url);
        let request = self.client.post(&url).json(&serde_json::json!({
            "title": title,
            "head": head,
            "base": base,
            "body": body,
        }));
        let response = self.send(operation, self.authorized(operation, request)?).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(api_error(operation, status, response).await);
        }
        let pr: PullRequest = response.json().await.map_err(|e| DocketError::GithubApi {
            operation: operation.to_string(),
            reason: e.to_string(),
        })?;
        Ok(pr.html_url)
    }

    /// Remaining core API requests in the current window.
    pub async fn rate_limit_remaining(&self) -> Result<u64> {
        let url = format!("{}/rate_limit", self.api_url);
        let limit: RateLimit = self.get_json("rate limit", &url).await?;
        Ok(limit.rate.remaining)
    }

    async fn paginate<T: DeserializeOwned>(&self, operation: &str, endpoint: &str) -> Result<Vec<T>> {
        let mut items = Vec::new();
        for page in 1.. {
            let url = format!("{}/{endpoint}?per_page={PAGE_SIZE}&page={page}", self.api_url);
            let batch: Vec<T> = self.get_json(operation, &url).await?;
            let done = batch.len() < PAGE_SIZE;
            items.extend(batch);
            if done {
                break;
            }
        }
        Ok(items)
    }

    async fn get_json<T: DeserializeOwned>(&self, operation: &str, url: &str) -> Result<T> {
        debug!("GitHub {operation}: GET {url}");
        let response = self.send(operation, self.authorized(operation, self.client.get(url))?).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(api_error(operation, status, response).await);
        }
        let value = response.json().await.map_err(|e| DocketError::GithubApi {
            operation: operation.to_string(),
            reason: format!("malformed response: {e}"),
        })?;
        Ok(value)
    }

    fn authorized(&self, operation: &str, request: RequestBuilder) -> Result<RequestBuilder> {
        let token = self.token.as_deref().ok_or_else(|| DocketError::GithubTokenRequired {
            operation: operation.to_string(),
        })?;
        Ok(request
            .bearer_auth(token)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28"))
    }

    async fn send(&self, operation: &str, request: RequestBuilder) -> Result<reqwest::Response> {
        request.send().await.map_err(|e| {
            DocketError::GithubApi {
                operation: operation.to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }
}

async fn api_error(operation: &str, status: StatusCode, response: reqwest::Response) -> anyhow::Error {
    let body = response.text().await.unwrap_or_default();
    let summary: String = body.chars().take(200).collect();
    DocketError::GithubApi {
        operation: operation.to_string(),
        reason: format!("HTTP {status}: {summary}"),
    }
    .into()
}
