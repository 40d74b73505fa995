//! Pull-request workflow for generated documentation.
//!
//! After a run has written into the documentation checkout, [`Publisher`]
//! turns the changes into a branch, pushes it and opens a pull request
//! against the documentation branch. A branch that already exists upstream
//! means an earlier pull request is still open, so nothing is pushed.

use crate::constants::{DOCS_REPOSITORY, DOCS_TARGET_BRANCH};
use crate::git::DocsCheckout;
use crate::github::GithubClient;
use anyhow::Result;
use colored::Colorize;
use tracing::info;

/// What to publish: the branch and the texts that describe it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Publication {
    pub branch: String,
    pub commit_message: String,
    pub title: String,
}

impl Publication {
    pub fn new(branch: impl Into<String>, commit_message: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            branch: branch.into(),
            commit_message: commit_message.into(),
            title: title.into(),
        }
    }
}

/// How a publish attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// The checkout matched `HEAD`
    NoChanges,
    /// Changes were found but `--dry-run` was given
    DryRun,
    /// The branch already exists upstream
    BranchExists,
    /// A pull request was opened at this URL
    Opened(String),
}

pub struct Publisher {
    client: GithubClient,
    repository: String,
    base: String,
    dry_run: bool,
}

impl Publisher {
    pub fn new(client: GithubClient, dry_run: bool) -> Self {
        Self {
            client,
            repository: DOCS_REPOSITORY.to_string(),
            base: DOCS_TARGET_BRANCH.to_string(),
            dry_run,
        }
    }

    /// Targets `repository` (`owner/name`) instead of the documentation repository.
    pub fn with_repository(mut self, repository: impl Into<String>) -> Self {
        self.repository = repository.into();
        self
    }

    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base = base.into();
        self
    }

    pub async fn publish(&self, checkout: &DocsCheckout, publication: &Publication) -> Result<PublishOutcome> {
        if !checkout.has_changes().await? {
            info!("No new versions detected. Exiting.");
            return Ok(PublishOutcome::NoChanges);
        }
        if self.dry_run {
            info!("Dry run: leaving changes in {} uncommitted", checkout.path().display());
            return Ok(PublishOutcome::DryRun);
        }

        if self.client.branch_exists(&self.repository, &publication.branch).await? {
            println!(
                "{} Branch {} already exists in {}. Please remove it before running again.",
                "WARNING:".yellow().bold(),
                publication.branch,
                self.repository
            );
            return Ok(PublishOutcome::BranchExists);
        }

        info!("Committing to branch {}", publication.branch);
        checkout.commit_to_branch(&publication.branch, &publication.commit_message).await?;

        let url = self
            .client
            .create_pull_request(&self.repository, &self.base, &publication.branch, &publication.title, "")
            .await?;
        println!("{} {url}", "Opened pull request".green());
        Ok(PublishOutcome::Opened(url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::GitCommand;
    use std::path::Path;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn git(dir: &Path, args: &[&str]) {
        GitCommand::new()
            .args(args.iter().copied())
            .current_dir(dir)
            .execute_success()
            .await
            .unwrap();
    }

    async fn checkout() -> (TempDir, DocsCheckout) {
        let temp = TempDir::new().unwrap();
        let dir = temp.path();
        git(dir, &["init", "-q"]).await;
        git(dir, &["config", "user.email", "docs@example.com"]).await;
        git(dir, &["config", "user.name", "Docs Bot"]).await;
        git(dir, &["config", "commit.gpgsign", "false"]).await;
        std::fs::write(dir.join("index.asciidoc"), "= Docs\n").unwrap();
        git(dir, &["add", "."]).await;
        git(dir, &["commit", "-q", "-m", "initial"]).await;
        let checkout = DocsCheckout::open(dir);
        (temp, checkout)
    }

    fn publication() -> Publication {
        Publication::new("versioned_docs_new_content", "update", "updated docs")
    }

    #[tokio::test]
    async fn test_clean_checkout_publishes_nothing() {
        let server = MockServer::start().await;
        let client = GithubClient::new(Some("token".to_string())).unwrap().with_api_url(server.uri());
        let (_temp, checkout) = checkout().await;

        let outcome = Publisher::new(client, false).publish(&checkout, &publication()).await.unwrap();
        assert_eq!(outcome, PublishOutcome::NoChanges);
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_dry_run_stops_before_github() {
        let server = MockServer::start().await;
        let client = GithubClient::new(Some("token".to_string())).unwrap().with_api_url(server.uri());
        let (temp, checkout) = checkout().await;
        std::fs::write(temp.path().join("new.asciidoc"), "new\n").unwrap();

        let outcome = Publisher::new(client, true).publish(&checkout, &publication()).await.unwrap();
        assert_eq!(outcome, PublishOutcome::DryRun);
        assert!(server.received_requests().await.unwrap().is_empty());

        let status = GitCommand::status_porcelain().current_dir(temp.path()).execute_stdout().await.unwrap();
        assert_eq!(status, "?? new.asciidoc");
    }

    #[tokio::test]
    async fn test_existing_branch_is_not_pushed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/elastic/logstash-docs/branches/versioned_docs_new_content"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"name": "x"})))
            .mount(&server)
            .await;
        let client = GithubClient::new(Some("token".to_string())).unwrap().with_api_url(server.uri());
        let (temp, checkout) = checkout().await;
        std::fs::write(temp.path().join("index.asciidoc"), "= Docs\n\nchanged\n").unwrap();

        let outcome = Publisher::new(client, false).publish(&checkout, &publication()).await.unwrap();
        assert_eq!(outcome, PublishOutcome::BranchExists);
    }
}
