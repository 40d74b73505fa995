//! Git operations on the documentation checkout.
//!
//! docket shells out to the system `git`, so the user's credentials, SSH
//! agent and configuration apply exactly as they do on the command line.
//! [`DocsCheckout`] wraps the handful of operations the publish workflow
//! needs; every invocation is built with [`GitCommand`].

pub mod command_builder;

pub use command_builder::GitCommand;

use crate::core::DocketError;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tracing::info;

/// Remote every branch is pushed to.
pub const REMOTE: &str = "origin";

/// A local clone of the documentation repository.
#[derive(Debug, Clone)]
pub struct DocsCheckout {
    path: PathBuf,
}

impl DocsCheckout {
    /// Wraps an existing clone at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
        }
    }

    /// Reuses the clone at `path` when there is one, otherwise clones `url`
    /// into it. Either way `branch` is checked out.
    pub async fn clone_or_open(url: &str, path: impl Into<PathBuf>, branch: &str) -> Result<Self> {
        let path = path.into();
        if path.join(".git").exists() {
            info!("Using existing documentation checkout at {}", path.display());
        } else {
            info!("Cloning {url} into {}", path.display());
            if let Some(parent) = path.parent() {
                crate::utils::ensure_dir(parent)?;
            }
            GitCommand::clone(url, &path).with_context("clone").execute_success().await?;
        }
        let checkout = Self::open(path);
        checkout.run(GitCommand::checkout(branch)).await?;
        Ok(checkout)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn run(&self, command: GitCommand) -> Result<()> {
        command.current_dir(&self.path).execute_success().await
    }

    /// Day of the last commit on the checked-out branch.
    pub async fn last_commit_date(&self) -> Result<NaiveDate> {
        let raw = GitCommand::last_commit_date().current_dir(&self.path).execute_stdout().await?;
        NaiveDate::parse_from_str(&raw, "%Y-%m-%d").with_context(|| {
            DocketError::GitCommandError {
                operation: "log".to_string(),
                stderr: format!("unexpected commit date `{raw}`"),
            }
            .to_string()
        })
    }

    /// Whether the working tree differs from `HEAD`, new files included.
    /// Leaves the index untouched.
    pub async fn has_changes(&self) -> Result<bool> {
        let status = GitCommand::status_porcelain().current_dir(&self.path).execute_stdout().await?;
        Ok(!status.is_empty())
    }

    /// Creates `branch`, commits everything to it and pushes it to [`REMOTE`].
    pub async fn commit_to_branch(&self, branch: &str, message: &str) -> Result<()> {
        self.run(GitCommand::checkout_new_branch(branch)).await?;
        self.run(GitCommand::add_all()).await?;
        self.run(GitCommand::commit(message)).await?;
        self.run(GitCommand::push(REMOTE, branch)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn git(dir: &Path, args: &[&str]) {
        GitCommand::new()
            .args(args.iter().copied())
            .current_dir(dir)
            .execute_success()
            .await
            .unwrap();
    }

    async fn init_repo() -> TempDir {
        let temp = TempDir::new().unwrap();
        let dir = temp.path();
        git(dir, &["init", "-q"]).await;
        git(dir, &["config", "user.email", "docs@example.com"]).await;
        git(dir, &["config", "user.name", "Docs Bot"]).await;
        git(dir, &["config", "commit.gpgsign", "false"]).await;
        std::fs::write(dir.join("README.asciidoc"), "= Docs\n").unwrap();
        git(dir, &["add", "."]).await;
        git(dir, &["commit", "-q", "-m", "initial"]).await;
        temp
    }

    #[tokio::test]
    async fn test_changes_are_detected() {
        let temp = init_repo().await;
        let checkout = DocsCheckout::open(temp.path());
        assert!(!checkout.has_changes().await.unwrap());

        std::fs::write(temp.path().join("README.asciidoc"), "= Docs\n\nupdated\n").unwrap();
        assert!(checkout.has_changes().await.unwrap());
    }

    #[tokio::test]
    async fn test_new_files_are_changes_but_stay_unstaged() {
        let temp = init_repo().await;
        let checkout = DocsCheckout::open(temp.path());
        std::fs::write(temp.path().join("input-beats.asciidoc"), "beats\n").unwrap();

        assert!(checkout.has_changes().await.unwrap());
        let status = GitCommand::status_porcelain().current_dir(temp.path()).execute_stdout().await.unwrap();
        assert_eq!(status, "?? input-beats.asciidoc");
    }

    #[tokio::test]
    async fn test_last_commit_date_is_parsed() {
        let temp = init_repo().await;
        let date = DocsCheckout::open(temp.path()).last_commit_date().await.unwrap();
        let today = chrono::Local::now().date_naive();
        assert!((today - date).num_days().abs() <= 1);
    }

    #[tokio::test]
    async fn test_failed_command_reports_operation() {
        let temp = TempDir::new().unwrap();
        let err = GitCommand::new()
            .args(["log", "-1"])
            .current_dir(temp.path())
            .execute()
            .await
            .unwrap_err();
        match err.downcast_ref::<DocketError>() {
            Some(DocketError::GitCommandError { operation, .. }) => assert_eq!(operation, "log"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
