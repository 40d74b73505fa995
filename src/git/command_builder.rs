//! Type-safe Git command builder for consistent command execution
//!
//! Every git invocation in docket goes through [`GitCommand`], so the working
//! directory handling, timeouts, logging and error mapping are the same for
//! cloning the documentation repository as for committing to it.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

use crate::core::DocketError;

const GIT: &str = "git";

/// Builder for a single git invocation.
///
/// # Examples
///
/// ```rust,no_run
/// use docket_cli::git::command_builder::GitCommand;
///
/// # async fn example() -> anyhow::Result<()> {
/// let date = GitCommand::new()
///     .args(["log", "-1", "--date=short", "--pretty=format:%cd"])
///     .current_dir("/tmp/logstash-docs")
///     .execute_stdout()
///     .await?;
/// # Ok(())
/// # }
/// ```
///
/// New commands capture output and time out after 5 minutes.
pub struct GitCommand {
    /// Arguments passed to git, without the `-C <dir>` prefix
    args: Vec<String>,

    /// Directory the command operates on, passed as `-C`
    current_dir: Option<PathBuf>,

    /// Maximum duration to wait for completion (None = no timeout)
    timeout_duration: Option<Duration>,

    /// Optional context string for log lines
    context: Option<String>,
}

impl Default for GitCommand {
    fn default() -> Self {
        Self {
            args: Vec::new(),
            current_dir: None,
            timeout_duration: Some(Duration::from_secs(300)),
            context: None,
        }
    }
}

impl GitCommand {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs the command against `dir` instead of the process directory.
    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub const fn with_timeout(mut self, duration: Option<Duration>) -> Self {
        self.timeout_duration = duration;
        self
    }

    /// Tags log lines of this command with `context`.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// The git subcommand, used to name failures.
    fn operation(&self) -> String {
        self.args.first().cloned().unwrap_or_else(|| "unknown".to_string())
    }

    fn full_args(&self) -> Vec<String> {
        let mut full_args = Vec::with_capacity(self.args.len() + 2);
        if let Some(dir) = &self.current_dir {
            full_args.push("-C".to_string());
            full_args.push(dir.display().to_string());
        }
        full_args.extend(self.args.iter().cloned());
        full_args
    }

    /// Runs the command, failing on a non-zero exit status.
    pub async fn execute(self) -> Result<GitCommandOutput> {
        let full_args = self.full_args();
        let operation = self.operation();
        let context = self.context.as_deref().unwrap_or("git");
        tracing::debug!(target: "git", "({context}) Executing command: {GIT} {}", full_args.join(" "));

        let mut cmd = Command::new(GIT);
        cmd.args(&full_args).stdout(Stdio::piped()).stderr(Stdio::piped());

        let output_future = cmd.output();
        let result = match self.timeout_duration {
            Some(duration) => match timeout(duration, output_future).await {
                Ok(result) => result,
                Err(_) => {
                    tracing::warn!(
                        target: "git",
                        "Command timed out after {} seconds: git {}",
                        duration.as_secs(),
                        full_args.join(" ")
                    );
                    return Err(DocketError::GitCommandError {
                        operation,
                        stderr: format!(
                            "Git command timed out after {} seconds. Try running it manually: git {}",
                            duration.as_secs(),
                            full_args.join(" ")
                        ),
                    }
                    .into());
                }
            },
            None => output_future.await,
        };

        let output = match result {
            Ok(output) => output,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(DocketError::GitNotFound.into()),
            Err(e) => return Err(e).context(format!("Failed to execute git {}", full_args.join(" "))),
        };

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !output.status.success() {
            tracing::debug!(target: "git", "({context}) Command failed with exit code: {:?}", output.status.code());
            return Err(DocketError::GitCommandError {
                operation,
                stderr: if stderr.trim().is_empty() { stdout } else { stderr },
            }
            .into());
        }

        if !stdout.trim().is_empty() {
            tracing::debug!(target: "git", "({context}) {}", stdout.trim());
        }
        if !stderr.trim().is_empty() {
            tracing::debug!(target: "git", "({context}) {}", stderr.trim());
        }

        Ok(GitCommandOutput {
            stdout,
            stderr,
            status: output.status.code(),
        })
    }

    /// Runs the command and returns its trimmed stdout.
    pub async fn execute_stdout(self) -> Result<String> {
        let output = self.execute().await?;
        Ok(output.stdout.trim().to_string())
    }

    pub async fn execute_success(self) -> Result<()> {
        self.execute().await?;
        Ok(())
    }
}

/// Output from a Git command
#[derive(Debug)]
pub struct GitCommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub status: Option<i32>,
}

// Convenience builders for the operations docket performs

impl GitCommand {
    pub fn clone(url: &str, target: impl AsRef<Path>) -> Self {
        Self::new()
            .args(["clone", url])
            .arg(target.as_ref().display().to_string())
            .with_timeout(Some(Duration::from_secs(1800)))
    }

    pub fn checkout(ref_name: &str) -> Self {
        Self::new().args(["checkout", ref_name])
    }

    pub fn checkout_new_branch(branch_name: &str) -> Self {
        Self::new().args(["checkout", "-b", branch_name])
    }

    /// Date of the last commit as `YYYY-MM-DD`.
    pub fn last_commit_date() -> Self {
        Self::new().args(["log", "-1", "--date=short", "--pretty=format:%cd"])
    }

    /// Succeeds only when the work tree matches `HEAD`.
    pub fn status_porcelain() -> Self {
        Self::new().args(["status", "--porcelain"])
    }

    pub fn add_all() -> Self {
        Self::new().args(["add", "."])
    }

    pub fn commit(message: &str) -> Self {
        Self::new().args(["commit", "-a", "-m", message])
    }

    pub fn push(remote: &str, branch_name: &str) -> Self {
        Self::new().args(["push", remote, branch_name])
    }
}
