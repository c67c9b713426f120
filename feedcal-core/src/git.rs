//! Thin async wrapper around the `git` binary.

use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::Duration;

use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use crate::error::{FeedCalError, FeedCalResult};

#[derive(Debug, Clone)]
pub struct Git {
    binary: PathBuf,
    repo: PathBuf,
    timeout: Duration,
}

impl Git {
    /// Locate `git` in PATH and bind it to the working tree at `repo`.
    pub fn new(repo: &Path, timeout: Duration) -> FeedCalResult<Self> {
        let binary =
            which::which("git").map_err(|_| FeedCalError::ToolNotInstalled("git".into()))?;

        Ok(Git {
            binary,
            repo: repo.to_path_buf(),
            timeout,
        })
    }

    pub fn repo(&self) -> &Path {
        &self.repo
    }

    /// Run a git command and require it to succeed.
    pub async fn run(&self, args: &[&str]) -> FeedCalResult<String> {
        let output = self.output(args).await?;

        if !output.status.success() {
            return Err(self.failure(args, &output));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Run a git command and return its raw output whatever the exit status.
    pub async fn output(&self, args: &[&str]) -> FeedCalResult<Output> {
        debug!(command = %command_line(args), "Running git");

        let child = Command::new(&self.binary)
            .args(args)
            .current_dir(&self.repo)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        timeout(self.timeout, child)
            .await
            .map_err(|_| FeedCalError::Timeout {
                command: command_line(args),
                after: self.timeout,
            })?
            .map_err(FeedCalError::from)
    }

    /// Build the error for a failed invocation.
    pub fn failure(&self, args: &[&str], output: &Output) -> FeedCalError {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();

        FeedCalError::Git {
            command: command_line(args),
            status: output
                .status
                .code()
                .map(|c| format!("exit code {c}"))
                .unwrap_or_else(|| "terminated by signal".to_string()),
            stderr: if stderr.is_empty() { stdout } else { stderr },
        }
    }

    /// Whether `repo` is inside a git work tree.
    pub async fn is_work_tree(&self) -> bool {
        matches!(
            self.run(&["rev-parse", "--is-inside-work-tree"]).await.as_deref(),
            Ok("true")
        )
    }
}

fn command_line(args: &[&str]) -> String {
    format!("git {}", args.join(" "))
}
