//! Publish step: stage calendar files, commit if anything changed, push.
//!
//! "Nothing to commit" is a normal outcome, not an error. Any other commit
//! or push failure is returned to the caller.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::PublishConfig;
use crate::error::{FeedCalError, FeedCalResult};
use crate::git::Git;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PublishOutcome {
    /// Publishing is switched off in the config
    Disabled,
    /// Staged calendar files match HEAD
    NoChanges,
    /// Nothing new to commit, but earlier commits had not reached the remote
    Pushed {
        commits: usize,
    },
    Committed {
        commit: String,
        files: Vec<String>,
        pushed: bool,
    },
}

pub struct Publisher {
    git: Git,
    config: PublishConfig,
}

impl Publisher {
    pub fn new(repo: &Path, config: &PublishConfig) -> FeedCalResult<Self> {
        let git = Git::new(repo, Duration::from_secs(config.git_timeout_secs))?;
        Ok(Publisher {
            git,
            config: config.clone(),
        })
    }

    /// Files in the repository root with the configured extension, sorted.
    pub fn calendar_files(&self) -> FeedCalResult<Vec<String>> {
        let mut files: Vec<String> = fs::read_dir(self.git.repo())?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .filter(|path| {
                path.extension()
                    .is_some_and(|e| e == self.config.extension.as_str())
            })
            .filter_map(|path| path.file_name().and_then(|n| n.to_str()).map(String::from))
            .collect();

        files.sort();
        Ok(files)
    }

    pub async fn publish(&self) -> FeedCalResult<PublishOutcome> {
        if !self.config.enabled {
            return Ok(PublishOutcome::Disabled);
        }

        let files = self.calendar_files()?;
        if files.is_empty() {
            info!(extension = %self.config.extension, "No calendar files to publish");
            return Ok(PublishOutcome::NoChanges);
        }

        self.git.run(&with_paths(&["add", "--all", "--"], &files)).await?;

        if !self.has_staged_changes(&files).await? {
            if self.config.push {
                let commits = self.unpushed_commits().await?;
                if commits > 0 {
                    warn!(commits, "Calendar unchanged but earlier commits were never pushed");
                    self.push().await?;
                    return Ok(PublishOutcome::Pushed { commits });
                }
            }
            info!("Calendar unchanged since last commit, nothing to publish");
            return Ok(PublishOutcome::NoChanges);
        }

        let name = format!("user.name={}", self.config.author_name);
        let email = format!("user.email={}", self.config.author_email);
        let commit_args = with_paths(
            &["-c", &name, "-c", &email, "commit", "--quiet", "-m", &self.config.message, "--"],
            &files,
        );

        let output = self.git.output(&commit_args).await?;
        if !output.status.success() {
            if is_nothing_to_commit(&output.stdout) || is_nothing_to_commit(&output.stderr) {
                info!("Nothing to commit");
                return Ok(PublishOutcome::NoChanges);
            }
            return Err(self.git.failure(&commit_args, &output));
        }

        let commit = self.git.run(&["rev-parse", "--short", "HEAD"]).await?;
        info!(%commit, files = ?files, "Committed calendar");

        let pushed = if self.config.push {
            self.push().await?;
            true
        } else {
            warn!("Push disabled, commit stays local");
            false
        };

        Ok(PublishOutcome::Committed {
            commit,
            files,
            pushed,
        })
    }

    /// `git diff --cached --quiet` exits 0 when nothing is staged, 1 otherwise.
    async fn has_staged_changes(&self, files: &[String]) -> FeedCalResult<bool> {
        let args = with_paths(&["diff", "--cached", "--quiet", "--"], files);
        let output = self.git.output(&args).await?;

        match output.status.code() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(self.git.failure(&args, &output)),
        }
    }

    /// Local commits the push target has not seen yet.
    ///
    /// With no explicit branch this falls back to the configured upstream;
    /// a branch without an upstream is never considered behind.
    async fn unpushed_commits(&self) -> FeedCalResult<usize> {
        if !self.ref_exists("HEAD").await? {
            return Ok(0);
        }

        let target = match (self.config.remote.as_deref(), self.config.branch.as_deref()) {
            (remote, Some(branch)) => format!("refs/remotes/{}/{branch}", remote.unwrap_or("origin")),
            _ => "@{u}".to_string(),
        };

        let range = if self.ref_exists(&target).await? {
            format!("{target}..HEAD")
        } else if self.config.branch.is_some() {
            // Never pushed: everything on HEAD is pending
            "HEAD".to_string()
        } else {
            debug!("No upstream configured, not checking for unpushed commits");
            return Ok(0);
        };

        let args = ["rev-list", "--count", range.as_str()];
        let count = self.git.run(&args).await?;
        count.parse().map_err(|_| FeedCalError::Git {
            command: format!("git {}", args.join(" ")),
            status: "unexpected output".to_string(),
            stderr: count.clone(),
        })
    }

    async fn ref_exists(&self, name: &str) -> FeedCalResult<bool> {
        let output = self
            .git
            .output(&["rev-parse", "--verify", "--quiet", name])
            .await?;
        Ok(output.status.success())
    }

    async fn push(&self) -> FeedCalResult<()> {
        let mut args = vec!["push", "--quiet"];
        match (self.config.remote.as_deref(), self.config.branch.as_deref()) {
            (Some(remote), Some(branch)) => args.extend([remote, branch]),
            (Some(remote), None) => args.push(remote),
            (None, Some(branch)) => args.extend(["origin", branch]),
            (None, None) => {}
        }

        self.git.run(&args).await?;
        info!("Pushed calendar");
        Ok(())
    }
}

fn with_paths<'a>(args: &[&'a str], files: &'a [String]) -> Vec<&'a str> {
    args.iter()
        .copied()
        .chain(files.iter().map(String::as_str))
        .collect()
}

fn is_nothing_to_commit(output: &[u8]) -> bool {
    let text = String::from_utf8_lossy(output);
    text.contains("nothing to commit") || text.contains("no changes added to commit")
}
