//! Environment checks that gate the conversion step.
//!
//! Everything a run needs is resolved up front; if anything is missing the
//! run aborts before the feed is fetched or any file is written.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::FeedCalConfig;
use crate::error::{FeedCalError, FeedCalResult};

/// Tools resolved during preflight.
#[derive(Debug, Clone, Default)]
pub struct Preflight {
    pub git: Option<PathBuf>,
    pub converter: Option<PathBuf>,
}

pub fn preflight(config: &FeedCalConfig, repo: &Path) -> FeedCalResult<Preflight> {
    config.validate()?;

    if !repo.is_dir() {
        return Err(FeedCalError::Config(format!(
            "Repository directory '{}' does not exist",
            repo.display()
        )));
    }

    let output = config.output_path(repo);
    if let Some(parent) = output.parent() {
        if !parent.is_dir() {
            return Err(FeedCalError::Config(format!(
                "Output directory '{}' does not exist",
                parent.display()
            )));
        }
    }

    let git = if config.publish.enabled {
        let git = which::which("git").map_err(|_| FeedCalError::ToolNotInstalled("git".into()))?;
        if !repo.join(".git").exists() {
            return Err(FeedCalError::Config(format!(
                "'{}' is not a git repository (disable publishing with [publish] enabled = false)",
                repo.display()
            )));
        }
        Some(git)
    } else {
        None
    };

    let converter = match config.convert.command.as_deref() {
        Some(command) => Some(resolve_program(command, repo)?),
        None => None,
    };

    debug!(?git, ?converter, "Preflight passed");
    Ok(Preflight { git, converter })
}

/// Resolve a program name through PATH, or a relative path against `repo`.
pub fn resolve_program(command: &str, repo: &Path) -> FeedCalResult<PathBuf> {
    which::which_in(command, std::env::var_os("PATH"), repo)
        .map_err(|_| FeedCalError::ToolNotInstalled(command.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PublishConfig;

    fn unpublished() -> FeedCalConfig {
        FeedCalConfig {
            publish: PublishConfig {
                enabled: false,
                ..PublishConfig::default()
            },
            ..FeedCalConfig::default()
        }
    }

    #[test]
    fn passes_without_publishing() {
        let dir = tempfile::tempdir().unwrap();
        let result = preflight(&unpublished(), dir.path()).unwrap();
        assert!(result.git.is_none());
        assert!(result.converter.is_none());
    }

    #[test]
    fn publishing_requires_a_git_repository() {
        let dir = tempfile::tempdir().unwrap();
        let err = preflight(&FeedCalConfig::default(), dir.path()).unwrap_err();
        assert!(matches!(
            err,
            FeedCalError::Config(_) | FeedCalError::ToolNotInstalled(_)
        ));
    }

    #[test]
    fn missing_output_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = FeedCalConfig {
            output_file: PathBuf::from("public/events.ics"),
            ..unpublished()
        };
        assert!(preflight(&config, dir.path()).is_err());
    }

    #[test]
    fn missing_converter_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = unpublished();
        config.convert.command = Some("feedcal-no-such-converter".to_string());

        assert!(matches!(
            preflight(&config, dir.path()),
            Err(FeedCalError::ToolNotInstalled(name)) if name == "feedcal-no-such-converter"
        ));
    }

    #[test]
    fn invalid_config_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = FeedCalConfig {
            timezone: "Nowhere/Special".to_string(),
            ..unpublished()
        };
        assert!(matches!(preflight(&config, dir.path()), Err(FeedCalError::Config(_))));
    }
}
