//! External converter program.
//!
//! When `[convert] command` is set the built-in feed conversion is replaced
//! by that program. It runs in the repository directory with inherited
//! stdio and is expected to write the calendar file itself.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tokio::time::timeout;
use tracing::info;

use crate::config::ConvertConfig;
use crate::error::{FeedCalError, FeedCalResult};
use crate::preflight::resolve_program;

pub async fn run_converter(config: &ConvertConfig, repo: &Path) -> FeedCalResult<()> {
    let command = config
        .command
        .as_deref()
        .ok_or_else(|| FeedCalError::Config("No converter command configured".into()))?;
    let program = resolve_program(command, repo)?;
    let command_line = std::iter::once(command.to_string())
        .chain(config.args.iter().cloned())
        .collect::<Vec<_>>()
        .join(" ");
    let limit = Duration::from_secs(config.timeout_secs);

    info!(command = %command_line, "Running external converter");

    let status = Command::new(&program)
        .args(&config.args)
        .current_dir(repo)
        .stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .kill_on_drop(true)
        .status();

    let status = timeout(limit, status)
        .await
        .map_err(|_| FeedCalError::Timeout {
            command: command_line.clone(),
            after: limit,
        })??;

    if !status.success() {
        return Err(FeedCalError::Converter {
            command: command_line,
            status: status
                .code()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "signal".to_string()),
        });
    }

    Ok(())
}
