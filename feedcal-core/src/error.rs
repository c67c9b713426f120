//! Error types for feedcal.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur in feedcal operations.
#[derive(Error, Debug)]
pub enum FeedCalError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to download feed: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("Feed parse error: {0}")]
    FeedParse(String),

    #[error("ICS generation error: {0}")]
    IcsGenerate(String),

    #[error("'{0}' not found in PATH")]
    ToolNotInstalled(String),

    #[error("`{command}` timed out after {}s", .after.as_secs())]
    Timeout { command: String, after: Duration },

    #[error("`{command}` failed ({status}): {stderr}")]
    Git {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("Converter `{command}` exited with status {status}")]
    Converter { command: String, status: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for feedcal operations.
pub type FeedCalResult<T> = Result<T, FeedCalError>;
