//! feedcal configuration.
//!
//! Settings are layered, later sources overriding earlier ones:
//! built-in defaults, the global `~/.config/feedcal/config.toml`, the
//! repository's `feedcal.toml` (or an explicit `--config` file), and
//! finally `FEEDCAL_*` environment variables (`FEEDCAL_PUBLISH__PUSH=false`).

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono_tz::Tz;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::{FeedCalError, FeedCalResult};

pub const CONFIG_FILE_NAME: &str = "feedcal.toml";

pub const DEFAULT_FEED_URL: &str = "https://www.concordia.ca/content/concordia/en/next-gen/4th-space/programming/RSSCAL/_jcr_content/content-main/grid_container_671899525/grid-container-parsys/events_list.xml";
pub const DEFAULT_OUTPUT_FILE: &str = "4SP_CAL_RSS_Events.ics";
pub const DEFAULT_TIMEZONE: &str = "America/Montreal";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
pub const DEFAULT_SCHEDULE: &str = "2h";
pub const DEFAULT_COMMIT_MESSAGE: &str = "Update calendar";
pub const DEFAULT_AUTHOR_NAME: &str = "github-actions[bot]";
pub const DEFAULT_AUTHOR_EMAIL: &str = "41898282+github-actions[bot]@users.noreply.github.com";

fn default_feed_url() -> String {
    DEFAULT_FEED_URL.to_string()
}

fn default_output_file() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_FILE)
}

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_schedule() -> String {
    DEFAULT_SCHEDULE.to_string()
}

fn default_convert_timeout_secs() -> u64 {
    300
}

fn default_true() -> bool {
    true
}

fn default_extension() -> String {
    "ics".to_string()
}

fn default_message() -> String {
    DEFAULT_COMMIT_MESSAGE.to_string()
}

fn default_author_name() -> String {
    DEFAULT_AUTHOR_NAME.to_string()
}

fn default_author_email() -> String {
    DEFAULT_AUTHOR_EMAIL.to_string()
}

fn default_git_timeout_secs() -> u64 {
    60
}

/// Top-level configuration.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct FeedCalConfig {
    #[serde(default = "default_feed_url")]
    pub feed_url: String,

    /// Calendar file, relative to the repository root.
    #[serde(default = "default_output_file")]
    pub output_file: PathBuf,

    /// Display name written as X-WR-CALNAME.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calendar_name: Option<String>,

    /// IANA zone the feed's wall-clock times are expressed in.
    #[serde(default = "default_timezone")]
    pub timezone: String,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// HTTP timeout for the feed download.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,

    #[serde(default)]
    pub schedule: ScheduleConfig,

    #[serde(default)]
    pub convert: ConvertConfig,

    #[serde(default)]
    pub export: ExportConfig,

    #[serde(default)]
    pub publish: PublishConfig,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ScheduleConfig {
    /// Interval between scheduled runs, in humantime syntax ("2h", "90m").
    #[serde(default = "default_schedule")]
    pub every: String,
}

/// Replaces the built-in converter with an external program.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ConvertConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    #[serde(default)]
    pub args: Vec<String>,

    #[serde(default = "default_convert_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct ExportConfig {
    /// Copy the calendar here after each successful conversion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copy_to: Option<PathBuf>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct PublishConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Files in the repository root with this extension are staged.
    #[serde(default = "default_extension")]
    pub extension: String,

    #[serde(default = "default_message")]
    pub message: String,

    #[serde(default = "default_author_name")]
    pub author_name: String,

    #[serde(default = "default_author_email")]
    pub author_email: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,

    #[serde(default = "default_true")]
    pub push: bool,

    #[serde(default = "default_git_timeout_secs")]
    pub git_timeout_secs: u64,
}

impl Default for FeedCalConfig {
    fn default() -> Self {
        FeedCalConfig {
            feed_url: default_feed_url(),
            output_file: default_output_file(),
            calendar_name: None,
            timezone: default_timezone(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            log_file: None,
            schedule: ScheduleConfig::default(),
            convert: ConvertConfig::default(),
            export: ExportConfig::default(),
            publish: PublishConfig::default(),
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        ScheduleConfig {
            every: default_schedule(),
        }
    }
}

impl Default for ConvertConfig {
    fn default() -> Self {
        ConvertConfig {
            command: None,
            args: Vec::new(),
            timeout_secs: default_convert_timeout_secs(),
        }
    }
}

impl Default for PublishConfig {
    fn default() -> Self {
        PublishConfig {
            enabled: true,
            extension: default_extension(),
            message: default_message(),
            author_name: default_author_name(),
            author_email: default_author_email(),
            remote: None,
            branch: None,
            push: true,
            git_timeout_secs: default_git_timeout_secs(),
        }
    }
}

impl FeedCalConfig {
    /// Global config at ~/.config/feedcal/config.toml
    pub fn global_config_path() -> FeedCalResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| FeedCalError::Config("Could not determine config directory".into()))?
            .join("feedcal");

        Ok(config_dir.join("config.toml"))
    }

    /// Load the layered configuration for the repository at `repo`.
    ///
    /// An explicit `config_file` must exist; the repository's
    /// `feedcal.toml` and the global file are optional.
    pub fn load(repo: &Path, config_file: Option<&Path>) -> FeedCalResult<Self> {
        let mut builder = Config::builder();

        if let Ok(global) = Self::global_config_path() {
            builder = builder.add_source(File::from(global).required(false));
        }

        builder = match config_file {
            Some(path) => builder.add_source(File::from(path).required(true)),
            None => builder.add_source(File::from(repo.join(CONFIG_FILE_NAME)).required(false)),
        };

        let config: FeedCalConfig = builder
            .add_source(
                Environment::with_prefix("FEEDCAL")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| FeedCalError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| FeedCalError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Check values that deserialize fine but cannot work at runtime.
    pub fn validate(&self) -> FeedCalResult<()> {
        let url = url::Url::parse(&self.feed_url)
            .map_err(|e| FeedCalError::Config(format!("Invalid feed_url '{}': {e}", self.feed_url)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(FeedCalError::Config(format!(
                "feed_url must be http or https, got '{}'",
                url.scheme()
            )));
        }

        self.tz()?;
        self.schedule_interval()?;

        for (key, secs) in [
            ("timeout_secs", self.timeout_secs),
            ("convert.timeout_secs", self.convert.timeout_secs),
            ("publish.git_timeout_secs", self.publish.git_timeout_secs),
        ] {
            if secs == 0 {
                return Err(FeedCalError::Config(format!("{key} must be greater than 0")));
            }
        }

        if self.publish.enabled {
            let matches_extension = self
                .output_file
                .extension()
                .is_some_and(|e| e == self.publish.extension.as_str());
            if !matches_extension {
                return Err(FeedCalError::Config(format!(
                    "output_file '{}' would never be published: expected a .{} file",
                    self.output_file.display(),
                    self.publish.extension
                )));
            }
            // Only calendar files at the repository root are staged
            if self.output_file.components().count() != 1 {
                return Err(FeedCalError::Config(format!(
                    "output_file '{}' must be a file name in the repository root when publishing",
                    self.output_file.display()
                )));
            }
        }

        Ok(())
    }

    pub fn tz(&self) -> FeedCalResult<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| FeedCalError::Config(format!("Unknown timezone '{}': {e}", self.timezone)))
    }

    pub fn schedule_interval(&self) -> FeedCalResult<Duration> {
        let interval = humantime::parse_duration(&self.schedule.every).map_err(|e| {
            FeedCalError::Config(format!("Invalid schedule '{}': {e}", self.schedule.every))
        })?;
        if interval.is_zero() {
            return Err(FeedCalError::Config("Schedule interval must not be zero".into()));
        }
        Ok(interval)
    }

    /// Absolute location of the calendar file inside `repo`.
    pub fn output_path(&self, repo: &Path) -> PathBuf {
        resolve_path(repo, &self.output_file)
    }

    pub fn log_path(&self, repo: &Path) -> Option<PathBuf> {
        self.log_file.as_ref().map(|p| resolve_path(repo, p))
    }

    pub fn export_path(&self, repo: &Path) -> Option<PathBuf> {
        self.export.copy_to.as_ref().map(|p| resolve_path(repo, p))
    }

    /// The effective configuration as TOML.
    pub fn to_toml(&self) -> FeedCalResult<String> {
        toml::to_string_pretty(self).map_err(|e| FeedCalError::Serialization(e.to_string()))
    }

    /// Create a config file with all options commented out.
    pub fn create_default_config(path: &Path) -> FeedCalResult<()> {
        let contents = format!(
            "\
# feedcal configuration

# Event feed (RSS 2.0 or Atom):
# feed_url = \"{DEFAULT_FEED_URL}\"

# Calendar file written into this repository:
# output_file = \"{DEFAULT_OUTPUT_FILE}\"

# Calendar name shown by calendar apps:
# calendar_name = \"4th Space Events\"

# Timezone of the times in the feed:
# timezone = \"{DEFAULT_TIMEZONE}\"

# Seconds to wait for the feed download:
# timeout_secs = 30

# Also log to a file:
# log_file = \"calendar_update.log\"

[schedule]
# every = \"{DEFAULT_SCHEDULE}\"

[convert]
# Use an external converter instead of the built-in one:
# command = \"./convert.sh\"
# args = []

[export]
# copy_to = \"/var/www/html/calendar.ics\"

[publish]
# enabled = true
# message = \"{DEFAULT_COMMIT_MESSAGE}\"
# author_name = \"{DEFAULT_AUTHOR_NAME}\"
# author_email = \"{DEFAULT_AUTHOR_EMAIL}\"
# remote = \"origin\"
# branch = \"main\"
# push = true
"
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                FeedCalError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| FeedCalError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}

fn resolve_path(repo: &Path, path: &Path) -> PathBuf {
    let expanded = PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned());
    if expanded.is_absolute() {
        expanded
    } else {
        repo.join(expanded)
    }
}
