//! One run: preflight → conversion → publish.
//!
//! Scheduled and manual runs go through the same entry point; the trigger
//! is only recorded for logging.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{error, info, warn};

use crate::config::FeedCalConfig;
use crate::convert::{Conversion, SkippedEntry, convert_entries};
use crate::diff::CalendarDiff;
use crate::error::{FeedCalError, FeedCalResult};
use crate::external::run_converter;
use crate::feed::{FeedClient, parse_feed};
use crate::ics::{generate_calendar, parse_calendar};
use crate::lock::RunLock;
use crate::preflight::{Preflight, preflight};
use crate::publish::{PublishOutcome, Publisher};
use crate::store::{WriteOutcome, read_existing, write_if_changed};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Trigger {
    Scheduled,
    Manual,
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Trigger::Scheduled => write!(f, "scheduled"),
            Trigger::Manual => write!(f, "manual"),
        }
    }
}

/// What the conversion step did.
#[derive(Debug, Clone, Serialize)]
pub enum ConversionReport {
    BuiltIn {
        events: usize,
        skipped: Vec<SkippedEntry>,
        write: WriteOutcome,
        diff: CalendarDiff,
        exported: Option<WriteOutcome>,
    },
    External {
        command: String,
        exported: Option<WriteOutcome>,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub trigger: Trigger,
    pub conversion: ConversionReport,
    /// None for generate-only runs
    pub publish: Option<PublishOutcome>,
}

#[derive(Debug, Clone, Serialize)]
pub enum RunOutcome {
    Completed(RunReport),
    /// Another run held the lock
    Skipped,
}

/// Everything needed to run against one repository.
#[derive(Debug, Clone)]
pub struct Pipeline {
    repo: PathBuf,
    config: FeedCalConfig,
}

impl Pipeline {
    pub fn new(repo: &Path, config: FeedCalConfig) -> Self {
        Pipeline {
            repo: repo.to_path_buf(),
            config,
        }
    }

    pub fn repo(&self) -> &Path {
        &self.repo
    }

    pub fn config(&self) -> &FeedCalConfig {
        &self.config
    }

    pub fn output_path(&self) -> PathBuf {
        self.config.output_path(&self.repo)
    }

    pub fn preflight(&self) -> FeedCalResult<Preflight> {
        preflight(&self.config, &self.repo)
    }

    /// Download and convert the feed without touching the repository.
    pub async fn fetch_events(&self) -> FeedCalResult<Conversion> {
        let tz = self.config.tz()?;
        let client = FeedClient::new(&self.config)?;

        let body = client.fetch().await?;
        let entries = parse_feed(&body)?;
        info!(entries = entries.len(), "Feed parsed");

        Ok(convert_entries(&entries, tz))
    }

    /// Run the conversion step and the optional export copy.
    pub async fn convert(&self) -> FeedCalResult<ConversionReport> {
        let output = self.output_path();

        let report = match self.config.convert.command.as_deref() {
            Some(command) => {
                run_converter(&self.config.convert, &self.repo).await?;
                ConversionReport::External {
                    command: command.to_string(),
                    exported: self.export()?,
                }
            }
            None => {
                let conversion = self.fetch_events().await?;
                let content =
                    generate_calendar(&conversion.events, self.config.calendar_name.as_deref())?;

                let previous = match read_existing(&output)? {
                    Some(existing) => parse_calendar(&existing).unwrap_or_else(|e| {
                        warn!(error = %e, "Could not read previous calendar for diff");
                        Vec::new()
                    }),
                    None => Vec::new(),
                };
                let diff = CalendarDiff::between(&previous, &conversion.events);

                let write = write_if_changed(&output, &content)?;
                let (created, updated, deleted) = diff.counts();
                info!(
                    path = %output.display(),
                    events = conversion.events.len(),
                    skipped = conversion.skipped.len(),
                    %write,
                    created,
                    updated,
                    deleted,
                    "Calendar saved"
                );

                ConversionReport::BuiltIn {
                    events: conversion.events.len(),
                    skipped: conversion.skipped,
                    write,
                    diff,
                    exported: self.export()?,
                }
            }
        };

        Ok(report)
    }

    /// Copy the calendar to `[export] copy_to`, if configured.
    fn export(&self) -> FeedCalResult<Option<WriteOutcome>> {
        let Some(target) = self.config.export_path(&self.repo) else {
            return Ok(None);
        };

        let content = std::fs::read_to_string(self.output_path())?;
        let outcome = write_if_changed(&target, &content)?;
        info!(path = %target.display(), %outcome, "Exported calendar");
        Ok(Some(outcome))
    }

    pub async fn publish(&self) -> FeedCalResult<PublishOutcome> {
        if !self.config.publish.enabled {
            return Ok(PublishOutcome::Disabled);
        }
        Publisher::new(&self.repo, &self.config.publish)?.publish().await
    }

    /// Full run: preflight, conversion, publish.
    pub async fn run(&self, trigger: Trigger) -> FeedCalResult<RunOutcome> {
        self.execute(trigger, true).await
    }

    /// Preflight and conversion only.
    pub async fn generate(&self, trigger: Trigger) -> FeedCalResult<RunOutcome> {
        self.execute(trigger, false).await
    }

    async fn execute(&self, trigger: Trigger, publish: bool) -> FeedCalResult<RunOutcome> {
        if !self.repo.is_dir() {
            return Err(FeedCalError::Config(format!(
                "Repository directory '{}' does not exist",
                self.repo.display()
            )));
        }

        let Some(_lock) = RunLock::try_acquire(&self.repo)? else {
            warn!(%trigger, "Another run is in progress, skipping");
            return Ok(RunOutcome::Skipped);
        };

        info!(%trigger, repo = %self.repo.display(), "Starting calendar update");

        let result = self.execute_locked(trigger, publish).await;
        match &result {
            Ok(_) => info!(%trigger, "Calendar update completed successfully"),
            Err(e) => error!(%trigger, error = %e, "Calendar update failed"),
        }
        result.map(RunOutcome::Completed)
    }

    async fn execute_locked(&self, trigger: Trigger, publish: bool) -> FeedCalResult<RunReport> {
        if publish {
            self.preflight()?;
        } else {
            // Generating never needs git
            let mut config = self.config.clone();
            config.publish.enabled = false;
            preflight(&config, &self.repo)?;
        }

        let conversion = self.convert().await?;

        let publish = if publish {
            Some(self.publish().await?)
        } else {
            None
        };

        Ok(RunReport {
            trigger,
            conversion,
            publish,
        })
    }
}
