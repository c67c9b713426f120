//! Periodic trigger.

use std::time::Duration;

use tokio::time::{MissedTickBehavior, interval};
use tracing::{error, info};

use crate::pipeline::{Pipeline, RunOutcome, Trigger};

/// Fires a run immediately and then once per interval.
#[derive(Debug, Clone)]
pub struct Scheduler {
    every: Duration,
    max_runs: Option<usize>,
}

/// Counts collected while the schedule ran.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScheduleSummary {
    pub runs: usize,
    pub failures: usize,
    pub skipped: usize,
}

impl Scheduler {
    pub fn new(every: Duration) -> Self {
        Scheduler {
            every,
            max_runs: None,
        }
    }

    /// Stop after `n` runs instead of running forever.
    pub fn limit(mut self, n: usize) -> Self {
        self.max_runs = Some(n);
        self
    }

    /// A failed run is logged and the schedule continues. Runs never
    /// overlap: the next tick waits for the current run to finish.
    pub async fn run(&self, pipeline: &Pipeline) -> ScheduleSummary {
        let mut ticker = interval(self.every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut summary = ScheduleSummary::default();
        info!(every = %humantime::format_duration(self.every), "Schedule started");

        loop {
            if self.max_runs.is_some_and(|max| summary.runs >= max) {
                break;
            }

            ticker.tick().await;
            summary.runs += 1;

            match pipeline.run(Trigger::Scheduled).await {
                Ok(RunOutcome::Completed(_)) => {}
                Ok(RunOutcome::Skipped) => summary.skipped += 1,
                Err(e) => {
                    summary.failures += 1;
                    error!(error = %e, "Scheduled run failed, waiting for next tick");
                }
            }
        }

        summary
    }
}
