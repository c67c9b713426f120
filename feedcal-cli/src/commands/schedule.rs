use std::path::Path;

use anyhow::{Context, Result};
use feedcal_core::schedule::Scheduler;
use feedcal_core::{FeedCalConfig, Pipeline};
use owo_colors::OwoColorize;
use tracing::info;

pub async fn run(
    repo: &Path,
    config: FeedCalConfig,
    every: Option<&str>,
    runs: Option<usize>,
) -> Result<()> {
    let interval = match every {
        Some(every) => humantime::parse_duration(every)
            .with_context(|| format!("Invalid interval '{every}'"))?,
        None => config.schedule_interval()?,
    };
    if interval.is_zero() {
        anyhow::bail!("Interval must be greater than zero");
    }

    let mut scheduler = Scheduler::new(interval);
    if let Some(runs) = runs {
        scheduler = scheduler.limit(runs);
    }

    let pipeline = Pipeline::new(repo, config);

    let summary = tokio::select! {
        summary = scheduler.run(&pipeline) => summary,
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, schedule stopped");
            return Ok(());
        }
    };

    println!(
        "{} runs, {} failed, {} skipped",
        summary.runs,
        summary.failures.red(),
        summary.skipped.yellow()
    );

    if summary.failures > 0 {
        anyhow::bail!("{} of {} runs failed", summary.failures, summary.runs);
    }
    Ok(())
}
