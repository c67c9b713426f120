use std::path::Path;

use anyhow::Result;
use feedcal_core::{FeedCalConfig, Pipeline, RunOutcome, Trigger};
use owo_colors::OwoColorize;

use crate::render::Render;

pub async fn run(repo: &Path, config: FeedCalConfig) -> Result<()> {
    let pipeline = Pipeline::new(repo, config);

    match pipeline.generate(Trigger::Manual).await? {
        RunOutcome::Completed(report) => {
            let output = pipeline.output_path();
            println!("{}", report.render());
            println!("{}", output.display().dimmed());
        }
        RunOutcome::Skipped => println!("{}", "Another run is in progress, skipped".yellow()),
    }

    Ok(())
}
