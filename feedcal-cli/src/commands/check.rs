use std::path::Path;

use anyhow::Result;
use feedcal_core::FeedCalConfig;
use feedcal_core::preflight::preflight;
use owo_colors::OwoColorize;

pub fn run(repo: &Path, config: FeedCalConfig, show_config: bool) -> Result<()> {
    if show_config {
        println!("{}", config.to_toml()?);
    }

    let checks = preflight(&config, repo)?;

    println!("{} {}", "✓".green(), "Configuration is valid");
    println!("  feed      {}", config.feed_url);
    println!("  calendar  {}", config.output_path(repo).display());
    match &checks.git {
        Some(git) => println!("  git       {}", git.display()),
        None => println!("  git       {}", "publishing disabled".dimmed()),
    }
    if let Some(converter) = &checks.converter {
        println!("  converter {}", converter.display());
    }
    if let Some(target) = config.export_path(repo) {
        println!("  export    {}", target.display());
    }

    Ok(())
}
