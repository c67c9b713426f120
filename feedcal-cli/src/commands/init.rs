use std::path::Path;

use anyhow::Result;
use feedcal_core::FeedCalConfig;
use feedcal_core::config::CONFIG_FILE_NAME;
use owo_colors::OwoColorize;

pub fn run(repo: &Path, config_file: Option<&Path>, force: bool) -> Result<()> {
    let path = match config_file {
        Some(path) => path.to_path_buf(),
        None => repo.join(CONFIG_FILE_NAME),
    };

    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists.\n\nUse --force to overwrite it.",
            path.display()
        );
    }

    FeedCalConfig::create_default_config(&path)?;

    println!("{} {}", "Created".green(), path.display());
    println!(
        "{}",
        "Edit it, then try `feedcal check` and `feedcal generate`.".dimmed()
    );
    Ok(())
}
