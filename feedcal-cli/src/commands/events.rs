use std::path::Path;

use anyhow::Result;
use chrono::NaiveDate;
use feedcal_core::event::{Event, EventTime};
use feedcal_core::{FeedCalConfig, Pipeline};
use owo_colors::OwoColorize;

use crate::utils::tui::create_spinner;

pub async fn run(repo: &Path, config: FeedCalConfig, json: bool) -> Result<()> {
    let pipeline = Pipeline::new(repo, config);

    let spinner = create_spinner("Fetching feed".to_string());
    let result = pipeline.fetch_events().await;
    spinner.finish_and_clear();
    let conversion = result?;

    if json {
        println!("{}", serde_json::to_string_pretty(&conversion.events)?);
        return Ok(());
    }

    if conversion.events.is_empty() {
        println!("{}", "No events found".dimmed());
    }

    // Group events by day
    let mut current_date: Option<NaiveDate> = None;

    for event in &conversion.events {
        let date = local_date(&event.start);

        if current_date != Some(date) {
            if current_date.is_some() {
                println!();
            }
            println!("{}", format_date_label(date).bold());
            current_date = Some(date);
        }

        println!(
            "  {} {}{}",
            format_time(event),
            event.summary,
            event
                .url
                .as_deref()
                .map(|url| format!(" {}", url.dimmed()))
                .unwrap_or_default()
        );
    }

    if !conversion.skipped.is_empty() {
        println!();
        for entry in &conversion.skipped {
            println!(
                "{} {} {}",
                "skipped".yellow(),
                entry.title,
                format!("({})", entry.reason).dimmed()
            );
        }
    }

    Ok(())
}

/// Date as written in the calendar's own timezone.
fn local_date(time: &EventTime) -> NaiveDate {
    match time {
        EventTime::DateTimeUtc(dt) => dt.with_timezone(&chrono::Local).date_naive(),
        EventTime::DateTimeZoned { datetime, .. } => datetime.date(),
    }
}

/// "Today", "Tomorrow" or e.g. "Thu Jun 19"
fn format_date_label(date: NaiveDate) -> String {
    let today = chrono::Local::now().date_naive();

    match (date - today).num_days() {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        _ => date.format("%a %b %-d %Y").to_string(),
    }
}

/// "16:00–18:00"
fn format_time(event: &Event) -> String {
    let clock = |time: &EventTime| match time {
        EventTime::DateTimeUtc(dt) => dt.with_timezone(&chrono::Local).format("%H:%M").to_string(),
        EventTime::DateTimeZoned { datetime, .. } => datetime.format("%H:%M").to_string(),
    };
    format!("{:>11}", format!("{}–{}", clock(&event.start), clock(&event.end)))
}
