//! Feed entries → calendar events.

mod datetime;
mod text;

use std::collections::HashSet;

use chrono_tz::Tz;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::event::Event;
use crate::feed::FeedEntry;

pub use datetime::{DateError, extract_span};
pub use text::html_to_text;

/// Events built from a feed, plus what had to be left out.
#[derive(Debug, Clone, Default)]
pub struct Conversion {
    /// Deduplicated by UID and sorted by start time, then UID
    pub events: Vec<Event>,
    pub skipped: Vec<SkippedEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedEntry {
    pub title: String,
    pub reason: String,
}

/// Convert every entry that carries a date/time range. Entries without one
/// are skipped with a warning; they never fail the conversion.
pub fn convert_entries(entries: &[FeedEntry], tz: Tz) -> Conversion {
    let mut conversion = Conversion::default();
    let mut seen = HashSet::new();

    for entry in entries {
        match convert_entry(entry, tz) {
            Ok(event) => {
                if seen.insert(event.uid.clone()) {
                    conversion.events.push(event);
                } else {
                    warn!(title = %entry.title, "Skipping duplicate entry");
                    conversion.skipped.push(SkippedEntry {
                        title: entry.title.clone(),
                        reason: "duplicate".to_string(),
                    });
                }
            }
            Err(e) => {
                warn!(title = %entry.title, reason = %e, "Skipping event with unparseable date");
                conversion.skipped.push(SkippedEntry {
                    title: entry.title.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    conversion.events.sort_by(|a, b| {
        a.start
            .to_utc()
            .cmp(&b.start.to_utc())
            .then_with(|| a.uid.cmp(&b.uid))
    });

    info!(
        processed = conversion.events.len(),
        skipped = conversion.skipped.len(),
        "Converted feed entries"
    );
    conversion
}

/// Convert a single entry.
pub fn convert_entry(entry: &FeedEntry, tz: Tz) -> Result<Event, DateError> {
    let text = html_to_text(&entry.summary);
    let (start, end) = extract_span(&text, tz)?;

    // extract_span already rejected nonexistent local times
    let start_utc = start.to_utc().ok_or(DateError::NonexistentLocalTime(start.naive()))?;

    Ok(Event {
        uid: uid_for(entry),
        summary: entry.title.clone(),
        description: (!text.is_empty()).then_some(text),
        url: entry.link.clone(),
        start,
        end,
        stamp: entry.published.unwrap_or(start_utc),
    })
}

/// Deterministic UID so that unchanged entries render identically on every
/// run. Keyed on guid, else link, else title.
pub fn uid_for(entry: &FeedEntry) -> String {
    let key = entry
        .guid
        .as_deref()
        .or(entry.link.as_deref())
        .unwrap_or(&entry.title);
    format!("{}@feedcal", Uuid::new_v5(&Uuid::NAMESPACE_URL, key.as_bytes()))
}
