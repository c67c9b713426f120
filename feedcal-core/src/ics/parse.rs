//! ICS file parsing using the icalendar crate's parser.
//!
//! Only used to read back a previously written calendar so it can be
//! diffed against a fresh conversion.

use chrono::NaiveDateTime;
use icalendar::{
    DatePerhapsTime,
    parser::{Component, read_calendar, unfold},
};

use crate::error::{FeedCalError, FeedCalResult};
use crate::event::{Event, EventTime};

/// Parse every VEVENT in `content`. Events whose times cannot be
/// represented (all-day, floating) are left out.
pub fn parse_calendar(content: &str) -> FeedCalResult<Vec<Event>> {
    let unfolded = unfold(content);
    let calendar =
        read_calendar(&unfolded).map_err(|e| FeedCalError::FeedParse(format!("Invalid ICS: {e}")))?;

    Ok(calendar
        .components
        .iter()
        .filter(|c| c.name == "VEVENT")
        .filter_map(parse_vevent)
        .collect())
}

fn parse_vevent(vevent: &Component) -> Option<Event> {
    let uid = vevent.find_prop("UID")?.val.to_string();
    let summary = vevent
        .find_prop("SUMMARY")
        .map(|p| unescape_text(p.val.as_ref()))
        .unwrap_or_else(|| "(No title)".to_string());
    let start = to_event_time(DatePerhapsTime::try_from(vevent.find_prop("DTSTART")?).ok()?)?;
    let end = to_event_time(DatePerhapsTime::try_from(vevent.find_prop("DTEND")?).ok()?)?;

    let description = vevent
        .find_prop("DESCRIPTION")
        .map(|p| unescape_text(p.val.as_ref()));
    let url = vevent.find_prop("URL").map(|p| p.val.to_string());

    let stamp = vevent
        .find_prop("DTSTAMP")
        .and_then(|p| NaiveDateTime::parse_from_str(p.val.as_ref(), "%Y%m%dT%H%M%SZ").ok())
        .map(|dt| dt.and_utc())
        .or_else(|| start.to_utc())?;

    Some(Event {
        uid,
        summary,
        description,
        url,
        start,
        end,
        stamp,
    })
}

fn to_event_time(dpt: DatePerhapsTime) -> Option<EventTime> {
    match dpt {
        DatePerhapsTime::Date(_) => None,
        DatePerhapsTime::DateTime(cal_dt) => match cal_dt {
            icalendar::CalendarDateTime::Utc(dt) => Some(EventTime::DateTimeUtc(dt)),
            icalendar::CalendarDateTime::Floating(_) => None,
            icalendar::CalendarDateTime::WithTimezone { date_time, tzid } => {
                Some(EventTime::DateTimeZoned {
                    datetime: date_time,
                    tzid,
                })
            }
        },
    }
}

/// Undo RFC 5545 TEXT escaping (`\n`, `\,`, `\;`, `\\`).
fn unescape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }

    out
}
