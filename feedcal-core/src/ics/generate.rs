//! ICS file generation.

use crate::error::FeedCalResult;
use crate::event::{Event, EventTime};
use icalendar::{Calendar, Component, EventLike, Property};

const ICS_DATETIME_UTC: &str = "%Y%m%dT%H%M%SZ";
const ICS_DATETIME_LOCAL: &str = "%Y%m%dT%H%M%S";

/// Render all events into a single VCALENDAR.
///
/// Output depends only on the events passed in (no wall-clock DTSTAMP, no
/// random UIDs), so regenerating from an unchanged feed is byte-identical.
pub fn generate_calendar(events: &[Event], name: Option<&str>) -> FeedCalResult<String> {
    let mut cal = Calendar::new();
    if let Some(name) = name {
        cal.name(name);
    }

    for event in events {
        cal.push(to_ics_event(event));
    }

    let cal = cal.done();

    // Post-process to remove unnecessary bloat from the icalendar crate's output
    Ok(strip_ics_bloat(&cal.to_string()))
}

fn to_ics_event(event: &Event) -> icalendar::Event {
    let mut ics_event = icalendar::Event::new();
    ics_event.uid(&event.uid);
    ics_event.summary(&event.summary);

    // DTSTAMP - required by RFC 5545
    ics_event.add_property("DTSTAMP", event.stamp.format(ICS_DATETIME_UTC).to_string());

    add_datetime_property(&mut ics_event, "DTSTART", &event.start);
    add_datetime_property(&mut ics_event, "DTEND", &event.end);

    if let Some(ref desc) = event.description {
        ics_event.description(desc);
    }

    if let Some(ref url) = event.url {
        ics_event.add_property("URL", url);
    }

    ics_event.done()
}

/// Clean up ICS output from the icalendar crate
/// - Replace PRODID with FEEDCAL
/// - Remove CALSCALE:GREGORIAN (it's the default)
fn strip_ics_bloat(ics: &str) -> String {
    let mut result = String::with_capacity(ics.len());

    for line in ics.lines() {
        if line.starts_with("PRODID:") {
            result.push_str("PRODID:FEEDCAL\r\n");
            continue;
        }

        if line == "CALSCALE:GREGORIAN" {
            continue;
        }

        result.push_str(line);
        result.push_str("\r\n");
    }

    result
}

/// Add a datetime property with proper formatting based on EventTime variant
fn add_datetime_property(ics_event: &mut icalendar::Event, name: &str, time: &EventTime) {
    match time {
        EventTime::DateTimeUtc(dt) => {
            ics_event.add_property(name, dt.format(ICS_DATETIME_UTC).to_string());
        }
        EventTime::DateTimeZoned { datetime, tzid } => {
            let mut prop = Property::new(name, datetime.format(ICS_DATETIME_LOCAL).to_string());
            prop.add_parameter("TZID", tzid);
            ics_event.append_property(prop);
        }
    }
}
