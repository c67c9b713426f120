//! Calendar event types.
//!
//! Feed entries are converted into these types, and the ICS generator and
//! parser work exclusively with them.

use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// A calendar event built from one feed entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Stable across runs for the same feed entry
    pub uid: String,
    pub summary: String,
    /// Plain-text body of the feed entry
    pub description: Option<String>,
    /// Link back to the entry's page
    pub url: Option<String>,
    pub start: EventTime,
    pub end: EventTime,
    /// DTSTAMP value. Taken from feed data so that output is reproducible.
    pub stamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventTime {
    /// UTC datetime (ICS: `DTSTART:20250619T200000Z`)
    DateTimeUtc(DateTime<Utc>),
    /// Wall-clock datetime in an IANA zone (ICS: `DTSTART;TZID=America/Montreal:20250619T160000`)
    DateTimeZoned {
        datetime: NaiveDateTime,
        tzid: String,
    },
}

impl EventTime {
    pub fn zoned(datetime: NaiveDateTime, tz: Tz) -> Self {
        EventTime::DateTimeZoned {
            datetime,
            tzid: tz.name().to_string(),
        }
    }

    /// Convert to UTC. Returns None for an unknown zone or a local time
    /// that does not exist in it.
    pub fn to_utc(&self) -> Option<DateTime<Utc>> {
        match self {
            EventTime::DateTimeUtc(dt) => Some(*dt),
            EventTime::DateTimeZoned { datetime, tzid } => {
                let tz: Tz = tzid.parse().ok()?;
                datetime
                    .and_local_timezone(tz)
                    .earliest()
                    .map(|dt| dt.with_timezone(&Utc))
            }
        }
    }

    /// Local wall-clock time as written in the calendar.
    pub fn naive(&self) -> NaiveDateTime {
        match self {
            EventTime::DateTimeUtc(dt) => dt.naive_utc(),
            EventTime::DateTimeZoned { datetime, .. } => *datetime,
        }
    }
}

impl fmt::Display for EventTime {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EventTime::DateTimeUtc(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M UTC")),
            EventTime::DateTimeZoned { datetime, tzid } => {
                write!(f, "{} {}", datetime.format("%Y-%m-%d %H:%M"), tzid)
            }
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn local(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn zoned_time_converts_to_utc() {
        let time = EventTime::zoned(local(2025, 6, 19, 16, 0), chrono_tz::America::Montreal);
        // EDT is UTC-4
        assert_eq!(
            time.to_utc(),
            Some(Utc.with_ymd_and_hms(2025, 6, 19, 20, 0, 0).unwrap())
        );
    }

    #[test]
    fn winter_time_uses_standard_offset() {
        let time = EventTime::zoned(local(2025, 1, 15, 9, 30), chrono_tz::America::Montreal);
        assert_eq!(
            time.to_utc(),
            Some(Utc.with_ymd_and_hms(2025, 1, 15, 14, 30, 0).unwrap())
        );
    }

    #[test]
    fn nonexistent_local_time_has_no_utc() {
        // 2:30 a.m. is skipped on the spring-forward date
        let time = EventTime::zoned(local(2025, 3, 9, 2, 30), chrono_tz::America::Montreal);
        assert_eq!(time.to_utc(), None);
    }

    #[test]
    fn display_includes_zone() {
        let time = EventTime::zoned(local(2025, 6, 19, 16, 0), chrono_tz::America::Montreal);
        assert_eq!(time.to_string(), "2025-06-19 16:00 America/Montreal");
    }
}
