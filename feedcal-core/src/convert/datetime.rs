//! Event date/time extraction from entry text.
//!
//! The feed does not carry structured event times. Each entry's text
//! contains a line such as `June 19, 2025, 4 p.m. - 6 p.m.`, which is
//! interpreted as wall-clock time in the configured zone.

use std::fmt;
use std::sync::LazyLock;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use chrono_tz::Tz;
use regex::Regex;

use crate::event::EventTime;

const SPAN_PATTERN: &str = r"([A-Za-z]+)\s+(\d{1,2}),\s*(\d{4}),\s*(\d{1,2})(?::(\d{2}))?\s*([ap])\.m\.\s*[–—-]\s*(\d{1,2})(?::(\d{2}))?\s*([ap])\.m\.";

static SPAN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(SPAN_PATTERN).expect("valid regex"));

/// Why an entry's text produced no event times
#[derive(Debug, Clone, PartialEq)]
pub enum DateError {
    /// Nothing in the text looks like a date and time range
    NotFound,
    /// Looked like one, but the values are out of range
    Invalid(String),
    /// The local time is skipped by a DST transition in the zone
    NonexistentLocalTime(NaiveDateTime),
}

impl fmt::Display for DateError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DateError::NotFound => write!(f, "no date found"),
            DateError::Invalid(msg) => write!(f, "invalid date: {}", msg),
            DateError::NonexistentLocalTime(dt) => {
                write!(f, "{} does not exist in this timezone", dt)
            }
        }
    }
}

/// Find the first date/time range in `text` and return (start, end) in `tz`.
///
/// An end time at or before the start is taken to be on the following day
/// (`11 p.m. - 1 a.m.`).
pub fn extract_span(text: &str, tz: Tz) -> Result<(EventTime, EventTime), DateError> {
    let caps = SPAN_RE.captures(text).ok_or(DateError::NotFound)?;

    let month = &caps[1];
    let day: u32 = parse_number(&caps[2])?;
    let year: i32 = caps[3]
        .parse()
        .map_err(|_| DateError::Invalid(format!("year '{}'", &caps[3])))?;

    let date = NaiveDate::parse_from_str(&format!("{month} {day} {year}"), "%B %d %Y")
        .map_err(|_| DateError::Invalid(format!("{month} {day}, {year}")))?;

    let start_time = to_time(
        &caps[4],
        caps.get(5).map(|m| m.as_str()),
        &caps[6],
    )?;
    let end_time = to_time(
        &caps[7],
        caps.get(8).map(|m| m.as_str()),
        &caps[9],
    )?;

    let start = date.and_time(start_time);
    let mut end = date.and_time(end_time);
    if end <= start {
        end += Duration::days(1);
    }

    for local in [start, end] {
        if local.and_local_timezone(tz).earliest().is_none() {
            return Err(DateError::NonexistentLocalTime(local));
        }
    }

    Ok((EventTime::zoned(start, tz), EventTime::zoned(end, tz)))
}

fn parse_number(s: &str) -> Result<u32, DateError> {
    s.parse()
        .map_err(|_| DateError::Invalid(format!("number '{}'", s)))
}

/// 12-hour clock to `NaiveTime`. Missing minutes mean `:00`.
fn to_time(hour: &str, minute: Option<&str>, meridiem: &str) -> Result<NaiveTime, DateError> {
    let hour = parse_number(hour)?;
    let minute = minute.map(parse_number).transpose()?.unwrap_or(0);

    if !(1..=12).contains(&hour) {
        return Err(DateError::Invalid(format!("hour {hour}")));
    }

    let hour24 = match meridiem {
        "a" => hour % 12,
        _ => hour % 12 + 12,
    };

    NaiveTime::from_hms_opt(hour24, minute, 0)
        .ok_or_else(|| DateError::Invalid(format!("{hour}:{minute:02}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::America::Montreal;

    fn local(y: i32, m: u32, d: u32, h: u32, min: u32) -> EventTime {
        EventTime::zoned(
            NaiveDate::from_ymd_opt(y, m, d)
                .unwrap()
                .and_hms_opt(h, min, 0)
                .unwrap(),
            Montreal,
        )
    }

    #[test]
    fn whole_hours() {
        let (start, end) = extract_span("June 19, 2025, 4 p.m. - 6 p.m.", Montreal).unwrap();
        assert_eq!(start, local(2025, 6, 19, 16, 0));
        assert_eq!(end, local(2025, 6, 19, 18, 0));
    }

    #[test]
    fn minutes_and_en_dash() {
        let (start, end) =
            extract_span("October 3, 2025, 10:30 a.m. – 12:15 p.m.", Montreal).unwrap();
        assert_eq!(start, local(2025, 10, 3, 10, 30));
        assert_eq!(end, local(2025, 10, 3, 12, 15));
    }

    #[test]
    fn noon_and_midnight_hours() {
        let (start, end) = extract_span("May 1, 2025, 12 a.m. - 12 p.m.", Montreal).unwrap();
        assert_eq!(start, local(2025, 5, 1, 0, 0));
        assert_eq!(end, local(2025, 5, 1, 12, 0));
    }

    #[test]
    fn found_inside_longer_text() {
        let text = "Join us!\nWhen: September 9, 2025, 2 p.m.-3:30 p.m.\nWhere: 4th Space";
        let (start, end) = extract_span(text, Montreal).unwrap();
        assert_eq!(start, local(2025, 9, 9, 14, 0));
        assert_eq!(end, local(2025, 9, 9, 15, 30));
    }

    #[test]
    fn first_range_wins() {
        let text = "June 1, 2025, 1 p.m. - 2 p.m. or June 2, 2025, 3 p.m. - 4 p.m.";
        let (start, _) = extract_span(text, Montreal).unwrap();
        assert_eq!(start, local(2025, 6, 1, 13, 0));
    }

    #[test]
    fn abbreviated_month() {
        let (start, _) = extract_span("Jan 5, 2026, 9 a.m. - 11 a.m.", Montreal).unwrap();
        assert_eq!(start, local(2026, 1, 5, 9, 0));
    }

    #[test]
    fn non_breaking_spaces_are_whitespace() {
        let text = "June\u{a0}19, 2025, 4\u{a0}p.m. - 6\u{a0}p.m.";
        assert!(extract_span(text, Montreal).is_ok());
    }

    #[test]
    fn end_before_start_rolls_to_next_day() {
        let (start, end) = extract_span("December 31, 2025, 10 p.m. - 1 a.m.", Montreal).unwrap();
        assert_eq!(start, local(2025, 12, 31, 22, 0));
        assert_eq!(end, local(2026, 1, 1, 1, 0));
    }

    #[test]
    fn no_date_in_text() {
        assert_eq!(
            extract_span("Ongoing exhibition, drop in any time", Montreal),
            Err(DateError::NotFound)
        );
    }

    #[test]
    fn date_without_times_is_not_found() {
        assert_eq!(
            extract_span("June 19, 2025, all day", Montreal),
            Err(DateError::NotFound)
        );
    }

    #[test]
    fn unknown_month_is_invalid() {
        assert!(matches!(
            extract_span("Smarch 3, 2025, 1 p.m. - 2 p.m.", Montreal),
            Err(DateError::Invalid(_))
        ));
    }

    #[test]
    fn impossible_day_is_invalid() {
        assert!(matches!(
            extract_span("February 30, 2025, 1 p.m. - 2 p.m.", Montreal),
            Err(DateError::Invalid(_))
        ));
    }

    #[test]
    fn out_of_range_clock_is_invalid() {
        assert!(matches!(
            extract_span("June 1, 2025, 13 p.m. - 2 p.m.", Montreal),
            Err(DateError::Invalid(_))
        ));
        assert!(matches!(
            extract_span("June 1, 2025, 1:75 p.m. - 2 p.m.", Montreal),
            Err(DateError::Invalid(_))
        ));
    }

    #[test]
    fn skipped_local_time_is_rejected() {
        assert!(matches!(
            extract_span("March 9, 2025, 2:30 a.m. - 4 a.m.", Montreal),
            Err(DateError::NonexistentLocalTime(_))
        ));
    }
}
