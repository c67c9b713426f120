use std::collections::HashMap;

use serde::Serialize;

use crate::diff::{DiffKind, EventDiff};
use crate::event::Event;

/// Per-event changes between two versions of the calendar, keyed by UID.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CalendarDiff {
    pub changes: Vec<EventDiff>,
}

impl CalendarDiff {
    /// Creates and updates follow the order of `new`; deletes follow `old`.
    pub fn between(old: &[Event], new: &[Event]) -> Self {
        let old_by_uid: HashMap<&str, &Event> = old.iter().map(|e| (e.uid.as_str(), e)).collect();
        let new_by_uid: HashMap<&str, &Event> = new.iter().map(|e| (e.uid.as_str(), e)).collect();

        let mut changes: Vec<EventDiff> = new
            .iter()
            .filter_map(|e| EventDiff::get_diff(old_by_uid.get(e.uid.as_str()).copied(), Some(e)))
            .collect();

        changes.extend(
            old.iter()
                .filter(|e| !new_by_uid.contains_key(e.uid.as_str()))
                .filter_map(|e| EventDiff::get_diff(Some(e), None)),
        );

        CalendarDiff { changes }
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// (created, updated, deleted)
    pub fn counts(&self) -> (usize, usize, usize) {
        let count = |kind: DiffKind| self.changes.iter().filter(|c| c.kind == kind).count();
        (
            count(DiffKind::Create),
            count(DiffKind::Update),
            count(DiffKind::Delete),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventTime;
    use chrono::{TimeZone, Utc};

    fn event(uid: &str, summary: &str) -> Event {
        let start = Utc.with_ymd_and_hms(2025, 6, 19, 20, 0, 0).unwrap();
        Event {
            uid: uid.to_string(),
            summary: summary.to_string(),
            description: None,
            url: None,
            start: EventTime::DateTimeUtc(start),
            end: EventTime::DateTimeUtc(start + chrono::Duration::hours(2)),
            stamp: start,
        }
    }

    #[test]
    fn identical_calendars_have_no_changes() {
        let events = vec![event("a", "A"), event("b", "B")];
        assert!(CalendarDiff::between(&events, &events).is_empty());
    }

    #[test]
    fn detects_creates_updates_and_deletes() {
        let old = vec![event("a", "A"), event("b", "B")];
        let new = vec![event("b", "B (moved)"), event("c", "C")];

        let diff = CalendarDiff::between(&old, &new);
        assert_eq!(diff.counts(), (1, 1, 1));

        let kinds: Vec<_> = diff.changes.iter().map(|c| (c.kind, c.event.uid.as_str())).collect();
        assert_eq!(
            kinds,
            vec![
                (DiffKind::Update, "b"),
                (DiffKind::Create, "c"),
                (DiffKind::Delete, "a"),
            ]
        );
        assert_eq!(diff.changes[0].changed_fields(), vec!["summary"]);
    }

    #[test]
    fn everything_is_new_on_first_run() {
        let new = vec![event("a", "A")];
        let diff = CalendarDiff::between(&[], &new);
        assert_eq!(diff.counts(), (1, 0, 0));
        assert!(diff.changes[0].changed_fields().is_empty());
    }
}
