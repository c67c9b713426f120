use std::fmt;

use serde::Serialize;

use crate::diff::DiffKind;
use crate::event::Event;

#[derive(Debug, Clone, Serialize)]
pub struct EventDiff {
    pub kind: DiffKind,
    /// New version for creates and updates, old version for deletes
    pub event: Event,
    /// Previous version, only for updates
    pub old: Option<Event>,
}

impl fmt::Display for EventDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.event)
    }
}

impl EventDiff {
    pub fn get_diff(old_event: Option<&Event>, new_event: Option<&Event>) -> Option<EventDiff> {
        match (old_event, new_event) {
            (None, Some(new)) => Some(EventDiff {
                kind: DiffKind::Create,
                event: new.clone(),
                old: None,
            }),
            (Some(old), None) => Some(EventDiff {
                kind: DiffKind::Delete,
                event: old.clone(),
                old: None,
            }),
            (Some(old), Some(new)) => {
                if old == new {
                    None
                } else {
                    Some(EventDiff {
                        kind: DiffKind::Update,
                        event: new.clone(),
                        old: Some(old.clone()),
                    })
                }
            }
            (None, None) => None,
        }
    }

    /// Names of the fields that differ (updates only).
    pub fn changed_fields(&self) -> Vec<&'static str> {
        let Some(old) = &self.old else {
            return Vec::new();
        };
        let new = &self.event;

        let mut fields = Vec::new();
        if old.summary != new.summary {
            fields.push("summary");
        }
        if old.description != new.description {
            fields.push("description");
        }
        if old.url != new.url {
            fields.push("url");
        }
        if old.start != new.start {
            fields.push("start");
        }
        if old.end != new.end {
            fields.push("end");
        }
        if old.stamp != new.stamp {
            fields.push("stamp");
        }
        fields
    }
}
