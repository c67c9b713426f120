//! Differences between the calendar on disk and a fresh conversion.

mod calendar_diff;
mod diff_kind;
mod event_diff;

pub use calendar_diff::CalendarDiff;
pub use diff_kind::DiffKind;
pub use event_diff::EventDiff;
