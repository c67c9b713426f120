//! Core of feedcal: keep an iCalendar file in a git repository in sync
//! with an upstream event feed.
//!
//! A run fetches the feed, converts entries with a recognisable date line
//! into events, writes the calendar only when its bytes change, and then
//! commits and pushes it. An unchanged calendar is a successful no-op.

pub mod config;
pub mod convert;
pub mod diff;
pub mod error;
pub mod event;
pub mod external;
pub mod feed;
pub mod git;
pub mod ics;
pub mod lock;
pub mod pipeline;
pub mod preflight;
pub mod publish;
pub mod schedule;
pub mod store;

pub use config::FeedCalConfig;
pub use error::{FeedCalError, FeedCalResult};
pub use event::{Event, EventTime};
pub use pipeline::{Pipeline, RunOutcome, RunReport, Trigger};
