//! Upstream event feed: download and parsing.
//!
//! Both RSS 2.0 (`<item>`) and Atom (`<entry>`) documents are understood.

mod fetch;
mod parse;

use chrono::{DateTime, Utc};
use serde::Serialize;

pub use fetch::FeedClient;
pub use parse::parse_feed;

/// One entry of the feed, before date extraction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedEntry {
    pub title: String,
    pub link: Option<String>,
    /// HTML body (RSS `description`, Atom `summary`/`content`)
    pub summary: String,
    /// RSS `guid` or Atom `id`
    pub guid: Option<String>,
    pub published: Option<DateTime<Utc>>,
}
