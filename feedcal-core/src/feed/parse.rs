//! RSS/Atom parsing using quick-xml's pull reader.

use chrono::{DateTime, Utc};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::debug;

use super::FeedEntry;
use crate::error::{FeedCalError, FeedCalResult};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Field {
    Title,
    Link,
    Summary,
    Content,
    Guid,
    Published,
}

impl Field {
    fn from_local_name(name: &[u8]) -> Option<Self> {
        match name {
            b"title" => Some(Field::Title),
            b"link" => Some(Field::Link),
            b"description" | b"summary" => Some(Field::Summary),
            b"encoded" | b"content" => Some(Field::Content),
            b"guid" | b"id" => Some(Field::Guid),
            b"pubDate" | b"published" | b"updated" | b"date" => Some(Field::Published),
            _ => None,
        }
    }
}

#[derive(Default)]
struct EntryBuilder {
    title: Option<String>,
    link: Option<String>,
    summary: Option<String>,
    content: Option<String>,
    guid: Option<String>,
    published: Option<String>,
}

impl EntryBuilder {
    /// First value wins, so Atom `published` beats a later `updated`.
    fn set(&mut self, field: Field, value: String) {
        let value = value.trim().to_string();
        if value.is_empty() {
            return;
        }
        let slot = match field {
            Field::Title => &mut self.title,
            Field::Link => &mut self.link,
            Field::Summary => &mut self.summary,
            Field::Content => &mut self.content,
            Field::Guid => &mut self.guid,
            Field::Published => &mut self.published,
        };
        if slot.is_none() {
            *slot = Some(value);
        }
    }

    fn build(self) -> FeedEntry {
        FeedEntry {
            title: self.title.unwrap_or_else(|| "(No title)".to_string()),
            link: self.link,
            summary: self.summary.or(self.content).unwrap_or_default(),
            guid: self.guid,
            published: self.published.as_deref().and_then(parse_feed_date),
        }
    }
}

/// Parse an RSS 2.0 or Atom document into its entries, in document order.
pub fn parse_feed(xml: &str) -> FeedCalResult<Vec<FeedEntry>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut entries = Vec::new();
    let mut root: Option<Vec<u8>> = None;
    let mut depth = 0usize;

    let mut entry: Option<EntryBuilder> = None;
    // Field being collected and the depth of its element
    let mut field: Option<(Field, usize)> = None;
    let mut text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                depth += 1;
                let name = e.local_name().as_ref().to_vec();
                if root.is_none() {
                    root = Some(name.clone());
                }

                if is_entry(&name) {
                    entry = Some(EntryBuilder::default());
                } else if let Some(builder) = entry.as_mut() {
                    if field.is_none() {
                        if let Some(f) = Field::from_local_name(&name) {
                            if f == Field::Link {
                                if let Some(href) = link_href(&e) {
                                    builder.set(Field::Link, href);
                                }
                            }
                            field = Some((f, depth));
                            text.clear();
                        }
                    }
                }
            }
            Ok(Event::Empty(e)) => {
                let name = e.local_name().as_ref().to_vec();
                if root.is_none() {
                    root = Some(name.clone());
                }
                // Atom: <link rel="alternate" href="..."/>
                if let Some(builder) = entry.as_mut() {
                    if field.is_none() && name == b"link" {
                        if let Some(href) = link_href(&e) {
                            builder.set(Field::Link, href);
                        }
                    }
                }
            }
            Ok(Event::Text(e)) => {
                if field.is_some() {
                    match e.unescape() {
                        Ok(unescaped) => text.push_str(&unescaped),
                        // HTML entities such as &nbsp; are not XML; keep them for the HTML pass
                        Err(_) => text.push_str(&String::from_utf8_lossy(&e)),
                    }
                }
            }
            Ok(Event::CData(e)) => {
                if field.is_some() {
                    text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Ok(Event::End(e)) => {
                let name = e.local_name().as_ref().to_vec();

                if let Some((f, field_depth)) = field {
                    if field_depth == depth {
                        if let Some(builder) = entry.as_mut() {
                            builder.set(f, std::mem::take(&mut text));
                        }
                        field = None;
                    }
                }

                if field.is_none() && is_entry(&name) {
                    if let Some(builder) = entry.take() {
                        entries.push(builder.build());
                    }
                }

                depth = depth.saturating_sub(1);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(FeedCalError::FeedParse(format!(
                    "Malformed XML at position {}: {e}",
                    reader.error_position()
                )));
            }
            _ => {}
        }
    }

    match root.as_deref() {
        Some(b"rss") | Some(b"feed") | Some(b"RDF") => {}
        Some(other) => {
            return Err(FeedCalError::FeedParse(format!(
                "Not an RSS or Atom feed (root element <{}>)",
                String::from_utf8_lossy(other)
            )));
        }
        None => return Err(FeedCalError::FeedParse("Feed is empty".into())),
    }

    debug!(entries = entries.len(), "Parsed feed");
    Ok(entries)
}

fn is_entry(local_name: &[u8]) -> bool {
    local_name == b"item" || local_name == b"entry"
}

/// `href` of an Atom link, skipping rel values other than "alternate".
fn link_href(e: &BytesStart) -> Option<String> {
    let rel = e
        .try_get_attribute("rel")
        .ok()
        .flatten()
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()));
    if rel.as_deref().is_some_and(|r| r != "alternate") {
        return None;
    }

    let href = e.try_get_attribute("href").ok().flatten()?;
    href.unescape_value().ok().map(|v| v.into_owned())
}

/// RSS uses RFC 2822 (`Thu, 19 Jun 2025 12:00:00 -0400`), Atom RFC 3339.
fn parse_feed_date(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(s)
        .or_else(|_| DateTime::parse_from_rfc3339(s))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:atom="http://www.w3.org/2005/Atom">
  <channel>
    <title>4th Space events</title>
    <link>https://example.com/4th-space</link>
    <atom:link href="https://example.com/events.xml" rel="self"/>
    <item>
      <title>Science Slam</title>
      <link>https://example.com/events/science-slam</link>
      <description>&lt;p&gt;June 19, 2025, 4 p.m. - 6 p.m.&lt;/p&gt;&lt;p&gt;Short talks.&lt;/p&gt;</description>
      <guid isPermaLink="false">event-1</guid>
      <pubDate>Mon, 02 Jun 2025 09:00:00 -0400</pubDate>
    </item>
    <item>
      <title>Poster Fair &amp; Mixer</title>
      <link>https://example.com/events/poster-fair</link>
      <description><![CDATA[<p>June 20, 2025, 10:30 a.m. – 12 p.m.</p>]]></description>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn parses_rss_items() {
        let entries = parse_feed(RSS).unwrap();
        assert_eq!(entries.len(), 2);

        let first = &entries[0];
        assert_eq!(first.title, "Science Slam");
        assert_eq!(first.link.as_deref(), Some("https://example.com/events/science-slam"));
        assert!(first.summary.starts_with("<p>June 19, 2025"));
        assert_eq!(first.guid.as_deref(), Some("event-1"));
        assert_eq!(
            first.published,
            Some(Utc.with_ymd_and_hms(2025, 6, 2, 13, 0, 0).unwrap())
        );
    }

    #[test]
    fn channel_fields_do_not_leak_into_items() {
        let entries = parse_feed(RSS).unwrap();
        assert!(entries.iter().all(|e| e.title != "4th Space events"));
    }

    #[test]
    fn cdata_and_entities_are_decoded() {
        let entries = parse_feed(RSS).unwrap();
        let second = &entries[1];
        assert_eq!(second.title, "Poster Fair & Mixer");
        assert_eq!(second.summary, "<p>June 20, 2025, 10:30 a.m. – 12 p.m.</p>");
        assert_eq!(second.guid, None);
        assert_eq!(second.published, None);
    }

    #[test]
    fn parses_atom_entries() {
        let atom = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Events</title>
  <entry>
    <title>Workshop</title>
    <link rel="self" href="https://example.com/api/1"/>
    <link href="https://example.com/events/workshop"/>
    <id>urn:uuid:1225c695-cfb8-4ebb-aaaa-80da344efa6a</id>
    <published>2025-06-01T12:00:00Z</published>
    <updated>2025-06-03T12:00:00Z</updated>
    <summary type="html">&lt;b&gt;July 3, 2025, 1 p.m. - 3 p.m.&lt;/b&gt;</summary>
  </entry>
</feed>"#;

        let entries = parse_feed(atom).unwrap();
        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.title, "Workshop");
        assert_eq!(entry.link.as_deref(), Some("https://example.com/events/workshop"));
        assert_eq!(entry.summary, "<b>July 3, 2025, 1 p.m. - 3 p.m.</b>");
        assert_eq!(
            entry.published,
            Some(Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap())
        );
    }

    #[test]
    fn content_is_used_when_summary_is_missing() {
        let rss = r#"<rss xmlns:content="http://purl.org/rss/1.0/modules/content/"><channel>
<item><title>A</title><content:encoded><![CDATA[<p>body</p>]]></content:encoded></item>
</channel></rss>"#;
        let entries = parse_feed(rss).unwrap();
        assert_eq!(entries[0].summary, "<p>body</p>");
    }

    #[test]
    fn missing_title_gets_placeholder() {
        let rss = "<rss><channel><item><link>https://example.com/x</link></item></channel></rss>";
        let entries = parse_feed(rss).unwrap();
        assert_eq!(entries[0].title, "(No title)");
    }

    #[test]
    fn empty_channel_has_no_entries() {
        let entries = parse_feed("<rss><channel><title>t</title></channel></rss>").unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn rejects_non_feed_documents() {
        let err = parse_feed("<html><body>Maintenance</body></html>").unwrap_err();
        assert!(err.to_string().contains("<html>"));
    }

    #[test]
    fn rejects_empty_input() {
        assert!(parse_feed("").is_err());
    }

    #[test]
    fn rejects_malformed_xml() {
        assert!(parse_feed("<rss><channel><item><title>x</item></channel></rss>").is_err());
    }
}
