//! HTML → plaintext for feed summaries.

/// Wide enough that html2text never wraps a date line.
const TEXT_WIDTH: usize = 10_000;

/// Strip markup and decode entities. Blank lines and trailing whitespace
/// are collapsed so the description stays compact.
pub fn html_to_text(html: &str) -> String {
    // No decorations: `**bold**` or `[link][1]` markers would split date lines
    let rendered = match html2text::config::plain_no_decorate()
        .string_from_read(html.as_bytes(), TEXT_WIDTH)
    {
        Ok(text) => text,
        // Not renderable as HTML; treat it as text already
        Err(_) => html.to_string(),
    };

    rendered
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_tags() {
        let text = html_to_text("<p>June 19, 2025, 4 p.m. - 6 p.m.</p><p>Short talks.</p>");
        assert!(text.contains("June 19, 2025, 4 p.m. - 6 p.m."));
        assert!(text.contains("Short talks."));
        assert!(!text.contains("<p>"));
    }

    #[test]
    fn inline_markup_leaves_no_decoration() {
        let text = html_to_text(
            "<p><strong>June 19</strong>, 2025, <em>4 p.m.</em> - 6 p.m.</p>\
             <p>Get <a href=\"https://example.com/tickets\">tickets</a> now.</p>",
        );
        assert!(text.contains("June 19, 2025, 4 p.m. - 6 p.m."), "got {text:?}");
        assert!(text.contains("tickets"));
        assert!(!text.contains('*'), "got {text:?}");
        assert!(!text.contains("[tickets]"), "got {text:?}");
    }

    #[test]
    fn decodes_entities() {
        let text = html_to_text("<p>Tea&nbsp;&amp;&nbsp;cookies</p>");
        assert!(text.contains('&'), "got {text:?}");
        assert!(!text.contains("&amp;"));
    }

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(html_to_text("No markup here"), "No markup here");
    }

    #[test]
    fn empty_input_is_empty() {
        assert_eq!(html_to_text(""), "");
    }
}
