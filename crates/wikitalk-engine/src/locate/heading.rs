use std::sync::OnceLock;

use regex::Regex;

use crate::markup::normalize_headline;
use crate::text::Span;

fn heading_regex() -> &'static Regex {
    static HEADING_REGEX: OnceLock<Regex> = OnceLock::new();
    // Trailing \x01..\x02 are blanked comments after the closing run
    HEADING_REGEX.get_or_init(|| {
        Regex::new(r"(?m)^(={1,6})(.+?)(={1,6})[ \t\x01\x02]*$").expect("Invalid heading regex")
    })
}

/// A heading line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    /// The whole line, newline included.
    pub span: Span,
    /// 1 to 6; the shorter of the two `=` runs.
    pub level: usize,
    /// Headline wikitext between the runs.
    pub headline_code: String,
    /// Headline for comparison, see [`normalize_headline`].
    pub headline: String,
    pub has_templates: bool,
    /// Position among the headings of the text, from 0.
    pub ordinal: usize,
}

/// Headings of `code`, found in its blanked copy so that headings inside
/// comments and raw tags are ignored.
pub fn scan_headings(code: &str, blanked: &str) -> Vec<Heading> {
    let mut headings = Vec::new();

    for caps in heading_regex().captures_iter(blanked) {
        let (Some(line), Some(open), Some(inner), Some(close)) =
            (caps.get(0), caps.get(1), caps.get(2), caps.get(3))
        else {
            continue;
        };
        let level = open.len().min(close.len());
        // `=== A ==` is a level 2 heading titled `= A`
        let start = inner.start() - (open.len() - level);
        let end = inner.end() + (close.len() - level);
        let Some(headline_code) = code.get(start..end) else {
            log::warn!("Skipping heading at {}: not on a character boundary", line.start());
            continue;
        };
        if headline_code.trim().is_empty() {
            continue;
        }

        let line_end = if blanked[line.end()..].starts_with('\n') {
            line.end() + 1
        } else {
            line.end()
        };
        headings.push(Heading {
            span: Span::new(line.start(), line_end),
            level,
            headline_code: headline_code.trim().to_string(),
            headline: normalize_headline(headline_code),
            has_templates: headline_code.contains("{{"),
            ordinal: headings.len(),
        });
    }

    headings
}
