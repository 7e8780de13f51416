use std::sync::OnceLock;

use regex::Regex;

use super::types::{Author, RawSignature, SignatureSource};
use crate::config::LocatorConfig;
use crate::text::{Span, floor_char_boundary, lines_with_spans};

/// Formatting that signatures commonly close right after the timestamp.
fn closing_markup_regex() -> &'static Regex {
    static CLOSING_MARKUP_REGEX: OnceLock<Regex> = OnceLock::new();
    CLOSING_MARKUP_REGEX.get_or_init(|| {
        Regex::new(r"^(?:\}\}|</small>|</span>|</sup>|</font>)*")
            .expect("Invalid closing markup regex")
    })
}

/// Finds hand-typed signatures: a timestamp preceded, within
/// `signature_scan_limit` bytes on the same line, by a link to a user page.
///
/// `blanked` is the scanning copy of `code` and has the same length.
pub(crate) fn scan(code: &str, blanked: &str, config: &LocatorConfig) -> Vec<RawSignature> {
    let mut found = Vec::new();

    for line in lines_with_spans(blanked) {
        let timestamps: Vec<_> = config.timestamps.find_iter(line.text).collect();
        // A signature never reaches back past the previous one on its line
        let mut floor = line.span.start;

        for (i, ts) in timestamps.iter().enumerate() {
            let ts_start = line.span.start + ts.start();
            let closing = closing_markup_regex()
                .find(&line.text[ts.end()..])
                .map_or(0, |m| m.end());
            let end = line.span.start + ts.end() + closing;

            let window_start = floor.max(floor_char_boundary(
                blanked,
                ts_start.saturating_sub(config.signature_scan_limit),
            ));
            let links = config.authors.find_in(&blanked[window_start..ts_start]);
            let (author, start) = match links.last() {
                Some(nearest) => {
                    // Anchor on the first link to the same user, not a later self-link
                    let first = links
                        .iter()
                        .find(|link| link.name == nearest.name)
                        .unwrap_or(nearest);
                    (
                        Some(Author::User(nearest.name.clone())),
                        window_start + first.span.start,
                    )
                }
                None => (None, ts_start),
            };

            let next_comment_start = if i + 1 < timestamps.len() {
                end
            } else {
                let rest = &blanked[line.span.end..];
                line.span.end + (rest.len() - rest.trim_start_matches('\n').len())
            };

            let timestamp = code.get(ts_start..line.span.start + ts.end()).unwrap_or(ts.as_str());
            log::trace!(
                "Signature at {start}..{end}: {} {timestamp}",
                author.as_ref().map_or("<none>", Author::name)
            );

            found.push(RawSignature {
                author,
                timestamp: Some(timestamp.to_string()),
                date: config.timestamps.parse(timestamp),
                span: Span::new(start, end),
                next_comment_start,
                source: SignatureSource::Regular,
            });
            floor = end;
        }
    }

    found
}
