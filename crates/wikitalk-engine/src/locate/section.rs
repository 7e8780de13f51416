use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use super::heading::Heading;
use crate::config::LocatorConfig;
use crate::text::preview;

/// A trailing list marker with nothing after it, left for the next reply.
fn placeholder_regex() -> &'static Regex {
    static PLACEHOLDER_REGEX: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER_REGEX
        .get_or_init(|| Regex::new(r"\n[:*#][ \t]*\n*$").expect("Invalid placeholder regex"))
}

/// One heading-delimited span considered during a locate pass.
///
/// All offsets are byte offsets into the scanned text.
/// `start <= content_start <= first_chunk_end <= end`,
/// `content_end <= end` and `first_chunk_content_end <= first_chunk_end`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionCandidate {
    /// Normalised headline.
    pub headline: String,
    pub headline_code: String,
    pub headline_has_templates: bool,
    pub level: usize,
    /// Position among the headings of the text, from 0.
    pub ordinal: usize,
    /// Start of the heading line.
    pub start: usize,
    /// Next heading of the same or a higher level, or end of text.
    pub end: usize,
    pub code: String,
    /// Next heading of any level, or end of text.
    pub first_chunk_end: usize,
    pub first_chunk_code: String,
    /// First byte after the heading line.
    pub content_start: usize,
    /// Where appended content goes, before trailing material that must stay
    /// last.
    pub content_end: usize,
    pub first_chunk_content_end: usize,
    /// `content_start - start`.
    pub relative_content_start: usize,
}

/// Where text appended to `slice` should go, relative to its start.
///
/// Each keep-at-end pattern is matched against what is left after the
/// previous one, then a trailing list placeholder is cut and blank lines
/// are reduced to one newline. Never earlier than `min`.
fn content_end(slice: &str, min: usize, keep: &[Regex]) -> usize {
    fn cut_before(slice: &str, at: usize) -> usize {
        if slice[at..].starts_with('\n') { at + 1 } else { at }
    }

    let mut end = slice.len();
    for pattern in keep.iter().chain(std::iter::once(placeholder_regex())) {
        if let Some(m) = pattern.find(&slice[..end]) {
            end = cut_before(slice, m.start());
        }
    }
    while slice[..end].ends_with("\n\n") {
        end -= 1;
    }
    end.max(min)
}

/// Builds the candidate for `headings[index]`, or `None` when its body
/// cannot be sliced out of `code`.
pub fn build_candidate(
    code: &str,
    headings: &[Heading],
    index: usize,
    config: &LocatorConfig,
) -> Option<SectionCandidate> {
    let heading = headings.get(index)?;
    let start = heading.span.start;
    let end = headings[index + 1..]
        .iter()
        .find(|next| next.level <= heading.level)
        .map_or(code.len(), |next| next.span.start);
    let first_chunk_end = headings
        .get(index + 1)
        .map_or(code.len(), |next| next.span.start);

    let (Some(section_code), Some(first_chunk_code)) =
        (code.get(start..end), code.get(start..first_chunk_end))
    else {
        log::warn!(
            "Skipping section {:?} at {start}: body cannot be delimited",
            preview(&heading.headline_code, 40)
        );
        return None;
    };

    let relative_content_start = heading.span.len();
    let keep = &config.keep_in_section_ending;
    Some(SectionCandidate {
        headline: heading.headline.clone(),
        headline_code: heading.headline_code.clone(),
        headline_has_templates: heading.has_templates,
        level: heading.level,
        ordinal: heading.ordinal,
        start,
        end,
        code: section_code.to_string(),
        first_chunk_end,
        first_chunk_code: first_chunk_code.to_string(),
        content_start: start + relative_content_start,
        content_end: start + content_end(section_code, relative_content_start, keep),
        first_chunk_content_end: start
            + content_end(first_chunk_code, relative_content_start, keep),
        relative_content_start,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locate::heading::scan_headings;
    use crate::masking::blank_distracting;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn candidates(code: &str) -> Vec<SectionCandidate> {
        let config = LocatorConfig::default();
        let headings = scan_headings(code, &blank_distracting(code, &[]));
        (0..headings.len())
            .filter_map(|i| build_candidate(code, &headings, i, &config))
            .collect()
    }

    const PAGE: &str = "\
Intro
== A ==
a text
=== A1 ===
a1 text

== B ==
b text
";

    #[test]
    fn section_and_first_chunk_boundaries() {
        let all = candidates(PAGE);
        let a = &all[0];

        assert_eq!(a.code, "== A ==\na text\n=== A1 ===\na1 text\n\n");
        assert_eq!(a.first_chunk_code, "== A ==\na text\n");
        assert_eq!(a.content_start, a.start + 8);
        assert_eq!(a.relative_content_start, 8);
        // Blank line before the next heading stays after appended content
        assert_eq!(&PAGE[a.start..a.content_end], "== A ==\na text\n=== A1 ===\na1 text\n");
        assert_eq!(a.first_chunk_content_end, a.first_chunk_end);

        let a1 = &all[1];
        assert_eq!(a1.level, 3);
        assert_eq!(a1.end, all[2].start);

        assert_eq!(all[2].end, PAGE.len());
    }

    #[test]
    fn offsets_respect_ordering_invariants() {
        for c in candidates(PAGE) {
            assert!(c.start <= c.content_start);
            assert!(c.content_start <= c.first_chunk_end);
            assert!(c.first_chunk_end <= c.end);
            assert!(c.content_end <= c.end);
            assert!(c.first_chunk_content_end <= c.first_chunk_end);
        }
    }

    #[rstest]
    #[case("== S ==\ntext\n{{clear}}\n", "== S ==\ntext\n")]
    #[case("== S ==\ntext\n{{Collapse bottom}}\n<!-- note -->\n", "== S ==\ntext\n")]
    #[case("== S ==\n* Support\n*\n", "== S ==\n* Support\n")]
    #[case("== S ==\n# one\n# \n\n", "== S ==\n# one\n")]
    #[case("== S ==\n", "== S ==\n")]
    #[case("== S ==", "== S ==")]
    fn content_end_skips_trailing_material(#[case] code: &str, #[case] before_end: &str) {
        let c = &candidates(code)[0];
        assert_eq!(&code[..c.content_end], before_end);
    }
}
