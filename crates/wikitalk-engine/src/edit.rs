//! Rewriting a text snapshot at located offsets.

use crate::error::EngineError;
use crate::locate::LocatedSection;
use crate::text::Span;

/// A change to a located section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionEdit<'a> {
    /// Add content at the end of the section, before trailing material that
    /// must stay last.
    Append(&'a str),
    /// Add content before the section's first subsection.
    AppendToFirstChunk(&'a str),
    /// Replace the whole section, heading included.
    Replace(&'a str),
    Remove,
}

/// Inserts `content` at `at` as whole lines.
fn insert_lines(text: &str, at: usize, content: &str) -> String {
    let (head, tail) = text.split_at(at);
    let mut out = String::with_capacity(text.len() + content.len() + 2);
    out.push_str(head);
    if !head.is_empty() && !head.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(content);
    if !tail.is_empty() && !content.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(tail);
    out
}

impl LocatedSection {
    /// Applies `edit` to `text`, the snapshot this section was located in.
    ///
    /// Fails with [`EngineError::StaleSource`] when `text` no longer holds
    /// the located code at the located offsets.
    pub fn apply(&self, text: &str, edit: SectionEdit<'_>) -> Result<String, EngineError> {
        let c = &self.candidate;
        if text.get(c.start..c.end) != Some(c.code.as_str()) {
            return Err(EngineError::StaleSource {
                span: Span::new(c.start, c.end),
            });
        }

        let edited = match edit {
            SectionEdit::Append(content) => insert_lines(text, c.content_end, content),
            SectionEdit::AppendToFirstChunk(content) => {
                insert_lines(text, c.first_chunk_content_end, content)
            }
            SectionEdit::Replace(code) => {
                let tail = &text[c.end..];
                let separator = if !tail.is_empty() && !code.is_empty() && !code.ends_with('\n') {
                    "\n"
                } else {
                    ""
                };
                format!("{}{code}{separator}{tail}", &text[..c.start])
            }
            SectionEdit::Remove => format!("{}{}", &text[..c.start], &text[c.end..]),
        };
        Ok(edited)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LocatorConfig;
    use crate::locate::{Scope, SectionLocator, SectionTarget};
    use pretty_assertions::assert_eq;

    const PAGE: &str = "\
== Vote ==
* Support [[User:Ann|Ann]] 10:00, 1 May 2024 (UTC)
*
{{clear}}
=== Details ===
more

== Next ==
";

    fn locate(text: &str) -> LocatedSection {
        let config = LocatorConfig::default();
        let target = SectionTarget {
            headline: "Vote".to_string(),
            ordinal_index: Some(0),
            ..SectionTarget::default()
        };
        SectionLocator::new(&config)
            .locate_in(text, Scope::Page, &target)
            .unwrap()
    }

    #[test]
    fn append_lands_before_trailing_material() {
        let located = locate(PAGE);
        let edited = located.apply(PAGE, SectionEdit::Append("* Oppose")).unwrap();

        assert!(edited.contains("=== Details ===\nmore\n* Oppose\n\n== Next =="));
    }

    #[test]
    fn append_to_first_chunk_skips_placeholder_and_clear() {
        let located = locate(PAGE);
        let edited = located
            .apply(PAGE, SectionEdit::AppendToFirstChunk("* Oppose\n"))
            .unwrap();

        assert!(edited.contains("(UTC)\n* Oppose\n*\n{{clear}}\n=== Details ==="));
    }

    #[test]
    fn replace_and_remove() {
        let located = locate(PAGE);

        let replaced = located.apply(PAGE, SectionEdit::Replace("== Vote ==\nclosed")).unwrap();
        assert_eq!(replaced, "== Vote ==\nclosed\n== Next ==\n");

        let removed = located.apply(PAGE, SectionEdit::Remove).unwrap();
        assert_eq!(removed, "== Next ==\n");
    }

    #[test]
    fn stale_text_is_rejected() {
        let located = locate(PAGE);
        let changed = PAGE.replace("more", "less");

        assert!(matches!(
            located.apply(&changed, SectionEdit::Remove),
            Err(EngineError::StaleSource { .. })
        ));
    }
}
