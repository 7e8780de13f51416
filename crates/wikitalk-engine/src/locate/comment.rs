use serde::Serialize;

use super::heading::{Heading, scan_headings};
use super::score::CommentScore;
use super::source::{Scope, SourceText};
use super::target::{CommentFingerprint, CommentTarget};
use crate::config::LocatorConfig;
use crate::error::EngineError;
use crate::markup::{normalize_headline, remove_wiki_markup, word_overlap};
use crate::masking::blank_distracting;
use crate::signatures::{SignatureExtractor, SignatureRecord, normalize_user_name};
use crate::text::Span;

const PRECEDING_WEIGHT: f64 = 1.0;
const HEADLINE_WEIGHT: f64 = 1.0;
const ORDINAL_WEIGHT: f64 = 0.5;
/// How many preceding comments are compared.
const PRECEDING_WINDOW: usize = 2;

/// The winning signature of a comment locate pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocatedComment {
    pub record: SignatureRecord,
    /// From the start of the comment text to the end of its signature.
    pub span: Span,
    pub score: CommentScore,
    pub scope: Scope,
}

fn same_comment(fingerprint: &CommentFingerprint, record: &SignatureRecord) -> bool {
    normalize_user_name(&fingerprint.author) == record.author.name()
        && fingerprint.timestamp == record.timestamp
}

/// The last heading starting at or before `offset`.
fn enclosing_heading(headings: &[Heading], offset: usize) -> Option<&Heading> {
    headings.iter().take_while(|h| h.span.start <= offset).last()
}

/// Finds single comments by their signature using one site's conventions.
#[derive(Debug, Clone, Copy)]
pub struct CommentLocator<'c> {
    config: &'c LocatorConfig,
}

impl<'c> CommentLocator<'c> {
    pub fn new(config: &'c LocatorConfig) -> Self {
        Self { config }
    }

    pub fn locate(
        &self,
        source: &SourceText,
        target: &CommentTarget,
    ) -> Result<Option<LocatedComment>, EngineError> {
        let code = source.code()?;
        Ok(self.locate_in(code, source.scope(), target))
    }

    /// Scores every signature with the target's author and timestamp; the
    /// best wins, ties going to the earlier one.
    pub fn locate_in(
        &self,
        code: &str,
        scope: Scope,
        target: &CommentTarget,
    ) -> Option<LocatedComment> {
        let records = SignatureExtractor::new(self.config).extract(code);
        let blanked = blank_distracting(code, &self.config.comment_antipatterns);
        let headings = scan_headings(code, &blanked);

        let author = normalize_user_name(&target.author);
        let target_headline = target.headline.as_deref().map(normalize_headline);

        let mut best: Option<LocatedComment> = None;
        for (index, record) in records.iter().enumerate() {
            let identity_matches = (record.author.name() == author || record.author.is_undated())
                && record.timestamp == target.timestamp;
            if !identity_matches {
                continue;
            }

            let expected = &target.preceding_comments
                [..target.preceding_comments.len().min(PRECEDING_WINDOW)];
            let preceding: Vec<&SignatureRecord> =
                records[..index].iter().rev().take(PRECEDING_WINDOW).collect();
            let preceding_matches = !expected.is_empty()
                && preceding.len() >= expected.len()
                && expected
                    .iter()
                    .zip(&preceding)
                    .all(|(fingerprint, found)| same_comment(fingerprint, found));

            let heading = enclosing_heading(&headings, record.span.start);
            let headline = match (&target_headline, heading) {
                (Some(expected), Some(found)) => *expected == found.headline,
                (None, None) => true,
                _ => false,
            };

            // The comment's own text starts below its heading, if any
            let text_start = match heading {
                Some(h) if h.span.start >= record.comment_start => h.span.end,
                _ => record.comment_start,
            }
            .min(record.span.start);
            let text = code
                .get(text_start..record.span.start)
                .map(remove_wiki_markup)
                .unwrap_or_default();

            let ordinal = scope == Scope::Page && target.ordinal_index == Some(record.ordinal);

            let score = CommentScore {
                preceding_comments: if preceding_matches { PRECEDING_WEIGHT } else { 0.0 },
                headline: if headline { HEADLINE_WEIGHT } else { 0.0 },
                word_overlap: word_overlap(&target.text_sample, &text),
                ordinal: if ordinal { ORDINAL_WEIGHT } else { 0.0 },
            };
            log::debug!(
                "Comment #{} by {} scored {:.3}: {score:?}",
                record.ordinal,
                record.author,
                score.total()
            );

            if best.as_ref().is_none_or(|b| score.total() > b.score.total()) {
                best = Some(LocatedComment {
                    record: record.clone(),
                    span: Span::new(text_start, record.span.end),
                    score,
                    scope,
                });
            }
        }

        best
    }
}
