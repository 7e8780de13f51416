//! # Locating sections and comments
//!
//! Re-finds a section or comment, last seen in an earlier rendering, inside
//! freshly fetched source text. There is no stable addressing in wikitext,
//! so every heading becomes a [`SectionCandidate`] scored against the
//! caller's [`SectionTarget`]:
//!
//! | signal | weight |
//! |---|---|
//! | normalised headline equal (0.5 if templates prevent comparing) | 1.0 |
//! | heading ordinal equal (page scope only) | 0.5 |
//! | previous [`ANCESTOR_WINDOW`] headlines equal, nearest first (page scope only) | 0.25 |
//! | oldest comment shares author or timestamp | 1.0 |
//! | word overlap of the oldest comment's text | 0..1 |
//!
//! Totals at or below [`CONFIDENCE_THRESHOLD`] are discarded. The best total
//! wins, ties going to the earlier heading, and a candidate at
//! [`MAX_SCORE`] ends the scan. Finding nothing is `Ok(None)`; scanning a
//! text that was never fetched is [`EngineError::SourceNotLoaded`].

pub mod comment;
pub mod heading;
pub mod score;
pub mod section;
pub mod source;
pub mod target;

pub use comment::{CommentLocator, LocatedComment};
pub use heading::{Heading, scan_headings};
pub use score::{
    ANCESTOR_WINDOW, CONFIDENCE_THRESHOLD, CommentScore, MAX_SCORE, SectionScore,
};
pub use section::{SectionCandidate, build_candidate};
pub use source::{Scope, SourceText};
pub use target::{CommentFingerprint, CommentTarget, SectionTarget};

use serde::Serialize;

use crate::config::LocatorConfig;
use crate::error::EngineError;
use crate::markup::{normalize_headline, remove_wiki_markup, word_overlap};
use crate::masking::blank_distracting;
use crate::signatures::{SignatureExtractor, SignatureRecord, normalize_user_name};
use score::{
    ANCESTORS_WEIGHT, HEADLINE_PARTIAL, HEADLINE_WEIGHT, NO_COMMENTS_OVERLAP,
    OLDEST_COMMENT_WEIGHT, ORDINAL_WEIGHT, WORD_OVERLAP_WEIGHT,
};

/// The winning candidate of a locate pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocatedSection {
    pub candidate: SectionCandidate,
    pub score: SectionScore,
    /// Whether offsets refer to a whole page or to a section fetched alone.
    pub scope: Scope,
}

impl LocatedSection {
    pub fn total(&self) -> f64 {
        self.score.total()
    }
}

/// The target with its comparison forms computed once.
struct PreparedTarget<'t> {
    target: &'t SectionTarget,
    headline: String,
    headline_has_templates: bool,
    ancestors: Vec<String>,
}

impl<'t> PreparedTarget<'t> {
    fn new(target: &'t SectionTarget) -> Self {
        Self {
            target,
            headline: normalize_headline(&target.headline),
            headline_has_templates: target.headline.contains("{{"),
            ancestors: target
                .ancestor_headlines
                .iter()
                .take(ANCESTOR_WINDOW)
                .map(|h| normalize_headline(h))
                .collect(),
        }
    }
}

/// Headlines of the [`ANCESTOR_WINDOW`] headings just before
/// `headings[index]`, nearest first, whatever their level.
pub(crate) fn ancestors_of(headings: &[Heading], index: usize) -> Vec<&str> {
    headings[..index.min(headings.len())]
        .iter()
        .rev()
        .take(ANCESTOR_WINDOW)
        .map(|h| h.headline.as_str())
        .collect()
}

/// The earliest-dated record, or the first one when none is dated.
pub(crate) fn oldest_comment(records: &[SignatureRecord]) -> Option<&SignatureRecord> {
    records
        .iter()
        .filter(|r| r.date.is_some())
        .min_by_key(|r| r.date)
        .or_else(|| records.first())
}

/// Visible text of the comment closed by `record`, never reaching back into
/// the heading line.
fn comment_text(code: &str, record: &SignatureRecord, content_start: usize) -> String {
    let start = record.comment_start.max(content_start);
    code.get(start..record.span.start)
        .map(remove_wiki_markup)
        .unwrap_or_default()
}

/// Keeps the first confident candidate with the strictly highest total,
/// consuming `scored` only up to a candidate at [`MAX_SCORE`].
fn pick_best(
    scored: impl Iterator<Item = (SectionCandidate, SectionScore)>,
    scope: Scope,
) -> Option<LocatedSection> {
    let mut best: Option<LocatedSection> = None;
    for (candidate, score) in scored {
        if !score.is_confident() {
            continue;
        }
        let total = score.total();
        if best.as_ref().is_none_or(|b| total > b.total()) {
            best = Some(LocatedSection {
                candidate,
                score,
                scope,
            });
        }
        if total >= MAX_SCORE {
            log::debug!("Maximum score reached, stopping the scan");
            break;
        }
    }
    best
}

/// Finds sections using one site's conventions.
#[derive(Debug, Clone, Copy)]
pub struct SectionLocator<'c> {
    config: &'c LocatorConfig,
}

impl<'c> SectionLocator<'c> {
    pub fn new(config: &'c LocatorConfig) -> Self {
        Self { config }
    }

    /// Locates `target` in fetched text.
    pub fn locate(
        &self,
        source: &SourceText,
        target: &SectionTarget,
    ) -> Result<Option<LocatedSection>, EngineError> {
        let code = source.code()?;
        Ok(self.locate_in(code, source.scope(), target))
    }

    /// Locates `target` in `code`. `None` means no candidate was confident
    /// enough.
    pub fn locate_in(
        &self,
        code: &str,
        scope: Scope,
        target: &SectionTarget,
    ) -> Option<LocatedSection> {
        let blanked = blank_distracting(code, &self.config.comment_antipatterns);
        let headings = scan_headings(code, &blanked);
        let prepared = PreparedTarget::new(target);

        let scored = (0..headings.len()).filter_map(|index| {
            let candidate = build_candidate(code, &headings, index, self.config)?;
            let score = self.score(&candidate, &ancestors_of(&headings, index), scope, &prepared);
            log::debug!(
                "Candidate {:?} (#{}) scored {:.3}: {score:?}",
                candidate.headline,
                candidate.ordinal,
                score.total()
            );
            Some((candidate, score))
        });
        let best = pick_best(scored, scope);

        if best.is_none() {
            log::debug!("No section matched {:?}", target.headline);
        }
        best
    }

    /// Every section candidate of `code`, in source order.
    pub fn candidates(&self, code: &str) -> Vec<SectionCandidate> {
        let blanked = blank_distracting(code, &self.config.comment_antipatterns);
        let headings = scan_headings(code, &blanked);
        (0..headings.len())
            .filter_map(|index| build_candidate(code, &headings, index, self.config))
            .collect()
    }

    fn score(
        &self,
        candidate: &SectionCandidate,
        ancestors: &[&str],
        scope: Scope,
        target: &PreparedTarget<'_>,
    ) -> SectionScore {
        let headline = if candidate.headline == target.headline {
            HEADLINE_WEIGHT
        } else if target.headline_has_templates || candidate.headline_has_templates {
            HEADLINE_PARTIAL
        } else {
            0.0
        };

        let (ordinal, ancestors) = match scope {
            Scope::Section => (0.0, 0.0),
            Scope::Page => (
                if target.target.ordinal_index == Some(candidate.ordinal) {
                    ORDINAL_WEIGHT
                } else {
                    0.0
                },
                if ancestors.iter().copied().eq(target.ancestors.iter().map(String::as_str)) {
                    ANCESTORS_WEIGHT
                } else {
                    0.0
                },
            ),
        };

        let records = SignatureExtractor::new(self.config).extract(&candidate.code);
        let (oldest_comment, word_overlap) = match (&target.target.oldest_comment, oldest_comment(&records)) {
            (None, None) => (OLDEST_COMMENT_WEIGHT, NO_COMMENTS_OVERLAP),
            (Some(expected), Some(found)) => {
                let same_timestamp =
                    expected.timestamp.is_some() && expected.timestamp == found.timestamp;
                let same_author = normalize_user_name(&expected.author) == found.author.name();
                let matched = if same_timestamp || same_author {
                    OLDEST_COMMENT_WEIGHT
                } else {
                    0.0
                };
                let text = comment_text(&candidate.code, found, candidate.relative_content_start);
                (matched, WORD_OVERLAP_WEIGHT * word_overlap(&expected.text_sample, &text))
            }
            _ => (0.0, 0.0),
        };

        SectionScore {
            headline,
            ordinal,
            ancestors,
            oldest_comment,
            word_overlap,
        }
    }
}
