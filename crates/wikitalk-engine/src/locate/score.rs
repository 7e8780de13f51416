use serde::Serialize;

pub const HEADLINE_WEIGHT: f64 = 1.0;
/// Credit for a headline that holds templates and cannot be compared exactly.
pub const HEADLINE_PARTIAL: f64 = 0.5;
pub const ORDINAL_WEIGHT: f64 = 0.5;
pub const ANCESTORS_WEIGHT: f64 = 0.25;
pub const OLDEST_COMMENT_WEIGHT: f64 = 1.0;
pub const WORD_OVERLAP_WEIGHT: f64 = 1.0;
/// Overlap credited when neither side has a comment to compare.
pub const NO_COMMENTS_OVERLAP: f64 = 0.5;

/// Highest total a candidate can reach; reaching it ends the scan.
pub const MAX_SCORE: f64 =
    HEADLINE_WEIGHT + ORDINAL_WEIGHT + ANCESTORS_WEIGHT + OLDEST_COMMENT_WEIGHT + WORD_OVERLAP_WEIGHT;

/// Totals at or below this are never returned.
pub const CONFIDENCE_THRESHOLD: f64 = 1.0;

/// How many preceding headlines are compared.
pub const ANCESTOR_WINDOW: usize = 3;

/// Per-signal breakdown of a section candidate's score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SectionScore {
    pub headline: f64,
    pub ordinal: f64,
    pub ancestors: f64,
    pub oldest_comment: f64,
    pub word_overlap: f64,
}

impl SectionScore {
    pub fn total(&self) -> f64 {
        self.headline + self.ordinal + self.ancestors + self.oldest_comment + self.word_overlap
    }

    pub fn is_confident(&self) -> bool {
        self.total() > CONFIDENCE_THRESHOLD
    }
}

/// Per-signal breakdown of a comment candidate's score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CommentScore {
    pub preceding_comments: f64,
    pub headline: f64,
    pub word_overlap: f64,
    pub ordinal: f64,
}

impl CommentScore {
    pub fn total(&self) -> f64 {
        self.preceding_comments + self.headline + self.word_overlap + self.ordinal
    }
}
