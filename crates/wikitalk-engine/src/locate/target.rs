use serde::{Deserialize, Serialize};

/// Soft identity of a comment: who signed it, when, and some of its text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentFingerprint {
    pub author: String,
    pub timestamp: Option<String>,
    pub text_sample: String,
}

/// A section as last seen by the caller, to be found again in fresh text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionTarget {
    /// Headline as rendered, or as wikitext when rendering was not available.
    pub headline: String,
    /// Position among all headings of the page, from 0.
    pub ordinal_index: Option<usize>,
    /// Headlines of the headings just before this one, nearest first; only
    /// the first three are compared.
    pub ancestor_headlines: Vec<String>,
    pub oldest_comment: Option<CommentFingerprint>,
}

/// A comment as last seen by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentTarget {
    pub author: String,
    pub timestamp: Option<String>,
    /// Position among all signatures of the page, from 0.
    pub ordinal_index: Option<usize>,
    pub text_sample: String,
    /// Comments right before this one, nearest first.
    pub preceding_comments: Vec<CommentFingerprint>,
    /// Headline of the section the comment sits in.
    pub headline: Option<String>,
}
