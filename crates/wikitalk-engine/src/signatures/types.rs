use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use crate::text::Span;

/// Who signed a comment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Author {
    /// A user name in canonical form.
    User(String),
    /// An unsigned template that named nobody.
    Undated,
}

impl Author {
    pub const UNDATED_MARKER: &'static str = "<undated>";

    pub fn name(&self) -> &str {
        match self {
            Author::User(name) => name,
            Author::Undated => Self::UNDATED_MARKER,
        }
    }

    pub fn is_undated(&self) -> bool {
        matches!(self, Author::Undated)
    }
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Author {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Where a signature came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SignatureSource {
    /// A hand-typed or tilde-expanded signature.
    Regular,
    /// An unsigned-attribution template.
    Unsigned,
}

/// One signature and the comment it closes.
///
/// Comments tile the text: `comment_start` of a record equals
/// `next_comment_start` of the record before it (0 for the first).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignatureRecord {
    pub author: Author,
    /// Timestamp as written, zone included.
    pub timestamp: Option<String>,
    pub date: Option<DateTime<Utc>>,
    /// From the first author link (or the template) to the end of the
    /// timestamp and its closing markup.
    pub span: Span,
    /// Source text under `span`.
    pub raw: String,
    pub comment_start: usize,
    /// Where the next comment may begin.
    pub next_comment_start: usize,
    /// Position among the extracted records, from 0.
    pub ordinal: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor: Option<String>,
    pub source: SignatureSource,
}

/// A signature found by one of the scans, before merging and filtering.
#[derive(Debug, Clone)]
pub(crate) struct RawSignature {
    pub author: Option<Author>,
    pub timestamp: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub span: Span,
    pub next_comment_start: usize,
    pub source: SignatureSource,
}

impl RawSignature {
    /// Fills in the fields that depend on neighbouring records. Returns
    /// `None` when the author could not be resolved.
    pub(crate) fn into_record(
        self,
        code: &str,
        comment_start: usize,
        ordinal: usize,
    ) -> Option<SignatureRecord> {
        let author = self.author?;
        Some(SignatureRecord {
            author,
            timestamp: self.timestamp,
            date: self.date,
            span: self.span,
            raw: self.span.slice(code).unwrap_or_default().to_string(),
            comment_start,
            next_comment_start: self.next_comment_start,
            ordinal,
            anchor: None,
            source: self.source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undated_author_renders_as_marker() {
        assert_eq!(Author::Undated.to_string(), "<undated>");
        assert_eq!(Author::User("Alice".into()).name(), "Alice");
        assert!(Author::Undated.is_undated());
    }

    #[test]
    fn authors_serialize_as_plain_strings() {
        assert_eq!(serde_json::to_string(&Author::User("Bob".into())).unwrap(), "\"Bob\"");
        assert_eq!(serde_json::to_string(&Author::Undated).unwrap(), "\"<undated>\"");
        assert_eq!(
            serde_json::to_string(&SignatureSource::Unsigned).unwrap(),
            "\"unsigned\""
        );
    }
}
