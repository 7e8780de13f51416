use crate::locate::Scope;
use crate::text::Span;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The caller asked for a scan before the text was fetched.
    #[error("{scope} source text was not loaded")]
    SourceNotLoaded { scope: Scope },

    #[error("Invalid {name} pattern: {source}")]
    InvalidPattern {
        name: String,
        source: regex::Error,
    },

    #[error("Expected 12 month names, got {count}")]
    InvalidMonthNames { count: usize },

    #[error("Text at {}..{} no longer matches the located section", span.start, span.end)]
    StaleSource { span: Span },
}
