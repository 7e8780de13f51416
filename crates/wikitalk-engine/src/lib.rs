pub mod config;
pub mod edit;
pub mod error;
pub mod locate;
pub mod markup;
pub mod masking;
pub mod signatures;
pub mod text;

// Re-export key types for easier usage
pub use config::LocatorConfig;
pub use edit::SectionEdit;
pub use error::EngineError;
pub use locate::{
    CommentFingerprint, CommentLocator, CommentTarget, LocatedComment, LocatedSection, Scope,
    SectionCandidate, SectionLocator, SectionScore, SectionTarget, SourceText,
};
pub use markup::{normalize_headline, remove_wiki_markup, word_overlap};
pub use masking::{Delimiters, MaskKind, MaskStore, MaskedText};
pub use signatures::{Author, SignatureExtractor, SignatureRecord, SignatureSource};
pub use text::Span;
