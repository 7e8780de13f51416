//! # Signature extraction
//!
//! Splits raw talk-page text into comments by finding the signatures that
//! close them.
//!
//! ## Passes
//!
//! 1. Comments, raw tags and site anti-patterns are blanked (same length).
//! 2. **`regular`**: every zoned timestamp, attributed to the nearest user
//!    link before it on the same line.
//! 3. **`unsigned`**: unsigned-attribution templates. Where one ends the same
//!    comment as a regular signature, the template wins.
//! 4. Records are sorted by start, authorless ones are dropped and comment
//!    starts are chained from the previous record.
//!
//! Nothing here fails on malformed input; text that does not match is
//! skipped.

pub mod anchor;
pub mod author;
pub mod regular;
pub mod timestamp;
pub mod types;
pub mod unsigned;

use std::collections::HashSet;

pub use anchor::{AnchorRegistry, comment_anchor};
pub use author::{AuthorLink, AuthorLinks, normalize_user_name};
pub use timestamp::TimestampFormat;
pub use types::{Author, SignatureRecord, SignatureSource};
pub use unsigned::UnsignedTemplates;

use crate::config::LocatorConfig;
use crate::error::EngineError;
use crate::locate::SourceText;
use crate::masking::blank_distracting;

/// Extracts signature records using one site's conventions.
#[derive(Debug, Clone, Copy)]
pub struct SignatureExtractor<'c> {
    config: &'c LocatorConfig,
}

impl<'c> SignatureExtractor<'c> {
    pub fn new(config: &'c LocatorConfig) -> Self {
        Self { config }
    }

    /// Signatures of `code` in source order.
    pub fn extract(&self, code: &str) -> Vec<SignatureRecord> {
        self.run(code, false)
    }

    /// Like [`extract`](Self::extract), also giving every dated record a
    /// unique anchor.
    pub fn extract_with_anchors(&self, code: &str) -> Vec<SignatureRecord> {
        self.run(code, true)
    }

    /// Extracts from fetched text; fails if the text was never loaded.
    pub fn extract_source(
        &self,
        source: &SourceText,
        with_anchors: bool,
    ) -> Result<Vec<SignatureRecord>, EngineError> {
        Ok(self.run(source.code()?, with_anchors))
    }

    fn run(&self, code: &str, with_anchors: bool) -> Vec<SignatureRecord> {
        let blanked = blank_distracting(code, &self.config.comment_antipatterns);

        let mut raw = regular::scan(code, &blanked, self.config);
        if let Some(unsigned) = &self.config.unsigned {
            let templates = unsigned.scan(code, &blanked, &self.config.timestamps);
            let boundaries: HashSet<usize> =
                templates.iter().map(|t| t.next_comment_start).collect();
            raw.retain(|sig| !boundaries.contains(&sig.next_comment_start));
            raw.extend(templates);
        }
        raw.sort_by_key(|sig| sig.span.start);

        let mut records: Vec<SignatureRecord> = Vec::with_capacity(raw.len());
        for sig in raw {
            let comment_start = records.last().map_or(0, |prev| prev.next_comment_start);
            if let Some(record) = sig.into_record(code, comment_start, records.len()) {
                records.push(record);
            }
        }

        if with_anchors {
            let mut registry = AnchorRegistry::new();
            for record in &mut records {
                if let (Some(date), Author::User(name)) = (record.date, &record.author) {
                    record.anchor = Some(registry.issue(date, name));
                }
            }
        }

        log::debug!("Extracted {} signatures from {} bytes", records.len(), code.len());
        records
    }
}
