use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// What a text blob covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// The whole page.
    Page,
    /// A single section fetched on its own. Ordinals and ancestors are
    /// meaningless here.
    Section,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Page => f.write_str("page"),
            Scope::Section => f.write_str("section"),
        }
    }
}

/// Source text supplied by the fetching layer.
///
/// The code is `None` until the fetch completes. Scanning a text that was
/// never loaded is a caller bug and reported as
/// [`EngineError::SourceNotLoaded`], never as "not found".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceText {
    code: Option<String>,
    scope: Scope,
}

impl SourceText {
    pub fn page(code: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            scope: Scope::Page,
        }
    }

    pub fn section(code: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            scope: Scope::Section,
        }
    }

    /// A text whose fetch has not completed yet.
    pub fn pending(scope: Scope) -> Self {
        Self { code: None, scope }
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn is_loaded(&self) -> bool {
        self.code.is_some()
    }

    pub fn code(&self) -> Result<&str, EngineError> {
        self.code
            .as_deref()
            .ok_or(EngineError::SourceNotLoaded { scope: self.scope })
    }

    pub fn set_code(&mut self, code: impl Into<String>) {
        self.code = Some(code.into());
    }
}
