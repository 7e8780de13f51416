//! # Masking
//!
//! Hides spans of text behind numbered sentinel tokens so that later text
//! transforms cannot corrupt them, then restores them.
//!
//! ## Token format
//!
//! `\x01<index>[_<kind>][_<length>]\x02`, where `index` is the 1-based
//! position of the hidden fragment in the [`MaskStore`], `kind` is a
//! [`MaskKind`] tag and `length` the visual length of a balanced span.
//!
//! ## Modules
//!
//! - **`kinds`**: `MaskKind`, `Token` markers and balanced `Delimiters`
//! - **`store`**: `MaskStore` (pattern masking, unmasking) and `MaskedText`
//! - **`balanced`**: stack-based masking of nested delimiter pairs
//! - **`blank`**: length-preserving blanking of comments, raw tags and
//!   anti-patterns
//!
//! A store is owned by one masking session. Tokens are only meaningful
//! against the store that issued them.

pub mod balanced;
pub mod blank;
pub mod kinds;
pub mod store;

pub use blank::{blank_distracting, blank_preserving_length};
pub use kinds::{Delimiters, MaskKind, Token};
pub use store::{MaskStore, MaskedText, remove_tokens};
