//! # Text primitives
//!
//! Byte-offset plumbing shared by the masking, signature and locate passes.
//!
//! - **`span`**: `Span`, a `[start, end)` byte range into a source string
//! - **`lines`**: `lines_with_spans()` iterates lines keeping their offsets
//! - **`cursor`**: `Cursor` for byte-by-byte delimiter scanning
//! - **`slice`**: char-boundary-safe slicing and log previews
//!
//! Every offset handed out by the engine is a UTF-8 byte offset into the text
//! the caller supplied. Blanking passes replace text with the same number of
//! bytes, so offsets computed on a blanked copy are valid on the original.

pub mod cursor;
pub mod lines;
pub mod slice;
pub mod span;

pub use cursor::Cursor;
pub use lines::{LineRef, lines_with_spans};
pub use slice::{floor_char_boundary, preview};
pub use span::Span;
