//! Core types for versioned text editing: ranges, operations, carets and batch rebasing.

/// Carets and the immutable multi-caret store.
pub mod caret;
/// Edit errors and commit results.
pub mod edit;
/// Identifier types for carets, anchors and range markers.
pub mod ids;
/// Retain/replace operations and position mapping.
pub mod operation;
/// Char-indexed text ranges.
pub mod range;
/// Batch rebasing through concurrent operations.
pub mod rebase;
/// Read access to char-indexed text.
pub mod text;

#[cfg(test)]
mod test_support;

pub use caret::{Caret, CaretPosition, MultiCaretData};
pub use edit::{CommitResult, EditError};
pub use ids::{AnchorId, CaretId, RangeMarkerId};
pub use operation::{Fragment, Operation, Replace, Step, Sticky};
pub use range::{CharIdx, CharLen, TextRange};
pub use rebase::{OpTreap, rebase_offsets};
pub use ropey::{Rope, RopeSlice};
pub use text::TextSource;
