//! Headless document core: a versioned text buffer that keeps carets,
//! anchors, range markers and registered components consistent with every
//! committed edit.

/// Anchors and range markers.
pub mod anchors;
/// Mutable caret set.
pub mod carets;
/// Extension contract for edit observers.
pub mod component;
/// The document and its commit gate.
pub mod document;
/// Committed-edit sink.
pub mod edit_log;
/// Per-document options.
pub mod options;
/// Undo history.
pub mod undo_store;

#[cfg(test)]
mod invariants;
#[cfg(test)]
mod test_support;

pub use anchors::{Anchor, AnchorLifetime, AnchorStore, RangeMarker};
pub use carets::MultiCaret;
pub use component::DocumentComponent;
pub use document::{Document, DocumentId, MutationScope};
pub use edit_log::{EditLog, EditLogEntry, NoopEditLog, SharedEditLog};
pub use options::DocumentOptions;
pub use quire_primitives as primitives;
