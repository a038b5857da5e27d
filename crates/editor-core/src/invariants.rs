//! Machine-checkable invariant proofs for the document core.
//!
//! Each invariant is expressed as a `pub(crate) fn test_*()` that is both
//! a runnable test and an intra-doc link target.

use quire_primitives::{CaretPosition, Operation, Sticky, TextRange};

use crate::anchors::AnchorLifetime;
use crate::edit_log::SharedEditLog;
use crate::{Document, DocumentOptions};

/// Invariant: Edit-log timestamps MUST strictly increase across commits, undo and redo.
#[cfg_attr(test, test)]
pub(crate) fn test_timestamp_monotonicity() {
	let log = SharedEditLog::new();
	let mut doc = Document::with_edit_log("", DocumentOptions::default(), log.clone());

	doc.replace_range(TextRange::empty(0), "hello").unwrap();
	doc.replace_range(TextRange::empty(5), " world").unwrap();
	doc.undo().unwrap();
	doc.redo().unwrap();

	let stamps: Vec<u64> = log.entries().iter().map(|e| e.timestamp).collect();
	assert_eq!(stamps.len(), 4);
	assert!(stamps.windows(2).all(|w| w[0] < w[1]), "timestamps not increasing: {stamps:?}");
	assert_eq!(doc.timestamp(), stamps[3]);
}

/// Invariant: A failed edit MUST leave text, timestamp and observers untouched.
#[cfg_attr(test, test)]
pub(crate) fn test_failed_edit_is_atomic() {
	let mut doc = Document::new("abc", DocumentOptions::default());
	let anchor = doc.create_anchor(2, Sticky::Left, AnchorLifetime::Document).unwrap();
	let carets = doc.carets().snapshot();

	assert!(doc.delete_ranges(&[TextRange::new(0, 2), TextRange::new(1, 3)]).is_err());
	assert!(doc.apply(Operation::identity(7)).is_err());
	assert!(doc.replace_range(TextRange::new(2, 5), "x").is_err());

	assert_eq!(doc.content().to_string(), "abc");
	assert_eq!(doc.timestamp(), 0);
	assert_eq!(doc.anchor_offset(anchor), 2);
	assert_eq!(doc.carets().snapshot(), carets);
	assert!(!doc.can_undo());
}

/// Invariant: Carets MUST stay ordered, distinct and within bounds after every commit.
#[cfg_attr(test, test)]
pub(crate) fn test_carets_valid_after_commit() {
	let mut doc = Document::new("0123456789", DocumentOptions::default());
	doc.carets_mut().add_carets([
		CaretPosition::point(1),
		CaretPosition::selection(3, 5),
		CaretPosition::point(8),
	]);

	doc.delete_ranges(&[TextRange::new(0, 9)]).unwrap();

	let carets = doc.carets().carets();
	assert!(carets.windows(2).all(|w| w[0].offset() < w[1].offset()));
	assert!(carets.iter().all(|c| c.position.selection_end <= doc.len_chars()));
}

/// Invariant: Undo followed by redo MUST reproduce the text and anchor offsets.
#[cfg_attr(test, test)]
pub(crate) fn test_undo_redo_roundtrip() {
	let mut doc = Document::new("one two three", DocumentOptions::default());
	let anchor = doc.create_anchor(8, Sticky::Right, AnchorLifetime::Document).unwrap();

	doc.replace_range(TextRange::new(4, 7), "2").unwrap();
	let text = doc.content().to_string();
	let offset = doc.anchor_offset(anchor);

	doc.undo().unwrap();
	doc.redo().unwrap();
	assert_eq!(doc.content().to_string(), text);
	assert_eq!(doc.anchor_offset(anchor), offset);
}
