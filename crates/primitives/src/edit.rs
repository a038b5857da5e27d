//! Edit outcome types shared by the document core.

use thiserror::Error;

use crate::range::{CharIdx, CharLen, TextRange};

/// Recoverable errors returned by document edit entry points.
///
/// Contract violations (unknown ids, dangling merge pointers) are not
/// represented here; they panic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
	/// The document is flagged read-only.
	#[error("document is read-only")]
	ReadOnly,

	/// A range reaches past the end of the text.
	#[error("range {}..{} out of bounds for text of length {len}", range.start, range.end)]
	RangeOutOfBounds {
		/// The offending range.
		range: TextRange,
		/// Current text length.
		len: CharLen,
	},

	/// An offset lies past the end of the text.
	#[error("offset {offset} out of bounds for text of length {len}")]
	OffsetOutOfBounds {
		/// The offending offset.
		offset: CharIdx,
		/// Current text length.
		len: CharLen,
	},

	/// An operation was built against a text of a different length.
	#[error("operation expects text of length {expected}, document has {actual}")]
	LengthMismatch {
		/// Length the operation was built for.
		expected: CharLen,
		/// Length of the current text.
		actual: CharLen,
	},

	/// A replaced run of an operation differs from the document text it would remove.
	#[error("operation replaces text that differs from the document at offset {offset}")]
	ContentMismatch {
		/// Old-text offset of the first mismatching replacement.
		offset: CharIdx,
	},

	/// Two ranges passed to a bulk deletion overlap.
	#[error("ranges {}..{} and {}..{} overlap", first.start, first.end, second.start, second.end)]
	OverlappingRanges {
		/// The earlier range (by start).
		first: TextRange,
		/// The later range (by start).
		second: TextRange,
	},
}

/// Result of a committed edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitResult {
	/// Timestamp of the document before the edit.
	pub timestamp_before: u64,
	/// Timestamp assigned to this edit in the edit log.
	pub timestamp_after: u64,
	/// Pre-edit ranges touched by the operation.
	pub changed_ranges: Vec<TextRange>,
	/// Whether an undo step was recorded for this edit.
	pub undo_recorded: bool,
}
