//! Carets and the immutable multi-caret store.
//!
//! A [`Caret`] is an identity plus a three-point position: selection start,
//! caret offset and selection end. [`MultiCaretData`] keeps many of them
//! ordered by offset, rebases them through edits and merges carets that
//! collide on the same offset.

mod multi;


pub use multi::MultiCaretData;

use crate::ids::CaretId;
use crate::operation::{Operation, Sticky};
use crate::range::{CharIdx, TextRange};

/// The three offsets of a caret.
///
/// Invariant: `selection_start <= offset <= selection_end`. Outside of merging,
/// `offset` sits at one end of the selection; the selection may be anchored
/// on either side of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CaretPosition {
	/// Caret offset.
	pub offset: CharIdx,
	/// Start of the selection (inclusive).
	pub selection_start: CharIdx,
	/// End of the selection (exclusive).
	pub selection_end: CharIdx,
}

impl CaretPosition {
	/// Creates a position, checking the ordering invariant.
	///
	/// # Panics
	///
	/// Panics unless `selection_start <= offset <= selection_end`.
	pub fn new(offset: CharIdx, selection_start: CharIdx, selection_end: CharIdx) -> Self {
		assert!(
			selection_start <= offset && offset <= selection_end,
			"caret offset {offset} outside selection {selection_start}..{selection_end}"
		);
		Self {
			offset,
			selection_start,
			selection_end,
		}
	}

	/// A caret at `offset` with no selection.
	pub fn point(offset: CharIdx) -> Self {
		Self::new(offset, offset, offset)
	}

	/// A selection from `anchor` to `head`, with the caret at `head`.
	pub fn selection(anchor: CharIdx, head: CharIdx) -> Self {
		Self::new(head, anchor.min(head), anchor.max(head))
	}

	/// The selected range.
	pub fn selection_range(&self) -> TextRange {
		TextRange::new(self.selection_start, self.selection_end)
	}

	/// True if some text is selected.
	pub fn has_selection(&self) -> bool {
		self.selection_start < self.selection_end
	}

	/// Maps all three points through `op` in a single pass.
	///
	/// Mapping is monotone, so the ordering invariant survives even when
	/// several points collapse onto the same replacement.
	pub fn map(&self, op: &Operation, sticky: Sticky) -> Self {
		let mut points = [self.selection_start, self.offset, self.selection_end];
		op.map_offsets(&mut points, sticky);
		let [selection_start, offset, selection_end] = points;
		Self {
			offset,
			selection_start,
			selection_end,
		}
	}

	/// Maps all three points through an arbitrary monotone offset function.
	pub fn map_with(&self, mut f: impl FnMut(CharIdx) -> CharIdx) -> Self {
		Self {
			selection_start: f(self.selection_start),
			offset: f(self.offset),
			selection_end: f(self.selection_end),
		}
	}

	/// Clamps all three points to `[0, len]`.
	pub fn clamp(&self, len: CharIdx) -> Self {
		self.map_with(|offset| offset.min(len))
	}
}

/// A caret with a stable identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Caret {
	/// Stable identity, unchanged by edits.
	pub id: CaretId,
	/// Where the caret and its selection are.
	pub position: CaretPosition,
	/// Cached virtual column for vertical movement.
	pub vcol: Option<u32>,
	/// Whether the caret is drawn.
	pub visible: bool,
}

impl Caret {
	/// Creates a visible caret with a freshly minted id.
	pub fn new(position: CaretPosition) -> Self {
		Self {
			id: CaretId::new(),
			position,
			vcol: None,
			visible: true,
		}
	}

	/// Sets the virtual column hint.
	pub fn with_vcol(mut self, vcol: u32) -> Self {
		self.vcol = Some(vcol);
		self
	}

	/// Sets visibility.
	pub fn with_visible(mut self, visible: bool) -> Self {
		self.visible = visible;
		self
	}

	/// Offset of the caret itself.
	#[inline]
	pub fn offset(&self) -> CharIdx {
		self.position.offset
	}
}
