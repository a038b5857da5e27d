//! Mutable caret set owned by a document.

use quire_primitives::{Caret, CaretId, CaretPosition, CharLen, MultiCaretData, Operation};
use smallvec::SmallVec;

use crate::options::DocumentOptions;

/// The document's carets.
///
/// Wraps an immutable [`MultiCaretData`] and swaps in a new snapshot on every
/// change, so a [`snapshot`](Self::snapshot) handed out earlier is never
/// affected. Positions are kept within the document length; anything placed
/// past it is clamped (and logged).
#[derive(Debug, Clone)]
pub struct MultiCaret {
	data: MultiCaretData,
	text_len: CharLen,
}

impl MultiCaret {
	pub(crate) fn new(text_len: CharLen) -> Self {
		Self {
			data: MultiCaretData::new(),
			text_len,
		}
	}

	/// The current caret state.
	pub fn data(&self) -> &MultiCaretData {
		&self.data
	}

	/// An owned copy of the current caret state.
	pub fn snapshot(&self) -> MultiCaretData {
		self.data.clone()
	}

	/// Carets in ascending offset order.
	pub fn carets(&self) -> &[Caret] {
		self.data.carets()
	}

	/// Number of live carets.
	pub fn len(&self) -> usize {
		self.data.len()
	}

	/// True if there are no carets.
	pub fn is_empty(&self) -> bool {
		self.data.is_empty()
	}

	/// The caret representing `id`, following merges.
	///
	/// # Panics
	///
	/// Panics if `id` was never registered or has been removed.
	pub fn caret(&self, id: CaretId) -> &Caret {
		self.data.caret(id)
	}

	/// Adds one visible caret per position and returns their ids.
	///
	/// Carets landing on an existing offset are merged; their ids keep
	/// resolving to the surviving caret.
	pub fn add_carets(&mut self, positions: impl IntoIterator<Item = CaretPosition>) -> SmallVec<[CaretId; 4]> {
		let carets: SmallVec<[Caret; 4]> = positions.into_iter().map(Caret::new).collect();
		let ids = carets.iter().map(|caret| caret.id).collect();
		self.data = self
			.data
			.add_carets(carets)
			.ensure_valid_offsets(self.text_len)
			.merge_coinciding_carets();
		ids
	}

	/// Removes carets by id.
	///
	/// # Panics
	///
	/// Panics if a caret merged into a removed one is not removed with it.
	pub fn remove_carets(&mut self, ids: impl IntoIterator<Item = CaretId>) {
		self.data = self.data.remove_carets(ids);
	}

	/// Moves carets to new positions, then re-sorts and merges coinciding ones.
	///
	/// # Panics
	///
	/// Panics if an id does not resolve to a caret.
	pub fn move_carets(&mut self, moves: impl IntoIterator<Item = (CaretId, CaretPosition)>) {
		self.data = self
			.data
			.move_carets(moves)
			.ensure_valid_offsets(self.text_len)
			.merge_coinciding_carets();
	}

	/// Rebases every caret through a committed edit.
	pub(crate) fn rebase(&mut self, op: &Operation, options: &DocumentOptions) {
		self.text_len = op.len_after();
		let mut data = self
			.data
			.edit(op, options.preserve_vcol)
			.ensure_valid_offsets(self.text_len);
		if options.merge_carets_on_edit {
			data = data.merge_coinciding_carets();
		}
		self.data = data;
	}
}
