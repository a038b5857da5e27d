//! Document - versioned text plus everything that tracks positions in it.
//!
//! A [`Document`] owns the text, its carets, anchors and range markers, and
//! the registered [`DocumentComponent`]s. Every text change goes through one
//! commit gate which keeps all of them consistent with the new text.
//!
//! # Commit pipeline
//!
//! 1. writable and bounds checks (nothing changes on error);
//! 2. the operation is applied to the text and the timestamp advances;
//! 3. the operation is appended to the [`EditLog`];
//! 4. undo history is recorded;
//! 5. carets, anchors and range markers are rebased;
//! 6. components receive `edit` in ascending order, then `on_commit`.

mod scope;

#[cfg(test)]
mod tests;

use std::sync::atomic::{AtomicU64, Ordering};

use quire_primitives::{
	AnchorId, CharIdx, CommitResult, EditError, Operation, RangeMarkerId, Rope, Sticky, TextRange,
};
pub use scope::MutationScope;

use crate::anchors::{AnchorLifetime, AnchorStore, RangeMarker};
use crate::carets::MultiCaret;
use crate::component::DocumentComponent;
use crate::edit_log::{EditLog, EditLogEntry, NoopEditLog};
use crate::options::DocumentOptions;
use crate::undo_store::UndoStore;

/// Counter for generating unique document IDs.
static NEXT_DOCUMENT_ID: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentId(pub u64);

impl DocumentId {
	/// Generates a new unique document ID.
	pub fn next() -> Self {
		Self(NEXT_DOCUMENT_ID.fetch_add(1, Ordering::Relaxed))
	}
}

/// How a commit interacts with undo history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum History {
	Record,
	Undo,
	Redo,
}

/// A versioned text document.
///
/// Single-writer: every mutator takes `&mut self`. Readers that need a
/// stable view take a [`Rope`] clone or a caret
/// [`snapshot`](MultiCaret::snapshot).
pub struct Document {
	/// Unique identifier for this document.
	pub id: DocumentId,

	content: Rope,
	readonly: bool,

	/// Timestamp of the last commit; strictly increasing.
	timestamp: u64,

	options: DocumentOptions,
	carets: MultiCaret,
	anchors: AnchorStore,

	/// Sorted by `order()`; ties keep registration order.
	components: Vec<Box<dyn DocumentComponent>>,
	edit_log: Box<dyn EditLog>,
	undo: UndoStore,
}

impl std::fmt::Debug for Document {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Document")
			.field("id", &self.id)
			.field("len", &self.content.len_chars())
			.field("timestamp", &self.timestamp)
			.field("readonly", &self.readonly)
			.field("carets", &self.carets.len())
			.field("components", &self.components.len())
			.finish_non_exhaustive()
	}
}

impl Document {
	/// Creates a document whose committed edits are not logged anywhere.
	pub fn new(text: &str, options: DocumentOptions) -> Self {
		Self::with_edit_log(text, options, NoopEditLog)
	}

	/// Creates a document that appends every committed edit to `edit_log`.
	pub fn with_edit_log(text: &str, options: DocumentOptions, edit_log: impl EditLog + 'static) -> Self {
		let content = Rope::from(text);
		let len = content.len_chars();
		Self {
			id: DocumentId::next(),
			content,
			readonly: false,
			timestamp: 0,
			undo: UndoStore::new(options.max_undo),
			options,
			carets: MultiCaret::new(len),
			anchors: AnchorStore::new(),
			components: Vec::new(),
			edit_log: Box::new(edit_log),
		}
	}

	/// Returns a reference to the document's text.
	pub fn content(&self) -> &Rope {
		&self.content
	}

	/// Length of the text in characters.
	pub fn len_chars(&self) -> usize {
		self.content.len_chars()
	}

	/// Timestamp of the latest commit, 0 before the first one.
	pub fn timestamp(&self) -> u64 {
		self.timestamp
	}

	/// The options this document was created with.
	pub fn options(&self) -> &DocumentOptions {
		&self.options
	}

	/// Returns whether the document is read-only.
	pub fn is_readonly(&self) -> bool {
		self.readonly
	}

	/// Sets the read-only flag.
	pub fn set_readonly(&mut self, readonly: bool) {
		self.readonly = readonly;
	}

	/// The document's carets.
	pub fn carets(&self) -> &MultiCaret {
		&self.carets
	}

	/// Mutable access to the document's carets.
	pub fn carets_mut(&mut self) -> &mut MultiCaret {
		&mut self.carets
	}

	/// Read access to anchors and range markers.
	pub fn anchors(&self) -> &AnchorStore {
		&self.anchors
	}

	/// Registers a component, keeping components sorted by `order()`.
	pub fn add_component(&mut self, component: Box<dyn DocumentComponent>) {
		let order = component.order();
		let at = self.components.partition_point(|c| c.order() <= order);
		self.components.insert(at, component);
	}

	/// Replaces `range` with `text`.
	///
	/// # Errors
	///
	/// Returns `EditError::ReadOnly` if the document is read-only and
	/// `EditError::RangeOutOfBounds` if `range` is inverted or reaches past the text.
	pub fn replace_range(&mut self, range: TextRange, text: &str) -> Result<CommitResult, EditError> {
		self.ensure_writable()?;
		self.check_range(range)?;
		let op = Operation::replace_range(&self.content, range, text);
		self.commit(op, History::Record)
	}

	/// Replaces the whole text.
	///
	/// With [`DocumentOptions::deduce_overwrite`] only the span between the
	/// common prefix and suffix is replaced, so positions outside it survive.
	///
	/// # Errors
	///
	/// Returns `EditError::ReadOnly` if the document is read-only.
	pub fn replace_all(&mut self, text: &str) -> Result<CommitResult, EditError> {
		self.ensure_writable()?;
		let op = Operation::overwrite(&self.content, text, self.options.deduce_overwrite);
		self.commit(op, History::Record)
	}

	/// Deletes every range in one edit. Ranges may come in any order.
	///
	/// # Errors
	///
	/// Returns `EditError::ReadOnly` if the document is read-only,
	/// `EditError::RangeOutOfBounds` for a range past the text and
	/// `EditError::OverlappingRanges` if two ranges share a character.
	pub fn delete_ranges(&mut self, ranges: &[TextRange]) -> Result<CommitResult, EditError> {
		self.ensure_writable()?;
		for range in ranges {
			self.check_range(*range)?;
		}

		let mut sorted = ranges.to_vec();
		sorted.sort_unstable();
		if let Some(pair) = sorted.windows(2).find(|pair| pair[0].overlaps(&pair[1])) {
			return Err(EditError::OverlappingRanges {
				first: pair[0],
				second: pair[1],
			});
		}

		let op = Operation::delete_ranges(&self.content, sorted);
		self.commit(op, History::Record)
	}

	/// Applies a prebuilt operation.
	///
	/// # Errors
	///
	/// Returns `EditError::ReadOnly` if the document is read-only,
	/// `EditError::LengthMismatch` if `op` was built for a different text length
	/// and `EditError::ContentMismatch` if a replaced run differs from the text.
	pub fn apply(&mut self, op: Operation) -> Result<CommitResult, EditError> {
		self.ensure_writable()?;
		if op.len_before() != self.content.len_chars() {
			return Err(EditError::LengthMismatch {
				expected: op.len_before(),
				actual: self.content.len_chars(),
			});
		}
		if let Some(offset) = op.first_mismatch(&self.content) {
			return Err(EditError::ContentMismatch { offset });
		}
		self.commit(op, History::Record)
	}

	/// Undoes the newest recorded edit.
	///
	/// Returns `Ok(None)` when there is nothing to undo.
	///
	/// # Errors
	///
	/// Returns `EditError::ReadOnly` if the document is read-only.
	pub fn undo(&mut self) -> Result<Option<CommitResult>, EditError> {
		self.ensure_writable()?;
		let Some(op) = self.undo.undo() else {
			return Ok(None);
		};
		self.commit(op, History::Undo).map(Some)
	}

	/// Redoes the newest undone edit.
	///
	/// Returns `Ok(None)` when there is nothing to redo.
	///
	/// # Errors
	///
	/// Returns `EditError::ReadOnly` if the document is read-only.
	pub fn redo(&mut self) -> Result<Option<CommitResult>, EditError> {
		self.ensure_writable()?;
		let Some(op) = self.undo.redo() else {
			return Ok(None);
		};
		self.commit(op, History::Redo).map(Some)
	}

	/// Returns whether undo is available.
	pub fn can_undo(&self) -> bool {
		self.undo.can_undo()
	}

	/// Returns whether redo is available.
	pub fn can_redo(&self) -> bool {
		self.undo.can_redo()
	}

	/// Returns the number of items in the undo stack.
	pub fn undo_len(&self) -> usize {
		self.undo.undo_len()
	}

	/// Returns the number of items in the redo stack.
	pub fn redo_len(&self) -> usize {
		self.undo.redo_len()
	}

	/// The single gate every text change passes through.
	///
	/// Callers have already validated `op` against the current text.
	fn commit(&mut self, op: Operation, history: History) -> Result<CommitResult, EditError> {
		debug_assert_eq!(op.len_before(), self.content.len_chars());

		let timestamp_before = self.timestamp;
		if op.is_identity() {
			return Ok(CommitResult {
				timestamp_before,
				timestamp_after: timestamp_before,
				changed_ranges: Vec::new(),
				undo_recorded: false,
			});
		}

		let changed_ranges = op.changed_ranges();
		let before = self.content.clone();
		op.apply(&mut self.content);
		self.timestamp += 1;

		self.edit_log.append(EditLogEntry {
			timestamp: self.timestamp,
			operation: op.clone(),
		});

		let undo_recorded = match history {
			History::Record => self.undo.record(op.clone()),
			History::Undo | History::Redo => false,
		};

		self.carets.rebase(&op, &self.options);
		self.anchors.rebase(&op);

		for component in &mut self.components {
			component.edit(&before, &self.content, &op);
		}
		for component in &mut self.components {
			component.on_commit();
		}

		tracing::debug!(
			doc = self.id.0,
			timestamp = self.timestamp,
			?history,
			changed = changed_ranges.len(),
			len = self.content.len_chars(),
			"committed edit"
		);

		Ok(CommitResult {
			timestamp_before,
			timestamp_after: self.timestamp,
			changed_ranges,
			undo_recorded,
		})
	}

	/// Checks if the document is writable, returning an error if readonly.
	fn ensure_writable(&self) -> Result<(), EditError> {
		if self.readonly {
			return Err(EditError::ReadOnly);
		}
		Ok(())
	}

	fn check_range(&self, range: TextRange) -> Result<(), EditError> {
		let len = self.content.len_chars();
		if !range.is_within(len) {
			return Err(EditError::RangeOutOfBounds { range, len });
		}
		Ok(())
	}

	fn check_offset(&self, offset: CharIdx) -> Result<(), EditError> {
		let len = self.content.len_chars();
		if offset > len {
			return Err(EditError::OffsetOutOfBounds { offset, len });
		}
		Ok(())
	}

	/// Creates an anchor at `offset`.
	///
	/// # Errors
	///
	/// Returns `EditError::OffsetOutOfBounds` if `offset` is past the text.
	pub fn create_anchor(
		&mut self,
		offset: CharIdx,
		sticky: Sticky,
		lifetime: AnchorLifetime,
	) -> Result<AnchorId, EditError> {
		self.check_offset(offset)?;
		Ok(self.anchors.create_anchor(offset, sticky, lifetime))
	}

	/// Removes an anchor. Returns false if it did not exist.
	pub fn remove_anchor(&mut self, id: AnchorId) -> bool {
		self.anchors.remove_anchor(id).is_some()
	}

	/// Current offset of an anchor.
	///
	/// # Panics
	///
	/// Panics if `id` is unknown or the anchor was removed.
	pub fn anchor_offset(&self, id: AnchorId) -> CharIdx {
		self.try_anchor_offset(id)
			.unwrap_or_else(|| panic!("unknown anchor id {id}"))
	}

	/// Current offset of an anchor, `None` if it is unknown.
	pub fn try_anchor_offset(&self, id: AnchorId) -> Option<CharIdx> {
		self.anchors.anchor(id).map(|anchor| anchor.offset)
	}

	/// Creates a range marker over `range`.
	///
	/// # Errors
	///
	/// Returns `EditError::RangeOutOfBounds` if `range` reaches past the text.
	pub fn create_range_marker(
		&mut self,
		range: TextRange,
		greedy_left: bool,
		greedy_right: bool,
	) -> Result<RangeMarkerId, EditError> {
		self.check_range(range)?;
		Ok(self.anchors.create_range_marker(range, greedy_left, greedy_right))
	}

	/// Removes a range marker. Returns false if it did not exist.
	pub fn remove_range_marker(&mut self, id: RangeMarkerId) -> bool {
		self.anchors.remove_range_marker(id).is_some()
	}

	/// Looks up a range marker.
	pub fn range_marker(&self, id: RangeMarkerId) -> Option<&RangeMarker> {
		self.anchors.range_marker(id)
	}

	/// Overwrites anchor offsets and range-marker ranges computed elsewhere.
	///
	/// `ids[i]` moves to `offsets[i]` and `range_ids[i]` to `ranges[i]`.
	/// Everything is validated before anything is written.
	///
	/// # Errors
	///
	/// Returns `EditError::OffsetOutOfBounds` or `EditError::RangeOutOfBounds`
	/// if a new position lies past the text; nothing is updated then.
	///
	/// # Panics
	///
	/// Panics if paired slices differ in length or an id is unknown.
	pub fn batch_update_anchors(
		&mut self,
		ids: &[AnchorId],
		offsets: &[CharIdx],
		range_ids: &[RangeMarkerId],
		ranges: &[TextRange],
	) -> Result<(), EditError> {
		assert_eq!(ids.len(), offsets.len(), "anchor ids and offsets differ in length");
		assert_eq!(range_ids.len(), ranges.len(), "range marker ids and ranges differ in length");

		for id in ids {
			assert!(self.anchors.anchor(*id).is_some(), "unknown anchor id {id}");
		}
		for id in range_ids {
			assert!(self.anchors.range_marker(*id).is_some(), "unknown range marker id {id}");
		}
		for offset in offsets {
			self.check_offset(*offset)?;
		}
		for range in ranges {
			self.check_range(*range)?;
		}

		for (id, offset) in ids.iter().zip(offsets) {
			self.anchors.set_anchor_offset(*id, *offset);
		}
		for (id, range) in range_ids.iter().zip(ranges) {
			self.anchors.set_marker_range(*id, *range);
		}
		Ok(())
	}

	/// Opens a scope whose anchors are removed when it ends.
	///
	/// The returned guard derefs to the document.
	pub fn mutation_scope(&mut self) -> MutationScope<'_> {
		MutationScope::new(self)
	}

	pub(crate) fn anchors_mut(&mut self) -> &mut AnchorStore {
		&mut self.anchors
	}
}
