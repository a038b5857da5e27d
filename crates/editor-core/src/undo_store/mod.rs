//! Undo history for document text.
//!
//! Stores operation deltas rather than text snapshots. The store never
//! touches the text itself: it hands back the operation to apply and the
//! document runs it through its normal commit pipeline, so carets, anchors
//! and components follow undo and redo like any other edit.


use quire_primitives::{Operation, Step};

/// Maximum undo memory usage in bytes (10MB).
pub const MAX_UNDO_BYTES: usize = 10 * 1024 * 1024;

/// A single step in the undo/redo history.
#[derive(Debug, Clone)]
pub struct UndoStep {
	/// Operation that redoes the edit.
	pub redo: Operation,
	/// Inverse operation that undoes it.
	pub undo: Operation,
	/// Approximate memory usage of this step in bytes.
	pub bytes: usize,
}

impl UndoStep {
	/// Creates a step for `op`, deriving its inverse.
	pub fn new(op: Operation) -> Self {
		let undo = op.invert();
		let bytes = approx_operation_bytes(&op);
		Self { redo: op, undo, bytes }
	}
}

/// Estimates the memory usage of an operation in bytes.
///
/// Counts the stored text on both sides of every replace plus a small
/// overhead. The inverse carries the same text, so it is counted once.
fn approx_operation_bytes(op: &Operation) -> usize {
	op.steps()
		.iter()
		.map(|step| match step {
			Step::Replace(r) => r.deleted.text().len() + r.inserted.text().len(),
			Step::Retain(_) => 0,
		})
		.sum::<usize>()
		+ 32
}

/// Bounded undo and redo stacks.
#[derive(Debug)]
pub struct UndoStore {
	undo_stack: Vec<UndoStep>,
	redo_stack: Vec<UndoStep>,
	undo_bytes: usize,
	max_steps: usize,
}

impl UndoStore {
	/// Creates an empty store keeping at most `max_steps` undo steps.
	pub fn new(max_steps: usize) -> Self {
		Self {
			undo_stack: Vec::new(),
			redo_stack: Vec::new(),
			undo_bytes: 0,
			max_steps,
		}
	}

	/// Returns whether undo is available.
	pub fn can_undo(&self) -> bool {
		!self.undo_stack.is_empty()
	}

	/// Returns whether redo is available.
	pub fn can_redo(&self) -> bool {
		!self.redo_stack.is_empty()
	}

	/// Returns the number of steps in the undo stack.
	pub fn undo_len(&self) -> usize {
		self.undo_stack.len()
	}

	/// Returns the number of steps in the redo stack.
	pub fn redo_len(&self) -> usize {
		self.redo_stack.len()
	}

	/// Records a committed edit.
	///
	/// Any new edit invalidates the redo stack. Enforces the step and byte
	/// limits by evicting the oldest steps. Returns false if nothing was
	/// kept because the store is configured with no history.
	pub fn record(&mut self, op: Operation) -> bool {
		self.redo_stack.clear();
		if self.max_steps == 0 {
			return false;
		}

		let step = UndoStep::new(op);
		self.undo_bytes += step.bytes;
		self.undo_stack.push(step);
		self.enforce_limits();
		true
	}

	/// Evicts oldest steps until limits are met.
	fn enforce_limits(&mut self) {
		while (self.undo_stack.len() > self.max_steps || self.undo_bytes > MAX_UNDO_BYTES)
			&& !self.undo_stack.is_empty()
		{
			let oldest = self.undo_stack.remove(0);
			self.undo_bytes = self.undo_bytes.saturating_sub(oldest.bytes);
			tracing::debug!(bytes = oldest.bytes, "evicted oldest undo step");
		}
	}

	/// Moves the newest step to the redo stack and returns its inverse.
	pub fn undo(&mut self) -> Option<Operation> {
		let step = self.undo_stack.pop()?;
		self.undo_bytes = self.undo_bytes.saturating_sub(step.bytes);
		let op = step.undo.clone();
		self.redo_stack.push(step);
		Some(op)
	}

	/// Moves the newest undone step back and returns the operation redoing it.
	pub fn redo(&mut self) -> Option<Operation> {
		let step = self.redo_stack.pop()?;
		let op = step.redo.clone();
		self.undo_bytes += step.bytes;
		self.undo_stack.push(step);
		self.enforce_limits();
		Some(op)
	}
}
