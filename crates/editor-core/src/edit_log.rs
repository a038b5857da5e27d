//! Append-only sink for committed operations.

use std::sync::Arc;

use parking_lot::Mutex;
use quire_primitives::Operation;

/// One committed edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditLogEntry {
	/// Document timestamp assigned to the edit; strictly increasing.
	pub timestamp: u64,
	/// The operation as applied.
	pub operation: Operation,
}

/// Receives every operation a document commits, in commit order.
///
/// The document never reads entries back.
pub trait EditLog: Send {
	/// Appends one committed edit.
	fn append(&mut self, entry: EditLogEntry);
}

/// Discards every entry.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEditLog;

impl EditLog for NoopEditLog {
	fn append(&mut self, _entry: EditLogEntry) {}
}

/// An in-memory log whose clones all observe the same entries.
#[derive(Debug, Clone, Default)]
pub struct SharedEditLog {
	entries: Arc<Mutex<Vec<EditLogEntry>>>,
}

impl SharedEditLog {
	/// Creates an empty log.
	pub fn new() -> Self {
		Self::default()
	}

	/// Copies out the entries appended so far.
	pub fn entries(&self) -> Vec<EditLogEntry> {
		self.entries.lock().clone()
	}

	/// Number of entries.
	pub fn len(&self) -> usize {
		self.entries.lock().len()
	}

	/// True if nothing was appended yet.
	pub fn is_empty(&self) -> bool {
		self.entries.lock().is_empty()
	}

	/// Timestamp of the newest entry.
	pub fn last_timestamp(&self) -> Option<u64> {
		self.entries.lock().last().map(|entry| entry.timestamp)
	}
}

impl EditLog for SharedEditLog {
	fn append(&mut self, entry: EditLogEntry) {
		let mut entries = self.entries.lock();
		debug_assert!(
			entries.last().is_none_or(|last| last.timestamp < entry.timestamp),
			"edit log timestamps must increase"
		);
		entries.push(entry);
	}
}
