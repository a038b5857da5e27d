//! Extension contract for subsystems that follow a document's edits.

use quire_primitives::{Operation, Rope};

/// A subsystem notified of every committed edit.
///
/// Components run in ascending [`order`](Self::order); components with
/// equal order run in registration order. For each commit every component
/// first receives [`edit`](Self::edit), then every component receives
/// [`on_commit`](Self::on_commit).
pub trait DocumentComponent: Send {
	/// Position in the notification sequence.
	fn order(&self) -> i32;

	/// Called with the text before and after `operation` was applied.
	fn edit(&mut self, before: &Rope, after: &Rope, operation: &Operation);

	/// Called once all components have seen the edit.
	fn on_commit(&mut self) {}
}
