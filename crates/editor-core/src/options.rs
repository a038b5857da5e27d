//! Per-document behaviour switches.

use serde::Deserialize;

/// Default bound on recorded undo steps.
pub const DEFAULT_MAX_UNDO: usize = 100;

/// Options controlling how a [`Document`](crate::Document) commits edits.
///
/// Deserializes from kebab-case keys; missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct DocumentOptions {
	/// Narrow whole-text replacements to the region that actually changed,
	/// so anchors outside it keep their positions.
	pub deduce_overwrite: bool,
	/// Merge carets that land on the same offset after an edit.
	pub merge_carets_on_edit: bool,
	/// Keep cached virtual columns across edits.
	pub preserve_vcol: bool,
	/// Maximum number of undo steps kept.
	pub max_undo: usize,
}

impl Default for DocumentOptions {
	fn default() -> Self {
		Self {
			deduce_overwrite: true,
			merge_carets_on_edit: true,
			preserve_vcol: false,
			max_undo: DEFAULT_MAX_UNDO,
		}
	}
}
