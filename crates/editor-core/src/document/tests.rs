use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use parking_lot::Mutex;
use proptest::prelude::*;
use quire_primitives::{CaretPosition, EditError, Operation, Rope, Sticky, TextRange};

use super::Document;
use crate::anchors::AnchorLifetime;
use crate::component::DocumentComponent;
use crate::edit_log::SharedEditLog;
use crate::options::DocumentOptions;
use crate::test_support::{EditPlan, arb_edit_plans};

fn doc(text: &str) -> Document {
	Document::new(text, DocumentOptions::default())
}

/// Records every callback it receives into a shared journal.
struct Recorder {
	name: &'static str,
	order: i32,
	journal: Arc<Mutex<Vec<String>>>,
}

impl DocumentComponent for Recorder {
	fn order(&self) -> i32 {
		self.order
	}

	fn edit(&mut self, before: &Rope, after: &Rope, _operation: &Operation) {
		self.journal.lock().push(format!("{} edit {before} -> {after}", self.name));
	}

	fn on_commit(&mut self) {
		self.journal.lock().push(format!("{} commit", self.name));
	}
}

#[test]
fn replace_range_commits_and_logs() {
	let log = SharedEditLog::new();
	let mut doc = Document::with_edit_log("hello world", DocumentOptions::default(), log.clone());

	let result = doc.replace_range(TextRange::new(0, 5), "howdy").unwrap();
	assert_eq!(doc.content().to_string(), "howdy world");
	assert_eq!(result.timestamp_before, 0);
	assert_eq!(result.timestamp_after, 1);
	assert_eq!(result.changed_ranges, vec![TextRange::new(0, 5)]);
	assert!(result.undo_recorded);

	let entries = log.entries();
	assert_eq!(entries.len(), 1);
	assert_eq!(entries[0].timestamp, 1);
	assert_eq!(entries[0].operation.apply_to_string("hello world"), "howdy world");
}

#[test]
fn readonly_document_rejects_edits() {
	let mut doc = doc("hello");
	doc.set_readonly(true);

	assert_eq!(doc.replace_range(TextRange::new(0, 5), "world"), Err(EditError::ReadOnly));
	assert_eq!(doc.replace_all("world"), Err(EditError::ReadOnly));
	assert_eq!(doc.delete_ranges(&[TextRange::new(0, 1)]), Err(EditError::ReadOnly));
	assert_eq!(doc.undo(), Err(EditError::ReadOnly));
	assert_eq!(doc.content().to_string(), "hello");
	assert_eq!(doc.timestamp(), 0);
}

#[test]
fn out_of_bounds_range_is_rejected() {
	let mut doc = doc("hello");
	let err = doc.replace_range(TextRange::new(3, 9), "x").unwrap_err();
	assert_eq!(
		err,
		EditError::RangeOutOfBounds {
			range: TextRange::new(3, 9),
			len: 5
		}
	);
}

#[test]
fn inverted_ranges_are_rejected_everywhere() {
	let mut doc = doc("hello world");
	let inverted = TextRange { start: 5, end: 2 };
	let err = EditError::RangeOutOfBounds {
		range: inverted,
		len: 11,
	};

	assert_eq!(doc.replace_range(inverted, "x").unwrap_err(), err);
	assert_eq!(doc.delete_ranges(&[inverted]).unwrap_err(), err);
	assert_eq!(doc.create_range_marker(inverted, false, false).unwrap_err(), err);

	let marker = doc.create_range_marker(TextRange::new(0, 5), false, false).unwrap();
	assert_eq!(doc.batch_update_anchors(&[], &[], &[marker], &[inverted]).unwrap_err(), err);
	assert_eq!(doc.range_marker(marker).unwrap().range, TextRange::new(0, 5));
	assert_eq!(doc.content().to_string(), "hello world");
	assert_eq!(doc.timestamp(), 0);
}

#[test]
fn delete_ranges_accepts_any_order() {
	let mut doc = doc("0123456789");
	doc.delete_ranges(&[TextRange::new(7, 9), TextRange::new(1, 3)]).unwrap();
	assert_eq!(doc.content().to_string(), "034569");
}

#[test]
fn delete_ranges_rejects_overlap_without_editing() {
	let mut doc = doc("0123456789");
	let err = doc
		.delete_ranges(&[TextRange::new(4, 8), TextRange::new(2, 5)])
		.unwrap_err();
	assert_eq!(
		err,
		EditError::OverlappingRanges {
			first: TextRange::new(2, 5),
			second: TextRange::new(4, 8)
		}
	);
	assert_eq!(doc.content().to_string(), "0123456789");
}

#[test]
fn apply_checks_operation_length() {
	let mut doc = doc("abc");
	let op = Operation::identity(4);
	assert_eq!(
		doc.apply(op),
		Err(EditError::LengthMismatch {
			expected: 4,
			actual: 3
		})
	);
}

#[test]
fn apply_rejects_operation_built_for_other_text() {
	let log = SharedEditLog::new();
	let mut doc = Document::with_edit_log("hello world", DocumentOptions::default(), log.clone());
	let stale = Operation::replace_range("jello world", TextRange::new(0, 1), "y");

	assert_eq!(doc.apply(stale), Err(EditError::ContentMismatch { offset: 0 }));
	assert_eq!(doc.content().to_string(), "hello world");
	assert_eq!(doc.timestamp(), 0);
	assert!(log.is_empty());
	assert!(!doc.can_undo());

	let fresh = Operation::replace_range("hello world", TextRange::new(0, 1), "y");
	doc.apply(fresh).unwrap();
	doc.undo().unwrap();
	assert_eq!(doc.content().to_string(), "hello world");
}

#[test]
fn identity_edit_is_not_committed() {
	let log = SharedEditLog::new();
	let mut doc = Document::with_edit_log("same", DocumentOptions::default(), log.clone());

	let result = doc.replace_all("same").unwrap();
	assert_eq!(result.timestamp_after, result.timestamp_before);
	assert!(!result.undo_recorded);
	assert!(log.is_empty());
	assert!(!doc.can_undo());
}

#[test]
fn replace_all_with_deduce_keeps_outside_anchors() {
	let text = "fn main() { body }";
	let mut deduced = doc(text);
	let head = deduced.create_anchor(3, Sticky::Left, AnchorLifetime::Document).unwrap();
	let tail = deduced.create_anchor(17, Sticky::Left, AnchorLifetime::Document).unwrap();
	deduced.replace_all("fn main() { other body }").unwrap();
	assert_eq!(deduced.anchor_offset(head), 3);
	assert_eq!(deduced.anchor_offset(tail), 23);

	let options = DocumentOptions {
		deduce_overwrite: false,
		..DocumentOptions::default()
	};
	let mut blunt = Document::new(text, options);
	let head = blunt.create_anchor(3, Sticky::Left, AnchorLifetime::Document).unwrap();
	blunt.replace_all("fn main() { other body }").unwrap();
	assert_eq!(blunt.anchor_offset(head), 0);
}

#[test]
fn insertion_keeps_caret_before_inserted_text() {
	let mut doc = doc("hello world");
	let ids = doc.carets_mut().add_carets([CaretPosition::point(5)]);
	doc.replace_range(TextRange::empty(5), " there").unwrap();

	assert_eq!(doc.content().to_string(), "hello there world");
	assert_eq!(doc.carets().caret(ids[0]).offset(), 5);
}

#[test]
fn edits_merge_carets_that_collide() {
	let mut doc = doc("0123456789");
	let ids = doc
		.carets_mut()
		.add_carets([CaretPosition::point(2), CaretPosition::point(6)]);
	let snapshot = doc.carets().snapshot();

	doc.delete_ranges(&[TextRange::new(2, 6)]).unwrap();
	assert_eq!(doc.carets().len(), 1);
	assert_eq!(doc.carets().caret(ids[1]).id, ids[0]);
	assert_eq!(snapshot.len(), 2, "earlier snapshot is unaffected");
}

#[test]
fn merging_on_edit_can_be_disabled() {
	let options = DocumentOptions {
		merge_carets_on_edit: false,
		..DocumentOptions::default()
	};
	let mut doc = Document::new("0123456789", options);
	doc.carets_mut()
		.add_carets([CaretPosition::point(2), CaretPosition::point(6)]);
	doc.delete_ranges(&[TextRange::new(2, 6)]).unwrap();
	assert_eq!(doc.carets().len(), 2);
}

#[test]
fn carets_placed_past_the_end_are_clamped() {
	let mut doc = doc("abc");
	let ids = doc.carets_mut().add_carets([CaretPosition::selection(1, 40)]);
	assert_eq!(doc.carets().caret(ids[0]).position, CaretPosition::new(3, 1, 3));
}

#[test]
fn components_run_in_order_then_commit() {
	let journal = Arc::new(Mutex::new(Vec::new()));
	let mut doc = doc("ab");
	for (name, order) in [("late", 10), ("early", -5), ("late2", 10)] {
		doc.add_component(Box::new(Recorder {
			name,
			order,
			journal: journal.clone(),
		}));
	}

	doc.replace_range(TextRange::empty(2), "c").unwrap();
	assert_eq!(
		*journal.lock(),
		vec![
			"early edit ab -> abc",
			"late edit ab -> abc",
			"late2 edit ab -> abc",
			"early commit",
			"late commit",
			"late2 commit",
		]
	);
}

#[test]
fn undo_and_redo_rebase_observers() {
	let log = SharedEditLog::new();
	let mut doc = Document::with_edit_log("hello", DocumentOptions::default(), log.clone());
	let anchor = doc.create_anchor(5, Sticky::Left, AnchorLifetime::Document).unwrap();
	let carets = doc.carets_mut().add_carets([CaretPosition::point(5)]);

	doc.replace_range(TextRange::empty(0), ">> ").unwrap();
	assert_eq!(doc.anchor_offset(anchor), 8);

	let undone = doc.undo().unwrap().unwrap();
	assert!(!undone.undo_recorded);
	assert_eq!(doc.content().to_string(), "hello");
	assert_eq!(doc.anchor_offset(anchor), 5);
	assert_eq!(doc.carets().caret(carets[0]).offset(), 5);
	assert!(doc.can_redo());

	doc.redo().unwrap().unwrap();
	assert_eq!(doc.content().to_string(), ">> hello");
	assert_eq!(doc.anchor_offset(anchor), 8);
	assert_eq!(log.len(), 3);
	assert_eq!(log.last_timestamp(), Some(doc.timestamp()));

	doc.replace_range(TextRange::empty(0), "!").unwrap();
	assert!(!doc.can_redo());
	assert_eq!(doc.undo_len(), 2);
}

#[test]
fn undo_on_fresh_document_is_none() {
	let mut doc = doc("x");
	assert_eq!(doc.undo(), Ok(None));
	assert_eq!(doc.redo(), Ok(None));
}

#[test]
fn range_markers_follow_edits() {
	let mut doc = doc("let x = 1;");
	let marker = doc.create_range_marker(TextRange::new(4, 5), true, true).unwrap();
	doc.replace_range(TextRange::empty(5), "yz").unwrap();
	assert_eq!(doc.range_marker(marker).unwrap().range, TextRange::new(4, 7));

	assert!(doc.remove_range_marker(marker));
	assert!(doc.range_marker(marker).is_none());
	assert!(doc.create_range_marker(TextRange::new(0, 99), false, false).is_err());
}

#[test]
fn anchors_reject_out_of_bounds_offsets() {
	let mut doc = doc("abc");
	assert_eq!(
		doc.create_anchor(4, Sticky::Left, AnchorLifetime::Document),
		Err(EditError::OffsetOutOfBounds { offset: 4, len: 3 })
	);
}

#[test]
#[should_panic(expected = "unknown anchor id")]
fn removed_anchor_cannot_be_resolved() {
	let mut doc = doc("abc");
	let id = doc.create_anchor(1, Sticky::Left, AnchorLifetime::Document).unwrap();
	assert!(doc.remove_anchor(id));
	let _ = doc.anchor_offset(id);
}

#[test]
fn batch_update_validates_before_writing() {
	let mut doc = doc("0123456789");
	let a = doc.create_anchor(1, Sticky::Left, AnchorLifetime::Document).unwrap();
	let b = doc.create_anchor(2, Sticky::Left, AnchorLifetime::Document).unwrap();
	let m = doc.create_range_marker(TextRange::new(0, 1), false, false).unwrap();

	let err = doc
		.batch_update_anchors(&[a, b], &[5, 11], &[m], &[TextRange::new(3, 4)])
		.unwrap_err();
	assert_eq!(err, EditError::OffsetOutOfBounds { offset: 11, len: 10 });
	assert_eq!(doc.anchor_offset(a), 1);
	assert_eq!(doc.range_marker(m).unwrap().range, TextRange::new(0, 1));

	doc.batch_update_anchors(&[a, b], &[5, 10], &[m], &[TextRange::new(3, 4)])
		.unwrap();
	assert_eq!(doc.anchor_offset(a), 5);
	assert_eq!(doc.anchor_offset(b), 10);
	assert_eq!(doc.range_marker(m).unwrap().range, TextRange::new(3, 4));
}

#[test]
#[should_panic(expected = "differ in length")]
fn batch_update_requires_paired_slices() {
	let mut doc = doc("abc");
	let a = doc.create_anchor(1, Sticky::Left, AnchorLifetime::Document).unwrap();
	let _ = doc.batch_update_anchors(&[a], &[], &[], &[]);
}

#[test]
fn mutation_scope_releases_its_anchors() {
	let mut doc = doc("abcdef");
	let kept = doc.create_anchor(0, Sticky::Left, AnchorLifetime::Document).unwrap();
	{
		let mut scope = doc.mutation_scope();
		let temp = scope.anchor(3, Sticky::Right).unwrap();
		scope.replace_range(TextRange::empty(3), "XY").unwrap();
		assert_eq!(scope.anchor_offset(temp), 5);
		assert_eq!(scope.anchors().count_with_lifetime(AnchorLifetime::Mutation), 1);
	}
	assert_eq!(doc.anchors().count_with_lifetime(AnchorLifetime::Mutation), 0);
	assert_eq!(doc.try_anchor_offset(kept), Some(0));
}

#[test]
fn mutation_scope_releases_on_unwind() {
	let mut doc = doc("abcdef");
	let result = catch_unwind(AssertUnwindSafe(|| {
		let mut scope = doc.mutation_scope();
		scope.anchor(2, Sticky::Left).unwrap();
		panic!("edit failed midway");
	}));
	assert!(result.is_err());
	assert_eq!(doc.anchors().anchor_count(), 0);
}

fn run_plan(doc: &mut Document, plan: &EditPlan) {
	let len = doc.len_chars();
	let a = plan.start % (len + 1);
	let b = plan.end % (len + 1);
	let range = TextRange::new(a.min(b), a.max(b));
	let result = if plan.delete_only {
		doc.delete_ranges(&[range])
	} else {
		doc.replace_range(range, &plan.text)
	};
	assert!(result.is_ok());
}

proptest! {
	/// Undoing every edit restores the original text, and observers never
	/// leave the text bounds along the way.
	#[test]
	fn prop_undo_all_restores_text(text in "[a-z]{0,20}", plans in arb_edit_plans()) {
		let mut doc = doc(&text);
		doc.carets_mut().add_carets([CaretPosition::point(0), CaretPosition::point(text.len())]);
		doc.create_anchor(text.len() / 2, Sticky::Right, AnchorLifetime::Document).unwrap();

		for plan in &plans {
			run_plan(&mut doc, plan);
			prop_assert!(doc.anchors().all_within(doc.len_chars()));
			for caret in doc.carets().carets() {
				prop_assert!(caret.position.selection_end <= doc.len_chars());
			}
		}

		while doc.can_undo() {
			doc.undo().unwrap();
		}
		prop_assert_eq!(doc.content().to_string(), text);
	}
}
