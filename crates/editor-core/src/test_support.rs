//! Proptest strategies shared by the document and anchor tests.

use proptest::prelude::*;
use quire_primitives::{Operation, TextRange};

/// One random edit, resolved against whatever text it is applied to.
#[derive(Debug, Clone)]
pub(crate) struct EditPlan {
	pub start: usize,
	pub end: usize,
	pub text: String,
	pub delete_only: bool,
}

fn arb_edit_plan() -> impl Strategy<Value = EditPlan> {
	(any::<usize>(), any::<usize>(), "[A-Z]{0,4}", any::<bool>()).prop_map(|(start, end, text, delete_only)| EditPlan {
		start,
		end,
		text,
		delete_only,
	})
}

/// A short sequence of random edits.
pub(crate) fn arb_edit_plans() -> impl Strategy<Value = Vec<EditPlan>> {
	prop::collection::vec(arb_edit_plan(), 0..12)
}

/// A random text with a single range replacement over it.
pub(crate) fn arb_text_and_edit() -> impl Strategy<Value = (String, Operation)> {
	("[a-z]{0,30}", arb_edit_plan()).prop_map(|(text, plan)| {
		let len = text.chars().count();
		let (a, b) = (plan.start % (len + 1), plan.end % (len + 1));
		let op = Operation::replace_range(text.as_str(), TextRange::new(a.min(b), a.max(b)), &plan.text);
		(text, op)
	})
}
