//! Proptest strategies shared by the operation, caret and rebase tests.

use proptest::prelude::*;

use crate::operation::{Operation, Replace, Step};
use crate::range::TextRange;
use crate::text::TextSource;

/// One planned step: kind selector, length and inserted text.
pub(crate) type PlanStep = (u8, usize, String);

/// Lowercase ASCII text of variable length.
pub(crate) fn arb_text() -> impl Strategy<Value = String> {
	"[a-z]{0,40}"
}

fn arb_plan() -> impl Strategy<Value = Vec<PlanStep>> {
	prop::collection::vec((0u8..3, 0usize..8, "[A-Z]{0,4}"), 0..8)
}

/// Builds a well-formed operation over `text` by walking `plan` left to right.
///
/// Kind 0 retains, kind 1 replaces, kind 2 inserts. Whatever the plan does
/// not consume is retained at the end.
pub(crate) fn build_operation(text: &str, plan: &[PlanStep]) -> Operation {
	let len = text.char_count();
	let mut pos = 0;
	let mut steps = Vec::new();

	for (kind, n, insert) in plan {
		let n = (*n).min(len - pos);
		match kind {
			0 => steps.push(Step::Retain(n)),
			1 => {
				let deleted = text.substring(TextRange::new(pos, pos + n));
				steps.push(Step::Replace(Replace::new(deleted, insert.as_str())));
			}
			_ => {
				steps.push(Step::Replace(Replace::new("", insert.as_str())));
				continue;
			}
		}
		pos += n;
	}
	steps.push(Step::Retain(len - pos));
	Operation::from_steps(steps)
}

/// A random text with a random operation over it.
pub(crate) fn arb_text_and_operation() -> impl Strategy<Value = (String, Operation)> {
	(arb_text(), arb_plan()).prop_map(|(text, plan)| {
		let op = build_operation(&text, &plan);
		(text, op)
	})
}

/// A random text with several operations, each built against that same text.
pub(crate) fn arb_text_and_concurrent_operations(
	max_ops: usize,
) -> impl Strategy<Value = (String, Vec<Operation>)> {
	(arb_text(), prop::collection::vec(arb_plan(), 1..=max_ops)).prop_map(|(text, plans)| {
		let ops = plans.iter().map(|plan| build_operation(&text, plan)).collect();
		(text, ops)
	})
}
