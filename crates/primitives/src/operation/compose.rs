use std::collections::VecDeque;

use super::{Fragment, Operation, Step};
use crate::range::CharLen;

/// Fine-grained view of a step used while composing.
#[derive(Debug)]
enum Piece {
	Retain(CharLen),
	Delete(Fragment),
	Insert(Fragment),
}

fn pieces(op: Operation) -> VecDeque<Piece> {
	let mut out = VecDeque::with_capacity(op.steps.len() * 2);
	for step in op.steps {
		match step {
			Step::Retain(n) => out.push_back(Piece::Retain(n)),
			Step::Replace(r) => {
				if !r.deleted.is_empty() {
					out.push_back(Piece::Delete(r.deleted));
				}
				if !r.inserted.is_empty() {
					out.push_back(Piece::Insert(r.inserted));
				}
			}
		}
	}
	out
}

fn requeue_retain(queue: &mut VecDeque<Piece>, n: CharLen) {
	if n > 0 {
		queue.push_front(Piece::Retain(n));
	}
}

fn requeue_text(queue: &mut VecDeque<Piece>, text: Fragment, wrap: fn(Fragment) -> Piece) {
	if !text.is_empty() {
		queue.push_front(wrap(text));
	}
}

impl Operation {
	/// Composes two operations into a single equivalent operation.
	///
	/// The result applied to the old text of `self` yields the same text as
	/// applying `self` and then `other`.
	///
	/// # Panics
	///
	/// Panics if `self.len_after() != other.len_before()`.
	pub fn compose(self, other: Operation) -> Operation {
		assert_eq!(
			self.len_after, other.len_before,
			"composed operations must agree on the intermediate text length"
		);

		let mut result = Operation::default();
		let mut a = pieces(self);
		let mut b = pieces(other);

		loop {
			match (a.pop_front(), b.pop_front()) {
				(None, None) => break,
				(Some(Piece::Delete(text)), b_piece) => {
					result.delete(text);
					if let Some(piece) = b_piece {
						b.push_front(piece);
					}
				}
				(a_piece, Some(Piece::Insert(text))) => {
					result.insert(text);
					if let Some(piece) = a_piece {
						a.push_front(piece);
					}
				}
				(Some(Piece::Retain(n)), Some(Piece::Retain(m))) => {
					let len = n.min(m);
					result.retain(len);
					requeue_retain(&mut a, n - len);
					requeue_retain(&mut b, m - len);
				}
				(Some(Piece::Retain(n)), Some(Piece::Delete(mut text))) => {
					let len = n.min(text.char_len());
					result.delete(text.take_prefix(len));
					requeue_retain(&mut a, n - len);
					requeue_text(&mut b, text, Piece::Delete);
				}
				(Some(Piece::Insert(mut text)), Some(Piece::Retain(m))) => {
					let len = text.char_len().min(m);
					result.insert(text.take_prefix(len));
					requeue_text(&mut a, text, Piece::Insert);
					requeue_retain(&mut b, m - len);
				}
				(Some(Piece::Insert(mut inserted)), Some(Piece::Delete(mut deleted))) => {
					// Text inserted by `self` and deleted by `other` never existed.
					let len = inserted.char_len().min(deleted.char_len());
					inserted.take_prefix(len);
					deleted.take_prefix(len);
					requeue_text(&mut a, inserted, Piece::Insert);
					requeue_text(&mut b, deleted, Piece::Delete);
				}
				(a_piece, b_piece) => {
					unreachable!("operations out of step: {a_piece:?} vs {b_piece:?}")
				}
			}
		}

		result
	}

	/// Sequentially composes `ops`, left to right.
	///
	/// Each operation must apply to the text produced by the previous one.
	/// Returns `None` for an empty input.
	pub fn compose_all(ops: impl IntoIterator<Item = Operation>) -> Option<Operation> {
		ops.into_iter().reduce(Operation::compose)
	}
}
