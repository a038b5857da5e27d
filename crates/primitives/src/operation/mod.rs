//! Retain/replace operations describing one text version's transformation into the next.
//!
//! An [`Operation`] is an ordered list of [`Step`]s. Every step consumes a run of
//! the old text: [`Step::Retain`] keeps it, [`Step::Replace`] swaps a known run
//! of old text for new text. Operations are immutable values; they are built
//! through the constructors in this module and combined with [`Operation::compose`].
//!
//! # Position mapping
//!
//! [`Operation::map_offset`] rebases an old offset into the new text. With `p`
//! the old start of a replacement, `d` its deleted length and `i` its
//! inserted length:
//!
//! - offsets inside retained text shift by the net delta of earlier steps;
//! - for a pure insertion (`d == 0`) at `p`, [`Sticky::Left`] stays before the
//!   inserted text and [`Sticky::Right`] moves after it;
//! - offsets in `[p, p + d)` collapse to the start of the replacement;
//! - `p + d` maps to just after the replacement.

mod compose;
mod construct;
mod types;


use ropey::Rope;
pub use types::{Fragment, Replace, Step, Sticky};

use crate::range::{CharIdx, CharLen, TextRange};
use crate::text::TextSource;

/// A composable retain/replace sequence from one text version to the next.
///
/// Invariant: the retained spans and replaced (`deleted`) spans, in order,
/// tile the old text exactly. Steps are kept canonical: no empty steps,
/// no two adjacent retains and no two adjacent replaces.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Operation {
	steps: Vec<Step>,
	len_before: CharLen,
	len_after: CharLen,
}

impl Operation {
	/// An operation that keeps all `len` characters untouched.
	pub fn identity(len: CharLen) -> Self {
		let mut op = Self::default();
		op.retain(len);
		op
	}

	/// Builds an operation from raw steps, normalizing them.
	///
	/// Empty steps are dropped and adjacent steps of the same kind merged.
	pub fn from_steps(steps: impl IntoIterator<Item = Step>) -> Self {
		let mut op = Self::default();
		for step in steps {
			match step {
				Step::Retain(n) => op.retain(n),
				Step::Replace(r) => op.replace(r.deleted, r.inserted),
			}
		}
		op
	}

	/// Length of the text this operation applies to.
	pub fn len_before(&self) -> CharLen {
		self.len_before
	}

	/// Length of the text this operation produces.
	pub fn len_after(&self) -> CharLen {
		self.len_after
	}

	/// The canonical step list.
	pub fn steps(&self) -> &[Step] {
		&self.steps
	}

	/// True if applying this operation leaves the text unchanged.
	pub fn is_identity(&self) -> bool {
		self.steps.iter().all(|s| matches!(s, Step::Retain(_)))
	}

	/// Appends a retain step.
	///
	/// Consecutive retains are merged.
	pub(crate) fn retain(&mut self, n: CharLen) {
		if n == 0 {
			return;
		}

		self.len_before += n;
		self.len_after += n;

		if let Some(Step::Retain(count)) = self.steps.last_mut() {
			*count += n;
		} else {
			self.steps.push(Step::Retain(n));
		}
	}

	/// Appends a replace step.
	///
	/// Consecutive replaces are merged into one: deleted runs and inserted
	/// runs are each concatenated in order.
	pub(crate) fn replace(&mut self, deleted: Fragment, inserted: Fragment) {
		if deleted.is_empty() && inserted.is_empty() {
			return;
		}

		self.len_before += deleted.char_len();
		self.len_after += inserted.char_len();

		if let Some(Step::Replace(prev)) = self.steps.last_mut() {
			prev.deleted.push(&deleted);
			prev.inserted.push(&inserted);
		} else {
			self.steps.push(Step::Replace(Replace { deleted, inserted }));
		}
	}

	/// Appends a deletion of `text`.
	pub(crate) fn delete(&mut self, text: Fragment) {
		self.replace(text, Fragment::default());
	}

	/// Appends an insertion of `text`.
	pub(crate) fn insert(&mut self, text: Fragment) {
		self.replace(Fragment::default(), text);
	}

	/// Applies this operation to a rope in place.
	///
	/// # Panics
	///
	/// Panics if the rope is shorter than [`len_before`](Self::len_before).
	/// Debug builds also verify that every replaced run matches the text it removes.
	pub fn apply(&self, doc: &mut Rope) {
		debug_assert_eq!(doc.len_chars(), self.len_before, "operation applied to wrong text");

		let mut pos = 0;
		for step in &self.steps {
			match step {
				Step::Retain(n) => pos += n,
				Step::Replace(r) => {
					let end = pos + r.deleted.char_len();
					debug_assert_eq!(
						doc.slice(pos..end).to_string(),
						r.deleted.text(),
						"replaced text does not match at {pos}"
					);
					doc.remove(pos..end);
					doc.insert(pos, r.inserted.text());
					pos += r.inserted.char_len();
				}
			}
		}
	}

	/// Old-text offset of the first replacement whose `deleted` run differs
	/// from `text`, or `None` when every replaced run matches.
	///
	/// # Panics
	///
	/// Panics if `text` is shorter than [`len_before`](Self::len_before).
	pub fn first_mismatch<T: TextSource + ?Sized>(&self, text: &T) -> Option<CharIdx> {
		let mut pos = 0;
		for step in &self.steps {
			match step {
				Step::Retain(n) => pos += n,
				Step::Replace(r) => {
					let end = pos + r.deleted.char_len();
					if !r.deleted.is_empty() && text.substring(TextRange::new(pos, end)) != r.deleted.text() {
						return Some(pos);
					}
					pos = end;
				}
			}
		}
		None
	}

	/// Applies this operation to a string slice, returning the new text.
	pub fn apply_to_string(&self, text: &str) -> String {
		let mut rope = Rope::from(text);
		self.apply(&mut rope);
		rope.to_string()
	}

	/// Creates the operation that undoes this one.
	///
	/// Replacements carry their deleted text, so no base text is needed.
	pub fn invert(&self) -> Operation {
		let mut result = Operation::default();
		for step in &self.steps {
			match step {
				Step::Retain(n) => result.retain(*n),
				Step::Replace(r) => result.replace(r.inserted.clone(), r.deleted.clone()),
			}
		}
		result
	}

	/// Pre-edit ranges touched by this operation.
	///
	/// Pure insertions produce empty ranges; touching ranges are merged.
	pub fn changed_ranges(&self) -> Vec<TextRange> {
		let mut ranges: Vec<TextRange> = Vec::new();
		let mut pos = 0;

		for step in &self.steps {
			match step {
				Step::Retain(n) => pos += n,
				Step::Replace(r) => {
					let range = TextRange::new(pos, pos + r.deleted.char_len());
					match ranges.last_mut() {
						Some(last) if range.start <= last.end => *last = last.union(&range),
						_ => ranges.push(range),
					}
					pos = range.end;
				}
			}
		}

		ranges
	}

	/// Maps an old offset into the new text.
	///
	/// Offsets past [`len_before`](Self::len_before) are shifted by the total
	/// length delta; callers are expected to clamp them.
	pub fn map_offset(&self, offset: CharIdx, sticky: Sticky) -> CharIdx {
		let mut offsets = [offset];
		self.map_offsets(&mut offsets, sticky);
		offsets[0]
	}

	/// Maps an ascending set of old offsets in a single pass over the steps.
	///
	/// Mapping is monotone, so the output stays ascending. Points that collapse
	/// onto the same replacement end up equal rather than reordered.
	pub fn map_offsets(&self, offsets: &mut [CharIdx], sticky: Sticky) {
		debug_assert!(offsets.is_sorted(), "offsets must be ascending: {offsets:?}");

		let mut old_pos = 0;
		let mut new_pos = 0;
		let mut next = 0;

		for step in &self.steps {
			if next == offsets.len() {
				return;
			}

			match step {
				Step::Retain(n) => {
					while next < offsets.len() && offsets[next] < old_pos + n {
						offsets[next] = new_pos + (offsets[next] - old_pos);
						next += 1;
					}
					old_pos += n;
					new_pos += n;
				}
				Step::Replace(r) => {
					let deleted = r.deleted.char_len();
					while next < offsets.len() && collapses(offsets[next], old_pos, deleted, sticky) {
						offsets[next] = new_pos;
						next += 1;
					}
					old_pos += deleted;
					new_pos += r.inserted.char_len();
				}
			}
		}

		for offset in &mut offsets[next..] {
			*offset = new_pos + (*offset - old_pos);
		}
	}
}

/// Whether `offset` lands on the start of a replacement starting at `start`.
#[inline]
fn collapses(offset: CharIdx, start: CharIdx, deleted: CharLen, sticky: Sticky) -> bool {
	offset < start + deleted || (deleted == 0 && offset == start && sticky == Sticky::Left)
}
