//! Batch rebasing of offsets through many concurrent operations.
//!
//! An [`OpTreap`] registers operations that were all built against the same
//! base text and answers "where does this base offset land once all of them
//! are applied?" in logarithmic time. Operations can be added and retracted
//! one at a time, so a caller can fold a queue of edits incrementally.
//!
//! For a base offset `o` the rebased offset is:
//!
//! - the number of base characters before `o` that no operation deletes, plus
//! - the inserted length of every replacement whose deleted span ends at or
//!   before `o`, plus
//! - the length of every pure insertion strictly before `o`, and of those
//!   exactly at `o` only for [`Sticky::Right`].
//!
//! With a single operation this is exactly [`Operation::map_offset`].

mod node;


use node::{Arena, Link};

use crate::operation::{Operation, Step, Sticky};
use crate::range::{CharIdx, CharLen};

/// Which accumulator an insertion contributes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InsertKind {
	/// Pure insertion at the key; visibility depends on stickiness.
	Pure,
	/// Replacement text keyed at the end of its deleted span.
	Replacement,
}

/// Operations registered over one base text, indexed for offset queries.
///
/// Leaves partition `[0, base_len]` at every step boundary of every
/// operation ever registered; retracting an operation leaves its boundaries
/// in place, which is harmless since neighbouring leaves then simply share
/// the same values.
#[derive(Debug, Clone)]
pub struct OpTreap {
	arena: Arena,
	root: Link,
	base_len: CharLen,
	ops: usize,
}

impl OpTreap {
	/// An empty treap over a base text of `base_len` characters.
	pub fn new(base_len: CharLen) -> Self {
		let mut treap = Self {
			arena: Arena::default(),
			root: None,
			base_len,
			ops: 0,
		};
		treap.set_breakpoints(&mut vec![0, base_len]);
		treap
	}

	/// Builds a treap with every operation of `ops` registered.
	///
	/// Breakpoints are collected up front so the tree is built once from
	/// sorted leaves instead of by repeated leaf splits.
	///
	/// # Panics
	///
	/// Panics if an operation was not built against a text of `base_len` characters.
	pub fn build<'a>(base_len: CharLen, ops: impl IntoIterator<Item = &'a Operation>) -> Self {
		let ops: Vec<&Operation> = ops.into_iter().collect();

		let mut keys = vec![0, base_len];
		for op in &ops {
			check_base(op, base_len);
			keys.extend(boundaries(op));
		}

		let mut treap = Self {
			arena: Arena::default(),
			root: None,
			base_len,
			ops: 0,
		};
		treap.set_breakpoints(&mut keys);
		for op in &ops {
			treap.fold(op, 1);
		}

		tracing::trace!(ops = ops.len(), leaves = treap.arena.len(), "built operation treap");
		treap
	}

	fn set_breakpoints(&mut self, keys: &mut Vec<CharIdx>) {
		keys.sort_unstable();
		keys.dedup();
		let mut root = None;
		for (i, &key) in keys.iter().enumerate() {
			let width = keys.get(i + 1).map_or(0, |next| next - key);
			let leaf = self.arena.alloc(key, width, 0);
			root = self.arena.merge(root, Some(leaf));
		}
		self.root = root;
	}

	/// Length of the base text every operation applies to.
	pub fn base_len(&self) -> CharLen {
		self.base_len
	}

	/// Number of currently registered operations.
	pub fn op_count(&self) -> usize {
		self.ops
	}

	/// Registers `op`.
	///
	/// # Panics
	///
	/// Panics if `op` was not built against a text of [`base_len`](Self::base_len) characters.
	pub fn add_operation(&mut self, op: &Operation) {
		check_base(op, self.base_len);
		for key in boundaries(op) {
			self.ensure_breakpoint(key);
		}
		self.fold(op, 1);
	}

	/// Retracts a previously registered `op`.
	///
	/// # Panics
	///
	/// Panics if `op` does not fit the base text. Debug builds also catch
	/// retracting an operation that was never added.
	pub fn remove_operation(&mut self, op: &Operation) {
		check_base(op, self.base_len);
		debug_assert!(self.ops > 0, "removing an operation from an empty treap");
		for key in boundaries(op) {
			self.ensure_breakpoint(key);
		}
		self.fold(op, -1);
	}

	/// Rebases a base offset through every registered operation.
	///
	/// # Panics
	///
	/// Panics if `offset` is past the end of the base text.
	pub fn new_offset(&mut self, offset: CharIdx, sticky: Sticky) -> CharIdx {
		assert!(
			offset <= self.base_len,
			"offset {offset} out of bounds for base text of length {}",
			self.base_len
		);

		let (left, right) = self.arena.split(self.root, offset);

		let mut result = self.arena.untouched_width(left) as i64 + self.arena.sum(left);
		if let Some(last) = self.arena.last(left) {
			let node = self.arena.node(last);
			if node.del_value == 0 {
				// The containing leaf only counts up to `offset`.
				result -= (node.key + node.width - offset) as i64;
			}
		}
		if let Some(first) = self.arena.first(right) {
			let node = self.arena.node(first);
			if node.key == offset {
				result += node.replace_len;
				if sticky == Sticky::Right {
					result += node.insert_len;
				}
			}
		}

		self.root = self.arena.merge(left, right);
		debug_assert!(result >= 0, "rebased offset went negative");
		result as CharIdx
	}

	/// Rebases every offset in place. Offsets need not be sorted.
	pub fn new_offsets(&mut self, offsets: &mut [CharIdx], sticky: Sticky) {
		for offset in offsets {
			*offset = self.new_offset(*offset, sticky);
		}
	}

	/// Adds (`sign == 1`) or retracts (`sign == -1`) the effects of `op`.
	fn fold(&mut self, op: &Operation, sign: i64) {
		let mut pos = 0;
		for step in op.steps() {
			match step {
				Step::Retain(n) => pos += n,
				Step::Replace(r) => {
					let deleted = r.deleted.char_len();
					let inserted = r.inserted.char_len() as i64 * sign;
					if deleted > 0 {
						self.add_remove_deletion(pos, pos + deleted, sign > 0);
					}
					if inserted != 0 {
						if deleted == 0 {
							self.add_at_offset(pos, inserted, InsertKind::Pure);
						} else {
							self.add_at_offset(pos + deleted, inserted, InsertKind::Replacement);
						}
					}
					pos += deleted;
				}
			}
		}
		self.ops = self.ops.saturating_add_signed(sign as isize);
	}

	/// Marks (or unmarks) `[start, end)` as deleted by one more operation.
	fn add_remove_deletion(&mut self, start: CharIdx, end: CharIdx, is_add: bool) {
		let (head, rest) = self.arena.split(self.root, start);
		let (mid, tail) = self.arena.split(rest, end);
		self.arena.apply(mid, if is_add { -1 } else { 1 });
		debug_assert!(self.arena.max(mid) <= 0, "deletion count went negative over {start}..{end}");
		let rest = self.arena.merge(mid, tail);
		self.root = self.arena.merge(head, rest);
	}

	/// Adds `len` characters of insertion at the leaf keyed `offset`.
	fn add_at_offset(&mut self, offset: CharIdx, len: i64, kind: InsertKind) {
		let (head, rest) = self.arena.split(self.root, offset);
		let (leaf, tail) = self.arena.split(rest, offset + 1);
		if let Some(i) = leaf {
			let node = self.arena.node_mut(i);
			debug_assert_eq!(node.key, offset, "missing breakpoint at {offset}");
			match kind {
				InsertKind::Pure => node.insert_len += len,
				InsertKind::Replacement => node.replace_len += len,
			}
			debug_assert!(node.insert_len >= 0 && node.replace_len >= 0);
			self.arena.pull(i);
		}
		let rest = self.arena.merge(leaf, tail);
		self.root = self.arena.merge(head, rest);
	}

	/// Splits the leaf containing `key` so that a leaf starts exactly at `key`.
	///
	/// The new leaf inherits the deletion count of the leaf it was cut from.
	fn ensure_breakpoint(&mut self, key: CharIdx) {
		debug_assert!(key <= self.base_len);
		if self.arena.contains_key(self.root, key) {
			return;
		}

		let (head, tail) = self.arena.split(self.root, key);
		let Some(containing) = self.arena.last(head) else {
			// Key 0 always exists, so every other key has a predecessor.
			unreachable!("no leaf precedes breakpoint {key}");
		};
		let containing_key = self.arena.node(containing).key;
		let (before, leaf) = self.arena.split(head, containing_key);
		debug_assert_eq!(leaf, Some(containing));

		let node = self.arena.node_mut(containing);
		let end = node.key + node.width;
		let del_value = node.del_value;
		node.width = key - node.key;
		self.arena.pull(containing);

		let cut = self.arena.alloc(key, end - key, del_value);
		let head = self.arena.merge(before, leaf);
		let tail = self.arena.merge(Some(cut), tail);
		self.root = self.arena.merge(head, tail);
	}

	/// Leaf keys in ascending order.
	#[cfg(test)]
	fn breakpoints(&mut self) -> Vec<CharIdx> {
		let mut keys = Vec::new();
		let mut rest = self.root;
		let mut taken = None;
		while let Some(first) = self.arena.first(rest) {
			let key = self.arena.node(first).key;
			keys.push(key);
			let (leaf, tail) = self.arena.split(rest, key + 1);
			taken = self.arena.merge(taken, leaf);
			rest = tail;
		}
		self.root = taken;
		keys
	}
}

/// Rebases `offsets` through every operation in `ops` at once.
///
/// All operations must have been built against the same text of `base_len`
/// characters.
pub fn rebase_offsets<'a>(
	base_len: CharLen,
	ops: impl IntoIterator<Item = &'a Operation>,
	offsets: &mut [CharIdx],
	sticky: Sticky,
) {
	OpTreap::build(base_len, ops).new_offsets(offsets, sticky);
}

fn check_base(op: &Operation, base_len: CharLen) {
	assert_eq!(
		op.len_before(),
		base_len,
		"operation expects a text of length {} but the base has {base_len}",
		op.len_before()
	);
}

/// Every step boundary of `op`, in base coordinates.
fn boundaries(op: &Operation) -> impl Iterator<Item = CharIdx> + '_ {
	op.steps().iter().scan(0, |pos, step| {
		let start = *pos;
		*pos += step.len_before();
		Some([start, *pos])
	})
	.flatten()
}
