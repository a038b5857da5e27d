//! Arena-backed treap with lazy range updates.
//!
//! Each node is a leaf interval `[key, key + width)`; the tree is ordered by
//! key and heap-ordered by priority. Deletion coverage is stored negated
//! (`del_value == -covering_ops`) so that the subtree maximum is zero exactly
//! when some leaf is untouched, and `num_max` then counts untouched width.

use crate::range::{CharIdx, CharLen};

pub(super) type Link = Option<usize>;

#[derive(Debug, Clone)]
pub(super) struct Node {
	pub key: CharIdx,
	pub width: CharLen,
	priority: u64,
	left: Link,
	right: Link,
	/// Negated count of registered operations deleting this leaf.
	pub del_value: i64,
	/// Pure insertions at `key`.
	pub insert_len: i64,
	/// Replacement text whose deleted span ends at `key`.
	pub replace_len: i64,
	/// Sum of `insert_len + replace_len` over the subtree.
	sum: i64,
	/// Maximum `del_value` over the subtree.
	max: i64,
	/// Total width of subtree leaves whose `del_value` equals `max`.
	num_max: CharLen,
	/// Pending addition for both children's `del_value`.
	delta_max: i64,
}

/// Node storage plus the structural operations.
#[derive(Debug, Clone, Default)]
pub(super) struct Arena {
	nodes: Vec<Node>,
	seed: u64,
}

impl Arena {
	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	pub fn node(&self, i: usize) -> &Node {
		&self.nodes[i]
	}

	pub fn node_mut(&mut self, i: usize) -> &mut Node {
		&mut self.nodes[i]
	}

	/// Allocates a detached leaf.
	pub fn alloc(&mut self, key: CharIdx, width: CharLen, del_value: i64) -> usize {
		let priority = self.next_priority();
		self.nodes.push(Node {
			key,
			width,
			priority,
			left: None,
			right: None,
			del_value,
			insert_len: 0,
			replace_len: 0,
			sum: 0,
			max: del_value,
			num_max: width,
			delta_max: 0,
		});
		self.nodes.len() - 1
	}

	/// splitmix64; deterministic so rebuilt trees have identical shapes.
	fn next_priority(&mut self) -> u64 {
		self.seed = self.seed.wrapping_add(0x9e37_79b9_7f4a_7c15);
		let mut z = self.seed;
		z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
		z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
		z ^ (z >> 31)
	}

	pub fn sum(&self, t: Link) -> i64 {
		t.map_or(0, |i| self.nodes[i].sum)
	}

	/// Width of the subtree not covered by any deletion.
	pub fn untouched_width(&self, t: Link) -> CharLen {
		match t {
			Some(i) if self.nodes[i].max == 0 => self.nodes[i].num_max,
			_ => 0,
		}
	}

	/// Adds `delta` to every `del_value` in the subtree, lazily.
	pub fn apply(&mut self, t: Link, delta: i64) {
		if let Some(i) = t {
			let node = &mut self.nodes[i];
			node.del_value += delta;
			node.max += delta;
			node.delta_max += delta;
		}
	}

	fn push(&mut self, i: usize) {
		let delta = std::mem::take(&mut self.nodes[i].delta_max);
		if delta != 0 {
			let (left, right) = (self.nodes[i].left, self.nodes[i].right);
			self.apply(left, delta);
			self.apply(right, delta);
		}
	}

	pub fn pull(&mut self, i: usize) {
		let (left, right) = (self.nodes[i].left, self.nodes[i].right);

		let mut max = self.nodes[i].del_value;
		let mut num_max = self.nodes[i].width;
		for child in [left, right].into_iter().flatten() {
			let c = &self.nodes[child];
			if c.max > max {
				max = c.max;
				num_max = c.num_max;
			} else if c.max == max {
				num_max += c.num_max;
			}
		}

		let sum = self.sum(left) + self.sum(right);
		let node = &mut self.nodes[i];
		node.sum = sum + node.insert_len + node.replace_len;
		node.max = max;
		node.num_max = num_max;
	}

	/// Splits `t` into keys `< key` and keys `>= key`.
	pub fn split(&mut self, t: Link, key: CharIdx) -> (Link, Link) {
		let Some(i) = t else {
			return (None, None);
		};
		self.push(i);
		if self.nodes[i].key < key {
			let (l, r) = self.split(self.nodes[i].right, key);
			self.nodes[i].right = l;
			self.pull(i);
			(Some(i), r)
		} else {
			let (l, r) = self.split(self.nodes[i].left, key);
			self.nodes[i].left = r;
			self.pull(i);
			(l, Some(i))
		}
	}

	/// Concatenates two trees; every key of `a` must precede every key of `b`.
	pub fn merge(&mut self, a: Link, b: Link) -> Link {
		match (a, b) {
			(None, t) | (t, None) => t,
			(Some(i), Some(j)) => {
				if self.nodes[i].priority > self.nodes[j].priority {
					self.push(i);
					let right = self.merge(self.nodes[i].right, b);
					self.nodes[i].right = right;
					self.pull(i);
					Some(i)
				} else {
					self.push(j);
					let left = self.merge(a, self.nodes[j].left);
					self.nodes[j].left = left;
					self.pull(j);
					Some(j)
				}
			}
		}
	}

	/// Rightmost leaf, with pending updates pushed along the way.
	pub fn last(&mut self, t: Link) -> Link {
		let mut i = t?;
		loop {
			self.push(i);
			match self.nodes[i].right {
				Some(r) => i = r,
				None => return Some(i),
			}
		}
	}

	/// Leftmost leaf, with pending updates pushed along the way.
	pub fn first(&mut self, t: Link) -> Link {
		let mut i = t?;
		loop {
			self.push(i);
			match self.nodes[i].left {
				Some(l) => i = l,
				None => return Some(i),
			}
		}
	}

	/// True if a leaf with exactly `key` exists. Keys are never lazily updated.
	pub fn contains_key(&self, t: Link, key: CharIdx) -> bool {
		let mut cur = t;
		while let Some(i) = cur {
			let node = &self.nodes[i];
			cur = match key.cmp(&node.key) {
				std::cmp::Ordering::Less => node.left,
				std::cmp::Ordering::Greater => node.right,
				std::cmp::Ordering::Equal => return true,
			};
		}
		false
	}

	/// Maximum `del_value` of a subtree root, for invariant checks.
	pub fn max(&self, t: Link) -> i64 {
		t.map_or(i64::MIN, |i| self.nodes[i].max)
	}
}
