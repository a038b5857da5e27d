//! Anchors and range markers: document-owned positions rebased through every edit.
//!
//! An [`Anchor`] tracks one offset, a [`RangeMarker`] tracks a range. Both are
//! rebased like a caret point; the [`Sticky`] of each point decides which
//! side of an insertion at that exact offset it ends up on.


use quire_primitives::{AnchorId, CharIdx, CharLen, Operation, RangeMarkerId, Sticky, TextRange};
use rustc_hash::FxHashMap;

/// How long an anchor is expected to live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnchorLifetime {
	/// Created and removed within one logical operation; see
	/// [`Document::mutation_scope`](crate::Document::mutation_scope).
	Mutation,
	/// Lives until explicitly removed.
	Document,
}

/// A tracked offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor {
	/// Current offset.
	pub offset: CharIdx,
	/// Side taken on insertions at `offset`.
	pub sticky: Sticky,
	/// Expected lifetime.
	pub lifetime: AnchorLifetime,
}

/// A tracked range.
///
/// A greedy edge grows the marker over text inserted exactly at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeMarker {
	/// Current range.
	pub range: TextRange,
	/// Insertions at the start extend the marker.
	pub greedy_left: bool,
	/// Insertions at the end extend the marker.
	pub greedy_right: bool,
}

impl RangeMarker {
	fn start_sticky(&self) -> Sticky {
		if self.greedy_left { Sticky::Left } else { Sticky::Right }
	}

	fn end_sticky(&self) -> Sticky {
		if self.greedy_right { Sticky::Right } else { Sticky::Left }
	}
}

/// Which stored point a rebased offset belongs to.
#[derive(Debug, Clone, Copy)]
enum Slot {
	Anchor(AnchorId),
	Start(RangeMarkerId),
	End(RangeMarkerId),
}

/// Id-keyed anchors and range markers of one document.
#[derive(Debug, Clone, Default)]
pub struct AnchorStore {
	anchors: FxHashMap<AnchorId, Anchor>,
	markers: FxHashMap<RangeMarkerId, RangeMarker>,
}

impl AnchorStore {
	/// Creates an empty store.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers an anchor and returns its id.
	pub fn create_anchor(&mut self, offset: CharIdx, sticky: Sticky, lifetime: AnchorLifetime) -> AnchorId {
		let id = AnchorId::new();
		self.anchors.insert(
			id,
			Anchor {
				offset,
				sticky,
				lifetime,
			},
		);
		id
	}

	/// Removes an anchor, returning it if it existed.
	pub fn remove_anchor(&mut self, id: AnchorId) -> Option<Anchor> {
		self.anchors.remove(&id)
	}

	/// Looks up an anchor.
	pub fn anchor(&self, id: AnchorId) -> Option<&Anchor> {
		self.anchors.get(&id)
	}

	/// Registers a range marker and returns its id.
	pub fn create_range_marker(&mut self, range: TextRange, greedy_left: bool, greedy_right: bool) -> RangeMarkerId {
		let id = RangeMarkerId::new();
		self.markers.insert(
			id,
			RangeMarker {
				range,
				greedy_left,
				greedy_right,
			},
		);
		id
	}

	/// Removes a range marker, returning it if it existed.
	pub fn remove_range_marker(&mut self, id: RangeMarkerId) -> Option<RangeMarker> {
		self.markers.remove(&id)
	}

	/// Looks up a range marker.
	pub fn range_marker(&self, id: RangeMarkerId) -> Option<&RangeMarker> {
		self.markers.get(&id)
	}

	/// Number of live anchors.
	pub fn anchor_count(&self) -> usize {
		self.anchors.len()
	}

	/// Number of live range markers.
	pub fn range_marker_count(&self) -> usize {
		self.markers.len()
	}

	/// Number of live anchors with the given lifetime.
	pub fn count_with_lifetime(&self, lifetime: AnchorLifetime) -> usize {
		self.anchors.values().filter(|a| a.lifetime == lifetime).count()
	}

	/// Overwrites an anchor's offset.
	///
	/// # Panics
	///
	/// Panics if `id` is unknown.
	pub(crate) fn set_anchor_offset(&mut self, id: AnchorId, offset: CharIdx) {
		let anchor = self.anchors.get_mut(&id).unwrap_or_else(|| panic!("unknown anchor id {id}"));
		anchor.offset = offset;
	}

	/// Overwrites a range marker's range.
	///
	/// # Panics
	///
	/// Panics if `id` is unknown.
	pub(crate) fn set_marker_range(&mut self, id: RangeMarkerId, range: TextRange) {
		let marker = self.markers.get_mut(&id).unwrap_or_else(|| panic!("unknown range marker id {id}"));
		marker.range = range;
	}

	/// Rebases every anchor and marker edge through `op`.
	///
	/// Points are grouped by stickiness and mapped in one pass over the
	/// operation per group.
	pub fn rebase(&mut self, op: &Operation) {
		let mut left: Vec<(CharIdx, Slot)> = Vec::new();
		let mut right: Vec<(CharIdx, Slot)> = Vec::new();
		let mut by_sticky = |sticky: Sticky, point: (CharIdx, Slot)| match sticky {
			Sticky::Left => left.push(point),
			Sticky::Right => right.push(point),
		};

		for (id, anchor) in &self.anchors {
			by_sticky(anchor.sticky, (anchor.offset, Slot::Anchor(*id)));
		}
		for (id, marker) in &self.markers {
			by_sticky(marker.start_sticky(), (marker.range.start, Slot::Start(*id)));
			by_sticky(marker.end_sticky(), (marker.range.end, Slot::End(*id)));
		}

		for (sticky, mut points) in [(Sticky::Left, left), (Sticky::Right, right)] {
			points.sort_unstable_by_key(|(offset, _)| *offset);
			let mut offsets: Vec<CharIdx> = points.iter().map(|(offset, _)| *offset).collect();
			op.map_offsets(&mut offsets, sticky);
			for ((_, slot), offset) in points.into_iter().zip(offsets) {
				self.write_back(slot, offset);
			}
		}

		// Non-greedy edges of an empty marker can cross on an insertion.
		for marker in self.markers.values_mut() {
			if marker.range.end < marker.range.start {
				marker.range.end = marker.range.start;
			}
		}
	}

	fn write_back(&mut self, slot: Slot, offset: CharIdx) {
		match slot {
			Slot::Anchor(id) => {
				if let Some(anchor) = self.anchors.get_mut(&id) {
					anchor.offset = offset;
				}
			}
			Slot::Start(id) => {
				if let Some(marker) = self.markers.get_mut(&id) {
					marker.range.start = offset;
				}
			}
			Slot::End(id) => {
				if let Some(marker) = self.markers.get_mut(&id) {
					marker.range.end = offset;
				}
			}
		}
	}

	/// True if every anchor and marker lies within `[0, len]`.
	pub(crate) fn all_within(&self, len: CharLen) -> bool {
		self.anchors.values().all(|a| a.offset <= len)
			&& self.markers.values().all(|m| m.range.start <= m.range.end && m.range.end <= len)
	}
}
