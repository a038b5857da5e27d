use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

use super::{Caret, CaretPosition};
use crate::ids::CaretId;
use crate::operation::{Operation, Sticky};
use crate::range::{CharIdx, CharLen};

/// An immutable, ordered collection of carets.
///
/// Every mutator returns a new value, so readers holding an older snapshot
/// are never affected by later edits.
///
/// Invariants:
/// - every id in `by_id` appears exactly once in `sorted`;
/// - `sorted` is ordered by caret offset;
/// - every key of `merged` is an id absorbed by a merge and no longer live,
///   and its value is a live id. Merge chains are flattened eagerly, so one
///   lookup always suffices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultiCaretData {
	sorted: Vec<Caret>,
	by_id: FxHashMap<CaretId, Caret>,
	merged: FxHashMap<CaretId, CaretId>,
}

impl MultiCaretData {
	/// Creates an empty store.
	pub fn new() -> Self {
		Self::default()
	}

	fn from_parts(sorted: Vec<Caret>, merged: FxHashMap<CaretId, CaretId>) -> Self {
		debug_assert!(sorted.is_sorted_by_key(Caret::offset), "carets out of order");
		let by_id = sorted.iter().map(|caret| (caret.id, *caret)).collect();
		Self { sorted, by_id, merged }
	}

	/// Carets in ascending offset order.
	pub fn carets(&self) -> &[Caret] {
		&self.sorted
	}

	/// Number of live carets.
	pub fn len(&self) -> usize {
		self.sorted.len()
	}

	/// True if there are no live carets.
	pub fn is_empty(&self) -> bool {
		self.sorted.is_empty()
	}

	/// True if `id` is a live caret (not merged away, not removed).
	pub fn is_live(&self, id: CaretId) -> bool {
		self.by_id.contains_key(&id)
	}

	/// Absorbed id to surviving id table.
	pub fn merged_anchors(&self) -> &FxHashMap<CaretId, CaretId> {
		&self.merged
	}

	/// Resolves `id` to the live caret that currently represents it.
	///
	/// # Panics
	///
	/// Panics if `id` was never registered or has been removed.
	pub fn resolve_anchor(&self, id: CaretId) -> CaretId {
		self.try_resolve_anchor(id)
			.unwrap_or_else(|| panic!("unknown caret id {id}"))
	}

	/// Like [`resolve_anchor`](Self::resolve_anchor), returning `None` for unknown ids.
	pub fn try_resolve_anchor(&self, id: CaretId) -> Option<CaretId> {
		if self.by_id.contains_key(&id) {
			return Some(id);
		}
		self.merged.get(&id).copied()
	}

	/// Returns the caret for `id`, following a merge if needed.
	///
	/// # Panics
	///
	/// Panics if `id` was never registered or has been removed.
	pub fn caret(&self, id: CaretId) -> &Caret {
		let live = self.resolve_anchor(id);
		&self.by_id[&live]
	}

	/// Rebases every caret through `op`.
	///
	/// All points use [`Sticky::Left`]. The virtual column survives only with
	/// `preserve_vcol`, since a changed line invalidates it.
	pub fn edit(&self, op: &Operation, preserve_vcol: bool) -> Self {
		let sorted = self
			.sorted
			.iter()
			.map(|caret| Caret {
				position: caret.position.map(op, Sticky::Left),
				vcol: if preserve_vcol { caret.vcol } else { None },
				..*caret
			})
			.collect();
		Self::from_parts(sorted, self.merged.clone())
	}

	/// Rebases every caret through a precomputed offset mapping.
	///
	/// The mapping must be monotone. The last lookup is cached, since the
	/// three points of a caret usually sit on one or two distinct offsets.
	pub fn edit_with(&self, new_offset: impl FnMut(CharIdx) -> CharIdx, preserve_vcol: bool) -> Self {
		let mut lookup = LastLookup::new(new_offset);
		let sorted = self
			.sorted
			.iter()
			.map(|caret| Caret {
				position: caret.position.map_with(|offset| lookup.get(offset)),
				vcol: if preserve_vcol { caret.vcol } else { None },
				..*caret
			})
			.collect();
		Self::from_parts(sorted, self.merged.clone())
	}

	/// Adds carets and re-sorts by offset.
	///
	/// # Panics
	///
	/// Panics if a caret id is already known to this store.
	pub fn add_carets(&self, carets: impl IntoIterator<Item = Caret>) -> Self {
		let mut sorted = self.sorted.clone();
		for caret in carets {
			assert!(
				!self.by_id.contains_key(&caret.id) && !self.merged.contains_key(&caret.id),
				"caret id {} already registered",
				caret.id
			);
			sorted.push(caret);
		}
		sorted.sort_by_key(Caret::offset);
		Self::from_parts(sorted, self.merged.clone())
	}

	/// Removes carets by id.
	///
	/// Merge entries keyed by a removed id are dropped with it.
	///
	/// # Panics
	///
	/// Panics if a remaining merge entry would point at a removed caret.
	pub fn remove_carets(&self, ids: impl IntoIterator<Item = CaretId>) -> Self {
		let ids: FxHashSet<CaretId> = ids.into_iter().collect();
		let sorted = self.sorted.iter().filter(|caret| !ids.contains(&caret.id)).copied().collect();
		let mut merged = self.merged.clone();
		merged.retain(|absorbed, _| !ids.contains(absorbed));

		let result = Self::from_parts(sorted, merged);
		for (absorbed, survivor) in &result.merged {
			assert!(
				result.by_id.contains_key(survivor),
				"merged caret {absorbed} would dangle: {survivor} was removed"
			);
		}
		result
	}

	/// Moves carets to new positions by id, then re-sorts by offset.
	///
	/// # Panics
	///
	/// Panics if an id does not resolve to a caret.
	pub fn move_carets(&self, moves: impl IntoIterator<Item = (CaretId, CaretPosition)>) -> Self {
		let mut by_id = self.by_id.clone();
		for (id, position) in moves {
			let live = self.resolve_anchor(id);
			if let Some(caret) = by_id.get_mut(&live) {
				caret.position = position;
			}
		}
		let mut sorted: Vec<Caret> = self.sorted.iter().map(|caret| by_id[&caret.id]).collect();
		sorted.sort_by_key(Caret::offset);
		Self::from_parts(sorted, self.merged.clone())
	}

	/// Merges carets that share an offset.
	///
	/// In each group the first caret survives and absorbs the rest: its
	/// selection becomes the union of the group's selections, its virtual
	/// column the first one set in the group, and it stays visible only if
	/// every member was. Running this on its own output is a no-op.
	pub fn merge_coinciding_carets(&self) -> Self {
		if self.sorted.windows(2).all(|pair| pair[0].offset() != pair[1].offset()) {
			return self.clone();
		}

		let mut redirect: FxHashMap<CaretId, CaretId> = FxHashMap::default();
		let mut sorted = Vec::with_capacity(self.sorted.len());

		for group in self.sorted.chunk_by(|a, b| a.offset() == b.offset()) {
			let survivor = group[0];
			if group.len() == 1 {
				sorted.push(survivor);
				continue;
			}

			let absorbed: SmallVec<[CaretId; 2]> = group[1..].iter().map(|caret| caret.id).collect();
			redirect.extend(absorbed.iter().map(|id| (*id, survivor.id)));

			let selection_start = group.iter().map(|c| c.position.selection_start).min();
			let selection_end = group.iter().map(|c| c.position.selection_end).max();
			sorted.push(Caret {
				position: CaretPosition::new(
					survivor.offset(),
					selection_start.unwrap_or(survivor.offset()),
					selection_end.unwrap_or(survivor.offset()),
				),
				vcol: group.iter().find_map(|c| c.vcol),
				visible: group.iter().all(|c| c.visible),
				..survivor
			});
		}

		let mut merged = self.merged.clone();
		for survivor in merged.values_mut() {
			if let Some(next) = redirect.get(survivor) {
				*survivor = *next;
			}
		}
		merged.extend(redirect);

		Self::from_parts(sorted, merged)
	}

	/// Clamps every caret into `[0, len]`.
	///
	/// Out-of-range carets point at an upstream bug (a caret rebased against
	/// the wrong text, for one) and are logged, but the store stays usable.
	pub fn ensure_valid_offsets(&self, len: CharLen) -> Self {
		if self.sorted.iter().all(|caret| caret.position.selection_end <= len) {
			return self.clone();
		}

		let sorted = self
			.sorted
			.iter()
			.map(|caret| {
				let position = caret.position.clamp(len);
				if position != caret.position {
					tracing::warn!(?caret, len, "caret out of bounds after edit, clamping");
				}
				Caret { position, ..*caret }
			})
			.collect();
		Self::from_parts(sorted, self.merged.clone())
	}
}

/// Memoizes the most recent `old -> new` offset lookup.
struct LastLookup<F> {
	f: F,
	last: Option<(CharIdx, CharIdx)>,
}

impl<F: FnMut(CharIdx) -> CharIdx> LastLookup<F> {
	fn new(f: F) -> Self {
		Self { f, last: None }
	}

	fn get(&mut self, offset: CharIdx) -> CharIdx {
		match self.last {
			Some((old, new)) if old == offset => new,
			_ => {
				let new = (self.f)(offset);
				self.last = Some((offset, new));
				new
			}
		}
	}
}
