/// A position in the text, measured in characters (not bytes).
///
/// This is the canonical coordinate space for every offset in Quire.
pub type CharIdx = usize;

/// A length or count in the text, measured in characters (not bytes).
///
/// This is distinct from CharIdx to avoid accidentally passing an index
/// where a length is expected or vice versa.
pub type CharLen = usize;

/// A half-open character range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextRange {
	/// First character covered by the range.
	pub start: CharIdx,
	/// One past the last character covered by the range.
	pub end: CharIdx,
}

impl TextRange {
	/// Creates a new range.
	///
	/// # Panics
	///
	/// Panics if `start > end`.
	pub fn new(start: CharIdx, end: CharIdx) -> Self {
		assert!(start <= end, "inverted range {start}..{end}");
		Self { start, end }
	}

	/// Creates an empty range at `pos`.
	pub fn empty(pos: CharIdx) -> Self {
		Self { start: pos, end: pos }
	}

	/// Returns the length of the range in characters.
	#[inline]
	pub fn len(&self) -> CharLen {
		self.end - self.start
	}

	/// Returns true if the range covers no characters.
	#[inline]
	pub fn is_empty(&self) -> bool {
		self.start == self.end
	}

	/// Returns true if `pos` lies in `[start, end]`.
	///
	/// The end is inclusive so a caret sitting right after the last
	/// character still counts as "in" the range.
	#[inline]
	pub fn contains(&self, pos: CharIdx) -> bool {
		self.start <= pos && pos <= self.end
	}

	/// Returns true if the two ranges share at least one character.
	///
	/// Touching ranges such as `[0, 5)` and `[5, 9)` do not overlap.
	#[inline]
	pub fn overlaps(&self, other: &TextRange) -> bool {
		self.start < other.end && other.start < self.end
	}

	/// Returns true if the range is well-formed and lies within a text of
	/// `len` characters.
	///
	/// Fields are public, so a range may be inverted; those are never within.
	#[inline]
	pub fn is_within(&self, len: CharLen) -> bool {
		self.start <= self.end && self.end <= len
	}

	/// Returns the smallest range covering both ranges.
	pub fn union(&self, other: &TextRange) -> TextRange {
		TextRange {
			start: self.start.min(other.start),
			end: self.end.max(other.end),
		}
	}

	/// Clamps both ends to `[0, max_char]`.
	pub fn clamp(&self, max_char: CharIdx) -> Self {
		Self {
			start: self.start.min(max_char),
			end: self.end.min(max_char),
		}
	}
}

impl From<std::ops::Range<CharIdx>> for TextRange {
	fn from(range: std::ops::Range<CharIdx>) -> Self {
		Self::new(range.start, range.end)
	}
}

impl From<TextRange> for std::ops::Range<CharIdx> {
	fn from(range: TextRange) -> Self {
		range.start..range.end
	}
}
