use crate::range::CharLen;

/// Sticky determines how positions at insertion boundaries are mapped.
///
/// When an edit inserts text exactly at a tracked offset, stickiness decides
/// whether the offset ends up before or after the inserted text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Sticky {
	/// Position stays before insertions at the same location.
	#[default]
	Left,
	/// Position moves after insertions at the same location.
	Right,
}

/// A run of text carried by a [`Replace`], either the characters it removes
/// or the ones it writes.
///
/// The character count is computed once on construction; offsets in
/// mapping, composition and the rebase treap are all in characters.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Fragment {
	text: String,
	char_len: CharLen,
}

impl Fragment {
	/// Creates a new fragment, computing the character length once.
	#[inline]
	pub fn new(text: impl Into<String>) -> Self {
		let text = text.into();
		let char_len = text.chars().count();
		Self { text, char_len }
	}

	/// Creates a fragment with a pre-computed length.
	///
	/// In debug builds, asserts that `char_len` matches the actual character count.
	#[inline]
	pub(crate) fn from_chars(text: String, char_len: CharLen) -> Self {
		debug_assert_eq!(text.chars().count(), char_len);
		Self { text, char_len }
	}

	/// Returns true if this fragment is empty.
	#[inline]
	pub fn is_empty(&self) -> bool {
		self.char_len == 0
	}

	/// Returns the text.
	#[inline]
	pub fn text(&self) -> &str {
		&self.text
	}

	/// Returns the cached character length.
	#[inline]
	pub fn char_len(&self) -> CharLen {
		self.char_len
	}

	/// Appends another fragment, updating the cached length.
	pub(crate) fn push(&mut self, other: &Fragment) {
		self.text.push_str(&other.text);
		self.char_len += other.char_len;
	}

	/// Splits off the first `n` characters.
	///
	/// Returns the prefix and leaves the suffix in `self`.
	pub(crate) fn take_prefix(&mut self, n: CharLen) -> Fragment {
		debug_assert!(n <= self.char_len);
		let byte = self.text.char_indices().nth(n).map_or(self.text.len(), |(i, _)| i);
		let rest = self.text.split_off(byte);
		let prefix = std::mem::replace(&mut self.text, rest);
		self.char_len -= n;
		Fragment::from_chars(prefix, n)
	}
}

impl From<&str> for Fragment {
	fn from(text: &str) -> Self {
		Self::new(text)
	}
}

impl From<String> for Fragment {
	fn from(text: String) -> Self {
		Self::new(text)
	}
}

/// Replacement of a known run of old text with new text.
///
/// The deleted text is kept so an operation can be validated against the
/// text it was built for, and inverted without access to that text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replace {
	/// Text removed from the old version.
	pub deleted: Fragment,
	/// Text that takes its place in the new version.
	pub inserted: Fragment,
}

impl Replace {
	/// Creates a replacement step.
	pub fn new(deleted: impl Into<Fragment>, inserted: impl Into<Fragment>) -> Self {
		Self {
			deleted: deleted.into(),
			inserted: inserted.into(),
		}
	}

	/// True when nothing is deleted (a pure insertion).
	#[inline]
	pub fn is_insertion(&self) -> bool {
		self.deleted.is_empty()
	}

	/// True when the step neither deletes nor inserts anything.
	#[inline]
	pub fn is_noop(&self) -> bool {
		self.deleted.is_empty() && self.inserted.is_empty()
	}
}

/// A single step of an [`Operation`](super::Operation).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
	/// Keep the next N characters of the old text.
	Retain(CharLen),
	/// Replace a known run of old text with new text.
	Replace(Replace),
}

impl Step {
	/// Number of old-text characters this step consumes.
	#[inline]
	pub fn len_before(&self) -> CharLen {
		match self {
			Step::Retain(n) => *n,
			Step::Replace(r) => r.deleted.char_len(),
		}
	}

	/// Number of new-text characters this step produces.
	#[inline]
	pub fn len_after(&self) -> CharLen {
		match self {
			Step::Retain(n) => *n,
			Step::Replace(r) => r.inserted.char_len(),
		}
	}
}
