//! Read-only text capability consumed by operation constructors.

use ropey::{Rope, RopeSlice};

use crate::range::{CharLen, TextRange};

/// Anything that can report its character count and hand out substrings.
///
/// Operation constructors only need these two capabilities, so they accept
/// plain strings in tests and ropes in the document core.
pub trait TextSource {
	/// Number of characters in the text.
	fn char_count(&self) -> CharLen;

	/// Copies the characters in `range` into an owned string.
	///
	/// Implementations panic if the range exceeds [`char_count`](Self::char_count).
	fn substring(&self, range: TextRange) -> String;
}

impl TextSource for str {
	fn char_count(&self) -> CharLen {
		self.chars().count()
	}

	fn substring(&self, range: TextRange) -> String {
		let mut chars = self.char_indices().map(|(i, _)| i).chain(std::iter::once(self.len()));
		let out_of_bounds = || -> usize {
			panic!("range {range:?} out of bounds for text of {} chars", self.char_count())
		};
		let start = chars.nth(range.start).unwrap_or_else(out_of_bounds);
		let end = if range.is_empty() {
			start
		} else {
			chars.nth(range.len() - 1).unwrap_or_else(out_of_bounds)
		};
		self[start..end].to_owned()
	}
}

impl TextSource for String {
	fn char_count(&self) -> CharLen {
		self.as_str().char_count()
	}

	fn substring(&self, range: TextRange) -> String {
		self.as_str().substring(range)
	}
}

impl TextSource for RopeSlice<'_> {
	fn char_count(&self) -> CharLen {
		self.len_chars()
	}

	fn substring(&self, range: TextRange) -> String {
		self.slice(range.start..range.end).to_string()
	}
}

impl TextSource for Rope {
	fn char_count(&self) -> CharLen {
		self.len_chars()
	}

	fn substring(&self, range: TextRange) -> String {
		self.slice(range.start..range.end).to_string()
	}
}

impl<T: TextSource + ?Sized> TextSource for &T {
	fn char_count(&self) -> CharLen {
		(**self).char_count()
	}

	fn substring(&self, range: TextRange) -> String {
		(**self).substring(range)
	}
}
