use super::{Fragment, Operation};
use crate::range::{CharLen, TextRange};
use crate::text::TextSource;

impl Operation {
	/// Replaces `range` of `text` with `replacement`.
	///
	/// # Panics
	///
	/// Panics if `range` reaches past the end of `text`.
	pub fn replace_range<T>(text: &T, range: TextRange, replacement: &str) -> Operation
	where
		T: TextSource + ?Sized,
	{
		let len = text.char_count();
		assert!(range.is_within(len), "range {range:?} out of bounds for text of length {len}");

		let mut op = Operation::default();
		op.retain(range.start);
		op.replace(Fragment::new(text.substring(range)), Fragment::new(replacement));
		op.retain(len - range.end);
		op
	}

	/// Replaces the whole of `text` with `replacement`.
	///
	/// With `deduce`, the replaced span shrinks to the region between the
	/// longest common prefix and the longest common suffix of the two texts,
	/// so offsets outside the changed region keep their place.
	pub fn overwrite<T>(text: &T, replacement: &str, deduce: bool) -> Operation
	where
		T: TextSource + ?Sized,
	{
		let len = text.char_count();
		if !deduce {
			return Operation::replace_range(text, TextRange::new(0, len), replacement);
		}

		let old = text.substring(TextRange::new(0, len));
		let new_len = replacement.chars().count();

		let prefix = old.chars().zip(replacement.chars()).take_while(|(a, b)| a == b).count();
		let max_suffix = len.min(new_len) - prefix;
		let suffix = old
			.chars()
			.rev()
			.zip(replacement.chars().rev())
			.take(max_suffix)
			.take_while(|(a, b)| a == b)
			.count();

		let middle: String = replacement.chars().skip(prefix).take(new_len - prefix - suffix).collect();
		Operation::replace_range(old.as_str(), TextRange::new(prefix, len - suffix), &middle)
	}

	/// Deletes every range in `ranges` from `text` in one operation.
	///
	/// Ranges may come in any order; they are sorted by position. Overlapping
	/// ranges are a caller error and trip a debug assertion.
	///
	/// # Panics
	///
	/// Panics if a range reaches past the end of `text`.
	pub fn delete_ranges<T>(text: &T, ranges: impl IntoIterator<Item = TextRange>) -> Operation
	where
		T: TextSource + ?Sized,
	{
		let len = text.char_count();
		let mut ranges: Vec<TextRange> = ranges.into_iter().collect();
		ranges.sort_unstable();

		let mut op = Operation::default();
		let mut pos: CharLen = 0;
		for range in ranges {
			assert!(range.is_within(len), "range {range:?} out of bounds for text of length {len}");
			debug_assert!(range.start >= pos, "overlapping ranges passed to delete_ranges");

			op.retain(range.start - pos);
			op.delete(Fragment::new(text.substring(range)));
			pos = range.end;
		}
		op.retain(len - pos);
		op
	}
}
