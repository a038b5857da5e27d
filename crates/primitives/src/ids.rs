//! Opaque identifiers for position observers.
//!
//! Ids are UUID-backed so they never collide or get reused, even across
//! documents. They are stable across edits and meant to be used as map keys.

use std::fmt;

use uuid::Uuid;

macro_rules! define_id {
	($(#[$meta:meta])* $name:ident) => {
		$(#[$meta])*
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
		pub struct $name(Uuid);

		impl $name {
			/// Mints a fresh, never-before-seen id.
			pub fn new() -> Self {
				Self(Uuid::new_v4())
			}

			/// Returns the backing UUID.
			pub fn as_uuid(&self) -> Uuid {
				self.0
			}
		}

		impl Default for $name {
			fn default() -> Self {
				Self::new()
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				write!(f, "{}({})", stringify!($name), self.0)
			}
		}
	};
}

define_id!(
	/// Identity of a caret inside a [`MultiCaretData`](crate::MultiCaretData).
	CaretId
);

define_id!(
	/// Identity of a single-offset anchor registered with a document.
	AnchorId
);

define_id!(
	/// Identity of a range marker registered with a document.
	RangeMarkerId
);

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn ids_are_unique() {
		let a = CaretId::new();
		let b = CaretId::new();
		assert_ne!(a, b);
		assert_eq!(a, a);
	}

	#[test]
	fn display_names_the_kind() {
		let id = AnchorId::new();
		assert!(id.to_string().starts_with("AnchorId("));
	}
}
