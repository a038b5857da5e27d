use std::ops::{Deref, DerefMut};

use quire_primitives::{AnchorId, CharIdx, EditError, Sticky};
use smallvec::SmallVec;

use super::Document;
use crate::anchors::AnchorLifetime;

/// Scoped access to a document for one logical multi-step operation.
///
/// Anchors created through [`anchor`](Self::anchor) carry
/// [`AnchorLifetime::Mutation`] and are removed when the scope drops, on
/// every exit path including unwinding.
pub struct MutationScope<'a> {
	doc: &'a mut Document,
	anchors: SmallVec<[AnchorId; 4]>,
}

impl<'a> MutationScope<'a> {
	pub(super) fn new(doc: &'a mut Document) -> Self {
		Self {
			doc,
			anchors: SmallVec::new(),
		}
	}

	/// Creates a mutation-lifetime anchor owned by this scope.
	///
	/// # Errors
	///
	/// Returns `EditError::OffsetOutOfBounds` if `offset` is past the text.
	pub fn anchor(&mut self, offset: CharIdx, sticky: Sticky) -> Result<AnchorId, EditError> {
		let id = self.doc.create_anchor(offset, sticky, AnchorLifetime::Mutation)?;
		self.anchors.push(id);
		Ok(id)
	}
}

impl Deref for MutationScope<'_> {
	type Target = Document;

	fn deref(&self) -> &Document {
		self.doc
	}
}

impl DerefMut for MutationScope<'_> {
	fn deref_mut(&mut self) -> &mut Document {
		self.doc
	}
}

impl Drop for MutationScope<'_> {
	fn drop(&mut self) {
		let released = self.anchors.len();
		for id in self.anchors.drain(..) {
			self.doc.anchors_mut().remove_anchor(id);
		}
		tracing::debug!(doc = self.doc.id.0, released, "mutation scope closed");
	}
}
