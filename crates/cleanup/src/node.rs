//! View nodes and the non-owning handles the registry keeps to them.

use std::fmt;
use std::rc::{Rc, Weak};

use crate::controller::CleanupController;
use crate::ids::CleanupKey;

/// An externally owned node of the host view tree.
pub trait ViewNode {
	/// Host-assigned tag. Two nodes with the same tag are the same node for cleanup purposes.
	fn tag(&self) -> CleanupKey;

	/// Returns this node's controller capability, if the node is itself a cleanup controller.
	fn as_controller(self: Rc<Self>) -> Option<Rc<dyn CleanupController>> {
		None
	}
}

/// Non-owning handle to a [`ViewNode`].
///
/// Resolution to `None` means the owner destroyed the node before cleanup ran; it is an expected
/// outcome, not an error.
#[derive(Clone)]
pub struct WeakNode {
	inner: Weak<dyn ViewNode>,
}

impl WeakNode {
	pub fn new(node: &Rc<dyn ViewNode>) -> Self {
		Self {
			inner: Rc::downgrade(node),
		}
	}

	/// Resolves the handle to a live node.
	pub fn upgrade(&self) -> Option<Rc<dyn ViewNode>> {
		self.inner.upgrade()
	}

	pub fn is_alive(&self) -> bool {
		self.inner.strong_count() > 0
	}

	/// Returns true if both handles point at the same allocation.
	pub fn ptr_eq(&self, other: &Self) -> bool {
		std::ptr::addr_eq(self.inner.as_ptr(), other.inner.as_ptr())
	}
}

impl From<&Rc<dyn ViewNode>> for WeakNode {
	fn from(node: &Rc<dyn ViewNode>) -> Self {
		Self::new(node)
	}
}

impl fmt::Debug for WeakNode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.upgrade() {
			Some(node) => f.debug_tuple("WeakNode").field(&node.tag()).finish(),
			None => f.write_str("WeakNode(<gone>)"),
		}
	}
}
