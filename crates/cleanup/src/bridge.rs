//! Boundary to the host rendering layer.
//!
//! The registry needs exactly one capability from the host: detaching a node's subtree. It holds
//! that capability weakly, binds it from the first registrant able to supply it, and falls back to
//! an optional resolver installed by the host.

use std::fmt;
use std::rc::{Rc, Weak};

use crate::controller::CleanupController;
use crate::node::ViewNode;

/// Physical detach operation provided by the host.
pub trait DetachBridge {
	/// Removes `node` and its subtree from the host tree. Fire-and-forget.
	fn detach_subtree(&self, node: &Rc<dyn ViewNode>);
}

/// Last-resort source of a bridge when a registering controller cannot supply one.
pub type BridgeResolver = Box<dyn Fn() -> Option<Rc<dyn DetachBridge>>>;

/// Weakly bound detach capability.
#[derive(Default)]
pub(crate) struct BridgeSlot {
	bound: Option<Weak<dyn DetachBridge>>,
	fallback: Option<BridgeResolver>,
}

impl BridgeSlot {
	pub(crate) fn set_fallback(&mut self, resolver: BridgeResolver) {
		self.fallback = Some(resolver);
	}

	/// Binds `bridge` unconditionally.
	pub(crate) fn bind(&mut self, bridge: &Rc<dyn DetachBridge>) {
		self.bound = Some(Rc::downgrade(bridge));
	}

	/// Returns the bound bridge if its owner still keeps it alive.
	pub(crate) fn get(&self) -> Option<Rc<dyn DetachBridge>> {
		self.bound.as_ref()?.upgrade()
	}

	pub(crate) fn is_bound(&self) -> bool {
		self.get().is_some()
	}

	/// Binds from `controller`, then from the fallback resolver, unless a live bridge is bound.
	///
	/// Returns true if a new binding was made.
	pub(crate) fn bind_if_needed(&mut self, controller: &dyn CleanupController) -> bool {
		if self.is_bound() {
			return false;
		}
		let resolved = controller
			.detach_bridge()
			.or_else(|| self.fallback.as_ref().and_then(|resolve| resolve()));
		match resolved {
			Some(bridge) => {
				self.bind(&bridge);
				true
			}
			None => false,
		}
	}
}

impl fmt::Debug for BridgeSlot {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("BridgeSlot")
			.field("bound", &self.is_bound())
			.field("fallback", &self.fallback.is_some())
			.finish()
	}
}
