//! Contracts the registry requires from controllers and cleanup observers.

use std::rc::Rc;

use crate::bridge::DetachBridge;
use crate::entry::RegistryEntry;
use crate::ids::CleanupKey;
use crate::mode::{CleanupMode, CleanupRequest};
use crate::node::ViewNode;

/// An object responsible for the cleanup of one or more view nodes.
///
/// Controllers are owned outside the registry; the registry only keeps weak handles to them.
pub trait CleanupController {
	/// Stable identity. `None` means the controller cannot be tracked.
	fn cleanup_key(&self) -> Option<CleanupKey>;

	/// Which triggers this controller honors.
	fn cleanup_mode(&self) -> CleanupMode {
		CleanupMode::Automatic
	}

	/// Veto hook, asked only while the controller is still alive.
	///
	/// The default honors the request when the entry's mode honors its trigger. A request without
	/// a trigger is honored unless the mode is [`CleanupMode::Disabled`].
	fn should_proceed_cleanup(&self, request: &CleanupRequest, entry: &RegistryEntry) -> bool {
		match request.trigger {
			Some(trigger) => entry.cleanup_mode.honors(trigger),
			None => !entry.cleanup_mode.is_disabled(),
		}
	}

	fn on_cleanup_will_begin(&self, _entry: &RegistryEntry) {}

	fn on_cleanup_completed(&self, _entry: &RegistryEntry) {}

	/// Returns the controller as a node when it is itself part of the view tree.
	fn as_view_node(self: Rc<Self>) -> Option<Rc<dyn ViewNode>> {
		None
	}

	/// Host bridge reachable from this controller, used to bind the registry lazily.
	fn detach_bridge(&self) -> Option<Rc<dyn DetachBridge>> {
		None
	}
}

/// Observer notified around an entry's cleanup. Listeners cannot veto.
pub trait CleanupEventListener {
	fn on_cleanup_will_begin(
		&self,
		controller: Option<&Rc<dyn CleanupController>>,
		entry: &RegistryEntry,
	);

	fn on_cleanup_completed(
		&self,
		controller: Option<&Rc<dyn CleanupController>>,
		entry: &RegistryEntry,
	);
}
