use std::fmt;
use std::rc::{Rc, Weak};

use crate::controller::{CleanupController, CleanupEventListener};
use crate::ids::CleanupKey;
use crate::mode::CleanupMode;
use crate::node::{ViewNode, WeakNode};

/// One controller's cleanup job.
///
/// Entries are plain data; only the registry mutates them. Cloning an entry produces a snapshot
/// that shares the same weak handles.
#[derive(Clone)]
pub struct RegistryEntry {
	pub key: CleanupKey,
	pub controller: Weak<dyn CleanupController>,
	pub views_to_cleanup: Vec<WeakNode>,
	/// Policy captured at registration for when `controller` is gone at cleanup time.
	pub should_proceed_when_controller_missing: bool,
	pub cleanup_mode: CleanupMode,
	pub event_listeners: Vec<Weak<dyn CleanupEventListener>>,
}

impl RegistryEntry {
	pub fn new(
		key: CleanupKey,
		controller: &Rc<dyn CleanupController>,
		views_to_cleanup: Vec<WeakNode>,
		should_proceed_when_controller_missing: bool,
		cleanup_mode: CleanupMode,
	) -> Self {
		Self {
			key,
			controller: Rc::downgrade(controller),
			views_to_cleanup,
			should_proceed_when_controller_missing,
			cleanup_mode,
			event_listeners: Vec::new(),
		}
	}

	/// Resolves the controller, if it is still alive.
	pub fn controller(&self) -> Option<Rc<dyn CleanupController>> {
		self.controller.upgrade()
	}

	/// Returns true if `controller` is the object this entry was registered for.
	pub fn is_owned_by(&self, controller: &Rc<dyn CleanupController>) -> bool {
		std::ptr::addr_eq(self.controller.as_ptr(), Rc::as_ptr(controller))
	}

	/// Returns true if both entries were registered for the same controller object.
	pub fn shares_controller_with(&self, other: &RegistryEntry) -> bool {
		std::ptr::addr_eq(self.controller.as_ptr(), other.controller.as_ptr())
	}

	/// Returns the nodes that are still alive, in list order.
	pub fn live_views(&self) -> Vec<Rc<dyn ViewNode>> {
		self.views_to_cleanup.iter().filter_map(WeakNode::upgrade).collect()
	}

	/// Returns the live listeners, in registration order.
	pub(crate) fn live_listeners(&self) -> Vec<Rc<dyn CleanupEventListener>> {
		self.event_listeners.iter().filter_map(Weak::upgrade).collect()
	}

	/// Returns true if `other` carries the same key, controller, policy, mode and node handles.
	pub fn same_contents(&self, other: &RegistryEntry) -> bool {
		self.key == other.key
			&& self.shares_controller_with(other)
			&& self.should_proceed_when_controller_missing
				== other.should_proceed_when_controller_missing
			&& self.cleanup_mode == other.cleanup_mode
			&& self.views_to_cleanup.len() == other.views_to_cleanup.len()
			&& self
				.views_to_cleanup
				.iter()
				.zip(&other.views_to_cleanup)
				.all(|(a, b)| a.ptr_eq(b))
	}
}

// Identity is the key.
impl PartialEq for RegistryEntry {
	fn eq(&self, other: &Self) -> bool {
		self.key == other.key
	}
}

impl Eq for RegistryEntry {}

impl fmt::Debug for RegistryEntry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RegistryEntry")
			.field("key", &self.key)
			.field("controller_alive", &(self.controller.strong_count() > 0))
			.field("views_to_cleanup", &self.views_to_cleanup)
			.field(
				"should_proceed_when_controller_missing",
				&self.should_proceed_when_controller_missing,
			)
			.field("cleanup_mode", &self.cleanup_mode)
			.field("event_listeners", &self.event_listeners.len())
			.finish()
	}
}
