use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::bridge::DetachBridge;
use crate::controller::{CleanupController, CleanupEventListener};
use crate::entry::RegistryEntry;
use crate::ids::CleanupKey;
use crate::mode::{CleanupMode, CleanupRequest};
use crate::node::ViewNode;

/// Shared, ordered record of everything the fakes observe.
#[derive(Default)]
pub(crate) struct EventLog {
	events: RefCell<Vec<String>>,
}

impl EventLog {
	pub fn push(&self, event: impl Into<String>) {
		self.events.borrow_mut().push(event.into());
	}

	pub fn take(&self) -> Vec<String> {
		std::mem::take(&mut *self.events.borrow_mut())
	}

	pub fn count(&self, prefix: &str) -> usize {
		self.events
			.borrow()
			.iter()
			.filter(|event| event.starts_with(prefix))
			.count()
	}

	pub fn count_exact(&self, event: &str) -> usize {
		self.events.borrow().iter().filter(|seen| *seen == event).count()
	}
}

pub(crate) struct TestNode {
	tag: CleanupKey,
}

impl ViewNode for TestNode {
	fn tag(&self) -> CleanupKey {
		self.tag
	}
}

pub(crate) fn node(tag: i64) -> Rc<dyn ViewNode> {
	Rc::new(TestNode {
		tag: CleanupKey(tag),
	})
}

pub(crate) struct RecordingBridge {
	log: Rc<EventLog>,
}

impl DetachBridge for RecordingBridge {
	fn detach_subtree(&self, node: &Rc<dyn ViewNode>) {
		self.log.push(format!("detach:{}", node.tag().get()));
	}
}

pub(crate) fn bridge(log: &Rc<EventLog>) -> Rc<dyn DetachBridge> {
	Rc::new(RecordingBridge { log: log.clone() })
}

/// Controller that is also a view node, with a switchable veto and key.
pub(crate) struct TestController {
	key: Cell<Option<CleanupKey>>,
	tag: CleanupKey,
	mode: CleanupMode,
	veto: Cell<bool>,
	is_view_node: bool,
	bridge: RefCell<Option<Rc<dyn DetachBridge>>>,
	last_request: Cell<Option<CleanupRequest>>,
	log: Rc<EventLog>,
}

impl TestController {
	pub fn new(key: i64, log: &Rc<EventLog>) -> Rc<Self> {
		Self::with_mode(key, CleanupMode::Automatic, log)
	}

	pub fn with_mode(key: i64, mode: CleanupMode, log: &Rc<EventLog>) -> Rc<Self> {
		Rc::new(Self {
			key: Cell::new(Some(CleanupKey(key))),
			tag: CleanupKey(key),
			mode,
			veto: Cell::new(false),
			is_view_node: true,
			bridge: RefCell::new(None),
			last_request: Cell::new(None),
			log: log.clone(),
		})
	}

	/// A controller that never appears in the view tree.
	pub fn detached(key: i64, log: &Rc<EventLog>) -> Rc<Self> {
		Rc::new(Self {
			key: Cell::new(Some(CleanupKey(key))),
			tag: CleanupKey(key),
			mode: CleanupMode::Automatic,
			veto: Cell::new(false),
			is_view_node: false,
			bridge: RefCell::new(None),
			last_request: Cell::new(None),
			log: log.clone(),
		})
	}

	pub fn set_veto(&self, veto: bool) {
		self.veto.set(veto);
	}

	pub fn clear_key(&self) {
		self.key.set(None);
	}

	pub fn supply_bridge(&self, bridge: &Rc<dyn DetachBridge>) {
		*self.bridge.borrow_mut() = Some(bridge.clone());
	}

	pub fn last_request(&self) -> Option<CleanupRequest> {
		self.last_request.get()
	}
}

impl ViewNode for TestController {
	fn tag(&self) -> CleanupKey {
		self.tag
	}

	fn as_controller(self: Rc<Self>) -> Option<Rc<dyn CleanupController>> {
		Some(self)
	}
}

impl CleanupController for TestController {
	fn cleanup_key(&self) -> Option<CleanupKey> {
		self.key.get()
	}

	fn cleanup_mode(&self) -> CleanupMode {
		self.mode
	}

	fn should_proceed_cleanup(&self, request: &CleanupRequest, _entry: &RegistryEntry) -> bool {
		self.last_request.set(Some(*request));
		self.log.push(format!("ask:{}", self.tag.get()));
		!self.veto.get()
	}

	fn on_cleanup_will_begin(&self, entry: &RegistryEntry) {
		self.log.push(format!("will_begin:{}", entry.key.get()));
	}

	fn on_cleanup_completed(&self, entry: &RegistryEntry) {
		self.log.push(format!("completed:{}", entry.key.get()));
	}

	fn as_view_node(self: Rc<Self>) -> Option<Rc<dyn ViewNode>> {
		if self.is_view_node {
			Some(self)
		} else {
			None
		}
	}

	fn detach_bridge(&self) -> Option<Rc<dyn DetachBridge>> {
		self.bridge.borrow().clone()
	}
}

pub(crate) fn controller(c: &Rc<TestController>) -> Rc<dyn CleanupController> {
	c.clone()
}

pub(crate) fn as_node(c: &Rc<TestController>) -> Rc<dyn ViewNode> {
	c.clone()
}

/// Controller relying on the trait's default veto behavior.
pub(crate) struct ModeController {
	pub key: CleanupKey,
	pub mode: CleanupMode,
}

impl CleanupController for ModeController {
	fn cleanup_key(&self) -> Option<CleanupKey> {
		Some(self.key)
	}

	fn cleanup_mode(&self) -> CleanupMode {
		self.mode
	}
}

pub(crate) struct RecordingListener {
	pub name: &'static str,
	pub log: Rc<EventLog>,
}

impl CleanupEventListener for RecordingListener {
	fn on_cleanup_will_begin(
		&self,
		controller: Option<&Rc<dyn CleanupController>>,
		entry: &RegistryEntry,
	) {
		self.log.push(format!(
			"{}:will_begin:{}:{}",
			self.name,
			entry.key.get(),
			controller.is_some()
		));
	}

	fn on_cleanup_completed(
		&self,
		controller: Option<&Rc<dyn CleanupController>>,
		entry: &RegistryEntry,
	) {
		self.log.push(format!(
			"{}:completed:{}:{}",
			self.name,
			entry.key.get(),
			controller.is_some()
		));
	}
}

pub(crate) fn listener(name: &'static str, log: &Rc<EventLog>) -> Rc<dyn CleanupEventListener> {
	Rc::new(RecordingListener {
		name,
		log: log.clone(),
	})
}
