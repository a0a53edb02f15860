//! Request taxonomy: which events ask for cleanup, who sent them, and which ones an entry honors.
//!
//! The registry never interprets these values. They are carried unmodified to controllers and
//! event listeners so they can make their own decisions.

use crate::ids::CleanupKey;

/// The event that caused a cleanup request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CleanupTrigger {
	/// Explicit call from user code.
	ExplicitRequest,
	/// The description layer is about to unmount the component.
	ComponentWillUnmount,
	/// The node was removed from its window/tree.
	DetachedFromWindow,
	/// The host is tearing down the whole rendering layer.
	HostTeardown,
}

bitflags::bitflags! {
	/// A set of cleanup triggers.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
	pub struct CleanupTriggers: u8 {
		const EXPLICIT_REQUEST = 1 << 0;
		const COMPONENT_WILL_UNMOUNT = 1 << 1;
		const DETACHED_FROM_WINDOW = 1 << 2;
		const HOST_TEARDOWN = 1 << 3;
	}
}

impl CleanupTrigger {
	/// Returns the bitflag for this trigger.
	pub const fn as_set(self) -> CleanupTriggers {
		match self {
			Self::ExplicitRequest => CleanupTriggers::EXPLICIT_REQUEST,
			Self::ComponentWillUnmount => CleanupTriggers::COMPONENT_WILL_UNMOUNT,
			Self::DetachedFromWindow => CleanupTriggers::DETACHED_FROM_WINDOW,
			Self::HostTeardown => CleanupTriggers::HOST_TEARDOWN,
		}
	}

	pub(crate) const fn as_str(self) -> &'static str {
		match self {
			Self::ExplicitRequest => "explicit_request",
			Self::ComponentWillUnmount => "component_will_unmount",
			Self::DetachedFromWindow => "detached_from_window",
			Self::HostTeardown => "host_teardown",
		}
	}
}

impl From<CleanupTrigger> for CleanupTriggers {
	fn from(trigger: CleanupTrigger) -> Self {
		trigger.as_set()
	}
}

impl FromIterator<CleanupTrigger> for CleanupTriggers {
	fn from_iter<I: IntoIterator<Item = CleanupTrigger>>(iter: I) -> Self {
		let mut set = CleanupTriggers::empty();
		for trigger in iter {
			set |= trigger.as_set();
		}
		set
	}
}

/// Which triggers a controller's entry responds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CleanupMode {
	/// Every trigger is honored.
	#[default]
	Automatic,
	/// Only the listed triggers are honored.
	Triggers(CleanupTriggers),
	/// No trigger is honored; only a forced request can clean the entry up.
	Disabled,
}

impl CleanupMode {
	/// Returns the set of honored triggers.
	pub fn triggers(self) -> CleanupTriggers {
		match self {
			Self::Automatic => CleanupTriggers::all(),
			Self::Triggers(set) => set,
			Self::Disabled => CleanupTriggers::empty(),
		}
	}

	/// Returns true if `trigger` is honored by this mode.
	pub fn honors(self, trigger: CleanupTrigger) -> bool {
		self.triggers().contains(trigger.as_set())
	}

	pub const fn is_disabled(self) -> bool {
		matches!(self, Self::Disabled)
	}
}

/// Originator of a cleanup request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CleanupSender {
	/// Requested by (or on behalf of) the controller with this key.
	Controller(CleanupKey),
	/// Requested by the host rendering layer.
	Host,
}

/// Pass-through context handed to controllers and listeners for one cleanup request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanupRequest {
	pub sender: CleanupSender,
	pub trigger: Option<CleanupTrigger>,
	/// Whether the request is forced, after the configuration gate was applied.
	pub forced: bool,
}
