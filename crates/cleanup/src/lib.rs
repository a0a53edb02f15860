//! Deterministic cleanup of disposable view nodes owned by controllers.
//!
//! Controllers register the nodes they want removed from the host tree when they go away. A
//! cleanup request for one controller detaches its nodes through a host-provided bridge and
//! cascades into any nested controllers found among them.
//!
//! # Modules
//!
//! - [`registry`] - The entry table and the cleanup algorithm
//! - [`controller`] - Controller and listener contracts
//! - [`node`] - View nodes and weak node handles
//! - [`bridge`] - Host detach capability
//! - [`mode`] - Triggers, modes and request context
//! - [`config`] - Registry switches, loadable from TOML
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//!
//! use reaper_cleanup::{
//! 	CleanupController, CleanupKey, CleanupRegistry, CleanupSender, DetachBridge,
//! 	RegisterOptions, ViewNode,
//! };
//!
//! struct Label(i64);
//!
//! impl ViewNode for Label {
//! 	fn tag(&self) -> CleanupKey {
//! 		CleanupKey(self.0)
//! 	}
//! }
//!
//! struct Popup;
//!
//! impl CleanupController for Popup {
//! 	fn cleanup_key(&self) -> Option<CleanupKey> {
//! 		Some(CleanupKey(1))
//! 	}
//! }
//!
//! struct Host;
//!
//! impl DetachBridge for Host {
//! 	fn detach_subtree(&self, _node: &Rc<dyn ViewNode>) {}
//! }
//!
//! let host: Rc<dyn DetachBridge> = Rc::new(Host);
//! let popup: Rc<dyn CleanupController> = Rc::new(Popup);
//! let label: Rc<dyn ViewNode> = Rc::new(Label(10));
//!
//! let mut registry = CleanupRegistry::default();
//! registry.bind_bridge(&host);
//! registry.register(&popup, &[label.clone()], RegisterOptions::default());
//!
//! let report = registry
//! 	.notify_cleanup(CleanupKey(1), CleanupSender::Host, false, None)
//! 	.unwrap();
//! assert_eq!(report.cleaned, vec![CleanupKey(1)]);
//! assert!(registry.is_empty());
//! ```

pub mod bridge;
pub mod config;
pub mod controller;
pub mod entry;
pub mod error;
pub mod ids;
pub mod mode;
pub mod node;
pub mod registry;

#[cfg(test)]
mod invariants;
#[cfg(test)]
pub(crate) mod test_fixtures;

pub use bridge::{BridgeResolver, DetachBridge};
pub use config::RegistryConfig;
pub use controller::{CleanupController, CleanupEventListener};
pub use entry::RegistryEntry;
pub use error::{CleanupError, ConfigError, Result};
pub use ids::CleanupKey;
pub use mode::{CleanupMode, CleanupRequest, CleanupSender, CleanupTrigger, CleanupTriggers};
pub use node::{ViewNode, WeakNode};
pub use registry::{CleanupRegistry, CleanupReport, RegisterOptions};
