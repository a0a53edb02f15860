#![cfg_attr(doc, allow(rustdoc::private_intra_doc_links))]
//! Cleanup orchestration.
//!
//! # Purpose
//!
//! [`CleanupRegistry`] tracks which view nodes each controller wants removed from the host tree
//! and, when asked, removes them deterministically. Nodes that are themselves tracked controllers
//! are not detached directly; their own entries are cleaned up in turn (a cascade).
//!
//! # Mental Model
//!
//! 1. **Register:** a controller with a [`CleanupKey`] records its nodes as weak handles. A later
//!    registration under the same key replaces the earlier one.
//! 2. **Decide:** a cleanup request consults the controller's veto hook, or the entry's stored
//!    policy when the controller is gone. A permitted forced request overrides both.
//! 3. **Partition:** live nodes are deduplicated by tag and split into plain nodes and cascade
//!    targets (see [`cascade`]).
//! 4. **Detach:** listeners hear "will begin", plain nodes go to the bridge, listeners hear
//!    "completed", and the entry leaves the table before any cascade target runs.
//! 5. **Cascade:** targets run depth-first from an explicit stack with the same sender, trigger
//!    and force flag. A target whose detach fails is restored to the table.
//!
//! # Threading
//!
//! Single-threaded. Handles are `Rc`/`Weak` and every operation runs to completion on the
//! caller's thread. Callbacks cannot re-enter the registry while it is borrowed mutably.
//!
//! # Invariants
//!
//! - Must hold at most one entry per key.
//!   - Enforced in: [`CleanupRegistry::register`]
//!   - Tested by: `invariants::test_single_entry_per_key`
//!   - Failure symptom: Stale node lists fire alongside the current one.
//!
//! - Must leave a vetoed entry untouched.
//!   - Enforced in: [`CleanupRegistry::notify_cleanup`]
//!   - Tested by: `invariants::test_veto_preserves_entry`
//!   - Failure symptom: A controller that declined cleanup loses its tracked nodes.
//!
//! - Must visit each entry at most once and detach each tag at most once per cleanup call.
//!   - Enforced in: [`CleanupRegistry::notify_cleanup`] (visited keys and detached tags shared by
//!     the whole cascade)
//!   - Tested by: `invariants::test_cyclic_cascade_terminates`
//!   - Failure symptom: Cyclic controller graphs loop or detach twice.
//!
//! - Must restore a cascade target whose detach failed.
//!   - Enforced in: [`CleanupRegistry::notify_cleanup`]
//!   - Tested by: `invariants::test_failed_cascade_is_restored`
//!   - Failure symptom: Child controllers become untracked and their nodes leak.

mod cascade;


use std::rc::Rc;

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, trace, warn};

use crate::bridge::{BridgeResolver, BridgeSlot, DetachBridge};
use crate::config::RegistryConfig;
use crate::controller::{CleanupController, CleanupEventListener};
use crate::entry::RegistryEntry;
use crate::error::{CleanupError, Result};
use crate::ids::CleanupKey;
use crate::mode::{CleanupRequest, CleanupSender, CleanupTrigger};
use crate::node::{ViewNode, WeakNode};

/// Per-registration overrides. `None` falls back to the registry configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegisterOptions {
	pub include_controller_as_node: Option<bool>,
	pub proceed_when_controller_missing: Option<bool>,
}

impl RegisterOptions {
	pub fn include_controller_as_node(mut self, include: bool) -> Self {
		self.include_controller_as_node = Some(include);
		self
	}

	pub fn proceed_when_controller_missing(mut self, proceed: bool) -> Self {
		self.proceed_when_controller_missing = Some(proceed);
		self
	}
}

/// What one keyed cleanup call did, including its cascade.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
	/// Entries cleaned up and removed, in processing order.
	pub cleaned: Vec<CleanupKey>,
	/// Entries whose controller or missing-controller policy declined cleanup.
	pub declined: Vec<CleanupKey>,
	/// Cascade targets whose detach failed; they were restored to the table.
	pub failed: Vec<CleanupKey>,
	/// Number of detach calls issued to the bridge.
	pub detached: usize,
}

impl CleanupReport {
	/// Returns true if the call changed nothing.
	pub fn is_noop(&self) -> bool {
		self.cleaned.is_empty() && self.detached == 0
	}
}

enum EntryOutcome {
	Missing,
	Declined,
	Cleaned(cascade::Partition),
}

#[derive(Clone, Copy)]
enum Phase {
	WillBegin,
	Completed,
}

/// Table of cleanup entries plus the bridge used to detach their nodes.
#[derive(Debug, Default)]
pub struct CleanupRegistry {
	entries: FxHashMap<CleanupKey, RegistryEntry>,
	bridge: BridgeSlot,
	config: RegistryConfig,
}

impl CleanupRegistry {
	pub fn new(config: RegistryConfig) -> Self {
		Self {
			entries: FxHashMap::default(),
			bridge: BridgeSlot::default(),
			config,
		}
	}

	/// Installs the resolver consulted when a registering controller cannot supply a bridge.
	pub fn with_bridge_resolver(mut self, resolver: BridgeResolver) -> Self {
		self.bridge.set_fallback(resolver);
		self
	}

	pub fn set_bridge_resolver(&mut self, resolver: BridgeResolver) {
		self.bridge.set_fallback(resolver);
	}

	/// Binds `bridge` explicitly, replacing any current binding.
	pub fn bind_bridge(&mut self, bridge: &Rc<dyn DetachBridge>) {
		self.bridge.bind(bridge);
	}

	/// Returns true if a live bridge is bound.
	pub fn has_bridge(&self) -> bool {
		self.bridge.is_bound()
	}

	pub fn config(&self) -> &RegistryConfig {
		&self.config
	}

	pub fn set_config(&mut self, config: RegistryConfig) {
		self.config = config;
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn contains(&self, key: CleanupKey) -> bool {
		self.entries.contains_key(&key)
	}

	/// Returns the tracked keys in ascending order.
	pub fn keys(&self) -> Vec<CleanupKey> {
		let mut keys: Vec<_> = self.entries.keys().copied().collect();
		keys.sort_unstable();
		keys
	}

	pub fn get_entry(&self, key: CleanupKey) -> Option<&RegistryEntry> {
		self.entries.get(&key)
	}

	/// Starts tracking `controller` and `initial_views`.
	///
	/// Returns the key the entry was stored under, or `None` if the controller exposes no key.
	pub fn register(
		&mut self,
		controller: &Rc<dyn CleanupController>,
		initial_views: &[Rc<dyn ViewNode>],
		options: RegisterOptions,
	) -> Option<CleanupKey> {
		let Some(key) = controller.cleanup_key() else {
			trace!("controller has no cleanup key, not tracked");
			return None;
		};

		if self.bridge.bind_if_needed(&**controller) {
			debug!(?key, "bound detach bridge");
		}

		let include_controller = options
			.include_controller_as_node
			.unwrap_or(self.config.include_controller_by_default);
		let proceed_when_missing = options
			.proceed_when_controller_missing
			.unwrap_or(self.config.proceed_when_controller_missing_by_default);

		let mut views: Vec<WeakNode> = initial_views.iter().map(WeakNode::new).collect();
		if include_controller && let Some(node) = Rc::clone(controller).as_view_node() {
			views.push(WeakNode::new(&node));
		}

		debug!(
			?key,
			views = views.len(),
			include_controller,
			proceed_when_missing,
			"register"
		);

		let entry = RegistryEntry::new(
			key,
			controller,
			views,
			proceed_when_missing,
			controller.cleanup_mode(),
		);
		if self.entries.insert(key, entry).is_some() {
			debug!(?key, "replaced existing entry");
		}
		Some(key)
	}

	/// Stops tracking `controller` without cleaning anything up.
	///
	/// Looks up by key first and falls back to a scan by controller identity for controllers
	/// whose key is no longer available.
	pub fn unregister(&mut self, controller: &Rc<dyn CleanupController>) -> Option<RegistryEntry> {
		let key = controller
			.cleanup_key()
			.filter(|key| self.entries.contains_key(key))
			.or_else(|| {
				self.entries
					.values()
					.find(|entry| entry.is_owned_by(controller))
					.map(|entry| entry.key)
			})?;
		let removed = self.entries.remove(&key);
		debug!(?key, "unregister");
		removed
	}

	/// Adds nodes to an existing entry. Returns false if no entry has `key`.
	pub fn append_views(&mut self, key: CleanupKey, views: &[Rc<dyn ViewNode>]) -> bool {
		let Some(entry) = self.entries.get_mut(&key) else {
			return false;
		};
		entry.views_to_cleanup.extend(views.iter().map(WeakNode::new));
		true
	}

	/// Subscribes `listener` to an entry's cleanup events. Returns false if no entry has `key`.
	///
	/// Listeners are held weakly; adding the same listener twice has no effect.
	pub fn add_event_listener(
		&mut self,
		key: CleanupKey,
		listener: &Rc<dyn CleanupEventListener>,
	) -> bool {
		let Some(entry) = self.entries.get_mut(&key) else {
			return false;
		};
		entry
			.event_listeners
			.retain(|existing| existing.strong_count() > 0);
		let present = entry
			.event_listeners
			.iter()
			.any(|existing| std::ptr::addr_eq(existing.as_ptr(), Rc::as_ptr(listener)));
		if !present {
			entry.event_listeners.push(Rc::downgrade(listener));
		}
		true
	}

	/// Unsubscribes `listener`. Returns true if it was subscribed.
	pub fn remove_event_listener(
		&mut self,
		key: CleanupKey,
		listener: &Rc<dyn CleanupEventListener>,
	) -> bool {
		let Some(entry) = self.entries.get_mut(&key) else {
			return false;
		};
		let before = entry.event_listeners.len();
		entry
			.event_listeners
			.retain(|existing| !std::ptr::addr_eq(existing.as_ptr(), Rc::as_ptr(listener)));
		entry.event_listeners.len() != before
	}

	/// Cleans up the entry under `key` and cascades into the entries its nodes lead to.
	///
	/// Missing entries, a global disable and controller veto are all successful no-ops. The only
	/// error is [`CleanupError::NoBridge`] for the entry under `key` itself; cascade failures are
	/// recovered locally and listed in [`CleanupReport::failed`].
	pub fn notify_cleanup(
		&mut self,
		key: CleanupKey,
		sender: CleanupSender,
		force_cleanup: bool,
		trigger: Option<CleanupTrigger>,
	) -> Result<CleanupReport> {
		let mut report = CleanupReport::default();
		if self.config.globally_disable_cleanup {
			trace!(?key, "cleanup globally disabled");
			return Ok(report);
		}

		let request = CleanupRequest {
			sender,
			trigger,
			forced: self.config.effective_force(force_cleanup),
		};

		let mut detached = FxHashSet::default();
		let EntryOutcome::Cleaned(root) =
			self.cleanup_entry(key, &request, &mut detached, &mut report)?
		else {
			return Ok(report);
		};

		let mut visited = FxHashSet::default();
		visited.insert(key);
		let mut stack: Vec<RegistryEntry> = root.cascade.into_iter().rev().collect();

		while let Some(target) = stack.pop() {
			if !visited.insert(target.key) {
				continue;
			}
			match self.cleanup_entry(target.key, &request, &mut detached, &mut report) {
				Ok(EntryOutcome::Cleaned(partition)) => {
					stack.extend(partition.cascade.into_iter().rev());
				}
				Ok(EntryOutcome::Missing | EntryOutcome::Declined) => {}
				Err(error) => {
					warn!(parent = ?key, key = ?target.key, %error, "cascade cleanup failed, restoring entry");
					report.failed.push(target.key);
					self.entries.insert(target.key, target);
				}
			}
		}

		debug!(
			?key,
			trigger = trigger.map(CleanupTrigger::as_str),
			cleaned = report.cleaned.len(),
			failed = report.failed.len(),
			detached = report.detached,
			"cleanup finished"
		);
		Ok(report)
	}

	/// Best-effort cleanup on behalf of `controller`; failures are logged, never returned.
	pub fn notify_cleanup_for(
		&mut self,
		controller: &Rc<dyn CleanupController>,
		force_cleanup: bool,
		trigger: Option<CleanupTrigger>,
	) {
		let Some(key) = controller.cleanup_key() else {
			return;
		};
		if let Err(error) =
			self.notify_cleanup(key, CleanupSender::Controller(key), force_cleanup, trigger)
		{
			warn!(?key, %error, "cleanup failed");
		}
	}

	/// Runs the keyed cleanup for every tracked entry, in key order.
	///
	/// Entries consumed by an earlier entry's cascade are skipped.
	pub fn notify_cleanup_all(
		&mut self,
		sender: CleanupSender,
		force_cleanup: bool,
		trigger: Option<CleanupTrigger>,
	) -> Vec<(CleanupKey, Result<CleanupReport>)> {
		let keys = self.keys();
		let mut results = Vec::with_capacity(keys.len());
		for key in keys {
			if !self.entries.contains_key(&key) {
				continue;
			}
			results.push((key, self.notify_cleanup(key, sender, force_cleanup, trigger)));
		}
		results
	}

	/// Decide, partition, notify, detach and remove a single entry.
	///
	/// `detached` holds the tags already detached by this cleanup call; they are skipped and the
	/// tags detached here are added on success.
	fn cleanup_entry(
		&mut self,
		key: CleanupKey,
		request: &CleanupRequest,
		detached: &mut FxHashSet<CleanupKey>,
		report: &mut CleanupReport,
	) -> Result<EntryOutcome> {
		let Some(entry) = self.entries.get(&key).cloned() else {
			return Ok(EntryOutcome::Missing);
		};
		let controller = entry.controller();

		let mut proceed = match &controller {
			Some(controller) => controller.should_proceed_cleanup(request, &entry),
			None => entry.should_proceed_when_controller_missing,
		};
		if request.forced {
			proceed = true;
		}
		if !proceed {
			trace!(
				?key,
				controller_alive = controller.is_some(),
				"cleanup declined"
			);
			report.declined.push(key);
			return Ok(EntryOutcome::Declined);
		}

		let partition = cascade::partition(&entry, &self.entries, detached);

		notify(Phase::WillBegin, controller.as_ref(), &entry);
		report.detached += self.detach(key, &partition.plain)?;
		detached.extend(partition.plain.iter().map(|node| node.tag()));
		notify(Phase::Completed, controller.as_ref(), &entry);

		self.entries.remove(&key);
		report.cleaned.push(key);
		trace!(
			?key,
			plain = partition.plain.len(),
			cascade = partition.cascade.len(),
			"entry cleaned"
		);
		Ok(EntryOutcome::Cleaned(partition))
	}

	fn detach(&self, key: CleanupKey, nodes: &[Rc<dyn ViewNode>]) -> Result<usize> {
		if nodes.is_empty() {
			return Ok(0);
		}
		let Some(bridge) = self.bridge.get() else {
			warn!(?key, nodes = nodes.len(), "no detach bridge bound");
			return Err(CleanupError::NoBridge { key });
		};
		for node in nodes {
			bridge.detach_subtree(node);
		}
		Ok(nodes.len())
	}
}

fn notify(phase: Phase, controller: Option<&Rc<dyn CleanupController>>, entry: &RegistryEntry) {
	if let Some(controller) = controller {
		match phase {
			Phase::WillBegin => controller.on_cleanup_will_begin(entry),
			Phase::Completed => controller.on_cleanup_completed(entry),
		}
	}
	for listener in entry.live_listeners() {
		match phase {
			Phase::WillBegin => listener.on_cleanup_will_begin(controller, entry),
			Phase::Completed => listener.on_cleanup_completed(controller, entry),
		}
	}
}
