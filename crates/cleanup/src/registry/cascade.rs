//! Classification of an entry's nodes into plain detach targets and cascade targets.

use std::rc::Rc;

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

use crate::entry::RegistryEntry;
use crate::ids::CleanupKey;
use crate::node::{ViewNode, WeakNode};

/// Resolved nodes of one entry, split by how they are cleaned up.
#[derive(Default)]
pub(crate) struct Partition {
	/// Nodes detached directly through the bridge.
	pub plain: Vec<Rc<dyn ViewNode>>,
	/// Snapshots of other entries reached through this entry's nodes, in list order.
	pub cascade: SmallVec<[RegistryEntry; 4]>,
}

/// Walks `entry`'s node list once.
///
/// Dead handles are dropped, nodes sharing a tag are kept once, and a node only becomes a cascade
/// target when it leads to an entry owned by a different controller. Plain nodes whose tag is in
/// `already_detached` are dropped.
pub(crate) fn partition(
	entry: &RegistryEntry,
	table: &FxHashMap<CleanupKey, RegistryEntry>,
	already_detached: &FxHashSet<CleanupKey>,
) -> Partition {
	let mut out = Partition::default();
	let mut seen_tags = FxHashSet::default();
	let mut seen_targets = FxHashSet::default();

	for view in entry.views_to_cleanup.iter().filter_map(WeakNode::upgrade) {
		if !seen_tags.insert(view.tag()) {
			continue;
		}
		match cascade_target(entry, &view, table) {
			Some(target) => {
				if seen_targets.insert(target.key) {
					out.cascade.push(target.clone());
				}
			}
			None if already_detached.contains(&view.tag()) => {}
			None => out.plain.push(view),
		}
	}
	out
}

/// Capability path first, then host-tag lookup.
fn cascade_target<'a>(
	entry: &RegistryEntry,
	view: &Rc<dyn ViewNode>,
	table: &'a FxHashMap<CleanupKey, RegistryEntry>,
) -> Option<&'a RegistryEntry> {
	let by_capability = Rc::clone(view)
		.as_controller()
		.and_then(|controller| controller.cleanup_key())
		.and_then(|key| table.get(&key))
		.filter(|candidate| is_foreign(entry, candidate));
	by_capability.or_else(|| {
		table
			.get(&view.tag())
			.filter(|candidate| is_foreign(entry, candidate))
	})
}

fn is_foreign(entry: &RegistryEntry, candidate: &RegistryEntry) -> bool {
	candidate.key != entry.key && !candidate.shares_controller_with(entry)
}
