use std::rc::Rc;

use crate::ids::CleanupKey;
use crate::mode::CleanupSender;
use crate::registry::{CleanupRegistry, RegisterOptions};
use crate::test_fixtures::{EventLog, TestController, as_node, bridge, controller, node};

/// Must hold at most one entry per key.
///
/// - Enforced in: `CleanupRegistry::register`
/// - Failure symptom: Stale node lists fire alongside the current one.
#[cfg_attr(test, test)]
pub(crate) fn test_single_entry_per_key() {
	let log = Rc::new(EventLog::default());
	let host = bridge(&log);
	let mut registry = CleanupRegistry::default();
	registry.bind_bridge(&host);

	let first = TestController::detached(1, &log);
	let second = TestController::detached(1, &log);
	let stale = node(10);
	let current = node(11);
	registry.register(&controller(&first), &[stale.clone()], RegisterOptions::default());
	registry.register(&controller(&second), &[current.clone()], RegisterOptions::default());

	assert_eq!(registry.len(), 1);
	let entry = registry.get_entry(CleanupKey(1)).unwrap();
	assert!(entry.is_owned_by(&controller(&second)));

	registry
		.notify_cleanup(CleanupKey(1), CleanupSender::Host, false, None)
		.unwrap();
	assert_eq!(log.count("detach:10"), 0, "replaced node list must not fire");
	assert_eq!(log.count("detach:11"), 1);
}

/// Must leave a vetoed entry untouched.
///
/// - Enforced in: `CleanupRegistry::notify_cleanup`
/// - Failure symptom: A controller that declined cleanup loses its tracked nodes.
#[cfg_attr(test, test)]
pub(crate) fn test_veto_preserves_entry() {
	let log = Rc::new(EventLog::default());
	let host = bridge(&log);
	let mut registry = CleanupRegistry::default();
	registry.bind_bridge(&host);

	let vetoing = TestController::new(1, &log);
	let x = node(10);
	registry.register(&controller(&vetoing), &[x.clone()], RegisterOptions::default());
	let before = registry.get_entry(CleanupKey(1)).unwrap().clone();
	vetoing.set_veto(true);

	let report = registry
		.notify_cleanup(CleanupKey(1), CleanupSender::Host, false, None)
		.unwrap();
	assert!(report.is_noop());
	assert!(
		registry
			.get_entry(CleanupKey(1))
			.unwrap()
			.same_contents(&before)
	);
	assert_eq!(log.count("detach:"), 0);
	assert_eq!(log.count("will_begin:"), 0);
}

/// Must visit each entry at most once and detach each tag at most once per cleanup call.
///
/// - Enforced in: `CleanupRegistry::notify_cleanup`
/// - Failure symptom: Cyclic controller graphs loop or detach twice.
#[cfg_attr(test, test)]
pub(crate) fn test_cyclic_cascade_terminates() {
	let log = Rc::new(EventLog::default());
	let host = bridge(&log);
	let mut registry = CleanupRegistry::default();
	registry.bind_bridge(&host);

	let a = TestController::new(1, &log);
	let b = TestController::new(2, &log);
	let x = node(10);
	registry.register(
		&controller(&a),
		&[x.clone(), as_node(&b)],
		RegisterOptions::default(),
	);
	registry.register(&controller(&b), &[as_node(&a)], RegisterOptions::default());

	let report = registry
		.notify_cleanup(CleanupKey(1), CleanupSender::Host, false, None)
		.unwrap();
	assert_eq!(report.cleaned, vec![CleanupKey(1), CleanupKey(2)]);
	assert_eq!(log.count("ask:"), 2);
	for tag in ["detach:10", "detach:1", "detach:2"] {
		assert_eq!(log.count_exact(tag), 1, "{tag} must be issued exactly once");
	}
	assert_eq!(report.detached, 3);
	assert!(registry.is_empty());
}

/// Must restore a cascade target whose detach failed.
///
/// - Enforced in: `CleanupRegistry::notify_cleanup`
/// - Failure symptom: Child controllers become untracked and their nodes leak.
#[cfg_attr(test, test)]
pub(crate) fn test_failed_cascade_is_restored() {
	let log = Rc::new(EventLog::default());
	let mut registry = CleanupRegistry::default();

	// Parent has nothing to detach itself, so it succeeds without a bridge; the child does not.
	let parent = TestController::detached(1, &log);
	let child = TestController::detached(2, &log);
	let child_view = node(2);
	let y = node(20);
	registry.register(&controller(&child), &[y.clone()], RegisterOptions::default());
	registry.register(&controller(&parent), &[child_view.clone()], RegisterOptions::default());
	let before = registry.get_entry(CleanupKey(2)).unwrap().clone();

	let report = registry
		.notify_cleanup(CleanupKey(1), CleanupSender::Host, false, None)
		.unwrap();
	assert_eq!(report.cleaned, vec![CleanupKey(1)]);
	assert_eq!(report.failed, vec![CleanupKey(2)]);
	assert!(!registry.contains(CleanupKey(1)));
	assert!(
		registry
			.get_entry(CleanupKey(2))
			.unwrap()
			.same_contents(&before)
	);
}
