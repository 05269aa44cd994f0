//! Flattening a scope chain into a snapshot.

use super::Snapshot;
use crate::registry::TypeRegistry;
use crate::scope::{ScopeChain, ScopeNode};
use crate::utils::short_id;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Walks `chain` from leaf to root and flattens it into a [`Snapshot`].
///
/// - The first deadline met on the walk is kept without comparison: creation
///   already clamps a child's deadline to never pass its parent's, so the
///   first one is the overall earliest.
/// - Any cancellable or deadline layer marks the snapshot cancellable.
/// - Bindings merge nearest-to-leaf-wins: a key set closer to the leaf is
///   never overwritten by an ancestor's value.
/// - A binding whose key or value type is missing from `registry` is dropped
///   with a diagnostic; the walk itself never aborts.
///
/// Extraction is a synchronous read over an immutable structure. The result
/// reflects whatever state was observed at one conceptual instant; a
/// cancellation racing with the walk simply shows up (or not) in the
/// `cancellable` flag, with no special-casing.
#[must_use]
pub fn extract(chain: &ScopeChain, registry: &TypeRegistry) -> Snapshot {
    let mut deadline = None;
    let mut cancellable = false;
    let mut bindings = HashMap::new();

    let mut node = chain.node().as_ref();
    loop {
        match node {
            ScopeNode::Empty => break,
            ScopeNode::Deadline { parent, at, .. } => {
                // First deadline on the leaf-to-root walk is the earliest.
                if deadline.is_none() {
                    deadline = Some(*at);
                }
                cancellable = true;
                node = parent.as_ref();
            }
            ScopeNode::Cancellable { parent, .. } => {
                cancellable = true;
                node = parent.as_ref();
            }
            ScopeNode::Binding { parent, key, value } => {
                if bindings.contains_key(key) {
                    // A layer closer to the leaf already set this key.
                    debug!(key_type = key.type_name(), "binding shadowed, keeping nearer value");
                } else if !registry.is_registered_name(key.type_name()) {
                    warn!(
                        key_type = key.type_name(),
                        "dropping binding: key type not registered"
                    );
                } else if !registry.is_registered_name(value.type_name()) {
                    warn!(
                        key_type = key.type_name(),
                        value_type = value.type_name(),
                        "dropping binding: value type not registered"
                    );
                } else {
                    bindings.insert(key.clone(), value.clone());
                }
                node = parent.as_ref();
            }
        }
    }

    let snapshot = Snapshot::new(deadline, cancellable, bindings);
    debug!(
        snapshot = %short_id(&snapshot.snapshot_id()),
        bindings = snapshot.len(),
        cancellable = snapshot.cancellable(),
        has_deadline = snapshot.deadline().is_some(),
        "extracted scope chain"
    );
    snapshot
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::registry_with_basics;
    use crate::utils::now_utc;
    use chrono::Duration as ChronoDuration;
    use pretty_assertions::assert_eq;
    use serde::{Deserialize, Serialize};

    #[test]
    fn test_empty_chain_extracts_empty_snapshot() {
        let registry = registry_with_basics();
        let snapshot = extract(&ScopeChain::root(), &registry);

        assert!(snapshot.is_empty());
        assert!(!snapshot.cancellable());
        assert!(snapshot.deadline().is_none());
    }

    #[test]
    fn test_first_deadline_wins_over_ancestors() {
        let registry = registry_with_basics();
        let far = now_utc() + ChronoDuration::seconds(60);
        let near = now_utc() + ChronoDuration::seconds(2);

        let (chain, _h1) = ScopeChain::root().with_deadline(far);
        let (chain, _h2) = chain.with_deadline(near);

        let snapshot = extract(&chain, &registry);
        assert_eq!(snapshot.deadline(), Some(near));
        assert!(snapshot.cancellable());
    }

    #[test]
    fn test_cancellable_without_deadline() {
        let registry = registry_with_basics();
        let (chain, _handle) = ScopeChain::root().with_cancel();

        let snapshot = extract(&chain, &registry);
        assert!(snapshot.cancellable());
        assert!(snapshot.deadline().is_none());
    }

    #[test]
    fn test_shadowing_resolved_during_walk() {
        let registry = registry_with_basics();
        let chain = ScopeChain::root()
            .bind(&"user".to_string(), "alice".to_string())
            .unwrap()
            .bind(&"user".to_string(), "bob".to_string())
            .unwrap();

        let snapshot = extract(&chain, &registry);
        assert_eq!(snapshot.len(), 1);
        assert_eq!(
            snapshot.get::<String, String>(&"user".to_string()).unwrap().as_str(),
            "bob"
        );
    }

    #[test]
    fn test_unregistered_value_type_dropped_silently() {
        #[derive(Serialize, Deserialize)]
        struct Unregistered(u8);

        let registry = registry_with_basics();
        let chain = ScopeChain::root()
            .bind(&"a".to_string(), "one".to_string())
            .unwrap()
            .bind(&"b".to_string(), Unregistered(1))
            .unwrap()
            .bind(&"c".to_string(), "three".to_string())
            .unwrap();

        let snapshot = extract(&chain, &registry);

        // Exactly the two registered bindings survive; no error raised.
        assert_eq!(snapshot.len(), 2);
        assert!(snapshot.get::<String, String>(&"a".to_string()).is_some());
        assert!(snapshot.get::<String, String>(&"c".to_string()).is_some());
    }

    #[test]
    fn test_interleaved_deadlines_and_shadowed_bindings() {
        // Empty -> Deadline(+5s) -> Binding(user, alice)
        //       -> Deadline(+2s) -> Binding(user, bob)
        let registry = registry_with_basics();
        let plus_5 = now_utc() + ChronoDuration::seconds(5);
        let plus_2 = now_utc() + ChronoDuration::seconds(2);

        let (chain, _h1) = ScopeChain::root().with_deadline(plus_5);
        let chain = chain.bind(&"user".to_string(), "alice".to_string()).unwrap();
        let (chain, _h2) = chain.with_deadline(plus_2);
        let chain = chain.bind(&"user".to_string(), "bob".to_string()).unwrap();

        let snapshot = extract(&chain, &registry);

        assert_eq!(snapshot.deadline(), Some(plus_2));
        assert!(snapshot.cancellable());
        assert_eq!(snapshot.len(), 1);
        assert_eq!(
            snapshot.get::<String, String>(&"user".to_string()).unwrap().as_str(),
            "bob"
        );
    }

    #[test]
    fn test_extraction_reflects_observed_cancellation() {
        let registry = registry_with_basics();
        let (chain, handle) = ScopeChain::root().with_cancel();
        handle.cancel("stopped before extraction");

        // Cancellation state does not abort extraction; the flag is all
        // that crosses the boundary.
        let snapshot = extract(&chain, &registry);
        assert!(snapshot.cancellable());
    }
}
