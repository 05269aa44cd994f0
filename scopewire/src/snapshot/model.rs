//! The flattened, boundary-safe form of a scope chain.

use crate::registry::{TypedKey, TypedValue};
use crate::utils::{generate_uuid, now_utc, Timestamp};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// An immutable snapshot of one scope chain at one point in time.
///
/// Produced once by extraction, serialized once, consumed once by a
/// rebuilder. A snapshot is not itself a live context: it carries no token
/// and no timer, only the flattened facts - the earliest deadline, whether
/// any layer was cancellable, and the merged bindings with shadowing already
/// resolved.
#[derive(Debug, Clone)]
pub struct Snapshot {
    snapshot_id: Uuid,
    captured_at: Timestamp,
    deadline: Option<Timestamp>,
    cancellable: bool,
    bindings: HashMap<TypedKey, TypedValue>,
}

impl Snapshot {
    /// Creates a snapshot at extraction time.
    pub(crate) fn new(
        deadline: Option<Timestamp>,
        cancellable: bool,
        bindings: HashMap<TypedKey, TypedValue>,
    ) -> Self {
        Self {
            snapshot_id: generate_uuid(),
            captured_at: now_utc(),
            deadline,
            cancellable,
            bindings,
        }
    }

    /// Reconstitutes a snapshot decoded from the wire, keeping the sender's
    /// correlation metadata.
    pub(crate) fn from_wire(
        snapshot_id: Uuid,
        captured_at: Timestamp,
        deadline: Option<Timestamp>,
        cancellable: bool,
        bindings: HashMap<TypedKey, TypedValue>,
    ) -> Self {
        Self {
            snapshot_id,
            captured_at,
            deadline,
            cancellable,
            bindings,
        }
    }

    /// The correlation ID assigned at extraction.
    #[must_use]
    pub fn snapshot_id(&self) -> Uuid {
        self.snapshot_id
    }

    /// The instant the snapshot was extracted, on the sender's clock.
    #[must_use]
    pub fn captured_at(&self) -> Timestamp {
        self.captured_at
    }

    /// The single earliest deadline found anywhere in the walked chain.
    #[must_use]
    pub fn deadline(&self) -> Option<Timestamp> {
        self.deadline
    }

    /// Whether any walked layer was cancellable.
    #[must_use]
    pub fn cancellable(&self) -> bool {
        self.cancellable
    }

    /// The merged bindings, keys unique, nearest-to-leaf already won.
    #[must_use]
    pub fn bindings(&self) -> &HashMap<TypedKey, TypedValue> {
        &self.bindings
    }

    /// Typed lookup into the merged bindings.
    #[must_use]
    pub fn get<K, V>(&self, key: &K) -> Option<Arc<V>>
    where
        K: Serialize + 'static,
        V: Send + Sync + 'static,
    {
        let key = TypedKey::new(key).ok()?;
        self.bindings.get(&key)?.downcast()
    }

    /// Returns the number of merged bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Returns true if no bindings survived extraction.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Consumes the snapshot into its parts (rebuild path).
    pub(crate) fn into_parts(
        self,
    ) -> (
        Option<Timestamp>,
        bool,
        HashMap<TypedKey, TypedValue>,
    ) {
        (self.deadline, self.cancellable, self.bindings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde::Serialize;

    #[derive(Serialize, Deserialize)]
    struct UserKey;

    #[test]
    fn test_snapshot_accessors() {
        let mut bindings = HashMap::new();
        let key = TypedKey::new(&UserKey).unwrap();
        bindings.insert(key, TypedValue::new("alice".to_string()));

        let snapshot = Snapshot::new(None, true, bindings);

        assert!(snapshot.cancellable());
        assert!(snapshot.deadline().is_none());
        assert_eq!(snapshot.len(), 1);
        assert_eq!(
            snapshot.get::<UserKey, String>(&UserKey).unwrap().as_str(),
            "alice"
        );
    }

    #[test]
    fn test_snapshot_ids_are_fresh() {
        let a = Snapshot::new(None, false, HashMap::new());
        let b = Snapshot::new(None, false, HashMap::new());
        assert_ne!(a.snapshot_id(), b.snapshot_id());
        assert!(a.is_empty());
    }
}
