//! Typed keys and type-erased values carried by scope bindings.

use crate::errors::KeyEncodeError;
use std::any::{Any, TypeId};
use std::borrow::Cow;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A binding key tagged with its concrete type.
///
/// Equality is by (concrete type identity, serialized value): two keys of
/// different concrete types are never equal, even when their underlying
/// representations serialize identically. The serialized fingerprint doubles
/// as the key's wire form.
#[derive(Debug, Clone)]
pub struct TypedKey {
    type_id: TypeId,
    type_name: Cow<'static, str>,
    fingerprint: serde_json::Value,
    canonical: String,
}

impl TypedKey {
    /// Creates a key from a concrete value, fingerprinting it via serde.
    ///
    /// # Errors
    ///
    /// Returns `KeyEncodeError` if the key type's `Serialize` impl fails.
    pub fn new<K>(key: &K) -> Result<Self, KeyEncodeError>
    where
        K: serde::Serialize + 'static,
    {
        let type_name = std::any::type_name::<K>();
        let fingerprint = serde_json::to_value(key).map_err(|source| KeyEncodeError {
            type_name,
            source,
        })?;
        let canonical = fingerprint.to_string();

        Ok(Self {
            type_id: TypeId::of::<K>(),
            type_name: Cow::Borrowed(type_name),
            fingerprint,
            canonical,
        })
    }

    /// Reconstitutes a key decoded from the wire.
    ///
    /// The type identity comes from the local registry entry for the wire
    /// type name, so a decoded key compares equal to a locally constructed
    /// key of the same type and value.
    pub(crate) fn from_wire(
        type_id: TypeId,
        type_name: String,
        fingerprint: serde_json::Value,
    ) -> Self {
        let canonical = fingerprint.to_string();
        Self {
            type_id,
            type_name: Cow::Owned(type_name),
            fingerprint,
            canonical,
        }
    }

    /// Returns the name of the key's concrete type.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Returns the serialized fingerprint (also the wire form of the key).
    #[must_use]
    pub fn fingerprint(&self) -> &serde_json::Value {
        &self.fingerprint
    }

    /// Deserializes the key back into its concrete type.
    #[must_use]
    pub fn value<K: serde::de::DeserializeOwned>(&self) -> Option<K> {
        serde_json::from_value(self.fingerprint.clone()).ok()
    }
}

impl PartialEq for TypedKey {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id && self.canonical == other.canonical
    }
}

impl Eq for TypedKey {}

impl Hash for TypedKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // type_name stands in for type_id so hashes agree between local and
        // wire-reconstituted keys of the same type.
        self.type_name.hash(state);
        self.canonical.hash(state);
    }
}

/// A type-erased binding value tagged with its concrete type name.
///
/// The payload stays fully typed in memory (`downcast` recovers it); the tag
/// is what the registry uses to find the serializer when the value crosses
/// the boundary.
#[derive(Clone)]
pub struct TypedValue {
    type_name: Cow<'static, str>,
    payload: Arc<dyn Any + Send + Sync>,
}

impl TypedValue {
    /// Wraps a concrete value.
    #[must_use]
    pub fn new<V>(value: V) -> Self
    where
        V: Send + Sync + 'static,
    {
        Self {
            type_name: Cow::Borrowed(std::any::type_name::<V>()),
            payload: Arc::new(value),
        }
    }

    /// Reconstitutes a value decoded from the wire.
    pub(crate) fn from_parts(type_name: String, payload: Arc<dyn Any + Send + Sync>) -> Self {
        Self {
            type_name: Cow::Owned(type_name),
            payload,
        }
    }

    /// Returns the name of the value's concrete type.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Borrows the payload as its concrete type.
    #[must_use]
    pub fn downcast_ref<V: 'static>(&self) -> Option<&V> {
        self.payload.downcast_ref()
    }

    /// Returns a shared handle to the payload as its concrete type.
    #[must_use]
    pub fn downcast<V: Send + Sync + 'static>(&self) -> Option<Arc<V>> {
        self.payload.clone().downcast().ok()
    }

    /// Borrows the erased payload for registry vtable calls.
    pub(crate) fn payload(&self) -> &(dyn Any + Send + Sync) {
        self.payload.as_ref()
    }
}

impl std::fmt::Debug for TypedValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypedValue")
            .field("type_name", &self.type_name)
            .finish()
    }
}
