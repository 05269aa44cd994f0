//! Process-wide registry of types approved for boundary crossing.

use crate::errors::PayloadError;
use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::any::{Any, TypeId};
use std::sync::{Arc, OnceLock};
use tracing::debug;

/// Erased serializer for a registered type.
pub(crate) type EncodeFn =
    fn(&(dyn Any + Send + Sync)) -> Result<serde_json::Value, PayloadError>;

/// Erased deserializer for a registered type.
pub(crate) type DecodeFn =
    fn(serde_json::Value) -> Result<Arc<dyn Any + Send + Sync>, PayloadError>;

/// A registry entry: the local type identity plus its codec vtable.
#[derive(Clone, Copy)]
pub(crate) struct TypeEntry {
    pub(crate) type_id: TypeId,
    pub(crate) encode: EncodeFn,
    pub(crate) decode: DecodeFn,
}

fn encode_erased<T: Serialize + 'static>(
    payload: &(dyn Any + Send + Sync),
) -> Result<serde_json::Value, PayloadError> {
    let value = payload
        .downcast_ref::<T>()
        .ok_or(PayloadError::TypeMismatch {
            expected: std::any::type_name::<T>(),
        })?;
    Ok(serde_json::to_value(value)?)
}

fn decode_erased<T: DeserializeOwned + Send + Sync + 'static>(
    raw: serde_json::Value,
) -> Result<Arc<dyn Any + Send + Sync>, PayloadError> {
    let value: T = serde_json::from_value(raw)?;
    Ok(Arc::new(value))
}

/// Proof that a type was registered, returned by [`TypeRegistry::register`].
#[derive(Debug, Clone, Copy)]
pub struct RegistrationHandle {
    type_name: &'static str,
    newly_registered: bool,
}

impl RegistrationHandle {
    /// Returns the registered type's name (its stable wire identifier).
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns true if this call created the entry, false if the type was
    /// already registered.
    #[must_use]
    pub fn newly_registered(&self) -> bool {
        self.newly_registered
    }
}

/// A table of key/value types approved for cross-boundary transmission.
///
/// Both sides of the boundary must register the same types before extraction
/// or decoding touches them; an entry missing on either side makes that one
/// binding drop, never the whole snapshot. Registration is idempotent and
/// append-only.
///
/// Most code uses the process-wide [`global`] registry. Instance registries
/// exist so tests get a scoped fixture instead of resetting global state.
#[derive(Default)]
pub struct TypeRegistry {
    entries: DashMap<String, TypeEntry>,
}

impl TypeRegistry {
    /// Creates a new, empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `T` for boundary crossing.
    ///
    /// Idempotent: registering the same type again returns a handle with
    /// `newly_registered() == false` and changes nothing.
    pub fn register<T>(&self) -> RegistrationHandle
    where
        T: Serialize + DeserializeOwned + Send + Sync + 'static,
    {
        let type_name = std::any::type_name::<T>();
        let mut newly_registered = false;

        self.entries
            .entry(type_name.to_string())
            .or_insert_with(|| {
                newly_registered = true;
                debug!(type_name, "registered boundary type");
                TypeEntry {
                    type_id: TypeId::of::<T>(),
                    encode: encode_erased::<T>,
                    decode: decode_erased::<T>,
                }
            });

        RegistrationHandle {
            type_name,
            newly_registered,
        }
    }

    /// Returns whether `T` is registered.
    #[must_use]
    pub fn is_registered<T: 'static>(&self) -> bool {
        self.is_registered_name(std::any::type_name::<T>())
    }

    /// Returns whether a type name has a registry entry.
    #[must_use]
    pub fn is_registered_name(&self, type_name: &str) -> bool {
        self.entries.contains_key(type_name)
    }

    /// Looks up the entry for a type name.
    pub(crate) fn entry(&self, type_name: &str) -> Option<TypeEntry> {
        self.entries.get(type_name).map(|e| *e)
    }

    /// Returns the number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no types are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("registered_types", &self.len())
            .finish()
    }
}

/// Returns the process-wide registry.
///
/// Empty at process start, append-only for the process lifetime, no
/// teardown. Application code registers its boundary types here during
/// startup, before the first extraction or decode.
#[must_use]
pub fn global() -> &'static TypeRegistry {
    static GLOBAL: OnceLock<TypeRegistry> = OnceLock::new();
    GLOBAL.get_or_init(TypeRegistry::new)
}
