//! Serializing snapshots to and from wire bytes.

use super::Snapshot;
use crate::errors::{DecodeError, EncodeError};
use crate::registry::{TypeRegistry, TypedKey, TypedValue};
use crate::utils::Timestamp;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};
use uuid::Uuid;

/// The wire format version this build reads and writes.
pub const WIRE_VERSION: u32 = 1;

/// The wire envelope: a versioned, self-describing snapshot frame.
#[derive(Debug, Serialize, Deserialize)]
struct WireSnapshot {
    version: u32,
    snapshot_id: Uuid,
    captured_at: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    deadline: Option<Timestamp>,
    cancellable: bool,
    bindings: Vec<WireBinding>,
}

/// One binding tuple: (key type-id, key bytes, value type-id, value bytes).
#[derive(Debug, Serialize, Deserialize)]
struct WireBinding {
    key_type: String,
    key: serde_json::Value,
    value_type: String,
    value: serde_json::Value,
}

/// Serializes a snapshot into a byte payload.
///
/// Bindings are written as an ordered sequence sorted by key type and key
/// bytes, so the same snapshot always encodes to the same payload. A value
/// whose type is missing from `registry`, or whose serializer fails, drops
/// that single binding with a diagnostic - the same tolerance the extractor
/// applies.
///
/// # Errors
///
/// Returns `EncodeError` only if the envelope itself fails to serialize.
pub fn encode(snapshot: &Snapshot, registry: &TypeRegistry) -> Result<Vec<u8>, EncodeError> {
    let mut bindings = Vec::with_capacity(snapshot.len());

    for (key, value) in snapshot.bindings() {
        let Some(entry) = registry.entry(value.type_name()) else {
            warn!(
                value_type = value.type_name(),
                "dropping binding at encode: value type not registered"
            );
            continue;
        };
        let encoded = match (entry.encode)(value.payload()) {
            Ok(encoded) => encoded,
            Err(error) => {
                warn!(
                    value_type = value.type_name(),
                    %error,
                    "dropping binding at encode: payload failed to serialize"
                );
                continue;
            }
        };
        bindings.push(WireBinding {
            key_type: key.type_name().to_string(),
            key: key.fingerprint().clone(),
            value_type: value.type_name().to_string(),
            value: encoded,
        });
    }

    bindings.sort_by(|a, b| {
        a.key_type
            .cmp(&b.key_type)
            .then_with(|| a.key.to_string().cmp(&b.key.to_string()))
    });

    let wire = WireSnapshot {
        version: WIRE_VERSION,
        snapshot_id: snapshot.snapshot_id(),
        captured_at: snapshot.captured_at(),
        deadline: snapshot.deadline(),
        cancellable: snapshot.cancellable(),
        bindings,
    };

    Ok(serde_json::to_vec(&wire)?)
}

/// Decodes a byte payload back into a snapshot.
///
/// Structural problems - truncated bytes, a payload that is not a snapshot
/// envelope, an unknown frame version - fail the whole call with no partial
/// snapshot. A binding whose key or value type is absent from the local
/// registry, or whose payload fails its type's deserializer, is dropped per
/// entry with a diagnostic. Failures are local to this call, never
/// process-wide.
///
/// # Errors
///
/// Returns `DecodeError::Malformed` for structurally invalid bytes and
/// `DecodeError::UnsupportedVersion` for a version mismatch.
pub fn decode(bytes: &[u8], registry: &TypeRegistry) -> Result<Snapshot, DecodeError> {
    let wire: WireSnapshot =
        serde_json::from_slice(bytes).map_err(|e| DecodeError::Malformed(e.to_string()))?;

    if wire.version != WIRE_VERSION {
        return Err(DecodeError::UnsupportedVersion {
            found: wire.version,
            expected: WIRE_VERSION,
        });
    }

    let mut bindings = HashMap::with_capacity(wire.bindings.len());
    for binding in wire.bindings {
        let Some(key_entry) = registry.entry(&binding.key_type) else {
            warn!(
                key_type = %binding.key_type,
                "dropping binding at decode: key type not registered"
            );
            continue;
        };
        let Some(value_entry) = registry.entry(&binding.value_type) else {
            warn!(
                value_type = %binding.value_type,
                "dropping binding at decode: value type not registered"
            );
            continue;
        };
        let payload = match (value_entry.decode)(binding.value) {
            Ok(payload) => payload,
            Err(error) => {
                warn!(
                    value_type = %binding.value_type,
                    %error,
                    "dropping binding at decode: payload failed to deserialize"
                );
                continue;
            }
        };

        let key = TypedKey::from_wire(key_entry.type_id, binding.key_type, binding.key);
        let value = TypedValue::from_parts(binding.value_type, payload);
        bindings.entry(key).or_insert(value);
    }

    debug!(
        bindings = bindings.len(),
        cancellable = wire.cancellable,
        "decoded snapshot"
    );

    Ok(Snapshot::from_wire(
        wire.snapshot_id,
        wire.captured_at,
        wire.deadline,
        wire.cancellable,
        bindings,
    ))
}
