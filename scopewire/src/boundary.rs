//! Application-facing compositions over the global registry.
//!
//! The transport that moves the bytes is an external collaborator: it owns
//! framing, delivery, and ordering. This module only turns a chain into a
//! payload on the sending side and a payload back into a live chain on the
//! receiving side. Both sides must have registered the same key/value types
//! with [`registry::global`] beforehand.

use crate::errors::{DecodeError, EncodeError};
use crate::registry;
use crate::scope::{CancelHandle, ScopeChain};
use crate::snapshot::{decode, encode, extract, rebuild};

/// Flattens `chain` and serializes it into a transmissible payload.
///
/// # Errors
///
/// Returns `EncodeError` if the snapshot envelope fails to serialize;
/// individual unregistered bindings are dropped, not errors.
pub fn capture(chain: &ScopeChain) -> Result<Vec<u8>, EncodeError> {
    let registry = registry::global();
    encode(&extract(chain, registry), registry)
}

/// Decodes a payload and rebuilds a live, locally cancellable chain.
///
/// The handle is present whenever the origin chain was cancellable or
/// carried a deadline; it shares nothing with the origin's trigger.
///
/// # Errors
///
/// Returns `DecodeError` for structurally invalid payloads.
pub fn restore(bytes: &[u8]) -> Result<(ScopeChain, Option<CancelHandle>), DecodeError> {
    let snapshot = decode(bytes, registry::global())?;
    Ok(rebuild(snapshot))
}
