//! Error types for the scopewire crate.
//!
//! Per-entry problems (an unregistered or undecodable binding) are absorbed
//! where they occur and surface only as `tracing` diagnostics. The types here
//! cover the failures that do propagate to the caller: key fingerprinting,
//! snapshot encoding, and structurally invalid snapshot payloads.

use thiserror::Error;

/// The main error type for scopewire operations.
#[derive(Debug, Error)]
pub enum ScopeWireError {
    /// A key could not be fingerprinted at binding time.
    #[error("{0}")]
    KeyEncode(#[from] KeyEncodeError),

    /// A snapshot could not be serialized.
    #[error("{0}")]
    Encode(#[from] EncodeError),

    /// A snapshot payload could not be decoded.
    #[error("{0}")]
    Decode(#[from] DecodeError),
}

/// Error raised when a key's serialized fingerprint cannot be produced.
///
/// Keys are fingerprinted once, when the binding is created; a key type whose
/// `Serialize` impl fails (for example a map with non-string keys) is rejected
/// here rather than at extraction time.
#[derive(Debug, Error)]
#[error("failed to fingerprint key of type {type_name}: {source}")]
pub struct KeyEncodeError {
    /// The concrete key type that failed.
    pub type_name: &'static str,
    /// The underlying serialization error.
    #[source]
    pub source: serde_json::Error,
}

/// Error raised when a snapshot cannot be serialized to bytes.
///
/// Individual binding payloads that fail to serialize are dropped per entry
/// and never reach this error; this covers the envelope itself.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// The snapshot envelope failed to serialize.
    #[error("snapshot serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Error raised when a snapshot byte payload cannot be decoded.
///
/// These are fatal to the decode call that raised them: no partial snapshot
/// is returned. A binding whose type is simply absent from the local registry
/// is not an error; it is dropped per entry with a diagnostic.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The byte payload is structurally invalid (truncated, not a snapshot
    /// envelope, bad field types).
    #[error("malformed snapshot payload: {0}")]
    Malformed(String),

    /// The payload declares a wire version this build does not understand.
    #[error("unsupported snapshot version {found} (expected {expected})")]
    UnsupportedVersion {
        /// The version found in the payload.
        found: u32,
        /// The version this build expects.
        expected: u32,
    },
}

/// Error raised when a single type-erased payload cannot be encoded or
/// decoded through its registry entry.
///
/// Never propagated out of extraction or codec calls; callers there absorb it
/// per entry. Exposed so registry vtable functions have a concrete error type.
#[derive(Debug, Error)]
pub enum PayloadError {
    /// The erased payload is not the type its tag claims.
    #[error("payload is not a {expected}")]
    TypeMismatch {
        /// The type the tag named.
        expected: &'static str,
    },

    /// The payload failed to (de)serialize as its registered type.
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
}
