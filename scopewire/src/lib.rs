//! # Scopewire
//!
//! Scopewire carries a request-scoped execution context - a composed chain
//! of cancellation signals, deadlines, and typed key/value bindings - across
//! a process or network boundary where its in-memory form cannot travel.
//!
//! - **Scope chains**: immutable, parent-linked layers with shadowing
//!   lookups, earliest-deadline-wins composition, and one-shot broadcast
//!   cancellation
//! - **Type registry**: process-wide approval list of serde-capable types
//!   allowed to cross the boundary
//! - **Snapshot engine**: flattens a chain into an immutable snapshot,
//!   serializes it to a versioned payload, and rebuilds an equivalent chain
//!   on the receiving side
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use scopewire::prelude::*;
//!
//! // Both processes register their boundary types at startup.
//! registry::global().register::<String>();
//!
//! // Sending side: compose a scope and capture it.
//! let (chain, _handle) = ScopeChain::root()
//!     .with_timeout(std::time::Duration::from_secs(5));
//! let chain = chain.bind(&"user".to_string(), "alice".to_string())?;
//! let payload = boundary::capture(&chain)?;
//!
//! // Receiving side: rebuild a live, locally cancellable chain.
//! let (chain, cancel) = boundary::restore(&payload)?;
//! ```
//!
//! Cancellation is not distributed: the rebuilt chain owns a fresh token and
//! timer, and only the deadline and accumulated values cross the boundary.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod boundary;
pub mod cancellation;
pub mod errors;
pub mod registry;
pub mod scope;
pub mod snapshot;
pub mod testing;
pub mod utils;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::boundary::{capture, restore};
    pub use crate::cancellation::{CancellationToken, DeadlineTimer, DEADLINE_EXCEEDED};
    pub use crate::errors::{
        DecodeError, EncodeError, KeyEncodeError, PayloadError, ScopeWireError,
    };
    pub use crate::registry::{
        global as global_registry, RegistrationHandle, TypeRegistry, TypedKey, TypedValue,
    };
    pub use crate::scope::{CancelHandle, ScopeChain, ScopeNode, PARENT_CANCELLED};
    pub use crate::snapshot::{decode, encode, extract, rebuild, Snapshot, WIRE_VERSION};
    pub use crate::utils::{now_utc, Timestamp};
}
