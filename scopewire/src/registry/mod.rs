//! Type registry and the typed key/value payloads it governs.
//!
//! Only registered, serde-capable types ever cross the boundary. The
//! registry turns the runtime risk of unserializable payloads into a
//! registration-time constraint: closures, live handles, and opaque
//! structures simply cannot be registered.

#[allow(clippy::module_inception)]
mod registry;
mod types;

pub use registry::{global, RegistrationHandle, TypeRegistry};
pub use types::{TypedKey, TypedValue};
