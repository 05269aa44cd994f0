//! Scoped registry fixtures.
//!
//! The process-wide registry is append-only with no teardown, so tests get
//! isolation from scoped instances rather than by resetting global state.

use crate::registry::TypeRegistry;

/// Returns a fresh registry with the common primitive types registered.
#[must_use]
pub fn registry_with_basics() -> TypeRegistry {
    let registry = TypeRegistry::new();
    registry.register::<String>();
    registry.register::<i64>();
    registry.register::<bool>();
    registry
}
