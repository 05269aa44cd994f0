//! Test fixtures and helpers.

mod fixtures;

pub use fixtures::registry_with_basics;
