//! Snapshot engine: extraction, wire codec, and reconstruction.
//!
//! A scope chain's in-memory representation cannot cross a process
//! boundary, so this module flattens one chain into an immutable
//! [`Snapshot`], moves it through bytes, and rebuilds an equivalent (but no
//! longer re-splittable) chain on the other side.

mod codec;
mod extract;
mod model;
mod rebuild;

pub use codec::{decode, encode, WIRE_VERSION};
pub use extract::extract;
pub use model::Snapshot;
pub use rebuild::rebuild;
