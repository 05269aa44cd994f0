//! Shared utilities: timestamps and correlation IDs.

mod timestamps;
mod uuid_utils;

pub use timestamps::{now_utc, remaining_until, Timestamp};
pub use uuid_utils::{generate_uuid, short_id};
