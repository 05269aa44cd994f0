//! Timestamp utilities for absolute deadlines.
//!
//! Deadlines cross the boundary as absolute wall-clock instants, never as
//! durations, so the receiving side re-derives the remaining time against its
//! own clock. Accuracy is bounded by clock agreement between the two
//! machines; no adjustment is attempted.

use chrono::{DateTime, Utc};
use std::time::Duration;

/// An absolute point in time, UTC.
pub type Timestamp = DateTime<Utc>;

/// Returns the current UTC timestamp.
#[must_use]
pub fn now_utc() -> Timestamp {
    Utc::now()
}

/// Returns the time remaining until `at`, or `None` if it has already passed.
#[must_use]
pub fn remaining_until(at: Timestamp) -> Option<Duration> {
    (at - now_utc()).to_std().ok()
}
