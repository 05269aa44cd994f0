//! Cancellation primitives: broadcast tokens and deadline timers.
//!
//! Cancellation is a one-shot, idempotent, broadcast signal. Scope layers
//! link tokens parent-to-child at creation time so that cancelling an
//! ancestor cancels every descendant; the reverse never happens.

mod deadline;
mod token;

pub use deadline::{DeadlineTimer, DEADLINE_EXCEEDED};
pub use token::{CancelCallback, CancellationToken};
