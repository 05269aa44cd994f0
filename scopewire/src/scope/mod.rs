//! The in-process scope chain: cancellation, deadline, and binding layers.

mod chain;
mod node;

pub use chain::{CancelHandle, ScopeChain, PARENT_CANCELLED};
pub use node::ScopeNode;
