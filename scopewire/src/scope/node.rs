//! The closed set of scope layer variants.

use crate::cancellation::{CancellationToken, DeadlineTimer};
use crate::registry::{TypedKey, TypedValue};
use crate::utils::Timestamp;
use std::sync::Arc;

/// One layer in a scope chain.
///
/// Chains are immutable and parent-linked: every non-`Empty` node holds
/// exactly one parent and creating a child never mutates an ancestor. The
/// variant set is closed, so walking a chain is a plain `match` - the
/// constructors already know which layer they built.
#[derive(Debug)]
pub enum ScopeNode {
    /// Terminal root layer; every chain bottoms out here.
    Empty,

    /// Adds the capability to be cancelled.
    Cancellable {
        /// The enclosing layer.
        parent: Arc<ScopeNode>,
        /// This layer's token, linked to the nearest ancestor token.
        token: Arc<CancellationToken>,
    },

    /// Adds an absolute deadline; implies cancellable.
    Deadline {
        /// The enclosing layer.
        parent: Arc<ScopeNode>,
        /// The absolute instant this scope expires, already clamped to be no
        /// later than any ancestor deadline.
        at: Timestamp,
        /// This layer's token, linked to the nearest ancestor token.
        token: Arc<CancellationToken>,
        /// Background timer that fires the token at `at`. `None` when the
        /// layer was created outside a tokio runtime; expiry is then
        /// observed lazily.
        timer: Option<DeadlineTimer>,
    },

    /// Adds exactly one key/value pair.
    Binding {
        /// The enclosing layer.
        parent: Arc<ScopeNode>,
        /// The binding key.
        key: TypedKey,
        /// The binding value.
        value: TypedValue,
    },
}

impl ScopeNode {
    /// Returns the parent layer, or `None` for `Empty`.
    #[must_use]
    pub fn parent(&self) -> Option<&Arc<ScopeNode>> {
        match self {
            Self::Empty => None,
            Self::Cancellable { parent, .. }
            | Self::Deadline { parent, .. }
            | Self::Binding { parent, .. } => Some(parent),
        }
    }

    /// Returns true for the terminal root layer.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}
