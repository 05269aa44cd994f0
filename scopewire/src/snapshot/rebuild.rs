//! Reconstructing a scope chain from a decoded snapshot.

use super::Snapshot;
use crate::scope::{CancelHandle, ScopeChain};
use tracing::debug;

/// Rebuilds a behaviorally equivalent scope chain from a snapshot.
///
/// The result is always a single flattened chain:
/// `Empty -> Binding(k1,v1) -> ... -> [Deadline | Cancellable]` - all
/// bindings layered directly on the root, with at most one
/// deadline/cancellable wrapper at the outermost layer. Binding order does
/// not matter: the snapshot already resolved shadowing and holds unique
/// keys. The chain reads the same as the original but is not further
/// decomposable into the original sub-scopes.
///
/// The new cancellation token and timer share nothing with the origin
/// chain: cancelling the source after extraction has no effect here, and
/// vice versa. The deadline is treated as wall-clock-absolute; the local
/// countdown is `at - now` on this machine's clock, as accurate as clock
/// synchronization allows. An already-elapsed deadline yields a chain that
/// observes itself cancelled immediately.
///
/// Returns the handle when a deadline or cancellable wrapper was added, so
/// the caller can trigger cancellation locally; the deadline fires it
/// automatically.
#[must_use]
pub fn rebuild(snapshot: Snapshot) -> (ScopeChain, Option<CancelHandle>) {
    let (deadline, cancellable, bindings) = snapshot.into_parts();

    let mut chain = ScopeChain::root();
    let binding_count = bindings.len();
    for (key, value) in bindings {
        chain = chain.bind_pair(key, value);
    }

    let (chain, handle) = if let Some(at) = deadline {
        let (chain, handle) = chain.with_deadline(at);
        (chain, Some(handle))
    } else if cancellable {
        let (chain, handle) = chain.with_cancel();
        (chain, Some(handle))
    } else {
        (chain, None)
    };

    debug!(
        bindings = binding_count,
        cancellable = handle.is_some(),
        "rebuilt scope chain"
    );
    (chain, handle)
}
