//! Scope chain construction and lookup.

use super::ScopeNode;
use crate::cancellation::{CancellationToken, DeadlineTimer, DEADLINE_EXCEEDED};
use crate::errors::KeyEncodeError;
use crate::registry::{TypedKey, TypedValue};
use crate::utils::{now_utc, Timestamp};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// The cancellation reason recorded when an ancestor scope is cancelled.
pub const PARENT_CANCELLED: &str = "parent scope cancelled";

/// A handle for triggering cancellation of a scope locally.
///
/// Returned by the cancellable constructors and by the rebuilder. Triggering
/// is one-shot and idempotent; the deadline timer (if any) fires the same
/// token automatically.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    token: Arc<CancellationToken>,
}

impl CancelHandle {
    pub(crate) fn new(token: Arc<CancellationToken>) -> Self {
        Self { token }
    }

    /// Cancels the scope with a reason. Idempotent.
    pub fn cancel(&self, reason: impl Into<String>) {
        self.token.cancel(reason);
    }

    /// Returns whether the scope has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Returns the cancellation reason, if any.
    #[must_use]
    pub fn reason(&self) -> Option<String> {
        self.token.reason()
    }
}

/// An immutable, parent-linked chain of scope layers.
///
/// `ScopeChain` is a cheap-to-clone handle onto one concrete chain instance.
/// Deriving a child chain (`with_cancel`, `with_deadline`, `bind`) never
/// mutates the parent, so sibling chains share ancestors freely across
/// threads.
#[derive(Debug, Clone)]
pub struct ScopeChain {
    node: Arc<ScopeNode>,
}

impl ScopeChain {
    /// Returns the empty root chain.
    #[must_use]
    pub fn root() -> Self {
        Self {
            node: Arc::new(ScopeNode::Empty),
        }
    }

    pub(crate) fn from_node(node: Arc<ScopeNode>) -> Self {
        Self { node }
    }

    pub(crate) fn node(&self) -> &Arc<ScopeNode> {
        &self.node
    }

    /// Derives a chain that can be cancelled.
    ///
    /// The new layer's token is linked to the nearest ancestor token:
    /// cancelling the ancestor cancels this scope, never the reverse.
    #[must_use]
    pub fn with_cancel(&self) -> (Self, CancelHandle) {
        let token = self.linked_token();
        let chain = Self::from_node(Arc::new(ScopeNode::Cancellable {
            parent: self.node.clone(),
            token: token.clone(),
        }));
        (chain, CancelHandle::new(token))
    }

    /// Derives a chain that expires at an absolute instant.
    ///
    /// The deadline is clamped to the nearest ancestor deadline at creation
    /// time, so a child scope never outlives its parent. This is also what
    /// lets extraction keep the first deadline it meets on a leaf-to-root
    /// walk without comparing.
    #[must_use]
    pub fn with_deadline(&self, at: Timestamp) -> (Self, CancelHandle) {
        let effective = match self.deadline() {
            Some(ancestor) if ancestor < at => ancestor,
            _ => at,
        };

        let token = self.linked_token();
        let timer = DeadlineTimer::spawn(effective, token.clone());

        let chain = Self::from_node(Arc::new(ScopeNode::Deadline {
            parent: self.node.clone(),
            at: effective,
            token: token.clone(),
            timer,
        }));
        (chain, CancelHandle::new(token))
    }

    /// Derives a chain that expires after a duration from now.
    ///
    /// Oversized durations saturate to the far-future maximum instant
    /// instead of overflowing.
    #[must_use]
    pub fn with_timeout(&self, timeout: Duration) -> (Self, CancelHandle) {
        let at = chrono::Duration::from_std(timeout)
            .ok()
            .and_then(|delta| now_utc().checked_add_signed(delta))
            .unwrap_or(Timestamp::MAX_UTC);
        self.with_deadline(at)
    }

    /// Derives a chain with one additional key/value binding.
    ///
    /// A binding for a key already present in an ancestor shadows it for
    /// lookups through this chain; the ancestor's binding is untouched and
    /// stays visible through the ancestor's own handle.
    ///
    /// # Errors
    ///
    /// Returns `KeyEncodeError` if the key cannot be fingerprinted.
    pub fn bind<K, V>(&self, key: &K, value: V) -> Result<Self, KeyEncodeError>
    where
        K: Serialize + 'static,
        V: Send + Sync + 'static,
    {
        let key = TypedKey::new(key)?;
        Ok(self.bind_pair(key, TypedValue::new(value)))
    }

    /// Derives a chain with an already-typed binding (rebuild path).
    pub(crate) fn bind_pair(&self, key: TypedKey, value: TypedValue) -> Self {
        Self::from_node(Arc::new(ScopeNode::Binding {
            parent: self.node.clone(),
            key,
            value,
        }))
    }

    /// Looks up a binding, nearest-to-leaf wins.
    #[must_use]
    pub fn value_for(&self, key: &TypedKey) -> Option<TypedValue> {
        let mut node = self.node.as_ref();
        loop {
            if let ScopeNode::Binding {
                key: bound, value, ..
            } = node
            {
                if bound == key {
                    return Some(value.clone());
                }
            }
            node = node.parent()?.as_ref();
        }
    }

    /// Typed lookup: finds the nearest binding for `key` and downcasts it.
    #[must_use]
    pub fn get<K, V>(&self, key: &K) -> Option<Arc<V>>
    where
        K: Serialize + 'static,
        V: Send + Sync + 'static,
    {
        let key = TypedKey::new(key).ok()?;
        self.value_for(&key)?.downcast()
    }

    /// Returns the effective deadline: the nearest (and therefore earliest,
    /// by clamping) deadline layer.
    #[must_use]
    pub fn deadline(&self) -> Option<Timestamp> {
        let mut node = self.node.as_ref();
        loop {
            if let ScopeNode::Deadline { at, .. } = node {
                return Some(*at);
            }
            node = node.parent()?.as_ref();
        }
    }

    /// Returns the nearest cancellation token, if any layer is cancellable.
    #[must_use]
    pub fn token(&self) -> Option<Arc<CancellationToken>> {
        let mut node = self.node.as_ref();
        loop {
            match node {
                ScopeNode::Cancellable { token, .. } | ScopeNode::Deadline { token, .. } => {
                    return Some(token.clone());
                }
                _ => node = node.parent()?.as_ref(),
            }
        }
    }

    /// Returns whether this scope has been cancelled.
    ///
    /// An elapsed deadline counts as cancelled even when no background timer
    /// was running; the expiry is recorded on the token at first observation.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        let Some(token) = self.token() else {
            return false;
        };
        if token.is_cancelled() {
            return true;
        }
        if let Some(at) = self.deadline() {
            if at <= now_utc() {
                token.cancel(DEADLINE_EXCEEDED);
                return true;
            }
        }
        false
    }

    /// Returns the cancellation reason, if the scope has been cancelled.
    #[must_use]
    pub fn cancel_reason(&self) -> Option<String> {
        if self.is_cancelled() {
            self.token()?.reason()
        } else {
            None
        }
    }

    /// Creates a fresh token linked to the nearest ancestor token so that
    /// ancestor cancellation propagates leafward.
    fn linked_token(&self) -> Arc<CancellationToken> {
        let token = CancellationToken::shared();
        if let Some(ancestor) = self.token() {
            let child = token.clone();
            ancestor.on_cancel(move || child.cancel(PARENT_CANCELLED));
        }
        token
    }
}

impl Default for ScopeChain {
    fn default() -> Self {
        Self::root()
    }
}
