//! Read-model handles returned to subscribing views.

use std::fmt;
use tokio::sync::watch;

/// Opaque handle identifying one subscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub(crate) u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// The current state of one read model.
///
/// `data` is a possibly stale projection of ledger state. On fetch failure
/// the previous snapshot is retained and `last_error` reports the failure:
/// stale-but-available beats empty.
#[derive(Clone, Debug)]
pub struct ReadModelState<T> {
    pub data: Option<T>,
    /// The trigger version the data reflects; monotonic per subscription.
    pub version: u64,
    /// Set when the identity/chain context switched after `data` was fetched.
    pub stale: bool,
    pub last_error: Option<String>,
}

impl<T> ReadModelState<T> {
    pub(crate) fn empty() -> Self {
        Self {
            data: None,
            version: 0,
            stale: false,
            last_error: None,
        }
    }
}

/// A live read model, handed to the view that registered it.
///
/// Dropping the handle does not tear the subscription down; call
/// [`crate::Synchronizer::unsubscribe`] for deterministic teardown.
pub struct ReadModel<T> {
    pub(crate) id: SubscriptionId,
    pub(crate) rx: watch::Receiver<ReadModelState<T>>,
}

impl<T: Clone> ReadModel<T> {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// A receiver for observing state changes; always holds the latest state.
    pub fn watch(&self) -> watch::Receiver<ReadModelState<T>> {
        self.rx.clone()
    }

    /// The latest state.
    pub fn current(&self) -> ReadModelState<T> {
        self.rx.borrow().clone()
    }
}
