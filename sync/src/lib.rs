//! Event-driven read-model synchronization.
//!
//! Keeps N independently-rendered views consistent with the ledger's
//! asynchronous change notifications, without each view re-implementing
//! polling or event wiring. Views register a fetch function plus the event
//! names they care about; the [`Synchronizer`] triggers refetches when
//! matching events arrive, coalesces bursts to at most one in-flight fetch
//! per subscription, and discards stale results (last-trigger-wins).

pub mod model;
pub mod synchronizer;

pub use model::{ReadModel, ReadModelState, SubscriptionId};
pub use synchronizer::Synchronizer;
