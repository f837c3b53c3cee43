//! The subscribe/invalidate/refetch engine.

use fir_ledger::{EventKind, LedgerError, LedgerEvent};
use fir_types::Identity;
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::model::{ReadModel, ReadModelState, SubscriptionId};

/// What a worker reacts to. `version` bumps request a refetch; `epoch` bumps
/// additionally mark the current snapshot stale (context switch).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Trigger {
    version: u64,
    epoch: u64,
}

struct SubEntry {
    watched: HashSet<EventKind>,
    trigger: watch::Sender<Trigger>,
    worker: JoinHandle<()>,
}

/// Registry of live subscriptions plus the event dispatcher.
///
/// All subscriptions observe a single identity/chain context; switching that
/// context atomically invalidates and re-triggers every one of them.
pub struct Synchronizer {
    subs: Mutex<HashMap<u64, SubEntry>>,
    next_id: AtomicU64,
    context: Mutex<Option<Identity>>,
}

impl Synchronizer {
    pub fn new() -> Self {
        Self {
            subs: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            context: Mutex::new(None),
        }
    }

    /// Register a view's read model.
    ///
    /// Triggers one immediate fetch (initial load). Afterwards the model
    /// refetches whenever a watched event arrives or the context switches.
    pub fn register<T, F, Fut>(
        &self,
        watched: impl IntoIterator<Item = EventKind>,
        fetch: F,
    ) -> ReadModel<T>
    where
        T: Clone + Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, LedgerError>> + Send + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (state_tx, state_rx) = watch::channel(ReadModelState::empty());
        // Version 1 against a worker that has seen 0: fires the initial load.
        let (trigger_tx, trigger_rx) = watch::channel(Trigger {
            version: 1,
            epoch: 0,
        });

        let worker = tokio::spawn(run_worker(id, trigger_rx, state_tx, fetch));

        let entry = SubEntry {
            watched: watched.into_iter().collect(),
            trigger: trigger_tx,
            worker,
        };
        debug!(%id, watched = entry.watched.len(), "read model registered");
        self.subs.lock().unwrap().insert(id.0, entry);

        ReadModel { id, rx: state_rx }
    }

    /// Deterministic teardown. After this returns, firing a watched event
    /// never invokes the model's fetch again.
    pub fn unsubscribe<T>(&self, model: &ReadModel<T>) -> bool {
        match self.subs.lock().unwrap().remove(&model.id.0) {
            Some(entry) => {
                entry.worker.abort();
                debug!(id = %model.id, "read model unsubscribed");
                true
            }
            None => false,
        }
    }

    /// Number of live subscriptions.
    pub fn len(&self) -> usize {
        self.subs.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Switch the identity/chain context all subscriptions are scoped to.
    ///
    /// Every live read model is marked stale and re-triggered in one pass;
    /// none may silently keep rendering data scoped to the old context.
    /// Repeats of the current context are ignored.
    pub fn set_context(&self, context: Option<Identity>) {
        {
            let mut current = self.context.lock().unwrap();
            if *current == context {
                return;
            }
            *current = context;
        }
        match &context {
            Some(identity) => info!(%identity, "context switched; invalidating all read models"),
            None => info!("context cleared; invalidating all read models"),
        }
        let subs = self.subs.lock().unwrap();
        for entry in subs.values() {
            entry.trigger.send_modify(|t| {
                t.version += 1;
                t.epoch += 1;
            });
        }
    }

    /// Run the dispatcher: route ledger events to watching subscriptions.
    pub fn attach(self: &Arc<Self>, mut events: broadcast::Receiver<LedgerEvent>) -> JoinHandle<()> {
        let sync = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => sync.dispatch(&event),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        // Unknown events were missed; refetch everything.
                        warn!(skipped, "event stream lagged; re-triggering all read models");
                        sync.trigger_all();
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }

    fn dispatch(&self, event: &LedgerEvent) {
        let kind = event.kind();
        let subs = self.subs.lock().unwrap();
        for (raw_id, entry) in subs.iter() {
            if entry.watched.contains(&kind) {
                debug!(id = raw_id, %kind, "scheduling refetch");
                entry.trigger.send_modify(|t| t.version += 1);
            }
        }
    }

    fn trigger_all(&self) {
        let subs = self.subs.lock().unwrap();
        for entry in subs.values() {
            entry.trigger.send_modify(|t| t.version += 1);
        }
    }
}

impl Default for Synchronizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Synchronizer {
    fn drop(&mut self) {
        for entry in self.subs.lock().unwrap().values() {
            entry.worker.abort();
        }
    }
}

/// Per-subscription worker loop.
///
/// A single task per subscription gives at-most-one-in-flight for free: new
/// triggers arriving mid-fetch coalesce into the latest `Trigger` value
/// rather than queueing. On completion the worker compares the trigger it
/// fetched under against the latest one; a stale result is discarded and the
/// fetch rerun. Last-trigger-wins, not last-completion-wins.
async fn run_worker<T, F, Fut>(
    id: SubscriptionId,
    mut trigger_rx: watch::Receiver<Trigger>,
    state_tx: watch::Sender<ReadModelState<T>>,
    fetch: F,
) where
    T: Clone + Send + Sync + 'static,
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, LedgerError>> + Send + 'static,
{
    let mut seen = Trigger {
        version: 0,
        epoch: 0,
    };
    loop {
        // Wait for a trigger newer than the last one handled.
        while *trigger_rx.borrow() == seen {
            if trigger_rx.changed().await.is_err() {
                return;
            }
        }
        let trigger = *trigger_rx.borrow();

        if trigger.epoch != seen.epoch {
            // Context switched: the current snapshot no longer matches the
            // session's identity/chain scope.
            state_tx.send_modify(|s| s.stale = true);
        }

        match fetch().await {
            Ok(data) => {
                if trigger_rx.borrow().version == trigger.version {
                    state_tx.send_modify(|s| {
                        s.data = Some(data);
                        s.version = trigger.version;
                        s.stale = false;
                        s.last_error = None;
                    });
                } else {
                    // A newer trigger arrived mid-flight; this result may
                    // predate it. Drop it and fetch again.
                    debug!(%id, version = trigger.version, "discarding stale refetch result");
                }
            }
            Err(e) => {
                warn!(%id, "read-model refetch failed: {e}");
                state_tx.send_modify(|s| s.last_error = Some(e.to_string()));
            }
        }
        seen = trigger;
    }
}
