//! The session state machine.
//!
//! States: `Disconnected → Connecting → Connected → Authenticating →
//! Authenticated(role)`. Authentication failures land back in `Connected`
//! (the UI can retry without reconnecting the wallet); wallet failures land
//! in `Disconnected`. All transitions are serialized through this manager;
//! concurrent `authenticate()` calls for one identity coalesce onto a single
//! in-flight attempt so the wallet never shows duplicate signature prompts.

use fir_types::{AccountAddress, Identity, Role, Timestamp};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, watch, Mutex};
use tracing::{debug, info, warn};

use crate::auth::{Authenticator, SessionToken, AUTH_CHALLENGE};
use crate::clock::Clock;
use crate::error::SessionError;
use crate::provider::{IdentityChange, IdentityProvider};
use crate::role::RoleResolver;

/// Where the session currently is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    Disconnected,
    Connecting,
    /// Wallet connected, not authenticated. Also the landing state after a
    /// failed or rejected authentication attempt.
    Connected,
    Authenticating,
    Authenticated,
}

/// A read-only view of the session, published on every transition.
///
/// `role` is meaningful only in the `Authenticated` phase; everywhere else it
/// is `Anonymous`, so role and credential are either both valid for the
/// current address or both absent, never mismatched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub identity: Option<Identity>,
    pub role: Role,
    pub authenticated_at: Option<Timestamp>,
    /// True when role resolution failed and the session fell back to Citizen.
    pub role_degraded: bool,
}

impl SessionSnapshot {
    pub fn disconnected() -> Self {
        Self {
            phase: SessionPhase::Disconnected,
            identity: None,
            role: Role::Anonymous,
            authenticated_at: None,
            role_degraded: false,
        }
    }

    fn connecting() -> Self {
        Self {
            phase: SessionPhase::Connecting,
            ..Self::disconnected()
        }
    }

    fn connected(identity: Identity) -> Self {
        Self {
            phase: SessionPhase::Connected,
            identity: Some(identity),
            ..Self::disconnected()
        }
    }

    fn authenticating(identity: Identity) -> Self {
        Self {
            phase: SessionPhase::Authenticating,
            identity: Some(identity),
            ..Self::disconnected()
        }
    }

    fn authenticated(
        identity: Identity,
        role: Role,
        authenticated_at: Timestamp,
        role_degraded: bool,
    ) -> Self {
        Self {
            phase: SessionPhase::Authenticated,
            identity: Some(identity),
            role,
            authenticated_at: Some(authenticated_at),
            role_degraded,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.phase == SessionPhase::Authenticated
    }
}

type AuthOutcome = Result<Role, SessionError>;

struct Inflight {
    identity: Identity,
    rx: watch::Receiver<Option<AuthOutcome>>,
}

struct Inner {
    /// Credential cache keyed by address. An unexpired entry lets a returning
    /// address skip the signature prompt.
    tokens: HashMap<AccountAddress, SessionToken>,
    inflight: Option<Inflight>,
    /// Bumped on every identity reset. An operation that started under an
    /// older generation discards its result instead of committing.
    generation: u64,
}

/// Owns the wallet-connect → authenticate → role-resolve lifecycle.
pub struct SessionManager {
    provider: Arc<dyn IdentityProvider>,
    auth: Arc<dyn Authenticator>,
    roles: RoleResolver,
    clock: Arc<dyn Clock>,
    state_tx: watch::Sender<SessionSnapshot>,
    inner: Mutex<Inner>,
}

impl SessionManager {
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        auth: Arc<dyn Authenticator>,
        roles: RoleResolver,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let (state_tx, _) = watch::channel(SessionSnapshot::disconnected());
        Self {
            provider,
            auth,
            roles,
            clock,
            state_tx,
            inner: Mutex::new(Inner {
                tokens: HashMap::new(),
                inflight: None,
                generation: 0,
            }),
        }
    }

    /// Subscribe to session state changes. The receiver always holds the
    /// latest snapshot.
    pub fn snapshots(&self) -> watch::Receiver<SessionSnapshot> {
        self.state_tx.subscribe()
    }

    /// The latest published snapshot.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.state_tx.borrow().clone()
    }

    fn current_identity(&self) -> Option<Identity> {
        self.state_tx.borrow().identity
    }

    fn publish(&self, snapshot: SessionSnapshot) {
        self.state_tx.send_replace(snapshot);
    }

    /// Request an identity from the wallet and authenticate it.
    pub async fn connect(&self) -> Result<SessionSnapshot, SessionError> {
        let generation = {
            let inner = self.inner.lock().await;
            self.publish(SessionSnapshot::connecting());
            inner.generation
        };

        let identity = match self.provider.request_identity().await {
            Ok(identity) => identity,
            Err(e) => {
                warn!("wallet connection failed: {e}");
                let inner = self.inner.lock().await;
                if inner.generation == generation {
                    self.publish(SessionSnapshot::disconnected());
                }
                return Err(e);
            }
        };

        {
            let inner = self.inner.lock().await;
            if inner.generation != generation {
                debug!(%identity, "connect superseded by an identity change");
                return Err(SessionError::Superseded);
            }
            info!(%identity, "wallet connected");
            self.publish(SessionSnapshot::connected(identity));
        }
        self.authenticate().await
    }

    /// Establish an authenticated session for the connected identity.
    ///
    /// A cached, unexpired credential for the current address short-circuits
    /// the signature prompt. At most one attempt runs per identity: a second
    /// call while one is pending awaits the pending attempt's outcome instead
    /// of issuing a duplicate signature request.
    pub async fn authenticate(&self) -> Result<SessionSnapshot, SessionError> {
        // Join the pending attempt for this identity, or claim the flight.
        let claim = {
            let mut inner = self.inner.lock().await;
            let identity = self
                .current_identity()
                .ok_or(SessionError::WalletUnavailable)?;
            match &inner.inflight {
                Some(pending) if pending.identity == identity => Err(pending.rx.clone()),
                _ => {
                    let (tx, rx) = watch::channel(None);
                    inner.inflight = Some(Inflight { identity, rx });
                    self.publish(SessionSnapshot::authenticating(identity));
                    Ok((identity, tx))
                }
            }
        };
        let (identity, done_tx) = match claim {
            Ok(owned) => owned,
            Err(pending_rx) => return self.await_outcome(pending_rx).await,
        };

        let result = self.run_authentication(&identity).await;

        // Commit (or roll back) and fan the outcome out to joined callers.
        // Publishing under the lock keeps commits ordered with identity
        // resets: a reset clears `inflight`, so a flight that lost ownership
        // must not touch published state.
        let outcome: AuthOutcome = {
            let mut inner = self.inner.lock().await;
            let owned = inner
                .inflight
                .as_ref()
                .is_some_and(|pending| pending.identity == identity);
            let outcome = match result {
                Ok(_) if !owned => {
                    debug!(%identity, "authentication result discarded: identity changed mid-flight");
                    Err(SessionError::Superseded)
                }
                Ok((token, role, degraded)) => {
                    inner.tokens.insert(identity.address, token);
                    self.publish(SessionSnapshot::authenticated(
                        identity,
                        role,
                        self.clock.now(),
                        degraded,
                    ));
                    info!(%identity, %role, "session authenticated");
                    Ok(role)
                }
                Err(e) => {
                    if owned {
                        // Retryable without reconnecting the wallet.
                        self.publish(SessionSnapshot::connected(identity));
                        warn!(%identity, "authentication failed: {e}");
                    }
                    Err(e)
                }
            };
            if owned {
                inner.inflight = None;
            }
            outcome
        };
        let _ = done_tx.send(Some(outcome.clone()));

        outcome.map(|_| self.snapshot())
    }

    async fn await_outcome(
        &self,
        mut rx: watch::Receiver<Option<AuthOutcome>>,
    ) -> Result<SessionSnapshot, SessionError> {
        loop {
            if let Some(outcome) = rx.borrow().clone() {
                return outcome.map(|_| self.snapshot());
            }
            // Sender dropped without an outcome: the owning attempt was
            // cancelled, which only happens on an identity change.
            rx.changed().await.map_err(|_| SessionError::Superseded)?;
        }
    }

    /// The signature/verification/role legwork of one attempt. Does not
    /// touch published state; the caller commits the result.
    async fn run_authentication(
        &self,
        identity: &Identity,
    ) -> Result<(SessionToken, Role, bool), SessionError> {
        let cached = {
            let inner = self.inner.lock().await;
            inner
                .tokens
                .get(&identity.address)
                .filter(|token| !token.is_expired(self.clock.now()))
                .cloned()
        };

        let token = match cached {
            Some(token) => {
                debug!(address = %identity.address, "reusing cached credential");
                token
            }
            None => {
                let signature = self.provider.sign_message(AUTH_CHALLENGE).await?;
                let raw = self.auth.verify(&identity.address, &signature).await?;
                SessionToken {
                    token: raw,
                    issued_at: self.clock.now(),
                }
            }
        };

        let (role, degraded) = match self.roles.resolve(&identity.address).await {
            Ok(role) => (role, false),
            Err(e) => {
                warn!(address = %identity.address, "role resolution unavailable, degrading to citizen: {e}");
                (Role::Citizen, true)
            }
        };

        Ok((token, role, degraded))
    }

    /// React to a wallet identity change.
    ///
    /// `None` (disconnected/locked) hard-resets to `Disconnected` and
    /// discards every credential. A new address keeps the identity but drops
    /// role and credential and re-authenticates. A chain-only change drops
    /// the credential (it may be chain-scoped) and re-resolves the role
    /// defensively via the same re-authentication path.
    pub async fn handle_identity_changed(
        &self,
        new_identity: Option<Identity>,
    ) -> Result<(), SessionError> {
        let Some(new_identity) = new_identity else {
            info!("wallet disconnected; resetting session");
            let mut inner = self.inner.lock().await;
            inner.generation += 1;
            inner.tokens.clear();
            inner.inflight = None;
            self.publish(SessionSnapshot::disconnected());
            return Ok(());
        };

        {
            let mut inner = self.inner.lock().await;
            let current = self.current_identity();
            if current == Some(new_identity) {
                return Ok(());
            }

            inner.generation += 1;
            // Any in-flight attempt is now scoped to a stale identity.
            inner.inflight = None;

            let address_changed = current.map_or(true, |c| c.address != new_identity.address);
            if address_changed {
                info!(%new_identity, "wallet account changed; re-authenticating");
                self.publish(SessionSnapshot::connecting());
            } else {
                // Chain switch: the credential may be chain-scoped.
                inner.tokens.remove(&new_identity.address);
                info!(%new_identity, "wallet chain changed; re-authenticating");
            }
            self.publish(SessionSnapshot::connected(new_identity));
        }
        self.authenticate().await.map(|_| ())
    }

    /// Drive the manager from the wallet's change notifications.
    ///
    /// Intended to be spawned: `tokio::spawn(manager.clone().run())`. Runs
    /// until the provider's change channel closes.
    pub async fn run(self: Arc<Self>) {
        let mut changes = self.provider.changes();
        loop {
            let new_identity = match changes.recv().await {
                Ok(change) => self.resolve_change(change).await,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "missed wallet notifications; resyncing from provider");
                    self.provider.connected_identity().await
                }
                Err(broadcast::error::RecvError::Closed) => break,
            };
            if let Err(e) = self.handle_identity_changed(new_identity).await {
                // Already reflected in the published state; callers retry.
                debug!("identity change left session unauthenticated: {e}");
            }
        }
    }

    /// Combine a granular wallet notification with the current identity.
    async fn resolve_change(&self, change: IdentityChange) -> Option<Identity> {
        match change {
            IdentityChange::AccountChanged(None) => None,
            IdentityChange::AccountChanged(Some(address)) => match self.current_identity() {
                Some(current) => Some(Identity::new(address, current.chain_id)),
                // No session context to inherit a chain id from; ask the
                // provider for the full picture.
                None => self.provider.connected_identity().await,
            },
            IdentityChange::ChainChanged(chain_id) => self
                .current_identity()
                .map(|current| current.with_chain(chain_id)),
        }
    }
}
