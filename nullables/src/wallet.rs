//! Nullable wallet provider — programmable identity, signatures, and change
//! notifications.

use async_trait::async_trait;
use fir_session::{IdentityChange, IdentityProvider, SessionError};
use fir_types::{AccountAddress, ChainId, Identity};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::broadcast;

/// Signature text the nullable wallet produces for an address. The nullable
/// authenticator accepts exactly this form.
pub fn null_signature(address: &AccountAddress) -> String {
    format!("nullsig:{address}")
}

struct Inner {
    identity: Option<Identity>,
    reject_connect: bool,
    reject_sign: bool,
    sign_requests: u64,
    sign_delay: Duration,
}

/// An in-memory wallet provider for testing.
pub struct NullWallet {
    inner: Mutex<Inner>,
    changes_tx: broadcast::Sender<IdentityChange>,
}

impl NullWallet {
    pub fn new() -> Self {
        let (changes_tx, _) = broadcast::channel(16);
        Self {
            inner: Mutex::new(Inner {
                identity: None,
                reject_connect: false,
                reject_sign: false,
                sign_requests: 0,
                sign_delay: Duration::ZERO,
            }),
            changes_tx,
        }
    }

    pub fn with_identity(identity: Identity) -> Self {
        let wallet = Self::new();
        wallet.inner.lock().unwrap().identity = Some(identity);
        wallet
    }

    /// Switch the selected account and notify listeners.
    pub fn switch_account(&self, address: AccountAddress) {
        {
            let mut inner = self.inner.lock().unwrap();
            let chain_id = inner
                .identity
                .map(|identity| identity.chain_id)
                .unwrap_or(ChainId::new(1));
            inner.identity = Some(Identity::new(address, chain_id));
        }
        let _ = self
            .changes_tx
            .send(IdentityChange::AccountChanged(Some(address)));
    }

    /// Switch chains and notify listeners.
    pub fn switch_chain(&self, chain_id: ChainId) {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.identity = inner.identity.map(|identity| identity.with_chain(chain_id));
        }
        let _ = self.changes_tx.send(IdentityChange::ChainChanged(chain_id));
    }

    /// Lock the wallet and notify listeners.
    pub fn disconnect(&self) {
        self.inner.lock().unwrap().identity = None;
        let _ = self.changes_tx.send(IdentityChange::AccountChanged(None));
    }

    /// Make `request_identity` fail with `UserRejected`.
    pub fn reject_connections(&self, reject: bool) {
        self.inner.lock().unwrap().reject_connect = reject;
    }

    /// Make `sign_message` fail with `SignatureRejected`.
    pub fn reject_signatures(&self, reject: bool) {
        self.inner.lock().unwrap().reject_sign = reject;
    }

    /// Delay each signature, so tests can overlap concurrent attempts.
    pub fn set_sign_delay(&self, delay: Duration) {
        self.inner.lock().unwrap().sign_delay = delay;
    }

    /// How many signature prompts this wallet has shown.
    pub fn signature_requests(&self) -> u64 {
        self.inner.lock().unwrap().sign_requests
    }
}

impl Default for NullWallet {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityProvider for NullWallet {
    async fn connected_identity(&self) -> Option<Identity> {
        self.inner.lock().unwrap().identity
    }

    async fn request_identity(&self) -> Result<Identity, SessionError> {
        let inner = self.inner.lock().unwrap();
        if inner.reject_connect {
            return Err(SessionError::UserRejected);
        }
        inner.identity.ok_or(SessionError::WalletUnavailable)
    }

    async fn sign_message(&self, _message: &str) -> Result<String, SessionError> {
        let (delay, signature) = {
            let mut inner = self.inner.lock().unwrap();
            if inner.reject_sign {
                return Err(SessionError::SignatureRejected);
            }
            let identity = inner.identity.ok_or(SessionError::WalletUnavailable)?;
            inner.sign_requests += 1;
            (inner.sign_delay, null_signature(&identity.address))
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Ok(signature)
    }

    fn changes(&self) -> broadcast::Receiver<IdentityChange> {
        self.changes_tx.subscribe()
    }
}
