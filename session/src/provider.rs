//! Wallet provider seam.
//!
//! The wallet supplies the current account, chain id, and a signing
//! capability, and pushes change notifications when the human switches
//! accounts or chains (or locks the wallet).

use async_trait::async_trait;
use fir_types::{AccountAddress, ChainId, Identity};
use tokio::sync::broadcast;

use crate::error::SessionError;

/// A change pushed by the wallet provider.
///
/// Account and chain notifications are unordered with respect to ledger
/// events; the session manager treats each as an authoritative reset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IdentityChange {
    /// The selected account changed; `None` means disconnected or locked.
    AccountChanged(Option<AccountAddress>),
    /// The wallet switched chains.
    ChainChanged(ChainId),
}

/// The connected wallet.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// The identity the wallet currently exposes, if any, without prompting.
    async fn connected_identity(&self) -> Option<Identity>;

    /// Prompt for an account selection.
    ///
    /// Fails with [`SessionError::WalletUnavailable`] when no provider is
    /// present and [`SessionError::UserRejected`] when the human declines.
    async fn request_identity(&self) -> Result<Identity, SessionError>;

    /// Sign an opaque message with the selected account's key.
    ///
    /// Fails with [`SessionError::SignatureRejected`] when the human declines.
    async fn sign_message(&self, message: &str) -> Result<String, SessionError>;

    /// Subscribe to account/chain change notifications.
    fn changes(&self) -> broadcast::Receiver<IdentityChange>;
}
