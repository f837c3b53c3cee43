//! Session error types.
//!
//! `Clone` because a coalesced `authenticate()` fans one outcome out to every
//! concurrent caller.

use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    /// No wallet provider is present (or no identity is connected).
    #[error("no wallet provider available")]
    WalletUnavailable,

    /// The human declined the account-selection prompt.
    #[error("wallet connection rejected by user")]
    UserRejected,

    /// The human declined the signature prompt.
    #[error("signature request rejected by user")]
    SignatureRejected,

    /// Signature/address mismatch, or the authentication service failed.
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The ledger query backing role classification failed. Callers degrade
    /// to Citizen rather than blocking login.
    #[error("role resolution unavailable: {0}")]
    RoleResolutionUnavailable(String),

    /// The identity changed while this operation was in flight; its result
    /// was discarded.
    #[error("operation superseded by an identity change")]
    Superseded,
}
