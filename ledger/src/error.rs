//! Ledger client error types.

use fir_types::CaseId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    /// Network failure or timeout on any ledger call.
    #[error("ledger unavailable: {0}")]
    Unavailable(String),

    /// The ledger answered with an error payload.
    #[error("ledger rpc error: {0}")]
    Rpc(String),

    /// The ledger answered, but the payload did not decode.
    #[error("invalid ledger response: {0}")]
    Decode(String),

    #[error("case not found: {0}")]
    CaseNotFound(CaseId),

    /// A submitted write was rejected at inclusion time.
    #[error("ledger rejected the request: {0}")]
    Rejected(String),

    /// Fee-less submission through the relay failed.
    #[error("relay error: {0}")]
    Relay(String),
}
