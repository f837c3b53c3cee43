//! Parse and conversion errors for the fundamental types.

use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid account address: {0}")]
    InvalidAddress(String),

    #[error("invalid content digest: {0}")]
    InvalidDigest(String),

    #[error("invalid chain id: {0}")]
    InvalidChainId(String),

    #[error("unknown {kind} wire code: {code}")]
    UnknownWireCode { kind: &'static str, code: u8 },
}
