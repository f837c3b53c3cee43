//! Evidence store error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EvidenceError {
    /// The store rejected the upload or was unreachable.
    #[error("evidence upload failed: {0}")]
    Upload(String),

    /// The store answered, but without a usable content id.
    #[error("invalid evidence store response: {0}")]
    Decode(String),
}
