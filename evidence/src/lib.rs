//! Evidence store collaborator.
//!
//! Evidence files live in an external content-addressed store; only their
//! digests go on the ledger. A failed upload yields no digest, and a case
//! draft must never reference a failed upload.

pub mod client;
pub mod error;

pub use client::{digest_content_id, EvidenceStore, HttpEvidenceStore};
pub use error::EvidenceError;
