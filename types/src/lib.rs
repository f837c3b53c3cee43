//! Fundamental types for the FIR client.
//!
//! This crate defines the core types shared across every other crate in the
//! workspace: account addresses, chain ids, timestamps, content digests, case
//! records, roles, and workflow statuses.

pub mod address;
pub mod case;
pub mod chain;
pub mod digest;
pub mod error;
pub mod identity;
pub mod role;
pub mod time;

pub use address::AccountAddress;
pub use case::{CaseDraft, CaseFiling, CaseId, CaseRecord, CaseStatus, CaseType};
pub use chain::ChainId;
pub use digest::ContentDigest;
pub use error::TypeError;
pub use identity::Identity;
pub use role::Role;
pub use time::Timestamp;
