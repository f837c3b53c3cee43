//! Workflow error types.
//!
//! Workflow errors indicate policy violations, not transient faults; callers
//! surface them verbatim and never retry.

use fir_ledger::LedgerError;
use fir_types::{AccountAddress, CaseStatus};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkflowError {
    /// The caller's role or identity does not satisfy the transition table.
    #[error("not authorized for this operation")]
    NotAuthorized,

    /// The requested `(from, to)` edge is not in the transition table.
    #[error("illegal status transition: {from} -> {to}")]
    InvalidTransition { from: CaseStatus, to: CaseStatus },

    /// A submit payload failed validation; names the first failing field.
    #[error("invalid case payload: {field}")]
    InvalidCasePayload { field: &'static str },

    #[error("a remark is required for this transition")]
    MissingRemark,

    /// The target address is not in the active police set.
    #[error("unknown police address: {0}")]
    UnknownPoliceAddress(AccountAddress),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}
