//! Case workflow engine.
//!
//! Centralizes every role gate and status-transition rule in one place:
//! views render based on role but never re-implement authorization. All
//! mutating operations are submit-and-wait against the ledger and never
//! write to any read model; UI-visible effects arrive exclusively through
//! the read-model synchronizer once the ledger emits the matching event.

pub mod engine;
pub mod error;
pub mod transitions;

pub use engine::CaseWorkflowEngine;
pub use error::WorkflowError;
pub use transitions::{gate_for, is_listed, TransitionGate};
