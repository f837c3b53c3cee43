//! The status transition table.
//!
//! | From         | To                      | Gate                          |
//! |--------------|-------------------------|-------------------------------|
//! | Submitted    | Verified / Rejected     | Government                    |
//! | Verified     | UnderProcess            | Government, via assignment    |
//! | UnderProcess | UnderProcess            | Assigned police               |
//! | non-Closed   | Closed                  | Assigned police or government |
//!
//! `Rejected` is terminal, same as `Closed`: no outgoing edges.

use fir_types::CaseStatus;

/// Who may drive a listed edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionGate {
    /// The government account.
    Government,
    /// The government account, through the assignment operation (the edge
    /// carries an assigned-police address as side data and is not reachable
    /// through a plain status update).
    GovernmentAssignment,
    /// The police account the case is assigned to.
    AssignedPolice,
    /// Either the assigned police account or the government account.
    AssignedPoliceOrGovernment,
}

/// The gate for `(from, to)`, or `None` when the edge is not in the table.
pub fn gate_for(from: CaseStatus, to: CaseStatus) -> Option<TransitionGate> {
    use CaseStatus::*;
    match (from, to) {
        (Submitted, Verified) | (Submitted, Rejected) => Some(TransitionGate::Government),
        (Verified, UnderProcess) => Some(TransitionGate::GovernmentAssignment),
        (UnderProcess, UnderProcess) => Some(TransitionGate::AssignedPolice),
        (Submitted, Closed) | (Verified, Closed) | (UnderProcess, Closed) => {
            Some(TransitionGate::AssignedPoliceOrGovernment)
        }
        _ => None,
    }
}

/// Whether `(from, to)` is a listed edge.
pub fn is_listed(from: CaseStatus, to: CaseStatus) -> bool {
    gate_for(from, to).is_some()
}
