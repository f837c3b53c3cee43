//! Push notifications emitted by the ledger.
//!
//! A closed tagged-variant type: each variant carries only the fields needed
//! to decide which read-model subscriptions to refresh.

use fir_types::{AccountAddress, CaseId, CaseStatus};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A change notification pushed by the ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LedgerEvent {
    /// A new case was filed.
    CaseFiled {
        case_id: CaseId,
        complainant: AccountAddress,
    },
    /// A case was assigned to a police account.
    CaseAssigned {
        case_id: CaseId,
        police: AccountAddress,
    },
    /// An address entered (`active = true`) or left the active police set.
    PoliceSetChanged {
        police: AccountAddress,
        active: bool,
    },
    /// A case moved to a new workflow status.
    CaseStatusChanged {
        case_id: CaseId,
        status: CaseStatus,
    },
}

impl LedgerEvent {
    /// The name of this event, used as a subscription key.
    pub fn kind(&self) -> EventKind {
        match self {
            LedgerEvent::CaseFiled { .. } => EventKind::CaseFiled,
            LedgerEvent::CaseAssigned { .. } => EventKind::CaseAssigned,
            LedgerEvent::PoliceSetChanged { .. } => EventKind::PoliceSetChanged,
            LedgerEvent::CaseStatusChanged { .. } => EventKind::CaseStatusChanged,
        }
    }
}

/// Event names subscriptions can watch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    CaseFiled,
    CaseAssigned,
    PoliceSetChanged,
    CaseStatusChanged,
}

impl EventKind {
    /// Every event kind the ledger emits.
    pub const ALL: [EventKind; 4] = [
        EventKind::CaseFiled,
        EventKind::CaseAssigned,
        EventKind::PoliceSetChanged,
        EventKind::CaseStatusChanged,
    ];
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EventKind::CaseFiled => "case_filed",
            EventKind::CaseAssigned => "case_assigned",
            EventKind::PoliceSetChanged => "police_set_changed",
            EventKind::CaseStatusChanged => "case_status_changed",
        };
        write!(f, "{s}")
    }
}
