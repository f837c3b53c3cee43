//! Access roles derived from ledger-side facts.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The access tier of the current session.
///
/// Exactly one role per session. Role is derived from the address (the
/// ledger's government account and active police set), never self-asserted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// No authenticated session.
    Anonymous,
    /// A regular account: may file cases and track its own.
    Citizen,
    /// A member of the active police set.
    Police,
    /// The designated government account.
    Government,
}

impl Role {
    /// Whether this role sees the full case list.
    ///
    /// Government has police-level visibility; the reverse does not hold.
    pub fn can_view_all_cases(&self) -> bool {
        matches!(self, Role::Police | Role::Government)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Role::Anonymous => "anonymous",
            Role::Citizen => "citizen",
            Role::Police => "police",
            Role::Government => "government",
        };
        write!(f, "{s}")
    }
}
