//! Case records and the fixed status workflow vocabulary.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::TypeError;
use crate::{AccountAddress, ContentDigest, Timestamp};

/// Unique, non-reusable case identifier assigned by the ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CaseId(u64);

impl CaseId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for CaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Category of the reported crime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseType {
    NotSpecified,
    FraudCall,
    OtpScam,
    OnlineHarassment,
    FinancialTheft,
}

impl CaseType {
    /// Ledger wire code for this case type.
    pub fn wire_code(&self) -> u8 {
        match self {
            CaseType::NotSpecified => 0,
            CaseType::FraudCall => 1,
            CaseType::OtpScam => 2,
            CaseType::OnlineHarassment => 3,
            CaseType::FinancialTheft => 4,
        }
    }

    pub fn from_wire_code(code: u8) -> Result<Self, TypeError> {
        match code {
            0 => Ok(CaseType::NotSpecified),
            1 => Ok(CaseType::FraudCall),
            2 => Ok(CaseType::OtpScam),
            3 => Ok(CaseType::OnlineHarassment),
            4 => Ok(CaseType::FinancialTheft),
            other => Err(TypeError::UnknownWireCode {
                kind: "case type",
                code: other,
            }),
        }
    }
}

/// Workflow status of a case.
///
/// Status only ever advances through the edges the workflow engine enumerates;
/// it never regresses. `Rejected` and `Closed` are both terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    Submitted,
    Verified,
    Rejected,
    UnderProcess,
    Closed,
}

impl CaseStatus {
    /// Ledger wire code for this status.
    pub fn wire_code(&self) -> u8 {
        match self {
            CaseStatus::Submitted => 0,
            CaseStatus::Verified => 1,
            CaseStatus::Rejected => 2,
            CaseStatus::UnderProcess => 3,
            CaseStatus::Closed => 4,
        }
    }

    pub fn from_wire_code(code: u8) -> Result<Self, TypeError> {
        match code {
            0 => Ok(CaseStatus::Submitted),
            1 => Ok(CaseStatus::Verified),
            2 => Ok(CaseStatus::Rejected),
            3 => Ok(CaseStatus::UnderProcess),
            4 => Ok(CaseStatus::Closed),
            other => Err(TypeError::UnknownWireCode {
                kind: "case status",
                code: other,
            }),
        }
    }

    /// Whether no further transitions leave this status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, CaseStatus::Rejected | CaseStatus::Closed)
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CaseStatus::Submitted => "submitted",
            CaseStatus::Verified => "verified",
            CaseStatus::Rejected => "rejected",
            CaseStatus::UnderProcess => "under_process",
            CaseStatus::Closed => "closed",
        };
        write!(f, "{s}")
    }
}

/// A case as stored on the ledger.
///
/// The ledger is the sole writer. The client never mutates a record locally;
/// it issues a transition request and waits for the resulting event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseRecord {
    pub id: CaseId,
    pub case_type: CaseType,
    pub status: CaseStatus,
    pub complainant: AccountAddress,
    pub assigned_police: Option<AccountAddress>,
    pub accused_entries: Vec<String>,
    pub evidence_digests: Vec<ContentDigest>,
    pub description_entries: Vec<String>,
    pub filed_at: Timestamp,
    pub incident_at: Timestamp,
    /// Append-only: entries are never removed or reordered.
    pub remarks: Vec<String>,
}

/// The payload a citizen submits to file a new case.
///
/// Evidence digests arrive as hex strings and are parsed (and thereby
/// validated) by the workflow engine before submission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseDraft {
    pub case_type: CaseType,
    pub accused_entries: Vec<String>,
    pub evidence_digests: Vec<String>,
    pub description_entries: Vec<String>,
    pub incident_at: Timestamp,
}

/// A draft that passed workflow validation, ready for ledger submission.
///
/// Differs from [`CaseDraft`] only in that evidence digests are parsed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseFiling {
    pub case_type: CaseType,
    pub accused_entries: Vec<String>,
    pub evidence_digests: Vec<ContentDigest>,
    pub description_entries: Vec<String>,
    pub incident_at: Timestamp,
}
