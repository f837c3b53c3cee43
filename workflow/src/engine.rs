//! The workflow engine: validates and requests case state transitions.

use fir_ledger::{InclusionReceipt, Ledger};
use fir_session::{Clock, SessionSnapshot};
use fir_types::{
    AccountAddress, CaseDraft, CaseFiling, CaseId, CaseStatus, ContentDigest, Identity, Role,
    Timestamp,
};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

use crate::error::WorkflowError;
use crate::transitions::{gate_for, TransitionGate};

/// Validates and requests state transitions for cases.
///
/// Reads the session (role, identity) but never mutates it; calls the ledger
/// but never touches a read model. A resolved operation means the ledger
/// confirmed inclusion, nothing more: the UI sees the new state only once
/// the corresponding ledger event triggers a refetch.
pub struct CaseWorkflowEngine {
    ledger: Arc<dyn Ledger>,
    session: watch::Receiver<SessionSnapshot>,
    clock: Arc<dyn Clock>,
}

impl CaseWorkflowEngine {
    pub fn new(
        ledger: Arc<dyn Ledger>,
        session: watch::Receiver<SessionSnapshot>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            ledger,
            session,
            clock,
        }
    }

    fn actor(&self) -> Result<(Identity, Role), WorkflowError> {
        let snapshot = self.session.borrow();
        match (snapshot.is_authenticated(), snapshot.identity) {
            (true, Some(identity)) => Ok((identity, snapshot.role)),
            _ => Err(WorkflowError::NotAuthorized),
        }
    }

    /// File a new case. Citizen only.
    pub async fn submit(&self, draft: &CaseDraft) -> Result<InclusionReceipt, WorkflowError> {
        let (identity, role) = self.actor()?;
        if role != Role::Citizen {
            return Err(WorkflowError::NotAuthorized);
        }

        let filing = validate_draft(draft, self.clock.now())?;
        info!(complainant = %identity.address, case_type = ?filing.case_type, "submitting case");
        Ok(self.ledger.submit_case(&identity.address, &filing).await?)
    }

    /// Assign a verified case to a police account. Government only.
    pub async fn assign(
        &self,
        case_id: CaseId,
        police: &AccountAddress,
    ) -> Result<InclusionReceipt, WorkflowError> {
        let (identity, role) = self.actor()?;
        if role != Role::Government {
            return Err(WorkflowError::NotAuthorized);
        }

        let record = self.ledger.case_by_id(case_id).await?;
        if record.status != CaseStatus::Verified {
            return Err(WorkflowError::InvalidTransition {
                from: record.status,
                to: CaseStatus::UnderProcess,
            });
        }

        if !self.ledger.is_police(police).await? {
            return Err(WorkflowError::UnknownPoliceAddress(*police));
        }

        info!(%case_id, %police, "assigning case");
        Ok(self
            .ledger
            .assign_case(&identity.address, case_id, police)
            .await?)
    }

    /// Progress a case along a listed edge, with a mandatory remark.
    pub async fn update_status(
        &self,
        case_id: CaseId,
        new_status: CaseStatus,
        remark: &str,
    ) -> Result<InclusionReceipt, WorkflowError> {
        if remark.trim().is_empty() {
            return Err(WorkflowError::MissingRemark);
        }
        let (identity, role) = self.actor()?;

        let record = self.ledger.case_by_id(case_id).await?;
        let from = record.status;
        let gate = gate_for(from, new_status).ok_or(WorkflowError::InvalidTransition {
            from,
            to: new_status,
        })?;

        let authorized = match gate {
            TransitionGate::Government => role == Role::Government,
            // The assignment edge carries an assigned-police address as side
            // data; it is only reachable through `assign`.
            TransitionGate::GovernmentAssignment => {
                return Err(WorkflowError::InvalidTransition {
                    from,
                    to: new_status,
                })
            }
            TransitionGate::AssignedPolice => {
                role == Role::Police && record.assigned_police == Some(identity.address)
            }
            TransitionGate::AssignedPoliceOrGovernment => {
                role == Role::Government
                    || (role == Role::Police && record.assigned_police == Some(identity.address))
            }
        };
        if !authorized {
            return Err(WorkflowError::NotAuthorized);
        }

        info!(%case_id, %from, to = %new_status, "updating case status");
        Ok(self
            .ledger
            .update_status(&identity.address, case_id, new_status, remark)
            .await?)
    }

    /// Add an address to the active police set. Government only.
    pub async fn add_police(
        &self,
        address: &AccountAddress,
    ) -> Result<InclusionReceipt, WorkflowError> {
        let (identity, role) = self.actor()?;
        if role != Role::Government {
            return Err(WorkflowError::NotAuthorized);
        }
        info!(%address, "adding police account");
        Ok(self.ledger.add_police(&identity.address, address).await?)
    }

    /// Remove an address from the active police set. Government only.
    pub async fn remove_police(
        &self,
        address: &AccountAddress,
    ) -> Result<InclusionReceipt, WorkflowError> {
        let (identity, role) = self.actor()?;
        if role != Role::Government {
            return Err(WorkflowError::NotAuthorized);
        }
        if !self.ledger.is_police(address).await? {
            return Err(WorkflowError::UnknownPoliceAddress(*address));
        }
        info!(%address, "removing police account");
        Ok(self.ledger.remove_police(&identity.address, address).await?)
    }
}

/// Validate a draft; reports the first failing field.
fn validate_draft(draft: &CaseDraft, now: Timestamp) -> Result<CaseFiling, WorkflowError> {
    if !draft
        .description_entries
        .iter()
        .any(|entry| !entry.trim().is_empty())
    {
        return Err(WorkflowError::InvalidCasePayload {
            field: "description_entries",
        });
    }

    if draft.incident_at.is_future(now) {
        return Err(WorkflowError::InvalidCasePayload {
            field: "incident_at",
        });
    }

    let evidence_digests = draft
        .evidence_digests
        .iter()
        .map(|raw| ContentDigest::parse(raw))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| WorkflowError::InvalidCasePayload {
            field: "evidence_digests",
        })?;

    Ok(CaseFiling {
        case_type: draft.case_type,
        accused_entries: draft.accused_entries.clone(),
        evidence_digests,
        description_entries: draft.description_entries.clone(),
        incident_at: draft.incident_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use fir_types::CaseType;

    fn draft() -> CaseDraft {
        CaseDraft {
            case_type: CaseType::FraudCall,
            accused_entries: vec!["Name: A | Mobile: 555".into()],
            evidence_digests: vec![ContentDigest::new([9u8; 32]).to_string()],
            description_entries: vec!["stolen wallet".into()],
            incident_at: Timestamp::new(900),
        }
    }

    #[test]
    fn valid_draft_passes_with_fields_intact() {
        let filing = validate_draft(&draft(), Timestamp::new(1_000)).unwrap();
        assert_eq!(filing.description_entries, vec!["stolen wallet".to_string()]);
        assert_eq!(filing.evidence_digests, vec![ContentDigest::new([9u8; 32])]);
    }

    #[test]
    fn blank_descriptions_fail_first() {
        let mut d = draft();
        d.description_entries = vec!["".into(), "   ".into()];
        // Also poison a later field; the earlier one must be reported.
        d.evidence_digests = vec!["bogus".into()];
        match validate_draft(&d, Timestamp::new(1_000)) {
            Err(WorkflowError::InvalidCasePayload { field }) => {
                assert_eq!(field, "description_entries")
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn future_incident_time_is_rejected() {
        let mut d = draft();
        d.incident_at = Timestamp::new(2_000);
        match validate_draft(&d, Timestamp::new(1_000)) {
            Err(WorkflowError::InvalidCasePayload { field }) => assert_eq!(field, "incident_at"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn malformed_evidence_digest_is_rejected() {
        let mut d = draft();
        d.evidence_digests = vec!["not-a-digest".into()];
        match validate_draft(&d, Timestamp::new(1_000)) {
            Err(WorkflowError::InvalidCasePayload { field }) => {
                assert_eq!(field, "evidence_digests")
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn incident_at_equal_to_now_is_allowed() {
        let mut d = draft();
        d.incident_at = Timestamp::new(1_000);
        assert!(validate_draft(&d, Timestamp::new(1_000)).is_ok());
    }
}
