//! Exhaustive checks over the status transition table: edges outside the
//! table always fail with `InvalidTransition`, for every caller role.

use fir_nullables::{NullClock, NullLedger};
use fir_session::{SessionPhase, SessionSnapshot};
use fir_types::{
    AccountAddress, CaseId, CaseRecord, CaseStatus, CaseType, ChainId, Identity, Role, Timestamp,
};
use fir_workflow::{is_listed, CaseWorkflowEngine, WorkflowError};
use proptest::prelude::*;
use std::sync::Arc;
use tokio::sync::watch;

const ALL_STATUSES: [CaseStatus; 5] = [
    CaseStatus::Submitted,
    CaseStatus::Verified,
    CaseStatus::Rejected,
    CaseStatus::UnderProcess,
    CaseStatus::Closed,
];

fn addr(byte: u8) -> AccountAddress {
    AccountAddress::new([byte; 20])
}

fn status_strategy() -> impl Strategy<Value = CaseStatus> {
    prop::sample::select(ALL_STATUSES.to_vec())
}

proptest! {
    #[test]
    fn listed_edges_never_leave_a_terminal_status(
        from in status_strategy(),
        to in status_strategy(),
    ) {
        if from.is_terminal() {
            prop_assert!(!is_listed(from, to));
        }
    }

    #[test]
    fn listed_edges_never_regress_to_submitted(
        from in status_strategy(),
    ) {
        prop_assert!(!is_listed(from, CaseStatus::Submitted));
    }
}

#[test]
fn exactly_the_documented_edges_are_listed() {
    use CaseStatus::*;
    let expected = [
        (Submitted, Verified),
        (Submitted, Rejected),
        (Submitted, Closed),
        (Verified, UnderProcess),
        (Verified, Closed),
        (UnderProcess, UnderProcess),
        (UnderProcess, Closed),
    ];
    for from in ALL_STATUSES {
        for to in ALL_STATUSES {
            assert_eq!(
                is_listed(from, to),
                expected.contains(&(from, to)),
                "edge {from} -> {to}"
            );
        }
    }
}

/// An unlisted edge fails with `InvalidTransition` for every role, assigned
/// or not. Never `NotAuthorized`, and never a success.
#[tokio::test]
async fn unlisted_edges_fail_invalid_transition_regardless_of_role() {
    let government = addr(0xe0);
    let police = addr(0xbb);
    let citizen = addr(0xaa);

    for from in ALL_STATUSES {
        for to in ALL_STATUSES {
            if is_listed(from, to) {
                continue;
            }
            for (actor, role) in [
                (citizen, Role::Citizen),
                (police, Role::Police),
                (government, Role::Government),
            ] {
                let ledger = Arc::new(NullLedger::new(government));
                ledger.seed_police(police);
                ledger.seed_case(CaseRecord {
                    id: CaseId::new(1),
                    case_type: CaseType::NotSpecified,
                    status: from,
                    complainant: citizen,
                    assigned_police: Some(police),
                    accused_entries: vec![],
                    evidence_digests: vec![],
                    description_entries: vec!["desc".into()],
                    filed_at: Timestamp::new(100),
                    incident_at: Timestamp::new(90),
                    remarks: vec![],
                });

                let (_tx, rx) = watch::channel(SessionSnapshot {
                    phase: SessionPhase::Authenticated,
                    identity: Some(Identity::new(actor, ChainId::new(1))),
                    role,
                    authenticated_at: Some(Timestamp::new(1_000)),
                    role_degraded: false,
                });
                let engine =
                    CaseWorkflowEngine::new(ledger, rx, Arc::new(NullClock::new(1_000)));

                let err = engine
                    .update_status(CaseId::new(1), to, "remark")
                    .await
                    .unwrap_err();
                assert!(
                    matches!(err, WorkflowError::InvalidTransition { .. }),
                    "{from} -> {to} as {role}: expected InvalidTransition, got {err}"
                );
            }
        }
    }
}
