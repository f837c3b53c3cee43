//! Workflow engine scenarios: role gates, transition legality, payload
//! validation, and the submit → event → read-model round trip.

use fir_ledger::{EventKind, Ledger};
use fir_nullables::{NullClock, NullLedger};
use fir_session::{SessionPhase, SessionSnapshot};
use fir_sync::Synchronizer;
use fir_types::{
    AccountAddress, CaseDraft, CaseId, CaseRecord, CaseStatus, CaseType, ContentDigest, ChainId,
    Identity, Role, Timestamp,
};
use fir_workflow::{CaseWorkflowEngine, WorkflowError};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::sleep;

const GOVERNMENT: u8 = 0xe0;
const ASSIGNED_POLICE: u8 = 0xbb;
const OTHER_POLICE: u8 = 0xcc;
const CITIZEN: u8 = 0xaa;

fn addr(byte: u8) -> AccountAddress {
    AccountAddress::new([byte; 20])
}

fn identity(byte: u8) -> Identity {
    Identity::new(addr(byte), ChainId::new(1))
}

fn authenticated(byte: u8, role: Role) -> SessionSnapshot {
    SessionSnapshot {
        phase: SessionPhase::Authenticated,
        identity: Some(identity(byte)),
        role,
        authenticated_at: Some(Timestamp::new(1_000)),
        role_degraded: false,
    }
}

fn seeded_ledger() -> Arc<NullLedger> {
    let ledger = Arc::new(NullLedger::new(addr(GOVERNMENT)));
    ledger.seed_police(addr(ASSIGNED_POLICE));
    ledger.seed_police(addr(OTHER_POLICE));
    ledger
}

fn engine_as(
    ledger: &Arc<NullLedger>,
    byte: u8,
    role: Role,
) -> (CaseWorkflowEngine, watch::Sender<SessionSnapshot>) {
    let (tx, rx) = watch::channel(authenticated(byte, role));
    let clock = Arc::new(NullClock::new(1_000));
    (
        CaseWorkflowEngine::new(ledger.clone(), rx, clock),
        tx,
    )
}

fn draft() -> CaseDraft {
    CaseDraft {
        case_type: CaseType::OnlineHarassment,
        accused_entries: vec!["Name: X | Social: @x".into()],
        evidence_digests: vec![ContentDigest::new([3u8; 32]).to_string()],
        description_entries: vec!["stolen wallet".into()],
        incident_at: Timestamp::new(900),
    }
}

fn seeded_case(id: u64, status: CaseStatus, assigned: Option<AccountAddress>) -> CaseRecord {
    CaseRecord {
        id: CaseId::new(id),
        case_type: CaseType::FraudCall,
        status,
        complainant: addr(CITIZEN),
        assigned_police: assigned,
        accused_entries: vec![],
        evidence_digests: vec![],
        description_entries: vec!["desc".into()],
        filed_at: Timestamp::new(100),
        incident_at: Timestamp::new(90),
        remarks: vec![],
    }
}

#[tokio::test]
async fn citizen_submission_lands_as_submitted() {
    let ledger = seeded_ledger();
    let (engine, _session) = engine_as(&ledger, CITIZEN, Role::Citizen);

    engine.submit(&draft()).await.unwrap();

    let record = ledger.case_by_id(CaseId::new(1)).await.unwrap();
    assert_eq!(record.status, CaseStatus::Submitted);
    assert_eq!(record.complainant, addr(CITIZEN));
    assert_eq!(record.assigned_police, None);
}

#[tokio::test]
async fn non_citizen_roles_cannot_submit() {
    let ledger = seeded_ledger();
    for (byte, role) in [
        (GOVERNMENT, Role::Government),
        (ASSIGNED_POLICE, Role::Police),
    ] {
        let (engine, _session) = engine_as(&ledger, byte, role);
        let err = engine.submit(&draft()).await.unwrap_err();
        assert!(matches!(err, WorkflowError::NotAuthorized), "{role}: {err}");
    }
}

#[tokio::test]
async fn unauthenticated_session_cannot_act() {
    let ledger = seeded_ledger();
    let (tx, rx) = watch::channel(SessionSnapshot::disconnected());
    let engine = CaseWorkflowEngine::new(ledger.clone(), rx, Arc::new(NullClock::new(1_000)));
    drop(tx);

    assert!(matches!(
        engine.submit(&draft()).await.unwrap_err(),
        WorkflowError::NotAuthorized
    ));
    assert!(matches!(
        engine
            .update_status(CaseId::new(1), CaseStatus::Verified, "remark")
            .await
            .unwrap_err(),
        WorkflowError::NotAuthorized
    ));
}

#[tokio::test]
async fn assigning_a_submitted_case_is_an_invalid_transition() {
    let ledger = seeded_ledger();
    ledger.seed_case(seeded_case(1, CaseStatus::Submitted, None));
    let (engine, _session) = engine_as(&ledger, GOVERNMENT, Role::Government);

    // The case must first reach Verified through a government verify action.
    let err = engine
        .assign(CaseId::new(1), &addr(ASSIGNED_POLICE))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        WorkflowError::InvalidTransition {
            from: CaseStatus::Submitted,
            to: CaseStatus::UnderProcess,
        }
    ));
}

#[tokio::test]
async fn government_verifies_then_assigns() {
    let ledger = seeded_ledger();
    ledger.seed_case(seeded_case(1, CaseStatus::Submitted, None));
    let (engine, _session) = engine_as(&ledger, GOVERNMENT, Role::Government);

    engine
        .update_status(CaseId::new(1), CaseStatus::Verified, "looks genuine")
        .await
        .unwrap();
    engine
        .assign(CaseId::new(1), &addr(ASSIGNED_POLICE))
        .await
        .unwrap();

    let record = ledger.case_by_id(CaseId::new(1)).await.unwrap();
    assert_eq!(record.status, CaseStatus::UnderProcess);
    assert_eq!(record.assigned_police, Some(addr(ASSIGNED_POLICE)));
}

#[tokio::test]
async fn assignment_to_an_unknown_police_address_fails() {
    let ledger = seeded_ledger();
    ledger.seed_case(seeded_case(1, CaseStatus::Verified, None));
    let (engine, _session) = engine_as(&ledger, GOVERNMENT, Role::Government);

    let stranger = addr(0x99);
    let err = engine.assign(CaseId::new(1), &stranger).await.unwrap_err();
    assert!(matches!(err, WorkflowError::UnknownPoliceAddress(a) if a == stranger));
}

#[tokio::test]
async fn only_government_assigns() {
    let ledger = seeded_ledger();
    ledger.seed_case(seeded_case(1, CaseStatus::Verified, None));
    let (engine, _session) = engine_as(&ledger, ASSIGNED_POLICE, Role::Police);

    let err = engine
        .assign(CaseId::new(1), &addr(ASSIGNED_POLICE))
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::NotAuthorized));
}

#[tokio::test]
async fn unassigned_police_cannot_progress_a_case() {
    let ledger = seeded_ledger();
    ledger.seed_case(seeded_case(
        1,
        CaseStatus::UnderProcess,
        Some(addr(ASSIGNED_POLICE)),
    ));
    let (engine, _session) = engine_as(&ledger, OTHER_POLICE, Role::Police);

    let err = engine
        .update_status(CaseId::new(1), CaseStatus::Closed, "wrapping up")
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::NotAuthorized));
}

#[tokio::test]
async fn assigned_police_progresses_and_closes() {
    let ledger = seeded_ledger();
    ledger.seed_case(seeded_case(
        1,
        CaseStatus::UnderProcess,
        Some(addr(ASSIGNED_POLICE)),
    ));
    let (engine, _session) = engine_as(&ledger, ASSIGNED_POLICE, Role::Police);

    engine
        .update_status(CaseId::new(1), CaseStatus::UnderProcess, "questioned suspect")
        .await
        .unwrap();
    engine
        .update_status(CaseId::new(1), CaseStatus::Closed, "culprit arrested")
        .await
        .unwrap();

    let record = ledger.case_by_id(CaseId::new(1)).await.unwrap();
    assert_eq!(record.status, CaseStatus::Closed);
    assert_eq!(
        record.remarks,
        vec!["questioned suspect".to_string(), "culprit arrested".to_string()]
    );
}

#[tokio::test]
async fn government_can_close_a_non_closed_case() {
    let ledger = seeded_ledger();
    ledger.seed_case(seeded_case(
        1,
        CaseStatus::UnderProcess,
        Some(addr(ASSIGNED_POLICE)),
    ));
    let (engine, _session) = engine_as(&ledger, GOVERNMENT, Role::Government);

    engine
        .update_status(CaseId::new(1), CaseStatus::Closed, "escalated and resolved")
        .await
        .unwrap();
    let record = ledger.case_by_id(CaseId::new(1)).await.unwrap();
    assert_eq!(record.status, CaseStatus::Closed);
}

#[tokio::test]
async fn a_remark_is_always_required() {
    let ledger = seeded_ledger();
    ledger.seed_case(seeded_case(1, CaseStatus::Submitted, None));
    let (engine, _session) = engine_as(&ledger, GOVERNMENT, Role::Government);

    for remark in ["", "   "] {
        let err = engine
            .update_status(CaseId::new(1), CaseStatus::Verified, remark)
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::MissingRemark));
    }
}

#[tokio::test]
async fn the_assignment_edge_is_not_reachable_through_update_status() {
    let ledger = seeded_ledger();
    ledger.seed_case(seeded_case(1, CaseStatus::Verified, None));
    let (engine, _session) = engine_as(&ledger, GOVERNMENT, Role::Government);

    // Verified -> UnderProcess carries an assigned-police address as side
    // data; only `assign` can drive it.
    let err = engine
        .update_status(CaseId::new(1), CaseStatus::UnderProcess, "go")
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::InvalidTransition { .. }));
}

#[tokio::test]
async fn police_set_management_is_government_gated() {
    let ledger = seeded_ledger();
    let newcomer = addr(0x44);

    let (citizen_engine, _s1) = engine_as(&ledger, CITIZEN, Role::Citizen);
    assert!(matches!(
        citizen_engine.add_police(&newcomer).await.unwrap_err(),
        WorkflowError::NotAuthorized
    ));

    let (gov_engine, _s2) = engine_as(&ledger, GOVERNMENT, Role::Government);
    gov_engine.add_police(&newcomer).await.unwrap();
    assert!(ledger.is_police(&newcomer).await.unwrap());

    gov_engine.remove_police(&newcomer).await.unwrap();
    assert!(!ledger.is_police(&newcomer).await.unwrap());

    // Removing an address that is not in the set names the address.
    let err = gov_engine.remove_police(&newcomer).await.unwrap_err();
    assert!(matches!(err, WorkflowError::UnknownPoliceAddress(a) if a == newcomer));
}

#[tokio::test]
async fn ledger_outage_surfaces_as_a_ledger_error() {
    let ledger = seeded_ledger();
    let (engine, _session) = engine_as(&ledger, CITIZEN, Role::Citizen);
    ledger.fail_writes(true);

    let err = engine.submit(&draft()).await.unwrap_err();
    assert!(matches!(err, WorkflowError::Ledger(_)));
}

#[tokio::test]
async fn submitted_payload_round_trips_into_the_read_model() {
    let ledger = seeded_ledger();
    let (engine, _session) = engine_as(&ledger, CITIZEN, Role::Citizen);

    // A view watching filings over the citizen's own case list.
    let sync = Arc::new(Synchronizer::new());
    let _dispatcher = sync.attach(ledger.subscribe());
    let fetch_ledger = ledger.clone();
    let model = sync.register([EventKind::CaseFiled], move || {
        let ledger = fetch_ledger.clone();
        async move { ledger.cases_by_complainant(&addr(CITIZEN)).await }
    });

    let submitted = draft();
    engine.submit(&submitted).await.unwrap();

    // The read model reflects the filing via the CaseFiled event, with no
    // truncation or reordering of any list field.
    let mut rx = model.watch();
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            if rx
                .borrow_and_update()
                .data
                .as_ref()
                .is_some_and(|cases: &Vec<CaseRecord>| !cases.is_empty())
            {
                break;
            }
            sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("read model never observed the filing");

    let cases = model.current().data.unwrap();
    let record = &cases[0];
    assert_eq!(record.case_type, submitted.case_type);
    assert_eq!(record.status, CaseStatus::Submitted);
    assert_eq!(record.accused_entries, submitted.accused_entries);
    assert_eq!(record.description_entries, submitted.description_entries);
    assert_eq!(
        record
            .evidence_digests
            .iter()
            .map(|digest| digest.to_string())
            .collect::<Vec<_>>(),
        submitted.evidence_digests
    );
    assert_eq!(record.incident_at, submitted.incident_at);
    assert_eq!(record.complainant, addr(CITIZEN));
}
