//! Session state-machine tests: connect/authenticate flows, failure
//! landings, credential caching, coalescing, and identity-change handling.

use fir_nullables::{NullAuthenticator, NullClock, NullLedger, NullWallet};
use fir_session::{
    RoleResolver, SessionError, SessionManager, SessionPhase, TOKEN_TTL_SECS,
};
use fir_types::{AccountAddress, ChainId, Identity, Role};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

const GOVERNMENT: u8 = 0xe0;
const POLICE: u8 = 0xbb;
const CITIZEN: u8 = 0xaa;

fn addr(byte: u8) -> AccountAddress {
    AccountAddress::new([byte; 20])
}

fn identity(byte: u8) -> Identity {
    Identity::new(addr(byte), ChainId::new(1))
}

struct Harness {
    wallet: Arc<NullWallet>,
    auth: Arc<NullAuthenticator>,
    ledger: Arc<NullLedger>,
    clock: Arc<NullClock>,
    manager: Arc<SessionManager>,
}

fn harness(connected: Option<Identity>) -> Harness {
    let wallet = Arc::new(match connected {
        Some(identity) => NullWallet::with_identity(identity),
        None => NullWallet::new(),
    });
    let auth = Arc::new(NullAuthenticator::new());
    let ledger = Arc::new(NullLedger::new(addr(GOVERNMENT)));
    ledger.seed_police(addr(POLICE));
    let clock = Arc::new(NullClock::new(1_000));
    let manager = Arc::new(SessionManager::new(
        wallet.clone(),
        auth.clone(),
        RoleResolver::new(ledger.clone()),
        clock.clone(),
    ));
    Harness {
        wallet,
        auth,
        ledger,
        clock,
        manager,
    }
}

/// Role and credential must be paired: authenticated sessions carry both,
/// everything else carries neither.
fn assert_session_consistent(h: &Harness) {
    let snapshot = h.manager.snapshot();
    if snapshot.phase == SessionPhase::Authenticated {
        assert_ne!(snapshot.role, Role::Anonymous);
        assert!(snapshot.identity.is_some());
        assert!(snapshot.authenticated_at.is_some());
    } else {
        assert_eq!(snapshot.role, Role::Anonymous);
        assert!(snapshot.authenticated_at.is_none());
    }
}

#[tokio::test]
async fn connect_authenticates_and_resolves_citizen_role() {
    let h = harness(Some(identity(CITIZEN)));

    let snapshot = h.manager.connect().await.unwrap();

    assert_eq!(snapshot.phase, SessionPhase::Authenticated);
    assert_eq!(snapshot.identity, Some(identity(CITIZEN)));
    assert_eq!(snapshot.role, Role::Citizen);
    assert!(!snapshot.role_degraded);
    assert_eq!(h.wallet.signature_requests(), 1);
    assert_eq!(h.auth.issued_tokens(), 1);
    assert_session_consistent(&h);
}

#[tokio::test]
async fn government_account_resolves_government_role() {
    let h = harness(Some(identity(GOVERNMENT)));
    // The government address is also (mis)listed as police; government wins.
    h.ledger.seed_police(addr(GOVERNMENT));

    let snapshot = h.manager.connect().await.unwrap();
    assert_eq!(snapshot.role, Role::Government);
}

#[tokio::test]
async fn police_account_resolves_police_role() {
    let h = harness(Some(identity(POLICE)));
    let snapshot = h.manager.connect().await.unwrap();
    assert_eq!(snapshot.role, Role::Police);
}

#[tokio::test]
async fn declined_connection_lands_disconnected() {
    let h = harness(Some(identity(CITIZEN)));
    h.wallet.reject_connections(true);

    let err = h.manager.connect().await.unwrap_err();
    assert_eq!(err, SessionError::UserRejected);
    assert_eq!(h.manager.snapshot().phase, SessionPhase::Disconnected);
    assert_session_consistent(&h);
}

#[tokio::test]
async fn declined_signature_lands_connected_and_is_retryable() {
    let h = harness(Some(identity(CITIZEN)));
    h.wallet.reject_signatures(true);

    let err = h.manager.connect().await.unwrap_err();
    assert_eq!(err, SessionError::SignatureRejected);

    // Not a dead end: the wallet stays connected and a retry succeeds.
    let snapshot = h.manager.snapshot();
    assert_eq!(snapshot.phase, SessionPhase::Connected);
    assert_eq!(snapshot.identity, Some(identity(CITIZEN)));
    assert_session_consistent(&h);

    h.wallet.reject_signatures(false);
    let snapshot = h.manager.authenticate().await.unwrap();
    assert_eq!(snapshot.phase, SessionPhase::Authenticated);
}

#[tokio::test]
async fn verification_failure_lands_connected() {
    let h = harness(Some(identity(CITIZEN)));
    h.auth.fail_verifications(true);

    let err = h.manager.connect().await.unwrap_err();
    assert!(matches!(err, SessionError::AuthenticationFailed(_)));
    assert_eq!(h.manager.snapshot().phase, SessionPhase::Connected);
    assert_session_consistent(&h);
}

#[tokio::test]
async fn role_resolution_outage_degrades_to_citizen() {
    let h = harness(Some(identity(POLICE)));
    h.ledger.fail_reads(true);

    let snapshot = h.manager.connect().await.unwrap();

    // Login is not blocked; the session falls back to the least-privileged
    // role and flags the degradation.
    assert_eq!(snapshot.phase, SessionPhase::Authenticated);
    assert_eq!(snapshot.role, Role::Citizen);
    assert!(snapshot.role_degraded);
}

#[tokio::test]
async fn concurrent_authenticate_issues_one_signature_request() {
    let h = harness(Some(identity(CITIZEN)));
    h.manager
        .handle_identity_changed(Some(identity(CITIZEN)))
        .await
        .unwrap();
    assert_eq!(h.wallet.signature_requests(), 1);

    // Expire the cached credential, then race two authentications.
    h.clock.advance(TOKEN_TTL_SECS);
    h.wallet.set_sign_delay(Duration::from_millis(50));

    let first = {
        let manager = h.manager.clone();
        tokio::spawn(async move { manager.authenticate().await })
    };
    let second = {
        let manager = h.manager.clone();
        tokio::spawn(async move { manager.authenticate().await })
    };

    let first = first.await.unwrap().unwrap();
    let second = second.await.unwrap().unwrap();
    assert_eq!(first.phase, SessionPhase::Authenticated);
    assert_eq!(second.phase, SessionPhase::Authenticated);

    // One flight, one prompt: the second caller joined the first attempt.
    assert_eq!(h.wallet.signature_requests(), 2);
    assert_eq!(h.auth.issued_tokens(), 2);
}

#[tokio::test]
async fn unexpired_credential_short_circuits_the_prompt() {
    let h = harness(Some(identity(CITIZEN)));
    h.manager.connect().await.unwrap();
    assert_eq!(h.wallet.signature_requests(), 1);

    h.clock.advance(TOKEN_TTL_SECS - 1);
    let snapshot = h.manager.authenticate().await.unwrap();
    assert_eq!(snapshot.phase, SessionPhase::Authenticated);
    assert_eq!(h.wallet.signature_requests(), 1, "cached token must be reused");
    assert_eq!(h.auth.issued_tokens(), 1);
}

#[tokio::test]
async fn expired_credential_requires_a_new_signature() {
    let h = harness(Some(identity(CITIZEN)));
    h.manager.connect().await.unwrap();

    h.clock.advance(TOKEN_TTL_SECS);
    let snapshot = h.manager.authenticate().await.unwrap();
    assert_eq!(snapshot.phase, SessionPhase::Authenticated);
    assert_eq!(h.wallet.signature_requests(), 2);
}

#[tokio::test]
async fn account_switch_drops_credential_and_reauthenticates() {
    let h = harness(Some(identity(CITIZEN)));
    h.manager.connect().await.unwrap();

    h.wallet.switch_account(addr(POLICE));
    h.manager
        .handle_identity_changed(Some(identity(POLICE)))
        .await
        .unwrap();

    let snapshot = h.manager.snapshot();
    assert_eq!(snapshot.identity, Some(identity(POLICE)));
    assert_eq!(snapshot.role, Role::Police);
    assert_eq!(h.wallet.signature_requests(), 2);
    assert_session_consistent(&h);
}

#[tokio::test]
async fn returning_account_reuses_its_cached_credential() {
    let h = harness(Some(identity(CITIZEN)));
    h.manager.connect().await.unwrap();

    h.wallet.switch_account(addr(POLICE));
    h.manager
        .handle_identity_changed(Some(identity(POLICE)))
        .await
        .unwrap();
    assert_eq!(h.wallet.signature_requests(), 2);

    // Back to the first account within the TTL: no third prompt.
    h.wallet.switch_account(addr(CITIZEN));
    h.manager
        .handle_identity_changed(Some(identity(CITIZEN)))
        .await
        .unwrap();

    let snapshot = h.manager.snapshot();
    assert_eq!(snapshot.phase, SessionPhase::Authenticated);
    assert_eq!(snapshot.role, Role::Citizen);
    assert_eq!(h.wallet.signature_requests(), 2);
    assert_eq!(h.auth.issued_tokens(), 2);
}

#[tokio::test]
async fn chain_switch_drops_credential_and_rederives_role() {
    let h = harness(Some(identity(POLICE)));
    h.manager.connect().await.unwrap();
    assert_eq!(h.manager.snapshot().role, Role::Police);

    h.wallet.switch_chain(ChainId::new(2));
    h.manager
        .handle_identity_changed(Some(identity(POLICE).with_chain(ChainId::new(2))))
        .await
        .unwrap();

    let snapshot = h.manager.snapshot();
    assert_eq!(snapshot.phase, SessionPhase::Authenticated);
    assert_eq!(
        snapshot.identity,
        Some(identity(POLICE).with_chain(ChainId::new(2)))
    );
    assert_eq!(snapshot.role, Role::Police);
    // Chain-scoped credential: a fresh signature was required.
    assert_eq!(h.wallet.signature_requests(), 2);
}

#[tokio::test]
async fn wallet_disconnect_hard_resets_the_session() {
    let h = harness(Some(identity(CITIZEN)));
    let _driver = tokio::spawn(h.manager.clone().run());
    h.manager.connect().await.unwrap();

    h.wallet.disconnect();
    let mut snapshots = h.manager.snapshots();
    timeout(
        Duration::from_secs(2),
        snapshots.wait_for(|s| s.phase == SessionPhase::Disconnected),
    )
    .await
    .expect("session never reset")
    .unwrap();
    assert_session_consistent(&h);

    // The hard reset also purged the credential cache: reconnecting the same
    // account prompts again.
    h.wallet.switch_account(addr(CITIZEN));
    timeout(
        Duration::from_secs(2),
        snapshots.wait_for(|s| s.phase == SessionPhase::Authenticated),
    )
    .await
    .expect("session never re-authenticated")
    .unwrap();
    assert_eq!(h.wallet.signature_requests(), 2);
}

#[tokio::test]
async fn identity_change_sequences_keep_role_and_credential_paired() {
    let h = harness(Some(identity(CITIZEN)));
    h.manager.connect().await.unwrap();
    assert_session_consistent(&h);

    h.wallet.switch_account(addr(POLICE));
    let _ = h
        .manager
        .handle_identity_changed(Some(identity(POLICE)))
        .await;
    assert_session_consistent(&h);

    h.wallet.switch_chain(ChainId::new(7));
    let _ = h
        .manager
        .handle_identity_changed(Some(identity(POLICE).with_chain(ChainId::new(7))))
        .await;
    assert_session_consistent(&h);

    let _ = h.manager.handle_identity_changed(None).await;
    assert_session_consistent(&h);
    assert_eq!(h.manager.snapshot().phase, SessionPhase::Disconnected);

    h.wallet.switch_account(addr(GOVERNMENT));
    let _ = h
        .manager
        .handle_identity_changed(Some(identity(GOVERNMENT)))
        .await;
    assert_session_consistent(&h);
    assert_eq!(h.manager.snapshot().role, Role::Government);
}

#[tokio::test]
async fn authenticate_without_identity_fails() {
    let h = harness(None);
    let err = h.manager.authenticate().await.unwrap_err();
    assert_eq!(err, SessionError::WalletUnavailable);
}
