//! The [`Ledger`] trait — the seam between the client core and the chain.
//!
//! Write operations are submit-and-wait: they resolve only once the ledger
//! confirms inclusion, and they never touch any client-held read model. The
//! UI observes the result exclusively through the push-notification channel.

use async_trait::async_trait;
use fir_types::{AccountAddress, CaseFiling, CaseId, CaseRecord, CaseStatus, Timestamp};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::error::LedgerError;
use crate::event::LedgerEvent;

/// Proof that a write was included by the ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InclusionReceipt {
    pub tx_hash: String,
    pub included_at: Timestamp,
}

/// The authoritative external store of case records and role-defining facts.
///
/// Implementations: [`crate::RpcLedger`] against a real node, and the
/// in-memory double in `fir-nullables` for tests.
#[async_trait]
pub trait Ledger: Send + Sync {
    // ── Read queries ────────────────────────────────────────────────────

    async fn case_by_id(&self, id: CaseId) -> Result<CaseRecord, LedgerError>;

    /// Every case on the ledger (police/government visibility).
    async fn all_cases(&self) -> Result<Vec<CaseRecord>, LedgerError>;

    /// Cases filed by one complainant (citizen visibility).
    async fn cases_by_complainant(
        &self,
        complainant: &AccountAddress,
    ) -> Result<Vec<CaseRecord>, LedgerError>;

    /// The designated government account.
    async fn government_address(&self) -> Result<AccountAddress, LedgerError>;

    /// The active police set.
    async fn police_set(&self) -> Result<Vec<AccountAddress>, LedgerError>;

    /// Whether `address` is in the active police set.
    async fn is_police(&self, address: &AccountAddress) -> Result<bool, LedgerError>;

    // ── Write operations (submit-and-wait) ──────────────────────────────

    async fn submit_case(
        &self,
        complainant: &AccountAddress,
        filing: &CaseFiling,
    ) -> Result<InclusionReceipt, LedgerError>;

    async fn assign_case(
        &self,
        actor: &AccountAddress,
        case_id: CaseId,
        police: &AccountAddress,
    ) -> Result<InclusionReceipt, LedgerError>;

    async fn update_status(
        &self,
        actor: &AccountAddress,
        case_id: CaseId,
        status: CaseStatus,
        remark: &str,
    ) -> Result<InclusionReceipt, LedgerError>;

    async fn add_police(
        &self,
        actor: &AccountAddress,
        address: &AccountAddress,
    ) -> Result<InclusionReceipt, LedgerError>;

    async fn remove_police(
        &self,
        actor: &AccountAddress,
        address: &AccountAddress,
    ) -> Result<InclusionReceipt, LedgerError>;

    // ── Push notifications ──────────────────────────────────────────────

    /// A fresh receiver on the ledger's change-notification channel.
    fn subscribe(&self) -> broadcast::Receiver<LedgerEvent>;
}
