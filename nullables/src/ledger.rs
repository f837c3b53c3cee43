//! Nullable ledger — thread-safe in-memory case store for testing.
//!
//! Writes emit real [`LedgerEvent`]s on the broadcast channel, so the full
//! submit → event → refetch loop is testable without a node.

use async_trait::async_trait;
use fir_ledger::{InclusionReceipt, Ledger, LedgerError, LedgerEvent};
use fir_types::{
    AccountAddress, CaseFiling, CaseId, CaseRecord, CaseStatus, Timestamp,
};
use std::collections::BTreeMap;
use std::sync::Mutex;
use tokio::sync::broadcast;

struct Inner {
    government: AccountAddress,
    police: Vec<AccountAddress>,
    cases: BTreeMap<u64, CaseRecord>,
    next_case_id: u64,
    /// Monotonic write counter; doubles as the deterministic inclusion time.
    height: u64,
    fail_reads: bool,
    fail_writes: bool,
}

/// An in-memory ledger for testing.
pub struct NullLedger {
    inner: Mutex<Inner>,
    events_tx: broadcast::Sender<LedgerEvent>,
}

impl NullLedger {
    pub fn new(government: AccountAddress) -> Self {
        let (events_tx, _) = broadcast::channel(64);
        Self {
            inner: Mutex::new(Inner {
                government,
                police: Vec::new(),
                cases: BTreeMap::new(),
                next_case_id: 1,
                height: 0,
                fail_reads: false,
                fail_writes: false,
            }),
            events_tx,
        }
    }

    /// Seed a police account without going through the write path.
    pub fn seed_police(&self, address: AccountAddress) {
        let mut inner = self.inner.lock().unwrap();
        if !inner.police.contains(&address) {
            inner.police.push(address);
        }
    }

    /// Seed a case record directly.
    pub fn seed_case(&self, record: CaseRecord) {
        let mut inner = self.inner.lock().unwrap();
        inner.next_case_id = inner.next_case_id.max(record.id.as_u64() + 1);
        inner.cases.insert(record.id.as_u64(), record);
    }

    /// Make every read query fail with `LedgerError::Unavailable`.
    pub fn fail_reads(&self, fail: bool) {
        self.inner.lock().unwrap().fail_reads = fail;
    }

    /// Make every write operation fail with `LedgerError::Unavailable`.
    pub fn fail_writes(&self, fail: bool) {
        self.inner.lock().unwrap().fail_writes = fail;
    }

    /// A sender for injecting events directly (e.g. to simulate notifications
    /// for writes that happened elsewhere).
    pub fn event_sender(&self) -> broadcast::Sender<LedgerEvent> {
        self.events_tx.clone()
    }

    fn emit(&self, event: LedgerEvent) {
        // Send only fails when no subscriber exists, which is fine in tests.
        let _ = self.events_tx.send(event);
    }

    fn check_reads(inner: &Inner) -> Result<(), LedgerError> {
        if inner.fail_reads {
            Err(LedgerError::Unavailable("scripted read outage".into()))
        } else {
            Ok(())
        }
    }

    fn begin_write(inner: &mut Inner) -> Result<InclusionReceipt, LedgerError> {
        if inner.fail_writes {
            return Err(LedgerError::Unavailable("scripted write outage".into()));
        }
        inner.height += 1;
        Ok(InclusionReceipt {
            tx_hash: format!("null-tx-{}", inner.height),
            included_at: Timestamp::new(inner.height),
        })
    }
}

#[async_trait]
impl Ledger for NullLedger {
    async fn case_by_id(&self, id: CaseId) -> Result<CaseRecord, LedgerError> {
        let inner = self.inner.lock().unwrap();
        Self::check_reads(&inner)?;
        inner
            .cases
            .get(&id.as_u64())
            .cloned()
            .ok_or(LedgerError::CaseNotFound(id))
    }

    async fn all_cases(&self) -> Result<Vec<CaseRecord>, LedgerError> {
        let inner = self.inner.lock().unwrap();
        Self::check_reads(&inner)?;
        Ok(inner.cases.values().cloned().collect())
    }

    async fn cases_by_complainant(
        &self,
        complainant: &AccountAddress,
    ) -> Result<Vec<CaseRecord>, LedgerError> {
        let inner = self.inner.lock().unwrap();
        Self::check_reads(&inner)?;
        Ok(inner
            .cases
            .values()
            .filter(|record| record.complainant == *complainant)
            .cloned()
            .collect())
    }

    async fn government_address(&self) -> Result<AccountAddress, LedgerError> {
        let inner = self.inner.lock().unwrap();
        Self::check_reads(&inner)?;
        Ok(inner.government)
    }

    async fn police_set(&self) -> Result<Vec<AccountAddress>, LedgerError> {
        let inner = self.inner.lock().unwrap();
        Self::check_reads(&inner)?;
        Ok(inner.police.clone())
    }

    async fn is_police(&self, address: &AccountAddress) -> Result<bool, LedgerError> {
        let inner = self.inner.lock().unwrap();
        Self::check_reads(&inner)?;
        Ok(inner.police.contains(address))
    }

    async fn submit_case(
        &self,
        complainant: &AccountAddress,
        filing: &CaseFiling,
    ) -> Result<InclusionReceipt, LedgerError> {
        let (receipt, event) = {
            let mut inner = self.inner.lock().unwrap();
            let receipt = Self::begin_write(&mut inner)?;
            let id = CaseId::new(inner.next_case_id);
            inner.next_case_id += 1;

            let record = CaseRecord {
                id,
                case_type: filing.case_type,
                status: CaseStatus::Submitted,
                complainant: *complainant,
                assigned_police: None,
                accused_entries: filing.accused_entries.clone(),
                evidence_digests: filing.evidence_digests.clone(),
                description_entries: filing.description_entries.clone(),
                filed_at: receipt.included_at,
                incident_at: filing.incident_at,
                remarks: Vec::new(),
            };
            inner.cases.insert(id.as_u64(), record);
            (
                receipt,
                LedgerEvent::CaseFiled {
                    case_id: id,
                    complainant: *complainant,
                },
            )
        };
        self.emit(event);
        Ok(receipt)
    }

    async fn assign_case(
        &self,
        _actor: &AccountAddress,
        case_id: CaseId,
        police: &AccountAddress,
    ) -> Result<InclusionReceipt, LedgerError> {
        let receipt = {
            let mut inner = self.inner.lock().unwrap();
            if !inner.police.contains(police) {
                return Err(LedgerError::Rejected(format!(
                    "{police} is not an active police account"
                )));
            }
            let receipt = Self::begin_write(&mut inner)?;
            let record = inner
                .cases
                .get_mut(&case_id.as_u64())
                .ok_or(LedgerError::CaseNotFound(case_id))?;
            if record.status != CaseStatus::Verified {
                return Err(LedgerError::Rejected(format!(
                    "cannot assign a case in status {}",
                    record.status
                )));
            }
            record.assigned_police = Some(*police);
            record.status = CaseStatus::UnderProcess;
            receipt
        };
        self.emit(LedgerEvent::CaseAssigned {
            case_id,
            police: *police,
        });
        self.emit(LedgerEvent::CaseStatusChanged {
            case_id,
            status: CaseStatus::UnderProcess,
        });
        Ok(receipt)
    }

    async fn update_status(
        &self,
        _actor: &AccountAddress,
        case_id: CaseId,
        status: CaseStatus,
        remark: &str,
    ) -> Result<InclusionReceipt, LedgerError> {
        let receipt = {
            let mut inner = self.inner.lock().unwrap();
            let receipt = Self::begin_write(&mut inner)?;
            let record = inner
                .cases
                .get_mut(&case_id.as_u64())
                .ok_or(LedgerError::CaseNotFound(case_id))?;
            record.status = status;
            record.remarks.push(remark.to_string());
            receipt
        };
        self.emit(LedgerEvent::CaseStatusChanged { case_id, status });
        Ok(receipt)
    }

    async fn add_police(
        &self,
        _actor: &AccountAddress,
        address: &AccountAddress,
    ) -> Result<InclusionReceipt, LedgerError> {
        let receipt = {
            let mut inner = self.inner.lock().unwrap();
            let receipt = Self::begin_write(&mut inner)?;
            if !inner.police.contains(address) {
                inner.police.push(*address);
            }
            receipt
        };
        self.emit(LedgerEvent::PoliceSetChanged {
            police: *address,
            active: true,
        });
        Ok(receipt)
    }

    async fn remove_police(
        &self,
        _actor: &AccountAddress,
        address: &AccountAddress,
    ) -> Result<InclusionReceipt, LedgerError> {
        let receipt = {
            let mut inner = self.inner.lock().unwrap();
            let receipt = Self::begin_write(&mut inner)?;
            inner.police.retain(|member| member != address);
            receipt
        };
        self.emit(LedgerEvent::PoliceSetChanged {
            police: *address,
            active: false,
        });
        Ok(receipt)
    }

    fn subscribe(&self) -> broadcast::Receiver<LedgerEvent> {
        self.events_tx.subscribe()
    }
}
