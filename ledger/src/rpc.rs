//! JSON-RPC HTTP client for a ledger node.
//!
//! Wraps `reqwest::Client` with the node's base URL and provides typed
//! methods for each RPC action the client needs. Requests carry an `action`
//! field; responses use a `result`/`error` envelope.

use async_trait::async_trait;
use fir_types::{AccountAddress, CaseFiling, CaseId, CaseRecord, CaseStatus, ChainId};
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::debug;

use crate::client::{InclusionReceipt, Ledger};
use crate::error::LedgerError;
use crate::event::LedgerEvent;
use crate::feed::EventFeed;
use crate::relay::RelayClient;

/// Capacity of the event fan-out channel shared with [`EventFeed`].
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// HTTP client for communicating with a ledger node via JSON-RPC.
pub struct RpcLedger {
    http: reqwest::Client,
    node_url: String,
    chain_id: ChainId,
    /// When set, `submit_case` goes through the relay (fee-less submission).
    relay: Option<RelayClient>,
    events_tx: broadcast::Sender<LedgerEvent>,
}

impl RpcLedger {
    /// Create a new client targeting the given base URL (e.g. `http://127.0.0.1:9550`).
    pub fn new(node_url: impl Into<String>, chain_id: ChainId) -> Result<Self, LedgerError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| LedgerError::Unavailable(format!("failed to create HTTP client: {e}")))?;
        let (events_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Ok(Self {
            http,
            node_url: node_url.into(),
            chain_id,
            relay: None,
            events_tx,
        })
    }

    /// Route case submission through a relay for fee-less execution.
    pub fn with_relay(mut self, relay: RelayClient) -> Self {
        self.relay = Some(relay);
        self
    }

    /// The configured node URL.
    pub fn node_url(&self) -> &str {
        &self.node_url
    }

    /// Build the push-notification feed for this ledger.
    ///
    /// The caller spawns [`EventFeed::run`]; events it decodes fan out to
    /// every receiver obtained through [`Ledger::subscribe`].
    pub fn event_feed(&self, ws_url: impl Into<String>) -> EventFeed {
        EventFeed::new(ws_url, self.events_tx.clone())
    }

    /// Send a JSON-RPC request and return the `result` field.
    async fn rpc_call(
        &self,
        action: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, LedgerError> {
        let mut body = params;
        body.as_object_mut()
            .ok_or_else(|| LedgerError::Rpc("params must be a JSON object".into()))?
            .insert("action".to_string(), serde_json::json!(action));

        debug!(action, "ledger rpc call");
        let response = self
            .http
            .post(&self.node_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| LedgerError::Unavailable(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(LedgerError::Unavailable(format!(
                "node returned HTTP {}",
                response.status()
            )));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| LedgerError::Decode(format!("invalid JSON response: {e}")))?;

        if let Some(err) = json.get("error").and_then(|e| e.as_str()) {
            return Err(LedgerError::Rpc(err.to_string()));
        }

        Ok(json.get("result").cloned().unwrap_or(json))
    }

    fn decode<T: for<'de> Deserialize<'de>>(
        value: serde_json::Value,
        what: &str,
    ) -> Result<T, LedgerError> {
        serde_json::from_value(value)
            .map_err(|e| LedgerError::Decode(format!("invalid {what} response: {e}")))
    }
}

#[derive(Deserialize)]
struct CaseListResult {
    cases: Vec<CaseRecord>,
}

#[derive(Deserialize)]
struct GovernmentResult {
    government: AccountAddress,
}

#[derive(Deserialize)]
struct PoliceSetResult {
    police: Vec<AccountAddress>,
}

#[derive(Deserialize)]
struct PoliceMemberResult {
    active: bool,
}

#[async_trait]
impl Ledger for RpcLedger {
    async fn case_by_id(&self, id: CaseId) -> Result<CaseRecord, LedgerError> {
        let result = self
            .rpc_call("case_info", serde_json::json!({ "case_id": id }))
            .await;
        match result {
            Ok(value) => Self::decode(value, "case_info"),
            Err(LedgerError::Rpc(msg)) if msg.contains("not found") => {
                Err(LedgerError::CaseNotFound(id))
            }
            Err(e) => Err(e),
        }
    }

    async fn all_cases(&self) -> Result<Vec<CaseRecord>, LedgerError> {
        let result = self.rpc_call("case_list", serde_json::json!({})).await?;
        Self::decode::<CaseListResult>(result, "case_list").map(|r| r.cases)
    }

    async fn cases_by_complainant(
        &self,
        complainant: &AccountAddress,
    ) -> Result<Vec<CaseRecord>, LedgerError> {
        let result = self
            .rpc_call(
                "case_list_by_complainant",
                serde_json::json!({ "complainant": complainant }),
            )
            .await?;
        Self::decode::<CaseListResult>(result, "case_list_by_complainant").map(|r| r.cases)
    }

    async fn government_address(&self) -> Result<AccountAddress, LedgerError> {
        let result = self
            .rpc_call("government_account", serde_json::json!({}))
            .await?;
        Self::decode::<GovernmentResult>(result, "government_account").map(|r| r.government)
    }

    async fn police_set(&self) -> Result<Vec<AccountAddress>, LedgerError> {
        let result = self.rpc_call("police_set", serde_json::json!({})).await?;
        Self::decode::<PoliceSetResult>(result, "police_set").map(|r| r.police)
    }

    async fn is_police(&self, address: &AccountAddress) -> Result<bool, LedgerError> {
        let result = self
            .rpc_call("police_member", serde_json::json!({ "address": address }))
            .await?;
        Self::decode::<PoliceMemberResult>(result, "police_member").map(|r| r.active)
    }

    async fn submit_case(
        &self,
        complainant: &AccountAddress,
        filing: &CaseFiling,
    ) -> Result<InclusionReceipt, LedgerError> {
        let params = serde_json::json!({
            "complainant": complainant,
            "filing": filing,
        });

        if let Some(relay) = &self.relay {
            let task_id = relay
                .sponsored_call(self.chain_id, complainant, "submit_case", params)
                .await?;
            return relay.wait_included(&task_id).await;
        }

        let result = self.rpc_call("submit_case", params).await?;
        Self::decode(result, "submit_case")
    }

    async fn assign_case(
        &self,
        actor: &AccountAddress,
        case_id: CaseId,
        police: &AccountAddress,
    ) -> Result<InclusionReceipt, LedgerError> {
        let result = self
            .rpc_call(
                "assign_case",
                serde_json::json!({
                    "actor": actor,
                    "case_id": case_id,
                    "police": police,
                }),
            )
            .await?;
        Self::decode(result, "assign_case")
    }

    async fn update_status(
        &self,
        actor: &AccountAddress,
        case_id: CaseId,
        status: CaseStatus,
        remark: &str,
    ) -> Result<InclusionReceipt, LedgerError> {
        let result = self
            .rpc_call(
                "update_status",
                serde_json::json!({
                    "actor": actor,
                    "case_id": case_id,
                    "status": status,
                    "remark": remark,
                }),
            )
            .await?;
        Self::decode(result, "update_status")
    }

    async fn add_police(
        &self,
        actor: &AccountAddress,
        address: &AccountAddress,
    ) -> Result<InclusionReceipt, LedgerError> {
        let result = self
            .rpc_call(
                "police_add",
                serde_json::json!({ "actor": actor, "address": address }),
            )
            .await?;
        Self::decode(result, "police_add")
    }

    async fn remove_police(
        &self,
        actor: &AccountAddress,
        address: &AccountAddress,
    ) -> Result<InclusionReceipt, LedgerError> {
        let result = self
            .rpc_call(
                "police_remove",
                serde_json::json!({ "actor": actor, "address": address }),
            )
            .await?;
        Self::decode(result, "police_remove")
    }

    fn subscribe(&self) -> broadcast::Receiver<LedgerEvent> {
        self.events_tx.subscribe()
    }
}
