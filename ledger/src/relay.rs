//! Relay client for fee-less (sponsored) submission.
//!
//! The relay accepts an encoded ledger call on behalf of a user, executes it
//! with sponsored fees, and exposes a task id the client polls until the
//! ledger confirms inclusion.

use fir_types::{AccountAddress, ChainId, Timestamp};
use serde::Deserialize;
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

use crate::client::InclusionReceipt;
use crate::error::LedgerError;

/// How often the relay task status is polled.
const POLL_INTERVAL: Duration = Duration::from_secs(2);
/// Give up after this many polls (~2 minutes).
const MAX_POLLS: u32 = 60;

/// State of a sponsored submission, as reported by the relay.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RelayTaskState {
    /// Accepted, not yet included.
    Pending,
    /// Included by the ledger.
    Included { tx_hash: String, included_at: u64 },
    /// The relay gave up on the call.
    Cancelled { reason: String },
}

#[derive(Deserialize)]
struct SponsoredCallResult {
    task_id: String,
}

/// HTTP client for the sponsoring relay service.
pub struct RelayClient {
    http: reqwest::Client,
    base_url: String,
}

impl RelayClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, LedgerError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| LedgerError::Relay(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    /// Submit a sponsored call; returns the relay's task id.
    pub async fn sponsored_call(
        &self,
        chain_id: ChainId,
        user: &AccountAddress,
        action: &str,
        params: serde_json::Value,
    ) -> Result<String, LedgerError> {
        let body = serde_json::json!({
            "chain_id": chain_id,
            "user": user,
            "call": { "action": action, "params": params },
        });

        let response = self
            .http
            .post(format!("{}/relays/sponsored-call", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| LedgerError::Relay(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(LedgerError::Relay(format!(
                "relay returned HTTP {}",
                response.status()
            )));
        }

        let result: SponsoredCallResult = response
            .json()
            .await
            .map_err(|e| LedgerError::Relay(format!("invalid relay response: {e}")))?;
        debug!(task_id = %result.task_id, "sponsored call accepted");
        Ok(result.task_id)
    }

    /// Fetch the current state of a relay task.
    pub async fn task_status(&self, task_id: &str) -> Result<RelayTaskState, LedgerError> {
        let response = self
            .http
            .get(format!("{}/tasks/{task_id}", self.base_url))
            .send()
            .await
            .map_err(|e| LedgerError::Relay(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(LedgerError::Relay(format!(
                "relay returned HTTP {}",
                response.status()
            )));
        }

        response
            .json::<RelayTaskState>()
            .await
            .map_err(|e| LedgerError::Relay(format!("invalid task status: {e}")))
    }

    /// Poll a task until the ledger confirms inclusion.
    ///
    /// Resolves with an [`InclusionReceipt`] on inclusion, or an error when
    /// the relay cancels the task or the poll budget runs out. The write may
    /// still land after a timeout; the caller observes it, if it does, through
    /// the ledger's push notifications like any other change.
    pub async fn wait_included(&self, task_id: &str) -> Result<InclusionReceipt, LedgerError> {
        for _ in 0..MAX_POLLS {
            match self.task_status(task_id).await? {
                RelayTaskState::Pending => sleep(POLL_INTERVAL).await,
                RelayTaskState::Included {
                    tx_hash,
                    included_at,
                } => {
                    return Ok(InclusionReceipt {
                        tx_hash,
                        included_at: Timestamp::new(included_at),
                    })
                }
                RelayTaskState::Cancelled { reason } => {
                    return Err(LedgerError::Rejected(format!("relay cancelled: {reason}")))
                }
            }
        }
        Err(LedgerError::Relay(format!(
            "task {task_id} not included after {MAX_POLLS} polls"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_state_decodes_from_tagged_wire_form() {
        let pending: RelayTaskState = serde_json::from_str(r#"{"state":"pending"}"#).unwrap();
        assert_eq!(pending, RelayTaskState::Pending);

        let included: RelayTaskState = serde_json::from_str(
            r#"{"state":"included","tx_hash":"0xfeed","included_at":99}"#,
        )
        .unwrap();
        assert_eq!(
            included,
            RelayTaskState::Included {
                tx_hash: "0xfeed".into(),
                included_at: 99
            }
        );

        let cancelled: RelayTaskState =
            serde_json::from_str(r#"{"state":"cancelled","reason":"underpriced"}"#).unwrap();
        assert_eq!(
            cancelled,
            RelayTaskState::Cancelled {
                reason: "underpriced".into()
            }
        );
    }
}
