//! Authentication service client.
//!
//! Verifies a signed challenge against an address and issues a time-bounded
//! session credential. The token is opaque to the client and session-local:
//! it is presented on no further endpoint in this core.

use async_trait::async_trait;
use fir_types::{AccountAddress, Timestamp};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::error::SessionError;

/// The fixed challenge string every account signs to authenticate.
pub const AUTH_CHALLENGE: &str =
    "Register cyberCrime Reports. You accept our terms and conditions";

/// Client-side credential lifetime. The issuer bounds tokens to one hour;
/// the client treats a cached token as expired after the same interval.
pub const TOKEN_TTL_SECS: u64 = 3600;

/// An issued session credential.
///
/// Valid only while the identity it was derived for is unchanged; any address
/// change invalidates it, a chain change does too (the credential may be
/// chain-scoped).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionToken {
    pub token: String,
    pub issued_at: Timestamp,
}

impl SessionToken {
    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.issued_at.expired_after(TOKEN_TTL_SECS, now)
    }
}

/// Server-side collaborator that verifies signatures and issues credentials.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Verify `signature` over [`AUTH_CHALLENGE`] for `address`; returns the
    /// raw opaque token on success.
    async fn verify(
        &self,
        address: &AccountAddress,
        signature: &str,
    ) -> Result<String, SessionError>;
}

#[derive(Deserialize)]
struct TokenResponse {
    token: String,
}

/// HTTP client for the authentication service.
///
/// `POST {base}/authentication?accountAddress=<addr>` with body
/// `{"signature": ...}`; the service must reject when the recovered signer of
/// the challenge does not equal the account address.
pub struct AuthHttpClient {
    http: reqwest::Client,
    base_url: String,
}

impl AuthHttpClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, SessionError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| {
                SessionError::AuthenticationFailed(format!("failed to create HTTP client: {e}"))
            })?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl Authenticator for AuthHttpClient {
    async fn verify(
        &self,
        address: &AccountAddress,
        signature: &str,
    ) -> Result<String, SessionError> {
        let response = self
            .http
            .post(format!("{}/authentication", self.base_url))
            .query(&[("accountAddress", address.to_string())])
            .json(&serde_json::json!({ "signature": signature }))
            .send()
            .await
            .map_err(|e| SessionError::AuthenticationFailed(format!("request failed: {e}")))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(SessionError::AuthenticationFailed(
                "recovered signer does not match account".into(),
            ));
        }
        if !status.is_success() {
            return Err(SessionError::AuthenticationFailed(format!(
                "authentication service returned HTTP {status}"
            )));
        }

        let body: TokenResponse = response.json().await.map_err(|e| {
            SessionError::AuthenticationFailed(format!("invalid token response: {e}"))
        })?;
        debug!(%address, "authentication service issued a credential");
        Ok(body.token)
    }
}
