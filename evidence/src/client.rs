//! HTTP client for the content-addressed evidence store.

use async_trait::async_trait;
use fir_types::ContentDigest;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::time::Duration;
use tracing::debug;

use crate::error::EvidenceError;

/// Derive the on-ledger digest for a store-issued content id.
pub fn digest_content_id(content_id: &str) -> ContentDigest {
    let hash = Sha256::digest(content_id.as_bytes());
    ContentDigest::new(hash.into())
}

/// The evidence store seam.
#[async_trait]
pub trait EvidenceStore: Send + Sync {
    /// Upload one file; returns the digest to reference in a case draft.
    async fn upload(&self, bytes: Vec<u8>, file_name: &str)
        -> Result<ContentDigest, EvidenceError>;
}

#[derive(Deserialize)]
struct UploadResponse {
    content_id: String,
}

/// Client for a pinning-service-style store: multipart upload, api-key
/// headers, JSON response carrying the content id.
pub struct HttpEvidenceStore {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    api_secret: String,
}

impl HttpEvidenceStore {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Result<Self, EvidenceError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| EvidenceError::Upload(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        })
    }
}

#[async_trait]
impl EvidenceStore for HttpEvidenceStore {
    async fn upload(
        &self,
        bytes: Vec<u8>,
        file_name: &str,
    ) -> Result<ContentDigest, EvidenceError> {
        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .http
            .post(format!("{}/store", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("x-api-secret", &self.api_secret)
            .multipart(form)
            .send()
            .await
            .map_err(|e| EvidenceError::Upload(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(EvidenceError::Upload(format!(
                "store returned HTTP {}",
                response.status()
            )));
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| EvidenceError::Decode(e.to_string()))?;
        debug!(content_id = %body.content_id, "evidence uploaded");
        Ok(digest_content_id(&body.content_id))
    }
}
