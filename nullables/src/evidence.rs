//! Nullable evidence store.

use async_trait::async_trait;
use fir_evidence::{digest_content_id, EvidenceError, EvidenceStore};
use fir_types::ContentDigest;
use std::sync::Mutex;

struct Inner {
    uploads: Vec<String>,
    fail: bool,
}

/// An in-memory evidence store issuing deterministic content ids.
pub struct NullEvidenceStore {
    inner: Mutex<Inner>,
}

impl NullEvidenceStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                uploads: Vec::new(),
                fail: false,
            }),
        }
    }

    /// Make every upload fail.
    pub fn fail_uploads(&self, fail: bool) {
        self.inner.lock().unwrap().fail = fail;
    }

    /// File names uploaded so far, in order.
    pub fn uploads(&self) -> Vec<String> {
        self.inner.lock().unwrap().uploads.clone()
    }
}

impl Default for NullEvidenceStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EvidenceStore for NullEvidenceStore {
    async fn upload(
        &self,
        _bytes: Vec<u8>,
        file_name: &str,
    ) -> Result<ContentDigest, EvidenceError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail {
            return Err(EvidenceError::Upload("scripted upload failure".into()));
        }
        inner.uploads.push(file_name.to_string());
        let content_id = format!("null-cid-{}-{file_name}", inner.uploads.len());
        Ok(digest_content_id(&content_id))
    }
}
