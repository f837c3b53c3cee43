//! Nullable authentication service.

use async_trait::async_trait;
use fir_session::{Authenticator, SessionError};
use fir_types::AccountAddress;
use std::sync::Mutex;

use crate::wallet::null_signature;

struct Inner {
    issued: u64,
    fail: bool,
}

/// Verifies the nullable wallet's signature form and issues deterministic
/// tokens.
pub struct NullAuthenticator {
    inner: Mutex<Inner>,
}

impl NullAuthenticator {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                issued: 0,
                fail: false,
            }),
        }
    }

    /// Make every verification fail, regardless of signature.
    pub fn fail_verifications(&self, fail: bool) {
        self.inner.lock().unwrap().fail = fail;
    }

    /// How many tokens this service has issued.
    pub fn issued_tokens(&self) -> u64 {
        self.inner.lock().unwrap().issued
    }
}

impl Default for NullAuthenticator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Authenticator for NullAuthenticator {
    async fn verify(
        &self,
        address: &AccountAddress,
        signature: &str,
    ) -> Result<String, SessionError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail {
            return Err(SessionError::AuthenticationFailed("scripted failure".into()));
        }
        if signature != null_signature(address) {
            return Err(SessionError::AuthenticationFailed(
                "recovered signer does not match account".into(),
            ));
        }
        inner.issued += 1;
        Ok(format!("null-token-{address}-{}", inner.issued))
    }
}
