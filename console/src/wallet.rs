//! Local-key wallet for headless use.
//!
//! Implements the wallet-provider seam over an ed25519 key read from a seed
//! file, so the console can establish sessions without an interactive wallet.
//! The address is derived from the public key (SHA-256, first 20 bytes).

use async_trait::async_trait;
use ed25519_dalek::{Signer, SigningKey};
use fir_session::{IdentityChange, IdentityProvider, SessionError};
use fir_types::{AccountAddress, ChainId, Identity};
use sha2::{Digest, Sha256};
use std::path::Path;
use tokio::sync::broadcast;
use tracing::info;

/// A wallet backed by a local ed25519 signing key.
///
/// Headless: identity requests resolve without prompting, and no change
/// notifications ever fire (the key and chain are fixed for the process).
pub struct LocalKeyWallet {
    identity: Identity,
    key: SigningKey,
    // Held so `changes()` receivers stay open for the process lifetime.
    changes_tx: broadcast::Sender<IdentityChange>,
}

impl LocalKeyWallet {
    /// Load the signing key from a 32-byte hex seed file.
    pub fn from_seed_file(path: &Path, chain_id: ChainId) -> anyhow::Result<Self> {
        let seed_hex = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read key file {}: {e}", path.display()))?;
        let seed_bytes = hex::decode(seed_hex.trim())
            .map_err(|e| anyhow::anyhow!("key file is not valid hex: {e}"))?;
        let seed: [u8; 32] = seed_bytes
            .try_into()
            .map_err(|_| anyhow::anyhow!("key file must contain exactly 32 hex-encoded bytes"))?;

        let key = SigningKey::from_bytes(&seed);
        let address = derive_address(&key);
        let identity = Identity::new(address, chain_id);
        info!(%identity, "loaded console signing key");

        let (changes_tx, _) = broadcast::channel(1);
        Ok(Self {
            identity,
            key,
            changes_tx,
        })
    }

    pub fn address(&self) -> AccountAddress {
        self.identity.address
    }
}

fn derive_address(key: &SigningKey) -> AccountAddress {
    let hash = Sha256::digest(key.verifying_key().as_bytes());
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&hash[..20]);
    AccountAddress::new(bytes)
}

#[async_trait]
impl IdentityProvider for LocalKeyWallet {
    async fn connected_identity(&self) -> Option<Identity> {
        Some(self.identity)
    }

    async fn request_identity(&self) -> Result<Identity, SessionError> {
        Ok(self.identity)
    }

    async fn sign_message(&self, message: &str) -> Result<String, SessionError> {
        let signature = self.key.sign(message.as_bytes());
        Ok(hex::encode(signature.to_bytes()))
    }

    fn changes(&self) -> broadcast::Receiver<IdentityChange> {
        self.changes_tx.subscribe()
    }
}
