//! Wallet identity — the (address, chain) pair a session is scoped to.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{AccountAddress, ChainId};

/// The identity of the connected wallet.
///
/// Replaced wholesale on any account or chain change; never patched in place,
/// since both the signer and any derived authorization become invalid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub address: AccountAddress,
    pub chain_id: ChainId,
}

impl Identity {
    pub fn new(address: AccountAddress, chain_id: ChainId) -> Self {
        Self { address, chain_id }
    }

    /// A copy of this identity pointed at a different chain.
    pub fn with_chain(&self, chain_id: ChainId) -> Self {
        Self {
            address: self.address,
            chain_id,
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@chain-{}", self.address, self.chain_id)
    }
}
