//! Chain identifier.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::TypeError;

/// The id of the chain the wallet is currently pointed at.
///
/// Wallet providers report this as a `0x`-prefixed hex string; the ledger RPC
/// uses the integer form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChainId(u64);

impl ChainId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Parse a wallet-provider hex chain id such as `"0x13882"`.
    pub fn from_hex_str(s: &str) -> Result<Self, TypeError> {
        let raw = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
        u64::from_str_radix(raw, 16)
            .map(Self)
            .map_err(|e| TypeError::InvalidChainId(format!("{s}: {e}")))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_wallet_hex_form() {
        assert_eq!(ChainId::from_hex_str("0x13882").unwrap(), ChainId::new(80002));
    }

    #[test]
    fn rejects_garbage() {
        assert!(ChainId::from_hex_str("0xnope").is_err());
    }
}
