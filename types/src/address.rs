//! Account address type — a 20-byte identifier, `0x`-prefixed hex on the wire.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::TypeError;

/// A 20-byte account address.
///
/// Parsed case-insensitively from `0x`-prefixed hex; always displayed
/// lowercase. Two addresses that differ only in hex casing compare equal,
/// since equality is over the raw bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccountAddress([u8; 20]);

impl AccountAddress {
    pub const LEN: usize = 20;

    /// The all-zero address, used as a placeholder for "no account".
    pub const ZERO: Self = Self([0u8; 20]);

    pub fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Parse from a `0x`-prefixed (or bare) 40-character hex string.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        let raw = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
        if raw.len() != Self::LEN * 2 {
            return Err(TypeError::InvalidAddress(format!(
                "expected {} hex characters, got {}",
                Self::LEN * 2,
                raw.len()
            )));
        }
        let bytes = hex::decode(raw)
            .map_err(|e| TypeError::InvalidAddress(format!("{s}: {e}")))?;
        let mut out = [0u8; 20];
        out.copy_from_slice(&bytes);
        Ok(Self(out))
    }
}

impl fmt::Display for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountAddress({self})")
    }
}

impl FromStr for AccountAddress {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for AccountAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for AccountAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(de::Error::custom)
    }
}
