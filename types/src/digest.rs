//! Content digest type for evidence references.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::TypeError;

/// A 32-byte content hash identifying one piece of evidence.
///
/// The digest is opaque to the client: it is produced by the evidence store
/// glue and stored verbatim on the ledger. Hex on the wire.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentDigest([u8; 32]);

impl ContentDigest {
    pub const LEN: usize = 32;

    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Parse from a `0x`-prefixed (or bare) 64-character hex string.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        let raw = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
        if raw.len() != Self::LEN * 2 {
            return Err(TypeError::InvalidDigest(format!(
                "expected {} hex characters, got {}",
                Self::LEN * 2,
                raw.len()
            )));
        }
        let bytes = hex::decode(raw)
            .map_err(|e| TypeError::InvalidDigest(format!("{s}: {e}")))?;
        let mut out = [0u8; 32];
        out.copy_from_slice(&bytes);
        Ok(Self(out))
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentDigest({self})")
    }
}

impl FromStr for ContentDigest {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for ContentDigest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ContentDigest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrips_through_display() {
        let digest = ContentDigest::new([7u8; 32]);
        let parsed = ContentDigest::parse(&digest.to_string()).unwrap();
        assert_eq!(digest, parsed);
    }

    #[test]
    fn rejects_short_input() {
        assert!(ContentDigest::parse("0x0707").is_err());
    }
}
