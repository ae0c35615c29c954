//! # Commitment Identifiers
//!
//! [`ScriptHash`] is the 32-byte commitment that keys every escrow record.
//! [`UniqueId`] is the 20-byte client nonce mixed into the commitment so
//! that two escrows with identical terms still get distinct keys.
//!
//! Both are opaque to the engine: it never interprets their bytes beyond
//! equality and the commitment recomputation in `mesc-crypto`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ValidationError;
use crate::hex;

/// A 32-byte commitment over the terms of an escrow.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScriptHash(pub [u8; 32]);

impl ScriptHash {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Return the raw bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex without prefix.
    pub fn to_hex(&self) -> String {
        hex::to_hex(&self.0)
    }

    /// Parse from a 64-character hex string, `0x` prefix optional.
    pub fn from_hex(s: &str) -> Result<Self, ValidationError> {
        hex::decode_fixed::<32>(s, "script hash").map(Self)
    }
}

impl std::fmt::Display for ScriptHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

impl std::fmt::Debug for ScriptHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ScriptHash(0x{})", self.to_hex())
    }
}

impl Serialize for ScriptHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ScriptHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// A 20-byte client-chosen nonce bound into the commitment.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniqueId(pub [u8; 20]);

impl UniqueId {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Return the raw bytes.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Lowercase hex without prefix.
    pub fn to_hex(&self) -> String {
        hex::to_hex(&self.0)
    }

    /// Parse from a 40-character hex string, `0x` prefix optional.
    pub fn from_hex(s: &str) -> Result<Self, ValidationError> {
        hex::decode_fixed::<20>(s, "unique id").map(Self)
    }
}

impl std::fmt::Display for UniqueId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

impl std::fmt::Debug for UniqueId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "UniqueId(0x{})", self.to_hex())
    }
}

impl Serialize for UniqueId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for UniqueId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_hash_hex_roundtrip() {
        let hash = ScriptHash([0x5a; 32]);
        assert_eq!(ScriptHash::from_hex(&hash.to_string()).unwrap(), hash);
    }

    #[test]
    fn script_hash_rejects_address_width() {
        assert!(ScriptHash::from_hex(&"ab".repeat(20)).is_err());
    }

    #[test]
    fn unique_id_serde() {
        let id = UniqueId([7; 20]);
        let json = serde_json::to_string(&id).unwrap();
        let back: UniqueId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
