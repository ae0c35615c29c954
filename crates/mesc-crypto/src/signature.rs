//! # Recoverable Signatures
//!
//! A secp256k1 ECDSA signature in `v/r/s` form, where `v ∈ {27, 28}`
//! selects which of the two candidate public keys to recover.
//!
//! ## Serde
//!
//! Serializes as a `0x`-prefixed 65-byte hex string, `r ‖ s ‖ v`, the
//! layout wallets emit.

use mesc_core::hex;
use secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CryptoError;

/// Offset added to the raw recovery id in the `v` byte.
pub const V_OFFSET: u8 = 27;

/// A signature in `v/r/s` form.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature {
    /// Recovery byte, 27 or 28 for a well-formed signature.
    pub v: u8,
    /// The `r` scalar, big-endian.
    pub r: [u8; 32],
    /// The `s` scalar, big-endian.
    pub s: [u8; 32],
}

impl Signature {
    /// Build from parts.
    pub const fn new(v: u8, r: [u8; 32], s: [u8; 32]) -> Self {
        Self { v, r, s }
    }

    /// Parse the 65-byte `r ‖ s ‖ v` encoding.
    ///
    /// `v` is not range-checked here; an out-of-range value surfaces as
    /// [`CryptoError::InvalidRecoveryId`] on recovery.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != 65 {
            return Err(CryptoError::MalformedSignature(format!(
                "expected 65 bytes, got {}",
                bytes.len()
            )));
        }
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..64]);
        Ok(Self { v: bytes[64], r, s })
    }

    /// The 65-byte `r ‖ s ‖ v` encoding.
    pub fn to_bytes(&self) -> [u8; 65] {
        let mut out = [0u8; 65];
        out[..32].copy_from_slice(&self.r);
        out[32..64].copy_from_slice(&self.s);
        out[64] = self.v;
        out
    }

    /// Zip parallel `v`, `r`, `s` arrays into signatures.
    ///
    /// Rejects arrays of unequal length. Empty arrays yield an empty vector;
    /// whether zero signatures is acceptable is the verifier's decision.
    pub fn from_components(
        v: &[u8],
        r: &[[u8; 32]],
        s: &[[u8; 32]],
    ) -> Result<Vec<Signature>, CryptoError> {
        if v.len() != r.len() || r.len() != s.len() {
            return Err(CryptoError::ComponentCountMismatch {
                v: v.len(),
                r: r.len(),
                s: s.len(),
            });
        }
        Ok(v.iter()
            .zip(r)
            .zip(s)
            .map(|((v, r), s)| Signature::new(*v, *r, *s))
            .collect())
    }

    /// Lowercase hex of the 65-byte encoding, without prefix.
    pub fn to_hex(&self) -> String {
        hex::to_hex(&self.to_bytes())
    }

    /// Parse from a 130-character hex string, `0x` prefix optional.
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        let bytes = hex::decode(s).map_err(|e| CryptoError::MalformedSignature(e.to_string()))?;
        Self::from_bytes(&bytes)
    }

    /// Convert to the curve library's recoverable signature.
    pub(crate) fn to_recoverable(&self) -> Result<RecoverableSignature, CryptoError> {
        let raw = match self.v {
            27 | 28 => i32::from(self.v - V_OFFSET),
            other => return Err(CryptoError::InvalidRecoveryId(other)),
        };
        let recid =
            RecoveryId::from_i32(raw).map_err(|_| CryptoError::InvalidRecoveryId(self.v))?;
        let mut compact = [0u8; 64];
        compact[..32].copy_from_slice(&self.r);
        compact[32..].copy_from_slice(&self.s);
        RecoverableSignature::from_compact(&compact, recid)
            .map_err(|e| CryptoError::MalformedSignature(e.to_string()))
    }

    /// Convert from the curve library's recoverable signature.
    pub(crate) fn from_recoverable(sig: &RecoverableSignature) -> Self {
        let (recid, compact) = sig.serialize_compact();
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&compact[..32]);
        s.copy_from_slice(&compact[32..]);
        // recid is 0 or 1 for signatures produced by signing.
        let v = V_OFFSET + u8::try_from(recid.to_i32()).unwrap_or(0);
        Self { v, r, s }
    }
}

impl std::fmt::Debug for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Signature(v={}, r={}...)",
            self.v,
            hex::to_hex(&self.r[..4])
        )
    }
}

impl std::fmt::Display for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

impl Serialize for Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
