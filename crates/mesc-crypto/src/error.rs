//! Error type for signature handling and key material.

use thiserror::Error;

/// Errors from signature parsing, recovery and key construction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// The `v` byte is not 27 or 28.
    #[error("invalid recovery id v={0} (expected 27 or 28)")]
    InvalidRecoveryId(u8),

    /// Signature bytes have the wrong length or an out-of-range scalar.
    #[error("malformed signature: {0}")]
    MalformedSignature(String),

    /// The curve rejected the signature during public key recovery.
    #[error("signer recovery failed: {0}")]
    RecoveryFailed(String),

    /// Secret key bytes are zero or not below the curve order.
    #[error("invalid secret key: {0}")]
    InvalidSecretKey(String),

    /// Parallel `v`, `r`, `s` arrays have different lengths.
    #[error("signature component count mismatch: {v} v, {r} r, {s} s")]
    ComponentCountMismatch {
        /// Number of `v` values.
        v: usize,
        /// Number of `r` values.
        r: usize,
        /// Number of `s` values.
        s: usize,
    },
}
