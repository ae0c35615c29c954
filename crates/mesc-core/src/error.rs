//! # Error Types
//!
//! Validation errors for the domain primitives in this crate. Each variant
//! carries the offending input so that misconfiguration can be diagnosed
//! without guesswork.

use thiserror::Error;

/// Validation errors for fixed-width newtypes and timestamps.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Hex input has the wrong number of bytes for the target type.
    #[error("invalid {kind} length: expected {expected} bytes, got {actual}")]
    InvalidLength {
        /// The type being parsed (e.g. "address").
        kind: &'static str,
        /// Required byte length.
        expected: usize,
        /// Decoded byte length.
        actual: usize,
    },

    /// Hex input contains a non-hex character or has odd length.
    #[error("invalid hex \"{value}\": {reason}")]
    InvalidHex {
        /// The rejected input.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Amount string is not a base-10 unsigned integer.
    #[error("invalid amount \"{0}\" (expected unsigned integer in smallest units)")]
    InvalidAmount(String),

    /// Timestamp is out of range or not valid UTC.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
}
