//! # Keccak-256
//!
//! Pre-standard Keccak padding (`0x01`), not NIST SHA3-256. Every hash in
//! the escrow wire formats uses this function.

use sha3::{Digest, Keccak256};

/// Keccak-256 of a byte slice.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let hash = Keccak256::digest(data);
    let mut out = [0u8; 32];
    out.copy_from_slice(&hash);
    out
}

/// Keccak-256 of the concatenation of several slices, without allocating
/// the concatenated buffer.
pub fn keccak256_concat(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    for part in parts {
        hasher.update(part);
    }
    let mut out = [0u8; 32];
    out.copy_from_slice(&hasher.finalize());
    out
}
