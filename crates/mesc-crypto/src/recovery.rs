//! # Signer Recovery
//!
//! [`SignerRecovery`] maps a signed digest to the address that produced the
//! signature. The engine consumes it as a capability so verification logic
//! can be exercised with a deterministic table in tests, while production
//! uses [`Secp256k1Recovery`].
//!
//! An address is the last 20 bytes of the Keccak-256 of the uncompressed
//! public key without its `0x04` tag.

use mesc_core::Address;
use secp256k1::{Message, PublicKey, SECP256K1};

use crate::error::CryptoError;
use crate::keccak::keccak256;
use crate::signature::Signature;

/// Recovers the signing address for a digest and signature.
pub trait SignerRecovery {
    /// The address whose key produced `signature` over `digest`.
    ///
    /// `digest` is the already-wrapped 32-byte hash that was signed.
    fn recover(&self, digest: &[u8; 32], signature: &Signature) -> Result<Address, CryptoError>;
}

impl<T: SignerRecovery + ?Sized> SignerRecovery for &T {
    fn recover(&self, digest: &[u8; 32], signature: &Signature) -> Result<Address, CryptoError> {
        (**self).recover(digest, signature)
    }
}

/// Public key recovery on the secp256k1 curve.
#[derive(Debug, Clone, Copy, Default)]
pub struct Secp256k1Recovery;

impl SignerRecovery for Secp256k1Recovery {
    fn recover(&self, digest: &[u8; 32], signature: &Signature) -> Result<Address, CryptoError> {
        let recoverable = signature.to_recoverable()?;
        let message = Message::from_digest(*digest);
        let public_key = SECP256K1
            .recover_ecdsa(&message, &recoverable)
            .map_err(|e| CryptoError::RecoveryFailed(e.to_string()))?;
        Ok(address_from_public_key(&public_key))
    }
}

/// Derive the 20-byte address of a secp256k1 public key.
pub fn address_from_public_key(public_key: &PublicKey) -> Address {
    let uncompressed = public_key.serialize_uncompressed();
    let hash = keccak256(&uncompressed[1..]);
    let mut out = [0u8; 20];
    out.copy_from_slice(&hash[12..]);
    Address::from_bytes(out)
}
