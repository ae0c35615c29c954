//! # Local Signer
//!
//! Holds a secp256k1 secret key and produces the signatures the engine
//! verifies. Clients use it to reproduce the release digest and sign it;
//! tests use it to build realistic multi-party payloads.
//!
//! ## Security Invariant
//!
//! `LocalSigner` does not implement `Serialize`, and its `Debug` output
//! shows only the derived address. Secret key bytes never leave the type.

use mesc_core::{Address, Amount, ScriptHash};
use secp256k1::{Message, PublicKey, SecretKey, SECP256K1};

use crate::error::CryptoError;
use crate::message::release_digest;
use crate::recovery::address_from_public_key;
use crate::signature::Signature;

/// A party's signing key with its derived address.
#[derive(Clone)]
pub struct LocalSigner {
    secret: SecretKey,
    address: Address,
}

impl LocalSigner {
    /// Generate a fresh random key.
    pub fn generate() -> Self {
        let secret = SecretKey::new(&mut rand::thread_rng());
        Self::from_secret(secret)
    }

    /// Construct from 32 secret key bytes.
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self, CryptoError> {
        let secret =
            SecretKey::from_slice(bytes).map_err(|e| CryptoError::InvalidSecretKey(e.to_string()))?;
        Ok(Self::from_secret(secret))
    }

    fn from_secret(secret: SecretKey) -> Self {
        let public = PublicKey::from_secret_key(SECP256K1, &secret);
        Self {
            secret,
            address: address_from_public_key(&public),
        }
    }

    /// The address that recovery will yield for this key's signatures.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Sign a 32-byte digest as-is.
    pub fn sign_digest(&self, digest: &[u8; 32]) -> Signature {
        let message = Message::from_digest(*digest);
        let sig = SECP256K1.sign_ecdsa_recoverable(&message, &self.secret);
        Signature::from_recoverable(&sig)
    }

    /// Sign a release: computes the release digest (with personal-message
    /// wrapping) and signs it.
    pub fn sign_release(
        &self,
        engine: &Address,
        destinations: &[Address],
        amounts: &[Amount],
        script_hash: &ScriptHash,
    ) -> Signature {
        self.sign_digest(&release_digest(engine, destinations, amounts, script_hash))
    }
}

impl std::fmt::Debug for LocalSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalSigner")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}
