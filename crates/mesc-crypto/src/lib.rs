//! # mesc-crypto — Cryptographic Primitives
//!
//! Provides the cryptographic building blocks for the escrow engine:
//!
//! - **Keccak-256** digest computation.
//! - **Commitments** binding a unique id, threshold, timeout, parties,
//!   engine address and optional token into a [`ScriptHash`](mesc_core::ScriptHash).
//! - **Release message hashing** with domain separation on the engine
//!   address, plus the personal-message wrapping applied before signing.
//! - **Recoverable secp256k1 signatures** in `v/r/s` form and the
//!   [`SignerRecovery`] capability that maps a signature to an [`Address`](mesc_core::Address).
//! - A [`LocalSigner`] holding a secret key, used by clients and tests to
//!   produce the signatures the engine verifies.
//!
//! ## Crate Policy
//!
//! - Depends only on `mesc-core` internally.
//! - Formats are bit-exact with existing clients; the test vectors in each
//!   module pin them.
//! - No `unsafe` code.

pub mod commitment;
pub mod error;
pub mod keccak;
pub mod message;
pub mod recovery;
pub mod signature;
pub mod signer;

pub use commitment::CommitmentTerms;
pub use error::CryptoError;
pub use keccak::keccak256;
pub use message::{personal_message_hash, release_digest, release_message_hash};
pub use recovery::{address_from_public_key, Secp256k1Recovery, SignerRecovery};
pub use signature::Signature;
pub use signer::LocalSigner;
