//! # Signature Verifier
//!
//! Decides whether a set of signatures over a release digest authorizes
//! the release of an escrow.
//!
//! ## Rules
//!
//! 1. At least one signature must be supplied.
//! 2. Every signature must recover to one of the escrow's parties. A
//!    signature from anyone else rejects the whole payload.
//! 3. **General rule**: the number of *distinct* recovered parties must be
//!    at least the threshold. Repeated signatures by one party count once.
//! 4. **Timeout rule**: a payload of exactly one signature, recovering to
//!    the seller, is accepted once the timeout has been reached.
//!
//! Recovery goes through the [`SignerRecovery`] capability so the rules can
//! be tested against a fixed table of signers.

use mesc_core::{Address, Timestamp};
use mesc_crypto::{Signature, SignerRecovery};

use crate::error::AuthorizationError;
use crate::parties::Role;
use crate::timeout::timeout_reached;
use crate::transaction::Transaction;

/// Which rule accepted a release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationPath {
    /// Enough distinct parties signed.
    Threshold,
    /// The seller signed alone after the timeout.
    SellerTimeout,
}

/// An accepted authorization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authorization {
    /// Distinct signers, in the order first seen.
    pub signers: Vec<Address>,
    /// The rule that accepted the payload.
    pub path: AuthorizationPath,
}

/// Recover the distinct signers of `signatures` over `digest`.
///
/// Fails on the first signature that cannot be recovered or that recovers
/// to a non-party.
pub fn recover_signers<R: SignerRecovery + ?Sized>(
    recovery: &R,
    tx: &Transaction,
    digest: &[u8; 32],
    signatures: &[Signature],
) -> Result<Vec<Address>, AuthorizationError> {
    let mut signers: Vec<Address> = Vec::with_capacity(signatures.len());
    for (index, signature) in signatures.iter().enumerate() {
        let signer = recovery
            .recover(digest, signature)
            .map_err(|e| AuthorizationError::InvalidSigner {
                index,
                detail: e.to_string(),
            })?;
        let role = tx
            .role_of(&signer)
            .ok_or_else(|| AuthorizationError::InvalidSigner {
                index,
                detail: format!("{signer} is not a party"),
            })?;
        tracing::debug!(
            script_hash = %tx.script_hash,
            index,
            signer = %signer,
            %role,
            "recovered signer"
        );
        if !signers.contains(&signer) {
            signers.push(signer);
        }
    }
    Ok(signers)
}

/// Apply the general and timeout rules to `signatures`.
pub fn authorize<R: SignerRecovery + ?Sized>(
    recovery: &R,
    tx: &Transaction,
    digest: &[u8; 32],
    signatures: &[Signature],
    now: Timestamp,
) -> Result<Authorization, AuthorizationError> {
    if signatures.is_empty() {
        return Err(AuthorizationError::SignatureCountMismatch { v: 0, r: 0, s: 0 });
    }
    let signers = recover_signers(recovery, tx, digest, signatures)?;

    if signers.len() >= usize::from(tx.threshold) {
        return Ok(Authorization {
            signers,
            path: AuthorizationPath::Threshold,
        });
    }

    let lone_seller =
        signatures.len() == 1 && signers.first().and_then(|s| tx.role_of(s)) == Some(Role::Seller);
    if lone_seller {
        if timeout_reached(tx, now) {
            return Ok(Authorization {
                signers,
                path: AuthorizationPath::SellerTimeout,
            });
        }
        return Err(AuthorizationError::TimeoutNotReached {
            deadline: tx.deadline(),
        });
    }

    Err(AuthorizationError::InsufficientDistinctSigners {
        distinct: signers.len(),
        threshold: tx.threshold,
    })
}
