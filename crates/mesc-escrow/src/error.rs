//! # Escrow Error Types
//!
//! Every rejected operation returns an [`EscrowError`] and leaves the
//! registry untouched. Variants carry the script hash and the values that
//! failed the check so that a client can act without reading logs.
//!
//! [`EscrowError::kind`] groups variants into the four classes a client
//! reacts to differently: fix the request, collect different signatures,
//! give up on a finished escrow, or retry the external transfer later.

use mesc_core::{Address, Amount, ScriptHash, Timestamp};
use thiserror::Error;

use crate::transfer::TransferError;

/// Errors arising from escrow engine operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EscrowError {
    // ── Validation ─────────────────────────────────────────────────────
    /// Party set violates distinctness or non-zero requirements.
    #[error("invalid parties: {reason}")]
    InvalidParties {
        /// Which rule was broken.
        reason: String,
    },

    /// Threshold is zero or exceeds the number of parties.
    #[error("invalid threshold {threshold} for {parties} parties")]
    InvalidThreshold {
        /// The requested threshold.
        threshold: u8,
        /// Number of parties in the escrow.
        parties: usize,
    },

    /// A funding amount or payout amount is zero.
    #[error("amount must be greater than zero")]
    ZeroAmount,

    /// The submitted script hash does not match the recomputed commitment.
    #[error("commitment mismatch: submitted {submitted}, computed {computed}")]
    CommitmentMismatch {
        /// Hash supplied by the caller.
        submitted: ScriptHash,
        /// Hash recomputed from the supplied terms.
        computed: ScriptHash,
    },

    /// Destination and amount lists differ in length or are empty.
    #[error("{destinations} destinations for {amounts} amounts")]
    DestinationCountMismatch {
        /// Number of destinations.
        destinations: usize,
        /// Number of amounts.
        amounts: usize,
    },

    /// A payout destination is not a party to the escrow.
    #[error("destination {destination} is not a party to escrow {script_hash}")]
    UnauthorizedDestination {
        /// The escrow.
        script_hash: ScriptHash,
        /// The rejected destination.
        destination: Address,
    },

    /// The payout total would exceed the remaining escrowed balance.
    #[error(
        "release of {} exceeds remaining {remaining} in escrow {script_hash}",
        describe_requested(.requested)
    )]
    OverRelease {
        /// The escrow.
        script_hash: ScriptHash,
        /// Requested total, or `None` if the sum overflowed.
        requested: Option<Amount>,
        /// Balance still held.
        remaining: Amount,
    },

    /// A top-up would push the escrowed total past the maximum amount.
    #[error("top-up of {amount} overflows escrowed {escrowed} in escrow {script_hash}")]
    EscrowedOverflow {
        /// The escrow.
        script_hash: ScriptHash,
        /// Current escrowed total.
        escrowed: Amount,
        /// Rejected top-up.
        amount: Amount,
    },

    // ── State ──────────────────────────────────────────────────────────
    /// No escrow exists under this script hash.
    #[error("escrow {0} not found")]
    NotFound(ScriptHash),

    /// The escrow has been fully released.
    #[error("escrow {0} already executed")]
    AlreadyExecuted(ScriptHash),

    /// An escrow with this script hash was admitted before.
    #[error("escrow {0} already exists")]
    DuplicateCommitment(ScriptHash),

    // ── Authorization ──────────────────────────────────────────────────
    /// The signatures do not authorize the release.
    #[error("authorization failed for escrow {script_hash}: {reason}")]
    AuthorizationFailed {
        /// The escrow.
        script_hash: ScriptHash,
        /// Why the signatures were rejected.
        reason: AuthorizationError,
    },

    /// The caller may not perform this operation on the escrow.
    #[error("{caller} may not {operation} escrow {script_hash}")]
    Unauthorized {
        /// The escrow.
        script_hash: ScriptHash,
        /// The rejected caller.
        caller: Address,
        /// The attempted operation.
        operation: &'static str,
    },

    // ── External ───────────────────────────────────────────────────────
    /// The value transfer failed; nothing was recorded.
    #[error("value transfer failed: {0}")]
    ExternalTransferFailure(#[from] TransferError),
}

fn describe_requested(requested: &Option<Amount>) -> String {
    match requested {
        Some(amount) => amount.to_string(),
        None => "more than the maximum amount".to_string(),
    }
}

/// Why a set of signatures failed to authorize a release.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationError {
    /// No signatures were supplied, or `v/r/s` arrays differ in length.
    #[error("signature component counts differ or are empty (v={v}, r={r}, s={s})")]
    SignatureCountMismatch {
        /// Number of `v` values.
        v: usize,
        /// Number of `r` values.
        r: usize,
        /// Number of `s` values.
        s: usize,
    },

    /// A signature is unrecoverable or recovers to a non-party.
    #[error("signature {index} is invalid: {detail}")]
    InvalidSigner {
        /// Position of the offending signature.
        index: usize,
        /// The recovery failure or the recovered non-party address.
        detail: String,
    },

    /// Fewer distinct parties signed than the threshold requires.
    #[error("{distinct} distinct signers, threshold is {threshold}")]
    InsufficientDistinctSigners {
        /// Distinct parties recovered.
        distinct: usize,
        /// Required threshold.
        threshold: u8,
    },

    /// A lone seller signature was submitted before the timeout elapsed.
    #[error("seller-only release not allowed before {deadline}")]
    TimeoutNotReached {
        /// When the seller may release alone.
        deadline: Timestamp,
    },
}

/// Coarse error class for client retry decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The request itself is malformed; resubmitting it unchanged fails again.
    Validation,
    /// The signatures or caller do not authorize the operation.
    Authorization,
    /// The escrow is missing, finished, or already exists.
    State,
    /// The external transfer failed; state is unchanged.
    External,
}

impl EscrowError {
    /// The error class.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidParties { .. }
            | Self::InvalidThreshold { .. }
            | Self::ZeroAmount
            | Self::CommitmentMismatch { .. }
            | Self::DestinationCountMismatch { .. }
            | Self::UnauthorizedDestination { .. }
            | Self::OverRelease { .. }
            | Self::EscrowedOverflow { .. } => ErrorKind::Validation,
            Self::NotFound(_) | Self::AlreadyExecuted(_) | Self::DuplicateCommitment(_) => {
                ErrorKind::State
            }
            Self::AuthorizationFailed { .. } | Self::Unauthorized { .. } => {
                ErrorKind::Authorization
            }
            Self::ExternalTransferFailure(_) => ErrorKind::External,
        }
    }

    /// The authorization failure reason, if this is one.
    pub fn authorization_reason(&self) -> Option<&AuthorizationError> {
        match self {
            Self::AuthorizationFailed { reason, .. } => Some(reason),
            _ => None,
        }
    }
}
