//! # Escrow Commitments
//!
//! A commitment is the Keccak-256 of the escrow's redeem script: the
//! fixed-width concatenation of every term the parties agreed to.
//!
//! ```text
//! unique_id[20] ‖ threshold[1] ‖ timeout_hours[4, BE] ‖ buyer[20] ‖ seller[20]
//!   ‖ moderator[20] ‖ engine[20] [‖ token[20]]
//! ```
//!
//! ## Security Invariant
//!
//! The engine recomputes this hash from the submitted terms and rejects the
//! transaction on mismatch, so a record's keys always match its terms.
//! Including the engine address prevents a commitment made for one engine
//! deployment from being replayed against another.
//!
//! An absent moderator is encoded as twenty zero bytes. The token address
//! is appended only for token escrows, so a native escrow and a token escrow
//! over otherwise identical terms never collide.

use mesc_core::{Address, ScriptHash, UniqueId};
use serde::{Deserialize, Serialize};

use crate::keccak::keccak256;

/// Byte length of a native-asset redeem script.
pub const NATIVE_SCRIPT_LEN: usize = 20 + 1 + 4 + 20 * 4;

/// Byte length of a token redeem script.
pub const TOKEN_SCRIPT_LEN: usize = NATIVE_SCRIPT_LEN + 20;

/// The terms an escrow commitment is computed over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitmentTerms {
    /// Client-chosen nonce distinguishing escrows with identical terms.
    pub unique_id: UniqueId,
    /// Minimum number of distinct party signatures for a release.
    pub threshold: u8,
    /// Hours after creation when the seller may release alone.
    pub timeout_hours: u32,
    /// Party funding the escrow.
    pub buyer: Address,
    /// Party being paid.
    pub seller: Address,
    /// Optional third party; `None` commits to the zero address.
    pub moderator: Option<Address>,
    /// Address of the engine holding the funds.
    pub engine: Address,
    /// Token contract for token escrows; `None` for the native asset.
    pub token: Option<Address>,
}

impl CommitmentTerms {
    /// The redeem script: the exact bytes hashed into the commitment.
    pub fn redeem_script(&self) -> Vec<u8> {
        let capacity = if self.token.is_some() {
            TOKEN_SCRIPT_LEN
        } else {
            NATIVE_SCRIPT_LEN
        };
        let mut script = Vec::with_capacity(capacity);
        script.extend_from_slice(self.unique_id.as_bytes());
        script.push(self.threshold);
        script.extend_from_slice(&self.timeout_hours.to_be_bytes());
        script.extend_from_slice(self.buyer.as_bytes());
        script.extend_from_slice(self.seller.as_bytes());
        script.extend_from_slice(self.moderator.unwrap_or(Address::ZERO).as_bytes());
        script.extend_from_slice(self.engine.as_bytes());
        if let Some(token) = &self.token {
            script.extend_from_slice(token.as_bytes());
        }
        script
    }

    /// The commitment: Keccak-256 of [`redeem_script`](Self::redeem_script).
    pub fn script_hash(&self) -> ScriptHash {
        ScriptHash::from_bytes(keccak256(&self.redeem_script()))
    }
}
