//! # Escrow Transactions
//!
//! The record kept for each admitted escrow, keyed by its script hash.
//!
//! Status machine: `Funded → Executed`. The transition happens exactly
//! once, when the released amount reaches the escrowed amount. Executed
//! records accept no further mutation and are never deleted.

use mesc_core::{Address, Amount, ScriptHash, Timestamp, UniqueId};
use mesc_crypto::CommitmentTerms;
use serde::{Deserialize, Serialize};

use crate::parties::{PartySet, Role};

/// The asset an escrow holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "contract", rename_all = "snake_case")]
pub enum AssetKind {
    /// The ledger's native currency.
    Native,
    /// A fungible token at the given contract address.
    Token(Address),
}

impl AssetKind {
    /// Build from an optional token address.
    pub fn from_token(token: Option<Address>) -> Self {
        match token {
            Some(addr) => Self::Token(addr),
            None => Self::Native,
        }
    }

    /// The token contract, if this is a token escrow.
    pub fn token(&self) -> Option<Address> {
        match self {
            Self::Native => None,
            Self::Token(addr) => Some(*addr),
        }
    }
}

impl std::fmt::Display for AssetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Native => f.write_str("native"),
            Self::Token(addr) => write!(f, "token:{addr}"),
        }
    }
}

/// Escrow lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    /// Funds held; releases may still occur.
    Funded,
    /// Fully released. Terminal.
    Executed,
}

impl TransactionStatus {
    /// Whether no further operations are allowed.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Executed)
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Funded => "FUNDED",
            Self::Executed => "EXECUTED",
        })
    }
}

/// An escrow record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Commitment over the escrow terms; the registry key.
    pub script_hash: ScriptHash,
    /// Buyer, seller and optional moderator.
    pub parties: PartySet,
    /// Distinct signatures required for a release.
    pub threshold: u8,
    /// Hours after `created_at` when the seller may release alone.
    pub timeout_hours: u32,
    /// Admission time; anchors the timeout.
    pub created_at: Timestamp,
    /// Time of the latest top-up or release.
    pub last_modified: Timestamp,
    /// Native currency or token.
    pub asset: AssetKind,
    /// Total deposited, including top-ups.
    pub escrowed_amount: Amount,
    /// Total paid out so far.
    pub released_amount: Amount,
    /// Lifecycle status.
    pub status: TransactionStatus,
    /// Distinct signers that authorized the most recent release.
    pub last_signers: Vec<Address>,
}

impl Transaction {
    /// Balance still held.
    pub fn remaining(&self) -> Amount {
        self.escrowed_amount
            .checked_sub(self.released_amount)
            .unwrap_or(Amount::ZERO)
    }

    /// When the seller may release alone.
    pub fn deadline(&self) -> Timestamp {
        self.created_at.saturating_plus_hours(self.timeout_hours)
    }

    /// The role `addr` plays in this escrow.
    pub fn role_of(&self, addr: &Address) -> Option<Role> {
        self.parties.role_of(addr)
    }

    /// The funding party.
    pub fn buyer(&self) -> Address {
        self.parties.buyer()
    }

    /// The paid party.
    pub fn seller(&self) -> Address {
        self.parties.seller()
    }

    /// Whether `addr` is the seller or the moderator.
    pub fn is_beneficiary(&self, addr: &Address) -> bool {
        matches!(self.role_of(addr), Some(Role::Seller | Role::Moderator))
    }

    /// The commitment terms this record was admitted under.
    pub fn commitment_terms(&self, unique_id: UniqueId, engine: Address) -> CommitmentTerms {
        CommitmentTerms {
            unique_id,
            threshold: self.threshold,
            timeout_hours: self.timeout_hours,
            buyer: self.parties.buyer(),
            seller: self.parties.seller(),
            moderator: self.parties.moderator(),
            engine,
            token: self.asset.token(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> Transaction {
        let created = Timestamp::parse("2026-03-01T00:00:00Z").unwrap();
        Transaction {
            script_hash: ScriptHash([0x09; 32]),
            parties: PartySet::new(
                Address([0x11; 20]),
                Address([0x22; 20]),
                Some(Address([0x33; 20])),
            )
            .unwrap(),
            threshold: 2,
            timeout_hours: 48,
            created_at: created,
            last_modified: created,
            asset: AssetKind::Native,
            escrowed_amount: Amount::new(1000),
            released_amount: Amount::new(250),
            status: TransactionStatus::Funded,
            last_signers: Vec::new(),
        }
    }

    #[test]
    fn remaining_and_deadline() {
        let tx = record();
        assert_eq!(tx.remaining(), Amount::new(750));
        assert_eq!(tx.deadline().to_iso8601(), "2026-03-03T00:00:00Z");
    }

    #[test]
    fn beneficiaries_exclude_buyer() {
        let tx = record();
        assert!(!tx.is_beneficiary(&tx.buyer()));
        assert!(tx.is_beneficiary(&tx.seller()));
        assert!(tx.is_beneficiary(&Address([0x33; 20])));
        assert!(!tx.is_beneficiary(&Address([0x44; 20])));
    }

    #[test]
    fn commitment_terms_carry_token() {
        let tx = Transaction {
            asset: AssetKind::Token(Address([0x77; 20])),
            ..record()
        };
        let terms = tx.commitment_terms(UniqueId([1; 20]), Address([0xee; 20]));
        assert_eq!(terms.token, Some(Address([0x77; 20])));
        assert_eq!(terms.threshold, 2);
    }

    #[test]
    fn serde_roundtrip() {
        let tx = Transaction {
            asset: AssetKind::Token(Address([0x77; 20])),
            ..record()
        };
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["status"], "FUNDED");
        assert_eq!(json["asset"]["kind"], "token");
        assert_eq!(json["escrowed_amount"], "1000");
        assert_eq!(json["parties"]["buyer"], Address([0x11; 20]).to_string());
        let back: Transaction = serde_json::from_value(json).unwrap();
        assert_eq!(back, tx);
    }

    #[test]
    fn asset_kind_from_token() {
        assert_eq!(AssetKind::from_token(None), AssetKind::Native);
        assert_eq!(AssetKind::Native.token(), None);
        let t = Address([5; 20]);
        assert_eq!(AssetKind::from_token(Some(t)).token(), Some(t));
    }
}
