//! # Party Sets
//!
//! The buyer, the seller and an optional moderator. Construction enforces
//! the party invariants, so code holding a [`PartySet`] never re-checks
//! them:
//!
//! - buyer and seller are non-zero and distinct;
//! - a present moderator is non-zero and distinct from both.
//!
//! Passing `Some(Address::ZERO)` as the moderator is treated as absent,
//! matching the commitment encoding.

use mesc_core::Address;
use serde::{Deserialize, Serialize};

use crate::error::EscrowError;

/// Role of an address within an escrow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Funds the escrow.
    Buyer,
    /// Receives payment; may release alone after the timeout.
    Seller,
    /// Optional third signer.
    Moderator,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Buyer => "buyer",
            Self::Seller => "seller",
            Self::Moderator => "moderator",
        };
        f.write_str(s)
    }
}

/// A validated set of two or three escrow parties.
///
/// Deserialization re-runs the validation in [`PartySet::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "PartyFields")]
pub struct PartySet {
    buyer: Address,
    seller: Address,
    moderator: Option<Address>,
}

impl PartySet {
    /// Validate and build a party set.
    pub fn new(
        buyer: Address,
        seller: Address,
        moderator: Option<Address>,
    ) -> Result<Self, EscrowError> {
        let moderator = moderator.filter(|m| !m.is_zero());
        if buyer.is_zero() {
            return Err(invalid("buyer is the zero address"));
        }
        if seller.is_zero() {
            return Err(invalid("seller is the zero address"));
        }
        if buyer == seller {
            return Err(invalid("buyer and seller are the same address"));
        }
        if let Some(m) = moderator {
            if m == buyer || m == seller {
                return Err(invalid("moderator must differ from buyer and seller"));
            }
        }
        Ok(Self {
            buyer,
            seller,
            moderator,
        })
    }

    /// The buyer.
    pub fn buyer(&self) -> Address {
        self.buyer
    }

    /// The seller.
    pub fn seller(&self) -> Address {
        self.seller
    }

    /// The moderator, if any.
    pub fn moderator(&self) -> Option<Address> {
        self.moderator
    }

    /// Number of parties: 2 or 3.
    pub fn len(&self) -> usize {
        if self.moderator.is_some() {
            3
        } else {
            2
        }
    }

    /// Always false; a party set has at least two members.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// The role `addr` plays, if it is a party.
    pub fn role_of(&self, addr: &Address) -> Option<Role> {
        if *addr == self.buyer {
            Some(Role::Buyer)
        } else if *addr == self.seller {
            Some(Role::Seller)
        } else if self.moderator.as_ref() == Some(addr) {
            Some(Role::Moderator)
        } else {
            None
        }
    }

    /// Whether `addr` is one of the parties.
    pub fn contains(&self, addr: &Address) -> bool {
        self.role_of(addr).is_some()
    }

    /// Members in buyer, seller, moderator order.
    pub fn iter(&self) -> impl Iterator<Item = Address> + '_ {
        [Some(self.buyer), Some(self.seller), self.moderator]
            .into_iter()
            .flatten()
    }

    /// Check `1 ≤ threshold ≤ len()`.
    pub fn check_threshold(&self, threshold: u8) -> Result<(), EscrowError> {
        if threshold == 0 || usize::from(threshold) > self.len() {
            return Err(EscrowError::InvalidThreshold {
                threshold,
                parties: self.len(),
            });
        }
        Ok(())
    }
}

/// Unvalidated wire form of a [`PartySet`].
#[derive(Deserialize)]
struct PartyFields {
    buyer: Address,
    seller: Address,
    #[serde(default)]
    moderator: Option<Address>,
}

impl TryFrom<PartyFields> for PartySet {
    type Error = EscrowError;

    fn try_from(fields: PartyFields) -> Result<Self, Self::Error> {
        Self::new(fields.buyer, fields.seller, fields.moderator)
    }
}

fn invalid(reason: &str) -> EscrowError {
    EscrowError::InvalidParties {
        reason: reason.to_string(),
    }
}
