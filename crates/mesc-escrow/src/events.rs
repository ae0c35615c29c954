//! Notifications emitted by successful engine operations.
//!
//! Events are buffered on the engine in emission order. Hosts drain them to
//! forward to their own observers; the engine also logs each one.

use mesc_core::{Address, Amount, ScriptHash};
use serde::{Deserialize, Serialize};

/// A state change in the escrow registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EscrowEvent {
    /// An escrow was admitted with its initial deposit.
    Funded {
        /// The new escrow.
        script_hash: ScriptHash,
        /// Account the deposit was pulled from.
        from: Address,
        /// Initial deposit.
        amount: Amount,
    },
    /// The buyer topped up an escrow.
    FundAdded {
        /// The escrow.
        script_hash: ScriptHash,
        /// The buyer.
        from: Address,
        /// Top-up amount.
        amount: Amount,
    },
    /// A release batch was paid out.
    Executed {
        /// The escrow.
        script_hash: ScriptHash,
        /// Payout recipients, in submission order.
        destinations: Vec<Address>,
        /// Payout amounts, parallel to `destinations`.
        amounts: Vec<Amount>,
    },
}

impl EscrowEvent {
    /// The escrow this event concerns.
    pub fn script_hash(&self) -> &ScriptHash {
        match self {
            Self::Funded { script_hash, .. }
            | Self::FundAdded { script_hash, .. }
            | Self::Executed { script_hash, .. } => script_hash,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tagged_json() {
        let event = EscrowEvent::Executed {
            script_hash: ScriptHash([0x01; 32]),
            destinations: vec![Address([0x22; 20])],
            amounts: vec![Amount::new(5)],
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "executed");
        assert_eq!(json["amounts"][0], "5");
        let back: EscrowEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
        assert_eq!(back.script_hash(), &ScriptHash([0x01; 32]));
    }
}
