//! # Transaction Registry
//!
//! Content-addressed store of escrow records keyed by script hash.
//!
//! Records are inserted once and never removed, so a script hash can never
//! be reused, even after its escrow has been fully released. Admission
//! order is kept for per-party listings.

use std::collections::HashMap;

use mesc_core::{Address, ScriptHash};

use crate::error::EscrowError;
use crate::transaction::Transaction;

/// All escrow records ever admitted.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    records: HashMap<ScriptHash, Transaction>,
    order: Vec<ScriptHash>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `script_hash` has ever been admitted.
    pub fn contains(&self, script_hash: &ScriptHash) -> bool {
        self.records.contains_key(script_hash)
    }

    /// Check that `script_hash` is unused.
    pub fn ensure_vacant(&self, script_hash: &ScriptHash) -> Result<(), EscrowError> {
        if self.contains(script_hash) {
            return Err(EscrowError::DuplicateCommitment(*script_hash));
        }
        Ok(())
    }

    /// Insert a new record. Fails if the key was ever used.
    pub fn insert(&mut self, tx: Transaction) -> Result<(), EscrowError> {
        self.ensure_vacant(&tx.script_hash)?;
        self.order.push(tx.script_hash);
        self.records.insert(tx.script_hash, tx);
        Ok(())
    }

    /// Look up a record.
    pub fn get(&self, script_hash: &ScriptHash) -> Result<&Transaction, EscrowError> {
        self.records
            .get(script_hash)
            .ok_or(EscrowError::NotFound(*script_hash))
    }

    /// Look up a record for mutation.
    pub(crate) fn get_mut(&mut self, script_hash: &ScriptHash) -> Result<&mut Transaction, EscrowError> {
        self.records
            .get_mut(script_hash)
            .ok_or(EscrowError::NotFound(*script_hash))
    }

    /// Script hashes of every escrow `addr` is a party to, in admission order.
    pub fn for_party(&self, addr: &Address) -> Vec<ScriptHash> {
        self.order
            .iter()
            .filter(|sh| {
                self.records
                    .get(*sh)
                    .is_some_and(|tx| tx.role_of(addr).is_some())
            })
            .copied()
            .collect()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no escrow has been admitted.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in admission order.
    pub fn iter(&self) -> impl Iterator<Item = &Transaction> + '_ {
        self.order.iter().filter_map(|sh| self.records.get(sh))
    }
}
