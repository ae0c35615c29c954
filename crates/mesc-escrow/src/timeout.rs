//! # Timeout Arbiter
//!
//! After `created_at + timeout_hours × 3600 s` the seller may release with
//! a single signature, whatever the threshold. The buyer never gets this
//! path; an unresponsive seller is handled by the general rule.
//!
//! The deadline is inclusive: at exactly the deadline second the timeout
//! has been reached.

use mesc_core::Timestamp;

use crate::transaction::Transaction;

/// Whether the seller-only path is open for `tx` at `now`.
pub fn timeout_reached(tx: &Transaction, now: Timestamp) -> bool {
    now >= tx.deadline()
}
