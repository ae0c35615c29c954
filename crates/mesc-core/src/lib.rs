#![deny(missing_docs)]
//! # mesc-core — Foundational Types for the Escrow Engine
//!
//! This crate defines the primitives every other crate in the workspace
//! depends on. It has no internal crate dependencies, only `serde`,
//! `thiserror`, and `chrono` from the external ecosystem.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for fixed-width values.** [`Address`], [`ScriptHash`]
//!    and [`UniqueId`] are distinct types. A commitment cannot be passed
//!    where a party address is expected.
//!
//! 2. **Fixed-width encodings are the wire format.** Every type exposes its
//!    raw bytes so the commitment and message formulas in `mesc-crypto` can
//!    be reproduced bit-exactly by any client.
//!
//! 3. **Time is a capability.** Engine code reads time through [`Clock`],
//!    never from the system directly, so timeout behaviour is testable.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `mesc-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod address;
pub mod amount;
pub mod error;
pub mod hash;
pub mod hex;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use address::Address;
pub use amount::Amount;
pub use error::ValidationError;
pub use hash::{ScriptHash, UniqueId};
pub use temporal::{Clock, ManualClock, SystemClock, Timestamp};
