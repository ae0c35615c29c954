//! # mesc-escrow — Multi-Party Escrow Engine
//!
//! Holds value (native currency or a fungible token) under a commitment to
//! a buyer, a seller and an optional moderator, and releases it only on a
//! threshold of party signatures or, after a timeout, on the seller's
//! signature alone.
//!
//! ## Components
//!
//! - [`registry`]: content-addressed store of escrow records.
//! - [`engine`]: admission, top-ups and releases ([`EscrowEngine`]).
//! - [`verifier`]: threshold and distinct-signer rules.
//! - [`timeout`]: the seller-only fallback deadline.
//! - [`transfer`]: the [`ValueTransfer`] capability, the [`TokenContract`]
//!   interface and the in-memory [`Ledger`].
//! - [`events`]: notifications for hosts.
//! - [`config`]: engine address configuration.
//!
//! ## Crate Policy
//!
//! - The engine never reads the system clock or calls the curve library
//!   directly; both arrive as capabilities (`Clock`, `SignerRecovery`).
//! - Logging uses `tracing`. This crate never installs a subscriber.
//! - No `unsafe` code.

pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod parties;
pub mod registry;
pub mod timeout;
pub mod transaction;
pub mod transfer;
pub mod verifier;

pub use config::{ConfigError, EngineConfig};
pub use engine::{EscrowEngine, NewEscrow};
pub use error::{AuthorizationError, ErrorKind, EscrowError};
pub use events::EscrowEvent;
pub use parties::{PartySet, Role};
pub use registry::Registry;
pub use transaction::{AssetKind, Transaction, TransactionStatus};
pub use transfer::{
    InMemoryToken, Ledger, Payout, TokenContract, TokenError, TokenFault, TransferError,
    ValueTransfer,
};
pub use verifier::{Authorization, AuthorizationPath};
