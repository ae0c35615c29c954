//! # Escrow Engine
//!
//! Admits escrows under a commitment, accepts top-ups from the buyer, and
//! releases funds on threshold-signed instructions or, after the timeout,
//! on the seller's signature alone.
//!
//! ## Security Invariant
//!
//! Every operation validates fully, then performs the external transfer,
//! then mutates the record. A failure at any step returns before the
//! record is touched, and [`ValueTransfer::disburse`] is all-or-nothing,
//! so a rejected operation never leaves partial state behind.
//!
//! Release checks run in a fixed order so that the cheapest,
//! signature-independent rejections come first:
//!
//! 1. record exists, not executed;
//! 2. destination and amount lists are non-empty and of equal length;
//! 3. every destination is a party;
//! 4. no amount is zero;
//! 5. the total fits in the remaining balance;
//! 6. the signatures authorize the release;
//! 7. the payout batch is transferred.
//!
//! ## Progressive release
//!
//! A release may pay out less than the remaining balance. The escrow stays
//! `Funded` until the cumulative released amount equals the escrowed
//! amount, and then becomes `Executed`.

use mesc_core::{Address, Amount, Clock, ScriptHash, Timestamp, UniqueId};
use mesc_crypto::{
    release_digest, release_message_hash, CommitmentTerms, Signature, SignerRecovery,
};
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::{AuthorizationError, EscrowError};
use crate::events::EscrowEvent;
use crate::parties::PartySet;
use crate::registry::Registry;
use crate::transaction::{AssetKind, Transaction, TransactionStatus};
use crate::transfer::{Payout, ValueTransfer};
use crate::verifier::authorize;

/// Terms of a new escrow, as submitted by the funding caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEscrow {
    /// Funding party.
    pub buyer: Address,
    /// Paid party.
    pub seller: Address,
    /// Optional third signer. `None` and the zero address are equivalent.
    pub moderator: Option<Address>,
    /// Distinct signatures required for a release.
    pub threshold: u8,
    /// Hours until the seller may release alone.
    pub timeout_hours: u32,
    /// Commitment the caller computed over these terms.
    pub script_hash: ScriptHash,
    /// Nonce bound into the commitment.
    pub unique_id: UniqueId,
    /// Initial deposit.
    pub amount: Amount,
    /// Token contract, or `None` for the native asset.
    pub token: Option<Address>,
}

/// The escrow engine.
///
/// Generic over the value-transfer backend `L`, the signer recovery `R`
/// and the clock `C`. All operations take `&mut self`, so competing calls
/// are serialized by the borrow checker.
#[derive(Debug)]
pub struct EscrowEngine<L, R, C> {
    config: EngineConfig,
    registry: Registry,
    ledger: L,
    recovery: R,
    clock: C,
    events: Vec<EscrowEvent>,
}

impl<L: ValueTransfer, R: SignerRecovery, C: Clock> EscrowEngine<L, R, C> {
    /// Build an engine with an empty registry.
    pub fn new(config: EngineConfig, ledger: L, recovery: R, clock: C) -> Self {
        Self {
            config,
            registry: Registry::new(),
            ledger,
            recovery,
            clock,
            events: Vec::new(),
        }
    }

    /// The engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The engine address used for domain separation and custody.
    pub fn engine_address(&self) -> Address {
        self.config.engine_address
    }

    /// The value-transfer backend.
    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Mutable access to the value-transfer backend, for funding accounts
    /// and configuring tokens.
    pub fn ledger_mut(&mut self) -> &mut L {
        &mut self.ledger
    }

    /// The clock.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// The record store.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    // ── Registry & funding ─────────────────────────────────────────────

    /// Admit a new escrow, pulling the initial deposit from `caller`.
    ///
    /// # Errors
    ///
    /// `DuplicateCommitment`, `InvalidParties`, `InvalidThreshold`,
    /// `ZeroAmount`, `CommitmentMismatch`, `ExternalTransferFailure`.
    pub fn create_transaction(
        &mut self,
        caller: Address,
        request: NewEscrow,
    ) -> Result<ScriptHash, EscrowError> {
        let script_hash = request.script_hash;
        self.registry.ensure_vacant(&script_hash)?;
        let parties = PartySet::new(request.buyer, request.seller, request.moderator)?;
        let engine = self.config.engine_address;
        if parties.contains(&engine) {
            return Err(EscrowError::InvalidParties {
                reason: "the engine address cannot be a party".to_string(),
            });
        }
        if caller == engine {
            return Err(EscrowError::InvalidParties {
                reason: "the engine address cannot fund an escrow".to_string(),
            });
        }
        parties.check_threshold(request.threshold)?;
        if request.amount.is_zero() {
            return Err(EscrowError::ZeroAmount);
        }

        let asset = AssetKind::from_token(request.token);
        let terms = CommitmentTerms {
            unique_id: request.unique_id,
            threshold: request.threshold,
            timeout_hours: request.timeout_hours,
            buyer: parties.buyer(),
            seller: parties.seller(),
            moderator: parties.moderator(),
            engine,
            token: asset.token(),
        };
        let computed = terms.script_hash();
        if computed != script_hash {
            return Err(EscrowError::CommitmentMismatch {
                submitted: script_hash,
                computed,
            });
        }

        self.collect(&script_hash, &asset, &caller, request.amount)?;

        let now = self.clock.now();
        self.registry.insert(Transaction {
            script_hash,
            parties,
            threshold: request.threshold,
            timeout_hours: request.timeout_hours,
            created_at: now,
            last_modified: now,
            asset,
            escrowed_amount: request.amount,
            released_amount: Amount::ZERO,
            status: TransactionStatus::Funded,
            last_signers: Vec::new(),
        })?;

        tracing::info!(
            script_hash = %script_hash,
            from = %caller,
            amount = %request.amount,
            asset = %asset,
            threshold = request.threshold,
            timeout_hours = request.timeout_hours,
            "escrow funded"
        );
        self.events.push(EscrowEvent::Funded {
            script_hash,
            from: caller,
            amount: request.amount,
        });
        Ok(script_hash)
    }

    /// Top up an escrow. Only the buyer may add funds.
    ///
    /// # Errors
    ///
    /// `NotFound`, `AlreadyExecuted`, `Unauthorized`, `ZeroAmount`,
    /// `EscrowedOverflow`, `ExternalTransferFailure`.
    pub fn add_funds(
        &mut self,
        caller: Address,
        script_hash: ScriptHash,
        amount: Amount,
    ) -> Result<(), EscrowError> {
        let tx = self.registry.get(&script_hash)?;
        if tx.status.is_terminal() {
            return Err(EscrowError::AlreadyExecuted(script_hash));
        }
        if caller != tx.buyer() {
            return Err(EscrowError::Unauthorized {
                script_hash,
                caller,
                operation: "add funds to",
            });
        }
        if amount.is_zero() {
            return Err(EscrowError::ZeroAmount);
        }
        let asset = tx.asset;
        let escrowed = tx
            .escrowed_amount
            .checked_add(amount)
            .ok_or(EscrowError::EscrowedOverflow {
                script_hash,
                escrowed: tx.escrowed_amount,
                amount,
            })?;

        self.collect(&script_hash, &asset, &caller, amount)?;

        let now = self.clock.now();
        let tx = self.registry.get_mut(&script_hash)?;
        tx.escrowed_amount = escrowed;
        tx.last_modified = now;

        tracing::info!(
            script_hash = %script_hash,
            from = %caller,
            amount = %amount,
            escrowed = %escrowed,
            "escrow topped up"
        );
        self.events.push(EscrowEvent::FundAdded {
            script_hash,
            from: caller,
            amount,
        });
        Ok(())
    }

    fn collect(
        &mut self,
        script_hash: &ScriptHash,
        asset: &AssetKind,
        from: &Address,
        amount: Amount,
    ) -> Result<(), EscrowError> {
        self.ledger.collect(asset, from, amount).map_err(|e| {
            tracing::warn!(script_hash = %script_hash, from = %from, error = %e, "deposit failed");
            EscrowError::ExternalTransferFailure(e)
        })
    }

    // ── Release ────────────────────────────────────────────────────────

    /// Release funds to `destinations` on the strength of `signatures`.
    ///
    /// Each signature must be over
    /// [`release_digest`](mesc_crypto::release_digest) of this exact payout
    /// batch and script hash.
    ///
    /// # Errors
    ///
    /// `NotFound`, `AlreadyExecuted`, `DestinationCountMismatch`,
    /// `UnauthorizedDestination`, `ZeroAmount`, `OverRelease`,
    /// `AuthorizationFailed`, `ExternalTransferFailure`.
    pub fn execute(
        &mut self,
        signatures: &[Signature],
        script_hash: ScriptHash,
        destinations: &[Address],
        amounts: &[Amount],
    ) -> Result<(), EscrowError> {
        self.release(Ok(signatures), script_hash, destinations, amounts)
    }

    /// [`execute`](Self::execute) with signatures given as parallel
    /// `v`, `r`, `s` arrays.
    ///
    /// Arrays of unequal length fail authorization with
    /// `SignatureCountMismatch`, after the signature-independent checks.
    pub fn execute_components(
        &mut self,
        v: &[u8],
        r: &[[u8; 32]],
        s: &[[u8; 32]],
        script_hash: ScriptHash,
        destinations: &[Address],
        amounts: &[Amount],
    ) -> Result<(), EscrowError> {
        match Signature::from_components(v, r, s) {
            Ok(signatures) => {
                self.release(Ok(signatures.as_slice()), script_hash, destinations, amounts)
            }
            Err(_) => self.release(
                Err(AuthorizationError::SignatureCountMismatch {
                    v: v.len(),
                    r: r.len(),
                    s: s.len(),
                }),
                script_hash,
                destinations,
                amounts,
            ),
        }
    }

    fn release(
        &mut self,
        signatures: Result<&[Signature], AuthorizationError>,
        script_hash: ScriptHash,
        destinations: &[Address],
        amounts: &[Amount],
    ) -> Result<(), EscrowError> {
        let engine = self.config.engine_address;
        let tx = self.registry.get(&script_hash)?;
        if tx.status.is_terminal() {
            return Err(EscrowError::AlreadyExecuted(script_hash));
        }
        if destinations.is_empty() || destinations.len() != amounts.len() {
            return Err(EscrowError::DestinationCountMismatch {
                destinations: destinations.len(),
                amounts: amounts.len(),
            });
        }
        if let Some(destination) = destinations.iter().find(|d| tx.role_of(d).is_none()) {
            return Err(EscrowError::UnauthorizedDestination {
                script_hash,
                destination: *destination,
            });
        }
        if amounts.iter().any(|a| a.is_zero()) {
            return Err(EscrowError::ZeroAmount);
        }
        let remaining = tx.remaining();
        let requested = Amount::checked_sum(amounts);
        let (total, released) = requested
            .filter(|total| *total <= remaining)
            .and_then(|total| Some((total, tx.released_amount.checked_add(total)?)))
            .ok_or(EscrowError::OverRelease {
                script_hash,
                requested,
                remaining,
            })?;

        let now = self.clock.now();
        let digest = release_digest(&engine, destinations, amounts, &script_hash);
        let authorization = signatures
            .and_then(|sigs| authorize(&self.recovery, tx, &digest, sigs, now))
            .map_err(|reason| {
                tracing::warn!(script_hash = %script_hash, reason = %reason, "release rejected");
                EscrowError::AuthorizationFailed {
                    script_hash,
                    reason,
                }
            })?;

        let asset = tx.asset;
        let payouts: Vec<Payout> = destinations
            .iter()
            .zip(amounts)
            .map(|(to, amount)| Payout {
                to: *to,
                amount: *amount,
            })
            .collect();
        self.ledger.disburse(&asset, &payouts).map_err(|e| {
            tracing::warn!(script_hash = %script_hash, error = %e, "payout failed");
            EscrowError::ExternalTransferFailure(e)
        })?;

        let tx = self.registry.get_mut(&script_hash)?;
        tx.released_amount = released;
        tx.last_modified = now;
        tx.last_signers = authorization.signers;
        if tx.released_amount == tx.escrowed_amount {
            tx.status = TransactionStatus::Executed;
        }

        tracing::info!(
            script_hash = %script_hash,
            amount = %total,
            released = %tx.released_amount,
            status = %tx.status,
            path = ?authorization.path,
            "escrow released"
        );
        self.events.push(EscrowEvent::Executed {
            script_hash,
            destinations: destinations.to_vec(),
            amounts: amounts.to_vec(),
        });
        Ok(())
    }

    // ── Read accessors ─────────────────────────────────────────────────

    /// The record for `script_hash`.
    pub fn transaction(&self, script_hash: &ScriptHash) -> Option<&Transaction> {
        self.registry.get(script_hash).ok()
    }

    /// Whether `addr` is the seller or moderator of the escrow. False for
    /// unknown escrows.
    pub fn is_beneficiary(&self, script_hash: &ScriptHash, addr: &Address) -> bool {
        self.transaction(script_hash)
            .is_some_and(|tx| tx.is_beneficiary(addr))
    }

    /// Whether `addr` contributed a signature to the escrow's most recent
    /// release.
    pub fn has_signed(&self, script_hash: &ScriptHash, addr: &Address) -> bool {
        self.transaction(script_hash)
            .is_some_and(|tx| tx.last_signers.contains(addr))
    }

    /// Every escrow `addr` is a party to, in admission order.
    pub fn transactions_for_party(&self, addr: &Address) -> Vec<ScriptHash> {
        self.registry.for_party(addr)
    }

    /// The release message hash for a payout batch, before personal-message
    /// wrapping. Clients wrap and sign it.
    pub fn transaction_hash(
        &self,
        destinations: &[Address],
        amounts: &[Amount],
        script_hash: &ScriptHash,
    ) -> [u8; 32] {
        release_message_hash(&self.config.engine_address, destinations, amounts, script_hash)
    }

    /// Recompute the stored escrow's commitment with `unique_id` and compare
    /// it to its key.
    pub fn verify_commitment(
        &self,
        script_hash: &ScriptHash,
        unique_id: UniqueId,
    ) -> Result<bool, EscrowError> {
        let tx = self.registry.get(script_hash)?;
        let computed = tx
            .commitment_terms(unique_id, self.config.engine_address)
            .script_hash();
        Ok(computed == *script_hash)
    }

    /// Balance still held by the escrow.
    pub fn remaining(&self, script_hash: &ScriptHash) -> Result<Amount, EscrowError> {
        Ok(self.registry.get(script_hash)?.remaining())
    }

    /// When the seller may release alone.
    pub fn deadline(&self, script_hash: &ScriptHash) -> Result<Timestamp, EscrowError> {
        Ok(self.registry.get(script_hash)?.deadline())
    }

    // ── Events ─────────────────────────────────────────────────────────

    /// Events emitted so far, oldest first.
    pub fn events(&self) -> &[EscrowEvent] {
        &self.events
    }

    /// Take all buffered events.
    pub fn drain_events(&mut self) -> Vec<EscrowEvent> {
        std::mem::take(&mut self.events)
    }
}
