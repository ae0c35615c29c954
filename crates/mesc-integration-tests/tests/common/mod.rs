//! Shared harness for the escrow integration tests: real secp256k1 keys,
//! an in-memory ledger with one registered token, and a manual clock.

#![allow(dead_code)]

use std::sync::Once;

use mesc_core::{Address, Amount, ManualClock, ScriptHash, Timestamp, UniqueId};
use mesc_crypto::{CommitmentTerms, LocalSigner, Secp256k1Recovery, Signature};
use mesc_escrow::{EngineConfig, EscrowEngine, InMemoryToken, Ledger, NewEscrow, TokenContract};
use tracing_subscriber::EnvFilter;

pub const ENGINE: Address = Address([0xee; 20]);
pub const TOKEN: Address = Address([0x77; 20]);
pub const OUTSIDER: Address = Address([0x99; 20]);

/// One whole unit in smallest denomination (18 decimals).
pub const UNIT: u128 = 1_000_000_000_000_000_000;

pub type Engine = EscrowEngine<Ledger, Secp256k1Recovery, ManualClock>;

static TRACING: Once = Once::new();

/// Route engine logs to the test writer. Filter with `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    });
}

pub struct Harness {
    pub engine: Engine,
    pub clock: ManualClock,
    pub buyer: LocalSigner,
    pub seller: LocalSigner,
    pub moderator: LocalSigner,
    pub outsider: LocalSigner,
    next_id: u8,
}

impl Harness {
    /// Buyer holds 10 native units and 10 token units; no allowance is set.
    pub fn new() -> Self {
        init_tracing();
        let buyer = LocalSigner::generate();
        let seller = LocalSigner::generate();
        let moderator = LocalSigner::generate();
        let outsider = LocalSigner::generate();

        let mut ledger: Ledger = Ledger::new(ENGINE);
        ledger
            .credit_native(buyer.address(), Amount::new(10 * UNIT))
            .unwrap();
        let mut token = InMemoryToken::new();
        token.mint(buyer.address(), Amount::new(10 * UNIT)).unwrap();
        ledger.register_token(TOKEN, token);

        let clock = ManualClock::starting_at(Timestamp::parse("2026-05-01T09:00:00Z").unwrap());
        let engine = EscrowEngine::new(
            EngineConfig::new(ENGINE),
            ledger,
            Secp256k1Recovery,
            clock.clone(),
        );
        Self {
            engine,
            clock,
            buyer,
            seller,
            moderator,
            outsider,
            next_id: 0,
        }
    }

    /// Terms over buyer, seller and moderator with a fresh unique id.
    pub fn escrow_terms(
        &mut self,
        threshold: u8,
        timeout_hours: u32,
        amount: u128,
        token: Option<Address>,
    ) -> (NewEscrow, UniqueId) {
        self.next_id += 1;
        let unique_id = UniqueId([self.next_id; 20]);
        let terms = CommitmentTerms {
            unique_id,
            threshold,
            timeout_hours,
            buyer: self.buyer.address(),
            seller: self.seller.address(),
            moderator: Some(self.moderator.address()),
            engine: ENGINE,
            token,
        };
        let request = NewEscrow {
            buyer: terms.buyer,
            seller: terms.seller,
            moderator: terms.moderator,
            threshold,
            timeout_hours,
            script_hash: terms.script_hash(),
            unique_id,
            amount: Amount::new(amount),
            token,
        };
        (request, unique_id)
    }

    /// Create a native escrow funded by the buyer.
    pub fn fund_native(&mut self, threshold: u8, timeout_hours: u32, amount: u128) -> ScriptHash {
        let (request, _) = self.escrow_terms(threshold, timeout_hours, amount, None);
        self.engine
            .create_transaction(self.buyer.address(), request)
            .unwrap()
    }

    /// Approve the engine to pull `amount` of the token from the buyer.
    pub fn approve_token(&mut self, amount: u128) {
        let buyer = self.buyer.address();
        let approved = self
            .engine
            .ledger_mut()
            .token_mut(&TOKEN)
            .unwrap()
            .approve(&buyer, &ENGINE, Amount::new(amount))
            .unwrap();
        assert!(approved);
    }

    pub fn native_balance(&self, addr: &Address) -> Amount {
        self.engine.ledger().native_balance(addr)
    }

    pub fn token_balance(&self, addr: &Address) -> Amount {
        self.engine
            .ledger()
            .token(&TOKEN)
            .map(|t| t.balance_of(addr))
            .unwrap_or(Amount::ZERO)
    }
}

/// Each signer signs the release digest for this batch.
pub fn sign_all(
    signers: &[&LocalSigner],
    script_hash: &ScriptHash,
    destinations: &[Address],
    amounts: &[Amount],
) -> Vec<Signature> {
    signers
        .iter()
        .map(|s| s.sign_release(&ENGINE, destinations, amounts, script_hash))
        .collect()
}

pub fn amounts(values: &[u128]) -> Vec<Amount> {
    values.iter().map(|v| Amount::new(*v)).collect()
}
