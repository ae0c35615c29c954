//! Token-denominated escrows against the in-memory token contract,
//! including contracts that refuse or fail calls.

mod common;

use common::{amounts, sign_all, Harness, ENGINE, TOKEN, UNIT};
use mesc_core::Amount;
use mesc_escrow::{
    AssetKind, ErrorKind, EscrowError, EscrowEvent, TokenContract, TokenError, TokenFault,
    Transaction, TransactionStatus, TransferError,
};

fn set_fault(h: &mut Harness, fault: TokenFault) {
    h.engine
        .ledger_mut()
        .token_mut(&TOKEN)
        .unwrap()
        .set_fault(fault);
}

#[test]
fn token_escrow_happy_path() {
    let mut h = Harness::new();
    h.approve_token(3 * UNIT);
    let (request, _) = h.escrow_terms(2, 72, 2 * UNIT, Some(TOKEN));
    let sh = h
        .engine
        .create_transaction(h.buyer.address(), request)
        .unwrap();

    assert_eq!(h.token_balance(&ENGINE), Amount::new(2 * UNIT));
    assert_eq!(h.token_balance(&h.buyer.address()), Amount::new(8 * UNIT));
    let allowance = h
        .engine
        .ledger()
        .token(&TOKEN)
        .unwrap()
        .allowance(&h.buyer.address(), &ENGINE);
    assert_eq!(allowance, Amount::new(UNIT));
    assert_eq!(
        h.engine.transaction(&sh).unwrap().asset,
        AssetKind::Token(TOKEN)
    );
    // Native balances are untouched by a token escrow.
    assert_eq!(h.native_balance(&ENGINE), Amount::ZERO);

    h.engine
        .add_funds(h.buyer.address(), sh, Amount::new(UNIT))
        .unwrap();
    assert_eq!(h.token_balance(&ENGINE), Amount::new(3 * UNIT));

    let dests = [h.seller.address(), h.buyer.address()];
    let amts = amounts(&[2 * UNIT, UNIT]);
    let sigs = sign_all(&[&h.buyer, &h.moderator], &sh, &dests, &amts);
    h.engine.execute(&sigs, sh, &dests, &amts).unwrap();

    assert_eq!(h.token_balance(&h.seller.address()), Amount::new(2 * UNIT));
    assert_eq!(h.token_balance(&h.buyer.address()), Amount::new(8 * UNIT));
    assert_eq!(h.token_balance(&ENGINE), Amount::ZERO);
    assert_eq!(
        h.engine.transaction(&sh).unwrap().status,
        TransactionStatus::Executed
    );
}

#[test]
fn top_up_beyond_allowance_fails_without_change() {
    let mut h = Harness::new();
    h.approve_token(UNIT);
    let (request, _) = h.escrow_terms(2, 72, UNIT, Some(TOKEN));
    let sh = h
        .engine
        .create_transaction(h.buyer.address(), request)
        .unwrap();

    let err = h
        .engine
        .add_funds(h.buyer.address(), sh, Amount::new(1))
        .unwrap_err();
    assert!(matches!(
        err,
        EscrowError::ExternalTransferFailure(TransferError::Token {
            source: TokenError::InsufficientAllowance { .. },
            ..
        })
    ));
    assert_eq!(
        h.engine.transaction(&sh).unwrap().escrowed_amount,
        Amount::new(UNIT)
    );
}

#[test]
fn contract_returning_false_on_deposit() {
    let mut h = Harness::new();
    h.approve_token(UNIT);
    set_fault(&mut h, TokenFault::ReturnFalse);
    let (request, _) = h.escrow_terms(2, 72, UNIT, Some(TOKEN));
    let sh = request.script_hash;

    let err = h
        .engine
        .create_transaction(h.buyer.address(), request)
        .unwrap_err();
    assert_eq!(
        err,
        EscrowError::ExternalTransferFailure(TransferError::TokenRejected {
            token: TOKEN,
            operation: "transferFrom",
        })
    );
    assert!(h.engine.transaction(&sh).is_none());
}

#[test]
fn halted_contract_during_release_leaves_escrow_open() {
    let mut h = Harness::new();
    h.approve_token(UNIT);
    let (request, _) = h.escrow_terms(1, 72, UNIT, Some(TOKEN));
    let sh = h
        .engine
        .create_transaction(h.buyer.address(), request)
        .unwrap();
    set_fault(&mut h, TokenFault::Halt);

    let dests = [h.seller.address()];
    let amts = amounts(&[UNIT]);
    let sigs = sign_all(&[&h.seller], &sh, &dests, &amts);
    let err = h.engine.execute(&sigs, sh, &dests, &amts).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::External);
    assert!(matches!(
        err,
        EscrowError::ExternalTransferFailure(TransferError::Token {
            source: TokenError::Halted,
            ..
        })
    ));
    let tx = h.engine.transaction(&sh).unwrap();
    assert_eq!(tx.released_amount, Amount::ZERO);
    assert_eq!(tx.status, TransactionStatus::Funded);

    // Once the contract recovers, the same signatures release the funds.
    set_fault(&mut h, TokenFault::None);
    h.engine.execute(&sigs, sh, &dests, &amts).unwrap();
    assert_eq!(h.token_balance(&h.seller.address()), Amount::new(UNIT));
}

#[test]
fn partially_rejected_batch_rolls_back() {
    let mut h = Harness::new();
    h.approve_token(UNIT);
    let (request, _) = h.escrow_terms(1, 72, UNIT, Some(TOKEN));
    let sh = h
        .engine
        .create_transaction(h.buyer.address(), request)
        .unwrap();
    set_fault(&mut h, TokenFault::RejectTransfersAfter(1));

    let dests = [h.seller.address(), h.moderator.address()];
    let amts = amounts(&[UNIT / 2, UNIT / 2]);
    let sigs = sign_all(&[&h.moderator], &sh, &dests, &amts);
    let err = h.engine.execute(&sigs, sh, &dests, &amts).unwrap_err();
    assert!(matches!(
        err,
        EscrowError::ExternalTransferFailure(TransferError::TokenRejected { .. })
    ));
    assert_eq!(h.token_balance(&h.seller.address()), Amount::ZERO);
    assert_eq!(h.token_balance(&ENGINE), Amount::new(UNIT));
    assert_eq!(h.engine.remaining(&sh), Ok(Amount::new(UNIT)));
}

#[test]
fn unregistered_token_is_an_external_failure() {
    let mut h = Harness::new();
    let other = mesc_core::Address([0x78; 20]);
    let (request, _) = h.escrow_terms(2, 72, UNIT, Some(other));
    let err = h
        .engine
        .create_transaction(h.buyer.address(), request)
        .unwrap_err();
    assert_eq!(
        err,
        EscrowError::ExternalTransferFailure(TransferError::UnknownToken(other))
    );
}

// ---------------------------------------------------------------------------
// Serialized records and events
// ---------------------------------------------------------------------------

#[test]
fn records_and_events_serialize_for_hosts() {
    let mut h = Harness::new();
    h.approve_token(UNIT);
    let (request, _) = h.escrow_terms(2, 72, UNIT, Some(TOKEN));
    let sh = h
        .engine
        .create_transaction(h.buyer.address(), request)
        .unwrap();

    let tx = h.engine.transaction(&sh).unwrap().clone();
    let json = serde_json::to_value(&tx).unwrap();
    assert_eq!(json["status"], "FUNDED");
    assert_eq!(json["asset"]["kind"], "token");
    assert_eq!(json["asset"]["contract"], TOKEN.to_string());
    assert_eq!(json["escrowed_amount"], UNIT.to_string());
    assert_eq!(json["created_at"], "2026-05-01T09:00:00Z");
    let back: Transaction = serde_json::from_value(json).unwrap();
    assert_eq!(back, tx);

    let events = h.engine.drain_events();
    assert_eq!(events.len(), 1);
    let json = serde_json::to_value(&events[0]).unwrap();
    assert_eq!(json["event"], "funded");
    assert_eq!(json["from"], h.buyer.address().to_string());
    let back: EscrowEvent = serde_json::from_value(json).unwrap();
    assert_eq!(back, events[0]);
    assert!(h.engine.events().is_empty());
}
