//! # Value Transfer
//!
//! The engine moves value through the [`ValueTransfer`] capability:
//! [`collect`](ValueTransfer::collect) pulls a deposit from a payer into
//! custody, and [`disburse`](ValueTransfer::disburse) pays a batch out of
//! custody.
//!
//! ## Atomicity
//!
//! `disburse` is all-or-nothing. If any payout in a batch fails, no payout
//! in that batch takes effect. The engine relies on this: it mutates its
//! record only after `disburse` returns `Ok`.
//!
//! ## Token collaborator
//!
//! Token escrows go through the [`TokenContract`] interface. A token
//! returning `Ok(false)` is treated the same as one returning an error;
//! both abort the operation.
//!
//! [`Ledger`] is the in-process implementation: native balances in a map
//! and one [`TokenContract`] per registered token address.

use std::collections::HashMap;

use mesc_core::{Address, Amount};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::transaction::AssetKind;

/// One payout in a release batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payout {
    /// Recipient.
    pub to: Address,
    /// Amount paid.
    pub amount: Amount,
}

/// Errors raised by a token contract.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Owner balance is below the transfer amount.
    #[error("balance of {owner} is {available}, needed {needed}")]
    InsufficientBalance {
        /// Account being debited.
        owner: Address,
        /// Required amount.
        needed: Amount,
        /// Current balance.
        available: Amount,
    },

    /// Spender allowance is below the transfer amount.
    #[error("allowance of {spender} over {owner} is {available}, needed {needed}")]
    InsufficientAllowance {
        /// Account whose tokens are spent.
        owner: Address,
        /// Account spending them.
        spender: Address,
        /// Required amount.
        needed: Amount,
        /// Current allowance.
        available: Amount,
    },

    /// Crediting the recipient would overflow its balance.
    #[error("balance of {0} would overflow")]
    BalanceOverflow(Address),

    /// The contract refuses all calls.
    #[error("token contract is halted")]
    Halted,
}

/// Errors from a value transfer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    /// Native balance is too low.
    #[error("native balance of {account} is {available}, needed {needed}")]
    InsufficientFunds {
        /// Account being debited.
        account: Address,
        /// Required amount.
        needed: Amount,
        /// Current balance.
        available: Amount,
    },

    /// Crediting an account would overflow its native balance.
    #[error("native balance of {0} would overflow")]
    BalanceOverflow(Address),

    /// A deposit was requested from the custodian itself.
    #[error("cannot collect a deposit from custodian {0}")]
    CustodianSource(Address),

    /// No token contract is registered at this address.
    #[error("no token contract at {0}")]
    UnknownToken(Address),

    /// The token contract returned `false`.
    #[error("token {token} rejected {operation}")]
    TokenRejected {
        /// The token contract.
        token: Address,
        /// The rejected call.
        operation: &'static str,
    },

    /// The token contract returned an error.
    #[error("token {token} failed {operation}: {source}")]
    Token {
        /// The token contract.
        token: Address,
        /// The failed call.
        operation: &'static str,
        /// The contract's error.
        #[source]
        source: TokenError,
    },
}

/// Moves value into and out of escrow custody.
pub trait ValueTransfer {
    /// Move `amount` of `asset` from `from` into custody.
    fn collect(&mut self, asset: &AssetKind, from: &Address, amount: Amount)
        -> Result<(), TransferError>;

    /// Pay every payout in `payouts` from custody. All-or-nothing.
    fn disburse(&mut self, asset: &AssetKind, payouts: &[Payout]) -> Result<(), TransferError>;
}

/// The fungible token interface consumed by the engine.
///
/// `caller` is the account invoking each method, the role a transaction
/// sender plays for an on-chain token.
pub trait TokenContract {
    /// Allow `spender` to move up to `amount` of `caller`'s tokens.
    fn approve(&mut self, caller: &Address, spender: &Address, amount: Amount)
        -> Result<bool, TokenError>;

    /// Move `amount` from `from` to `to`, spending `caller`'s allowance.
    fn transfer_from(
        &mut self,
        caller: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<bool, TokenError>;

    /// Move `amount` from `caller` to `to`.
    fn transfer(&mut self, caller: &Address, to: &Address, amount: Amount)
        -> Result<bool, TokenError>;

    /// Balance of `owner`.
    fn balance_of(&self, owner: &Address) -> Amount;

    /// Remaining allowance of `spender` over `owner`.
    fn allowance(&self, owner: &Address, spender: &Address) -> Amount;
}

// ---------------------------------------------------------------------------
// InMemoryToken
// ---------------------------------------------------------------------------

/// How an [`InMemoryToken`] misbehaves, for exercising failure paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenFault {
    /// Behaves normally.
    #[default]
    None,
    /// Every mutating call returns `Ok(false)`.
    ReturnFalse,
    /// Every mutating call returns `Err(TokenError::Halted)`.
    Halt,
    /// Calls succeed until the given number of `transfer` calls have
    /// completed; later `transfer` calls return `Ok(false)`.
    RejectTransfersAfter(usize),
}

/// A token contract held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryToken {
    balances: HashMap<Address, Amount>,
    allowances: HashMap<(Address, Address), Amount>,
    fault: TokenFault,
    transfers: usize,
}

impl InMemoryToken {
    /// An empty token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit `amount` to `to` out of thin air.
    pub fn mint(&mut self, to: Address, amount: Amount) -> Result<(), TokenError> {
        let balance = self.balance_of(&to);
        let updated = balance
            .checked_add(amount)
            .ok_or(TokenError::BalanceOverflow(to))?;
        self.balances.insert(to, updated);
        Ok(())
    }

    /// Set the failure behaviour.
    pub fn set_fault(&mut self, fault: TokenFault) {
        self.fault = fault;
        self.transfers = 0;
    }

    /// Sum of all balances.
    pub fn total_supply(&self) -> Amount {
        Amount::checked_sum(self.balances.values()).unwrap_or(Amount::new(u128::MAX))
    }

    fn fault_check(&self, is_transfer: bool) -> Result<bool, TokenError> {
        match self.fault {
            TokenFault::None => Ok(true),
            TokenFault::ReturnFalse => Ok(false),
            TokenFault::Halt => Err(TokenError::Halted),
            TokenFault::RejectTransfersAfter(n) => Ok(!is_transfer || self.transfers < n),
        }
    }

    fn move_balance(&mut self, from: &Address, to: &Address, amount: Amount) -> Result<(), TokenError> {
        let available = self.balance_of(from);
        let debited = available
            .checked_sub(amount)
            .ok_or(TokenError::InsufficientBalance {
                owner: *from,
                needed: amount,
                available,
            })?;
        self.balances.insert(*from, debited);
        let credited = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(TokenError::BalanceOverflow(*to));
        match credited {
            Ok(credited) => {
                self.balances.insert(*to, credited);
                Ok(())
            }
            Err(e) => {
                self.balances.insert(*from, available);
                Err(e)
            }
        }
    }
}

impl TokenContract for InMemoryToken {
    fn approve(
        &mut self,
        caller: &Address,
        spender: &Address,
        amount: Amount,
    ) -> Result<bool, TokenError> {
        if !self.fault_check(false)? {
            return Ok(false);
        }
        self.allowances.insert((*caller, *spender), amount);
        Ok(true)
    }

    fn transfer_from(
        &mut self,
        caller: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<bool, TokenError> {
        if !self.fault_check(false)? {
            return Ok(false);
        }
        let available = self.allowance(from, caller);
        let reduced = available
            .checked_sub(amount)
            .ok_or(TokenError::InsufficientAllowance {
                owner: *from,
                spender: *caller,
                needed: amount,
                available,
            })?;
        self.move_balance(from, to, amount)?;
        self.allowances.insert((*from, *caller), reduced);
        Ok(true)
    }

    fn transfer(&mut self, caller: &Address, to: &Address, amount: Amount) -> Result<bool, TokenError> {
        if !self.fault_check(true)? {
            return Ok(false);
        }
        self.move_balance(caller, to, amount)?;
        self.transfers += 1;
        Ok(true)
    }

    fn balance_of(&self, owner: &Address) -> Amount {
        self.balances.get(owner).copied().unwrap_or(Amount::ZERO)
    }

    fn allowance(&self, owner: &Address, spender: &Address) -> Amount {
        self.allowances
            .get(&(*owner, *spender))
            .copied()
            .unwrap_or(Amount::ZERO)
    }
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

/// In-process custody: native balances plus registered token contracts.
///
/// `custodian` is the account holding escrowed funds, normally the
/// engine address. Token deposits are pulled with `transfer_from` using
/// the custodian as spender, so payers must `approve` it first.
#[derive(Debug, Clone)]
pub struct Ledger<T = InMemoryToken> {
    custodian: Address,
    native: HashMap<Address, Amount>,
    tokens: HashMap<Address, T>,
}

impl<T: TokenContract + Clone> Ledger<T> {
    /// An empty ledger with the given custodian.
    pub fn new(custodian: Address) -> Self {
        Self {
            custodian,
            native: HashMap::new(),
            tokens: HashMap::new(),
        }
    }

    /// The custody account.
    pub fn custodian(&self) -> Address {
        self.custodian
    }

    /// Credit native currency to `account`.
    pub fn credit_native(&mut self, account: Address, amount: Amount) -> Result<(), TransferError> {
        let updated = self
            .native_balance(&account)
            .checked_add(amount)
            .ok_or(TransferError::BalanceOverflow(account))?;
        self.native.insert(account, updated);
        Ok(())
    }

    /// Native balance of `account`.
    pub fn native_balance(&self, account: &Address) -> Amount {
        self.native.get(account).copied().unwrap_or(Amount::ZERO)
    }

    /// Register a token contract at `address`, replacing any previous one.
    pub fn register_token(&mut self, address: Address, token: T) {
        self.tokens.insert(address, token);
    }

    /// The token contract at `address`.
    pub fn token(&self, address: &Address) -> Option<&T> {
        self.tokens.get(address)
    }

    /// Mutable access to the token contract at `address`.
    pub fn token_mut(&mut self, address: &Address) -> Option<&mut T> {
        self.tokens.get_mut(address)
    }

    /// Balance of `account` in `asset`.
    pub fn balance(&self, asset: &AssetKind, account: &Address) -> Amount {
        match asset {
            AssetKind::Native => self.native_balance(account),
            AssetKind::Token(addr) => self
                .tokens
                .get(addr)
                .map(|t| t.balance_of(account))
                .unwrap_or(Amount::ZERO),
        }
    }

    fn move_native(&mut self, from: &Address, to: &Address, amount: Amount) -> Result<(), TransferError> {
        let available = self.native_balance(from);
        let debited = available
            .checked_sub(amount)
            .ok_or(TransferError::InsufficientFunds {
                account: *from,
                needed: amount,
                available,
            })?;
        let credited = if from == to {
            available
        } else {
            self.native_balance(to)
                .checked_add(amount)
                .ok_or(TransferError::BalanceOverflow(*to))?
        };
        if from != to {
            self.native.insert(*from, debited);
        }
        self.native.insert(*to, credited);
        Ok(())
    }

    fn token_entry(&mut self, token: &Address) -> Result<&mut T, TransferError> {
        self.tokens
            .get_mut(token)
            .ok_or(TransferError::UnknownToken(*token))
    }
}

fn token_call(
    token: &Address,
    operation: &'static str,
    result: Result<bool, TokenError>,
) -> Result<(), TransferError> {
    match result {
        Ok(true) => Ok(()),
        Ok(false) => Err(TransferError::TokenRejected {
            token: *token,
            operation,
        }),
        Err(source) => Err(TransferError::Token {
            token: *token,
            operation,
            source,
        }),
    }
}

impl<T: TokenContract + Clone> ValueTransfer for Ledger<T> {
    fn collect(
        &mut self,
        asset: &AssetKind,
        from: &Address,
        amount: Amount,
    ) -> Result<(), TransferError> {
        let custodian = self.custodian;
        if *from == custodian {
            return Err(TransferError::CustodianSource(custodian));
        }
        match asset {
            AssetKind::Native => self.move_native(from, &custodian, amount),
            AssetKind::Token(addr) => {
                let token = self.token_entry(addr)?;
                let result = token.transfer_from(&custodian, from, &custodian, amount);
                token_call(addr, "transferFrom", result)
            }
        }
    }

    fn disburse(&mut self, asset: &AssetKind, payouts: &[Payout]) -> Result<(), TransferError> {
        let custodian = self.custodian;
        match asset {
            AssetKind::Native => {
                let snapshot = self.native.clone();
                for payout in payouts {
                    if let Err(e) = self.move_native(&custodian, &payout.to, payout.amount) {
                        self.native = snapshot;
                        return Err(e);
                    }
                }
                Ok(())
            }
            AssetKind::Token(addr) => {
                let token = self.token_entry(addr)?;
                let snapshot = token.clone();
                for payout in payouts {
                    let result = token.transfer(&custodian, &payout.to, payout.amount);
                    if let Err(e) = token_call(addr, "transfer", result) {
                        *token = snapshot;
                        return Err(e);
                    }
                }
                Ok(())
            }
        }
    }
}
