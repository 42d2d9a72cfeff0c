//! The balance ledger capability.
//!
//! The engine never owns token balances itself; it moves funds between voters
//! and its escrow account through this trait. Methods take `&self` so one
//! ledger can be shared between the engine and the action targets that act on
//! it (e.g. a mint dispatched by a passed proposal). Implementations are
//! responsible for their own interior synchronisation.

use std::sync::Arc;

use thiserror::Error;

use crate::address::Address;
use crate::amount::TokenAmount;

/// Reasons a ledger refuses an operation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("insufficient balance for {owner}: need {needed}, have {available}")]
    InsufficientBalance {
        owner: Address,
        needed: TokenAmount,
        available: TokenAmount,
    },

    #[error("insufficient allowance from {owner} to {spender}: need {needed}, have {available}")]
    InsufficientAllowance {
        owner: Address,
        spender: Address,
        needed: TokenAmount,
        available: TokenAmount,
    },

    #[error("{caller} is not allowed to {action}")]
    Unauthorized { caller: Address, action: &'static str },

    #[error("arithmetic overflow on ledger")]
    Overflow,

    #[error("ledger unavailable: {0}")]
    Unavailable(String),
}

/// Fungible-asset ledger operations consumed by the engine.
pub trait BalanceLedger {
    /// Free balance held by `owner`.
    fn balance_of(&self, owner: &Address) -> TokenAmount;

    /// Current total supply.
    fn total_supply(&self) -> TokenAmount;

    /// Move `amount` from `from` to `to`, authorised by `from`.
    fn transfer(&self, from: &Address, to: &Address, amount: TokenAmount)
        -> Result<(), LedgerError>;

    /// Move `amount` from `owner` to `to`, authorised by an allowance that
    /// `owner` previously granted to `spender`.
    fn transfer_from(
        &self,
        spender: &Address,
        owner: &Address,
        to: &Address,
        amount: TokenAmount,
    ) -> Result<(), LedgerError>;
}

impl<T: BalanceLedger + ?Sized> BalanceLedger for Arc<T> {
    fn balance_of(&self, owner: &Address) -> TokenAmount {
        (**self).balance_of(owner)
    }

    fn total_supply(&self) -> TokenAmount {
        (**self).total_supply()
    }

    fn transfer(
        &self,
        from: &Address,
        to: &Address,
        amount: TokenAmount,
    ) -> Result<(), LedgerError> {
        (**self).transfer(from, to, amount)
    }

    fn transfer_from(
        &self,
        spender: &Address,
        owner: &Address,
        to: &Address,
        amount: TokenAmount,
    ) -> Result<(), LedgerError> {
        (**self).transfer_from(spender, owner, to, amount)
    }
}
