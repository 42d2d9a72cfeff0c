//! The token ledger: balances, allowances, supply and roles.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use quorum_types::{Address, BalanceLedger, CallTarget, DispatchError, LedgerError, TokenAmount};

use crate::call::LedgerCall;

#[derive(Default)]
struct TokenState {
    balances: HashMap<Address, TokenAmount>,
    allowances: HashMap<(Address, Address), TokenAmount>,
    total_supply: TokenAmount,
    minter: Option<Address>,
}

impl TokenState {
    fn balance(&self, owner: &Address) -> TokenAmount {
        self.balances.get(owner).copied().unwrap_or(TokenAmount::ZERO)
    }

    /// Debit `from` and credit `to`, or change nothing.
    fn move_funds(
        &mut self,
        from: &Address,
        to: &Address,
        amount: TokenAmount,
    ) -> Result<(), LedgerError> {
        let available = self.balance(from);
        let debited = available
            .checked_sub(amount)
            .ok_or_else(|| LedgerError::InsufficientBalance {
                owner: from.clone(),
                needed: amount,
                available,
            })?;
        if from == to {
            return Ok(());
        }
        let credited = self
            .balance(to)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        self.balances.insert(from.clone(), debited);
        self.balances.insert(to.clone(), credited);
        Ok(())
    }
}

/// An in-memory fungible token.
///
/// The `owner` may mint at any time and may grant the mint role to exactly one
/// other account (typically the governance engine's escrow) via
/// [`TokenLedger::set_minter`]. All operations are atomic.
pub struct TokenLedger {
    address: Address,
    owner: Address,
    state: Mutex<TokenState>,
}

impl TokenLedger {
    /// Create an empty ledger living at `address`, administered by `owner`.
    pub fn new(address: Address, owner: Address) -> Self {
        Self {
            address,
            owner,
            state: Mutex::new(TokenState::default()),
        }
    }

    /// Address of the ledger itself, used as a dispatch target.
    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn owner(&self) -> &Address {
        &self.owner
    }

    pub fn minter(&self) -> Option<Address> {
        self.lock().minter.clone()
    }

    fn lock(&self) -> MutexGuard<'_, TokenState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Grant the mint role. Only the owner may do this, and only once.
    pub fn set_minter(&self, caller: &Address, minter: Address) -> Result<(), LedgerError> {
        if *caller != self.owner {
            return Err(LedgerError::Unauthorized {
                caller: caller.clone(),
                action: "set the minter",
            });
        }
        let mut state = self.lock();
        if state.minter.is_some() {
            return Err(LedgerError::Unauthorized {
                caller: caller.clone(),
                action: "replace the minter",
            });
        }
        tracing::info!(token = %self.address, %minter, "mint role granted");
        state.minter = Some(minter);
        Ok(())
    }

    /// Create `amount` new tokens for `to`.
    pub fn mint(&self, caller: &Address, to: &Address, amount: TokenAmount) -> Result<(), LedgerError> {
        let mut state = self.lock();
        let may_mint = *caller == self.owner || state.minter.as_ref() == Some(caller);
        if !may_mint {
            return Err(LedgerError::Unauthorized {
                caller: caller.clone(),
                action: "mint",
            });
        }
        let supply = state
            .total_supply
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        let balance = state.balance(to).checked_add(amount).ok_or(LedgerError::Overflow)?;
        state.total_supply = supply;
        state.balances.insert(to.clone(), balance);
        tracing::debug!(token = %self.address, %to, %amount, "minted");
        Ok(())
    }

    /// Let `spender` move up to `amount` of `owner`'s tokens.
    /// Replaces any previous allowance.
    pub fn approve(&self, owner: &Address, spender: &Address, amount: TokenAmount) {
        self.lock()
            .allowances
            .insert((owner.clone(), spender.clone()), amount);
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> TokenAmount {
        self.lock()
            .allowances
            .get(&(owner.clone(), spender.clone()))
            .copied()
            .unwrap_or(TokenAmount::ZERO)
    }
}

impl BalanceLedger for TokenLedger {
    fn balance_of(&self, owner: &Address) -> TokenAmount {
        self.lock().balance(owner)
    }

    fn total_supply(&self) -> TokenAmount {
        self.lock().total_supply
    }

    fn transfer(
        &self,
        from: &Address,
        to: &Address,
        amount: TokenAmount,
    ) -> Result<(), LedgerError> {
        self.lock().move_funds(from, to, amount)
    }

    fn transfer_from(
        &self,
        spender: &Address,
        owner: &Address,
        to: &Address,
        amount: TokenAmount,
    ) -> Result<(), LedgerError> {
        let mut state = self.lock();
        let key = (owner.clone(), spender.clone());
        let available = state.allowances.get(&key).copied().unwrap_or(TokenAmount::ZERO);
        let remaining = available
            .checked_sub(amount)
            .ok_or_else(|| LedgerError::InsufficientAllowance {
                owner: owner.clone(),
                spender: spender.clone(),
                needed: amount,
                available,
            })?;
        state.move_funds(owner, to, amount)?;
        state.allowances.insert(key, remaining);
        Ok(())
    }
}

impl CallTarget for TokenLedger {
    fn call(&self, caller: &Address, call_data: &[u8]) -> Result<(), DispatchError> {
        match LedgerCall::decode(call_data)? {
            LedgerCall::Mint { to, amount } => self
                .mint(caller, &to, amount)
                .map_err(|e| DispatchError::Reverted(e.to_string())),
        }
    }
}
