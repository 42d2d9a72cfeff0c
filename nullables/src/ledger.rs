//! Nullable balance ledger: in-memory balances with a settable supply.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use quorum_types::{Address, BalanceLedger, LedgerError, TokenAmount};

/// A permissive in-memory ledger for testing.
///
/// `transfer_from` needs no allowance. The reported total supply is whatever
/// the test sets, independent of balances, so quorum can be exercised against
/// a moving electorate. [`NullLedger::refuse_transfers`] makes every transfer
/// fail, to check that engine operations leave no partial effects.
#[derive(Debug, Default)]
pub struct NullLedger {
    balances: Mutex<HashMap<Address, TokenAmount>>,
    total_supply: Mutex<TokenAmount>,
    refusing: AtomicBool,
}

impl NullLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit `owner` and grow the supply by the same amount.
    pub fn credit(&self, owner: &Address, amount: TokenAmount) {
        let mut balances = self.balances.lock().unwrap();
        let entry = balances.entry(owner.clone()).or_insert(TokenAmount::ZERO);
        *entry = entry.saturating_add(amount);
        let mut supply = self.total_supply.lock().unwrap();
        *supply = supply.saturating_add(amount);
    }

    /// Override the reported total supply.
    pub fn set_total_supply(&self, supply: TokenAmount) {
        *self.total_supply.lock().unwrap() = supply;
    }

    /// Make every subsequent transfer fail (or succeed again).
    pub fn refuse_transfers(&self, refuse: bool) {
        self.refusing.store(refuse, Ordering::SeqCst);
    }

    fn move_funds(&self, from: &Address, to: &Address, amount: TokenAmount) -> Result<(), LedgerError> {
        if self.refusing.load(Ordering::SeqCst) {
            return Err(LedgerError::Unavailable("transfers refused".into()));
        }
        let mut balances = self.balances.lock().unwrap();
        let available = balances.get(from).copied().unwrap_or(TokenAmount::ZERO);
        let remaining = available
            .checked_sub(amount)
            .ok_or_else(|| LedgerError::InsufficientBalance {
                owner: from.clone(),
                needed: amount,
                available,
            })?;
        balances.insert(from.clone(), remaining);
        let entry = balances.entry(to.clone()).or_insert(TokenAmount::ZERO);
        *entry = entry.saturating_add(amount);
        Ok(())
    }
}

impl BalanceLedger for NullLedger {
    fn balance_of(&self, owner: &Address) -> TokenAmount {
        self.balances
            .lock()
            .unwrap()
            .get(owner)
            .copied()
            .unwrap_or(TokenAmount::ZERO)
    }

    fn total_supply(&self) -> TokenAmount {
        *self.total_supply.lock().unwrap()
    }

    fn transfer(
        &self,
        from: &Address,
        to: &Address,
        amount: TokenAmount,
    ) -> Result<(), LedgerError> {
        self.move_funds(from, to, amount)
    }

    fn transfer_from(
        &self,
        _spender: &Address,
        owner: &Address,
        to: &Address,
        amount: TokenAmount,
    ) -> Result<(), LedgerError> {
        self.move_funds(owner, to, amount)
    }
}
