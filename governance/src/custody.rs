//! Balance custody: voters' stake held in the engine's escrow.
//!
//! Custody is the only component that moves tokens between the ledger and the
//! escrow account, and the only writer of locked balances. Every operation
//! performs its ledger call before touching local state, so a ledger refusal
//! leaves custody unchanged.

use std::collections::HashMap;

use quorum_types::{Address, BalanceLedger, ProposalId, TokenAmount};
use serde::{Deserialize, Serialize};

use crate::error::GovernanceError;

/// Locked balances by voter.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Custody {
    balances: HashMap<Address, TokenAmount>,
}

impl Custody {
    pub fn new() -> Self {
        Self::default()
    }

    /// Balance `voter` currently has locked in escrow.
    pub fn balance_of(&self, voter: &Address) -> TokenAmount {
        self.balances.get(voter).copied().unwrap_or(TokenAmount::ZERO)
    }

    /// Sum of all locked balances. Equals what the escrow should hold on the
    /// ledger on behalf of voters.
    pub fn total_locked(&self) -> TokenAmount {
        self.balances
            .values()
            .fold(TokenAmount::ZERO, |acc, b| acc.saturating_add(*b))
    }

    /// Number of accounts with a non-zero locked balance.
    pub fn holder_count(&self) -> usize {
        self.balances.len()
    }

    /// Pull `amount` from `caller` into `escrow` and lock it.
    ///
    /// `caller` must have approved `escrow` to spend at least `amount`.
    /// Returns the caller's new locked balance.
    pub fn top_up<L: BalanceLedger + ?Sized>(
        &mut self,
        ledger: &L,
        escrow: &Address,
        caller: &Address,
        amount: TokenAmount,
    ) -> Result<TokenAmount, GovernanceError> {
        if amount.is_zero() {
            return Err(GovernanceError::InvalidAmount);
        }
        let updated = self
            .balance_of(caller)
            .checked_add(amount)
            .ok_or(GovernanceError::Overflow)?;
        ledger.transfer_from(escrow, caller, escrow, amount)?;
        self.balances.insert(caller.clone(), updated);
        Ok(updated)
    }

    /// Return `amount` of `caller`'s locked balance from `escrow`.
    ///
    /// `lock` is the proposal the caller currently has a vote committed to, if
    /// any; withdrawal is refused while one exists. A zero amount is accepted
    /// as a no-op. Returns the caller's remaining locked balance.
    pub fn reduce<L: BalanceLedger + ?Sized>(
        &mut self,
        ledger: &L,
        escrow: &Address,
        caller: &Address,
        amount: TokenAmount,
        lock: Option<ProposalId>,
    ) -> Result<TokenAmount, GovernanceError> {
        let available = self.balance_of(caller);
        let remaining =
            available
                .checked_sub(amount)
                .ok_or(GovernanceError::InsufficientBalance {
                    requested: amount,
                    available,
                })?;
        if let Some(id) = lock {
            return Err(GovernanceError::BalanceLocked(id));
        }
        if amount.is_zero() {
            return Ok(available);
        }
        ledger.transfer(escrow, caller, amount)?;
        if remaining.is_zero() {
            self.balances.remove(caller);
        } else {
            self.balances.insert(caller.clone(), remaining);
        }
        Ok(remaining)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quorum_nullables::NullLedger;

    fn test_address(name: &str) -> Address {
        Address::new(name)
    }

    fn funded_ledger(voter: &Address, amount: u128) -> NullLedger {
        let ledger = NullLedger::new();
        ledger.credit(voter, TokenAmount::new(amount));
        ledger
    }

    #[test]
    fn top_up_moves_funds_into_escrow() {
        let alice = test_address("alice");
        let escrow = test_address("dao");
        let ledger = funded_ledger(&alice, 1000);
        let mut custody = Custody::new();

        let balance = custody
            .top_up(&ledger, &escrow, &alice, TokenAmount::new(250))
            .unwrap();
        assert_eq!(balance, TokenAmount::new(250));
        assert_eq!(custody.balance_of(&alice), TokenAmount::new(250));
        assert_eq!(ledger.balance_of(&alice), TokenAmount::new(750));
        assert_eq!(ledger.balance_of(&escrow), TokenAmount::new(250));
    }

    #[test]
    fn zero_top_up_is_invalid() {
        let alice = test_address("alice");
        let ledger = funded_ledger(&alice, 1000);
        let mut custody = Custody::new();
        let err = custody
            .top_up(&ledger, &test_address("dao"), &alice, TokenAmount::ZERO)
            .unwrap_err();
        assert_eq!(err, GovernanceError::InvalidAmount);
    }

    #[test]
    fn refused_top_up_leaves_no_trace() {
        let alice = test_address("alice");
        let ledger = funded_ledger(&alice, 100);
        let mut custody = Custody::new();
        let err = custody
            .top_up(&ledger, &test_address("dao"), &alice, TokenAmount::new(500))
            .unwrap_err();
        assert!(matches!(err, GovernanceError::Ledger(_)));
        assert_eq!(custody.balance_of(&alice), TokenAmount::ZERO);
        assert_eq!(ledger.balance_of(&alice), TokenAmount::new(100));
    }

    #[test]
    fn reduce_checks_balance_before_lock() {
        let alice = test_address("alice");
        let escrow = test_address("dao");
        let ledger = funded_ledger(&alice, 1000);
        let mut custody = Custody::new();
        custody
            .top_up(&ledger, &escrow, &alice, TokenAmount::new(250))
            .unwrap();

        let lock = Some(ProposalId::new(1));
        let err = custody
            .reduce(&ledger, &escrow, &alice, TokenAmount::new(350), lock)
            .unwrap_err();
        assert_eq!(
            err,
            GovernanceError::InsufficientBalance {
                requested: TokenAmount::new(350),
                available: TokenAmount::new(250),
            }
        );

        let err = custody
            .reduce(&ledger, &escrow, &alice, TokenAmount::new(150), lock)
            .unwrap_err();
        assert_eq!(err, GovernanceError::BalanceLocked(ProposalId::new(1)));
        assert_eq!(custody.balance_of(&alice), TokenAmount::new(250));
    }

    #[test]
    fn reduce_returns_funds() {
        let alice = test_address("alice");
        let escrow = test_address("dao");
        let ledger = funded_ledger(&alice, 1000);
        let mut custody = Custody::new();
        custody
            .top_up(&ledger, &escrow, &alice, TokenAmount::new(250))
            .unwrap();

        let left = custody
            .reduce(&ledger, &escrow, &alice, TokenAmount::new(100), None)
            .unwrap();
        assert_eq!(left, TokenAmount::new(150));
        custody
            .reduce(&ledger, &escrow, &alice, TokenAmount::new(150), None)
            .unwrap();
        assert_eq!(custody.balance_of(&alice), TokenAmount::ZERO);
        assert_eq!(custody.holder_count(), 0);
        assert_eq!(ledger.balance_of(&alice), TokenAmount::new(1000));
    }

    #[test]
    fn refused_withdrawal_keeps_lock_balance() {
        let alice = test_address("alice");
        let escrow = test_address("dao");
        let ledger = funded_ledger(&alice, 1000);
        let mut custody = Custody::new();
        custody
            .top_up(&ledger, &escrow, &alice, TokenAmount::new(250))
            .unwrap();

        ledger.refuse_transfers(true);
        let err = custody
            .reduce(&ledger, &escrow, &alice, TokenAmount::new(100), None)
            .unwrap_err();
        assert!(matches!(err, GovernanceError::Ledger(_)));
        assert_eq!(custody.balance_of(&alice), TokenAmount::new(250));
    }
}
