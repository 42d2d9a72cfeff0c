//! Thread-safe handle over a [`GovernanceEngine`].
//!
//! Every call takes the engine lock for its whole duration, so operations from
//! different threads are applied one at a time and each sees the effects of
//! the ones before it.

use std::sync::{Arc, Mutex, MutexGuard};

use quorum_types::{ActionExecutor, Address, BalanceLedger, Clock, ProposalId, TokenAmount};

use crate::config::GovernanceConfig;
use crate::engine::GovernanceEngine;
use crate::error::GovernanceError;
use crate::proposal::{Proposal, ProposalOutcome};

pub struct SharedEngine<L, E, C> {
    inner: Arc<Mutex<GovernanceEngine<L, E, C>>>,
}

impl<L, E, C> Clone for SharedEngine<L, E, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<L, E, C> SharedEngine<L, E, C>
where
    L: BalanceLedger,
    E: ActionExecutor,
    C: Clock,
{
    pub fn new(engine: GovernanceEngine<L, E, C>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    // A panic in another caller cannot leave the engine half-updated: every
    // operation validates before mutating, so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, GovernanceEngine<L, E, C>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Run `f` with exclusive access to the engine.
    pub fn with<R>(&self, f: impl FnOnce(&mut GovernanceEngine<L, E, C>) -> R) -> R {
        f(&mut self.lock())
    }

    pub fn config(&self) -> GovernanceConfig {
        self.lock().config().clone()
    }

    pub fn top_up_balance(
        &self,
        caller: &Address,
        amount: TokenAmount,
    ) -> Result<TokenAmount, GovernanceError> {
        self.lock().top_up_balance(caller, amount)
    }

    pub fn reduce_balance(
        &self,
        caller: &Address,
        amount: TokenAmount,
    ) -> Result<TokenAmount, GovernanceError> {
        self.lock().reduce_balance(caller, amount)
    }

    pub fn add_proposal(
        &self,
        caller: &Address,
        recipient: Address,
        call_data: Vec<u8>,
        description: impl Into<String>,
    ) -> Result<ProposalId, GovernanceError> {
        self.lock()
            .add_proposal(caller, recipient, call_data, description)
    }

    pub fn vote(
        &self,
        caller: &Address,
        id: ProposalId,
        support: bool,
    ) -> Result<TokenAmount, GovernanceError> {
        self.lock().vote(caller, id, support)
    }

    pub fn finish_proposal(
        &self,
        caller: &Address,
        id: ProposalId,
    ) -> Result<ProposalOutcome, GovernanceError> {
        self.lock().finish_proposal(caller, id)
    }

    pub fn get_proposal(&self, id: ProposalId) -> Result<Proposal, GovernanceError> {
        self.lock().get_proposal(id).cloned()
    }

    pub fn get_proposal_count(&self) -> u64 {
        self.lock().get_proposal_count()
    }

    pub fn get_user_balance(&self, user: &Address) -> TokenAmount {
        self.lock().get_user_balance(user)
    }

    pub fn is_user_voting(&self, user: &Address) -> bool {
        self.lock().is_user_voting(user)
    }

    pub fn snapshot(&self) -> Result<Vec<u8>, GovernanceError> {
        self.lock().snapshot()
    }
}
