//! The governance engine: the public surface over custody, proposals,
//! voting, the quorum gate and dispatch.
//!
//! Every mutating operation takes `&mut self` and validates everything it can
//! before its first side effect, so a rejected call changes nothing. Use
//! [`SharedEngine`](crate::SharedEngine) to serialise calls from several
//! threads.

use quorum_types::{
    ActionExecutor, Address, BalanceLedger, Clock, ProposalId, TokenAmount,
};
use serde::{Deserialize, Serialize};

use crate::config::GovernanceConfig;
use crate::custody::Custody;
use crate::dispatch::dispatch_proposal;
use crate::error::GovernanceError;
use crate::proposal::{Proposal, ProposalOutcome, ProposalStore};
use crate::quorum::{QuorumGate, Verdict};
use crate::voting::VotingBook;

/// Token-weighted governance over a balance ledger `L`, dispatching passed
/// actions through `E`, with time read from `C`.
pub struct GovernanceEngine<L, E, C> {
    config: GovernanceConfig,
    gate: QuorumGate,
    ledger: L,
    executor: E,
    clock: C,
    custody: Custody,
    proposals: ProposalStore,
    voting: VotingBook,
}

/// Serialised engine state, excluding collaborators.
#[derive(Serialize, Deserialize)]
struct EngineSnapshot {
    config: GovernanceConfig,
    custody: Custody,
    proposals: ProposalStore,
    voting: VotingBook,
}

impl<L, E, C> GovernanceEngine<L, E, C>
where
    L: BalanceLedger,
    E: ActionExecutor,
    C: Clock,
{
    /// Build an engine with empty state. Fails if `config` is invalid.
    pub fn new(
        config: GovernanceConfig,
        ledger: L,
        executor: E,
        clock: C,
    ) -> Result<Self, GovernanceError> {
        config.validate()?;
        Ok(Self {
            gate: QuorumGate::new(config.quorum_percent),
            config,
            ledger,
            executor,
            clock,
            custody: Custody::new(),
            proposals: ProposalStore::new(),
            voting: VotingBook::new(),
        })
    }

    /// Rebuild an engine from [`GovernanceEngine::snapshot`] output.
    ///
    /// The ledger must be the one the snapshot was taken against; custody
    /// balances are trusted to be backed by the escrow's ledger balance.
    pub fn restore(
        snapshot: &[u8],
        ledger: L,
        executor: E,
        clock: C,
    ) -> Result<Self, GovernanceError> {
        let state: EngineSnapshot =
            bincode::deserialize(snapshot).map_err(|e| GovernanceError::Snapshot(e.to_string()))?;
        state.config.validate()?;
        tracing::info!(
            proposals = state.proposals.count(),
            holders = state.custody.holder_count(),
            "governance state restored"
        );
        Ok(Self {
            gate: QuorumGate::new(state.config.quorum_percent),
            config: state.config,
            ledger,
            executor,
            clock,
            custody: state.custody,
            proposals: state.proposals,
            voting: state.voting,
        })
    }

    /// Serialise configuration and all engine-owned state.
    pub fn snapshot(&self) -> Result<Vec<u8>, GovernanceError> {
        let state = EngineSnapshot {
            config: self.config.clone(),
            custody: self.custody.clone(),
            proposals: self.proposals.clone(),
            voting: self.voting.clone(),
        };
        bincode::serialize(&state).map_err(|e| GovernanceError::Snapshot(e.to_string()))
    }

    pub fn config(&self) -> &GovernanceConfig {
        &self.config
    }

    // ── Custody ────────────────────────────────────────────────────────

    /// Lock `amount` more of the caller's tokens. The caller must have
    /// approved the escrow to spend them. Returns the new locked balance.
    ///
    /// Allowed while the caller has a vote outstanding; the extra balance
    /// does not change weight already cast.
    pub fn top_up_balance(
        &mut self,
        caller: &Address,
        amount: TokenAmount,
    ) -> Result<TokenAmount, GovernanceError> {
        let balance = self
            .custody
            .top_up(&self.ledger, &self.config.escrow, caller, amount)?;
        tracing::debug!(%caller, %amount, %balance, "balance topped up");
        Ok(balance)
    }

    /// Withdraw `amount` of the caller's locked tokens. Refused while the
    /// caller has a vote on an unfinished proposal. Returns what remains.
    pub fn reduce_balance(
        &mut self,
        caller: &Address,
        amount: TokenAmount,
    ) -> Result<TokenAmount, GovernanceError> {
        let lock = self.voting.lock_of(caller);
        let balance =
            self.custody
                .reduce(&self.ledger, &self.config.escrow, caller, amount, lock)?;
        tracing::debug!(%caller, %amount, %balance, "balance reduced");
        Ok(balance)
    }

    pub fn get_user_balance(&self, user: &Address) -> TokenAmount {
        self.custody.balance_of(user)
    }

    /// Sum of every voter's locked balance.
    pub fn total_locked(&self) -> TokenAmount {
        self.custody.total_locked()
    }

    // ── Proposals ──────────────────────────────────────────────────────

    /// Raise a proposal. Administrator only.
    pub fn add_proposal(
        &mut self,
        caller: &Address,
        recipient: Address,
        call_data: Vec<u8>,
        description: impl Into<String>,
    ) -> Result<ProposalId, GovernanceError> {
        if *caller != self.config.administrator {
            return Err(GovernanceError::Unauthorized(caller.clone()));
        }
        let now = self.clock.now();
        let description = description.into();
        let id = self
            .proposals
            .add(recipient.clone(), call_data, description.clone(), now)?;
        tracing::info!(
            proposal = %id,
            %recipient,
            %description,
            ends_at = %now.plus_secs(self.config.voting_duration_secs),
            "proposal created"
        );
        Ok(id)
    }

    pub fn get_proposal(&self, id: ProposalId) -> Result<&Proposal, GovernanceError> {
        self.proposals.get(id)
    }

    pub fn get_proposal_count(&self) -> u64 {
        self.proposals.count()
    }

    pub fn proposals(&self) -> impl Iterator<Item = &Proposal> {
        self.proposals.iter()
    }

    pub fn open_proposals(&self) -> impl Iterator<Item = &Proposal> {
        self.proposals.open()
    }

    // ── Voting ─────────────────────────────────────────────────────────

    /// Vote with the caller's entire locked balance. Returns the weight cast.
    pub fn vote(
        &mut self,
        caller: &Address,
        id: ProposalId,
        support: bool,
    ) -> Result<TokenAmount, GovernanceError> {
        let weight = self.custody.balance_of(caller);
        let now = self.clock.now();
        let proposal = self.proposals.get_mut(id)?;
        self.voting.cast(
            proposal,
            caller,
            weight,
            support,
            now,
            self.config.voting_duration_secs,
        )?;
        tracing::info!(proposal = %id, voter = %caller, %weight, support, "vote cast");
        Ok(weight)
    }

    pub fn is_user_voting(&self, user: &Address) -> bool {
        self.voting.is_voting(user)
    }

    /// The proposal `user` currently has a vote locked against.
    pub fn voting_proposal_of(&self, user: &Address) -> Option<ProposalId> {
        self.voting.lock_of(user)
    }

    // ── Finalization ───────────────────────────────────────────────────

    /// Finish a proposal whose voting window has elapsed. Anyone may call.
    ///
    /// Marks it finished, releases every voter's lock on it and, if it met
    /// quorum against the ledger's current supply with more weight for than
    /// against, dispatches its action. A failed dispatch is recorded in the
    /// outcome and does not fail the call.
    pub fn finish_proposal(
        &mut self,
        caller: &Address,
        id: ProposalId,
    ) -> Result<ProposalOutcome, GovernanceError> {
        let now = self.clock.now();
        let proposal = self.proposals.get(id)?;
        if proposal.finished {
            return Err(GovernanceError::AlreadyFinished(id));
        }
        let ends_at = proposal.deadline(self.config.voting_duration_secs);
        if now < ends_at {
            return Err(GovernanceError::VotingInProgress { id, ends_at });
        }

        let total_supply = self.ledger.total_supply();
        let verdict = self
            .gate
            .evaluate(proposal.votes_for, proposal.votes_against, total_supply)?;

        let proposal = self.proposals.get_mut(id)?;
        proposal.finished = true;
        let released = self.voting.release(id);

        let outcome = match verdict {
            Verdict::Passed => dispatch_proposal(&self.executor, &self.config.escrow, proposal),
            Verdict::Rejected(reason) => ProposalOutcome::Rejected(reason),
        };
        proposal.outcome = outcome.clone();

        tracing::info!(
            proposal = %id,
            %caller,
            votes_for = %proposal.votes_for,
            votes_against = %proposal.votes_against,
            %total_supply,
            released = released.len(),
            outcome = ?outcome,
            "proposal finished"
        );
        Ok(outcome)
    }
}
