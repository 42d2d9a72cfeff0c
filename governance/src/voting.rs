//! Weighted voting and per-voter vote locks.
//!
//! Each voter holds at most one lock: the open proposal their stake is
//! committed to. The lock blocks withdrawal and further votes until that
//! proposal is finished, at which point [`VotingBook::release`] clears it.

use std::collections::HashMap;

use quorum_types::{Address, ProposalId, Timestamp, TokenAmount};
use serde::{Deserialize, Serialize};

use crate::error::GovernanceError;
use crate::proposal::Proposal;

/// Vote locks and the roll of voters per proposal.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct VotingBook {
    /// voter → proposal their stake is committed to.
    locks: HashMap<Address, ProposalId>,
    /// proposal → voters, in voting order.
    rolls: HashMap<ProposalId, Vec<Address>>,
}

impl VotingBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// The proposal `voter` currently has a vote locked against.
    pub fn lock_of(&self, voter: &Address) -> Option<ProposalId> {
        self.locks.get(voter).copied()
    }

    pub fn is_voting(&self, voter: &Address) -> bool {
        self.locks.contains_key(voter)
    }

    /// Voters who have voted on `id` and not yet been released.
    pub fn voters(&self, id: ProposalId) -> &[Address] {
        self.rolls.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Record a vote of `weight` by `voter` on `proposal`.
    ///
    /// Rejections, in order: finished proposal, closed window, zero weight,
    /// repeat vote on the same proposal, outstanding lock on another proposal.
    pub fn cast(
        &mut self,
        proposal: &mut Proposal,
        voter: &Address,
        weight: TokenAmount,
        support: bool,
        now: Timestamp,
        voting_duration_secs: u64,
    ) -> Result<(), GovernanceError> {
        let id = proposal.id;
        if proposal.finished {
            return Err(GovernanceError::NotFound(id));
        }
        if proposal.created_at.has_expired(voting_duration_secs, now) {
            return Err(GovernanceError::VotingClosed(id));
        }
        if weight.is_zero() {
            return Err(GovernanceError::NoVotingPower);
        }
        match self.lock_of(voter) {
            Some(locked) if locked == id => return Err(GovernanceError::AlreadyVoted(id)),
            Some(locked) => return Err(GovernanceError::BalanceLocked(locked)),
            None => {}
        }

        let tally = if support {
            &mut proposal.votes_for
        } else {
            &mut proposal.votes_against
        };
        *tally = tally.checked_add(weight).ok_or(GovernanceError::Overflow)?;

        self.locks.insert(voter.clone(), id);
        self.rolls.entry(id).or_default().push(voter.clone());
        Ok(())
    }

    /// Clear the lock of every voter on `id`. Returns the released voters.
    pub fn release(&mut self, id: ProposalId) -> Vec<Address> {
        let voters = self.rolls.remove(&id).unwrap_or_default();
        for voter in &voters {
            if self.locks.get(voter) == Some(&id) {
                self.locks.remove(voter);
            }
        }
        voters
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proposal::ProposalStore;

    const DURATION: u64 = 300;

    fn test_address(n: u8) -> Address {
        Address::new(format!("voter_{n}"))
    }

    fn store_with(n: usize) -> ProposalStore {
        let mut store = ProposalStore::new();
        for i in 0..n {
            store
                .add(Address::new("token"), vec![], format!("p{i}"), Timestamp::new(1000))
                .unwrap();
        }
        store
    }

    fn cast(
        book: &mut VotingBook,
        store: &mut ProposalStore,
        id: u64,
        voter: u8,
        weight: u128,
        support: bool,
    ) -> Result<(), GovernanceError> {
        let proposal = store.get_mut(ProposalId::new(id)).unwrap();
        book.cast(
            proposal,
            &test_address(voter),
            TokenAmount::new(weight),
            support,
            Timestamp::new(1100),
            DURATION,
        )
    }

    #[test]
    fn votes_add_weight_to_the_chosen_side() {
        let mut store = store_with(1);
        let mut book = VotingBook::new();
        cast(&mut book, &mut store, 1, 1, 150, true).unwrap();
        cast(&mut book, &mut store, 1, 2, 250, false).unwrap();

        let p = store.get(ProposalId::new(1)).unwrap();
        assert_eq!(p.votes_for, TokenAmount::new(150));
        assert_eq!(p.votes_against, TokenAmount::new(250));
        assert_eq!(book.voters(ProposalId::new(1)).len(), 2);
        assert!(book.is_voting(&test_address(1)));
        assert!(!book.is_voting(&test_address(3)));
    }

    #[test]
    fn zero_weight_cannot_vote() {
        let mut store = store_with(1);
        let mut book = VotingBook::new();
        let err = cast(&mut book, &mut store, 1, 1, 0, true).unwrap_err();
        assert_eq!(err, GovernanceError::NoVotingPower);
        assert!(!book.is_voting(&test_address(1)));
    }

    #[test]
    fn second_vote_on_same_proposal_is_rejected() {
        let mut store = store_with(1);
        let mut book = VotingBook::new();
        cast(&mut book, &mut store, 1, 1, 100, true).unwrap();
        let err = cast(&mut book, &mut store, 1, 1, 100, false).unwrap_err();
        assert_eq!(err, GovernanceError::AlreadyVoted(ProposalId::new(1)));
        let p = store.get(ProposalId::new(1)).unwrap();
        assert_eq!(p.votes_for, TokenAmount::new(100));
        assert_eq!(p.votes_against, TokenAmount::ZERO);
    }

    #[test]
    fn one_outstanding_lock_per_voter() {
        let mut store = store_with(2);
        let mut book = VotingBook::new();
        cast(&mut book, &mut store, 1, 1, 100, true).unwrap();
        let err = cast(&mut book, &mut store, 2, 1, 100, true).unwrap_err();
        assert_eq!(err, GovernanceError::BalanceLocked(ProposalId::new(1)));

        book.release(ProposalId::new(1));
        cast(&mut book, &mut store, 2, 1, 100, true).unwrap();
        assert_eq!(book.lock_of(&test_address(1)), Some(ProposalId::new(2)));
    }

    #[test]
    fn window_closes_at_deadline() {
        let mut store = store_with(1);
        let mut book = VotingBook::new();
        let proposal = store.get_mut(ProposalId::new(1)).unwrap();
        let err = book
            .cast(
                proposal,
                &test_address(1),
                TokenAmount::new(10),
                true,
                Timestamp::new(1000 + DURATION),
                DURATION,
            )
            .unwrap_err();
        assert_eq!(err, GovernanceError::VotingClosed(ProposalId::new(1)));
    }

    #[test]
    fn finished_proposals_are_not_votable() {
        let mut store = store_with(1);
        store.get_mut(ProposalId::new(1)).unwrap().finished = true;
        let mut book = VotingBook::new();
        let err = cast(&mut book, &mut store, 1, 1, 10, true).unwrap_err();
        assert_eq!(err, GovernanceError::NotFound(ProposalId::new(1)));
    }

    #[test]
    fn release_clears_only_that_proposal() {
        let mut store = store_with(2);
        let mut book = VotingBook::new();
        cast(&mut book, &mut store, 1, 1, 10, true).unwrap();
        cast(&mut book, &mut store, 1, 2, 10, false).unwrap();
        cast(&mut book, &mut store, 2, 3, 10, true).unwrap();

        let released = book.release(ProposalId::new(1));
        assert_eq!(released, vec![test_address(1), test_address(2)]);
        assert!(!book.is_voting(&test_address(1)));
        assert!(!book.is_voting(&test_address(2)));
        assert_eq!(book.lock_of(&test_address(3)), Some(ProposalId::new(2)));
        assert!(book.voters(ProposalId::new(1)).is_empty());
    }
}
