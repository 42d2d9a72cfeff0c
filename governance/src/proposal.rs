//! Governance proposals and the append-only proposal store.

use quorum_types::{Address, ProposalAction, ProposalId, Timestamp, TokenAmount};
use serde::{Deserialize, Serialize};

use crate::error::GovernanceError;

/// Why a finished proposal was not enacted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    /// Participation fell short of the quorum.
    QuorumNotMet {
        total_votes: TokenAmount,
        required_votes: TokenAmount,
    },
    /// Quorum was met but weight for did not exceed weight against.
    NoMajority,
}

/// What happened to a proposal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProposalOutcome {
    /// Not finished yet.
    Pending,
    /// Passed and the action was dispatched successfully.
    Executed,
    /// Passed, but the target rejected the action. The proposal stays finished.
    DispatchFailed { reason: String },
    /// Finished without dispatch.
    Rejected(RejectReason),
}

impl ProposalOutcome {
    /// Whether the vote itself passed (regardless of dispatch success).
    pub fn passed(&self) -> bool {
        matches!(self, Self::Executed | Self::DispatchFailed { .. })
    }
}

/// A governance proposal.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Proposal {
    pub id: ProposalId,
    pub votes_for: TokenAmount,
    pub votes_against: TokenAmount,
    pub finished: bool,
    pub created_at: Timestamp,
    /// Target of the action.
    pub recipient: Address,
    /// Opaque encoded action.
    pub call_data: Vec<u8>,
    pub description: String,
    pub outcome: ProposalOutcome,
}

impl Proposal {
    /// First instant at which the proposal may be finished.
    pub fn deadline(&self, voting_duration_secs: u64) -> Timestamp {
        self.created_at.plus_secs(voting_duration_secs)
    }

    /// The action dispatched if this proposal passes.
    pub fn action(&self) -> ProposalAction {
        ProposalAction {
            recipient: self.recipient.clone(),
            call_data: self.call_data.clone(),
        }
    }
}

/// Append-only arena of proposals, indexed by id.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ProposalStore {
    proposals: Vec<Proposal>,
}

impl ProposalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new open proposal and return its id.
    pub fn add(
        &mut self,
        recipient: Address,
        call_data: Vec<u8>,
        description: String,
        now: Timestamp,
    ) -> Result<ProposalId, GovernanceError> {
        let id = match self.proposals.last() {
            Some(last) => last.id.next().ok_or(GovernanceError::Overflow)?,
            None => ProposalId::FIRST,
        };
        self.proposals.push(Proposal {
            id,
            votes_for: TokenAmount::ZERO,
            votes_against: TokenAmount::ZERO,
            finished: false,
            created_at: now,
            recipient,
            call_data,
            description,
            outcome: ProposalOutcome::Pending,
        });
        Ok(id)
    }

    pub fn get(&self, id: ProposalId) -> Result<&Proposal, GovernanceError> {
        id.index()
            .and_then(|i| self.proposals.get(i))
            .ok_or(GovernanceError::NotFound(id))
    }

    pub(crate) fn get_mut(&mut self, id: ProposalId) -> Result<&mut Proposal, GovernanceError> {
        id.index()
            .and_then(|i| self.proposals.get_mut(i))
            .ok_or(GovernanceError::NotFound(id))
    }

    /// Number of proposals ever created.
    pub fn count(&self) -> u64 {
        self.proposals.len() as u64
    }

    pub fn iter(&self) -> impl Iterator<Item = &Proposal> {
        self.proposals.iter()
    }

    /// Proposals that have not been finished.
    pub fn open(&self) -> impl Iterator<Item = &Proposal> {
        self.proposals.iter().filter(|p| !p.finished)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add(store: &mut ProposalStore, description: &str) -> ProposalId {
        store
            .add(
                Address::new("token"),
                vec![1, 2, 3],
                description.to_string(),
                Timestamp::new(1000),
            )
            .unwrap()
    }

    #[test]
    fn ids_start_at_one_and_increase() {
        let mut store = ProposalStore::new();
        assert_eq!(add(&mut store, "first"), ProposalId::new(1));
        assert_eq!(add(&mut store, "second"), ProposalId::new(2));
        assert_eq!(store.count(), 2);
        assert_eq!(store.get(ProposalId::new(2)).unwrap().description, "second");
    }

    #[test]
    fn new_proposal_is_open_with_zero_tallies() {
        let mut store = ProposalStore::new();
        let id = add(&mut store, "mint");
        let p = store.get(id).unwrap();
        assert!(!p.finished);
        assert_eq!(p.votes_for, TokenAmount::ZERO);
        assert_eq!(p.votes_against, TokenAmount::ZERO);
        assert_eq!(p.created_at, Timestamp::new(1000));
        assert_eq!(p.outcome, ProposalOutcome::Pending);
        assert_eq!(p.deadline(300), Timestamp::new(1300));
        assert_eq!(store.open().count(), 1);
    }

    #[test]
    fn unknown_ids_are_not_found() {
        let mut store = ProposalStore::new();
        add(&mut store, "only");
        for raw in [0u64, 2, u64::MAX] {
            let id = ProposalId::new(raw);
            assert_eq!(store.get(id).unwrap_err(), GovernanceError::NotFound(id));
        }
    }
}
