use quorum_types::{Address, LedgerError, ProposalId, Timestamp, TokenAmount};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GovernanceError {
    #[error("{0} is not the administrator")]
    Unauthorized(Address),

    #[error("amount must be non-zero")]
    InvalidAmount,

    #[error("insufficient locked balance: requested {requested}, available {available}")]
    InsufficientBalance {
        requested: TokenAmount,
        available: TokenAmount,
    },

    #[error("balance is locked by an open vote on proposal {0}")]
    BalanceLocked(ProposalId),

    #[error("proposal {0} not found")]
    NotFound(ProposalId),

    #[error("no locked balance to vote with")]
    NoVotingPower,

    #[error("vote on proposal {0} has already been taken into account")]
    AlreadyVoted(ProposalId),

    #[error("voting on proposal {id} is still open until {ends_at}")]
    VotingInProgress { id: ProposalId, ends_at: Timestamp },

    #[error("voting window for proposal {0} has closed")]
    VotingClosed(ProposalId),

    #[error("proposal {0} is already finished")]
    AlreadyFinished(ProposalId),

    #[error("ledger refused the transfer: {0}")]
    Ledger(#[from] LedgerError),

    #[error("arithmetic overflow in governance accounting")]
    Overflow,

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("snapshot error: {0}")]
    Snapshot(String),
}
