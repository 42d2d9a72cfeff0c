//! Quorum gate: decides whether a finished proposal is enacted.
//!
//! `required = ceil(total_supply × quorum_percent / 100)`, taken against the
//! ledger's supply at finish time rather than at creation, so the threshold
//! follows the present size of the electorate.

use quorum_types::TokenAmount;

use crate::error::GovernanceError;
use crate::proposal::RejectReason;

/// Result of evaluating a tally.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    Passed,
    Rejected(RejectReason),
}

#[derive(Clone, Copy, Debug)]
pub struct QuorumGate {
    quorum_percent: u8,
}

impl QuorumGate {
    pub fn new(quorum_percent: u8) -> Self {
        Self { quorum_percent }
    }

    /// Minimum participation (for + against) for a tally to count.
    pub fn required_votes(&self, total_supply: TokenAmount) -> Result<TokenAmount, GovernanceError> {
        total_supply
            .ceil_percent(self.quorum_percent)
            .ok_or(GovernanceError::Overflow)
    }

    /// Quorum first, then strict majority.
    pub fn evaluate(
        &self,
        votes_for: TokenAmount,
        votes_against: TokenAmount,
        total_supply: TokenAmount,
    ) -> Result<Verdict, GovernanceError> {
        let total_votes = votes_for
            .checked_add(votes_against)
            .ok_or(GovernanceError::Overflow)?;
        let required_votes = self.required_votes(total_supply)?;
        if total_votes < required_votes {
            return Ok(Verdict::Rejected(RejectReason::QuorumNotMet {
                total_votes,
                required_votes,
            }));
        }
        if votes_for <= votes_against {
            return Ok(Verdict::Rejected(RejectReason::NoMajority));
        }
        Ok(Verdict::Passed)
    }
}
