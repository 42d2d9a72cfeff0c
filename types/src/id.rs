//! Proposal identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a governance proposal.
///
/// Identifiers are 1-based and allocated in creation order; they are never
/// reused. `ProposalId(0)` never names a proposal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProposalId(u64);

impl ProposalId {
    /// The first identifier handed out.
    pub const FIRST: Self = Self(1);

    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }

    /// Zero-based position of this proposal in creation order, if any.
    pub fn index(&self) -> Option<usize> {
        self.0.checked_sub(1).and_then(|i| usize::try_from(i).ok())
    }

    /// The identifier allocated after this one.
    pub fn next(&self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl fmt::Display for ProposalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for ProposalId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}
