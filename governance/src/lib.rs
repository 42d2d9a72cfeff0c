//! Token-weighted governance.
//!
//! Holders lock tokens into the engine's escrow to gain voting weight, the
//! administrator raises proposals carrying an opaque action, holders vote with
//! their whole locked balance, and once the voting window has elapsed anyone
//! may finish a proposal. A finished proposal that met quorum and has more
//! weight for than against has its action dispatched exactly once.
//!
//! Pipeline: custody → proposal store → voting → quorum gate → dispatch.
//!
//! Key invariant: a voter's stake is committed to at most one open proposal at
//! a time, and cannot be withdrawn until that proposal is finished.

pub mod config;
pub mod custody;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod proposal;
pub mod quorum;
pub mod shared;
pub mod voting;

pub use config::GovernanceConfig;
pub use custody::Custody;
pub use dispatch::ActionRouter;
pub use engine::GovernanceEngine;
pub use error::GovernanceError;
pub use proposal::{Proposal, ProposalOutcome, ProposalStore, RejectReason};
pub use quorum::{QuorumGate, Verdict};
pub use shared::SharedEngine;
pub use voting::VotingBook;
