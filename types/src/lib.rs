//! Fundamental types for the Quorum governance engine.
//!
//! This crate defines the types shared across every other crate in the workspace
//! (addresses, amounts, timestamps, proposal identifiers) together with the
//! capability traits the engine consumes: the balance ledger, the action
//! executor and the clock. Implementations live elsewhere; the engine depends
//! only on the traits.

pub mod action;
pub mod address;
pub mod amount;
pub mod error;
pub mod id;
pub mod ledger;
pub mod time;

pub use action::{ActionExecutor, CallTarget, DispatchError, ProposalAction};
pub use address::Address;
pub use amount::TokenAmount;
pub use error::TypesError;
pub use id::ProposalId;
pub use ledger::{BalanceLedger, LedgerError};
pub use time::{Clock, SystemClock, Timestamp};
