//! In-memory fungible token ledger.
//!
//! Implements the [`BalanceLedger`](quorum_types::BalanceLedger) capability the
//! governance engine consumes, plus the owner/minter roles and the allowance
//! model (`approve` / `transfer_from`) of a standard fungible token.
//!
//! The ledger is also a [`CallTarget`](quorum_types::CallTarget): passed
//! proposals can dispatch a bincode-encoded [`LedgerCall`] to it, which is how
//! governance mints new supply.

pub mod call;
pub mod token;

pub use call::LedgerCall;
pub use token::TokenLedger;
