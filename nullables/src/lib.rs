//! Nullable infrastructure for deterministic testing.
//!
//! The engine reaches the outside world only through the capability traits in
//! `quorum-types` (clock, balance ledger, action executor). This crate
//! provides implementations of those traits that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Record what was asked of them for later assertions
//!
//! Usage: swap real implementations for nullables in tests and simulations.

pub mod clock;
pub mod executor;
pub mod ledger;

pub use clock::NullClock;
pub use executor::{DispatchRecord, RecordingExecutor};
pub use ledger::NullLedger;
