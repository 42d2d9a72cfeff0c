//! Encoded calls accepted by the token ledger as a dispatch target.

use quorum_types::{Address, DispatchError, TokenAmount};
use serde::{Deserialize, Serialize};

/// A call a governance proposal can make on the token ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerCall {
    /// Create `amount` new tokens for `to`. The dispatching caller must hold
    /// the mint role.
    Mint { to: Address, amount: TokenAmount },
}

impl LedgerCall {
    /// Encode this call as proposal call data.
    pub fn encode(&self) -> Vec<u8> {
        // Plain enum of owned data; bincode cannot fail on it.
        bincode::serialize(self).unwrap_or_default()
    }

    /// Decode call data produced by [`LedgerCall::encode`].
    pub fn decode(bytes: &[u8]) -> Result<Self, DispatchError> {
        bincode::deserialize(bytes).map_err(|e| DispatchError::MalformedPayload(e.to_string()))
    }
}
