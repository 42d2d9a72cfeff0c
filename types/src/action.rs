//! Proposal actions and the capabilities that carry them out.
//!
//! A proposal stores an opaque payload addressed to a target. The engine never
//! interprets the payload; it hands it to an [`ActionExecutor`] once the
//! proposal passes and records whether dispatch succeeded.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::address::Address;

/// The action a proposal enacts if it passes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalAction {
    /// Target that receives the call.
    pub recipient: Address,
    /// Opaque encoded call.
    pub call_data: Vec<u8>,
}

/// Why a dispatched action did not take effect.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("no call target registered at {0}")]
    UnknownTarget(Address),

    #[error("malformed call data: {0}")]
    MalformedPayload(String),

    #[error("call reverted: {0}")]
    Reverted(String),
}

/// Executes proposal actions on behalf of the engine.
pub trait ActionExecutor {
    /// Dispatch `action`, with `caller` as the identity the target sees.
    fn dispatch(&self, caller: &Address, action: &ProposalAction) -> Result<(), DispatchError>;
}

/// Something that can be the recipient of a dispatched action.
pub trait CallTarget: Send + Sync {
    fn call(&self, caller: &Address, call_data: &[u8]) -> Result<(), DispatchError>;
}

impl<T: ActionExecutor + ?Sized> ActionExecutor for Arc<T> {
    fn dispatch(&self, caller: &Address, action: &ProposalAction) -> Result<(), DispatchError> {
        (**self).dispatch(caller, action)
    }
}
