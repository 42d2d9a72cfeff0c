//! Action dispatch: handing a passed proposal's payload to its target.
//!
//! The engine depends only on the [`ActionExecutor`] capability. The default
//! executor, [`ActionRouter`], forwards the opaque call data to whichever
//! [`CallTarget`] is registered at the proposal's recipient address.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use quorum_types::{ActionExecutor, Address, CallTarget, DispatchError, ProposalAction};

use crate::proposal::{Proposal, ProposalOutcome};

/// Registry of call targets by address.
#[derive(Clone, Default)]
pub struct ActionRouter {
    targets: HashMap<Address, Arc<dyn CallTarget>>,
}

impl ActionRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `target` at `address`, returning any target it replaces.
    pub fn register(
        &mut self,
        address: Address,
        target: Arc<dyn CallTarget>,
    ) -> Option<Arc<dyn CallTarget>> {
        self.targets.insert(address, target)
    }

    /// Builder form of [`ActionRouter::register`].
    pub fn with_target(mut self, address: Address, target: Arc<dyn CallTarget>) -> Self {
        self.register(address, target);
        self
    }

    pub fn is_registered(&self, address: &Address) -> bool {
        self.targets.contains_key(address)
    }
}

impl fmt::Debug for ActionRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionRouter")
            .field("targets", &self.targets.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ActionExecutor for ActionRouter {
    fn dispatch(&self, caller: &Address, action: &ProposalAction) -> Result<(), DispatchError> {
        let target = self
            .targets
            .get(&action.recipient)
            .ok_or_else(|| DispatchError::UnknownTarget(action.recipient.clone()))?;
        target.call(caller, &action.call_data)
    }
}

/// Dispatch a passed proposal's action and translate the result into the
/// outcome to record. Failures are logged and recorded, never propagated.
pub(crate) fn dispatch_proposal<E: ActionExecutor + ?Sized>(
    executor: &E,
    caller: &Address,
    proposal: &Proposal,
) -> ProposalOutcome {
    match executor.dispatch(caller, &proposal.action()) {
        Ok(()) => {
            tracing::info!(
                proposal = %proposal.id,
                recipient = %proposal.recipient,
                "proposal action dispatched"
            );
            ProposalOutcome::Executed
        }
        Err(e) => {
            tracing::warn!(
                proposal = %proposal.id,
                recipient = %proposal.recipient,
                error = %e,
                "proposal action failed; proposal stays finished"
            );
            ProposalOutcome::DispatchFailed {
                reason: e.to_string(),
            }
        }
    }
}
