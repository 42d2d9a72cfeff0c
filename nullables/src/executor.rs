//! Nullable action executor: records dispatches, optionally fails them.

use std::sync::Mutex;

use quorum_types::{ActionExecutor, Address, DispatchError, ProposalAction};

/// One call observed by a [`RecordingExecutor`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DispatchRecord {
    pub caller: Address,
    pub action: ProposalAction,
}

/// An executor that remembers every dispatch it receives.
///
/// Built with [`RecordingExecutor::failing`] it records the call and then
/// reports a revert, simulating a target that rejects the action.
#[derive(Debug, Default)]
pub struct RecordingExecutor {
    calls: Mutex<Vec<DispatchRecord>>,
    failure: Option<String>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// An executor whose every dispatch reverts with `reason`.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failure: Some(reason.into()),
        }
    }

    /// Every dispatch seen so far, in order.
    pub fn calls(&self) -> Vec<DispatchRecord> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl ActionExecutor for RecordingExecutor {
    fn dispatch(&self, caller: &Address, action: &ProposalAction) -> Result<(), DispatchError> {
        self.calls.lock().unwrap().push(DispatchRecord {
            caller: caller.clone(),
            action: action.clone(),
        });
        match &self.failure {
            Some(reason) => Err(DispatchError::Reverted(reason.clone())),
            None => Ok(()),
        }
    }
}
