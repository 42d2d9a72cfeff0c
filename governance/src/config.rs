//! Engine configuration with TOML file support.

use quorum_types::Address;
use serde::{Deserialize, Serialize};

use crate::GovernanceError;

/// Construction parameters of a governance engine. Immutable once the engine
/// is built.
///
/// Can be loaded from a TOML file via [`GovernanceConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernanceConfig {
    /// The only account allowed to raise proposals.
    pub administrator: Address,

    /// The engine's own account on the ledger: holds deposited stake and is
    /// the caller identity of dispatched actions.
    pub escrow: Address,

    /// Participation required for an outcome to be enacted, as a percentage
    /// (1–100) of the ledger's current total supply.
    #[serde(default = "default_quorum_percent")]
    pub quorum_percent: u8,

    /// Length of the voting window, measured from proposal creation.
    #[serde(default = "default_voting_duration_secs")]
    pub voting_duration_secs: u64,
}

fn default_quorum_percent() -> u8 {
    50
}

fn default_voting_duration_secs() -> u64 {
    300
}

impl GovernanceConfig {
    /// Build and validate a configuration.
    pub fn new(
        administrator: Address,
        escrow: Address,
        quorum_percent: u8,
        voting_duration_secs: u64,
    ) -> Result<Self, GovernanceError> {
        let config = Self {
            administrator,
            escrow,
            quorum_percent,
            voting_duration_secs,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the invariants the engine relies on.
    pub fn validate(&self) -> Result<(), GovernanceError> {
        if !(1..=100).contains(&self.quorum_percent) {
            return Err(GovernanceError::Config(format!(
                "quorum_percent must be within 1..=100, got {}",
                self.quorum_percent
            )));
        }
        if !self.administrator.is_valid() {
            return Err(GovernanceError::Config(format!(
                "invalid administrator address {:?}",
                self.administrator.as_str()
            )));
        }
        if !self.escrow.is_valid() {
            return Err(GovernanceError::Config(format!(
                "invalid escrow address {:?}",
                self.escrow.as_str()
            )));
        }
        Ok(())
    }

    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<std::path::Path>) -> Result<Self, GovernanceError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| GovernanceError::Config(format!("{}: {e}", path.as_ref().display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, GovernanceError> {
        let config: Self = toml::from_str(s).map_err(|e| GovernanceError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, GovernanceError> {
        toml::to_string_pretty(self).map_err(|e| GovernanceError::Config(e.to_string()))
    }
}
