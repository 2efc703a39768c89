//! Configuration loader for the hasher. Settings come from an optional JSON
//! file; the binary layers environment and flag overrides on top before the
//! values are validated into a `PasswordHasher`.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::crypto::encoded::Version;
use crate::crypto::passwords::{validate_cost, LongInputPolicy, PasswordHasher, DEFAULT_COST};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file unreadable: {0}")]
    Io(String),
    #[error("config parse failed: {0}")]
    Parse(String),
    #[error("invalid cost {0}; expected a value in 4..=31")]
    InvalidCost(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HasherConfig {
    /// Work factor; each step doubles hashing time.
    pub cost: u32,
    /// Version tag written into new hashes.
    pub version: Version,
    #[serde(rename = "longInput")]
    pub long_input: LongInputPolicy,
}

impl Default for HasherConfig {
    fn default() -> Self {
        Self {
            cost: DEFAULT_COST,
            version: Version::default(),
            long_input: LongInputPolicy::default(),
        }
    }
}

impl HasherConfig {
    pub fn with_cost(mut self, cost: u32) -> Self {
        self.cost = cost;
        self
    }

    pub fn with_long_input(mut self, policy: LongInputPolicy) -> Self {
        self.long_input = policy;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_cost(self.cost).map_err(|_| ConfigError::InvalidCost(self.cost))
    }

    /// Validates the settings and builds the hasher they describe.
    pub fn build_hasher(&self) -> Result<PasswordHasher, ConfigError> {
        let hasher = PasswordHasher::new(self.cost)
            .map_err(|_| ConfigError::InvalidCost(self.cost))?
            .with_version(self.version)
            .with_long_input(self.long_input);
        Ok(hasher)
    }
}

/// Loads a JSON configuration file. Missing fields fall back to defaults;
/// unknown fields are rejected so typos do not silently weaken the cost.
pub fn load_config(path: impl AsRef<Path>) -> Result<HasherConfig, ConfigError> {
    let raw_json = fs::read_to_string(&path).map_err(|e| ConfigError::Io(format!("{e}")))?;
    let config: HasherConfig =
        serde_json::from_str(&raw_json).map_err(|e| ConfigError::Parse(format!("{e}")))?;
    config.validate()?;
    Ok(config)
}
