// ⚙️ Validator Configuration - user-editable tables
// Networks and test numbers live in JSON so they can change without code changes

use anyhow::{Context as AnyhowContext, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::networks::{NetworkPattern, NetworkTable};
use crate::test_numbers::TestNumberSet;

/// Environment variable consulted by the CLI when no `--config` is given
pub const CONFIG_ENV_VAR: &str = "CARD_VALIDATION_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorConfig {
    /// Network patterns, in match order
    pub networks: Vec<NetworkPattern>,

    /// Numbers that never validate
    #[serde(default)]
    pub test_numbers: Vec<String>,
}

impl ValidatorConfig {
    /// The reference tables shipped with the library
    pub fn reference() -> Self {
        ValidatorConfig {
            networks: NetworkTable::reference().patterns().to_vec(),
            test_numbers: TestNumberSet::reference().iter().map(str::to_string).collect(),
        }
    }

    /// Load configuration from JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        ValidatorConfig::from_json(&content)
            .with_context(|| format!("Invalid config file: {:?}", path.as_ref()))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse validator config JSON")
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize validator config")
    }

    /// Check the tables and build them
    pub fn into_tables(self) -> Result<(NetworkTable, TestNumberSet)> {
        let networks = NetworkTable::from_patterns(self.networks)?;
        let test_numbers = TestNumberSet::from_numbers(&self.test_numbers)?;
        Ok((networks, test_numbers))
    }
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self::reference()
    }
}
