// src/config.rs

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::engine_lib::catalog::JointConstraintSpec;
use crate::error::Result;
use crate::placement::PlacementConfig;

/// Everything a run needs, as one serializable value.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    /// Seeds the run's random stream; each iteration derives its own seed from it.
    pub seed: u64,
    /// Object categories handed to the host pool; the slot index picks one.
    pub categories: Vec<String>,
    pub placement: PlacementConfig,
    pub constraints: Vec<JointConstraintSpec>,
}

impl ScenarioConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
