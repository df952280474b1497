//! YAML configuration file.
//!
//! ```yaml
//! detector:
//!   confidence_threshold: 0.15
//!   inference_size: 512
//!   target_class: 0
//! tracker:
//!   speed_limit: 300.0
//!   max_gap: 5
//!   selection: rank_zero   # or {nearest_to_last: {top_k: 3}}
//! ```
//!
//! Every field is optional and falls back to its default.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::integration::DetectorConfig;
use crate::tracker::TrackerConfig;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub detector: DetectorConfig,
    pub tracker: TrackerConfig,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    pub fn from_yaml(contents: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.detector.validate()?;
        self.tracker.validate()
    }
}
