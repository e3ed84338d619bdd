//! Defaults for sort and de-duplication, loaded from JSON.
//!
//! ```json
//! { "sort": { "descending": false, "nulls_last": true },
//!   "unique": { "keep": "last" },
//!   "head_rows": 20 }
//! ```
//!
//! Every field is optional.

use crate::error::Result;
use polars::prelude::{SortMultipleOptions, UniqueKeepStrategy};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "KEYFRAME_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    pub sort: SortConfig,
    pub unique: UniqueConfig,
    /// Rows shown by `head`/`tail` when no count is given.
    pub head_rows: usize,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            sort: SortConfig::default(),
            unique: UniqueConfig::default(),
            head_rows: 10,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SortConfig {
    pub descending: bool,
    pub nulls_last: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UniqueConfig {
    pub keep: KeepStrategy,
}

/// Which of a group of duplicate rows survives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeepStrategy {
    #[default]
    First,
    Last,
    Any,
}

impl FrameConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_json(&content)?;
        debug!("Loaded frame config from {}", path.display());
        Ok(config)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Load the file named by `KEYFRAME_CONFIG`, or the defaults when unset.
    pub fn from_env() -> Result<Self> {
        match std::env::var(CONFIG_ENV) {
            Ok(path) => Self::load(path),
            Err(_) => Ok(Self::default()),
        }
    }

    pub fn sort_options(&self) -> SortMultipleOptions {
        SortMultipleOptions::default()
            .with_order_descending(self.sort.descending)
            .with_nulls_last(self.sort.nulls_last)
    }

    pub fn keep_strategy(&self) -> UniqueKeepStrategy {
        match self.unique.keep {
            KeepStrategy::First => UniqueKeepStrategy::First,
            KeepStrategy::Last => UniqueKeepStrategy::Last,
            KeepStrategy::Any => UniqueKeepStrategy::Any,
        }
    }
}
