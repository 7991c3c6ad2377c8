//! # Scan Configuration
//!
//! Settings that shape planning without changing what a scan reads. Every field has a
//! default, so a partial JSON document (or none at all) is a valid configuration.
//!
//! One document carries settings for two readers. `ScanPlan::with_config` consumes
//! `metadata_policy` only, for plan identity. Backend settings such as
//! `streams_per_batch` take effect only when the same config is handed to the backend
//! (`InMemoryReaderContext::with_config`); the plan never forwards them, since the
//! context is built before the plan wraps it.

use crate::error::{Result, ScanError};
use crate::schema::MetadataPolicy;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Field metadata disregarded when comparing read schemas for plan identity.
    /// Read by `ScanPlan`.
    pub metadata_policy: MetadataPolicy,
    /// Number of read streams grouped into one batch-mode partition by the in-memory
    /// reader context. Must be at least 1. Ignored by `ScanPlan`.
    pub streams_per_batch: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            metadata_policy: MetadataPolicy::default(),
            streams_per_batch: 1,
        }
    }
}

impl ScanConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: ScanConfig =
            serde_json::from_str(json).map_err(|e| ScanError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.streams_per_batch == 0 {
            return Err(ScanError::Config(
                "streams_per_batch must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
