//! Pipeline configuration and its durable YAML round-trip.
//!
//! A [`PipelineConfig`] is either fully populated (every required key present
//! and valid) or loading fails; no partially-filled config is ever handed to
//! the runner.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

/// Well-known config file name, resolved relative to the current directory.
pub const DEFAULT_CONFIG_PATH: &str = "pipeline_config.yaml";

/// Persisted pipeline settings.
///
/// Field names match the on-disk YAML keys; extra keys in the file are
/// ignored, missing keys fail deserialization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Source location to fetch. Must be non-empty.
    pub repository_url: String,

    /// Branch selector. May be empty; reserved for future stages, the
    /// current stage set does not consume it.
    pub branch_name: String,

    /// Command executed in the fetched working tree.
    pub test_script: String,
}

impl PipelineConfig {
    /// Check the semantic invariants that the schema alone cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.repository_url.trim().is_empty() {
            return Err(PipelineError::InvalidConfig(
                "repository_url must not be empty".to_string(),
            ));
        }
        if self.test_script.trim().is_empty() {
            return Err(PipelineError::InvalidConfig(
                "test_script must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Durable round-trip of [`PipelineConfig`] at a fixed path.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::at(DEFAULT_CONFIG_PATH)
    }
}

impl ConfigStore {
    /// Store backed by an explicit path.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The path this store reads and writes.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serialize `config` to YAML and write it, replacing any prior contents.
    ///
    /// Writes to a sibling temp file first and renames it into place, so a
    /// crash mid-write never leaves a truncated config behind.
    pub fn save(&self, config: &PipelineConfig) -> Result<()> {
        config.validate()?;

        let yaml = serde_yml::to_string(config).map_err(PipelineError::Serialization)?;

        let tmp_path = self.path.with_extension("yaml.tmp");
        fs::write(&tmp_path, yaml.as_bytes())?;
        fs::rename(&tmp_path, &self.path)?;

        Ok(())
    }

    /// Read and decode the config file.
    ///
    /// A missing or unreadable file is an I/O error; content that does not
    /// match the schema is a deserialization error.
    pub fn load(&self) -> Result<PipelineConfig> {
        let raw = fs::read_to_string(&self.path)?;
        let config: PipelineConfig =
            serde_yml::from_str(&raw).map_err(PipelineError::Deserialization)?;
        config.validate()?;
        Ok(config)
    }
}
