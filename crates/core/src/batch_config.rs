// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! YAML batch configuration for `sync-deploy`.
//!
//! The file is a sequence of entries:
//!
//! ```yaml
//! - task: db-migrate
//!   image: app:2
//!   cluster: prod
//! - task: web
//!   image: app:2
//!   cluster: prod
//!   service: web
//! ```
//!
//! Every entry is validated before any target is returned, so a bad entry
//! never lets earlier ones run.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::image::{ImageRefError, ImageReference};
use crate::target::RolloutTarget;

/// Errors from loading a batch configuration
#[derive(Debug, Error)]
pub enum BatchConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid batch config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("batch config declares no targets")]
    Empty,

    #[error("entry {}: cluster is required", .index + 1)]
    MissingCluster { index: usize },

    #[error("entry {}: task is required", .index + 1)]
    MissingTask { index: usize },

    #[error("entry {}: {source}", .index + 1)]
    InvalidImage {
        index: usize,
        #[source]
        source: ImageRefError,
    },
}

/// One raw entry as written in the file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BatchEntry {
    #[serde(default)]
    pub task: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub cluster: String,
    #[serde(default)]
    pub service: Option<String>,
}

impl BatchEntry {
    fn into_target(self, index: usize) -> Result<RolloutTarget, BatchConfigError> {
        if self.cluster.trim().is_empty() {
            return Err(BatchConfigError::MissingCluster { index });
        }
        if self.task.trim().is_empty() {
            return Err(BatchConfigError::MissingTask { index });
        }
        let image: ImageReference = self
            .image
            .parse()
            .map_err(|source| BatchConfigError::InvalidImage { index, source })?;
        // An empty service is the same as no service
        let service = self.service.filter(|s| !s.trim().is_empty());
        Ok(RolloutTarget { task_family: self.task, image, cluster: self.cluster, service })
    }
}

/// Parse and validate a batch configuration, preserving declared order.
pub fn parse_batch(yaml: &str) -> Result<Vec<RolloutTarget>, BatchConfigError> {
    if yaml.trim().is_empty() {
        return Err(BatchConfigError::Empty);
    }
    let entries: Option<Vec<BatchEntry>> = serde_yaml::from_str(yaml)?;
    let entries = entries.unwrap_or_default();
    if entries.is_empty() {
        return Err(BatchConfigError::Empty);
    }
    entries.into_iter().enumerate().map(|(index, entry)| entry.into_target(index)).collect()
}

/// Read and parse a batch configuration file.
pub fn load_batch(path: &Path) -> Result<Vec<RolloutTarget>, BatchConfigError> {
    let yaml = std::fs::read_to_string(path)
        .map_err(|source| BatchConfigError::Read { path: path.to_path_buf(), source })?;
    parse_batch(&yaml)
}

#[cfg(test)]
#[path = "batch_config_tests.rs"]
mod tests;
