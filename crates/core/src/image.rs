// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Logical image references and their registry-resolved pull strings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from parsing an image reference
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageRefError {
    #[error("image path is invalid: {0:?} (expected repository:tag)")]
    Malformed(String),
}

/// A logical `repository:tag` pair.
///
/// Serializes to/from the `repository:tag` string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageReference {
    repository: String,
    tag: String,
}

impl ImageReference {
    /// Build a reference from its parts, rejecting empty parts and parts
    /// containing the `:` separator.
    pub fn new(
        repository: impl Into<String>,
        tag: impl Into<String>,
    ) -> Result<Self, ImageRefError> {
        let repository = repository.into();
        let tag = tag.into();
        if repository.is_empty() || tag.is_empty() || repository.contains(':') || tag.contains(':')
        {
            return Err(ImageRefError::Malformed(format!("{}:{}", repository, tag)));
        }
        Ok(Self { repository, tag })
    }

    pub fn repository(&self) -> &str {
        &self.repository
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.repository, self.tag)
    }
}

impl FromStr for ImageReference {
    type Err = ImageRefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(':');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(repository), Some(tag), None) if !repository.is_empty() && !tag.is_empty() => {
                Ok(Self { repository: repository.to_string(), tag: tag.to_string() })
            }
            _ => Err(ImageRefError::Malformed(s.to_string())),
        }
    }
}

impl Serialize for ImageReference {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ImageReference {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// An image as reported by the registry: the authoritative answer to
/// "does this repository:tag exist, and what do we pull".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedImage {
    pub registry_id: String,
    pub region: String,
    pub repository_name: String,
    pub tag: String,
}

impl ResolvedImage {
    /// Fully-qualified ECR pull string:
    /// `<registry>.dkr.ecr.<region>.amazonaws.com/<repository>:<tag>`.
    pub fn pull_reference(&self) -> String {
        format!(
            "{}.dkr.ecr.{}.amazonaws.com/{}:{}",
            self.registry_id, self.region, self.repository_name, self.tag
        )
    }
}

#[cfg(test)]
#[path = "image_tests.rs"]
mod tests;
