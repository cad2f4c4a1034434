// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Explicit AWS region and profile selection.
//!
//! Nothing in the adapters reads region or credentials from the process
//! environment directly; the caller decides and passes [`AwsSettings`].

use aws_config::{BehaviorVersion, Region, SdkConfig};

/// Region and optional named profile for the ECR/ECS clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwsSettings {
    pub region: String,
    pub profile: Option<String>,
}

impl AwsSettings {
    pub fn new(region: impl Into<String>) -> Self {
        Self { region: region.into(), profile: None }
    }

    roll_core::setters! {
        option { profile: String }
    }

    /// Resolve credentials through the standard provider chain, pinned to
    /// this region and (if set) this profile.
    pub async fn load(&self) -> SdkConfig {
        let region = Region::new(self.region.clone());
        let mut loader = aws_config::defaults(BehaviorVersion::latest()).region(region);
        if let Some(profile) = &self.profile {
            loader = loader.profile_name(profile);
        }
        tracing::debug!(region = %self.region, profile = ?self.profile, "loading aws config");
        loader.load().await
    }
}

#[cfg(test)]
#[path = "aws_tests.rs"]
mod tests;
