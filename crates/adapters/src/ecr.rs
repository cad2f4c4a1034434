// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ECR-backed [`RegistryAdapter`].

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_ecr::error::DisplayErrorContext;
use aws_sdk_ecr::types::{Image, ImageIdentifier};
use aws_sdk_ecr::Client;
use roll_core::{ImageReference, ResolvedImage};

use crate::registry::{RegistryAdapter, RegistryError};

/// Manifest types accepted from `BatchGetImage`.
const MANIFEST_MEDIA_TYPES: [&str; 4] = [
    "application/vnd.docker.distribution.manifest.v1+json",
    "application/vnd.docker.distribution.manifest.v2+json",
    "application/vnd.oci.image.manifest.v1+json",
    "application/vnd.oci.image.index.v1+json",
];

/// Resolves `repository:tag` against ECR in one region.
#[derive(Debug, Clone)]
pub struct EcrRegistry {
    client: Client,
    region: String,
}

impl EcrRegistry {
    pub fn new(config: &SdkConfig) -> Self {
        let region = config.region().map(|r| r.to_string()).unwrap_or_default();
        Self { client: Client::new(config), region }
    }
}

#[async_trait]
impl RegistryAdapter for EcrRegistry {
    async fn resolve(&self, image: &ImageReference) -> Result<ResolvedImage, RegistryError> {
        let mut request = self
            .client
            .batch_get_image()
            .repository_name(image.repository())
            .image_ids(ImageIdentifier::builder().image_tag(image.tag()).build());
        for media_type in MANIFEST_MEDIA_TYPES {
            request = request.accepted_media_types(media_type);
        }

        let output = match request.send().await {
            Ok(output) => output,
            Err(e) => {
                let service_error = e.into_service_error();
                if service_error.is_repository_not_found_exception() {
                    return Err(RegistryError::ImageNotFound { image: image.clone() });
                }
                return Err(RegistryError::Api(format!(
                    "BatchGetImage {}: {}",
                    image,
                    DisplayErrorContext(&service_error)
                )));
            }
        };

        let found = output.images().first().ok_or_else(|| {
            if let Some(failure) = output.failures().first() {
                tracing::debug!(
                    %image,
                    code = ?failure.failure_code(),
                    reason = failure.failure_reason().unwrap_or_default(),
                    "image lookup failed"
                );
            }
            RegistryError::ImageNotFound { image: image.clone() }
        })?;

        let resolved = resolved_image(found, image, &self.region);
        tracing::debug!(%image, pull = %resolved.pull_reference(), "image resolved");
        Ok(resolved)
    }
}

/// Fill a [`ResolvedImage`] from the registry's answer, falling back to the
/// requested names for fields the response leaves out.
fn resolved_image(found: &Image, requested: &ImageReference, region: &str) -> ResolvedImage {
    ResolvedImage {
        registry_id: found.registry_id().unwrap_or_default().to_string(),
        region: region.to_string(),
        repository_name: found.repository_name().unwrap_or(requested.repository()).to_string(),
        tag: found
            .image_id()
            .and_then(|id| id.image_tag())
            .unwrap_or(requested.tag())
            .to_string(),
    }
}

#[cfg(test)]
#[path = "ecr_tests.rs"]
mod tests;
