// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::event::{RolloutShape, TargetLabel};
use crate::image::ImageReference;

/// Container name → image to substitute, in insertion order.
pub type Substitutions = IndexMap<String, ImageReference>;

/// Build substitutions keyed by repository name.
///
/// A later image for the same repository replaces the earlier one but keeps
/// its position.
pub fn substitutions_for<I>(images: I) -> Substitutions
where
    I: IntoIterator<Item = ImageReference>,
{
    images.into_iter().map(|image| (image.repository().to_string(), image)).collect()
}

/// One unit of work for a batch rollout.
///
/// `service` absent means a one-off task run; present means a service update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolloutTarget {
    pub task_family: String,
    pub image: ImageReference,
    pub cluster: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
}

impl RolloutTarget {
    pub fn service(
        cluster: impl Into<String>,
        service: impl Into<String>,
        task_family: impl Into<String>,
        image: ImageReference,
    ) -> Self {
        Self {
            task_family: task_family.into(),
            image,
            cluster: cluster.into(),
            service: Some(service.into()),
        }
    }

    pub fn one_off(
        cluster: impl Into<String>,
        task_family: impl Into<String>,
        image: ImageReference,
    ) -> Self {
        Self { task_family: task_family.into(), image, cluster: cluster.into(), service: None }
    }

    pub fn shape(&self) -> RolloutShape {
        match self.service {
            Some(_) => RolloutShape::Service,
            None => RolloutShape::OneOff,
        }
    }

    pub fn label(&self) -> TargetLabel {
        match &self.service {
            Some(service) => TargetLabel::service(&self.cluster, service),
            None => TargetLabel::one_off(&self.cluster, &self.task_family),
        }
    }

    /// Substitution map for this target: the container named after the
    /// image repository receives the image.
    pub fn substitutions(&self) -> Substitutions {
        substitutions_for([self.image.clone()])
    }
}

#[cfg(test)]
#[path = "target_tests.rs"]
mod tests;
