// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::image::{ImageReference, ResolvedImage};
use crate::task_spec::{ContainerEntry, TaskSpecification};

pub const REGISTRY_ID: &str = "123456789012";
pub const REGION: &str = "ap-northeast-1";

// ── Proptest strategies ─────────────────────────────────────────────────

/// Proptest strategies for task specifications and substitutions.
pub mod strategies {
    use crate::image::ImageReference;
    use crate::target::Substitutions;
    use crate::task_spec::{ContainerEntry, EnvVar, PlacementConstraint, TaskSpecification, Volume};
    use proptest::prelude::*;

    /// Container and repository names drawn from a small pool so that
    /// substitutions and containers overlap often.
    pub fn arb_name() -> impl Strategy<Value = String> {
        prop_oneof![Just("app"), Just("worker"), Just("nginx"), Just("envoy"), Just("cron")]
            .prop_map(str::to_string)
    }

    pub fn arb_image_reference() -> impl Strategy<Value = ImageReference> {
        (arb_name(), "[a-z0-9]{1,4}").prop_filter_map("valid reference", |(repo, tag)| {
            ImageReference::new(repo, tag).ok()
        })
    }

    pub fn arb_container() -> impl Strategy<Value = ContainerEntry> {
        (arb_name(), "[a-z]{1,6}:[0-9]{1,2}", proptest::option::of(1..4096i32), any::<bool>())
            .prop_map(|(name, image, memory, with_env)| {
                let mut entry = ContainerEntry::new(name, image);
                entry.settings.memory = memory;
                if with_env {
                    entry.settings.environment.push(EnvVar {
                        name: "MODE".to_string(),
                        value: "prod".to_string(),
                    });
                }
                entry
            })
    }

    pub fn arb_task_spec() -> impl Strategy<Value = TaskSpecification> {
        (
            prop::collection::vec(arb_container(), 0..5),
            proptest::option::of(Just("awsvpc".to_string())),
            any::<bool>(),
        )
            .prop_map(|(containers, network_mode, constrained)| {
                let mut task = super::spec("family", 4, containers);
                task.network_mode = network_mode;
                if constrained {
                    task.placement_constraints.push(PlacementConstraint {
                        kind: "memberOf".to_string(),
                        expression: Some("attribute:ecs.instance-type =~ t3.*".to_string()),
                    });
                    task.volumes.push(Volume {
                        name: "data".to_string(),
                        host_source_path: Some("/data".to_string()),
                    });
                }
                task
            })
    }

    pub fn arb_substitutions() -> impl Strategy<Value = Substitutions> {
        prop::collection::vec(arb_image_reference(), 0..4)
            .prop_map(crate::target::substitutions_for)
    }
}

// ── Builders ────────────────────────────────────────────────────────────

pub fn container(name: &str, image: &str) -> ContainerEntry {
    ContainerEntry::new(name, image)
}

pub fn spec(family: &str, revision: i32, containers: Vec<ContainerEntry>) -> TaskSpecification {
    TaskSpecification {
        family: family.to_string(),
        revision,
        arn: None,
        containers,
        network_mode: None,
        placement_constraints: Vec::new(),
        task_role_arn: None,
        execution_role_arn: None,
        volumes: Vec::new(),
        requires_compatibilities: Vec::new(),
        cpu: None,
        memory: None,
    }
}

/// Task definition ARN for `family:revision` in the test account.
pub fn task_arn(family: &str, revision: i32) -> String {
    format!("arn:aws:ecs:{REGION}:{REGISTRY_ID}:task-definition/{family}:{revision}")
}

#[allow(clippy::panic)]
pub fn image(s: &str) -> ImageReference {
    match s.parse() {
        Ok(image) => image,
        Err(e) => panic!("bad test image {s:?}: {e}"),
    }
}

/// What the registry reports for `image` in the test account.
pub fn resolved(image: &ImageReference) -> ResolvedImage {
    ResolvedImage {
        registry_id: REGISTRY_ID.to_string(),
        region: REGION.to_string(),
        repository_name: image.repository().to_string(),
        tag: image.tag().to_string(),
    }
}

/// Fully-qualified pull string for `repository:tag` in the test account.
pub fn pull(reference: &str) -> String {
    resolved(&image(reference)).pull_reference()
}
