// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Image substitution on a task specification.
//!
//! The base snapshot is never edited: the result is a copy whose container
//! images may differ, with every other field carried over untouched.

use std::collections::HashMap;

use roll_adapters::{RegistryAdapter, RegistryError};
use roll_core::{ImageReference, Substitutions, TaskSpecification};

/// Result of applying substitutions to a task specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mutation {
    pub spec: TaskSpecification,
    /// Whether any container image differs from the base.
    pub changed: bool,
    /// Substitution keys that matched no container, in substitution order.
    pub unmatched: Vec<String>,
}

/// Apply `substitutions` to a copy of `base`.
///
/// Each container whose name is a substitution key gets the registry's pull
/// reference for that image. Each distinct image is resolved at most once.
/// Any failed resolution aborts the whole mutation.
pub async fn mutate<R: RegistryAdapter>(
    registry: &R,
    base: &TaskSpecification,
    substitutions: &Substitutions,
) -> Result<Mutation, RegistryError> {
    let mut spec = base.clone();
    let mut resolved: HashMap<ImageReference, String> = HashMap::new();

    for entry in &mut spec.containers {
        let Some(image) = substitutions.get(&entry.name) else {
            continue;
        };
        let pull = match resolved.get(image) {
            Some(pull) => pull.clone(),
            None => {
                let pull = registry.resolve(image).await?.pull_reference();
                resolved.insert(image.clone(), pull.clone());
                pull
            }
        };
        if entry.image != pull {
            tracing::debug!(
                container = %entry.name,
                from = %entry.image,
                to = %pull,
                "image substituted"
            );
            entry.image = pull;
        }
    }

    let unmatched: Vec<String> = substitutions
        .keys()
        .filter(|key| base.container(key).is_none())
        .cloned()
        .collect();
    for key in &unmatched {
        tracing::warn!(
            family = %base.family,
            container = %key,
            "no container matches substitution"
        );
    }

    let changed = images_differ(base, &spec);
    Ok(Mutation { spec, changed, unmatched })
}

/// Pure comparison of container images, position by position.
fn images_differ(base: &TaskSpecification, candidate: &TaskSpecification) -> bool {
    base.containers.len() != candidate.containers.len()
        || base.containers.iter().zip(&candidate.containers).any(|(a, b)| a.image != b.image)
}

#[cfg(test)]
#[path = "mutate_tests.rs"]
mod tests;
