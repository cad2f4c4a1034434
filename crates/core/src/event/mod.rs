// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rollout events emitted by the engine and rendered by the CLI

mod methods;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::diff::Diff;
use crate::image::ImageReference;

/// How a new revision reaches the cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RolloutShape {
    /// Update a long-running service and wait for it to stabilize.
    Service,
    /// Run a standalone task and wait for it to stop.
    OneOff,
}

crate::simple_display! {
    RolloutShape {
        Service => "service",
        OneOff => "oneshot task",
    }
}

/// Identity of a rollout target, attached to events and failures.
///
/// `name` is the service name for service rollouts and the task family for
/// one-off runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetLabel {
    pub shape: RolloutShape,
    pub cluster: String,
    pub name: String,
}

impl TargetLabel {
    pub fn service(cluster: impl Into<String>, service: impl Into<String>) -> Self {
        Self { shape: RolloutShape::Service, cluster: cluster.into(), name: service.into() }
    }

    pub fn one_off(cluster: impl Into<String>, family: impl Into<String>) -> Self {
        Self { shape: RolloutShape::OneOff, cluster: cluster.into(), name: family.into() }
    }
}

impl fmt::Display for TargetLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} on cluster {}", self.shape, self.name, self.cluster)
    }
}

/// `family:revision` plus the container images of one revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecSummary {
    pub label: String,
    pub images: Vec<String>,
}

/// Terminal success state of one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RolloutOutcome {
    /// Substitutions produced no change; nothing was registered.
    Unchanged,
    /// Dry-run: the change was shown but not committed.
    Previewed,
    /// Service updated and reported stable.
    ServiceStable,
    /// One-off tasks ran and stopped cleanly.
    TasksCompleted,
    /// One-off tasks started; the completion wait was disabled.
    TasksStarted,
}

crate::simple_display! {
    RolloutOutcome {
        Unchanged => "unchanged",
        Previewed => "previewed",
        ServiceStable => "service stable",
        TasksCompleted => "tasks completed",
        TasksStarted => "tasks started",
    }
}

impl RolloutOutcome {
    /// Whether a new revision was registered on the way to this outcome.
    pub fn committed(self) -> bool {
        !matches!(self, RolloutOutcome::Unchanged | RolloutOutcome::Previewed)
    }
}

/// Progress of a rollout, in emission order.
///
/// Serializes with `{"type": "scope:name", ...fields}` format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RolloutEvent {
    #[serde(rename = "batch:started")]
    BatchStarted { targets: usize, dry_run: bool },

    #[serde(rename = "batch:verified")]
    ImagesVerified { images: Vec<ImageReference> },

    #[serde(rename = "target:started")]
    TargetStarted { index: usize, total: usize, target: TargetLabel },

    /// Workflow summary: what will replace what.
    #[serde(rename = "target:planned")]
    Planned {
        target: TargetLabel,
        images: Vec<ImageReference>,
        previous: SpecSummary,
        candidate: SpecSummary,
        changed: bool,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        unmatched: Vec<String>,
    },

    #[serde(rename = "target:diff")]
    DiffRendered { target: TargetLabel, diff: Diff },

    #[serde(rename = "spec:registered")]
    Registered { target: TargetLabel, task_definition: String },

    #[serde(rename = "service:updated")]
    ServiceUpdated { target: TargetLabel, task_definition: String, desired_count: i32 },

    #[serde(rename = "service:waiting")]
    ServiceWaiting { target: TargetLabel },

    #[serde(rename = "tasks:started")]
    TasksStarted { target: TargetLabel, task_arns: Vec<String> },

    #[serde(rename = "tasks:waiting")]
    TasksWaiting { target: TargetLabel, task_arns: Vec<String> },

    #[serde(rename = "tasks:wait:skipped")]
    TaskWaitSkipped { target: TargetLabel },

    #[serde(rename = "target:finished")]
    TargetFinished { target: TargetLabel, outcome: RolloutOutcome },

    #[serde(rename = "target:failed")]
    TargetFailed { target: TargetLabel, error: String },

    #[serde(rename = "batch:finished")]
    BatchFinished { completed: usize, total: usize },
}

#[cfg(test)]
#[path = "method_tests.rs"]
mod tests;
