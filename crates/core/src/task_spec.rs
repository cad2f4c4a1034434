// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task specification snapshots as stored by the control plane.
//!
//! A [`TaskSpecification`] is one immutable revision of a task family. The
//! tool never edits a fetched snapshot; mutation always works on a copy, and
//! registration yields a new revision assigned by the control plane.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One immutable revision of a task family.
///
/// Field order here is the field order of the canonical text used for diffs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSpecification {
    pub family: String,
    pub revision: i32,
    /// Control-plane-assigned identifier. Never submitted on registration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arn: Option<String>,
    pub containers: Vec<ContainerEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub placement_constraints: Vec<PlacementConstraint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_role_arn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_role_arn: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<Volume>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requires_compatibilities: Vec<String>,
    /// Task-level CPU units, as the control plane reports them (e.g. `"256"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<String>,
}

impl TaskSpecification {
    /// `family:revision`, the form the control plane accepts as a task
    /// definition name.
    pub fn label(&self) -> String {
        format!("{}:{}", self.family, self.revision)
    }

    /// The identifier to hand back to the control plane when referring to
    /// this exact revision.
    pub fn reference(&self) -> String {
        self.arn.clone().unwrap_or_else(|| self.label())
    }

    pub fn container(&self, name: &str) -> Option<&ContainerEntry> {
        self.containers.iter().find(|c| c.name == name)
    }

    pub fn images(&self) -> impl Iterator<Item = &str> {
        self.containers.iter().map(|c| c.image.as_str())
    }

    /// Copy with all control-plane-assigned metadata stripped, ready to be
    /// submitted as a new revision.
    pub fn for_registration(&self) -> Self {
        Self { arn: None, ..self.clone() }
    }

    /// Canonical multi-line text: pretty JSON in declaration order.
    pub fn canonical_text(&self) -> String {
        serde_json::to_string_pretty(self)
            .unwrap_or_else(|e| format!("<task definition {} not renderable: {}>", self.label(), e))
    }
}

/// One container slot inside a task specification.
///
/// `name` is the substitution key; `image` is the full pull string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerEntry {
    pub name: String,
    pub image: String,
    #[serde(flatten)]
    pub settings: ContainerSettings,
}

impl ContainerEntry {
    pub fn new(name: impl Into<String>, image: impl Into<String>) -> Self {
        Self { name: name.into(), image: image.into(), settings: ContainerSettings::default() }
    }
}

/// Container fields carried through mutation untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_reservation: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub essential: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entry_point: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub command: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub environment: Vec<EnvVar>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub secrets: Vec<Secret>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub port_mappings: Vec<PortMapping>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_directory: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_configuration: Option<LogConfiguration>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvVar {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Secret {
    pub name: String,
    pub value_from: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogConfiguration {
    pub log_driver: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortMapping {
    pub container_port: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_port: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementConstraint {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Volume {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_source_path: Option<String>,
}

/// A long-running service as reported by the control plane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceState {
    pub name: String,
    pub cluster_arn: String,
    /// Task definition (ARN or `family:revision`) the service currently runs.
    pub task_definition: String,
    pub desired_count: i32,
    #[serde(default)]
    pub deployment: DeploymentSettings,
}

/// Deployment configuration preserved verbatim on service update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_healthy_percent: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum_percent: Option<i32>,
}

/// Response to a standalone task run.
///
/// The control plane may accept the request yet report per-task failures
/// (e.g. insufficient capacity); callers treat any failure as fatal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunTaskResult {
    pub task_arns: Vec<String>,
    pub failures: Vec<RunFailure>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunFailure {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arn: Option<String>,
    pub reason: String,
}

impl std::fmt::Display for RunFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.arn {
            Some(arn) => write!(f, "{} ({})", self.reason, arn),
            None => f.write_str(&self.reason),
        }
    }
}

/// Point-in-time status of a standalone task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatus {
    pub task_arn: String,
    pub last_status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stopped_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_code: Option<String>,
    #[serde(default)]
    pub containers: Vec<StoppedContainer>,
}

pub const STATUS_STOPPED: &str = "STOPPED";

/// Stop codes for a task that ran and ended on its own or by request.
pub const ORDINARY_STOP_CODES: &[&str] = &["EssentialContainerExited", "UserInitiated"];

impl TaskStatus {
    pub fn is_stopped(&self) -> bool {
        self.last_status == STATUS_STOPPED
    }

    /// Containers that exited with a non-zero code.
    pub fn failed_containers(&self) -> impl Iterator<Item = &StoppedContainer> {
        self.containers.iter().filter(|c| matches!(c.exit_code, Some(code) if code != 0))
    }

    /// Stop code naming a failure to start or keep the task, such as
    /// `TaskFailedToStart` or `SpotInterruption`.
    pub fn abnormal_stop_code(&self) -> Option<&str> {
        self.stop_code.as_deref().filter(|code| !ORDINARY_STOP_CODES.contains(code))
    }

    /// No container reported an exit code, so nothing ran to completion.
    pub fn never_ran(&self) -> bool {
        self.containers.iter().all(|c| c.exit_code.is_none())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoppedContainer {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
}

#[cfg(test)]
#[path = "task_spec_tests.rs"]
mod tests;
