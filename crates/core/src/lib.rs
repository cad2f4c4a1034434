// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! roll-core: Value types, diffing and events for the roll rollout tool

pub mod macros;

pub mod batch_config;
pub mod diff;
pub mod event;
pub mod image;
pub mod target;
pub mod task_spec;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use batch_config::{load_batch, parse_batch, BatchConfigError, BatchEntry};
pub use diff::{render, render_specs, Diff, DiffLine, LineKind};
pub use event::{RolloutEvent, RolloutOutcome, RolloutShape, SpecSummary, TargetLabel};
pub use image::{ImageRefError, ImageReference, ResolvedImage};
pub use target::{substitutions_for, RolloutTarget, Substitutions};
pub use task_spec::{
    ContainerEntry, ContainerSettings, DeploymentSettings, EnvVar, LogConfiguration,
    PlacementConstraint, PortMapping, RunFailure, RunTaskResult, Secret, ServiceState,
    StoppedContainer, TaskSpecification, TaskStatus, Volume,
};
