// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! roll-adapters: Registry and control-plane boundaries, with ECR/ECS implementations

pub mod aws;
pub mod control_plane;
pub mod ecr;
pub mod ecs;
pub mod registry;

pub use aws::AwsSettings;
pub use control_plane::{ControlPlaneAdapter, ControlPlaneError};
pub use ecr::EcrRegistry;
pub use ecs::EcsControlPlane;
pub use registry::{RegistryAdapter, RegistryError};

#[cfg(any(test, feature = "test-support"))]
pub use control_plane::{ControlPlaneCall, FakeControlPlane};
#[cfg(any(test, feature = "test-support"))]
pub use registry::FakeRegistryAdapter;
