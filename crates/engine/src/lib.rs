// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! roll-engine: Rollout orchestration over the registry and control plane

pub mod batch;
pub mod error;
pub mod executor;
pub mod mutate;
pub mod report;
pub mod wait;

pub use batch::{BatchOrchestrator, BatchReport};
pub use error::{BatchError, ErrorKind, RolloutError, TargetFailure};
pub use executor::{
    RolloutDeps, RolloutExecutor, RolloutOptions, RolloutRequest, RolloutState, SpecSource,
    DEFAULT_SERVICE_WAIT,
};
pub use mutate::{mutate, Mutation};
pub use report::{LogReporter, Reporter};
pub use wait::WaitPolicy;

#[cfg(any(test, feature = "test-support"))]
pub use report::RecordingReporter;
