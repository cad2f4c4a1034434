// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rollout error taxonomy

use std::time::Duration;

use roll_adapters::{ControlPlaneError, RegistryError};
use roll_core::{ImageReference, TargetLabel};
use thiserror::Error;

/// Errors that end a rollout. None are retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RolloutError {
    #[error("invalid input: {0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("image not found in registry: {0}")]
    ImageNotFound(ImageReference),
    #[error("remote operation failed: {0}")]
    RemoteOperation(String),
    #[error("wait failed: {0}")]
    Wait(String),
    #[error("timed out after {}s waiting for {what}", .elapsed.as_secs())]
    WaitTimeout { what: String, elapsed: Duration },
    #[error("cancelled")]
    Cancelled,
}

/// Coarse classification of a [`RolloutError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    NotFound,
    ImageNotFound,
    RemoteOperation,
    Wait,
    WaitTimeout,
    Cancelled,
}

roll_core::simple_display! {
    ErrorKind {
        Validation => "validation",
        NotFound => "not found",
        ImageNotFound => "image not found",
        RemoteOperation => "remote operation",
        Wait => "wait",
        WaitTimeout => "wait timeout",
        Cancelled => "cancelled",
    }
}

impl RolloutError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RolloutError::Validation(_) => ErrorKind::Validation,
            RolloutError::NotFound(_) => ErrorKind::NotFound,
            RolloutError::ImageNotFound(_) => ErrorKind::ImageNotFound,
            RolloutError::RemoteOperation(_) => ErrorKind::RemoteOperation,
            RolloutError::Wait(_) => ErrorKind::Wait,
            RolloutError::WaitTimeout { .. } => ErrorKind::WaitTimeout,
            RolloutError::Cancelled => ErrorKind::Cancelled,
        }
    }
}

impl From<RegistryError> for RolloutError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::ImageNotFound { image } => RolloutError::ImageNotFound(image),
            RegistryError::Api(message) => RolloutError::RemoteOperation(message),
        }
    }
}

impl From<ControlPlaneError> for RolloutError {
    fn from(err: ControlPlaneError) -> Self {
        match err {
            ControlPlaneError::NotFound { .. } => RolloutError::NotFound(err.to_string()),
            ControlPlaneError::Wait(message) => RolloutError::Wait(message),
            ControlPlaneError::Rejected(_) | ControlPlaneError::Api(_) => {
                RolloutError::RemoteOperation(err.to_string())
            }
        }
    }
}

/// A rollout error with the identity of the target it halted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{target}: {error}")]
pub struct TargetFailure {
    pub target: TargetLabel,
    #[source]
    pub error: RolloutError,
}

/// Errors that end a batch
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BatchError {
    /// An image failed up-front validation; nothing was touched.
    #[error("preflight failed: {0}")]
    Preflight(RolloutError),
    /// Target `index` failed; later targets were not attempted.
    #[error("target {} of {total} failed: {failure}", .index + 1)]
    Target { index: usize, total: usize, failure: TargetFailure },
}

impl BatchError {
    pub fn error(&self) -> &RolloutError {
        match self {
            BatchError::Preflight(error) => error,
            BatchError::Target { failure, .. } => &failure.error,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.error().kind()
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
