// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded waits for rollouts to settle

use std::time::Duration;

use roll_adapters::ControlPlaneAdapter;
use roll_core::TaskStatus;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::RolloutError;

/// Exponential backoff for polling standalone tasks until they stop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitPolicy {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: u32,
    pub timeout: Duration,
    pub enabled: bool,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(30),
            multiplier: 2,
            timeout: Duration::from_secs(30 * 60),
            enabled: true,
        }
    }
}

impl WaitPolicy {
    /// Skip the wait entirely.
    pub fn disabled() -> Self {
        Self { enabled: false, ..Self::default() }
    }

    roll_core::setters! {
        set {
            initial_delay: Duration,
            max_delay: Duration,
            multiplier: u32,
            timeout: Duration,
        }
    }

    /// Delay to use after `current`.
    pub fn next_delay(&self, current: Duration) -> Duration {
        current.saturating_mul(self.multiplier.max(1)).min(self.max_delay)
    }
}

/// Poll `task_arns` until every one reports stopped.
///
/// A stopped task fails with [`RolloutError::Wait`] when a container exited
/// non-zero or the stop code reports a failure. It also fails when no
/// container ever exited. Exceeding the policy timeout fails with
/// [`RolloutError::WaitTimeout`].
pub async fn wait_for_tasks<C: ControlPlaneAdapter>(
    control_plane: &C,
    cluster: &str,
    task_arns: &[String],
    policy: &WaitPolicy,
    cancel: &CancellationToken,
) -> Result<Vec<TaskStatus>, RolloutError> {
    let start = Instant::now();
    let mut delay = policy.initial_delay.min(policy.max_delay);
    let mut polls = 0u32;

    loop {
        let statuses = control_plane.describe_tasks(cluster, task_arns).await?;
        polls += 1;

        if all_stopped(task_arns, &statuses) {
            check_exits(&statuses)?;
            tracing::info!(
                cluster,
                tasks = task_arns.len(),
                polls,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "tasks stopped"
            );
            return Ok(statuses);
        }

        let elapsed = start.elapsed();
        if elapsed >= policy.timeout {
            return Err(RolloutError::WaitTimeout {
                what: format!("{} task(s) on cluster {} to stop", task_arns.len(), cluster),
                elapsed,
            });
        }

        let sleep = delay.min(policy.timeout - elapsed);
        tracing::debug!(cluster, polls, delay_ms = sleep.as_millis() as u64, "tasks still running");
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(RolloutError::Cancelled),
            _ = tokio::time::sleep(sleep) => {}
        }
        delay = policy.next_delay(delay);
    }
}

fn all_stopped(task_arns: &[String], statuses: &[TaskStatus]) -> bool {
    task_arns
        .iter()
        .all(|arn| statuses.iter().any(|s| &s.task_arn == arn && s.is_stopped()))
}

fn check_exits(statuses: &[TaskStatus]) -> Result<(), RolloutError> {
    for status in statuses {
        let mut message = if let Some(container) = status.failed_containers().next() {
            format!(
                "task {} stopped abnormally: container {} exited with code {}",
                status.task_arn,
                container.name,
                container.exit_code.unwrap_or_default()
            )
        } else if let Some(code) = status.abnormal_stop_code() {
            format!("task {} stopped abnormally: {}", status.task_arn, code)
        } else if status.never_ran() {
            format!("task {} stopped before any container exited", status.task_arn)
        } else {
            continue;
        };
        if let Some(reason) = &status.stopped_reason {
            message.push_str(&format!(" ({})", reason));
        }
        return Err(RolloutError::Wait(message));
    }
    Ok(())
}

/// Wait for a service to report stable, racing cancellation.
pub async fn wait_for_service<C: ControlPlaneAdapter>(
    control_plane: &C,
    cluster: &str,
    service: &str,
    max_wait: Duration,
    cancel: &CancellationToken,
) -> Result<(), RolloutError> {
    let start = Instant::now();
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(RolloutError::Cancelled),
        result = control_plane.wait_service_stable(cluster, service, max_wait) => {
            result?;
            tracing::info!(
                cluster,
                service,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "service stable"
            );
            Ok(())
        }
    }
}

#[cfg(test)]
#[path = "wait_tests.rs"]
mod tests;
