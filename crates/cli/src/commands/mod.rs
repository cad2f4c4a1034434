// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI command implementations

pub mod deploy;
pub mod sync_deploy;

use std::time::Duration;

use clap::Args;
use roll_engine::{ErrorKind, RolloutOptions, TargetFailure, WaitPolicy};

use crate::exit_error::ExitError;

/// Wait ceilings shared by both commands.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct WaitArgs {
    /// Seconds to wait for an updated service to become stable
    #[arg(long, value_name = "SECS", default_value_t = 600)]
    pub service_wait_timeout_secs: u64,

    /// Seconds to wait for one-off tasks to stop
    #[arg(long, value_name = "SECS", default_value_t = 1800)]
    pub task_wait_timeout_secs: u64,

    /// Start one-off tasks without waiting for them to finish
    #[arg(long)]
    pub no_wait_tasks: bool,
}

impl WaitArgs {
    pub fn options(&self, dry_run: bool) -> RolloutOptions {
        let task_wait = if self.no_wait_tasks {
            WaitPolicy::disabled()
        } else {
            WaitPolicy::default().timeout(Duration::from_secs(self.task_wait_timeout_secs))
        };
        RolloutOptions::default()
            .dry_run(dry_run)
            .service_wait(Duration::from_secs(self.service_wait_timeout_secs))
            .task_wait(task_wait)
    }
}

/// Map an engine failure to the process exit code.
pub fn exit_for(kind: ErrorKind, message: String) -> ExitError {
    match kind {
        ErrorKind::Validation => ExitError::invalid_input(message),
        _ => ExitError::rollout_failed(message),
    }
}

/// Map a failed rollout, keeping the target in the message.
pub fn failure_exit(failure: &TargetFailure) -> ExitError {
    exit_for(failure.error.kind(), failure.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use roll_core::TargetLabel;
    use roll_engine::RolloutError;

    fn wait(no_wait_tasks: bool) -> WaitArgs {
        WaitArgs { service_wait_timeout_secs: 60, task_wait_timeout_secs: 90, no_wait_tasks }
    }

    #[test]
    fn options_carry_timeouts() {
        let options = wait(false).options(true);
        assert!(options.dry_run);
        assert_eq!(options.service_wait, Duration::from_secs(60));
        assert_eq!(options.task_wait.timeout, Duration::from_secs(90));
        assert!(options.task_wait.enabled);
    }

    #[test]
    fn no_wait_tasks_disables_policy() {
        let options = wait(true).options(false);
        assert!(!options.dry_run);
        assert!(!options.task_wait.enabled);
    }

    #[yare::parameterized(
        validation = { ErrorKind::Validation, 2 },
        not_found  = { ErrorKind::NotFound, 1 },
        timeout    = { ErrorKind::WaitTimeout, 1 },
        cancelled  = { ErrorKind::Cancelled, 1 },
    )]
    fn exit_codes(kind: ErrorKind, code: i32) {
        assert_eq!(exit_for(kind, "x".to_string()).code, code);
    }

    #[yare::parameterized(
        wait      = { RolloutError::Wait("task stopped".into()), 1 },
        cancelled = { RolloutError::Cancelled, 1 },
        invalid   = { RolloutError::Validation("no containers".into()), 2 },
    )]
    fn rollout_failures_use_the_error_kind(error: RolloutError, code: i32) {
        let failure = TargetFailure { target: TargetLabel::service("prod", "web"), error };
        let exit = failure_exit(&failure);
        assert_eq!(exit.code, code);
        assert!(exit.message.starts_with("service web on cluster prod: "), "{}", exit.message);
    }
}
