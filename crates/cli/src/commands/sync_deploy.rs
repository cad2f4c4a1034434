// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `roll sync-deploy`: roll out every target of a YAML batch, in order.

use std::path::PathBuf;

use clap::Args;
use roll_adapters::{AwsSettings, EcrRegistry, EcsControlPlane};
use roll_engine::{BatchOrchestrator, RolloutDeps, RolloutExecutor};
use tokio_util::sync::CancellationToken;

use super::{exit_for, WaitArgs};
use crate::exit_error::ExitError;
use crate::report::TerminalReporter;

#[derive(Args, Debug)]
pub struct SyncDeployArgs {
    /// Batch file listing the targets
    #[arg(long, short = 'p', value_name = "FILE")]
    pub path: PathBuf,

    /// Show every change without registering or updating anything
    #[arg(long)]
    pub dry_run: bool,

    #[command(flatten)]
    pub wait: WaitArgs,
}

pub async fn handle(
    args: SyncDeployArgs,
    aws: &AwsSettings,
    color: bool,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let targets =
        roll_core::load_batch(&args.path).map_err(|e| ExitError::invalid_input(e.to_string()))?;
    tracing::debug!(path = %args.path.display(), targets = targets.len(), "batch loaded");

    let config = aws.load().await;
    let deps = RolloutDeps {
        registry: EcrRegistry::new(&config),
        control_plane: EcsControlPlane::new(&config),
        reporter: TerminalReporter::stdout(color),
    };
    let executor =
        RolloutExecutor::new(deps, args.wait.options(args.dry_run)).with_cancellation(cancel);
    let orchestrator = BatchOrchestrator::new(executor);

    let report = orchestrator.run(&targets).await.map_err(|e| exit_for(e.kind(), e.to_string()))?;
    tracing::info!(
        targets = report.outcomes.len(),
        committed = report.committed(),
        "batch finished"
    );
    Ok(())
}
