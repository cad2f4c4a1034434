// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `roll deploy`: swap images on one running service.

use clap::Args;
use roll_adapters::{AwsSettings, EcrRegistry, EcsControlPlane};
use roll_core::ImageReference;
use roll_engine::{RolloutDeps, RolloutExecutor, RolloutRequest};
use tokio_util::sync::CancellationToken;

use super::{exit_for, failure_exit, WaitArgs};
use crate::report::TerminalReporter;

#[derive(Args, Debug)]
pub struct DeployArgs {
    /// Cluster the service runs on
    #[arg(long, short = 'c')]
    pub cluster: String,

    /// Service to update
    #[arg(long, short = 's')]
    pub service: String,

    /// Image to deploy; replaces the container named after its repository
    #[arg(long = "image", short = 'i', value_name = "REPOSITORY:TAG", required = true)]
    pub images: Vec<ImageReference>,

    /// Show the change without registering or updating anything
    #[arg(long)]
    pub dry_run: bool,

    #[command(flatten)]
    pub wait: WaitArgs,
}

/// Validate first, then build clients and roll out.
pub async fn handle(
    args: DeployArgs,
    aws: &AwsSettings,
    color: bool,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let request = RolloutRequest::deploy(args.cluster, args.service, args.images)
        .map_err(|e| exit_for(e.kind(), e.to_string()))?;

    let config = aws.load().await;
    let deps = RolloutDeps {
        registry: EcrRegistry::new(&config),
        control_plane: EcsControlPlane::new(&config),
        reporter: TerminalReporter::stdout(color),
    };
    let executor =
        RolloutExecutor::new(deps, args.wait.options(args.dry_run)).with_cancellation(cancel);

    let outcome = executor.run(&request).await.map_err(|f| failure_exit(&f))?;
    tracing::info!(target_label = %request.target, %outcome, "deploy finished");
    Ok(())
}
