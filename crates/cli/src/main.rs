// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! roll: controlled ECS image rollouts

mod color;
mod commands;
mod env;
mod exit_error;
mod logging;
mod report;

use clap::{Parser, Subcommand};
use roll_adapters::AwsSettings;
use tokio_util::sync::CancellationToken;

use crate::commands::{deploy, sync_deploy};
use crate::exit_error::ExitError;

#[derive(Parser, Debug)]
#[command(
    name = "roll",
    version,
    about = "Roll new container images out to ECS services and tasks"
)]
#[command(styles = color::styles())]
struct Cli {
    /// AWS region for the registry and the cluster
    #[arg(long, global = true, env = "AWS_REGION", default_value = "ap-northeast-1")]
    region: String,

    /// Named AWS profile to load credentials from
    #[arg(long, global = true, env = "AWS_PROFILE")]
    profile: Option<String>,

    /// Log filter for diagnostics on stderr
    #[arg(long, global = true, env = "ROLL_LOG", default_value = logging::DEFAULT_LEVEL)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Deploy new images to a running service
    Deploy(deploy::DeployArgs),
    /// Deploy every target listed in a batch file, in order
    SyncDeploy(sync_deploy::SyncDeployArgs),
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        let (code, message) = match err.downcast_ref::<ExitError>() {
            Some(exit) => (exit.code, exit.message.clone()),
            None => (exit_error::ROLLOUT_FAILED, format!("{:#}", err)),
        };
        eprintln!("{} {}", color::removed("error:"), message);
        std::process::exit(code);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let color = color::should_colorize();
    logging::init(&cli.log_level, color)?;

    let mut aws = AwsSettings::new(cli.region);
    if let Some(profile) = cli.profile {
        aws = aws.profile(profile);
    }

    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
    runtime.block_on(async move {
        let cancel = CancellationToken::new();
        let interrupt = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupted; cancelling");
                interrupt.cancel();
            }
        });

        match cli.command {
            Command::Deploy(args) => deploy::handle(args, &aws, color, cancel).await,
            Command::SyncDeploy(args) => sync_deploy::handle(args, &aws, color, cancel).await,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn deploy_collects_repeated_images() {
        let cli = Cli::try_parse_from([
            "roll", "deploy", "--cluster", "prod", "--service", "web", "-i", "app:2", "-i",
            "worker:3",
        ])
        .unwrap();
        let Command::Deploy(args) = cli.command else { panic!("expected deploy") };
        let images: Vec<String> = args.images.iter().map(ToString::to_string).collect();
        assert_eq!(images, vec!["app:2", "worker:3"]);
        assert!(!args.dry_run);
        assert_eq!(args.wait.service_wait_timeout_secs, 600);
    }

    #[test]
    fn deploy_requires_an_image() {
        let err = Cli::try_parse_from(["roll", "deploy", "--cluster", "prod", "--service", "web"])
            .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn deploy_rejects_malformed_image() {
        let err = Cli::try_parse_from([
            "roll", "deploy", "--cluster", "prod", "--service", "web", "--image", "app",
        ])
        .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn sync_deploy_wait_flags() {
        let cli = Cli::try_parse_from([
            "roll",
            "sync-deploy",
            "--path",
            "targets.yml",
            "--no-wait-tasks",
            "--task-wait-timeout-secs",
            "60",
        ])
        .unwrap();
        let Command::SyncDeploy(args) = cli.command else { panic!("expected sync-deploy") };
        assert_eq!(args.path, std::path::PathBuf::from("targets.yml"));
        assert!(args.wait.no_wait_tasks);
        assert_eq!(args.wait.task_wait_timeout_secs, 60);
    }
}
