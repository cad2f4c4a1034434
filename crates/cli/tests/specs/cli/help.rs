// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI help output specs

use crate::prelude::*;

#[test]
fn roll_no_args_shows_usage_and_exits_two() {
    cli().fails().code(2).stderr_has("Usage:");
}

#[test]
fn roll_help_lists_commands() {
    cli().args(&["--help"]).passes().stdout_has("deploy").stdout_has("sync-deploy");
}

#[test]
fn roll_help_shows_global_flags() {
    cli()
        .args(&["--help"])
        .passes()
        .stdout_has("--region")
        .stdout_has("--profile")
        .stdout_has("--log-level");
}

#[test]
fn deploy_help_shows_flags() {
    cli()
        .args(&["deploy", "--help"])
        .passes()
        .stdout_has("--cluster")
        .stdout_has("--service")
        .stdout_has("--image")
        .stdout_has("--dry-run")
        .stdout_has("--service-wait-timeout-secs");
}

#[test]
fn sync_deploy_help_shows_flags() {
    cli()
        .args(&["sync-deploy", "--help"])
        .passes()
        .stdout_has("--path")
        .stdout_has("--no-wait-tasks")
        .stdout_has("--task-wait-timeout-secs");
}

#[test]
fn roll_version_matches_package() {
    let output = cli().args(&["--version"]).passes();
    similar_asserts::assert_eq!(
        output.stdout.trim(),
        format!("roll {}", env!("CARGO_PKG_VERSION"))
    );
}
