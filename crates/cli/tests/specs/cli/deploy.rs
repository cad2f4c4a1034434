// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `roll deploy` input validation

use crate::prelude::*;

#[test]
fn deploy_without_image_is_a_usage_error() {
    cli()
        .args(&["deploy", "--cluster", "prod", "--service", "web"])
        .fails()
        .code(2)
        .stderr_has("--image");
}

#[test]
fn deploy_without_cluster_is_a_usage_error() {
    cli()
        .args(&["deploy", "--service", "web", "--image", "app:2"])
        .fails()
        .code(2)
        .stderr_has("--cluster");
}

#[test]
fn deploy_rejects_image_without_tag() {
    cli()
        .args(&["deploy", "--cluster", "prod", "--service", "web", "--image", "app"])
        .fails()
        .code(2)
        .stderr_has("image path is invalid");
}

#[test]
fn deploy_rejects_image_with_extra_separator() {
    cli()
        .args(&["deploy", "-c", "prod", "-s", "web", "-i", "registry:5000/app:1"])
        .fails()
        .code(2)
        .stderr_has("registry:5000/app:1");
}

#[test]
fn deploy_rejects_empty_cluster_before_any_aws_call() {
    cli()
        .args(&["deploy", "--cluster", "", "--service", "web", "--image", "app:2"])
        .fails()
        .code(2)
        .stderr_has("cluster is required");
}

#[test]
fn invalid_log_level_is_rejected() {
    cli()
        .args(&["deploy", "-c", "prod", "-s", "web", "-i", "app:2"])
        .env("ROLL_LOG", "roll=nonsense")
        .fails()
        .code(2)
        .stderr_has("invalid log level");
}
