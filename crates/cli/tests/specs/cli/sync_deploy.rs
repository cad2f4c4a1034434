// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `roll sync-deploy` batch file validation
//!
//! A bad batch file is rejected as a whole before anything remote happens.

use crate::prelude::*;

fn sync(path: &std::path::Path) -> CliBuilder {
    cli().args(&["sync-deploy", "--path", path.to_str().unwrap()])
}

#[test]
fn missing_file_is_rejected() {
    let project = Project::empty();
    sync(&project.path("absent.yml")).fails().code(2).stderr_has("failed to read");
}

#[test]
fn malformed_yaml_is_rejected() {
    let project = Project::empty();
    let path = project.file("targets.yml", "- task: [unclosed\n");
    sync(&path).fails().code(2).stderr_has("invalid batch config");
}

#[test]
fn unknown_field_is_rejected() {
    let project = Project::empty();
    let path = project.file(
        "targets.yml",
        "- task: web\n  image: app:2\n  cluster: prod\n  replicas: 3\n",
    );
    sync(&path).fails().code(2).stderr_has("replicas");
}

#[test]
fn empty_batch_is_rejected() {
    let project = Project::empty();
    let path = project.file("targets.yml", "[]\n");
    sync(&path).fails().code(2).stderr_has("declares no targets");
}

#[test]
fn bad_image_in_later_entry_rejects_whole_batch() {
    let project = Project::empty();
    let path = project.file(
        "targets.yml",
        "- task: migrate\n  image: app:2\n  cluster: prod\n\
         - task: web\n  image: app\n  cluster: prod\n  service: web\n",
    );
    sync(&path)
        .fails()
        .code(2)
        .stderr_has("entry 2")
        .stderr_has("image path is invalid")
        .stdout_lacks("Deploy");
}

#[test]
fn entry_without_cluster_is_rejected() {
    let project = Project::empty();
    let path = project.file("targets.yml", "- task: web\n  image: app:2\n");
    sync(&path).fails().code(2).stderr_has("entry 1: cluster is required");
}
