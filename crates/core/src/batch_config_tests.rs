// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::io::Write;

const TWO_TARGETS: &str = r#"
- task: db-migrate
  image: app:2
  cluster: prod
- task: web
  image: app:2
  cluster: prod
  service: web
"#;

#[test]
fn parses_targets_in_declared_order() {
    let targets = parse_batch(TWO_TARGETS).unwrap();
    assert_eq!(targets.len(), 2);

    assert_eq!(targets[0].task_family, "db-migrate");
    assert_eq!(targets[0].service, None);
    assert_eq!(targets[0].image.to_string(), "app:2");

    assert_eq!(targets[1].task_family, "web");
    assert_eq!(targets[1].service.as_deref(), Some("web"));
    assert_eq!(targets[1].cluster, "prod");
}

#[test]
fn empty_service_means_one_off() {
    let yaml = "- {task: t, image: 'app:1', cluster: c, service: ''}";
    let targets = parse_batch(yaml).unwrap();
    assert_eq!(targets[0].service, None);
}

#[yare::parameterized(
    missing_cluster = { "- {task: t, image: 'app:1'}", "entry 1: cluster is required" },
    empty_task      = { "- {task: '', image: 'app:1', cluster: c}", "entry 1: task is required" },
    second_entry    = {
        "- {task: t, image: 'app:1', cluster: c}\n- {task: u, image: 'app', cluster: c}",
        "entry 2: image path is invalid: \"app\" (expected repository:tag)"
    },
    empty_document  = { "", "batch config declares no targets" },
    empty_sequence  = { "[]", "batch config declares no targets" },
)]
fn rejects_invalid_entries(yaml: &str, message: &str) {
    let err = parse_batch(yaml).unwrap_err();
    assert_eq!(err.to_string(), message);
}

#[test]
fn rejects_unknown_keys() {
    let err = parse_batch("- {task: t, image: 'app:1', cluster: c, replicas: 3}").unwrap_err();
    assert!(matches!(err, BatchConfigError::Parse(_)), "got {err:?}");
    assert!(err.to_string().contains("replicas"));
}

#[test]
fn rejects_non_sequence() {
    let err = parse_batch("task: t").unwrap_err();
    assert!(matches!(err, BatchConfigError::Parse(_)));
}

#[test]
fn load_reads_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(TWO_TARGETS.as_bytes()).unwrap();

    let targets = load_batch(file.path()).unwrap();
    assert_eq!(targets.len(), 2);
}

#[test]
fn load_reports_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.yml");
    let err = load_batch(&path).unwrap_err();
    assert!(matches!(err, BatchConfigError::Read { .. }));
    assert!(err.to_string().contains("absent.yml"));
}
