// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use roll_core::task_spec::STATUS_STOPPED;
use roll_core::test_support::{container, spec, task_arn};
use roll_core::{DeploymentSettings, RunFailure, StoppedContainer};

fn web_service() -> ServiceState {
    ServiceState {
        name: "web".to_string(),
        cluster_arn: "prod".to_string(),
        task_definition: task_arn("web", 3),
        desired_count: 4,
        deployment: DeploymentSettings {
            minimum_healthy_percent: Some(50),
            maximum_percent: Some(200),
        },
    }
}

#[tokio::test]
async fn latest_revision_wins() {
    let plane = FakeControlPlane::new();
    plane.add_task_definition(spec("web", 2, vec![container("app", "app:2")]));
    plane.add_task_definition(spec("web", 3, vec![container("app", "app:3")]));
    plane.add_task_definition(spec("other", 9, vec![]));

    let latest = plane.fetch_latest_task_definition("web").await.unwrap();
    assert_eq!(latest.label(), "web:3");
    assert_eq!(latest.arn, Some(task_arn("web", 3)));
}

#[tokio::test]
async fn fetch_by_label_or_arn() {
    let plane = FakeControlPlane::new();
    plane.add_task_definition(spec("web", 3, vec![]));

    assert!(plane.fetch_task_definition("web:3").await.is_ok());
    assert!(plane.fetch_task_definition(&task_arn("web", 3)).await.is_ok());

    let err = plane.fetch_task_definition("web:4").await.unwrap_err();
    assert_eq!(err.to_string(), "task definition not found: web:4");
}

#[tokio::test]
async fn register_assigns_next_revision() {
    let plane = FakeControlPlane::new();
    plane.add_task_definition(spec("web", 3, vec![]));

    let candidate = spec("web", 3, vec![container("app", "app:4")]).for_registration();
    let registered = plane.register_task_definition(&candidate).await.unwrap();
    assert_eq!(registered.revision, 4);
    assert_eq!(registered.containers, candidate.containers);
    assert_eq!(plane.revisions("web").len(), 2);
    assert_eq!(plane.mutations().len(), 1);
}

#[tokio::test]
async fn update_service_keeps_count_and_deployment() {
    let plane = FakeControlPlane::new();
    plane.add_service("prod", web_service());
    let next = spec("web", 4, vec![]);

    let service = plane.fetch_service("prod", "web").await.unwrap();
    let updated = plane.update_service(&service, &next).await.unwrap();
    assert_eq!(updated.task_definition, "web:4");
    assert_eq!(updated.desired_count, 4);
    assert_eq!(updated.deployment, web_service().deployment);
    assert_eq!(plane.service("prod", "web"), Some(updated));
}

#[tokio::test]
async fn missing_service_is_not_found() {
    let plane = FakeControlPlane::new();
    let err = plane.fetch_service("prod", "api").await.unwrap_err();
    assert_eq!(err, ControlPlaneError::service_not_found("prod", "api"));
    assert_eq!(err.to_string(), "service not found: prod/api");
}

#[tokio::test]
async fn scripted_failures_apply_per_operation() {
    let plane = FakeControlPlane::new();
    plane.add_service("prod", web_service());
    plane.fail_on("wait_service_stable", ControlPlaneError::Wait("max wait exceeded".into()));

    assert!(plane.fetch_service("prod", "web").await.is_ok());
    let err = plane.wait_service_stable("prod", "web", Duration::from_secs(5)).await.unwrap_err();
    assert_eq!(err.to_string(), "wait failed: max wait exceeded");
    assert_eq!(plane.operations(), vec!["fetch_service", "wait_service_stable"]);
}

#[tokio::test]
async fn run_task_reports_scripted_failures() {
    let plane = FakeControlPlane::new();
    let task = spec("migrate", 1, vec![]);

    let ok = plane.run_task("prod", &task).await.unwrap();
    assert_eq!(ok.task_arns.len(), 1);
    assert!(ok.failures.is_empty());

    plane.set_run_failures(vec![RunFailure { arn: None, reason: "RESOURCE:MEMORY".into() }]);
    let failed = plane.run_task("prod", &task).await.unwrap();
    assert!(failed.task_arns.is_empty());
    assert_eq!(failed.failures.len(), 1);
}

#[tokio::test]
async fn task_polls_drain_then_report_clean_stop() {
    let plane = FakeControlPlane::new();
    let arns = vec!["arn:task/1".to_string()];
    plane.push_task_poll(vec![TaskStatus {
        task_arn: arns[0].clone(),
        last_status: "RUNNING".into(),
        stopped_reason: None,
        stop_code: None,
        containers: vec![StoppedContainer { name: "main".into(), exit_code: None }],
    }]);

    let first = plane.describe_tasks("prod", &arns).await.unwrap();
    assert!(!first[0].is_stopped());

    let second = plane.describe_tasks("prod", &arns).await.unwrap();
    assert_eq!(second[0].last_status, STATUS_STOPPED);
    assert_eq!(second[0].failed_containers().count(), 0);
    assert_eq!(second[0].abnormal_stop_code(), None);
}
