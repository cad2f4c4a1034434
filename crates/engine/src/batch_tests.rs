// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::error::ErrorKind;
use crate::executor::{RolloutDeps, RolloutOptions};
use crate::report::RecordingReporter;
use roll_adapters::{FakeControlPlane, FakeRegistryAdapter};
use roll_core::test_support::{container, image, pull, spec, task_arn};
use roll_core::ServiceState;

struct TestHarness {
    registry: FakeRegistryAdapter,
    plane: FakeControlPlane,
    reporter: RecordingReporter,
}

impl TestHarness {
    fn orchestrator(
        &self,
        options: RolloutOptions,
    ) -> BatchOrchestrator<FakeRegistryAdapter, FakeControlPlane, RecordingReporter> {
        BatchOrchestrator::new(RolloutExecutor::new(
            RolloutDeps {
                registry: self.registry.clone(),
                control_plane: self.plane.clone(),
                reporter: self.reporter.clone(),
            },
            options,
        ))
    }
}

fn setup() -> TestHarness {
    let plane = FakeControlPlane::new();
    for family in ["migrate", "web", "worker"] {
        plane.add_task_definition(spec(family, 1, vec![container("app", &pull("app:1"))]));
    }
    plane.add_service(
        "prod",
        ServiceState {
            name: "web".to_string(),
            cluster_arn: "prod".to_string(),
            task_definition: task_arn("web", 1),
            desired_count: 2,
            deployment: Default::default(),
        },
    );
    TestHarness { registry: FakeRegistryAdapter::new(), plane, reporter: RecordingReporter::new() }
}

fn targets(tag: &str) -> Vec<RolloutTarget> {
    vec![
        RolloutTarget::one_off("prod", "migrate", image(tag)),
        RolloutTarget::service("prod", "web", "web", image(tag)),
    ]
}

#[tokio::test]
async fn targets_run_in_declared_order() {
    let harness = setup();
    let report =
        harness.orchestrator(RolloutOptions::default()).run(&targets("app:2")).await.unwrap();

    assert_eq!(
        report.outcomes,
        vec![
            (TargetLabel::one_off("prod", "migrate"), RolloutOutcome::TasksCompleted),
            (TargetLabel::service("prod", "web"), RolloutOutcome::ServiceStable),
        ]
    );
    assert_eq!(report.committed(), 2);

    let names = harness.reporter.names();
    assert_eq!(&names[..3], &["batch:started", "batch:verified", "target:started"]);
    assert_eq!(names.last(), Some(&"batch:finished"));
    assert_eq!(names.iter().filter(|n| **n == "target:diff").count(), 2);
}

#[tokio::test]
async fn missing_image_aborts_before_any_control_plane_call() {
    let harness = setup();
    harness.registry.mark_missing(&image("app:9"));
    let batch = vec![
        RolloutTarget::one_off("prod", "migrate", image("app:9")),
        RolloutTarget::service("prod", "web", "web", image("app:2")),
    ];

    let err = harness.orchestrator(RolloutOptions::default()).run(&batch).await.unwrap_err();

    assert_eq!(err, BatchError::Preflight(RolloutError::ImageNotFound(image("app:9"))));
    assert!(harness.plane.calls().is_empty());
    assert_eq!(harness.reporter.names(), vec!["batch:started"]);
}

#[tokio::test]
async fn preflight_checks_each_distinct_image_once() {
    let harness = setup();
    harness
        .orchestrator(RolloutOptions::default().dry_run(true))
        .run(&targets("app:2"))
        .await
        .unwrap();

    // One preflight lookup, then one per target during mutation
    assert_eq!(harness.registry.calls(), vec![image("app:2"); 3]);
}

#[tokio::test]
async fn failing_target_halts_the_batch() {
    let harness = setup();
    let batch = vec![
        RolloutTarget::one_off("prod", "migrate", image("app:2")),
        RolloutTarget::one_off("prod", "seed", image("app:2")),
        RolloutTarget::one_off("prod", "worker", image("app:2")),
    ];

    let err = harness.orchestrator(RolloutOptions::default()).run(&batch).await.unwrap_err();

    let BatchError::Target { index, total, failure } = &err else {
        panic!("expected target failure, got {err:?}");
    };
    assert_eq!((*index, *total), (1, 3));
    assert_eq!(failure.target, TargetLabel::one_off("prod", "seed"));
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let fetched: Vec<_> = harness
        .plane
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            roll_adapters::ControlPlaneCall::FetchLatestTaskDefinition { family } => Some(family),
            _ => None,
        })
        .collect();
    assert_eq!(fetched, vec!["migrate".to_string(), "seed".to_string()]);
    assert!(harness
        .reporter
        .events()
        .contains(&RolloutEvent::BatchFinished { completed: 1, total: 3 }));
}

#[tokio::test]
async fn dry_run_batch_commits_nothing() {
    let harness = setup();
    let report = harness
        .orchestrator(RolloutOptions::default().dry_run(true))
        .run(&targets("app:2"))
        .await
        .unwrap();

    assert!(report.outcomes.iter().all(|(_, o)| *o == RolloutOutcome::Previewed));
    assert_eq!(report.committed(), 0);
    assert!(harness.plane.mutations().is_empty());
    assert_eq!(harness.reporter.names().iter().filter(|n| **n == "target:diff").count(), 2);
}

#[tokio::test]
async fn unchanged_targets_are_skipped_but_reported() {
    let harness = setup();
    let report =
        harness.orchestrator(RolloutOptions::default()).run(&targets("app:1")).await.unwrap();

    assert!(report.outcomes.iter().all(|(_, o)| *o == RolloutOutcome::Unchanged));
    assert!(harness.plane.mutations().is_empty());
}
