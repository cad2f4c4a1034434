// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

use async_trait::async_trait;
use roll_core::{RunTaskResult, ServiceState, TaskSpecification, TaskStatus};
use thiserror::Error;

/// Errors from control-plane operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControlPlaneError {
    #[error("{kind} not found: {name}")]
    NotFound { kind: &'static str, name: String },
    #[error("request rejected: {0}")]
    Rejected(String),
    #[error("wait failed: {0}")]
    Wait(String),
    #[error("control plane request failed: {0}")]
    Api(String),
}

impl ControlPlaneError {
    pub fn task_definition_not_found(name: impl Into<String>) -> Self {
        Self::NotFound { kind: "task definition", name: name.into() }
    }

    pub fn service_not_found(cluster: &str, service: &str) -> Self {
        Self::NotFound { kind: "service", name: format!("{}/{}", cluster, service) }
    }
}

/// Adapter for the container control plane (task definitions, services,
/// standalone tasks).
#[async_trait]
pub trait ControlPlaneAdapter: Clone + Send + Sync + 'static {
    /// Fetch one revision by `family:revision` or ARN.
    async fn fetch_task_definition(&self, name: &str)
        -> Result<TaskSpecification, ControlPlaneError>;

    /// Fetch the newest active revision of a family.
    async fn fetch_latest_task_definition(
        &self,
        family: &str,
    ) -> Result<TaskSpecification, ControlPlaneError>;

    async fn fetch_service(
        &self,
        cluster: &str,
        service: &str,
    ) -> Result<ServiceState, ControlPlaneError>;

    /// Register `spec` as a new revision of its family. Returns the
    /// registered revision as assigned by the control plane.
    async fn register_task_definition(
        &self,
        spec: &TaskSpecification,
    ) -> Result<TaskSpecification, ControlPlaneError>;

    /// Point `service` at `spec`, keeping its desired count and deployment
    /// configuration.
    async fn update_service(
        &self,
        service: &ServiceState,
        spec: &TaskSpecification,
    ) -> Result<ServiceState, ControlPlaneError>;

    /// Block until the service reports stable, or `max_wait` elapses.
    async fn wait_service_stable(
        &self,
        cluster: &str,
        service: &str,
        max_wait: Duration,
    ) -> Result<(), ControlPlaneError>;

    async fn run_task(
        &self,
        cluster: &str,
        spec: &TaskSpecification,
    ) -> Result<RunTaskResult, ControlPlaneError>;

    async fn describe_tasks(
        &self,
        cluster: &str,
        task_arns: &[String],
    ) -> Result<Vec<TaskStatus>, ControlPlaneError>;
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{ControlPlaneAdapter, ControlPlaneError};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use roll_core::task_spec::STATUS_STOPPED;
    use roll_core::test_support::task_arn;
    use roll_core::{
        DeploymentSettings, RunFailure, RunTaskResult, ServiceState, StoppedContainer,
        TaskSpecification, TaskStatus,
    };
    use std::collections::{HashMap, VecDeque};
    use std::sync::Arc;
    use std::time::Duration;

    /// Recorded control-plane call
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum ControlPlaneCall {
        FetchTaskDefinition { name: String },
        FetchLatestTaskDefinition { family: String },
        FetchService { cluster: String, service: String },
        RegisterTaskDefinition { spec: TaskSpecification },
        UpdateService {
            cluster: String,
            service: String,
            task_definition: String,
            desired_count: i32,
            deployment: DeploymentSettings,
        },
        WaitServiceStable { cluster: String, service: String, max_wait: Duration },
        RunTask { cluster: String, task_definition: String },
        DescribeTasks { cluster: String, task_arns: Vec<String> },
    }

    impl ControlPlaneCall {
        pub fn operation(&self) -> &'static str {
            match self {
                ControlPlaneCall::FetchTaskDefinition { .. } => "fetch_task_definition",
                ControlPlaneCall::FetchLatestTaskDefinition { .. } => {
                    "fetch_latest_task_definition"
                }
                ControlPlaneCall::FetchService { .. } => "fetch_service",
                ControlPlaneCall::RegisterTaskDefinition { .. } => "register_task_definition",
                ControlPlaneCall::UpdateService { .. } => "update_service",
                ControlPlaneCall::WaitServiceStable { .. } => "wait_service_stable",
                ControlPlaneCall::RunTask { .. } => "run_task",
                ControlPlaneCall::DescribeTasks { .. } => "describe_tasks",
            }
        }

        /// Whether this call changes remote state.
        pub fn is_mutation(&self) -> bool {
            matches!(
                self,
                ControlPlaneCall::RegisterTaskDefinition { .. }
                    | ControlPlaneCall::UpdateService { .. }
                    | ControlPlaneCall::RunTask { .. }
            )
        }
    }

    #[derive(Default)]
    struct FakeControlPlaneState {
        task_definitions: Vec<TaskSpecification>,
        services: HashMap<(String, String), ServiceState>,
        failures: HashMap<&'static str, ControlPlaneError>,
        run_failures: Vec<RunFailure>,
        task_polls: VecDeque<Vec<TaskStatus>>,
        next_task: usize,
        calls: Vec<ControlPlaneCall>,
    }

    impl FakeControlPlaneState {
        fn check(&self, operation: &'static str) -> Result<(), ControlPlaneError> {
            match self.failures.get(operation) {
                Some(error) => Err(error.clone()),
                None => Ok(()),
            }
        }
    }

    /// In-memory control plane for testing.
    ///
    /// Revisions registered here get the next revision number of their family
    /// and become fetchable. Task polls return scripted statuses in order,
    /// then report every task stopped with exit code 0.
    #[derive(Clone, Default)]
    pub struct FakeControlPlane {
        inner: Arc<Mutex<FakeControlPlaneState>>,
    }

    impl FakeControlPlane {
        pub fn new() -> Self {
            Self::default()
        }

        /// Seed an existing revision. An ARN is assigned if missing.
        pub fn add_task_definition(&self, mut spec: TaskSpecification) {
            if spec.arn.is_none() {
                spec.arn = Some(task_arn(&spec.family, spec.revision));
            }
            self.inner.lock().task_definitions.push(spec);
        }

        /// Seed a service, keyed by `(cluster, name)`.
        pub fn add_service(&self, cluster: &str, service: ServiceState) {
            self.inner.lock().services.insert((cluster.to_string(), service.name.clone()), service);
        }

        /// Make every call of `operation` (see [`ControlPlaneCall::operation`])
        /// fail with `error`.
        pub fn fail_on(&self, operation: &'static str, error: ControlPlaneError) {
            self.inner.lock().failures.insert(operation, error);
        }

        /// Failures reported by the next `run_task` responses.
        pub fn set_run_failures(&self, failures: Vec<RunFailure>) {
            self.inner.lock().run_failures = failures;
        }

        /// Queue the statuses returned by the next `describe_tasks` call.
        pub fn push_task_poll(&self, statuses: Vec<TaskStatus>) {
            self.inner.lock().task_polls.push_back(statuses);
        }

        pub fn calls(&self) -> Vec<ControlPlaneCall> {
            self.inner.lock().calls.clone()
        }

        /// Recorded calls that would change remote state.
        pub fn mutations(&self) -> Vec<ControlPlaneCall> {
            self.calls().into_iter().filter(ControlPlaneCall::is_mutation).collect()
        }

        pub fn operations(&self) -> Vec<&'static str> {
            self.calls().iter().map(ControlPlaneCall::operation).collect()
        }

        pub fn service(&self, cluster: &str, name: &str) -> Option<ServiceState> {
            self.inner.lock().services.get(&(cluster.to_string(), name.to_string())).cloned()
        }

        /// All revisions of `family`, oldest first.
        pub fn revisions(&self, family: &str) -> Vec<TaskSpecification> {
            let mut revisions: Vec<_> = self
                .inner
                .lock()
                .task_definitions
                .iter()
                .filter(|t| t.family == family)
                .cloned()
                .collect();
            revisions.sort_by_key(|t| t.revision);
            revisions
        }
    }

    #[async_trait]
    impl ControlPlaneAdapter for FakeControlPlane {
        async fn fetch_task_definition(
            &self,
            name: &str,
        ) -> Result<TaskSpecification, ControlPlaneError> {
            let mut inner = self.inner.lock();
            inner.calls.push(ControlPlaneCall::FetchTaskDefinition { name: name.to_string() });
            inner.check("fetch_task_definition")?;
            inner
                .task_definitions
                .iter()
                .find(|t| t.label() == name || t.arn.as_deref() == Some(name))
                .cloned()
                .ok_or_else(|| ControlPlaneError::task_definition_not_found(name))
        }

        async fn fetch_latest_task_definition(
            &self,
            family: &str,
        ) -> Result<TaskSpecification, ControlPlaneError> {
            let mut inner = self.inner.lock();
            inner
                .calls
                .push(ControlPlaneCall::FetchLatestTaskDefinition { family: family.to_string() });
            inner.check("fetch_latest_task_definition")?;
            inner
                .task_definitions
                .iter()
                .filter(|t| t.family == family)
                .max_by_key(|t| t.revision)
                .cloned()
                .ok_or_else(|| ControlPlaneError::task_definition_not_found(family))
        }

        async fn fetch_service(
            &self,
            cluster: &str,
            service: &str,
        ) -> Result<ServiceState, ControlPlaneError> {
            let mut inner = self.inner.lock();
            inner.calls.push(ControlPlaneCall::FetchService {
                cluster: cluster.to_string(),
                service: service.to_string(),
            });
            inner.check("fetch_service")?;
            inner
                .services
                .get(&(cluster.to_string(), service.to_string()))
                .cloned()
                .ok_or_else(|| ControlPlaneError::service_not_found(cluster, service))
        }

        async fn register_task_definition(
            &self,
            spec: &TaskSpecification,
        ) -> Result<TaskSpecification, ControlPlaneError> {
            let mut inner = self.inner.lock();
            inner.calls.push(ControlPlaneCall::RegisterTaskDefinition { spec: spec.clone() });
            inner.check("register_task_definition")?;
            let revision = inner
                .task_definitions
                .iter()
                .filter(|t| t.family == spec.family)
                .map(|t| t.revision)
                .max()
                .unwrap_or(0)
                + 1;
            let registered = TaskSpecification {
                revision,
                arn: Some(task_arn(&spec.family, revision)),
                ..spec.clone()
            };
            inner.task_definitions.push(registered.clone());
            Ok(registered)
        }

        async fn update_service(
            &self,
            service: &ServiceState,
            spec: &TaskSpecification,
        ) -> Result<ServiceState, ControlPlaneError> {
            let mut inner = self.inner.lock();
            inner.calls.push(ControlPlaneCall::UpdateService {
                cluster: service.cluster_arn.clone(),
                service: service.name.clone(),
                task_definition: spec.reference(),
                desired_count: service.desired_count,
                deployment: service.deployment.clone(),
            });
            inner.check("update_service")?;
            let updated = ServiceState { task_definition: spec.reference(), ..service.clone() };
            if let Some(stored) = inner.services.values_mut().find(|s| {
                s.name == service.name && s.cluster_arn == service.cluster_arn
            }) {
                *stored = updated.clone();
            }
            Ok(updated)
        }

        async fn wait_service_stable(
            &self,
            cluster: &str,
            service: &str,
            max_wait: Duration,
        ) -> Result<(), ControlPlaneError> {
            let mut inner = self.inner.lock();
            inner.calls.push(ControlPlaneCall::WaitServiceStable {
                cluster: cluster.to_string(),
                service: service.to_string(),
                max_wait,
            });
            inner.check("wait_service_stable")
        }

        async fn run_task(
            &self,
            cluster: &str,
            spec: &TaskSpecification,
        ) -> Result<RunTaskResult, ControlPlaneError> {
            let mut inner = self.inner.lock();
            inner.calls.push(ControlPlaneCall::RunTask {
                cluster: cluster.to_string(),
                task_definition: spec.reference(),
            });
            inner.check("run_task")?;
            if !inner.run_failures.is_empty() {
                return Ok(RunTaskResult {
                    task_arns: Vec::new(),
                    failures: inner.run_failures.clone(),
                });
            }
            inner.next_task += 1;
            let arn = format!("arn:aws:ecs:fake:000000000000:task/{}/{}", cluster, inner.next_task);
            Ok(RunTaskResult { task_arns: vec![arn], failures: Vec::new() })
        }

        async fn describe_tasks(
            &self,
            cluster: &str,
            task_arns: &[String],
        ) -> Result<Vec<TaskStatus>, ControlPlaneError> {
            let mut inner = self.inner.lock();
            inner.calls.push(ControlPlaneCall::DescribeTasks {
                cluster: cluster.to_string(),
                task_arns: task_arns.to_vec(),
            });
            inner.check("describe_tasks")?;
            if let Some(statuses) = inner.task_polls.pop_front() {
                return Ok(statuses);
            }
            Ok(task_arns
                .iter()
                .map(|arn| TaskStatus {
                    task_arn: arn.clone(),
                    last_status: STATUS_STOPPED.to_string(),
                    stopped_reason: Some("Essential container in task exited".to_string()),
                    stop_code: Some("EssentialContainerExited".to_string()),
                    containers: vec![StoppedContainer {
                        name: "main".to_string(),
                        exit_code: Some(0),
                    }],
                })
                .collect())
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{ControlPlaneCall, FakeControlPlane};

#[cfg(test)]
#[path = "control_plane_tests.rs"]
mod tests;
