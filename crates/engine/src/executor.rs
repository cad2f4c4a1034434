// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rollout executor: fetch, mutate, diff, register, roll out, wait.

use std::time::Duration;

use roll_adapters::{ControlPlaneAdapter, RegistryAdapter};
use roll_core::{
    render_specs, substitutions_for, ImageReference, RolloutEvent, RolloutOutcome, RolloutTarget,
    ServiceState, SpecSummary, Substitutions, TargetLabel, TaskSpecification,
};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::{RolloutError, TargetFailure};
use crate::mutate::{mutate, Mutation};
use crate::report::Reporter;
use crate::wait::{wait_for_service, wait_for_tasks, WaitPolicy};

/// Default ceiling for a service to report stable.
pub const DEFAULT_SERVICE_WAIT: Duration = Duration::from_secs(600);

/// Progress of one rollout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RolloutState {
    Fetched,
    Mutated,
    Unchanged,
    Registered,
    RolledOut,
    Stable,
    Failed,
}

roll_core::simple_display! {
    RolloutState {
        Fetched => "fetched",
        Mutated => "mutated",
        Unchanged => "unchanged",
        Registered => "registered",
        RolledOut => "rolled out",
        Stable => "stable",
        Failed => "failed",
    }
}

/// Where the base task specification comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecSource {
    /// Newest active revision of a family.
    LatestOfFamily(String),
    /// Whatever revision the service currently runs.
    ServiceCurrent,
}

/// One rollout, fully described.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolloutRequest {
    pub target: TargetLabel,
    pub cluster: String,
    pub service: Option<String>,
    pub source: SpecSource,
    pub images: Vec<ImageReference>,
    pub substitutions: Substitutions,
}

impl RolloutRequest {
    /// Rollout of a batch target: start from the latest revision of its family.
    pub fn from_target(target: &RolloutTarget) -> Self {
        Self {
            target: target.label(),
            cluster: target.cluster.clone(),
            service: target.service.clone(),
            source: SpecSource::LatestOfFamily(target.task_family.clone()),
            images: vec![target.image.clone()],
            substitutions: target.substitutions(),
        }
    }

    /// Rollout of a single service from its current revision.
    pub fn deploy(
        cluster: impl Into<String>,
        service: impl Into<String>,
        images: Vec<ImageReference>,
    ) -> Result<Self, RolloutError> {
        let cluster = cluster.into();
        let service = service.into();
        if cluster.is_empty() {
            return Err(RolloutError::Validation("cluster is required".to_string()));
        }
        if service.is_empty() {
            return Err(RolloutError::Validation("service is required".to_string()));
        }
        if images.is_empty() {
            return Err(RolloutError::Validation("at least one image is required".to_string()));
        }
        let substitutions = substitutions_for(images.iter().cloned());
        if substitutions.len() < images.len() {
            tracing::warn!(
                %cluster,
                %service,
                images = images.len(),
                repositories = substitutions.len(),
                "duplicate repositories given; the last image for each wins"
            );
        }
        Ok(Self {
            target: TargetLabel::service(&cluster, &service),
            cluster,
            service: Some(service),
            source: SpecSource::ServiceCurrent,
            images,
            substitutions,
        })
    }
}

/// Knobs shared by every rollout in a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolloutOptions {
    /// Stop after showing the diff; never register or roll out.
    pub dry_run: bool,
    pub service_wait: Duration,
    pub task_wait: WaitPolicy,
}

impl Default for RolloutOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            service_wait: DEFAULT_SERVICE_WAIT,
            task_wait: WaitPolicy::default(),
        }
    }
}

impl RolloutOptions {
    roll_core::setters! {
        set {
            dry_run: bool,
            service_wait: Duration,
            task_wait: WaitPolicy,
        }
    }
}

/// Adapters and reporter the executor drives
pub struct RolloutDeps<R, C, P> {
    pub registry: R,
    pub control_plane: C,
    pub reporter: P,
}

/// Drives one rollout at a time to a terminal state.
pub struct RolloutExecutor<R, C, P> {
    registry: R,
    control_plane: C,
    reporter: P,
    options: RolloutOptions,
    cancel: CancellationToken,
}

impl<R, C, P> RolloutExecutor<R, C, P>
where
    R: RegistryAdapter,
    C: ControlPlaneAdapter,
    P: Reporter,
{
    pub fn new(deps: RolloutDeps<R, C, P>, options: RolloutOptions) -> Self {
        Self {
            registry: deps.registry,
            control_plane: deps.control_plane,
            reporter: deps.reporter,
            options,
            cancel: CancellationToken::new(),
        }
    }

    /// Use `cancel` to interrupt waits.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    pub fn reporter(&self) -> &P {
        &self.reporter
    }

    pub fn options(&self) -> &RolloutOptions {
        &self.options
    }

    /// Run `request` end to end, reporting progress and the final result.
    pub async fn run(&self, request: &RolloutRequest) -> Result<RolloutOutcome, TargetFailure> {
        let start = Instant::now();
        let result = self.execute(request).await;
        let elapsed_ms = start.elapsed().as_millis() as u64;
        let target = request.target.clone();
        match result {
            Ok(outcome) => {
                tracing::info!(rollout = %target, %outcome, elapsed_ms, "rollout finished");
                self.reporter.report(&RolloutEvent::TargetFinished { target, outcome });
                Ok(outcome)
            }
            Err(error) => {
                self.transition(&target, RolloutState::Failed);
                tracing::error!(rollout = %target, error = %error, elapsed_ms, "rollout failed");
                self.reporter.report(&RolloutEvent::TargetFailed {
                    target: target.clone(),
                    error: error.to_string(),
                });
                Err(TargetFailure { target, error })
            }
        }
    }

    async fn execute(&self, request: &RolloutRequest) -> Result<RolloutOutcome, RolloutError> {
        let label = &request.target;

        let (base, service) = self.fetch(request).await?;
        self.transition(label, RolloutState::Fetched);

        let mutation = mutate(&self.registry, &base, &request.substitutions).await?;
        self.transition(label, RolloutState::Mutated);
        self.report_plan(request, &base, &mutation);

        if !mutation.changed {
            self.transition(label, RolloutState::Unchanged);
            return Ok(RolloutOutcome::Unchanged);
        }
        if self.options.dry_run {
            tracing::info!(rollout = %label, "dry run, not committing");
            return Ok(RolloutOutcome::Previewed);
        }
        if self.cancel.is_cancelled() {
            return Err(RolloutError::Cancelled);
        }

        let registered =
            self.control_plane.register_task_definition(&mutation.spec.for_registration()).await?;
        self.transition(label, RolloutState::Registered);
        self.reporter.report(&RolloutEvent::Registered {
            target: label.clone(),
            task_definition: registered.label(),
        });

        match service {
            Some(service) => self.roll_out_service(request, &service, &registered).await,
            None => self.roll_out_task(request, &registered).await,
        }
    }

    /// Base spec plus, for service targets, the service as it stands.
    async fn fetch(
        &self,
        request: &RolloutRequest,
    ) -> Result<(TaskSpecification, Option<ServiceState>), RolloutError> {
        match &request.source {
            SpecSource::LatestOfFamily(family) => {
                let base = self.control_plane.fetch_latest_task_definition(family).await?;
                let service = match request.service.as_deref() {
                    Some(name) => Some(self.fetch_service(&request.cluster, name).await?),
                    None => None,
                };
                Ok((base, service))
            }
            SpecSource::ServiceCurrent => {
                let name = request.service.as_deref().ok_or_else(|| {
                    RolloutError::Validation(format!("{} has no service", request.target))
                })?;
                let service = self.fetch_service(&request.cluster, name).await?;
                let base =
                    self.control_plane.fetch_task_definition(&service.task_definition).await?;
                Ok((base, Some(service)))
            }
        }
    }

    async fn fetch_service(&self, cluster: &str, name: &str) -> Result<ServiceState, RolloutError> {
        let service = self.control_plane.fetch_service(cluster, name).await?;
        tracing::info!(
            cluster = %service.cluster_arn,
            service = %service.name,
            task_definition = %service.task_definition,
            "service fetched"
        );
        Ok(service)
    }

    fn report_plan(&self, request: &RolloutRequest, base: &TaskSpecification, mutation: &Mutation) {
        let summary = |spec: &TaskSpecification, revision: i32| SpecSummary {
            label: format!("{}:{}", spec.family, revision),
            images: spec.images().map(str::to_string).collect(),
        };
        self.reporter.report(&RolloutEvent::Planned {
            target: request.target.clone(),
            images: request.images.clone(),
            previous: summary(base, base.revision),
            candidate: summary(&mutation.spec, base.revision + 1),
            changed: mutation.changed,
            unmatched: mutation.unmatched.clone(),
        });
        self.reporter.report(&RolloutEvent::DiffRendered {
            target: request.target.clone(),
            diff: render_specs(&mutation.spec, base),
        });
    }

    async fn roll_out_service(
        &self,
        request: &RolloutRequest,
        service: &ServiceState,
        registered: &TaskSpecification,
    ) -> Result<RolloutOutcome, RolloutError> {
        let label = &request.target;
        let updated = self.control_plane.update_service(service, registered).await?;
        self.transition(label, RolloutState::RolledOut);
        self.reporter.report(&RolloutEvent::ServiceUpdated {
            target: label.clone(),
            task_definition: updated.task_definition.clone(),
            desired_count: updated.desired_count,
        });

        self.reporter.report(&RolloutEvent::ServiceWaiting { target: label.clone() });
        wait_for_service(
            &self.control_plane,
            &request.cluster,
            &service.name,
            self.options.service_wait,
            &self.cancel,
        )
        .await?;
        self.transition(label, RolloutState::Stable);
        Ok(RolloutOutcome::ServiceStable)
    }

    async fn roll_out_task(
        &self,
        request: &RolloutRequest,
        registered: &TaskSpecification,
    ) -> Result<RolloutOutcome, RolloutError> {
        let label = &request.target;
        let result = self.control_plane.run_task(&request.cluster, registered).await?;
        if !result.failures.is_empty() {
            let reasons: Vec<String> = result.failures.iter().map(ToString::to_string).collect();
            return Err(RolloutError::RemoteOperation(format!(
                "run task {}: {}",
                registered.label(),
                reasons.join("; ")
            )));
        }
        if result.task_arns.is_empty() {
            return Err(RolloutError::RemoteOperation(format!(
                "run task {}: no tasks started",
                registered.label()
            )));
        }
        self.transition(label, RolloutState::RolledOut);
        self.reporter.report(&RolloutEvent::TasksStarted {
            target: label.clone(),
            task_arns: result.task_arns.clone(),
        });

        let policy = &self.options.task_wait;
        if !policy.enabled {
            tracing::info!(rollout = %label, "task completion wait skipped");
            self.reporter.report(&RolloutEvent::TaskWaitSkipped { target: label.clone() });
            return Ok(RolloutOutcome::TasksStarted);
        }

        self.reporter.report(&RolloutEvent::TasksWaiting {
            target: label.clone(),
            task_arns: result.task_arns.clone(),
        });
        wait_for_tasks(
            &self.control_plane,
            &request.cluster,
            &result.task_arns,
            policy,
            &self.cancel,
        )
        .await?;
        self.transition(label, RolloutState::Stable);
        Ok(RolloutOutcome::TasksCompleted)
    }

    fn transition(&self, label: &TargetLabel, state: RolloutState) {
        tracing::info!(rollout = %label, %state, "rollout state");
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
