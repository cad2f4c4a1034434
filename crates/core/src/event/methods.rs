// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event methods: name, target, log summary

use super::{RolloutEvent, TargetLabel};

impl RolloutEvent {
    pub fn name(&self) -> &'static str {
        match self {
            RolloutEvent::BatchStarted { .. } => "batch:started",
            RolloutEvent::ImagesVerified { .. } => "batch:verified",
            RolloutEvent::TargetStarted { .. } => "target:started",
            RolloutEvent::Planned { .. } => "target:planned",
            RolloutEvent::DiffRendered { .. } => "target:diff",
            RolloutEvent::Registered { .. } => "spec:registered",
            RolloutEvent::ServiceUpdated { .. } => "service:updated",
            RolloutEvent::ServiceWaiting { .. } => "service:waiting",
            RolloutEvent::TasksStarted { .. } => "tasks:started",
            RolloutEvent::TasksWaiting { .. } => "tasks:waiting",
            RolloutEvent::TaskWaitSkipped { .. } => "tasks:wait:skipped",
            RolloutEvent::TargetFinished { .. } => "target:finished",
            RolloutEvent::TargetFailed { .. } => "target:failed",
            RolloutEvent::BatchFinished { .. } => "batch:finished",
        }
    }

    /// The target this event concerns, if any.
    pub fn target(&self) -> Option<&TargetLabel> {
        match self {
            RolloutEvent::TargetStarted { target, .. }
            | RolloutEvent::Planned { target, .. }
            | RolloutEvent::DiffRendered { target, .. }
            | RolloutEvent::Registered { target, .. }
            | RolloutEvent::ServiceUpdated { target, .. }
            | RolloutEvent::ServiceWaiting { target }
            | RolloutEvent::TasksStarted { target, .. }
            | RolloutEvent::TasksWaiting { target, .. }
            | RolloutEvent::TaskWaitSkipped { target }
            | RolloutEvent::TargetFinished { target, .. }
            | RolloutEvent::TargetFailed { target, .. } => Some(target),
            RolloutEvent::BatchStarted { .. }
            | RolloutEvent::ImagesVerified { .. }
            | RolloutEvent::BatchFinished { .. } => None,
        }
    }

    /// One-line `name key=value` form for tracing.
    pub fn log_summary(&self) -> String {
        let t = self.name();
        match self {
            RolloutEvent::BatchStarted { targets, dry_run } => {
                format!("{t} targets={targets} dry_run={dry_run}")
            }
            RolloutEvent::ImagesVerified { images } => format!("{t} images={}", images.len()),
            RolloutEvent::TargetStarted { index, total, target } => {
                format!("{t} {} index={}/{total}", fields(target), index + 1)
            }
            RolloutEvent::Planned { target, previous, candidate, changed, .. } => format!(
                "{t} {} from={} to={} changed={changed}",
                fields(target),
                previous.label,
                candidate.label
            ),
            RolloutEvent::DiffRendered { target, diff } => {
                format!("{t} {} changes={}", fields(target), diff.changed_pairs().len())
            }
            RolloutEvent::Registered { target, task_definition } => {
                format!("{t} {} task_definition={task_definition}", fields(target))
            }
            RolloutEvent::ServiceUpdated { target, task_definition, desired_count } => format!(
                "{t} {} task_definition={task_definition} desired={desired_count}",
                fields(target)
            ),
            RolloutEvent::TasksStarted { target, task_arns }
            | RolloutEvent::TasksWaiting { target, task_arns } => {
                format!("{t} {} tasks={}", fields(target), task_arns.len())
            }
            RolloutEvent::ServiceWaiting { target } | RolloutEvent::TaskWaitSkipped { target } => {
                format!("{t} {}", fields(target))
            }
            RolloutEvent::TargetFinished { target, outcome } => {
                format!("{t} {} outcome={outcome}", fields(target))
            }
            RolloutEvent::TargetFailed { target, error } => {
                format!("{t} {} error={error}", fields(target))
            }
            RolloutEvent::BatchFinished { completed, total } => {
                format!("{t} completed={completed}/{total}")
            }
        }
    }
}

fn fields(target: &TargetLabel) -> String {
    format!("cluster={} {}={}", target.cluster, target.shape_key(), target.name)
}

impl TargetLabel {
    fn shape_key(&self) -> &'static str {
        match self.shape {
            super::RolloutShape::Service => "service",
            super::RolloutShape::OneOff => "family",
        }
    }
}
