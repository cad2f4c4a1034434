// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Terminal rendering of rollout events.

use std::io::Write;

use parking_lot::Mutex;
use roll_core::{
    Diff, ImageReference, LineKind, RolloutEvent, RolloutOutcome, RolloutShape, SpecSummary,
    TargetLabel,
};
use roll_engine::Reporter;

use crate::color::{codes, paint};

/// Writes human-readable progress for each event.
pub struct TerminalReporter<W> {
    out: Mutex<W>,
    color: bool,
}

impl TerminalReporter<std::io::Stdout> {
    pub fn stdout(color: bool) -> Self {
        Self::new(std::io::stdout(), color)
    }
}

impl<W: Write + Send> TerminalReporter<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self { out: Mutex::new(out), color }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }

    fn paint(&self, code: u8, text: &str) -> String {
        paint(code, text, self.color)
    }

    /// Lines printed for `event`, without trailing newlines.
    pub fn render(&self, event: &RolloutEvent) -> Vec<String> {
        match event {
            RolloutEvent::BatchStarted { targets, dry_run } => {
                let mode = if *dry_run { " (dry run)" } else { "" };
                let header = format!("Rolling out {} target(s){}", targets, mode);
                vec![self.paint(codes::HEADER, &header)]
            }
            RolloutEvent::ImagesVerified { images } => {
                let images: Vec<String> = images.iter().map(ImageReference::to_string).collect();
                vec![self.paint(codes::CONTEXT, &format!("Verified images: {}", images.join(", ")))]
            }
            RolloutEvent::TargetStarted { index, total, target } => {
                vec![self.paint(codes::HEADER, &format!("[{}/{}] {}", index + 1, total, target))]
            }
            RolloutEvent::Planned { target, images, previous, candidate, changed, unmatched } => {
                self.workflow(target, images, previous, candidate, *changed, unmatched)
            }
            RolloutEvent::DiffRendered { diff, .. } => self.diff(diff),
            RolloutEvent::Registered { task_definition, .. } => {
                vec![self.step(&format!("Registered task definition: {}", task_definition))]
            }
            RolloutEvent::ServiceUpdated { target, task_definition, desired_count } => {
                vec![self.step(&format!(
                    "Updated service {}: task definition {}, task count {}",
                    target.name, task_definition, desired_count
                ))]
            }
            RolloutEvent::ServiceWaiting { target } => {
                vec![self.step(&format!("Waiting until service {} is stable...", target.name))]
            }
            RolloutEvent::TasksStarted { target, task_arns } => {
                vec![self.step(&format!(
                    "Started {} task(s) of {} on cluster {}",
                    task_arns.len(),
                    target.name,
                    target.cluster
                ))]
            }
            RolloutEvent::TasksWaiting { target, .. } => {
                vec![self.step(&format!("Waiting until {} finishes...", target.name))]
            }
            RolloutEvent::TaskWaitSkipped { target } => {
                vec![self.paint(
                    codes::MUTED,
                    &format!("\tNot waiting for {} to finish", target.name),
                )]
            }
            RolloutEvent::TargetFinished { outcome, .. } => vec![self.finished(*outcome)],
            RolloutEvent::TargetFailed { error, .. } => {
                vec![self.paint(codes::REMOVED, &format!("\tFailed: {}", error))]
            }
            RolloutEvent::BatchFinished { completed, total } if completed == total => {
                let line = format!("Finished {} of {} target(s)", completed, total);
                vec![self.paint(codes::ADDED, &line)]
            }
            RolloutEvent::BatchFinished { completed, total } => vec![self.paint(
                codes::REMOVED,
                &format!("Stopped after {} of {} target(s)", completed, total),
            )],
        }
    }

    fn step(&self, text: &str) -> String {
        self.paint(codes::ADDED, &format!("\t{}", text))
    }

    fn workflow(
        &self,
        target: &TargetLabel,
        images: &[ImageReference],
        previous: &SpecSummary,
        candidate: &SpecSummary,
        changed: bool,
        unmatched: &[String],
    ) -> Vec<String> {
        let mut lines = vec![match target.shape {
            RolloutShape::Service => "Deploy service task:".to_string(),
            RolloutShape::OneOff => "Deploy oneshot task:".to_string(),
        }];
        lines.push(format!("\tcluster: {}", target.cluster));
        if target.shape == RolloutShape::Service {
            lines.push(format!("\tservice: {}", target.name));
        }
        lines.push(format!("\ttask definition: {}", family_of(&previous.label)));
        lines.push(self.paint(codes::REMOVED, &format!("\t\t- {}", previous.label)));
        for image in &previous.images {
            lines.push(self.paint(codes::REMOVED, &format!("\t\t- {}", image)));
        }
        if changed {
            lines.push(self.paint(codes::ADDED, &format!("\t\t+ {}", candidate.label)));
            for image in &candidate.images {
                lines.push(self.paint(codes::ADDED, &format!("\t\t+ {}", image)));
            }
        }
        let images: Vec<String> = images.iter().map(ImageReference::to_string).collect();
        lines.push(format!("\tcontainer image: {}", images.join(", ")));
        for key in unmatched {
            lines.push(self.paint(codes::MUTED, &format!("\tno container named {}", key)));
        }
        lines
    }

    fn diff(&self, diff: &Diff) -> Vec<String> {
        if !diff.has_changes() {
            return Vec::new();
        }
        diff.lines
            .iter()
            .map(|line| match line.kind {
                LineKind::Same => line.text.clone(),
                LineKind::Removed => self.paint(codes::REMOVED, &format!("-{}", line.text)),
                LineKind::Added => self.paint(codes::ADDED, &format!("+{}", line.text)),
            })
            .collect()
    }

    fn finished(&self, outcome: RolloutOutcome) -> String {
        match outcome {
            RolloutOutcome::Unchanged => {
                self.paint(codes::MUTED, "\tNothing to deploy: images already in place")
            }
            RolloutOutcome::Previewed => self.paint(codes::MUTED, "\tDry run: nothing registered"),
            outcome => self.step(&format!("Finished: {}", outcome)),
        }
    }
}

impl<W: Write + Send> Reporter for TerminalReporter<W> {
    fn report(&self, event: &RolloutEvent) {
        let mut out = self.out.lock();
        for line in self.render(event) {
            if let Err(e) = writeln!(out, "{}", line) {
                tracing::debug!(error = %e, "terminal output failed");
                return;
            }
        }
        let _ = out.flush();
    }
}

fn family_of(label: &str) -> &str {
    label.rsplit_once(':').map_or(label, |(family, _)| family)
}

#[cfg(test)]
#[path = "report_tests.rs"]
mod tests;
