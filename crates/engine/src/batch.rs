// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sequential multi-target rollout with up-front image validation.

use roll_adapters::{ControlPlaneAdapter, RegistryAdapter};
use roll_core::{ImageReference, RolloutEvent, RolloutOutcome, RolloutTarget, TargetLabel};

use crate::error::{BatchError, RolloutError};
use crate::executor::{RolloutExecutor, RolloutRequest};
use crate::report::Reporter;

/// Outcome of every target of a completed batch, in declared order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub outcomes: Vec<(TargetLabel, RolloutOutcome)>,
}

impl BatchReport {
    /// Targets that registered a new revision.
    pub fn committed(&self) -> usize {
        self.outcomes.iter().filter(|(_, outcome)| outcome.committed()).count()
    }
}

/// Runs batch targets one after another, halting on the first failure.
pub struct BatchOrchestrator<R, C, P> {
    executor: RolloutExecutor<R, C, P>,
}

impl<R, C, P> BatchOrchestrator<R, C, P>
where
    R: RegistryAdapter,
    C: ControlPlaneAdapter,
    P: Reporter,
{
    pub fn new(executor: RolloutExecutor<R, C, P>) -> Self {
        Self { executor }
    }

    pub fn executor(&self) -> &RolloutExecutor<R, C, P> {
        &self.executor
    }

    pub async fn run(&self, targets: &[RolloutTarget]) -> Result<BatchReport, BatchError> {
        let reporter = self.executor.reporter();
        let total = targets.len();
        reporter.report(&RolloutEvent::BatchStarted {
            targets: total,
            dry_run: self.executor.options().dry_run,
        });

        let images = self.preflight(targets).await.map_err(BatchError::Preflight)?;
        reporter.report(&RolloutEvent::ImagesVerified { images });

        let mut report = BatchReport::default();
        for (index, target) in targets.iter().enumerate() {
            let request = RolloutRequest::from_target(target);
            reporter.report(&RolloutEvent::TargetStarted {
                index,
                total,
                target: request.target.clone(),
            });
            match self.executor.run(&request).await {
                Ok(outcome) => report.outcomes.push((request.target, outcome)),
                Err(failure) => {
                    reporter.report(&RolloutEvent::BatchFinished { completed: index, total });
                    if index + 1 < total {
                        tracing::warn!(skipped = total - index - 1, "batch halted");
                    }
                    return Err(BatchError::Target { index, total, failure });
                }
            }
        }

        reporter.report(&RolloutEvent::BatchFinished { completed: total, total });
        Ok(report)
    }

    /// Resolve every distinct image before anything is touched.
    async fn preflight(
        &self,
        targets: &[RolloutTarget],
    ) -> Result<Vec<ImageReference>, RolloutError> {
        let mut images: Vec<ImageReference> = Vec::new();
        for target in targets {
            if !images.contains(&target.image) {
                images.push(target.image.clone());
            }
        }
        for image in &images {
            self.executor.registry().resolve(image).await?;
            tracing::debug!(%image, "image verified");
        }
        tracing::info!(images = images.len(), "all images verified");
        Ok(images)
    }
}

#[cfg(test)]
#[path = "batch_tests.rs"]
mod tests;
