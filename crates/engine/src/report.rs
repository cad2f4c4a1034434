// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use roll_core::RolloutEvent;

/// Sink for rollout progress.
///
/// Reporting is infallible: presentation problems must never change the
/// outcome of a rollout.
pub trait Reporter: Send + Sync {
    fn report(&self, event: &RolloutEvent);
}

/// Reporter that only logs, for callers without a terminal.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn report(&self, event: &RolloutEvent) {
        tracing::info!("{}", event.log_summary());
    }
}

impl<R: Reporter + ?Sized> Reporter for &R {
    fn report(&self, event: &RolloutEvent) {
        (**self).report(event)
    }
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::Reporter;
    use parking_lot::Mutex;
    use roll_core::RolloutEvent;
    use std::sync::Arc;

    /// Reporter that keeps every event for assertions
    #[derive(Clone, Default)]
    pub struct RecordingReporter {
        events: Arc<Mutex<Vec<RolloutEvent>>>,
    }

    impl RecordingReporter {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn events(&self) -> Vec<RolloutEvent> {
            self.events.lock().clone()
        }

        /// Event names in emission order
        pub fn names(&self) -> Vec<&'static str> {
            self.events.lock().iter().map(RolloutEvent::name).collect()
        }
    }

    impl Reporter for RecordingReporter {
        fn report(&self, event: &RolloutEvent) {
            self.events.lock().push(event.clone());
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::RecordingReporter;
