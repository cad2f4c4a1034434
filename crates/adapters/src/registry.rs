// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use async_trait::async_trait;
use roll_core::{ImageReference, ResolvedImage};
use thiserror::Error;

/// Errors from registry lookups
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("image not found in registry: {image}")]
    ImageNotFound { image: ImageReference },
    #[error("registry request failed: {0}")]
    Api(String),
}

/// Adapter resolving logical images to concrete pull references.
///
/// Lookups are side-effect free and may be repeated; implementations do
/// not cache.
#[async_trait]
pub trait RegistryAdapter: Clone + Send + Sync + 'static {
    async fn resolve(&self, image: &ImageReference) -> Result<ResolvedImage, RegistryError>;
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{RegistryAdapter, RegistryError};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use roll_core::{ImageReference, ResolvedImage};
    use std::collections::HashSet;
    use std::sync::Arc;

    #[derive(Default)]
    struct FakeRegistryState {
        missing: HashSet<ImageReference>,
        failure: Option<RegistryError>,
        calls: Vec<ImageReference>,
    }

    /// Fake registry for testing.
    ///
    /// Every image resolves into the test account unless marked missing.
    #[derive(Clone, Default)]
    pub struct FakeRegistryAdapter {
        inner: Arc<Mutex<FakeRegistryState>>,
    }

    impl FakeRegistryAdapter {
        pub fn new() -> Self {
            Self::default()
        }

        /// Make lookups of `image` fail with `ImageNotFound`.
        pub fn mark_missing(&self, image: &ImageReference) {
            self.inner.lock().missing.insert(image.clone());
        }

        /// Make every subsequent lookup fail with `error`.
        pub fn fail_with(&self, error: RegistryError) {
            self.inner.lock().failure = Some(error);
        }

        /// Every image looked up, in call order.
        pub fn calls(&self) -> Vec<ImageReference> {
            self.inner.lock().calls.clone()
        }
    }

    #[async_trait]
    impl RegistryAdapter for FakeRegistryAdapter {
        async fn resolve(&self, image: &ImageReference) -> Result<ResolvedImage, RegistryError> {
            let mut inner = self.inner.lock();
            inner.calls.push(image.clone());
            if let Some(error) = &inner.failure {
                return Err(error.clone());
            }
            if inner.missing.contains(image) {
                return Err(RegistryError::ImageNotFound { image: image.clone() });
            }
            Ok(roll_core::test_support::resolved(image))
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeRegistryAdapter;

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
