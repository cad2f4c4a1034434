// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use proptest::prelude::*;
use roll_adapters::FakeRegistryAdapter;
use roll_core::test_support::strategies::{arb_substitutions, arb_task_spec};
use roll_core::test_support::{container, image, pull, spec};
use roll_core::{render_specs, substitutions_for};

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(future)
}

/// Everything except container images.
fn without_images(task: &TaskSpecification) -> TaskSpecification {
    let mut task = task.clone();
    for entry in &mut task.containers {
        entry.image.clear();
    }
    task
}

#[tokio::test]
async fn new_tag_changes_matching_container() {
    let registry = FakeRegistryAdapter::new();
    let base = spec(
        "web",
        3,
        vec![container("app", &pull("app:1")), container("nginx", "nginx:1.25")],
    );

    let mutation =
        mutate(&registry, &base, &substitutions_for([image("app:2")])).await.unwrap();

    assert!(mutation.changed);
    assert_eq!(mutation.spec.containers[0].image, pull("app:2"));
    assert_eq!(mutation.spec.containers[1].image, "nginx:1.25");
    assert!(mutation.unmatched.is_empty());

    let diff = render_specs(&mutation.spec, &base);
    assert_eq!(diff.changed_pairs().len(), 1);
}

#[tokio::test]
async fn same_tag_is_unchanged() {
    let registry = FakeRegistryAdapter::new();
    let base = spec("web", 3, vec![container("app", &pull("app:1"))]);

    let mutation =
        mutate(&registry, &base, &substitutions_for([image("app:1")])).await.unwrap();

    assert!(!mutation.changed);
    assert_eq!(mutation.spec, base);
    assert!(!render_specs(&mutation.spec, &base).has_changes());
    // The image was still looked up
    assert_eq!(registry.calls(), vec![image("app:1")]);
}

#[tokio::test]
async fn distinct_images_resolve_once() {
    let registry = FakeRegistryAdapter::new();
    let base = spec(
        "web",
        3,
        vec![container("app", "app:old"), container("app-worker", "app:old")],
    );
    let mut substitutions = Substitutions::new();
    substitutions.insert("app".to_string(), image("app:2"));
    substitutions.insert("app-worker".to_string(), image("app:2"));

    let mutation = mutate(&registry, &base, &substitutions).await.unwrap();

    assert!(mutation.spec.images().all(|i| i == pull("app:2")));
    assert_eq!(registry.calls(), vec![image("app:2")]);
}

#[tokio::test]
async fn missing_image_aborts_mutation() {
    let registry = FakeRegistryAdapter::new();
    registry.mark_missing(&image("app:9"));
    let base = spec("web", 3, vec![container("app", "app:1")]);

    let err = mutate(&registry, &base, &substitutions_for([image("app:9")])).await.unwrap_err();
    assert_eq!(err, RegistryError::ImageNotFound { image: image("app:9") });
}

#[tokio::test]
async fn unmatched_keys_are_reported_and_not_resolved() {
    let registry = FakeRegistryAdapter::new();
    let base = spec("web", 3, vec![container("app", "app:1")]);

    let mutation =
        mutate(&registry, &base, &substitutions_for([image("worker:2")])).await.unwrap();

    assert!(!mutation.changed);
    assert_eq!(mutation.unmatched, vec!["worker".to_string()]);
    assert!(registry.calls().is_empty());
}

proptest! {
    #[test]
    fn no_matching_names_is_identity(base in arb_task_spec(), subs in arb_substitutions()) {
        let subs: Substitutions = subs
            .into_iter()
            .filter(|(name, _)| base.container(name).is_none())
            .collect();
        let registry = FakeRegistryAdapter::new();
        let mutation = block_on(mutate(&registry, &base, &subs)).unwrap();
        prop_assert!(!mutation.changed);
        prop_assert_eq!(&mutation.spec, &base);
        prop_assert_eq!(mutation.unmatched.len(), subs.len());
    }

    #[test]
    fn mutation_is_idempotent(base in arb_task_spec(), subs in arb_substitutions()) {
        let registry = FakeRegistryAdapter::new();
        let first = block_on(mutate(&registry, &base, &subs)).unwrap();
        let second = block_on(mutate(&registry, &first.spec, &subs)).unwrap();
        prop_assert!(!second.changed);
        prop_assert_eq!(second.spec, first.spec);
    }

    #[test]
    fn only_images_change(base in arb_task_spec(), subs in arb_substitutions()) {
        let registry = FakeRegistryAdapter::new();
        let mutation = block_on(mutate(&registry, &base, &subs)).unwrap();

        let names: Vec<_> = mutation.spec.containers.iter().map(|c| &c.name).collect();
        let base_names: Vec<_> = base.containers.iter().map(|c| &c.name).collect();
        prop_assert_eq!(names, base_names);
        prop_assert_eq!(without_images(&mutation.spec), without_images(&base));
        prop_assert_eq!(
            mutation.spec.canonical_text().lines().count(),
            base.canonical_text().lines().count()
        );
    }

    #[test]
    fn changed_iff_some_image_differs(base in arb_task_spec(), subs in arb_substitutions()) {
        let registry = FakeRegistryAdapter::new();
        let mutation = block_on(mutate(&registry, &base, &subs)).unwrap();
        let differs = base.images().zip(mutation.spec.images()).any(|(a, b)| a != b);
        prop_assert_eq!(mutation.changed, differs);
        prop_assert_eq!(mutation.changed, render_specs(&mutation.spec, &base).has_changes());
    }
}
