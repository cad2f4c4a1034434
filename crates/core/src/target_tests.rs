// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn image(s: &str) -> ImageReference {
    s.parse().unwrap()
}

#[test]
fn service_presence_decides_shape() {
    let svc = RolloutTarget::service("prod", "web", "web-task", image("app:2"));
    assert_eq!(svc.shape(), RolloutShape::Service);
    assert_eq!(svc.label(), TargetLabel::service("prod", "web"));

    let task = RolloutTarget::one_off("prod", "migrate", image("app:2"));
    assert_eq!(task.shape(), RolloutShape::OneOff);
    assert_eq!(task.label(), TargetLabel::one_off("prod", "migrate"));
}

#[test]
fn substitutions_key_by_repository() {
    let target = RolloutTarget::one_off("prod", "migrate", image("app:2"));
    let subs = target.substitutions();
    assert_eq!(subs.len(), 1);
    assert_eq!(subs.get("app"), Some(&image("app:2")));
}

#[test]
fn later_duplicate_repository_wins_in_place() {
    let subs = substitutions_for([image("app:1"), image("worker:3"), image("app:2")]);
    let keys: Vec<_> = subs.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["app", "worker"]);
    assert_eq!(subs["app"], image("app:2"));
}
