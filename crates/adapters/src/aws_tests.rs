// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn profile_is_optional() {
    let settings = AwsSettings::new("ap-northeast-1");
    assert_eq!(settings.profile, None);

    let settings = settings.profile("deploy");
    assert_eq!(settings.profile.as_deref(), Some("deploy"));
    assert_eq!(settings.region, "ap-northeast-1");
}
