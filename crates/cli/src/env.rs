// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the CLI crate.
//!
//! Region, profile and log filter are read by clap (`env = ...`); this module
//! covers the variables that are not tied to a flag.

/// `NO_COLOR=1` disables color output.
pub fn no_color() -> bool {
    std::env::var("NO_COLOR").is_ok_and(|v| v == "1")
}

/// `COLOR=1` forces color output even without a terminal.
pub fn force_color() -> bool {
    std::env::var("COLOR").is_ok_and(|v| v == "1")
}
