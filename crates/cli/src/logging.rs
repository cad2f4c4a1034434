// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Diagnostic logging to stderr.
//!
//! Rollout progress goes to stdout through the terminal reporter; logs stay
//! on stderr so the two never interleave in redirected output.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::exit_error::ExitError;

/// Default filter: quiet unless something is wrong.
pub const DEFAULT_LEVEL: &str = "warn";

/// Parse a level or full `EnvFilter` directive string.
pub fn filter(level: &str) -> Result<EnvFilter, ExitError> {
    EnvFilter::try_new(level)
        .map_err(|e| ExitError::invalid_input(format!("invalid log level {:?}: {}", level, e)))
}

/// Install the global subscriber.
pub fn init(level: &str, ansi: bool) -> Result<(), ExitError> {
    let layer = fmt::layer().with_writer(std::io::stderr).with_ansi(ansi).with_target(false);
    tracing_subscriber::registry()
        .with(filter(level)?)
        .with(layer)
        .try_init()
        .map_err(|e| ExitError::new(1, format!("failed to initialize logging: {}", e)))
}
