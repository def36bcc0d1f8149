// Copyright (c) 2026 tagnet contributors
// SPDX-License-Identifier: AGPL-3.0

//! Logging setup. `RUST_LOG` wins over the numeric `--log` level.

use anyhow::{Context, Result};

/// Map a numeric verbosity level to a tracing filter directive.
pub fn level_directive(level: u8) -> &'static str {
    match level {
        0 => "off",
        1 => "error",
        2 => "warn",
        3 | 4 => "info",
        5 => "debug",
        _ => "trace",
    }
}

/// Effective level once an agent's `--debug` flag is taken into account.
pub fn effective_level(level: u8, debug: bool) -> u8 {
    if debug {
        level.max(5)
    } else {
        level
    }
}

/// Initialize tracing subscriber for logging
pub fn init_logging(level: u8) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level_directive(level)))
        .context("Failed to create log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    Ok(())
}
