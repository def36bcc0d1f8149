// Copyright (c) 2026 tagnet contributors
// SPDX-License-Identifier: AGPL-3.0
//! tagnet CLI library - exposes testable components
//!
//! - [`args`]: legacy flag spellings and the clap command tree
//! - [`logging`]: numeric log levels and subscriber setup
//! - [`commands`]: one module per process role
//! - [`daemon`]: HTTP serving with graceful shutdown

pub mod args;
pub mod commands;
pub mod daemon;
pub mod logging;
