// Copyright (c) 2026 tagnet contributors
// SPDX-License-Identifier: AGPL-3.0

//! Long-running process support: HTTP serving until Ctrl+C/SIGTERM.

pub mod server;

pub use server::{serve, shutdown_signal};
