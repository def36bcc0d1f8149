// Copyright (c) 2026 tagnet contributors
// SPDX-License-Identifier: AGPL-3.0
//! # `tagnet-core`: Mobile Agents and the Game of Tag
//!
//! Execution hosts ("Bailiffs") register in a shared name registry and accept
//! agents that carry their own state. An agent discovers hosts, picks one,
//! transfers itself there and resumes as a new task, indefinitely. Players are
//! agents that also play tag with whoever shares their host.
//!
//! ## Crate Layout
//!
//! | Module | Layer | Contents |
//! |--------|-------|----------|
//! | [`domain`] | Domain | agent/player state, classification, contracts, errors, config |
//! | [`application`] | Application | `Bailiff` host, `PlayerDirectory`, migration loop, player strategy |
//! | [`infrastructure`] | Infrastructure | in-memory and HTTP registries, HTTP host client |
//! | [`presentation`] | Presentation | axum routers for hosts and for the registry daemon |

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;
