// Copyright (c) 2026 tagnet contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Application Layer
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`bailiff`] | `Bailiff` execution host |
//! | [`directory`] | `PlayerDirectory`, the per-host resident table |
//! | [`dexter`] | `MigrationLoop`, `AgentBehavior`, `Wanderer` |
//! | [`player`] | `PlayerBehavior`, host ranking |
//! | [`resident`] | agent kind dispatch |

pub mod bailiff;
pub mod dexter;
pub mod directory;
pub mod player;
pub mod resident;
