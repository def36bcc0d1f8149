// Copyright (c) 2026 tagnet contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Domain Layer
//!
//! Pure types and collaborator contracts. No I/O.
//!
//! | Module | Key Types |
//! |--------|-----------|
//! | [`agent`] | `AgentState`, `DexterState`, `EntryPoint`, `MigrationRequest` |
//! | [`player`] | `PlayerId`, `PlayerState`, `PlayerHandle`, `TagOutcome` |
//! | [`discovery`] | `Discovery`, `HostEntry`, `LoopPhase` |
//! | [`host`] | `BailiffApi`, `Registry` |
//! | [`errors`] | `HostError`, `RegistryError`, `MigrationError` |
//! | [`config`] | `NodeConfig` |

pub mod agent;
pub mod config;
pub mod discovery;
pub mod errors;
pub mod host;
pub mod player;
