// Copyright (c) 2026 tagnet contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Mobile Agent State
//!
//! Agents never ship code between hosts. What crosses the wire is an
//! [`AgentState`]: a closed set of serializable resume records, one per agent
//! kind, plus the label of the entry point to resume at. The receiving host
//! rebuilds the agent locally from the record.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::discovery::Discovery;
use crate::domain::errors::HostError;
use crate::domain::player::PlayerState;

/// Label of the single resumption point every agent kind supports.
pub const TOP_LEVEL: &str = "topLevel";

/// Registry prefix that marks a name as an execution host.
pub const DEFAULT_NAME_PREFIX: &str = "Bailiff";

/// Resume record of the generic wandering agent, also embedded in every
/// richer agent kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DexterState {
    /// Identification used in diagnostics.
    pub id: String,
    /// Incremented on every arrival.
    #[serde(default)]
    pub jump_count: u64,
    #[serde(with = "humantime_serde")]
    pub restraint_sleep: Duration,
    #[serde(with = "humantime_serde")]
    pub retry_sleep: Duration,
    /// Only registry names starting with this prefix are considered.
    #[serde(default = "default_name_prefix")]
    pub name_prefix: String,
    #[serde(default)]
    pub discovery: Discovery,
    /// Log diagnostics at info level on every host the agent visits.
    #[serde(default)]
    pub debug: bool,
}

fn default_name_prefix() -> String {
    DEFAULT_NAME_PREFIX.to_string()
}

impl DexterState {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            jump_count: 0,
            restraint_sleep: Duration::from_secs(5),
            retry_sleep: Duration::from_secs(20),
            name_prefix: default_name_prefix(),
            discovery: Discovery::new(),
            debug: false,
        }
    }

    pub fn with_restraint_sleep(mut self, sleep: Duration) -> Self {
        self.restraint_sleep = sleep;
        self
    }

    pub fn with_retry_sleep(mut self, sleep: Duration) -> Self {
        self.retry_sleep = sleep;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.name_prefix = prefix.into();
        self
    }
}

/// Closed set of agent kinds a host knows how to resume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AgentState {
    Dexter(DexterState),
    Player(PlayerState),
}

impl AgentState {
    pub fn kind(&self) -> &'static str {
        match self {
            AgentState::Dexter(_) => "dexter",
            AgentState::Player(_) => "player",
        }
    }

    pub fn core(&self) -> &DexterState {
        match self {
            AgentState::Dexter(core) => core,
            AgentState::Player(player) => &player.core,
        }
    }
}

/// Resumption points. The name on the wire is a label; dispatch is by variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryPoint {
    TopLevel,
}

impl EntryPoint {
    /// Validate that `agent` can be resumed at `name` with `args`.
    pub fn resolve(
        agent: &AgentState,
        name: &str,
        args: &[serde_json::Value],
    ) -> Result<Self, HostError> {
        match (name, args.len()) {
            (TOP_LEVEL, 0) => Ok(EntryPoint::TopLevel),
            (_, arity) => Err(HostError::NoSuchEntryPoint {
                kind: agent.kind().to_string(),
                entry_point: name.to_string(),
                arity,
            }),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EntryPoint::TopLevel => TOP_LEVEL,
        }
    }
}

/// What a migrating agent hands to the target host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MigrationRequest {
    pub agent: AgentState,
    pub entry_point: String,
    #[serde(default)]
    pub args: Vec<serde_json::Value>,
}

impl MigrationRequest {
    pub fn top_level(agent: AgentState) -> Self {
        Self {
            agent,
            entry_point: TOP_LEVEL.to_string(),
            args: Vec::new(),
        }
    }
}
