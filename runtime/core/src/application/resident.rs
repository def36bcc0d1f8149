// Copyright (c) 2026 tagnet contributors
// SPDX-License-Identifier: AGPL-3.0
//! Restores an arriving [`AgentState`] into a runnable agent. This is the one
//! place agent kinds are mapped to behaviors.

use crate::application::dexter::{AgentContext, MigrationLoop, Wanderer};
use crate::application::player::PlayerBehavior;
use crate::domain::agent::{AgentState, EntryPoint};
use crate::domain::player::PlayerHandle;

pub enum ResidentAgent {
    Dexter(MigrationLoop<Wanderer>),
    Player(MigrationLoop<PlayerBehavior>),
}

impl ResidentAgent {
    pub fn restore(state: AgentState) -> Self {
        match state {
            AgentState::Dexter(core) => ResidentAgent::Dexter(MigrationLoop::new(core, Wanderer)),
            AgentState::Player(player) => {
                let (core, behavior) = PlayerBehavior::restore(player);
                ResidentAgent::Player(MigrationLoop::new(core, behavior))
            }
        }
    }

    /// Live handle to register in the host's player directory.
    pub fn player_handle(&self) -> Option<&PlayerHandle> {
        match self {
            ResidentAgent::Dexter(_) => None,
            ResidentAgent::Player(agent) => Some(agent.behavior().handle()),
        }
    }

    pub fn label(&self) -> String {
        match self {
            ResidentAgent::Dexter(agent) => format!("dexter:{}", agent.state().id),
            ResidentAgent::Player(agent) => format!("player:{}", agent.behavior().handle().name()),
        }
    }

    /// Run the agent from `entry` until its unit of execution ends.
    pub async fn resume(self, entry: EntryPoint, ctx: AgentContext) {
        match entry {
            EntryPoint::TopLevel => match self {
                ResidentAgent::Dexter(agent) => agent.run(ctx).await,
                ResidentAgent::Player(agent) => agent.run(ctx).await,
            },
        }
    }
}
