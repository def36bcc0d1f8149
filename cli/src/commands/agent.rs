// Copyright (c) 2026 tagnet contributors
// SPDX-License-Identifier: AGPL-3.0

//! `tagnet dexter` / `tagnet player` - launch a mobile agent.
//!
//! The launching process is not a host. It runs the agent's first unit of
//! execution locally and returns once the agent has migrated to a Bailiff.

use anyhow::{Context, Result};
use clap::Args;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use tagnet_core::application::dexter::{AgentContext, MigrationLoop, Wanderer};
use tagnet_core::application::player::PlayerBehavior;
use tagnet_core::domain::agent::DexterState;
use tagnet_core::domain::config::NodeConfig;
use tagnet_core::domain::player::PlayerState;
use tagnet_core::infrastructure::HttpRegistryClient;

#[derive(Debug, Args)]
pub struct DexterArgs {
    /// Log agent diagnostics on every host it visits
    #[arg(long)]
    pub debug: bool,

    /// Identification label
    #[arg(long)]
    pub id: Option<String>,

    /// Restraint sleep in milliseconds
    #[arg(long, value_name = "MS")]
    pub rs: Option<u64>,

    /// Retry sleep in milliseconds
    #[arg(long, value_name = "MS")]
    pub qs: Option<u64>,
}

#[derive(Debug, Args)]
pub struct PlayerArgs {
    /// Log agent diagnostics on every host it visits
    #[arg(long)]
    pub debug: bool,

    /// Display name (defaults to one derived from the player's uuid)
    #[arg(long)]
    pub name: Option<String>,

    /// Restraint sleep in milliseconds
    #[arg(long, value_name = "MS")]
    pub rs: Option<u64>,

    /// Retry sleep in milliseconds
    #[arg(long, value_name = "MS")]
    pub qs: Option<u64>,

    /// Start as "it"
    #[arg(long)]
    pub it: bool,
}

/// Agent core from the configuration file and command-line overrides.
pub fn agent_core(
    config: &NodeConfig,
    id: Option<String>,
    rs: Option<u64>,
    qs: Option<u64>,
    debug: bool,
) -> DexterState {
    let agent = &config.agent;
    DexterState::new(id.unwrap_or_else(|| agent.id.clone()))
        .with_restraint_sleep(rs.map(Duration::from_millis).unwrap_or(agent.restraint_sleep))
        .with_retry_sleep(qs.map(Duration::from_millis).unwrap_or(agent.retry_sleep))
        .with_name_prefix(agent.name_prefix.clone())
        .with_debug(debug || agent.debug)
}

fn launcher(config: &NodeConfig) -> Result<AgentContext> {
    let registry = HttpRegistryClient::new(config.registry.url.clone(), config.registry.timeout)
        .context("Failed to create registry client")?;
    Ok(AgentContext::launcher(Arc::new(registry)))
}

pub async fn run_dexter(args: DexterArgs, config: NodeConfig) -> Result<()> {
    let core = agent_core(&config, args.id, args.rs, args.qs, args.debug);
    let ctx = launcher(&config)?;

    info!(agent = %core.id, registry = %config.registry.url, "Launching dexter");
    MigrationLoop::new(core, Wanderer).run(ctx).await;
    Ok(())
}

/// Player record for a fresh launch. The player's diagnostics carry its
/// display name.
pub fn player_state(config: &NodeConfig, args: &PlayerArgs) -> PlayerState {
    let core = agent_core(config, None, args.rs, args.qs, args.debug);
    let mut state = PlayerState::new(core, args.name.clone(), args.it);
    state.core.id = state.display_name.clone();
    state
}

pub async fn run_player(args: PlayerArgs, config: NodeConfig) -> Result<()> {
    let state = player_state(&config, &args);
    let ctx = launcher(&config)?;

    info!(
        player = %state.display_name,
        uuid = %state.uuid,
        it = state.tagged,
        registry = %config.registry.url,
        "Launching player"
    );
    let (core, behavior) = PlayerBehavior::restore(state);
    MigrationLoop::new(core, behavior).run(ctx).await;
    Ok(())
}
