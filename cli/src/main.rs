// Copyright (c) 2026 tagnet contributors
// SPDX-License-Identifier: AGPL-3.0

//! # tagnet
//!
//! One binary for every process role:
//!
//! - `tagnet registry` - the name registry hosts bind themselves in
//! - `tagnet bailiff` - an execution host that lends tasks to arriving agents
//! - `tagnet dexter` - launch a wandering agent
//! - `tagnet player [--it]` - launch a tag player
//!
//! Unattended processes: runtime failures are logged, never surfaced
//! interactively. Usage errors exit with code 2 before anything starts.

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use tracing::info;

use tagnet::args::{normalize_args, Cli, Commands};
use tagnet::commands::{self, agent, bailiff, registry};
use tagnet::logging::{effective_level, init_logging};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_from(normalize_args(std::env::args()));

    init_logging(effective_level(cli.log, cli.debug_requested()))?;

    if let Some(port) = cli.metrics_port {
        init_metrics(port)?;
    }

    match cli.command {
        Commands::Registry(args) => registry::run(args).await,
        Commands::Bailiff(args) => {
            let config = commands::load_config(cli.config.as_deref(), cli.registry)?;
            bailiff::run(args, config).await
        }
        Commands::Dexter(args) => {
            let config = commands::load_config(cli.config.as_deref(), cli.registry)?;
            agent::run_dexter(args, config).await
        }
        Commands::Player(args) => {
            let config = commands::load_config(cli.config.as_deref(), cli.registry)?;
            agent::run_player(args, config).await
        }
    }
}

/// Install the Prometheus exporter on `0.0.0.0:port`.
fn init_metrics(port: u16) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .context("Failed to install Prometheus exporter")?;
    info!("Serving metrics on {}", addr);
    Ok(())
}
