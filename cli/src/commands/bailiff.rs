// Copyright (c) 2026 tagnet contributors
// SPDX-License-Identifier: AGPL-3.0

//! `tagnet bailiff` - run an execution host.
//!
//! Startup is fatal if the local host identity cannot be determined or the
//! registry refuses the binding. On Ctrl+C/SIGTERM the HTTP server drains and
//! the host unbinds itself; a failed unbind is only logged.

use anyhow::{Context, Result};
use clap::Args;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use tagnet_core::application::bailiff::{Bailiff, HostIdentity};
use tagnet_core::domain::config::NodeConfig;
use tagnet_core::infrastructure::HttpRegistryClient;
use tagnet_core::presentation::api;

use crate::daemon::serve;

#[derive(Debug, Args)]
pub struct BailiffArgs {
    /// Identification label, part of the registered name
    #[arg(long)]
    pub id: Option<String>,

    /// Informational label
    #[arg(long)]
    pub info: Option<String>,

    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on (0 picks a free port)
    #[arg(long, default_value_t = 0)]
    pub port: u16,

    /// URL other processes use to reach this host
    #[arg(long, value_name = "URL")]
    pub advertise_url: Option<String>,
}

/// URL to publish for a listener bound at `bound`.
pub fn advertised_url(bound: SocketAddr, identity: &HostIdentity) -> String {
    let ip: IpAddr = if bound.ip().is_unspecified() {
        identity.address
    } else {
        bound.ip()
    };
    format!("http://{}", SocketAddr::new(ip, bound.port()))
}

pub async fn run(args: BailiffArgs, mut config: NodeConfig) -> Result<()> {
    if let Some(id) = args.id {
        config.host.id = id;
    }
    if let Some(info) = args.info {
        config.host.info = info;
    }

    let identity = HostIdentity::detect()
        .await
        .context("Failed to determine local host identity")?;

    let addr = format!("{}:{}", args.host, args.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    let bound = listener
        .local_addr()
        .context("Failed to read bound address")?;

    config.host.advertise_url = args
        .advertise_url
        .or(config.host.advertise_url)
        .or_else(|| Some(advertised_url(bound, &identity)));

    let registry = Arc::new(
        HttpRegistryClient::new(config.registry.url.clone(), config.registry.timeout)
            .context("Failed to create registry client")?,
    );

    let bailiff = Bailiff::start(config.host, identity, registry).await?;
    info!("{} listening on {}", bailiff, bound);

    let served = serve(listener, api::router(bailiff.clone())).await;
    bailiff.shutdown().await;
    served?;

    info!("Bailiff shutting down");
    Ok(())
}
