// Copyright (c) 2026 tagnet contributors
// SPDX-License-Identifier: AGPL-3.0

//! `tagnet registry` - the name registry daemon hosts bind themselves in.

use anyhow::{Context, Result};
use clap::Args;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use tagnet_core::presentation::registry_api::{self, NameTable};

use crate::daemon::serve;

#[derive(Debug, Args)]
pub struct RegistryArgs {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(long, default_value_t = 1099)]
    pub port: u16,
}

pub async fn run(args: RegistryArgs) -> Result<()> {
    let addr = format!("{}:{}", args.host, args.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("Registry listening on {}", addr);

    let table = Arc::new(NameTable::new());
    serve(listener, registry_api::router(table.clone())).await?;

    info!("Registry shutting down with {} name(s) bound", table.len());
    Ok(())
}
