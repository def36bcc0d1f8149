// Copyright (c) 2026 tagnet contributors
// SPDX-License-Identifier: AGPL-3.0

//! Command-line surface of the `tagnet` binary.
//!
//! The single-dash spellings accepted by earlier releases (`-id`, `-rs`,
//! `-it`, ...) and the help spellings `?` / `-help` are rewritten to their
//! long forms before clap sees them. Anything else is left alone, so
//! unknown flags still fail with usage and exit code 2.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::commands::{BailiffArgs, DexterArgs, PlayerArgs, RegistryArgs};

const LEGACY_FLAGS: &[(&str, &str)] = &[
    ("-id", "--id"),
    ("-info", "--info"),
    ("-log", "--log"),
    ("-rs", "--rs"),
    ("-qs", "--qs"),
    ("-it", "--it"),
    ("-debug", "--debug"),
    ("-name", "--name"),
    ("-help", "--help"),
    ("?", "--help"),
];

/// Rewrite legacy spellings to long flags. The program name is kept as is.
pub fn normalize_args<I, S>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut args = args.into_iter().map(Into::into);
    let mut normalized: Vec<String> = args.next().into_iter().collect();

    for arg in args {
        let rewritten = LEGACY_FLAGS
            .iter()
            .find(|(legacy, _)| *legacy == arg)
            .map(|(_, long)| long.to_string());
        normalized.push(rewritten.unwrap_or(arg));
    }
    normalized
}

/// tagnet - mobile agents playing tag across execution hosts
#[derive(Debug, Parser)]
#[command(name = "tagnet")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, global = true, env = "TAGNET_CONFIG_PATH", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Registry URL (overrides the configuration file)
    #[arg(long, global = true, env = "TAGNET_REGISTRY_URL", value_name = "URL")]
    pub registry: Option<String>,

    /// Log level: 0 off, 1 error, 2 warn, 3-4 info, 5 debug, 6+ trace
    #[arg(long, global = true, env = "TAGNET_LOG_LEVEL", default_value_t = 3)]
    pub log: u8,

    /// Serve Prometheus metrics on this port
    #[arg(long, global = true, value_name = "PORT")]
    pub metrics_port: Option<u16>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the name registry daemon
    #[command(name = "registry")]
    Registry(RegistryArgs),

    /// Run an execution host until interrupted
    #[command(name = "bailiff")]
    Bailiff(BailiffArgs),

    /// Launch a wandering agent
    #[command(name = "dexter")]
    Dexter(DexterArgs),

    /// Launch a tag player
    #[command(name = "player")]
    Player(PlayerArgs),
}

impl Cli {
    /// Agent commands may ask for debug diagnostics.
    pub fn debug_requested(&self) -> bool {
        match &self.command {
            Commands::Dexter(args) => args.debug,
            Commands::Player(args) => args.debug,
            Commands::Registry(_) | Commands::Bailiff(_) => false,
        }
    }
}
