// Copyright (c) 2026 tagnet contributors
// SPDX-License-Identifier: AGPL-3.0

//! Command implementations for the tagnet CLI
//!
//! Each process role gets its own module with its clap arguments and a `run`
//! entry point. Configuration is loaded once here and handed down.

pub mod agent;
pub mod bailiff;
pub mod registry;

pub use self::agent::{DexterArgs, PlayerArgs};
pub use self::bailiff::BailiffArgs;
pub use self::registry::RegistryArgs;

use anyhow::{Context, Result};
use std::path::Path;

use tagnet_core::domain::config::NodeConfig;

/// Load the configuration file, if any, and apply the global overrides.
pub fn load_config(path: Option<&Path>, registry_url: Option<String>) -> Result<NodeConfig> {
    let mut config = NodeConfig::load_or_default(path).context("Failed to load configuration")?;
    if let Some(url) = registry_url {
        config.registry.url = url;
    }
    config
        .validate()
        .context("Configuration validation failed")?;
    Ok(config)
}
