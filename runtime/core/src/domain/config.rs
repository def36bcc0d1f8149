// Copyright (c) 2026 tagnet contributors
// SPDX-License-Identifier: AGPL-3.0

// Node Configuration
//
// One optional YAML file configures every process role:
// - host: identification and advertised endpoint of an execution host
// - agent: pacing and discovery settings for launched agents
// - registry: where the name registry lives
//
// Every field has a default, so a missing file is equivalent to `{}`.
// Command-line flags override file values.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::domain::agent::DEFAULT_NAME_PREFIX;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to read configuration file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub host: HostConfig,
    pub agent: AgentConfig,
    pub registry: RegistryConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Identification label, part of the registered service name.
    pub id: String,
    /// Informational label.
    pub info: String,
    pub name_prefix: String,
    /// URL other processes should use to reach this host. Derived from the
    /// bound address when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advertise_url: Option<String>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            id: String::new(),
            info: String::new(),
            name_prefix: DEFAULT_NAME_PREFIX.to_string(),
            advertise_url: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub id: String,
    /// Pacing delay applied on every arrival.
    #[serde(with = "humantime_serde")]
    pub restraint_sleep: Duration,
    /// Delay between discovery passes that found no usable host.
    #[serde(with = "humantime_serde")]
    pub retry_sleep: Duration,
    pub name_prefix: String,
    pub debug: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            id: "anon".to_string(),
            restraint_sleep: Duration::from_secs(5),
            retry_sleep: Duration::from_secs(20),
            name_prefix: DEFAULT_NAME_PREFIX.to_string(),
            debug: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub url: String,
    /// Per-request timeout for registry and host calls.
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:1099".to_string(),
            timeout: Duration::from_secs(5),
        }
    }
}

impl NodeConfig {
    /// Load from `path` if given (it must exist), otherwise use defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: NodeConfig =
            serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.registry.url.trim().is_empty() {
            return Err(ConfigError::Invalid("registry.url must not be empty".into()));
        }
        if self.registry.timeout.is_zero() {
            return Err(ConfigError::Invalid("registry.timeout must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_sections_use_defaults() {
        let config: NodeConfig = serde_yaml::from_str("agent:\n  restraint_sleep: 250ms\n").unwrap();
        assert_eq!(config.agent.restraint_sleep, Duration::from_millis(250));
        assert_eq!(config.agent.retry_sleep, Duration::from_secs(20));
        assert_eq!(config.host.name_prefix, "Bailiff");
        assert_eq!(config.registry.url, "http://127.0.0.1:1099");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "host:\n  id: kitchen\n  info: second floor\nregistry:\n  timeout: 2s").unwrap();

        let config = NodeConfig::load_or_default(Some(file.path())).unwrap();
        assert_eq!(config.host.id, "kitchen");
        assert_eq!(config.host.info, "second floor");
        assert_eq!(config.registry.timeout, Duration::from_secs(2));
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let err = NodeConfig::load_or_default(Some(Path::new("/nonexistent/tagnet.yaml"))).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_zero_timeout_is_invalid() {
        let mut config = NodeConfig::default();
        config.registry.timeout = Duration::ZERO;
        assert!(config.validate().is_err());
    }
}
