// Copyright (c) 2026 tagnet contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Collaborator Contracts
//!
//! | Trait | Role | Implementations |
//! |-------|------|-----------------|
//! | [`BailiffApi`] | Execution host contract | `Bailiff` (in-process), `HttpBailiffClient` |
//! | [`Registry`] | Name registry | `InMemoryRegistry`, `HttpRegistryClient` |
//!
//! A resolved registry name yields an `Arc<dyn BailiffApi>`, so agents talk to
//! a host in the same process and to one across the network the same way.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::agent::MigrationRequest;
use crate::domain::errors::{HostError, RegistryError};
use crate::domain::player::{PlayerId, PlayerSnapshot};

/// Operations an execution host exposes to agents and to other hosts.
#[async_trait]
pub trait BailiffApi: Send + Sync {
    /// Base URL this host can be reached at, if it is reachable over HTTP.
    fn endpoint(&self) -> Option<String>;

    /// Liveness/identity probe.
    async fn ping(&self) -> Result<String, HostError>;

    /// Case-insensitive property lookup.
    async fn get_property(&self, key: &str) -> Result<Option<String>, HostError>;

    async fn set_property(&self, key: &str, value: &str) -> Result<(), HostError>;

    /// Take ownership of an agent and start it at the requested entry point.
    /// Returns once the agent has been started, not when it finishes.
    async fn accept(&self, request: MigrationRequest) -> Result<(), HostError>;

    /// Tag a resident player. `false` if it is absent, already tagged, or in
    /// flight.
    async fn tag_player(&self, id: PlayerId) -> Result<bool, HostError>;

    async fn list_players(&self) -> Result<HashMap<PlayerId, PlayerSnapshot>, HostError>;

    async fn player_names(&self) -> Result<HashMap<PlayerId, String>, HostError>;

    async fn count_players(&self) -> Result<usize, HostError>;

    async fn tagged_status(&self) -> Result<HashMap<PlayerId, bool>, HostError>;
}

/// Name registry: the directory agents discover hosts through.
#[async_trait]
pub trait Registry: Send + Sync {
    /// Bind `name` to `host`, replacing any previous binding.
    async fn register(&self, name: &str, host: Arc<dyn BailiffApi>) -> Result<(), RegistryError>;

    async fn unregister(&self, name: &str) -> Result<(), RegistryError>;

    async fn list(&self) -> Result<Vec<String>, RegistryError>;

    async fn resolve(&self, name: &str) -> Result<Arc<dyn BailiffApi>, RegistryError>;
}
