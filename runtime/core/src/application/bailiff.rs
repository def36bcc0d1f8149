// Copyright (c) 2026 tagnet contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Bailiff, the Execution Host
//!
//! A Bailiff lends a task to any agent that migrates in. `accept` validates
//! the requested entry point, records arriving Players in the host's
//! [`PlayerDirectory`], and spawns the agent. The call returns as soon as the
//! agent is started; whatever happens inside the agent afterwards is logged
//! here and never reaches the caller.
//!
//! The Bailiff itself never moves. It registers under
//! `<prefix>.<id>.<random>` at startup and unregisters on shutdown.

use anyhow::{Context, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use crate::application::dexter::AgentContext;
use crate::application::directory::PlayerDirectory;
use crate::application::resident::ResidentAgent;
use crate::domain::agent::{EntryPoint, MigrationRequest};
use crate::domain::config::HostConfig;
use crate::domain::errors::{HostError, RegistryError};
use crate::domain::host::{BailiffApi, Registry};
use crate::domain::player::{PlayerId, PlayerSnapshot, TagOutcome};

/// Where a host runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostIdentity {
    pub host_name: String,
    pub address: IpAddr,
}

impl HostIdentity {
    /// Determine the local host name and an address it resolves to.
    pub async fn detect() -> Result<Self> {
        let host_name = hostname::get()
            .context("Failed to determine local host name")?
            .to_string_lossy()
            .to_lowercase();

        let address = tokio::net::lookup_host((host_name.as_str(), 0))
            .await
            .with_context(|| format!("Failed to resolve local host name {host_name}"))?
            .map(|addr| addr.ip())
            .next()
            .with_context(|| format!("Local host name {host_name} has no address"))?;

        Ok(Self { host_name, address })
    }

    pub fn loopback() -> Self {
        Self {
            host_name: "localhost".to_string(),
            address: IpAddr::V4(Ipv4Addr::LOCALHOST),
        }
    }
}

struct BailiffInner {
    config: HostConfig,
    identity: HostIdentity,
    service_name: String,
    properties: Mutex<HashMap<String, String>>,
    players: PlayerDirectory,
    registry: Arc<dyn Registry>,
    started_at: Instant,
}

/// Execution host. Clones share the same host.
#[derive(Clone)]
pub struct Bailiff {
    inner: Arc<BailiffInner>,
}

impl Bailiff {
    /// Build a host without registering it.
    pub fn new(config: HostConfig, identity: HostIdentity, registry: Arc<dyn Registry>) -> Self {
        let disambiguator: u32 = rand::random_range(0..0x7FFF_FFFF);
        let service_name = format!("{}.{}.{}", config.name_prefix, config.id, disambiguator);

        let mut properties = HashMap::new();
        properties.insert("id".to_string(), config.id.clone());
        properties.insert("info".to_string(), config.info.clone());
        properties.insert("hostname".to_string(), identity.host_name.clone());
        properties.insert("hostaddress".to_string(), identity.address.to_string());

        Self {
            inner: Arc::new(BailiffInner {
                config,
                identity,
                service_name,
                properties: Mutex::new(properties),
                players: PlayerDirectory::new(),
                registry,
                started_at: Instant::now(),
            }),
        }
    }

    /// Build and register a host. Registration failure is fatal.
    pub async fn start(
        config: HostConfig,
        identity: HostIdentity,
        registry: Arc<dyn Registry>,
    ) -> Result<Self> {
        let bailiff = Self::new(config, identity, registry);
        info!(
            "STARTING id={} info={} host={}",
            bailiff.id(),
            bailiff.info(),
            bailiff.identity().host_name
        );

        bailiff
            .register()
            .await
            .with_context(|| format!("Failed to register {}", bailiff.service_name()))?;

        info!("Registered as {}", bailiff.service_name());
        Ok(bailiff)
    }

    pub async fn register(&self) -> Result<(), RegistryError> {
        let handle: Arc<dyn BailiffApi> = Arc::new(self.clone());
        self.inner
            .registry
            .register(&self.inner.service_name, handle)
            .await
    }

    /// Remove this host from the registry. Failures are logged only.
    pub async fn shutdown(&self) {
        match self.inner.registry.unregister(&self.inner.service_name).await {
            Ok(()) => info!("Unregistered {}", self.inner.service_name),
            Err(err) => warn!("When unbinding from registry: {}", err),
        }
    }

    pub fn service_name(&self) -> &str {
        &self.inner.service_name
    }

    pub fn id(&self) -> &str {
        &self.inner.config.id
    }

    pub fn info(&self) -> &str {
        &self.inner.config.info
    }

    pub fn identity(&self) -> &HostIdentity {
        &self.inner.identity
    }

    pub fn players(&self) -> &PlayerDirectory {
        &self.inner.players
    }

    pub fn registry(&self) -> Arc<dyn Registry> {
        self.inner.registry.clone()
    }

    pub fn uptime(&self) -> Duration {
        self.inner.started_at.elapsed()
    }

    pub fn ping_message(&self) -> String {
        format!(
            "Ping response from Bailiff {} on host {} [{}]",
            self.inner.config.id, self.inner.identity.host_name, self.inner.identity.address
        )
    }

    pub fn property(&self, key: &str) -> Option<String> {
        debug!("getProperty key={}", key);
        self.inner.properties.lock().get(&key.to_lowercase()).cloned()
    }

    pub fn put_property(&self, key: &str, value: &str) {
        debug!("setProperty key={} value={}", key, value);
        self.inner
            .properties
            .lock()
            .insert(key.to_lowercase(), value.to_string());
    }

    /// Tag transition on behalf of a resident player.
    pub fn tag(&self, id: PlayerId) -> TagOutcome {
        let outcome = self.inner.players.tag(id);
        debug!(player = %id, ?outcome, "tagPlayer");
        outcome
    }

    /// Validate and start an arriving agent. Must be called within a tokio
    /// runtime.
    pub fn admit(&self, request: MigrationRequest) -> Result<(), HostError> {
        let MigrationRequest {
            agent,
            entry_point,
            args,
        } = request;

        let entry = EntryPoint::resolve(&agent, &entry_point, &args)?;
        debug!(
            kind = agent.kind(),
            agent = %agent.core().id,
            entry_point = entry.label(),
            "migrate"
        );

        let resident = ResidentAgent::restore(agent);
        if let Some(handle) = resident.player_handle() {
            self.inner.players.insert(handle.clone());
        }
        metrics::counter!("tagnet_agents_accepted_total").increment(1);

        let ctx = AgentContext::resident(self.inner.registry.clone(), self.clone());
        tokio::spawn(agitate(resident, entry, ctx));
        Ok(())
    }
}

/// Lend a task to `agent` and clean up after it, however it ends.
async fn agitate(agent: ResidentAgent, entry: EntryPoint, ctx: AgentContext) {
    let label = agent.label();
    let player = agent.player_handle().cloned();

    if let Err(err) = tokio::spawn(agent.resume(entry, ctx)).await {
        error!(agent = %label, "Agent terminated abnormally: {}", err);
    }

    if let Some(handle) = player {
        handle.mark_departed();
    }
    debug!(agent = %label, "Unit of execution ended");
}

impl fmt::Display for Bailiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Bailiff {} ({}) on host {} [{}]",
            self.inner.config.id,
            self.inner.config.info,
            self.inner.identity.host_name,
            self.inner.identity.address
        )
    }
}

#[async_trait]
impl BailiffApi for Bailiff {
    fn endpoint(&self) -> Option<String> {
        self.inner.config.advertise_url.clone()
    }

    async fn ping(&self) -> Result<String, HostError> {
        debug!("ping");
        Ok(self.ping_message())
    }

    async fn get_property(&self, key: &str) -> Result<Option<String>, HostError> {
        Ok(self.property(key))
    }

    async fn set_property(&self, key: &str, value: &str) -> Result<(), HostError> {
        self.put_property(key, value);
        Ok(())
    }

    async fn accept(&self, request: MigrationRequest) -> Result<(), HostError> {
        self.admit(request)
    }

    async fn tag_player(&self, id: PlayerId) -> Result<bool, HostError> {
        Ok(self.tag(id).is_tagged())
    }

    async fn list_players(&self) -> Result<HashMap<PlayerId, PlayerSnapshot>, HostError> {
        Ok(self.inner.players.snapshot())
    }

    async fn player_names(&self) -> Result<HashMap<PlayerId, String>, HostError> {
        Ok(self.inner.players.names())
    }

    async fn count_players(&self) -> Result<usize, HostError> {
        Ok(self.inner.players.count())
    }

    async fn tagged_status(&self) -> Result<HashMap<PlayerId, bool>, HostError> {
        Ok(self.inner.players.tagged_status())
    }
}
