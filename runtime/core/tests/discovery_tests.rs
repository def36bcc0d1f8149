// Copyright (c) 2026 tagnet contributors
// SPDX-License-Identifier: AGPL-3.0

//! Integration tests for host discovery and migration.
//!
//! A scripted registry wraps the in-memory one so tests can list names that
//! do not resolve and take the whole directory offline on demand.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tagnet_core::application::bailiff::{Bailiff, HostIdentity};
use tagnet_core::application::dexter::{AgentContext, MigrationLoop, Wanderer};
use tagnet_core::application::player::PlayerBehavior;
use tagnet_core::domain::agent::{DexterState, MigrationRequest};
use tagnet_core::domain::config::HostConfig;
use tagnet_core::domain::discovery::Classification;
use tagnet_core::domain::errors::{HostError, MigrationError, RegistryError};
use tagnet_core::domain::host::{BailiffApi, Registry};
use tagnet_core::domain::player::{PlayerId, PlayerSnapshot, PlayerState};
use tagnet_core::infrastructure::registry::InMemoryRegistry;

#[derive(Default)]
struct ScriptedRegistry {
    inner: InMemoryRegistry,
    phantoms: Vec<String>,
    down: AtomicBool,
}

impl ScriptedRegistry {
    fn with_phantoms(names: &[&str]) -> Self {
        Self {
            phantoms: names.iter().map(|n| n.to_string()).collect(),
            ..Self::default()
        }
    }

    fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), RegistryError> {
        if self.down.load(Ordering::SeqCst) {
            return Err(RegistryError::Unreachable("connection refused".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl Registry for ScriptedRegistry {
    async fn register(&self, name: &str, host: Arc<dyn BailiffApi>) -> Result<(), RegistryError> {
        self.check()?;
        self.inner.register(name, host).await
    }

    async fn unregister(&self, name: &str) -> Result<(), RegistryError> {
        self.check()?;
        self.inner.unregister(name).await
    }

    async fn list(&self) -> Result<Vec<String>, RegistryError> {
        self.check()?;
        let mut names = self.inner.list().await?;
        names.extend(self.phantoms.iter().cloned());
        Ok(names)
    }

    async fn resolve(&self, name: &str) -> Result<Arc<dyn BailiffApi>, RegistryError> {
        self.check()?;
        if self.phantoms.iter().any(|p| p == name) {
            return Err(RegistryError::NotFound(name.to_string()));
        }
        self.inner.resolve(name).await
    }
}

/// A host that answers pings but turns every agent away.
struct RefusingHost;

#[async_trait]
impl BailiffApi for RefusingHost {
    fn endpoint(&self) -> Option<String> {
        None
    }
    async fn ping(&self) -> Result<String, HostError> {
        Ok("Ping response from a full host".to_string())
    }
    async fn get_property(&self, _key: &str) -> Result<Option<String>, HostError> {
        Ok(None)
    }
    async fn set_property(&self, _key: &str, _value: &str) -> Result<(), HostError> {
        Ok(())
    }
    async fn accept(&self, _request: MigrationRequest) -> Result<(), HostError> {
        Err(HostError::Rejected("no room".to_string()))
    }
    async fn tag_player(&self, _id: PlayerId) -> Result<bool, HostError> {
        Ok(false)
    }
    async fn list_players(&self) -> Result<HashMap<PlayerId, PlayerSnapshot>, HostError> {
        Ok(HashMap::new())
    }
    async fn player_names(&self) -> Result<HashMap<PlayerId, String>, HostError> {
        Ok(HashMap::new())
    }
    async fn count_players(&self) -> Result<usize, HostError> {
        Ok(0)
    }
    async fn tagged_status(&self) -> Result<HashMap<PlayerId, bool>, HostError> {
        Ok(HashMap::new())
    }
}

fn bailiff(id: &str, registry: Arc<dyn Registry>) -> Bailiff {
    let config = HostConfig {
        id: id.to_string(),
        ..HostConfig::default()
    };
    Bailiff::new(config, HostIdentity::loopback(), registry)
}

/// Agent core that parks on arrival and retries quickly.
fn parked_core(id: &str) -> DexterState {
    DexterState::new(id)
        .with_name_prefix("")
        .with_restraint_sleep(Duration::from_secs(3600))
        .with_retry_sleep(Duration::from_millis(20))
}

#[tokio::test]
async fn test_first_pass_skips_unresolvable_name_and_lands_player() {
    let registry = Arc::new(ScriptedRegistry::with_phantoms(&["junk"]));
    let host_a = bailiff("a", registry.clone());
    let host_b = bailiff("b", registry.clone());
    registry.register("Host-A", Arc::new(host_a.clone())).await.unwrap();
    registry.register("Host-B", Arc::new(host_b.clone())).await.unwrap();

    let state = PlayerState::new(parked_core("p"), None, false);
    let uuid = state.uuid;
    let (core, behavior) = PlayerBehavior::restore(state);
    let mut agent = MigrationLoop::new(core, behavior);

    agent.discover(registry.as_ref()).await.unwrap();
    let discovery = &agent.state().discovery;
    assert_eq!(discovery.good(), ["Host-A", "Host-B"]);
    assert_eq!(discovery.classification("junk"), Classification::Bad);

    let ctx = AgentContext::launcher(registry.clone());
    let landed = agent.hop(&ctx).await;
    let host = match landed.as_str() {
        "Host-A" => &host_a,
        "Host-B" => &host_b,
        other => panic!("migrated to unexpected host {other}"),
    };

    let players = host.list_players().await.unwrap();
    assert_eq!(players.len(), 1);
    assert!(!players[&uuid].tagged);
    assert!(agent.behavior().handle().is_departed());
}

#[tokio::test]
async fn test_discovery_converges_once_a_host_appears() {
    let registry = Arc::new(ScriptedRegistry::with_phantoms(&["junk-1", "junk-2"]));
    let mut agent = MigrationLoop::new(parked_core("dx"), Wanderer);
    let ctx = AgentContext::launcher(registry.clone());

    let late = registry.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        let host = bailiff("late", late.clone());
        late.register("Host-Late", Arc::new(host)).await.unwrap();
    });

    let landed = tokio::time::timeout(Duration::from_secs(5), agent.hop(&ctx))
        .await
        .expect("discovery never converged");
    assert_eq!(landed, "Host-Late");
}

#[tokio::test]
async fn test_bad_name_sticks_until_directory_reset() {
    let registry = Arc::new(ScriptedRegistry::default());
    let real = bailiff("a", registry.clone());
    registry.register("Host-A", Arc::new(RefusingHost)).await.unwrap();

    let mut agent = MigrationLoop::new(parked_core("dx"), Wanderer);
    let ctx = AgentContext::launcher(registry.clone());
    agent.discover(registry.as_ref()).await.unwrap();

    let err = agent.attempt_migration(&ctx, "Host-A").await.unwrap_err();
    agent.apply_failure(&err);
    assert_eq!(agent.state().discovery.classification("Host-A"), Classification::Bad);

    // The name now points at a working host, but it stays bad.
    registry.register("Host-A", Arc::new(real)).await.unwrap();
    assert_eq!(agent.discover(registry.as_ref()).await.unwrap(), 0);
    assert_eq!(agent.state().discovery.classification("Host-A"), Classification::Bad);

    registry.set_down(true);
    let err = agent.discover(registry.as_ref()).await.unwrap_err();
    assert!(err.is_systemic());
    assert!(agent.state().discovery.entries().is_empty());

    registry.set_down(false);
    assert_eq!(agent.discover(registry.as_ref()).await.unwrap(), 1);
    assert_eq!(agent.state().discovery.classification("Host-A"), Classification::Good);
}

#[tokio::test]
async fn test_failed_migration_leaves_player_untouched() {
    let registry = Arc::new(ScriptedRegistry::default());
    registry.register("Host-Full", Arc::new(RefusingHost)).await.unwrap();
    registry
        .register("Host-Open", Arc::new(bailiff("open", registry.clone())))
        .await
        .unwrap();

    let state = PlayerState::new(parked_core("p"), Some("it".into()), true);
    let (core, behavior) = PlayerBehavior::restore(state);
    let mut agent = MigrationLoop::new(core, behavior);
    let ctx = AgentContext::launcher(registry.clone());
    agent.discover(registry.as_ref()).await.unwrap();
    let before = agent.state().clone();

    let err = agent.attempt_migration(&ctx, "Host-Full").await.unwrap_err();
    assert!(matches!(err, MigrationError::CandidateRejected { .. }));
    assert_eq!(agent.state(), &before);
    let handle = agent.behavior().handle();
    assert!(handle.is_tagged());
    assert!(!handle.is_migrating());
    assert!(!handle.is_departed());

    agent.apply_failure(&err);
    assert_eq!(agent.state().discovery.good(), ["Host-Open"]);
    assert_eq!(
        agent.state().discovery.bad().collect::<Vec<_>>(),
        ["Host-Full"]
    );
}

#[tokio::test]
async fn test_directory_outage_during_migration_resets_classification() {
    let registry = Arc::new(ScriptedRegistry::default());
    registry
        .register("Host-A", Arc::new(bailiff("a", registry.clone())))
        .await
        .unwrap();
    registry.register("Host-B", Arc::new(RefusingHost)).await.unwrap();

    let mut agent = MigrationLoop::new(parked_core("dx"), Wanderer);
    let ctx = AgentContext::launcher(registry.clone());
    agent.discover(registry.as_ref()).await.unwrap();
    assert_eq!(agent.state().discovery.good().len(), 2);

    registry.set_down(true);
    let err = agent.attempt_migration(&ctx, "Host-A").await.unwrap_err();
    assert!(err.is_systemic());
    agent.apply_failure(&err);
    assert!(!agent.state().discovery.has_candidates());
}
