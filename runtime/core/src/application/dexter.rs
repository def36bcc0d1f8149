// Copyright (c) 2026 tagnet contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Discovery / Migration Loop
//!
//! [`MigrationLoop`] is the generic "Dexter" loop every agent runs:
//!
//! ```text
//! arrival ─▶ RESTRAINING ─▶ DISCOVERING ─▶ SELECTING ─▶ MIGRATING ─▶ (gone)
//!                               ▲   │ none good      ▲        │ failed
//!                               │   └─ retry sleep ──┘        │
//!                               └──── good set empty ◀────────┘
//! ```
//!
//! The only way out is a successful migration, after which the agent lives on
//! as a fresh task on the target host. Agent kinds customise the loop through
//! an [`AgentBehavior`] strategy instead of subclassing it.
//!
//! Failure handling follows [`MigrationError::is_systemic`]: an unreachable
//! registry discards the whole classification, anything else marks the one
//! candidate bad.

use async_trait::async_trait;
use rand::seq::IndexedRandom;
use std::sync::Arc;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::application::bailiff::Bailiff;
use crate::domain::agent::{AgentState, DexterState, MigrationRequest};
use crate::domain::discovery::LoopPhase;
use crate::domain::errors::{MigrationError, RegistryError};
use crate::domain::host::Registry;

/// What a running agent can reach: the registry and, when resident, its host.
#[derive(Clone)]
pub struct AgentContext {
    pub registry: Arc<dyn Registry>,
    /// `None` for the launching process, which is not a host.
    pub host: Option<Bailiff>,
}

impl AgentContext {
    pub fn launcher(registry: Arc<dyn Registry>) -> Self {
        Self {
            registry,
            host: None,
        }
    }

    pub fn resident(registry: Arc<dyn Registry>, host: Bailiff) -> Self {
        Self {
            registry,
            host: Some(host),
        }
    }
}

/// Per-kind policy plugged into the migration loop.
#[async_trait]
pub trait AgentBehavior: Send {
    fn kind(&self) -> &'static str;

    /// Runs once at the start of every unit of execution, before the
    /// restraint delay.
    async fn on_arrival(&mut self, _ctx: &AgentContext) {}

    /// Pick one of `good` (non-empty). Returning `None` or a name outside
    /// `good` falls back to a uniform random choice.
    async fn select_candidate(&mut self, _ctx: &AgentContext, good: &[String]) -> Option<String> {
        random_candidate(good)
    }

    /// Build the record to ship. Called right before the transfer.
    fn prepare_departure(&mut self, core: &DexterState) -> AgentState;

    /// The transfer failed; local state must be as before `prepare_departure`.
    fn departure_failed(&mut self) {}

    /// The target accepted the agent; this unit is about to end.
    fn departed(&mut self) {}
}

/// Uniform random choice among `good`.
pub fn random_candidate(good: &[String]) -> Option<String> {
    good.choose(&mut rand::rng()).cloned()
}

/// Base behavior: wander uniformly at random.
#[derive(Debug, Clone, Copy, Default)]
pub struct Wanderer;

#[async_trait]
impl AgentBehavior for Wanderer {
    fn kind(&self) -> &'static str {
        "dexter"
    }

    fn prepare_departure(&mut self, core: &DexterState) -> AgentState {
        AgentState::Dexter(core.clone())
    }
}

pub struct MigrationLoop<B> {
    state: DexterState,
    behavior: B,
    phase: LoopPhase,
}

impl<B: AgentBehavior> MigrationLoop<B> {
    pub fn new(state: DexterState, behavior: B) -> Self {
        Self {
            state,
            behavior,
            phase: LoopPhase::Restraining,
        }
    }

    pub fn state(&self) -> &DexterState {
        &self.state
    }

    pub fn behavior(&self) -> &B {
        &self.behavior
    }

    pub fn phase(&self) -> LoopPhase {
        self.phase
    }

    /// One unit of execution: arrival, restraint, then hop until migrated.
    pub async fn run(mut self, ctx: AgentContext) {
        self.state.jump_count += 1;
        self.diag("Is here");

        self.behavior.on_arrival(&ctx).await;

        self.enter(LoopPhase::Restraining);
        sleep(self.state.restraint_sleep).await;
        self.diag("Leaving restraint sleep");

        let target = self.hop(&ctx).await;
        self.diag(&format!("Has migrated to {target}"));
    }

    /// Discover, select and migrate until one transfer succeeds. Returns the
    /// name of the host that accepted the agent.
    pub async fn hop(&mut self, ctx: &AgentContext) -> String {
        loop {
            self.discover_until_good(ctx).await;
            self.diag(&format!(
                "Found {} Bailiffs",
                self.state.discovery.good().len()
            ));

            while self.state.discovery.has_candidates() {
                self.enter(LoopPhase::Selecting);
                let good = self.state.discovery.good().to_vec();
                let name = match self.behavior.select_candidate(ctx, &good).await {
                    Some(name) if good.contains(&name) => name,
                    _ => match random_candidate(&good) {
                        Some(name) => name,
                        None => break,
                    },
                };

                match self.attempt_migration(ctx, &name).await {
                    Ok(()) => return name,
                    Err(err) => self.apply_failure(&err),
                }
            }

            self.diag("All Bailiffs failed");
        }
    }

    async fn discover_until_good(&mut self, ctx: &AgentContext) {
        let mut first_pass = true;
        loop {
            if !first_pass {
                self.diag("No Bailiffs detected - sleeping");
                sleep(self.state.retry_sleep).await;
                self.diag("Waking up, looking for Bailiffs");
            }
            first_pass = false;

            match self.discover(ctx.registry.as_ref()).await {
                Ok(good) if good > 0 => return,
                Ok(_) => {}
                Err(err) => warn!(agent = %self.state.id, "Discovery failed: {}", err),
            }
        }
    }

    /// One discovery pass. Classifies every prefixed registry name not yet
    /// classified: good if it resolves and answers a ping, bad otherwise.
    /// Returns the size of the good set.
    pub async fn discover(&mut self, registry: &dyn Registry) -> Result<usize, MigrationError> {
        self.enter(LoopPhase::Discovering);

        let names = match registry.list().await {
            Ok(names) => names,
            Err(err) => return Err(self.directory_unreachable(err)),
        };

        let prefix = self.state.name_prefix.clone();
        for name in names.iter().filter(|n| n.starts_with(&prefix)) {
            if self.state.discovery.is_classified(name) {
                continue;
            }

            let host = match registry.resolve(name).await {
                Ok(host) => host,
                Err(err @ RegistryError::Unreachable(_)) => {
                    return Err(self.directory_unreachable(err));
                }
                Err(err) => {
                    debug!(agent = %self.state.id, name = %name, "Unresolvable name: {}", err);
                    self.state.discovery.mark_bad(name);
                    continue;
                }
            };

            match host.ping().await {
                Ok(_) => {
                    self.state.discovery.mark_good(name);
                }
                Err(err) => {
                    debug!(agent = %self.state.id, name = %name, "Ping failed: {}", err);
                    self.state.discovery.mark_bad(name);
                }
            }
        }

        Ok(self.state.discovery.good().len())
    }

    fn directory_unreachable(&mut self, err: RegistryError) -> MigrationError {
        self.diag("No registry found - resetting name lists");
        self.state.discovery.reset();
        MigrationError::DirectoryUnreachable(err.to_string())
    }

    /// Try to move to `name`. On failure the agent's state is exactly as
    /// before the call; the caller decides how to reclassify.
    pub async fn attempt_migration(
        &mut self,
        ctx: &AgentContext,
        name: &str,
    ) -> Result<(), MigrationError> {
        self.enter(LoopPhase::Migrating);

        let host = ctx
            .registry
            .resolve(name)
            .await
            .map_err(|err| MigrationError::from_registry(name, err))?;

        self.diag("Trying to migrate");
        let agent = self.behavior.prepare_departure(&self.state);
        match host.accept(MigrationRequest::top_level(agent)).await {
            Ok(()) => {
                self.behavior.departed();
                metrics::counter!("tagnet_migrations_total", "outcome" => "migrated").increment(1);
                Ok(())
            }
            Err(err) => {
                self.behavior.departure_failed();
                Err(MigrationError::from_host(name, err))
            }
        }
    }

    /// Reclassify after a failed attempt.
    pub fn apply_failure(&mut self, err: &MigrationError) {
        metrics::counter!("tagnet_migrations_total", "outcome" => err.kind()).increment(1);
        if err.is_systemic() {
            self.diag("No registry found - resetting name lists");
            self.state.discovery.reset();
        } else if let Some(name) = err.candidate() {
            self.diag(&format!("Bad service name found: {name} ({err})"));
            self.state.discovery.mark_bad(name);
        }
    }

    fn enter(&mut self, phase: LoopPhase) {
        if self.phase != phase {
            debug!(agent = %self.state.id, jump = self.state.jump_count, "{} -> {}", self.phase, phase);
            self.phase = phase;
        }
    }

    /// Agent diagnostics. Debug-enabled agents log at info so their trail is
    /// visible on whichever host they currently run.
    fn diag(&self, msg: &str) {
        if self.state.debug {
            info!(agent = %self.state.id, jump = self.state.jump_count, kind = self.behavior.kind(), "{}", msg);
        } else {
            debug!(agent = %self.state.id, jump = self.state.jump_count, kind = self.behavior.kind(), "{}", msg);
        }
    }
}
