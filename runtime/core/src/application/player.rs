// Copyright (c) 2026 tagnet contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Player Strategy
//!
//! [`PlayerBehavior`] turns the generic migration loop into a tag player:
//!
//! - **On arrival** the in-flight flag is cleared and, if the player is "it",
//!   it tags the first eligible co-resident (not itself, not tagged, not in
//!   flight) and stops being "it". At most one tag per arrival.
//! - **Selection** is population aware. "It" heads for the most crowded host;
//!   everyone else heads for the emptiest host, avoiding hosts where another
//!   "it" is known to be resident when there is a choice. Population queries
//!   may fail; a host whose population is unknown is not ranked, and when no
//!   host could be ranked the choice is uniformly random.
//!
//! Population is an advisory snapshot and can be stale by the time the agent
//! lands.

use async_trait::async_trait;
use futures::future::join_all;
use tracing::{debug, info};

use crate::application::bailiff::Bailiff;
use crate::application::dexter::{random_candidate, AgentBehavior, AgentContext};
use crate::domain::agent::{AgentState, DexterState};
use crate::domain::player::{PlayerHandle, PlayerId, PlayerState};

/// What a player learned about one candidate host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostReport {
    pub name: String,
    /// Resident players other than the surveying player, if known.
    pub population: Option<usize>,
    /// Whether some other player resident there is "it", if known.
    pub it_present: Option<bool>,
}

impl HostReport {
    pub fn unknown(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            population: None,
            it_present: None,
        }
    }
}

/// Rank candidate hosts for a player. `None` when no population is known.
///
/// Ties go to the first report in order.
pub fn choose_host(tagged: bool, reports: &[HostReport]) -> Option<&str> {
    let known: Vec<(&HostReport, usize)> = reports
        .iter()
        .filter_map(|r| r.population.map(|p| (r, p)))
        .collect();

    if tagged {
        let mut best: Option<(&HostReport, usize)> = None;
        for (report, population) in known {
            if best.is_none_or(|(_, top)| population > top) {
                best = Some((report, population));
            }
        }
        return best.map(|(r, _)| r.name.as_str());
    }

    let safe: Vec<(&HostReport, usize)> = known
        .iter()
        .copied()
        .filter(|(r, _)| r.it_present != Some(true))
        .collect();
    let pool = if safe.is_empty() { known } else { safe };

    let mut best: Option<(&HostReport, usize)> = None;
    for (report, population) in pool {
        if best.is_none_or(|(_, low)| population < low) {
            best = Some((report, population));
        }
    }
    best.map(|(r, _)| r.name.as_str())
}

pub struct PlayerBehavior {
    handle: PlayerHandle,
    current_host: Option<String>,
}

impl PlayerBehavior {
    /// Split an arriving record into loop state and a live player.
    pub fn restore(state: PlayerState) -> (DexterState, Self) {
        let handle = PlayerHandle::from_state(&state);
        let behavior = Self {
            handle,
            current_host: state.current_host,
        };
        (state.core, behavior)
    }

    pub fn handle(&self) -> &PlayerHandle {
        &self.handle
    }

    pub fn current_host(&self) -> Option<&str> {
        self.current_host.as_deref()
    }

    /// Tag the first eligible co-resident. Returns who was tagged.
    pub fn tag_someone(&self, host: &Bailiff) -> Option<PlayerId> {
        let me = self.handle.id();
        for candidate in host.players().residents() {
            if candidate.id() == me || !candidate.is_eligible_target() {
                continue;
            }
            if host.tag(candidate.id()).is_tagged() {
                self.handle.reset_tag();
                info!(
                    player = %self.handle.name(),
                    target = %candidate.name(),
                    host = %host.service_name(),
                    "Tagged a player"
                );
                return Some(candidate.id());
            }
        }
        None
    }

    /// Ask every candidate about its residents, concurrently.
    async fn survey(&self, ctx: &AgentContext, good: &[String]) -> Vec<HostReport> {
        let me = self.handle.id();

        let probes = good.iter().map(|name| {
            let registry = ctx.registry.clone();
            async move {
                let host = match registry.resolve(name).await {
                    Ok(host) => host,
                    Err(err) => {
                        debug!(name = %name, "Population unknown: {}", err);
                        return HostReport::unknown(name.as_str());
                    }
                };
                let (population, it_present) = match host.list_players().await {
                    Ok(players) => {
                        let others: Vec<_> = players.values().filter(|p| p.uuid != me).collect();
                        (Some(others.len()), Some(others.iter().any(|p| p.tagged)))
                    }
                    Err(_) => {
                        let population = host.count_players().await.ok();
                        let it_present = host
                            .tagged_status()
                            .await
                            .ok()
                            .map(|status| status.iter().any(|(id, it)| *it && *id != me));
                        (population, it_present)
                    }
                };
                HostReport {
                    name: name.clone(),
                    population,
                    it_present,
                }
            }
        });

        join_all(probes).await
    }
}

#[async_trait]
impl AgentBehavior for PlayerBehavior {
    fn kind(&self) -> &'static str {
        "player"
    }

    async fn on_arrival(&mut self, ctx: &AgentContext) {
        self.handle.clear_migrating();

        let Some(host) = ctx.host.as_ref() else {
            return;
        };
        self.current_host = Some(host.service_name().to_string());

        if self.handle.is_tagged() {
            match self.tag_someone(host) {
                Some(_) => metrics::counter!("tagnet_tags_total").increment(1),
                None => debug!(player = %self.handle.name(), "Nobody to tag here"),
            }
        }
    }

    async fn select_candidate(&mut self, ctx: &AgentContext, good: &[String]) -> Option<String> {
        let tagged = self.handle.is_tagged();
        let reports = self.survey(ctx, good).await;
        match choose_host(tagged, &reports) {
            Some(name) => Some(name.to_string()),
            None => random_candidate(good),
        }
    }

    fn prepare_departure(&mut self, core: &DexterState) -> AgentState {
        let tagged = self.handle.begin_migration();
        AgentState::Player(PlayerState {
            core: core.clone(),
            uuid: self.handle.id(),
            display_name: self.handle.name().to_string(),
            tagged,
            migrating: true,
            current_host: self.current_host.clone(),
        })
    }

    fn departure_failed(&mut self) {
        self.handle.abort_migration();
    }

    fn departed(&mut self) {
        self.handle.mark_departed();
    }
}
