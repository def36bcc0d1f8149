// Copyright (c) 2026 tagnet contributors
// SPDX-License-Identifier: AGPL-3.0

//! Integration tests for the tag protocol between co-resident players.

use std::sync::Arc;
use std::time::Duration;

use tagnet_core::application::bailiff::{Bailiff, HostIdentity};
use tagnet_core::domain::agent::{AgentState, DexterState, MigrationRequest};
use tagnet_core::domain::config::HostConfig;
use tagnet_core::domain::host::BailiffApi;
use tagnet_core::domain::player::{PlayerHandle, PlayerId, PlayerState, TagOutcome};
use tagnet_core::infrastructure::registry::InMemoryRegistry;

fn host() -> Bailiff {
    Bailiff::new(
        HostConfig::default(),
        HostIdentity::loopback(),
        Arc::new(InMemoryRegistry::new()),
    )
}

fn parked(name: &str, tagged: bool) -> PlayerState {
    let core = DexterState::new(name).with_restraint_sleep(Duration::from_secs(3600));
    PlayerState::new(core, Some(name.to_string()), tagged)
}

async fn wait_until<F: Fn() -> bool>(what: &str, check: F) {
    for _ in 0..200 {
        if check() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("timed out waiting until {what}");
}

#[tokio::test]
async fn test_arriving_it_tags_resident_player() {
    let bailiff = host();
    let p2 = parked("p2", false);
    bailiff
        .accept(MigrationRequest::top_level(AgentState::Player(p2.clone())))
        .await
        .unwrap();

    let resident = bailiff.players().get(p2.uuid).unwrap();
    wait_until("p2 has settled", || !resident.is_migrating()).await;

    let p1 = parked("p1", true);
    bailiff
        .accept(MigrationRequest::top_level(AgentState::Player(p1.clone())))
        .await
        .unwrap();

    let players = bailiff.players();
    wait_until("p2 is it", || {
        players.get(p2.uuid).map(|h| h.is_tagged()).unwrap_or(false)
    })
    .await;

    let status = bailiff.tagged_status().await.unwrap();
    assert_eq!(status[&p2.uuid], true);
    assert_eq!(status[&p1.uuid], false);
}

#[tokio::test]
async fn test_it_alone_stays_it() {
    let bailiff = host();
    let p1 = parked("p1", true);
    bailiff
        .accept(MigrationRequest::top_level(AgentState::Player(p1.clone())))
        .await
        .unwrap();

    let handle = bailiff.players().get(p1.uuid).unwrap();
    wait_until("p1 has settled", || !handle.is_migrating()).await;
    assert!(handle.is_tagged());
}

#[tokio::test]
async fn test_in_flight_player_cannot_be_tagged() {
    let bailiff = host();
    let leaving = PlayerHandle::new(PlayerId::new(), "leaving", false);
    bailiff.players().insert(leaving.clone());

    let frozen = leaving.begin_migration();
    assert!(!frozen);
    assert_eq!(bailiff.tag(leaving.id()), TagOutcome::Conflict);

    leaving.abort_migration();
    assert_eq!(bailiff.tag(leaving.id()), TagOutcome::Tagged);
}

#[tokio::test]
async fn test_departed_player_disappears_from_listing() {
    let bailiff = host();
    let gone = PlayerHandle::new(PlayerId::new(), "gone", false);
    let stays = PlayerHandle::new(PlayerId::new(), "stays", false);
    bailiff.players().insert(gone.clone());
    bailiff.players().insert(stays.clone());

    gone.mark_departed();

    let listed = bailiff.list_players().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert!(listed.contains_key(&stays.id()));
    assert_eq!(bailiff.tag(gone.id()), TagOutcome::NotResident);
}

#[tokio::test]
async fn test_concurrent_tags_have_one_winner() {
    let bailiff = host();
    let target = PlayerHandle::new(PlayerId::new(), "target", false);
    bailiff.players().insert(target.clone());

    let attempts: Vec<_> = (0..16)
        .map(|_| {
            let bailiff = bailiff.clone();
            let id = target.id();
            tokio::spawn(async move { bailiff.tag_player(id).await.unwrap() })
        })
        .collect();

    let mut winners = 0;
    for attempt in attempts {
        if attempt.await.unwrap() {
            winners += 1;
        }
    }
    assert_eq!(winners, 1);
    assert!(target.is_tagged());
}
