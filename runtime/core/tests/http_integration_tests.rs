// Copyright (c) 2026 tagnet contributors
// SPDX-License-Identifier: AGPL-3.0

//! End-to-end tests over loopback TCP: a registry daemon, one host bound
//! through it, and agents that migrate using only the HTTP clients.

use axum::extract::Path;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use tagnet_core::application::bailiff::{Bailiff, HostIdentity};
use tagnet_core::application::dexter::{AgentContext, MigrationLoop, Wanderer};
use tagnet_core::application::player::PlayerBehavior;
use tagnet_core::domain::agent::{AgentState, DexterState, MigrationRequest};
use tagnet_core::domain::config::HostConfig;
use tagnet_core::domain::errors::{HostError, MigrationError, RegistryError};
use tagnet_core::domain::host::{BailiffApi, Registry};
use tagnet_core::domain::player::PlayerState;
use tagnet_core::infrastructure::{HttpBailiffClient, HttpRegistryClient};
use tagnet_core::presentation::{api, registry_api};

const TIMEOUT: Duration = Duration::from_secs(5);

async fn serve(app: axum::Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

struct Network {
    table: Arc<registry_api::NameTable>,
    registry: Arc<HttpRegistryClient>,
    host: Bailiff,
    host_url: String,
}

async fn network() -> Network {
    let table = Arc::new(registry_api::NameTable::new());
    let registry_addr = serve(registry_api::router(table.clone())).await;
    let registry = Arc::new(
        HttpRegistryClient::new(format!("http://{registry_addr}"), TIMEOUT).unwrap(),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let host_url = format!("http://{}", listener.local_addr().unwrap());
    let config = HostConfig {
        id: "net".to_string(),
        advertise_url: Some(host_url.clone()),
        ..HostConfig::default()
    };
    let host = Bailiff::start(config, HostIdentity::loopback(), registry.clone())
        .await
        .unwrap();

    let app = api::router(host.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    Network {
        table,
        registry,
        host,
        host_url,
    }
}

#[tokio::test]
async fn test_host_is_bound_and_reachable() {
    let net = network().await;

    let names = net.registry.list().await.unwrap();
    assert_eq!(names, vec![net.host.service_name().to_string()]);

    let remote = net.registry.resolve(net.host.service_name()).await.unwrap();
    assert_eq!(remote.endpoint().as_deref(), Some(net.host_url.as_str()));
    assert_eq!(remote.ping().await.unwrap(), net.host.ping_message());

    remote.set_property("Mood", "sunny").await.unwrap();
    assert_eq!(net.host.property("mood").as_deref(), Some("sunny"));
    assert_eq!(
        remote.get_property("HOSTADDRESS").await.unwrap().as_deref(),
        Some("127.0.0.1")
    );

    net.host.shutdown().await;
    assert!(net.registry.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_player_migrates_over_http() {
    let net = network().await;

    let core = DexterState::new("p")
        .with_restraint_sleep(Duration::from_secs(3600))
        .with_retry_sleep(Duration::from_millis(50));
    let state = PlayerState::new(core, Some("walker".into()), false);
    let uuid = state.uuid;
    let (core, behavior) = PlayerBehavior::restore(state);
    let mut agent = MigrationLoop::new(core, behavior);

    let ctx = AgentContext::launcher(net.registry.clone());
    let landed = tokio::time::timeout(TIMEOUT, agent.hop(&ctx)).await.unwrap();
    assert_eq!(landed, net.host.service_name());

    let remote = HttpBailiffClient::new(net.host_url.clone(), TIMEOUT).unwrap();
    assert_eq!(remote.count_players().await.unwrap(), 1);
    let names = remote.player_names().await.unwrap();
    assert_eq!(names[&uuid], "walker");

    let players = remote.list_players().await.unwrap();
    assert!(!players[&uuid].tagged);
    assert_eq!(players[&uuid].name, "walker");
}

#[tokio::test]
async fn test_unknown_entry_point_travels_as_typed_error() {
    let net = network().await;
    let remote = HttpBailiffClient::new(net.host_url.clone(), TIMEOUT).unwrap();

    let request = MigrationRequest {
        agent: AgentState::Dexter(DexterState::new("dx")),
        entry_point: "topLevel".to_string(),
        args: vec![serde_json::json!(1)],
    };
    let err = remote.accept(request).await.unwrap_err();
    match err {
        HostError::NoSuchEntryPoint {
            kind,
            entry_point,
            arity,
        } => {
            assert_eq!(kind, "dexter");
            assert_eq!(entry_point, "topLevel");
            assert_eq!(arity, 1);
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(remote.count_players().await.unwrap(), 0);
}

#[tokio::test]
async fn test_remote_tag() {
    let net = network().await;
    let remote = HttpBailiffClient::new(net.host_url.clone(), TIMEOUT).unwrap();

    let core = DexterState::new("p").with_restraint_sleep(Duration::from_secs(3600));
    let player = PlayerState::new(core, None, false);
    remote
        .accept(MigrationRequest::top_level(AgentState::Player(player.clone())))
        .await
        .unwrap();

    let handle = net.host.players().get(player.uuid).unwrap();
    for _ in 0..200 {
        if !handle.is_migrating() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    assert!(remote.tag_player(player.uuid).await.unwrap());
    assert!(!remote.tag_player(player.uuid).await.unwrap());
    assert_eq!(remote.tagged_status().await.unwrap()[&player.uuid], true);
}

#[tokio::test]
async fn test_malformed_names_are_bad_not_systemic() {
    let net = network().await;
    net.table.bind("Bailiff.%C3%28", "http://127.0.0.1:9");
    net.table.bind("Bailiff.a/b c", "http://127.0.0.1:9");

    let mut agent = MigrationLoop::new(DexterState::new("dx"), Wanderer);
    for _ in 0..3 {
        let good = agent.discover(net.registry.as_ref()).await.unwrap();
        assert_eq!(good, 1);
    }

    let discovery = &agent.state().discovery;
    assert_eq!(discovery.good().to_vec(), vec![net.host.service_name().to_string()]);
    let mut bad: Vec<&str> = discovery.bad().collect();
    bad.sort();
    assert_eq!(bad, vec!["Bailiff.%C3%28", "Bailiff.a/b c"]);
}

#[tokio::test]
async fn test_property_keys_are_path_encoded() {
    let net = network().await;
    let remote = HttpBailiffClient::new(net.host_url.clone(), TIMEOUT).unwrap();

    remote.set_property("where/when?", "now").await.unwrap();
    assert_eq!(net.host.property("where/when?").as_deref(), Some("now"));
    assert_eq!(
        remote.get_property("where/when?").await.unwrap().as_deref(),
        Some("now")
    );
}

/// A registry that lists three names and answers each one differently.
async fn quirky_registry() -> HttpRegistryClient {
    let app = Router::new()
        .route(
            "/names",
            get(|| async {
                Json(vec![
                    "Bailiff.refused".to_string(),
                    "Bailiff.garbled".to_string(),
                    "Bailiff.crashing".to_string(),
                ])
            }),
        )
        .route(
            "/names/{name}",
            get(|Path(name): Path<String>| async move {
                match name.as_str() {
                    "Bailiff.refused" => (StatusCode::BAD_REQUEST, "Invalid name".to_string()),
                    "Bailiff.garbled" => (StatusCode::OK, "not a binding".to_string()),
                    _ => (StatusCode::INTERNAL_SERVER_ERROR, "storage offline".to_string()),
                }
            }),
        );
    let addr = serve(app).await;
    HttpRegistryClient::new(format!("http://{addr}"), TIMEOUT).unwrap()
}

#[tokio::test]
async fn test_registry_answers_map_to_local_or_systemic_failures() {
    let registry = quirky_registry().await;

    assert!(matches!(
        registry.resolve("Bailiff.refused").await,
        Err(RegistryError::Rejected(_))
    ));
    assert!(matches!(
        registry.resolve("Bailiff.garbled").await,
        Err(RegistryError::Rejected(_))
    ));
    assert!(matches!(
        registry.resolve("Bailiff.crashing").await,
        Err(RegistryError::Unreachable(_))
    ));

    let mut agent = MigrationLoop::new(DexterState::new("dx"), Wanderer);
    let err = agent.discover(&registry).await.unwrap_err();
    assert!(matches!(err, MigrationError::DirectoryUnreachable(_)));
    assert!(agent.state().discovery.good().is_empty());
    assert_eq!(agent.state().discovery.bad().count(), 0);
}
