// Copyright (c) 2026 tagnet contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Host API
//!
//! HTTP face of one [`Bailiff`]. Remote agents and players reach the host
//! through [`crate::infrastructure::HttpBailiffClient`], which speaks exactly
//! these routes:
//!
//! | Method | Path | Response |
//! |--------|------|----------|
//! | GET | `/ping` | text |
//! | GET | `/health` | `{status, uptime_seconds, players}` |
//! | GET | `/properties/{key}` | `string \| null` |
//! | PUT | `/properties/{key}` | 204, body `{value}` |
//! | POST | `/agents` | 202, 422 on an unknown entry point |
//! | POST | `/players/{id}/tag` | `bool` |
//! | GET | `/players` | id → snapshot |
//! | GET | `/players/names` | id → name |
//! | GET | `/players/count` | number |
//! | GET | `/players/tagged` | id → bool |

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::collections::HashMap;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::application::bailiff::Bailiff;
use crate::domain::agent::MigrationRequest;
use crate::domain::errors::HostError;
use crate::domain::player::{PlayerId, PlayerSnapshot};
use crate::infrastructure::bailiff_client::{ErrorBody, PropertyValue};

pub fn router(bailiff: Bailiff) -> Router {
    Router::new()
        .route("/ping", get(ping_handler))
        .route("/health", get(health_handler))
        .route(
            "/properties/{key}",
            get(get_property_handler).put(put_property_handler),
        )
        .route("/agents", post(accept_handler))
        .route("/players", get(list_players_handler))
        .route("/players/names", get(player_names_handler))
        .route("/players/count", get(count_players_handler))
        .route("/players/tagged", get(tagged_status_handler))
        .route("/players/{id}/tag", post(tag_player_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(bailiff)
}

struct ApiError(StatusCode, ErrorBody);

impl From<HostError> for ApiError {
    fn from(err: HostError) -> Self {
        let status = match err {
            HostError::NoSuchEntryPoint { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            HostError::Rejected(_) | HostError::Unreachable(_) => StatusCode::BAD_REQUEST,
        };
        ApiError(status, ErrorBody::from_host_error(&err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.0, Json(self.1)).into_response()
    }
}

async fn ping_handler(State(bailiff): State<Bailiff>) -> String {
    bailiff.ping_message()
}

async fn health_handler(State(bailiff): State<Bailiff>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": bailiff.service_name(),
        "uptime_seconds": bailiff.uptime().as_secs(),
        "players": bailiff.players().count(),
    }))
}

async fn get_property_handler(
    State(bailiff): State<Bailiff>,
    Path(key): Path<String>,
) -> Json<Option<String>> {
    Json(bailiff.property(&key))
}

async fn put_property_handler(
    State(bailiff): State<Bailiff>,
    Path(key): Path<String>,
    Json(body): Json<PropertyValue>,
) -> StatusCode {
    bailiff.put_property(&key, &body.value);
    StatusCode::NO_CONTENT
}

async fn accept_handler(
    State(bailiff): State<Bailiff>,
    Json(request): Json<MigrationRequest>,
) -> Result<StatusCode, ApiError> {
    match bailiff.admit(request) {
        Ok(()) => Ok(StatusCode::ACCEPTED),
        Err(err) => {
            warn!("Refused incoming agent: {}", err);
            Err(err.into())
        }
    }
}

async fn tag_player_handler(
    State(bailiff): State<Bailiff>,
    Path(id): Path<String>,
) -> Result<Json<bool>, ApiError> {
    let id = PlayerId::from_string(&id)
        .map_err(|e| ApiError::from(HostError::Rejected(format!("Invalid player id: {e}"))))?;
    Ok(Json(bailiff.tag(id).is_tagged()))
}

async fn list_players_handler(
    State(bailiff): State<Bailiff>,
) -> Json<HashMap<PlayerId, PlayerSnapshot>> {
    Json(bailiff.players().snapshot())
}

async fn player_names_handler(State(bailiff): State<Bailiff>) -> Json<HashMap<PlayerId, String>> {
    Json(bailiff.players().names())
}

async fn count_players_handler(State(bailiff): State<Bailiff>) -> Json<usize> {
    Json(bailiff.players().count())
}

async fn tagged_status_handler(State(bailiff): State<Bailiff>) -> Json<HashMap<PlayerId, bool>> {
    Json(bailiff.players().tagged_status())
}
