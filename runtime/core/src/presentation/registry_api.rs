// Copyright (c) 2026 tagnet contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Registry Daemon API
//!
//! A flat name → URL table served over HTTP. Hosts bind themselves here at
//! startup; agents list and resolve names through
//! [`crate::infrastructure::HttpRegistryClient`].
//!
//! Rebinding an existing name overwrites it. Deleting or resolving an unknown
//! name is a 404.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::infrastructure::registry::Binding;

#[derive(Debug, Default)]
pub struct NameTable {
    names: RwLock<BTreeMap<String, String>>,
}

impl NameTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&self, name: &str, url: &str) {
        let previous = self.names.write().insert(name.to_string(), url.to_string());
        match previous {
            Some(old) => info!(name = %name, url = %url, "Rebound (was {})", old),
            None => info!(name = %name, url = %url, "Bound"),
        }
        metrics::gauge!("tagnet_registry_names").set(self.len() as f64);
    }

    pub fn unbind(&self, name: &str) -> bool {
        let removed = self.names.write().remove(name).is_some();
        if removed {
            info!(name = %name, "Unbound");
            metrics::gauge!("tagnet_registry_names").set(self.len() as f64);
        }
        removed
    }

    pub fn lookup(&self, name: &str) -> Option<String> {
        self.names.read().get(name).cloned()
    }

    /// Names in lexical order.
    pub fn names(&self) -> Vec<String> {
        self.names.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.names.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.read().is_empty()
    }
}

pub fn router(table: Arc<NameTable>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/names", get(list_handler))
        .route(
            "/names/{name}",
            get(lookup_handler).put(bind_handler).delete(unbind_handler),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(table)
}

async fn health_handler(State(table): State<Arc<NameTable>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "names": table.len(),
    }))
}

async fn list_handler(State(table): State<Arc<NameTable>>) -> Json<Vec<String>> {
    Json(table.names())
}

async fn lookup_handler(
    State(table): State<Arc<NameTable>>,
    Path(name): Path<String>,
) -> Result<Json<Binding>, StatusCode> {
    table
        .lookup(&name)
        .map(|url| Json(Binding { url }))
        .ok_or(StatusCode::NOT_FOUND)
}

async fn bind_handler(
    State(table): State<Arc<NameTable>>,
    Path(name): Path<String>,
    Json(binding): Json<Binding>,
) -> StatusCode {
    table.bind(&name, &binding.url);
    StatusCode::NO_CONTENT
}

async fn unbind_handler(
    State(table): State<Arc<NameTable>>,
    Path(name): Path<String>,
) -> StatusCode {
    if table.unbind(&name) {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}
