// Copyright (c) 2026 tagnet contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Registry Implementations
//!
//! - [`InMemoryRegistry`] binds names to in-process hosts. Used for embedded
//!   runs and tests.
//! - [`HttpRegistryClient`] talks to the registry daemon
//!   (`crate::presentation::registry_api`). Only hosts with an endpoint URL
//!   can be bound through it; resolving a name yields an
//!   [`HttpBailiffClient`].

use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::domain::errors::RegistryError;
use crate::domain::host::{BailiffApi, Registry};
use crate::infrastructure::bailiff_client::HttpBailiffClient;
use crate::infrastructure::path_segment;

#[derive(Default)]
pub struct InMemoryRegistry {
    bindings: RwLock<BTreeMap<String, Arc<dyn BailiffApi>>>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Registry for InMemoryRegistry {
    async fn register(&self, name: &str, host: Arc<dyn BailiffApi>) -> Result<(), RegistryError> {
        self.bindings.write().insert(name.to_string(), host);
        Ok(())
    }

    async fn unregister(&self, name: &str) -> Result<(), RegistryError> {
        match self.bindings.write().remove(name) {
            Some(_) => Ok(()),
            None => Err(RegistryError::NotFound(name.to_string())),
        }
    }

    async fn list(&self) -> Result<Vec<String>, RegistryError> {
        Ok(self.bindings.read().keys().cloned().collect())
    }

    async fn resolve(&self, name: &str) -> Result<Arc<dyn BailiffApi>, RegistryError> {
        self.bindings
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }
}

/// Wire form of a registry binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct HttpRegistryClient {
    client: Client,
    base_url: String,
}

impl HttpRegistryClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, RegistryError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RegistryError::Unreachable(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn name_url(&self, name: &str) -> String {
        format!("{}/names/{}", self.base_url, path_segment(name))
    }
}

fn unreachable(err: reqwest::Error) -> RegistryError {
    RegistryError::Unreachable(err.to_string())
}

/// Classify a non-success answer about one name. Only a server-side failure
/// says anything about the registry as a whole.
async fn unexpected(name: &str, response: reqwest::Response) -> RegistryError {
    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return RegistryError::NotFound(name.to_string());
    }
    let text = response.text().await.unwrap_or_default();
    if status.is_client_error() {
        return RegistryError::Rejected(format!("'{name}': registry answered {status}: {text}"));
    }
    RegistryError::Unreachable(format!("registry answered {status}: {text}"))
}

#[async_trait]
impl Registry for HttpRegistryClient {
    async fn register(&self, name: &str, host: Arc<dyn BailiffApi>) -> Result<(), RegistryError> {
        let url = host
            .endpoint()
            .ok_or_else(|| RegistryError::Unsupported(name.to_string()))?;

        let response = self
            .client
            .put(self.name_url(name))
            .json(&Binding { url })
            .send()
            .await
            .map_err(unreachable)?;

        if !response.status().is_success() {
            return Err(unexpected(name, response).await);
        }
        Ok(())
    }

    async fn unregister(&self, name: &str) -> Result<(), RegistryError> {
        let response = self
            .client
            .delete(self.name_url(name))
            .send()
            .await
            .map_err(unreachable)?;

        if !response.status().is_success() {
            return Err(unexpected(name, response).await);
        }
        Ok(())
    }

    async fn list(&self) -> Result<Vec<String>, RegistryError> {
        let response = self
            .client
            .get(format!("{}/names", self.base_url))
            .send()
            .await
            .map_err(unreachable)?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(RegistryError::Unreachable(format!(
                "registry answered {status}: {text}"
            )));
        }
        response.json().await.map_err(unreachable)
    }

    async fn resolve(&self, name: &str) -> Result<Arc<dyn BailiffApi>, RegistryError> {
        let response = self
            .client
            .get(self.name_url(name))
            .send()
            .await
            .map_err(unreachable)?;

        if !response.status().is_success() {
            return Err(unexpected(name, response).await);
        }

        let binding: Binding = response.json().await.map_err(|e| {
            RegistryError::Rejected(format!("'{name}': unusable binding: {e}"))
        })?;
        debug!(name = %name, url = %binding.url, "Resolved");
        Ok(Arc::new(HttpBailiffClient::with_client(
            self.client.clone(),
            binding.url,
        )))
    }
}
