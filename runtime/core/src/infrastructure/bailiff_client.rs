// Copyright (c) 2026 tagnet contributors
// SPDX-License-Identifier: AGPL-3.0

//! HTTP client for a remote Bailiff

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::domain::agent::MigrationRequest;
use crate::domain::errors::HostError;
use crate::domain::host::BailiffApi;
use crate::domain::player::{PlayerId, PlayerSnapshot};
use crate::infrastructure::path_segment;

/// Error body returned by the host API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub kind: String,
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_point: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arity: Option<usize>,
}

impl ErrorBody {
    pub const NO_SUCH_ENTRY_POINT: &'static str = "no_such_entry_point";

    pub fn from_host_error(err: &HostError) -> Self {
        match err {
            HostError::NoSuchEntryPoint {
                kind,
                entry_point,
                arity,
            } => Self {
                kind: Self::NO_SUCH_ENTRY_POINT.to_string(),
                error: err.to_string(),
                agent_kind: Some(kind.clone()),
                entry_point: Some(entry_point.clone()),
                arity: Some(*arity),
            },
            HostError::Unreachable(_) | HostError::Rejected(_) => Self {
                kind: "rejected".to_string(),
                error: err.to_string(),
                agent_kind: None,
                entry_point: None,
                arity: None,
            },
        }
    }

    fn into_host_error(self) -> HostError {
        if self.kind == Self::NO_SUCH_ENTRY_POINT {
            HostError::NoSuchEntryPoint {
                kind: self.agent_kind.unwrap_or_default(),
                entry_point: self.entry_point.unwrap_or_default(),
                arity: self.arity.unwrap_or_default(),
            }
        } else {
            HostError::Rejected(self.error)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyValue {
    pub value: String,
}

#[derive(Debug, Clone)]
pub struct HttpBailiffClient {
    client: Client,
    base_url: String,
}

impl HttpBailiffClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, HostError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| HostError::Unreachable(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self::with_client(client, base_url))
    }

    /// Share an existing connection pool.
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, HostError> {
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .map_err(unreachable)?;
        decode(check(response).await?).await
    }
}

fn unreachable(err: reqwest::Error) -> HostError {
    HostError::Unreachable(err.to_string())
}

async fn check(response: Response) -> Result<Response, HostError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    if status == StatusCode::UNPROCESSABLE_ENTITY {
        if let Ok(body) = serde_json::from_str::<ErrorBody>(&text) {
            return Err(body.into_host_error());
        }
    }
    Err(HostError::Rejected(format!("HTTP {status}: {text}")))
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, HostError> {
    response
        .json()
        .await
        .map_err(|e| HostError::Rejected(format!("Failed to parse host response: {e}")))
}

#[async_trait]
impl BailiffApi for HttpBailiffClient {
    fn endpoint(&self) -> Option<String> {
        Some(self.base_url.clone())
    }

    async fn ping(&self) -> Result<String, HostError> {
        let response = self
            .client
            .get(self.url("/ping"))
            .send()
            .await
            .map_err(unreachable)?;
        check(response)
            .await?
            .text()
            .await
            .map_err(unreachable)
    }

    async fn get_property(&self, key: &str) -> Result<Option<String>, HostError> {
        self.get_json(&format!("/properties/{}", path_segment(key))).await
    }

    async fn set_property(&self, key: &str, value: &str) -> Result<(), HostError> {
        let response = self
            .client
            .put(self.url(&format!("/properties/{}", path_segment(key))))
            .json(&PropertyValue {
                value: value.to_string(),
            })
            .send()
            .await
            .map_err(unreachable)?;
        check(response).await?;
        Ok(())
    }

    async fn accept(&self, request: MigrationRequest) -> Result<(), HostError> {
        let response = self
            .client
            .post(self.url("/agents"))
            .json(&request)
            .send()
            .await
            .map_err(unreachable)?;
        check(response).await?;
        Ok(())
    }

    async fn tag_player(&self, id: PlayerId) -> Result<bool, HostError> {
        let response = self
            .client
            .post(self.url(&format!("/players/{id}/tag")))
            .send()
            .await
            .map_err(unreachable)?;
        decode(check(response).await?).await
    }

    async fn list_players(&self) -> Result<HashMap<PlayerId, PlayerSnapshot>, HostError> {
        self.get_json("/players").await
    }

    async fn player_names(&self) -> Result<HashMap<PlayerId, String>, HostError> {
        self.get_json("/players/names").await
    }

    async fn count_players(&self) -> Result<usize, HostError> {
        self.get_json("/players/count").await
    }

    async fn tagged_status(&self) -> Result<HashMap<PlayerId, bool>, HostError> {
        self.get_json("/players/tagged").await
    }
}
