//! Relay of JSON bodies to the backend

use crate::error::HttpError;
use bytes::Bytes;
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::time::Duration;
use thiserror::Error;
use tracing::{Instrument, debug};

/// Configuration for forwarding requests to the backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForwardingConfig {
    /// Base URL for the backend API
    pub base_url: String,
    /// Request timeout in seconds (0 disables the timeout)
    pub timeout_seconds: u64,
}

/// Why a relay could not produce a backend response
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("request body is not JSON: {0}")]
    InvalidBody(serde_json::Error),

    #[error("backend unreachable: {0}")]
    Upstream(#[from] reqwest::Error),

    #[error("backend response is not JSON: {0}")]
    InvalidResponse(serde_json::Error),
}

/// Forwards request bodies to fixed backend paths
#[derive(Debug, Clone)]
pub struct Forwarder {
    config: ForwardingConfig,
    client: reqwest::Client,
}

impl Forwarder {
    pub fn new(config: ForwardingConfig) -> Result<Self, HttpError> {
        let mut builder = reqwest::Client::builder();
        if config.timeout_seconds > 0 {
            builder = builder.timeout(Duration::from_secs(config.timeout_seconds));
        }
        let client = builder.build().map_err(|e| {
            HttpError::InternalServerError(format!("Failed to create HTTP client: {e}"))
        })?;

        let config = ForwardingConfig {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            ..config
        };
        Ok(Self { config, client })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// POST `body` to `path` on the backend
    ///
    /// The body must be JSON but is forwarded byte for byte. The backend's
    /// status and JSON body are returned unchanged.
    pub async fn forward_json(
        &self,
        path: &str,
        body: Bytes,
    ) -> Result<(reqwest::StatusCode, JsonValue), ForwardError> {
        serde_json::from_slice::<IgnoredAny>(&body).map_err(ForwardError::InvalidBody)?;

        let url = format!("{}{}", self.config.base_url, path);
        let span = tracing::info_span!(
            "upstream_request",
            url = %url,
            method = "POST",
            timeout_seconds = self.config.timeout_seconds,
        );

        let response = self
            .client
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .instrument(span)
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;
        let value = serde_json::from_slice(&bytes).map_err(ForwardError::InvalidResponse)?;
        debug!(%status, "backend responded");
        Ok((status, value))
    }
}
