//! Backend HTTP client
//!
//! [`BackendClient`] talks to the backend without credentials beyond the
//! session cookie jar. [`AuthGateway`] layers the bearer token, the refresh
//! on 401, and the command surface on top of it.

pub mod auth;
pub mod error;
pub mod gateway;
pub mod profile;
pub mod refresh;
pub mod request;

mod envelope;

pub use error::ClientError;
pub use gateway::{AuthGateway, SessionExpiredHook};
pub use refresh::refresh_access_token;
pub use request::ApiRequest;

use crate::types::Endpoint;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::{Client, ClientBuilder};
use serde::Serialize;
use starlight_core::validation::validators::validate_url;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Client for one backend session
///
/// Every clone shares the same cookie jar, so the httpOnly session cookie set
/// by login is sent with every later request, including the refresh.
#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
    proxy_origin: Option<String>,
    cookies: Arc<Jar>,
}

impl BackendClient {
    /// Create a new client with default configuration
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::builder().base_url(base_url).build()
    }

    /// Create a new client builder
    pub fn builder() -> BackendClientBuilder {
        BackendClientBuilder::default()
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Origin that serves the proxy routes, if public commands are relayed
    pub fn proxy_origin(&self) -> Option<&str> {
        self.proxy_origin.as_deref()
    }

    /// Resolve a backend path, passing absolute URLs through untouched
    pub fn url(&self, target: &str) -> String {
        if target.starts_with("http://") || target.starts_with("https://") {
            target.to_string()
        } else {
            format!("{}{}", self.base_url, target)
        }
    }

    /// URL for an unauthenticated command, through the proxy when configured
    pub fn public_url(&self, endpoint: Endpoint) -> String {
        match (&self.proxy_origin, endpoint.proxy_path()) {
            (Some(origin), Some(path)) => format!("{origin}{path}"),
            _ => self.url(endpoint.path()),
        }
    }

    pub(crate) fn http(&self) -> &Client {
        &self.client
    }

    /// POST a JSON body to a public endpoint without a bearer token
    pub async fn post_public<B: Serialize + ?Sized>(
        &self,
        endpoint: Endpoint,
        body: &B,
    ) -> Result<reqwest::Response, ClientError> {
        let url = self.public_url(endpoint);
        debug!(url = %url, "public request");
        Ok(self.client.post(url).json(body).send().await?)
    }

    /// Cookie header the jar would send with a token refresh
    pub fn cookie_header(&self) -> Option<String> {
        let url = self.refresh_url()?;
        self.cookies
            .cookies(&url)
            .and_then(|value| value.to_str().ok().map(str::to_string))
    }

    /// Load cookies previously captured with [`Self::cookie_header`]
    ///
    /// Restored cookies are scoped to `/` so a rotated cookie set by the
    /// backend with `Path=/` replaces them instead of sitting beside them.
    pub fn restore_cookies(&self, header: &str) {
        let Some(url) = self.refresh_url() else {
            return;
        };
        for cookie in header.split(';').map(str::trim).filter(|c| !c.is_empty()) {
            self.cookies.add_cookie_str(&format!("{cookie}; Path=/"), &url);
        }
    }

    fn refresh_url(&self) -> Option<Url> {
        Url::parse(&self.url(Endpoint::Refresh.path())).ok()
    }
}

/// Builder for BackendClient
#[derive(Default)]
pub struct BackendClientBuilder {
    base_url: Option<String>,
    proxy_origin: Option<String>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl BackendClientBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Relay public auth commands through the proxy routes at `origin`
    pub fn proxy_origin(mut self, origin: impl Into<String>) -> Self {
        self.proxy_origin = Some(origin.into());
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Build the client
    pub fn build(self) -> Result<BackendClient, ClientError> {
        let base_url = self
            .base_url
            .ok_or_else(|| ClientError::Configuration("base_url is required".into()))?;
        let base_url = normalize(&base_url, "base_url")?;
        let proxy_origin = self
            .proxy_origin
            .map(|origin| normalize(&origin, "proxy_origin"))
            .transpose()?;

        let cookies = Arc::new(Jar::default());
        let mut client_builder = ClientBuilder::new().cookie_provider(Arc::clone(&cookies));

        if let Some(timeout) = self.timeout {
            client_builder = client_builder.timeout(timeout);
        }

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| concat!("starlight-client/", env!("CARGO_PKG_VERSION")).into());
        client_builder = client_builder.user_agent(user_agent);

        Ok(BackendClient {
            client: client_builder.build()?,
            base_url,
            proxy_origin,
            cookies,
        })
    }
}

/// Check the URL parses and strip the trailing slash
fn normalize(url: &str, field: &str) -> Result<String, ClientError> {
    validate_url(url, field).map_err(|e| ClientError::Configuration(e.to_string()))?;
    Ok(url.trim_end_matches('/').to_string())
}
