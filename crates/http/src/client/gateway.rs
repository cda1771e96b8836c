//! Authenticated request gateway
//!
//! Every authenticated call goes through [`AuthGateway::send`]: the bearer
//! token is attached, a 401 triggers at most one token refresh, and the
//! request is retried at most once. Concurrent 401s share a single refresh.

use super::{ApiRequest, BackendClient, ClientError, refresh_access_token};
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Response, StatusCode};
use starlight_core::CredentialStore;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

/// Called after a refresh failure has cleared the session
pub type SessionExpiredHook = Arc<dyn Fn() + Send + Sync>;

type PendingRefresh = Shared<BoxFuture<'static, Option<String>>>;

/// Request gateway bound to one session
///
/// Clones share the session, the cookie jar and the in-flight refresh.
#[derive(Clone)]
pub struct AuthGateway {
    pub(crate) client: BackendClient,
    pub(crate) store: Arc<CredentialStore>,
    in_flight: Arc<Mutex<Option<PendingRefresh>>>,
    on_session_expired: Option<SessionExpiredHook>,
}

impl AuthGateway {
    pub fn new(client: BackendClient, store: Arc<CredentialStore>) -> Self {
        Self {
            client,
            store,
            in_flight: Arc::new(Mutex::new(None)),
            on_session_expired: None,
        }
    }

    /// Run `hook` whenever an unrecoverable 401 ends the session
    pub fn with_session_expired_hook(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_session_expired = Some(Arc::new(hook));
        self
    }

    pub fn client(&self) -> &BackendClient {
        &self.client
    }

    pub fn store(&self) -> &Arc<CredentialStore> {
        &self.store
    }

    /// Issue `request` with the current bearer token
    ///
    /// On 401 the token is refreshed once and the request retried once. If
    /// the refresh fails the session is cleared, the session-expired hook
    /// runs, and the original 401 response is returned.
    #[instrument(
        name = "gateway.send",
        skip_all,
        fields(method = %request.method(), target = %request.target())
    )]
    pub async fn send(&self, request: &ApiRequest) -> Result<Response, ClientError> {
        let sent_token = self.store.access_token();
        let response = self.dispatch(request, sent_token.as_deref()).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        debug!("Received 401, refreshing access token");
        match self.fresh_token(sent_token.as_deref()).await {
            Some(token) => self.dispatch(request, Some(&token)).await,
            None => {
                self.expire();
                Ok(response)
            }
        }
    }

    /// Refresh the access token, joining a refresh already in flight
    pub async fn refresh(&self) -> Option<String> {
        let pending = {
            let mut in_flight = self.in_flight.lock().await;
            match in_flight.as_ref() {
                Some(pending) => {
                    debug!("Joining in-flight token refresh");
                    pending.clone()
                }
                None => {
                    let client = self.client.clone();
                    let store = Arc::clone(&self.store);
                    let pending = async move { refresh_access_token(&client, &store).await }
                        .boxed()
                        .shared();
                    *in_flight = Some(pending.clone());
                    pending
                }
            }
        };

        let token = pending.clone().await;

        let mut in_flight = self.in_flight.lock().await;
        if in_flight
            .as_ref()
            .is_some_and(|current| current.ptr_eq(&pending))
        {
            *in_flight = None;
        }
        token
    }

    /// Token to retry with after a 401 on `sent`
    ///
    /// A token newer than the one the request carried means another call
    /// already refreshed; reuse it instead of refreshing again.
    async fn fresh_token(&self, sent: Option<&str>) -> Option<String> {
        if let Some(current) = self.store.access_token()
            && sent != Some(current.as_str())
        {
            debug!("Access token changed while in flight, retrying with it");
            return Some(current);
        }
        self.refresh().await
    }

    async fn dispatch(
        &self,
        request: &ApiRequest,
        token: Option<&str>,
    ) -> Result<Response, ClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(token) = token {
            headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {token}"))?);
        }
        for name in request.headers().keys() {
            headers.remove(name);
        }
        for (name, value) in request.headers() {
            headers.append(name, value.clone());
        }

        let mut builder = self
            .client
            .http()
            .request(request.method().clone(), self.client.url(request.target()))
            .headers(headers);
        if let Some(body) = request.body() {
            builder = builder.body(body.clone());
        }

        Ok(builder.send().await?)
    }

    fn expire(&self) {
        warn!("Session could not be refreshed, signing out");
        self.store.logout();
        if let Some(hook) = &self.on_session_expired {
            hook();
        }
    }
}

impl fmt::Debug for AuthGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthGateway")
            .field("base_url", &self.client.base_url())
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}
