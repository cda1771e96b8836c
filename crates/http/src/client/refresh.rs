//! Exchange the session cookie for a new access token

use super::BackendClient;
use crate::types::{Endpoint, RefreshPayload};
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use starlight_core::{CredentialStore, Envelope};
use tracing::{debug, instrument, warn};

/// POST the refresh endpoint with the cookie jar and store the new token
///
/// Returns `None` on any failure; failures are logged, never raised.
#[instrument(name = "auth.refresh", skip_all)]
pub async fn refresh_access_token(
    client: &BackendClient,
    store: &CredentialStore,
) -> Option<String> {
    let url = client.url(Endpoint::Refresh.path());
    let response = match client
        .http()
        .post(&url)
        .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
        .send()
        .await
    {
        Ok(response) => response,
        Err(e) => {
            warn!("Token refresh request failed: {}", e);
            return None;
        }
    };

    let status = response.status();
    if !status.is_success() {
        warn!(%status, "Token refresh rejected");
        return None;
    }

    let envelope = match response.json::<Envelope<RefreshPayload>>().await {
        Ok(envelope) => envelope,
        Err(e) => {
            warn!("Malformed token refresh response: {}", e);
            return None;
        }
    };

    match envelope.payload.access_token {
        Some(token) if envelope.success && !token.is_empty() => {
            store.set_access_token(token.clone());
            debug!("Access token refreshed");
            Some(token)
        }
        _ => {
            warn!(message = ?envelope.message, "Token refresh unsuccessful");
            None
        }
    }
}
