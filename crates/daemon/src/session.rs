//! Session persistence for the CLI
//!
//! Each CLI invocation is a fresh process, so the user record and the
//! backend's session cookie are kept in the state directory between runs. The
//! access token is never written; the first authenticated call after a
//! restart gets a 401 and refreshes it from the cookie.

use crate::config::Settings;
use crate::state_dir::StateDir;
use crate::Result;
use starlight_core::storage::SESSION_COOKIE_KEY;
use starlight_core::{CredentialStore, FileStorage, SessionStorage};
use starlight_http::{AuthGateway, BackendClient};
use std::sync::Arc;
use tracing::{debug, warn};

/// Open the persisted session described by `settings`
pub fn open(settings: &Settings) -> Result<AuthGateway> {
    let state_dir = StateDir::resolve(settings.client.state_dir.as_ref())?;
    let storage: Arc<dyn SessionStorage> = Arc::new(FileStorage::new(state_dir.session_dir()));

    let mut builder = BackendClient::builder().base_url(&settings.backend.base_url);
    if let Some(origin) = &settings.client.proxy_origin {
        builder = builder.proxy_origin(origin);
    }
    if let Some(timeout) = settings.backend_timeout() {
        builder = builder.timeout(timeout);
    }
    let client = builder.build()?;

    match storage.get(SESSION_COOKIE_KEY) {
        Ok(Some(cookie)) => {
            debug!("Restoring session cookie");
            client.restore_cookies(&cookie);
        }
        Ok(None) => {}
        Err(e) => warn!("Failed to read session cookie: {}", e),
    }

    let store = Arc::new(CredentialStore::new(storage));
    Ok(AuthGateway::new(client, store)
        .with_session_expired_hook(|| warn!("Session expired. Please sign in again.")))
}

/// Write the cookie jar back, or drop it once the session has ended
pub fn save(gateway: &AuthGateway) -> Result<()> {
    let storage = gateway.store().storage();
    match gateway.client().cookie_header() {
        Some(cookie) if gateway.store().is_authenticated() => {
            storage.set(SESSION_COOKIE_KEY, &cookie)?
        }
        _ => storage.remove(SESSION_COOKIE_KEY)?,
    }
    Ok(())
}
