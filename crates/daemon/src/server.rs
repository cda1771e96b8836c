//! Proxy server: router assembly, layers, and the listener loop

use crate::config::Settings;
use crate::{DaemonError, Result};
use axum::Router;
use axum::http::HeaderValue;
use starlight_http::middleware::trace_middleware;
use starlight_http::{AppState, Forwarder, ForwardingConfig};
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use utoipa_scalar::{Scalar, Servable as _};

/// Build the shared state from the backend settings
pub fn build_state(settings: &Settings) -> Result<AppState> {
    let forwarder = Forwarder::new(ForwardingConfig {
        base_url: settings.backend.base_url.clone(),
        timeout_seconds: settings.backend.timeout_secs,
    })?;
    Ok(AppState::new(forwarder))
}

/// Build the complete axum router with documentation at `/docs`
pub fn build_router(state: AppState, settings: &Settings) -> Result<Router> {
    let (router, api) = starlight_http::routes::router().split_for_parts();

    let mut router = router
        .with_state(state)
        .merge(Scalar::with_url("/docs", api))
        .layer(axum::middleware::from_fn(trace_middleware))
        .layer(TraceLayer::new_for_http());

    if let Some(timeout) = settings.request_timeout() {
        router = router.layer(TimeoutLayer::new(timeout));
    }

    if let Some(cors) = cors_layer(&settings.server.cors_origins)? {
        router = router.layer(cors);
    }

    Ok(router)
}

fn cors_layer(origins: &[String]) -> Result<Option<CorsLayer>> {
    if origins.is_empty() {
        return Ok(None);
    }
    if origins.iter().any(|origin| origin == "*") {
        return Ok(Some(CorsLayer::permissive()));
    }

    let origins = origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin).map_err(|e| {
                DaemonError::InvalidConfig(format!("server.cors_origins: {origin}: {e}"))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any),
    ))
}

/// Bind and serve until Ctrl+C
pub async fn serve(settings: &Settings) -> Result<()> {
    let state = build_state(settings)?;
    let router = build_router(state, settings)?;

    let addr = settings.bind_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!(
        backend = %settings.backend.base_url,
        "Server running at: http://{}/",
        listener.local_addr()?
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received shutdown signal"),
        Err(e) => warn!("Failed to listen for shutdown signal: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_layer_from_origins() {
        assert!(cors_layer(&[]).unwrap().is_none());
        assert!(cors_layer(&["*".to_string()]).unwrap().is_some());
        assert!(
            cors_layer(&["http://localhost:5173".to_string()])
                .unwrap()
                .is_some()
        );
        assert!(matches!(
            cors_layer(&["bad\norigin".to_string()]),
            Err(DaemonError::InvalidConfig(_))
        ));
    }
}
