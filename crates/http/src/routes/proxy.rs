//! Same-origin relay routes for the public auth endpoints
//!
//! Each route forwards its JSON body unchanged to the matching backend path
//! and echoes the backend's status and body. Nothing is validated or
//! authorized at this layer.
//!
//! Backend response headers are not relayed. A login through the proxy gets
//! no `Set-Cookie`, so the caller holds no refresh cookie afterwards.

use crate::{error::HttpError, state::AppState, types::*};
use axum::{
    body::Bytes,
    extract::State,
    response::{IntoResponse, Json, Response},
};
use tracing::{error, instrument};
use utoipa_axum::{router::OpenApiRouter, routes};

/// Relay login
#[utoipa::path(
    post,
    path = "/api/proxy/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Backend response, status echoed", body = serde_json::Value),
        (status = 500, description = "Relay failed"),
    ),
    tag = "proxy"
)]
#[instrument(name = "proxy_login", skip_all)]
pub async fn proxy_login(State(state): State<AppState>, body: Bytes) -> Response {
    relay(&state, Endpoint::Login, body).await
}

/// Relay registration
#[utoipa::path(
    post,
    path = "/api/proxy/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Backend response, status echoed", body = serde_json::Value),
        (status = 500, description = "Relay failed"),
    ),
    tag = "proxy"
)]
#[instrument(name = "proxy_register", skip_all)]
pub async fn proxy_register(State(state): State<AppState>, body: Bytes) -> Response {
    relay(&state, Endpoint::Register, body).await
}

/// Relay customer selection
#[utoipa::path(
    post,
    path = "/api/proxy/auth/select-customer",
    request_body = SelectCustomerRequest,
    responses(
        (status = 200, description = "Backend response, status echoed", body = serde_json::Value),
        (status = 500, description = "Relay failed"),
    ),
    tag = "proxy"
)]
#[instrument(name = "proxy_select_customer", skip_all)]
pub async fn proxy_select_customer(State(state): State<AppState>, body: Bytes) -> Response {
    relay(&state, Endpoint::SelectCustomer, body).await
}

/// Relay tenant selection
#[utoipa::path(
    post,
    path = "/api/proxy/auth/select-tenant",
    request_body = SelectTenantRequest,
    responses(
        (status = 200, description = "Backend response, status echoed", body = serde_json::Value),
        (status = 500, description = "Relay failed"),
    ),
    tag = "proxy"
)]
#[instrument(name = "proxy_select_tenant", skip_all)]
pub async fn proxy_select_tenant(State(state): State<AppState>, body: Bytes) -> Response {
    relay(&state, Endpoint::SelectTenant, body).await
}

async fn relay(state: &AppState, endpoint: Endpoint, body: Bytes) -> Response {
    match state.forwarder.forward_json(endpoint.path(), body).await {
        Ok((status, value)) => (status, Json(value)).into_response(),
        Err(e) => {
            error!(endpoint = %endpoint, "Proxy relay failed: {}", e);
            HttpError::InternalServerError(format!(
                "Internal Server Error during {} proxy",
                endpoint.label()
            ))
            .into_response()
        }
    }
}

/// Create the proxy router
pub fn router() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(proxy_login))
        .routes(routes!(proxy_register))
        .routes(routes!(proxy_select_customer))
        .routes(routes!(proxy_select_tenant))
}
