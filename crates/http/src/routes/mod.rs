//! API route definitions
use crate::state::AppState;
use utoipa::OpenApi;
use utoipa_axum::{router::OpenApiRouter, routes};

pub mod health;
pub mod mock;
pub mod proxy;

#[derive(OpenApi)]
#[openapi(
    info(title = "Starlight", description = "Session proxy for the Starlight backend"),
    tags(
        (name = "proxy", description = "Relays to the backend auth endpoints"),
        (name = "mock", description = "Local stand-ins for backend endpoints"),
        (name = "health", description = "Liveness"),
    ),
)]
pub struct ApiDoc;

/// All routes with their OpenAPI description
pub fn router() -> OpenApiRouter<AppState> {
    OpenApiRouter::with_openapi(ApiDoc::openapi())
        .routes(routes!(health::health_check))
        .merge(proxy::router())
        .merge(mock::router())
}
