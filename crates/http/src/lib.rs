//! Starlight HTTP module
//!
//! The `client` feature provides the authenticated session gateway and the
//! remote command surface; the `server` feature provides the same-origin
//! proxy routes, the mock login and their OpenAPI description.

pub mod error;
pub mod types;

#[cfg(feature = "client")]
pub mod client;

#[cfg(feature = "server")]
pub mod forwarding;
#[cfg(feature = "server")]
pub mod middleware;
#[cfg(feature = "server")]
pub mod routes;
#[cfg(feature = "server")]
pub mod state;

pub use error::{HttpError, Result};

#[cfg(feature = "client")]
pub use client::{AuthGateway, BackendClient, ClientError};
#[cfg(feature = "server")]
pub use forwarding::{Forwarder, ForwardingConfig};
#[cfg(feature = "server")]
pub use state::AppState;

// Re-export commonly used types
#[cfg(feature = "server")]
pub use axum::{Json, extract, response};
#[cfg(feature = "server")]
pub use utoipa::OpenApi;
