//! HTTP error types and implementations

#[cfg(feature = "server")]
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// HTTP-specific errors
///
/// Rendered as the standard envelope `{ success: false, message }`, where the
/// message is the variant's detail text.
#[derive(Error, Debug)]
pub enum HttpError {
    /// Internal server error
    #[error("Internal server error: {0}")]
    InternalServerError(String),
}

impl HttpError {
    /// Detail text without the category prefix
    pub fn message(&self) -> &str {
        match self {
            HttpError::InternalServerError(message) => message,
        }
    }
}

#[cfg(feature = "server")]
impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = match &self {
            HttpError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body: starlight_core::Envelope = starlight_core::Envelope::failure(self.message());
        (status, Json(body)).into_response()
    }
}

/// Result type alias using HttpError
pub type Result<T> = std::result::Result<T, HttpError>;
