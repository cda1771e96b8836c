//! Local stand-in for the backend login, for development and tests

use crate::state::AppState;
use crate::types::{LoginRequest, MOCK_LOGIN_PATH};
use axum::{body::Bytes, http::StatusCode, response::Json};
use starlight_core::Envelope;
use tracing::{info, instrument};
use utoipa_axum::{router::OpenApiRouter, routes};

const MOCK_USERNAME: &str = "admin";
const MOCK_PASSWORD: &str = "password";

/// Accepts exactly `admin` / `password`
#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful"),
        (status = 401, description = "Invalid credentials"),
    ),
    tag = "mock"
)]
#[instrument(name = "mock_login", skip_all)]
pub async fn mock_login(body: Bytes) -> (StatusCode, Json<Envelope>) {
    let credentials = serde_json::from_slice::<LoginRequest>(&body).ok();
    match credentials {
        Some(LoginRequest { username, password })
            if username == MOCK_USERNAME && password == MOCK_PASSWORD =>
        {
            info!(path = MOCK_LOGIN_PATH, "Mock login accepted");
            (
                StatusCode::OK,
                Json(Envelope::ok(Default::default()).with_message("Login successful")),
            )
        }
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(Envelope::failure("Invalid credentials")),
        ),
    }
}

/// Create the mock router
pub fn router() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(mock_login))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    async fn login(body: &'static str) -> (StatusCode, Value) {
        let app = axum::Router::new().route(MOCK_LOGIN_PATH, axum::routing::post(mock_login));
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(MOCK_LOGIN_PATH)
                    .header("content-type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn accepts_admin_password() {
        let (status, body) = login(r#"{"username":"admin","password":"password"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "success": true, "message": "Login successful" }));
    }

    #[tokio::test]
    async fn rejects_other_credentials() {
        for body in [
            r#"{"username":"wronguser","password":"wrongpass"}"#,
            r#"{"username":"admin","password":"Password"}"#,
            r#"{"username":"admin"}"#,
            "not json",
        ] {
            let (status, body) = login(body).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(
                body,
                json!({ "success": false, "message": "Invalid credentials" })
            );
        }
    }
}
