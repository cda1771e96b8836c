//! Router assembly tests: every route mounted, layers in place

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use starlight_daemon::Settings;
use starlight_daemon::server::{build_router, build_state};
use tower::ServiceExt;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn settings(backend: &str) -> Settings {
    let mut settings = Settings::default();
    settings.backend.base_url = backend.to_string();
    settings
}

fn app(settings: &Settings) -> axum::Router {
    build_router(build_state(settings).unwrap(), settings).unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health() {
    let response = app(&Settings::default())
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "healthy");
}

#[tokio::test]
async fn test_docs_are_served() {
    let response = app(&Settings::default())
        .oneshot(Request::builder().uri("/docs").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_mock_login() {
    let response = app(&Settings::default())
        .oneshot(post(
            "/api/login",
            json!({ "username": "admin", "password": "password" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({ "success": true, "message": "Login successful" })
    );
}

#[tokio::test]
async fn test_proxy_relays_to_configured_backend() {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/select-tenant"))
        .and(body_json(json!({ "username": "admin", "tenantId": 3 })))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "success": false,
            "message": "Tenant not available"
        })))
        .expect(1)
        .mount(&backend)
        .await;

    let response = app(&settings(&backend.uri()))
        .oneshot(post(
            "/api/proxy/auth/select-tenant",
            json!({ "username": "admin", "tenantId": 3 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(json_body(response).await["message"], "Tenant not available");
}

#[tokio::test]
async fn test_backend_outage_yields_proxy_envelope() {
    let response = app(&settings("http://127.0.0.1:1"))
        .oneshot(post(
            "/api/proxy/auth/login",
            json!({ "username": "admin", "password": "password" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        json_body(response).await,
        json!({ "success": false, "message": "Internal Server Error during login proxy" })
    );
}

#[tokio::test]
async fn test_cors_allows_configured_origin() {
    let mut settings = Settings::default();
    settings.server.cors_origins = vec!["http://localhost:5173".to_string()];

    let response = app(&settings)
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/proxy/auth/login")
                .header(header::ORIGIN, "http://localhost:5173")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|value| value.to_str().ok()),
        Some("http://localhost:5173")
    );
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let response = app(&Settings::default())
        .oneshot(Request::builder().uri("/api/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
