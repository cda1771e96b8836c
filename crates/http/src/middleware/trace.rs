//! Request tracing middleware

use axum::{extract::Request, middleware::Next, response::Response};
use tracing::Instrument;

/// Wraps each request in an `http_request` span and records the status
pub async fn trace_middleware(req: Request, next: Next) -> Response {
    let span = tracing::info_span!(
        "http_request",
        http.method = %req.method(),
        http.path = %req.uri().path(),
        http.status_code = tracing::field::Empty,
    );

    let response = next
        .run(req)
        .instrument(span.clone())
        .await;

    span.record("http.status_code", response.status().as_u16());
    tracing::debug!(parent: &span, status = response.status().as_u16(), "Request completed");

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, http::StatusCode, routing::get};
    use tower::ServiceExt;

    #[tokio::test]
    async fn passes_response_through() {
        let app = Router::new()
            .route("/teapot", get(|| async { StatusCode::IM_A_TEAPOT }))
            .layer(axum::middleware::from_fn(trace_middleware));

        let response = app
            .oneshot(Request::builder().uri("/teapot").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
    }
}
