//! Shared helpers for API integration tests.
//!
//! Builds the full application router through the same
//! [`docgen_api::router::build_app_router`] used by the binary, so tests
//! exercise the production middleware stack (CORS, request ID, timeout,
//! tracing, panic recovery).

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use docgen_api::config::ServerConfig;
use docgen_api::engine::GenerationService;
use docgen_api::router::build_app_router;
use docgen_api::state::AppState;
use docgen_core::steps::SimulatedGenerator;

/// The shared secret used by all tests.
pub const TEST_PASSWORD: &str = "test-access-password";

/// Multipart boundary used by [`multipart_body`].
pub const BOUNDARY: &str = "test-boundary-7MA4YWxkTrZu0gW";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config(staging_dir: PathBuf, step_delay: Duration) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        access_password: TEST_PASSWORD.to_string(),
        environment: "test".to_string(),
        service_name: "docgen-backend".to_string(),
        staging_dir,
        step_delay,
    }
}

/// Build the full application router with all middleware layers.
///
/// `step_delay` controls the simulated generator: zero makes runs finish
/// almost immediately, a larger value keeps them observable mid-flight.
/// The staging root lives inside `staging_dir`, which the caller owns
/// (pass a `tempfile::TempDir` path).
pub fn build_test_app(staging_dir: PathBuf, step_delay: Duration) -> Router {
    let config = test_config(staging_dir, step_delay);
    let generator = Arc::new(SimulatedGenerator::new(step_delay));
    let engine = Arc::new(GenerationService::new(
        config.staging_dir.clone(),
        generator,
    ));

    let state = AppState {
        config: Arc::new(config.clone()),
        engine,
    };

    build_app_router(state, &config)
}

/// Issue a GET request without credentials.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("request build"),
    )
    .await
    .expect("request should complete")
}

/// Issue a GET request with the test bearer credential.
pub async fn auth_get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .uri(uri)
            .header("authorization", format!("Bearer {TEST_PASSWORD}"))
            .body(Body::empty())
            .expect("request build"),
    )
    .await
    .expect("request should complete")
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should collect")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be valid JSON")
}

/// One part of a multipart request body.
pub enum Part<'a> {
    /// A plain form field: `(name, value)`.
    Text(&'a str, &'a str),
    /// A file field: `(name, filename, content_type, bytes)`.
    File(&'a str, &'a str, &'a str, &'a [u8]),
}

/// Encode parts into a `multipart/form-data` body using [`BOUNDARY`].
pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File(name, filename, content_type, bytes) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
                body.extend_from_slice(bytes);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// POST a multipart upload to `/api/v1/generate` with the test credential.
pub async fn post_generate(app: Router, parts: &[Part<'_>]) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri("/api/v1/generate")
            .header("authorization", format!("Bearer {TEST_PASSWORD}"))
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(multipart_body(parts)))
            .expect("request build"),
    )
    .await
    .expect("request should complete")
}

/// A minimal but magic-byte-valid PDF payload.
pub fn pdf_bytes() -> &'static [u8] {
    b"%PDF-1.4\n1 0 obj\n<< /Type /Catalog >>\nendobj\ntrailer\n%%EOF\n"
}

/// Upload one valid PDF with the given description; assert nothing.
pub async fn upload_single_pdf(app: Router, description: &str) -> Response<Body> {
    post_generate(
        app,
        &[
            Part::Text("description", description),
            Part::File("files", "report.pdf", "application/pdf", pdf_bytes()),
        ],
    )
    .await
}

/// Poll the status endpoint until the request reaches a terminal state.
///
/// Panics if no terminal state is reached within ~2 seconds; only use with
/// a zero step delay.
pub async fn wait_for_terminal(app: &Router, request_id: &str) -> serde_json::Value {
    for _ in 0..200 {
        let response = auth_get(app.clone(), &format!("/api/v1/generate/{request_id}/status")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        if json["status"] == "completed" || json["status"] == "failed" {
            return json;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("request {request_id} never reached a terminal state");
}
