//! End-to-end tests for `HttpGateway` against a fake backend.
//!
//! Each test serves its own axum router on an ephemeral port so the
//! request bodies, status handling and payload decoding go through real HTTP.

use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use railqa_gateway::{FailureKind, Gateway, GatewayError, HttpGateway, Probe};

// =============================================================================
// Helpers
// =============================================================================

/// Serve `router` on 127.0.0.1 and return its base URL.
async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// A backend that behaves like the real one.
fn healthy_backend() -> Router {
    Router::new()
        .route(
            "/api/qa",
            post(|Json(body): Json<Value>| async move {
                let question = body["question"].as_str().unwrap_or_default().to_string();
                Json(json!({
                    "answer": format!("*Answer\nYou asked: {}", question),
                    "context": "Source (Page 42):\nComplaints go to x@y.com",
                    "sources": 3,
                }))
            }),
        )
        .route(
            "/api/bpmn",
            post(|Json(body): Json<Value>| async move {
                let description = body["description"].as_str().unwrap_or_default().to_string();
                Json(json!({
                    "mermaid_script": "graph TD\n  A[Start] --> B[End]",
                    "description": description,
                }))
            }),
        )
        .route("/api/health", get(|| async { Json(json!({"status": "healthy"})) }))
        .route(
            "/api/health/ollama",
            get(|| async {
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(json!({"status": "error", "message": "model not loaded"})),
                )
            }),
        )
        .route("/api/health/vectordb", get(|| async { "not even json" }))
}

// =============================================================================
// Question answering
// =============================================================================

#[tokio::test]
async fn test_ask_round_trip() {
    let base = serve(healthy_backend()).await;
    let gateway = HttpGateway::new(&base).unwrap();

    let answer = gateway.ask("What is the complaints email?").await.unwrap();
    assert_eq!(answer.answer, "*Answer\nYou asked: What is the complaints email?");
    assert_eq!(
        answer.context.as_deref(),
        Some("Source (Page 42):\nComplaints go to x@y.com")
    );
    assert_eq!(answer.sources, Some(3));
}

#[tokio::test]
async fn test_ask_server_error_is_status_failure() {
    let router = Router::new().route(
        "/api/qa",
        post(|| async {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "internal server error"})),
            )
        }),
    );
    let base = serve(router).await;
    let gateway = HttpGateway::new(&base).unwrap();

    let err = gateway.ask("anything").await.unwrap_err();
    assert_eq!(err, GatewayError::Status(500));
    assert_eq!(err.kind(), FailureKind::Backend);
}

#[tokio::test]
async fn test_ask_malformed_payload() {
    let router = Router::new().route(
        "/api/qa",
        post(|| async { Json(json!({"reply": "wrong field"})) }),
    );
    let base = serve(router).await;
    let gateway = HttpGateway::new(&base).unwrap();

    let err = gateway.ask("anything").await.unwrap_err();
    assert!(matches!(err, GatewayError::Malformed(_)), "got {err:?}");
    assert_eq!(err.kind(), FailureKind::Backend);
}

// =============================================================================
// Diagram generation
// =============================================================================

#[tokio::test]
async fn test_generate_round_trip() {
    let base = serve(healthy_backend()).await;
    let gateway = HttpGateway::new(&format!("{}/", base)).unwrap();

    let response = gateway.generate("Receive a train path request").await.unwrap();
    assert_eq!(response.mermaid_script, "graph TD\n  A[Start] --> B[End]");
}

#[tokio::test]
async fn test_generate_missing_route_is_404() {
    let base = serve(Router::new()).await;
    let gateway = HttpGateway::new(&base).unwrap();

    let err = gateway.generate("anything").await.unwrap_err();
    assert_eq!(err, GatewayError::Status(404));
}

// =============================================================================
// Probes
// =============================================================================

#[tokio::test]
async fn test_probes_only_inspect_status() {
    let base = serve(healthy_backend()).await;
    let gateway = HttpGateway::new(&base).unwrap();

    assert_eq!(gateway.probe(Probe::Backend).await, Ok(()));
    assert_eq!(
        gateway.probe(Probe::InferenceRuntime).await,
        Err(GatewayError::Status(503))
    );
    // Body is not JSON, but the status is 200.
    assert_eq!(gateway.probe(Probe::VectorStore).await, Ok(()));
}

#[tokio::test]
async fn test_unreachable_backend_is_transport_failure() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let gateway = HttpGateway::new(&format!("http://{}", addr)).unwrap();

    let err = gateway.probe(Probe::Backend).await.unwrap_err();
    assert_eq!(err.kind(), FailureKind::Transport);

    let err = gateway.ask("anything").await.unwrap_err();
    assert!(matches!(err, GatewayError::Transport(_)), "got {err:?}");
}
