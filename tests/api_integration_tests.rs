//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycle for each endpoint.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::time::Duration;
use sync_cache::{api::create_router, AppState, SyncCache};
use tower::ServiceExt;

// == Helper Functions ==

fn create_test_app() -> Router {
    create_app_with_persistence(None)
}

fn create_app_with_persistence(persist_file: Option<PathBuf>) -> Router {
    let cache = SyncCache::new(Duration::ZERO, Duration::ZERO, persist_file);
    create_router(AppState::new(cache))
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// == SET Endpoint Tests ==

#[tokio::test]
async fn test_set_endpoint_success() {
    let app = create_test_app();

    let response = app
        .oneshot(json_request(
            "PUT",
            "/set",
            json!({"key": "test_key", "value": "test_value"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert!(json["message"].as_str().unwrap().contains("test_key"));
}

#[tokio::test]
async fn test_set_endpoint_existing_key_conflicts() {
    let app = create_test_app();
    let body = json!({"key": "dup", "value": 1});

    let first = app
        .clone()
        .oneshot(json_request("PUT", "/set", body.clone()))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second = app
        .clone()
        .oneshot(json_request("PUT", "/set", json!({"key": "dup", "value": 2})))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);

    // The original value is kept
    let get_response = app.oneshot(empty_request("GET", "/get/dup")).await.unwrap();
    let json = body_to_json(get_response.into_body()).await;
    assert_eq!(json["value"], 1);
}

// == GET Endpoint Tests ==

#[tokio::test]
async fn test_get_endpoint_returns_typed_value() {
    let app = create_test_app();

    app.clone()
        .oneshot(json_request(
            "PUT",
            "/set",
            json!({"key": "doc", "value": {"n": 1.5, "ok": true}}),
        ))
        .await
        .unwrap();

    let response = app.oneshot(empty_request("GET", "/get/doc")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["key"], "doc");
    assert_eq!(json["value"], json!({"n": 1.5, "ok": true}));
}

#[tokio::test]
async fn test_get_endpoint_not_found() {
    let app = create_test_app();

    let response = app
        .oneshot(empty_request("GET", "/get/nonexistent_key"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_to_json(response.into_body()).await;
    assert!(json.get("error").is_some());
}

// == UPDATE Endpoint Tests ==

#[tokio::test]
async fn test_update_endpoint() {
    let app = create_test_app();

    let missing = app
        .clone()
        .oneshot(json_request("PUT", "/update", json!({"key": "k", "value": 2})))
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    app.clone()
        .oneshot(json_request("PUT", "/set", json!({"key": "k", "value": 1})))
        .await
        .unwrap();
    let updated = app
        .clone()
        .oneshot(json_request("PUT", "/update", json!({"key": "k", "value": 2})))
        .await
        .unwrap();
    assert_eq!(updated.status(), StatusCode::OK);

    let response = app.oneshot(empty_request("GET", "/get/k")).await.unwrap();
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["value"], 2);
}

// == DELETE Endpoint Tests ==

#[tokio::test]
async fn test_delete_endpoint_success() {
    let app = create_test_app();

    let set_response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/set",
            json!({"key": "delete_key", "value": "delete_value"}),
        ))
        .await
        .unwrap();
    assert_eq!(set_response.status(), StatusCode::OK);

    let del_response = app
        .clone()
        .oneshot(empty_request("DELETE", "/del/delete_key"))
        .await
        .unwrap();
    assert_eq!(del_response.status(), StatusCode::OK);

    let get_response = app
        .oneshot(empty_request("GET", "/get/delete_key"))
        .await
        .unwrap();
    assert_eq!(get_response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_endpoint_missing_key_succeeds() {
    let app = create_test_app();

    let response = app
        .oneshot(empty_request("DELETE", "/del/nonexistent_key"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

// == KEYS and STATS Endpoint Tests ==

#[tokio::test]
async fn test_keys_and_stats_endpoints() {
    let app = create_test_app();

    for key in ["gamma", "alpha", "beta"] {
        app.clone()
            .oneshot(json_request("PUT", "/set", json!({"key": key, "value": null})))
            .await
            .unwrap();
    }

    let response = app.clone().oneshot(empty_request("GET", "/keys")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["keys"], json!(["alpha", "beta", "gamma"]));

    let response = app.oneshot(empty_request("GET", "/stats")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["total_entries"].as_u64().unwrap(), 3);
    assert!(json["last_change"].is_string());
}

// == SAVE Endpoint Tests ==

#[tokio::test]
async fn test_save_endpoint_writes_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.db");
    let app = create_app_with_persistence(Some(path.clone()));

    app.clone()
        .oneshot(json_request("PUT", "/set", json!({"key": "k", "value": "v"})))
        .await
        .unwrap();

    let response = app.oneshot(empty_request("POST", "/save")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(path.exists());

    let restored: SyncCache = SyncCache::new(Duration::ZERO, Duration::ZERO, None);
    restored.load(&path).unwrap();
    assert_eq!(restored.get("k").unwrap(), json!("v"));
}

// == HEALTH Endpoint Tests ==

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app();

    let response = app.oneshot(empty_request("GET", "/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"].as_str().unwrap(), "healthy");
    assert!(json.get("timestamp").is_some());
}

// == Error Response Tests ==

#[tokio::test]
async fn test_invalid_json_request() {
    let app = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/set")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"invalid json"#))
                .unwrap(),
        )
        .await
        .unwrap();

    // Axum returns 400 or 422 for JSON parsing errors
    assert!(
        response.status() == StatusCode::BAD_REQUEST
            || response.status() == StatusCode::UNPROCESSABLE_ENTITY
    );
}

#[tokio::test]
async fn test_empty_key_request() {
    let app = create_test_app();

    let response = app
        .oneshot(json_request("PUT", "/set", json!({"key": "", "value": "test"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert!(json.get("error").is_some());
}

// == TTL Expiration via API Tests ==

#[tokio::test]
async fn test_ttl_expiration_via_api() {
    let app = create_test_app();

    let set_response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/set",
            json!({"key": "ttl_test", "value": "expires_soon", "ttl": 1}),
        ))
        .await
        .unwrap();
    assert_eq!(set_response.status(), StatusCode::OK);

    let get_response = app
        .clone()
        .oneshot(empty_request("GET", "/get/ttl_test"))
        .await
        .unwrap();
    assert_eq!(get_response.status(), StatusCode::OK);

    // Wait for TTL to expire
    tokio::time::sleep(Duration::from_millis(1100)).await;

    let get_response = app
        .oneshot(empty_request("GET", "/get/ttl_test"))
        .await
        .unwrap();

    assert_eq!(get_response.status(), StatusCode::NOT_FOUND);
}
