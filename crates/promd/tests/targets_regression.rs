//! Target API regression tests.
//!
//! Drives the full router the way operator tooling does: basic auth, JSON
//! bodies over `/targets`, and the generated discovery files checked on
//! disk after each mutation.

use std::path::Path;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use base64::Engine;
use serde_json::{Value, json};
use tower::ServiceExt;

use promgrid_api::{AuthConfig, build_router};
use promgrid_discovery::{DiscoveryWriter, TargetRegistry};
use promgrid_state::TargetStore;

fn test_router(dir: &Path) -> axum::Router {
    let registry = TargetRegistry::new(
        TargetStore::open_in_memory().unwrap(),
        DiscoveryWriter::new(dir),
    );
    build_router(registry, AuthConfig::new("prometheus", "secret"))
}

fn basic_auth(user: &str, pass: &str) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(format!("{user}:{pass}"));
    format!("Basic {encoded}")
}

fn authed(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, basic_auth("prometheus", "secret"));
    match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&value).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn upsert_body(target: &str, host: &str) -> Value {
    json!({
        "exporter": "node",
        "target": target,
        "labels": { "zone": "eu-west", "inventory_hostname": host }
    })
}

fn delete_body(target: &str, host: &str) -> Value {
    json!({
        "exporter": "node",
        "target": target,
        "labels": { "zone": "eu-west", "inventory_hostname": host }
    })
}

fn read_file(dir: &Path, exporter: &str) -> Value {
    let content = std::fs::read_to_string(dir.join(format!("{exporter}.json"))).unwrap();
    serde_json::from_str(&content).unwrap()
}

#[tokio::test]
async fn unauthenticated_requests_are_forbidden() {
    let dir = tempfile::tempdir().unwrap();
    let router = test_router(dir.path());

    let req = Request::builder()
        .uri("/targets")
        .body(Body::empty())
        .unwrap();
    let resp = router.oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body = body_json(resp).await;
    assert_eq!(body["message"], "Unauthorized access");
}

#[tokio::test]
async fn wrong_password_is_forbidden() {
    let dir = tempfile::tempdir().unwrap();
    let router = test_router(dir.path());

    let req = Request::builder()
        .uri("/targets")
        .header(header::AUTHORIZATION, basic_auth("prometheus", "nope"))
        .body(Body::empty())
        .unwrap();
    let resp = router.oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn healthz_needs_no_auth() {
    let dir = tempfile::tempdir().unwrap();
    let router = test_router(dir.path());

    let req = Request::builder()
        .uri("/healthz")
        .body(Body::empty())
        .unwrap();
    let resp = router.oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn post_creates_target_and_discovery_file() {
    let dir = tempfile::tempdir().unwrap();
    let router = test_router(dir.path());

    let resp = router
        .oneshot(authed(
            "POST",
            "/targets",
            Some(upsert_body("10.0.0.1:9100", "web-01")),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = body_json(resp).await;
    assert_eq!(body["status"], "created");
    assert_eq!(body["data"]["target"], "10.0.0.1:9100");
    // The scrape-path default lands in the stored record.
    assert_eq!(body["data"]["labels"]["__metrics_path__"], "/metrics");

    let file = read_file(dir.path(), "node");
    assert_eq!(file.as_array().unwrap().len(), 1);
    assert_eq!(file[0]["targets"], json!(["10.0.0.1:9100"]));
    assert_eq!(file[0]["labels"]["inventory_hostname"], "web-01");
}

#[tokio::test]
async fn get_serves_both_read_shapes() {
    let dir = tempfile::tempdir().unwrap();
    let router = test_router(dir.path());

    router
        .clone()
        .oneshot(authed(
            "POST",
            "/targets",
            Some(upsert_body("10.0.0.1:9100", "web-01")),
        ))
        .await
        .unwrap();

    // Unfiltered: minimal projection.
    let resp = router
        .clone()
        .oneshot(authed("GET", "/targets", None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    let targets = body["targets"].as_array().unwrap();
    assert_eq!(targets.len(), 1);
    assert_eq!(targets[0]["exporter"], "node");
    assert_eq!(targets[0]["target"], "10.0.0.1:9100");

    // Filtered: discovery-file group shape.
    let resp = router
        .clone()
        .oneshot(authed("GET", "/targets?exporter=node&zone=eu-west", None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    let groups = body["targets"].as_array().unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0]["targets"], json!(["10.0.0.1:9100"]));

    // Filter that matches nothing.
    let resp = router
        .oneshot(authed("GET", "/targets?exporter=node&zone=mars", None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await, json!({ "targets": [] }));
}

#[tokio::test]
async fn post_validation_failure_names_required_fields() {
    let dir = tempfile::tempdir().unwrap();
    let router = test_router(dir.path());

    let body = json!({ "exporter": "node", "labels": {} });
    let resp = router
        .oneshot(authed("POST", "/targets", Some(body)))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("required:"));
    assert!(message.contains("labels.inventory_hostname"));
    assert!(!dir.path().join("node.json").exists());
}

#[tokio::test]
async fn delete_updates_discovery_file() {
    let dir = tempfile::tempdir().unwrap();
    let router = test_router(dir.path());

    for (target, host) in [("10.0.0.1:9100", "web-01"), ("10.0.0.2:9100", "web-02")] {
        router
            .clone()
            .oneshot(authed("POST", "/targets", Some(upsert_body(target, host))))
            .await
            .unwrap();
    }
    assert_eq!(read_file(dir.path(), "node").as_array().unwrap().len(), 2);

    let resp = router
        .clone()
        .oneshot(authed(
            "DELETE",
            "/targets",
            Some(delete_body("10.0.0.1:9100", "web-01")),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let file = read_file(dir.path(), "node");
    assert_eq!(file.as_array().unwrap().len(), 1);
    assert_eq!(file[0]["targets"], json!(["10.0.0.2:9100"]));

    // Deleting the same identity again is idempotent and leaves the file alone.
    let resp = router
        .oneshot(authed(
            "DELETE",
            "/targets",
            Some(delete_body("10.0.0.1:9100", "web-01")),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert_eq!(read_file(dir.path(), "node").as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn deleting_last_target_leaves_empty_file() {
    let dir = tempfile::tempdir().unwrap();
    let router = test_router(dir.path());

    router
        .clone()
        .oneshot(authed(
            "POST",
            "/targets",
            Some(upsert_body("10.0.0.1:9100", "web-01")),
        ))
        .await
        .unwrap();

    let resp = router
        .oneshot(authed(
            "DELETE",
            "/targets",
            Some(delete_body("10.0.0.1:9100", "web-01")),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    assert_eq!(read_file(dir.path(), "node"), json!([]));
}

#[tokio::test]
async fn repeated_post_collapses_to_one_record() {
    let dir = tempfile::tempdir().unwrap();
    let router = test_router(dir.path());

    let mut body = upsert_body("10.0.0.1:9100", "web-01");
    router
        .clone()
        .oneshot(authed("POST", "/targets", Some(body.clone())))
        .await
        .unwrap();

    body["labels"]["team"] = json!("platform");
    let resp = router
        .clone()
        .oneshot(authed("POST", "/targets", Some(body)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = router
        .oneshot(authed("GET", "/targets", None))
        .await
        .unwrap();
    let listing = body_json(resp).await;
    let targets = listing["targets"].as_array().unwrap();
    assert_eq!(targets.len(), 1);
    assert_eq!(targets[0]["labels"]["team"], "platform");

    let file = read_file(dir.path(), "node");
    assert_eq!(file.as_array().unwrap().len(), 1);
    assert_eq!(file[0]["labels"]["team"], "platform");
}
