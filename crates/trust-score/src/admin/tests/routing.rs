use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use super::common::*;
use crate::admin::manager::ConfigChangeManager;
use crate::admin::router::admin_router;
use crate::admin::store::InMemoryConfigStore;
use crate::evaluation::ScoringConfig;

fn build_router() -> (Router, Arc<ConfigChangeManager<InMemoryConfigStore>>) {
    let (manager, _) = build_manager();
    let manager = Arc::new(manager);
    (admin_router(manager.clone()), manager)
}

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn empty_request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

fn proposal(config: ScoringConfig) -> Value {
    json!({
        "submitted_by": "mina",
        "config": config,
    })
}

#[tokio::test]
async fn active_config_reports_version() {
    let (router, _) = build_router();

    let response = router
        .oneshot(empty_request(Method::GET, "/api/admin/config"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["version"], 1);
    assert_eq!(payload["config"]["weights"]["source"], 0.6);
}

#[tokio::test]
async fn submit_then_approve_activates_config() {
    let (router, manager) = build_router();

    let response = router
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/admin/config/pending",
            proposal(source_heavy_config()),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let change = read_json_body(response).await;
    assert_eq!(change["status"], "pending");
    let change_id = change["id"].as_u64().expect("numeric id");

    let response = router
        .clone()
        .oneshot(empty_request(Method::GET, "/api/admin/pending"))
        .await
        .expect("response");
    let pending = read_json_body(response).await;
    assert_eq!(pending.as_array().map(Vec::len), Some(1));

    let response = router
        .oneshot(json_request(
            Method::POST,
            &format!("/api/admin/config/approve/{change_id}"),
            json!({ "reviewed_by": "lead" }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let view = read_json_body(response).await;
    assert_eq!(view["version"], 2);
    assert_eq!(view["config"]["weights"]["source"], 0.7);

    assert_eq!(manager.get_active(), source_heavy_config());
    let history = manager.list_history();
    assert_eq!(history.last().map(|entry| entry.changed_by.as_str()), Some("lead"));
}

#[tokio::test]
async fn invalid_proposal_returns_issues() {
    let (router, manager) = build_router();

    let response = router
        .oneshot(json_request(
            Method::POST,
            "/api/admin/config/pending",
            proposal(unbalanced_config()),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert_eq!(payload["issues"][0]["field"], "weights");
    assert!(manager.list_changes().is_empty());
}

#[tokio::test]
async fn approving_unknown_change_returns_not_found() {
    let (router, _) = build_router();

    let response = router
        .oneshot(empty_request(Method::POST, "/api/admin/config/approve/41"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let payload = read_json_body(response).await;
    assert!(payload["error"]
        .as_str()
        .is_some_and(|message| message.contains("41")));
}

#[tokio::test]
async fn reject_defaults_reviewer_and_keeps_audit_trail() {
    let (router, manager) = build_router();
    let change = manager
        .submit_pending(strict_subscriber_config(), "mina")
        .expect("valid proposal");

    let response = router
        .clone()
        .oneshot(empty_request(
            Method::POST,
            &format!("/api/admin/config/reject/{}", change.id),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let rejected = read_json_body(response).await;
    assert_eq!(rejected["status"], "rejected");
    assert_eq!(rejected["reviewed_by"], "admin");

    let response = router
        .oneshot(empty_request(Method::GET, "/api/admin/changes"))
        .await
        .expect("response");
    let changes = read_json_body(response).await;
    assert_eq!(changes.as_array().map(Vec::len), Some(1));
    assert!(manager.list_pending().is_empty());
}

#[tokio::test]
async fn rollback_appends_history_entry() {
    let (router, manager) = build_router();
    let change = manager
        .submit_pending(source_heavy_config(), "mina")
        .expect("valid proposal");
    manager.approve(change.id, "lead").expect("approves");

    let response = router
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/admin/config/rollback/1",
            json!({ "reviewed_by": "lead" }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let view = read_json_body(response).await;
    assert_eq!(view["version"], 3);

    let response = router
        .oneshot(empty_request(Method::GET, "/api/admin/history"))
        .await
        .expect("response");
    let history = read_json_body(response).await;
    let entries = history.as_array().expect("history array");
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[2]["kind"]["type"], "rollback");
    assert_eq!(entries[2]["kind"]["target"], 1);
    assert_eq!(manager.get_active(), ScoringConfig::default());
}

#[tokio::test]
async fn rollback_to_unknown_entry_returns_not_found() {
    let (router, manager) = build_router();

    let response = router
        .oneshot(empty_request(Method::POST, "/api/admin/config/rollback/9"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(manager.list_history().len(), 1);
}

#[tokio::test]
async fn store_failure_is_reported_without_details() {
    let store = Arc::new(FailingStore::new());
    let manager = Arc::new(
        ConfigChangeManager::bootstrap(ScoringConfig::default(), store.clone())
            .expect("bootstrap save succeeds"),
    );
    let router = admin_router(manager.clone());
    store.start_failing();

    let response = router
        .oneshot(json_request(
            Method::POST,
            "/api/admin/config/pending",
            proposal(source_heavy_config()),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let payload = read_json_body(response).await;
    assert_eq!(payload["error"], "config store unavailable");
    assert!(manager.list_changes().is_empty());
}

#[tokio::test]
async fn misspelled_reviewer_key_is_rejected_without_side_effects() {
    let (router, manager) = build_router();
    let change = manager
        .submit_pending(source_heavy_config(), "mina")
        .expect("valid proposal");

    let response = router
        .oneshot(json_request(
            Method::POST,
            &format!("/api/admin/config/approve/{}", change.id),
            json!({ "reviewer": "kim" }),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert!(payload["error"]
        .as_str()
        .is_some_and(|message| message.contains("reviewer")));
    assert_eq!(manager.list_pending().len(), 1);
    assert_eq!(manager.get_active(), ScoringConfig::default());
}

#[tokio::test]
async fn malformed_review_body_is_rejected() {
    let (router, manager) = build_router();

    let response = router
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/admin/config/rollback/1")
                .header("content-type", "application/json")
                .body(Body::from("{ reviewed_by: "))
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(manager.list_history().len(), 1);
}
