use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;

use super::domain::{ChangeId, HistoryId};
use super::manager::{ConfigChangeError, ConfigChangeManager};
use super::store::ConfigStore;
use crate::evaluation::ScoringConfig;

/// Actor recorded when a review request does not name one.
pub const DEFAULT_REVIEWER: &str = "admin";

type SharedManager<S> = Arc<ConfigChangeManager<S>>;

/// Router builder exposing the administrative config workflow.
pub fn admin_router<S>(manager: SharedManager<S>) -> Router
where
    S: ConfigStore + ?Sized + 'static,
{
    Router::new()
        .route("/api/admin/config", get(active_config_handler::<S>))
        .route("/api/admin/config/pending", post(submit_handler::<S>))
        .route("/api/admin/pending", get(pending_handler::<S>))
        .route("/api/admin/changes", get(changes_handler::<S>))
        .route(
            "/api/admin/config/approve/:change_id",
            post(approve_handler::<S>),
        )
        .route(
            "/api/admin/config/reject/:change_id",
            post(reject_handler::<S>),
        )
        .route(
            "/api/admin/config/rollback/:history_id",
            post(rollback_handler::<S>),
        )
        .route("/api/admin/history", get(history_handler::<S>))
        .with_state(manager)
}

/// Proposed config plus the administrator submitting it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitChangeRequest {
    pub submitted_by: String,
    pub config: ScoringConfig,
}

/// Optional body for approve, reject and rollback.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReviewRequest {
    #[serde(default)]
    pub reviewed_by: Option<String>,
}

impl ReviewRequest {
    fn actor(self) -> String {
        self.reviewed_by
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| DEFAULT_REVIEWER.to_string())
    }
}

/// Active config tagged with the history entry it came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveConfigView {
    pub version: HistoryId,
    pub config: ScoringConfig,
}

pub(crate) async fn active_config_handler<S>(State(manager): State<SharedManager<S>>) -> Response
where
    S: ConfigStore + ?Sized + 'static,
{
    let (version, config) = manager.active_snapshot();
    (StatusCode::OK, Json(ActiveConfigView { version, config })).into_response()
}

pub(crate) async fn submit_handler<S>(
    State(manager): State<SharedManager<S>>,
    Json(request): Json<SubmitChangeRequest>,
) -> Response
where
    S: ConfigStore + ?Sized + 'static,
{
    let outcome = run_blocking(manager, move |manager| {
        manager.submit_pending(request.config, &request.submitted_by)
    })
    .await;
    match outcome {
        Ok(change) => (StatusCode::ACCEPTED, Json(change)).into_response(),
        Err(response) => response,
    }
}

pub(crate) async fn pending_handler<S>(State(manager): State<SharedManager<S>>) -> Response
where
    S: ConfigStore + ?Sized + 'static,
{
    (StatusCode::OK, Json(manager.list_pending())).into_response()
}

pub(crate) async fn changes_handler<S>(State(manager): State<SharedManager<S>>) -> Response
where
    S: ConfigStore + ?Sized + 'static,
{
    (StatusCode::OK, Json(manager.list_changes())).into_response()
}

pub(crate) async fn history_handler<S>(State(manager): State<SharedManager<S>>) -> Response
where
    S: ConfigStore + ?Sized + 'static,
{
    (StatusCode::OK, Json(manager.list_history())).into_response()
}

pub(crate) async fn approve_handler<S>(
    State(manager): State<SharedManager<S>>,
    Path(change_id): Path<u64>,
    body: Bytes,
) -> Response
where
    S: ConfigStore + ?Sized + 'static,
{
    let actor = match review_actor(&body) {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    let outcome = run_blocking(manager, move |manager| {
        manager.approve_recorded(ChangeId(change_id), &actor)
    })
    .await;
    match outcome {
        Ok(entry) => {
            let view = ActiveConfigView {
                version: entry.id,
                config: entry.config,
            };
            (StatusCode::OK, Json(view)).into_response()
        }
        Err(response) => response,
    }
}

pub(crate) async fn reject_handler<S>(
    State(manager): State<SharedManager<S>>,
    Path(change_id): Path<u64>,
    body: Bytes,
) -> Response
where
    S: ConfigStore + ?Sized + 'static,
{
    let actor = match review_actor(&body) {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    let outcome = run_blocking(manager, move |manager| {
        manager.reject(ChangeId(change_id), &actor)
    })
    .await;
    match outcome {
        Ok(change) => (StatusCode::OK, Json(change)).into_response(),
        Err(response) => response,
    }
}

pub(crate) async fn rollback_handler<S>(
    State(manager): State<SharedManager<S>>,
    Path(history_id): Path<u64>,
    body: Bytes,
) -> Response
where
    S: ConfigStore + ?Sized + 'static,
{
    let actor = match review_actor(&body) {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    let outcome = run_blocking(manager, move |manager| {
        manager.rollback_recorded(HistoryId(history_id), &actor)
    })
    .await;
    match outcome {
        Ok(entry) => {
            let view = ActiveConfigView {
                version: entry.id,
                config: entry.config,
            };
            (StatusCode::OK, Json(view)).into_response()
        }
        Err(response) => response,
    }
}

/// Empty body means the default reviewer; anything else must be a valid `ReviewRequest`.
fn review_actor(body: &[u8]) -> Result<String, Response> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(ReviewRequest::default().actor());
    }

    serde_json::from_slice::<ReviewRequest>(body)
        .map(ReviewRequest::actor)
        .map_err(|err| {
            let payload = json!({
                "error": format!("invalid review request: {err}"),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
        })
}

/// Store writes are blocking file I/O; keep them off the async workers.
async fn run_blocking<S, T, F>(manager: SharedManager<S>, operation: F) -> Result<T, Response>
where
    S: ConfigStore + ?Sized + 'static,
    T: Send + 'static,
    F: FnOnce(&ConfigChangeManager<S>) -> Result<T, ConfigChangeError> + Send + 'static,
{
    match tokio::task::spawn_blocking(move || operation(&manager)).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(error_response(err)),
        Err(err) => {
            error!(error = %err, "config change task did not complete");
            let payload = json!({
                "error": "config change task did not complete",
            });
            Err((StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response())
        }
    }
}

fn error_response(err: ConfigChangeError) -> Response {
    let status = match &err {
        ConfigChangeError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ConfigChangeError::ChangeNotFound(_) | ConfigChangeError::HistoryNotFound(_) => {
            StatusCode::NOT_FOUND
        }
        ConfigChangeError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let payload = match &err {
        ConfigChangeError::Validation(validation) => json!({
            "error": err.to_string(),
            "issues": validation.issues,
        }),
        ConfigChangeError::Store(_) => json!({
            "error": "config store unavailable",
        }),
        _ => json!({
            "error": err.to_string(),
        }),
    };

    (status, Json(payload)).into_response()
}
