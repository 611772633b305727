use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::admin::{admin_router, ConfigStore};
use crate::evaluation::{VideoId, VideoMetrics};
use crate::metrics::{MetricsError, MetricsProvider};
use crate::service::TrustScoreService;

type SharedService<S, P> = Arc<TrustScoreService<S, P>>;

/// Evaluation request naming either a video to fetch or metrics fetched by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EvaluationRequest {
    Video { video_id: VideoId },
    Metrics { metrics: VideoMetrics },
}

/// Router builder exposing the evaluation endpoints.
pub fn evaluation_router<S, P>(service: SharedService<S, P>) -> Router
where
    S: ConfigStore + ?Sized + 'static,
    P: MetricsProvider + ?Sized + 'static,
{
    Router::new()
        .route("/api/v1/evaluations", post(evaluate_handler::<S, P>))
        .route(
            "/api/v1/evaluations/:video_id",
            get(video_evaluation_handler::<S, P>),
        )
        .with_state(service)
}

/// Evaluation and admin routes mounted together.
pub fn api_router<S, P>(service: SharedService<S, P>) -> Router
where
    S: ConfigStore + ?Sized + 'static,
    P: MetricsProvider + ?Sized + 'static,
{
    let admin = admin_router(service.manager().clone());
    evaluation_router(service).merge(admin)
}

pub(crate) async fn evaluate_handler<S, P>(
    State(service): State<SharedService<S, P>>,
    Json(request): Json<EvaluationRequest>,
) -> Response
where
    S: ConfigStore + ?Sized + 'static,
    P: MetricsProvider + ?Sized + 'static,
{
    match request {
        EvaluationRequest::Metrics { metrics } => {
            let evaluation = service.evaluate_metrics(&metrics);
            (StatusCode::OK, Json(evaluation)).into_response()
        }
        EvaluationRequest::Video { video_id } => match service.evaluate_video(&video_id) {
            Ok(evaluation) => (StatusCode::OK, Json(evaluation)).into_response(),
            Err(err) => metrics_error_response(err),
        },
    }
}

pub(crate) async fn video_evaluation_handler<S, P>(
    State(service): State<SharedService<S, P>>,
    Path(video_id): Path<String>,
) -> Response
where
    S: ConfigStore + ?Sized + 'static,
    P: MetricsProvider + ?Sized + 'static,
{
    match service.evaluate_video(&VideoId(video_id)) {
        Ok(evaluation) => (StatusCode::OK, Json(evaluation)).into_response(),
        Err(err) => metrics_error_response(err),
    }
}

fn metrics_error_response(err: MetricsError) -> Response {
    let status = match &err {
        MetricsError::NotFound(_) => StatusCode::NOT_FOUND,
        MetricsError::Incomplete { .. } | MetricsError::Unavailable(_) => StatusCode::BAD_GATEWAY,
    };
    let payload = json!({
        "error": err.to_string(),
    });
    (status, Json(payload)).into_response()
}
