//! Trust scoring for videos: source and content evaluators, score
//! aggregation, and a staged workflow for changing the scoring config.

pub mod admin;
pub mod config;
pub mod error;
pub mod evaluation;
pub mod metrics;
pub mod router;
pub mod service;
pub mod telemetry;

pub use admin::{ConfigChangeError, ConfigChangeManager};
pub use evaluation::{Evaluation, EvaluationEngine, Grade, ScoringConfig, VideoId, VideoMetrics};
pub use metrics::{MetricsError, MetricsProvider};
pub use router::{api_router, evaluation_router, EvaluationRequest};
pub use service::TrustScoreService;
