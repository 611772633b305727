mod config;
mod content;
pub mod domain;
mod policy;
mod source;

pub use config::{
    ContentWeights, DescriptionCriteria, EngagementWeights, KeywordSets, ScoringConfig,
    SentimentThresholds, SourceWeights, Thresholds, TitleCriteria, TrustWeights, ValidationError,
    ValidationIssue, WEIGHT_TOLERANCE,
};
pub use content::{
    evaluate_content, ContentBreakdown, DescriptionFactor, SentimentFactor, TitleFactor,
};
pub use domain::{VideoId, VideoMetrics};
pub use policy::{aggregate, AggregateScore, Grade};
pub use source::{
    evaluate_source, ActivityFactor, EngagementFactor, SourceBreakdown, SubscriberFactor,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::admin::HistoryId;

/// Stateless evaluator bound to one configuration snapshot.
pub struct EvaluationEngine {
    config: ScoringConfig,
}

impl EvaluationEngine {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn evaluate(&self, metrics: &VideoMetrics, now: DateTime<Utc>) -> Evaluation {
        let source = evaluate_source(metrics, &self.config, now);
        let content = evaluate_content(metrics, &self.config);
        let AggregateScore { total_score, grade } =
            aggregate(source.score, content.score, &self.config);

        Evaluation {
            source_score: source.score,
            content_score: content.score,
            total_score,
            grade,
            grade_description: grade.description().to_string(),
            breakdown: EvaluationBreakdown { source, content },
            config_version: None,
            evaluated_at: now,
        }
    }
}

/// Per-factor raw values and normalized scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationBreakdown {
    pub source: SourceBreakdown,
    pub content: ContentBreakdown,
}

/// Evaluation output with enough detail to render without recomputation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub source_score: f64,
    pub content_score: f64,
    pub total_score: f64,
    pub grade: Grade,
    pub grade_description: String,
    pub breakdown: EvaluationBreakdown,
    /// History entry of the config snapshot the scores were computed against.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_version: Option<HistoryId>,
    pub evaluated_at: DateTime<Utc>,
}

/// Clamp into `[0, 1]`; NaN collapses to zero.
pub(crate) fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
