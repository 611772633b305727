use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::admin::{ConfigChangeManager, ConfigStore};
use crate::evaluation::{Evaluation, EvaluationEngine, VideoId, VideoMetrics};
use crate::metrics::{MetricsError, MetricsProvider};

/// Service composing the config change manager with a metrics provider.
///
/// Every evaluation reads the active config at call time; nothing is pinned
/// to an older version.
pub struct TrustScoreService<S: ?Sized, P: ?Sized> {
    manager: Arc<ConfigChangeManager<S>>,
    provider: Arc<P>,
}

impl<S, P> TrustScoreService<S, P>
where
    S: ConfigStore + ?Sized,
    P: MetricsProvider + ?Sized,
{
    pub fn new(manager: Arc<ConfigChangeManager<S>>, provider: Arc<P>) -> Self {
        Self { manager, provider }
    }

    pub fn manager(&self) -> &Arc<ConfigChangeManager<S>> {
        &self.manager
    }

    /// Fetch metrics once and evaluate them. Fetch failures are returned as-is.
    pub fn evaluate_video(&self, video_id: &VideoId) -> Result<Evaluation, MetricsError> {
        let metrics = match self.provider.fetch(video_id) {
            Ok(metrics) => metrics,
            Err(err) => {
                warn!(video_id = %video_id, error = %err, "metrics fetch failed");
                return Err(err);
            }
        };

        let evaluation = self.evaluate_metrics(&metrics);
        debug!(video_id = %video_id, grade = %evaluation.grade, "evaluated video");
        Ok(evaluation)
    }

    pub fn evaluate_metrics(&self, metrics: &VideoMetrics) -> Evaluation {
        self.evaluate_metrics_at(metrics, Utc::now())
    }

    /// Evaluate against the active config as of `now`.
    pub fn evaluate_metrics_at(&self, metrics: &VideoMetrics, now: DateTime<Utc>) -> Evaluation {
        let (version, config) = self.manager.active_snapshot();
        let mut evaluation = EvaluationEngine::new(config).evaluate(metrics, now);
        evaluation.config_version = Some(version);

        debug!(
            config_version = %version,
            source_score = evaluation.source_score,
            content_score = evaluation.content_score,
            total_score = evaluation.total_score,
            grade = %evaluation.grade,
            "computed trust score"
        );
        evaluation
    }
}
