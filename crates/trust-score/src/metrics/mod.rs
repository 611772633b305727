//! Boundary to the collaborator that supplies per-video metrics.

mod catalog;
mod parser;

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::evaluation::{VideoId, VideoMetrics};

pub use catalog::{CatalogError, CsvMetricsCatalog};

/// Single-attempt fetch of the metrics for one video.
pub trait MetricsProvider: Send + Sync {
    fn fetch(&self, video_id: &VideoId) -> Result<VideoMetrics, MetricsError>;
}

/// Upstream failure while obtaining metrics. Never replaced by default metrics.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MetricsError {
    #[error("no metrics found for video {0}")]
    NotFound(VideoId),
    #[error("metrics for video {video_id} are missing `{field}`")]
    Incomplete {
        video_id: VideoId,
        field: &'static str,
    },
    #[error("metrics provider unavailable: {0}")]
    Unavailable(String),
}

impl MetricsError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, MetricsError::NotFound(_))
    }
}

/// Provider backed by a map populated in process, for tests and demos.
#[derive(Debug, Default)]
pub struct InMemoryMetricsProvider {
    videos: RwLock<HashMap<VideoId, VideoMetrics>>,
}

impl InMemoryMetricsProvider {
    pub fn insert(&self, video_id: VideoId, metrics: VideoMetrics) {
        let mut guard = self.videos.write().unwrap_or_else(PoisonError::into_inner);
        guard.insert(video_id, metrics);
    }
}

impl FromIterator<(VideoId, VideoMetrics)> for InMemoryMetricsProvider {
    fn from_iter<I: IntoIterator<Item = (VideoId, VideoMetrics)>>(iter: I) -> Self {
        Self {
            videos: RwLock::new(iter.into_iter().collect()),
        }
    }
}

impl MetricsProvider for InMemoryMetricsProvider {
    fn fetch(&self, video_id: &VideoId) -> Result<VideoMetrics, MetricsError> {
        let guard = self
            .videos
            .read()
            .map_err(|_| MetricsError::Unavailable("metrics cache lock poisoned".to_string()))?;
        guard
            .get(video_id)
            .cloned()
            .ok_or_else(|| MetricsError::NotFound(video_id.clone()))
    }
}
