use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for videos known to the metrics provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoId(pub String);

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Channel and content signals for a single video, as supplied by the metrics provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoMetrics {
    pub subscriber_count: u64,
    pub published_at: DateTime<Utc>,
    pub view_count: u64,
    pub like_count: u64,
    pub comment_count: u64,
    pub title: String,
    #[serde(default)]
    pub description: String,
}

impl VideoMetrics {
    /// Whole days between publication and `now`. Future timestamps count as day zero.
    pub fn days_since_published(&self, now: DateTime<Utc>) -> u64 {
        let elapsed = now.signed_duration_since(self.published_at).num_days();
        u64::try_from(elapsed).unwrap_or(0)
    }

    /// Likes and comments per view; both are zero when the video has no views.
    pub fn engagement_ratios(&self) -> (f64, f64) {
        if self.view_count == 0 {
            return (0.0, 0.0);
        }

        let views = self.view_count as f64;
        (
            self.like_count as f64 / views,
            self.comment_count as f64 / views,
        )
    }
}
