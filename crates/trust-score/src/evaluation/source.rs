use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::clamp_unit;
use super::config::ScoringConfig;
use super::domain::VideoMetrics;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubscriberFactor {
    pub count: u64,
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActivityFactor {
    pub days: u64,
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngagementFactor {
    pub like_ratio: f64,
    pub comment_ratio: f64,
    pub score: f64,
}

/// Channel-side signals with their normalized scores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SourceBreakdown {
    pub subscribers: SubscriberFactor,
    pub activity: ActivityFactor,
    pub engagement: EngagementFactor,
    pub score: f64,
}

/// Score the publishing channel. Total: out-of-range inputs are clamped.
pub fn evaluate_source(
    metrics: &VideoMetrics,
    config: &ScoringConfig,
    now: DateTime<Utc>,
) -> SourceBreakdown {
    let subscribers = SubscriberFactor {
        count: metrics.subscriber_count,
        score: config
            .subscriber_thresholds
            .band_score(metrics.subscriber_count),
    };

    let days = metrics.days_since_published(now);
    let activity = ActivityFactor {
        days,
        score: config.activity_thresholds.band_score(days),
    };

    let engagement = engagement_factor(metrics, config);

    let weights = config.source_weights;
    let score = clamp_unit(
        subscribers.score * weights.subscribers
            + activity.score * weights.activity
            + engagement.score * weights.engagement,
    );

    SourceBreakdown {
        subscribers,
        activity,
        engagement,
        score,
    }
}

fn engagement_factor(metrics: &VideoMetrics, config: &ScoringConfig) -> EngagementFactor {
    let (like_ratio, comment_ratio) = metrics.engagement_ratios();
    let score = clamp_unit(
        like_ratio * config.engagement.like_ratio + comment_ratio * config.engagement.comment_ratio,
    );

    EngagementFactor {
        like_ratio,
        comment_ratio,
        score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    fn metrics(subscribers: u64, age_days: i64) -> VideoMetrics {
        VideoMetrics {
            subscriber_count: subscribers,
            published_at: now() - Duration::days(age_days),
            view_count: 10_000,
            like_count: 500,
            comment_count: 100,
            title: "데이터로 보는 기후 변화".to_string(),
            description: String::new(),
        }
    }

    #[test]
    fn medium_subscriber_band_scores_point_eight() {
        let breakdown = evaluate_source(&metrics(500_000, 400), &ScoringConfig::default(), now());
        assert_eq!(breakdown.subscribers.score, 0.8);
        assert_eq!(breakdown.activity.days, 400);
        assert_eq!(breakdown.activity.score, 1.0);
    }

    #[test]
    fn activity_days_are_floored() {
        let mut sample = metrics(0, 0);
        sample.published_at = now() - Duration::days(179) - Duration::hours(23);
        let breakdown = evaluate_source(&sample, &ScoringConfig::default(), now());
        assert_eq!(breakdown.activity.days, 179);
        assert_eq!(breakdown.activity.score, 0.6);
    }

    #[test]
    fn future_publication_counts_as_day_zero() {
        let sample = metrics(0, -3);
        let breakdown = evaluate_source(&sample, &ScoringConfig::default(), now());
        assert_eq!(breakdown.activity.days, 0);
        assert_eq!(breakdown.activity.score, 0.4);
    }

    #[test]
    fn zero_views_yield_zero_engagement() {
        let mut sample = metrics(20_000, 100);
        sample.view_count = 0;
        sample.like_count = 9_000;
        sample.comment_count = 4_000;

        let breakdown = evaluate_source(&sample, &ScoringConfig::default(), now());
        assert_eq!(breakdown.engagement.like_ratio, 0.0);
        assert_eq!(breakdown.engagement.comment_ratio, 0.0);
        assert_eq!(breakdown.engagement.score, 0.0);
        assert!(!breakdown.score.is_nan());
    }

    #[test]
    fn weighted_sum_uses_source_weights() {
        let breakdown = evaluate_source(&metrics(2_000_000, 30), &ScoringConfig::default(), now());
        let expected_engagement = 0.05 * 0.1 + 0.01 * 0.1;
        assert!((breakdown.engagement.score - expected_engagement).abs() < 1e-12);
        let expected = 1.0 * 0.3 + 0.4 * 0.2 + expected_engagement * 0.5;
        assert!((breakdown.score - expected).abs() < 1e-12);
    }

    #[test]
    fn engagement_is_clamped_when_ratios_exceed_views() {
        let mut sample = metrics(0, 0);
        sample.view_count = 1;
        sample.like_count = 1_000;
        let mut config = ScoringConfig::default();
        config.engagement.like_ratio = 1.0;

        let breakdown = evaluate_source(&sample, &config, now());
        assert_eq!(breakdown.engagement.score, 1.0);
        assert!(breakdown.score <= 1.0);
    }
}
