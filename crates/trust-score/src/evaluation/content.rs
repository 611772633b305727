use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::clamp_unit;
use super::config::{ScoringConfig, SentimentThresholds};
use super::domain::VideoMetrics;

const SEVERE_LENGTH_PENALTY: f64 = 0.8;
const MILD_LENGTH_PENALTY: f64 = 0.9;
const REQUIRED_KEYWORD_BONUS: f64 = 1.1;
const SUSPICIOUS_KEYWORD_PENALTY: f64 = 0.9;
const EXCESS_LINK_PENALTY: f64 = 0.9;
const QUALITY_DOMAIN_BONUS: f64 = 0.1;

const POSITIVE_WORDS: [&str; 4] = ["좋다", "유용", "정확", "신뢰"];
const NEGATIVE_WORDS: [&str; 4] = ["나쁘다", "거짓", "의심", "불신"];
const SENTIMENT_STEP: f64 = 0.1;

const NEUTRAL_SENTIMENT_SCORE: f64 = 1.0;
const MODERATE_SENTIMENT_SCORE: f64 = 0.85;
const EXTREME_SENTIMENT_SCORE: f64 = 0.7;

static LINK_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"https?://\S+").ok());

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitleFactor {
    pub length: usize,
    pub has_required_keyword: bool,
    pub has_suspicious_keyword: bool,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptionFactor {
    pub length: usize,
    pub link_count: usize,
    pub quality_domains: Vec<String>,
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentFactor {
    pub value: f64,
    pub score: f64,
}

/// Text-side signals with their normalized scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentBreakdown {
    pub title: TitleFactor,
    pub description: DescriptionFactor,
    pub sentiment: SentimentFactor,
    pub score: f64,
}

/// Score the title, description and tone of a video.
pub fn evaluate_content(metrics: &VideoMetrics, config: &ScoringConfig) -> ContentBreakdown {
    let title = title_factor(&metrics.title, config);
    let description = description_factor(&metrics.description, config);

    let value = sentiment_value(&metrics.title, &metrics.description);
    let sentiment = SentimentFactor {
        value,
        score: sentiment_score(value, &config.sentiment),
    };

    let weights = config.content_weights;
    let score = clamp_unit(
        title.score * weights.title
            + description.score * weights.description
            + sentiment.score * weights.sentiment,
    );

    ContentBreakdown {
        title,
        description,
        sentiment,
        score,
    }
}

fn title_factor(title: &str, config: &ScoringConfig) -> TitleFactor {
    let length = title.chars().count();
    let mut score = 1.0;

    if length > config.title.max_length {
        score *= SEVERE_LENGTH_PENALTY;
    } else if length < config.title.optimal_length {
        score *= MILD_LENGTH_PENALTY;
    }

    let has_required_keyword = contains_any(title, &config.keywords.required);
    let has_suspicious_keyword = contains_any(title, &config.keywords.suspicious);

    if has_required_keyword {
        score *= REQUIRED_KEYWORD_BONUS;
    }
    if has_suspicious_keyword {
        score *= SUSPICIOUS_KEYWORD_PENALTY;
    }

    TitleFactor {
        length,
        has_required_keyword,
        has_suspicious_keyword,
        score: f64::min(score, 1.0),
    }
}

fn description_factor(description: &str, config: &ScoringConfig) -> DescriptionFactor {
    let criteria = &config.description;
    let length = description.chars().count();
    let mut score = 1.0;

    if length < criteria.min_length {
        score *= SEVERE_LENGTH_PENALTY;
    } else if length < criteria.optimal_length {
        score *= MILD_LENGTH_PENALTY;
    }

    let link_count = count_links(description);
    if link_count > criteria.max_links {
        score *= EXCESS_LINK_PENALTY;
    }

    let quality_domains: Vec<String> = criteria
        .quality_domains
        .iter()
        .filter(|domain| description.contains(domain.as_str()))
        .cloned()
        .collect();
    for _ in &quality_domains {
        score *= 1.0 + QUALITY_DOMAIN_BONUS;
    }

    DescriptionFactor {
        length,
        link_count,
        quality_domains,
        score: f64::min(score, 1.0),
    }
}

fn count_links(text: &str) -> usize {
    LINK_PATTERN
        .as_ref()
        .map(|pattern| pattern.find_iter(text).count())
        .unwrap_or(0)
}

fn contains_any<'a, I>(text: &str, keywords: I) -> bool
where
    I: IntoIterator<Item = &'a String>,
{
    keywords
        .into_iter()
        .any(|keyword| text.contains(keyword.as_str()))
}

/// Keyword heuristic in `[-1, 1]`: each listed word present moves the value by one step.
pub(crate) fn sentiment_value(title: &str, description: &str) -> f64 {
    let text = format!("{title} {description}");
    let positive = POSITIVE_WORDS
        .iter()
        .filter(|word| text.contains(*word))
        .count();
    let negative = NEGATIVE_WORDS
        .iter()
        .filter(|word| text.contains(*word))
        .count();

    let value = (positive as f64 - negative as f64) * SENTIMENT_STEP;
    value.clamp(-1.0, 1.0)
}

/// Three-band step over `|value|`; deliberately not interpolated.
pub(crate) fn sentiment_score(value: f64, thresholds: &SentimentThresholds) -> f64 {
    let magnitude = value.abs();
    if magnitude <= thresholds.neutral {
        NEUTRAL_SENTIMENT_SCORE
    } else if magnitude >= thresholds.extreme {
        EXTREME_SENTIMENT_SCORE
    } else {
        MODERATE_SENTIMENT_SCORE
    }
}
