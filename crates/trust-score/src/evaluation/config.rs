use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Allowed drift when checking that a weight group sums to one.
pub const WEIGHT_TOLERANCE: f64 = 1e-6;

/// Scores awarded by the threshold step function, best band first.
const BAND_SCORES: [f64; 4] = [1.0, 0.8, 0.6, 0.4];

/// Immutable snapshot of every tunable used by one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub weights: TrustWeights,
    pub source_weights: SourceWeights,
    pub content_weights: ContentWeights,
    pub subscriber_thresholds: Thresholds,
    pub activity_thresholds: Thresholds,
    pub engagement: EngagementWeights,
    pub title: TitleCriteria,
    pub description: DescriptionCriteria,
    pub sentiment: SentimentThresholds,
    pub keywords: KeywordSets,
}

/// Split between the source and content sub-scores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrustWeights {
    pub source: f64,
    pub content: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SourceWeights {
    pub subscribers: f64,
    pub activity: f64,
    pub engagement: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContentWeights {
    pub title: f64,
    pub description: f64,
    pub sentiment: f64,
}

/// Three descending cut points for a step-scored signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
    pub high: u64,
    pub medium: u64,
    pub low: u64,
}

impl Thresholds {
    /// Highest qualifying band wins: 1.0, 0.8, 0.6, otherwise 0.4.
    pub fn band_score(&self, value: u64) -> f64 {
        if value >= self.high {
            BAND_SCORES[0]
        } else if value >= self.medium {
            BAND_SCORES[1]
        } else if value >= self.low {
            BAND_SCORES[2]
        } else {
            BAND_SCORES[3]
        }
    }

    fn is_strictly_descending(&self) -> bool {
        self.high > self.medium && self.medium > self.low
    }
}

/// Per-metric multipliers applied to the like and comment ratios.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngagementWeights {
    pub like_ratio: f64,
    pub comment_ratio: f64,
}

/// Title length bounds, counted in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleCriteria {
    pub optimal_length: usize,
    pub max_length: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescriptionCriteria {
    pub min_length: usize,
    pub optimal_length: usize,
    pub max_links: usize,
    pub quality_domains: BTreeSet<String>,
}

/// Cut points on the absolute sentiment value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentThresholds {
    pub neutral: f64,
    pub extreme: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordSets {
    pub required: BTreeSet<String>,
    pub suspicious: BTreeSet<String>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: TrustWeights {
                source: 0.6,
                content: 0.4,
            },
            source_weights: SourceWeights {
                subscribers: 0.3,
                activity: 0.2,
                engagement: 0.5,
            },
            content_weights: ContentWeights {
                title: 0.3,
                description: 0.4,
                sentiment: 0.3,
            },
            subscriber_thresholds: Thresholds {
                high: 1_000_000,
                medium: 100_000,
                low: 10_000,
            },
            activity_thresholds: Thresholds {
                high: 365,
                medium: 180,
                low: 90,
            },
            engagement: EngagementWeights {
                like_ratio: 0.1,
                comment_ratio: 0.1,
            },
            title: TitleCriteria {
                optimal_length: 50,
                max_length: 100,
            },
            description: DescriptionCriteria {
                min_length: 50,
                optimal_length: 200,
                max_links: 5,
                quality_domains: string_set(&[".edu", ".gov", ".org"]),
            },
            sentiment: SentimentThresholds {
                neutral: 0.5,
                extreme: 0.8,
            },
            keywords: KeywordSets {
                required: string_set(&["연구", "데이터", "출처"]),
                suspicious: string_set(&["확실", "무조건", "100%"]),
            },
        }
    }
}

fn string_set(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(|value| value.to_string()).collect()
}

impl ScoringConfig {
    /// Check every structural rule, collecting all problems instead of stopping at the first.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        check_weight_group(
            &mut issues,
            "weights",
            &[("source", self.weights.source), ("content", self.weights.content)],
        );
        check_weight_group(
            &mut issues,
            "source_weights",
            &[
                ("subscribers", self.source_weights.subscribers),
                ("activity", self.source_weights.activity),
                ("engagement", self.source_weights.engagement),
            ],
        );
        check_weight_group(
            &mut issues,
            "content_weights",
            &[
                ("title", self.content_weights.title),
                ("description", self.content_weights.description),
                ("sentiment", self.content_weights.sentiment),
            ],
        );

        for (field, thresholds) in [
            ("subscriber_thresholds", &self.subscriber_thresholds),
            ("activity_thresholds", &self.activity_thresholds),
        ] {
            if !thresholds.is_strictly_descending() {
                issues.push(ValidationIssue::new(
                    field,
                    format!(
                        "thresholds must be strictly descending (high {}, medium {}, low {})",
                        thresholds.high, thresholds.medium, thresholds.low
                    ),
                ));
            }
        }

        for (field, value) in [
            ("engagement.like_ratio", self.engagement.like_ratio),
            ("engagement.comment_ratio", self.engagement.comment_ratio),
        ] {
            if !value.is_finite() || value < 0.0 {
                issues.push(ValidationIssue::new(
                    field,
                    format!("must be a finite non-negative number, found {value}"),
                ));
            }
        }

        if self.title.optimal_length > self.title.max_length {
            issues.push(ValidationIssue::new(
                "title",
                format!(
                    "optimal length {} exceeds max length {}",
                    self.title.optimal_length, self.title.max_length
                ),
            ));
        }

        if self.description.min_length > self.description.optimal_length {
            issues.push(ValidationIssue::new(
                "description",
                format!(
                    "min length {} exceeds optimal length {}",
                    self.description.min_length, self.description.optimal_length
                ),
            ));
        }
        if self
            .description
            .quality_domains
            .iter()
            .any(|domain| domain.trim().is_empty())
        {
            issues.push(ValidationIssue::new(
                "description.quality_domains",
                "quality domains must not be blank",
            ));
        }

        let SentimentThresholds { neutral, extreme } = self.sentiment;
        if !(0.0..=1.0).contains(&neutral) || !(0.0..=1.0).contains(&extreme) {
            issues.push(ValidationIssue::new(
                "sentiment",
                format!("thresholds must lie within [0, 1] (neutral {neutral}, extreme {extreme})"),
            ));
        } else if neutral >= extreme {
            issues.push(ValidationIssue::new(
                "sentiment",
                format!("neutral threshold {neutral} must be below extreme threshold {extreme}"),
            ));
        }

        for (field, keywords) in [
            ("keywords.required", &self.keywords.required),
            ("keywords.suspicious", &self.keywords.suspicious),
        ] {
            if keywords.iter().any(|keyword| keyword.trim().is_empty()) {
                issues.push(ValidationIssue::new(field, "keywords must not be blank"));
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }

    /// Human readable summary of the sections that differ in `next`.
    pub fn describe_changes(&self, next: &ScoringConfig) -> Vec<String> {
        let mut changes = Vec::new();
        push_change(&mut changes, "weights", &self.weights, &next.weights);
        push_change(
            &mut changes,
            "source_weights",
            &self.source_weights,
            &next.source_weights,
        );
        push_change(
            &mut changes,
            "content_weights",
            &self.content_weights,
            &next.content_weights,
        );
        push_change(
            &mut changes,
            "subscriber_thresholds",
            &self.subscriber_thresholds,
            &next.subscriber_thresholds,
        );
        push_change(
            &mut changes,
            "activity_thresholds",
            &self.activity_thresholds,
            &next.activity_thresholds,
        );
        push_change(&mut changes, "engagement", &self.engagement, &next.engagement);
        push_change(&mut changes, "title", &self.title, &next.title);
        push_change(
            &mut changes,
            "description",
            &self.description,
            &next.description,
        );
        push_change(&mut changes, "sentiment", &self.sentiment, &next.sentiment);
        push_change(&mut changes, "keywords", &self.keywords, &next.keywords);
        changes
    }
}

fn check_weight_group(issues: &mut Vec<ValidationIssue>, group: &str, weights: &[(&str, f64)]) {
    for (name, value) in weights {
        if !value.is_finite() || *value < 0.0 {
            issues.push(ValidationIssue::new(
                format!("{group}.{name}"),
                format!("must be a finite non-negative fraction, found {value}"),
            ));
        }
    }

    let sum: f64 = weights.iter().map(|(_, value)| value).sum();
    if !sum.is_finite() || (sum - 1.0).abs() > WEIGHT_TOLERANCE {
        issues.push(ValidationIssue::new(
            group,
            format!("weights must sum to 1, found {sum:.4}"),
        ));
    }
}

fn push_change<T>(changes: &mut Vec<String>, section: &str, before: &T, after: &T)
where
    T: PartialEq + Serialize,
{
    if before == after {
        return;
    }

    let render = |value: &T| {
        serde_json::to_string(value).unwrap_or_else(|_| "<unrenderable>".to_string())
    };
    changes.push(format!("{section}: {} -> {}", render(before), render(after)));
}

/// Single rule broken by a proposed configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub field: String,
    pub reason: String,
}

impl ValidationIssue {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

/// Malformed or inconsistent scoring configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid scoring configuration: {}", render_issues(.issues))]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationError {
    pub fn single(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            issues: vec![ValidationIssue::new(field, reason)],
        }
    }

    pub fn mentions(&self, field: &str) -> bool {
        self.issues.iter().any(|issue| issue.field == field)
    }
}

fn render_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ValidationIssue::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
