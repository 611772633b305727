use std::fmt;

use serde::{Deserialize, Serialize};

use super::clamp_unit;
use super::config::ScoringConfig;

/// Fixed grade cut points, best first. Not part of the tunable config.
const GRADE_BANDS: [(Grade, f64); 4] = [
    (Grade::A, 0.8),
    (Grade::B, 0.6),
    (Grade::C, 0.4),
    (Grade::D, 0.2),
];

/// Letter grade attached to a trust score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    /// Highest band whose threshold the score meets or exceeds.
    pub fn from_score(score: f64) -> Self {
        GRADE_BANDS
            .iter()
            .find(|(_, threshold)| score >= *threshold)
            .map(|(grade, _)| *grade)
            .unwrap_or(Grade::F)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Grade::A => "highly trustworthy content",
            Grade::B => "trustworthy content",
            Grade::C => "content of ordinary trustworthiness",
            Grade::D => "content that warrants caution",
            Grade::F => "untrustworthy content",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Final score and grade produced from the two sub-scores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AggregateScore {
    pub total_score: f64,
    pub grade: Grade,
}

pub fn aggregate(source_score: f64, content_score: f64, config: &ScoringConfig) -> AggregateScore {
    let total_score = clamp_unit(
        source_score * config.weights.source + content_score * config.weights.content,
    );

    AggregateScore {
        total_score,
        grade: Grade::from_score(total_score),
    }
}
