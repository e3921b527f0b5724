// File: src/ranking/mod.rs
//! Candidate ranking over a dictionary shortlist.
//!
//! Two strategies share the same [`Candidate`] output: [`lexical`] scores the
//! extracted key string, [`shape`] compares the raw gesture against word
//! templates. A deployment picks one through [`Strategy`]; both stay usable
//! side by side for comparison.

pub mod lexical;
pub mod shape;

pub use lexical::LexicalRanker;
pub use shape::{GestureTemplate, ShapeRanker, ShapeTemplates};

use crate::learning::BoostProvider;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Active scoring strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    #[default]
    Lexical,
    Shape,
}

impl Strategy {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lexical" => Some(Self::Lexical),
            "shape" => Some(Self::Shape),
            _ => None,
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lexical => f.write_str("lexical"),
            Self::Shape => f.write_str("shape"),
        }
    }
}

/// How a candidate's base score was assembled.
#[derive(Debug, Clone, PartialEq)]
pub enum ScoreBreakdown {
    /// Weighted contributions of the lexical strategy. `frequency` and
    /// `spatial` are already multiplied by their weights.
    Lexical {
        edit_distance: usize,
        bigram_overlap: usize,
        frequency: f64,
        spatial: f64,
    },
    Shape {
        shape_distance: f64,
        location_distance: f64,
        frequency: f64,
        endpoint_bonus: f64,
        length_bonus: f64,
    },
    /// Common word accepted on start/end proximity alone.
    FastPath { start_distance: f64, end_distance: f64 },
}

/// A ranked word.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub word: String,
    /// Final score, learning boost included.
    pub score: f64,
    pub breakdown: ScoreBreakdown,
    pub learning_boost: f64,
}

impl Candidate {
    pub fn new(word: impl Into<String>, score: f64, breakdown: ScoreBreakdown) -> Self {
        Self {
            word: word.into(),
            score,
            breakdown,
            learning_boost: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Confidence {
    Low,
    Medium,
    High,
}

/// Rates how clearly the top candidate beats the runner-up.
pub fn confidence(candidates: &[Candidate]) -> Confidence {
    let Some(top) = candidates.first() else {
        return Confidence::Low;
    };
    let gap = match candidates.get(1) {
        Some(second) => top.score - second.score,
        None => top.score.abs(),
    };

    if gap > 5.0 && top.score > 0.0 {
        Confidence::High
    } else if gap > 2.0 && top.score > -3.0 {
        Confidence::Medium
    } else {
        Confidence::Low
    }
}

/// Adds learning boosts, sorts by descending score and caps the list.
///
/// The sort is stable, so equal scores keep their shortlist order.
pub(crate) fn finalize(
    mut candidates: Vec<Candidate>,
    boost: Option<&dyn BoostProvider>,
    previous_word: Option<&str>,
    max_candidates: usize,
) -> Vec<Candidate> {
    if let Some(provider) = boost {
        for c in candidates.iter_mut() {
            let b = provider.boost(&c.word, previous_word);
            if b.is_finite() && b != 0.0 {
                c.learning_boost = b;
                c.score += b;
            }
        }
    }

    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
    candidates.truncate(max_candidates);
    candidates
}
