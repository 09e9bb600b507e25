//! Answer/score extraction from a semi-structured model response
//!
//! The model is asked for
//!
//! ```text
//! Answer: <text>
//! Score: <number>
//! ```
//!
//! but routinely wraps the score in markup or trailing remarks. Parsing has
//! three named outcomes, each with a fixed confidence:
//!
//! | outcome          | answer                   | score        |
//! |------------------|--------------------------|--------------|
//! | `Parsed`         | text between the markers | parsed value |
//! | `NoMarkers`      | whole response, trimmed  | 0.0          |
//! | `MalformedScore` | whole response, trimmed  | 0.5          |
//!
//! Parsing never fails: a malformed response is an expected occurrence.

use serde::{Deserialize, Serialize};

pub const ANSWER_MARKER: &str = "Answer:";
pub const SCORE_MARKER: &str = "Score:";

/// Confidence when the model ignored the output format entirely
pub const NO_MARKERS_SCORE: f64 = 0.0;

/// Confidence when markers were present but the score could not be read
pub const MALFORMED_SCORE: f64 = 0.5;

/// Which parsing path produced the answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseStatus {
    Parsed,
    NoMarkers,
    MalformedScore,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    /// Both markers found and the score region held a number
    Parsed { answer: String, score: f64 },
    /// `Answer:` or `Score:` missing
    NoMarkers { answer: String },
    /// Markers found, but no number could be read after `Score:`
    MalformedScore { answer: String },
}

impl ParseOutcome {
    /// Parse a raw completion. `Score:` is only searched for after the
    /// first `Answer:`.
    pub fn parse(response: &str) -> Self {
        if !(response.contains(ANSWER_MARKER) && response.contains(SCORE_MARKER)) {
            return ParseOutcome::NoMarkers {
                answer: response.trim().to_string(),
            };
        }

        let after_answer = response
            .split_once(ANSWER_MARKER)
            .map(|(_, rest)| rest)
            .unwrap_or_default();

        let Some((answer, score_region)) = after_answer.split_once(SCORE_MARKER) else {
            return ParseOutcome::MalformedScore {
                answer: response.trim().to_string(),
            };
        };

        match parse_score(score_region) {
            Some(score) => ParseOutcome::Parsed {
                answer: answer.trim().to_string(),
                score,
            },
            None => ParseOutcome::MalformedScore {
                answer: response.trim().to_string(),
            },
        }
    }

    pub fn status(&self) -> ParseStatus {
        match self {
            ParseOutcome::Parsed { .. } => ParseStatus::Parsed,
            ParseOutcome::NoMarkers { .. } => ParseStatus::NoMarkers,
            ParseOutcome::MalformedScore { .. } => ParseStatus::MalformedScore,
        }
    }

    pub fn answer(&self) -> &str {
        match self {
            ParseOutcome::Parsed { answer, .. }
            | ParseOutcome::NoMarkers { answer }
            | ParseOutcome::MalformedScore { answer } => answer,
        }
    }

    /// Confidence score for this outcome
    pub fn score(&self) -> f64 {
        match self {
            ParseOutcome::Parsed { score, .. } => *score,
            ParseOutcome::NoMarkers { .. } => NO_MARKERS_SCORE,
            ParseOutcome::MalformedScore { .. } => MALFORMED_SCORE,
        }
    }

    pub fn into_answer(self) -> String {
        match self {
            ParseOutcome::Parsed { answer, .. }
            | ParseOutcome::NoMarkers { answer }
            | ParseOutcome::MalformedScore { answer } => answer,
        }
    }
}

/// Keep only ASCII digits and `.` from the score region
pub fn filter_score_text(region: &str) -> String {
    region
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect()
}

/// Filter then parse; `None` for empty, malformed or non-finite values
pub fn parse_score(region: &str) -> Option<f64> {
    filter_score_text(region)
        .parse::<f64>()
        .ok()
        .filter(|score| score.is_finite())
}
