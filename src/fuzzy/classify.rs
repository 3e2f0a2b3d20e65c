//! Crisp score to sentiment label.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Scores strictly below this are negative
pub const NEGATIVE_THRESHOLD: f64 = 3.3;
/// Scores strictly above this are positive
pub const POSITIVE_THRESHOLD: f64 = 6.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Negative,
    Neutral,
    Positive,
}

impl SentimentLabel {
    pub const ALL: [SentimentLabel; 3] = [
        SentimentLabel::Negative,
        SentimentLabel::Neutral,
        SentimentLabel::Positive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Negative => "negative",
            SentimentLabel::Neutral => "neutral",
            SentimentLabel::Positive => "positive",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Label a defuzzified score; both thresholds belong to neutral.
pub fn classify(score: f64) -> SentimentLabel {
    if score < NEGATIVE_THRESHOLD {
        SentimentLabel::Negative
    } else if score > POSITIVE_THRESHOLD {
        SentimentLabel::Positive
    } else {
        SentimentLabel::Neutral
    }
}
