//! Batch summary: per-label counts and mean per-item inference time.

use std::fmt;

use serde::Serialize;

use crate::error::SentimentResult;
use crate::fuzzy::SentimentLabel;
use crate::pipeline::{ItemOutcome, ItemResult};

/// Count and mean engine time for one group of items
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LabelStats {
    pub count: usize,
    /// Mean seconds per item, `None` when the group is empty
    pub mean_secs: Option<f64>,
}

impl LabelStats {
    fn from_times<I: IntoIterator<Item = f64>>(times: I) -> Self {
        let (count, total) = times
            .into_iter()
            .fold((0usize, 0.0), |(n, sum), t| (n + 1, sum + t));
        Self {
            count,
            mean_secs: if count > 0 { Some(total / count as f64) } else { None },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub positive: LabelStats,
    pub negative: LabelStats,
    pub neutral: LabelStats,
    pub undefined: usize,
    pub failed: usize,
    /// Mean over every item, whatever its outcome
    pub overall: LabelStats,
}

impl BatchSummary {
    pub fn from_results(results: &[ItemResult]) -> Self {
        let by_label = |label: SentimentLabel| {
            LabelStats::from_times(
                results
                    .iter()
                    .filter(|r| r.outcome.label() == Some(label))
                    .map(|r| r.elapsed_secs),
            )
        };

        Self {
            total: results.len(),
            positive: by_label(SentimentLabel::Positive),
            negative: by_label(SentimentLabel::Negative),
            neutral: by_label(SentimentLabel::Neutral),
            undefined: results.iter().filter(|r| r.outcome.is_undefined()).count(),
            failed: results
                .iter()
                .filter(|r| matches!(r.outcome, ItemOutcome::Failed { .. }))
                .count(),
            overall: LabelStats::from_times(results.iter().map(|r| r.elapsed_secs)),
        }
    }

    pub fn stats(&self, label: SentimentLabel) -> LabelStats {
        match label {
            SentimentLabel::Positive => self.positive,
            SentimentLabel::Negative => self.negative,
            SentimentLabel::Neutral => self.neutral,
        }
    }

    pub fn to_json(&self) -> SentimentResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn mean(stats: &LabelStats) -> String {
    match stats.mean_secs {
        Some(secs) => format!("{:.6} s", secs),
        None => "n/a".to_string(),
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Items: {}", self.total)?;
        for label in SentimentLabel::ALL {
            writeln!(f, "Total {}: {}", label, self.stats(label).count)?;
        }
        if self.undefined > 0 {
            writeln!(f, "Undefined: {}", self.undefined)?;
        }
        if self.failed > 0 {
            writeln!(f, "Failed: {}", self.failed)?;
        }
        for label in SentimentLabel::ALL {
            writeln!(f, "Mean execution time ({}): {}", label, mean(&self.stats(label)))?;
        }
        write!(f, "Mean execution time (all): {}", mean(&self.overall))
    }
}
