//! Batch Inference Pipeline
//!
//! Runs the engine over a batch of scored items:
//! 1. Compute batch-wide min/max of both scores
//! 2. Build the membership set once
//! 3. Infer every item in parallel, timing each engine call
//! 4. Apply the undefined-sentiment policy
//!
//! Item-local failures stay with their item; domain errors (no usable
//! scores), internal errors and the `abort` policy fail the batch.

use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::{BatchConfig, UndefinedPolicy};
use crate::error::{SentimentError, SentimentResult};
use crate::fuzzy::{AxisBounds, SentimentEngine, SentimentLabel, OUTPUT_RANGE};

/// One text item with its lexical scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredItem {
    /// Source text, if carried along
    #[serde(default)]
    pub text: Option<String>,
    /// Reference label, if known
    #[serde(default)]
    pub target: Option<String>,
    pub positive_score: f64,
    pub negative_score: f64,
}

impl ScoredItem {
    pub fn new(positive_score: f64, negative_score: f64) -> Self {
        Self {
            text: None,
            target: None,
            positive_score,
            negative_score,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }
}

/// Per-item result of inference
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ItemOutcome {
    Classified { score: f64, label: SentimentLabel },
    /// No rule fired; no score exists
    Undefined,
    Failed { error: SentimentError },
}

impl ItemOutcome {
    pub fn label(&self) -> Option<SentimentLabel> {
        match self {
            ItemOutcome::Classified { label, .. } => Some(*label),
            _ => None,
        }
    }

    pub fn score(&self) -> Option<f64> {
        match self {
            ItemOutcome::Classified { score, .. } => Some(*score),
            _ => None,
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, ItemOutcome::Undefined)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemResult {
    #[serde(flatten)]
    pub item: ScoredItem,
    #[serde(flatten)]
    pub outcome: ItemOutcome,
    /// Wall-clock seconds spent in the engine call
    pub elapsed_secs: f64,
}

/// Results of a batch, in input order
#[derive(Debug, Clone)]
pub struct BatchOutput {
    pub positive_bounds: AxisBounds,
    pub negative_bounds: AxisBounds,
    pub results: Vec<ItemResult>,
}

/// Batch-wide score ranges over the finite scores.
///
/// Non-finite scores are left out here and fail on their own item later.
pub fn batch_bounds(items: &[ScoredItem]) -> SentimentResult<(AxisBounds, AxisBounds)> {
    if items.is_empty() {
        return Err(SentimentError::empty_batch());
    }
    let finite = |v: &f64| v.is_finite();

    let positive = AxisBounds::from_scores(items.iter().map(|i| i.positive_score).filter(finite));
    let negative = AxisBounds::from_scores(items.iter().map(|i| i.negative_score).filter(finite));

    match (positive, negative) {
        (Some(p), Some(n)) => Ok((p, n)),
        _ => Err(SentimentError::empty_batch()
            .with_cause("no item has finite positive and negative scores")),
    }
}

/// Runs batches through a [`SentimentEngine`]
#[derive(Debug, Clone, Default)]
pub struct BatchRunner {
    policy: UndefinedPolicy,
    threads: usize,
}

impl BatchRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &BatchConfig) -> Self {
        Self {
            policy: config.on_undefined,
            threads: config.threads,
        }
    }

    pub fn with_policy(mut self, policy: UndefinedPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Worker threads, 0 for the global rayon pool
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Derive bounds from the batch itself, then infer every item
    pub fn run(&self, items: Vec<ScoredItem>) -> SentimentResult<BatchOutput> {
        let (positive, negative) = batch_bounds(&items)?;
        let engine = SentimentEngine::from_bounds(positive, negative)?;
        self.run_with_engine(&engine, items)
    }

    /// Infer every item against an already built engine
    pub fn run_with_engine(
        &self,
        engine: &SentimentEngine,
        items: Vec<ScoredItem>,
    ) -> SentimentResult<BatchOutput> {
        let set = engine.membership_set();
        let positive_bounds = AxisBounds::new(set.positive().universe().lo(), set.positive().universe().hi());
        let negative_bounds = AxisBounds::new(set.negative().universe().lo(), set.negative().universe().hi());

        info!(
            items = items.len(),
            positive = %positive_bounds,
            negative = %negative_bounds,
            threads = self.threads,
            "running batch"
        );
        let started = Instant::now();

        let results = if self.threads == 0 {
            infer_all(engine, items)?
        } else {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.threads)
                .build()
                .map_err(|e| SentimentError::internal(format!("failed to start worker pool: {}", e)))?;
            pool.install(|| infer_all(engine, items))?
        };

        for (index, result) in results.iter().enumerate() {
            match &result.outcome {
                ItemOutcome::Undefined => warn!(
                    index,
                    positive = result.item.positive_score,
                    negative = result.item.negative_score,
                    "sentiment undefined"
                ),
                ItemOutcome::Failed { error } => warn!(index, %error, "item failed"),
                ItemOutcome::Classified { .. } => {}
            }
        }

        let results = self.apply_policy(results)?;
        info!(
            results = results.len(),
            elapsed_secs = started.elapsed().as_secs_f64(),
            "batch complete"
        );

        Ok(BatchOutput {
            positive_bounds,
            negative_bounds,
            results,
        })
    }

    fn apply_policy(&self, results: Vec<ItemResult>) -> SentimentResult<Vec<ItemResult>> {
        match self.policy {
            UndefinedPolicy::Keep => Ok(results),
            UndefinedPolicy::Skip => Ok(results.into_iter().filter(|r| !r.outcome.is_undefined()).collect()),
            UndefinedPolicy::Neutral => {
                let midpoint = (OUTPUT_RANGE.0 + OUTPUT_RANGE.1) / 2.0;
                Ok(results
                    .into_iter()
                    .map(|mut r| {
                        if r.outcome.is_undefined() {
                            r.outcome = ItemOutcome::Classified {
                                score: midpoint,
                                label: SentimentLabel::Neutral,
                            };
                        }
                        r
                    })
                    .collect())
            }
            UndefinedPolicy::Abort => match results.iter().position(|r| r.outcome.is_undefined()) {
                Some(index) => Err(SentimentError::aborted(format!(
                    "item {} has undefined sentiment",
                    index
                ))
                .with_context("index", index.to_string())
                .with_hint("Use on_undefined = \"keep\", \"skip\" or \"neutral\" to continue past such items")),
                None => Ok(results),
            },
        }
    }
}

fn infer_all(engine: &SentimentEngine, items: Vec<ScoredItem>) -> SentimentResult<Vec<ItemResult>> {
    items.into_par_iter().map(|item| infer_item(engine, item)).collect()
}

fn infer_item(engine: &SentimentEngine, item: ScoredItem) -> SentimentResult<ItemResult> {
    let start = Instant::now();
    let inferred = engine.infer(item.positive_score, item.negative_score);
    let elapsed_secs = start.elapsed().as_secs_f64();

    let outcome = outcome_of(inferred.map(|inference| (inference.score, inference.label)))?;
    Ok(ItemResult {
        item,
        outcome,
        elapsed_secs,
    })
}

/// Item-local failures become outcomes; anything else stops the batch
fn outcome_of(inferred: SentimentResult<(f64, SentimentLabel)>) -> SentimentResult<ItemOutcome> {
    match inferred {
        Ok((score, label)) => Ok(ItemOutcome::Classified { score, label }),
        Err(e) if e.is_undefined_sentiment() => Ok(ItemOutcome::Undefined),
        Err(error) if error.is_item_local() => Ok(ItemOutcome::Failed { error }),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    fn sample_batch() -> Vec<ScoredItem> {
        vec![
            ScoredItem::new(2.0, 0.0).with_text("great day"),
            ScoredItem::new(0.0, 0.0),
            ScoredItem::new(0.0, 2.0).with_target("negative"),
            ScoredItem::new(1.0, 1.0),
        ]
    }

    fn engine(pos: (f64, f64), neg: (f64, f64)) -> SentimentEngine {
        SentimentEngine::from_bounds(AxisBounds::new(pos.0, pos.1), AxisBounds::new(neg.0, neg.1))
            .unwrap()
    }

    #[test]
    fn test_batch_bounds() {
        let (p, n) = batch_bounds(&sample_batch()).unwrap();
        assert_eq!(p, AxisBounds::new(0.0, 2.0));
        assert_eq!(n, AxisBounds::new(0.0, 2.0));
    }

    #[test]
    fn test_batch_bounds_skip_non_finite() {
        let items = vec![ScoredItem::new(f64::NAN, 1.0), ScoredItem::new(0.5, 0.25)];
        let (p, n) = batch_bounds(&items).unwrap();
        assert_eq!(p, AxisBounds::new(0.5, 0.5));
        assert_eq!(n, AxisBounds::new(0.25, 1.0));
    }

    #[test]
    fn test_empty_batch() {
        let err = BatchRunner::new().run(Vec::new()).unwrap_err();
        assert_eq!(err.code, ErrorCode::EmptyBatch);

        let err = batch_bounds(&[ScoredItem::new(f64::NAN, f64::NAN)]).unwrap_err();
        assert_eq!(err.code, ErrorCode::EmptyBatch);
    }

    #[test]
    fn test_overflowing_range_fails_batch_cleanly() {
        let items = vec![ScoredItem::new(-1e308, 0.0), ScoredItem::new(1e308, 1.0)];
        let err = BatchRunner::new().run(items).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidDomain);
    }

    #[test]
    fn test_run_preserves_order() {
        let output = BatchRunner::new().with_threads(2).run(sample_batch()).unwrap();
        let labels: Vec<_> = output.results.iter().map(|r| r.outcome.label()).collect();
        assert_eq!(
            labels,
            vec![
                Some(SentimentLabel::Positive),
                Some(SentimentLabel::Neutral),
                Some(SentimentLabel::Negative),
                Some(SentimentLabel::Neutral),
            ]
        );
        assert_eq!(output.results[0].item.text.as_deref(), Some("great day"));
        assert!(output.results.iter().all(|r| r.elapsed_secs >= 0.0));
    }

    #[test]
    fn test_failed_item_is_local() {
        let mut items = sample_batch();
        items.insert(1, ScoredItem::new(f64::INFINITY, 0.0));

        let output = BatchRunner::new().run(items).unwrap();
        assert_eq!(output.results.len(), 5);
        match &output.results[1].outcome {
            ItemOutcome::Failed { error } => assert_eq!(error.code, ErrorCode::NonFiniteScore),
            other => panic!("expected failure, got {:?}", other),
        }
        assert_eq!(output.results[0].outcome.label(), Some(SentimentLabel::Positive));
        assert_eq!(output.results[2].outcome.label(), Some(SentimentLabel::Neutral));
    }

    #[test]
    fn test_outcome_routing() {
        assert_eq!(
            outcome_of(Ok((8.0, SentimentLabel::Positive))).unwrap().label(),
            Some(SentimentLabel::Positive)
        );
        assert!(outcome_of(Err(SentimentError::zero_mass())).unwrap().is_undefined());
        assert!(matches!(
            outcome_of(Err(SentimentError::non_finite("negative_score", f64::NAN))).unwrap(),
            ItemOutcome::Failed { .. }
        ));

        let err = outcome_of(Err(SentimentError::internal("rule base is empty"))).unwrap_err();
        assert_eq!(err.code, ErrorCode::InternalError);
    }

    #[test]
    fn test_collapsed_batch() {
        let items = vec![ScoredItem::new(1.0, 0.0), ScoredItem::new(1.0, 2.0)];
        let output = BatchRunner::new().run(items).unwrap();
        assert_eq!(output.positive_bounds, AxisBounds::new(1.0, 1.0));
        assert!(output.results.iter().all(|r| r.outcome.score().is_some()));
    }

    fn with_out_of_range_item() -> Vec<ScoredItem> {
        vec![ScoredItem::new(2.0, 0.0), ScoredItem::new(9.0, 0.0), ScoredItem::new(0.0, 0.0)]
    }

    #[test]
    fn test_policy_keep() {
        let engine = engine((0.0, 2.0), (0.0, 2.0));
        let output = BatchRunner::new().run_with_engine(&engine, with_out_of_range_item()).unwrap();
        assert_eq!(output.results.len(), 3);
        assert!(output.results[1].outcome.is_undefined());
        assert_eq!(output.results[1].outcome.score(), None);
    }

    #[test]
    fn test_policy_skip() {
        let engine = engine((0.0, 2.0), (0.0, 2.0));
        let output = BatchRunner::new()
            .with_policy(UndefinedPolicy::Skip)
            .run_with_engine(&engine, with_out_of_range_item())
            .unwrap();
        assert_eq!(output.results.len(), 2);
        assert!(output.results.iter().all(|r| !r.outcome.is_undefined()));
    }

    #[test]
    fn test_policy_neutral() {
        let engine = engine((0.0, 2.0), (0.0, 2.0));
        let output = BatchRunner::new()
            .with_policy(UndefinedPolicy::Neutral)
            .run_with_engine(&engine, with_out_of_range_item())
            .unwrap();
        assert_eq!(
            output.results[1].outcome,
            ItemOutcome::Classified { score: 5.0, label: SentimentLabel::Neutral }
        );
    }

    #[test]
    fn test_policy_abort() {
        let engine = engine((0.0, 2.0), (0.0, 2.0));
        let err = BatchRunner::new()
            .with_policy(UndefinedPolicy::Abort)
            .run_with_engine(&engine, with_out_of_range_item())
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::BatchAborted);
        assert!(err.message.contains("item 1"));
    }

    #[test]
    fn test_result_json_shape() {
        let output = BatchRunner::new().run(vec![ScoredItem::new(0.0, 0.0)]).unwrap();
        let json = serde_json::to_value(&output.results[0]).unwrap();
        assert_eq!(json["status"], "classified");
        assert_eq!(json["label"], "neutral");
        assert_eq!(json["positive_score"], 0.0);
    }
}
