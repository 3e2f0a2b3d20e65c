//! Per-item Mamdani inference: fuzzify, fire rules, aggregate, defuzzify, label.
//!
//! Every function here is pure; [`SentimentEngine`] only bundles them with a
//! read-only [`MembershipSet`].

use serde::Serialize;
use tracing::trace;

use crate::error::{SentimentError, SentimentResult};

use super::classify::{classify, SentimentLabel};
use super::membership::MembershipFunction;
use super::rules::Rule;
use super::variable::{AxisBounds, LinguisticTerm, LinguisticVariable, MembershipSet, OutputTerm};
use super::FuzzyValue;

/// Membership degrees of one (positive, negative) score pair, in term order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fuzzified {
    pub positive: [FuzzyValue; 3],
    pub negative: [FuzzyValue; 3],
}

impl Fuzzified {
    /// Fuzzy AND (min) of the rule's two antecedents
    pub fn firing_strength(&self, rule: Rule) -> FuzzyValue {
        self.positive[rule.positive.index()].and(&self.negative[rule.negative.index()])
    }
}

/// A rule together with its firing strength and clipped consequent
#[derive(Debug, Clone)]
pub struct RuleActivation {
    pub rule: Rule,
    pub strength: FuzzyValue,
    pub output: MembershipFunction,
}

/// Fuzzify both scores against the batch's input variables
pub fn fuzzify(set: &MembershipSet, positive: f64, negative: f64) -> Fuzzified {
    Fuzzified {
        positive: set.positive().fuzzify(positive),
        negative: set.negative().fuzzify(negative),
    }
}

/// Fire all nine rules and clip each consequent at its firing strength
pub fn evaluate_rules(
    fuzzified: &Fuzzified,
    sentiment: &LinguisticVariable<OutputTerm>,
) -> Vec<RuleActivation> {
    Rule::all()
        .map(|rule| {
            let strength = fuzzified.firing_strength(rule);
            let output = sentiment.term(rule.consequent).clip(strength);
            RuleActivation { rule, strength, output }
        })
        .collect()
}

/// Fuzzy union of the clipped consequents; `None` for an empty input
pub fn aggregate<'a, I>(shapes: I) -> Option<MembershipFunction>
where
    I: IntoIterator<Item = &'a MembershipFunction>,
{
    let mut shapes = shapes.into_iter();
    let mut acc = shapes.next()?.clone();
    for shape in shapes {
        acc.union_with(shape);
    }
    Some(acc)
}

/// Centroid of the aggregated output.
///
/// Fails with `ZeroMassAggregation` when no rule contributed any mass.
pub fn defuzzify(aggregated: &MembershipFunction) -> SentimentResult<f64> {
    aggregated.centroid().ok_or_else(SentimentError::zero_mass)
}

/// Outcome of one successful inference
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Inference {
    /// Defuzzified score in [0, 10]
    pub score: f64,
    pub label: SentimentLabel,
    /// Firing strengths indexed `[positive term][negative term]`
    pub strengths: [[f64; 3]; 3],
}

impl Inference {
    pub fn firing_strength(&self, rule: Rule) -> f64 {
        self.strengths[rule.positive.index()][rule.negative.index()]
    }
}

/// Stateless inference over a fixed membership set.
///
/// `Send + Sync`: share one engine across all workers of a batch.
#[derive(Debug, Clone)]
pub struct SentimentEngine {
    set: MembershipSet,
}

impl SentimentEngine {
    pub fn new(set: MembershipSet) -> Self {
        Self { set }
    }

    /// Build the membership set from batch bounds and wrap it
    pub fn from_bounds(positive: AxisBounds, negative: AxisBounds) -> SentimentResult<Self> {
        Ok(Self::new(MembershipSet::from_bounds(positive, negative)?))
    }

    pub fn membership_set(&self) -> &MembershipSet {
        &self.set
    }

    /// Aggregated output shape for a score pair, before defuzzification
    pub fn aggregated(&self, positive: f64, negative: f64) -> SentimentResult<MembershipFunction> {
        self.activate(positive, negative).map(|(_, aggregated)| aggregated)
    }

    /// Full inference for one item
    pub fn infer(&self, positive: f64, negative: f64) -> SentimentResult<Inference> {
        let (activations, aggregated) = self.activate(positive, negative)?;

        let mut strengths = [[0.0; 3]; 3];
        for activation in &activations {
            let (p, n) = (activation.rule.positive.index(), activation.rule.negative.index());
            strengths[p][n] = activation.strength.value();
        }

        let score = defuzzify(&aggregated).map_err(|e| {
            e.with_context("positive_score", positive.to_string())
                .with_context("negative_score", negative.to_string())
        })?;
        let label = classify(score);

        trace!(positive, negative, score, %label, "inferred sentiment");
        Ok(Inference { score, label, strengths })
    }

    fn activate(
        &self,
        positive: f64,
        negative: f64,
    ) -> SentimentResult<(Vec<RuleActivation>, MembershipFunction)> {
        check_finite("positive_score", positive)?;
        check_finite("negative_score", negative)?;

        let fuzzified = fuzzify(&self.set, positive, negative);
        let activations = evaluate_rules(&fuzzified, self.set.sentiment());
        let aggregated = aggregate(activations.iter().map(|a| &a.output))
            .ok_or_else(|| SentimentError::internal("rule base is empty"))?;
        Ok((activations, aggregated))
    }
}

fn check_finite(field: &str, value: f64) -> SentimentResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SentimentError::non_finite(field, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::fuzzy::variable::{sentiment_variable, InputTerm};
    use approx::assert_relative_eq;

    fn engine(pos: (f64, f64), neg: (f64, f64)) -> SentimentEngine {
        SentimentEngine::from_bounds(AxisBounds::new(pos.0, pos.1), AxisBounds::new(neg.0, neg.1))
            .unwrap()
    }

    #[test]
    fn test_engine_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SentimentEngine>();
    }

    #[test]
    fn test_strong_positive_only_fires_high_low() {
        let engine = engine((0.0, 2.0), (0.0, 2.0));

        let fuzzified = fuzzify(engine.membership_set(), 2.0, 0.0);
        assert_eq!(fuzzified.positive[InputTerm::High.index()], FuzzyValue::ONE);
        assert_eq!(fuzzified.negative[InputTerm::Low.index()], FuzzyValue::ONE);

        let aggregated = engine.aggregated(2.0, 0.0).unwrap();
        assert_eq!(
            aggregated.degrees(),
            sentiment_variable().term(OutputTerm::Positive).degrees()
        );

        let inference = engine.infer(2.0, 0.0).unwrap();
        assert!(inference.score > 6.7);
        assert_eq!(inference.label, SentimentLabel::Positive);
        assert_eq!(inference.firing_strength(Rule::lookup(InputTerm::High, InputTerm::Low)), 1.0);
        let fired = inference.strengths.iter().flatten().filter(|s| **s > 0.0).count();
        assert_eq!(fired, 1);
    }

    #[test]
    fn test_absent_signal_is_neutral() {
        let engine = engine((0.0, 2.0), (0.0, 2.0));
        let inference = engine.infer(0.0, 0.0).unwrap();
        assert_relative_eq!(inference.score, 5.0, epsilon = 1e-9);
        assert_eq!(inference.label, SentimentLabel::Neutral);
        assert_eq!(inference.firing_strength(Rule::lookup(InputTerm::Low, InputTerm::Low)), 1.0);
    }

    #[test]
    fn test_strong_negative() {
        let engine = engine((0.0, 2.0), (0.0, 2.0));
        let inference = engine.infer(0.0, 2.0).unwrap();
        assert!(inference.score < 3.3);
        assert_eq!(inference.label, SentimentLabel::Negative);
    }

    #[test]
    fn test_mixed_signal_stays_in_range() {
        let engine = engine((0.0, 3.0), (0.0, 1.5));
        for (p, n) in [(0.7, 0.2), (1.5, 0.75), (2.9, 1.4), (0.1, 1.2)] {
            let inference = engine.infer(p, n).unwrap();
            assert!((0.0..=10.0).contains(&inference.score));
        }
    }

    #[test]
    fn test_collapsed_axis_at_its_point() {
        let engine = engine((1.0, 1.0), (0.0, 2.0));
        let inference = engine.infer(1.0, 0.0).unwrap();
        assert!(inference.score.is_finite());
        assert_eq!(inference.firing_strength(Rule::lookup(InputTerm::Medium, InputTerm::Low)), 1.0);
    }

    #[test]
    fn test_collapsed_axis_off_point_is_undefined() {
        let engine = engine((1.0, 1.0), (0.0, 2.0));
        let err = engine.infer(2.0, 0.0).unwrap_err();
        assert_eq!(err.code, ErrorCode::ZeroMassAggregation);
        assert!(err.is_undefined_sentiment());
        let ctx = err.context.unwrap();
        assert_eq!(ctx.fields.get("positive_score"), Some(&"2".to_string()));
    }

    #[test]
    fn test_out_of_range_scores_are_undefined() {
        let engine = engine((0.0, 2.0), (0.0, 2.0));
        assert!(engine.infer(5.0, 0.0).unwrap_err().is_undefined_sentiment());
    }

    #[test]
    fn test_non_finite_scores_rejected() {
        let engine = engine((0.0, 2.0), (0.0, 2.0));
        let err = engine.infer(f64::NAN, 0.0).unwrap_err();
        assert_eq!(err.code, ErrorCode::NonFiniteScore);
        assert!(engine.infer(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_aggregation_order_independent() {
        let engine = engine((0.0, 2.0), (0.0, 2.0));
        let fuzzified = fuzzify(engine.membership_set(), 1.3, 0.6);
        let activations = evaluate_rules(&fuzzified, sentiment_variable());
        assert_eq!(activations.len(), 9);

        let forward = aggregate(activations.iter().map(|a| &a.output)).unwrap();
        let backward = aggregate(activations.iter().rev().map(|a| &a.output)).unwrap();
        let interleaved = aggregate(
            activations.iter().step_by(2).chain(activations.iter().skip(1).step_by(2)).map(|a| &a.output),
        )
        .unwrap();

        assert_eq!(forward, backward);
        assert_eq!(forward, interleaved);
    }

    #[test]
    fn test_aggregate_empty() {
        assert!(aggregate(std::iter::empty::<&MembershipFunction>()).is_none());
    }

    #[test]
    fn test_symmetric_shape_centroid() {
        let neutral = sentiment_variable().term(OutputTerm::Neutral);
        assert_relative_eq!(defuzzify(neutral).unwrap(), 5.0, epsilon = 1e-9);

        let clipped = neutral.clip(FuzzyValue::new(0.4));
        assert_relative_eq!(defuzzify(&clipped).unwrap(), 5.0, epsilon = 1e-9);
    }

    #[test]
    fn test_defuzzify_zero_mass() {
        let empty = sentiment_variable().term(OutputTerm::Neutral).clip(FuzzyValue::ZERO);
        let err = defuzzify(&empty).unwrap_err();
        assert_eq!(err.code, ErrorCode::ZeroMassAggregation);
    }
}
