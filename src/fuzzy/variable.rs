//! Linguistic variables and the per-batch membership set.

use std::fmt;
use std::sync::{Arc, OnceLock};

use tracing::debug;

use crate::error::{ErrorCode, SentimentError, SentimentResult};
use crate::sentiment_ensure;

use super::membership::{MembershipFunction, Triangle, Universe};
use super::FuzzyValue;

/// Fixed universe of the `sentiment` output variable
pub const OUTPUT_RANGE: (f64, f64) = (0.0, 10.0);

/// A term of a three-term linguistic variable
pub trait LinguisticTerm: Copy + Eq + fmt::Debug + 'static {
    /// All terms in table order
    const ALL: [Self; 3];

    /// Position in [`Self::ALL`]
    fn index(self) -> usize;

    fn name(self) -> &'static str;
}

/// Terms of the two input variables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputTerm {
    Low,
    Medium,
    High,
}

impl LinguisticTerm for InputTerm {
    const ALL: [Self; 3] = [InputTerm::Low, InputTerm::Medium, InputTerm::High];

    fn index(self) -> usize {
        self as usize
    }

    fn name(self) -> &'static str {
        match self {
            InputTerm::Low => "low",
            InputTerm::Medium => "medium",
            InputTerm::High => "high",
        }
    }
}

/// Terms of the `sentiment` output variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputTerm {
    Negative,
    Neutral,
    Positive,
}

impl LinguisticTerm for OutputTerm {
    const ALL: [Self; 3] = [OutputTerm::Negative, OutputTerm::Neutral, OutputTerm::Positive];

    fn index(self) -> usize {
        self as usize
    }

    fn name(self) -> &'static str {
        match self {
            OutputTerm::Negative => "negative",
            OutputTerm::Neutral => "neutral",
            OutputTerm::Positive => "positive",
        }
    }
}

/// A named axis owning a universe and one membership function per term
#[derive(Debug, Clone)]
pub struct LinguisticVariable<T: LinguisticTerm> {
    name: &'static str,
    universe: Arc<Universe>,
    knots: [Triangle; 3],
    terms: [MembershipFunction; 3],
    _term: std::marker::PhantomData<T>,
}

impl<T: LinguisticTerm> LinguisticVariable<T> {
    /// Build the variable from one triangle per term, in [`LinguisticTerm::ALL`] order
    pub fn new(name: &'static str, universe: Universe, knots: [Triangle; 3]) -> Self {
        let universe = Arc::new(universe);
        let terms = knots.map(|k| MembershipFunction::triangular(Arc::clone(&universe), &k));
        Self {
            name,
            universe,
            knots,
            terms,
            _term: std::marker::PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn universe(&self) -> &Universe {
        &self.universe
    }

    pub fn term(&self, term: T) -> &MembershipFunction {
        &self.terms[term.index()]
    }

    pub fn knots(&self, term: T) -> Triangle {
        self.knots[term.index()]
    }

    /// Fuzzify a crisp value: membership in every term, in table order
    pub fn fuzzify(&self, value: f64) -> [FuzzyValue; 3] {
        T::ALL.map(|t| self.term(t).degree(value))
    }
}

impl LinguisticVariable<InputTerm> {
    /// Low/Medium/High over `[min, max]` with the peak of Medium at the midpoint
    pub fn input(name: &'static str, bounds: AxisBounds) -> SentimentResult<Self> {
        bounds.validate(name)?;
        let (min, max) = (bounds.min, bounds.max);
        let mid = bounds.mid();
        let knots = [
            Triangle::new(min, min, mid)?,
            Triangle::new(min, mid, max)?,
            Triangle::new(mid, max, max)?,
        ];
        Ok(Self::new(name, Universe::new(min, max), knots))
    }
}

fn build_sentiment_variable() -> LinguisticVariable<OutputTerm> {
    let (lo, hi) = OUTPUT_RANGE;
    let mid = (lo + hi) / 2.0;
    let knots = [
        Triangle { a: lo, b: lo, c: mid },
        Triangle { a: lo, b: mid, c: hi },
        Triangle { a: mid, b: hi, c: hi },
    ];
    LinguisticVariable::new("sentiment", Universe::new(lo, hi), knots)
}

/// The `sentiment` output variable, built once per process
pub fn sentiment_variable() -> &'static LinguisticVariable<OutputTerm> {
    static SENTIMENT: OnceLock<LinguisticVariable<OutputTerm>> = OnceLock::new();
    SENTIMENT.get_or_init(build_sentiment_variable)
}

/// Observed score range of one input axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisBounds {
    pub min: f64,
    pub max: f64,
}

impl AxisBounds {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Min/max over a sequence of scores, `None` if the sequence is empty
    pub fn from_scores<I: IntoIterator<Item = f64>>(scores: I) -> Option<Self> {
        scores.into_iter().fold(None, |acc, s| match acc {
            None => Some(Self::new(s, s)),
            Some(b) => Some(Self::new(b.min.min(s), b.max.max(s))),
        })
    }

    pub fn mid(&self) -> f64 {
        (self.min + self.max) / 2.0
    }

    /// Collapsed range (min == max)
    pub fn is_degenerate(&self) -> bool {
        self.min == self.max
    }

    /// Reject non-finite bounds, spans that overflow, and min > max
    pub fn validate(&self, axis: &str) -> SentimentResult<()> {
        sentiment_ensure!(
            self.min.is_finite() && self.max.is_finite(),
            ErrorCode::InvalidDomain,
            "{} bounds must be finite, got [{}, {}]",
            axis,
            self.min,
            self.max
        );
        sentiment_ensure!(
            (self.max - self.min).is_finite(),
            ErrorCode::InvalidDomain,
            "{} range [{}, {}] is too wide to sample",
            axis,
            self.min,
            self.max
        );
        if self.min > self.max {
            return Err(SentimentError::invalid_domain(format!(
                "{} min {} exceeds max {}",
                axis, self.min, self.max
            ))
            .with_context("axis", axis)
            .with_hint("Bounds come from the batch min/max; pass them as (min, max)"));
        }
        Ok(())
    }
}

impl fmt::Display for AxisBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}

/// Input variables for one batch plus the shared output variable.
///
/// Immutable after construction.
#[derive(Debug, Clone)]
pub struct MembershipSet {
    positive: LinguisticVariable<InputTerm>,
    negative: LinguisticVariable<InputTerm>,
}

impl MembershipSet {
    /// Build from the batch-wide score ranges
    pub fn build(pos_min: f64, pos_max: f64, neg_min: f64, neg_max: f64) -> SentimentResult<Self> {
        Self::from_bounds(AxisBounds::new(pos_min, pos_max), AxisBounds::new(neg_min, neg_max))
    }

    pub fn from_bounds(positive: AxisBounds, negative: AxisBounds) -> SentimentResult<Self> {
        let set = Self {
            positive: LinguisticVariable::input("positive", positive)?,
            negative: LinguisticVariable::input("negative", negative)?,
        };
        debug!(
            positive = %positive,
            negative = %negative,
            degenerate = positive.is_degenerate() || negative.is_degenerate(),
            "built membership set"
        );
        Ok(set)
    }

    pub fn positive(&self) -> &LinguisticVariable<InputTerm> {
        &self.positive
    }

    pub fn negative(&self) -> &LinguisticVariable<InputTerm> {
        &self.negative
    }

    pub fn sentiment(&self) -> &'static LinguisticVariable<OutputTerm> {
        sentiment_variable()
    }
}
