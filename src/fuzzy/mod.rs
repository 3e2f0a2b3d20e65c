//! Fuzzy Sentiment Inference
//!
//! Mamdani inference over two crisp inputs (accumulated positive and
//! negative lexical scores) and one output (`sentiment` on [0, 10]):
//! - Triangular membership functions sampled over discretized universes
//! - Fuzzification by linear interpolation
//! - A fixed 3x3 rule table (min AND, min implication)
//! - Max aggregation and centroid defuzzification
//! - Threshold labelling
//!
//! The membership set is built once per batch and is read-only afterwards,
//! so one [`SentimentEngine`] can serve any number of worker threads.

pub mod classify;
pub mod inference;
pub mod membership;
pub mod rules;
pub mod variable;

pub use classify::{classify, SentimentLabel, NEGATIVE_THRESHOLD, POSITIVE_THRESHOLD};
pub use inference::{
    aggregate, defuzzify, evaluate_rules, fuzzify, Fuzzified, Inference, RuleActivation,
    SentimentEngine,
};
pub use membership::{MembershipFunction, Triangle, Universe, UNIVERSE_SAMPLES};
pub use rules::{Rule, RULE_TABLE};
pub use variable::{
    sentiment_variable, AxisBounds, InputTerm, LinguisticTerm, LinguisticVariable, MembershipSet,
    OutputTerm, OUTPUT_RANGE,
};

/// A fuzzy truth value in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct FuzzyValue(f64);

impl FuzzyValue {
    pub const ZERO: FuzzyValue = FuzzyValue(0.0);
    pub const ONE: FuzzyValue = FuzzyValue(1.0);

    pub fn new(value: f64) -> Self {
        // NaN means "no membership"
        if value.is_nan() {
            return Self::ZERO;
        }
        Self(value.clamp(0.0, 1.0))
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// Fuzzy AND (t-norm) - minimum
    pub fn and(&self, other: &Self) -> Self {
        Self(self.0.min(other.0))
    }

    /// Fuzzy OR (t-conorm) - maximum
    pub fn or(&self, other: &Self) -> Self {
        Self(self.0.max(other.0))
    }

    /// Fuzzy implication (Mamdani: min)
    pub fn implies_mamdani(&self, other: &Self) -> Self {
        self.and(other)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0.0
    }
}

impl Default for FuzzyValue {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<f64> for FuzzyValue {
    fn from(v: f64) -> Self {
        Self::new(v)
    }
}
