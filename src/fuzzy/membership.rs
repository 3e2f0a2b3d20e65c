//! Discretized triangular membership functions.
//!
//! A membership function is a pair (universe, degrees): the universe is a
//! finite run of evenly spaced samples and the degrees hold one membership
//! value per sample. Fuzzification interpolates between samples.

use std::sync::Arc;

use crate::error::{ErrorCode, SentimentResult};
use crate::sentiment_ensure;

use super::FuzzyValue;

/// Number of samples in every universe of discourse
pub const UNIVERSE_SAMPLES: usize = 100;

/// An ordered, evenly spaced sampling of `[lo, hi]`
#[derive(Debug, Clone, PartialEq)]
pub struct Universe {
    lo: f64,
    hi: f64,
    points: Vec<f64>,
}

impl Universe {
    /// Sample `[lo, hi]` with the default resolution
    pub fn new(lo: f64, hi: f64) -> Self {
        Self::linspace(lo, hi, UNIVERSE_SAMPLES)
    }

    /// `n` evenly spaced samples from `lo` to `hi`, both ends included.
    ///
    /// When `lo == hi` every sample coincides.
    pub fn linspace(lo: f64, hi: f64, n: usize) -> Self {
        let points = match n {
            0 => Vec::new(),
            1 => vec![lo],
            _ => {
                let step = (hi - lo) / (n - 1) as f64;
                (0..n)
                    .map(|i| if i == n - 1 { hi } else { lo + i as f64 * step })
                    .collect()
            }
        };
        Self { lo, hi, points }
    }

    pub fn lo(&self) -> f64 {
        self.lo
    }

    pub fn hi(&self) -> f64 {
        self.hi
    }

    pub fn points(&self) -> &[f64] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Zero-width universe (all samples at one point)
    pub fn is_degenerate(&self) -> bool {
        self.lo == self.hi
    }
}

/// Triangle knots `a <= b <= c`: 0 at `a`, 1 at `b`, 0 at `c`.
///
/// `a == b` gives a left-shouldered (falling only) shape, `b == c` a
/// right-shouldered (rising only) one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl Triangle {
    /// Create a triangle, rejecting non-finite or unordered knots
    pub fn new(a: f64, b: f64, c: f64) -> SentimentResult<Self> {
        sentiment_ensure!(
            a.is_finite() && b.is_finite() && c.is_finite(),
            ErrorCode::InvalidDomain,
            "triangle knots must be finite, got ({}, {}, {})",
            a,
            b,
            c
        );
        sentiment_ensure!(
            a <= b && b <= c,
            ErrorCode::InvalidDomain,
            "triangle knots out of order: ({}, {}, {})",
            a,
            b,
            c
        );
        Ok(Self { a, b, c })
    }

    /// Membership of `x` in the continuous triangle
    pub fn sample(&self, x: f64) -> f64 {
        let Triangle { a, b, c } = *self;
        if x == b {
            1.0
        } else if a < x && x < b {
            (x - a) / (b - a)
        } else if b < x && x < c {
            (c - x) / (c - b)
        } else {
            0.0
        }
    }
}

/// Membership degrees sampled over a universe
#[derive(Debug, Clone, PartialEq)]
pub struct MembershipFunction {
    universe: Arc<Universe>,
    degrees: Vec<f64>,
}

impl MembershipFunction {
    /// Sample a triangle over the universe
    pub fn triangular(universe: Arc<Universe>, knots: &Triangle) -> Self {
        let degrees = universe.points().iter().map(|&x| knots.sample(x)).collect();
        Self { universe, degrees }
    }

    /// The empty fuzzy set (all degrees 0)
    pub fn zeros(universe: Arc<Universe>) -> Self {
        let degrees = vec![0.0; universe.len()];
        Self { universe, degrees }
    }

    pub fn universe(&self) -> &Universe {
        &self.universe
    }

    pub fn degrees(&self) -> &[f64] {
        &self.degrees
    }

    /// Membership degree of a crisp value.
    ///
    /// Interpolates linearly between the two samples bracketing `value` and
    /// returns 0 outside the universe.
    pub fn degree(&self, value: f64) -> FuzzyValue {
        let xs = self.universe.points();
        if xs.is_empty() || value.is_nan() {
            return FuzzyValue::ZERO;
        }

        let last = xs.len() - 1;
        if value < xs[0] || value > xs[last] {
            return FuzzyValue::ZERO;
        }
        if value == xs[last] {
            return FuzzyValue::new(self.degrees[last]);
        }

        let upper = xs.partition_point(|&x| x <= value);
        if upper == 0 || upper > last {
            return FuzzyValue::ZERO;
        }
        let lower = upper - 1;
        let (x0, x1) = (xs[lower], xs[upper]);
        let (y0, y1) = (self.degrees[lower], self.degrees[upper]);
        let t = (value - x0) / (x1 - x0);
        FuzzyValue::new(y0 + t * (y1 - y0))
    }

    /// Mamdani implication: cap every degree at `strength`
    pub fn clip(&self, strength: FuzzyValue) -> Self {
        Self {
            universe: Arc::clone(&self.universe),
            degrees: self
                .degrees
                .iter()
                .map(|&d| strength.implies_mamdani(&FuzzyValue::new(d)).value())
                .collect(),
        }
    }

    /// Fuzzy union in place (pointwise maximum)
    pub fn union_with(&mut self, other: &MembershipFunction) {
        debug_assert_eq!(self.degrees.len(), other.degrees.len());
        for (d, o) in self.degrees.iter_mut().zip(&other.degrees) {
            *d = FuzzyValue::new(*d).or(&FuzzyValue::new(*o)).value();
        }
    }

    /// Sum of all degrees
    pub fn mass(&self) -> f64 {
        self.degrees.iter().sum()
    }

    /// Largest degree
    pub fn height(&self) -> f64 {
        self.degrees.iter().copied().fold(0.0, f64::max)
    }

    /// Discrete centroid `sum(x * mu) / sum(mu)`, `None` when the set is empty
    pub fn centroid(&self) -> Option<f64> {
        let mass = self.mass();
        if mass <= 0.0 {
            return None;
        }
        let moment: f64 = self
            .universe
            .points()
            .iter()
            .zip(&self.degrees)
            .map(|(x, m)| x * m)
            .sum();
        Some(moment / mass)
    }
}
