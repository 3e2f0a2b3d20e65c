//! Fuzzy Sentiment - Mamdani fuzzy inference over lexical sentiment scores
//!
//! Turns a (positive, negative) score pair into a crisp sentiment score in
//! `[0, 10]` and a label (negative / neutral / positive).
//!
//! # Architecture
//!
//! - [`fuzzy`] - membership functions, rule table, per-item inference
//! - [`pipeline`] - batch runner: bounds, parallel inference, undefined policy
//! - [`report`] - per-label counts and timing
//! - [`io`] - CSV / JSON records
//! - [`config`] - TOML configuration
//! - [`error`] - structured errors
//!
//! Membership functions for the two inputs are built once per batch from the
//! batch's score ranges; the output variable is fixed and shared.
//!
//! # Example
//!
//! ```rust
//! use fuzzy_sentiment::{AxisBounds, SentimentEngine, SentimentLabel};
//!
//! let engine = SentimentEngine::from_bounds(
//!     AxisBounds::new(0.0, 2.0),
//!     AxisBounds::new(0.0, 2.0),
//! ).unwrap();
//!
//! let inference = engine.infer(2.0, 0.0).unwrap();
//! assert_eq!(inference.label, SentimentLabel::Positive);
//! ```

pub mod config;
pub mod error;
pub mod fuzzy;
pub mod io;
pub mod pipeline;
pub mod report;

pub use crate::config::{
    BatchConfig, ConfigError, GeneralConfig, LogLevel, OutputFormat, SentimentConfig, UndefinedPolicy,
};
pub use crate::error::{ErrorCode, ErrorContext, SentimentError, SentimentResult};
pub use crate::fuzzy::{
    classify, AxisBounds, FuzzyValue, Inference, InputTerm, LinguisticVariable, MembershipFunction,
    MembershipSet, OutputTerm, Rule, SentimentEngine, SentimentLabel,
};
pub use crate::io::{read_items, read_items_from_path, write_csv, write_json, ResultRecord};
pub use crate::pipeline::{batch_bounds, BatchOutput, BatchRunner, ItemOutcome, ItemResult, ScoredItem};
pub use crate::report::{BatchSummary, LabelStats};
