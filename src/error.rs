//! Structured Error Handling for fuzzy-sentiment
//!
//! Provides a unified error type with:
//! - Error codes for programmatic handling
//! - Structured, JSON-friendly error payloads
//! - Context preservation through error chains
//! - A split between batch-fatal and item-local failures
//!
//! # Error Categories
//!
//! - Domain errors (1xxx) - invalid score ranges, non-finite inputs, empty batches
//! - Inference errors (2xxx) - zero-mass aggregation, aborted batches
//! - I/O errors (3xxx) - reading and writing records
//! - Config errors (7xxx) - configuration issues
//!
//! # Example
//!
//! ```rust,ignore
//! use fuzzy_sentiment::error::{SentimentError, ErrorCode};
//!
//! fn check(min: f64, max: f64) -> Result<(), SentimentError> {
//!     if min > max {
//!         return Err(SentimentError::invalid_domain("min exceeds max")
//!             .with_context("min", min.to_string())
//!             .with_context("max", max.to_string()));
//!     }
//!     Ok(())
//! }
//! ```

use std::collections::HashMap;
use std::fmt;
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

// ============================================================================
// Error Codes
// ============================================================================

/// Unique error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Domain errors (1xxx)
    /// Score range with min > max, or triangle knots out of order
    InvalidDomain = 1000,
    /// NaN or infinite score
    NonFiniteScore = 1001,
    /// Batch without items
    EmptyBatch = 1002,

    // Inference errors (2xxx)
    /// Aggregated output has no mass, sentiment undefined
    ZeroMassAggregation = 2001,
    /// Batch stopped by the undefined-sentiment policy
    BatchAborted = 2002,

    // I/O errors (3xxx)
    /// Generic I/O error
    IoError = 3000,
    /// Malformed record or document
    InvalidFormat = 3001,
    /// File not found
    NotFound = 3002,

    // Config errors (7xxx)
    /// Generic config error
    ConfigError = 7000,
    /// Config file not found
    ConfigNotFound = 7001,
    /// Invalid config syntax
    InvalidConfigSyntax = 7002,
    /// Invalid config value
    InvalidConfigValue = 7004,

    // Internal errors (9xxx)
    /// Internal error
    InternalError = 9000,
}

impl ErrorCode {
    /// Get the numeric code value
    pub fn code(&self) -> u32 {
        *self as u32
    }

    /// Get a short description of the error code
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::InvalidDomain => "Invalid score domain",
            ErrorCode::NonFiniteScore => "Non-finite score",
            ErrorCode::EmptyBatch => "Empty batch",

            ErrorCode::ZeroMassAggregation => "Undefined sentiment (zero-mass aggregation)",
            ErrorCode::BatchAborted => "Batch aborted",

            ErrorCode::IoError => "I/O error",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::NotFound => "Not found",

            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::ConfigNotFound => "Configuration file not found",
            ErrorCode::InvalidConfigSyntax => "Invalid configuration syntax",
            ErrorCode::InvalidConfigValue => "Invalid configuration value",

            ErrorCode::InternalError => "Internal error",
        }
    }

    /// Whether a failure with this code is confined to a single item.
    ///
    /// Item-local failures are reported per item and never stop a batch.
    pub fn is_item_local(&self) -> bool {
        matches!(self, ErrorCode::NonFiniteScore | ErrorCode::ZeroMassAggregation)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

// ============================================================================
// Error Context
// ============================================================================

/// Additional context information for an error
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Key-value pairs of context information
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub fields: HashMap<String, String>,
    /// Source location (file:line)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Stack of error causes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub causes: Vec<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self::default()
    }
}

// ============================================================================
// Main Error Type
// ============================================================================

/// The main error type for fuzzy-sentiment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentError {
    /// Error code for programmatic handling
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Additional context
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<ErrorContext>,
    /// Hint for resolving the error
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl SentimentError {
    /// Create a new error with a code and message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: None,
            hint: None,
        }
    }

    // ========================================================================
    // Factory methods for common error types
    // ========================================================================

    /// Create an invalid domain error
    pub fn invalid_domain(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidDomain, message)
    }

    /// Create a non-finite score error
    pub fn non_finite(field: &str, value: f64) -> Self {
        Self::new(
            ErrorCode::NonFiniteScore,
            format!("{} must be finite, got {}", field, value),
        )
    }

    pub fn empty_batch() -> Self {
        Self::new(ErrorCode::EmptyBatch, "batch contains no items")
            .with_hint("Score ranges are computed over the whole batch; provide at least one item")
    }

    /// Create a zero-mass aggregation error
    pub fn zero_mass() -> Self {
        Self::new(
            ErrorCode::ZeroMassAggregation,
            "aggregated output has zero mass; sentiment is undefined",
        )
    }

    pub fn aborted(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BatchAborted, message)
    }

    /// Create an I/O error
    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::IoError, message)
    }

    /// Create a format error
    pub fn format(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidFormat, message)
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    // ========================================================================
    // Builder methods
    // ========================================================================

    /// Add context to the error
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let ctx = self.context.get_or_insert_with(ErrorContext::new);
        ctx.fields.insert(key.into(), value.into());
        self
    }

    /// Add a cause to the error chain
    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        let ctx = self.context.get_or_insert_with(ErrorContext::new);
        ctx.causes.push(cause.into());
        self
    }

    /// Add source location
    pub fn at(mut self, location: impl Into<String>) -> Self {
        let ctx = self.context.get_or_insert_with(ErrorContext::new);
        ctx.location = Some(location.into());
        self
    }

    /// Add a hint for resolving the error
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Whether this failure only concerns a single item
    pub fn is_item_local(&self) -> bool {
        self.code.is_item_local()
    }

    /// Whether this is the "undefined sentiment" outcome
    pub fn is_undefined_sentiment(&self) -> bool {
        self.code == ErrorCode::ZeroMassAggregation
    }
}

impl fmt::Display for SentimentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.code(), self.message)?;

        if let Some(ref ctx) = self.context {
            if let Some(ref loc) = ctx.location {
                write!(f, " at {}", loc)?;
            }
            if !ctx.causes.is_empty() {
                write!(f, "\nCaused by:")?;
                for cause in &ctx.causes {
                    write!(f, "\n  - {}", cause)?;
                }
            }
        }

        if let Some(ref hint) = self.hint {
            write!(f, "\nHint: {}", hint)?;
        }

        Ok(())
    }
}

impl std::error::Error for SentimentError {}

// ============================================================================
// Conversions from other error types
// ============================================================================

impl From<std::io::Error> for SentimentError {
    fn from(err: std::io::Error) -> Self {
        let code = match err.kind() {
            std::io::ErrorKind::NotFound => ErrorCode::NotFound,
            _ => ErrorCode::IoError,
        };
        SentimentError::new(code, err.to_string())
    }
}

impl From<serde_json::Error> for SentimentError {
    fn from(err: serde_json::Error) -> Self {
        SentimentError::format(err.to_string()).with_context("format", "JSON")
    }
}

impl From<csv::Error> for SentimentError {
    fn from(err: csv::Error) -> Self {
        let mut out = if err.is_io_error() {
            SentimentError::io(err.to_string())
        } else {
            SentimentError::format(err.to_string())
        };
        if let Some(pos) = err.position() {
            out = out.with_context("line", pos.line().to_string());
        }
        out.with_context("format", "CSV")
    }
}

impl From<ConfigError> for SentimentError {
    fn from(err: ConfigError) -> Self {
        let code = match err {
            ConfigError::IoError(..) => ErrorCode::ConfigNotFound,
            ConfigError::ParseError(..) => ErrorCode::InvalidConfigSyntax,
            ConfigError::InvalidValue(..) => ErrorCode::InvalidConfigValue,
            ConfigError::SerializeError(_) => ErrorCode::ConfigError,
        };
        SentimentError::new(code, err.to_string())
    }
}

// ============================================================================
// Result type alias
// ============================================================================

/// A Result type using SentimentError
pub type SentimentResult<T> = Result<T, SentimentError>;

// ============================================================================
// Macros for convenient error creation
// ============================================================================

/// Create a SentimentError with context from the current location
#[macro_export]
macro_rules! sentiment_error {
    ($code:expr, $msg:expr) => {
        $crate::error::SentimentError::new($code, $msg)
            .at(format!("{}:{}", file!(), line!()))
    };
    ($code:expr, $fmt:expr, $($arg:tt)*) => {
        $crate::error::SentimentError::new($code, format!($fmt, $($arg)*))
            .at(format!("{}:{}", file!(), line!()))
    };
}

/// Bail out early with an error
#[macro_export]
macro_rules! sentiment_bail {
    ($code:expr, $msg:expr) => {
        return Err($crate::sentiment_error!($code, $msg))
    };
    ($code:expr, $fmt:expr, $($arg:tt)*) => {
        return Err($crate::sentiment_error!($code, $fmt, $($arg)*))
    };
}

/// Ensure a condition holds, or return an error
#[macro_export]
macro_rules! sentiment_ensure {
    ($cond:expr, $code:expr, $msg:expr) => {
        if !$cond {
            $crate::sentiment_bail!($code, $msg);
        }
    };
    ($cond:expr, $code:expr, $fmt:expr, $($arg:tt)*) => {
        if !$cond {
            $crate::sentiment_bail!($code, $fmt, $($arg)*);
        }
    };
}

// ============================================================================
// Tests
// ============================================================================
