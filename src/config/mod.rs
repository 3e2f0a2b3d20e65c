//! Configuration System for fuzzy-sentiment
//!
//! Supports:
//! - TOML configuration files
//! - Environment variable overrides
//! - Multiple config file locations
//!
//! Engine constants (universe resolution, output range, label thresholds)
//! are fixed and not configurable; only the surrounding batch behaviour is.
//!
//! # Configuration File Locations
//!
//! Searched in order (first found wins):
//! 1. `./fuzzy-sentiment.toml` - Project-local configuration
//! 2. `~/.config/fuzzy-sentiment/config.toml` - User configuration (XDG)
//! 3. `~/.fuzzy-sentiment/config.toml` - User configuration (legacy)
//! 4. `/etc/fuzzy-sentiment/config.toml` - System-wide configuration
//!
//! # Environment Variables
//!
//! - `FUZZY_SENTIMENT_LOG_LEVEL` - quiet, normal, verbose, debug
//! - `FUZZY_SENTIMENT_FORMAT` - csv, json, summary
//! - `FUZZY_SENTIMENT_THREADS` - worker threads (0 = one per core)
//! - `FUZZY_SENTIMENT_ON_UNDEFINED` - keep, skip, neutral, abort
//!
//! # Example Configuration
//!
//! ```toml
//! [general]
//! log_level = "verbose"
//! format = "json"
//!
//! [batch]
//! threads = 4
//! on_undefined = "skip"
//! summary = true
//! ```

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

// ============================================================================
// Configuration Schema
// ============================================================================

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SentimentConfig {
    /// General settings
    pub general: GeneralConfig,
    /// Batch processing settings
    pub batch: BatchConfig,
}

/// General configuration options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GeneralConfig {
    /// Logging level
    pub log_level: LogLevel,
    /// Output format for results
    pub format: OutputFormat,
}

/// Batch processing options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Worker threads for per-item inference (0 = rayon default)
    pub threads: usize,
    /// What to do with items whose sentiment is undefined
    pub on_undefined: UndefinedPolicy,
    /// Print the per-label timing summary to stderr after a run
    pub summary: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            threads: 0,
            on_undefined: UndefinedPolicy::Keep,
            summary: false,
        }
    }
}

// ============================================================================
// Enums
// ============================================================================

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One CSV row per item
    #[default]
    Csv,
    /// JSON array of result records
    Json,
    /// Only the per-label summary
    Summary,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
            OutputFormat::Summary => "summary",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "csv" => Some(OutputFormat::Csv),
            "json" => Some(OutputFormat::Json),
            "summary" | "report" => Some(OutputFormat::Summary),
            _ => None,
        }
    }
}

/// Log level options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Quiet,
    #[default]
    Normal,
    Verbose,
    Debug,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Quiet => "quiet",
            LogLevel::Normal => "normal",
            LogLevel::Verbose => "verbose",
            LogLevel::Debug => "debug",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "quiet" | "q" | "0" => Some(LogLevel::Quiet),
            "normal" | "n" | "1" => Some(LogLevel::Normal),
            "verbose" | "v" | "2" => Some(LogLevel::Verbose),
            "debug" | "d" | "3" => Some(LogLevel::Debug),
            _ => None,
        }
    }

    /// Most verbose `tracing` level emitted at this setting
    pub fn tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Quiet => tracing::Level::ERROR,
            LogLevel::Normal => tracing::Level::WARN,
            LogLevel::Verbose => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
        }
    }
}

/// Handling of items whose aggregated output has zero mass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UndefinedPolicy {
    /// Report the item as undefined
    #[default]
    Keep,
    /// Drop the item from the results
    Skip,
    /// Label the item neutral with the midpoint score
    Neutral,
    /// Fail the whole batch
    Abort,
}

impl UndefinedPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            UndefinedPolicy::Keep => "keep",
            UndefinedPolicy::Skip => "skip",
            UndefinedPolicy::Neutral => "neutral",
            UndefinedPolicy::Abort => "abort",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "keep" | "report" => Some(UndefinedPolicy::Keep),
            "skip" | "drop" => Some(UndefinedPolicy::Skip),
            "neutral" | "default" => Some(UndefinedPolicy::Neutral),
            "abort" | "fail" => Some(UndefinedPolicy::Abort),
            _ => None,
        }
    }
}

// ============================================================================
// Configuration Loading
// ============================================================================

impl SentimentConfig {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from the default locations, then apply environment overrides
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        for path in Self::config_paths() {
            if path.exists() {
                config = Self::load_from_file(&path)?;
                break;
            }
        }

        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(path.to_path_buf(), e.to_string()))?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::ParseError(path.to_path_buf(), e.to_string()))
    }

    /// Load configuration from a TOML string
    pub fn load_from_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content)
            .map_err(|e| ConfigError::ParseError(PathBuf::from("<string>"), e.to_string()))
    }

    /// Get the list of config file search paths
    pub fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("./fuzzy-sentiment.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("fuzzy-sentiment").join("config.toml"));
        }

        if let Some(home_dir) = dirs::home_dir() {
            paths.push(home_dir.join(".fuzzy-sentiment").join("config.toml"));
        }

        #[cfg(unix)]
        paths.push(PathBuf::from("/etc/fuzzy-sentiment/config.toml"));

        paths
    }

    /// Apply `FUZZY_SENTIMENT_*` environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides_from(|key| env::var(key).ok())
    }

    /// Apply overrides from any key lookup (environment, test fixtures)
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("FUZZY_SENTIMENT_LOG_LEVEL") {
            self.general.log_level = LogLevel::from_str(&val)
                .ok_or_else(|| ConfigError::invalid("FUZZY_SENTIMENT_LOG_LEVEL", &val))?;
        }

        if let Some(val) = lookup("FUZZY_SENTIMENT_FORMAT") {
            self.general.format = OutputFormat::from_str(&val)
                .ok_or_else(|| ConfigError::invalid("FUZZY_SENTIMENT_FORMAT", &val))?;
        }

        if let Some(val) = lookup("FUZZY_SENTIMENT_THREADS") {
            self.batch.threads = val
                .trim()
                .parse::<usize>()
                .map_err(|_| ConfigError::invalid("FUZZY_SENTIMENT_THREADS", &val))?;
        }

        if let Some(val) = lookup("FUZZY_SENTIMENT_ON_UNDEFINED") {
            self.batch.on_undefined = UndefinedPolicy::from_str(&val)
                .ok_or_else(|| ConfigError::invalid("FUZZY_SENTIMENT_ON_UNDEFINED", &val))?;
        }

        Ok(())
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::SerializeError(e.to_string()))
    }

    /// Generate a default configuration file content
    pub fn default_config_content() -> &'static str {
        r#"# fuzzy-sentiment configuration

[general]
# Logging level: quiet, normal, verbose, debug
log_level = "normal"
# Result format: csv, json, summary
format = "csv"

[batch]
# Worker threads for inference (0 = one per core)
threads = 0
# Items with undefined sentiment: keep, skip, neutral, abort
on_undefined = "keep"
# Print per-label counts and mean execution times to stderr
summary = false
"#
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Configuration errors
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// IO error reading/writing config file
    IoError(PathBuf, String),
    /// Parse error in config file
    ParseError(PathBuf, String),
    /// Serialization error
    SerializeError(String),
    /// Unrecognised value for a setting (setting, value)
    InvalidValue(String, String),
}

impl ConfigError {
    fn invalid(key: &str, value: &str) -> Self {
        ConfigError::InvalidValue(key.to_string(), value.to_string())
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(path, msg) => {
                write!(f, "IO error reading {}: {}", path.display(), msg)
            }
            ConfigError::ParseError(path, msg) => {
                write!(f, "Parse error in {}: {}", path.display(), msg)
            }
            ConfigError::SerializeError(msg) => {
                write!(f, "Serialization error: {}", msg)
            }
            ConfigError::InvalidValue(key, value) => {
                write!(f, "Invalid value for {}: {:?}", key, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = SentimentConfig::new();
        assert_eq!(config.general.log_level, LogLevel::Normal);
        assert_eq!(config.general.format, OutputFormat::Csv);
        assert_eq!(config.batch.threads, 0);
        assert_eq!(config.batch.on_undefined, UndefinedPolicy::Keep);
        assert!(!config.batch.summary);
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
            [general]
            format = "json"
            log_level = "verbose"

            [batch]
            threads = 4
            on_undefined = "skip"
        "#;

        let config = SentimentConfig::load_from_str(toml).unwrap();
        assert_eq!(config.general.format, OutputFormat::Json);
        assert_eq!(config.general.log_level, LogLevel::Verbose);
        assert_eq!(config.batch.threads, 4);
        assert_eq!(config.batch.on_undefined, UndefinedPolicy::Skip);
        assert!(!config.batch.summary);
    }

    #[test]
    fn test_default_content_round_trips() {
        let config = SentimentConfig::load_from_str(SentimentConfig::default_config_content()).unwrap();
        assert_eq!(config, SentimentConfig::default());
    }

    #[test]
    fn test_parse_error() {
        let result = SentimentConfig::load_from_str("[batch]\nthreads = \"many\"");
        assert!(matches!(result, Err(ConfigError::ParseError(_, _))));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("FUZZY_SENTIMENT_FORMAT", "summary"),
            ("FUZZY_SENTIMENT_THREADS", "8"),
            ("FUZZY_SENTIMENT_ON_UNDEFINED", "abort"),
        ]
        .into_iter()
        .collect();

        let mut config = SentimentConfig::new();
        config
            .apply_overrides_from(|k| vars.get(k).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.general.format, OutputFormat::Summary);
        assert_eq!(config.general.log_level, LogLevel::Normal);
        assert_eq!(config.batch.threads, 8);
        assert_eq!(config.batch.on_undefined, UndefinedPolicy::Abort);
    }

    #[test]
    fn test_invalid_env_override() {
        let mut config = SentimentConfig::new();
        let result = config.apply_overrides_from(|k| {
            (k == "FUZZY_SENTIMENT_THREADS").then(|| "lots".to_string())
        });
        assert_eq!(
            result,
            Err(ConfigError::InvalidValue("FUZZY_SENTIMENT_THREADS".into(), "lots".into()))
        );
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!(UndefinedPolicy::from_str("skip"), Some(UndefinedPolicy::Skip));
        assert_eq!(UndefinedPolicy::from_str("NEUTRAL"), Some(UndefinedPolicy::Neutral));
        assert_eq!(UndefinedPolicy::from_str("ignore"), None);
    }

    #[test]
    fn test_log_level_mapping() {
        assert_eq!(LogLevel::from_str("debug"), Some(LogLevel::Debug));
        assert_eq!(LogLevel::Quiet.tracing_level(), tracing::Level::ERROR);
        assert_eq!(LogLevel::Verbose.tracing_level(), tracing::Level::INFO);
    }

    #[test]
    fn test_serialize_config() {
        let toml = SentimentConfig::new().to_toml().unwrap();
        assert!(toml.contains("[general]"));
        assert!(toml.contains("[batch]"));
        assert!(toml.contains("on_undefined = \"keep\""));
    }

    #[test]
    fn test_config_paths() {
        let paths = SentimentConfig::config_paths();
        assert!(paths[0].ends_with("fuzzy-sentiment.toml"));
    }
}
