//! Fuzzy Sentiment
//!
//! Command-line interface for batch and single-item sentiment inference.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use tracing::warn;

use fuzzy_sentiment::{
    read_items, read_items_from_path, write_csv, write_json, AxisBounds, BatchRunner, BatchSummary,
    LogLevel, OutputFormat, SentimentConfig, SentimentEngine, UndefinedPolicy,
};

#[derive(Parser)]
#[command(name = "fuzzy-sentiment")]
#[command(version)]
#[command(about = "Fuzzy-logic sentiment scoring of (positive, negative) lexical scores", long_about = None)]
struct Cli {
    /// Input CSV with positive_score and negative_score columns (stdin when absent)
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum)]
    format: Option<FormatArg>,

    /// Configuration file (skips the default search path)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Worker threads (0 for one per core)
    #[arg(long, value_name = "N")]
    threads: Option<usize>,

    /// What to do with items whose sentiment is undefined
    #[arg(long, value_enum, value_name = "POLICY")]
    on_undefined: Option<PolicyArg>,

    /// Print the batch summary to stderr after the run
    #[arg(long)]
    summary: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode (errors only)
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Print the default configuration and exit
    #[arg(long)]
    init_config: bool,

    /// Print the effective configuration (after file, environment and flags) and exit
    #[arg(long)]
    show_config: bool,

    /// Score a single item instead of a batch
    #[arg(
        long,
        num_args = 2,
        value_names = ["POS", "NEG"],
        allow_negative_numbers = true,
        requires_all = ["pos_range", "neg_range"]
    )]
    score: Option<Vec<f64>>,

    /// Positive score range; with --neg-range, replaces batch-derived bounds
    #[arg(long, num_args = 2, value_names = ["MIN", "MAX"], allow_negative_numbers = true)]
    pos_range: Option<Vec<f64>>,

    /// Negative score range
    #[arg(long, num_args = 2, value_names = ["MIN", "MAX"], allow_negative_numbers = true)]
    neg_range: Option<Vec<f64>>,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    /// One CSV row per item
    Csv,
    /// JSON array of results
    Json,
    /// Per-label counts and timing only
    Summary,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Csv => OutputFormat::Csv,
            FormatArg::Json => OutputFormat::Json,
            FormatArg::Summary => OutputFormat::Summary,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum PolicyArg {
    /// Report the item as undefined
    Keep,
    /// Drop the item from the results
    Skip,
    /// Score 5, label neutral
    Neutral,
    /// Fail the batch
    Abort,
}

impl From<PolicyArg> for UndefinedPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Keep => UndefinedPolicy::Keep,
            PolicyArg::Skip => UndefinedPolicy::Skip,
            PolicyArg::Neutral => UndefinedPolicy::Neutral,
            PolicyArg::Abort => UndefinedPolicy::Abort,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.init_config {
        print!("{}", SentimentConfig::default_config_content());
        return Ok(());
    }

    let config = load_config(&cli)?;
    if cli.show_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    tracing_subscriber::fmt()
        .with_max_level(config.general.log_level.tracing_level())
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    match &cli.score {
        Some(score) => score_one(&cli, &config, score),
        None => run_batch(&cli, &config),
    }
}

/// Defaults, then config file and environment, then flags
fn load_config(cli: &Cli) -> Result<SentimentConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let mut config = SentimentConfig::load_from_file(path)
                .with_context(|| format!("Failed to load config: {}", path.display()))?;
            config.apply_env_overrides()?;
            config
        }
        None => SentimentConfig::load().context("Failed to load configuration")?,
    };

    if let Some(format) = cli.format {
        config.general.format = format.into();
    }
    if let Some(threads) = cli.threads {
        config.batch.threads = threads;
    }
    if let Some(policy) = cli.on_undefined {
        config.batch.on_undefined = policy.into();
    }
    if cli.summary {
        config.batch.summary = true;
    }
    if cli.verbose {
        config.general.log_level = LogLevel::Verbose;
    } else if cli.quiet {
        config.general.log_level = LogLevel::Quiet;
    }

    Ok(config)
}

fn bounds(range: &Option<Vec<f64>>) -> Option<AxisBounds> {
    match range.as_deref() {
        Some([min, max]) => Some(AxisBounds::new(*min, *max)),
        _ => None,
    }
}

fn open_output(cli: &Cli) -> Result<Box<dyn Write>> {
    Ok(match &cli.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create output file: {}", path.display()))?,
        )),
        None => Box::new(io::stdout().lock()),
    })
}

fn score_one(cli: &Cli, config: &SentimentConfig, score: &[f64]) -> Result<()> {
    let (Some(positive), Some(negative)) = (bounds(&cli.pos_range), bounds(&cli.neg_range)) else {
        bail!("--score needs both --pos-range and --neg-range");
    };
    let [pos, neg] = score else {
        bail!("--score takes exactly two values");
    };

    let engine = SentimentEngine::from_bounds(positive, negative)?;
    let mut out = open_output(cli)?;

    match engine.infer(*pos, *neg) {
        Ok(inference) => match config.general.format {
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut out, &inference)?;
                writeln!(out)?;
            }
            _ => writeln!(out, "{:.6}\t{}", inference.score, inference.label)?,
        },
        Err(e) if e.is_undefined_sentiment() => {
            warn!(positive = pos, negative = neg, "sentiment undefined");
            writeln!(out, "undefined")?;
        }
        Err(e) => return Err(e.into()),
    }
    out.flush()?;
    Ok(())
}

fn run_batch(cli: &Cli, config: &SentimentConfig) -> Result<()> {
    let items = match &cli.input {
        Some(path) => read_items_from_path(path)
            .with_context(|| format!("Failed to read input: {}", path.display()))?,
        None => read_items(io::stdin().lock()).context("Failed to read from stdin")?,
    };

    let runner = BatchRunner::from_config(&config.batch);
    let output = match (bounds(&cli.pos_range), bounds(&cli.neg_range)) {
        (Some(positive), Some(negative)) => {
            let engine = SentimentEngine::from_bounds(positive, negative)?;
            runner.run_with_engine(&engine, items)?
        }
        _ => runner.run(items)?,
    };

    let summary = BatchSummary::from_results(&output.results);
    let mut out = open_output(cli)?;

    match config.general.format {
        OutputFormat::Csv => write_csv(&mut out, &output.results)?,
        OutputFormat::Json => write_json(&mut out, &output.results)?,
        OutputFormat::Summary => writeln!(out, "{}", summary)?,
    }
    out.flush()?;

    if config.batch.summary {
        match config.general.format {
            OutputFormat::Summary => {}
            OutputFormat::Json => eprintln!("{}", summary.to_json()?),
            OutputFormat::Csv => eprintln!("{}", summary),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_score_args() {
        let cli = Cli::try_parse_from([
            "fuzzy-sentiment", "--score", "1.5", "-0.5", "--pos-range", "0", "2", "--neg-range", "-1", "1",
        ])
        .unwrap();
        assert_eq!(cli.score, Some(vec![1.5, -0.5]));
        assert_eq!(bounds(&cli.neg_range), Some(AxisBounds::new(-1.0, 1.0)));
    }

    #[test]
    fn test_score_requires_ranges() {
        assert!(Cli::try_parse_from(["fuzzy-sentiment", "--score", "1", "0"]).is_err());
    }

    fn write_config(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("fuzzy-sentiment-{}-{}.toml", name, std::process::id()));
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_flags_override_config() {
        let path = write_config(
            "precedence",
            "[general]\nformat = \"csv\"\nlog_level = \"debug\"\n\n[batch]\nthreads = 2\non_undefined = \"abort\"\nsummary = true\n",
        );
        let path_arg = path.to_string_lossy().to_string();

        let cli = Cli::try_parse_from([
            "fuzzy-sentiment", "--config", path_arg.as_str(), "-f", "json", "--threads", "3", "--on-undefined", "skip",
        ])
        .unwrap();
        let config = load_config(&cli).unwrap();
        assert_eq!(config.general.format, OutputFormat::Json);
        assert_eq!(config.batch.threads, 3);
        assert_eq!(config.batch.on_undefined, UndefinedPolicy::Skip);
        // flags not given keep the file's values
        assert!(config.batch.summary);
        assert_eq!(config.general.log_level, LogLevel::Debug);

        let cli = Cli::try_parse_from(["fuzzy-sentiment", "--config", path_arg.as_str()]).unwrap();
        let config = load_config(&cli).unwrap();
        assert_eq!(config.general.format, OutputFormat::Csv);
        assert_eq!(config.batch.threads, 2);
        assert_eq!(config.batch.on_undefined, UndefinedPolicy::Abort);

        let cli = Cli::try_parse_from(["fuzzy-sentiment", "--config", path_arg.as_str(), "-q"]).unwrap();
        assert_eq!(load_config(&cli).unwrap().general.log_level, LogLevel::Quiet);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_missing_config_file() {
        let cli = Cli::try_parse_from(["fuzzy-sentiment", "--config", "/nonexistent/fuzzy-sentiment.toml"]).unwrap();
        assert!(load_config(&cli).is_err());
    }

    #[test]
    fn test_policy_arg() {
        let cli = Cli::try_parse_from(["fuzzy-sentiment", "--on-undefined", "neutral"]).unwrap();
        assert_eq!(cli.on_undefined.map(UndefinedPolicy::from), Some(UndefinedPolicy::Neutral));
    }
}
