//! CSV and JSON record I/O for batches.
//!
//! Input rows need `positive_score` and `negative_score`; `text` and
//! `target` are carried through when present.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{SentimentError, SentimentResult};
use crate::pipeline::{ItemOutcome, ItemResult, ScoredItem};

/// Label written for items without a score
pub const UNDEFINED_LABEL: &str = "undefined";
/// Label written for items that failed
pub const FAILED_LABEL: &str = "failed";

/// Flat output row, one per item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub text: Option<String>,
    pub target: Option<String>,
    pub positive_score: f64,
    pub negative_score: f64,
    pub sentiment_score: Option<f64>,
    pub sentiment_label: String,
    pub execution_time: f64,
}

impl From<&ItemResult> for ResultRecord {
    fn from(result: &ItemResult) -> Self {
        let (sentiment_score, sentiment_label) = match &result.outcome {
            ItemOutcome::Classified { score, label } => (Some(*score), label.as_str().to_string()),
            ItemOutcome::Undefined => (None, UNDEFINED_LABEL.to_string()),
            ItemOutcome::Failed { .. } => (None, FAILED_LABEL.to_string()),
        };
        Self {
            text: result.item.text.clone(),
            target: result.item.target.clone(),
            positive_score: result.item.positive_score,
            negative_score: result.item.negative_score,
            sentiment_score,
            sentiment_label,
            execution_time: result.elapsed_secs,
        }
    }
}

/// Read scored items from CSV
pub fn read_items<R: Read>(reader: R) -> SentimentResult<Vec<ScoredItem>> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut items = Vec::new();
    for row in rdr.deserialize() {
        let item: ScoredItem = row?;
        items.push(item);
    }
    Ok(items)
}

pub fn read_items_from_path(path: &Path) -> SentimentResult<Vec<ScoredItem>> {
    let file = File::open(path).map_err(|e| {
        SentimentError::from(e).with_context("path", path.display().to_string())
    })?;
    read_items(BufReader::new(file))
        .map_err(|e| e.with_context("path", path.display().to_string()))
}

/// Write one CSV row per result, with a header
pub fn write_csv<W: Write>(writer: W, results: &[ItemResult]) -> SentimentResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for result in results {
        wtr.serialize(ResultRecord::from(result))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write results as a pretty JSON array.
///
/// Unlike CSV, failed items keep their structured error.
pub fn write_json<W: Write>(writer: W, results: &[ItemResult]) -> SentimentResult<()> {
    let mut writer = BufWriter::new(writer);
    serde_json::to_writer_pretty(&mut writer, results)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
