//! CSV export of batch results.
//!
//! One row per prompt, every field quoted, flushed as soon as it is written so
//! an interrupted batch still leaves a readable file.

use std::{fs::File, io::Write, path::Path};

use chrono::Local;
use csv::{QuoteStyle, Writer, WriterBuilder};
use serde::Serialize;
use thiserror::Error;

use crate::pipeline::PipelineResult;

/// Characters of response text kept in a row.
pub const RESPONSE_PREVIEW_CHARS: usize = 300;

const HEADER: [&str; 6] = [
    "Test#",
    "Prompt",
    "Model Used",
    "Response (First 300 chars)",
    "Status",
    "Timestamp",
];

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RecordStatus {
    Success,
    Failed,
}

/// One CSV row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultRecord {
    pub test_number: u32,
    pub prompt: String,
    pub model: String,
    pub response: String,
    pub status: RecordStatus,
    pub timestamp: String,
}

impl ResultRecord {
    /// Build a row from a pipeline run, stamped with the local time.
    pub fn from_pipeline(test_number: u32, result: &PipelineResult) -> Self {
        let status = if result.is_completed() {
            RecordStatus::Success
        } else {
            RecordStatus::Failed
        };

        Self {
            test_number,
            prompt: result.state.prompt.clone(),
            model: result.model().to_string(),
            response: truncate_response(result.response()),
            status,
            timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
        }
    }
}

/// Flatten line breaks and keep the first [`RESPONSE_PREVIEW_CHARS`]
/// characters, appending `...` when the original text was longer than that.
pub fn truncate_response(text: &str) -> String {
    let was_long = text.chars().count() > RESPONSE_PREVIEW_CHARS;
    let flattened = text.replace('\n', " ").replace('\r', "");

    let mut preview = match flattened.char_indices().nth(RESPONSE_PREVIEW_CHARS) {
        Some((cut, _)) => flattened[..cut].to_string(),
        None => flattened,
    };
    if was_long {
        preview.push_str("...");
    }
    preview
}

/// Writes [`ResultRecord`]s as CSV.
pub struct ResultSink<W: Write> {
    writer: Writer<W>,
    rows: usize,
}

impl ResultSink<File> {
    /// Create (or truncate) a CSV file and write the header.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, ResultSinkError> {
        let file = File::create(path.as_ref())
            .map_err(|e| ResultSinkError::Io(e, path.as_ref().display().to_string()))?;
        Self::new(file)
    }
}

impl<W: Write> ResultSink<W> {
    /// Wrap a writer and write the header row.
    pub fn new(inner: W) -> Result<Self, ResultSinkError> {
        let mut writer = WriterBuilder::new()
            .quote_style(QuoteStyle::Always)
            .has_headers(false)
            .from_writer(inner);
        writer.write_record(HEADER)?;
        writer.flush().map_err(ResultSinkError::Flush)?;

        Ok(Self { writer, rows: 0 })
    }

    /// Append one row and flush it.
    pub fn write(&mut self, record: &ResultRecord) -> Result<(), ResultSinkError> {
        self.writer.serialize(record)?;
        self.writer.flush().map_err(ResultSinkError::Flush)?;
        self.rows += 1;
        Ok(())
    }

    /// Rows written so far, header excluded.
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn into_inner(self) -> Result<W, ResultSinkError> {
        self.writer
            .into_inner()
            .map_err(|e| ResultSinkError::Flush(std::io::Error::other(e.to_string())))
    }
}

/// Errors writing batch results.
#[derive(Debug, Error)]
pub enum ResultSinkError {
    #[error("Failed to create results file {1}: {0}")]
    Io(std::io::Error, String),

    #[error("Failed to write CSV row: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to flush results: {0}")]
    Flush(std::io::Error),
}
