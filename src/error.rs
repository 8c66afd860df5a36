//! Structured error kinds surfaced by the merge pipeline.
//!
//! Every fatal condition aborts the pipeline and reaches the caller as a single
//! [`MergeError`]. Callers that need a machine-readable category use
//! [`MergeError::kind()`]; the `Display` impl carries the human message.
//!
//! An input that validates down to zero rows is not an error; see
//! [`crate::pipeline::MergeOutcome::NoValidData`].

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MergeError {
    /// Required columns are absent from the new-data header.
    #[error("Missing required column(s) in new data file: {}", .columns.join(", "))]
    MissingColumns { columns: Vec<String> },

    /// A line could not be split into fields.
    #[error("Malformed line ({reason}): {line}")]
    Parse { line: String, reason: String },

    /// Input bytes were not valid in the selected encoding.
    #[error("Failed to decode {source_name} as {encoding}")]
    Decode {
        source_name: String,
        encoding: &'static str,
    },

    #[error("Unknown encoding '{0}'")]
    UnknownEncoding(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MergeError {
    pub fn kind(&self) -> &'static str {
        match self {
            MergeError::MissingColumns { .. } => "missing_columns",
            MergeError::Parse { .. } => "parse",
            MergeError::Decode { .. } => "decode",
            MergeError::UnknownEncoding(_) => "unknown_encoding",
            MergeError::Io(_) => "io",
            MergeError::Csv(_) => "csv",
            MergeError::Json(_) => "json",
        }
    }

    pub(crate) fn parse(line: impl Into<String>, reason: impl Into<String>) -> Self {
        MergeError::Parse {
            line: line.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T, E = MergeError> = std::result::Result<T, E>;
