//! Error types for the cohort aggregation core.
//!
//! Every failure carries enough context (sample, file, column) for the caller
//! to correlate it with an input. The core never retries and never produces a
//! partial result for a failed sample.

use std::path::PathBuf;

/// Errors raised by the cohort aggregation core.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No input files matched the expected pattern for a sample.
    #[error("sample {sample}: no input files found for {pattern}")]
    NotFound { sample: u8, pattern: String },

    /// A caller contract violation, detected before any sample is processed.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// An 8-digit date field that does not encode a valid calendar date.
    /// Fails the whole file, and with it the sample being processed.
    #[error("{file:?}: column {column} holds unparseable date {value:?}")]
    MalformedDate {
        file: PathBuf,
        column: &'static str,
        value: String,
    },

    /// A consumed column is absent from an extract's header row.
    #[error("{file:?}: required column {column} missing from header")]
    MissingColumn { file: PathBuf, column: &'static str },

    /// A discovered beneficiary extract whose filename carries no source year.
    #[error("{path:?}: cannot extract a source year from filename")]
    UnrecognizedExtract { path: PathBuf },

    #[error("workspace error: {0}")]
    Workspace(#[from] duckdb::Error),

    #[error("csv decode error: {0}")]
    Csv(#[from] arrow::error::ArrowError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),
}

/// Result type for cohort aggregation operations.
pub type Result<T> = std::result::Result<T, Error>;
