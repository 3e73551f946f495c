//! Error types for document conversion operations.
//!
//! Errors fall into three families that mirror the stages of the pipeline:
//! validation (nothing was extracted), extraction (the format library
//! rejected the file) and formatting (the record cannot be rendered in the
//! requested output). I/O and serialization failures wrap their source error.

use crate::validator::ValidationError;
use thiserror::Error;

/// Error types that can occur while converting a document into a dataset.
///
/// # Examples
///
/// ```rust,ignore
/// use docset_backend::DocumentConverter;
/// use docset_core::{DocsetError, OutputFormat};
///
/// match converter.process_file("report.xyz", OutputFormat::Json, None) {
///     Ok(output) => println!("{}", output.status_message()),
///     Err(DocsetError::Validation(e)) => eprintln!("Rejected: {e}"),
///     Err(DocsetError::Extraction(msg)) => eprintln!("{msg}"),
///     Err(e) => eprintln!("Other error: {e}"),
/// }
/// ```
#[derive(Error, Debug)]
pub enum DocsetError {
    /// The input file was rejected before extraction.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A format extractor failed; the message is the record's error text.
    #[error("{0}")]
    Extraction(String),

    /// The record cannot be rendered in the requested output format.
    #[error("{0}")]
    Formatting(String),

    /// Failure inside a format library (ZIP, XML, PDF, spreadsheet parser).
    ///
    /// Extractors convert this into an error record at their boundary, so
    /// it never reaches callers of the conversion pipeline.
    #[error("{0}")]
    Backend(String),

    /// Configuration file could not be read or parsed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// CSV reading or writing error.
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// ZIP archive error.
    #[error("ZIP error: {0}")]
    ZipError(#[from] zip::result::ZipError),
}

/// Type alias for [`Result<T, DocsetError>`].
pub type Result<T> = std::result::Result<T, DocsetError>;
