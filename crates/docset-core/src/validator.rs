//! Input file validation.
//!
//! A file is accepted when it exists, carries a supported extension and is
//! between one byte and [`MAX_FILE_SIZE`] bytes long. Checks run in that
//! order and the first failure is reported.

use crate::format::InputFormat;
use std::path::Path;
use thiserror::Error;

/// Largest accepted input file, in bytes (50 MiB, inclusive).
pub const MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Reason a file was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("File does not exist")]
    NotFound,

    /// `extension` includes the leading dot, or is empty when the file has none.
    #[error("Unsupported file type: {extension}. Supported types: {}", supported_extensions().join(", "))]
    Unsupported { extension: String },

    #[error(
        "File too large: {:.2}MB. Maximum size: {:.1}MB",
        bytes_to_mb(.size),
        bytes_to_mb(&MAX_FILE_SIZE)
    )]
    TooLarge { size: u64 },

    #[error("File is empty")]
    Empty,

    #[error("Error validating file: {0}")]
    Io(String),
}

#[allow(clippy::cast_precision_loss)] // file sizes are far below 2^52
fn bytes_to_mb(bytes: &u64) -> f64 {
    *bytes as f64 / BYTES_PER_MB
}

/// Lower-cased extension of `path` with its leading dot, or `""`.
fn dotted_extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_lowercase()))
        .unwrap_or_default()
}

fn detect_format(path: &Path) -> Option<InputFormat> {
    path.extension()
        .and_then(|e| e.to_str())
        .and_then(InputFormat::from_extension)
}

/// Validate an input file and return its format.
///
/// # Errors
///
/// Returns the first failing check as a [`ValidationError`].
pub fn validate_file(path: impl AsRef<Path>) -> Result<InputFormat, ValidationError> {
    let path = path.as_ref();

    if !path.is_file() {
        return Err(ValidationError::NotFound);
    }

    let format = detect_format(path).ok_or_else(|| ValidationError::Unsupported {
        extension: dotted_extension(path),
    })?;

    let size = std::fs::metadata(path)
        .map_err(|e| ValidationError::Io(e.to_string()))?
        .len();
    if size > MAX_FILE_SIZE {
        return Err(ValidationError::TooLarge { size });
    }
    if size == 0 {
        return Err(ValidationError::Empty);
    }

    log::debug!("Validated {} as {}", path.display(), format.label());
    Ok(format)
}

/// Message reported for a file that passed validation.
#[must_use = "returns the message without side effects"]
pub fn valid_message(format: InputFormat) -> String {
    format!("Valid {}", format.label())
}

/// File type label for a path, or `Unknown` for unsupported extensions.
#[must_use = "returns the label without side effects"]
pub fn file_type(path: impl AsRef<Path>) -> &'static str {
    detect_format(path.as_ref()).map_or("Unknown", |f| f.label())
}

/// Whether the path carries a supported extension. Does not touch the disk.
#[must_use = "returns whether the file is supported without side effects"]
pub fn is_supported(path: impl AsRef<Path>) -> bool {
    detect_format(path.as_ref()).is_some()
}

/// Supported extensions with their leading dot.
#[must_use = "returns the extension list without side effects"]
pub fn supported_extensions() -> Vec<String> {
    InputFormat::ALL
        .iter()
        .map(|f| format!(".{}", f.extension()))
        .collect()
}
