//! Core trait definitions for format extractors

use docset_core::{DocsetError, DocumentType, ExtractionRecord, InputFormat, Metadata};
use std::path::Path;

/// Format extractor.
///
/// Implementors turn the raw bytes of one file into an [`ExtractionRecord`].
/// [`try_extract`](Self::try_extract) reports failures as errors;
/// [`extract`](Self::extract) folds them into an error record so callers
/// always receive a record.
pub trait DocumentExtractor {
    /// Document type of the records this extractor produces
    fn document_type(&self) -> DocumentType;

    /// Parse a document from bytes
    ///
    /// `format` is the validated input format of the file the bytes came from.
    ///
    /// # Errors
    /// Returns an error if parsing fails.
    fn parse_bytes(&self, data: &[u8], format: InputFormat) -> Result<ExtractionRecord, DocsetError>;

    /// Parse a document from a file path
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, its extension is not
    /// supported, or parsing fails.
    fn try_extract<P: AsRef<Path>>(&self, path: P) -> Result<ExtractionRecord, DocsetError> {
        let path = path.as_ref();
        let format = format_of(path)?;
        let data = std::fs::read(path).map_err(DocsetError::IoError)?;
        self.parse_bytes(&data, format)
    }

    /// Read only the document's metadata
    ///
    /// The default parses the whole document; extractors whose metadata
    /// lives in a separate part override this.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    fn metadata<P: AsRef<Path>>(&self, path: P) -> Result<Metadata, DocsetError> {
        self.try_extract(path).map(|record| record.metadata)
    }

    /// Extract a document, never failing
    ///
    /// Any error becomes `ExtractionRecord::failed` with the message
    /// `Failed to extract <noun>: <cause>`.
    fn extract<P: AsRef<Path>>(&self, path: P) -> ExtractionRecord {
        let path = path.as_ref();
        let document_type = self.document_type();
        match self.try_extract(path) {
            Ok(record) => record,
            Err(e) => {
                log::warn!("Extraction failed for {}: {e}", path.display());
                ExtractionRecord::failed(
                    document_type,
                    format!("Failed to extract {}: {e}", document_type.failure_noun()),
                )
            }
        }
    }
}

/// Input format from a path's extension.
///
/// # Errors
/// Returns [`DocsetError::Backend`] for missing or unsupported extensions.
pub fn format_of(path: &Path) -> Result<InputFormat, DocsetError> {
    path.extension()
        .and_then(|e| e.to_str())
        .and_then(InputFormat::from_extension)
        .ok_or_else(|| {
            DocsetError::Backend(format!("unsupported file extension: {}", path.display()))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Extractor that fails on empty input and echoes the format otherwise
    struct EchoExtractor;

    impl DocumentExtractor for EchoExtractor {
        fn document_type(&self) -> DocumentType {
            DocumentType::Text
        }

        fn parse_bytes(
            &self,
            data: &[u8],
            format: InputFormat,
        ) -> Result<ExtractionRecord, DocsetError> {
            if data.is_empty() {
                return Err(DocsetError::Backend("no content".to_string()));
            }
            let mut record = ExtractionRecord::new(DocumentType::Text);
            record.metadata.insert("file_extension", format.extension().to_uppercase());
            Ok(record)
        }
    }

    #[test]
    fn test_extract_folds_errors_into_record() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("empty.txt");
        std::fs::write(&path, b"").unwrap();

        let record = EchoExtractor.extract(&path);
        assert_eq!(
            record.error.as_deref(),
            Some("Failed to extract text file: no content")
        );
        assert_eq!(record.document_type, DocumentType::Text);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = EchoExtractor
            .try_extract(dir.path().join("missing.txt"))
            .unwrap_err();
        assert!(matches!(err, DocsetError::IoError(_)));
    }

    #[test]
    fn test_default_metadata_uses_full_parse() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"hi").unwrap();

        let metadata = EchoExtractor.metadata(&path).unwrap();
        assert_eq!(metadata.get("file_extension"), Some("TXT"));
    }

    #[test]
    fn test_format_of() {
        assert_eq!(format_of(Path::new("a/b.DOCX")).unwrap(), InputFormat::Docx);
        assert!(format_of(Path::new("a/b")).is_err());
        assert!(format_of(Path::new("a/b.rtf")).is_err());
    }
}
