//! Plain text extractor
//!
//! Decodes the file with the detected encoding, applies universal newline
//! translation and records every non-blank line with its 1-based position.

use crate::encoding::{decode_to_utf8, normalize_newlines};
use crate::traits::DocumentExtractor;
use docset_core::{DocsetError, DocumentType, ExtractionRecord, InputFormat, LineUnit, Units};

/// Plain text extractor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TextExtractor;

impl TextExtractor {
    /// Create a new text extractor instance
    #[inline]
    #[must_use = "creates an extractor instance that should be used for parsing"]
    pub const fn new() -> Self {
        Self
    }
}

impl DocumentExtractor for TextExtractor {
    #[inline]
    fn document_type(&self) -> DocumentType {
        DocumentType::Text
    }

    fn parse_bytes(&self, data: &[u8], format: InputFormat) -> Result<ExtractionRecord, DocsetError> {
        let (decoded, encoding) = decode_to_utf8(data)?;
        let content = normalize_newlines(&decoded);

        let raw_lines: Vec<&str> = content.split('\n').collect();
        let lines: Vec<LineUnit> = raw_lines
            .iter()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| LineUnit {
                line_number: i + 1,
                text: (*line).to_string(),
            })
            .collect();

        log::debug!(
            "Text file: {} lines ({} non-blank), encoding {encoding}",
            raw_lines.len(),
            lines.len()
        );

        let mut record = ExtractionRecord::new(DocumentType::Text);
        record.encoding = Some(encoding.label());
        record.total_lines = Some(raw_lines.len());
        record.units = Units::Lines(lines);
        record.full_text = Some(content);
        record.metadata.insert("encoding", encoding.label());
        record
            .metadata
            .insert("file_extension", format.extension().to_uppercase());
        Ok(record)
    }
}
