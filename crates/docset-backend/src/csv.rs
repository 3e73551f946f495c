//! CSV extractor
//!
//! Parses delimited text into keyed rows. The first record is the header;
//! each following record becomes a row mapping header names to cell text.
//!
//! # Features
//!
//! - Automatic encoding detection (BOM, UTF-8, legacy code pages)
//! - Comma-separated by default; a header line without commas falls back to
//!   the most frequent of `;`, `\t` and `|`
//! - Ragged rows: missing trailing cells become null, surplus cells are dropped

use crate::encoding::{decode_to_utf8, normalize_newlines};
use crate::traits::DocumentExtractor;
use docset_core::{
    DocsetError, DocumentType, ExtractionRecord, InputFormat, Row, Units, PREVIEW_ROWS,
};
use serde_json::Value;

/// Fallback delimiters for headers without a comma, in tie-breaking order
const FALLBACK_DELIMITERS: [char; 3] = [';', '\t', '|'];

/// CSV extractor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CsvExtractor;

impl CsvExtractor {
    /// Create a new CSV extractor instance
    #[inline]
    #[must_use = "creates an extractor instance that should be used for parsing"]
    pub const fn new() -> Self {
        Self
    }

    /// Detect the delimiter from the first line
    ///
    /// Any comma in the header means comma-separated. Otherwise the most
    /// frequent fallback candidate wins, ties going to the earlier one.
    #[must_use = "returns the detected delimiter without side effects"]
    pub fn detect_delimiter(content: &str) -> char {
        let first_line = content.lines().next().unwrap_or_default();
        if first_line.contains(',') {
            return ',';
        }

        let mut best_delimiter = ',';
        let mut max_count = 0;
        for &delim in &FALLBACK_DELIMITERS {
            let count = first_line.matches(delim).count();
            if count > max_count {
                max_count = count;
                best_delimiter = delim;
            }
        }
        best_delimiter
    }

    /// Read every record as a list of cell strings
    fn read_records(content: &str, delimiter: char) -> Result<Vec<Vec<String>>, DocsetError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter as u8)
            .flexible(true)
            .has_headers(false)
            .from_reader(content.as_bytes());

        reader
            .records()
            .map(|result| {
                result
                    .map(|record| record.iter().map(ToString::to_string).collect())
                    .map_err(|e| DocsetError::Backend(format!("Failed to read CSV record: {e}")))
            })
            .collect()
    }

    /// Key a record by the header, padding short records with null
    fn keyed_row(headers: &[String], cells: Vec<String>, line: usize) -> Row {
        if cells.len() > headers.len() {
            log::debug!(
                "CSV record {line} has {} cells for {} columns; dropping the surplus",
                cells.len(),
                headers.len()
            );
        }
        let mut cells = cells.into_iter();
        headers
            .iter()
            .map(|name| {
                let value = cells.next().map_or(Value::Null, Value::String);
                (name.clone(), value)
            })
            .collect()
    }
}

impl DocumentExtractor for CsvExtractor {
    #[inline]
    fn document_type(&self) -> DocumentType {
        DocumentType::Csv
    }

    fn parse_bytes(&self, data: &[u8], format: InputFormat) -> Result<ExtractionRecord, DocsetError> {
        let (decoded, encoding) = decode_to_utf8(data)?;
        let content = normalize_newlines(&decoded);
        let delimiter = Self::detect_delimiter(&content);

        let mut records = Self::read_records(&content, delimiter)?.into_iter();
        let headers = records.next().unwrap_or_default();
        let rows: Vec<Row> = records
            .enumerate()
            .map(|(i, cells)| Self::keyed_row(&headers, cells, i + 2))
            .collect();

        log::debug!(
            "CSV file: {} rows x {} columns, delimiter {delimiter:?}, encoding {encoding}",
            rows.len(),
            headers.len()
        );

        let mut record = ExtractionRecord::new(DocumentType::Csv);
        record.encoding = Some(encoding.label());
        record.units = Units::Preview(rows.iter().take(PREVIEW_ROWS).cloned().collect());
        record.headers = Some(headers);
        record.tabular_rows = Some(rows);
        record.metadata.insert("encoding", encoding.label());
        record
            .metadata
            .insert("file_extension", format.extension().to_uppercase());
        Ok(record)
    }
}
