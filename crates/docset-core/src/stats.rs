//! Record statistics and tabular row selection.

use crate::error::{DocsetError, Result};
use crate::record::{DocumentType, ExtractionRecord, Row};
use serde::Serialize;
use std::borrow::Cow;
use std::fmt;

/// Summary numbers reported alongside every conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Statistics {
    pub document_type: DocumentType,
    /// Characters in the (possibly cleaned) full text
    pub text_length: usize,
    pub word_count: usize,
    pub has_tables: bool,
    pub table_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_paragraphs: Option<usize>,
}

impl Statistics {
    /// Compute statistics for a record.
    #[must_use = "returns the statistics without side effects"]
    pub fn from_record(record: &ExtractionRecord) -> Self {
        let total_pages = record.total_pages();
        Self {
            document_type: record.document_type,
            text_length: record.text_length(),
            word_count: record.word_count(),
            has_tables: record.has_tables(),
            table_count: record.table_count(),
            total_pages,
            total_paragraphs: if total_pages.is_some() {
                None
            } else {
                record.total_paragraphs()
            },
        }
    }
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "**Document Statistics**")?;
        writeln!(f)?;
        writeln!(f, "**Document Type:** {}", self.document_type)?;
        writeln!(f, "**Text Length:** {}", self.text_length)?;
        writeln!(f, "**Word Count:** {}", self.word_count)?;
        writeln!(f, "**Has Tables:** {}", self.has_tables)?;
        writeln!(f, "**Table Count:** {}", self.table_count)?;
        if let Some(pages) = self.total_pages {
            writeln!(f, "**Total Pages:** {pages}")?;
        }
        if let Some(paragraphs) = self.total_paragraphs {
            writeln!(f, "**Total Paragraphs:** {paragraphs}")?;
        }
        Ok(())
    }
}

/// Pick the rows to export as CSV.
///
/// Preference order: delimited-file rows, then workbook rows, then the
/// first table keyed by its header row (which needs at least one data row).
///
/// # Errors
///
/// Returns [`DocsetError::Formatting`] when the record has no usable rows.
pub fn select_tabular_rows(record: &ExtractionRecord) -> Result<Cow<'_, [Row]>> {
    let rows: Cow<'_, [Row]> = if let Some(rows) = &record.tabular_rows {
        Cow::Borrowed(rows.as_slice())
    } else if let Some(rows) = &record.all_data {
        Cow::Borrowed(rows.as_slice())
    } else {
        record
            .tables
            .as_ref()
            .and_then(|tables| tables.first())
            .and_then(|table| table.to_keyed_rows())
            .map_or(Cow::Borrowed(&[][..]), Cow::Owned)
    };

    if rows.is_empty() {
        return Err(DocsetError::Formatting(
            "No tabular data found for CSV export".to_string(),
        ));
    }
    Ok(rows)
}
