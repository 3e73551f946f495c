//! "AI training" projection of an extraction record.
//!
//! Bundles the document text with its metadata, a few coarse features and
//! whatever structured data the record carries. The projection borrows from
//! the record; serialize it with [`JsonSerializer`](super::JsonSerializer).

use crate::record::{DocumentType, ExtractionRecord, Metadata, Row, Table};
use serde::ser::{SerializeSeq, Serializer};
use serde::Serialize;

/// Coarse document features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrainingFeatures {
    pub document_type: DocumentType,
    pub word_count: usize,
    pub has_tables: bool,
    /// The document has page or paragraph structure
    pub has_structure: bool,
}

/// Structured payload: tables when the format produces them, else rows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StructuredData<'a> {
    Tables(&'a [Table]),
    Rows(&'a [Row]),
    Empty,
}

impl Serialize for StructuredData<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Tables(tables) => tables.serialize(serializer),
            Self::Rows(rows) => rows.serialize(serializer),
            Self::Empty => serializer.serialize_seq(Some(0))?.end(),
        }
    }
}

/// Training record borrowed from an [`ExtractionRecord`].
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TrainingRecord<'a> {
    pub input_text: &'a str,
    pub metadata: &'a Metadata,
    pub features: TrainingFeatures,
    pub structured_data: StructuredData<'a>,
}

/// Project a record into the training layout.
#[must_use = "returns the training record without side effects"]
pub fn to_training_record(record: &ExtractionRecord) -> TrainingRecord<'_> {
    let structured_data = if let Some(tables) = &record.tables {
        StructuredData::Tables(tables)
    } else if let Some(rows) = &record.tabular_rows {
        StructuredData::Rows(rows)
    } else {
        StructuredData::Empty
    };

    TrainingRecord {
        input_text: record.full_text.as_deref().unwrap_or_default(),
        metadata: &record.metadata,
        features: TrainingFeatures {
            document_type: record.document_type,
            word_count: record.word_count(),
            has_tables: record.has_tables(),
            has_structure: record.has_structure(),
        },
        structured_data,
    }
}
