//! Extractor selection by input format

use crate::csv::CsvExtractor;
use crate::docx::WordExtractor;
use crate::pdf::PdfExtractor;
use crate::text::TextExtractor;
use crate::traits::DocumentExtractor;
use crate::xlsx::ExcelExtractor;
use docset_core::{DocsetError, DocumentType, ExtractionRecord, InputFormat};

/// One extractor per document family
///
/// [`DocumentExtractor`] has generic methods, so extractors are dispatched
/// through this enum rather than trait objects.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Extractor {
    Pdf(PdfExtractor),
    Word(WordExtractor),
    Excel(ExcelExtractor),
    Text(TextExtractor),
    Csv(CsvExtractor),
}

impl Extractor {
    /// Extractor for a validated input format
    #[must_use = "returns the extractor for the format"]
    pub fn for_format(format: InputFormat) -> Self {
        match format {
            InputFormat::Pdf => Self::Pdf(PdfExtractor::new()),
            InputFormat::Docx | InputFormat::Doc => Self::Word(WordExtractor::new()),
            InputFormat::Xlsx | InputFormat::Xls => Self::Excel(ExcelExtractor::new()),
            InputFormat::Txt => Self::Text(TextExtractor::new()),
            InputFormat::Csv => Self::Csv(CsvExtractor::new()),
        }
    }
}

impl DocumentExtractor for Extractor {
    fn document_type(&self) -> DocumentType {
        match self {
            Self::Pdf(e) => e.document_type(),
            Self::Word(e) => e.document_type(),
            Self::Excel(e) => e.document_type(),
            Self::Text(e) => e.document_type(),
            Self::Csv(e) => e.document_type(),
        }
    }

    fn parse_bytes(&self, data: &[u8], format: InputFormat) -> Result<ExtractionRecord, DocsetError> {
        match self {
            Self::Pdf(e) => e.parse_bytes(data, format),
            Self::Word(e) => e.parse_bytes(data, format),
            Self::Excel(e) => e.parse_bytes(data, format),
            Self::Text(e) => e.parse_bytes(data, format),
            Self::Csv(e) => e.parse_bytes(data, format),
        }
    }

    fn metadata<P: AsRef<std::path::Path>>(
        &self,
        path: P,
    ) -> Result<docset_core::Metadata, DocsetError> {
        match self {
            Self::Pdf(e) => e.metadata(path),
            Self::Word(e) => e.metadata(path),
            Self::Excel(e) => e.metadata(path),
            Self::Text(e) => e.metadata(path),
            Self::Csv(e) => e.metadata(path),
        }
    }
}
