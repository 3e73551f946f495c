//! Format extractors and the conversion pipeline for docset
//!
//! This crate turns files into [`ExtractionRecord`]s and drives them through
//! the formatting layer of `docset-core`.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                        DocumentConverter                           │
//! │   validate → extract → clean → statistics → serialize → write      │
//! └─────────────────────────────────────────────────────────────────────┘
//!                                    │
//!                                    ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                     DocumentExtractor Trait                         │
//! │  fn parse_bytes(&self, data: &[u8], format) -> Result<Record>      │
//! │  fn extract(&self, path) -> ExtractionRecord   (never fails)       │
//! └─────────────────────────────────────────────────────────────────────┘
//!                                    │
//!        ┌──────────────┬────────────┼────────────┬──────────────┐
//!        ▼              ▼            ▼            ▼              ▼
//!  ┌───────────┐ ┌────────────┐ ┌──────────┐ ┌──────────┐ ┌──────────┐
//!  │    PDF    │ │    Word    │ │  Excel   │ │   Text   │ │   CSV    │
//!  │  (lopdf)  │ │ (zip+xml)  │ │(calamine)│ │(encoding)│ │  (csv)   │
//!  └───────────┘ └────────────┘ └──────────┘ └──────────┘ └──────────┘
//! ```
//!
//! # Supported Formats
//!
//! | Extension | Extractor | Notes |
//! |-----------|-----------|-------|
//! | `.pdf` | [`PdfExtractor`] | page text, layout-detected tables, Info metadata |
//! | `.docx` | [`WordExtractor`] | paragraphs with styles, tables, core properties |
//! | `.doc` | [`WordExtractor`] | accepted by validation; fails at extraction |
//! | `.xlsx`, `.xls` | [`ExcelExtractor`] | every sheet, column statistics |
//! | `.txt` | [`TextExtractor`] | encoding detection, numbered lines |
//! | `.csv` | [`CsvExtractor`] | encoding and delimiter detection |
//!
//! # Usage
//!
//! ```ignore
//! use docset_backend::{ConverterConfig, DocumentConverter};
//! use docset_core::OutputFormat;
//!
//! let converter = DocumentConverter::new(ConverterConfig::default());
//!
//! // One file
//! let output = converter.process_file("sales.xlsx", OutputFormat::Csv, None)?;
//! println!("{}", output.status_message());
//!
//! // Many files, archived together
//! let report = converter.process_batch(&["a.pdf", "b.docx"], OutputFormat::Json, None)?;
//! println!("{}", report.summary());
//! # Ok::<(), docset_core::DocsetError>(())
//! ```
//!
//! Individual extractors can be used directly:
//!
//! ```ignore
//! use docset_backend::{traits::DocumentExtractor, PdfExtractor};
//!
//! let record = PdfExtractor::new().extract("paper.pdf");
//! if let Some(error) = &record.error {
//!     eprintln!("{error}");
//! }
//! ```
//!
//! [`ExtractionRecord`]: docset_core::ExtractionRecord

pub mod config;
pub mod converter;
pub mod csv;
pub mod docx;
pub mod encoding;
pub mod extractor;
pub mod pdf;
pub mod table_detector;
pub mod text;
pub mod traits;
pub mod xlsx;

pub use config::{ConfigFile, ConverterConfig, CONFIG_FILE_NAME};
pub use converter::{
    BatchEntry, BatchOutcome, BatchReport, ConversionOutput, DocumentConverter,
    BATCH_ARCHIVE_NAME, PREVIEW_CHARS,
};
pub use csv::CsvExtractor;
pub use docx::WordExtractor;
pub use encoding::{detect_encoding, DetectedEncoding};
pub use extractor::Extractor;
pub use pdf::PdfExtractor;
pub use table_detector::{TableDetector, TableDetectorConfig, TextCell};
pub use text::TextExtractor;
pub use traits::DocumentExtractor;
pub use xlsx::ExcelExtractor;
