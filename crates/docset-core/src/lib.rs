//! # Docset Core - Dataset Model and Formatting
//!
//! Docset turns office documents (PDF, Word, Excel, plain text, CSV) into
//! machine-readable datasets. This crate holds everything that does not
//! depend on a document parser:
//!
//! - [`ExtractionRecord`]: the normalized representation every extractor produces
//! - [`validator`]: extension, existence and size checks run before extraction
//! - [`cleaner`]: configurable regex-based text cleanup
//! - [`serializer`]: JSON, CSV, XML and AI-training renderings
//! - [`stats`]: per-record statistics and CSV row selection
//!
//! The extractors and the conversion pipeline live in `docset-backend`.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use docset_backend::{ConverterConfig, DocumentConverter};
//! use docset_core::OutputFormat;
//!
//! fn main() -> docset_core::Result<()> {
//!     let converter = DocumentConverter::new(ConverterConfig::default());
//!     let output = converter.process_file("report.pdf", OutputFormat::Json, None)?;
//!
//!     println!("{}", output.status_message());
//!     println!("{}", output.statistics);
//!     Ok(())
//! }
//! ```
//!
//! ## Output formats
//!
//! | Format | Artifact | Content |
//! |--------|----------|---------|
//! | JSON | `<name>_converted.json` | the whole record, pretty-printed |
//! | CSV | `<name>_converted.csv` | tabular rows only |
//! | XML | `<name>_converted.xml` | the whole record as nested elements |
//! | AI Training Format | `<name>_ai_training.json` | text, metadata, features, structured data |

pub mod cleaner;
pub mod error;
pub mod format;
pub mod record;
pub mod serializer;
pub mod stats;
pub mod validator;

pub use cleaner::{clean_text, CleaningOptions};
pub use error::{DocsetError, Result};
pub use format::{InputFormat, OutputFormat};
pub use record::{
    word_count, DocumentType, ExtractionRecord, LineUnit, Metadata, NumericSummary, PageUnit,
    ParagraphUnit, Row, Sheet, SheetStatistics, Table, Units, PREVIEW_ROWS,
};
pub use serializer::{
    to_training_record, write_csv, JsonOptions, JsonSerializer, TrainingRecord, XmlSerializer,
};
pub use stats::{select_tabular_rows, Statistics};
pub use validator::{validate_file, ValidationError, MAX_FILE_SIZE};
