//! Dataset serialization module
//!
//! This module provides serializers for rendering extraction records as
//! JSON, CSV, XML and the AI training layout.

pub mod csv;
pub mod json;
pub mod training;
pub mod xml;

pub use csv::{write_csv, write_csv_to};
pub use json::{JsonOptions, JsonSerializer};
pub use training::{to_training_record, StructuredData, TrainingFeatures, TrainingRecord};
pub use xml::{sanitize_tag, XmlOptions, XmlSerializer, XML_DECLARATION};
