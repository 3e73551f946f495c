//! Input and output format types.
//!
//! `InputFormat` is the closed set of document types the validator accepts,
//! `OutputFormat` the closed set of dataset renderings the formatter produces.

use serde::{Deserialize, Serialize};

/// Input document format, keyed by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputFormat {
    /// PDF document
    #[serde(rename = "PDF")]
    Pdf,
    /// Microsoft Word document (.docx)
    #[serde(rename = "DOCX")]
    Docx,
    /// Microsoft Word 97-2003 document (.doc)
    #[serde(rename = "DOC")]
    Doc,
    /// Microsoft Excel workbook (.xlsx)
    #[serde(rename = "XLSX")]
    Xlsx,
    /// Microsoft Excel 97-2003 workbook (.xls)
    #[serde(rename = "XLS")]
    Xls,
    /// Comma-separated values
    #[serde(rename = "CSV")]
    Csv,
    /// Plain text
    #[serde(rename = "TXT")]
    Txt,
}

impl InputFormat {
    /// Every supported input format, in the order extensions are reported.
    pub const ALL: [Self; 7] = [
        Self::Pdf,
        Self::Docx,
        Self::Doc,
        Self::Xlsx,
        Self::Xls,
        Self::Csv,
        Self::Txt,
    ];

    /// Look up a format by file extension (without the leading dot).
    #[inline]
    #[must_use = "returns the detected format without side effects"]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            "doc" => Some(Self::Doc),
            "xlsx" => Some(Self::Xlsx),
            "xls" => Some(Self::Xls),
            "csv" => Some(Self::Csv),
            "txt" => Some(Self::Txt),
            _ => None,
        }
    }

    /// Canonical lower-case extension.
    #[inline]
    #[must_use = "returns the extension without side effects"]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
            Self::Doc => "doc",
            Self::Xlsx => "xlsx",
            Self::Xls => "xls",
            Self::Csv => "csv",
            Self::Txt => "txt",
        }
    }

    /// Human-readable file type label used in validation messages.
    #[inline]
    #[must_use = "returns the label without side effects"]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Pdf => "PDF Document",
            Self::Docx => "Word Document",
            Self::Doc => "Word Document (Legacy)",
            Self::Xlsx => "Excel Spreadsheet",
            Self::Xls => "Excel Spreadsheet (Legacy)",
            Self::Csv => "CSV File",
            Self::Txt => "Text File",
        }
    }

    /// Whether this is one of the pre-2007 binary Office formats.
    #[inline]
    #[must_use = "returns whether the format is legacy without side effects"]
    pub const fn is_legacy(&self) -> bool {
        matches!(self, Self::Doc | Self::Xls)
    }
}

impl std::fmt::Display for InputFormat {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.extension().to_uppercase())
    }
}

/// Output dataset format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Pretty-printed JSON of the whole record
    #[default]
    #[serde(rename = "JSON", alias = "json")]
    Json,
    /// Tabular rows as CSV
    #[serde(rename = "CSV", alias = "csv")]
    Csv,
    /// XML rendering of the whole record
    #[serde(rename = "XML", alias = "xml")]
    Xml,
    /// Text + metadata + features bundle for model training
    #[serde(
        rename = "AI Training Format",
        alias = "ai training format",
        alias = "ai_training"
    )]
    AiTraining,
}

impl OutputFormat {
    /// Artifact name suffix placed between the input stem and the extension.
    #[inline]
    #[must_use = "returns the suffix without side effects"]
    pub const fn suffix(&self) -> &'static str {
        match self {
            Self::Json | Self::Csv | Self::Xml => "converted",
            Self::AiTraining => "ai_training",
        }
    }

    /// File extension of the written artifact.
    #[inline]
    #[must_use = "returns the extension without side effects"]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Json | Self::AiTraining => "json",
            Self::Csv => "csv",
            Self::Xml => "xml",
        }
    }

    /// Build the artifact file name for an input file stem.
    #[must_use = "returns the file name without side effects"]
    pub fn artifact_name(&self, stem: &str) -> String {
        format!("{stem}_{}.{}", self.suffix(), self.extension())
    }
}

impl std::fmt::Display for OutputFormat {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Json => "JSON",
            Self::Csv => "CSV",
            Self::Xml => "XML",
            Self::AiTraining => "AI Training Format",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "JSON" => Ok(Self::Json),
            "CSV" => Ok(Self::Csv),
            "XML" => Ok(Self::Xml),
            "AI TRAINING FORMAT" | "AI TRAINING" | "AI_TRAINING" => Ok(Self::AiTraining),
            _ => Err(format!("unknown output format: '{s}'")),
        }
    }
}
