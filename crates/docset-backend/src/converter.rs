//! Conversion pipeline
//!
//! [`DocumentConverter`] runs one file through validation, extraction,
//! optional text cleaning, statistics and serialization, and writes the
//! artifact to the configured output directory. Batches run the same
//! pipeline per file, keep going past failures and bundle the successful
//! artifacts into `batch_output.zip`.

use crate::config::ConverterConfig;
use crate::extractor::Extractor;
use crate::traits::DocumentExtractor;
use docset_core::{
    clean_text, select_tabular_rows, to_training_record, validate_file, write_csv, CleaningOptions,
    DocsetError, ExtractionRecord, JsonOptions, JsonSerializer, OutputFormat, Result, Statistics,
    XmlSerializer,
};
use std::fmt;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Characters of serialized output shown in a preview
pub const PREVIEW_CHARS: usize = 2000;

/// File name of the batch archive
pub const BATCH_ARCHIVE_NAME: &str = "batch_output.zip";

/// Root element of XML artifacts
const XML_ROOT: &str = "document";

/// Result of converting one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionOutput {
    /// Input file
    pub input: PathBuf,
    /// Written artifact
    pub output_path: PathBuf,
    /// Start of the serialized output, or a row count for CSV
    pub preview: String,
    pub statistics: Statistics,
}

impl ConversionOutput {
    /// Status line reporting the converted file and where its artifact went
    #[must_use = "returns the status message"]
    pub fn status_message(&self) -> String {
        format!(
            "Successfully processed: {}\nOutput saved to: {}",
            file_name(&self.input),
            self.output_path.display()
        )
    }
}

/// Outcome of one file in a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    Converted(ConversionOutput),
    /// Failure message
    Failed(String),
}

/// One line of a batch report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchEntry {
    pub input: PathBuf,
    pub outcome: BatchOutcome,
}

impl BatchEntry {
    #[inline]
    #[must_use = "returns whether the file converted"]
    pub const fn is_success(&self) -> bool {
        matches!(self.outcome, BatchOutcome::Converted(_))
    }
}

impl fmt::Display for BatchEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = file_name(&self.input);
        match &self.outcome {
            BatchOutcome::Converted(_) => write!(f, "[OK] {name}"),
            BatchOutcome::Failed(message) => write!(f, "[FAILED] {name}: {message}"),
        }
    }
}

/// Result of a batch run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    /// Per-file outcomes, in input order
    pub entries: Vec<BatchEntry>,
    pub successful: usize,
    pub failed: usize,
    /// Archive of the successful artifacts; `None` when nothing converted
    pub archive: Option<PathBuf>,
}

impl BatchReport {
    /// Human-readable summary with counts and one line per file
    #[must_use = "returns the summary text"]
    pub fn summary(&self) -> String {
        let details = self
            .entries
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n");
        format!(
            "**Batch Processing Complete**\n\nSuccessful: {}\nFailed: {}\n\n**Details:**\n{details}",
            self.successful, self.failed
        )
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}

/// First [`PREVIEW_CHARS`] characters, with `...` appended when cut
fn preview_of(text: &str) -> String {
    match text.char_indices().nth(PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Document-to-dataset converter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentConverter {
    config: ConverterConfig,
}

impl DocumentConverter {
    /// Create a converter with the given configuration
    #[inline]
    #[must_use = "creating a converter that is not used is a waste of resources"]
    pub const fn new(config: ConverterConfig) -> Self {
        Self { config }
    }

    /// Create a converter from the user and project configuration files
    ///
    /// # Errors
    /// Returns [`DocsetError::Config`] if a configuration file is malformed.
    pub fn from_config_files() -> Result<Self> {
        ConverterConfig::discover().map(Self::new)
    }

    #[inline]
    #[must_use = "returns the converter configuration"]
    pub const fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// Convert a file with the configured format and cleaning settings
    ///
    /// # Errors
    /// See [`process_file`](Self::process_file).
    pub fn convert<P: AsRef<Path>>(&self, path: P) -> Result<ConversionOutput> {
        self.process_file(path, self.config.format, self.config.cleaning_options())
    }

    /// Validate and extract a file without writing anything
    ///
    /// # Errors
    /// Returns [`DocsetError::Validation`] if the file fails validation and
    /// [`DocsetError::Extraction`] if the extractor reports an error.
    pub fn extract<P: AsRef<Path>>(&self, path: P) -> Result<ExtractionRecord> {
        let path = path.as_ref();
        let format = validate_file(path)?;
        log::debug!("Validated {} as {}", path.display(), format.label());

        let record = Extractor::for_format(format).extract(path);
        match record.error {
            Some(message) => Err(DocsetError::Extraction(message)),
            None => Ok(record),
        }
    }

    /// Convert one file and write its artifact
    ///
    /// The artifact is `<output_dir>/<stem>_converted.<ext>`, or
    /// `<stem>_ai_training.json` for the AI training format. When `cleaning`
    /// is given, only `full_text` is cleaned.
    ///
    /// # Errors
    /// Returns an error if validation or extraction fails, if CSV output is
    /// requested for a record without tabular data, or if writing fails.
    pub fn process_file<P: AsRef<Path>>(
        &self,
        path: P,
        format: OutputFormat,
        cleaning: Option<&CleaningOptions>,
    ) -> Result<ConversionOutput> {
        let path = path.as_ref();
        let mut record = self.extract(path)?;

        if let (Some(options), Some(text)) = (cleaning, record.full_text.as_mut()) {
            *text = clean_text(text, options);
        }

        let statistics = Statistics::from_record(&record);
        let stem = path
            .file_stem()
            .map_or_else(|| "document".to_string(), |s| s.to_string_lossy().into_owned());

        fs::create_dir_all(&self.config.output_dir)?;
        let output_path = self.config.output_dir.join(format.artifact_name(&stem));
        let preview = self.write_artifact(&record, format, &output_path)?;

        log::info!("Converted {} to {}", path.display(), output_path.display());
        Ok(ConversionOutput {
            input: path.to_path_buf(),
            output_path,
            preview,
            statistics,
        })
    }

    /// Serialize `record` in `format` to `output_path` and return the preview
    fn write_artifact(
        &self,
        record: &ExtractionRecord,
        format: OutputFormat,
        output_path: &Path,
    ) -> Result<String> {
        let json = JsonSerializer::with_options(JsonOptions {
            pretty: self.config.pretty_json,
            ..JsonOptions::default()
        });

        let text = match format {
            OutputFormat::Json => json.serialize(record)?,
            OutputFormat::AiTraining => json.serialize(&to_training_record(record))?,
            OutputFormat::Xml => XmlSerializer::new().serialize(record, XML_ROOT)?,
            OutputFormat::Csv => {
                let rows = select_tabular_rows(record)?;
                write_csv(&rows, output_path)?;
                return Ok(format!("CSV file created with {} rows", rows.len()));
            }
        };

        fs::write(output_path, &text)?;
        Ok(preview_of(&text))
    }

    /// Convert every file, then archive the successful artifacts
    ///
    /// Failures are recorded in the report and never stop the batch. The
    /// archive is written only when at least one file converted.
    ///
    /// # Errors
    /// Returns an error only if the archive cannot be written.
    pub fn process_batch<P: AsRef<Path>>(
        &self,
        paths: &[P],
        format: OutputFormat,
        cleaning: Option<&CleaningOptions>,
    ) -> Result<BatchReport> {
        let entries: Vec<BatchEntry> = paths
            .iter()
            .map(|path| {
                let path = path.as_ref();
                let outcome = match self.process_file(path, format, cleaning) {
                    Ok(output) => BatchOutcome::Converted(output),
                    Err(e) => {
                        log::warn!("Batch item {} failed: {e}", path.display());
                        BatchOutcome::Failed(e.to_string())
                    }
                };
                BatchEntry {
                    input: path.to_path_buf(),
                    outcome,
                }
            })
            .collect();

        let successful = entries.iter().filter(|e| e.is_success()).count();
        let failed = entries.len() - successful;

        let archive = if successful > 0 {
            let outputs: Vec<&Path> = entries
                .iter()
                .filter_map(|e| match &e.outcome {
                    BatchOutcome::Converted(output) => Some(output.output_path.as_path()),
                    BatchOutcome::Failed(_) => None,
                })
                .collect();
            Some(self.write_archive(&outputs)?)
        } else {
            None
        };

        log::info!("Batch finished: {successful} succeeded, {failed} failed");
        Ok(BatchReport {
            entries,
            successful,
            failed,
            archive,
        })
    }

    /// Zip the given artifacts into the output directory
    fn write_archive(&self, outputs: &[&Path]) -> Result<PathBuf> {
        let archive_path = self.config.output_dir.join(BATCH_ARCHIVE_NAME);
        let mut zip = ZipWriter::new(File::create(&archive_path)?);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        let mut written: Vec<String> = Vec::with_capacity(outputs.len());
        for output in outputs {
            let name = file_name(output);
            // Inputs sharing a stem overwrite one artifact; archive it once
            if written.contains(&name) {
                continue;
            }
            zip.start_file(name.as_str(), options)?;
            let mut file = File::open(output)?;
            std::io::copy(&mut file, &mut zip)?;
            written.push(name);
        }
        zip.finish()?;

        log::debug!(
            "Archived {} artifacts to {}",
            written.len(),
            archive_path.display()
        );
        Ok(archive_path)
    }
}
