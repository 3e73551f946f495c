//! Converter configuration
//!
//! Settings come from built-in defaults, optionally overridden by TOML files:
//!
//! - User defaults: `~/.docset.toml`
//! - Project defaults: `./.docset.toml`
//!
//! Precedence (highest to lowest): project file, user file, defaults.
//! Every key is optional; a file only overrides the keys it sets.
//!
//! ```toml
//! output_dir = "datasets"
//! format = "CSV"          # JSON, CSV, XML or "AI Training Format"
//! pretty_json = true
//! clean_text = true
//!
//! [cleaning]
//! remove_extra_spaces = true
//! remove_urls = true
//! lowercase = true
//! ```

use docset_core::{CleaningOptions, DocsetError, OutputFormat};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration file name, looked up in the home and working directories
pub const CONFIG_FILE_NAME: &str = ".docset.toml";

/// Settings for [`crate::DocumentConverter`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConverterConfig {
    /// Directory artifacts and the batch archive are written to
    pub output_dir: PathBuf,
    /// Format used by [`crate::DocumentConverter::convert`]
    pub format: OutputFormat,
    /// Indent JSON artifacts
    pub pretty_json: bool,
    /// Clean `full_text` in [`crate::DocumentConverter::convert`]
    pub clean_text: bool,
    /// Cleaning steps applied when cleaning is enabled
    pub cleaning: CleaningOptions,
}

impl Default for ConverterConfig {
    #[inline]
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            format: OutputFormat::Json,
            pretty_json: true,
            clean_text: false,
            cleaning: CleaningOptions::default(),
        }
    }
}

/// Contents of one configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<OutputFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pretty_json: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clean_text: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cleaning: Option<CleaningOptions>,
}

impl ConfigFile {
    /// Load a configuration file
    ///
    /// # Errors
    /// Returns [`DocsetError::Config`] if the file cannot be read or is not
    /// valid TOML for this schema.
    pub fn load(path: &Path) -> Result<Self, DocsetError> {
        let content = fs::read_to_string(path).map_err(|e| {
            DocsetError::Config(format!("Failed to read config file {}: {e}", path.display()))
        })?;
        toml::from_str(&content).map_err(|e| {
            DocsetError::Config(format!("Failed to parse config file {}: {e}", path.display()))
        })
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    /// Returns [`DocsetError::Config`] for malformed TOML or unknown keys.
    pub fn parse(content: &str) -> Result<Self, DocsetError> {
        toml::from_str(content)
            .map_err(|e| DocsetError::Config(format!("Failed to parse config: {e}")))
    }

    /// Load a file only when it exists
    fn load_optional(path: &Path) -> Result<Option<Self>, DocsetError> {
        if path.is_file() {
            log::debug!("Loading config from {}", path.display());
            Self::load(path).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Apply the keys this file sets on top of `config`
    fn apply_to(self, config: &mut ConverterConfig) {
        if let Some(output_dir) = self.output_dir {
            config.output_dir = output_dir;
        }
        if let Some(format) = self.format {
            config.format = format;
        }
        if let Some(pretty_json) = self.pretty_json {
            config.pretty_json = pretty_json;
        }
        if let Some(clean_text) = self.clean_text {
            config.clean_text = clean_text;
        }
        if let Some(cleaning) = self.cleaning {
            config.cleaning = cleaning;
        }
    }
}

impl ConverterConfig {
    /// Defaults with a different output directory
    #[must_use = "returns a new config"]
    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    /// Defaults overridden by the user and project configuration files
    ///
    /// # Errors
    /// Returns [`DocsetError::Config`] if a file that exists is malformed.
    pub fn discover() -> Result<Self, DocsetError> {
        let user = dirs::home_dir().map(|home| home.join(CONFIG_FILE_NAME));
        let project = PathBuf::from(CONFIG_FILE_NAME);
        Self::from_files(user.as_deref(), Some(&project))
    }

    /// Defaults overridden by `user`, then by `project`; missing files are skipped
    ///
    /// # Errors
    /// Returns [`DocsetError::Config`] if a file that exists is malformed.
    pub fn from_files(user: Option<&Path>, project: Option<&Path>) -> Result<Self, DocsetError> {
        let mut config = Self::default();
        for path in [user, project].into_iter().flatten() {
            if let Some(file) = ConfigFile::load_optional(path)? {
                file.apply_to(&mut config);
            }
        }
        Ok(config)
    }

    /// Cleaning options for [`crate::DocumentConverter::convert`], if enabled
    #[inline]
    #[must_use = "returns the configured cleaning options"]
    pub const fn cleaning_options(&self) -> Option<&CleaningOptions> {
        if self.clean_text {
            Some(&self.cleaning)
        } else {
            None
        }
    }
}
