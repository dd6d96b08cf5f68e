//! Configuration module for pdffold.
//!
//! This module holds the validated settings that drive a merge run. The CLI
//! builds a [`Config`] from its arguments; library users can construct one
//! directly (it implements [`Default`]). It handles:
//! - Validation of option combinations
//! - Resolution of the output location ([`OutputSpec`])
//! - Defaults for discovery, loading and writing

use anyhow::{Result, bail};
use globset::Glob;
use serde::Serialize;

use crate::PdfFoldError;
use crate::ordering::OrderingRules;
use crate::utils::{FALLBACK_OUTPUT_NAME, ensure_pdf_extension, sanitize_filename};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Default per-file load timeout.
pub const DEFAULT_FILE_TIMEOUT: Duration = Duration::from_secs(60);

/// Compression level for the output PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionLevel {
    /// No compression - streams are written as loaded.
    None,
    /// Compress uncompressed streams.
    #[default]
    Standard,
    /// Compress streams and drop unreferenced objects.
    Maximum,
}

impl FromStr for CompressionLevel {
    type Err = PdfFoldError;

    /// Parse compression level from "none", "standard" or "maximum".
    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "standard" => Ok(Self::Standard),
            "maximum" => Ok(Self::Maximum),
            _ => Err(PdfFoldError::invalid_config(format!(
                "Invalid compression level: {s}. Must be one of: none, standard, maximum"
            ))),
        }
    }
}

/// What to do when the output file already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverwriteMode {
    /// Replace the existing file (default).
    #[default]
    Overwrite,
    /// Fail with [`PdfFoldError::OutputExists`].
    NoClobber,
    /// Keep the existing file and write `<stem>_<timestamp>.pdf` next to it.
    Timestamp,
}

impl FromStr for OverwriteMode {
    type Err = PdfFoldError;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().as_str() {
            "overwrite" => Ok(Self::Overwrite),
            "no-clobber" => Ok(Self::NoClobber),
            "timestamp" => Ok(Self::Timestamp),
            _ => Err(PdfFoldError::invalid_config(format!(
                "Invalid overwrite mode: {s}. Must be one of: overwrite, no-clobber, timestamp"
            ))),
        }
    }
}

/// Where the merged document is written.
///
/// `output_name` is the final file name, always ending in `.pdf`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputSpec {
    /// Directory that will contain the output file.
    pub destination_dir: PathBuf,
    /// File name of the output, including the `.pdf` extension.
    pub output_name: String,
}

impl OutputSpec {
    /// Resolve the output location for a run over `root`.
    ///
    /// The name defaults to the base name of `root` and the directory defaults
    /// to `root` itself. Names are sanitised and given a `.pdf` extension.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdffold::config::OutputSpec;
    /// use std::path::Path;
    ///
    /// let spec = OutputSpec::resolve(Path::new("/courses/Algebra"), None, None);
    /// assert_eq!(spec.output_name, "Algebra.pdf");
    /// assert_eq!(spec.destination_dir, Path::new("/courses/Algebra"));
    /// ```
    pub fn resolve(root: &Path, output_name: Option<&str>, destination: Option<&Path>) -> Self {
        let raw_name = match output_name {
            Some(name) => name.to_string(),
            None => root
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
        };

        let mut name = sanitize_filename(&raw_name);
        if name.is_empty() {
            name = FALLBACK_OUTPUT_NAME.to_string();
        }

        Self {
            destination_dir: destination.unwrap_or(root).to_path_buf(),
            output_name: ensure_pdf_extension(&name),
        }
    }

    /// Full path of the output file.
    pub fn output_path(&self) -> PathBuf {
        self.destination_dir.join(&self.output_name)
    }
}

/// Complete configuration for a merge run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Folder to collect PDFs from.
    pub root: PathBuf,

    /// Descend into sub-folders.
    pub recursive: bool,

    /// Output name (without directory). Defaults to the folder name.
    pub output_name: Option<String>,

    /// Output directory. Defaults to the source folder.
    pub destination: Option<PathBuf>,

    /// File extensions treated as PDFs (without the dot, case-insensitive).
    pub extensions: Vec<String>,

    /// Glob patterns (relative to `root`) of files to leave out.
    pub exclude: Vec<String>,

    /// Extra markers that put a file first, on top of the built-in ones.
    pub intro_markers: Vec<String>,

    /// Extra markers that put a file last, on top of the built-in ones.
    pub conclusion_markers: Vec<String>,

    /// Behaviour when the output already exists.
    pub overwrite_mode: OverwriteMode,

    /// Compression level for output.
    pub compression: CompressionLevel,

    /// Number of documents loaded concurrently. `1` loads sequentially.
    pub jobs: usize,

    /// Upper bound for loading one document.
    pub file_timeout: Duration,

    /// Dry run mode - load and order everything, write nothing.
    pub dry_run: bool,

    /// Verbose output mode.
    pub verbose: bool,

    /// Quiet mode - suppress non-error output.
    pub quiet: bool,

    /// Print the final summary as JSON.
    pub json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            recursive: false,
            output_name: None,
            destination: None,
            extensions: vec!["pdf".to_string()],
            exclude: Vec::new(),
            intro_markers: Vec::new(),
            conclusion_markers: Vec::new(),
            overwrite_mode: OverwriteMode::default(),
            compression: CompressionLevel::default(),
            jobs: 1,
            file_timeout: DEFAULT_FILE_TIMEOUT,
            dry_run: false,
            verbose: false,
            quiet: false,
            json: false,
        }
    }
}

impl Config {
    /// Create a configuration for `root` with default settings.
    pub fn for_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No extensions are configured
    /// - Verbose and quiet modes are both enabled
    /// - Jobs count or file timeout is zero
    /// - An exclude pattern is not a valid glob
    pub fn validate(&self) -> Result<()> {
        if self.extensions.iter().all(|ext| ext.trim().is_empty()) {
            bail!("At least one file extension is required");
        }

        if self.verbose && self.quiet {
            bail!("Cannot use both --verbose and --quiet");
        }

        if self.jobs == 0 {
            bail!("Number of jobs must be at least 1");
        }

        if self.file_timeout.is_zero() {
            bail!("File timeout must be greater than zero");
        }

        for pattern in &self.exclude {
            if let Err(err) = Glob::new(pattern) {
                bail!("Invalid exclude pattern '{pattern}': {err}");
            }
        }

        Ok(())
    }

    /// Extensions normalised to lower case without a leading dot.
    pub fn normalized_extensions(&self) -> Vec<String> {
        self.extensions
            .iter()
            .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect()
    }

    /// Resolve where the merged document goes.
    pub fn output_spec(&self) -> OutputSpec {
        OutputSpec::resolve(
            &self.root,
            self.output_name.as_deref(),
            self.destination.as_deref(),
        )
    }

    /// Ordering rules with the configured extra markers.
    pub fn ordering_rules(&self) -> OrderingRules {
        OrderingRules::default()
            .with_intro_markers(&self.intro_markers)
            .with_conclusion_markers(&self.conclusion_markers)
    }

    /// Check if progress and status output should be displayed.
    ///
    /// Returns false in quiet mode and when the summary is printed as JSON.
    pub fn should_print(&self) -> bool {
        !self.quiet && !self.json
    }
}
