//! CLI argument parsing for pdffold.
//!
//! This module defines the command-line interface structure using `clap`.
//! Every option can also be given through a `PDFFOLD_*` environment variable.
//!
//! # Examples
//!
//! ```no_run
//! use clap::Parser;
//!
//! let cli = Cli::parse();
//! println!("Merging PDFs under {}", cli.root.display());
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use pdffold::config::{CompressionLevel, Config, OverwriteMode};
use pdffold::error::{PdfFoldError, Result};

/// Merge every PDF in a folder into a single document.
///
/// Files are put into reading order first: introductions lead, conclusions
/// close, and "Chapter 2" comes before "Chapter 10". Files that cannot be
/// read are skipped and listed in the summary.
#[derive(Parser, Debug)]
#[command(name = "pdffold")]
#[command(version)]
#[command(about = "Merge every PDF in a folder into a single document", long_about = None)]
#[command(author)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Folder containing the PDFs to merge
    #[arg(value_name = "FOLDER", env = "PDFFOLD_ROOT")]
    pub root: PathBuf,

    /// Include PDFs in subfolders
    #[arg(short, long, env = "PDFFOLD_RECURSIVE")]
    pub recursive: bool,

    /// Name of the merged file
    ///
    /// Defaults to the name of the folder. ".pdf" is added when missing and
    /// characters that are not allowed in file names are replaced.
    #[arg(short, long, value_name = "NAME", env = "PDFFOLD_OUTPUT")]
    pub output: Option<String>,

    /// Directory the merged file is written to
    ///
    /// Defaults to the source folder. Created if it does not exist.
    #[arg(short, long, value_name = "DIR", env = "PDFFOLD_DESTINATION")]
    pub destination: Option<PathBuf>,

    /// File extension to pick up (repeatable)
    #[arg(
        long = "ext",
        value_name = "EXT",
        default_value = "pdf",
        env = "PDFFOLD_EXT",
        value_delimiter = ','
    )]
    pub extensions: Vec<String>,

    /// Glob of paths to leave out, relative to the folder (repeatable)
    ///
    /// Examples:
    ///   --exclude 'drafts/**'
    ///   --exclude '*_old.pdf'
    #[arg(long, value_name = "GLOB", env = "PDFFOLD_EXCLUDE", value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// Extra name marker that puts a file first (repeatable)
    #[arg(long = "intro-marker", value_name = "WORD", env = "PDFFOLD_INTRO_MARKERS", value_delimiter = ',')]
    pub intro_markers: Vec<String>,

    /// Extra name marker that puts a file last (repeatable)
    #[arg(
        long = "conclusion-marker",
        value_name = "WORD",
        env = "PDFFOLD_CONCLUSION_MARKERS",
        value_delimiter = ','
    )]
    pub conclusion_markers: Vec<String>,

    /// What to do when the merged file already exists
    ///
    /// - overwrite: replace it (default)
    /// - no-clobber: stop with an error
    /// - timestamp: keep it and write NAME_YYYYMMDD_HHMMSS.pdf instead
    #[arg(long, value_name = "MODE", default_value = "overwrite", env = "PDFFOLD_OVERWRITE_MODE")]
    #[arg(value_parser = ["overwrite", "no-clobber", "timestamp"])]
    pub overwrite_mode: String,

    /// Compression level for output PDF
    ///
    /// - none: No compression
    /// - standard: Compress streams (default)
    /// - maximum: Compress streams and drop unused objects
    #[arg(short, long, value_name = "LEVEL", default_value = "standard", env = "PDFFOLD_COMPRESSION")]
    #[arg(value_parser = ["none", "standard", "maximum"])]
    pub compression: String,

    /// Number of PDFs loaded concurrently
    ///
    /// Page order does not depend on this value.
    #[arg(short, long, value_name = "N", default_value_t = 1, env = "PDFFOLD_JOBS")]
    pub jobs: usize,

    /// Seconds to wait for a single PDF before skipping it
    #[arg(long, value_name = "SECS", default_value_t = 60, env = "PDFFOLD_FILE_TIMEOUT")]
    pub file_timeout: u64,

    /// Dry run - order and check the files without writing the output
    #[arg(short = 'n', long, env = "PDFFOLD_DRY_RUN")]
    pub dry_run: bool,

    /// Verbose output - also enables debug logging
    #[arg(short, long, env = "PDFFOLD_VERBOSE")]
    pub verbose: bool,

    /// Suppress all non-error output
    #[arg(short, long, conflicts_with = "verbose", env = "PDFFOLD_QUIET")]
    pub quiet: bool,

    /// Print the run summary as JSON on stdout
    #[arg(long, env = "PDFFOLD_JSON")]
    pub json: bool,
}

impl Cli {
    /// Convert CLI arguments into a validated Config.
    ///
    /// # Errors
    ///
    /// Returns [`PdfFoldError::InvalidConfig`] if a value cannot be parsed or
    /// the resulting configuration does not validate.
    pub fn to_config(&self) -> Result<Config> {
        let compression = CompressionLevel::from_str(&self.compression)?;
        let overwrite_mode = OverwriteMode::from_str(&self.overwrite_mode)?;

        let config = Config {
            root: self.root.clone(),
            recursive: self.recursive,
            output_name: self.output.clone(),
            destination: self.destination.clone(),
            extensions: self.extensions.clone(),
            exclude: self.exclude.clone(),
            intro_markers: self.intro_markers.clone(),
            conclusion_markers: self.conclusion_markers.clone(),
            overwrite_mode,
            compression,
            jobs: self.jobs,
            file_timeout: Duration::from_secs(self.file_timeout),
            dry_run: self.dry_run,
            verbose: self.verbose,
            quiet: self.quiet,
            json: self.json,
        };

        config.validate().map_err(|e| {
            PdfFoldError::invalid_config(format!("Configuration validation failed: {e}"))
        })?;

        Ok(config)
    }
}
