//! Error types for pdffold.
//!
//! Every fallible operation in the crate returns [`PdfFoldError`]. Errors fall
//! into two groups:
//!
//! - **Per-file errors**: a single candidate could not be opened, was empty,
//!   encrypted, or took too long to load. These are recoverable; the merge
//!   records them and moves on to the next file.
//! - **Run errors**: the root folder is missing, nothing could be merged, the
//!   output could not be written, or the run was cancelled. These end the run.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

/// Result type alias for pdffold operations.
pub type Result<T> = std::result::Result<T, PdfFoldError>;

/// Main error type for pdffold operations.
#[derive(Debug, thiserror::Error)]
pub enum PdfFoldError {
    /// The source folder does not exist.
    #[error("Folder does not exist: {}", path.display())]
    NotFound {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// The source path exists but is not a directory.
    #[error("Path is not a directory: {}", path.display())]
    NotADirectory {
        /// Path that is not a directory.
        path: PathBuf,
    },

    /// A candidate could not be opened as a PDF.
    #[error("Failed to load PDF: {}\n  Reason: {reason}", path.display())]
    FailedToLoadPdf {
        /// Path to the PDF file.
        path: PathBuf,
        /// Reason for the failure.
        reason: String,
    },

    /// A candidate opened but its structure is unusable (e.g. no pages).
    #[error("Corrupted or invalid PDF: {}\n  Details: {details}", path.display())]
    CorruptedPdf {
        /// Path to the corrupted PDF.
        path: PathBuf,
        /// Details about the corruption.
        details: String,
    },

    /// A candidate is encrypted and cannot be merged.
    #[error(
        "PDF is encrypted and cannot be processed: {}\n  \
         Hint: Decrypt the PDF first using 'qpdf --decrypt' or similar tools",
        path.display()
    )]
    EncryptedPdf {
        /// Path to the encrypted PDF.
        path: PathBuf,
    },

    /// Loading a candidate did not finish within the per-file timeout.
    #[error("Timed out after {}s while loading: {}", timeout.as_secs(), path.display())]
    LoadTimedOut {
        /// Path to the slow PDF.
        path: PathBuf,
        /// The timeout that was exceeded.
        timeout: Duration,
    },

    /// Every candidate failed, or none were found.
    #[error("No mergeable PDF files ({candidates} candidate(s) found, none could be merged)")]
    NoMergeableFiles {
        /// Number of candidates that were attempted.
        candidates: usize,
    },

    /// Output file already exists and the overwrite mode forbids replacing it.
    #[error(
        "Output file already exists: {}\n  \
         Use --overwrite-mode overwrite or timestamp, or choose a different name",
        path.display()
    )]
    OutputExists {
        /// Path to the existing output file.
        path: PathBuf,
    },

    /// Failed to create the output file or its directory.
    #[error("Failed to create output file: {}\n  Reason: {source}", path.display())]
    FailedToCreateOutput {
        /// Path where output should be created.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Failed to write to the output file.
    #[error("Failed to write to output file: {}\n  Reason: {source}", path.display())]
    FailedToWrite {
        /// Path being written to.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The page tree of the accumulated document could not be updated.
    #[error("Merge operation failed: {reason}")]
    MergeFailed {
        /// Description of what went wrong.
        reason: String,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of what's wrong with the configuration.
        message: String,
    },

    /// The run was interrupted before the output was published.
    #[error("Operation cancelled by user")]
    Cancelled,

    /// Generic I/O error.
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error.
        #[from]
        source: io::Error,
    },

    /// Generic error with a custom message.
    #[error("{message}")]
    Other {
        /// Error message.
        message: String,
    },
}

impl From<lopdf::Error> for PdfFoldError {
    fn from(err: lopdf::Error) -> Self {
        Self::other(err.to_string())
    }
}

impl From<anyhow::Error> for PdfFoldError {
    fn from(err: anyhow::Error) -> Self {
        Self::other(err.to_string())
    }
}

impl PdfFoldError {
    /// Create a NotFound error.
    pub fn file_not_found(path: PathBuf) -> Self {
        Self::NotFound { path }
    }

    /// Create a NotADirectory error.
    pub fn not_a_directory(path: PathBuf) -> Self {
        Self::NotADirectory { path }
    }

    /// Create a FailedToLoadPdf error.
    pub fn failed_to_load_pdf(path: PathBuf, reason: impl Into<String>) -> Self {
        Self::FailedToLoadPdf {
            path,
            reason: reason.into(),
        }
    }

    /// Create a CorruptedPdf error.
    pub fn corrupted_pdf(path: PathBuf, details: impl Into<String>) -> Self {
        Self::CorruptedPdf {
            path,
            details: details.into(),
        }
    }

    /// Create an EncryptedPdf error.
    pub fn encrypted_pdf(path: PathBuf) -> Self {
        Self::EncryptedPdf { path }
    }

    /// Create an OutputExists error.
    pub fn output_exists(path: PathBuf) -> Self {
        Self::OutputExists { path }
    }

    /// Create a MergeFailed error.
    pub fn merge_failed(reason: impl Into<String>) -> Self {
        Self::MergeFailed {
            reason: reason.into(),
        }
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an Other error with a custom message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Check if this error only affects a single input file.
    ///
    /// Recoverable errors are recorded as skipped files and the merge
    /// continues with the next candidate.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::FailedToLoadPdf { .. }
                | Self::CorruptedPdf { .. }
                | Self::EncryptedPdf { .. }
                | Self::LoadTimedOut { .. }
        )
    }

    /// Check if this error should stop all processing immediately.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. }
                | Self::NotADirectory { .. }
                | Self::NoMergeableFiles { .. }
                | Self::FailedToCreateOutput { .. }
                | Self::FailedToWrite { .. }
                | Self::Cancelled
        )
    }

    /// Short, single-line reason suitable for a progress line or summary.
    pub fn reason(&self) -> String {
        match self {
            Self::FailedToLoadPdf { reason, .. } => reason.clone(),
            Self::CorruptedPdf { details, .. } => details.clone(),
            Self::EncryptedPdf { .. } => "document is encrypted".to_string(),
            Self::LoadTimedOut { timeout, .. } => {
                format!("timed out after {}s", timeout.as_secs())
            }
            other => other.to_string(),
        }
    }

    /// Get the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NotFound { .. } => 2,
            Self::NotADirectory { .. } => 2,
            Self::FailedToLoadPdf { .. } => 3,
            Self::CorruptedPdf { .. } => 3,
            Self::EncryptedPdf { .. } => 3,
            Self::LoadTimedOut { .. } => 3,
            Self::NoMergeableFiles { .. } => 1,
            Self::OutputExists { .. } => 4,
            Self::FailedToCreateOutput { .. } => 5,
            Self::FailedToWrite { .. } => 5,
            Self::MergeFailed { .. } => 6,
            Self::InvalidConfig { .. } => 1,
            Self::Cancelled => 130, // Standard exit code for SIGINT
            Self::Io { .. } => 5,
            Self::Other { .. } => 1,
        }
    }
}
