//! PDF writing.
//!
//! The document is serialised into a temporary file created next to the
//! target, flushed and synced, then renamed over the target. A failed write
//! leaves any existing file untouched and no partial output behind.
//!
//! # Examples
//!
//! ```no_run
//! use pdffold::io::writer::PdfWriter;
//! use lopdf::Document;
//! use std::path::Path;
//!
//! # async fn example(doc: Document) -> pdffold::Result<()> {
//! let stats = PdfWriter::new().save_with_stats(doc, Path::new("course.pdf")).await?;
//! println!("wrote {}", stats.format_file_size());
//! # Ok(())
//! # }
//! ```

use lopdf::Document;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tempfile::NamedTempFile;
use tokio::task;

use crate::config::CompressionLevel;
use crate::error::{PdfFoldError, Result};
use crate::utils::format_file_size;

/// Options for writing PDF files.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// How hard to compress before writing.
    pub compression: CompressionLevel,

    /// Buffer size for writing (in bytes).
    pub buffer_size: usize,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            compression: CompressionLevel::Standard,
            buffer_size: 64 * 1024,
        }
    }
}

/// Statistics about a write operation.
#[derive(Debug, Clone)]
pub struct WriteStatistics {
    /// Time taken to write the file.
    pub write_time: Duration,

    /// Size of the written file in bytes.
    pub file_size: u64,

    /// Path where the file was written.
    pub output_path: PathBuf,

    /// Compression that was applied.
    pub compression: CompressionLevel,
}

impl WriteStatistics {
    /// Format file size as human-readable string.
    pub fn format_file_size(&self) -> String {
        format_file_size(self.file_size)
    }
}

/// PDF writer with configurable behavior.
#[derive(Debug, Clone, Default)]
pub struct PdfWriter {
    options: WriteOptions,
}

impl PdfWriter {
    /// Create a new PDF writer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a writer with custom options.
    pub fn with_options(options: WriteOptions) -> Self {
        Self { options }
    }

    /// Create a writer with the given compression level.
    pub fn with_compression(compression: CompressionLevel) -> Self {
        Self::with_options(WriteOptions {
            compression,
            ..WriteOptions::default()
        })
    }

    /// Save a PDF document to a file.
    ///
    /// # Errors
    ///
    /// See [`PdfWriter::save_with_stats`].
    pub async fn save(&self, doc: Document, path: &Path) -> Result<()> {
        self.save_with_stats(doc, path).await.map(|_| ())
    }

    /// Save a PDF and return statistics about the operation.
    ///
    /// The parent directory of `path` must already exist.
    ///
    /// # Errors
    ///
    /// - [`PdfFoldError::FailedToCreateOutput`] if the temporary file cannot
    ///   be created in the target directory
    /// - [`PdfFoldError::FailedToWrite`] if serialising, flushing or the final
    ///   rename fails
    pub async fn save_with_stats(&self, doc: Document, path: &Path) -> Result<WriteStatistics> {
        let path_buf = path.to_path_buf();
        let options = self.options.clone();

        let joined = task::spawn_blocking(move || write_atomically(doc, path_buf, &options)).await;
        join_write(joined, path)
    }

    /// Check whether a file already exists at `path`.
    pub async fn exists(&self, path: &Path) -> bool {
        tokio::fs::try_exists(path).await.unwrap_or(false)
    }
}

/// A write task that panicked or was aborted is still a write failure.
fn join_write(
    joined: std::result::Result<Result<WriteStatistics>, task::JoinError>,
    path: &Path,
) -> Result<WriteStatistics> {
    joined.map_err(|e| PdfFoldError::FailedToWrite {
        path: path.to_path_buf(),
        source: std::io::Error::other(format!("write task failed: {e}")),
    })?
}

fn write_atomically(
    mut doc: Document,
    path: PathBuf,
    options: &WriteOptions,
) -> Result<WriteStatistics> {
    let start = Instant::now();

    match options.compression {
        CompressionLevel::None => {}
        CompressionLevel::Standard => doc.compress(),
        CompressionLevel::Maximum => {
            doc.prune_objects();
            doc.compress();
        }
    }

    // Dense, stable object ids keep repeated runs byte-identical.
    doc.renumber_objects();

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let mut temp =
        NamedTempFile::new_in(&dir).map_err(|e| PdfFoldError::FailedToCreateOutput {
            path: path.clone(),
            source: e,
        })?;

    {
        let mut writer = BufWriter::with_capacity(options.buffer_size, temp.as_file_mut());

        doc.save_to(&mut writer)
            .map_err(|e| PdfFoldError::FailedToWrite {
                path: path.clone(),
                source: std::io::Error::other(e),
            })?;

        writer.flush().map_err(|e| PdfFoldError::FailedToWrite {
            path: path.clone(),
            source: e,
        })?;
    }

    temp.as_file()
        .sync_all()
        .map_err(|e| PdfFoldError::FailedToWrite {
            path: path.clone(),
            source: e,
        })?;

    set_output_permissions(&temp, &path);

    temp.persist(&path)
        .map_err(|e| PdfFoldError::FailedToWrite {
            path: path.clone(),
            source: e.error,
        })?;

    let file_size = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);

    tracing::debug!(
        path = %path.display(),
        bytes = file_size,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "wrote output"
    );

    Ok(WriteStatistics {
        write_time: start.elapsed(),
        file_size,
        output_path: path,
        compression: options.compression,
    })
}

/// Temporary files are created owner-only; give the output the permissions
/// of the file it replaces, or regular file permissions.
#[cfg(unix)]
fn set_output_permissions(temp: &NamedTempFile, target: &Path) {
    use std::os::unix::fs::PermissionsExt;

    let permissions = std::fs::metadata(target)
        .map(|m| m.permissions())
        .unwrap_or_else(|_| std::fs::Permissions::from_mode(0o644));

    if let Err(err) = temp.as_file().set_permissions(permissions) {
        tracing::warn!(error = %err, "could not set output permissions");
    }
}

#[cfg(not(unix))]
fn set_output_permissions(_temp: &NamedTempFile, _target: &Path) {}
