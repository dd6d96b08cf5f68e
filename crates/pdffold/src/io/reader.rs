//! PDF loading.
//!
//! Loading is synchronous (`lopdf` parses the whole file in one call). The
//! merge loop runs each load on the blocking pool through
//! [`load_with_timeout`], which turns a load that takes too long into a
//! per-file [`PdfFoldError::LoadTimedOut`].
//!
//! # Examples
//!
//! ```no_run
//! use pdffold::io::reader::{DocumentLoader, PdfReader};
//! use std::path::Path;
//!
//! # fn example() -> pdffold::Result<()> {
//! let loaded = PdfReader::new().load(Path::new("lecture.pdf"))?;
//! println!("{} pages in {:?}", loaded.page_count, loaded.load_time);
//! # Ok(())
//! # }
//! ```

use lopdf::Document;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::{PdfFoldError, Result};

/// A loaded PDF document with metadata.
#[derive(Debug)]
pub struct LoadedPdf {
    /// The PDF document.
    pub document: Document,

    /// Path to the source file.
    pub path: PathBuf,

    /// Number of pages in the document.
    pub page_count: usize,

    /// Time taken to load the document.
    pub load_time: Duration,

    /// File size in bytes.
    pub file_size: u64,
}

impl LoadedPdf {
    /// Wrap an already parsed document.
    pub fn new(document: Document, path: PathBuf, load_time: Duration) -> Self {
        let page_count = document.get_pages().len();
        let file_size = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);

        Self {
            document,
            path,
            page_count,
            load_time,
            file_size,
        }
    }
}

/// Opens a document from disk.
///
/// Implementations must report every per-file problem as an error for which
/// [`PdfFoldError::is_recoverable`] holds, so the merge can skip the file and
/// carry on.
pub trait DocumentLoader: Send + Sync + 'static {
    /// Load the document at `path`.
    fn load(&self, path: &Path) -> Result<LoadedPdf>;
}

/// [`DocumentLoader`] backed by `lopdf`.
#[derive(Debug, Clone)]
pub struct PdfReader {
    /// Reject documents without pages.
    verify: bool,
}

impl PdfReader {
    /// Create a reader that rejects documents without pages.
    pub fn new() -> Self {
        Self { verify: true }
    }

    /// Create a reader that accepts documents without pages.
    pub fn without_verification() -> Self {
        Self { verify: false }
    }
}

impl Default for PdfReader {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentLoader for PdfReader {
    /// Load a single PDF document.
    ///
    /// # Errors
    ///
    /// - [`PdfFoldError::EncryptedPdf`] if the document is encrypted
    /// - [`PdfFoldError::CorruptedPdf`] if it has no pages
    /// - [`PdfFoldError::FailedToLoadPdf`] for everything else (unreadable,
    ///   permission denied, not a PDF)
    fn load(&self, path: &Path) -> Result<LoadedPdf> {
        let path_buf = path.to_path_buf();
        let start = Instant::now();

        let doc = Document::load(&path_buf).map_err(|e| {
            let err_msg = e.to_string();
            let lowered = err_msg.to_lowercase();
            if lowered.contains("encrypt")
                || lowered.contains("decrypt")
                || lowered.contains("password")
            {
                PdfFoldError::encrypted_pdf(path_buf.clone())
            } else {
                PdfFoldError::failed_to_load_pdf(path_buf.clone(), err_msg)
            }
        })?;

        // Decrypted or not, an encrypted source cannot be spliced into a
        // plain output.
        if doc.trailer.has(b"Encrypt") {
            return Err(PdfFoldError::encrypted_pdf(path_buf));
        }

        if self.verify && doc.get_pages().is_empty() {
            return Err(PdfFoldError::corrupted_pdf(path_buf, "PDF has no pages"));
        }

        let loaded = LoadedPdf::new(doc, path_buf, start.elapsed());
        tracing::debug!(
            path = %loaded.path.display(),
            pages = loaded.page_count,
            elapsed_ms = loaded.load_time.as_millis() as u64,
            "loaded document"
        );

        Ok(loaded)
    }
}

/// Run `loader` on the blocking pool, giving up after `timeout`.
///
/// A load that times out keeps running in the background until it finishes;
/// its result is discarded.
///
/// # Errors
///
/// Returns [`PdfFoldError::LoadTimedOut`] on timeout, the loader's error if
/// it fails, or [`PdfFoldError::FailedToLoadPdf`] if the load task panics.
pub async fn load_with_timeout<L>(
    loader: Arc<L>,
    path: PathBuf,
    timeout: Duration,
) -> Result<LoadedPdf>
where
    L: DocumentLoader + ?Sized,
{
    let task = tokio::task::spawn_blocking({
        let path = path.clone();
        move || loader.load(&path)
    });

    match tokio::time::timeout(timeout, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_err)) => Err(PdfFoldError::failed_to_load_pdf(
            path,
            format!("load task failed: {join_err}"),
        )),
        Err(_) => Err(PdfFoldError::LoadTimedOut { path, timeout }),
    }
}
