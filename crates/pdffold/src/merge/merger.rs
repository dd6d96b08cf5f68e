//! Fault-tolerant merge loop.
//!
//! Files are processed strictly in the order given. Each one is loaded (on
//! the blocking pool, bounded by the per-file timeout) and its pages appended
//! to a [`PageAccumulator`]. A file that cannot be used is recorded as
//! skipped and the loop moves on. With `jobs > 1` up to `jobs` loads run
//! ahead of the append step, but results are still consumed in order.

use futures::stream::{self, StreamExt};
use lopdf::Document;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{Config, DEFAULT_FILE_TIMEOUT};
use crate::discovery::CandidateFile;
use crate::error::{PdfFoldError, Result};
use crate::io::{DocumentLoader, LoadedPdf, PdfReader, load_with_timeout};
use crate::merge::pages::PageAccumulator;
use crate::output::progress::{ProgressEvent, ProgressSink};
use crate::pipeline::CancelFlag;

/// Totals for a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    /// Files whose pages made it into the output.
    pub files_processed: usize,
    /// Files that were skipped.
    pub files_failed: usize,
    /// Pages in the output.
    pub total_pages: usize,
    /// Size of the written output. Zero until the output is written.
    pub output_size_bytes: u64,
}

/// A file that was left out, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedFile {
    /// The file.
    #[serde(flatten)]
    pub file: CandidateFile,
    /// Single-line reason.
    pub reason: String,
}

/// What happened to one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// All pages were appended.
    Merged {
        /// The file.
        file: CandidateFile,
        /// Pages appended.
        pages: usize,
    },
    /// The file was left out.
    Skipped(SkippedFile),
}

/// Per-file outcomes of a run, in merge order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeResult {
    /// Files whose pages are in the output, in page order.
    pub succeeded: Vec<CandidateFile>,
    /// Files that were skipped, with reasons.
    pub failed: Vec<SkippedFile>,
}

impl MergeResult {
    fn record(&mut self, outcome: FileOutcome, stats: &mut RunStats) {
        match outcome {
            FileOutcome::Merged { file, pages } => {
                stats.files_processed += 1;
                stats.total_pages += pages;
                self.succeeded.push(file);
            }
            FileOutcome::Skipped(skipped) => {
                stats.files_failed += 1;
                self.failed.push(skipped);
            }
        }
    }
}

/// Output of a successful merge, not yet written anywhere.
#[derive(Debug)]
pub struct MergedDocument {
    /// The combined document.
    pub document: Document,
    /// Per-file outcomes.
    pub result: MergeResult,
    /// Totals, with `output_size_bytes` still zero.
    pub stats: RunStats,
}

/// Merges an ordered list of files into one document.
pub struct Merger<L: DocumentLoader = PdfReader> {
    loader: Arc<L>,
    jobs: usize,
    file_timeout: Duration,
}

impl Merger<PdfReader> {
    /// Create a sequential merger using [`PdfReader`].
    pub fn new() -> Self {
        Self::with_loader(PdfReader::new())
    }

    /// Create a merger using the concurrency and timeout of `config`.
    pub fn from_config(config: &Config) -> Self {
        Self::new()
            .with_jobs(config.jobs)
            .with_file_timeout(config.file_timeout)
    }
}

impl Default for Merger<PdfReader> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: DocumentLoader> Merger<L> {
    /// Create a sequential merger around a custom loader.
    pub fn with_loader(loader: L) -> Self {
        Self {
            loader: Arc::new(loader),
            jobs: 1,
            file_timeout: DEFAULT_FILE_TIMEOUT,
        }
    }

    /// Number of loads allowed to run ahead of the append step.
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    /// Upper bound for loading one file.
    pub fn with_file_timeout(mut self, timeout: Duration) -> Self {
        self.file_timeout = timeout;
        self
    }

    /// Merge `files` in order.
    ///
    /// Emits one [`ProgressEvent`] per file to `sink`.
    ///
    /// # Errors
    ///
    /// - [`PdfFoldError::NoMergeableFiles`] if no file could be merged
    /// - [`PdfFoldError::Cancelled`] if `cancel` was raised
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use pdffold::discovery::CandidateFile;
    /// use pdffold::merge::Merger;
    /// use pdffold::output::progress::NoProgress;
    /// use pdffold::pipeline::CancelFlag;
    ///
    /// # async fn example() -> pdffold::Result<()> {
    /// let files = vec![
    ///     CandidateFile::from_path("course/01_Intro.pdf"),
    ///     CandidateFile::from_path("course/02_Basics.pdf"),
    /// ];
    ///
    /// let merged = Merger::new()
    ///     .merge(&files, &mut NoProgress, &CancelFlag::new())
    ///     .await?;
    /// println!("{} pages", merged.stats.total_pages);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn merge<S>(
        &self,
        files: &[CandidateFile],
        sink: &mut S,
        cancel: &CancelFlag,
    ) -> Result<MergedDocument>
    where
        S: ProgressSink + ?Sized,
    {
        let total = files.len();
        let timeout = self.file_timeout;

        let mut accumulator = PageAccumulator::new();
        let mut result = MergeResult::default();
        let mut stats = RunStats::default();

        if cancel.is_cancelled() {
            return Err(PdfFoldError::Cancelled);
        }

        let mut loads = stream::iter(files.iter().cloned())
            .map(|file| {
                let loader = Arc::clone(&self.loader);
                async move {
                    let loaded = load_with_timeout(loader, file.path.clone(), timeout).await;
                    (file, loaded)
                }
            })
            .buffered(self.jobs);

        let mut index = 0;
        while let Some((file, loaded)) = loads.next().await {
            if cancel.is_cancelled() {
                tracing::warn!("merge cancelled");
                return Err(PdfFoldError::Cancelled);
            }
            index += 1;

            let outcome = append_loaded(&mut accumulator, file, loaded)?;
            let event = match &outcome {
                FileOutcome::Merged { file, pages } => {
                    tracing::debug!(file = %file.path.display(), pages, "merged");
                    ProgressEvent::ok(index, total, &file.name)
                }
                FileOutcome::Skipped(skipped) => {
                    tracing::warn!(
                        file = %skipped.file.path.display(),
                        reason = %skipped.reason,
                        "skipping file"
                    );
                    ProgressEvent::skipped(index, total, &skipped.file.name, &skipped.reason)
                }
            };

            result.record(outcome, &mut stats);
            sink.emit(&event);
        }

        let Some(document) = accumulator.into_document() else {
            return Err(PdfFoldError::NoMergeableFiles { candidates: total });
        };

        Ok(MergedDocument {
            document,
            result,
            stats,
        })
    }
}

/// Turn a load result into an outcome, appending pages on success.
fn append_loaded(
    accumulator: &mut PageAccumulator,
    file: CandidateFile,
    loaded: Result<LoadedPdf>,
) -> Result<FileOutcome> {
    let skip = |file: CandidateFile, err: PdfFoldError| {
        FileOutcome::Skipped(SkippedFile {
            file,
            reason: err.reason(),
        })
    };

    match loaded {
        Ok(pdf) => match accumulator.append(pdf.document) {
            Ok(pages) => Ok(FileOutcome::Merged { file, pages }),
            Err(err) => Ok(skip(file, err)),
        },
        Err(PdfFoldError::Cancelled) => Err(PdfFoldError::Cancelled),
        Err(err) => Ok(skip(file, err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::progress::{NoProgress, ProgressStatus};
    use crate::test_support::{page_tags, write_pdf, write_raw};
    use std::path::Path;
    use tempfile::TempDir;

    fn candidate(path: std::path::PathBuf) -> CandidateFile {
        CandidateFile::from_path(path)
    }

    #[tokio::test]
    async fn test_merge_preserves_order() {
        let temp_dir = TempDir::new().unwrap();
        let files = vec![
            candidate(write_pdf(temp_dir.path(), "a.pdf", 2, "a")),
            candidate(write_pdf(temp_dir.path(), "b.pdf", 1, "b")),
            candidate(write_pdf(temp_dir.path(), "c.pdf", 3, "c")),
        ];

        let merged = Merger::new()
            .merge(&files, &mut NoProgress, &CancelFlag::new())
            .await
            .unwrap();

        assert_eq!(merged.stats.files_processed, 3);
        assert_eq!(merged.stats.files_failed, 0);
        assert_eq!(merged.stats.total_pages, 6);
        assert_eq!(merged.result.succeeded, files);
        assert_eq!(
            page_tags(&merged.document),
            vec!["a:1", "a:2", "b:1", "c:1", "c:2", "c:3"]
        );
    }

    #[tokio::test]
    async fn test_corrupted_file_is_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let files = vec![
            candidate(write_pdf(temp_dir.path(), "a.pdf", 1, "a")),
            candidate(write_raw(temp_dir.path(), "broken.pdf", b"not a pdf at all")),
            candidate(write_pdf(temp_dir.path(), "c.pdf", 1, "c")),
        ];

        let mut events = Vec::new();
        let merged = Merger::new()
            .merge(
                &files,
                &mut |event: &ProgressEvent| events.push(event.clone()),
                &CancelFlag::new(),
            )
            .await
            .unwrap();

        assert_eq!(merged.stats.files_processed, 2);
        assert_eq!(merged.stats.files_failed, 1);
        assert_eq!(merged.result.failed[0].file.name, "broken.pdf");
        assert_eq!(page_tags(&merged.document), vec!["a:1", "c:1"]);

        let statuses: Vec<_> = events.iter().map(|e| e.status).collect();
        assert_eq!(
            statuses,
            vec![
                ProgressStatus::Ok,
                ProgressStatus::Skipped,
                ProgressStatus::Ok
            ]
        );
        assert_eq!(events[1].index, 2);
        assert_eq!(events[1].total, 3);
        assert!(events[1].reason.is_some());
    }

    #[tokio::test]
    async fn test_all_files_failing_is_no_mergeable_files() {
        let temp_dir = TempDir::new().unwrap();
        let files = vec![
            candidate(write_raw(temp_dir.path(), "x.pdf", b"")),
            candidate(write_pdf(temp_dir.path(), "empty.pdf", 0, "e")),
        ];

        let err = Merger::new()
            .merge(&files, &mut NoProgress, &CancelFlag::new())
            .await
            .unwrap_err();

        match err {
            PdfFoldError::NoMergeableFiles { candidates } => assert_eq!(candidates, 2),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_input_is_no_mergeable_files() {
        let err = Merger::new()
            .merge(&[], &mut NoProgress, &CancelFlag::new())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PdfFoldError::NoMergeableFiles { candidates: 0 }
        ));
    }

    #[tokio::test]
    async fn test_parallel_loads_keep_order() {
        let temp_dir = TempDir::new().unwrap();
        let files: Vec<_> = (1..=8)
            .map(|n| {
                let name = format!("{n:02}.pdf");
                candidate(write_pdf(temp_dir.path(), &name, 1, &n.to_string()))
            })
            .collect();

        let merged = Merger::new()
            .with_jobs(4)
            .merge(&files, &mut NoProgress, &CancelFlag::new())
            .await
            .unwrap();

        let expected: Vec<String> = (1..=8).map(|n| format!("{n}:1")).collect();
        assert_eq!(page_tags(&merged.document), expected);
    }

    #[tokio::test]
    async fn test_timed_out_file_is_skipped() {
        struct SlowFor(String);

        impl DocumentLoader for SlowFor {
            fn load(&self, path: &Path) -> Result<LoadedPdf> {
                if path.ends_with(&self.0) {
                    std::thread::sleep(Duration::from_millis(400));
                }
                PdfReader::new().load(path)
            }
        }

        let temp_dir = TempDir::new().unwrap();
        let files = vec![
            candidate(write_pdf(temp_dir.path(), "fast.pdf", 1, "fast")),
            candidate(write_pdf(temp_dir.path(), "slow.pdf", 1, "slow")),
        ];

        let merged = Merger::with_loader(SlowFor("slow.pdf".to_string()))
            .with_file_timeout(Duration::from_millis(50))
            .merge(&files, &mut NoProgress, &CancelFlag::new())
            .await
            .unwrap();

        assert_eq!(merged.stats.files_failed, 1);
        assert!(merged.result.failed[0].reason.contains("timed out"));
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let temp_dir = TempDir::new().unwrap();
        let files = vec![candidate(write_pdf(temp_dir.path(), "a.pdf", 1, "a"))];

        let cancel = CancelFlag::new();
        cancel.cancel();

        let err = Merger::new()
            .merge(&files, &mut NoProgress, &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, PdfFoldError::Cancelled));
    }

    #[tokio::test]
    async fn test_cancel_from_progress_sink_stops_merge() {
        let temp_dir = TempDir::new().unwrap();
        let files = vec![
            candidate(write_pdf(temp_dir.path(), "a.pdf", 1, "a")),
            candidate(write_pdf(temp_dir.path(), "b.pdf", 1, "b")),
        ];

        let cancel = CancelFlag::new();
        let trigger = cancel.clone();
        let err = Merger::new()
            .merge(&files, &mut |_: &ProgressEvent| trigger.cancel(), &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, PdfFoldError::Cancelled));
    }

    #[test]
    fn test_run_stats_serialize() {
        let stats = RunStats {
            files_processed: 5,
            files_failed: 1,
            total_pages: 42,
            output_size_bytes: 1024,
        };
        let json = serde_json::to_value(stats).unwrap();
        assert_eq!(json["files_failed"], 1);
        assert_eq!(json["total_pages"], 42);
    }
}
