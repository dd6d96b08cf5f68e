//! End-to-end run: discover, order, merge, publish.
//!
//! A run has two stages so callers can show the merge order before any PDF
//! is opened:
//!
//! 1. [`plan`] validates the configuration, resolves the output location,
//!    discovers candidates and sorts them into reading order.
//! 2. [`execute`] merges the planned files and writes the output (unless it
//!    is a dry run).
//!
//! [`run`] does both.
//!
//! # Examples
//!
//! ```no_run
//! use pdffold::config::Config;
//! use pdffold::output::progress::NoProgress;
//! use pdffold::pipeline::{self, CancelFlag};
//!
//! # async fn example() -> pdffold::Result<()> {
//! let config = Config {
//!     recursive: true,
//!     ..Config::for_root("lectures")
//! };
//!
//! let summary = pipeline::run(&config, &mut NoProgress, &CancelFlag::new()).await?;
//! println!(
//!     "{}: {} pages from {} files",
//!     summary.output_path.display(),
//!     summary.stats.total_pages,
//!     summary.stats.files_processed
//! );
//! # Ok(())
//! # }
//! ```

use serde::{Serialize, Serializer};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::config::{Config, OutputSpec, OverwriteMode};
use crate::discovery::{CandidateFile, DocumentLocator, check_root};
use crate::error::{PdfFoldError, Result};
use crate::finalize::{OutputFinalizer, is_timestamped_variant};
use crate::merge::{Merger, RunStats, SkippedFile};
use crate::output::progress::ProgressSink;

/// Shared cancellation flag.
///
/// Clones share the same flag. The merge loop checks it before each file and
/// the pipeline checks it again before writing.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Create a flag that is not raised.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the flag.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether the flag has been raised.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Everything decided before the first PDF is opened.
#[derive(Debug, Clone)]
pub struct RunPlan {
    /// Canonical source folder.
    pub root: PathBuf,
    /// Resolved output location.
    pub output: OutputSpec,
    /// Path that will be written. Differs from `output.output_path()` only in
    /// timestamp mode.
    pub target: PathBuf,
    /// Candidates in merge order.
    pub files: Vec<CandidateFile>,
}

/// Result of a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Written (or, in a dry run, would-be) output path.
    pub output_path: PathBuf,
    /// Whether writing was skipped.
    pub dry_run: bool,
    /// Totals.
    pub stats: RunStats,
    /// Merged files in page order.
    pub merged: Vec<CandidateFile>,
    /// Skipped files with reasons.
    pub skipped: Vec<SkippedFile>,
    /// Wall-clock duration of the run.
    #[serde(rename = "elapsed_ms", serialize_with = "serialize_millis")]
    pub elapsed: Duration,
}

fn serialize_millis<S>(duration: &Duration, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u64(duration.as_millis() as u64)
}

/// Discover and order the files of a run.
///
/// # Errors
///
/// - [`PdfFoldError::InvalidConfig`] if the configuration is invalid
/// - [`PdfFoldError::NotFound`] / [`PdfFoldError::NotADirectory`] for a bad root
/// - [`PdfFoldError::OutputExists`] in no-clobber mode
/// - [`PdfFoldError::NoMergeableFiles`] if nothing matches
pub async fn plan(config: &Config) -> Result<RunPlan> {
    config
        .validate()
        .map_err(|e| PdfFoldError::invalid_config(e.to_string()))?;

    let root = check_root(&config.root)?;
    let output = OutputSpec::resolve(
        &root,
        config.output_name.as_deref(),
        config.destination.as_deref(),
    );

    let target = OutputFinalizer::from_config(config)
        .resolve_target(&output)
        .await?;

    // Keep the run's own output out of its input so re-runs are idempotent.
    let files = DocumentLocator::from_config(config)?
        .excluding_path(&output.output_path())
        .excluding_path(&target)
        .discover(&root, config.recursive)?;

    let files = if config.overwrite_mode == OverwriteMode::Timestamp {
        drop_previous_outputs(files, &output)
    } else {
        files
    };

    if files.is_empty() {
        return Err(PdfFoldError::NoMergeableFiles { candidates: 0 });
    }

    let files = config.ordering_rules().sort(files);
    tracing::info!(
        root = %root.display(),
        files = files.len(),
        output = %target.display(),
        "planned merge"
    );

    Ok(RunPlan {
        root,
        output,
        target,
        files,
    })
}

/// Merge the planned files and, unless this is a dry run, write the output.
///
/// # Errors
///
/// - [`PdfFoldError::NoMergeableFiles`] if every file was skipped
/// - [`PdfFoldError::Cancelled`] if `cancel` was raised
/// - write errors from the finalizer
pub async fn execute<S>(
    plan: RunPlan,
    config: &Config,
    sink: &mut S,
    cancel: &CancelFlag,
) -> Result<RunSummary>
where
    S: ProgressSink + ?Sized,
{
    let start = Instant::now();

    let merged = Merger::from_config(config)
        .merge(&plan.files, sink, cancel)
        .await?;

    if cancel.is_cancelled() {
        return Err(PdfFoldError::Cancelled);
    }

    let stats = if config.dry_run {
        tracing::info!(output = %plan.target.display(), "dry run, nothing written");
        merged.stats
    } else {
        OutputFinalizer::from_config(config)
            .finalize(&plan.target, merged.document, merged.stats)
            .await?
    };

    Ok(RunSummary {
        output_path: plan.target,
        dry_run: config.dry_run,
        stats,
        merged: merged.result.succeeded,
        skipped: merged.result.failed,
        elapsed: start.elapsed(),
    })
}

/// [`plan`] followed by [`execute`].
pub async fn run<S>(config: &Config, sink: &mut S, cancel: &CancelFlag) -> Result<RunSummary>
where
    S: ProgressSink + ?Sized,
{
    let plan = plan(config).await?;
    execute(plan, config, sink, cancel).await
}

fn drop_previous_outputs(files: Vec<CandidateFile>, output: &OutputSpec) -> Vec<CandidateFile> {
    let dest = output
        .destination_dir
        .canonicalize()
        .unwrap_or_else(|_| output.destination_dir.clone());

    files
        .into_iter()
        .filter(|file| {
            let previous = file.path.parent().is_some_and(|dir| dir == dest.as_path())
                && is_timestamped_variant(&file.name, &output.output_name);
            if previous {
                tracing::debug!(path = %file.path.display(), "skipping earlier output");
            }
            !previous
        })
        .collect()
}
