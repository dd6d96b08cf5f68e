//! Output formatting and display for pdffold.
//!
//! This module handles all user-facing output including:
//! - Formatted status messages
//! - Progress events and their terminal rendering
//! - The merge-order preview and the final summary
//!
//! # Examples
//!
//! ```no_run
//! use pdffold::output::OutputFormatter;
//! use pdffold::config::Config;
//!
//! # fn example(config: Config) {
//! let formatter = OutputFormatter::from_config(&config);
//! formatter.info("Scanning folder");
//! formatter.success("Merge completed successfully");
//! # }
//! ```

pub mod formatter;
pub mod progress;

pub use formatter::{MessageLevel, OutputFormatter};
pub use progress::{NoProgress, ProgressBar, ProgressEvent, ProgressSink, ProgressStatus, ProgressStyle};

use crate::discovery::CandidateFile;
use crate::pipeline::RunSummary;
use crate::utils::format_file_size;

/// Number of files listed before the preview is cut short.
pub const PREVIEW_LIMIT: usize = 10;

/// Lines of the merge-order preview: the first [`PREVIEW_LIMIT`] names,
/// then `... and N more files`.
pub fn preview_lines(files: &[CandidateFile]) -> Vec<String> {
    let mut lines: Vec<String> = files
        .iter()
        .take(PREVIEW_LIMIT)
        .enumerate()
        .map(|(idx, file)| format!("{}. {}", idx + 1, file.name))
        .collect();

    if files.len() > PREVIEW_LIMIT {
        lines.push(format!("... and {} more files", files.len() - PREVIEW_LIMIT));
    }

    lines
}

/// Print the merge order.
pub fn display_preview(formatter: &OutputFormatter, files: &[CandidateFile]) {
    formatter.section(&format!("Merge order ({} files):", files.len()));
    for line in preview_lines(files) {
        formatter.indented(&line);
    }
    formatter.blank_line();
}

/// Print the final summary of a run.
pub fn display_summary(formatter: &OutputFormatter, summary: &RunSummary) {
    let stats = &summary.stats;

    if summary.dry_run {
        formatter.success(&format!(
            "Dry run: {} file(s) would be merged ({} pages)",
            stats.files_processed, stats.total_pages
        ));
        formatter.detail("Output", &summary.output_path.display().to_string());
    } else {
        formatter.success(&format!(
            "Merged {} file(s) into {}",
            stats.files_processed,
            summary.output_path.display()
        ));
        formatter.detail("Pages", &stats.total_pages.to_string());
        formatter.detail("Size", &format_file_size(stats.output_size_bytes));
    }
    formatter.detail("Time", &format!("{:.2}s", summary.elapsed.as_secs_f64()));

    if !summary.skipped.is_empty() {
        formatter.warning(&format!("Skipped {} file(s):", summary.skipped.len()));
        for skipped in &summary.skipped {
            formatter.warning(&format!("  {}: {}", skipped.file.name, skipped.reason));
        }
    }
}
