//! Merging ordered documents into one.
//!
//! - [`merger`] drives the per-file loop, progress events and statistics
//! - [`pages`] splices page trees together
//!
//! # Examples
//!
//! ```no_run
//! use pdffold::config::Config;
//! use pdffold::discovery::DocumentLocator;
//! use pdffold::merge::Merger;
//! use pdffold::output::progress::NoProgress;
//! use pdffold::pipeline::CancelFlag;
//! use std::path::Path;
//!
//! # async fn example(config: Config) -> pdffold::Result<()> {
//! let files = DocumentLocator::from_config(&config)?.discover(Path::new("course"), false)?;
//! let files = config.ordering_rules().sort(files);
//!
//! let merged = Merger::from_config(&config)
//!     .merge(&files, &mut NoProgress, &CancelFlag::new())
//!     .await?;
//! println!(
//!     "Merged {} files into {} pages",
//!     merged.stats.files_processed, merged.stats.total_pages
//! );
//! # Ok(())
//! # }
//! ```

pub mod merger;
pub mod pages;

pub use merger::{FileOutcome, MergeResult, MergedDocument, Merger, RunStats, SkippedFile};
pub use pages::PageAccumulator;
