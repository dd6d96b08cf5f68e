//! pdffold - Fold a folder of PDFs into a single document.
//!
//! Course notes, lecture slides and scanned chapters tend to live as a
//! folder of separate PDFs. This library finds them, puts them into reading
//! order and concatenates their pages:
//!
//! - Discovery with optional recursion, extension and exclude filters
//! - Reading order: introductions first, conclusions last, numbers compared
//!   by value, Latin and Cyrillic names collated case-insensitively
//! - A merge that skips unreadable files instead of failing the run
//! - Atomic output with a choice of overwrite behaviour
//!
//! # Examples
//!
//! ## Whole run
//!
//! ```no_run
//! use pdffold::config::Config;
//! use pdffold::output::progress::ProgressEvent;
//! use pdffold::pipeline::{self, CancelFlag};
//!
//! # async fn example() -> pdffold::Result<()> {
//! let config = Config {
//!     recursive: true,
//!     output_name: Some("Algebra".to_string()),
//!     ..Config::for_root("courses/algebra")
//! };
//!
//! let mut sink = |event: &ProgressEvent| println!("[{}/{}] {}", event.index, event.total, event.file_name);
//! let summary = pipeline::run(&config, &mut sink, &CancelFlag::new()).await?;
//! println!("Created {} page document", summary.stats.total_pages);
//! # Ok(())
//! # }
//! ```
//!
//! ## Using Individual Components
//!
//! ```no_run
//! use pdffold::discovery::DocumentLocator;
//! use pdffold::ordering::OrderingRules;
//! use std::path::Path;
//!
//! # fn example() -> pdffold::Result<()> {
//! let files = DocumentLocator::new().discover(Path::new("lectures"), false)?;
//! for file in OrderingRules::default().sort(files) {
//!     println!("{}", file.name);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod discovery;
pub mod error;
pub mod finalize;
pub mod io;
pub mod merge;
pub mod ordering;
pub mod output;
pub mod pipeline;
pub mod utils;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use config::Config;
pub use error::{PdfFoldError, Result};
pub use pipeline::{CancelFlag, RunSummary};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
