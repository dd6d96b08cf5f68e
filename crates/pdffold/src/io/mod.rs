//! Reading source PDFs and writing the merged document.
//!
//! - [`reader`] opens documents through the [`DocumentLoader`] seam, with a
//!   per-file timeout for use inside the async merge loop
//! - [`writer`] persists a document atomically with optional compression
//!
//! # Examples
//!
//! ```no_run
//! use pdffold::io::{DocumentLoader, PdfReader, PdfWriter};
//! use std::path::Path;
//!
//! # async fn example() -> pdffold::Result<()> {
//! let loaded = PdfReader::new().load(Path::new("input.pdf"))?;
//!
//! let writer = PdfWriter::new();
//! writer.save(loaded.document, Path::new("output.pdf")).await?;
//! # Ok(())
//! # }
//! ```

pub mod reader;
pub mod writer;

pub use reader::{DocumentLoader, LoadedPdf, PdfReader, load_with_timeout};
pub use writer::{PdfWriter, WriteOptions, WriteStatistics};
