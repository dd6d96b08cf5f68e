//! Publishing the merged document.
//!
//! The finalizer picks the target path according to the [`OverwriteMode`],
//! creates the destination directory and writes the document atomically
//! through [`PdfWriter`]. Target resolution is separate from writing so a
//! run can fail early (no-clobber) or report the path without writing (dry
//! run).

use chrono::{Local, NaiveDateTime};
use lopdf::Document;
use std::path::{Path, PathBuf};

use crate::config::{CompressionLevel, Config, OutputSpec, OverwriteMode};
use crate::error::{PdfFoldError, Result};
use crate::io::PdfWriter;
use crate::merge::RunStats;

/// Format of the suffix added in timestamp mode.
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Writes the merged document to its final location.
#[derive(Debug, Clone)]
pub struct OutputFinalizer {
    writer: PdfWriter,
    overwrite_mode: OverwriteMode,
}

impl OutputFinalizer {
    /// Create a finalizer.
    pub fn new(compression: CompressionLevel, overwrite_mode: OverwriteMode) -> Self {
        Self {
            writer: PdfWriter::with_compression(compression),
            overwrite_mode,
        }
    }

    /// Create a finalizer using the compression and overwrite mode of `config`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.compression, config.overwrite_mode)
    }

    /// Decide which path the output will be written to.
    ///
    /// # Errors
    ///
    /// Returns [`PdfFoldError::OutputExists`] in no-clobber mode when the
    /// target already exists.
    pub async fn resolve_target(&self, spec: &OutputSpec) -> Result<PathBuf> {
        let path = spec.output_path();
        if !self.writer.exists(&path).await {
            return Ok(path);
        }

        match self.overwrite_mode {
            OverwriteMode::Overwrite => Ok(path),
            OverwriteMode::NoClobber => Err(PdfFoldError::output_exists(path)),
            OverwriteMode::Timestamp => {
                let now = Local::now().naive_local();
                let mut attempt = 1;
                loop {
                    let candidate = spec
                        .destination_dir
                        .join(timestamped_name(&spec.output_name, now, attempt));
                    if !self.writer.exists(&candidate).await {
                        return Ok(candidate);
                    }
                    attempt += 1;
                }
            }
        }
    }

    /// Create the destination directory and write `document` to `target`.
    ///
    /// Returns `stats` with `output_size_bytes` filled in.
    ///
    /// # Errors
    ///
    /// - [`PdfFoldError::FailedToCreateOutput`] if the directory cannot be
    ///   created
    /// - any error of [`PdfWriter::save_with_stats`]
    pub async fn finalize(
        &self,
        target: &Path,
        document: Document,
        mut stats: RunStats,
    ) -> Result<RunStats> {
        if let Some(dir) = target.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| PdfFoldError::FailedToCreateOutput {
                    path: dir.to_path_buf(),
                    source: e,
                })?;
        }

        let written = self.writer.save_with_stats(document, target).await?;
        stats.output_size_bytes = written.file_size;

        tracing::info!(
            path = %written.output_path.display(),
            pages = stats.total_pages,
            bytes = written.file_size,
            "output written"
        );

        Ok(stats)
    }
}

/// `<stem>_<YYYYMMDD_HHMMSS>.<ext>`, with `_<attempt>` appended after the
/// first attempt.
pub fn timestamped_name(output_name: &str, at: NaiveDateTime, attempt: usize) -> String {
    let path = Path::new(output_name);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| output_name.to_string());
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "pdf".to_string());
    let stamp = at.format(TIMESTAMP_FORMAT);

    if attempt <= 1 {
        format!("{stem}_{stamp}.{ext}")
    } else {
        format!("{stem}_{stamp}_{attempt}.{ext}")
    }
}

/// Whether `file_name` looks like an output of this run written in timestamp
/// mode (`<stem>_<8 digits>_<6 digits>[_<n>].<ext>`).
pub fn is_timestamped_variant(file_name: &str, output_name: &str) -> bool {
    let output = Path::new(output_name);
    let (Some(stem), Some(ext)) = (output.file_stem(), output.extension()) else {
        return false;
    };
    let candidate = Path::new(file_name);
    let (Some(c_stem), Some(c_ext)) = (candidate.file_stem(), candidate.extension()) else {
        return false;
    };

    if !c_ext.eq_ignore_ascii_case(ext) {
        return false;
    }

    let stem = stem.to_string_lossy();
    let c_stem = c_stem.to_string_lossy();
    let Some(suffix) = c_stem
        .strip_prefix(stem.as_ref())
        .and_then(|rest| rest.strip_prefix('_'))
    else {
        return false;
    };

    let mut parts = suffix.split('_');
    let date_ok = parts
        .next()
        .is_some_and(|p| p.len() == 8 && p.bytes().all(|b| b.is_ascii_digit()));
    let time_ok = parts
        .next()
        .is_some_and(|p| p.len() == 6 && p.bytes().all(|b| b.is_ascii_digit()));
    let attempt_ok = match parts.next() {
        None => true,
        Some(p) => !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()),
    };

    date_ok && time_ok && attempt_ok && parts.next().is_none()
}
