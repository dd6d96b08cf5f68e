//! Discovery of candidate documents under a folder.
//!
//! The locator walks the source folder (optionally recursively) and returns
//! every regular file whose extension is recognised. Discovery order is the
//! walk order with entries sorted by file name, so it is stable between runs,
//! but callers should not depend on it: [`crate::ordering`] re-sorts the list.
//!
//! # Examples
//!
//! ```no_run
//! use pdffold::discovery::DocumentLocator;
//! use std::path::Path;
//!
//! # fn example() -> pdffold::Result<()> {
//! let locator = DocumentLocator::new();
//! let files = locator.discover(Path::new("lectures"), true)?;
//! for file in &files {
//!     println!("{}", file.name);
//! }
//! # Ok(())
//! # }
//! ```

use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::Serialize;
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::Config;
use crate::error::{PdfFoldError, Result};

/// A discovered file that is expected to be a PDF.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CandidateFile {
    /// Absolute path to the file.
    pub path: PathBuf,
    /// File name including extension.
    pub name: String,
}

impl CandidateFile {
    /// Build a candidate from a path, taking the name from its last component.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { path, name }
    }
}

/// Walks a folder and collects [`CandidateFile`]s.
#[derive(Debug, Clone)]
pub struct DocumentLocator {
    extensions: Vec<String>,
    exclude: Option<GlobSet>,
    skip_paths: Vec<PathBuf>,
}

impl DocumentLocator {
    /// Create a locator that accepts `.pdf` files.
    pub fn new() -> Self {
        Self {
            extensions: vec!["pdf".to_string()],
            exclude: None,
            skip_paths: Vec::new(),
        }
    }

    /// Create a locator using the extensions and exclude patterns of `config`.
    ///
    /// # Errors
    ///
    /// Returns [`PdfFoldError::InvalidConfig`] if an exclude pattern is invalid.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new()
            .with_extensions(config.normalized_extensions())
            .excluding_globs(&config.exclude)
    }

    /// Replace the accepted extensions (compared case-insensitively).
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extensions = extensions
            .into_iter()
            .map(|ext| ext.as_ref().trim_start_matches('.').to_lowercase())
            .collect();
        self
    }

    /// Leave out files whose path relative to the root matches any pattern.
    ///
    /// # Errors
    ///
    /// Returns [`PdfFoldError::InvalidConfig`] if a pattern cannot be parsed.
    pub fn excluding_globs<I, S>(mut self, patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = GlobSetBuilder::new();
        let mut any = false;

        for pattern in patterns {
            let pattern = pattern.as_ref();
            let glob = Glob::new(pattern).map_err(|err| {
                PdfFoldError::invalid_config(format!("Invalid exclude pattern '{pattern}': {err}"))
            })?;
            builder.add(glob);
            any = true;
        }

        if any {
            let set = builder
                .build()
                .map_err(|err| PdfFoldError::invalid_config(err.to_string()))?;
            self.exclude = Some(set);
        }

        Ok(self)
    }

    /// Never return `path`, even if it matches. Used for the run's own output.
    pub fn excluding_path(mut self, path: &Path) -> Self {
        let resolved = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        self.skip_paths.push(resolved);
        self
    }

    /// Discover candidate files under `root`.
    ///
    /// # Errors
    ///
    /// - [`PdfFoldError::NotFound`] if `root` does not exist
    /// - [`PdfFoldError::NotADirectory`] if `root` is not a directory
    ///
    /// An empty folder is not an error; the returned list is simply empty.
    pub fn discover(&self, root: &Path, recursive: bool) -> Result<Vec<CandidateFile>> {
        let root = check_root(root)?;
        let max_depth = if recursive { usize::MAX } else { 1 };

        let mut seen = HashSet::new();
        let mut candidates = Vec::new();

        let walker = WalkDir::new(&root)
            .min_depth(1)
            .max_depth(max_depth)
            .sort_by_file_name();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::warn!(error = %err, "skipping unreadable entry during discovery");
                    continue;
                }
            };

            let path = entry.path();
            let file_type = entry.file_type();
            let is_file = file_type.is_file() || (file_type.is_symlink() && path.is_file());
            if !is_file || !self.has_accepted_extension(path) || self.is_excluded(&root, path) {
                continue;
            }

            let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
            if self.skip_paths.contains(&canonical) {
                tracing::warn!(
                    path = %path.display(),
                    "leaving out a source file that has the output's name"
                );
                continue;
            }
            if !seen.insert(canonical) {
                tracing::debug!(path = %path.display(), "skipping duplicate");
                continue;
            }

            tracing::debug!(path = %path.display(), "found candidate");
            candidates.push(CandidateFile::from_path(entry.into_path()));
        }

        tracing::debug!(
            root = %root.display(),
            recursive,
            count = candidates.len(),
            "discovery finished"
        );

        Ok(candidates)
    }

    fn has_accepted_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext = ext.to_lowercase();
                self.extensions.iter().any(|accepted| *accepted == ext)
            })
            .unwrap_or(false)
    }

    fn is_excluded(&self, root: &Path, path: &Path) -> bool {
        let Some(exclude) = &self.exclude else {
            return false;
        };
        let relative = path.strip_prefix(root).unwrap_or(path);
        exclude.is_match(relative)
    }
}

impl Default for DocumentLocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Check that `root` is an existing directory and return its canonical form.
pub fn check_root(root: &Path) -> Result<PathBuf> {
    let metadata = std::fs::metadata(root).map_err(|err| match err.kind() {
        io::ErrorKind::NotFound => PdfFoldError::file_not_found(root.to_path_buf()),
        _ => PdfFoldError::Io { source: err },
    })?;

    if !metadata.is_dir() {
        return Err(PdfFoldError::not_a_directory(root.to_path_buf()));
    }

    Ok(root.canonicalize()?)
}
