//! Integration tests for error handling and edge cases.

use pdffold::config::{Config, OverwriteMode};
use pdffold::error::PdfFoldError;
use pdffold::output::progress::NoProgress;
use pdffold::pipeline::{self, CancelFlag};

use crate::common::{Sandbox, write_corrupt, write_pdf};

#[tokio::test]
async fn test_error_missing_root() {
    let sandbox = Sandbox::new();
    let config = Config::for_root(sandbox.root.join("missing"));

    let err = pipeline::run(&config, &mut NoProgress, &CancelFlag::new())
        .await
        .unwrap_err();
    assert!(matches!(err, PdfFoldError::NotFound { .. }));
    assert_eq!(err.exit_code(), 2);
}

#[tokio::test]
async fn test_error_root_is_a_file() {
    let sandbox = Sandbox::new();
    let file = write_pdf(&sandbox.root, "single.pdf", 1);

    let err = pipeline::run(&Config::for_root(file), &mut NoProgress, &CancelFlag::new())
        .await
        .unwrap_err();
    assert!(matches!(err, PdfFoldError::NotADirectory { .. }));
}

#[tokio::test]
async fn test_error_no_pdfs() {
    let sandbox = Sandbox::new();
    std::fs::write(sandbox.root.join("readme.txt"), b"nothing here").unwrap();

    let err = pipeline::run(&sandbox.config(), &mut NoProgress, &CancelFlag::new())
        .await
        .unwrap_err();
    assert!(matches!(err, PdfFoldError::NoMergeableFiles { candidates: 0 }));
    assert!(!sandbox.root.join("course.pdf").exists());
}

#[tokio::test]
async fn test_error_all_files_corrupted() {
    let sandbox = Sandbox::new();
    write_corrupt(&sandbox.root, "a.pdf");
    write_corrupt(&sandbox.root, "b.pdf");

    let err = pipeline::run(&sandbox.config(), &mut NoProgress, &CancelFlag::new())
        .await
        .unwrap_err();
    assert!(matches!(err, PdfFoldError::NoMergeableFiles { candidates: 2 }));
    assert!(!sandbox.root.join("course.pdf").exists());
}

#[tokio::test]
async fn test_error_no_clobber() {
    let sandbox = Sandbox::new();
    write_pdf(&sandbox.root, "a.pdf", 1);
    let existing = sandbox.dir.path().join("course.pdf");
    std::fs::write(&existing, b"keep me").unwrap();

    let config = Config {
        destination: Some(sandbox.dir.path().to_path_buf()),
        overwrite_mode: OverwriteMode::NoClobber,
        ..sandbox.config()
    };
    let err = pipeline::run(&config, &mut NoProgress, &CancelFlag::new())
        .await
        .unwrap_err();

    assert!(matches!(err, PdfFoldError::OutputExists { .. }));
    assert_eq!(std::fs::read(&existing).unwrap(), b"keep me");
}

#[tokio::test]
async fn test_error_cancelled_before_start() {
    let sandbox = Sandbox::new();
    write_pdf(&sandbox.root, "a.pdf", 1);

    let cancel = CancelFlag::new();
    cancel.cancel();
    let err = pipeline::run(&sandbox.config(), &mut NoProgress, &cancel)
        .await
        .unwrap_err();

    assert!(matches!(err, PdfFoldError::Cancelled));
    assert!(!sandbox.root.join("course.pdf").exists());
}

#[tokio::test]
async fn test_error_invalid_exclude_pattern() {
    let sandbox = Sandbox::new();
    let config = Config {
        exclude: vec!["[".to_string()],
        ..sandbox.config()
    };

    let err = pipeline::plan(&config).await.unwrap_err();
    assert!(matches!(err, PdfFoldError::InvalidConfig { .. }));
}
