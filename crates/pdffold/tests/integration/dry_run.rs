//! Integration tests for dry-run functionality.

use pdffold::config::Config;
use pdffold::output::progress::ProgressEvent;
use pdffold::pipeline::{self, CancelFlag};

use crate::common::{Sandbox, write_corrupt, write_pdf};

#[tokio::test]
async fn test_dry_run_does_not_create_output() {
    let sandbox = Sandbox::new();
    write_pdf(&sandbox.root, "one.pdf", 2);
    write_pdf(&sandbox.root, "two.pdf", 3);

    let config = Config {
        dry_run: true,
        ..sandbox.config()
    };

    let mut seen = 0;
    let mut sink = |_: &ProgressEvent| seen += 1;
    let summary = pipeline::run(&config, &mut sink, &CancelFlag::new())
        .await
        .expect("Dry run failed");

    assert_eq!(seen, 2);
    assert!(summary.dry_run);
    assert_eq!(summary.stats.total_pages, 5);
    assert_eq!(summary.stats.output_size_bytes, 0);
    assert!(!summary.output_path.exists(), "Dry run must not write output");
}

#[tokio::test]
async fn test_dry_run_reports_skipped_files() {
    let sandbox = Sandbox::new();
    write_pdf(&sandbox.root, "good.pdf", 1);
    write_corrupt(&sandbox.root, "bad.pdf");

    let config = Config {
        dry_run: true,
        ..sandbox.config()
    };
    let summary = pipeline::run(&config, &mut |_: &ProgressEvent| {}, &CancelFlag::new())
        .await
        .unwrap();

    assert_eq!(summary.merged.len(), 1);
    assert_eq!(summary.skipped.len(), 1);
    assert_eq!(summary.skipped[0].file.name, "bad.pdf");
}

#[tokio::test]
async fn test_dry_run_summary_as_json() {
    let sandbox = Sandbox::new();
    write_pdf(&sandbox.root, "only.pdf", 1);

    let config = Config {
        dry_run: true,
        json: true,
        ..sandbox.config()
    };
    let summary = pipeline::run(&config, &mut |_: &ProgressEvent| {}, &CancelFlag::new())
        .await
        .unwrap();

    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["dry_run"], true);
    assert_eq!(json["stats"]["total_pages"], 1);
    assert_eq!(json["merged"][0]["name"], "only.pdf");
}
