//! Integration tests for merging a folder end to end.

use pdffold::config::Config;
use pdffold::output::progress::{NoProgress, ProgressEvent, ProgressStatus};
use pdffold::pipeline::{self, CancelFlag};

use crate::common::{Sandbox, page_count, page_tags, write_corrupt, write_pdf};

#[tokio::test]
async fn test_merge_skips_corrupted_file() {
    let sandbox = Sandbox::new();
    write_pdf(&sandbox.root, "00_Introduction.pdf", 1);
    write_pdf(&sandbox.root, "01_Sets.pdf", 2);
    write_pdf(&sandbox.root, "02_Relations.pdf", 3);
    write_corrupt(&sandbox.root, "03_Broken.pdf");
    write_pdf(&sandbox.root, "04_Functions.pdf", 1);
    write_pdf(&sandbox.root, "99_Conclusion.pdf", 2);

    let mut events = Vec::new();
    let mut sink = |event: &ProgressEvent| events.push(event.clone());
    let summary = pipeline::run(&sandbox.config(), &mut sink, &CancelFlag::new())
        .await
        .expect("Run should succeed with one bad file");

    assert_eq!(summary.stats.files_processed, 5);
    assert_eq!(summary.stats.files_failed, 1);
    assert_eq!(summary.stats.total_pages, 9);
    assert_eq!(summary.skipped.len(), 1);
    assert_eq!(summary.skipped[0].file.name, "03_Broken.pdf");
    assert!(!summary.skipped[0].reason.is_empty());

    assert_eq!(events.len(), 6);
    assert!(events.iter().all(|e| e.total == 6));
    assert_eq!(events[3].status, ProgressStatus::Skipped);
    assert!(events[5].is_last());

    let output = sandbox.root.join("course.pdf");
    assert_eq!(summary.output_path, output);
    assert_eq!(page_count(&output), summary.stats.total_pages);
    assert_eq!(
        page_tags(&output),
        vec![
            "00_Introduction:1",
            "01_Sets:1",
            "01_Sets:2",
            "02_Relations:1",
            "02_Relations:2",
            "02_Relations:3",
            "04_Functions:1",
            "99_Conclusion:1",
            "99_Conclusion:2",
        ]
    );
    assert_eq!(
        summary.stats.output_size_bytes,
        std::fs::metadata(&output).unwrap().len()
    );
}

#[tokio::test]
async fn test_recursive_includes_subfolders() {
    let sandbox = Sandbox::new();
    write_pdf(&sandbox.root, "A.pdf", 1);
    write_pdf(&sandbox.root, "sub/B.pdf", 1);

    let flat = pipeline::plan(&sandbox.config()).await.unwrap();
    let flat_names: Vec<_> = flat.files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(flat_names, vec!["A.pdf"]);

    let config = Config {
        recursive: true,
        ..sandbox.config()
    };
    let deep = pipeline::plan(&config).await.unwrap();
    let deep_names: Vec<_> = deep.files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(deep_names, vec!["A.pdf", "B.pdf"]);
}

#[tokio::test]
async fn test_rerun_is_byte_identical() {
    let sandbox = Sandbox::new();
    write_pdf(&sandbox.root, "Lecture 1.pdf", 2);
    write_pdf(&sandbox.root, "Lecture 2.pdf", 1);

    let config = Config {
        output_name: Some("Notes".to_string()),
        ..sandbox.config()
    };

    let first = pipeline::run(&config, &mut NoProgress, &CancelFlag::new())
        .await
        .unwrap();
    let first_bytes = std::fs::read(&first.output_path).unwrap();

    let second = pipeline::run(&config, &mut NoProgress, &CancelFlag::new())
        .await
        .unwrap();
    let second_bytes = std::fs::read(&second.output_path).unwrap();

    assert_eq!(first.output_path, second.output_path);
    assert_eq!(second.stats.files_processed, 2);
    assert_eq!(first_bytes, second_bytes);
}

#[tokio::test]
async fn test_output_to_separate_destination() {
    let sandbox = Sandbox::new();
    write_pdf(&sandbox.root, "a.pdf", 1);
    let destination = sandbox.dir.path().join("out").join("merged");

    let config = Config {
        output_name: Some("Week: 1?".to_string()),
        destination: Some(destination.clone()),
        ..sandbox.config()
    };
    let summary = pipeline::run(&config, &mut NoProgress, &CancelFlag::new())
        .await
        .unwrap();

    assert_eq!(summary.output_path, destination.join("Week_ 1.pdf"));
    assert!(summary.output_path.exists());
    assert!(!sandbox.root.join("Week_ 1.pdf").exists());
}

#[tokio::test]
async fn test_parallel_loading_keeps_order() {
    let sandbox = Sandbox::new();
    for n in (1..=12).rev() {
        write_pdf(&sandbox.root, &format!("Part {n}.pdf"), 1);
    }

    let config = Config {
        jobs: 4,
        ..sandbox.config()
    };
    let summary = pipeline::run(&config, &mut NoProgress, &CancelFlag::new())
        .await
        .unwrap();

    let expected: Vec<String> = (1..=12).map(|n| format!("Part {n}:1")).collect();
    assert_eq!(page_tags(&summary.output_path), expected);
}
