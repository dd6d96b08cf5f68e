//! Integration tests for reading order on real folders.

use pdffold::config::Config;
use pdffold::pipeline;

use crate::common::{Sandbox, write_pdf};

async fn planned_names(config: &Config) -> Vec<String> {
    pipeline::plan(config)
        .await
        .expect("Planning failed")
        .files
        .into_iter()
        .map(|f| f.name)
        .collect()
}

#[tokio::test]
async fn test_course_folder_order() {
    let sandbox = Sandbox::new();
    for name in [
        "Conclusion.pdf",
        "Chapter 10.pdf",
        "chapter 2.pdf",
        "Chapter 1.pdf",
        "Введение.pdf",
        "Appendix.pdf",
    ] {
        write_pdf(&sandbox.root, name, 1);
    }

    assert_eq!(
        planned_names(&sandbox.config()).await,
        vec![
            "Введение.pdf",
            "Appendix.pdf",
            "Chapter 1.pdf",
            "chapter 2.pdf",
            "Chapter 10.pdf",
            "Conclusion.pdf",
        ]
    );
}

#[tokio::test]
async fn test_cyrillic_names_collate_alphabetically() {
    let sandbox = Sandbox::new();
    for name in ["Яблоко.pdf", "ёж.pdf", "Ель.pdf", "Арбуз.pdf"] {
        write_pdf(&sandbox.root, name, 1);
    }

    assert_eq!(
        planned_names(&sandbox.config()).await,
        vec!["Арбуз.pdf", "Ель.pdf", "ёж.pdf", "Яблоко.pdf"]
    );
}

#[tokio::test]
async fn test_extra_markers() {
    let sandbox = Sandbox::new();
    for name in ["b.pdf", "Preface.pdf", "a.pdf", "Epilogue.pdf"] {
        write_pdf(&sandbox.root, name, 1);
    }

    let config = Config {
        intro_markers: vec!["preface".to_string()],
        conclusion_markers: vec!["epilogue".to_string()],
        ..sandbox.config()
    };

    assert_eq!(
        planned_names(&config).await,
        vec!["Preface.pdf", "a.pdf", "b.pdf", "Epilogue.pdf"]
    );
}

#[tokio::test]
async fn test_exclude_glob_and_extensions() {
    let sandbox = Sandbox::new();
    write_pdf(&sandbox.root, "keep.pdf", 1);
    write_pdf(&sandbox.root, "upper.PDF", 1);
    write_pdf(&sandbox.root, "drafts/skip.pdf", 1);
    std::fs::write(sandbox.root.join("notes.txt"), b"text").unwrap();

    let config = Config {
        recursive: true,
        exclude: vec!["drafts/**".to_string()],
        ..sandbox.config()
    };

    assert_eq!(planned_names(&config).await, vec!["keep.pdf", "upper.PDF"]);
}
