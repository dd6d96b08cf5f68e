//! Shared helpers: generated PDFs and sandbox folders.

#![allow(dead_code)]

use lopdf::{Document, Object, Stream, dictionary};
use pdffold::config::Config;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Page dictionary key recording which file and page a page came from.
pub const TAG_KEY: &str = "PdfFoldTag";

/// Build a document with `pages` pages tagged `"{tag}:{n}"`.
pub fn build_pdf(pages: usize, tag: &str) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let mut kids = Vec::new();
    for n in 1..=pages {
        let content = format!("BT /F1 18 Tf 72 720 Td ({tag} {n}) Tj ET");
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            TAG_KEY => Object::string_literal(format!("{tag}:{n}")),
        });
        kids.push(Object::Reference(page_id));
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    doc
}

/// Write a generated PDF to `dir/name`, creating parent folders.
pub fn write_pdf(dir: &Path, name: &str, pages: usize) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create fixture folder");
    }
    let tag = Path::new(name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    build_pdf(pages, &tag)
        .save(&path)
        .expect("Failed to write fixture PDF");
    path
}

/// Write a file that has a `.pdf` name but is not a PDF.
pub fn write_corrupt(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"%PDF-1.4\nthis is not really a pdf").expect("Failed to write fixture");
    path
}

/// Tags of every page of the PDF at `path`, in page order.
pub fn page_tags(path: &Path) -> Vec<String> {
    let doc = Document::load(path).expect("Failed to load merged PDF");
    doc.get_pages()
        .into_values()
        .map(|page_id| {
            let page = doc.get_dictionary(page_id).expect("Page is not a dictionary");
            let tag = page
                .get(TAG_KEY.as_bytes())
                .and_then(Object::as_str)
                .expect("Page has no tag");
            String::from_utf8_lossy(tag).into_owned()
        })
        .collect()
}

/// Number of pages of the PDF at `path`.
pub fn page_count(path: &Path) -> usize {
    Document::load(path)
        .expect("Failed to load merged PDF")
        .get_pages()
        .len()
}

/// A sandbox with a `course` folder inside, so outputs can also be placed
/// outside the source folder.
pub struct Sandbox {
    pub dir: TempDir,
    pub root: PathBuf,
}

impl Sandbox {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let root = dir.path().join("course");
        std::fs::create_dir(&root).expect("Failed to create course folder");
        Self { dir, root }
    }

    /// Quiet configuration over the course folder.
    pub fn config(&self) -> Config {
        Config {
            quiet: true,
            ..Config::for_root(&self.root)
        }
    }
}
