//! PDF fixtures for unit tests, generated with `lopdf`.

use lopdf::{Document, Object, Stream, dictionary};
use std::path::{Path, PathBuf};

/// Page dictionary key that records where a page came from.
pub(crate) const TAG_KEY: &str = "PdfFoldTag";

/// Build a document with `pages` pages tagged `"{tag}:{n}"`.
///
/// `MediaBox` and `Resources` live on the `Pages` node, so pages rely on
/// inheritance.
pub(crate) fn build_document(pages: usize, tag: &str) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids = Vec::new();
    for n in 1..=pages {
        let content = format!("BT /F1 24 Tf 72 720 Td ({tag} page {n}) Tj ET");
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
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
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    doc
}

/// Write a generated document to `dir/name`.
pub(crate) fn write_pdf(dir: &Path, name: &str, pages: usize, tag: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    build_document(pages, tag).save(&path).unwrap();
    path
}

/// Write arbitrary bytes to `dir/name`.
pub(crate) fn write_raw(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

/// Tags of every page in page order.
pub(crate) fn page_tags(doc: &Document) -> Vec<String> {
    doc.get_pages()
        .into_values()
        .map(|page_id| {
            let page = doc.get_dictionary(page_id).unwrap();
            let tag = page.get(TAG_KEY.as_bytes()).unwrap().as_str().unwrap();
            String::from_utf8_lossy(tag).into_owned()
        })
        .collect()
}
