//! Page tree splicing.
//!
//! [`PageAccumulator`] builds the output document one source document at a
//! time. The first accepted document becomes the base; pages of later
//! documents are renumbered past the base's object ids and hung directly
//! under the base's root `Pages` node.
//!
//! Moving a page to another tree would change what it inherits, so
//! inheritable attributes (`Resources`, `MediaBox`, `CropBox`, `Rotate`) are
//! copied from the source tree onto each page first.

use lopdf::{Document, Object, ObjectId};

use crate::error::{PdfFoldError, Result};

/// Attributes a page may inherit from its ancestors.
const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Guard against cyclic or absurdly deep page trees.
const MAX_TREE_DEPTH: usize = 64;

struct Base {
    document: Document,
    pages_id: ObjectId,
}

/// Accumulates pages from several documents into one.
#[derive(Default)]
pub struct PageAccumulator {
    base: Option<Base>,
    page_count: usize,
}

impl PageAccumulator {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append every page of `doc`, in order, after the pages appended so far.
    ///
    /// Returns the number of pages added. On error the accumulated document is
    /// left unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`PdfFoldError::MergeFailed`] if `doc` has no pages or its page
    /// tree is malformed.
    pub fn append(&mut self, doc: Document) -> Result<usize> {
        if doc.get_pages().is_empty() {
            return Err(PdfFoldError::merge_failed("PDF has no pages"));
        }

        let added = if let Some(base) = self.base.as_mut() {
            append_to_base(base, doc)?
        } else {
            let base = prepare_base(doc)?;
            let added = base.document.get_pages().len();
            self.base = Some(base);
            added
        };

        self.page_count += added;
        Ok(added)
    }

    /// Number of pages appended so far.
    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Whether nothing has been appended yet.
    pub fn is_empty(&self) -> bool {
        self.base.is_none()
    }

    /// Take the accumulated document, if anything was appended.
    pub fn into_document(self) -> Option<Document> {
        self.base.map(|base| base.document)
    }
}

/// Make the first document self-contained: every page carries its own
/// inheritable attributes and the root `Pages` node carries none, so pages
/// appended later cannot pick up the base's settings.
fn prepare_base(mut doc: Document) -> Result<Base> {
    let pages_id = root_pages_id(&doc)?;

    let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();
    for &page_id in &page_ids {
        flatten_inherited(&mut doc, page_id)?;
    }

    let root = pages_dict_mut(&mut doc, pages_id)?;
    for key in INHERITABLE_KEYS {
        root.remove(key);
    }

    Ok(Base {
        document: doc,
        pages_id,
    })
}

fn append_to_base(base: &mut Base, mut doc: Document) -> Result<usize> {
    doc.renumber_objects_with(base.document.max_id + 1);

    let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();
    for &page_id in &page_ids {
        flatten_inherited(&mut doc, page_id)?;
        set_parent(&mut doc, page_id, base.pages_id)?;
    }
    drop_structure_nodes(&mut doc);

    add_pages_to_tree(&mut base.document, base.pages_id, &page_ids)?;
    base.document.max_id = base.document.max_id.max(doc.max_id);
    base.document.objects.extend(doc.objects);

    Ok(page_ids.len())
}

fn root_pages_id(doc: &Document) -> Result<ObjectId> {
    doc.catalog()
        .and_then(|catalog| catalog.get(b"Pages"))
        .and_then(Object::as_reference)
        .map_err(|e| PdfFoldError::merge_failed(format!("Failed to get pages reference: {e}")))
}

fn pages_dict_mut(doc: &mut Document, pages_id: ObjectId) -> Result<&mut lopdf::Dictionary> {
    match doc.get_object_mut(pages_id) {
        Ok(Object::Dictionary(dict)) => Ok(dict),
        Ok(_) => Err(PdfFoldError::merge_failed("Pages object is not a dictionary")),
        Err(e) => Err(PdfFoldError::merge_failed(format!(
            "Failed to get pages object: {e}"
        ))),
    }
}

/// Copy attributes the page inherits from its ancestors onto the page itself.
fn flatten_inherited(doc: &mut Document, page_id: ObjectId) -> Result<()> {
    let mut inherited: Vec<(&[u8], Object)> = Vec::new();

    {
        let page = doc
            .get_dictionary(page_id)
            .map_err(|e| PdfFoldError::merge_failed(format!("Failed to get page: {e}")))?;

        let mut missing: Vec<&[u8]> = INHERITABLE_KEYS
            .into_iter()
            .filter(|key| !page.has(key))
            .collect();
        let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
        let mut depth = 0;

        while let Some(parent_id) = parent {
            if missing.is_empty() || depth >= MAX_TREE_DEPTH {
                break;
            }
            let Ok(node) = doc.get_dictionary(parent_id) else {
                break;
            };

            missing.retain(|key| match node.get(key) {
                Ok(value) => {
                    inherited.push((*key, value.clone()));
                    false
                }
                Err(_) => true,
            });

            parent = node.get(b"Parent").and_then(Object::as_reference).ok();
            depth += 1;
        }
    }

    if inherited.is_empty() {
        return Ok(());
    }

    match doc.get_object_mut(page_id) {
        Ok(Object::Dictionary(page)) => {
            for (key, value) in inherited {
                page.set(key, value);
            }
            Ok(())
        }
        _ => Err(PdfFoldError::merge_failed("Page object is not a dictionary")),
    }
}

fn set_parent(doc: &mut Document, page_id: ObjectId, parent_id: ObjectId) -> Result<()> {
    match doc.get_object_mut(page_id) {
        Ok(Object::Dictionary(page)) => {
            page.set("Parent", Object::Reference(parent_id));
            Ok(())
        }
        _ => Err(PdfFoldError::merge_failed("Page object is not a dictionary")),
    }
}

/// Remove the appended document's catalog and page tree nodes. Its pages now
/// hang off the base tree and nothing else may point at them.
fn drop_structure_nodes(doc: &mut Document) {
    doc.objects.retain(|_, object| {
        let kind = object
            .as_dict()
            .and_then(|dict| dict.get(b"Type"))
            .and_then(Object::as_name);
        !matches!(kind, Ok(name) if name == b"Catalog" || name == b"Pages")
    });
}

/// Push `page_ids` onto the root `Kids` array and bump `Count`.
fn add_pages_to_tree(doc: &mut Document, pages_id: ObjectId, page_ids: &[ObjectId]) -> Result<()> {
    let dict = pages_dict_mut(doc, pages_id)?;

    let kids = dict
        .get_mut(b"Kids")
        .map_err(|_| PdfFoldError::merge_failed("Pages dictionary missing Kids array"))?;

    match kids {
        Object::Array(kids_array) => {
            kids_array.extend(page_ids.iter().map(|&id| Object::Reference(id)));
        }
        _ => return Err(PdfFoldError::merge_failed("Kids is not an array")),
    }

    let current_count = dict.get(b"Count").and_then(|c| c.as_i64()).unwrap_or(0);
    dict.set("Count", Object::Integer(current_count + page_ids.len() as i64));

    Ok(())
}
