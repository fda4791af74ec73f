//! Combining pages of several PDFs into one document.

use anyhow::{anyhow, Context, Result};
use lopdf::{dictionary, Document, Object, ObjectId};

use super::document::{inherited_attribute, PdfDocument, INHERITABLE_KEYS};
use crate::artifact::{Artifact, Upload};
use crate::error::ToolError;
use crate::page_range;
use crate::selection::PageSelection;

pub const MERGED_FILE_NAME: &str = "merged.pdf";

/// Merge the chosen pages of every source into a fresh document.
///
/// Each part is a source document and the zero-based pages to take from it, in
/// output order. Sources are imported under an object ID offset so their
/// objects cannot collide; the chosen pages are then re-parented under a new
/// page tree and everything no longer reachable is pruned.
pub fn merge_documents(parts: Vec<(Document, Vec<usize>)>) -> Result<Document> {
    let mut merged = Document::with_version("1.5");
    let pages_id = merged.new_object_id();
    let mut kids = Vec::new();

    for (source_index, (source, pages)) in parts.into_iter().enumerate() {
        if pages.is_empty() {
            continue;
        }

        let source_pages: Vec<ObjectId> = source.get_pages().into_values().collect();
        let mut chosen = Vec::with_capacity(pages.len());
        for &page in &pages {
            let page_id = *source_pages.get(page).ok_or_else(|| {
                anyhow!(
                    "Page {} is out of range (1-{}) in input {}",
                    page + 1,
                    source_pages.len(),
                    source_index + 1
                )
            })?;
            // resolve inheritance now, the source page tree is discarded below
            let inherited: Vec<(Vec<u8>, Object)> = INHERITABLE_KEYS
                .iter()
                .filter_map(|&key| {
                    inherited_attribute(&source, page_id, key).map(|value| (key.to_vec(), value))
                })
                .collect();
            chosen.push((page_id, inherited));
        }

        let offset = merged.max_id;
        let source_max_id = source.max_id;
        for (id, object) in source.objects {
            merged
                .objects
                .insert((id.0 + offset, id.1), remap_object_refs(object, offset));
        }
        merged.max_id = merged.max_id.max(source_max_id + offset);

        for (page_id, inherited) in chosen {
            let new_id = (page_id.0 + offset, page_id.1);
            let page = merged
                .get_dictionary_mut(new_id)
                .with_context(|| format!("Page object {:?} is not a dictionary", page_id))?;
            for (key, value) in inherited {
                if !page.has(&key) {
                    page.set(key, remap_object_refs(value, offset));
                }
            }
            page.set("Parent", pages_id);
            kids.push(Object::Reference(new_id));
        }

        tracing::debug!(source = source_index, pages = pages.len(), offset, "imported source");
    }

    if kids.is_empty() {
        return Err(ToolError::NothingSelected.into());
    }

    let count = kids.len() as i64;
    merged.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = merged.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    merged.trailer.set("Root", catalog_id);

    merged.prune_objects();
    merged.renumber_objects();
    Ok(merged)
}

/// Recursively shift every object reference by `offset`
fn remap_object_refs(object: Object, offset: u32) -> Object {
    match object {
        Object::Reference(id) => Object::Reference((id.0 + offset, id.1)),
        Object::Array(values) => Object::Array(
            values
                .into_iter()
                .map(|value| remap_object_refs(value, offset))
                .collect(),
        ),
        Object::Dictionary(mut dict) => {
            for (_, value) in dict.iter_mut() {
                *value = remap_object_refs(std::mem::replace(value, Object::Null), offset);
            }
            Object::Dictionary(dict)
        }
        Object::Stream(mut stream) => {
            for (_, value) in stream.dict.iter_mut() {
                *value = remap_object_refs(std::mem::replace(value, Object::Null), offset);
            }
            Object::Stream(stream)
        }
        other => other,
    }
}

/// Merge uploaded PDFs, taking `pages` from each file and honouring the
/// per-page checkboxes in `selection`
pub fn merge(uploads: &[Upload], pages: Option<&str>, selection: &PageSelection) -> Result<Artifact> {
    if uploads.len() < 2 {
        return Err(ToolError::NotEnoughInputs {
            operation: "Merge",
            required: 2,
            given: uploads.len(),
        }
        .into());
    }

    tracing::debug!(
        files = uploads.len(),
        deselected = selection.deselected_count(),
        "merging"
    );
    let mut parts = Vec::with_capacity(uploads.len());
    for (file_index, upload) in uploads.iter().enumerate() {
        let doc = PdfDocument::load(upload)?;
        let resolved = page_range::resolve_opt(pages, doc.page_count())
            .with_context(|| format!("Bad page range for {}", upload.file_name))?;
        let chosen = selection.apply(file_index, &resolved);
        tracing::debug!(file = %upload.file_name, pages = ?chosen, "pages chosen for merge");
        parts.push((doc.doc, chosen));
    }

    let mut merged = merge_documents(parts)?;
    let bytes = PdfDocument::to_bytes(&mut merged)?;
    Ok(Artifact::pdf(MERGED_FILE_NAME, bytes))
}
