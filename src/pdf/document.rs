use anyhow::{Context, Result};
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::path::Path;

use crate::artifact::Upload;
use crate::error::ToolError;

/// Page attributes a page may inherit from its ancestors in the page tree
pub const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// US Letter, the fallback when no MediaBox is found anywhere
const DEFAULT_PAGE_SIZE: (f32, f32) = (612.0, 792.0);

pub struct PdfDocument {
    pub doc: Document,
    pub name: String,
}

impl PdfDocument {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::load(&Upload::read(path)?)
    }

    pub fn load(upload: &Upload) -> Result<Self> {
        let doc = Document::load_mem(&upload.bytes)
            .with_context(|| format!("Failed to open PDF: {}", upload.file_name))?;
        Ok(PdfDocument {
            doc,
            name: upload.file_name.clone(),
        })
    }

    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    /// Page object IDs in page order; position `i` is zero-based page `i`
    pub fn page_ids(&self) -> Vec<ObjectId> {
        self.doc.get_pages().into_values().collect()
    }

    /// Document metadata plus the size of every page
    pub fn get_info(&self) -> PdfInfo {
        let mut info = PdfInfo::default();

        if let Ok(Object::Reference(info_ref)) = self.doc.trailer.get(b"Info") {
            if let Ok(dict) = self.doc.get_dictionary(*info_ref) {
                info.title = get_string_from_dict(dict, b"Title");
                info.author = get_string_from_dict(dict, b"Author");
                info.subject = get_string_from_dict(dict, b"Subject");
                info.creator = get_string_from_dict(dict, b"Creator");
                info.producer = get_string_from_dict(dict, b"Producer");
            }
        }

        info.page_sizes = self
            .page_ids()
            .into_iter()
            .map(|id| page_size(&self.doc, id))
            .collect();
        info.page_count = info.page_sizes.len();
        info
    }

    /// Build a new document holding only the given zero-based pages, in document order
    pub fn extract_pages(&self, pages: &[usize]) -> Result<Document> {
        if pages.is_empty() {
            return Err(ToolError::NothingSelected.into());
        }

        let total = self.page_count();
        if let Some(&page) = pages.iter().find(|&&p| p >= total) {
            anyhow::bail!(
                "Page {} is out of range (1-{}) in {}",
                page + 1,
                total,
                self.name
            );
        }

        // lopdf numbers pages from 1
        let to_delete: Vec<u32> = (0..total)
            .filter(|index| !pages.contains(index))
            .map(|index| index as u32 + 1)
            .collect();

        let mut new_doc = self.doc.clone();
        if !to_delete.is_empty() {
            new_doc.delete_pages(&to_delete);
            new_doc.prune_objects();
        }
        Ok(new_doc)
    }

    /// Serialize a document to bytes
    pub fn to_bytes(doc: &mut Document) -> Result<Vec<u8>> {
        doc.compress();
        let mut buffer = Vec::new();
        doc.save_to(&mut buffer)
            .context("Failed to serialize PDF")?;
        Ok(buffer)
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct PdfInfo {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub page_count: usize,
    /// Width and height in points, per page
    pub page_sizes: Vec<(f32, f32)>,
}

/// Look up `key` on a page or the nearest ancestor that defines it
pub fn inherited_attribute(doc: &Document, page_id: ObjectId, key: &[u8]) -> Option<Object> {
    let mut current = doc.get_dictionary(page_id).ok()?;
    // bounded walk, malformed files can contain Parent cycles
    for _ in 0..64 {
        if let Ok(value) = current.get(key) {
            return Some(value.clone());
        }
        let parent = current.get(b"Parent").and_then(Object::as_reference).ok()?;
        current = doc.get_dictionary(parent).ok()?;
    }
    None
}

fn page_size(doc: &Document, page_id: ObjectId) -> (f32, f32) {
    let media_box = match inherited_attribute(doc, page_id, b"MediaBox") {
        Some(Object::Reference(id)) => doc.get_object(id).ok().cloned(),
        other => other,
    };

    let numbers: Vec<f32> = match media_box {
        Some(Object::Array(values)) => values.iter().filter_map(as_number).collect(),
        _ => Vec::new(),
    };

    match numbers.as_slice() {
        [x0, y0, x1, y1] => ((x1 - x0).abs(), (y1 - y0).abs()),
        _ => DEFAULT_PAGE_SIZE,
    }
}

pub(crate) fn as_number(object: &Object) -> Option<f32> {
    match object {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r as f32),
        _ => None,
    }
}

fn get_string_from_dict(dict: &Dictionary, key: &[u8]) -> Option<String> {
    dict.get(key).ok().and_then(|obj| match obj {
        Object::String(bytes, _) => decode_pdf_string(bytes),
        _ => None,
    })
}

fn decode_pdf_string(bytes: &[u8]) -> Option<String> {
    match bytes {
        [0xFE, 0xFF, rest @ ..] => {
            let units: Vec<u16> = rest
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16(&units).ok()
        }
        // PDFDocEncoding agrees with Latin-1 for everything people put in titles
        _ => Some(bytes.iter().map(|&b| b as char).collect()),
    }
}
