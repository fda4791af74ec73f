use anyhow::{Context, Result};

use super::PdfDocument;
use crate::artifact::{Artifact, Upload};
use crate::error::ToolError;
use crate::page_range;

pub const TEXT_FILE_NAME: &str = "extracted-text.txt";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    /// Zero-based page index
    pub index: usize,
    pub text: String,
}

/// Extract text from specific zero-based pages of a PDF
pub fn extract_text_pages(pdf_bytes: &[u8], pages: &[usize]) -> Result<Vec<PageText>> {
    let all_pages = pdf_extract::extract_text_from_mem_by_pages(pdf_bytes)
        .context("Failed to extract text from PDF")?;

    pages
        .iter()
        .map(|&index| -> Result<PageText> {
            let text = all_pages.get(index).with_context(|| {
                format!(
                    "Page {} is out of range (1-{})",
                    index + 1,
                    all_pages.len()
                )
            })?;
            Ok(PageText {
                index,
                text: text.trim_end().to_string(),
            })
        })
        .collect()
}

/// Lay pages out one after another under a "--- Page N ---" banner
pub fn format_pages(pages: &[PageText]) -> String {
    let mut out = String::new();
    for page in pages {
        out.push_str(&format!("--- Page {} ---\n{}\n\n", page.index + 1, page.text));
    }
    out
}

/// Extract the text of the selected pages into `extracted-text.txt`
pub fn to_text(upload: &Upload, pages: Option<&str>) -> Result<Artifact> {
    let doc = PdfDocument::load(upload)?;
    let selected = page_range::resolve_opt(pages, doc.page_count())
        .with_context(|| format!("Bad page range for {}", upload.file_name))?;
    if selected.is_empty() {
        return Err(ToolError::NothingSelected.into());
    }

    let texts = extract_text_pages(&upload.bytes, &selected)
        .with_context(|| format!("Failed to read text from {}", upload.file_name))?;
    tracing::debug!(file = %upload.file_name, pages = texts.len(), "extracted text");

    Ok(Artifact::text(TEXT_FILE_NAME, format_pages(&texts)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::fixtures::{sample_pdf, sample_upload};

    #[test]
    fn test_format_pages() {
        let pages = vec![
            PageText {
                index: 0,
                text: "first".to_string(),
            },
            PageText {
                index: 4,
                text: "fifth".to_string(),
            },
        ];
        assert_eq!(
            format_pages(&pages),
            "--- Page 1 ---\nfirst\n\n--- Page 5 ---\nfifth\n\n"
        );
    }

    #[test]
    fn test_extract_text_pages() {
        let bytes = sample_pdf(3, "T");
        let texts = extract_text_pages(&bytes, &[0, 2]).unwrap();
        assert_eq!(texts.len(), 2);
        assert_eq!(texts[0].index, 0);
        assert!(texts[0].text.contains("T-Page-1"));
        assert!(texts[1].text.contains("T-Page-3"));
    }

    #[test]
    fn test_extract_text_out_of_range() {
        let bytes = sample_pdf(1, "T");
        assert!(extract_text_pages(&bytes, &[3]).is_err());
    }

    #[test]
    fn test_to_text_artifact() {
        let artifact = to_text(&sample_upload("a.pdf", 2, "X"), Some("2")).unwrap();
        assert_eq!(artifact.file_name, "extracted-text.txt");
        assert_eq!(artifact.mime_type, "text/plain");

        let body = String::from_utf8(artifact.bytes).unwrap();
        assert!(body.starts_with("--- Page 2 ---\n"));
        assert!(body.contains("X-Page-2"));
        assert!(!body.contains("X-Page-1"));
    }
}
