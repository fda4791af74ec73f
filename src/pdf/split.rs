use anyhow::{Context, Result};

use super::PdfDocument;
use crate::artifact::{Artifact, Upload};
use crate::error::ToolError;
use crate::page_range;

/// One single-page PDF per selected page, named `page-{n}.pdf`
pub fn split(upload: &Upload, pages: Option<&str>) -> Result<Vec<Artifact>> {
    let doc = PdfDocument::load(upload)?;
    let selected = page_range::resolve_opt(pages, doc.page_count())
        .with_context(|| format!("Bad page range for {}", upload.file_name))?;

    if selected.is_empty() {
        return Err(ToolError::NothingSelected.into());
    }

    let mut artifacts = Vec::with_capacity(selected.len());
    for page in selected {
        let mut single = doc.extract_pages(&[page])?;
        let bytes = PdfDocument::to_bytes(&mut single)
            .with_context(|| format!("Failed to write page {}", page + 1))?;
        artifacts.push(Artifact::pdf(format!("page-{}.pdf", page + 1), bytes));
    }

    tracing::debug!(file = %upload.file_name, parts = artifacts.len(), "split");
    Ok(artifacts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::fixtures::{page_texts, sample_upload};

    #[test]
    fn test_split_every_page() {
        let parts = split(&sample_upload("a.pdf", 3, "A"), None).unwrap();
        let names: Vec<_> = parts.iter().map(|a| a.file_name.as_str()).collect();
        assert_eq!(names, vec!["page-1.pdf", "page-2.pdf", "page-3.pdf"]);

        let texts = page_texts(&parts[1].bytes);
        assert_eq!(texts.len(), 1);
        assert!(texts[0].contains("A-Page-2"));
    }

    #[test]
    fn test_split_with_range() {
        let parts = split(&sample_upload("a.pdf", 5, "A"), Some("2,4-end")).unwrap();
        let names: Vec<_> = parts.iter().map(|a| a.file_name.as_str()).collect();
        assert_eq!(names, vec!["page-2.pdf", "page-4.pdf", "page-5.pdf"]);
    }

    #[test]
    fn test_split_empty_selection() {
        let err = split(&sample_upload("a.pdf", 2, "A"), Some("9")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ToolError>(),
            Some(ToolError::NothingSelected)
        ));
    }
}
