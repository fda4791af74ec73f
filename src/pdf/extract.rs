use anyhow::{Context, Result};

use super::PdfDocument;
use crate::artifact::{Artifact, Upload};
use crate::page_range;

/// Copy the selected pages of one PDF into a new document
pub fn extract(upload: &Upload, pages: &str) -> Result<Artifact> {
    let doc = PdfDocument::load(upload)?;
    let selected = page_range::resolve(pages, doc.page_count())
        .with_context(|| format!("Bad page range for {}", upload.file_name))?;

    let mut new_doc = doc.extract_pages(&selected)?;
    let bytes = PdfDocument::to_bytes(&mut new_doc)?;

    let stem = upload
        .file_name
        .strip_suffix(".pdf")
        .unwrap_or(&upload.file_name);
    Ok(Artifact::pdf(format!("{}-extract.pdf", stem), bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ToolError;
    use crate::pdf::fixtures::{page_texts, sample_upload};

    #[test]
    fn test_extract_range() {
        let artifact = extract(&sample_upload("report.pdf", 6, "R"), "2-3,6").unwrap();
        assert_eq!(artifact.file_name, "report-extract.pdf");

        let texts = page_texts(&artifact.bytes);
        assert_eq!(texts.len(), 3);
        assert!(texts[0].contains("R-Page-2"));
        assert!(texts[2].contains("R-Page-6"));
    }

    #[test]
    fn test_extract_nothing_selected() {
        let err = extract(&sample_upload("a.pdf", 2, "A"), "4-3").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ToolError>(),
            Some(ToolError::NothingSelected)
        ));
    }
}
