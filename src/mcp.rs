use anyhow::Result;
use rmcp::{
    ServerHandler, ServiceExt,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{ServerCapabilities, ServerInfo},
    schemars, tool, tool_router,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::artifact::{save_all, Artifact, Upload};
use crate::config::RenderOptions;
use crate::pdf::{compose, extract, merge, render, split, text, PdfDocument};
use crate::selection::PageSelection;

// Request structs for tools

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PathRequest {
    #[schemars(description = "Path to the PDF file")]
    pub path: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PageCheckbox {
    #[schemars(description = "1-based position of the file in the request's path list")]
    pub file: usize,
    #[schemars(description = "1-based page number within that file")]
    pub page: usize,
    #[schemars(description = "Whether the page is ticked")]
    pub selected: bool,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PdfMergeRequest {
    #[schemars(description = "Paths of the PDF files to merge, in order (at least two)")]
    pub paths: Vec<String>,
    #[schemars(description = "Page ranges applied to every file (e.g., '1-3,5'); all pages when omitted")]
    #[serde(default)]
    pub pages: Option<String>,
    #[schemars(description = "Per-page checkbox state; pages not listed stay selected")]
    #[serde(default)]
    pub selection: Vec<PageCheckbox>,
    #[schemars(description = "Output file path")]
    pub output: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PdfSplitRequest {
    #[schemars(description = "Path to the PDF file")]
    pub path: String,
    #[schemars(description = "Page ranges to split out (e.g., '2-4'); all pages when omitted")]
    #[serde(default)]
    pub pages: Option<String>,
    #[schemars(description = "Directory for the page-N.pdf files")]
    pub output_dir: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PdfExtractRequest {
    #[schemars(description = "Path to the source PDF file")]
    pub path: String,
    #[schemars(description = "Page ranges (e.g., '1-5,10,15-end')")]
    pub pages: String,
    #[schemars(description = "Output file path")]
    pub output: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PdfToPngRequest {
    #[schemars(description = "Path to the PDF file")]
    pub path: String,
    #[schemars(description = "Page ranges to render (e.g., '1-3,5'); all pages when omitted")]
    #[serde(default)]
    pub pages: Option<String>,
    #[schemars(description = "Resolution in dots per inch (default: 200)")]
    #[serde(default)]
    pub dpi: Option<f32>,
    #[schemars(description = "Output ZIP file path")]
    pub output: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PdfToTextRequest {
    #[schemars(description = "Path to the PDF file")]
    pub path: String,
    #[schemars(description = "Page ranges to read (e.g., '1-3,5'); all pages when omitted")]
    #[serde(default)]
    pub pages: Option<String>,
    #[schemars(description = "Also save the text to this file")]
    #[serde(default)]
    pub output: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ImagesToPdfRequest {
    #[schemars(description = "Paths of PNG or JPEG images, one page each, in order")]
    pub paths: Vec<String>,
    #[schemars(description = "Output file path")]
    pub output: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct TextToPdfRequest {
    #[schemars(description = "Plain text to typeset")]
    pub text: String,
    #[schemars(description = "Output file path")]
    pub output: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PdfThumbnailsRequest {
    #[schemars(description = "Path to the PDF file")]
    pub path: String,
    #[schemars(description = "Page ranges to preview; all pages when omitted")]
    #[serde(default)]
    pub pages: Option<String>,
    #[schemars(description = "Longest edge in pixels (default: 200)")]
    #[serde(default)]
    pub size: Option<u32>,
    #[schemars(description = "Directory for the page-N-thumb.png files")]
    pub output_dir: String,
}

#[derive(Debug, Clone)]
pub struct PdfServer {
    render: RenderOptions,
    #[allow(dead_code)]
    tool_router: ToolRouter<Self>,
}

impl PdfServer {
    pub fn new(render: RenderOptions) -> Self {
        Self {
            render,
            tool_router: Self::tool_router(),
        }
    }
}

impl Default for PdfServer {
    fn default() -> Self {
        Self::new(RenderOptions::default())
    }
}

/// Turn a tool outcome into the JSON or "Error: ..." text handed back to the client
fn respond<T: Serialize>(result: Result<T>) -> String {
    match result {
        Ok(value) => serde_json::to_string_pretty(&value).unwrap_or_else(|e| format!("Error: {}", e)),
        Err(e) => {
            tracing::warn!(error = %format!("{:#}", e), "tool failed");
            format!("Error: {:#}", e)
        }
    }
}

fn save_one(artifact: &Artifact, output: &str) -> Result<ArtifactResult> {
    let path = artifact.save_as(Some(output))?;
    Ok(ArtifactResult::new(artifact, path))
}

fn save_many(artifacts: &[Artifact], dir: &str) -> Result<Vec<ArtifactResult>> {
    let paths = save_all(artifacts, dir)?;
    Ok(artifacts
        .iter()
        .zip(paths)
        .map(|(artifact, path)| ArtifactResult::new(artifact, path))
        .collect())
}

fn selection_from(checkboxes: &[PageCheckbox]) -> PageSelection {
    let mut selection = PageSelection::new();
    for checkbox in checkboxes {
        // 1-based on the wire; 0 cannot name a real page
        if checkbox.file >= 1 && checkbox.page >= 1 {
            selection.set(checkbox.file - 1, checkbox.page - 1, checkbox.selected);
        }
    }
    selection
}

#[tool_router]
impl PdfServer {
    #[tool(description = "Get PDF metadata, page count and the size of every page in points")]
    fn pdf_info(&self, Parameters(PathRequest { path }): Parameters<PathRequest>) -> String {
        respond(PdfDocument::open(&path).map(|doc| {
            let info = doc.get_info();
            PdfInfoResult {
                path,
                page_count: info.page_count,
                title: info.title,
                author: info.author,
                subject: info.subject,
                creator: info.creator,
                producer: info.producer,
                page_sizes: info
                    .page_sizes
                    .into_iter()
                    .map(|(width, height)| PageSizeResult { width, height })
                    .collect(),
            }
        }))
    }

    #[tool(description = "Merge two or more PDFs into one. Optionally restrict every file to a page range like '1-3,5' and untick individual pages.")]
    fn pdf_merge(&self, Parameters(req): Parameters<PdfMergeRequest>) -> String {
        respond((|| -> Result<_> {
            let uploads = Upload::read_all(&req.paths)?;
            let selection = selection_from(&req.selection);
            let artifact = merge::merge(&uploads, req.pages.as_deref(), &selection)?;
            save_one(&artifact, &req.output)
        })())
    }

    #[tool(description = "Split a PDF into one file per page (page-N.pdf), optionally limited to a page range")]
    fn pdf_split(&self, Parameters(req): Parameters<PdfSplitRequest>) -> String {
        respond((|| -> Result<_> {
            let upload = Upload::read(&req.path)?;
            let parts = split::split(&upload, req.pages.as_deref())?;
            save_many(&parts, &req.output_dir)
        })())
    }

    #[tool(description = "Extract specific pages from a PDF and save them to a new file")]
    fn pdf_extract(&self, Parameters(req): Parameters<PdfExtractRequest>) -> String {
        respond((|| -> Result<_> {
            let upload = Upload::read(&req.path)?;
            let artifact = extract::extract(&upload, &req.pages)?;
            save_one(&artifact, &req.output)
        })())
    }

    #[tool(description = "Render PDF pages to PNG and save them as a ZIP of page-N.png files")]
    fn pdf_to_png(&self, Parameters(req): Parameters<PdfToPngRequest>) -> String {
        let options = self.render.with_dpi(req.dpi);
        respond((|| -> Result<_> {
            let upload = Upload::read(&req.path)?;
            let archive = render::to_png(&upload, req.pages.as_deref(), &options)?;
            save_one(&archive, &req.output)
        })())
    }

    #[tool(description = "Extract text from PDF pages. Each page is introduced by a '--- Page N ---' line.")]
    fn pdf_to_text(&self, Parameters(req): Parameters<PdfToTextRequest>) -> String {
        respond((|| -> Result<_> {
            let upload = Upload::read(&req.path)?;
            let artifact = text::to_text(&upload, req.pages.as_deref())?;
            let saved = match &req.output {
                Some(output) => Some(save_one(&artifact, output)?.path),
                None => None,
            };
            Ok(TextResult {
                text: String::from_utf8_lossy(&artifact.bytes).into_owned(),
                saved_to: saved,
            })
        })())
    }

    #[tool(description = "Convert PNG or JPEG images into a PDF with one Letter page per image")]
    fn images_to_pdf(&self, Parameters(req): Parameters<ImagesToPdfRequest>) -> String {
        respond((|| -> Result<_> {
            let uploads = Upload::read_all(&req.paths)?;
            let artifact = compose::images_to_pdf(&uploads)?;
            save_one(&artifact, &req.output)
        })())
    }

    #[tool(description = "Typeset plain text into a PDF, wrapping lines and adding pages as needed")]
    fn text_to_pdf(&self, Parameters(req): Parameters<TextToPdfRequest>) -> String {
        respond(compose::text_to_pdf(&req.text).and_then(|artifact| save_one(&artifact, &req.output)))
    }

    #[tool(description = "Render small PNG previews of PDF pages to help pick pages for merging")]
    fn pdf_thumbnails(&self, Parameters(req): Parameters<PdfThumbnailsRequest>) -> String {
        let options = self.render.with_thumbnail_size(req.size);
        respond((|| -> Result<_> {
            let upload = Upload::read(&req.path)?;
            let previews = render::thumbnails(&upload, req.pages.as_deref(), &options)?;
            save_many(&previews, &req.output_dir)
        })())
    }
}

// Result types for MCP tools

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct PageSizeResult {
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct PdfInfoResult {
    pub path: String,
    pub page_count: usize,
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub page_sizes: Vec<PageSizeResult>,
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ArtifactResult {
    pub path: String,
    pub mime_type: String,
    pub bytes: usize,
}

impl ArtifactResult {
    fn new(artifact: &Artifact, path: impl AsRef<Path>) -> Self {
        ArtifactResult {
            path: path.as_ref().display().to_string(),
            mime_type: artifact.mime_type.to_string(),
            bytes: artifact.bytes.len(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct TextResult {
    pub text: String,
    pub saved_to: Option<String>,
}

impl ServerHandler for PdfServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "PDF conversion tools. Use pdf_info for page counts, pdf_thumbnails to preview pages, \
                 pdf_merge / pdf_split / pdf_extract to rearrange pages, pdf_to_png and pdf_to_text \
                 to convert PDFs, and images_to_pdf / text_to_pdf to create new PDFs. Page ranges \
                 look like '1-3,5' and are 1-based."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

pub async fn run_server(render: RenderOptions) -> Result<()> {
    let server = PdfServer::new(render);
    tracing::info!(?render, "starting MCP server on stdio");

    // Serve using stdin/stdout as a tuple
    let service = server.serve((tokio::io::stdin(), tokio::io::stdout())).await?;

    service.waiting().await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::fixtures::sample_pdf;

    fn write_pdf(dir: &Path, name: &str, pages: u32) -> String {
        let path = dir.join(name);
        std::fs::write(&path, sample_pdf(pages, name)).unwrap();
        path.display().to_string()
    }

    #[test]
    fn test_selection_from_checkboxes() {
        let selection = selection_from(&[
            PageCheckbox {
                file: 2,
                page: 3,
                selected: false,
            },
            PageCheckbox {
                file: 0,
                page: 1,
                selected: false,
            },
        ]);
        assert!(!selection.is_selected(1, 2));
        assert_eq!(selection.deselected_count(), 1);
    }

    #[test]
    fn test_pdf_merge_tool() {
        let tmp = tempfile::tempdir().unwrap();
        let output = tmp.path().join("out.pdf").display().to_string();
        let server = PdfServer::default();

        let response = server.pdf_merge(Parameters(PdfMergeRequest {
            paths: vec![
                write_pdf(tmp.path(), "a.pdf", 2),
                write_pdf(tmp.path(), "b.pdf", 2),
            ],
            pages: None,
            selection: vec![PageCheckbox {
                file: 1,
                page: 2,
                selected: false,
            }],
            output: output.clone(),
        }));

        let result: ArtifactResult = serde_json::from_str(&response).unwrap();
        assert_eq!(result.path, output);
        assert_eq!(result.mime_type, "application/pdf");
        let merged = PdfDocument::open(&output).unwrap();
        assert_eq!(merged.page_count(), 3);
    }

    #[test]
    fn test_errors_are_reported_not_raised() {
        let tmp = tempfile::tempdir().unwrap();
        let server = PdfServer::default();

        let response = server.pdf_to_text(Parameters(PdfToTextRequest {
            path: write_pdf(tmp.path(), "a.pdf", 1),
            pages: Some("x-y".to_string()),
            output: None,
        }));
        assert!(response.starts_with("Error: "));
        assert!(response.contains("x-y"));

        let response = server.text_to_pdf(Parameters(TextToPdfRequest {
            text: String::new(),
            output: tmp.path().join("t.pdf").display().to_string(),
        }));
        assert!(response.starts_with("Error: "));
    }

    #[test]
    fn test_pdf_info_tool() {
        let tmp = tempfile::tempdir().unwrap();
        let server = PdfServer::default();
        let response = server.pdf_info(Parameters(PathRequest {
            path: write_pdf(tmp.path(), "a.pdf", 3),
        }));

        let result: PdfInfoResult = serde_json::from_str(&response).unwrap();
        assert_eq!(result.page_count, 3);
        assert_eq!(result.page_sizes.len(), 3);
    }
}
