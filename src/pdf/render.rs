//! Page rasterization through MuPDF.

use std::io::{Cursor, Write};

use anyhow::{anyhow, Context, Result};
use image::{DynamicImage, ImageFormat, RgbaImage};
use mupdf::{Colorspace, Matrix};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::artifact::{Artifact, Upload};
use crate::config::RenderOptions;
use crate::error::ToolError;
use crate::page_range;

pub const PNG_ZIP_FILE_NAME: &str = "pdf-to-png.zip";

/// PDF user space is 72 units per inch
const POINTS_PER_INCH: f32 = 72.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    /// Zero-based page index
    pub index: usize,
    pub width: u32,
    pub height: u32,
    pub png: Vec<u8>,
}

pub struct Rasterizer {
    document: mupdf::Document,
    page_count: usize,
}

impl Rasterizer {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let document = mupdf::Document::from_bytes(bytes, "application/pdf")
            .context("Failed to open PDF for rendering")?;
        let page_count = document
            .page_count()
            .context("Failed to count pages")?
            .max(0) as usize;
        Ok(Rasterizer {
            document,
            page_count,
        })
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Render a page at the given resolution
    pub fn render(&self, index: usize, dpi: f32) -> Result<RenderedPage> {
        let scale = dpi / POINTS_PER_INCH;
        self.render_scaled(index, |_, _| scale)
    }

    /// Render a page so that its longest edge is `max_size` pixels
    pub fn thumbnail(&self, index: usize, max_size: u32) -> Result<RenderedPage> {
        self.render_scaled(index, |width, height| {
            max_size as f32 / width.max(height).max(1.0)
        })
    }

    fn render_scaled(&self, index: usize, scale: impl Fn(f32, f32) -> f32) -> Result<RenderedPage> {
        if index >= self.page_count {
            return Err(anyhow!(
                "Page {} is out of range (1-{})",
                index + 1,
                self.page_count
            ));
        }

        let page = self
            .document
            .load_page(index as i32)
            .with_context(|| format!("Failed to load page {}", index + 1))?;
        let bounds = page.bounds()?;
        let scale = scale(bounds.x1 - bounds.x0, bounds.y1 - bounds.y0);

        let matrix = Matrix::new_scale(scale, scale);
        let pixmap = page
            .to_pixmap(&matrix, &Colorspace::device_rgb(), false, true)
            .with_context(|| format!("Failed to render page {}", index + 1))?;

        let (png, width, height) = encode_png(&pixmap)?;
        tracing::debug!(page = index + 1, width, height, bytes = png.len(), "rendered page");
        Ok(RenderedPage {
            index,
            width,
            height,
            png,
        })
    }
}

fn encode_png(pixmap: &mupdf::Pixmap) -> Result<(Vec<u8>, u32, u32)> {
    let width = pixmap.width() as u32;
    let height = pixmap.height() as u32;
    let samples = pixmap.samples();
    let n = pixmap.n() as usize;

    let mut rgba = Vec::with_capacity((width * height * 4) as usize);
    for pixel in samples.chunks(n.max(1)).take((width * height) as usize) {
        let channel = |i: usize| pixel.get(i).copied().unwrap_or(0);
        let alpha = if n >= 4 { channel(3) } else { 255 };
        rgba.extend_from_slice(&[channel(0), channel(1), channel(2), alpha]);
    }

    let img = RgbaImage::from_raw(width, height, rgba)
        .ok_or_else(|| anyhow!("Rendered pixmap has an unexpected size"))?;

    let mut png = Vec::new();
    DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .context("Failed to encode PNG")?;
    Ok((png, width, height))
}

/// Pack rendered pages into a ZIP of `page-{n}.png` entries
pub fn zip_pages(pages: &[RenderedPage]) -> Result<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    // PNG data is already deflated
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

    for page in pages {
        writer.start_file(format!("page-{}.png", page.index + 1), options)?;
        writer.write_all(&page.png)?;
    }

    Ok(writer.finish()?.into_inner())
}

fn resolve_for_render(upload: &Upload, pages: Option<&str>) -> Result<(Rasterizer, Vec<usize>)> {
    let rasterizer = Rasterizer::from_bytes(&upload.bytes)
        .with_context(|| format!("Failed to open {}", upload.file_name))?;
    let selected = page_range::resolve_opt(pages, rasterizer.page_count())
        .with_context(|| format!("Bad page range for {}", upload.file_name))?;
    if selected.is_empty() {
        return Err(ToolError::NothingSelected.into());
    }
    Ok((rasterizer, selected))
}

/// Render exactly the selected pages and bundle them as `pdf-to-png.zip`
pub fn to_png(upload: &Upload, pages: Option<&str>, options: &RenderOptions) -> Result<Artifact> {
    let (rasterizer, selected) = resolve_for_render(upload, pages)?;

    let rendered = selected
        .iter()
        .map(|&index| rasterizer.render(index, options.dpi))
        .collect::<Result<Vec<_>>>()?;

    let bytes = zip_pages(&rendered).context("Failed to build ZIP archive")?;
    Ok(Artifact::zip(PNG_ZIP_FILE_NAME, bytes))
}

/// Same as [`to_png`], but one `page-{n}.png` artifact per page
pub fn to_png_pages(
    upload: &Upload,
    pages: Option<&str>,
    options: &RenderOptions,
) -> Result<Vec<Artifact>> {
    let (rasterizer, selected) = resolve_for_render(upload, pages)?;
    selected
        .iter()
        .map(|&index| -> Result<Artifact> {
            let page = rasterizer.render(index, options.dpi)?;
            Ok(Artifact::png(format!("page-{}.png", index + 1), page.png))
        })
        .collect()
}

/// Small previews for the page selection grid, named `page-{n}-thumb.png`
pub fn thumbnails(
    upload: &Upload,
    pages: Option<&str>,
    options: &RenderOptions,
) -> Result<Vec<Artifact>> {
    let (rasterizer, selected) = resolve_for_render(upload, pages)?;
    selected
        .iter()
        .map(|&index| -> Result<Artifact> {
            let page = rasterizer.thumbnail(index, options.thumbnail_size)?;
            Ok(Artifact::png(format!("page-{}-thumb.png", index + 1), page.png))
        })
        .collect()
}
