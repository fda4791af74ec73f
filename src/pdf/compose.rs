//! Building new PDFs from images or plain text.

use std::io::Write;

use anyhow::{Context, Result};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};

use super::PdfDocument;
use crate::artifact::{Artifact, Upload};
use crate::error::ToolError;

pub const IMAGES_FILE_NAME: &str = "images-to-pdf.pdf";
pub const TEXT_PDF_FILE_NAME: &str = "text-to-pdf.pdf";

/// US Letter in points
pub const PAGE_WIDTH: f32 = 612.0;
pub const PAGE_HEIGHT: f32 = 792.0;
pub const MARGIN: f32 = 72.0;

const FONT_SIZE: f32 = 10.0;
const LEADING: f32 = 12.0;
/// Courier advances 600/1000 em per glyph
const GLYPH_WIDTH: f32 = FONT_SIZE * 600.0 / 1000.0;
pub const COLUMNS: usize = ((PAGE_WIDTH - 2.0 * MARGIN) / GLYPH_WIDTH) as usize;
pub const LINES_PER_PAGE: usize = ((PAGE_HEIGHT - 2.0 * MARGIN) / LEADING) as usize;
const TAB_WIDTH: usize = 4;

/// Accumulates pages under a single page tree
struct PageWriter {
    doc: Document,
    pages_id: ObjectId,
    kids: Vec<Object>,
}

impl PageWriter {
    fn new() -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        PageWriter {
            doc,
            pages_id,
            kids: Vec::new(),
        }
    }

    fn add_page(&mut self, operations: Vec<Operation>, resources: lopdf::Dictionary) -> Result<()> {
        let content = Content { operations }
            .encode()
            .context("Failed to encode page content")?;
        let content_id = self.doc.add_object(Stream::new(dictionary! {}, content));
        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
            "Contents" => content_id,
            "Resources" => resources,
        });
        self.kids.push(page_id.into());
        Ok(())
    }

    fn finish(mut self) -> Result<Vec<u8>> {
        let count = self.kids.len() as i64;
        self.doc.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => self.kids,
                "Count" => count,
            }),
        );
        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);
        PdfDocument::to_bytes(&mut self.doc)
    }
}

/// One Letter page per image, each scaled to fit and anchored at the bottom-left corner
pub fn images_to_pdf(uploads: &[Upload]) -> Result<Artifact> {
    if uploads.is_empty() {
        return Err(ToolError::EmptyInput("no images given").into());
    }

    let mut writer = PageWriter::new();
    for upload in uploads {
        let img = image::load_from_memory(&upload.bytes).map_err(|e| ToolError::Decode {
            file: upload.file_name.clone(),
            reason: e.to_string(),
        })?;
        let rgb = img.to_rgb8();
        let (img_width, img_height) = rgb.dimensions();

        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(rgb.as_raw())?;
        let data = encoder.finish()?;

        let image_id = writer.doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => img_width as i64,
                "Height" => img_height as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
                "Filter" => "FlateDecode",
            },
            data,
        ));

        let (draw_width, draw_height) = fit_to_page(img_width, img_height);
        let operations = vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    draw_width.into(),
                    0.into(),
                    0.into(),
                    draw_height.into(),
                    0.into(),
                    0.into(),
                ],
            ),
            Operation::new("Do", vec!["Im1".into()]),
            Operation::new("Q", vec![]),
        ];
        writer.add_page(
            operations,
            dictionary! { "XObject" => dictionary! { "Im1" => image_id } },
        )?;
        tracing::debug!(file = %upload.file_name, img_width, img_height, "embedded image");
    }

    Ok(Artifact::pdf(IMAGES_FILE_NAME, writer.finish()?))
}

/// Drawn size of an image scaled uniformly to fit a Letter page
pub fn fit_to_page(img_width: u32, img_height: u32) -> (f32, f32) {
    let (w, h) = (img_width.max(1) as f32, img_height.max(1) as f32);
    let scale = (PAGE_WIDTH / w).min(PAGE_HEIGHT / h);
    (w * scale, h * scale)
}

/// Typeset plain text in Courier, wrapping long lines and starting new pages as needed
pub fn text_to_pdf(text: &str) -> Result<Artifact> {
    if text.trim().is_empty() {
        return Err(ToolError::EmptyInput("no text given").into());
    }

    let lines = wrap_text(text, COLUMNS);
    let mut writer = PageWriter::new();
    let font_id = writer.doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
        "Encoding" => "WinAnsiEncoding",
    });

    for chunk in lines.chunks(LINES_PER_PAGE) {
        let mut operations = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), FONT_SIZE.into()]),
            Operation::new("TL", vec![LEADING.into()]),
            Operation::new("Td", vec![MARGIN.into(), (PAGE_HEIGHT - MARGIN).into()]),
        ];
        for line in chunk {
            operations.push(Operation::new(
                "Tj",
                vec![Object::String(encode_latin1(line), StringFormat::Literal)],
            ));
            operations.push(Operation::new("T*", vec![]));
        }
        operations.push(Operation::new("ET", vec![]));

        writer.add_page(
            operations,
            dictionary! { "Font" => dictionary! { "F1" => font_id } },
        )?;
    }

    tracing::debug!(lines = lines.len(), "typeset text");
    Ok(Artifact::pdf(TEXT_PDF_FILE_NAME, writer.finish()?))
}

/// Split text into display lines of at most `columns` characters.
///
/// Breaks at spaces where possible; words longer than a line are cut.
pub fn wrap_text(text: &str, columns: usize) -> Vec<String> {
    let columns = columns.max(1);
    let mut out = Vec::new();

    for raw in text.lines() {
        let line = raw.replace('\t', &" ".repeat(TAB_WIDTH));
        let line = line.trim_end();
        if line.is_empty() {
            out.push(String::new());
            continue;
        }

        let mut current = String::new();
        let mut current_len = 0;
        let mut fresh = true;
        for word in line.split(' ') {
            let word_len = word.chars().count();
            let needed = if fresh { word_len } else { current_len + 1 + word_len };
            if needed <= columns {
                if !fresh {
                    current.push(' ');
                    current_len += 1;
                }
                current.push_str(word);
                current_len += word_len;
                fresh = false;
                continue;
            }

            if !fresh {
                out.push(std::mem::take(&mut current));
            }
            let mut chars: Vec<char> = word.chars().collect();
            while chars.len() > columns {
                let rest = chars.split_off(columns);
                out.push(chars.into_iter().collect());
                chars = rest;
            }
            current_len = chars.len();
            current = chars.into_iter().collect();
            fresh = false;
        }
        out.push(current);
    }
    out
}

/// Standard fonts only cover Latin-1 here; anything else becomes '?'
fn encode_latin1(line: &str) -> Vec<u8> {
    line.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::fixtures::page_texts;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    fn png_upload(name: &str, width: u32, height: u32) -> Upload {
        let img = RgbImage::from_pixel(width, height, Rgb([200, 30, 30]));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        Upload::new(name, bytes)
    }

    #[test]
    fn test_layout_constants() {
        assert_eq!(COLUMNS, 78);
        assert_eq!(LINES_PER_PAGE, 54);
    }

    #[test]
    fn test_fit_to_page() {
        assert_eq!(fit_to_page(306, 396), (612.0, 792.0));
        let (w, h) = fit_to_page(1224, 100);
        assert_eq!(w, 612.0);
        assert!((h - 50.0).abs() < 0.01);
    }

    #[test]
    fn test_images_to_pdf_one_page_per_image() {
        let uploads = vec![png_upload("a.png", 40, 20), png_upload("b.png", 10, 30)];
        let artifact = images_to_pdf(&uploads).unwrap();
        assert_eq!(artifact.file_name, "images-to-pdf.pdf");

        let doc = Document::load_mem(&artifact.bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 2);
    }

    #[test]
    fn test_images_to_pdf_rejects_garbage() {
        let uploads = vec![Upload::new("broken.png", b"nope".to_vec())];
        let err = images_to_pdf(&uploads).unwrap_err();
        match err.downcast_ref::<ToolError>() {
            Some(ToolError::Decode { file, .. }) => assert_eq!(file, "broken.png"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(images_to_pdf(&[]).is_err());
    }

    #[test]
    fn test_wrap_text() {
        assert_eq!(wrap_text("one two three", 7), vec!["one two", "three"]);
        assert_eq!(wrap_text("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
        assert_eq!(wrap_text("a\n\nb", 10), vec!["a", "", "b"]);
        assert_eq!(wrap_text("\tx", 10), vec!["    x"]);
    }

    #[test]
    fn test_encode_latin1() {
        assert_eq!(encode_latin1("café"), b"caf\xe9".to_vec());
        assert_eq!(encode_latin1("日本"), b"??".to_vec());
    }

    #[test]
    fn test_text_to_pdf_paginates() {
        let text: String = (1..=60).map(|i| format!("line {i}\n")).collect();
        let artifact = text_to_pdf(&text).unwrap();
        assert_eq!(artifact.file_name, "text-to-pdf.pdf");

        let texts = page_texts(&artifact.bytes);
        assert_eq!(texts.len(), 2);
        assert!(texts[0].contains("line 1"));
        assert!(texts[1].contains("line 60"));
    }

    #[test]
    fn test_text_to_pdf_rejects_blank() {
        let err = text_to_pdf("  \n ").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ToolError>(),
            Some(ToolError::EmptyInput(_))
        ));
    }
}
