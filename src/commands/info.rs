use crate::artifact::Upload;
use crate::pdf::PdfDocument;
use anyhow::Result;
use std::path::Path;

pub fn run<P: AsRef<Path>>(path: P) -> Result<()> {
    let upload = Upload::read(&path)?;
    let doc = PdfDocument::load(&upload)?;
    let info = doc.get_info();

    println!("File: {}", path.as_ref().display());
    println!("Pages: {}", info.page_count);

    let fields = [
        ("Title", &info.title),
        ("Author", &info.author),
        ("Subject", &info.subject),
        ("Creator", &info.creator),
        ("Producer", &info.producer),
    ];
    for (label, value) in fields {
        if let Some(value) = value {
            println!("{}: {}", label, value);
        }
    }

    for (index, (width, height)) in info.page_sizes.iter().enumerate() {
        println!("  p{}: {:.0} x {:.0} pt", index + 1, width, height);
    }

    Ok(())
}
