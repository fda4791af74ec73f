use crate::artifact::{save_all, Upload};
use crate::config::RenderOptions;
use crate::pdf::render::thumbnails;
use anyhow::Result;
use std::path::Path;

pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    pages: Option<&str>,
    output_dir: Q,
    options: &RenderOptions,
) -> Result<()> {
    let upload = Upload::read(input)?;
    let previews = thumbnails(&upload, pages, options)?;
    let written = save_all(&previews, &output_dir)?;

    // one checkbox row per page, ready for --deselect
    for path in &written {
        println!("[x] {}", path.display());
    }
    println!(
        "{} thumbnail(s) of at most {}px in {}",
        written.len(),
        options.thumbnail_size,
        output_dir.as_ref().display()
    );

    Ok(())
}
