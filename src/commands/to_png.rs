use crate::artifact::{save_all, Upload};
use crate::config::RenderOptions;
use crate::pdf::render::{to_png, to_png_pages};
use anyhow::Result;
use std::path::{Path, PathBuf};

pub fn run<P: AsRef<Path>>(
    input: P,
    pages: Option<&str>,
    output: Option<&PathBuf>,
    output_dir: Option<&PathBuf>,
    options: &RenderOptions,
) -> Result<()> {
    let upload = Upload::read(input)?;

    match output_dir {
        Some(dir) => {
            let images = to_png_pages(&upload, pages, options)?;
            let written = save_all(&images, dir)?;
            println!(
                "Rendered {} page(s) at {} dpi into {}",
                written.len(),
                options.dpi,
                dir.display()
            );
        }
        None => {
            let archive = to_png(&upload, pages, options)?;
            let written = archive.save_as(output)?;
            println!("Rendered pages at {} dpi into {}", options.dpi, written.display());
        }
    }

    Ok(())
}
