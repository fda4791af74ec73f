use crate::artifact::Upload;
use crate::pdf::compose::images_to_pdf;
use anyhow::Result;
use std::path::{Path, PathBuf};

pub fn run<P: AsRef<Path>>(inputs: &[P], output: Option<&PathBuf>) -> Result<()> {
    let uploads = Upload::read_all(inputs)?;
    let artifact = images_to_pdf(&uploads)?;
    let written = artifact.save_as(output)?;

    println!(
        "Converted {} image(s) into {}",
        uploads.len(),
        written.display()
    );

    Ok(())
}
