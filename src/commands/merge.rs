use crate::artifact::Upload;
use crate::pdf::merge::merge;
use crate::selection::PageSelection;
use anyhow::Result;
use std::path::{Path, PathBuf};

pub fn run<P: AsRef<Path>>(
    inputs: &[P],
    pages: Option<&str>,
    deselect: &[String],
    output: Option<&PathBuf>,
) -> Result<()> {
    let uploads = Upload::read_all(inputs)?;
    let selection = PageSelection::from_deselections(deselect)?;

    let artifact = merge(&uploads, pages, &selection)?;
    let written = artifact.save_as(output)?;

    println!(
        "Merged {} files into {}",
        uploads.len(),
        written.display()
    );

    Ok(())
}
