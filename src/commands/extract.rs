use crate::artifact::Upload;
use crate::pdf::extract::extract;
use anyhow::Result;
use std::path::{Path, PathBuf};

pub fn run<P: AsRef<Path>>(input: P, pages: &str, output: Option<&PathBuf>) -> Result<()> {
    let upload = Upload::read(input)?;
    let artifact = extract(&upload, pages)?;
    let written = artifact.save_as(output)?;

    println!("Extracted pages {} to {}", pages, written.display());

    Ok(())
}
