use crate::artifact::Upload;
use crate::pdf::text::to_text;
use anyhow::Result;
use std::path::{Path, PathBuf};

pub fn run<P: AsRef<Path>>(
    input: P,
    pages: Option<&str>,
    output: Option<&PathBuf>,
    quiet: bool,
) -> Result<()> {
    let upload = Upload::read(input)?;
    let artifact = to_text(&upload, pages)?;
    let written = artifact.save_as(output)?;

    if !quiet {
        print!("{}", String::from_utf8_lossy(&artifact.bytes));
    }
    eprintln!("Wrote {}", written.display());

    Ok(())
}
