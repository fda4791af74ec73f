use crate::artifact::{save_all, Upload};
use crate::pdf::split::split;
use anyhow::Result;
use std::path::Path;

pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    pages: Option<&str>,
    output_dir: Q,
) -> Result<()> {
    let upload = Upload::read(input)?;
    let parts = split(&upload, pages)?;
    let written = save_all(&parts, &output_dir)?;

    println!(
        "Split {} page(s) into {}",
        written.len(),
        output_dir.as_ref().display()
    );

    Ok(())
}
