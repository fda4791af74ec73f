use crate::pdf::compose::text_to_pdf;
use anyhow::{Context, Result};
use std::io::Read;
use std::path::{Path, PathBuf};

pub fn run(text: Option<&str>, file: Option<&Path>, output: Option<&PathBuf>) -> Result<()> {
    let text = match (text, file) {
        (Some(text), _) => text.to_string(),
        (None, Some(path)) if path == Path::new("-") => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read text from stdin")?;
            buffer
        }
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        (None, None) => anyhow::bail!("No text given"),
    };

    let artifact = text_to_pdf(&text)?;
    let written = artifact.save_as(output)?;

    println!("Wrote {}", written.display());

    Ok(())
}
