use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_PNG: &str = "image/png";
pub const MIME_ZIP: &str = "application/zip";
pub const MIME_TEXT: &str = "text/plain";

/// An input file as handed to a tool: its display name and raw bytes
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Upload {
            file_name: file_name.into(),
            bytes,
        }
    }

    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes =
            std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Upload { file_name, bytes })
    }

    pub fn read_all<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<Self>> {
        paths.iter().map(Upload::read).collect()
    }
}

/// A produced file, ready to be downloaded or written to disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

impl Artifact {
    pub fn pdf(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self::with_mime(file_name, MIME_PDF, bytes)
    }

    pub fn png(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self::with_mime(file_name, MIME_PNG, bytes)
    }

    pub fn zip(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self::with_mime(file_name, MIME_ZIP, bytes)
    }

    pub fn text(file_name: impl Into<String>, text: String) -> Self {
        Self::with_mime(file_name, MIME_TEXT, text.into_bytes())
    }

    fn with_mime(file_name: impl Into<String>, mime_type: &'static str, bytes: Vec<u8>) -> Self {
        Artifact {
            file_name: file_name.into(),
            mime_type,
            bytes,
        }
    }

    /// Write to `path`, or to the artifact's own file name when no path is given
    pub fn save_as<P: AsRef<Path>>(&self, path: Option<P>) -> Result<PathBuf> {
        let path = match path {
            Some(p) => p.as_ref().to_path_buf(),
            None => PathBuf::from(&self.file_name),
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        std::fs::write(&path, &self.bytes)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::info!(
            path = %path.display(),
            mime = self.mime_type,
            bytes = self.bytes.len(),
            "wrote artifact"
        );
        Ok(path)
    }

    /// Write into `dir` under the artifact's own file name
    pub fn save_into<P: AsRef<Path>>(&self, dir: P) -> Result<PathBuf> {
        self.save_as(Some(dir.as_ref().join(&self.file_name)))
    }
}

/// Write a batch of artifacts into `dir`, creating it if needed
pub fn save_all<P: AsRef<Path>>(artifacts: &[Artifact], dir: P) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
    artifacts.iter().map(|a| a.save_into(dir)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_set_mime() {
        assert_eq!(Artifact::pdf("a.pdf", vec![]).mime_type, "application/pdf");
        assert_eq!(Artifact::png("a.png", vec![]).mime_type, "image/png");
        assert_eq!(Artifact::zip("a.zip", vec![]).mime_type, "application/zip");
        let text = Artifact::text("a.txt", "hi".to_string());
        assert_eq!(text.mime_type, "text/plain");
        assert_eq!(text.bytes, b"hi");
    }

    #[test]
    fn test_save_into_creates_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("nested").join("out");
        let artifact = Artifact::text("extracted-text.txt", "body".to_string());

        let paths = save_all(&[artifact], &dir).unwrap();
        assert_eq!(paths, vec![dir.join("extracted-text.txt")]);
        assert_eq!(std::fs::read_to_string(&paths[0]).unwrap(), "body");
    }

    #[test]
    fn test_upload_read_uses_file_name() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("input.pdf");
        std::fs::write(&path, b"%PDF").unwrap();

        let upload = Upload::read(&path).unwrap();
        assert_eq!(upload.file_name, "input.pdf");
        assert_eq!(upload.bytes, b"%PDF");
        assert!(Upload::read(tmp.path().join("missing.pdf")).is_err());
    }
}
