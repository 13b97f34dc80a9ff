use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::encode::EncodedImage;
use crate::foundation::error::SignplateResult;

/// The two places a composite is published to: a preview and a download reference.
pub trait Presentation {
    /// Show `artifact` as the preview.
    fn set_preview(&mut self, artifact: &EncodedImage) -> SignplateResult<()>;
    /// Point the download reference at `artifact`.
    fn set_download(&mut self, artifact: &EncodedImage) -> SignplateResult<()>;
    /// Remove the download reference. The preview is left as is.
    fn clear_download(&mut self) -> SignplateResult<()>;
}

/// In-memory presentation for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemoryPresentation {
    preview: Option<EncodedImage>,
    download: Option<EncodedImage>,
    /// Number of `set_preview` calls.
    pub preview_updates: usize,
    /// Number of `set_download` calls.
    pub download_updates: usize,
    /// Number of `clear_download` calls.
    pub download_clears: usize,
}

impl InMemoryPresentation {
    /// Create an empty presentation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current preview, if any.
    pub fn preview(&self) -> Option<&EncodedImage> {
        self.preview.as_ref()
    }

    /// Current download reference, if any.
    pub fn download(&self) -> Option<&EncodedImage> {
        self.download.as_ref()
    }
}

impl Presentation for InMemoryPresentation {
    fn set_preview(&mut self, artifact: &EncodedImage) -> SignplateResult<()> {
        self.preview = Some(artifact.clone());
        self.preview_updates += 1;
        Ok(())
    }

    fn set_download(&mut self, artifact: &EncodedImage) -> SignplateResult<()> {
        self.download = Some(artifact.clone());
        self.download_updates += 1;
        Ok(())
    }

    fn clear_download(&mut self) -> SignplateResult<()> {
        self.download = None;
        self.download_clears += 1;
        Ok(())
    }
}

/// Presentation backed by files: the preview and download are image files on disk, and the
/// download can additionally be mirrored as a `data:` URI text file.
#[derive(Debug, Clone)]
pub struct FilePresentation {
    preview_path: PathBuf,
    download_path: PathBuf,
    data_uri_path: Option<PathBuf>,
}

impl FilePresentation {
    /// Publish to `preview_path` and `download_path`.
    pub fn new(preview_path: impl Into<PathBuf>, download_path: impl Into<PathBuf>) -> Self {
        Self {
            preview_path: preview_path.into(),
            download_path: download_path.into(),
            data_uri_path: None,
        }
    }

    /// Also write the download as a `data:` URI to `path`.
    pub fn with_data_uri(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_uri_path = Some(path.into());
        self
    }

    /// Preview file path.
    pub fn preview_path(&self) -> &Path {
        &self.preview_path
    }

    /// Download file path.
    pub fn download_path(&self) -> &Path {
        &self.download_path
    }
}

impl Presentation for FilePresentation {
    fn set_preview(&mut self, artifact: &EncodedImage) -> SignplateResult<()> {
        artifact.save(&self.preview_path)
    }

    fn set_download(&mut self, artifact: &EncodedImage) -> SignplateResult<()> {
        artifact.save(&self.download_path)?;
        if let Some(uri_path) = &self.data_uri_path {
            artifact.save_data_uri(uri_path)?;
        }
        Ok(())
    }

    fn clear_download(&mut self) -> SignplateResult<()> {
        remove_if_exists(&self.download_path)?;
        if let Some(uri_path) = &self.data_uri_path {
            remove_if_exists(uri_path)?;
        }
        Ok(())
    }
}

fn remove_if_exists(path: &Path) -> SignplateResult<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(anyhow::Error::new(e)
            .context(format!("remove '{}'", path.display()))
            .into()),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/presentation.rs"]
mod tests;
