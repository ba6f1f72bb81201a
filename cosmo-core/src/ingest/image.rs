//! Image intake: validates, reads and keeps a base64 data URL.

use super::{DropZone, IngestError, MediaFile, MediaKind};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// A decoded image ready for preview and analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    pub name: String,
    pub mime: String,
    /// `data:<mime>;base64,<payload>`
    pub data_url: String,
}

impl ImageData {
    pub fn from_bytes(name: impl Into<String>, mime: impl Into<String>, bytes: &[u8]) -> Self {
        let mime = mime.into();
        let data_url = format!("data:{mime};base64,{}", STANDARD.encode(bytes));
        Self {
            name: name.into(),
            mime,
            data_url,
        }
    }
}

#[derive(Debug, Default)]
pub struct ImageIntake {
    zone: DropZone,
    preview: Option<ImageData>,
}

impl ImageIntake {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and read `file`, replacing the current preview.
    ///
    /// On rejection or read failure the previous preview stays in place.
    pub async fn select(&mut self, file: MediaFile) -> Result<&ImageData, IngestError> {
        if !MediaKind::Image.accepts(&file) {
            return Err(MediaKind::Image.reject(&file));
        }

        let bytes = file.read().await.map_err(|source| {
            tracing::warn!(name = file.name(), error = %source, "image read failed");
            IngestError::ReadFailed {
                name: file.name().to_string(),
                source,
            }
        })?;

        tracing::info!(name = file.name(), bytes = bytes.len(), "image selected");
        let image = ImageData::from_bytes(file.name(), file.mime(), &bytes);
        Ok(&*self.preview.insert(image))
    }

    /// Drop the current image. Returns whether anything was held.
    pub fn clear(&mut self) -> bool {
        self.preview.take().is_some()
    }

    pub fn preview(&self) -> Option<&ImageData> {
        self.preview.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.preview.is_none()
    }

    pub fn zone(&self) -> &DropZone {
        &self.zone
    }

    pub fn zone_mut(&mut self) -> &mut DropZone {
        &mut self.zone
    }
}
