//! Document intake: keeps a reference and a display name, never the content.

use super::{DropZone, IngestError, MediaFile, MediaKind};

#[derive(Debug, Default)]
pub struct DocumentIntake {
    zone: DropZone,
    file: Option<MediaFile>,
}

impl DocumentIntake {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate `file` and hold it in place of any previous document.
    pub fn select(&mut self, file: MediaFile) -> Result<&MediaFile, IngestError> {
        if !MediaKind::Document.accepts(&file) {
            return Err(MediaKind::Document.reject(&file));
        }
        tracing::info!(name = file.name(), size = file.size(), "document selected");
        Ok(&*self.file.insert(file))
    }

    /// Drop the current document. Returns whether anything was held.
    pub fn clear(&mut self) -> bool {
        self.file.take().is_some()
    }

    pub fn file(&self) -> Option<&MediaFile> {
        self.file.as_ref()
    }

    /// Name shown in place of the placeholder.
    pub fn display_name(&self) -> Option<&str> {
        self.file.as_ref().map(MediaFile::name)
    }

    pub fn is_empty(&self) -> bool {
        self.file.is_none()
    }

    pub fn zone(&self) -> &DropZone {
        &self.zone
    }

    pub fn zone_mut(&mut self) -> &mut DropZone {
        &mut self.zone
    }
}
