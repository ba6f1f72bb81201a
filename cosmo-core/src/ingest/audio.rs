//! Audio intake: keeps a reference plus a preview handle for playback.
//!
//! The selection and its handle travel together in [`AudioSelection`], so the
//! handle always belongs to the held file. Replacing or clearing releases the
//! old handle before anything else happens.

use super::{DropZone, IngestError, MediaFile, MediaKind};
use crate::resource::{ObjectHandle, ResourceRegistry};

/// A held audio file and its playback handle.
#[derive(Debug)]
pub struct AudioSelection {
    pub file: MediaFile,
    pub preview: ObjectHandle,
}

#[derive(Debug, Default)]
pub struct AudioIntake {
    zone: DropZone,
    selection: Option<AudioSelection>,
}

impl AudioIntake {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate `file`, release any previous preview handle, then acquire a new one.
    pub fn select(
        &mut self,
        file: MediaFile,
        resources: &mut ResourceRegistry,
    ) -> Result<&AudioSelection, IngestError> {
        if !MediaKind::Audio.accepts(&file) {
            return Err(MediaKind::Audio.reject(&file));
        }

        if let Some(previous) = self.selection.take() {
            resources.release(previous.preview);
        }

        let preview = resources.acquire(file.name(), file.size());
        tracing::info!(name = file.name(), url = %preview.url(), "audio selected");
        Ok(&*self.selection.insert(AudioSelection { file, preview }))
    }

    /// Drop the current clip and release its handle. Returns whether anything was held.
    pub fn clear(&mut self, resources: &mut ResourceRegistry) -> bool {
        match self.selection.take() {
            Some(selection) => {
                resources.release(selection.preview);
                true
            }
            None => false,
        }
    }

    pub fn selection(&self) -> Option<&AudioSelection> {
        self.selection.as_ref()
    }

    pub fn file(&self) -> Option<&MediaFile> {
        self.selection.as_ref().map(|s| &s.file)
    }

    pub fn display_name(&self) -> Option<&str> {
        self.file().map(MediaFile::name)
    }

    /// URL of the playback preview, if a clip is held.
    pub fn preview_url(&self) -> Option<String> {
        self.selection.as_ref().map(|s| s.preview.url())
    }

    pub fn is_empty(&self) -> bool {
        self.selection.is_none()
    }

    pub fn zone(&self) -> &DropZone {
        &self.zone
    }

    pub fn zone_mut(&mut self) -> &mut DropZone {
        &mut self.zone
    }
}
