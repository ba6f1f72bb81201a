//! Media ingestion.
//!
//! Three intakes accept one file each: an image (read into a base64 data
//! URL for preview and analysis), a document (kept by reference, never
//! read) and an audio clip (kept by reference with a preview handle).
//! Each intake validates with its [`MediaKind`] policy and exposes the same
//! `select` / `clear` pair plus a [`DropZone`] for drag-and-drop.

pub mod audio;
pub mod document;
pub mod image;

pub use audio::{AudioIntake, AudioSelection};
pub use document::DocumentIntake;
pub use image::{ImageData, ImageIntake};

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tokio::fs;

/// MIME types accepted for documents.
pub const DOCUMENT_MIME_TYPES: [&str; 4] = [
    "text/plain",
    "text/markdown",
    "application/pdf",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

/// File extensions accepted for documents, regardless of reported MIME type.
pub const DOCUMENT_EXTENSIONS: [&str; 4] = ["txt", "md", "docx", "pdf"];

/// Errors from media ingestion.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("{}", .kind.rejection_hint())]
    Rejected { kind: MediaKind, name: String },

    #[error("{}", .kind.rejection_hint())]
    NoFile { kind: MediaKind },

    #[error("Could not read {name}, please try again")]
    ReadFailed {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

/// The three kinds of media the workspace accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Image,
    Document,
    Audio,
}

impl MediaKind {
    pub const ALL: [MediaKind; 3] = [MediaKind::Image, MediaKind::Document, MediaKind::Audio];

    /// Whether a file passes this kind's validation policy.
    pub fn accepts(self, file: &MediaFile) -> bool {
        match self {
            MediaKind::Image => file.mime().starts_with("image/"),
            MediaKind::Audio => file.mime().starts_with("audio/"),
            // Either signal is enough; some platforms misreport MIME types.
            MediaKind::Document => {
                DOCUMENT_MIME_TYPES.iter().any(|mime| *mime == file.mime())
                    || file
                        .extension()
                        .is_some_and(|ext| DOCUMENT_EXTENSIONS.iter().any(|known| *known == ext))
            }
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Document => "document",
            MediaKind::Audio => "audio",
        }
    }

    /// Message shown when a file of the wrong type is offered.
    pub fn rejection_hint(self) -> &'static str {
        match self {
            MediaKind::Image => "Please upload an image file (PNG / JPG / WEBP)",
            MediaKind::Document => "Please upload a document file (TXT / MD / DOCX / PDF)",
            MediaKind::Audio => "Please upload an audio file (MP3 / WAV / M4A)",
        }
    }

    fn reject(self, file: &MediaFile) -> IngestError {
        tracing::info!(kind = self.label(), name = file.name(), mime = file.mime(), "rejected file");
        IngestError::Rejected {
            kind: self,
            name: file.name().to_string(),
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for MediaKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "image" | "img" => Ok(MediaKind::Image),
            "document" | "doc" => Ok(MediaKind::Document),
            "audio" => Ok(MediaKind::Audio),
            other => Err(format!("unknown media kind `{other}` (expected image, doc or audio)")),
        }
    }
}

/// Where a file's bytes live.
#[derive(Debug, Clone)]
pub enum FileContent {
    /// On disk; read lazily.
    Path(PathBuf),
    /// Already in memory.
    Bytes(Arc<[u8]>),
}

/// A file offered by the picker or a drop.
#[derive(Debug, Clone)]
pub struct MediaFile {
    name: String,
    mime: String,
    size: u64,
    content: FileContent,
}

impl MediaFile {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, size: u64, content: FileContent) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            size,
            content,
        }
    }

    /// An in-memory file.
    pub fn from_bytes(name: impl Into<String>, mime: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        let bytes: Vec<u8> = bytes.into();
        let size = bytes.len() as u64;
        Self::new(name, mime, size, FileContent::Bytes(bytes.into()))
    }

    /// Describe a file on disk, guessing its MIME type from the extension.
    ///
    /// Only metadata is read here; content is read on demand.
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let metadata = fs::metadata(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let mime = mime_guess::from_path(path)
            .first_raw()
            .unwrap_or("application/octet-stream");
        Ok(Self::new(name, mime, metadata.len(), FileContent::Path(path.to_path_buf())))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn content(&self) -> &FileContent {
        &self.content
    }

    /// Lower-cased extension of the file name, if any.
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.name)
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
    }

    /// Read the full content.
    pub async fn read(&self) -> std::io::Result<Vec<u8>> {
        match &self.content {
            FileContent::Path(path) => fs::read(path).await,
            FileContent::Bytes(bytes) => Ok(bytes.to_vec()),
        }
    }
}

/// Drag-and-drop target state shared by all intakes.
#[derive(Debug, Clone, Default)]
pub struct DropZone {
    drag_over: bool,
}

impl DropZone {
    pub fn drag_enter(&mut self) {
        self.drag_over = true;
    }

    pub fn drag_leave(&mut self) {
        self.drag_over = false;
    }

    /// Finish a drop, keeping only the first file.
    pub fn drop_files(&mut self, files: Vec<MediaFile>) -> Option<MediaFile> {
        self.drag_over = false;
        files.into_iter().next()
    }

    pub fn is_drag_over(&self) -> bool {
        self.drag_over
    }
}
