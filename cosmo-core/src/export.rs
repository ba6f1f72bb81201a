//! Export of the current record as a downloadable JSON artifact.

use crate::record::ExportEnvelope;
use crate::resource::ObjectHandle;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use tokio::fs;

pub const EXPORT_MIME: &str = "application/json;charset=utf-8";

/// Errors from building or delivering an export.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Download sink unavailable")]
    SinkUnavailable,
}

/// A named text artifact ready for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub file_name: String,
    pub mime: String,
    pub body: String,
}

impl Artifact {
    /// Serialize an envelope as pretty JSON, named after its export time.
    pub fn from_envelope(envelope: &ExportEnvelope) -> Result<Self, ExportError> {
        let body = serde_json::to_string_pretty(envelope)?;
        Ok(Self {
            file_name: format!("cosmo-sorter-{}.json", envelope.meta.exported_at.timestamp_millis()),
            mime: EXPORT_MIME.to_string(),
            body,
        })
    }

    pub fn size(&self) -> u64 {
        self.body.len() as u64
    }
}

/// Where exported artifacts are saved.
#[async_trait]
pub trait DownloadSink: Send + Sync {
    /// Save `artifact`, reachable through `handle` while the handle is live.
    /// Returns a description of where it landed.
    async fn deliver(&self, artifact: &Artifact, handle: &ObjectHandle) -> Result<String, ExportError>;
}

/// Writes artifacts into a directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl DownloadSink for DirectorySink {
    async fn deliver(&self, artifact: &Artifact, handle: &ObjectHandle) -> Result<String, ExportError> {
        fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(&artifact.file_name);
        fs::write(&path, &artifact.body).await?;
        tracing::debug!(path = %path.display(), url = %handle.url(), "artifact written");
        Ok(path.display().to_string())
    }
}

/// Keeps delivered artifacts in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    delivered: Mutex<Vec<Artifact>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delivered(&self) -> Vec<Artifact> {
        self.delivered.lock().map(|d| d.clone()).unwrap_or_default()
    }

    pub fn count(&self) -> usize {
        self.delivered.lock().map(|d| d.len()).unwrap_or_default()
    }

    pub fn last(&self) -> Option<Artifact> {
        self.delivered.lock().ok().and_then(|d| d.last().cloned())
    }
}

#[async_trait]
impl DownloadSink for MemorySink {
    async fn deliver(&self, artifact: &Artifact, _handle: &ObjectHandle) -> Result<String, ExportError> {
        let mut delivered = self.delivered.lock().map_err(|_| ExportError::SinkUnavailable)?;
        delivered.push(artifact.clone());
        Ok(format!("memory:{}", artifact.file_name))
    }
}
