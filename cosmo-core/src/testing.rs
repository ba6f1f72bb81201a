//! Testing utilities for the workspace.
//!
//! This module provides tools for integration testing:
//! - `TestHarness` wiring a workspace to an in-memory store, an in-memory
//!   download sink and a configurable `MockAnalyzer`
//! - File builders for the three media kinds
//! - Assertion helpers for verifying workspace state
//!
//! Scenario tests run under `#[tokio::test(start_paused = true)]`, so
//! [`TestHarness::wait`] moves through debounce windows and the mock
//! analysis delay instantly.

use crate::analysis::MockAnalyzer;
use crate::config::WorkspaceConfig;
use crate::export::MemorySink;
use crate::ingest::{MediaFile, MediaKind};
use crate::notify::Severity;
use crate::persist::{MemoryStore, StoreKey};
use crate::view::Section;
use crate::workspace::{Resume, Workspace};
use std::sync::Arc;
use std::time::Duration;

/// An in-memory PNG-named image.
pub fn image_file(name: &str) -> MediaFile {
    MediaFile::from_bytes(name, "image/png", b"\x89PNG\r\n\x1a\n".to_vec())
}

/// An in-memory document of `size` bytes.
pub fn document_file(name: &str, mime: &str, size: usize) -> MediaFile {
    MediaFile::from_bytes(name, mime, vec![b'x'; size])
}

pub fn audio_file(name: &str) -> MediaFile {
    MediaFile::from_bytes(name, "audio/mpeg", vec![0u8; 256])
}

/// Test harness for running workspace scenarios.
pub struct TestHarness {
    pub workspace: Workspace,
    pub store: Arc<MemoryStore>,
    pub sink: Arc<MemorySink>,
    pub analyzer: Arc<MockAnalyzer>,
}

impl TestHarness {
    /// A harness with the default mock (canned record, 1.8 to 2.4 s delay).
    pub fn new() -> Self {
        Self::with_analyzer(MockAnalyzer::new())
    }

    pub fn with_analyzer(analyzer: MockAnalyzer) -> Self {
        Self::with_store(Arc::new(MemoryStore::new()), analyzer)
    }

    /// A harness over an existing store, as if the page were reloaded.
    pub fn with_store(store: Arc<MemoryStore>, analyzer: MockAnalyzer) -> Self {
        let analyzer = Arc::new(analyzer);
        let sink = Arc::new(MemorySink::new());
        let workspace = Workspace::new(
            WorkspaceConfig::new(),
            store.clone(),
            analyzer.clone(),
            sink.clone(),
        );
        Self {
            workspace,
            store,
            sink,
            analyzer,
        }
    }

    /// A fresh harness sharing this one's durable store.
    pub fn reload(&self, analyzer: MockAnalyzer) -> Self {
        Self::with_store(self.store.clone(), analyzer)
    }

    pub async fn open(&mut self) -> Resume {
        self.workspace.open().await
    }

    /// Let `duration` pass, then run due timers. Returns the work done by the tick.
    pub async fn wait(&mut self, duration: Duration) -> usize {
        tokio::time::sleep(duration).await;
        self.workspace.tick().await
    }

    pub async fn select(&mut self, kind: MediaKind, file: MediaFile) -> bool {
        self.workspace.select(kind, file).await.is_ok()
    }

    /// Raw value persisted under `key`.
    pub fn stored(&self, key: StoreKey) -> Option<String> {
        self.store.get(key)
    }

    /// Message and severity of the most recent notification.
    pub fn last_toast(&self) -> Option<(String, Severity)> {
        self.workspace
            .notifier()
            .last()
            .map(|t| (t.message.clone(), t.severity))
    }

    pub fn live_handles(&self) -> usize {
        self.workspace.resources().live_count()
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Assertion Helpers
// ============================================================================

/// Assert the analysis section is shown with a record present.
#[track_caller]
pub fn assert_analysis_view(harness: &TestHarness) {
    let ws = &harness.workspace;
    assert_eq!(ws.view().section(), Section::Analysis, "Expected the analysis section");
    assert!(ws.has_analyzed(), "Expected a record to be present");
}

/// Assert the upload section is shown.
#[track_caller]
pub fn assert_upload_view(harness: &TestHarness) {
    assert_eq!(
        harness.workspace.view().section(),
        Section::Upload,
        "Expected the upload section"
    );
}

/// Assert the latest notification has the given severity.
#[track_caller]
pub fn assert_toast(harness: &TestHarness, severity: Severity) {
    match harness.last_toast() {
        Some((message, actual)) => assert_eq!(
            actual, severity,
            "Expected a {} notification, got {} '{message}'",
            severity.label(),
            actual.label()
        ),
        None => panic!("Expected a {} notification, got none", severity.label()),
    }
}

/// Assert a value is persisted under `key`.
#[track_caller]
pub fn assert_persisted(harness: &TestHarness, key: StoreKey) {
    assert!(
        harness.stored(key).is_some(),
        "Expected '{}' to be persisted",
        key.as_str()
    );
}

/// Assert nothing is persisted under `key`.
#[track_caller]
pub fn assert_not_persisted(harness: &TestHarness, key: StoreKey) {
    assert!(
        harness.stored(key).is_none(),
        "Expected '{}' to NOT be persisted",
        key.as_str()
    );
}
