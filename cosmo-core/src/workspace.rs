//! The workspace controller.
//!
//! [`Workspace`] owns all session state and is the only thing callers talk
//! to. It is driven from a single task: user actions are method calls, and
//! time-based work (debounced saves, deferred handle releases, notification
//! expiry) happens in [`Workspace::tick`], which the caller invokes whenever
//! [`Workspace::next_deadline`] passes.
//!
//! Every failing action shows an error notification and returns the error;
//! none of them leave the workspace in a different state than before.

use crate::analysis::{
    AnalysisError, Analyzer, MockAnalyzer, Phase, Pipeline, RemoteAnalyzer, Settlement, Ticket,
};
use crate::config::WorkspaceConfig;
use crate::debounce::Debouncer;
use crate::export::{Artifact, DirectorySink, DownloadSink, ExportError};
use crate::ingest::{
    AudioIntake, DocumentIntake, DropZone, ImageData, ImageIntake, IngestError, MediaFile, MediaKind,
};
use crate::notify::Notifier;
use crate::persist::{FileStore, KeyValueStore, PersistError, Persistence, RestoredRecord, StoreKey};
use crate::record::{Category, Record};
use crate::resource::{ObjectHandle, ResourceRegistry};
use crate::view::{Status, ViewState};
use std::sync::Arc;
use thiserror::Error;
use tokio::time::Instant;

/// Errors from workspace actions.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("Please enter a text fragment or upload material first")]
    EmptySubmission,

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error("Analysis failed: {0}")]
    Analysis(#[from] AnalysisError),

    #[error("Please complete an analysis before exporting")]
    NothingToExport,

    #[error("Please complete an analysis before editing")]
    NoRecord,

    #[error("{category} has no field `{name}`")]
    UnknownField { category: Category, name: String },

    #[error("Export failed: {0}")]
    Export(#[from] ExportError),

    #[error("Storage error: {0}")]
    Storage(#[from] PersistError),

    #[error("Saved analysis could not be restored: {0}")]
    CorruptedState(String),
}

/// How a failure is recovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Rejected input; nothing changed.
    InputGuard,
    /// A file could not be read; the prior preview is kept.
    ReadFailure,
    /// The analysis call failed; the prior record is kept.
    AnalysisFailure,
    /// Persisted state could not be parsed; the workspace started fresh.
    CorruptedState,
    Storage,
    Export,
}

impl WorkspaceError {
    pub fn class(&self) -> ErrorClass {
        match self {
            WorkspaceError::EmptySubmission
            | WorkspaceError::NothingToExport
            | WorkspaceError::NoRecord
            | WorkspaceError::UnknownField { .. }
            | WorkspaceError::Ingest(IngestError::Rejected { .. } | IngestError::NoFile { .. })
            | WorkspaceError::Analysis(AnalysisError::Busy) => ErrorClass::InputGuard,
            WorkspaceError::Ingest(IngestError::ReadFailed { .. }) => ErrorClass::ReadFailure,
            WorkspaceError::Analysis(_) => ErrorClass::AnalysisFailure,
            WorkspaceError::CorruptedState(_) => ErrorClass::CorruptedState,
            WorkspaceError::Storage(_) => ErrorClass::Storage,
            WorkspaceError::Export(_) => ErrorClass::Export,
        }
    }

    /// Text shown in the error notification.
    pub fn user_message(&self) -> String {
        match self {
            WorkspaceError::Analysis(AnalysisError::Busy) => self.to_string(),
            WorkspaceError::Analysis(_) => "Analysis failed, please try again".to_string(),
            other => other.to_string(),
        }
    }
}

/// What `open` found in durable storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resume {
    /// Nothing to restore; upload view.
    Fresh,
    /// A record was restored; analysis view.
    Restored,
    /// The stored record was unreadable; upload view.
    Corrupted(String),
}

/// Inputs captured for one analysis call.
#[derive(Debug, Clone)]
pub struct PendingAnalysis {
    pub ticket: Ticket,
    pub text: String,
    pub image: Option<ImageData>,
}

impl PendingAnalysis {
    pub async fn run(&self, analyzer: &dyn Analyzer) -> Result<Record, AnalysisError> {
        analyzer.analyze(&self.text, self.image.as_ref()).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisOutcome {
    Completed,
    /// The response arrived for a call no longer expected and was dropped.
    Stale,
}

/// Result of a successful export.
#[derive(Debug, Clone)]
pub struct ExportReceipt {
    pub artifact: Artifact,
    pub location: String,
    pub url: String,
}

/// Everything the user has put into the workspace.
#[derive(Debug, Default)]
pub struct Session {
    text: String,
    record: Option<Record>,
    image: ImageIntake,
    document: DocumentIntake,
    audio: AudioIntake,
}

impl Session {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn record(&self) -> Option<&Record> {
        self.record.as_ref()
    }

    pub fn has_analyzed(&self) -> bool {
        self.record.is_some()
    }

    pub fn image(&self) -> &ImageIntake {
        &self.image
    }

    pub fn document(&self) -> &DocumentIntake {
        &self.document
    }

    pub fn audio(&self) -> &AudioIntake {
        &self.audio
    }

    /// Whether any input modality is present.
    pub fn has_input(&self) -> bool {
        !self.text.trim().is_empty()
            || !self.image.is_empty()
            || !self.document.is_empty()
            || !self.audio.is_empty()
    }

    fn zone(&self, kind: MediaKind) -> &DropZone {
        match kind {
            MediaKind::Image => self.image.zone(),
            MediaKind::Document => self.document.zone(),
            MediaKind::Audio => self.audio.zone(),
        }
    }

    fn zone_mut(&mut self, kind: MediaKind) -> &mut DropZone {
        match kind {
            MediaKind::Image => self.image.zone_mut(),
            MediaKind::Document => self.document.zone_mut(),
            MediaKind::Audio => self.audio.zone_mut(),
        }
    }
}

pub struct Workspace {
    config: WorkspaceConfig,
    session: Session,
    pipeline: Pipeline,
    view: ViewState,
    notifier: Notifier,
    persistence: Persistence,
    saves: Debouncer<StoreKey>,
    resources: ResourceRegistry,
    pending_releases: Vec<(Instant, ObjectHandle)>,
    analyzer: Arc<dyn Analyzer>,
    sink: Arc<dyn DownloadSink>,
}

impl Workspace {
    pub fn new(
        config: WorkspaceConfig,
        store: Arc<dyn KeyValueStore>,
        analyzer: Arc<dyn Analyzer>,
        sink: Arc<dyn DownloadSink>,
    ) -> Self {
        let notifier = Notifier::new(config.toast_visible, config.toast_exit);
        Self {
            config,
            session: Session::default(),
            pipeline: Pipeline::new(),
            view: ViewState::new(),
            notifier,
            persistence: Persistence::new(store),
            saves: Debouncer::new(),
            resources: ResourceRegistry::new(),
            pending_releases: Vec::new(),
            analyzer,
            sink,
        }
    }

    /// Build a workspace backed by the directories and analyzer in `config`.
    pub async fn from_config(config: WorkspaceConfig) -> Result<Self, WorkspaceError> {
        let store = FileStore::open(&config.store_dir).await?;
        let analyzer: Arc<dyn Analyzer> = match &config.analyzer_url {
            Some(url) => Arc::new(RemoteAnalyzer::connect(url.clone(), config.analyzer_key.clone())?),
            None => {
                let (min, max) = config.mock_delay;
                Arc::new(MockAnalyzer::new().with_delay(min, max))
            }
        };
        let sink = Arc::new(DirectorySink::new(config.export_dir.clone()));
        tracing::info!(
            store = %config.store_dir.display(),
            exports = %config.export_dir.display(),
            analyzer = analyzer.name(),
            "workspace configured"
        );
        Ok(Self::new(config, Arc::new(store), analyzer, sink))
    }

    // ========================================================================
    // Top view
    // ========================================================================

    /// Enter the workspace and restore persisted state.
    ///
    /// Storage problems are never fatal here: an unreadable record or a
    /// failing store falls back to the upload view.
    ///
    /// Reopening an open workspace behaves like closing it first: pending
    /// saves are written and an in-flight analysis is abandoned.
    pub async fn open(&mut self) -> Resume {
        self.flush().await;
        if self.pipeline.abandon() {
            tracing::info!("abandoned in-flight analysis");
            self.view.end_loading();
        }
        self.view.enter_workspace();

        let restored = match self.persistence.restore().await {
            Ok(restored) => restored,
            Err(e) => {
                tracing::warn!(error = %e, "could not read saved workspace");
                self.show_fresh();
                return Resume::Fresh;
            }
        };

        if let Some(text) = restored.text {
            self.session.text = text;
        }

        match restored.record {
            RestoredRecord::Restored(record) => {
                tracing::info!("restored previous analysis");
                self.session.record = Some(record);
                self.pipeline.resume_complete();
                self.view.show_analysis();
                Resume::Restored
            }
            RestoredRecord::Corrupted(reason) => {
                let err = WorkspaceError::CorruptedState(reason.clone());
                tracing::warn!(class = ?err.class(), error = %err, "starting fresh");
                self.show_fresh();
                Resume::Corrupted(reason)
            }
            RestoredRecord::Absent => {
                self.show_fresh();
                Resume::Fresh
            }
        }
    }

    fn show_fresh(&mut self) {
        self.session.record = None;
        self.pipeline.reset();
        self.view.show_upload();
    }

    /// Return to the landing view.
    ///
    /// Pending saves are written first, and an in-flight analysis is
    /// abandoned so its late response is dropped.
    pub async fn close(&mut self) {
        self.flush().await;
        if self.pipeline.abandon() {
            tracing::info!("abandoned in-flight analysis");
            self.view.end_loading();
            if self.session.has_analyzed() {
                self.pipeline.resume_complete();
                self.view.show_analysis();
            } else {
                self.view.show_upload();
            }
        }
        self.view.leave_workspace();
    }

    // ========================================================================
    // Input
    // ========================================================================

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.session.text = text.into();
        self.saves.schedule(StoreKey::TextInput, self.config.text_debounce);
    }

    pub fn char_count(&self) -> usize {
        self.session.text.chars().count()
    }

    /// Offer a file to the intake for `kind`.
    pub async fn select(&mut self, kind: MediaKind, file: MediaFile) -> Result<(), WorkspaceError> {
        let result = match kind {
            MediaKind::Image => self.session.image.select(file).await.map(|_| ()),
            MediaKind::Document => self.session.document.select(file).map(|_| ()),
            MediaKind::Audio => self.session.audio.select(file, &mut self.resources).map(|_| ()),
        };
        result.map_err(|e| self.fail(e.into()))
    }

    pub async fn select_image(&mut self, file: MediaFile) -> Result<(), WorkspaceError> {
        self.select(MediaKind::Image, file).await
    }

    pub async fn select_document(&mut self, file: MediaFile) -> Result<(), WorkspaceError> {
        self.select(MediaKind::Document, file).await
    }

    pub async fn select_audio(&mut self, file: MediaFile) -> Result<(), WorkspaceError> {
        self.select(MediaKind::Audio, file).await
    }

    /// Drop whatever the intake for `kind` holds. Returns whether anything was held.
    pub fn clear(&mut self, kind: MediaKind) -> bool {
        let cleared = match kind {
            MediaKind::Image => self.session.image.clear(),
            MediaKind::Document => self.session.document.clear(),
            MediaKind::Audio => self.session.audio.clear(&mut self.resources),
        };
        if cleared {
            tracing::info!(%kind, "cleared");
        }
        cleared
    }

    pub fn drag_enter(&mut self, kind: MediaKind) {
        self.session.zone_mut(kind).drag_enter();
    }

    pub fn drag_leave(&mut self, kind: MediaKind) {
        self.session.zone_mut(kind).drag_leave();
    }

    pub fn is_drag_over(&self, kind: MediaKind) -> bool {
        self.session.zone(kind).is_drag_over()
    }

    /// Finish a drop onto the zone for `kind`. Only the first file is used.
    pub async fn drop_files(&mut self, kind: MediaKind, files: Vec<MediaFile>) -> Result<(), WorkspaceError> {
        match self.session.zone_mut(kind).drop_files(files) {
            Some(file) => self.select(kind, file).await,
            None => Err(self.fail(IngestError::NoFile { kind }.into())),
        }
    }

    // ========================================================================
    // Analysis
    // ========================================================================

    /// Run a full analysis: guard, call the analyzer, install the result.
    pub async fn submit(&mut self) -> Result<AnalysisOutcome, WorkspaceError> {
        let pending = self.begin_analysis().await?;
        let analyzer = Arc::clone(&self.analyzer);
        let result = pending.run(analyzer.as_ref()).await;
        self.finish_analysis(pending.ticket, result).await
    }

    /// Move to `Analyzing` and capture the inputs for the call.
    ///
    /// The caller runs the call and hands its result to
    /// [`Workspace::finish_analysis`] together with the ticket.
    pub async fn begin_analysis(&mut self) -> Result<PendingAnalysis, WorkspaceError> {
        if self.pipeline.in_flight() {
            return Err(self.fail(AnalysisError::Busy.into()));
        }
        if !self.session.has_input() {
            return Err(self.fail(WorkspaceError::EmptySubmission));
        }

        self.pipeline.begin().map_err(|e| self.fail(e.into()))?;

        self.saves.cancel(&StoreKey::TextInput);
        if let Err(e) = self.persistence.save_text(&self.session.text).await {
            tracing::warn!(error = %e, "could not save text input");
        }

        let ticket = self.pipeline.start().map_err(|e| self.fail(e.into()))?;
        self.view.begin_loading();
        tracing::info!(
            %ticket,
            analyzer = self.analyzer.name(),
            chars = self.char_count(),
            image = !self.session.image.is_empty(),
            document = !self.session.document.is_empty(),
            audio = !self.session.audio.is_empty(),
            "analysis started"
        );

        Ok(PendingAnalysis {
            ticket,
            text: self.session.text.trim().to_string(),
            image: self.session.image.preview().cloned(),
        })
    }

    /// Apply the result of the call identified by `ticket`.
    ///
    /// A success fully replaces the current record. A failure keeps it,
    /// and the pipeline returns to `Complete` when there is one.
    /// Results for a ticket that is no longer expected change nothing.
    pub async fn finish_analysis(
        &mut self,
        ticket: Ticket,
        result: Result<Record, AnalysisError>,
    ) -> Result<AnalysisOutcome, WorkspaceError> {
        match self.pipeline.settle(ticket, result.is_ok()) {
            Settlement::Stale => return Ok(AnalysisOutcome::Stale),
            Settlement::Completed | Settlement::Failed => {}
        }

        match result {
            Ok(record) => {
                self.saves.cancel(&StoreKey::AnalysisData);
                if let Err(e) = self.persistence.save_analysis(&record).await {
                    tracing::warn!(error = %e, "could not save analysis");
                }
                self.session.record = Some(record);

                self.view.end_loading();
                self.view.show_analysis();
                self.view.switch_tab(Category::Character);
                tracing::info!(%ticket, "analysis complete");
                self.notifier.success("Analysis complete! Every field is editable");
                Ok(AnalysisOutcome::Completed)
            }
            Err(e) => {
                if self.session.has_analyzed() {
                    self.pipeline.resume_complete();
                }
                self.view.mark_failed();
                Err(self.fail(e.into()))
            }
        }
    }

    /// Discard the record and go back to the upload view. The text input is kept.
    pub async fn reclassify(&mut self) {
        if self.pipeline.abandon() {
            tracing::info!("abandoned in-flight analysis");
        }
        self.pipeline.reset();
        self.session.record = None;
        self.saves.cancel(&StoreKey::AnalysisData);
        if let Err(e) = self.persistence.clear_analysis().await {
            tracing::warn!(error = %e, "could not erase saved analysis");
        }

        self.view.end_loading();
        self.view.show_upload();
        self.notifier.success("Back to upload; adjust your material and analyze again");
    }

    // ========================================================================
    // Record
    // ========================================================================

    /// Edit one field of the current record; the record is saved after a quiet period.
    pub fn edit_field(&mut self, category: Category, name: &str, value: impl Into<String>) -> Result<(), WorkspaceError> {
        let Some(record) = self.session.record.as_mut() else {
            return Err(self.fail(WorkspaceError::NoRecord));
        };
        let Some(slot) = record.field_mut(category, name) else {
            let err = WorkspaceError::UnknownField {
                category,
                name: name.to_string(),
            };
            return Err(self.fail(err));
        };
        *slot = value.into();
        self.saves.schedule(StoreKey::AnalysisData, self.config.field_debounce);
        Ok(())
    }

    /// Activate a category tab. The record is not touched.
    pub fn switch_tab(&mut self, category: Category) {
        self.view.switch_tab(category);
    }

    // ========================================================================
    // Export
    // ========================================================================

    /// Deliver the current record as a JSON artifact.
    ///
    /// The download handle is released one `export_release` later, from `tick`.
    pub async fn export(&mut self) -> Result<ExportReceipt, WorkspaceError> {
        let Some(record) = self.session.record.as_ref() else {
            return Err(self.fail(WorkspaceError::NothingToExport));
        };

        let artifact = match Artifact::from_envelope(&record.read()) {
            Ok(artifact) => artifact,
            Err(e) => return Err(self.fail(e.into())),
        };

        let handle = self.resources.acquire(artifact.file_name.clone(), artifact.size());
        let url = handle.url();
        match self.sink.deliver(&artifact, &handle).await {
            Ok(location) => {
                let release_at = Instant::now() + self.config.export_release;
                self.pending_releases.push((release_at, handle));
                tracing::info!(file = %artifact.file_name, %location, "exported");
                self.notifier.success("JSON file exported");
                Ok(ExportReceipt {
                    artifact,
                    location,
                    url,
                })
            }
            Err(e) => {
                self.resources.release(handle);
                Err(self.fail(e.into()))
            }
        }
    }

    // ========================================================================
    // Time
    // ========================================================================

    /// Perform all time-based work that is due. Returns the number of
    /// saves written plus handles released.
    pub async fn tick(&mut self) -> usize {
        let now = Instant::now();
        let mut done = 0;

        for key in self.saves.take_due(now) {
            self.write(key).await;
            done += 1;
        }

        let (due, waiting): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending_releases)
            .into_iter()
            .partition(|(at, _)| *at <= now);
        self.pending_releases = waiting;
        for (_, handle) in due {
            self.resources.release(handle);
            done += 1;
        }

        self.notifier.expire(now);
        done
    }

    /// Write every pending save immediately.
    pub async fn flush(&mut self) -> usize {
        let keys = self.saves.drain();
        let count = keys.len();
        for key in keys {
            self.write(key).await;
        }
        count
    }

    async fn write(&mut self, key: StoreKey) {
        let result = match key {
            StoreKey::TextInput => self.persistence.save_text(&self.session.text).await,
            StoreKey::AnalysisData => match &self.session.record {
                Some(record) => self.persistence.save_record(record).await,
                None => Ok(()),
            },
            StoreKey::HasAnalyzed => Ok(()),
        };
        match result {
            Ok(()) => tracing::debug!(key = key.as_str(), "debounced save written"),
            Err(e) => tracing::warn!(key = key.as_str(), error = %e, "debounced save failed"),
        }
    }

    /// When `tick` next has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        let releases = self.pending_releases.iter().map(|(at, _)| *at);
        self.saves
            .next_deadline()
            .into_iter()
            .chain(releases)
            .chain(self.notifier.next_deadline())
            .min()
    }

    fn fail(&mut self, err: WorkspaceError) -> WorkspaceError {
        tracing::warn!(class = ?err.class(), error = %err, "action failed");
        self.notifier.error(err.user_message());
        err
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn config(&self) -> &WorkspaceConfig {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn text(&self) -> &str {
        self.session.text()
    }

    pub fn record(&self) -> Option<&Record> {
        self.session.record()
    }

    pub fn has_analyzed(&self) -> bool {
        self.session.has_analyzed()
    }

    pub fn phase(&self) -> Phase {
        self.pipeline.phase()
    }

    pub fn submit_enabled(&self) -> bool {
        self.pipeline.submit_enabled()
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn status(&self) -> Status {
        self.view.status()
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn resources(&self) -> &ResourceRegistry {
        &self.resources
    }

    pub fn analyzer(&self) -> Arc<dyn Analyzer> {
        Arc::clone(&self.analyzer)
    }

    pub fn is_save_pending(&self, key: StoreKey) -> bool {
        self.saves.is_pending(&key)
    }

    pub fn pending_release_count(&self) -> usize {
        self.pending_releases.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::MemorySink;
    use crate::persist::MemoryStore;
    use std::time::Duration;

    fn workspace(analyzer: MockAnalyzer) -> (Workspace, Arc<MemoryStore>, Arc<MemorySink>) {
        let store = Arc::new(MemoryStore::new());
        let sink = Arc::new(MemorySink::new());
        let ws = Workspace::new(WorkspaceConfig::new(), store.clone(), Arc::new(analyzer), sink.clone());
        (ws, store, sink)
    }

    #[test]
    fn test_error_classes() {
        assert_eq!(WorkspaceError::EmptySubmission.class(), ErrorClass::InputGuard);
        assert_eq!(WorkspaceError::NothingToExport.class(), ErrorClass::InputGuard);
        assert_eq!(
            WorkspaceError::Analysis(AnalysisError::Unavailable("x".into())).class(),
            ErrorClass::AnalysisFailure
        );
        assert_eq!(WorkspaceError::Analysis(AnalysisError::Busy).class(), ErrorClass::InputGuard);
        let read = IngestError::ReadFailed {
            name: "a.png".into(),
            source: std::io::Error::other("boom"),
        };
        assert_eq!(WorkspaceError::from(read).class(), ErrorClass::ReadFailure);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_submission_guard() {
        let (mut ws, _, _) = workspace(MockAnalyzer::instant());
        ws.open().await;
        ws.set_text("   \n");

        let err = ws.submit().await.unwrap_err();
        assert!(matches!(err, WorkspaceError::EmptySubmission));
        assert!(!ws.has_analyzed());
        assert_eq!(ws.phase(), Phase::Idle);
        assert!(ws.notifier().last().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_result_after_close_is_dropped() {
        let (mut ws, store, _) = workspace(MockAnalyzer::instant());
        ws.open().await;
        ws.set_text("fragment");

        let pending = ws.begin_analysis().await.unwrap();
        assert!(!ws.submit_enabled());
        ws.close().await;

        let outcome = ws.finish_analysis(pending.ticket, Ok(Record::default())).await.unwrap();
        assert_eq!(outcome, AnalysisOutcome::Stale);
        assert!(!ws.has_analyzed());
        assert!(!store.contains(StoreKey::HasAnalyzed));
        assert!(ws.submit_enabled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_edit_requires_record_and_known_field() {
        let (mut ws, _, _) = workspace(MockAnalyzer::instant());
        ws.open().await;
        assert!(matches!(
            ws.edit_field(Category::Character, "name", "x"),
            Err(WorkspaceError::NoRecord)
        ));

        ws.set_text("fragment");
        ws.submit().await.unwrap();
        assert!(matches!(
            ws.edit_field(Category::Item, "colour", "red"),
            Err(WorkspaceError::UnknownField { .. })
        ));
        ws.edit_field(Category::Item, "type", "Shield").unwrap();
        assert_eq!(ws.record().unwrap().item.kind, "Shield");
        assert!(ws.is_save_pending(StoreKey::AnalysisData));
    }

    #[tokio::test(start_paused = true)]
    async fn test_next_deadline_covers_saves_and_releases() {
        let (mut ws, _, _) = workspace(MockAnalyzer::instant());
        ws.open().await;
        let start = Instant::now();
        ws.set_text("a");
        assert_eq!(ws.next_deadline(), Some(start + Duration::from_millis(600)));

        tokio::time::advance(Duration::from_millis(600)).await;
        assert_eq!(ws.tick().await, 1);
        assert!(ws.next_deadline().is_none());
    }
}
