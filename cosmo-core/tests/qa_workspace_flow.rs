//! QA tests for the submit → analyze → edit → export flow.
//!
//! Time is paused, so the simulated analysis delay and the debounce windows
//! pass instantly and deterministically.
//! Run with: `cargo test -p cosmo-core --test qa_workspace_flow`

use cosmo_core::analysis::canned_record;
use cosmo_core::notify::Severity;
use cosmo_core::persist::StoreKey;
use cosmo_core::testing::{
    assert_analysis_view, assert_not_persisted, assert_persisted, assert_toast, assert_upload_view,
    audio_file, image_file, TestHarness,
};
use cosmo_core::view::Status;
use cosmo_core::{AnalysisError, Category, ErrorClass, MediaKind, MockAnalyzer, Phase, Record, WorkspaceError};
use std::time::Duration;
use tokio::time::Instant;

// =============================================================================
// Submission
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_text_only_submission_fills_all_categories() {
    let mut harness = TestHarness::new();
    harness.open().await;
    harness.workspace.set_text("Elira wakes in a frozen forest");

    let start = Instant::now();
    harness.workspace.submit().await.expect("analysis should succeed");
    let elapsed = start.elapsed();

    assert!(elapsed >= Duration::from_millis(1800), "finished too early: {elapsed:?}");
    assert!(elapsed <= Duration::from_millis(2450), "finished too late: {elapsed:?}");

    assert_analysis_view(&harness);
    assert!(harness.workspace.view().is_tab_active(Category::Character));
    assert_eq!(harness.workspace.status(), Status::Done);
    assert_eq!(harness.workspace.phase(), Phase::Complete);
    assert!(harness.workspace.submit_enabled());
    assert!(!harness.workspace.view().is_loading());

    let record = harness.workspace.record().unwrap();
    assert_eq!(record, &canned_record());
    for category in Category::ALL {
        assert!(record.fields(category).all(|(_, v)| !v.is_empty()), "{category} not populated");
    }

    assert_toast(&harness, Severity::Success);
    assert_persisted(&harness, StoreKey::AnalysisData);
    assert_eq!(harness.stored(StoreKey::HasAnalyzed).as_deref(), Some("true"));
    assert_eq!(
        harness.stored(StoreKey::TextInput).as_deref(),
        Some("Elira wakes in a frozen forest")
    );

    let call = harness.analyzer.last_call().unwrap();
    assert_eq!(call.text, "Elira wakes in a frozen forest");
    assert!(call.image.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_empty_submission_is_guarded() {
    let mut harness = TestHarness::new();
    harness.open().await;

    let err = harness.workspace.submit().await.unwrap_err();
    assert!(matches!(err, WorkspaceError::EmptySubmission));
    assert_eq!(err.class(), ErrorClass::InputGuard);
    assert!(!harness.workspace.has_analyzed());
    assert_eq!(harness.workspace.phase(), Phase::Idle);
    assert_eq!(harness.analyzer.calls(), 0);
    assert_toast(&harness, Severity::Error);
    assert_not_persisted(&harness, StoreKey::TextInput);
}

#[tokio::test(start_paused = true)]
async fn test_media_alone_is_enough_to_submit() {
    let mut harness = TestHarness::with_analyzer(MockAnalyzer::instant());
    harness.open().await;
    assert!(harness.select(MediaKind::Audio, audio_file("theme.mp3")).await);

    harness.workspace.submit().await.unwrap();
    assert_analysis_view(&harness);
    assert_eq!(harness.analyzer.last_call().unwrap().text, "");
}

#[tokio::test(start_paused = true)]
async fn test_image_is_passed_to_analyzer() {
    let mut harness = TestHarness::with_analyzer(MockAnalyzer::instant());
    harness.open().await;
    assert!(harness.select(MediaKind::Image, image_file("map.png")).await);
    harness.workspace.set_text("  a map  ");

    harness.workspace.submit().await.unwrap();

    let call = harness.analyzer.last_call().unwrap();
    assert_eq!(call.text, "a map");
    let image = call.image.expect("image should be sent");
    assert!(image.starts_with("data:image/png;base64,"));
}

#[tokio::test(start_paused = true)]
async fn test_no_second_submit_while_analyzing() {
    let mut harness = TestHarness::new();
    harness.open().await;
    harness.workspace.set_text("fragment");

    let pending = harness.workspace.begin_analysis().await.unwrap();
    assert!(!harness.workspace.submit_enabled());
    assert!(harness.workspace.view().is_loading());
    assert_eq!(harness.workspace.status(), Status::Analyzing);

    let err = harness.workspace.begin_analysis().await.unwrap_err();
    assert!(matches!(err, WorkspaceError::Analysis(AnalysisError::Busy)));

    let result = pending.run(harness.analyzer.as_ref()).await;
    harness.workspace.finish_analysis(pending.ticket, result).await.unwrap();
    assert_eq!(harness.analyzer.calls(), 1);
    assert_analysis_view(&harness);
}

// =============================================================================
// Failure
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_failed_analysis_keeps_state() {
    let mut harness = TestHarness::with_analyzer(MockAnalyzer::failing("service down"));
    harness.open().await;
    harness.workspace.set_text("fragment");

    let err = harness.workspace.submit().await.unwrap_err();
    assert_eq!(err.class(), ErrorClass::AnalysisFailure);
    assert!(!harness.workspace.has_analyzed());
    assert_eq!(harness.workspace.phase(), Phase::Idle);
    assert_eq!(harness.workspace.status(), Status::Failed);
    assert!(harness.workspace.submit_enabled());
    assert!(!harness.workspace.view().is_loading());
    assert_toast(&harness, Severity::Error);
    assert_not_persisted(&harness, StoreKey::HasAnalyzed);
}

#[tokio::test(start_paused = true)]
async fn test_failure_after_success_preserves_prior_record() {
    let mut harness = TestHarness::with_analyzer(MockAnalyzer::instant());
    harness.open().await;
    harness.workspace.set_text("fragment");
    harness.workspace.submit().await.unwrap();
    harness.workspace.edit_field(Category::Character, "name", "Elira").unwrap();
    let before = harness.workspace.record().cloned();

    let pending = harness.workspace.begin_analysis().await.unwrap();
    let outcome = harness
        .workspace
        .finish_analysis(pending.ticket, Err(AnalysisError::Unavailable("timeout".into())))
        .await;

    assert!(outcome.is_err());
    assert!(harness.workspace.has_analyzed());
    assert_eq!(harness.workspace.record().cloned(), before);
    assert_eq!(harness.workspace.phase(), Phase::Complete);
    assert_eq!(harness.workspace.status(), Status::Failed);
    assert!(harness.workspace.submit_enabled());
    assert_analysis_view(&harness);
}

// =============================================================================
// Re-analysis and editing
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_reanalysis_replaces_record() {
    let mut first = Record::default();
    first.character.name = "Elira".to_string();
    first.geography.name = "Frozen Forest".to_string();

    let mut harness = TestHarness::with_analyzer(MockAnalyzer::returning(first.clone()).with_delay(Duration::ZERO, Duration::ZERO));
    harness.open().await;
    harness.workspace.set_text("fragment");
    harness.workspace.submit().await.unwrap();
    harness.workspace.edit_field(Category::Item, "name", "Lantern").unwrap();

    let mut second = Record::default();
    second.character.name = "Selver".to_string();
    let pending = harness.workspace.begin_analysis().await.unwrap();
    harness.workspace.finish_analysis(pending.ticket, Ok(second.clone())).await.unwrap();

    // Nothing from the first record or the edit survives.
    assert_eq!(harness.workspace.record(), Some(&second));
    assert!(!harness.workspace.is_save_pending(StoreKey::AnalysisData));
    let stored: serde_json::Value = serde_json::from_str(&harness.stored(StoreKey::AnalysisData).unwrap()).unwrap();
    assert_eq!(stored["geography"]["name"], "");
    assert_eq!(stored["items"]["name"], "");
}

#[tokio::test(start_paused = true)]
async fn test_field_edits_are_debounced() {
    let mut harness = TestHarness::with_analyzer(MockAnalyzer::instant());
    harness.open().await;
    harness.workspace.set_text("fragment");
    harness.workspace.submit().await.unwrap();
    let saved_after_submit = harness.stored(StoreKey::AnalysisData);

    harness.workspace.edit_field(Category::Worldview, "magicSystem", "Runes").unwrap();
    harness.wait(Duration::from_millis(500)).await;
    harness.workspace.edit_field(Category::Worldview, "era", "Fourth Age").unwrap();
    harness.wait(Duration::from_millis(700)).await;
    assert_eq!(harness.stored(StoreKey::AnalysisData), saved_after_submit);

    harness.wait(Duration::from_millis(100)).await;
    let stored: serde_json::Value = serde_json::from_str(&harness.stored(StoreKey::AnalysisData).unwrap()).unwrap();
    assert_eq!(stored["worldview"]["magicSystem"], "Runes");
    assert_eq!(stored["worldview"]["era"], "Fourth Age");
}

#[tokio::test(start_paused = true)]
async fn test_tab_switch_leaves_record_alone() {
    let mut harness = TestHarness::with_analyzer(MockAnalyzer::instant());
    harness.open().await;
    harness.workspace.set_text("fragment");
    harness.workspace.submit().await.unwrap();
    let before = harness.workspace.record().cloned();

    for category in Category::ALL {
        harness.workspace.switch_tab(category);
        assert!(harness.workspace.view().is_tab_active(category));
    }
    assert_eq!(harness.workspace.record().cloned(), before);
    assert!(!harness.workspace.is_save_pending(StoreKey::AnalysisData));
}

// =============================================================================
// Reclassify
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_reclassify_erases_record_and_keeps_text() {
    let mut harness = TestHarness::with_analyzer(MockAnalyzer::instant());
    harness.open().await;
    harness.workspace.set_text("Elira wakes in a frozen forest");
    harness.workspace.submit().await.unwrap();
    harness.workspace.edit_field(Category::Character, "race", "Elf").unwrap();

    harness.workspace.reclassify().await;

    assert!(!harness.workspace.has_analyzed());
    assert_eq!(harness.workspace.phase(), Phase::Idle);
    assert_upload_view(&harness);
    assert_eq!(harness.workspace.status(), Status::Waiting);
    assert_not_persisted(&harness, StoreKey::AnalysisData);
    assert_not_persisted(&harness, StoreKey::HasAnalyzed);
    assert_eq!(
        harness.stored(StoreKey::TextInput).as_deref(),
        Some("Elira wakes in a frozen forest")
    );
    assert_eq!(harness.workspace.text(), "Elira wakes in a frozen forest");

    // The pending edit must not bring the record back.
    harness.wait(Duration::from_secs(2)).await;
    assert_not_persisted(&harness, StoreKey::AnalysisData);
}

// =============================================================================
// Export
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_export_requires_analysis() {
    let mut harness = TestHarness::new();
    harness.open().await;

    let err = harness.workspace.export().await.unwrap_err();
    assert!(matches!(err, WorkspaceError::NothingToExport));
    assert_eq!(err.class(), ErrorClass::InputGuard);
    assert_eq!(harness.sink.count(), 0);
    assert_eq!(harness.live_handles(), 0);
    assert_toast(&harness, Severity::Error);
}

#[tokio::test(start_paused = true)]
async fn test_export_delivers_edited_record_and_releases_handle() {
    let mut harness = TestHarness::with_analyzer(MockAnalyzer::instant());
    harness.open().await;
    harness.workspace.set_text("fragment");
    harness.workspace.submit().await.unwrap();
    harness.workspace.edit_field(Category::Item, "type", "Shield").unwrap();

    let receipt = harness.workspace.export().await.unwrap();
    assert!(receipt.artifact.file_name.starts_with("cosmo-sorter-"));
    assert_eq!(harness.sink.count(), 1);
    assert_toast(&harness, Severity::Success);

    let exported: serde_json::Value = serde_json::from_str(&receipt.artifact.body).unwrap();
    assert_eq!(exported["items"]["type"], "Shield");
    assert_eq!(exported["character"]["name"], "Selver");
    assert_eq!(exported["_meta"]["source"], cosmo_core::record::EXPORT_SOURCE);
    assert_eq!(exported["_meta"]["version"], "1.0.0");

    // The handle outlives the download briefly, then goes away.
    assert_eq!(harness.live_handles(), 1);
    harness.wait(Duration::from_millis(500)).await;
    assert_eq!(harness.live_handles(), 1);
    harness.wait(Duration::from_millis(500)).await;
    assert_eq!(harness.live_handles(), 0);
    assert_eq!(harness.workspace.pending_release_count(), 0);
}

// =============================================================================
// Navigation
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_close_abandons_in_flight_analysis() {
    let mut harness = TestHarness::new();
    harness.open().await;
    harness.workspace.set_text("fragment");

    let pending = harness.workspace.begin_analysis().await.unwrap();
    harness.workspace.close().await;
    assert_eq!(harness.workspace.view().title(), cosmo_core::view::LANDING_TITLE);

    let result = pending.run(harness.analyzer.as_ref()).await;
    let outcome = harness.workspace.finish_analysis(pending.ticket, result).await.unwrap();

    assert_eq!(outcome, cosmo_core::AnalysisOutcome::Stale);
    assert!(!harness.workspace.has_analyzed());
    assert_not_persisted(&harness, StoreKey::HasAnalyzed);
}

#[tokio::test(start_paused = true)]
async fn test_reopen_abandons_in_flight_analysis() {
    let mut harness = TestHarness::new();
    harness.open().await;
    harness.workspace.set_text("fragment");

    let pending = harness.workspace.begin_analysis().await.unwrap();
    assert!(harness.workspace.view().is_loading());

    harness.open().await;
    assert!(!harness.workspace.view().is_loading());
    assert_eq!(harness.workspace.phase(), Phase::Idle);
    assert_eq!(harness.workspace.status(), Status::Waiting);
    assert!(harness.workspace.submit_enabled());
    assert_eq!(harness.workspace.text(), "fragment");
    assert_upload_view(&harness);

    let result = pending.run(harness.analyzer.as_ref()).await;
    let outcome = harness.workspace.finish_analysis(pending.ticket, result).await.unwrap();
    assert_eq!(outcome, cosmo_core::AnalysisOutcome::Stale);
    assert!(!harness.workspace.view().is_loading());
    assert!(!harness.workspace.has_analyzed());

    harness.workspace.submit().await.unwrap();
    assert_analysis_view(&harness);
}

#[tokio::test]
async fn test_reopen_keeps_unsaved_text() {
    let mut harness = TestHarness::new();
    harness.open().await;
    harness.workspace.set_text("typed before reopening");

    harness.open().await;

    assert_eq!(harness.workspace.text(), "typed before reopening");
    assert_persisted(&harness, StoreKey::TextInput);
}

#[tokio::test(start_paused = true)]
async fn test_notification_replaces_and_expires() {
    let mut harness = TestHarness::new();
    harness.open().await;

    let _ = harness.workspace.export().await;
    harness.wait(Duration::from_millis(1000)).await;
    let _ = harness.workspace.submit().await;

    let notifier = harness.workspace.notifier();
    assert_eq!(notifier.shown_total(), 2);
    let (toast, _) = notifier.current().unwrap();
    assert!(toast.message.contains("text fragment"));

    harness.wait(Duration::from_millis(3150)).await;
    assert!(harness.workspace.notifier().last().is_none());
}
