//! Workspace configuration.

use std::path::PathBuf;
use std::time::Duration;

const STORE_DIR_VAR: &str = "COSMO_STORE_DIR";
const EXPORT_DIR_VAR: &str = "COSMO_EXPORT_DIR";
const ANALYZER_URL_VAR: &str = "COSMO_ANALYZER_URL";
const ANALYZER_KEY_VAR: &str = "COSMO_ANALYZER_KEY";

/// Configuration for a workspace.
#[derive(Debug, Clone)]
pub struct WorkspaceConfig {
    /// Directory of the durable key-value store.
    pub store_dir: PathBuf,

    /// Directory exported artifacts are written to.
    pub export_dir: PathBuf,

    /// Quiet period before the text input is saved.
    pub text_debounce: Duration,

    /// Quiet period before edited record fields are saved.
    pub field_debounce: Duration,

    /// How long a notification stays fully visible.
    pub toast_visible: Duration,

    /// Length of a notification's exit animation.
    pub toast_exit: Duration,

    /// How long an export's download handle outlives the download.
    pub export_release: Duration,

    /// Bounds of the simulated analysis delay.
    pub mock_delay: (Duration, Duration),

    /// Remote analysis endpoint. The mock is used when unset.
    pub analyzer_url: Option<String>,

    pub analyzer_key: Option<String>,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkspaceConfig {
    pub fn new() -> Self {
        Self {
            store_dir: PathBuf::from(".cosmo"),
            export_dir: PathBuf::from("exports"),
            text_debounce: Duration::from_millis(600),
            field_debounce: Duration::from_millis(800),
            toast_visible: Duration::from_millis(2800),
            toast_exit: Duration::from_millis(350),
            export_release: Duration::from_millis(1000),
            mock_delay: (Duration::from_millis(1800), Duration::from_millis(2400)),
            analyzer_url: None,
            analyzer_key: None,
        }
    }

    /// Defaults overlaid with `COSMO_*` environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::new();
        if let Some(dir) = env_var(STORE_DIR_VAR) {
            config.store_dir = PathBuf::from(dir);
        }
        if let Some(dir) = env_var(EXPORT_DIR_VAR) {
            config.export_dir = PathBuf::from(dir);
        }
        config.analyzer_url = env_var(ANALYZER_URL_VAR);
        config.analyzer_key = env_var(ANALYZER_KEY_VAR);
        config
    }

    pub fn with_store_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.store_dir = dir.into();
        self
    }

    pub fn with_export_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.export_dir = dir.into();
        self
    }

    pub fn with_text_debounce(mut self, delay: Duration) -> Self {
        self.text_debounce = delay;
        self
    }

    pub fn with_field_debounce(mut self, delay: Duration) -> Self {
        self.field_debounce = delay;
        self
    }

    pub fn with_toast_timing(mut self, visible: Duration, exit: Duration) -> Self {
        self.toast_visible = visible;
        self.toast_exit = exit;
        self
    }

    pub fn with_export_release(mut self, delay: Duration) -> Self {
        self.export_release = delay;
        self
    }

    pub fn with_mock_delay(mut self, min: Duration, max: Duration) -> Self {
        self.mock_delay = (min, max);
        self
    }

    /// Use a remote analysis service instead of the mock.
    pub fn with_analyzer(mut self, url: impl Into<String>, key: Option<String>) -> Self {
        self.analyzer_url = Some(url.into());
        self.analyzer_key = key;
        self
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
