//! Transient user-facing notifications.
//!
//! Only one toast is shown at a time; a new one replaces the current one
//! instead of queueing behind it.

use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
}

impl Severity {
    pub fn label(self) -> &'static str {
        match self {
            Severity::Success => "success",
            Severity::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub severity: Severity,
    pub shown_at: Instant,
}

/// Where a toast is in its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastPhase {
    Visible,
    /// Playing the exit animation.
    Leaving,
}

#[derive(Debug)]
pub struct Notifier {
    current: Option<Toast>,
    visible_for: Duration,
    exit_for: Duration,
    shown_total: u64,
}

impl Notifier {
    pub fn new(visible_for: Duration, exit_for: Duration) -> Self {
        Self {
            current: None,
            visible_for,
            exit_for,
            shown_total: 0,
        }
    }

    /// Show a message, replacing whatever is on screen.
    pub fn show(&mut self, message: impl Into<String>, severity: Severity) {
        let message = message.into();
        match severity {
            Severity::Success => tracing::info!(%message, "notify"),
            Severity::Error => tracing::warn!(%message, "notify"),
        }
        self.current = Some(Toast {
            message,
            severity,
            shown_at: Instant::now(),
        });
        self.shown_total += 1;
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.show(message, Severity::Success);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.show(message, Severity::Error);
    }

    /// The toast on screen at `now`, with its phase.
    pub fn current_at(&self, now: Instant) -> Option<(&Toast, ToastPhase)> {
        let toast = self.current.as_ref()?;
        let age = now.saturating_duration_since(toast.shown_at);
        if age < self.visible_for {
            Some((toast, ToastPhase::Visible))
        } else if age < self.visible_for + self.exit_for {
            Some((toast, ToastPhase::Leaving))
        } else {
            None
        }
    }

    pub fn current(&self) -> Option<(&Toast, ToastPhase)> {
        self.current_at(Instant::now())
    }

    /// The most recent toast, even if it has already expired.
    pub fn last(&self) -> Option<&Toast> {
        self.current.as_ref()
    }

    /// Forget a toast whose exit animation has finished.
    pub fn expire(&mut self, now: Instant) {
        if self.current.is_some() && self.current_at(now).is_none() {
            self.current = None;
        }
    }

    /// When the current toast will be gone.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.current
            .as_ref()
            .map(|t| t.shown_at + self.visible_for + self.exit_for)
    }

    pub fn shown_total(&self) -> u64 {
        self.shown_total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notifier() -> Notifier {
        Notifier::new(Duration::from_millis(2800), Duration::from_millis(350))
    }

    #[tokio::test(start_paused = true)]
    async fn test_lifecycle() {
        let mut notifier = notifier();
        notifier.success("Saved");

        let (toast, phase) = notifier.current().unwrap();
        assert_eq!(toast.message, "Saved");
        assert_eq!(phase, ToastPhase::Visible);

        tokio::time::advance(Duration::from_millis(2900)).await;
        assert_eq!(notifier.current().unwrap().1, ToastPhase::Leaving);

        tokio::time::advance(Duration::from_millis(300)).await;
        assert!(notifier.current().is_none());
        notifier.expire(Instant::now());
        assert!(notifier.last().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_toast_replaces_current() {
        let mut notifier = notifier();
        notifier.success("first");
        tokio::time::advance(Duration::from_millis(2000)).await;
        notifier.error("second");

        let (toast, phase) = notifier.current().unwrap();
        assert_eq!(toast.message, "second");
        assert_eq!(toast.severity, Severity::Error);
        assert_eq!(phase, ToastPhase::Visible);
        assert_eq!(notifier.shown_total(), 2);

        // The replacement gets its own full lifetime.
        tokio::time::advance(Duration::from_millis(2000)).await;
        assert_eq!(notifier.current().unwrap().1, ToastPhase::Visible);
    }
}
