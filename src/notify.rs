//! Interval-complete notifications.
//!
//! Notifying is fire-and-forget: failures are logged and never reach the
//! caller, and nothing waits for the user to dismiss anything.

use std::sync::{Arc, Mutex};
use std::thread;

/// Title of the interval-complete notification.
pub const NOTIFICATION_TITLE: &str = "PomodoroCat";

/// Body of the interval-complete notification.
pub const INTERVAL_COMPLETE_MESSAGE: &str = "Time is up! Take a break!";

/// Trait for notification backends.
pub trait Notifier: Send {
    /// Shows a notification. Must not block on user interaction.
    fn notify(&self, title: &str, body: &str);
}

// ============================================================================
// DesktopNotifier
// ============================================================================

/// Sends notifications through the desktop notification service.
///
/// `notify` blocks on the notification service; wrap it in a
/// [`BackgroundNotifier`] on the controller task.
#[derive(Debug, Default)]
pub struct DesktopNotifier;

impl DesktopNotifier {
    pub fn new() -> Self {
        Self
    }
}

impl Notifier for DesktopNotifier {
    fn notify(&self, title: &str, body: &str) {
        let result = notify_rust::Notification::new()
            .summary(title)
            .body(body)
            .show();

        match result {
            Ok(_) => tracing::debug!(title, "notification shown"),
            Err(e) => tracing::warn!(error = %e, "failed to show notification"),
        }
    }
}

// ============================================================================
// BackgroundNotifier
// ============================================================================

/// Hands each notification to a short-lived thread so the caller never waits.
#[derive(Debug)]
pub struct BackgroundNotifier<N> {
    inner: Arc<N>,
}

impl<N> BackgroundNotifier<N>
where
    N: Notifier + Sync + 'static,
{
    pub fn new(inner: N) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }
}

impl<N> Notifier for BackgroundNotifier<N>
where
    N: Notifier + Sync + 'static,
{
    fn notify(&self, title: &str, body: &str) {
        let inner = Arc::clone(&self.inner);
        let title = title.to_string();
        let body = body.to_string();

        let spawned = thread::Builder::new()
            .name("notification".to_string())
            .spawn(move || inner.notify(&title, &body));

        if let Err(e) = spawned {
            tracing::warn!(error = %e, "failed to start notification thread");
        }
    }
}

// ============================================================================
// LogNotifier
// ============================================================================

/// Writes notifications to the log only. Used when notifications are disabled.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, title: &str, body: &str) {
        tracing::info!(title, body, "notification");
    }
}

// ============================================================================
// MockNotifier
// ============================================================================

/// Records notifications for testing. Clones share the same record.
#[derive(Debug, Clone, Default)]
pub struct MockNotifier {
    calls: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn notify_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or(0)
    }

    /// Returns the recorded `(title, body)` pairs.
    #[must_use]
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn clear_calls(&self) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.clear();
        }
    }
}

impl Notifier for MockNotifier {
    fn notify(&self, title: &str, body: &str) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((title.to_string(), body.to_string()));
        }
    }
}
