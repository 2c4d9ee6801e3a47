//! Host UI capabilities consumed by the controllers.
//!
//! The host renders notices and dialogs and owns routing; controllers only
//! describe what should be shown through the [`Notifier`] and [`Navigator`] traits.

use async_trait::async_trait;

use crate::domain::RequestId;

/// Visual severity of a notice or dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
    Warning,
}

/// A transient message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub text: String,
}

impl Notice {
    pub fn success(title: &str, text: &str) -> Self {
        Self {
            level: NoticeLevel::Success,
            title: title.to_string(),
            text: text.to_string(),
        }
    }

    pub fn error(title: &str, text: &str) -> Self {
        Self {
            level: NoticeLevel::Error,
            title: title.to_string(),
            text: text.to_string(),
        }
    }
}

/// A blocking confirm/cancel prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmDialog {
    pub level: NoticeLevel,
    pub title: String,
    pub text: String,
    pub confirm_label: String,
    pub cancel_label: String,
}

/// Named destinations the controllers can send the user to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    RequestDetails(RequestId),
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::RequestDetails(id) => format!("/dashboard/blood-requests/{}", id),
        }
    }
}

/// Notification and dialog capability.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Show a notice without waiting for the user.
    fn notify(&self, notice: Notice);

    /// Show `dialog` and resolve to `true` only if the user confirmed.
    async fn confirm(&self, dialog: &ConfirmDialog) -> bool;
}

/// Route change capability.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

// ============================================================================
// Recording Implementations
// ============================================================================

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// Notifier that records everything it is asked to show.
///
/// Confirm answers are taken from a queue; when the queue is empty the
/// dialog is treated as cancelled.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    notices: Arc<Mutex<Vec<Notice>>>,
    dialogs: Arc<Mutex<Vec<ConfirmDialog>>>,
    answers: Arc<Mutex<VecDeque<bool>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the answer for the next confirm dialog.
    pub fn answer_next(&self, confirmed: bool) {
        self.answers.lock().push_back(confirmed);
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().clone()
    }

    pub fn dialogs(&self) -> Vec<ConfirmDialog> {
        self.dialogs.lock().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().push(notice);
    }

    async fn confirm(&self, dialog: &ConfirmDialog) -> bool {
        self.dialogs.lock().push(dialog.clone());
        self.answers.lock().pop_front().unwrap_or(false)
    }
}

/// Navigator that records the routes it was sent to.
#[derive(Clone, Default)]
pub struct RecordingNavigator {
    routes: Arc<Mutex<Vec<Route>>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn routes(&self) -> Vec<Route> {
        self.routes.lock().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        self.routes.lock().push(route);
    }
}
