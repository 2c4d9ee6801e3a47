//! State and outcome types for the request list screen.

use chrono::{DateTime, Utc};

use crate::ui::{ConfirmDialog, NoticeLevel};

/// Lifecycle of the list screen.
///
/// Deletions mutate the list in place and never return it to `Loading`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListState {
    /// Waiting for an identity or for the first fetch to settle.
    Loading,
    /// The fetch settled (successfully or not).
    Loaded { loaded_at: DateTime<Utc> },
}

impl ListState {
    pub fn is_loading(&self) -> bool {
        matches!(self, ListState::Loading)
    }
}

/// Result of a delete attempt that ran to completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// The user dismissed the confirmation; nothing was sent.
    Declined,
    /// The API deleted the request and it was removed from the list.
    Deleted,
    /// The API answered `success: false`; the list is unchanged.
    Rejected,
    /// The call failed in transport; the list is unchanged.
    Failed,
}

/// The destructive-action warning shown before deleting.
pub fn delete_confirmation() -> ConfirmDialog {
    ConfirmDialog {
        level: NoticeLevel::Warning,
        title: "Are you sure?".to_string(),
        text: "You won't be able to revert this!".to_string(),
        confirm_label: "Yes, delete it!".to_string(),
        cancel_label: "Cancel".to_string(),
    }
}
