//! Toast-style notifications and the default message catalog.
//!
//! Rendering is owned by the front-end; the core only emits [`Notice`] values
//! through a [`Notifier`].

use std::sync::Mutex;

/// Severity classification for a notice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NoticeKind {
    /// Neutral information.
    Info,
    /// A mutating action completed.
    Success,
    /// A precondition was not met; nothing was sent.
    Warning,
    /// A call failed.
    Error,
}

impl NoticeKind {
    /// Lower-case label used by renderers and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

/// One user-visible outcome.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    /// Severity.
    pub kind: NoticeKind,
    /// Display text.
    pub message: String,
}

impl Notice {
    /// Build a notice of the given kind.
    #[must_use]
    pub fn new(kind: NoticeKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Sink for notices emitted by pages and pipelines.
pub trait Notifier: Send + Sync {
    /// Surface a notice to the user.
    fn notify(&self, notice: Notice);

    /// Shorthand for a success notice.
    fn success(&self, message: &str) {
        self.notify(Notice::new(NoticeKind::Success, message));
    }

    /// Shorthand for a warning notice.
    fn warning(&self, message: &str) {
        self.notify(Notice::new(NoticeKind::Warning, message));
    }

    /// Shorthand for an error notice.
    fn error(&self, message: &str) {
        self.notify(Notice::new(NoticeKind::Error, message));
    }
}

/// Notifier that keeps every notice in memory.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    /// Empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of all notices recorded so far.
    #[must_use]
    pub fn notices(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    /// Most recent notice, if any.
    #[must_use]
    pub fn last(&self) -> Option<Notice> {
        self.notices
            .lock()
            .ok()
            .and_then(|guard| guard.last().cloned())
    }

    /// Drain and return the recorded notices.
    pub fn take(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .map(|mut guard| std::mem::take(&mut *guard))
            .unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        if let Ok(mut guard) = self.notices.lock() {
            guard.push(notice);
        }
    }
}

/// Display strings used when the backend does not supply its own.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Messages {
    /// Bulk action attempted with nothing selected.
    pub select_rows_first: String,
    /// Bulk delete prompt; `{count}` is replaced with the number of rows.
    pub confirm_bulk_delete: String,
    /// Single-row delete prompt.
    pub confirm_delete: String,
    /// Bulk delete completed.
    pub bulk_delete_success: String,
    /// Bulk status update completed.
    pub bulk_status_success: String,
    /// Single-row delete completed.
    pub delete_success: String,
    /// Row created.
    pub create_success: String,
    /// Row updated.
    pub update_success: String,
    /// Generic failure for mutating actions.
    pub action_failed: String,
    /// List fetch failed.
    pub fetch_failed: String,
    /// Export saved.
    pub export_success: String,
    /// Generic export failure.
    pub export_failed: String,
    /// Export triggered without an endpoint.
    pub export_endpoint_missing: String,
    /// Import accepted by the backend.
    pub import_success: String,
    /// Generic import failure.
    pub import_failed: String,
    /// Import triggered without a file.
    pub import_no_file: String,
    /// Chosen file rejected by the picker's accept list.
    pub import_not_accepted: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            select_rows_first: "Please select at least one item".into(),
            confirm_bulk_delete: "Are you sure you want to delete {count} selected item(s)?"
                .into(),
            confirm_delete: "Are you sure you want to delete this item?".into(),
            bulk_delete_success: "Selected items deleted successfully".into(),
            bulk_status_success: "Status updated successfully".into(),
            delete_success: "Item deleted successfully".into(),
            create_success: "Item created successfully".into(),
            update_success: "Item updated successfully".into(),
            action_failed: "Something went wrong. Please try again".into(),
            fetch_failed: "Failed to load records".into(),
            export_success: "Export completed successfully".into(),
            export_failed: "Export failed".into(),
            export_endpoint_missing: "Export endpoint is not configured".into(),
            import_success: "Import completed successfully".into(),
            import_failed: "Import failed".into(),
            import_no_file: "Please choose a file to import".into(),
            import_not_accepted: "Selected file type is not supported".into(),
        }
    }
}

impl Messages {
    /// Bulk delete prompt for `count` rows.
    #[must_use]
    pub fn bulk_delete_prompt(&self, count: usize) -> String {
        self.confirm_bulk_delete
            .replace("{count}", &count.to_string())
    }
}
