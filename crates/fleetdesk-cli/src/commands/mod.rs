//! Command handlers grouped by concern.

pub(crate) mod bulk;
pub(crate) mod chat;
pub(crate) mod config;
pub(crate) mod resources;
pub(crate) mod transfer;

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use fleetdesk_client::{AuthContext, HttpBackend, HttpOptions};
    use fleetdesk_core::{Messages, RecordingNotifier};
    use httpmock::MockServer;

    use crate::cli::OutputFormat;
    use crate::client::{AppContext, ConfirmPolicy};

    pub(crate) fn context_with(
        server: &MockServer,
        confirm: ConfirmPolicy,
    ) -> (AppContext, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::new());
        let backend = HttpBackend::new(
            &format!("{}/api", server.base_url()),
            AuthContext::bearer("test-token"),
            HttpOptions::default(),
        )
        .expect("backend");
        let ctx = AppContext {
            backend: Arc::new(backend),
            notifier: notifier.clone(),
            messages: Messages::default(),
            confirm,
            output: OutputFormat::Table,
        };
        (ctx, notifier)
    }
}
