//! Export download and import upload pipeline.
//!
//! # Design
//! - Export and import have independent in-flight flags.
//! - Export filenames come from `Content-Disposition`, else `export_<millis>.<ext>`.
//! - Import always resets the file input, whatever the outcome.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fleetdesk_api_models::{ApiEnvelope, ExportFormat};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::backend::{ImportFile, TransferBackend};
use crate::error::{TransferError, TransferResult};
use crate::flight::InFlight;
use crate::notice::{Messages, Notifier};

static FILENAME_PATTERN: Lazy<Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(r#"filename="([^"]+)""#));

/// Name to save an export under.
///
/// Uses the quoted `filename="…"` from `content_disposition` when present,
/// otherwise `export_<unix-millis>.<ext>`.
#[must_use]
pub fn export_filename(
    content_disposition: Option<&str>,
    format: ExportFormat,
    now: DateTime<Utc>,
) -> String {
    content_disposition
        .and_then(|header| {
            let pattern = (*FILENAME_PATTERN).as_ref().ok()?;
            pattern
                .captures(header)
                .and_then(|captures| captures.get(1))
                .map(|found| found.as_str().to_string())
        })
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| {
            format!(
                "export_{}.{}",
                now.timestamp_millis(),
                format.extension()
            )
        })
}

/// Where downloaded exports are written.
#[async_trait]
pub trait DownloadSink: Send + Sync {
    /// Persist `bytes` under `filename`; returns the final location.
    async fn save(&self, filename: &str, bytes: &[u8]) -> std::io::Result<PathBuf>;
}

/// Saves exports into a directory, keeping only the final path component of the name.
#[derive(Clone, Debug)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    /// Sink writing into `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl DownloadSink for DirectorySink {
    async fn save(&self, filename: &str, bytes: &[u8]) -> std::io::Result<PathBuf> {
        let leaf = Path::new(filename)
            .file_name()
            .map_or_else(|| PathBuf::from("export"), PathBuf::from);
        tokio::fs::create_dir_all(&self.dir).await?;
        let target = self.dir.join(leaf);
        tokio::fs::write(&target, bytes).await?;
        Ok(target)
    }
}

/// In-flight flags for the two transfer directions.
#[derive(Debug, Default)]
pub struct TransferState {
    export: InFlight,
    import: InFlight,
}

impl TransferState {
    /// Idle state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the export control is disabled.
    #[must_use]
    pub fn is_exporting(&self) -> bool {
        self.export.is_active()
    }

    /// Whether the import control is disabled.
    #[must_use]
    pub fn is_importing(&self) -> bool {
        self.import.is_active()
    }
}

/// File picker bound to an import control.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FileInput {
    accept: String,
    value: Option<PathBuf>,
}

impl FileInput {
    /// Picker with an HTML-style accept list such as `.xlsx,.csv`.
    #[must_use]
    pub fn new(accept: impl Into<String>) -> Self {
        Self {
            accept: accept.into(),
            value: None,
        }
    }

    /// Accept list.
    #[must_use]
    pub fn accept(&self) -> &str {
        &self.accept
    }

    /// Currently chosen file.
    #[must_use]
    pub fn value(&self) -> Option<&Path> {
        self.value.as_deref()
    }

    /// Choose `path`, honouring extension entries of the accept list.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError::NotAccepted`] when the accept list names
    /// extensions and `path` matches none of them.
    pub fn choose(&mut self, path: impl Into<PathBuf>) -> TransferResult<()> {
        let path = path.into();
        if !self.accepts(&path) {
            return Err(TransferError::NotAccepted {
                file: path,
                accept: self.accept.clone(),
            });
        }
        self.value = Some(path);
        Ok(())
    }

    /// Clear the chosen file so the same name can be picked again.
    pub fn reset(&mut self) {
        self.value = None;
    }

    fn accepts(&self, path: &Path) -> bool {
        let entries: Vec<String> = self
            .accept
            .split(',')
            .map(|entry| entry.trim().to_ascii_lowercase())
            .filter(|entry| !entry.is_empty())
            .collect();
        if entries.iter().any(|entry| entry == "*" || entry == "*/*") {
            return true;
        }
        let extensions: Vec<&str> = entries
            .iter()
            .filter_map(|entry| entry.strip_prefix('.'))
            .collect();
        if extensions.is_empty() {
            return true;
        }
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .is_some_and(|ext| extensions.contains(&ext.as_str()))
    }
}

/// Result of a saved export.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SavedExport {
    /// Name chosen for the file.
    pub filename: String,
    /// Where the sink wrote it.
    pub path: PathBuf,
    /// Size of the download.
    pub size_bytes: usize,
}

/// Runs exports and imports on behalf of a page. Holds no state of its own.
pub struct TransferPipeline<'a, T: ?Sized> {
    backend: &'a T,
    notifier: &'a dyn Notifier,
    messages: &'a Messages,
}

impl<'a, T> TransferPipeline<'a, T>
where
    T: TransferBackend + ?Sized,
{
    /// Pipeline borrowing the page's collaborators.
    #[must_use]
    pub const fn new(backend: &'a T, notifier: &'a dyn Notifier, messages: &'a Messages) -> Self {
        Self {
            backend,
            notifier,
            messages,
        }
    }

    /// Download `endpoint` in `format` and hand it to `sink`.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError::EndpointMissing`] for a blank endpoint,
    /// [`TransferError::Busy`] while another export runs, and backend or IO
    /// failures otherwise. Every error except `Busy` has already been notified.
    pub async fn export(
        &self,
        state: &TransferState,
        endpoint: &str,
        format: ExportFormat,
        sink: &dyn DownloadSink,
    ) -> TransferResult<SavedExport> {
        if endpoint.trim().is_empty() {
            self.notifier.error(&self.messages.export_endpoint_missing);
            return Err(TransferError::EndpointMissing {
                direction: "export",
            });
        }
        let Some(_guard) = state.export.try_begin() else {
            return Err(TransferError::Busy {
                direction: "export",
            });
        };

        let payload = match self.backend.export(endpoint, format).await {
            Ok(payload) => payload,
            Err(err) => {
                tracing::warn!(endpoint, format = format.as_query(), error = %err, "export failed");
                self.notifier
                    .error(err.user_message().unwrap_or(&self.messages.export_failed));
                return Err(err.into());
            }
        };

        let filename = export_filename(payload.content_disposition.as_deref(), format, Utc::now());
        let path = match sink.save(&filename, &payload.bytes).await {
            Ok(path) => path,
            Err(source) => {
                tracing::warn!(filename = %filename, error = %source, "export save failed");
                self.notifier.error(&self.messages.export_failed);
                return Err(TransferError::Io {
                    operation: "export.save",
                    path: PathBuf::from(&filename),
                    source,
                });
            }
        };

        tracing::info!(endpoint, path = %path.display(), bytes = payload.bytes.len(), "export saved");
        self.notifier.success(&self.messages.export_success);
        Ok(SavedExport {
            filename,
            path,
            size_bytes: payload.bytes.len(),
        })
    }

    /// Upload the file chosen in `input` to `endpoint`.
    ///
    /// `on_success` receives the parsed body so the page can refetch. The
    /// input is reset once the attempt completes, whatever the outcome.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError::Busy`] while another import runs (the input is
    /// left alone), and precondition, IO or backend failures otherwise, each
    /// already notified.
    pub async fn import<F>(
        &self,
        state: &TransferState,
        endpoint: &str,
        input: &mut FileInput,
        on_success: F,
    ) -> TransferResult<ApiEnvelope<Value>>
    where
        F: FnOnce(&ApiEnvelope<Value>) + Send,
    {
        let Some(_guard) = state.import.try_begin() else {
            return Err(TransferError::Busy {
                direction: "import",
            });
        };

        let result = self.upload(endpoint, input.value()).await;
        input.reset();

        match &result {
            Ok(body) => {
                self.notifier
                    .success(body.message().unwrap_or(&self.messages.import_success));
                on_success(body);
            }
            Err(err) => {
                tracing::warn!(endpoint, error = %err, "import failed");
                self.notify_import_failure(err);
            }
        }
        result
    }

    async fn upload(
        &self,
        endpoint: &str,
        chosen: Option<&Path>,
    ) -> TransferResult<ApiEnvelope<Value>> {
        if endpoint.trim().is_empty() {
            return Err(TransferError::EndpointMissing {
                direction: "import",
            });
        }
        let path = chosen.ok_or(TransferError::NoFileSelected)?;
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| TransferError::Io {
                operation: "import.read",
                path: path.to_path_buf(),
                source,
            })?;
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("import")
            .to_string();
        let body = self
            .backend
            .import(endpoint, ImportFile { file_name, bytes })
            .await?;
        Ok(body)
    }

    fn notify_import_failure(&self, err: &TransferError) {
        match err {
            TransferError::NoFileSelected => self.notifier.warning(&self.messages.import_no_file),
            TransferError::NotAccepted { .. } => {
                self.notifier.warning(&self.messages.import_not_accepted);
            }
            TransferError::Backend(backend) => self
                .notifier
                .error(backend.user_message().unwrap_or(&self.messages.import_failed)),
            TransferError::EndpointMissing { .. }
            | TransferError::Io { .. }
            | TransferError::Busy { .. } => self.notifier.error(&self.messages.import_failed),
        }
    }
}
