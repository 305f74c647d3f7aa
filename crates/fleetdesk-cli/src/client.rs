//! Shared context, error types, and credential resolution for the CLI.

use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::anyhow;
use fleetdesk_client::{AuthContext, HttpBackend, TokenStore};
use fleetdesk_core::{BackendError, Messages, Notifier, TransferError};
use thiserror::Error;
use url::Url;

use crate::cli::OutputFormat;

/// Exit status for input the operator can correct.
pub(crate) const EXIT_VALIDATION: i32 = 2;
/// Exit status for transport, backend, or local I/O failures.
pub(crate) const EXIT_FAILURE: i32 = 3;

/// Terminal outcome of a failed command; printed once by `run`.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    /// Bad arguments, unknown ids, or a backend refusal (4xx, `success: false`).
    #[error("{0}")]
    Validation(String),
    /// Anything the operator cannot fix by changing the command line.
    #[error("{0:#}")]
    Failure(anyhow::Error),
}

/// Result alias for command handlers.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => EXIT_VALIDATION,
            Self::Failure(_) => EXIT_FAILURE,
        }
    }
}

/// How confirmation prompts are answered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ConfirmPolicy {
    /// `--yes` was given.
    AssumeYes,
    /// Ask on the terminal.
    Interactive,
    /// No terminal and no `--yes`; destructive commands are refused.
    NonInteractive,
}

impl ConfirmPolicy {
    /// Resolve `prompt` to a yes/no answer.
    pub(crate) fn ask(self, prompt: &str) -> CliResult<bool> {
        match self {
            Self::AssumeYes => Ok(true),
            Self::NonInteractive => Err(CliError::validation(
                "confirmation required; pass --yes to run non-interactively",
            )),
            Self::Interactive => {
                let mut stdout = io::stdout();
                write!(stdout, "{prompt} [y/N] ")
                    .and_then(|()| stdout.flush())
                    .map_err(|err| CliError::failure(anyhow!("failed to write prompt: {err}")))?;
                let mut answer = String::new();
                io::stdin()
                    .lock()
                    .read_line(&mut answer)
                    .map_err(|err| CliError::failure(anyhow!("failed to read answer: {err}")))?;
                Ok(is_affirmative(&answer))
            }
        }
    }
}

pub(crate) fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Application context passed to command handlers.
#[derive(Clone)]
pub(crate) struct AppContext {
    pub(crate) backend: Arc<HttpBackend>,
    pub(crate) notifier: Arc<dyn Notifier>,
    pub(crate) messages: Messages,
    pub(crate) confirm: ConfirmPolicy,
    pub(crate) output: OutputFormat,
}

/// Parse the API URL provided to the CLI.
pub(crate) fn parse_url(input: &str) -> Result<Url, String> {
    input
        .parse::<Url>()
        .map_err(|err| format!("invalid URL '{input}': {err}"))
}

/// Explicit `--token` wins over the token file.
pub(crate) fn resolve_auth(
    token: Option<&str>,
    token_file: Option<&Path>,
) -> CliResult<AuthContext> {
    if let Some(token) = token.filter(|value| !value.trim().is_empty()) {
        return Ok(AuthContext::bearer(token));
    }
    match token_file {
        Some(path) => TokenStore::new(path).auth_context().map_err(|err| {
            CliError::failure(anyhow::Error::new(err).context("failed to load token file"))
        }),
        None => Ok(AuthContext::anonymous()),
    }
}

/// Classify a backend failure into a CLI error.
///
/// Client-side rejections (400/409/422) and `success: false` answers are
/// validation errors; everything else is operational.
pub(crate) fn backend_failure(err: &BackendError, fallback: &str) -> CliError {
    let message = err.user_message().unwrap_or(fallback).to_string();
    match err {
        BackendError::Rejected {
            status: 400 | 409 | 422,
            ..
        }
        | BackendError::Unsuccessful { .. } => CliError::validation(message),
        BackendError::Rejected { status, .. } => {
            CliError::failure(anyhow!("{message} (status {status})"))
        }
        BackendError::Transport { detail, .. } | BackendError::Decode { detail, .. } => {
            CliError::failure(anyhow!("{message}: {detail}"))
        }
        BackendError::Unsupported { operation } => {
            CliError::failure(anyhow!("{operation} is not supported by this backend"))
        }
    }
}

/// Map a transfer failure to the text already shown to the user.
pub(crate) fn transfer_failure(
    err: &TransferError,
    messages: &Messages,
    fallback: &str,
) -> CliError {
    match err {
        TransferError::Backend(inner) => backend_failure(inner, fallback),
        TransferError::EndpointMissing {
            direction: "export",
        } => CliError::validation(messages.export_endpoint_missing.clone()),
        TransferError::EndpointMissing { direction } => {
            CliError::validation(format!("{fallback}: no {direction} endpoint given"))
        }
        TransferError::NoFileSelected => CliError::validation(messages.import_no_file.clone()),
        TransferError::NotAccepted { file, accept } => CliError::validation(format!(
            "{} ({} not in {accept})",
            messages.import_not_accepted,
            file.display()
        )),
        TransferError::Io { path, source, .. } => CliError::failure(anyhow!(
            "{fallback}: {} ({source})",
            path.display()
        )),
        TransferError::Busy { direction } => {
            CliError::failure(anyhow!("an {direction} is already running"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn explicit_token_beats_token_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("session.json");
        TokenStore::new(&path).save("from-file")?;

        let explicit = resolve_auth(Some("flag"), Some(&path)).map_err(|err| anyhow!(err.to_string()))?;
        assert_eq!(explicit.header_value().as_deref(), Some("Bearer flag"));

        let stored = resolve_auth(None, Some(&path)).map_err(|err| anyhow!(err.to_string()))?;
        assert_eq!(stored.header_value().as_deref(), Some("Bearer from-file"));

        let none = resolve_auth(Some("  "), None).map_err(|err| anyhow!(err.to_string()))?;
        assert!(!none.is_authenticated());
        Ok(())
    }

    #[test]
    fn backend_failures_map_to_exit_codes() {
        let rejected = BackendError::Rejected {
            operation: "bulk_delete",
            status: 422,
            message: Some("driver on trip".into()),
        };
        let err = backend_failure(&rejected, "fallback");
        assert_eq!(err.exit_code(), 2);
        assert_eq!(err.to_string(), "driver on trip");

        let server_error = BackendError::Rejected {
            operation: "list",
            status: 503,
            message: None,
        };
        let err = backend_failure(&server_error, "Failed to load records");
        assert_eq!(err.exit_code(), 3);
        assert_eq!(err.to_string(), "Failed to load records (status 503)");
    }

    #[test]
    fn confirmation_policy_answers() {
        assert!(matches!(ConfirmPolicy::AssumeYes.ask("go?"), Ok(true)));
        assert!(matches!(
            ConfirmPolicy::NonInteractive.ask("go?"),
            Err(CliError::Validation(_))
        ));
        assert!(is_affirmative(" YES\n"));
        assert!(!is_affirmative(""));
    }
}
