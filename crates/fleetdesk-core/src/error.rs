//! # Design
//!
//! - Constant error messages; context lives in structured fields.
//! - Backend failures keep the server's own message so pages can show it verbatim.
//! - Transfer errors separate local preconditions from backend failures.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for backend calls.
pub type BackendResult<T> = Result<T, BackendError>;

/// Result type for export/import operations.
pub type TransferResult<T> = Result<T, TransferError>;

/// Failures surfaced by a backend adapter.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The request never produced an HTTP response.
    #[error("backend transport failure")]
    Transport {
        /// Operation that was attempted.
        operation: &'static str,
        /// Adapter-specific description of the failure.
        detail: String,
    },
    /// The backend answered with a non-2xx status.
    #[error("backend rejected request")]
    Rejected {
        /// Operation that was attempted.
        operation: &'static str,
        /// HTTP status code.
        status: u16,
        /// Message parsed from the error body, when present.
        message: Option<String>,
    },
    /// The backend answered 2xx but with `success: false`.
    #[error("backend reported failure")]
    Unsuccessful {
        /// Operation that was attempted.
        operation: &'static str,
        /// Message from the envelope, when present.
        message: Option<String>,
    },
    /// The response body could not be decoded.
    #[error("backend response decode failure")]
    Decode {
        /// Operation that was attempted.
        operation: &'static str,
        /// Decoder description of the failure.
        detail: String,
    },
    /// The adapter does not implement the operation.
    #[error("backend operation unsupported")]
    Unsupported {
        /// Operation that was attempted.
        operation: &'static str,
    },
}

impl BackendError {
    /// Backend-provided message suitable for showing to the user.
    #[must_use]
    pub fn user_message(&self) -> Option<&str> {
        match self {
            Self::Rejected { message, .. } | Self::Unsuccessful { message, .. } => message
                .as_deref()
                .map(str::trim)
                .filter(|text| !text.is_empty()),
            Self::Transport { .. } | Self::Decode { .. } | Self::Unsupported { .. } => None,
        }
    }

    /// Operation label attached to the failure.
    #[must_use]
    pub const fn operation(&self) -> &'static str {
        match self {
            Self::Transport { operation, .. }
            | Self::Rejected { operation, .. }
            | Self::Unsuccessful { operation, .. }
            | Self::Decode { operation, .. }
            | Self::Unsupported { operation } => *operation,
        }
    }
}

/// Failures produced by the export/import pipeline.
#[derive(Debug, Error)]
pub enum TransferError {
    /// A transfer in the same direction is still running.
    #[error("transfer already in flight")]
    Busy {
        /// `export` or `import`.
        direction: &'static str,
    },
    /// No endpoint was configured for the transfer.
    #[error("transfer endpoint missing")]
    EndpointMissing {
        /// `export` or `import`.
        direction: &'static str,
    },
    /// Import was triggered without a chosen file.
    #[error("no import file selected")]
    NoFileSelected,
    /// The chosen file does not satisfy the picker's accept list.
    #[error("file type not accepted")]
    NotAccepted {
        /// Offending file.
        file: PathBuf,
        /// Accept list configured on the picker.
        accept: String,
    },
    /// Local filesystem failure while reading or saving a file.
    #[error("transfer io failure")]
    Io {
        /// Operation that triggered the failure.
        operation: &'static str,
        /// Path involved in the failure.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// The backend call failed.
    #[error("transfer backend failure")]
    Backend(#[from] BackendError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_prefers_non_blank_backend_text() {
        let rejected = BackendError::Rejected {
            operation: "export",
            status: 500,
            message: Some("disk full".into()),
        };
        assert_eq!(rejected.user_message(), Some("disk full"));
        assert_eq!(rejected.operation(), "export");

        let blank = BackendError::Unsuccessful {
            operation: "bulk_delete",
            message: Some("   ".into()),
        };
        assert_eq!(blank.user_message(), None);

        let transport = BackendError::Transport {
            operation: "list",
            detail: "connection refused".into(),
        };
        assert_eq!(transport.user_message(), None);
    }
}
