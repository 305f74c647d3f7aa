//! Errors raised while constructing clients or reading credentials.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result alias for client construction.
pub type ClientResult<T> = Result<T, ClientError>;

/// Failures building an [`crate::HttpBackend`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// The API base URL could not be parsed.
    #[error("invalid API base URL")]
    InvalidBaseUrl {
        /// Offending input.
        url: String,
        /// Parser description.
        detail: String,
    },
    /// A header value contained characters HTTP does not allow.
    #[error("invalid header value")]
    InvalidHeader {
        /// Header name.
        name: &'static str,
    },
    /// reqwest refused the client configuration.
    #[error("failed to build HTTP client")]
    Build {
        /// Underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },
}

/// Failures reading or writing the persisted token.
#[derive(Debug, Error)]
pub enum TokenStoreError {
    /// Filesystem access failed.
    #[error("token store io failure")]
    Io {
        /// Operation attempted.
        operation: &'static str,
        /// Store location.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// The store exists but is not the expected JSON document.
    #[error("token store is malformed")]
    Malformed {
        /// Store location.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },
}
