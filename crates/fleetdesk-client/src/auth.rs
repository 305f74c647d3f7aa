//! Bearer credentials and their on-disk store.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::TokenStoreError;

/// Credentials attached to every backend request.
///
/// Passed explicitly to [`crate::HttpBackend`]; nothing reads ambient storage
/// at request time.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct AuthContext {
    token: Option<String>,
}

impl AuthContext {
    /// Context sending `Authorization: Bearer <token>`. Blank tokens are dropped.
    #[must_use]
    pub fn bearer(token: impl Into<String>) -> Self {
        let token = token.into();
        let trimmed = token.trim();
        Self {
            token: (!trimmed.is_empty()).then(|| trimmed.to_string()),
        }
    }

    /// Context without credentials.
    #[must_use]
    pub const fn anonymous() -> Self {
        Self { token: None }
    }

    /// Whether a token is present.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// `Authorization` header value, if any.
    #[must_use]
    pub fn header_value(&self) -> Option<String> {
        self.token.as_deref().map(|token| format!("Bearer {token}"))
    }
}

impl std::fmt::Debug for AuthContext {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("AuthContext")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredToken {
    #[serde(default)]
    token: Option<String>,
}

/// JSON file holding the session token under the key `token`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    /// Store backed by `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store location.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the token; a missing file or empty value yields `None`.
    ///
    /// # Errors
    ///
    /// Returns [`TokenStoreError`] when the file cannot be read or parsed.
    pub fn load(&self) -> Result<Option<String>, TokenStoreError> {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(TokenStoreError::Io {
                    operation: "token_store.read",
                    path: self.path.clone(),
                    source,
                });
            }
        };
        let stored: StoredToken =
            serde_json::from_slice(&raw).map_err(|source| TokenStoreError::Malformed {
                path: self.path.clone(),
                source,
            })?;
        Ok(stored
            .token
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty()))
    }

    /// Load the token into an [`AuthContext`].
    ///
    /// # Errors
    ///
    /// Propagates [`TokenStore::load`] failures.
    pub fn auth_context(&self) -> Result<AuthContext, TokenStoreError> {
        Ok(self
            .load()?
            .map_or_else(AuthContext::anonymous, AuthContext::bearer))
    }

    /// Persist `token`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`TokenStoreError::Io`] when the file cannot be written.
    pub fn save(&self, token: &str) -> Result<(), TokenStoreError> {
        let body = serde_json::to_vec_pretty(&StoredToken {
            token: Some(token.to_string()),
        })
        .map_err(|source| TokenStoreError::Malformed {
            path: self.path.clone(),
            source,
        })?;
        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| TokenStoreError::Io {
                operation: "token_store.create_dir",
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&self.path, body).map_err(|source| TokenStoreError::Io {
            operation: "token_store.write",
            path: self.path.clone(),
            source,
        })
    }

    /// Remove the stored token. Missing files are not an error.
    ///
    /// # Errors
    ///
    /// Returns [`TokenStoreError::Io`] when removal fails.
    pub fn clear(&self) -> Result<(), TokenStoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(TokenStoreError::Io {
                operation: "token_store.remove",
                path: self.path.clone(),
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_drops_blank_tokens() {
        assert!(!AuthContext::bearer("   ").is_authenticated());
        assert_eq!(
            AuthContext::bearer(" abc ").header_value().as_deref(),
            Some("Bearer abc")
        );
        assert!(!format!("{:?}", AuthContext::bearer("secret")).contains("secret"));
    }

    #[test]
    fn store_round_trips_and_clears() -> Result<(), TokenStoreError> {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = TokenStore::new(dir.path().join("nested").join("session.json"));
        assert_eq!(store.load()?, None);

        store.save("tok-1")?;
        assert_eq!(store.load()?.as_deref(), Some("tok-1"));
        assert!(store.auth_context()?.is_authenticated());

        store.clear()?;
        store.clear()?;
        assert!(!store.auth_context()?.is_authenticated());
        Ok(())
    }

    #[test]
    fn malformed_store_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("session.json");
        fs::write(&path, b"not json").expect("write");
        let err = TokenStore::new(&path).load().expect_err("malformed");
        assert!(matches!(err, TokenStoreError::Malformed { .. }));
    }
}
