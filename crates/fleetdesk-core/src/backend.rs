//! Traits implemented by backend adapters (HTTP, in-memory fakes).

use async_trait::async_trait;
use fleetdesk_api_models::{AccountStatus, ApiEnvelope, ExportFormat, RecordId};
use serde_json::Value;

use crate::error::{BackendError, BackendResult};
use crate::resource::Resource;

/// Binary export response.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExportPayload {
    /// File contents.
    pub bytes: Vec<u8>,
    /// Raw `Content-Disposition` header, when sent.
    pub content_disposition: Option<String>,
}

/// File chosen for upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportFile {
    /// Name reported in the multipart part.
    pub file_name: String,
    /// File contents.
    pub bytes: Vec<u8>,
}

/// CRUD and bulk operations against a resource collection.
#[async_trait]
pub trait AdminBackend: Send + Sync {
    /// Fetch the authoritative rows of `resource`.
    async fn list(&self, resource: &Resource) -> BackendResult<Vec<Value>>;

    /// Delete every row in `ids` in one call.
    async fn bulk_delete(
        &self,
        resource: &Resource,
        ids: &[RecordId],
    ) -> BackendResult<ApiEnvelope<Value>>;

    /// Set the account status of every row in `ids`.
    async fn bulk_update_status(
        &self,
        ids: &[RecordId],
        status: AccountStatus,
    ) -> BackendResult<ApiEnvelope<Value>>;

    /// Delete one row; default implementation reports lack of support.
    async fn delete(&self, resource: &Resource, id: &RecordId) -> BackendResult<ApiEnvelope<Value>> {
        let _ = (resource, id);
        Err(BackendError::Unsupported { operation: "delete" })
    }

    /// Create one row; default implementation reports lack of support.
    async fn create(&self, resource: &Resource, body: &Value) -> BackendResult<ApiEnvelope<Value>> {
        let _ = (resource, body);
        Err(BackendError::Unsupported { operation: "create" })
    }

    /// Update one row; default implementation reports lack of support.
    async fn update(
        &self,
        resource: &Resource,
        id: &RecordId,
        body: &Value,
    ) -> BackendResult<ApiEnvelope<Value>> {
        let _ = (resource, id, body);
        Err(BackendError::Unsupported { operation: "update" })
    }

    /// Fetch an arbitrary envelope, e.g. chat history; default reports lack of support.
    async fn fetch(&self, path: &str) -> BackendResult<ApiEnvelope<Value>> {
        let _ = path;
        Err(BackendError::Unsupported { operation: "fetch" })
    }
}

/// Export/import endpoints.
#[async_trait]
pub trait TransferBackend: Send + Sync {
    /// Download `endpoint?format=<format>`.
    async fn export(&self, endpoint: &str, format: ExportFormat) -> BackendResult<ExportPayload>;

    /// Upload `file` to `endpoint` as multipart field `file`.
    async fn import(&self, endpoint: &str, file: ImportFile) -> BackendResult<ApiEnvelope<Value>>;
}
