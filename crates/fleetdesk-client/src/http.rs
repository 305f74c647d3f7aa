//! reqwest implementation of [`AdminBackend`] and [`TransferBackend`].
//!
//! # Design
//! - The base URL always ends in `/` so relative endpoint paths join under it.
//! - Resource routes are appended segment by segment, so record ids are
//!   percent-encoded and can never leave their collection.
//! - `Authorization` is attached per request from the injected [`AuthContext`].
//! - Non-2xx answers and `success: false` envelopes both become errors that
//!   carry the backend's message when it sent one.

use std::time::Duration;

use async_trait::async_trait;
use fleetdesk_api_models::{
    AccountStatus, ApiEnvelope, BulkDeleteRequest, BulkStatusRequest, ErrorBody, ExportFormat,
    RecordId,
};
use fleetdesk_core::backend::{AdminBackend, ExportPayload, ImportFile, TransferBackend};
use fleetdesk_core::{BackendError, BackendResult, Resource, Route, RouteMethod};
use reqwest::header::{AUTHORIZATION, CONTENT_DISPOSITION, HeaderMap, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::auth::AuthContext;
use crate::error::{ClientError, ClientResult};

/// Trace header attached to every request.
pub const HEADER_REQUEST_ID: &str = "x-request-id";

/// Request timeout applied when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Transport options for [`HttpBackend::new`].
#[derive(Clone, Debug)]
pub struct HttpOptions {
    /// Per-request timeout.
    pub timeout: Duration,
    /// Value for the `x-request-id` header.
    pub request_id: Option<String>,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            request_id: None,
        }
    }
}

/// Backend adapter speaking the admin REST API.
#[derive(Clone, Debug)]
pub struct HttpBackend {
    client: Client,
    base: Url,
    auth: AuthContext,
}

impl HttpBackend {
    /// Build a backend rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the URL, the request id, or the client
    /// configuration is invalid.
    pub fn new(base_url: &str, auth: AuthContext, options: HttpOptions) -> ClientResult<Self> {
        let base = normalize_base(base_url)?;
        let mut headers = HeaderMap::new();
        if let Some(request_id) = options.request_id.as_deref() {
            let value = HeaderValue::from_str(request_id).map_err(|_| ClientError::InvalidHeader {
                name: HEADER_REQUEST_ID,
            })?;
            headers.insert(HEADER_REQUEST_ID, value);
        }
        let client = Client::builder()
            .timeout(options.timeout)
            .default_headers(headers)
            .build()
            .map_err(|source| ClientError::Build { source })?;
        Ok(Self::with_client(client, base, auth))
    }

    /// Wrap an existing client; `base` must already end in `/`.
    #[must_use]
    pub const fn with_client(client: Client, base: Url, auth: AuthContext) -> Self {
        Self { client, base, auth }
    }

    /// API root every path is joined onto.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base
    }

    fn url(&self, operation: &'static str, path: &str) -> BackendResult<Url> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|err| BackendError::Transport {
                operation,
                detail: format!("invalid path '{path}': {err}"),
            })
    }

    fn route_url(&self, operation: &'static str, route: &Route) -> BackendResult<Url> {
        if let Some(segment) = route
            .segments()
            .iter()
            .find(|segment| matches!(segment.as_str(), "" | "." | ".."))
        {
            return Err(BackendError::Transport {
                operation,
                detail: format!("invalid path segment '{segment}'"),
            });
        }
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| BackendError::Transport {
                operation,
                detail: "base URL cannot carry a path".to_string(),
            })?
            .pop_if_empty()
            .extend(route.segments());
        Ok(url)
    }

    fn authorized(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match self.auth.header_value() {
            Some(value) => builder.header(AUTHORIZATION, value),
            None => builder,
        }
    }

    fn request(&self, operation: &'static str, method: Method, path: &str) -> BackendResult<RequestBuilder> {
        Ok(self.authorized(method, self.url(operation, path)?))
    }

    fn route(&self, operation: &'static str, route: &Route) -> BackendResult<RequestBuilder> {
        let method = match route.method {
            RouteMethod::Get => Method::GET,
            RouteMethod::Post => Method::POST,
            RouteMethod::Put => Method::PUT,
            RouteMethod::Delete => Method::DELETE,
        };
        Ok(self.authorized(method, self.route_url(operation, route)?))
    }

    async fn send_json<B: Serialize + Sync + ?Sized>(
        &self,
        operation: &'static str,
        route: &Route,
        body: &B,
    ) -> BackendResult<ApiEnvelope<Value>> {
        let builder = self.route(operation, route)?.json(body);
        envelope(operation, send(operation, builder).await?).await
    }
}

#[async_trait]
impl AdminBackend for HttpBackend {
    async fn list(&self, resource: &Resource) -> BackendResult<Vec<Value>> {
        const OPERATION: &str = "list";
        let response = send(OPERATION, self.route(OPERATION, &resource.list_route())?).await?;
        let body: Value = decode(OPERATION, response).await?;
        let rows = match body {
            Value::Array(rows) => rows,
            other => {
                let envelope = checked(OPERATION, parse_envelope(OPERATION, other)?)?;
                match envelope.data {
                    Some(Value::Array(rows)) => rows,
                    None | Some(Value::Null) => Vec::new(),
                    Some(_) => {
                        return Err(BackendError::Decode {
                            operation: OPERATION,
                            detail: "list payload is not an array".to_string(),
                        });
                    }
                }
            }
        };
        tracing::debug!(resource = resource.name(), rows = rows.len(), "list fetched");
        Ok(rows)
    }

    async fn bulk_delete(
        &self,
        resource: &Resource,
        ids: &[RecordId],
    ) -> BackendResult<ApiEnvelope<Value>> {
        let body = BulkDeleteRequest { ids: ids.to_vec() };
        self.send_json("bulk_delete", &resource.bulk_delete_route(), &body)
            .await
    }

    async fn bulk_update_status(
        &self,
        ids: &[RecordId],
        status: AccountStatus,
    ) -> BackendResult<ApiEnvelope<Value>> {
        let body = BulkStatusRequest {
            ids: ids.to_vec(),
            status: status.as_str().to_string(),
        };
        self.send_json("bulk_update_status", &Resource::bulk_status_route(), &body)
            .await
    }

    async fn delete(&self, resource: &Resource, id: &RecordId) -> BackendResult<ApiEnvelope<Value>> {
        const OPERATION: &str = "delete";
        let builder = self.route(OPERATION, &resource.delete_route(id))?;
        envelope(OPERATION, send(OPERATION, builder).await?).await
    }

    async fn create(&self, resource: &Resource, body: &Value) -> BackendResult<ApiEnvelope<Value>> {
        self.send_json("create", &resource.create_route(), body).await
    }

    async fn update(
        &self,
        resource: &Resource,
        id: &RecordId,
        body: &Value,
    ) -> BackendResult<ApiEnvelope<Value>> {
        self.send_json("update", &resource.update_route(id), body)
            .await
    }

    async fn fetch(&self, path: &str) -> BackendResult<ApiEnvelope<Value>> {
        const OPERATION: &str = "fetch";
        let builder = self.request(OPERATION, Method::GET, path)?;
        envelope(OPERATION, send(OPERATION, builder).await?).await
    }
}

#[async_trait]
impl TransferBackend for HttpBackend {
    async fn export(&self, endpoint: &str, format: ExportFormat) -> BackendResult<ExportPayload> {
        const OPERATION: &str = "export";
        let builder = self
            .request(OPERATION, Method::GET, endpoint)?
            .query(&[("format", format.as_query())]);
        let response = send(OPERATION, builder).await?;
        let content_disposition = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let bytes = response
            .bytes()
            .await
            .map_err(|err| BackendError::Transport {
                operation: OPERATION,
                detail: err.to_string(),
            })?;
        tracing::debug!(endpoint, bytes = bytes.len(), "export downloaded");
        Ok(ExportPayload {
            bytes: bytes.to_vec(),
            content_disposition,
        })
    }

    async fn import(&self, endpoint: &str, file: ImportFile) -> BackendResult<ApiEnvelope<Value>> {
        const OPERATION: &str = "import";
        let size = file.bytes.len();
        let part = Part::bytes(file.bytes).file_name(file.file_name);
        let form = Form::new().part("file", part);
        let builder = self
            .request(OPERATION, Method::POST, endpoint)?
            .multipart(form);
        tracing::debug!(endpoint, bytes = size, "uploading import");
        envelope(OPERATION, send(OPERATION, builder).await?).await
    }
}

fn normalize_base(input: &str) -> ClientResult<Url> {
    let mut base = Url::parse(input.trim()).map_err(|err| ClientError::InvalidBaseUrl {
        url: input.to_string(),
        detail: err.to_string(),
    })?;
    if base.cannot_be_a_base() {
        return Err(ClientError::InvalidBaseUrl {
            url: input.to_string(),
            detail: "URL cannot be used as a base".to_string(),
        });
    }
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base)
}

/// Send and map transport failures and non-2xx answers.
async fn send(operation: &'static str, builder: RequestBuilder) -> BackendResult<Response> {
    let response = builder
        .send()
        .await
        .map_err(|err| BackendError::Transport {
            operation,
            detail: err.to_string(),
        })?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let bytes = response.bytes().await.unwrap_or_default();
    let message = serde_json::from_slice::<ErrorBody>(&bytes)
        .ok()
        .and_then(|body| body.message);
    tracing::warn!(operation, status = status.as_u16(), "backend rejected request");
    Err(BackendError::Rejected {
        operation,
        status: status.as_u16(),
        message,
    })
}

async fn decode(operation: &'static str, response: Response) -> BackendResult<Value> {
    let bytes = response
        .bytes()
        .await
        .map_err(|err| BackendError::Transport {
            operation,
            detail: err.to_string(),
        })?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(&bytes).map_err(|err| BackendError::Decode {
        operation,
        detail: err.to_string(),
    })
}

fn parse_envelope(operation: &'static str, body: Value) -> BackendResult<ApiEnvelope<Value>> {
    if body.is_null() {
        return Ok(ApiEnvelope {
            success: true,
            data: None,
            message: None,
        });
    }
    serde_json::from_value(body).map_err(|err| BackendError::Decode {
        operation,
        detail: err.to_string(),
    })
}

fn checked(
    operation: &'static str,
    envelope: ApiEnvelope<Value>,
) -> BackendResult<ApiEnvelope<Value>> {
    if envelope.success {
        Ok(envelope)
    } else {
        Err(BackendError::Unsuccessful {
            operation,
            message: envelope.message,
        })
    }
}

async fn envelope(
    operation: &'static str,
    response: Response,
) -> BackendResult<ApiEnvelope<Value>> {
    let body = decode(operation, response).await?;
    checked(operation, parse_envelope(operation, body)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_gains_trailing_slash() -> ClientResult<()> {
        assert_eq!(
            normalize_base("http://localhost:8000/api")?.as_str(),
            "http://localhost:8000/api/"
        );
        assert_eq!(
            normalize_base("http://localhost:8000")?.as_str(),
            "http://localhost:8000/"
        );
        assert!(matches!(
            normalize_base("not a url"),
            Err(ClientError::InvalidBaseUrl { .. })
        ));
        Ok(())
    }

    #[test]
    fn unsuccessful_envelope_is_an_error() {
        let envelope = ApiEnvelope::<Value> {
            success: false,
            data: None,
            message: Some("zone in use".into()),
        };
        let err = checked("delete", envelope).expect_err("should fail");
        assert_eq!(err.user_message(), Some("zone in use"));
    }

    #[test]
    fn paths_join_under_the_api_prefix() -> anyhow::Result<()> {
        let backend = HttpBackend::new(
            "http://localhost:8000/api",
            AuthContext::anonymous(),
            HttpOptions::default(),
        )?;
        let url = backend.url("list", "/zones/zones-list")?;
        assert_eq!(url.as_str(), "http://localhost:8000/api/zones/zones-list");
        Ok(())
    }

    #[test]
    fn record_ids_are_encoded_as_one_segment() -> anyhow::Result<()> {
        let backend = HttpBackend::new(
            "http://localhost:8000/api",
            AuthContext::anonymous(),
            HttpOptions::default(),
        )?;
        let drivers = Resource::rest("drivers");
        let url = backend.route_url("delete", &drivers.delete_route(&RecordId::from("../users/1")))?;
        assert_eq!(url.as_str(), "http://localhost:8000/api/drivers/..%2Fusers%2F1");
        let url = backend.route_url("delete", &drivers.delete_route(&RecordId::from("a?b#c")))?;
        assert_eq!(url.as_str(), "http://localhost:8000/api/drivers/a%3Fb%23c");
        assert!(matches!(
            backend.route_url("delete", &drivers.delete_route(&RecordId::from(".."))),
            Err(BackendError::Transport { .. })
        ));
        Ok(())
    }
}
