#![forbid(unsafe_code)]
#![warn(
    unused,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    rustdoc::broken_intra_doc_links,
    missing_docs
)]
//! Shared HTTP DTOs for the fleetdesk admin backend.
//!
//! Every endpoint answers with the same `{success, data, message}` envelope, and
//! bulk endpoints accept plain id lists. The client and the core both encode
//! against these types so the wire contract lives in one place.

use std::convert::Infallible;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Opaque row identifier owned by the backend (JSON number or string).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    /// Integer primary key.
    Int(i64),
    /// String key (UUIDs, slugs, Mongo object ids).
    Text(String),
}

impl Display for RecordId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(value) => write!(formatter, "{value}"),
            Self::Text(value) => formatter.write_str(value),
        }
    }
}

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl FromStr for RecordId {
    type Err = Infallible;

    /// Integers become [`RecordId::Int`]; anything else is kept verbatim.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        Ok(trimmed
            .parse::<i64>()
            .map_or_else(|_| Self::Text(trimmed.to_string()), Self::Int))
    }
}

/// Response envelope shared by every backend endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    /// Whether the backend considers the call successful. Only an explicit
    /// `false` marks a failure.
    #[serde(default = "default_success")]
    pub success: bool,
    /// Payload, absent on most mutations and on failures.
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    /// Human-readable outcome supplied by the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

const fn default_success() -> bool {
    true
}

impl<T> ApiEnvelope<T> {
    /// Successful envelope wrapping `data`.
    #[must_use]
    pub const fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    /// Message, ignoring blank strings.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }
}

/// Error body returned alongside non-2xx responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Backend-provided failure reason.
    #[serde(default)]
    pub message: Option<String>,
}

/// Body for `POST /bulk-operations/<resource>/delete`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkDeleteRequest {
    /// Rows to delete.
    pub ids: Vec<RecordId>,
}

/// Body for `POST /bulk-operations/users/update-status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkStatusRequest {
    /// Rows to update.
    pub ids: Vec<RecordId>,
    /// Target status value.
    pub status: String,
}

/// Account status values accepted by the bulk status endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    /// Account may use the platform.
    Active,
    /// Account is suspended.
    Inactive,
}

impl AccountStatus {
    /// Wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

/// Export formats negotiated through the `format` query parameter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Spreadsheet (`xlsx`).
    #[default]
    Excel,
    /// Portable document.
    Pdf,
    /// Comma-separated values.
    Csv,
}

impl ExportFormat {
    /// Value sent as `?format=`.
    #[must_use]
    pub const fn as_query(self) -> &'static str {
        match self {
            Self::Excel => "excel",
            Self::Pdf => "pdf",
            Self::Csv => "csv",
        }
    }

    /// File extension used when the backend does not name the download.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Excel => "xlsx",
            Self::Pdf => "pdf",
            Self::Csv => "csv",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.trim().to_ascii_lowercase().as_str() {
            "excel" | "xlsx" => Ok(Self::Excel),
            "pdf" => Ok(Self::Pdf),
            "csv" => Ok(Self::Csv),
            other => Err(format!("unsupported export format '{other}'")),
        }
    }
}

/// Path convention a resource follows on the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteStyle {
    /// `GET drivers`, `PUT drivers/<id>`, `DELETE drivers/<id>`.
    #[default]
    Rest,
    /// `GET zones/zones-list`, `POST zones/zones-update/<id>`, ...
    Suffixed,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn record_ids_accept_numbers_and_strings() {
        let ids: Vec<RecordId> =
            serde_json::from_value(json!([7, "64f0c2"])).expect("ids decode");
        assert_eq!(ids, vec![RecordId::Int(7), RecordId::Text("64f0c2".into())]);
        assert_eq!(json!(ids), json!([7, "64f0c2"]));
    }

    #[test]
    fn record_id_parses_from_cli_text() {
        assert_eq!("42".parse::<RecordId>(), Ok(RecordId::Int(42)));
        assert_eq!(
            " drv-9 ".parse::<RecordId>(),
            Ok(RecordId::Text("drv-9".into()))
        );
    }

    #[test]
    fn envelope_tolerates_missing_fields() {
        let envelope: ApiEnvelope<Vec<u8>> =
            serde_json::from_value(json!({"message": "  "})).expect("envelope decodes");
        assert!(envelope.success);
        assert!(envelope.data.is_none());
        assert_eq!(envelope.message(), None);

        let failed: ApiEnvelope<Vec<u8>> =
            serde_json::from_value(json!({"success": false})).expect("envelope decodes");
        assert!(!failed.success);
    }

    #[test]
    fn bulk_status_body_matches_contract() {
        let body = BulkStatusRequest {
            ids: vec![RecordId::Int(1)],
            status: AccountStatus::Inactive.as_str().to_string(),
        };
        assert_eq!(json!(body), json!({"ids": [1], "status": "inactive"}));
    }

    #[test]
    fn export_format_maps_query_and_extension() {
        assert_eq!("CSV".parse::<ExportFormat>(), Ok(ExportFormat::Csv));
        assert_eq!(ExportFormat::default().extension(), "xlsx");
        assert_eq!(ExportFormat::Pdf.as_query(), "pdf");
        assert!("docx".parse::<ExportFormat>().is_err());
    }
}
