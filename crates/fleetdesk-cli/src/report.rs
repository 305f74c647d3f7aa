//! Outcome reports posted to an optional collector after each command.

use std::time::Duration;

use chrono::Utc;
use reqwest::{Client, Response};
use serde::Serialize;
use url::Url;

use crate::client::{CliError, CliResult};

const REPORT_TIMEOUT: Duration = Duration::from_secs(2);

/// How a command ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum Outcome {
    Success,
    Rejected,
    Failed,
}

impl Outcome {
    pub(crate) fn of(result: &CliResult<()>) -> Self {
        match result {
            Ok(()) => Self::Success,
            Err(CliError::Validation(_)) => Self::Rejected,
            Err(CliError::Failure(_)) => Self::Failed,
        }
    }
}

/// Body posted to the collector.
#[derive(Debug, Serialize)]
pub(crate) struct CommandReport<'a> {
    pub(crate) command: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) resource: Option<&'a str>,
    pub(crate) outcome: Outcome,
    pub(crate) exit_code: i32,
    pub(crate) trace_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) message: Option<&'a str>,
    pub(crate) build: &'a str,
    pub(crate) timestamp_ms: i64,
}

impl<'a> CommandReport<'a> {
    pub(crate) fn new(
        command: &'static str,
        resource: Option<&'a str>,
        trace_id: &'a str,
        result: &CliResult<()>,
        message: Option<&'a str>,
    ) -> Self {
        Self {
            command,
            resource,
            outcome: Outcome::of(result),
            exit_code: result.as_ref().map_or_else(CliError::exit_code, |_| 0),
            trace_id,
            message,
            build: fleetdesk_telemetry::build_sha(),
            timestamp_ms: Utc::now().timestamp_millis(),
        }
    }
}

/// Delivers [`CommandReport`]s; delivery failures are only logged.
#[derive(Clone, Debug)]
pub(crate) struct OutcomeReporter {
    client: Client,
    endpoint: Url,
}

impl OutcomeReporter {
    pub(crate) fn new(endpoint: Url) -> Option<Self> {
        match Client::builder().timeout(REPORT_TIMEOUT).build() {
            Ok(client) => Some(Self { client, endpoint }),
            Err(err) => {
                tracing::debug!(error = %err, "outcome reporting disabled");
                None
            }
        }
    }

    pub(crate) async fn send(&self, report: &CommandReport<'_>) {
        let delivered = self
            .client
            .post(self.endpoint.clone())
            .json(report)
            .send()
            .await
            .and_then(Response::error_for_status);
        if let Err(err) = delivered {
            tracing::debug!(error = %err, endpoint = %self.endpoint, "outcome report not delivered");
        }
    }
}
