//! `config show`: print the resolved global settings with secrets masked.

use std::path::PathBuf;

use fleetdesk_telemetry::build_sha;
use serde::Serialize;

use crate::cli::{Cli, OutputFormat};
use crate::client::CliResult;
use crate::output::print_json;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct ConfigView {
    pub(crate) api_url: String,
    pub(crate) token: Option<String>,
    pub(crate) token_file: Option<PathBuf>,
    pub(crate) timeout_secs: u64,
    pub(crate) log_format: Option<String>,
    pub(crate) maps_api_key: Option<String>,
    pub(crate) telemetry_endpoint: Option<String>,
    pub(crate) build: String,
}

impl ConfigView {
    pub(crate) fn from_cli(cli: &Cli) -> Self {
        Self {
            api_url: cli.api_url.to_string(),
            token: cli.token.as_deref().map(mask),
            token_file: cli.token_file.clone(),
            timeout_secs: cli.timeout,
            log_format: cli.log_format.map(|format| format.to_string()),
            maps_api_key: cli.maps_api_key.as_deref().map(mask),
            telemetry_endpoint: cli.telemetry_endpoint.as_ref().map(ToString::to_string),
            build: build_sha().to_string(),
        }
    }
}

/// Keep the last four characters of a secret.
pub(crate) fn mask(secret: &str) -> String {
    let chars: Vec<char> = secret.trim().chars().collect();
    if chars.len() <= 4 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{tail}")
}

pub(crate) fn handle_config_show(view: &ConfigView, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(view),
        OutputFormat::Table => {
            let unset = "<unset>";
            println!("api url: {}", view.api_url);
            println!("token: {}", view.token.as_deref().unwrap_or(unset));
            println!(
                "token file: {}",
                view.token_file
                    .as_ref()
                    .map_or_else(|| unset.to_string(), |path| path.display().to_string())
            );
            println!("timeout: {}s", view.timeout_secs);
            println!("log format: {}", view.log_format.as_deref().unwrap_or("auto"));
            println!("maps api key: {}", view.maps_api_key.as_deref().unwrap_or(unset));
            println!(
                "telemetry endpoint: {}",
                view.telemetry_endpoint.as_deref().unwrap_or(unset)
            );
            println!("build: {}", view.build);
            Ok(())
        }
    }
}
