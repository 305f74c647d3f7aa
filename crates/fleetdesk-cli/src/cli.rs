//! Argument parsing, dependency wiring, and command dispatch.

use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use fleetdesk_client::{HttpBackend, HttpOptions};
use fleetdesk_core::{BulkAction, ExportFormat, Messages, RecordId, Resource, RouteStyle};
use fleetdesk_telemetry::{LogFormat, LoggingConfig, command_span, init_logging};
use tracing::Instrument;
use url::Url;
use uuid::Uuid;

use crate::client::{AppContext, CliError, CliResult, ConfirmPolicy, parse_url, resolve_auth};
use crate::commands::bulk::handle_bulk;
use crate::commands::chat::handle_chat;
use crate::commands::config::{ConfigView, handle_config_show};
use crate::commands::resources::{handle_create, handle_delete, handle_list, handle_update};
use crate::commands::transfer::{handle_export, handle_import};
use crate::output::ConsoleNotifier;
use crate::report::{CommandReport, OutcomeReporter};

pub(crate) const DEFAULT_API_URL: &str = "http://127.0.0.1:8000/api/";
pub(crate) const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Parses CLI arguments, executes the requested command, and posts an
/// outcome report when a collector is configured. Returns the process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();
    let log_format = cli.log_format.unwrap_or_else(LogFormat::infer);
    if let Err(err) = init_logging(&LoggingConfig {
        format: log_format,
        ..LoggingConfig::default()
    }) {
        eprintln!("warning: {err:#}");
    }

    let command_name = command_label(&cli.command);
    let resource = command_resource(&cli.command).map(str::to_string);
    let trace_id = Uuid::new_v4().to_string();
    let reporter = cli.telemetry_endpoint.clone().and_then(OutcomeReporter::new);

    let span = command_span(command_name, &trace_id);
    let result = execute(cli, &trace_id).instrument(span).await;

    let message = result.as_ref().err().map(ToString::to_string);
    if let Some(message) = &message {
        eprintln!("error: {message}");
    }
    let report = CommandReport::new(
        command_name,
        resource.as_deref(),
        &trace_id,
        &result,
        message.as_deref(),
    );
    if let Some(reporter) = &reporter {
        reporter.send(&report).await;
    }

    report.exit_code
}

async fn execute(cli: Cli, trace_id: &str) -> CliResult<()> {
    let ctx = build_context(&cli, trace_id)?;
    dispatch(cli, &ctx).await
}

fn build_context(cli: &Cli, trace_id: &str) -> CliResult<AppContext> {
    let auth = resolve_auth(cli.token.as_deref(), cli.token_file.as_deref())?;
    let backend = HttpBackend::new(
        cli.api_url.as_str(),
        auth,
        HttpOptions {
            timeout: Duration::from_secs(cli.timeout),
            request_id: Some(trace_id.to_string()),
        },
    )
    .map_err(CliError::failure)?;

    let policy = if cli.yes {
        ConfirmPolicy::AssumeYes
    } else if io::stdin().is_terminal() {
        ConfirmPolicy::Interactive
    } else {
        ConfirmPolicy::NonInteractive
    };

    Ok(AppContext {
        backend: Arc::new(backend),
        notifier: Arc::new(ConsoleNotifier),
        messages: Messages::default(),
        confirm: policy,
        output: cli.output,
    })
}

pub(crate) async fn dispatch(cli: Cli, ctx: &AppContext) -> CliResult<()> {
    let config = ConfigView::from_cli(&cli);
    match cli.command {
        Command::Ls(args) => handle_list(ctx, args).await,
        Command::Create(args) => handle_create(ctx, args).await,
        Command::Update(args) => handle_update(ctx, args).await,
        Command::Delete(args) => handle_delete(ctx, args).await,
        Command::Bulk(args) => handle_bulk(ctx, args).await,
        Command::Export(args) => handle_export(ctx, args).await,
        Command::Import(args) => handle_import(ctx, args).await,
        Command::Chat(args) => handle_chat(ctx, args).await,
        Command::Config(ConfigCommand::Show) => handle_config_show(&config, ctx.output),
    }
}

#[derive(Parser)]
#[command(name = "fleetdesk", about = "Administrative console for the fleetdesk platform")]
pub(crate) struct Cli {
    #[arg(
        long,
        global = true,
        env = "FLEETDESK_API_URL",
        value_parser = parse_url,
        default_value = DEFAULT_API_URL
    )]
    pub(crate) api_url: Url,
    #[arg(long, global = true, env = "FLEETDESK_TOKEN", hide_env_values = true)]
    pub(crate) token: Option<String>,
    #[arg(long, global = true, env = "FLEETDESK_TOKEN_FILE")]
    pub(crate) token_file: Option<PathBuf>,
    #[arg(
        long,
        global = true,
        env = "FLEETDESK_HTTP_TIMEOUT_SECS",
        default_value_t = DEFAULT_TIMEOUT_SECS
    )]
    pub(crate) timeout: u64,
    #[arg(
        long = "output",
        global = true,
        value_enum,
        default_value_t = OutputFormat::Table,
        help = "Select output format for commands that render structured data"
    )]
    pub(crate) output: OutputFormat,
    #[arg(long, global = true, env = "FLEETDESK_LOG_FORMAT")]
    pub(crate) log_format: Option<LogFormat>,
    #[arg(long, global = true, env = "FLEETDESK_MAPS_API_KEY", hide_env_values = true)]
    pub(crate) maps_api_key: Option<String>,
    #[arg(
        long,
        global = true,
        env = "FLEETDESK_TELEMETRY_ENDPOINT",
        value_parser = parse_url,
        help = "Collector that receives one outcome report per command"
    )]
    pub(crate) telemetry_endpoint: Option<Url>,
    #[arg(
        long,
        short = 'y',
        global = true,
        help = "Answer yes to confirmation prompts"
    )]
    pub(crate) yes: bool,
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// List a resource, filtered on the client side.
    Ls(ListArgs),
    /// Create a row from a JSON document.
    Create(WriteArgs),
    /// Update a row from a JSON document.
    Update(UpdateArgs),
    /// Delete one row after confirmation.
    Delete(DeleteArgs),
    /// Apply a bulk action to selected rows.
    Bulk(BulkArgs),
    /// Download an export file.
    Export(ExportArgs),
    /// Upload an import file.
    Import(ImportArgs),
    /// Follow a support conversation.
    Chat(ChatArgs),
    /// Inspect the effective configuration.
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand)]
pub(crate) enum ConfigCommand {
    /// Print the resolved global settings.
    Show,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum StyleArg {
    #[default]
    Rest,
    Suffixed,
}

impl From<StyleArg> for RouteStyle {
    fn from(value: StyleArg) -> Self {
        match value {
            StyleArg::Rest => Self::Rest,
            StyleArg::Suffixed => Self::Suffixed,
        }
    }
}

#[derive(Args, Clone, Debug)]
pub(crate) struct ResourceArgs {
    #[arg(help = "Resource path, e.g. drivers or zones")]
    pub(crate) resource: String,
    #[arg(long, value_enum, default_value_t = StyleArg::Rest)]
    pub(crate) style: StyleArg,
    #[arg(long, help = "Collection name used by bulk-operations routes")]
    pub(crate) bulk_name: Option<String>,
}

impl ResourceArgs {
    pub(crate) fn resource(&self) -> Resource {
        let resource = Resource::new(self.resource.as_str(), self.style.into());
        match &self.bulk_name {
            Some(name) => resource.with_bulk_name(name.as_str()),
            None => resource,
        }
    }
}

#[derive(Args, Clone, Debug)]
pub(crate) struct FilterArgs {
    #[arg(long, default_value = "", help = "Case-insensitive search term")]
    pub(crate) search: String,
    #[arg(long, default_value = "all", help = "Exact status value or 'all'")]
    pub(crate) status: String,
    #[arg(
        long,
        value_delimiter = ',',
        default_value = "name,email,phone",
        help = "Fields searched and shown"
    )]
    pub(crate) fields: Vec<String>,
    #[arg(long, default_value = "status")]
    pub(crate) status_field: String,
}

#[derive(Args, Clone, Debug)]
pub(crate) struct ListArgs {
    #[command(flatten)]
    pub(crate) target: ResourceArgs,
    #[command(flatten)]
    pub(crate) filter: FilterArgs,
}

#[derive(Args, Clone, Debug)]
pub(crate) struct WriteArgs {
    #[command(flatten)]
    pub(crate) target: ResourceArgs,
    #[arg(long, conflicts_with = "file", help = "Inline JSON body")]
    pub(crate) data: Option<String>,
    #[arg(long, short = 'f', help = "Path to a JSON body")]
    pub(crate) file: Option<PathBuf>,
}

#[derive(Args, Clone, Debug)]
pub(crate) struct UpdateArgs {
    #[command(flatten)]
    pub(crate) body: WriteArgs,
    #[arg(long, help = "Row identifier")]
    pub(crate) id: RecordId,
}

#[derive(Args, Clone, Debug)]
pub(crate) struct DeleteArgs {
    #[command(flatten)]
    pub(crate) target: ResourceArgs,
    #[arg(long, help = "Row identifier")]
    pub(crate) id: RecordId,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum BulkActionArg {
    Delete,
    Activate,
    Deactivate,
}

impl From<BulkActionArg> for BulkAction {
    fn from(value: BulkActionArg) -> Self {
        match value {
            BulkActionArg::Delete => Self::Delete,
            BulkActionArg::Activate => Self::Activate,
            BulkActionArg::Deactivate => Self::Deactivate,
        }
    }
}

#[derive(Args, Clone, Debug)]
pub(crate) struct BulkArgs {
    #[arg(value_enum)]
    pub(crate) action: BulkActionArg,
    #[command(flatten)]
    pub(crate) target: ResourceArgs,
    #[command(flatten)]
    pub(crate) filter: FilterArgs,
    #[arg(long, value_delimiter = ',', help = "Rows to select")]
    pub(crate) ids: Vec<RecordId>,
    #[arg(long, conflicts_with = "ids", help = "Select every visible row")]
    pub(crate) all: bool,
}

#[derive(Args, Clone, Debug)]
pub(crate) struct ExportArgs {
    #[arg(help = "Export endpoint, e.g. drivers/export")]
    pub(crate) endpoint: String,
    #[arg(long, default_value = "excel", value_parser = parse_export_format)]
    pub(crate) format: ExportFormat,
    #[arg(long, default_value = ".")]
    pub(crate) out_dir: PathBuf,
}

#[derive(Args, Clone, Debug)]
pub(crate) struct ImportArgs {
    #[arg(help = "Import endpoint, e.g. drivers/import")]
    pub(crate) endpoint: String,
    #[arg(help = "File to upload")]
    pub(crate) file: PathBuf,
    #[arg(long, default_value = ".xlsx,.xls,.csv")]
    pub(crate) accept: String,
}

#[derive(Args, Clone, Debug)]
pub(crate) struct ChatArgs {
    #[arg(help = "Conversation history path, e.g. support/chats/42/messages")]
    pub(crate) path: String,
    #[arg(long, default_value_t = 5_000)]
    pub(crate) interval_ms: u64,
    #[arg(long, help = "Stop after this many polls")]
    pub(crate) max_polls: Option<u32>,
}

fn parse_export_format(input: &str) -> Result<ExportFormat, String> {
    input.parse()
}

pub(crate) const fn command_label(command: &Command) -> &'static str {
    match command {
        Command::Ls(_) => "ls",
        Command::Create(_) => "create",
        Command::Update(_) => "update",
        Command::Delete(_) => "delete",
        Command::Bulk(args) => match args.action {
            BulkActionArg::Delete => "bulk_delete",
            BulkActionArg::Activate => "bulk_activate",
            BulkActionArg::Deactivate => "bulk_deactivate",
        },
        Command::Export(_) => "export",
        Command::Import(_) => "import",
        Command::Chat(_) => "chat",
        Command::Config(ConfigCommand::Show) => "config_show",
    }
}

/// Resource or endpoint a command acts on, for outcome reports.
pub(crate) fn command_resource(command: &Command) -> Option<&str> {
    match command {
        Command::Ls(ListArgs { target, .. })
        | Command::Create(WriteArgs { target, .. })
        | Command::Update(UpdateArgs {
            body: WriteArgs { target, .. },
            ..
        })
        | Command::Delete(DeleteArgs { target, .. })
        | Command::Bulk(BulkArgs { target, .. }) => Some(target.resource.as_str()),
        Command::Export(ExportArgs { endpoint, .. })
        | Command::Import(ImportArgs { endpoint, .. }) => Some(endpoint.as_str()),
        Command::Chat(ChatArgs { path, .. }) => Some(path.as_str()),
        Command::Config(_) => None,
    }
}
