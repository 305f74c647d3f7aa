//! `chat`: follow a support conversation by polling its history.

use std::time::Duration;

use fleetdesk_core::backend::AdminBackend;
use fleetdesk_core::{BackendError, FilterRow, Poller};
use serde_json::Value;
use tokio::sync::mpsc;

use crate::cli::{ChatArgs, OutputFormat};
use crate::client::{AppContext, CliError, CliResult};
use crate::output::print_json;

const SENDER_FIELDS: [&str; 4] = ["sender_name", "sender.name", "sender", "from"];
const TEXT_FIELDS: [&str; 3] = ["message", "text", "content"];
const TIME_FIELDS: [&str; 2] = ["created_at", "createdAt"];

pub(crate) async fn handle_chat(ctx: &AppContext, args: ChatArgs) -> CliResult<()> {
    if args.interval_ms == 0 {
        return Err(CliError::validation("--interval-ms must be greater than zero"));
    }
    if args.path.trim().is_empty() {
        return Err(CliError::validation("conversation path must not be empty"));
    }

    let (tx, mut rx) = mpsc::channel::<Result<Vec<Value>, BackendError>>(4);
    let backend = ctx.backend.clone();
    let path = args.path.clone();
    let poller = Poller::start(Duration::from_millis(args.interval_ms), move || {
        let backend = backend.clone();
        let path = path.clone();
        let tx = tx.clone();
        async move {
            let result = backend
                .fetch(&path)
                .await
                .map(|envelope| history_of(envelope.data));
            if tx.send(result).await.is_err() {
                tracing::debug!("chat receiver closed");
            }
        }
    });

    let mut cursor = HistoryCursor::default();
    let mut polls: u32 = 0;
    let outcome = loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break Ok(()),
            received = rx.recv() => {
                let Some(result) = received else {
                    break Ok(());
                };
                polls = polls.saturating_add(1);
                match result {
                    Ok(history) => {
                        if let Err(err) = print_messages(cursor.take_new(&history), ctx.output) {
                            break Err(err);
                        }
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, path = %args.path, "chat refresh failed");
                    }
                }
                if args.max_polls.is_some_and(|max| polls >= max) {
                    break Ok(());
                }
            }
        }
    };
    poller.cancel().await;
    tracing::debug!(polls, "chat poller cancelled");
    outcome
}

/// Accepts a bare message array or an object carrying `messages`.
fn history_of(data: Option<Value>) -> Vec<Value> {
    match data {
        Some(Value::Array(items)) => items,
        Some(Value::Object(mut map)) => match map.remove("messages") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

/// Remembers how much of the history was already printed.
#[derive(Debug, Default)]
struct HistoryCursor {
    seen: usize,
}

impl HistoryCursor {
    fn take_new<'a>(&mut self, history: &'a [Value]) -> &'a [Value] {
        if history.len() < self.seen {
            self.seen = 0;
        }
        let fresh = &history[self.seen..];
        self.seen = history.len();
        fresh
    }
}

fn print_messages(messages: &[Value], format: OutputFormat) -> CliResult<()> {
    for message in messages {
        match format {
            OutputFormat::Json => print_json(message)?,
            OutputFormat::Table => println!("{}", format_message(message)),
        }
    }
    Ok(())
}

fn first_field(message: &Value, fields: &[&str]) -> Option<String> {
    fields
        .iter()
        .find_map(|field| message.field_text(field))
        .map(std::borrow::Cow::into_owned)
}

fn format_message(message: &Value) -> String {
    let sender = first_field(message, &SENDER_FIELDS).unwrap_or_else(|| "unknown".to_string());
    let text = first_field(message, &TEXT_FIELDS).unwrap_or_default();
    match first_field(message, &TIME_FIELDS) {
        Some(time) => format!("[{time}] {sender}: {text}"),
        None => format!("{sender}: {text}"),
    }
}
