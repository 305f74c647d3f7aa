//! Output renderers and the console notifier.

use std::fmt::Write as _;

use anyhow::anyhow;
use fleetdesk_core::{ApiEnvelope, FilterRow, Notice, NoticeKind, Notifier};
use serde::Serialize;
use serde_json::Value;

use crate::cli::OutputFormat;
use crate::client::{CliError, CliResult};

/// Prints successes and info on stdout.
///
/// Warnings and errors are only traced here; the command returns them as a
/// [`CliError`] and `run()` prints them once on stderr.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        match notice.kind {
            NoticeKind::Info | NoticeKind::Success => println!("{}", notice.message),
            NoticeKind::Warning | NoticeKind::Error => {
                tracing::debug!(kind = notice.kind.as_str(), text = %notice.message, "notice");
            }
        }
    }
}

pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))?;
    println!("{text}");
    Ok(())
}

pub(crate) fn render_rows(rows: &[&Value], fields: &[String], format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(rows),
        OutputFormat::Table => {
            print!("{}", format_table(rows, fields));
            Ok(())
        }
    }
}

pub(crate) fn render_envelope(envelope: &ApiEnvelope<Value>, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(envelope),
        OutputFormat::Table => {
            if let Some(data) = envelope.data.as_ref().filter(|data| !data.is_null()) {
                let text = serde_json::to_string_pretty(data)
                    .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))?;
                println!("{text}");
            }
            Ok(())
        }
    }
}

/// Left-aligned table with an `ID` column followed by `fields`.
pub(crate) fn format_table(rows: &[&Value], fields: &[String]) -> String {
    let headers: Vec<String> = std::iter::once("ID".to_string())
        .chain(fields.iter().map(|field| field.to_ascii_uppercase()))
        .collect();
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            std::iter::once(
                row.record_id()
                    .map_or_else(|| "-".to_string(), |id| id.to_string()),
            )
            .chain(fields.iter().map(|field| {
                row.field_text(field)
                    .map_or_else(|| "-".to_string(), |text| text.into_owned())
            }))
            .collect()
        })
        .collect();

    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(index, header)| {
            cells
                .iter()
                .map(|row| row[index].chars().count())
                .chain(std::iter::once(header.len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    for line in std::iter::once(&headers).chain(cells.iter()) {
        let rendered: Vec<String> = line
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect();
        let _ = writeln!(out, "{}", rendered.join("  ").trim_end());
    }
    let _ = writeln!(out, "{} row(s)", rows.len());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn table_aligns_columns_and_marks_missing_fields() {
        let first = json!({"id": 7, "name": "Ada", "status": "active"});
        let second = json!({"_id": "drv-10", "name": "Bartholomew"});
        let table = format_table(
            &[&first, &second],
            &["name".to_string(), "status".to_string()],
        );
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "ID      NAME         STATUS");
        assert_eq!(lines[1], "7       Ada          active");
        assert_eq!(lines[2], "drv-10  Bartholomew  -");
        assert_eq!(lines[3], "2 row(s)");
    }
}
