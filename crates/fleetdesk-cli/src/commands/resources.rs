//! `ls`, `create`, `update`, and `delete`.

use std::fs;
use std::path::Path;

use anyhow::anyhow;
use fleetdesk_client::HttpBackend;
use fleetdesk_core::backend::AdminBackend;
use fleetdesk_core::{ClientSideFilter, ListPage, StatusFilter};
use serde_json::Value;

use crate::cli::{DeleteArgs, FilterArgs, ListArgs, ResourceArgs, UpdateArgs, WriteArgs};
use crate::client::{AppContext, CliError, CliResult, backend_failure};
use crate::commands::bulk::settle;
use crate::output::{render_envelope, render_rows};

pub(crate) type ConsolePage = ListPage<Value, HttpBackend>;

/// Mount a page for `target` and apply one authoritative fetch plus filters.
pub(crate) async fn load_page(
    ctx: &AppContext,
    target: &ResourceArgs,
    filter: &FilterArgs,
) -> CliResult<ConsolePage> {
    let mut page = mount_page(ctx, target, Some(filter));
    let ticket = page.begin_fetch();
    let rows = ctx
        .backend
        .list(page.resource())
        .await
        .map_err(|err| backend_failure(&err, &ctx.messages.fetch_failed))?;
    page.apply_fetch(ticket, Ok(rows));
    page.set_search(filter.search.as_str());
    page.set_status_filter(StatusFilter::from(filter.status.as_str()));
    Ok(page)
}

pub(crate) fn mount_page(
    ctx: &AppContext,
    target: &ResourceArgs,
    filter: Option<&FilterArgs>,
) -> ConsolePage {
    let client_filter = filter.map_or_else(
        || ClientSideFilter::new(Vec::<String>::new()),
        |args| {
            ClientSideFilter::new(args.fields.iter().cloned())
                .with_status_field(args.status_field.as_str())
        },
    );
    ListPage::new(
        target.resource(),
        ctx.backend.clone(),
        ctx.notifier.clone(),
        client_filter,
    )
    .with_messages(ctx.messages.clone())
}

pub(crate) async fn handle_list(ctx: &AppContext, args: ListArgs) -> CliResult<()> {
    let page = load_page(ctx, &args.target, &args.filter).await?;
    let visible = page.visible_rows();
    tracing::debug!(
        resource = page.resource().name(),
        total = page.rows().len(),
        visible = visible.len(),
        "rendering list"
    );
    render_rows(&visible, &args.filter.fields, ctx.output)
}

pub(crate) async fn handle_create(ctx: &AppContext, args: WriteArgs) -> CliResult<()> {
    let body = read_body(&args)?;
    let resource = args.target.resource();
    let envelope = ctx
        .backend
        .create(&resource, &body)
        .await
        .map_err(|err| backend_failure(&err, &ctx.messages.action_failed))?;
    ctx.notifier
        .success(envelope.message().unwrap_or(&ctx.messages.create_success));
    render_envelope(&envelope, ctx.output)
}

pub(crate) async fn handle_update(ctx: &AppContext, args: UpdateArgs) -> CliResult<()> {
    let body = read_body(&args.body)?;
    let resource = args.body.target.resource();
    let envelope = ctx
        .backend
        .update(&resource, &args.id, &body)
        .await
        .map_err(|err| backend_failure(&err, &ctx.messages.action_failed))?;
    ctx.notifier
        .success(envelope.message().unwrap_or(&ctx.messages.update_success));
    render_envelope(&envelope, ctx.output)
}

pub(crate) async fn handle_delete(ctx: &AppContext, args: DeleteArgs) -> CliResult<()> {
    let mut page = mount_page(ctx, &args.target, None);
    page.request_delete(args.id);
    settle(ctx, &mut page).await
}

fn read_body(args: &WriteArgs) -> CliResult<Value> {
    let raw = match (&args.data, &args.file) {
        (Some(inline), _) => inline.clone(),
        (None, Some(path)) => read_file(path)?,
        (None, None) => return Err(CliError::validation("provide a body with --data or --file")),
    };
    let body: Value = serde_json::from_str(&raw)
        .map_err(|err| CliError::validation(format!("body is not valid JSON: {err}")))?;
    if body.is_object() {
        Ok(body)
    } else {
        Err(CliError::validation("body must be a JSON object"))
    }
}

fn read_file(path: &Path) -> CliResult<String> {
    fs::read_to_string(path).map_err(|err| {
        CliError::failure(anyhow!("failed to read body file '{}': {err}", path.display()))
    })
}
