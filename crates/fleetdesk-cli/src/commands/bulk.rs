//! `bulk delete|activate|deactivate` and the shared confirmation flow.

use fleetdesk_core::{BulkOutcome, RecordId};

use crate::cli::BulkArgs;
use crate::client::{AppContext, CliError, CliResult};
use crate::commands::resources::{ConsolePage, load_page};

pub(crate) async fn handle_bulk(ctx: &AppContext, args: BulkArgs) -> CliResult<()> {
    let mut page = load_page(ctx, &args.target, &args.filter).await?;
    select_rows(&mut page, &args)?;

    let outcome = page.trigger(args.action.into()).await;
    match outcome {
        BulkOutcome::AwaitingConfirmation => settle(ctx, &mut page).await,
        other => outcome_result(ctx, other),
    }
}

/// Answer an open confirmation prompt and run or drop the parked action.
pub(crate) async fn settle(ctx: &AppContext, page: &mut ConsolePage) -> CliResult<()> {
    let Some(prompt) = page.confirmation().map(str::to_string) else {
        return Ok(());
    };
    let approved = match ctx.confirm.ask(&prompt) {
        Ok(approved) => approved,
        Err(err) => {
            page.cancel_confirmation();
            return Err(err);
        }
    };
    if !approved {
        page.cancel_confirmation();
        println!("cancelled");
        return Ok(());
    }
    match page.confirm().await {
        Some(outcome) => outcome_result(ctx, outcome),
        None => Ok(()),
    }
}

fn select_rows(page: &mut ConsolePage, args: &BulkArgs) -> CliResult<()> {
    if args.all {
        page.toggle_all();
        return Ok(());
    }
    let visible = page.visible_ids();
    let hidden: Vec<String> = args
        .ids
        .iter()
        .filter(|id| !visible.contains(*id))
        .map(RecordId::to_string)
        .collect();
    if !hidden.is_empty() {
        return Err(CliError::validation(format!(
            "not in the current list: {}",
            hidden.join(", ")
        )));
    }
    for id in &args.ids {
        if !page.selection().is_selected(id) {
            page.toggle(id.clone());
        }
    }
    Ok(())
}

fn outcome_result(ctx: &AppContext, outcome: BulkOutcome) -> CliResult<()> {
    match outcome {
        BulkOutcome::Succeeded { affected } => {
            tracing::info!(affected, "bulk action applied");
            Ok(())
        }
        BulkOutcome::EmptySelection => {
            Err(CliError::validation(ctx.messages.select_rows_first.clone()))
        }
        BulkOutcome::Failed { message } => Err(CliError::failure(anyhow::anyhow!(message))),
        BulkOutcome::Busy => Err(CliError::failure(anyhow::anyhow!(
            "another bulk action is already running"
        ))),
        BulkOutcome::Closed => Err(CliError::failure(anyhow::anyhow!(
            "the list was closed before the action ran"
        ))),
        BulkOutcome::AwaitingConfirmation => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{BulkActionArg, FilterArgs, ResourceArgs, StyleArg};
    use crate::client::ConfirmPolicy;
    use crate::commands::test_support::context_with;
    use fleetdesk_core::NoticeKind;
    use httpmock::MockServer;
    use httpmock::prelude::*;
    use serde_json::{Value, json};

    fn ten_drivers() -> Value {
        let rows: Vec<Value> = (1..=10)
            .map(|id| json!({"id": id, "name": format!("Driver {id}"), "status": "active"}))
            .collect();
        json!({"success": true, "data": rows})
    }

    fn args(action: BulkActionArg, ids: Vec<RecordId>, all: bool) -> BulkArgs {
        BulkArgs {
            action,
            target: ResourceArgs {
                resource: "drivers".into(),
                style: StyleArg::Rest,
                bulk_name: None,
            },
            filter: FilterArgs {
                search: String::new(),
                status: "all".into(),
                fields: vec!["name".into()],
                status_field: "status".into(),
            },
            ids,
            all,
        }
    }

    #[tokio::test]
    async fn bulk_delete_with_yes_deletes_and_refetches() {
        let server = MockServer::start_async().await;
        let list = server.mock(|when, then| {
            when.method(GET).path("/api/drivers");
            then.status(200).json_body(ten_drivers());
        });
        let delete = server.mock(|when, then| {
            when.method(POST)
                .path("/api/bulk-operations/drivers/delete")
                .json_body(json!({"ids": [2, 5, 9]}));
            then.status(200)
                .json_body(json!({"success": true, "message": "3 drivers deleted"}));
        });
        let (ctx, notifier) = context_with(&server, ConfirmPolicy::AssumeYes);

        handle_bulk(
            &ctx,
            args(
                BulkActionArg::Delete,
                vec![RecordId::Int(9), RecordId::Int(2), RecordId::Int(5)],
                false,
            ),
        )
        .await
        .expect("bulk delete succeeds");

        delete.assert();
        list.assert_calls(2);
        assert_eq!(
            notifier.last().map(|n| (n.kind, n.message)),
            Some((NoticeKind::Success, "3 drivers deleted".to_string()))
        );
    }

    #[tokio::test]
    async fn bulk_status_skips_prompt_even_without_terminal() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/api/drivers");
            then.status(200).json_body(ten_drivers());
        });
        let update = server.mock(|when, then| {
            when.method(POST)
                .path("/api/bulk-operations/users/update-status")
                .json_body(json!({"ids": [1, 2, 3, 4, 5, 6, 7, 8, 9, 10], "status": "inactive"}));
            then.status(200).json_body(json!({"success": true}));
        });
        let (ctx, _) = context_with(&server, ConfirmPolicy::NonInteractive);

        handle_bulk(&ctx, args(BulkActionArg::Deactivate, Vec::new(), true))
            .await
            .expect("status update succeeds");
        update.assert();
    }

    #[tokio::test]
    async fn empty_selection_is_a_validation_error() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/api/drivers");
            then.status(200).json_body(ten_drivers());
        });
        let delete = server.mock(|when, then| {
            when.method(POST).path("/api/bulk-operations/drivers/delete");
            then.status(200).json_body(json!({"success": true}));
        });
        let (ctx, notifier) = context_with(&server, ConfirmPolicy::AssumeYes);

        let err = handle_bulk(&ctx, args(BulkActionArg::Delete, Vec::new(), false))
            .await
            .expect_err("nothing selected");
        assert_eq!(err.exit_code(), 2);
        assert_eq!(err.to_string(), ctx.messages.select_rows_first);
        delete.assert_calls(0);
        assert_eq!(notifier.last().map(|n| n.kind), Some(NoticeKind::Warning));
    }

    #[tokio::test]
    async fn unknown_ids_are_rejected_before_any_mutation() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/api/drivers");
            then.status(200).json_body(ten_drivers());
        });
        let (ctx, _) = context_with(&server, ConfirmPolicy::AssumeYes);

        let err = handle_bulk(
            &ctx,
            args(BulkActionArg::Activate, vec![RecordId::Int(42)], false),
        )
        .await
        .expect_err("42 is not listed");
        assert_eq!(err.to_string(), "not in the current list: 42");
    }

    #[tokio::test]
    async fn backend_failure_surfaces_message() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/api/drivers");
            then.status(200).json_body(ten_drivers());
        });
        server.mock(|when, then| {
            when.method(POST).path("/api/bulk-operations/drivers/delete");
            then.status(500).json_body(json!({"message": "database unavailable"}));
        });
        let (ctx, _) = context_with(&server, ConfirmPolicy::AssumeYes);

        let err = handle_bulk(
            &ctx,
            args(BulkActionArg::Delete, vec![RecordId::Int(1)], false),
        )
        .await
        .expect_err("backend fails");
        assert_eq!(err.exit_code(), 3);
        assert_eq!(err.to_string(), "database unavailable");
    }
}
