//! `export` and `import`.

use fleetdesk_core::{DirectorySink, FileInput, TransferPipeline, TransferState};

use crate::cli::{ExportArgs, ImportArgs, OutputFormat};
use crate::client::{AppContext, CliResult, transfer_failure};
use crate::output::print_json;

pub(crate) async fn handle_export(ctx: &AppContext, args: ExportArgs) -> CliResult<()> {
    let pipeline =
        TransferPipeline::new(ctx.backend.as_ref(), ctx.notifier.as_ref(), &ctx.messages);
    let state = TransferState::new();
    let sink = DirectorySink::new(&args.out_dir);

    let saved = pipeline
        .export(&state, &args.endpoint, args.format, &sink)
        .await
        .map_err(|err| transfer_failure(&err, &ctx.messages, &ctx.messages.export_failed))?;

    match ctx.output {
        OutputFormat::Json => print_json(&serde_json::json!({
            "filename": saved.filename,
            "path": saved.path,
            "size_bytes": saved.size_bytes,
        })),
        OutputFormat::Table => {
            println!("saved {} ({} bytes)", saved.path.display(), saved.size_bytes);
            Ok(())
        }
    }
}

pub(crate) async fn handle_import(ctx: &AppContext, args: ImportArgs) -> CliResult<()> {
    let pipeline =
        TransferPipeline::new(ctx.backend.as_ref(), ctx.notifier.as_ref(), &ctx.messages);
    let state = TransferState::new();
    let mut input = FileInput::new(args.accept.as_str());
    input
        .choose(&args.file)
        .map_err(|err| transfer_failure(&err, &ctx.messages, &ctx.messages.import_failed))?;

    let envelope = pipeline
        .import(&state, &args.endpoint, &mut input, |envelope| {
            tracing::debug!(message = ?envelope.message(), "import accepted");
        })
        .await
        .map_err(|err| transfer_failure(&err, &ctx.messages, &ctx.messages.import_failed))?;

    if ctx.output == OutputFormat::Json {
        print_json(&envelope)?;
    }
    Ok(())
}
