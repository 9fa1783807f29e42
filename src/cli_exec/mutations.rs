use serde_json::{Value, json};

use backoffice::browser::{
    ActionDialog, ConfirmDialog, DetailPanel, DialogMode, DialogOutcome, DialogPhase, Dispatcher,
    FieldError, FormModel, ListController, PrimaryState, RefreshPolicy, SubmitBlocked,
    apply_effect, upload_effect,
};
use backoffice::gateway::{
    GatewayError, MutationCommand, MutationResponse, UploadFile, UploadResponse,
};
use backoffice::model::{DestructiveAction, Record};

use super::output::print_record;
use super::*;
use crate::cli_commands::resources::{MutateArgs, UploadArgs};

/// A command typed on the command line, run through the same dialog
/// lifecycle as the interactive forms.
#[derive(Clone, Debug, Default)]
struct RawCommand {
    command: String,
    payload: Value,
}

impl FormModel for RawCommand {
    type Entity = Record;

    // The payload is sent as given; loading the target only proves it exists.
    fn hydrate(&mut self, _entity: &Record) {}

    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errs = Vec::new();
        if self.command.trim().is_empty() {
            errs.push(FieldError::new("command", "command is required"));
        }
        if !matches!(self.payload, Value::Object(_) | Value::Null) {
            errs.push(FieldError::new("payload", "payload must be a JSON object"));
        }
        if errs.is_empty() { Ok(()) } else { Err(errs) }
    }

    fn to_command(&self, mode: DialogMode) -> MutationCommand {
        let id = match mode {
            DialogMode::Edit(id) => Some(id),
            DialogMode::Create => None,
        };
        MutationCommand::new(self.command.trim(), id, self.payload.clone())
    }
}

struct MutateView {
    dialog: ActionDialog<RawCommand>,
    confirm: ConfirmDialog,
    outcome: Option<DialogOutcome>,
    data: Option<Value>,
}

fn dialog_of(v: &mut MutateView) -> Option<&mut ActionDialog<RawCommand>> {
    Some(&mut v.dialog)
}

/// Keeps the echoed data before the dialog consumes the response.
fn echoed(result: &Result<MutationResponse, GatewayError>) -> Option<Value> {
    result.as_ref().ok().and_then(|r| r.data.clone())
}

fn blocked_message(blocked: SubmitBlocked) -> String {
    match blocked {
        SubmitBlocked::Invalid(errs) => errs
            .into_iter()
            .map(|e| e.message)
            .collect::<Vec<_>>()
            .join("; "),
        SubmitBlocked::InFlight => "a submission is already in flight".to_string(),
        SubmitBlocked::NotEditing => "nothing to submit".to_string(),
    }
}

pub(super) async fn handle_mutate_command(
    gateway: Arc<HttpGateway>,
    args: MutateArgs,
) -> Result<()> {
    let kind = args.resource;
    let payload = match &args.payload {
        Some(raw) => serde_json::from_str::<Value>(raw).context("parse --payload as JSON")?,
        None => Value::Null,
    };
    let form = RawCommand {
        command: args.command.clone(),
        payload,
    };

    let mut view = MutateView {
        dialog: ActionDialog::new(kind, form, RefreshPolicy::RefetchList),
        confirm: ConfirmDialog::new(kind, RefreshPolicy::RefetchList),
        outcome: None,
        data: None,
    };
    let mut dispatcher: Dispatcher<MutateView> = Dispatcher::current();

    let destructive = args
        .command
        .parse::<DestructiveAction>()
        .ok()
        .filter(|a| kind.destructive_actions().contains(a));

    if let Some(action) = destructive {
        let id = args
            .id
            .with_context(|| format!("{} needs --id", action.command()))?;
        if args.payload.is_some() {
            anyhow::bail!("{} takes no payload", action.command());
        }
        view.confirm.request(action, id);
        if !args.confirm {
            let prompt = view.confirm.prompt().unwrap_or_default();
            anyhow::bail!("{} Re-run with --confirm to proceed.", prompt);
        }
        let fetch = view
            .confirm
            .confirm()
            .context("confirmation was not pending")?;
        dispatcher.submit(&gateway, fetch, |v: &mut MutateView, _, fetch, result| {
            v.data = echoed(&result);
            v.outcome = Some(v.confirm.commit(fetch, result));
        });
    } else {
        match args.id {
            Some(id) => {
                let fetch = view.dialog.open_edit(id);
                dispatcher.hydrate(&gateway, fetch, dialog_of);
                dispatcher.settle(&mut view).await;
                if view.dialog.phase() != DialogPhase::Editing {
                    let err = view.dialog.error().unwrap_or("no response");
                    anyhow::bail!("load {} #{}: {}", kind, id, err);
                }
            }
            None => view.dialog.open_create(),
        }
        let fetch = view
            .dialog
            .submit()
            .map_err(|b| anyhow::anyhow!(blocked_message(b)))?;
        dispatcher.submit(&gateway, fetch, |v: &mut MutateView, _, fetch, result| {
            v.data = echoed(&result);
            v.outcome = Some(v.dialog.commit_submit(fetch, result));
        });
    }
    dispatcher.settle(&mut view).await;

    match view.outcome {
        Some(DialogOutcome::Success(_)) => {}
        Some(DialogOutcome::Failed(msg)) => {
            anyhow::bail!("{} {}: {}", args.command, kind, msg)
        }
        Some(DialogOutcome::Stale) | None => {
            anyhow::bail!("{} {}: no response", args.command, kind)
        }
    }

    if args.json {
        let out = json!({ "outcome": "success", "data": view.data });
        println!(
            "{}",
            serde_json::to_string_pretty(&out).context("serialize mutation json")?
        );
    } else {
        match args.id {
            Some(id) => println!("{} {} #{}: ok", args.command, kind, id),
            None => println!("{} {}: ok", args.command, kind),
        }
        if let Some(Value::Object(fields)) = view.data {
            print_record(&Record(fields));
        }
    }
    Ok(())
}

struct UploadView {
    panel: DetailPanel<Record>,
    uploaded: Option<Result<Option<String>, GatewayError>>,
}

fn upload_panel_of(v: &mut UploadView) -> Option<&mut DetailPanel<Record>> {
    Some(&mut v.panel)
}

pub(super) async fn handle_upload_command(
    gateway: Arc<HttpGateway>,
    args: UploadArgs,
) -> Result<()> {
    let (kind, id) = (args.resource, args.id);
    let file = UploadFile::from_path(&args.file)?;
    let file_name = file.file_name.clone();

    let mut view = UploadView {
        panel: DetailPanel::with_tabs(kind, &[]),
        uploaded: None,
    };
    let mut dispatcher: Dispatcher<UploadView> = Dispatcher::current();

    // Uploads attach to an existing record; load it first.
    let fetch = view.panel.open(id);
    dispatcher.primary(&gateway, fetch, upload_panel_of);
    dispatcher.settle(&mut view).await;
    match view.panel.primary_state() {
        Some(PrimaryState::Loaded(_)) => {}
        Some(PrimaryState::NotFound) => anyhow::bail!("{} #{} not found", kind, id),
        Some(PrimaryState::Failed(msg)) => anyhow::bail!("load {} #{}: {}", kind, id, msg),
        Some(PrimaryState::Loading) | None => anyhow::bail!("load {} #{}: no response", kind, id),
    }

    let reload_gw = Arc::clone(&gateway);
    dispatcher.upload(
        &gateway,
        kind,
        id,
        file,
        move |v: &mut UploadView, d, result: Result<UploadResponse, GatewayError>| {
            let result = result.and_then(UploadResponse::into_result);
            if result.is_ok() {
                let out = apply_effect::<Record, Record, Record>(
                    &upload_effect(),
                    None::<&mut ListController<Record>>,
                    Some(&mut v.panel),
                );
                if let Some(fetch) = out.primary {
                    d.primary(&reload_gw, fetch, upload_panel_of);
                }
            }
            v.uploaded = Some(result);
        },
    );
    dispatcher.settle(&mut view).await;

    let url = match view.uploaded {
        Some(Ok(url)) => url,
        Some(Err(err)) => anyhow::bail!("upload {} to {} #{}: {}", file_name, kind, id, err),
        None => anyhow::bail!("upload {} to {} #{}: no response", file_name, kind, id),
    };
    tracing::info!(%kind, %id, file = %file_name, "file uploaded");

    if args.json {
        let out = json!({ "url": url, "record": view.panel.primary() });
        println!(
            "{}",
            serde_json::to_string_pretty(&out).context("serialize upload json")?
        );
        return Ok(());
    }
    match &url {
        Some(url) => println!("Uploaded {} to {} #{}: {}", file_name, kind, id, url),
        None => println!("Uploaded {} to {} #{}", file_name, kind, id),
    }
    if let Some(record) = view.panel.primary() {
        print_record(record);
    }
    Ok(())
}
