use serde_json::Value;

use crate::gateway::{GatewayError, MutationCommand, MutationResponse};
use crate::model::{DestructiveAction, EntityId, ResourceKind};

use super::effects::{RefreshPolicy, SuccessEffect};
use super::{Commit, FetchSeq, Ticket};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Form state edited inside an [`ActionDialog`].
pub trait FormModel: Clone {
    type Entity;

    /// Fills the form from the entity being edited.
    fn hydrate(&mut self, entity: &Self::Entity);

    /// Client-side checks; a failing form never reaches the gateway.
    fn validate(&self) -> Result<(), Vec<FieldError>>;

    fn to_command(&self, mode: DialogMode) -> MutationCommand;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DialogMode {
    Create,
    Edit(EntityId),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DialogPhase {
    Idle,
    /// Edit mode waiting for the target entity; fields are not shown yet.
    Hydrating,
    Editing,
    Submitting,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HydrateFetch {
    pub ticket: Ticket,
    pub kind: ResourceKind,
    pub id: EntityId,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SubmitFetch {
    pub ticket: Ticket,
    pub kind: ResourceKind,
    pub command: MutationCommand,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitBlocked {
    NotEditing,
    InFlight,
    Invalid(Vec<FieldError>),
}

#[derive(Clone, Debug, PartialEq)]
pub enum DialogOutcome {
    /// Closed; the owner applies the effect.
    Success(SuccessEffect),
    /// Still open with input preserved.
    Failed(String),
    Stale,
}

/// Create/edit dialog: Idle -> Editing -> Submitting -> Success (closed) or
/// Failed (back to Editing, input kept). One submission in flight at most.
#[derive(Debug)]
pub struct ActionDialog<F> {
    kind: ResourceKind,
    policy: RefreshPolicy,
    blank: F,
    form: F,
    mode: DialogMode,
    phase: DialogPhase,
    error: Option<String>,
    hydrate_seq: FetchSeq,
    submit_seq: FetchSeq,
}

impl<F: FormModel> ActionDialog<F> {
    /// `blank` is the fixed default form used by create mode.
    pub fn new(kind: ResourceKind, blank: F, policy: RefreshPolicy) -> Self {
        Self {
            kind,
            policy,
            form: blank.clone(),
            blank,
            mode: DialogMode::Create,
            phase: DialogPhase::Idle,
            error: None,
            hydrate_seq: FetchSeq::default(),
            submit_seq: FetchSeq::default(),
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn mode(&self) -> DialogMode {
        self.mode
    }

    pub fn phase(&self) -> DialogPhase {
        self.phase
    }

    pub fn is_open(&self) -> bool {
        self.phase != DialogPhase::Idle
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn form(&self) -> &F {
        &self.form
    }

    /// Editable only while Editing; submitting locks the fields.
    pub fn form_mut(&mut self) -> Option<&mut F> {
        match self.phase {
            DialogPhase::Editing => Some(&mut self.form),
            _ => None,
        }
    }

    /// Points the dialog at another resource or policy. Refused while a
    /// submission is in flight; outstanding hydrations become stale.
    pub fn retarget(&mut self, kind: ResourceKind, blank: F, policy: RefreshPolicy) -> bool {
        if self.phase == DialogPhase::Submitting {
            return false;
        }
        self.kind = kind;
        self.policy = policy;
        self.form = blank.clone();
        self.blank = blank;
        self.phase = DialogPhase::Idle;
        self.error = None;
        self.hydrate_seq.invalidate();
        true
    }

    pub fn open_create(&mut self) {
        self.mode = DialogMode::Create;
        self.form = self.blank.clone();
        self.error = None;
        self.phase = DialogPhase::Editing;
    }

    pub fn open_edit(&mut self, id: EntityId) -> HydrateFetch {
        self.mode = DialogMode::Edit(id);
        self.form = self.blank.clone();
        self.error = None;
        self.phase = DialogPhase::Hydrating;
        HydrateFetch {
            ticket: self.hydrate_seq.issue(),
            kind: self.kind,
            id,
        }
    }

    /// A failed hydration closes the dialog: editing defaults in edit mode
    /// would overwrite the real entity.
    pub fn commit_hydrate(
        &mut self,
        ticket: Ticket,
        result: Result<F::Entity, GatewayError>,
    ) -> Commit {
        if self.phase != DialogPhase::Hydrating || !self.hydrate_seq.is_current(ticket) {
            return Commit::Stale;
        }
        match result {
            Ok(entity) => {
                self.form.hydrate(&entity);
                self.phase = DialogPhase::Editing;
                Commit::Applied
            }
            Err(err) => {
                tracing::warn!(
                    kind = %self.kind,
                    error = %err,
                    "edit dialog could not load its target"
                );
                self.error = Some(err.to_string());
                self.phase = DialogPhase::Idle;
                Commit::Failed
            }
        }
    }

    pub fn can_submit(&self) -> bool {
        self.phase == DialogPhase::Editing && self.form.validate().is_ok()
    }

    pub fn submit(&mut self) -> Result<SubmitFetch, SubmitBlocked> {
        match self.phase {
            DialogPhase::Editing => {}
            DialogPhase::Submitting => return Err(SubmitBlocked::InFlight),
            DialogPhase::Idle | DialogPhase::Hydrating => return Err(SubmitBlocked::NotEditing),
        }
        self.form.validate().map_err(SubmitBlocked::Invalid)?;
        self.phase = DialogPhase::Submitting;
        self.error = None;
        Ok(SubmitFetch {
            ticket: self.submit_seq.issue(),
            kind: self.kind,
            command: self.form.to_command(self.mode),
        })
    }

    pub fn commit_submit(
        &mut self,
        fetch: &SubmitFetch,
        result: Result<MutationResponse, GatewayError>,
    ) -> DialogOutcome {
        if self.phase != DialogPhase::Submitting || !self.submit_seq.is_current(fetch.ticket) {
            return DialogOutcome::Stale;
        }
        match result.and_then(MutationResponse::into_result) {
            Ok(data) => {
                tracing::info!(
                    kind = %self.kind,
                    command = %fetch.command.command,
                    "mutation succeeded"
                );
                self.phase = DialogPhase::Idle;
                self.error = None;
                let id = match self.mode {
                    DialogMode::Edit(id) => Some(id),
                    DialogMode::Create => data.as_ref().and_then(data_id),
                };
                let fields = patch_fields(data.as_ref(), &fetch.command.payload);
                DialogOutcome::Success(self.policy.effect(id, fields, false))
            }
            Err(err) => {
                tracing::info!(
                    kind = %self.kind,
                    command = %fetch.command.command,
                    error = %err,
                    "mutation failed"
                );
                let msg = err.to_string();
                self.error = Some(msg.clone());
                self.phase = DialogPhase::Editing;
                DialogOutcome::Failed(msg)
            }
        }
    }

    /// Closes unless a submission is in flight.
    pub fn cancel(&mut self) -> bool {
        if self.phase == DialogPhase::Submitting {
            return false;
        }
        self.phase = DialogPhase::Idle;
        self.hydrate_seq.invalidate();
        true
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfirmPhase {
    Idle,
    Confirming,
    Submitting,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingAction {
    pub action: DestructiveAction,
    pub id: EntityId,
}

/// Confirmation step for destructive actions. Separate from
/// [`ActionDialog`], with its own in-flight flag.
#[derive(Debug)]
pub struct ConfirmDialog {
    kind: ResourceKind,
    policy: RefreshPolicy,
    phase: ConfirmPhase,
    pending: Option<PendingAction>,
    error: Option<String>,
    seq: FetchSeq,
}

impl ConfirmDialog {
    pub fn new(kind: ResourceKind, policy: RefreshPolicy) -> Self {
        Self {
            kind,
            policy,
            phase: ConfirmPhase::Idle,
            pending: None,
            error: None,
            seq: FetchSeq::default(),
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn phase(&self) -> ConfirmPhase {
        self.phase
    }

    pub fn pending(&self) -> Option<PendingAction> {
        self.pending
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn prompt(&self) -> Option<String> {
        let p = self.pending?;
        Some(format!(
            "{} {} #{}? This cannot be undone.",
            p.action.label(),
            self.kind.title().to_lowercase(),
            p.id
        ))
    }

    pub fn retarget(&mut self, kind: ResourceKind, policy: RefreshPolicy) -> bool {
        if self.phase == ConfirmPhase::Submitting {
            return false;
        }
        self.kind = kind;
        self.policy = policy;
        self.phase = ConfirmPhase::Idle;
        self.pending = None;
        self.error = None;
        self.seq.invalidate();
        true
    }

    pub fn request(&mut self, action: DestructiveAction, id: EntityId) {
        if self.phase == ConfirmPhase::Submitting {
            return;
        }
        self.pending = Some(PendingAction { action, id });
        self.error = None;
        self.phase = ConfirmPhase::Confirming;
    }

    /// The only way into Submitting.
    pub fn confirm(&mut self) -> Option<SubmitFetch> {
        if self.phase != ConfirmPhase::Confirming {
            return None;
        }
        let p = self.pending?;
        self.phase = ConfirmPhase::Submitting;
        Some(SubmitFetch {
            ticket: self.seq.issue(),
            kind: self.kind,
            command: MutationCommand::new(p.action.command(), Some(p.id), Value::Null),
        })
    }

    pub fn dismiss(&mut self) -> bool {
        if self.phase == ConfirmPhase::Submitting {
            return false;
        }
        self.phase = ConfirmPhase::Idle;
        self.pending = None;
        true
    }

    pub fn commit(
        &mut self,
        fetch: &SubmitFetch,
        result: Result<MutationResponse, GatewayError>,
    ) -> DialogOutcome {
        if self.phase != ConfirmPhase::Submitting || !self.seq.is_current(fetch.ticket) {
            return DialogOutcome::Stale;
        }
        let Some(p) = self.pending else {
            return DialogOutcome::Stale;
        };
        match result.and_then(MutationResponse::into_result) {
            Ok(data) => {
                tracing::info!(
                    kind = %self.kind,
                    action = p.action.command(),
                    id = %p.id,
                    "destructive action succeeded"
                );
                self.phase = ConfirmPhase::Idle;
                self.pending = None;
                let fields = patch_fields(data.as_ref(), &Value::Null);
                let removed = p.action.removes_record();
                DialogOutcome::Success(self.policy.effect(Some(p.id), fields, removed))
            }
            Err(err) => {
                tracing::info!(
                    kind = %self.kind,
                    action = p.action.command(),
                    error = %err,
                    "destructive action failed"
                );
                let msg = err.to_string();
                self.error = Some(msg.clone());
                self.phase = ConfirmPhase::Confirming;
                DialogOutcome::Failed(msg)
            }
        }
    }
}

fn data_id(data: &Value) -> Option<EntityId> {
    data.get("id").and_then(Value::as_u64).map(EntityId)
}

/// Fields to merge locally: the server's echo when it sent one, otherwise
/// what was submitted.
fn patch_fields(data: Option<&Value>, payload: &Value) -> serde_json::Map<String, Value> {
    match (data, payload) {
        (Some(Value::Object(m)), _) => m.clone(),
        (_, Value::Object(m)) => m.clone(),
        _ => serde_json::Map::new(),
    }
}

#[cfg(test)]
#[path = "../tests/browser/dialog_tests.rs"]
mod tests;
