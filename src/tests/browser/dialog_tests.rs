use serde_json::json;

use super::*;
use crate::browser::RecordPatch;
use crate::model::Record;

#[derive(Clone, Debug, Default, PartialEq)]
struct PromoForm {
    code: String,
    discount: String,
}

impl FormModel for PromoForm {
    type Entity = Record;

    fn hydrate(&mut self, entity: &Record) {
        self.code = entity.text("code");
        self.discount = entity.text("discount");
    }

    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errs = Vec::new();
        if self.code.trim().is_empty() {
            errs.push(FieldError::new("code", "required"));
        }
        if self.discount.parse::<u32>().is_err() {
            errs.push(FieldError::new("discount", "must be a number"));
        }
        if errs.is_empty() { Ok(()) } else { Err(errs) }
    }

    fn to_command(&self, mode: DialogMode) -> MutationCommand {
        let payload = json!({"code": self.code, "discount": self.discount});
        match mode {
            DialogMode::Create => MutationCommand::new("create", None, payload),
            DialogMode::Edit(id) => MutationCommand::new("update", Some(id), payload),
        }
    }
}

fn dialog(policy: RefreshPolicy) -> ActionDialog<PromoForm> {
    ActionDialog::new(ResourceKind::PromoCodes, PromoForm::default(), policy)
}

fn fill(d: &mut ActionDialog<PromoForm>, code: &str, discount: &str) {
    let form = d.form_mut().expect("editable");
    form.code = code.to_string();
    form.discount = discount.to_string();
}

#[test]
fn create_opens_with_blank_form() {
    let mut d = dialog(RefreshPolicy::RefetchList);
    d.open_create();
    assert_eq!(d.phase(), DialogPhase::Editing);
    assert_eq!(d.form(), &PromoForm::default());
    assert!(!d.can_submit());
}

#[test]
fn invalid_form_is_never_submitted() {
    let mut d = dialog(RefreshPolicy::RefetchList);
    d.open_create();
    fill(&mut d, "", "ten");
    match d.submit() {
        Err(SubmitBlocked::Invalid(errs)) => assert_eq!(errs.len(), 2),
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(d.phase(), DialogPhase::Editing);
}

#[test]
fn only_one_submission_in_flight() {
    let mut d = dialog(RefreshPolicy::RefetchList);
    d.open_create();
    fill(&mut d, "SPRING", "10");
    let fetch = d.submit().unwrap();
    assert_eq!(fetch.command.command, "create");
    assert_eq!(d.phase(), DialogPhase::Submitting);
    assert_eq!(d.submit(), Err(SubmitBlocked::InFlight));
    assert!(d.form_mut().is_none());
    assert!(!d.cancel());
}

#[test]
fn success_closes_and_refetches_list() {
    let mut d = dialog(RefreshPolicy::RefetchList);
    d.open_create();
    fill(&mut d, "SPRING", "10");
    let fetch = d.submit().unwrap();
    let out = d.commit_submit(&fetch, Ok(MutationResponse::success(Some(json!({"id": 11})))));
    assert_eq!(out, DialogOutcome::Success(SuccessEffect::RefetchList));
    assert!(!d.is_open());
}

#[test]
fn failure_keeps_input_and_reenables_submit() {
    let mut d = dialog(RefreshPolicy::RefetchList);
    d.open_create();
    fill(&mut d, "SPRING", "10");
    let fetch = d.submit().unwrap();
    let out = d.commit_submit(&fetch, Ok(MutationResponse::failure("code already exists")));
    assert_eq!(out, DialogOutcome::Failed("rejected: code already exists".to_string()));
    assert_eq!(d.phase(), DialogPhase::Editing);
    assert_eq!(d.form().code, "SPRING");
    assert_eq!(d.error(), Some("rejected: code already exists"));
    assert!(d.can_submit());
}

#[test]
fn transport_error_is_treated_like_failure_outcome() {
    let mut d = dialog(RefreshPolicy::RefetchList);
    d.open_create();
    fill(&mut d, "SPRING", "10");
    let fetch = d.submit().unwrap();
    let out = d.commit_submit(&fetch, Err(GatewayError::Transport("refused".to_string())));
    assert!(matches!(out, DialogOutcome::Failed(_)));
    assert_eq!(d.phase(), DialogPhase::Editing);
}

#[test]
fn edit_hydrates_before_fields_are_editable() {
    let mut d = dialog(RefreshPolicy::PatchPrimaryAndList);
    let fetch = d.open_edit(EntityId(5));
    assert_eq!(d.phase(), DialogPhase::Hydrating);
    assert!(d.form_mut().is_none());
    assert_eq!(d.submit(), Err(SubmitBlocked::NotEditing));

    let entity: Record =
        serde_json::from_value(json!({"id": 5, "code": "OLD", "discount": 5})).unwrap();
    assert_eq!(d.commit_hydrate(fetch.ticket, Ok(entity)), Commit::Applied);
    assert_eq!(d.form().code, "OLD");
    assert_eq!(d.form().discount, "5");

    fill(&mut d, "NEW", "5");
    let submit = d.submit().unwrap();
    assert_eq!(submit.command.id, Some(EntityId(5)));
    let out = d.commit_submit(&submit, Ok(MutationResponse::success(None)));
    let DialogOutcome::Success(SuccessEffect::PatchAndRefetch(RecordPatch::MergePrimary { fields })) =
        out
    else {
        panic!("unexpected {out:?}");
    };
    assert_eq!(fields.get("code"), Some(&json!("NEW")));
}

#[test]
fn failed_hydration_closes_with_error() {
    let mut d = dialog(RefreshPolicy::RefetchList);
    let fetch = d.open_edit(EntityId(5));
    assert_eq!(d.commit_hydrate(fetch.ticket, Err(GatewayError::NotFound)), Commit::Failed);
    assert!(!d.is_open());
    assert_eq!(d.error(), Some("not found"));
}

#[test]
fn cancelled_hydration_is_dropped() {
    let mut d = dialog(RefreshPolicy::RefetchList);
    let fetch = d.open_edit(EntityId(5));
    assert!(d.cancel());
    let entity = Record::default();
    assert_eq!(d.commit_hydrate(fetch.ticket, Ok(entity)), Commit::Stale);
}

#[test]
fn create_reopens_with_defaults_after_edit() {
    let mut d = dialog(RefreshPolicy::RefetchList);
    let fetch = d.open_edit(EntityId(5));
    let entity: Record = serde_json::from_value(json!({"id": 5, "code": "OLD"})).unwrap();
    d.commit_hydrate(fetch.ticket, Ok(entity));
    d.cancel();
    d.open_create();
    assert_eq!(d.form(), &PromoForm::default());
    assert_eq!(d.mode(), DialogMode::Create);
}

#[test]
fn tab_patch_policy_patches_the_edited_record() {
    let mut d = dialog(RefreshPolicy::PatchTab("grants"));
    let fetch = d.open_edit(EntityId(8));
    d.commit_hydrate(fetch.ticket, Ok(Record::default()));
    fill(&mut d, "X", "1");
    let submit = d.submit().unwrap();
    let data = json!({"id": 8, "code": "X"});
    let out = d.commit_submit(&submit, Ok(MutationResponse::success(Some(data))));
    let DialogOutcome::Success(SuccessEffect::PatchDetail(RecordPatch::MergeTab { tab, id, fields })) =
        out
    else {
        panic!("unexpected {out:?}");
    };
    assert_eq!((tab, id), ("grants", EntityId(8)));
    assert_eq!(fields.get("code"), Some(&json!("X")));
}

#[test]
fn confirm_is_the_only_way_to_submit() {
    let mut c = ConfirmDialog::new(ResourceKind::PromoCodes, RefreshPolicy::RefetchList);
    assert!(c.confirm().is_none());

    c.request(DestructiveAction::Delete, EntityId(3));
    assert_eq!(c.phase(), ConfirmPhase::Confirming);
    assert!(c.prompt().unwrap().contains("#3"));

    let fetch = c.confirm().unwrap();
    assert_eq!(fetch.command.command, "delete");
    assert_eq!(fetch.command.id, Some(EntityId(3)));
    assert!(c.confirm().is_none());
    assert!(!c.dismiss());
}

#[test]
fn dismiss_sends_nothing() {
    let mut c = ConfirmDialog::new(ResourceKind::Teams, RefreshPolicy::RefetchList);
    c.request(DestructiveAction::Delete, EntityId(3));
    assert!(c.dismiss());
    assert_eq!(c.phase(), ConfirmPhase::Idle);
    assert!(c.confirm().is_none());
}

#[test]
fn revoke_in_tab_removes_the_row() {
    let mut c = ConfirmDialog::new(ResourceKind::Grants, RefreshPolicy::PatchTab("grants"));
    c.request(DestructiveAction::Revoke, EntityId(12));
    let fetch = c.confirm().unwrap();
    let out = c.commit(&fetch, Ok(MutationResponse::success(None)));
    assert_eq!(
        out,
        DialogOutcome::Success(SuccessEffect::PatchDetail(RecordPatch::RemoveTab {
            tab: "grants",
            id: EntityId(12),
        }))
    );
    assert_eq!(c.phase(), ConfirmPhase::Idle);
}

#[test]
fn failed_destructive_action_stays_confirming() {
    let mut c = ConfirmDialog::new(ResourceKind::Orders, RefreshPolicy::PatchPrimaryAndList);
    c.request(DestructiveAction::Cancel, EntityId(1));
    let fetch = c.confirm().unwrap();
    let out = c.commit(&fetch, Ok(MutationResponse::failure("already paid")));
    assert!(matches!(out, DialogOutcome::Failed(_)));
    assert_eq!(c.phase(), ConfirmPhase::Confirming);
    assert_eq!(c.pending().map(|p| p.id), Some(EntityId(1)));
    assert!(c.confirm().is_some());
}

#[test]
fn deleting_the_open_entity_closes_the_panel() {
    let mut c = ConfirmDialog::new(ResourceKind::Teams, RefreshPolicy::PatchPrimaryAndList);
    c.request(DestructiveAction::Delete, EntityId(42));
    let fetch = c.confirm().unwrap();
    let out = c.commit(&fetch, Ok(MutationResponse::success(None)));
    assert_eq!(
        out,
        DialogOutcome::Success(SuccessEffect::PatchAndRefetch(RecordPatch::ClosePanel))
    );
}

#[test]
fn retarget_keeps_late_hydration_stale() {
    let mut d = dialog(RefreshPolicy::RefetchList);
    let old = d.open_edit(EntityId(5));
    assert!(d.retarget(
        ResourceKind::Plans,
        PromoForm::default(),
        RefreshPolicy::PatchPrimaryAndList
    ));
    let new = d.open_edit(EntityId(6));
    assert_ne!(old.ticket, new.ticket);
    assert_eq!(d.commit_hydrate(old.ticket, Ok(Record::default())), Commit::Stale);
    assert_eq!(d.kind(), ResourceKind::Plans);
}

#[test]
fn retarget_is_refused_while_submitting() {
    let mut d = dialog(RefreshPolicy::RefetchList);
    d.open_create();
    fill(&mut d, "SPRING", "10");
    d.submit().unwrap();
    assert!(!d.retarget(ResourceKind::Plans, PromoForm::default(), RefreshPolicy::RefetchList));
    let mut c = ConfirmDialog::new(ResourceKind::Teams, RefreshPolicy::RefetchList);
    c.request(DestructiveAction::Delete, EntityId(1));
    c.confirm();
    assert!(!c.retarget(ResourceKind::Users, RefreshPolicy::RefetchList));
}
