use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::browser::{
    Commit, ConfirmPhase, DetailPanel, DialogOutcome, Dispatcher, HydrateFetch, ListController,
    ListFetch, RecordPatch, ReferencePicker, RefreshPolicy, SubmitBlocked, SuccessEffect,
    apply_effect, upload_effect,
};
use crate::gateway::{
    Gateway, HttpGateway, MutationCommand, MutationResponse, UploadFile, UploadResponse,
};
use crate::model::{AdminRole, EntityId, FieldKind, Patchable, Record, ResourceKind};

use super::{App, Browser, Focus, PickerTarget};
use crate::tui_shell::{Input, RecordForm};

pub(super) fn list_of(b: &mut Browser) -> Option<&mut ListController<Record>> {
    Some(&mut b.list)
}

pub(super) fn detail_of(b: &mut Browser) -> Option<&mut DetailPanel<Record>> {
    Some(&mut b.detail)
}

pub(super) fn picker_of(b: &mut Browser) -> Option<&mut ReferencePicker<Record>> {
    Some(&mut b.picker)
}

/// Runs a success effect against this view and dispatches the follow-up
/// fetches it asks for.
fn dispatch_effect(
    b: &mut Browser,
    d: &mut Dispatcher<Browser>,
    gw: &Arc<HttpGateway>,
    effect: &SuccessEffect,
) {
    let fetches = apply_effect(effect, Some(&mut b.list), Some(&mut b.detail));
    if let Some(f) = fetches.list {
        d.list(gw, f, list_of);
    }
    if let Some(f) = fetches.primary {
        d.primary(gw, f, detail_of);
    }
    if let Some(f) = fetches.tab {
        d.tab(gw, f, detail_of);
    }
    b.clamp_selection();
}

fn finish_mutation(
    b: &mut Browser,
    d: &mut Dispatcher<Browser>,
    gw: &Arc<HttpGateway>,
    outcome: DialogOutcome,
    done: &str,
) {
    match outcome {
        DialogOutcome::Success(effect) => {
            dispatch_effect(b, d, gw, &effect);
            b.set_status(done, false);
        }
        DialogOutcome::Failed(msg) => b.set_status(msg, true),
        DialogOutcome::Stale => tracing::debug!("dropping stale mutation result"),
    }
}

impl App {
    pub(super) fn load_roles(&mut self) {
        let Some(fetch) = self.browser.roles.load() else {
            return;
        };
        let gw = Arc::clone(&self.gateway);
        let ListFetch { ticket, query } = fetch;
        self.dispatcher.spawn(
            async move { gw.list::<AdminRole>(query).await },
            move |b, _, result| {
                b.roles.commit(ticket, result);
            },
        );
    }

    pub(in crate::tui_shell) fn search(&mut self) {
        let fetch = self.browser.list.search();
        self.browser.selected = 0;
        self.dispatcher.list(&self.gateway, fetch, list_of);
    }

    pub(in crate::tui_shell) fn reset_filters(&mut self) {
        let fetch = self.browser.list.reset();
        self.browser.filter_labels.clear();
        self.browser.selected = 0;
        self.dispatcher.list(&self.gateway, fetch, list_of);
    }

    /// Reopening the detail panel is the retry path for its loads; the list
    /// is refetched with its current query.
    pub(in crate::tui_shell) fn refresh(&mut self) {
        let fetch = self.browser.list.refresh();
        self.dispatcher.list(&self.gateway, fetch, list_of);
        if self.browser.needs_roles() {
            self.load_roles();
        }
    }

    pub(in crate::tui_shell) fn change_page(&mut self, delta: i64) {
        let list = &mut self.browser.list;
        let page = list.page();
        let last = list.page_count().max(1) as i64;
        let next = (page.page() as i64 + delta).clamp(1, last) as u32;
        if next == page.page() {
            return;
        }
        let fetch = list.set_page(next, page.page_size());
        self.browser.selected = 0;
        self.dispatcher.list(&self.gateway, fetch, list_of);
    }

    pub(in crate::tui_shell) fn change_page_size(&mut self, delta: i64) {
        let list = &mut self.browser.list;
        let page = list.page();
        let size = (page.page_size() as i64 + delta).clamp(5, 100) as u32;
        if size == page.page_size() {
            return;
        }
        let fetch = list.set_page(page.page(), size);
        self.dispatcher.list(&self.gateway, fetch, list_of);
    }

    pub(in crate::tui_shell) fn open_detail(&mut self) {
        let b = &mut self.browser;
        let Some(id) = b.selected_id() else {
            return;
        };
        let fetch = b.detail.open(id);
        b.focus = Focus::Detail;
        b.tab_selected = 0;
        self.dispatcher.primary(&self.gateway, fetch, detail_of);
        if let Some(first) = b.detail.tab_specs().first()
            && let Some(fetch) = b.detail.activate_tab(first.key)
        {
            self.dispatcher.tab(&self.gateway, fetch, detail_of);
        }
    }

    pub(in crate::tui_shell) fn close_detail(&mut self) {
        self.browser.detail.close();
        self.browser.clamp_selection();
    }

    pub(in crate::tui_shell) fn cycle_tab(&mut self, forward: bool) {
        let b = &mut self.browser;
        let specs = b.detail.tab_specs();
        if specs.is_empty() || !b.detail.is_open() {
            return;
        }
        let len = specs.len();
        let pos = b
            .detail
            .active_tab()
            .and_then(|k| specs.iter().position(|s| s.key == k));
        let next = match (pos, forward) {
            (None, _) => 0,
            (Some(i), true) => (i + 1) % len,
            (Some(i), false) => (i + len - 1) % len,
        };
        b.tab_selected = 0;
        if let Some(fetch) = b.detail.activate_tab(specs[next].key) {
            self.dispatcher.tab(&self.gateway, fetch, detail_of);
        }
    }

    pub(in crate::tui_shell) fn change_tab_page(&mut self, delta: i64) {
        let b = &mut self.browser;
        let Some(key) = b.detail.active_tab() else {
            return;
        };
        let Some(tab) = b.detail.tab(key) else {
            return;
        };
        let page = tab.page();
        let last = page.page_count(tab.total()).max(1) as i64;
        let next = (page.page() as i64 + delta).clamp(1, last) as u32;
        if next == page.page() {
            return;
        }
        b.tab_selected = 0;
        if let Some(fetch) = b.detail.set_tab_page(key, next, page.page_size()) {
            self.dispatcher.tab(&self.gateway, fetch, detail_of);
        }
    }

    pub(in crate::tui_shell) fn open_create(&mut self) {
        let b = &mut self.browser;
        let kind = b.kind;
        if kind.form_fields().is_empty() {
            b.set_status(format!("{} cannot be created here", kind.title()), true);
            return;
        }
        if !b
            .dialog
            .retarget(kind, RecordForm::blank(kind), RefreshPolicy::RefetchList)
        {
            b.set_status("a save is still in flight", true);
            return;
        }
        b.dialog.open_create();
        self.reset_form_cursor();
    }

    pub(in crate::tui_shell) fn open_edit(&mut self) {
        let b = &mut self.browser;
        let kind = b.kind;
        let Some(id) = b.focused_record().and_then(Record::id) else {
            return;
        };
        if kind.form_fields().is_empty() {
            b.set_status(format!("{} cannot be edited here", kind.title()), true);
            return;
        }
        let policy = if b.detail.id() == Some(id) {
            RefreshPolicy::PatchPrimaryAndList
        } else {
            RefreshPolicy::RefetchList
        };
        if !b.dialog.retarget(kind, RecordForm::blank(kind), policy) {
            b.set_status("a save is still in flight", true);
            return;
        }
        let HydrateFetch { ticket, kind, id } = b.dialog.open_edit(id);
        self.reset_form_cursor();
        let gw = Arc::clone(&self.gateway);
        self.dispatcher.spawn(
            async move { gw.get::<Record>(kind, id).await },
            move |b, _, result| match b.dialog.commit_hydrate(ticket, result) {
                Commit::Applied => {
                    b.form_field = 0;
                    load_form_input(b);
                }
                Commit::Failed => {
                    let msg = b.dialog.error().unwrap_or("could not load record").to_string();
                    b.set_status(msg, true);
                }
                Commit::Stale => {}
            },
        );
    }

    /// Adds a user to the open team: a member form pinned to the team, with
    /// the user picker opened right away and current members excluded.
    pub(in crate::tui_shell) fn open_invite(&mut self) {
        let b = &mut self.browser;
        if b.kind != ResourceKind::Teams {
            b.set_status("invites are sent from a team", true);
            return;
        }
        let Some(team) = b.detail.id() else {
            b.set_status("open a team first", true);
            return;
        };
        let Some(members) = ResourceKind::Teams.tab("members") else {
            return;
        };
        let form = RecordForm::blank(ResourceKind::TeamMembers)
            .with_locked("teamId", team.to_string());
        if !b
            .dialog
            .retarget(ResourceKind::TeamMembers, form, RefreshPolicy::insert_into(members))
        {
            b.set_status("a save is still in flight", true);
            return;
        }
        b.dialog.open_create();
        self.reset_form_cursor();
        self.open_form_picker();
    }

    fn reset_form_cursor(&mut self) {
        self.browser.form_field = 0;
        load_form_input(&mut self.browser);
    }

    pub(in crate::tui_shell) fn move_form_field(&mut self, delta: isize) {
        let b = &mut self.browser;
        let len = b.dialog.form().editable().len();
        if len == 0 {
            return;
        }
        b.form_field = (b.form_field as isize + delta).rem_euclid(len as isize) as usize;
        load_form_input(b);
    }

    /// Writes the edit buffer through to the focused text field.
    pub(in crate::tui_shell) fn sync_form_input(&mut self) {
        let b = &mut self.browser;
        let Some(spec) = b.dialog.form().editable().get(b.form_field).copied() else {
            return;
        };
        let value = b.form_input.buf.clone();
        if let Some(form) = b.dialog.form_mut() {
            form.set_value(spec.key, value);
        }
    }

    pub(in crate::tui_shell) fn cycle_form_choice(&mut self, forward: bool) {
        let b = &mut self.browser;
        let Some(spec) = b.dialog.form().editable().get(b.form_field).copied() else {
            return;
        };
        if let Some(form) = b.dialog.form_mut() {
            form.cycle_choice(spec.key, forward);
        }
    }

    pub(in crate::tui_shell) fn submit_dialog(&mut self) {
        let b = &mut self.browser;
        match b.dialog.submit() {
            Ok(fetch) => {
                let gw = Arc::clone(&self.gateway);
                self.dispatcher
                    .submit(&self.gateway, fetch, move |b, d, fetch, result| {
                        let outcome = b.dialog.commit_submit(fetch, result);
                        finish_mutation(b, d, &gw, outcome, "saved");
                    });
            }
            Err(SubmitBlocked::Invalid(errs)) => {
                let msg = errs
                    .iter()
                    .map(|e| e.message.as_str())
                    .collect::<Vec<_>>()
                    .join("; ");
                b.set_status(msg, true);
            }
            Err(SubmitBlocked::InFlight) => b.set_status("already saving", true),
            Err(SubmitBlocked::NotEditing) => {}
        }
    }

    pub(in crate::tui_shell) fn cancel_dialog(&mut self) {
        if !self.browser.dialog.cancel() {
            self.browser.set_status("saving; wait for the result", true);
        }
    }

    /// Asks to confirm the first destructive action for whatever has focus:
    /// a tab row, the open entity, or the highlighted list row.
    pub(in crate::tui_shell) fn request_destructive(&mut self) {
        let b = &mut self.browser;
        let target = match b.focus {
            Focus::Detail => match b.selected_tab_row() {
                Some((tab, kind, id)) => b
                    .kind
                    .tab(tab)
                    .map(|spec| (kind, RefreshPolicy::for_tab(spec), id)),
                None => b
                    .detail
                    .id()
                    .map(|id| (b.kind, RefreshPolicy::PatchPrimaryAndList, id)),
            },
            Focus::List => b.selected_id().map(|id| {
                let policy = if b.detail.id() == Some(id) {
                    RefreshPolicy::PatchPrimaryAndList
                } else {
                    RefreshPolicy::RefetchList
                };
                (b.kind, policy, id)
            }),
        };
        let Some((kind, policy, id)) = target else {
            return;
        };
        let Some(action) = kind.destructive_actions().first().copied() else {
            b.set_status(format!("nothing to remove on {}", kind.title().to_lowercase()), true);
            return;
        };
        if !b.confirm.retarget(kind, policy) {
            b.set_status("a confirmed action is still running", true);
            return;
        }
        b.confirm.request(action, id);
    }

    pub(in crate::tui_shell) fn cycle_confirm_action(&mut self) {
        let c = &mut self.browser.confirm;
        if c.phase() != ConfirmPhase::Confirming {
            return;
        }
        let Some(p) = c.pending() else {
            return;
        };
        let actions = c.kind().destructive_actions();
        if actions.len() < 2 {
            return;
        }
        let pos = actions.iter().position(|a| *a == p.action).unwrap_or(0);
        c.request(actions[(pos + 1) % actions.len()], p.id);
    }

    pub(in crate::tui_shell) fn confirm(&mut self) {
        let Some(fetch) = self.browser.confirm.confirm() else {
            return;
        };
        let gw = Arc::clone(&self.gateway);
        self.dispatcher
            .submit(&self.gateway, fetch, move |b, d, fetch, result| {
                let outcome = b.confirm.commit(fetch, result);
                finish_mutation(b, d, &gw, outcome, "done");
            });
    }

    pub(in crate::tui_shell) fn dismiss_confirm(&mut self) {
        if !self.browser.confirm.dismiss() {
            self.browser.set_status("running; wait for the result", true);
        }
    }

    /// Flips a status flag: on the highlighted tab row when the panel has
    /// focus and that row has one, else on the focused record. The change is
    /// patched in place and the list is refetched.
    pub(in crate::tui_shell) fn toggle_status(&mut self) {
        let b = &mut self.browser;
        if b.toggling.is_some() {
            b.set_status("status change already in flight", true);
            return;
        }
        let target = match toggle_target(b) {
            Ok(Some(t)) => t,
            Ok(None) => return,
            Err(msg) => {
                b.set_status(msg, true);
                return;
            }
        };
        let ToggleTarget {
            kind,
            id,
            field,
            next,
            tab,
        } = target;
        let mut fields = Map::new();
        fields.insert(field.to_string(), Value::Bool(next));
        let command = MutationCommand::new("setStatus", Some(id), Value::Object(fields.clone()));
        b.toggling = Some(id);
        let gw = Arc::clone(&self.gateway);
        let follow_up = Arc::clone(&self.gateway);
        self.dispatcher.spawn(
            async move { gw.mutate(kind, command).await },
            move |b, d, result: Result<MutationResponse, _>| {
                b.toggling = None;
                match result.and_then(MutationResponse::into_result) {
                    Ok(_) => {
                        let effect = match tab {
                            Some(tab) => SuccessEffect::PatchAndRefetch(RecordPatch::MergeTab {
                                tab,
                                id,
                                fields,
                            }),
                            None => {
                                b.list.merge_record(id, &fields);
                                if b.detail.id() == Some(id) {
                                    let patch = RecordPatch::MergePrimary { fields };
                                    SuccessEffect::PatchAndRefetch(patch)
                                } else {
                                    SuccessEffect::RefetchList
                                }
                            }
                        };
                        dispatch_effect(b, d, &follow_up, &effect);
                        let word = if next { "on" } else { "off" };
                        b.set_status(format!("{} #{} {} {}", kind.title(), id, field, word), false);
                    }
                    Err(err) => {
                        tracing::warn!(%kind, %id, error = %err, "status toggle failed");
                        b.set_status(err.to_string(), true);
                    }
                }
            },
        );
    }

    pub(in crate::tui_shell) fn start_upload(&mut self, path: &str) {
        let b = &mut self.browser;
        let Some(id) = b.detail.id() else {
            b.set_status("open a record to attach a file", true);
            return;
        };
        if b.uploading {
            b.set_status("an upload is already running", true);
            return;
        }
        let file = match UploadFile::from_path(Path::new(path.trim())) {
            Ok(f) => f,
            Err(err) => {
                b.set_status(format!("{:#}", err), true);
                return;
            }
        };
        b.uploading = true;
        let gw = Arc::clone(&self.gateway);
        let kind = b.kind;
        self.dispatcher
            .upload(&self.gateway, kind, id, file, move |b, d, result| {
                b.uploading = false;
                match result.and_then(UploadResponse::into_result) {
                    Ok(url) => {
                        let msg = match url {
                            Some(url) => format!("uploaded {}", url),
                            None => "uploaded".to_string(),
                        };
                        b.set_status(msg, false);
                        dispatch_effect(b, d, &gw, &upload_effect());
                    }
                    Err(err) => {
                        tracing::warn!(%kind, %id, error = %err, "upload failed");
                        b.set_status(format!("upload failed: {}", err), true);
                    }
                }
            });
    }

    pub(in crate::tui_shell) fn open_filter_picker(
        &mut self,
        key: &'static str,
        kind: ResourceKind,
    ) {
        self.open_picker(PickerTarget::Filter, key, kind, BTreeSet::new());
    }

    /// Opens the picker for the focused reference field of the dialog.
    pub(in crate::tui_shell) fn open_form_picker(&mut self) {
        let b = &mut self.browser;
        let Some(spec) = b.dialog.form().editable().get(b.form_field).copied() else {
            return;
        };
        let FieldKind::Reference(kind) = spec.kind else {
            return;
        };
        let mut exclude = BTreeSet::new();
        if b.dialog.kind() == ResourceKind::TeamMembers
            && spec.key == "userId"
            && let Some(members) = b.detail.tab("members")
        {
            exclude.extend(members.records().iter().filter_map(|r| r.reference("userId")));
        }
        self.open_picker(PickerTarget::Form, spec.key, kind, exclude);
    }

    fn open_picker(
        &mut self,
        target: PickerTarget,
        key: &'static str,
        kind: ResourceKind,
        exclude: BTreeSet<EntityId>,
    ) {
        let b = &mut self.browser;
        b.picker.retarget(kind, key);
        if !exclude.is_empty() {
            b.picker
                .set_exclusion(move |r: &Record| r.id().is_some_and(|id| exclude.contains(&id)));
        }
        b.picker_target = target;
        b.picker_field = key;
        b.picker_cursor = 0;
        let fetch = b.picker.open();
        self.dispatcher.picker(&self.gateway, fetch, picker_of);
    }

    pub(in crate::tui_shell) fn picker_select(&mut self) {
        let b = &mut self.browser;
        let Some(option) = b.picker.options().get(b.picker_cursor).cloned() else {
            return;
        };
        let key = b.picker_field;
        let selected = match b.picker_target {
            PickerTarget::Filter => b.picker.select(option.id, b.list.filters_mut()),
            PickerTarget::Form => match b.dialog.form_mut() {
                Some(form) => b.picker.select(option.id, form),
                None => false,
            },
        };
        if !selected {
            return;
        }
        match b.picker_target {
            PickerTarget::Filter => {
                b.filter_labels.insert(key, option.display_label);
            }
            PickerTarget::Form => {
                if let Some(form) = b.dialog.form_mut() {
                    form.set_label(key, option.display_label);
                }
            }
        }
    }

    /// Clears the reference the picker is bound to and closes it.
    pub(in crate::tui_shell) fn picker_clear(&mut self) {
        let b = &mut self.browser;
        let key = b.picker_field;
        match b.picker_target {
            PickerTarget::Filter => {
                b.picker.clear(b.list.filters_mut());
                b.filter_labels.remove(key);
            }
            PickerTarget::Form => match b.dialog.form_mut() {
                Some(form) => b.picker.clear(form),
                None => b.picker.close(),
            },
        }
    }
}

struct ToggleTarget {
    kind: ResourceKind,
    id: EntityId,
    field: &'static str,
    next: bool,
    tab: Option<&'static str>,
}

fn toggle_target(b: &Browser) -> Result<Option<ToggleTarget>, String> {
    if b.focus == Focus::Detail
        && let Some((tab, kind, id)) = b.selected_tab_row()
        && let Some(field) = kind.status_toggle()
    {
        let current = b
            .detail
            .tab(tab)
            .and_then(|t| t.records().get(b.tab_selected))
            .and_then(|r| r.flag(field));
        return Ok(Some(ToggleTarget {
            kind,
            id,
            field,
            next: !current.unwrap_or(false),
            tab: Some(tab),
        }));
    }
    let kind = b.kind;
    let Some(field) = kind.status_toggle() else {
        return Err(format!("{} has no status toggle", kind.title()));
    };
    let Some(record) = b.focused_record() else {
        return Ok(None);
    };
    let Some(id) = record.id() else {
        return Ok(None);
    };
    Ok(Some(ToggleTarget {
        kind,
        id,
        field,
        next: !record.flag(field).unwrap_or(false),
        tab: None,
    }))
}

fn load_form_input(b: &mut Browser) {
    let text = b
        .dialog
        .form()
        .editable()
        .get(b.form_field)
        .map(|spec| b.dialog.form().value(spec.key).to_string())
        .unwrap_or_default();
    b.form_input = Input::with_text(text);
}

#[cfg(test)]
#[path = "../../tests/tui_shell/actions_tests.rs"]
mod tests;
