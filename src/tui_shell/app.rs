use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use tokio::runtime::Handle;

use crate::browser::{
    ActionDialog, CachedLookup, ConfirmDialog, ConfirmPhase, DetailPanel, DialogPhase, Dispatcher,
    ListController, ReferencePicker, RefreshPolicy,
};
use crate::gateway::HttpGateway;
use crate::model::{AdminRole, ConsoleConfig, EntityId, FilterKind, Record, ResourceKind};

use super::{Input, RecordForm, now_ts};

mod actions;
mod event_loop;
pub(super) mod filter_bar;
mod keys;
mod render;
mod runtime;

pub(super) use runtime::run;

/// Poll interval of the terminal loop when no debounce deadline is closer.
const TICK: Duration = Duration::from_millis(50);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(in crate::tui_shell) enum Focus {
    List,
    Detail,
}

/// Where the shared picker writes the id it resolves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(in crate::tui_shell) enum PickerTarget {
    Filter,
    Form,
}

#[derive(Debug)]
pub(in crate::tui_shell) enum Overlay {
    None,
    Filters { field: usize, keyword: Input },
    Upload { path: Input },
    Help,
}

/// The topmost thing receiving keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(in crate::tui_shell) enum Layer {
    Main,
    Filters,
    Picker,
    Form,
    Confirm,
    Upload,
    Help,
}

#[derive(Clone, Debug)]
pub(in crate::tui_shell) struct StatusLine {
    pub(in crate::tui_shell) ts: String,
    pub(in crate::tui_shell) text: String,
    pub(in crate::tui_shell) error: bool,
}

/// State of one resource view. Everything the dispatcher's completions
/// touch lives here; a new resource gets a new `Browser`.
#[derive(Debug)]
pub(in crate::tui_shell) struct Browser {
    pub(in crate::tui_shell) kind: ResourceKind,
    pub(in crate::tui_shell) list: ListController<Record>,
    pub(in crate::tui_shell) selected: usize,
    pub(in crate::tui_shell) detail: DetailPanel<Record>,
    pub(in crate::tui_shell) focus: Focus,
    pub(in crate::tui_shell) tab_selected: usize,
    pub(in crate::tui_shell) roles: CachedLookup<AdminRole>,

    pub(in crate::tui_shell) picker: ReferencePicker<Record>,
    pub(in crate::tui_shell) picker_target: PickerTarget,
    pub(in crate::tui_shell) picker_field: &'static str,
    pub(in crate::tui_shell) picker_cursor: usize,
    /// Display labels for reference filters resolved through the picker.
    pub(in crate::tui_shell) filter_labels: BTreeMap<&'static str, String>,

    pub(in crate::tui_shell) dialog: ActionDialog<RecordForm>,
    pub(in crate::tui_shell) form_field: usize,
    pub(in crate::tui_shell) form_input: Input,
    pub(in crate::tui_shell) confirm: ConfirmDialog,

    pub(in crate::tui_shell) overlay: Overlay,
    pub(in crate::tui_shell) toggling: Option<EntityId>,
    pub(in crate::tui_shell) uploading: bool,
    pub(in crate::tui_shell) status: Option<StatusLine>,
}

impl Browser {
    pub(in crate::tui_shell) fn new(kind: ResourceKind, cfg: &ConsoleConfig) -> Self {
        Self {
            kind,
            list: ListController::new(kind, cfg.list.page_size),
            selected: 0,
            detail: DetailPanel::new(kind),
            focus: Focus::List,
            tab_selected: 0,
            roles: CachedLookup::new(ResourceKind::AdminRoles),
            picker: ReferencePicker::new(ResourceKind::Users, "", cfg.picker.page_size),
            picker_target: PickerTarget::Filter,
            picker_field: "",
            picker_cursor: 0,
            filter_labels: BTreeMap::new(),
            dialog: ActionDialog::new(kind, RecordForm::blank(kind), RefreshPolicy::RefetchList),
            form_field: 0,
            form_input: Input::default(),
            confirm: ConfirmDialog::new(kind, RefreshPolicy::RefetchList),
            overlay: Overlay::None,
            toggling: None,
            uploading: false,
            status: None,
        }
    }

    pub(in crate::tui_shell) fn layer(&self) -> Layer {
        if self.picker.is_open() {
            return Layer::Picker;
        }
        if self.dialog.is_open() {
            return Layer::Form;
        }
        if self.confirm.phase() != ConfirmPhase::Idle {
            return Layer::Confirm;
        }
        match self.overlay {
            Overlay::None => Layer::Main,
            Overlay::Filters { .. } => Layer::Filters,
            Overlay::Upload { .. } => Layer::Upload,
            Overlay::Help => Layer::Help,
        }
    }

    /// A mutation whose result must land in this view is still in flight.
    pub(in crate::tui_shell) fn mutation_in_flight(&self) -> bool {
        self.dialog.phase() == DialogPhase::Submitting
            || self.confirm.phase() == ConfirmPhase::Submitting
            || self.toggling.is_some()
            || self.uploading
    }

    pub(in crate::tui_shell) fn needs_roles(&self) -> bool {
        self.kind
            .filters()
            .iter()
            .any(|f| f.kind == FilterKind::Lookup(ResourceKind::AdminRoles))
    }

    pub(in crate::tui_shell) fn selected_record(&self) -> Option<&Record> {
        self.list.records().get(self.selected)
    }

    pub(in crate::tui_shell) fn selected_id(&self) -> Option<EntityId> {
        self.selected_record().and_then(Record::id)
    }

    /// The record the user is looking at: the open entity when the detail
    /// panel has focus, else the highlighted row.
    pub(in crate::tui_shell) fn focused_record(&self) -> Option<&Record> {
        match self.focus {
            Focus::Detail => self.detail.primary(),
            Focus::List => self.selected_record(),
        }
    }

    /// Highlighted row of the active tab: (tab key, its resource, row id).
    pub(in crate::tui_shell) fn selected_tab_row(
        &self,
    ) -> Option<(&'static str, ResourceKind, EntityId)> {
        let key = self.detail.active_tab()?;
        let spec = self.kind.tab(key)?;
        let row = self.detail.tab(key)?.records().get(self.tab_selected)?;
        Some((spec.key, spec.kind, row.id()?))
    }

    pub(in crate::tui_shell) fn move_selection(&mut self, delta: isize) {
        match self.focus {
            Focus::List => {
                self.selected = step(self.selected, delta, self.list.records().len());
            }
            Focus::Detail => {
                let len = self
                    .detail
                    .active_tab()
                    .and_then(|k| self.detail.tab(k))
                    .map(|t| t.records().len())
                    .unwrap_or(0);
                self.tab_selected = step(self.tab_selected, delta, len);
            }
        }
    }

    /// Keeps cursors inside what the last commit left behind.
    pub(in crate::tui_shell) fn clamp_selection(&mut self) {
        self.selected = self.selected.min(self.list.records().len().saturating_sub(1));
        if !self.detail.is_open() {
            self.focus = Focus::List;
            self.tab_selected = 0;
        }
    }

    pub(in crate::tui_shell) fn set_status(&mut self, text: impl Into<String>, error: bool) {
        self.status = Some(StatusLine {
            ts: now_ts(),
            text: text.into(),
            error,
        });
    }
}

fn step(cur: usize, delta: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    cur.saturating_add_signed(delta).min(len - 1)
}

pub(in crate::tui_shell) struct App {
    pub(in crate::tui_shell) browser: Browser,
    pub(in crate::tui_shell) dispatcher: Dispatcher<Browser>,
    pub(in crate::tui_shell) gateway: Arc<HttpGateway>,
    pub(in crate::tui_shell) handle: Handle,
    pub(in crate::tui_shell) config: ConsoleConfig,
    pub(in crate::tui_shell) quit: bool,
}

impl App {
    pub(in crate::tui_shell) fn new(
        handle: Handle,
        gateway: Arc<HttpGateway>,
        config: ConsoleConfig,
        kind: ResourceKind,
    ) -> Self {
        let mut app = Self {
            browser: Browser::new(kind, &config),
            dispatcher: Dispatcher::new(handle.clone()),
            gateway,
            handle,
            config,
            quit: false,
        };
        app.mount();
        app
    }

    fn mount(&mut self) {
        let fetch = self.browser.list.mount();
        self.dispatcher.list(&self.gateway, fetch, actions::list_of);
        if self.browser.needs_roles() {
            self.load_roles();
        }
    }

    /// Replaces the view. The old dispatcher goes with it, so responses
    /// still in flight for the previous resource are never applied.
    pub(in crate::tui_shell) fn switch_resource(&mut self, kind: ResourceKind) {
        if kind == self.browser.kind {
            return;
        }
        if self.browser.mutation_in_flight() {
            self.browser
                .set_status("wait for the pending change to finish", true);
            return;
        }
        tracing::debug!(from = %self.browser.kind, to = %kind, "switching resource view");
        self.browser = Browser::new(kind, &self.config);
        self.dispatcher = Dispatcher::new(self.handle.clone());
        self.mount();
    }

    /// Issues due debounced searches and applies arrived responses.
    pub(in crate::tui_shell) fn tick(&mut self, now: Instant) {
        if let Some(fetch) = self.browser.picker.poll(now) {
            self.dispatcher
                .picker(&self.gateway, fetch, actions::picker_of);
        }
        if self.dispatcher.drain(&mut self.browser) > 0 {
            self.browser.clamp_selection();
        }
    }

    pub(in crate::tui_shell) fn poll_timeout(&self, now: Instant) -> Duration {
        match self.browser.picker.next_deadline() {
            Some(due) => due.saturating_duration_since(now).min(TICK),
            None => TICK,
        }
    }
}

pub(in crate::tui_shell) fn build(handle: Handle, opts: crate::tui::TuiRunOptions) -> Result<App> {
    let gw_cfg = opts.config.require_gateway()?;
    let gateway = Arc::new(HttpGateway::from_config(gw_cfg)?);
    Ok(App::new(handle, gateway, opts.config, opts.resource))
}

#[cfg(test)]
#[path = "../tests/tui_shell/app_tests.rs"]
mod tests;
