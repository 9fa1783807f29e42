use std::collections::BTreeMap;

use crate::gateway::{GatewayError, ListQuery};
use crate::model::{
    Entity, EntityId, PageRequest, PageResult, Patchable, Record, ResourceKind, TabSpec,
};

use super::{Commit, FetchSeq, LoadPhase, Ticket};

/// Primary entity of an open panel. `NotFound` and `Failed` render as an
/// explicit empty state, never as a skeleton mixed with partial data.
#[derive(Clone, Debug, PartialEq)]
pub enum PrimaryState<T> {
    Loading,
    Loaded(T),
    NotFound,
    Failed(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrimaryFetch {
    pub session: u64,
    pub ticket: Ticket,
    pub kind: ResourceKind,
    pub id: EntityId,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TabFetch {
    pub session: u64,
    pub tab: &'static str,
    pub ticket: Ticket,
    pub query: ListQuery,
}

/// One lazily loaded secondary collection.
#[derive(Debug)]
pub struct TabState<U> {
    records: Vec<U>,
    total: u64,
    page: PageRequest,
    phase: LoadPhase,
    loaded_once: bool,
    loaded_page: Option<PageRequest>,
    in_flight: Option<PageRequest>,
    seq: FetchSeq,
}

impl<U> TabState<U> {
    fn new(page_size: u32) -> Self {
        Self {
            records: Vec::new(),
            total: 0,
            page: PageRequest::first(page_size),
            phase: LoadPhase::Idle,
            loaded_once: false,
            loaded_page: None,
            in_flight: None,
            seq: FetchSeq::default(),
        }
    }

    pub fn records(&self) -> &[U] {
        &self.records
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn page(&self) -> PageRequest {
        self.page
    }

    pub fn phase(&self) -> &LoadPhase {
        &self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase.is_loading()
    }

    pub fn loaded_once(&self) -> bool {
        self.loaded_once
    }

    fn needs_fetch(&self) -> bool {
        if self.in_flight == Some(self.page) {
            return false;
        }
        !self.loaded_once || self.loaded_page != Some(self.page)
    }
}

#[derive(Debug)]
struct Session<T, U> {
    id: EntityId,
    primary: PrimaryState<T>,
    primary_seq: FetchSeq,
    primary_in_flight: bool,
    active_tab: Option<&'static str>,
    tabs: BTreeMap<&'static str, TabState<U>>,
}

/// Detail panel for one resource: the primary entity loads eagerly on open,
/// each tab's collection loads on first activation and is cached for the
/// rest of the session. Closing discards everything; reopening starts from
/// empty tabs.
#[derive(Debug)]
pub struct DetailPanel<T, U = Record> {
    kind: ResourceKind,
    specs: &'static [TabSpec],
    session: u64,
    open: Option<Session<T, U>>,
}

impl<T, U> DetailPanel<T, U> {
    pub fn new(kind: ResourceKind) -> Self {
        Self::with_tabs(kind, kind.tabs())
    }

    pub fn with_tabs(kind: ResourceKind, specs: &'static [TabSpec]) -> Self {
        Self {
            kind,
            specs,
            session: 0,
            open: None,
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn tab_specs(&self) -> &'static [TabSpec] {
        self.specs
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    pub fn id(&self) -> Option<EntityId> {
        self.open.as_ref().map(|s| s.id)
    }

    pub fn primary_state(&self) -> Option<&PrimaryState<T>> {
        self.open.as_ref().map(|s| &s.primary)
    }

    pub fn primary(&self) -> Option<&T> {
        match self.primary_state()? {
            PrimaryState::Loaded(v) => Some(v),
            _ => None,
        }
    }

    /// True while the primary entity has a request outstanding.
    pub fn is_loading(&self) -> bool {
        self.open.as_ref().is_some_and(|s| s.primary_in_flight)
    }

    pub fn active_tab(&self) -> Option<&'static str> {
        self.open.as_ref().and_then(|s| s.active_tab)
    }

    /// State of a tab, `None` until it has been activated in this session.
    pub fn tab(&self, key: &str) -> Option<&TabState<U>> {
        self.open.as_ref().and_then(|s| s.tabs.get(key))
    }

    /// Starts a new session for `id` and issues the primary load.
    pub fn open(&mut self, id: EntityId) -> PrimaryFetch {
        self.session += 1;
        let mut session = Session {
            id,
            primary: PrimaryState::Loading,
            primary_seq: FetchSeq::default(),
            primary_in_flight: true,
            active_tab: None,
            tabs: BTreeMap::new(),
        };
        let ticket = session.primary_seq.issue();
        self.open = Some(session);
        tracing::debug!(kind = %self.kind, %id, session = self.session, "detail panel opened");
        PrimaryFetch {
            session: self.session,
            ticket,
            kind: self.kind,
            id,
        }
    }

    /// Discards the session; every outstanding response becomes stale.
    pub fn close(&mut self) {
        self.open = None;
        self.session += 1;
    }

    /// Refetches the primary entity (e.g. after an upload). What is shown
    /// stays until the new response arrives.
    pub fn reload_primary(&mut self) -> Option<PrimaryFetch> {
        let session_no = self.session;
        let kind = self.kind;
        let s = self.open.as_mut()?;
        let ticket = s.primary_seq.issue();
        s.primary_in_flight = true;
        Some(PrimaryFetch {
            session: session_no,
            ticket,
            kind,
            id: s.id,
        })
    }

    pub fn commit_primary(
        &mut self,
        fetch: &PrimaryFetch,
        result: Result<T, GatewayError>,
    ) -> Commit {
        let kind = self.kind;
        let Some(s) = self.current_session(fetch.session) else {
            tracing::debug!(%kind, id = %fetch.id, "dropping primary response for closed session");
            return Commit::Stale;
        };
        if !s.primary_seq.is_current(fetch.ticket) {
            tracing::debug!(%kind, id = %fetch.id, "dropping stale primary response");
            return Commit::Stale;
        }
        s.primary_in_flight = false;
        match result {
            Ok(v) => {
                s.primary = PrimaryState::Loaded(v);
                Commit::Applied
            }
            Err(GatewayError::NotFound) => {
                s.primary = PrimaryState::NotFound;
                Commit::Failed
            }
            Err(err) => {
                tracing::warn!(%kind, id = %fetch.id, error = %err, "primary load failed");
                if !matches!(s.primary, PrimaryState::Loaded(_)) {
                    s.primary = PrimaryState::Failed(err.to_string());
                }
                Commit::Failed
            }
        }
    }

    /// Makes `key` the active tab, fetching it only if it was never loaded
    /// or its pagination changed since the last load.
    pub fn activate_tab(&mut self, key: &str) -> Option<TabFetch> {
        let spec = self.spec(key)?;
        let s = self.open.as_mut()?;
        s.active_tab = Some(spec.key);
        self.maybe_fetch_tab(spec)
    }

    /// Pagination for one tab. Fetches immediately when the tab is active,
    /// otherwise on its next activation. Other tabs are untouched.
    pub fn set_tab_page(&mut self, key: &str, page: u32, page_size: u32) -> Option<TabFetch> {
        let spec = self.spec(key)?;
        let s = self.open.as_mut()?;
        let tab = s
            .tabs
            .entry(spec.key)
            .or_insert_with(|| TabState::new(spec.page_size));
        tab.page = PageRequest::new(page, page_size);
        if s.active_tab != Some(spec.key) {
            return None;
        }
        self.maybe_fetch_tab(spec)
    }

    /// Forces a refetch of the current page of a tab that was already
    /// activated in this session.
    pub fn reload_tab(&mut self, key: &str) -> Option<TabFetch> {
        let spec = self.spec(key)?;
        let s = self.open.as_mut()?;
        let tab = s.tabs.get_mut(spec.key)?;
        tab.in_flight = None;
        tab.loaded_page = None;
        self.maybe_fetch_tab(spec)
    }

    fn spec(&self, key: &str) -> Option<&'static TabSpec> {
        let found = self.specs.iter().find(|t| t.key == key);
        if found.is_none() {
            tracing::warn!(kind = %self.kind, tab = key, "unknown detail tab");
        }
        found
    }

    fn maybe_fetch_tab(&mut self, spec: &'static TabSpec) -> Option<TabFetch> {
        let session_no = self.session;
        let s = self.open.as_mut()?;
        let id = s.id;
        let tab = s
            .tabs
            .entry(spec.key)
            .or_insert_with(|| TabState::new(spec.page_size));
        if !tab.needs_fetch() {
            tracing::debug!(tab = spec.key, "tab already loaded; no fetch");
            return None;
        }
        let ticket = tab.seq.issue();
        tab.phase = LoadPhase::Loading;
        tab.in_flight = Some(tab.page);
        let mut filters = BTreeMap::new();
        filters.insert(spec.parent_key.to_string(), id.to_string());
        Some(TabFetch {
            session: session_no,
            tab: spec.key,
            ticket,
            query: ListQuery::new(spec.kind, filters, tab.page),
        })
    }

    pub fn commit_tab(
        &mut self,
        fetch: &TabFetch,
        result: Result<PageResult<U>, GatewayError>,
    ) -> Commit {
        let kind = self.kind;
        let Some(s) = self.current_session(fetch.session) else {
            return Commit::Stale;
        };
        let Some(tab) = s.tabs.get_mut(fetch.tab) else {
            return Commit::Stale;
        };
        if !tab.seq.is_current(fetch.ticket) {
            tracing::debug!(%kind, tab = fetch.tab, "dropping stale tab response");
            return Commit::Stale;
        }
        tab.in_flight = None;
        match result {
            Ok(page) => {
                tab.records = page.records;
                tab.total = page.total;
                tab.loaded_once = true;
                tab.loaded_page = Some(fetch.query.page);
                tab.phase = LoadPhase::Loaded;
                Commit::Applied
            }
            Err(err) => {
                tracing::warn!(%kind, tab = fetch.tab, error = %err, "tab load failed");
                tab.phase = LoadPhase::Failed(err.to_string());
                Commit::Failed
            }
        }
    }

    fn current_session(&mut self, session: u64) -> Option<&mut Session<T, U>> {
        if session != self.session {
            return None;
        }
        self.open.as_mut()
    }

    /// Local patch of the primary entity.
    pub fn patch_primary(&mut self, f: impl FnOnce(&mut T)) -> bool {
        match self.open.as_mut().map(|s| &mut s.primary) {
            Some(PrimaryState::Loaded(v)) => {
                f(v);
                true
            }
            _ => false,
        }
    }

    /// Prepends a record created in-panel (e.g. an invited member).
    pub fn insert_tab_record(&mut self, key: &str, record: U) -> bool {
        let Some(tab) = self.open.as_mut().and_then(|s| s.tabs.get_mut(key)) else {
            return false;
        };
        tab.records.insert(0, record);
        tab.total += 1;
        true
    }
}

impl<T, U: Entity> DetailPanel<T, U> {
    /// Local patch of one record in a tab; no refetch, so other tabs and the
    /// scroll position stay as they are.
    pub fn patch_tab_record(&mut self, key: &str, id: EntityId, f: impl FnOnce(&mut U)) -> bool {
        let Some(tab) = self.open.as_mut().and_then(|s| s.tabs.get_mut(key)) else {
            return false;
        };
        match tab.records.iter_mut().find(|r| r.entity_id() == Some(id)) {
            Some(r) => {
                f(r);
                true
            }
            None => false,
        }
    }

    pub fn remove_tab_record(&mut self, key: &str, id: EntityId) -> bool {
        let Some(tab) = self.open.as_mut().and_then(|s| s.tabs.get_mut(key)) else {
            return false;
        };
        let before = tab.records.len();
        tab.records.retain(|r| r.entity_id() != Some(id));
        let removed = tab.records.len() != before;
        if removed {
            tab.total = tab.total.saturating_sub(1);
        }
        removed
    }
}

impl<T, U: Entity + Patchable> DetailPanel<T, U> {
    pub fn merge_tab_record(
        &mut self,
        key: &str,
        id: EntityId,
        fields: &serde_json::Map<String, serde_json::Value>,
    ) -> bool {
        self.patch_tab_record(key, id, |r| r.merge_fields(fields))
    }
}

#[cfg(test)]
#[path = "../tests/browser/detail_tests.rs"]
mod tests;
