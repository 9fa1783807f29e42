use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use crate::gateway::{GatewayError, ListQuery};
use crate::model::{
    EntityId, FilterSet, FilterValue, KEYWORD_FILTER, PageRequest, PageResult, ReferenceOption,
    Referenceable, ResourceKind,
};

use super::{Commit, FetchSeq, Ticket};

/// Keystroke-to-fetch delay.
pub const DEBOUNCE: Duration = Duration::from_millis(300);

/// Where a picker writes the id it resolves: a filter slot or a form field.
pub trait ReferenceOwner {
    fn set_reference(&mut self, key: &str, id: Option<EntityId>);
}

impl ReferenceOwner for FilterSet {
    fn set_reference(&mut self, key: &str, id: Option<EntityId>) {
        match id {
            Some(id) => self.set(key, FilterValue::Id(id)),
            None => self.set(key, FilterValue::Unset),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SearchState {
    #[default]
    Idle,
    Loading,
    Results(Vec<ReferenceOption>),
    /// The search finished and matched nothing (distinct from loading).
    NotFound,
    Failed(String),
}

/// A picker search issued against the gateway.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PickerFetch {
    pub ticket: Ticket,
    pub query: ListQuery,
}

#[derive(Clone, Debug)]
struct PendingKeyword {
    keyword: String,
    due: Instant,
}

type Exclusion<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;

/// Debounced single-select search resolving a foreign entity to an id.
///
/// Closed/Unselected -> open -> Open (unfiltered first page) -> typing
/// (debounced) -> results -> select -> Closed/Selected. Only the page for
/// the latest issued search is ever shown.
pub struct ReferencePicker<T> {
    kind: ResourceKind,
    owner_key: String,
    page_size: u32,
    open: bool,
    keyword: String,
    pending: Option<PendingKeyword>,
    search: SearchState,
    selected: Option<ReferenceOption>,
    seq: FetchSeq,
    exclude: Option<Exclusion<T>>,
}

impl<T> std::fmt::Debug for ReferencePicker<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReferencePicker")
            .field("kind", &self.kind)
            .field("owner_key", &self.owner_key)
            .field("open", &self.open)
            .field("keyword", &self.keyword)
            .field("search", &self.search)
            .field("selected", &self.selected)
            .finish_non_exhaustive()
    }
}

impl<T> ReferencePicker<T> {
    pub fn new(kind: ResourceKind, owner_key: impl Into<String>, page_size: u32) -> Self {
        Self {
            kind,
            owner_key: owner_key.into(),
            page_size: page_size.max(1),
            open: false,
            keyword: String::new(),
            pending: None,
            search: SearchState::Idle,
            selected: None,
            seq: FetchSeq::default(),
            exclude: None,
        }
    }

    /// Client-side exclusion applied to every fetched page before it is
    /// shown; never sent to the gateway.
    pub fn with_exclusion(mut self, exclude: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        self.exclude = Some(Box::new(exclude));
        self
    }

    pub fn set_exclusion(&mut self, exclude: impl Fn(&T) -> bool + Send + Sync + 'static) {
        self.exclude = Some(Box::new(exclude));
    }

    /// Starts from an already resolved value (e.g. an edit form).
    pub fn with_selected(mut self, selected: Option<ReferenceOption>) -> Self {
        self.selected = selected;
        self
    }

    /// Reuses the picker for another reference slot, dropping selection,
    /// exclusion and anything in flight.
    pub fn retarget(&mut self, kind: ResourceKind, owner_key: impl Into<String>) {
        self.close();
        self.kind = kind;
        self.owner_key = owner_key.into();
        self.selected = None;
        self.exclude = None;
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn owner_key(&self) -> &str {
        &self.owner_key
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    pub fn search_state(&self) -> &SearchState {
        &self.search
    }

    pub fn selected(&self) -> Option<&ReferenceOption> {
        self.selected.as_ref()
    }

    pub fn options(&self) -> &[ReferenceOption] {
        match &self.search {
            SearchState::Results(opts) => opts,
            _ => &[],
        }
    }

    /// True while a keystroke is waiting out the debounce window.
    pub fn is_debouncing(&self) -> bool {
        self.pending.is_some()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.due)
    }

    /// Opens the dropdown and fetches the first unfiltered page.
    pub fn open(&mut self) -> PickerFetch {
        self.open = true;
        self.keyword.clear();
        self.pending = None;
        self.issue(String::new())
    }

    /// Records a keystroke. The fetch happens in [`poll`](Self::poll) once
    /// the keyword has been stable for [`DEBOUNCE`]; every keystroke restarts
    /// the window.
    pub fn input(&mut self, keyword: impl Into<String>, now: Instant) {
        if !self.open {
            return;
        }
        let keyword = keyword.into();
        self.keyword = keyword.clone();
        self.pending = Some(PendingKeyword {
            keyword,
            due: now + DEBOUNCE,
        });
    }

    /// Clears the typed text only; the owner's id is untouched. An empty
    /// keyword goes back to the unfiltered first page.
    pub fn clear_keyword(&mut self, now: Instant) {
        self.input(String::new(), now);
    }

    /// Issues the debounced search if its window has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<PickerFetch> {
        if !self.open {
            return None;
        }
        let due = self.pending.as_ref()?.due;
        if now < due {
            return None;
        }
        let pending = self.pending.take()?;
        Some(self.issue(pending.keyword))
    }

    fn issue(&mut self, keyword: String) -> PickerFetch {
        let ticket = self.seq.issue();
        self.search = SearchState::Loading;
        let mut filters = BTreeMap::new();
        let trimmed = keyword.trim();
        if !trimmed.is_empty() {
            filters.insert(KEYWORD_FILTER.to_string(), trimmed.to_string());
        }
        tracing::debug!(
            kind = %self.kind,
            seq = ticket.seq(),
            keyword = %trimmed,
            "picker search issued"
        );
        PickerFetch {
            ticket,
            query: ListQuery::new(self.kind, filters, PageRequest::first(self.page_size)),
        }
    }

    /// Writes `id` to the owner, closes and clears the keyword. Only ids
    /// present in the current results can be selected.
    pub fn select(&mut self, id: EntityId, owner: &mut impl ReferenceOwner) -> bool {
        let Some(option) = self.options().iter().find(|o| o.id == id).cloned() else {
            return false;
        };
        owner.set_reference(&self.owner_key, Some(id));
        self.selected = Some(option);
        self.close();
        true
    }

    /// Back to Closed/Unselected, clearing the owner's id.
    pub fn clear(&mut self, owner: &mut impl ReferenceOwner) {
        owner.set_reference(&self.owner_key, None);
        self.selected = None;
        self.close();
    }

    /// Closes without changing the selection. Pending keystrokes are dropped
    /// and any in-flight search is suppressed.
    pub fn close(&mut self) {
        self.open = false;
        self.keyword.clear();
        self.pending = None;
        self.search = SearchState::Idle;
        self.seq.invalidate();
    }
}

impl<T: Referenceable> ReferencePicker<T> {
    pub fn commit(
        &mut self,
        ticket: Ticket,
        result: Result<PageResult<T>, GatewayError>,
    ) -> Commit {
        if !self.open || !self.seq.is_current(ticket) {
            tracing::debug!(
                kind = %self.kind,
                seq = ticket.seq(),
                "dropping stale picker response"
            );
            return Commit::Stale;
        }
        match result {
            Ok(page) => {
                let options: Vec<ReferenceOption> = page
                    .records
                    .iter()
                    .filter(|r| !self.exclude.as_ref().is_some_and(|ex| ex(r)))
                    .filter_map(Referenceable::to_option)
                    .collect();
                self.search = if options.is_empty() {
                    SearchState::NotFound
                } else {
                    SearchState::Results(options)
                };
                Commit::Applied
            }
            Err(err) => {
                tracing::warn!(kind = %self.kind, error = %err, "picker search failed");
                self.search = SearchState::Failed(err.to_string());
                Commit::Failed
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/browser/picker_tests.rs"]
mod tests;
