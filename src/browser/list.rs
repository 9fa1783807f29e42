use crate::gateway::{GatewayError, ListQuery};
use crate::model::{
    Entity, EntityId, FilterSet, FilterValue, PageRequest, PageResult, Patchable, ResourceKind,
};

use super::{Commit, FetchSeq, LoadPhase, Ticket};

/// A list request issued by a [`ListController`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListFetch {
    pub ticket: Ticket,
    pub query: ListQuery,
}

/// Paginated, filterable list over one resource.
///
/// Filter edits are local until `search`/`reset`; those go back to page 1.
/// Raw page or page-size changes keep the filters and the requested page.
/// The query is captured when the fetch is issued, so a fetch issued right
/// after `reset` always carries the cleared filters.
#[derive(Debug)]
pub struct ListController<T> {
    kind: ResourceKind,
    filters: FilterSet,
    page: PageRequest,
    records: Vec<T>,
    total: u64,
    phase: LoadPhase,
    seq: FetchSeq,
}

impl<T> ListController<T> {
    /// Filter keys come from the resource catalog, all starting unset.
    pub fn new(kind: ResourceKind, page_size: u32) -> Self {
        let filters = FilterSet::with_keys(kind.filters().iter().map(|f| f.key));
        Self::with_filters(kind, filters, page_size)
    }

    pub fn with_filters(kind: ResourceKind, filters: FilterSet, page_size: u32) -> Self {
        Self {
            kind,
            filters,
            page: PageRequest::first(page_size),
            records: Vec::new(),
            total: 0,
            phase: LoadPhase::Idle,
            seq: FetchSeq::default(),
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    /// Direct access for pickers writing a resolved id into a filter slot.
    pub fn filters_mut(&mut self) -> &mut FilterSet {
        &mut self.filters
    }

    /// Edits one filter slot without fetching.
    pub fn set_filter(&mut self, key: impl Into<String>, value: FilterValue) {
        self.filters.set(key, value);
    }

    pub fn page(&self) -> PageRequest {
        self.page
    }

    pub fn records(&self) -> &[T] {
        &self.records
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn page_count(&self) -> u64 {
        self.page.page_count(self.total)
    }

    pub fn phase(&self) -> &LoadPhase {
        &self.phase
    }

    /// True while the most recently issued fetch is outstanding.
    pub fn is_loading(&self) -> bool {
        self.phase.is_loading()
    }

    /// Initial fetch when the view mounts.
    pub fn mount(&mut self) -> ListFetch {
        self.issue()
    }

    /// Commits the current filters and goes back to page 1.
    pub fn search(&mut self) -> ListFetch {
        self.page = self.page.with_page(1);
        self.issue()
    }

    /// Clears every filter to unset, goes back to page 1 and fetches.
    pub fn reset(&mut self) -> ListFetch {
        self.filters.clear();
        self.page = self.page.with_page(1);
        self.issue()
    }

    /// Pagination control: filters untouched, page kept as requested even
    /// when the page size changes.
    pub fn set_page(&mut self, page: u32, page_size: u32) -> ListFetch {
        self.page = PageRequest::new(page, page_size);
        self.issue()
    }

    /// Re-issues the current query unchanged, e.g. after a mutation.
    pub fn refresh(&mut self) -> ListFetch {
        self.issue()
    }

    fn issue(&mut self) -> ListFetch {
        let ticket = self.seq.issue();
        self.phase = LoadPhase::Loading;
        let query = ListQuery::new(self.kind, self.filters.effective(), self.page);
        tracing::debug!(
            kind = %self.kind,
            seq = ticket.seq(),
            ?query.filters,
            page = self.page.page(),
            "list fetch issued"
        );
        ListFetch { ticket, query }
    }

    /// Applies a response. Success replaces records and total together;
    /// failure keeps the previous page visible. Stale tickets are ignored.
    pub fn commit(
        &mut self,
        ticket: Ticket,
        result: Result<PageResult<T>, GatewayError>,
    ) -> Commit {
        if !self.seq.is_current(ticket) {
            tracing::debug!(kind = %self.kind, seq = ticket.seq(), "dropping stale list response");
            return Commit::Stale;
        }
        match result {
            Ok(page) => {
                self.records = page.records;
                self.total = page.total;
                self.phase = LoadPhase::Loaded;
                Commit::Applied
            }
            Err(err) => {
                tracing::warn!(kind = %self.kind, error = %err, "list fetch failed");
                self.phase = LoadPhase::Failed(err.to_string());
                Commit::Failed
            }
        }
    }
}

impl<T: Entity> ListController<T> {
    pub fn find(&self, id: EntityId) -> Option<&T> {
        self.records.iter().find(|r| r.entity_id() == Some(id))
    }

    /// Local patch of one visible row; returns false if it is not on this page.
    pub fn patch_record(&mut self, id: EntityId, f: impl FnOnce(&mut T)) -> bool {
        match self.records.iter_mut().find(|r| r.entity_id() == Some(id)) {
            Some(r) => {
                f(r);
                true
            }
            None => false,
        }
    }

    pub fn remove_record(&mut self, id: EntityId) -> bool {
        let before = self.records.len();
        self.records.retain(|r| r.entity_id() != Some(id));
        let removed = self.records.len() != before;
        if removed {
            self.total = self.total.saturating_sub(1);
        }
        removed
    }
}

impl<T: Entity + Patchable> ListController<T> {
    pub fn merge_record(
        &mut self,
        id: EntityId,
        fields: &serde_json::Map<String, serde_json::Value>,
    ) -> bool {
        self.patch_record(id, |r| r.merge_fields(fields))
    }
}

#[cfg(test)]
#[path = "../tests/browser/list_tests.rs"]
mod tests;
