use std::collections::BTreeMap;

use crate::gateway::{GatewayError, ListQuery};
use crate::model::{
    EntityId, PageRequest, PageResult, ReferenceOption, Referenceable, ResourceKind,
};

use super::{Commit, FetchSeq, ListFetch, LoadPhase, Ticket};

/// Upper bound fetched for small closed sets such as admin roles.
pub const LOOKUP_PAGE_SIZE: u32 = 200;

/// A small reference list loaded once when a view mounts and owned by that
/// view. Share it by passing it down, not through a global.
#[derive(Debug)]
pub struct CachedLookup<T> {
    kind: ResourceKind,
    entries: Vec<T>,
    phase: LoadPhase,
    seq: FetchSeq,
}

impl<T> CachedLookup<T> {
    pub fn new(kind: ResourceKind) -> Self {
        Self {
            kind,
            entries: Vec::new(),
            phase: LoadPhase::Idle,
            seq: FetchSeq::default(),
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn phase(&self) -> &LoadPhase {
        &self.phase
    }

    pub fn entries(&self) -> &[T] {
        &self.entries
    }

    /// Issues the load unless it already succeeded or is in flight. A
    /// failed load is retried on the next mount.
    pub fn load(&mut self) -> Option<ListFetch> {
        if matches!(self.phase, LoadPhase::Loaded | LoadPhase::Loading) {
            return None;
        }
        self.phase = LoadPhase::Loading;
        Some(ListFetch {
            ticket: self.seq.issue(),
            query: ListQuery::new(self.kind, BTreeMap::new(), PageRequest::first(LOOKUP_PAGE_SIZE)),
        })
    }

    pub fn commit(
        &mut self,
        ticket: Ticket,
        result: Result<PageResult<T>, GatewayError>,
    ) -> Commit {
        if !self.seq.is_current(ticket) {
            return Commit::Stale;
        }
        match result {
            Ok(page) => {
                self.entries = page.records;
                self.phase = LoadPhase::Loaded;
                Commit::Applied
            }
            Err(err) => {
                tracing::warn!(kind = %self.kind, error = %err, "lookup load failed");
                self.phase = LoadPhase::Failed(err.to_string());
                Commit::Failed
            }
        }
    }
}

impl<T: Referenceable> CachedLookup<T> {
    pub fn find(&self, id: EntityId) -> Option<&T> {
        self.entries.iter().find(|e| e.entity_id() == Some(id))
    }

    pub fn options(&self) -> Vec<ReferenceOption> {
        self.entries.iter().filter_map(Referenceable::to_option).collect()
    }

    pub fn label(&self, id: EntityId) -> Option<String> {
        self.find(id)
            .and_then(Referenceable::to_option)
            .map(|o| o.display_label)
    }
}

#[cfg(test)]
#[path = "../tests/browser/lookup_tests.rs"]
mod tests;
