use serde_json::{Map, Value};

use crate::model::{Entity, EntityId, Patchable, TabSpec};

use super::{DetailPanel, ListController, ListFetch, PrimaryFetch, TabFetch};

/// How a dialog's success is reflected back into the views that own it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshPolicy {
    /// List-level mutation: refetch the owning list.
    RefetchList,
    /// In-panel mutation of a tab record: local patch only.
    PatchTab(&'static str),
    /// In-panel mutation of a tab record that also changes what the outer
    /// list shows.
    PatchTabAndList(&'static str),
    /// Mutation of the open entity itself.
    PatchPrimaryAndList,
    /// Creates a record shown in a tab (e.g. an invited member).
    InsertIntoTab(&'static str),
    /// Creates a tab record that the outer list counts.
    InsertIntoTabAndList(&'static str),
}

#[derive(Clone, Debug, PartialEq)]
pub enum RecordPatch {
    MergeTab {
        tab: &'static str,
        id: EntityId,
        fields: Map<String, Value>,
    },
    RemoveTab {
        tab: &'static str,
        id: EntityId,
    },
    InsertTab {
        tab: &'static str,
        fields: Map<String, Value>,
    },
    /// Used when a tab mutation did not echo an id to patch with.
    ReloadTab {
        tab: &'static str,
    },
    MergePrimary {
        fields: Map<String, Value>,
    },
    /// The open entity is gone.
    ClosePanel,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SuccessEffect {
    RefetchList,
    PatchDetail(RecordPatch),
    ReloadPrimary,
    /// Ambiguous scope: patch the panel and refetch the list.
    PatchAndRefetch(RecordPatch),
}

impl RefreshPolicy {
    /// Policy for changing or removing a row of `tab`.
    pub fn for_tab(tab: &TabSpec) -> Self {
        if tab.feeds_list {
            RefreshPolicy::PatchTabAndList(tab.key)
        } else {
            RefreshPolicy::PatchTab(tab.key)
        }
    }

    /// Policy for creating a row of `tab`.
    pub fn insert_into(tab: &TabSpec) -> Self {
        if tab.feeds_list {
            RefreshPolicy::InsertIntoTabAndList(tab.key)
        } else {
            RefreshPolicy::InsertIntoTab(tab.key)
        }
    }

    pub(super) fn effect(
        self,
        id: Option<EntityId>,
        fields: Map<String, Value>,
        removes: bool,
    ) -> SuccessEffect {
        match (self, id) {
            (RefreshPolicy::RefetchList, _) => SuccessEffect::RefetchList,
            (RefreshPolicy::PatchTab(tab), id) => {
                SuccessEffect::PatchDetail(tab_patch(tab, id, fields, removes))
            }
            (RefreshPolicy::PatchTabAndList(tab), id) => {
                SuccessEffect::PatchAndRefetch(tab_patch(tab, id, fields, removes))
            }
            (RefreshPolicy::PatchPrimaryAndList, _) if removes => {
                SuccessEffect::PatchAndRefetch(RecordPatch::ClosePanel)
            }
            (RefreshPolicy::PatchPrimaryAndList, _) => {
                SuccessEffect::PatchAndRefetch(RecordPatch::MergePrimary { fields })
            }
            (RefreshPolicy::InsertIntoTab(tab), _) => {
                SuccessEffect::PatchDetail(insert_patch(tab, fields))
            }
            (RefreshPolicy::InsertIntoTabAndList(tab), _) => {
                SuccessEffect::PatchAndRefetch(insert_patch(tab, fields))
            }
        }
    }
}

fn tab_patch(
    tab: &'static str,
    id: Option<EntityId>,
    fields: Map<String, Value>,
    removes: bool,
) -> RecordPatch {
    match id {
        Some(id) if removes => RecordPatch::RemoveTab { tab, id },
        Some(id) => RecordPatch::MergeTab { tab, id, fields },
        None => RecordPatch::ReloadTab { tab },
    }
}

fn insert_patch(tab: &'static str, fields: Map<String, Value>) -> RecordPatch {
    if fields.is_empty() {
        RecordPatch::ReloadTab { tab }
    } else {
        RecordPatch::InsertTab { tab, fields }
    }
}

/// Requests produced while applying an effect; the caller dispatches them.
#[derive(Debug, Default)]
pub struct EffectFetches {
    pub list: Option<ListFetch>,
    pub primary: Option<PrimaryFetch>,
    pub tab: Option<TabFetch>,
}

/// Effect of a successful upload: the primary entity is refetched.
pub fn upload_effect() -> SuccessEffect {
    SuccessEffect::ReloadPrimary
}

/// Applies a dialog's success to the owning list and detail panel.
pub fn apply_effect<L, T, U>(
    effect: &SuccessEffect,
    list: Option<&mut ListController<L>>,
    detail: Option<&mut DetailPanel<T, U>>,
) -> EffectFetches
where
    T: Patchable,
    U: Entity + Patchable + From<Map<String, Value>>,
{
    let mut out = EffectFetches::default();
    match effect {
        SuccessEffect::RefetchList => {
            out.list = list.map(ListController::refresh);
        }
        SuccessEffect::ReloadPrimary => {
            out.primary = detail.and_then(DetailPanel::reload_primary);
        }
        SuccessEffect::PatchDetail(patch) => {
            if let Some(detail) = detail {
                out.tab = detail.apply_patch(patch);
            }
        }
        SuccessEffect::PatchAndRefetch(patch) => {
            if let Some(detail) = detail {
                out.tab = detail.apply_patch(patch);
            }
            out.list = list.map(ListController::refresh);
        }
    }
    out
}

impl<T, U> DetailPanel<T, U>
where
    T: Patchable,
    U: Entity + Patchable + From<Map<String, Value>>,
{
    /// Applies a local patch; returns a tab fetch only for `ReloadTab`.
    pub fn apply_patch(&mut self, patch: &RecordPatch) -> Option<TabFetch> {
        match patch {
            RecordPatch::MergeTab { tab, id, fields } => {
                if !self.merge_tab_record(tab, *id, fields) {
                    tracing::debug!(tab, %id, "patched record not on the visible tab page");
                }
                None
            }
            RecordPatch::RemoveTab { tab, id } => {
                self.remove_tab_record(tab, *id);
                None
            }
            RecordPatch::InsertTab { tab, fields } => {
                self.insert_tab_record(tab, U::from(fields.clone()));
                None
            }
            RecordPatch::ReloadTab { tab } => self.reload_tab(tab),
            RecordPatch::MergePrimary { fields } => {
                self.patch_primary(|p| p.merge_fields(fields));
                None
            }
            RecordPatch::ClosePanel => {
                self.close();
                None
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/browser/effects_tests.rs"]
mod tests;
