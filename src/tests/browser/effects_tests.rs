use serde_json::json;

use super::*;
use crate::gateway::GatewayError;
use crate::model::{PageResult, Record, ResourceKind};

fn rec(v: Value) -> Record {
    serde_json::from_value(v).unwrap()
}

fn fields(v: Value) -> Map<String, Value> {
    v.as_object().cloned().unwrap_or_default()
}

fn loaded_team_panel() -> DetailPanel<Record> {
    let mut panel = DetailPanel::new(ResourceKind::Teams);
    let primary = panel.open(EntityId(42));
    panel.commit_primary(&primary, Ok(rec(json!({"id": 42, "name": "Core"}))));
    let members = panel.activate_tab("members").unwrap();
    let page: Result<PageResult<Record>, GatewayError> = Ok(PageResult {
        records: vec![
            rec(json!({"id": 1, "role": "member"})),
            rec(json!({"id": 2, "role": "member"})),
        ],
        total: 2,
    });
    panel.commit_tab(&members, page);
    panel
}

#[test]
fn policies_map_to_effects() {
    let f = fields(json!({"role": "admin"}));
    assert_eq!(
        RefreshPolicy::RefetchList.effect(Some(EntityId(1)), f.clone(), false),
        SuccessEffect::RefetchList
    );
    assert_eq!(
        RefreshPolicy::PatchTab("members").effect(None, f.clone(), false),
        SuccessEffect::PatchDetail(RecordPatch::ReloadTab { tab: "members" })
    );
    assert_eq!(
        RefreshPolicy::PatchTabAndList("members").effect(Some(EntityId(1)), f.clone(), true),
        SuccessEffect::PatchAndRefetch(RecordPatch::RemoveTab {
            tab: "members",
            id: EntityId(1),
        })
    );
    assert_eq!(
        RefreshPolicy::InsertIntoTab("members").effect(None, Map::new(), false),
        SuccessEffect::PatchDetail(RecordPatch::ReloadTab { tab: "members" })
    );
}

#[test]
fn tabs_counted_by_the_parent_list_also_refetch_it() {
    let members = ResourceKind::Teams.tab("members").unwrap();
    let grants = ResourceKind::Teams.tab("grants").unwrap();
    assert_eq!(RefreshPolicy::for_tab(members), RefreshPolicy::PatchTabAndList("members"));
    assert_eq!(RefreshPolicy::for_tab(grants), RefreshPolicy::PatchTab("grants"));
    assert_eq!(
        RefreshPolicy::insert_into(members),
        RefreshPolicy::InsertIntoTabAndList("members")
    );
    assert_eq!(RefreshPolicy::insert_into(grants), RefreshPolicy::InsertIntoTab("grants"));

    let f = fields(json!({"id": 9, "role": "member"}));
    assert_eq!(
        RefreshPolicy::InsertIntoTabAndList("members").effect(Some(EntityId(9)), f.clone(), false),
        SuccessEffect::PatchAndRefetch(RecordPatch::InsertTab { tab: "members", fields: f })
    );
}

#[test]
fn counted_insert_patches_the_tab_and_refetches_the_list() {
    let mut list: ListController<Record> = ListController::new(ResourceKind::Teams, 20);
    let mut panel = loaded_team_panel();
    let effect = RefreshPolicy::InsertIntoTabAndList("members").effect(
        Some(EntityId(9)),
        fields(json!({"id": 9, "role": "member"})),
        false,
    );
    let out = apply_effect(&effect, Some(&mut list), Some(&mut panel));
    assert!(out.list.is_some());
    assert!(out.tab.is_none());
    assert_eq!(panel.tab("members").map(|t| t.total()), Some(3));
}

#[test]
fn refetch_list_leaves_detail_alone() {
    let mut list: ListController<Record> = ListController::new(ResourceKind::Teams, 20);
    let mut panel = loaded_team_panel();
    let out = apply_effect(&SuccessEffect::RefetchList, Some(&mut list), Some(&mut panel));
    assert!(out.list.is_some());
    assert!(out.primary.is_none() && out.tab.is_none());
    assert_eq!(panel.tab("members").map(|t| t.records().len()), Some(2));
}

#[test]
fn tab_patch_touches_one_record_without_fetching() {
    let mut panel = loaded_team_panel();
    let effect = SuccessEffect::PatchDetail(RecordPatch::MergeTab {
        tab: "members",
        id: EntityId(2),
        fields: fields(json!({"role": "admin"})),
    });
    let out = apply_effect::<Record, _, _>(&effect, None, Some(&mut panel));
    assert!(out.list.is_none() && out.tab.is_none() && out.primary.is_none());
    let tab = panel.tab("members").unwrap();
    assert_eq!(tab.records()[1].text("role"), "admin");
    assert_eq!(tab.records()[0].text("role"), "member");
}

#[test]
fn insert_prepends_to_tab() {
    let mut panel = loaded_team_panel();
    let effect = SuccessEffect::PatchDetail(RecordPatch::InsertTab {
        tab: "members",
        fields: fields(json!({"id": 7, "role": "member"})),
    });
    apply_effect::<Record, _, _>(&effect, None, Some(&mut panel));
    let tab = panel.tab("members").unwrap();
    assert_eq!(tab.total(), 3);
    assert_eq!(tab.records()[0].id(), Some(EntityId(7)));
}

#[test]
fn primary_patch_also_refetches_list() {
    let mut list: ListController<Record> = ListController::new(ResourceKind::Teams, 20);
    let mut panel = loaded_team_panel();
    let effect = SuccessEffect::PatchAndRefetch(RecordPatch::MergePrimary {
        fields: fields(json!({"name": "Core Team"})),
    });
    let out = apply_effect(&effect, Some(&mut list), Some(&mut panel));
    assert!(out.list.is_some());
    assert_eq!(panel.primary().map(Record::label).as_deref(), Some("Core Team"));
}

#[test]
fn close_panel_discards_session() {
    let mut list: ListController<Record> = ListController::new(ResourceKind::Teams, 20);
    let mut panel = loaded_team_panel();
    let effect = SuccessEffect::PatchAndRefetch(RecordPatch::ClosePanel);
    apply_effect(&effect, Some(&mut list), Some(&mut panel));
    assert!(!panel.is_open());
}

#[test]
fn upload_reloads_primary() {
    let mut panel = loaded_team_panel();
    let out = apply_effect::<Record, _, _>(&upload_effect(), None, Some(&mut panel));
    let fetch = out.primary.expect("primary refetch");
    assert_eq!(fetch.id, EntityId(42));
    assert_eq!(panel.primary().map(Record::label).as_deref(), Some("Core"));
}
