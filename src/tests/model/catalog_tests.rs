use super::*;

#[test]
fn path_segments_round_trip_through_from_str() {
    for kind in ResourceKind::ALL {
        assert_eq!(kind.as_str().parse::<ResourceKind>().unwrap(), kind);
    }
    assert_eq!("promo_codes".parse::<ResourceKind>().unwrap(), ResourceKind::PromoCodes);
    assert!("widgets".parse::<ResourceKind>().is_err());
}

#[test]
fn serde_name_matches_path_segment() {
    let v = serde_json::to_value(ResourceKind::AuditLogs).unwrap();
    assert_eq!(v, serde_json::json!("audit-logs"));
}

#[test]
fn every_browsable_resource_has_a_keyword_filter() {
    for kind in ResourceKind::BROWSABLE {
        let kw = kind.filter(KEYWORD_FILTER).expect("keyword filter");
        assert_eq!(kw.kind, FilterKind::Keyword);
    }
}

#[test]
fn orders_filter_on_team_and_user_references() {
    assert_eq!(
        ResourceKind::Orders.filter("teamId").map(|f| f.kind),
        Some(FilterKind::Reference(ResourceKind::Teams))
    );
    assert_eq!(
        ResourceKind::Orders.filter("userId").map(|f| f.kind),
        Some(FilterKind::Reference(ResourceKind::Users))
    );
}

#[test]
fn admin_roles_are_a_cached_lookup() {
    assert_eq!(
        ResourceKind::Admins.filter("roleId").map(|f| f.kind),
        Some(FilterKind::Lookup(ResourceKind::AdminRoles))
    );
}

#[test]
fn team_tabs_are_scoped_by_team_id() {
    let tabs = ResourceKind::Teams.tabs();
    let keys: Vec<_> = tabs.iter().map(|t| t.key).collect();
    assert_eq!(keys, ["members", "grants", "features", "logs"]);
    assert!(tabs.iter().all(|t| t.parent_key == "teamId"));
    assert_eq!(ResourceKind::Teams.tab("members").map(|t| t.kind), Some(ResourceKind::TeamMembers));
}

#[test]
fn tab_keys_are_unique_per_resource() {
    for kind in ResourceKind::ALL {
        let mut keys: Vec<_> = kind.tabs().iter().map(|t| t.key).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), kind.tabs().len(), "{kind}");
    }
}

#[test]
fn destructive_actions_know_whether_records_disappear() {
    assert!(DestructiveAction::Delete.removes_record());
    assert!(DestructiveAction::Revoke.removes_record());
    assert!(!DestructiveAction::Cancel.removes_record());
    assert!(!DestructiveAction::Suspend.removes_record());
    assert_eq!(ResourceKind::Orders.destructive_actions(), &[DestructiveAction::Cancel]);
    assert_eq!("REVOKE".parse::<DestructiveAction>().unwrap(), DestructiveAction::Revoke);
}

#[test]
fn invite_form_requires_team_and_user() {
    let required: Vec<_> = ResourceKind::TeamMembers
        .form_fields()
        .iter()
        .filter(|f| f.required)
        .map(|f| f.key)
        .collect();
    assert_eq!(required, ["teamId", "userId"]);
}
