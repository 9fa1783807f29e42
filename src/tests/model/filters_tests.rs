use super::*;

#[test]
fn parse_treats_empty_and_sentinel_as_unset() {
    assert_eq!(FilterValue::parse(""), FilterValue::Unset);
    assert_eq!(FilterValue::parse("  "), FilterValue::Unset);
    assert_eq!(FilterValue::parse("unset"), FilterValue::Unset);
    assert_eq!(FilterValue::parse("UNSET"), FilterValue::Unset);
}

#[test]
fn parse_keeps_falsy_values_distinct_from_unset() {
    assert_eq!(FilterValue::parse("false"), FilterValue::Flag(false));
    assert_eq!(FilterValue::parse("0"), FilterValue::Number(0));
    assert!(!FilterValue::Flag(false).is_unset());
    assert!(!FilterValue::Number(0).is_unset());
}

#[test]
fn parse_falls_back_to_text() {
    assert_eq!(FilterValue::parse("paid"), FilterValue::Text("paid".to_string()));
    assert_eq!(FilterValue::parse(" 12 "), FilterValue::Number(12));
}

#[test]
fn blank_text_counts_as_unset() {
    assert!(FilterValue::Text("   ".to_string()).is_unset());
    assert_eq!(FilterValue::Choice(String::new()).to_query_value(), None);
}

#[test]
fn effective_omits_unset_slots() {
    let mut f = FilterSet::with_keys(["status", "teamId", "keyword"]);
    f.set("teamId", FilterValue::Id(EntityId(42)));
    let eff = f.effective();
    assert_eq!(eff.len(), 1);
    assert_eq!(eff.get("teamId").map(String::as_str), Some("42"));
    assert!(!eff.values().any(|v| v == UNSET_SENTINEL));
}

#[test]
fn effective_sends_false_flags() {
    let f: FilterSet = [("active", FilterValue::Flag(false))].into_iter().collect();
    assert_eq!(f.effective().get("active").map(String::as_str), Some("false"));
}

#[test]
fn clear_keeps_keys_and_unsets_values() {
    let mut f = FilterSet::with_keys(["status", "teamId"]);
    f.set("status", FilterValue::Choice("paid".to_string()));
    f.set("teamId", FilterValue::Id(EntityId(7)));
    f.clear();
    assert!(f.is_clear());
    assert_eq!(f.iter().count(), 2);
    assert!(f.effective().is_empty());

    let once = f.clone();
    f.clear();
    assert_eq!(f, once);
}

#[test]
fn missing_key_reads_unset() {
    let f = FilterSet::new();
    assert_eq!(f.get("anything"), &FilterValue::Unset);
}

#[test]
fn unset_only_touches_known_keys() {
    let mut f = FilterSet::with_keys(["status"]);
    f.set("status", FilterValue::Text("paid".to_string()));
    f.unset("status");
    f.unset("other");
    assert_eq!(f.iter().count(), 1);
    assert!(f.is_clear());
}

#[test]
fn display_renders_sentinel_for_unset() {
    assert_eq!(FilterValue::Unset.to_string(), "unset");
    assert_eq!(FilterValue::Id(EntityId(3)).to_string(), "3");
}

#[test]
fn parse_filter_arg_splits_on_first_equals() {
    let (k, v) = parse_filter_arg("keyword=a=b").unwrap();
    assert_eq!(k, "keyword");
    assert_eq!(v, FilterValue::Text("a=b".to_string()));

    let (k, v) = parse_filter_arg("status=unset").unwrap();
    assert_eq!(k, "status");
    assert_eq!(v, FilterValue::Unset);
}

#[test]
fn parse_filter_arg_rejects_malformed_input() {
    assert!(parse_filter_arg("status").is_err());
    assert!(parse_filter_arg("=paid").is_err());
}
