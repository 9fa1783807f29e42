use std::time::{Duration, Instant};

use super::*;
use crate::model::{Team, User};

fn team(id: u64, name: &str) -> Team {
    Team {
        id: EntityId(id),
        name: name.to_string(),
        avatar_url: None,
        member_count: 1,
    }
}

fn teams(records: Vec<Team>) -> Result<PageResult<Team>, GatewayError> {
    let total = records.len() as u64;
    Ok(PageResult { records, total })
}

fn picker() -> ReferencePicker<Team> {
    ReferencePicker::new(ResourceKind::Teams, "teamId", 20)
}

#[test]
fn opening_fetches_unfiltered_first_page() {
    let mut p = picker();
    let fetch = p.open();
    assert!(p.is_open());
    assert!(fetch.query.filters.is_empty());
    assert_eq!(fetch.query.page, PageRequest::first(20));
    assert_eq!(p.search_state(), &SearchState::Loading);
}

#[test]
fn keystrokes_within_the_window_collapse_into_one_fetch() {
    let mut p = picker();
    let t0 = Instant::now();
    p.open();

    p.input("a", t0);
    p.input("ab", t0 + Duration::from_millis(100));
    p.input("abc", t0 + Duration::from_millis(200));

    assert!(p.poll(t0 + Duration::from_millis(300)).is_none());
    assert!(p.poll(t0 + Duration::from_millis(499)).is_none());
    let fetch = p.poll(t0 + Duration::from_millis(500)).expect("debounced fetch");
    assert_eq!(fetch.query.filter(KEYWORD_FILTER), Some("abc"));
    assert!(p.poll(t0 + Duration::from_millis(900)).is_none());
}

#[test]
fn only_latest_search_is_shown() {
    let mut p = picker();
    let t0 = Instant::now();
    let first = p.open();
    p.input("co", t0);
    let second = p.poll(t0 + DEBOUNCE).unwrap();

    assert_eq!(p.commit(second.ticket, teams(vec![team(1, "Core")])), Commit::Applied);
    assert_eq!(p.commit(first.ticket, teams(vec![team(2, "Other")])), Commit::Stale);
    assert_eq!(p.options().len(), 1);
    assert_eq!(p.options()[0].display_label, "Core");
}

#[test]
fn empty_results_are_not_found_not_loading() {
    let mut p = picker();
    let f = p.open();
    p.commit(f.ticket, teams(vec![]));
    assert_eq!(p.search_state(), &SearchState::NotFound);
}

#[test]
fn clearing_keyword_refetches_unfiltered() {
    let mut p = picker();
    let t0 = Instant::now();
    p.open();
    p.input("x", t0);
    p.poll(t0 + DEBOUNCE).unwrap();
    p.clear_keyword(t0 + Duration::from_secs(1));
    let fetch = p.poll(t0 + Duration::from_secs(2)).unwrap();
    assert!(fetch.query.filters.is_empty());
    assert_eq!(p.keyword(), "");
}

#[test]
fn select_writes_id_to_owner_and_closes() {
    let mut p = picker();
    let mut filters = FilterSet::with_keys(["teamId"]);
    let f = p.open();
    p.commit(f.ticket, teams(vec![team(42, "Core"), team(43, "Ops")]));

    assert!(p.select(EntityId(42), &mut filters));
    assert_eq!(filters.get("teamId"), &FilterValue::Id(EntityId(42)));
    assert!(!p.is_open());
    assert_eq!(p.keyword(), "");
    assert_eq!(p.selected().map(|o| o.display_label.as_str()), Some("Core"));
}

#[test]
fn select_rejects_ids_outside_results() {
    let mut p = picker();
    let mut filters = FilterSet::new();
    let f = p.open();
    p.commit(f.ticket, teams(vec![team(42, "Core")]));
    assert!(!p.select(EntityId(7), &mut filters));
    assert!(p.is_open());
    assert!(filters.effective().is_empty());
}

#[test]
fn clear_unsets_owner() {
    let mut p = picker();
    let mut filters = FilterSet::with_keys(["teamId"]);
    let f = p.open();
    p.commit(f.ticket, teams(vec![team(42, "Core")]));
    p.select(EntityId(42), &mut filters);

    p.clear(&mut filters);
    assert!(filters.get("teamId").is_unset());
    assert!(p.selected().is_none());
}

#[test]
fn responses_after_close_are_dropped() {
    let mut p = picker();
    let f = p.open();
    p.close();
    assert_eq!(p.commit(f.ticket, teams(vec![team(1, "Core")])), Commit::Stale);
    assert_eq!(p.search_state(), &SearchState::Idle);
}

#[test]
fn typing_while_closed_is_ignored() {
    let mut p = picker();
    let t0 = Instant::now();
    p.input("abc", t0);
    assert!(!p.is_debouncing());
    assert!(p.poll(t0 + DEBOUNCE).is_none());
}

#[test]
fn closing_drops_pending_keystrokes() {
    let mut p = picker();
    let t0 = Instant::now();
    p.open();
    p.input("abc", t0);
    assert_eq!(p.next_deadline(), Some(t0 + DEBOUNCE));
    p.close();
    assert!(p.next_deadline().is_none());
}

#[test]
fn exclusion_filters_each_page_client_side() {
    let members = [EntityId(1), EntityId(3)];
    let mut p: ReferencePicker<User> = ReferencePicker::new(ResourceKind::Users, "userId", 20)
        .with_exclusion(move |u: &User| members.contains(&u.id));
    let f = p.open();
    assert!(f.query.filters.is_empty());

    let users = (1..=4)
        .map(|i| User {
            id: EntityId(i),
            name: format!("user{i}"),
            email: None,
            avatar_url: None,
        })
        .collect::<Vec<_>>();
    p.commit(f.ticket, Ok(PageResult { records: users, total: 4 }));
    let ids: Vec<_> = p.options().iter().map(|o| o.id).collect();
    assert_eq!(ids, [EntityId(2), EntityId(4)]);
}

#[test]
fn failed_search_is_reported() {
    let mut p = picker();
    let f = p.open();
    assert_eq!(p.commit(f.ticket, Err(GatewayError::Forbidden)), Commit::Failed);
    assert!(matches!(p.search_state(), SearchState::Failed(_)));
}

#[test]
fn retarget_suppresses_the_previous_search() {
    let mut p = picker();
    let mut filters = FilterSet::new();
    let f = p.open();
    p.commit(f.ticket, teams(vec![team(1, "Core")]));
    p.select(EntityId(1), &mut filters);

    let old = p.open();
    p.retarget(ResourceKind::Teams, "ownerTeamId");
    assert!(p.selected().is_none());
    assert_eq!(p.owner_key(), "ownerTeamId");

    let new = p.open();
    assert_eq!(p.commit(old.ticket, teams(vec![team(2, "Stale")])), Commit::Stale);
    assert_eq!(p.commit(new.ticket, teams(vec![team(3, "Fresh")])), Commit::Applied);
    assert_eq!(p.options()[0].display_label, "Fresh");
}
