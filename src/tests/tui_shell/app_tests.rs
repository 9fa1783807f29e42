use std::collections::HashMap;
use std::net::TcpListener;
use std::sync::Mutex;

use axum::extract::{Path, Query, State};
use serde_json::{Value, json};

use super::*;
use crate::model::{EntityId, PageResult};

/// Gateway pointed at a port nothing listens on: every request fails fast.
pub(in crate::tui_shell) fn closed_gateway() -> Arc<HttpGateway> {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    Arc::new(HttpGateway::new(format!("http://{}", addr), None).unwrap())
}

pub(in crate::tui_shell) fn closed_app(kind: ResourceKind) -> App {
    App::new(Handle::current(), closed_gateway(), ConsoleConfig::default(), kind)
}

/// Commits `rows` as the current list page, superseding whatever is in flight.
pub(in crate::tui_shell) fn seed_list(b: &mut Browser, rows: Value) {
    let fetch = b.list.refresh();
    let page: PageResult<Record> = serde_json::from_value(json!({
        "records": rows.clone(),
        "total": rows.as_array().map(Vec::len).unwrap_or(0),
    }))
    .unwrap();
    b.list.commit(fetch.ticket, Ok(page));
}

/// Opens the detail panel on `row` and commits it as the primary entity.
pub(in crate::tui_shell) fn seed_detail(b: &mut Browser, row: Value) {
    let record: Record = serde_json::from_value(row).unwrap();
    let fetch = b.detail.open(record.id().unwrap());
    b.detail.commit_primary(&fetch, Ok(record));
    b.focus = Focus::Detail;
}

/// In-memory API behind a real HTTP listener: tables keyed by resource,
/// exact-match list filters, get by id, `setStatus` merges, `revoke` and
/// `delete` remove.
#[derive(Default)]
pub(in crate::tui_shell) struct StubData {
    pub(in crate::tui_shell) tables: HashMap<String, Vec<Value>>,
    pub(in crate::tui_shell) list_calls: HashMap<String, usize>,
}

pub(in crate::tui_shell) type StubApi = Arc<Mutex<StubData>>;

impl StubData {
    pub(in crate::tui_shell) fn lists(&self, kind: ResourceKind) -> usize {
        self.list_calls.get(kind.as_str()).copied().unwrap_or(0)
    }
}

fn rendered(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

async fn stub_list(
    State(api): State<StubApi>,
    Path(kind): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> axum::Json<Value> {
    let mut data = api.lock().unwrap();
    *data.list_calls.entry(kind.clone()).or_default() += 1;
    let rows: Vec<Value> = data
        .tables
        .get(&kind)
        .into_iter()
        .flatten()
        .filter(|row| {
            params
                .iter()
                .filter(|(k, _)| !matches!(k.as_str(), "page" | "pageSize"))
                .all(|(k, v)| row.get(k).map(rendered).as_deref() == Some(v.as_str()))
        })
        .cloned()
        .collect();
    axum::Json(json!({"total": rows.len(), "records": rows}))
}

async fn stub_get(
    State(api): State<StubApi>,
    Path((kind, id)): Path<(String, u64)>,
) -> Result<axum::Json<Value>, axum::http::StatusCode> {
    let data = api.lock().unwrap();
    data.tables
        .get(&kind)
        .and_then(|rows| rows.iter().find(|r| r["id"].as_u64() == Some(id)))
        .cloned()
        .map(axum::Json)
        .ok_or(axum::http::StatusCode::NOT_FOUND)
}

async fn stub_mutate(
    State(api): State<StubApi>,
    Path(kind): Path<String>,
    axum::Json(cmd): axum::Json<Value>,
) -> axum::Json<Value> {
    let mut data = api.lock().unwrap();
    let rows = data.tables.entry(kind).or_default();
    let id = cmd.get("id").and_then(Value::as_u64);
    let pos = id.and_then(|id| rows.iter().position(|r| r["id"].as_u64() == Some(id)));
    let out = match (cmd["command"].as_str(), pos) {
        (Some("setStatus"), Some(pos)) => {
            let patch = cmd["payload"].as_object();
            if let (Some(row), Some(patch)) = (rows[pos].as_object_mut(), patch) {
                row.extend(patch.clone());
            }
            json!({"outcome": "success", "data": rows[pos].clone()})
        }
        (Some("revoke" | "delete"), Some(pos)) => {
            rows.remove(pos);
            json!({"outcome": "success", "data": {"id": id}})
        }
        _ => json!({"outcome": "failure", "message": "unsupported"}),
    };
    axum::Json(out)
}

/// App over [`StubData`] seeded with `tables`, mounted and settled.
pub(in crate::tui_shell) async fn stub_app(kind: ResourceKind, tables: Value) -> (App, StubApi) {
    let api: StubApi = Arc::new(Mutex::new(StubData {
        tables: serde_json::from_value(tables).unwrap(),
        ..StubData::default()
    }));
    let router = axum::Router::new()
        .route("/api/:kind", axum::routing::get(stub_list))
        .route("/api/:kind/mutate", axum::routing::post(stub_mutate))
        .route("/api/:kind/:id", axum::routing::get(stub_get))
        .with_state(api.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    let gateway = Arc::new(HttpGateway::new(format!("http://{}", addr), None).unwrap());
    let mut app = App::new(Handle::current(), gateway, ConsoleConfig::default(), kind);
    app.dispatcher.settle(&mut app.browser).await;
    (app, api)
}

#[test]
fn step_stays_inside_the_list() {
    assert_eq!(step(0, -1, 3), 0);
    assert_eq!(step(1, 5, 3), 2);
    assert_eq!(step(2, -1, 3), 1);
    assert_eq!(step(4, 1, 0), 0);
}

#[test]
fn picker_sits_above_dialog_and_overlays() {
    let mut b = Browser::new(ResourceKind::Teams, &ConsoleConfig::default());
    assert_eq!(b.layer(), Layer::Main);

    b.overlay = Overlay::Help;
    assert_eq!(b.layer(), Layer::Help);

    b.confirm.request(crate::model::DestructiveAction::Delete, EntityId(1));
    assert_eq!(b.layer(), Layer::Confirm);

    b.dialog.open_create();
    assert_eq!(b.layer(), Layer::Form);

    let _ = b.picker.open();
    assert_eq!(b.layer(), Layer::Picker);

    b.picker.close();
    assert_eq!(b.layer(), Layer::Form);
}

#[test]
fn roles_are_only_needed_where_a_lookup_filter_exists() {
    let cfg = ConsoleConfig::default();
    assert!(Browser::new(ResourceKind::Admins, &cfg).needs_roles());
    assert!(!Browser::new(ResourceKind::Users, &cfg).needs_roles());
}

#[tokio::test]
async fn unreachable_gateway_fails_the_list_and_the_role_lookup() {
    let mut app = closed_app(ResourceKind::Admins);
    assert_eq!(app.dispatcher.in_flight(), 2);
    assert!(app.browser.list.is_loading());

    app.dispatcher.settle(&mut app.browser).await;

    assert!(app.browser.list.phase().error().is_some());
    assert!(app.browser.roles.phase().error().is_some());
    assert!(app.browser.list.records().is_empty());
}

#[tokio::test]
async fn switching_resource_starts_a_fresh_view() {
    let mut app = closed_app(ResourceKind::Admins);
    app.browser.selected = 3;

    app.switch_resource(ResourceKind::Teams);
    assert_eq!(app.browser.kind, ResourceKind::Teams);
    assert_eq!(app.browser.selected, 0);
    // Only the new list load; the admin fetches went with the old dispatcher.
    assert_eq!(app.dispatcher.in_flight(), 1);

    app.dispatcher.settle(&mut app.browser).await;
    assert!(app.browser.list.phase().error().is_some());
    assert_eq!(app.browser.roles.phase(), &crate::browser::LoadPhase::Idle);
}

#[tokio::test]
async fn switching_resource_waits_for_a_pending_mutation() {
    let mut app = closed_app(ResourceKind::Users);
    app.browser.uploading = true;

    app.switch_resource(ResourceKind::Teams);

    assert_eq!(app.browser.kind, ResourceKind::Users);
    let status = app.browser.status.as_ref().unwrap();
    assert!(status.error);
}

#[tokio::test]
async fn selection_is_clamped_after_a_shorter_page() {
    let mut app = closed_app(ResourceKind::Users);
    seed_list(
        &mut app.browser,
        json!([{"id": 1, "name": "Ada"}, {"id": 2, "name": "Bo"}, {"id": 3, "name": "Cy"}]),
    );
    app.browser.move_selection(5);
    assert_eq!(app.browser.selected, 2);
    assert_eq!(app.browser.selected_id(), Some(EntityId(3)));

    seed_list(&mut app.browser, json!([{"id": 9, "name": "Di"}]));
    app.browser.clamp_selection();
    assert_eq!(app.browser.selected, 0);
    assert_eq!(app.browser.selected_id(), Some(EntityId(9)));
}

#[tokio::test]
async fn focused_record_follows_the_panel_focus() {
    let mut app = closed_app(ResourceKind::Users);
    seed_list(&mut app.browser, json!([{"id": 1, "name": "Ada"}, {"id": 2, "name": "Bo"}]));
    seed_detail(&mut app.browser, json!({"id": 2, "name": "Bo", "enabled": true}));

    assert_eq!(app.browser.focused_record().and_then(Record::id), Some(EntityId(2)));
    app.browser.focus = Focus::List;
    assert_eq!(app.browser.focused_record().and_then(Record::id), Some(EntityId(1)));

    app.browser.detail.close();
    app.browser.focus = Focus::Detail;
    app.browser.clamp_selection();
    assert_eq!(app.browser.focus, Focus::List);
}

#[tokio::test]
async fn poll_timeout_shrinks_to_the_debounce_deadline() {
    let mut app = closed_app(ResourceKind::Users);
    let now = Instant::now();
    assert_eq!(app.poll_timeout(now), TICK);

    let _ = app.browser.picker.open();
    app.browser.picker.input("ad", now);
    assert_eq!(app.poll_timeout(now), TICK);

    let later = now + crate::browser::DEBOUNCE - Duration::from_millis(20);
    assert_eq!(app.poll_timeout(later), Duration::from_millis(20));
}
