use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde_json::{Value, json};

use super::*;
use crate::browser::{DEBOUNCE, DialogOutcome, DialogPhase, FieldError, RefreshPolicy, apply_effect};
use crate::gateway::{ListQuery, MutationCommand};
use crate::model::{EntityId, FilterValue, PageResult, Record, Team};

/// In-memory gateway; list latency is chosen per keyword so tests can force
/// responses to arrive out of order.
struct SlowGateway {
    rows: Vec<Value>,
    slow_keyword: &'static str,
    calls: Mutex<Vec<ListQuery>>,
}

impl SlowGateway {
    fn new(slow_keyword: &'static str) -> Arc<Self> {
        let rows = ["Core", "Ops", "Billing", "Coral"]
            .iter()
            .enumerate()
            .map(|(i, name)| json!({"id": i + 1, "name": name, "memberCount": 2}))
            .collect();
        Arc::new(Self {
            rows,
            slow_keyword,
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<ListQuery> {
        self.calls.lock().unwrap().clone()
    }
}

impl Gateway for SlowGateway {
    async fn list<R>(&self, query: ListQuery) -> Result<PageResult<R>, GatewayError>
    where
        R: DeserializeOwned + Send + 'static,
    {
        self.calls.lock().unwrap().push(query.clone());
        let keyword = query.filter("keyword").unwrap_or("").to_lowercase();
        let delay = if keyword == self.slow_keyword { 500 } else { 20 };
        tokio::time::sleep(Duration::from_millis(delay)).await;

        let matched: Vec<Value> = self
            .rows
            .iter()
            .filter(|r| {
                r["name"]
                    .as_str()
                    .is_some_and(|n| n.to_lowercase().contains(&keyword))
            })
            .cloned()
            .collect();
        let total = matched.len() as u64;
        let records = serde_json::from_value(Value::Array(matched))
            .map_err(|e| GatewayError::Decode(e.to_string()))?;
        Ok(PageResult { records, total })
    }

    async fn get<R>(&self, _kind: ResourceKind, id: EntityId) -> Result<R, GatewayError>
    where
        R: DeserializeOwned + Send + 'static,
    {
        let row = self
            .rows
            .iter()
            .find(|r| r["id"].as_u64() == Some(id.get()))
            .cloned()
            .ok_or(GatewayError::NotFound)?;
        serde_json::from_value(row).map_err(|e| GatewayError::Decode(e.to_string()))
    }

    async fn mutate(
        &self,
        _kind: ResourceKind,
        command: MutationCommand,
    ) -> Result<MutationResponse, GatewayError> {
        tokio::time::sleep(Duration::from_millis(50)).await;
        if command.command == "fail" {
            return Ok(MutationResponse::failure("nope"));
        }
        Ok(MutationResponse::success(Some(json!({"id": 99}))))
    }

    async fn upload(
        &self,
        _kind: ResourceKind,
        _id: EntityId,
        _file: UploadFile,
    ) -> Result<UploadResponse, GatewayError> {
        Err(GatewayError::Forbidden)
    }
}

struct View {
    list: ListController<Record>,
    picker: ReferencePicker<Team>,
    dialog: ActionDialog<NameForm>,
    toasts: Vec<String>,
}

impl View {
    fn new() -> Self {
        Self {
            list: ListController::new(ResourceKind::Teams, 20),
            picker: ReferencePicker::new(ResourceKind::Teams, "teamId", 20),
            dialog: ActionDialog::new(
                ResourceKind::Teams,
                NameForm::default(),
                RefreshPolicy::RefetchList,
            ),
            toasts: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, Default)]
struct NameForm {
    name: String,
}

impl FormModel for NameForm {
    type Entity = Record;

    fn hydrate(&mut self, entity: &Record) {
        self.name = entity.text("name");
    }

    fn validate(&self) -> Result<(), Vec<FieldError>> {
        if self.name.is_empty() {
            return Err(vec![FieldError::new("name", "required")]);
        }
        Ok(())
    }

    fn to_command(&self, _mode: crate::browser::DialogMode) -> MutationCommand {
        MutationCommand::new("create", None, json!({"name": self.name}))
    }
}

fn list_of(v: &mut View) -> Option<&mut ListController<Record>> {
    Some(&mut v.list)
}

fn picker_of(v: &mut View) -> Option<&mut ReferencePicker<Team>> {
    Some(&mut v.picker)
}

fn dialog_of(v: &mut View) -> Option<&mut ActionDialog<NameForm>> {
    Some(&mut v.dialog)
}

#[tokio::test(start_paused = true)]
async fn slow_picker_response_never_replaces_newer_results() {
    let gw = SlowGateway::new("c");
    let mut view = View::new();
    let mut d: Dispatcher<View> = Dispatcher::current();
    let t0 = Instant::now();

    let fetch = view.picker.open();
    d.picker(&gw, fetch, picker_of);
    d.settle(&mut view).await;

    view.picker.input("c", t0);
    let slow = view.picker.poll(t0 + DEBOUNCE).unwrap();
    d.picker(&gw, slow, picker_of);
    view.picker.input("co", t0 + Duration::from_secs(1));
    let fast = view.picker.poll(t0 + Duration::from_secs(2)).unwrap();
    d.picker(&gw, fast, picker_of);

    assert_eq!(d.in_flight(), 2);
    assert_eq!(d.settle(&mut view).await, 2);

    let labels: Vec<_> = view.picker.options().iter().map(|o| o.display_label.clone()).collect();
    assert_eq!(labels, ["Core", "Coral"]);
    assert_eq!(gw.calls().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn debounced_typing_issues_a_single_request() {
    let gw = SlowGateway::new("");
    let mut view = View::new();
    let mut d: Dispatcher<View> = Dispatcher::current();
    let t0 = Instant::now();

    view.picker.open();
    for (i, kw) in ["o", "op", "ops"].into_iter().enumerate() {
        let at = t0 + Duration::from_millis(100 * i as u64);
        view.picker.input(kw, at);
        assert!(view.picker.poll(at).is_none());
    }
    let fetch = view.picker.poll(t0 + Duration::from_millis(200) + DEBOUNCE).unwrap();
    d.picker(&gw, fetch, picker_of);
    d.settle(&mut view).await;

    let calls = gw.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].filter("keyword"), Some("ops"));
    assert_eq!(view.picker.options().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn latest_list_query_wins() {
    let gw = SlowGateway::new("c");
    let mut view = View::new();
    let mut d: Dispatcher<View> = Dispatcher::current();

    view.list.set_filter("keyword", FilterValue::Text("c".to_string()));
    let slow = view.list.search();
    d.list(&gw, slow, list_of);
    let fast = view.list.reset();
    d.list(&gw, fast, list_of);

    assert!(d.apply_next(&mut view).await);
    assert!(!view.list.is_loading());
    assert_eq!(view.list.total(), 4);

    assert!(d.apply_next(&mut view).await);
    assert_eq!(view.list.total(), 4);
    assert!(!d.apply_next(&mut view).await);
}

#[tokio::test(start_paused = true)]
async fn completion_can_spawn_follow_up_fetch() {
    let gw = SlowGateway::new("");
    let mut view = View::new();
    let mut d: Dispatcher<View> = Dispatcher::current();

    view.dialog.open_create();
    view.dialog.form_mut().unwrap().name = "Platform".to_string();
    let submit = view.dialog.submit().unwrap();

    let follow_gw = Arc::clone(&gw);
    d.submit(&gw, submit, move |v: &mut View, d: &mut Dispatcher<View>, fetch, result| {
        match v.dialog.commit_submit(fetch, result) {
            DialogOutcome::Success(effect) => {
                let out = apply_effect::<Record, Record, Record>(&effect, Some(&mut v.list), None);
                if let Some(f) = out.list {
                    d.list(&follow_gw, f, list_of);
                }
            }
            DialogOutcome::Failed(msg) => v.toasts.push(msg),
            DialogOutcome::Stale => {}
        }
    });

    assert_eq!(d.settle(&mut view).await, 2);
    assert_eq!(view.dialog.phase(), DialogPhase::Idle);
    assert_eq!(view.list.total(), 4);
    assert!(view.toasts.is_empty());
}

#[tokio::test(start_paused = true)]
async fn hydrate_runs_through_the_gateway() {
    let gw = SlowGateway::new("");
    let mut view = View::new();
    let mut d: Dispatcher<View> = Dispatcher::current();

    let fetch = view.dialog.open_edit(EntityId(2));
    d.hydrate(&gw, fetch, dialog_of);
    d.settle(&mut view).await;
    assert_eq!(view.dialog.phase(), DialogPhase::Editing);
    assert_eq!(view.dialog.form().name, "Ops");
}

#[tokio::test(start_paused = true)]
async fn drain_applies_only_what_has_arrived() {
    let gw = SlowGateway::new("");
    let mut view = View::new();
    let mut d: Dispatcher<View> = Dispatcher::current();

    let fetch = view.list.mount();
    d.list(&gw, fetch, list_of);
    assert_eq!(d.drain(&mut view), 0);
    assert!(view.list.is_loading());

    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(d.drain(&mut view), 1);
    assert_eq!(d.in_flight(), 0);
    assert!(!view.list.is_loading());
}
