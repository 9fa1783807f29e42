use std::collections::{BTreeMap, HashSet};

use anyhow::Context;
use backoffice::model::{DEFAULT_PAGE_SIZE, DestructiveAction, KEYWORD_FILTER, Record};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use super::*;

type Row = Map<String, Value>;

const KEYWORD_FIELDS: &[&str] = &["name", "title", "code", "email"];

/// Foreign keys resolved into a display name on every read.
const REFERENCE_NAMES: &[(&str, ResourceKind, &str)] = &[
    ("teamId", ResourceKind::Teams, "teamName"),
    ("userId", ResourceKind::Users, "userName"),
    ("ownerId", ResourceKind::Users, "ownerName"),
    ("packId", ResourceKind::ResourcePacks, "packName"),
    ("roleId", ResourceKind::AdminRoles, "roleName"),
    ("planId", ResourceKind::Plans, "planName"),
];

/// In-memory tables keyed by resource and id. Ids are unique across tables.
pub(super) struct Store {
    tables: HashMap<ResourceKind, BTreeMap<u64, Row>>,
    next_id: u64,
}

pub(super) struct ListPage {
    pub(super) records: Vec<Value>,
    pub(super) total: u64,
}

impl Store {
    /// Builds the store from `{ "<kind>": [ { "id": n, ... }, ... ], ... }`.
    pub(super) fn from_seed(seed: Value) -> anyhow::Result<Self> {
        let Value::Object(kinds) = seed else {
            anyhow::bail!("seed must be a JSON object keyed by resource");
        };
        let mut tables: HashMap<ResourceKind, BTreeMap<u64, Row>> = HashMap::new();
        let mut max_id = 0;
        for (name, rows) in kinds {
            let kind: ResourceKind = name.parse()?;
            let Value::Array(rows) = rows else {
                anyhow::bail!("seed {}: expected an array", name);
            };
            let table = tables.entry(kind).or_default();
            for row in rows {
                let Value::Object(row) = row else {
                    anyhow::bail!("seed {}: records must be objects", name);
                };
                let id = row
                    .get("id")
                    .and_then(Value::as_u64)
                    .with_context(|| format!("seed {}: record without numeric id", name))?;
                max_id = max_id.max(id);
                table.insert(id, row);
            }
        }
        Ok(Self {
            tables,
            next_id: max_id + 1,
        })
    }

    fn row(&self, kind: ResourceKind, id: u64) -> Option<&Row> {
        self.tables.get(&kind).and_then(|t| t.get(&id))
    }

    /// A stored row plus the derived display fields.
    fn view(&self, kind: ResourceKind, row: &Row) -> Row {
        let mut out = row.clone();
        for (key, target, name_key) in REFERENCE_NAMES {
            let Some(id) = row.get(*key).and_then(as_id) else {
                continue;
            };
            if let Some(target) = self.row(*target, id) {
                out.insert(
                    name_key.to_string(),
                    Value::String(Record(target.clone()).label()),
                );
            }
        }
        if kind == ResourceKind::Teams
            && let Some(id) = row.get("id").and_then(as_id)
        {
            let members = self
                .tables
                .get(&ResourceKind::TeamMembers)
                .map(|t| {
                    t.values()
                        .filter(|m| m.get("teamId").and_then(as_id) == Some(id))
                        .count()
                })
                .unwrap_or(0);
            out.insert("memberCount".to_string(), Value::from(members));
        }
        out
    }

    pub(super) fn list(
        &self,
        kind: ResourceKind,
        params: &HashMap<String, String>,
    ) -> Result<ListPage, String> {
        let page = parse_positive(params, "page", 1)?;
        let page_size = parse_positive(params, "pageSize", DEFAULT_PAGE_SIZE)?;

        let views: Vec<Row> = self
            .tables
            .get(&kind)
            .map(|t| t.values().map(|row| self.view(kind, row)).collect())
            .unwrap_or_default();
        // Keys no record of this resource carries are not constraints.
        let known: HashSet<&str> = views
            .iter()
            .flat_map(|v| v.keys().map(String::as_str))
            .collect();
        let matched: Vec<Value> = views
            .iter()
            .filter(|fields| matches_filters(fields, &known, params))
            .map(|fields| Value::Object(fields.clone()))
            .collect();

        let total = matched.len() as u64;
        let offset = (u64::from(page) - 1) * u64::from(page_size);
        let records = matched
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(page_size as usize)
            .collect();
        Ok(ListPage { records, total })
    }

    pub(super) fn get(&self, kind: ResourceKind, id: EntityId) -> Option<Value> {
        self.row(kind, id.get())
            .map(|row| Value::Object(self.view(kind, row)))
    }

    pub(super) fn mutate(&mut self, kind: ResourceKind, cmd: MutationCommand) -> MutationResponse {
        let name = cmd.command.as_str();
        if let Ok(action) = name.parse::<DestructiveAction>() {
            return self.destroy(kind, action, cmd.id);
        }
        match name {
            "create" => self.create(kind, cmd.payload),
            "update" => self.update(kind, cmd.id, cmd.payload),
            "setStatus" => self.set_status(kind, cmd.id, cmd.payload),
            other => MutationResponse::failure(format!("unknown command {:?}", other)),
        }
    }

    fn create(&mut self, kind: ResourceKind, payload: Value) -> MutationResponse {
        let Value::Object(mut row) = payload else {
            return MutationResponse::failure("payload must be a JSON object");
        };
        if let Err(msg) = check_required(kind, &row) {
            return MutationResponse::failure(msg);
        }
        let id = self.next_id;
        self.next_id += 1;
        row.insert("id".to_string(), Value::from(id));
        row.entry("createdAt")
            .or_insert_with(|| Value::String(now_rfc3339()));
        self.tables.entry(kind).or_default().insert(id, row);
        tracing::info!(%kind, id, "created");
        self.success(kind, id)
    }

    fn update(
        &mut self,
        kind: ResourceKind,
        id: Option<EntityId>,
        payload: Value,
    ) -> MutationResponse {
        let Value::Object(fields) = payload else {
            return MutationResponse::failure("payload must be a JSON object");
        };
        let Some(id) = id else {
            return MutationResponse::failure("update needs an id");
        };
        let Some(row) = self.row_mut(kind, id) else {
            return not_found_failure(kind, id);
        };
        let mut next = row.clone();
        for (k, v) in fields {
            if k != "id" {
                next.insert(k, v);
            }
        }
        if let Err(msg) = check_required(kind, &next) {
            return MutationResponse::failure(msg);
        }
        *row = next;
        tracing::info!(%kind, %id, "updated");
        self.success(kind, id.get())
    }

    fn set_status(
        &mut self,
        kind: ResourceKind,
        id: Option<EntityId>,
        payload: Value,
    ) -> MutationResponse {
        let Some(field) = kind.status_toggle() else {
            return MutationResponse::failure(format!("{} has no status toggle", kind));
        };
        let Some(value) = payload.get(field).and_then(Value::as_bool) else {
            return MutationResponse::failure(format!("setStatus needs a boolean {:?}", field));
        };
        let Some(id) = id else {
            return MutationResponse::failure("setStatus needs an id");
        };
        let Some(row) = self.row_mut(kind, id) else {
            return not_found_failure(kind, id);
        };
        row.insert(field.to_string(), Value::Bool(value));
        self.success(kind, id.get())
    }

    fn destroy(
        &mut self,
        kind: ResourceKind,
        action: DestructiveAction,
        id: Option<EntityId>,
    ) -> MutationResponse {
        if !kind.destructive_actions().contains(&action) {
            return MutationResponse::failure(format!(
                "{} is not available for {}",
                action.command(),
                kind
            ));
        }
        let Some(id) = id else {
            return MutationResponse::failure(format!("{} needs an id", action.command()));
        };
        let Some(row) = self.row_mut(kind, id) else {
            return not_found_failure(kind, id);
        };
        match action {
            DestructiveAction::Cancel => {
                if row.get("status").and_then(Value::as_str) == Some("cancelled") {
                    let msg = format!("{} #{} is already cancelled", kind, id);
                    return MutationResponse::failure(msg);
                }
                row.insert("status".to_string(), Value::from("cancelled"));
            }
            DestructiveAction::Suspend => {
                row.insert("enabled".to_string(), Value::Bool(false));
            }
            DestructiveAction::Delete | DestructiveAction::Revoke => {
                if let Some(table) = self.tables.get_mut(&kind) {
                    table.remove(&id.get());
                }
                tracing::info!(%kind, %id, action = action.command(), "removed");
                return MutationResponse::success(Some(serde_json::json!({ "id": id })));
            }
        }
        tracing::info!(%kind, %id, action = action.command(), "applied");
        self.success(kind, id.get())
    }

    /// Records the uploaded file on the entity; `None` when it does not exist.
    pub(super) fn attach(
        &mut self,
        kind: ResourceKind,
        id: EntityId,
        file_name: &str,
    ) -> Option<String> {
        let url = format!("/files/{}/{}/{}", kind, id, file_name);
        let field = match kind {
            ResourceKind::Teams => "logoUrl",
            _ => "avatarUrl",
        };
        let row = self.row_mut(kind, id)?;
        row.insert(field.to_string(), Value::String(url.clone()));
        Some(url)
    }

    fn row_mut(&mut self, kind: ResourceKind, id: EntityId) -> Option<&mut Row> {
        self.tables.get_mut(&kind).and_then(|t| t.get_mut(&id.get()))
    }

    fn success(&self, kind: ResourceKind, id: u64) -> MutationResponse {
        let data = self
            .row(kind, id)
            .map(|row| Value::Object(self.view(kind, row)));
        MutationResponse::success(data)
    }
}

fn not_found_failure(kind: ResourceKind, id: EntityId) -> MutationResponse {
    MutationResponse::failure(format!("{} #{} not found", kind, id))
}

fn check_required(kind: ResourceKind, row: &Row) -> Result<(), String> {
    for f in kind.form_fields().iter().filter(|f| f.required) {
        let missing = match row.get(f.key) {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.trim().is_empty(),
            Some(_) => false,
        };
        if missing {
            return Err(format!("{} is required", f.label));
        }
    }
    Ok(())
}

fn as_id(v: &Value) -> Option<u64> {
    match v {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Rendering used for exact-match filters.
fn field_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn matches_filters(fields: &Row, known: &HashSet<&str>, params: &HashMap<String, String>) -> bool {
    params.iter().all(|(key, want)| {
        if key == "page" || key == "pageSize" || want.is_empty() {
            return true;
        }
        if key == KEYWORD_FILTER {
            return matches_keyword(fields, want);
        }
        if !known.contains(key.as_str()) {
            return true;
        }
        fields.get(key).is_some_and(|have| field_text(have) == *want)
    })
}

fn matches_keyword(fields: &Row, keyword: &str) -> bool {
    let needle = keyword.to_lowercase();
    let mut searchable = KEYWORD_FIELDS
        .iter()
        .filter_map(|k| fields.get(*k).and_then(Value::as_str))
        .peekable();
    if searchable.peek().is_none() {
        return true;
    }
    searchable.any(|s| s.to_lowercase().contains(&needle))
}

fn parse_positive(
    params: &HashMap<String, String>,
    key: &str,
    default: u32,
) -> Result<u32, String> {
    match params.get(key) {
        None => Ok(default),
        Some(raw) => match raw.trim().parse::<u32>() {
            Ok(n) if n >= 1 => Ok(n),
            _ => Err(format!("{} must be a positive integer (got {:?})", key, raw)),
        },
    }
}

fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default()
}
