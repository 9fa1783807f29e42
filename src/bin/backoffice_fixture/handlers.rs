use backoffice::gateway::Outcome;

use super::*;

pub(super) async fn healthz() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

fn parse_kind(raw: &str) -> Result<ResourceKind, Response> {
    raw.parse::<ResourceKind>().map_err(|_| not_found())
}

fn parse_id(raw: &str) -> Result<EntityId, Response> {
    raw.parse::<EntityId>().map_err(|_| not_found())
}

pub(super) async fn list_records(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, Response> {
    let kind = parse_kind(&kind)?;
    let store = state.store.read().await;
    let page = store.list(kind, &params).map_err(bad_request)?;
    Ok(Json(serde_json::json!({
        "records": page.records,
        "total": page.total,
    })))
}

pub(super) async fn get_record(
    State(state): State<Arc<AppState>>,
    Path((kind, id)): Path<(String, String)>,
) -> Result<Json<Value>, Response> {
    let kind = parse_kind(&kind)?;
    let id = parse_id(&id)?;
    let store = state.store.read().await;
    store.get(kind, id).map(Json).ok_or_else(not_found)
}

pub(super) async fn mutate_records(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
    Json(cmd): Json<MutationCommand>,
) -> Result<Json<MutationResponse>, Response> {
    let kind = parse_kind(&kind)?;
    let mut store = state.store.write().await;
    Ok(Json(store.mutate(kind, cmd)))
}

pub(super) async fn upload_file(
    State(state): State<Arc<AppState>>,
    Path((kind, id)): Path<(String, String)>,
    headers: axum::http::HeaderMap,
    body: axum::body::Bytes,
) -> Result<Json<UploadResponse>, Response> {
    let kind = parse_kind(&kind)?;
    let id = parse_id(&id)?;
    let file_name = headers
        .get("x-file-name")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty() && !s.contains('/'))
        .ok_or_else(|| bad_request("missing or invalid x-file-name header"))?
        .to_string();

    if body.is_empty() {
        return Ok(Json(UploadResponse {
            outcome: Outcome::Failure,
            url: None,
            message: Some("empty file".to_string()),
        }));
    }

    let mut store = state.store.write().await;
    let url = store.attach(kind, id, &file_name).ok_or_else(not_found)?;
    tracing::info!(%kind, %id, file = %file_name, bytes = body.len(), "file attached");
    Ok(Json(UploadResponse {
        outcome: Outcome::Success,
        url: Some(url),
        message: None,
    }))
}
