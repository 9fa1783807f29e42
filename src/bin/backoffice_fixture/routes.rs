//! Authenticated HTTP route registration for the fixture API.

use super::*;

pub(super) fn authed_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/:kind", get(list_records))
        .route("/api/:kind/mutate", post(mutate_records))
        .route("/api/:kind/:id", get(get_record))
        .route("/api/:kind/:id/upload", put(upload_file))
        .layer(middleware::from_fn_with_state(state, require_bearer))
}

async fn require_bearer(
    State(state): State<Arc<AppState>>,
    req: axum::extract::Request,
    next: Next,
) -> Response {
    let Some(value) = req.headers().get(header::AUTHORIZATION) else {
        return unauthorized();
    };
    let Ok(value) = value.to_str() else {
        return unauthorized();
    };
    let Some(token) = value.strip_prefix("Bearer ") else {
        return unauthorized();
    };
    if token != state.dev_token {
        return unauthorized();
    }
    next.run(req).await
}
