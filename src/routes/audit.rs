use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::audit::DEFAULT_RECENT_LIMIT;
use crate::auth::ApiKey;
use crate::error::AppError;
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct AuditQuery {
    pub limit: Option<usize>,
}

pub async fn list(
    _key: ApiKey,
    State(state): State<SharedState>,
    Query(query): Query<AuditQuery>,
) -> Result<Json<Value>, AppError> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_RECENT_LIMIT)
        .clamp(1, DEFAULT_RECENT_LIMIT);

    let Some(recent) = state.audit.read_recent(limit).await? else {
        return Ok(Json(json!({ "entries": [], "error": "No logs yet." })));
    };

    let mut body = json!({ "entries": recent.entries });
    if recent.skipped > 0 {
        body["skipped"] = json!(recent.skipped);
    }
    Ok(Json(body))
}
