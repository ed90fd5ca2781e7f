//! Hardware-state change ingress

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::Value;

use crate::error::ApiError;
use crate::handlers::json_body;
use crate::state::{blocking, AppState};

/// POST /v2.0/l2gw/ovsdb-changes
///
/// Body is one change batch keyed by change kind, plus `ovsdb_identifier`.
/// The batch is applied atomically; any bad record rejects all of it.
pub async fn apply_changes(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let payload = json_body(payload)?;
    let ovsdb = state.ovsdb.clone();
    blocking(move || Ok(ovsdb.update_ovsdb_changes(&payload)?)).await?;
    Ok(StatusCode::NO_CONTENT)
}
