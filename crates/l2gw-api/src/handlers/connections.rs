//! L2 gateway connection resource handlers

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use l2gw_core::{Action, Connection, ConnectionCreate, Projection};
use serde::{Deserialize, Serialize};

use crate::caller::Caller;
use crate::error::ApiError;
use crate::handlers::{json_body, query};
use crate::state::{blocking, AppState};

#[derive(Deserialize)]
pub struct CreateConnectionRequest {
    pub l2_gateway_connection: ConnectionCreate,
}

#[derive(Serialize)]
pub struct ConnectionResponse {
    pub l2_gateway_connection: Connection,
}

#[derive(Serialize)]
pub struct ConnectionProjectionResponse {
    pub l2_gateway_connection: Projection,
}

#[derive(Serialize)]
pub struct ConnectionsResponse {
    pub l2_gateway_connections: Vec<Projection>,
}

/// GET /v2.0/l2-gateway-connections
pub async fn list_connections(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<ConnectionsResponse>, ApiError> {
    ctx.check_admin(Action::Get)?;
    let query = query::list_query(&params)?;
    let connections = state.connections.clone();
    let items = blocking(move || Ok(connections.list_connections(&ctx, &query)?)).await?;
    Ok(Json(ConnectionsResponse {
        l2_gateway_connections: items,
    }))
}

/// POST /v2.0/l2-gateway-connections
pub async fn create_connection(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    body: Result<Json<CreateConnectionRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ConnectionResponse>), ApiError> {
    ctx.check_admin(Action::Create)?;
    let body = json_body(body)?;
    let connections = state.connections.clone();
    let connection = blocking(move || {
        Ok(connections.create_connection(&ctx, body.l2_gateway_connection)?)
    })
    .await?;
    Ok((
        StatusCode::CREATED,
        Json(ConnectionResponse {
            l2_gateway_connection: connection,
        }),
    ))
}

/// GET /v2.0/l2-gateway-connections/{id}
pub async fn get_connection(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Path(id): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<ConnectionProjectionResponse>, ApiError> {
    ctx.check_admin(Action::Get)?;
    let fields = query::fields(&params);
    let connections = state.connections.clone();
    let item =
        blocking(move || Ok(connections.get_connection(&ctx, &id, fields.as_deref())?)).await?;
    Ok(Json(ConnectionProjectionResponse {
        l2_gateway_connection: item,
    }))
}

/// DELETE /v2.0/l2-gateway-connections/{id}
pub async fn delete_connection(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let connections = state.connections.clone();
    blocking(move || Ok(connections.delete_connection(&ctx, &id)?)).await?;
    Ok(StatusCode::NO_CONTENT)
}
