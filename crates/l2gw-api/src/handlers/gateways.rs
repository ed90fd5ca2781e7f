//! L2 gateway resource handlers

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use l2gw_core::{Action, Gateway, GatewayCreate, GatewayUpdate, Projection};
use serde::{Deserialize, Serialize};

use crate::caller::Caller;
use crate::error::ApiError;
use crate::handlers::{json_body, query};
use crate::state::{blocking, AppState};

#[derive(Deserialize)]
pub struct CreateGatewayRequest {
    pub l2_gateway: GatewayCreate,
}

#[derive(Deserialize)]
pub struct UpdateGatewayRequest {
    pub l2_gateway: GatewayUpdate,
}

#[derive(Serialize)]
pub struct GatewayResponse {
    pub l2_gateway: Gateway,
}

#[derive(Serialize)]
pub struct GatewayProjectionResponse {
    pub l2_gateway: Projection,
}

#[derive(Serialize)]
pub struct GatewaysResponse {
    pub l2_gateways: Vec<Projection>,
}

/// GET /v2.0/l2-gateways
pub async fn list_gateways(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<GatewaysResponse>, ApiError> {
    ctx.check_admin(Action::Get)?;
    let query = query::list_query(&params)?;
    let gateways = state.gateways.clone();
    let items = blocking(move || Ok(gateways.list_gateways(&ctx, &query)?)).await?;
    Ok(Json(GatewaysResponse { l2_gateways: items }))
}

/// POST /v2.0/l2-gateways
pub async fn create_gateway(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    body: Result<Json<CreateGatewayRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<GatewayResponse>), ApiError> {
    ctx.check_admin(Action::Create)?;
    let body = json_body(body)?;
    let gateways = state.gateways.clone();
    let gateway = blocking(move || Ok(gateways.create_gateway(&ctx, body.l2_gateway)?)).await?;
    Ok((StatusCode::CREATED, Json(GatewayResponse { l2_gateway: gateway })))
}

/// GET /v2.0/l2-gateways/{id}
pub async fn get_gateway(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Path(id): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<GatewayProjectionResponse>, ApiError> {
    ctx.check_admin(Action::Get)?;
    let fields = query::fields(&params);
    let gateways = state.gateways.clone();
    let item = blocking(move || Ok(gateways.get_gateway(&ctx, &id, fields.as_deref())?)).await?;
    Ok(Json(GatewayProjectionResponse { l2_gateway: item }))
}

/// PUT /v2.0/l2-gateways/{id}
pub async fn update_gateway(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Path(id): Path<String>,
    body: Result<Json<UpdateGatewayRequest>, JsonRejection>,
) -> Result<Json<GatewayResponse>, ApiError> {
    ctx.check_admin(Action::Update)?;
    let body = json_body(body)?;
    let gateways = state.gateways.clone();
    let gateway =
        blocking(move || Ok(gateways.update_gateway(&ctx, &id, body.l2_gateway)?)).await?;
    Ok(Json(GatewayResponse { l2_gateway: gateway }))
}

/// DELETE /v2.0/l2-gateways/{id}
pub async fn delete_gateway(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let gateways = state.gateways.clone();
    blocking(move || Ok(gateways.delete_gateway(&ctx, &id)?)).await?;
    Ok(StatusCode::NO_CONTENT)
}
