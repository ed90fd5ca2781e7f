//! HTTP request handlers for the L2 gateway API
//!
//! Resource handlers go through the plugin traits only; the ingress handlers
//! feed the reconciliation engine and the port event bus.

pub mod connections;
pub mod gateways;
pub mod ovsdb;
pub mod port_events;
pub mod query;

use axum::extract::rejection::JsonRejection;
use axum::Json;

use crate::error::ApiError;

/// Unwrap a JSON body, reporting a malformed one as a 400 in the API error shape
pub(crate) fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}
