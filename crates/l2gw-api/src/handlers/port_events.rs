//! Port lifecycle event ingress

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use l2gw_ovsdb::{Port, PortEventKind};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::handlers::json_body;
use crate::state::{blocking, AppState};

#[derive(Deserialize)]
pub struct PortEventRequest {
    pub event: PortEventKind,
    pub port: Port,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PortEventResponse {
    pub event: PortEventKind,
    pub port_id: String,
    pub subscribers: usize,
    /// Callbacks that returned an error; they are logged, not propagated
    pub failed: usize,
}

/// POST /v2.0/l2gw/port-events
pub async fn publish_port_event(
    State(state): State<AppState>,
    body: Result<Json<PortEventRequest>, JsonRejection>,
) -> Result<Json<PortEventResponse>, ApiError> {
    let PortEventRequest { event, port } = json_body(body)?;
    let bus = state.port_events.clone();

    let response = blocking(move || {
        let subscribers = bus.subscriber_count(event);
        let failed = bus.publish(event, &port);
        Ok(PortEventResponse {
            event,
            port_id: port.id,
            subscribers,
            failed,
        })
    })
    .await?;

    tracing::debug!(
        event = %response.event,
        port_id = %response.port_id,
        failed = response.failed,
        "Port event dispatched"
    );
    Ok(Json(response))
}
