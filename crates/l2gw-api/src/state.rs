//! Application state for the L2 gateway API

use std::sync::Arc;

use l2gw_core::{ConnectionPlugin, GatewayPlugin};
use l2gw_db::L2GatewayDb;
use l2gw_ovsdb::{OvsdbData, PortEventBus};

use crate::error::ApiError;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub gateways: Arc<dyn GatewayPlugin>,
    pub connections: Arc<dyn ConnectionPlugin>,
    /// Reconciliation engine for hardware-state batches
    pub ovsdb: Arc<OvsdbData>,
    pub port_events: Arc<PortEventBus>,
}

impl AppState {
    /// State around one service that implements both plugin traits
    pub fn new(
        service: Arc<L2GatewayDb>,
        ovsdb: Arc<OvsdbData>,
        port_events: Arc<PortEventBus>,
    ) -> Self {
        Self {
            gateways: service.clone(),
            connections: service,
            ovsdb,
            port_events,
        }
    }
}

/// Run a synchronous store call off the async executor
pub(crate) async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::Internal(format!("Store task failed: {}", e)))?
}
