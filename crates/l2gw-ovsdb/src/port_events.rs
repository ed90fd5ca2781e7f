//! Port lifecycle events
//!
//! The eventing collaborator publishes port create/update/delete events on a
//! [`PortEventBus`]. The gateway registers its callbacks once at startup with
//! [`register_port_callbacks`] (or [`subscribe`] for a [`PortMacHandler`]).

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ReconcileResult;

/// Port lifecycle event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortEventKind {
    AfterCreate,
    AfterUpdate,
    AfterDelete,
}

impl fmt::Display for PortEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PortEventKind::AfterCreate => "after_create",
            PortEventKind::AfterUpdate => "after_update",
            PortEventKind::AfterDelete => "after_delete",
        };
        f.write_str(s)
    }
}

/// Fixed IP assignment on a port
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedIp {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subnet_id: Option<String>,
    pub ip_address: String,
}

/// Virtual network port as carried by a lifecycle event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Port {
    pub id: String,
    pub network_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mac_address: Option<String>,
    #[serde(default)]
    pub fixed_ips: Vec<FixedIp>,
}

impl Port {
    /// MAC address, when the port has a non-empty one
    pub fn mac(&self) -> Option<&str> {
        self.mac_address.as_deref().filter(|m| !m.trim().is_empty())
    }

    /// First fixed IP of the port
    pub fn primary_ip(&self) -> Option<&str> {
        self.fixed_ips.first().map(|ip| ip.ip_address.as_str())
    }
}

/// Callback invoked with the affected port
pub type PortCallback = Arc<dyn Fn(&Port) -> ReconcileResult<()> + Send + Sync>;

/// In-process port event bus
#[derive(Default)]
pub struct PortEventBus {
    subscribers: RwLock<HashMap<PortEventKind, Vec<PortCallback>>>,
}

impl PortEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, kind: PortEventKind, callback: PortCallback) {
        self.subscribers.write().entry(kind).or_default().push(callback);
    }

    pub fn subscriber_count(&self, kind: PortEventKind) -> usize {
        self.subscribers.read().get(&kind).map_or(0, Vec::len)
    }

    /// Invoke every callback for `kind`.
    ///
    /// A failing callback is logged and does not stop the others. Returns the
    /// number of callbacks that failed.
    pub fn publish(&self, kind: PortEventKind, port: &Port) -> usize {
        let callbacks = self
            .subscribers
            .read()
            .get(&kind)
            .cloned()
            .unwrap_or_default();

        debug!(
            event = %kind,
            port_id = %port.id,
            callbacks = callbacks.len(),
            "Publishing port event"
        );

        let mut failed = 0;
        for callback in callbacks {
            if let Err(e) = callback(port) {
                warn!(event = %kind, port_id = %port.id, error = %e, "Port event callback failed");
                failed += 1;
            }
        }
        failed
    }
}

/// Register the three lifecycle callbacks on `bus`
pub fn register_port_callbacks(
    bus: &PortEventBus,
    on_create: PortCallback,
    on_update: PortCallback,
    on_delete: PortCallback,
) {
    bus.subscribe(PortEventKind::AfterCreate, on_create);
    bus.subscribe(PortEventKind::AfterUpdate, on_update);
    bus.subscribe(PortEventKind::AfterDelete, on_delete);
}

/// Receiver of port lifecycle hooks
pub trait PortMacHandler: Send + Sync {
    fn on_port_created_or_updated(&self, port: &Port) -> ReconcileResult<()>;

    fn on_port_deleted(&self, port: &Port) -> ReconcileResult<()>;
}

/// Wire `handler` to the bus: create and update share one hook
pub fn subscribe<H>(bus: &PortEventBus, handler: Arc<H>)
where
    H: PortMacHandler + 'static,
{
    let on_create = {
        let handler = handler.clone();
        Arc::new(move |port: &Port| handler.on_port_created_or_updated(port)) as PortCallback
    };
    let on_update = {
        let handler = handler.clone();
        Arc::new(move |port: &Port| handler.on_port_created_or_updated(port)) as PortCallback
    };
    let on_delete = Arc::new(move |port: &Port| handler.on_port_deleted(port)) as PortCallback;

    register_port_callbacks(bus, on_create, on_update, on_delete);
}
