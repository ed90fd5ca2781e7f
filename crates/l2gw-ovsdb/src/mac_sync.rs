//! Remote MAC maintenance driven by port lifecycle events

use std::sync::Arc;

use l2gw_db::HardwareStore;
use serde::Serialize;
use tracing::debug;

use crate::error::ReconcileResult;
use crate::port_events::{Port, PortMacHandler};

/// One remote MAC entry to push to (or withdraw from) a source device
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteMacEntry {
    pub ovsdb_identifier: String,
    pub logical_switch_uuid: String,
    /// Network the logical switch carries
    pub logical_switch_name: String,
    pub port_id: String,
    pub mac: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
}

/// Agent layer that programs MAC tables on the switching devices
pub trait MacAgent: Send + Sync {
    fn add_remote_mac(&self, entry: &RemoteMacEntry) -> ReconcileResult<()>;

    fn delete_remote_mac(&self, entry: &RemoteMacEntry) -> ReconcileResult<()>;
}

/// Maps port events onto MAC agent calls.
///
/// A port on network `N` concerns every logical switch named `N`, on every
/// source device. A port without a MAC address produces no calls.
pub struct MacTableSync {
    hardware: HardwareStore,
    agent: Arc<dyn MacAgent>,
}

impl MacTableSync {
    pub fn new(hardware: HardwareStore, agent: Arc<dyn MacAgent>) -> Self {
        Self { hardware, agent }
    }

    /// Entries affected by `port`, one per matching logical switch
    pub fn entries_for(&self, port: &Port) -> ReconcileResult<Vec<RemoteMacEntry>> {
        let Some(mac) = port.mac() else {
            return Ok(Vec::new());
        };

        let switches = self.hardware.logical_switches_named(&port.network_id)?;
        Ok(switches
            .into_iter()
            .map(|ls| RemoteMacEntry {
                ovsdb_identifier: ls.ovsdb_identifier,
                logical_switch_uuid: ls.uuid,
                logical_switch_name: ls.name,
                port_id: port.id.clone(),
                mac: mac.to_string(),
                ip_address: port.primary_ip().map(str::to_string),
            })
            .collect())
    }
}

impl PortMacHandler for MacTableSync {
    fn on_port_created_or_updated(&self, port: &Port) -> ReconcileResult<()> {
        let entries = self.entries_for(port)?;
        debug!(
            port_id = %port.id,
            network_id = %port.network_id,
            entries = entries.len(),
            "Adding port MAC"
        );
        for entry in &entries {
            self.agent.add_remote_mac(entry)?;
        }
        Ok(())
    }

    fn on_port_deleted(&self, port: &Port) -> ReconcileResult<()> {
        let entries = self.entries_for(port)?;
        debug!(
            port_id = %port.id,
            network_id = %port.network_id,
            entries = entries.len(),
            "Deleting port MAC"
        );
        for entry in &entries {
            self.agent.delete_remote_mac(entry)?;
        }
        Ok(())
    }
}
