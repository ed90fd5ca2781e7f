//! Mirrored hardware-state rows
//!
//! Each row is the last state reported by one physical switching device and
//! is keyed by `(ovsdb_identifier, uuid)`. The uuid is assigned by the device.

use serde::{Deserialize, Serialize};

/// Virtual bridge on a switching device; its name is the network it carries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogicalSwitch {
    pub uuid: String,
    pub ovsdb_identifier: String,
    pub name: String,
    /// Tunnel key (VNI)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<i64>,
}

/// Physical chassis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhysicalSwitch {
    pub uuid: String,
    pub ovsdb_identifier: String,
    pub name: String,
    /// Tunnel endpoint IP; `None` when the device reported no value
    pub tunnel_ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub switch_fault_status: Option<String>,
}

/// Physical port on a chassis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhysicalPort {
    pub uuid: String,
    pub ovsdb_identifier: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub physical_switch_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port_fault_status: Option<String>,
}

/// Tunnel endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhysicalLocator {
    pub uuid: String,
    pub ovsdb_identifier: String,
    pub dst_ip: String,
}

/// VLAN tag bound to a logical switch on a physical port.
///
/// Keyed by `(ovsdb_identifier, port_uuid, vlan, logical_switch_uuid)`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VlanBinding {
    pub ovsdb_identifier: String,
    pub port_uuid: String,
    pub vlan: u32,
    pub logical_switch_uuid: String,
}

/// Which unicast MAC table a row lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MacTable {
    /// Learned locally on the device
    Local,
    /// Pushed to the device by the gateway control plane
    Remote,
}

impl MacTable {
    pub fn table_name(self) -> &'static str {
        match self {
            MacTable::Local => "ucast_macs_locals",
            MacTable::Remote => "ucast_macs_remotes",
        }
    }
}

/// Unicast MAC to locator binding (local or remote table)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UcastMac {
    pub uuid: String,
    pub ovsdb_identifier: String,
    pub mac: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logical_switch_uuid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub physical_locator_uuid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
}
