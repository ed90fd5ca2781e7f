//! Wire records as reported by a source device, and their normalization into
//! stored rows.

use l2gw_core::{
    LogicalSwitch, PhysicalLocator, PhysicalPort, PhysicalSwitch, UcastMac, VlanBinding,
};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// OVSDB tag marking an optional column with no value (`["set", []]`)
const OVSDB_SET_TAG: &str = "set";

/// Decode an optional column.
///
/// A plain string is the value; a `["set", ...]` wrapper or `null` means no
/// value. Any other shape is rejected.
fn ovsdb_optional<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Array(items)) => match items.first() {
            Some(Value::String(tag)) if tag == OVSDB_SET_TAG => Ok(None),
            _ => Err(D::Error::custom(
                "expected a string or an OVSDB [\"set\", ...] wrapper",
            )),
        },
        Some(other) => Err(D::Error::custom(format!(
            "expected a string or an OVSDB [\"set\", ...] wrapper, got {}",
            other
        ))),
    }
}

/// Record whose kind only needs the key (`deleted_*`)
#[derive(Debug, Clone, Deserialize)]
pub struct UuidRecord {
    pub uuid: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogicalSwitchRecord {
    pub uuid: String,
    pub name: String,
    #[serde(default)]
    pub key: Option<i64>,
}

impl LogicalSwitchRecord {
    pub fn into_row(self, ovsdb_identifier: &str) -> LogicalSwitch {
        LogicalSwitch {
            uuid: self.uuid,
            ovsdb_identifier: ovsdb_identifier.to_string(),
            name: self.name,
            key: self.key,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PhysicalSwitchRecord {
    pub uuid: String,
    pub name: String,
    #[serde(default, deserialize_with = "ovsdb_optional")]
    pub tunnel_ip: Option<String>,
    #[serde(default, deserialize_with = "ovsdb_optional")]
    pub switch_fault_status: Option<String>,
}

impl PhysicalSwitchRecord {
    pub fn into_row(self, ovsdb_identifier: &str) -> PhysicalSwitch {
        PhysicalSwitch {
            uuid: self.uuid,
            ovsdb_identifier: ovsdb_identifier.to_string(),
            name: self.name,
            tunnel_ip: self.tunnel_ip,
            switch_fault_status: self.switch_fault_status,
        }
    }
}

/// VLAN binding nested in a port record; the port supplies its key
#[derive(Debug, Clone, Deserialize)]
pub struct VlanBindingRecord {
    pub vlan: u32,
    pub logical_switch_uuid: String,
}

impl VlanBindingRecord {
    pub fn into_row(self, ovsdb_identifier: &str, port_uuid: &str) -> VlanBinding {
        VlanBinding {
            ovsdb_identifier: ovsdb_identifier.to_string(),
            port_uuid: port_uuid.to_string(),
            vlan: self.vlan,
            logical_switch_uuid: self.logical_switch_uuid,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PhysicalPortRecord {
    pub uuid: String,
    pub name: String,
    #[serde(default)]
    pub physical_switch_id: Option<String>,
    #[serde(default, deserialize_with = "ovsdb_optional")]
    pub port_fault_status: Option<String>,
    #[serde(default)]
    pub vlan_bindings: Vec<VlanBindingRecord>,
}

impl PhysicalPortRecord {
    /// Split into the port row and its binding rows
    pub fn into_rows(self, ovsdb_identifier: &str) -> (PhysicalPort, Vec<VlanBinding>) {
        let bindings = self
            .vlan_bindings
            .into_iter()
            .map(|b| b.into_row(ovsdb_identifier, &self.uuid))
            .collect();
        let port = PhysicalPort {
            uuid: self.uuid,
            ovsdb_identifier: ovsdb_identifier.to_string(),
            name: self.name,
            physical_switch_id: self.physical_switch_id,
            port_fault_status: self.port_fault_status,
        };
        (port, bindings)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PhysicalLocatorRecord {
    pub uuid: String,
    pub dst_ip: String,
}

impl PhysicalLocatorRecord {
    pub fn into_row(self, ovsdb_identifier: &str) -> PhysicalLocator {
        PhysicalLocator {
            uuid: self.uuid,
            ovsdb_identifier: ovsdb_identifier.to_string(),
            dst_ip: self.dst_ip,
        }
    }
}

/// Unicast MAC record (local or remote).
///
/// Devices report the switch reference as `logical_switch_id`; it is stored
/// in the `logical_switch_uuid` column.
#[derive(Debug, Clone, Deserialize)]
pub struct UcastMacRecord {
    pub uuid: String,
    pub mac: String,
    #[serde(default, alias = "logical_switch_uuid")]
    pub logical_switch_id: Option<String>,
    #[serde(default, alias = "physical_locator_uuid")]
    pub physical_locator_id: Option<String>,
    #[serde(default)]
    pub ip_address: Option<String>,
}

impl UcastMacRecord {
    pub fn into_row(self, ovsdb_identifier: &str) -> UcastMac {
        UcastMac {
            uuid: self.uuid,
            ovsdb_identifier: ovsdb_identifier.to_string(),
            mac: self.mac,
            logical_switch_uuid: self.logical_switch_id,
            physical_locator_uuid: self.physical_locator_id,
            ip_address: self.ip_address,
        }
    }
}
