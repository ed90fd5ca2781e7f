//! Gateway, device and interface models

use serde::{Deserialize, Serialize};

use super::segmentation::{SegmentationId, SegmentationIds};

// =============================================================================
// Request types
// =============================================================================

/// One interface in a device spec
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceSpec {
    /// Physical interface name on the device (e.g., "port1")
    pub name: String,
    /// Optional segmentation id, or a list that expands into one row per id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segmentation_id: Option<SegmentationIds>,
}

impl InterfaceSpec {
    /// Interface without a segmentation id
    pub fn untagged(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            segmentation_id: None,
        }
    }

    /// Interface carrying the given segmentation ids
    pub fn tagged(name: impl Into<String>, ids: Vec<u32>) -> Self {
        Self {
            name: name.into(),
            segmentation_id: Some(ids.into()),
        }
    }

    /// Segmentation ids for the rows this spec expands into.
    ///
    /// An interface without ids yields a single row with the sentinel.
    pub fn expanded_ids(&self) -> Vec<SegmentationId> {
        match &self.segmentation_id {
            Some(ids) => ids.as_slice().to_vec(),
            None => vec![SegmentationId::UNSET],
        }
    }
}

/// One device in a gateway create/update request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSpec {
    /// Device name, unique within its gateway
    pub device_name: String,
    /// Interfaces of this device, in order
    #[serde(default)]
    pub interfaces: Vec<InterfaceSpec>,
}

impl DeviceSpec {
    pub fn new(device_name: impl Into<String>, interfaces: Vec<InterfaceSpec>) -> Self {
        Self {
            device_name: device_name.into(),
            interfaces,
        }
    }
}

/// Body of a gateway create request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayCreate {
    /// Explicit id; a UUID is allocated when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Owning tenant (honoured for administrators only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Devices, in order
    #[serde(default)]
    pub devices: Vec<DeviceSpec>,
}

/// Body of a gateway update request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// When present, each listed device has its interfaces rebuilt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub devices: Option<Vec<DeviceSpec>>,
}

// =============================================================================
// Views
// =============================================================================

/// Interface as rendered on a gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interface {
    pub name: String,
    pub segmentation_id: SegmentationId,
}

/// Device as rendered on a gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: String,
    pub device_name: String,
    pub interfaces: Vec<Interface>,
}

/// A logical L2 gateway with its devices and interfaces
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gateway {
    pub id: String,
    pub name: String,
    pub tenant_id: String,
    pub devices: Vec<Device>,
}

impl Gateway {
    /// Whether any interface carries a segmentation id ("vlan configured")
    pub fn vlan_configured(&self) -> bool {
        self.devices
            .iter()
            .flat_map(|d| d.interfaces.iter())
            .any(|i| i.segmentation_id.is_set())
    }
}

// =============================================================================
// Stored rows
// =============================================================================

/// A device row as stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRecord {
    pub id: String,
    pub l2_gateway_id: String,
    pub device_name: String,
}

/// An interface row as stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceRecord {
    pub id: String,
    pub device_id: String,
    pub interface_name: String,
    pub segmentation_id: SegmentationId,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_expanded_ids() {
        let tagged = InterfaceSpec::tagged("port1", vec![111, 123]);
        assert_eq!(
            tagged.expanded_ids(),
            vec![SegmentationId::new(111), SegmentationId::new(123)]
        );
        assert_eq!(
            InterfaceSpec::untagged("port1").expanded_ids(),
            vec![SegmentationId::UNSET]
        );
    }

    #[test]
    fn test_create_body_parses_string_ids() {
        let body: GatewayCreate = serde_json::from_value(json!({
            "name": "gw1",
            "devices": [{
                "device_name": "device1",
                "interfaces": [{"name": "port1", "segmentation_id": ["111", "123"]}]
            }]
        }))
        .unwrap();
        assert_eq!(body.devices[0].interfaces[0].expanded_ids().len(), 2);
        assert!(body.id.is_none());
    }

    #[test]
    fn test_vlan_configured() {
        let mut gw = Gateway {
            id: "gw".into(),
            name: "gw".into(),
            tenant_id: "t".into(),
            devices: vec![Device {
                id: "d".into(),
                device_name: "dev".into(),
                interfaces: vec![Interface {
                    name: "port1".into(),
                    segmentation_id: SegmentationId::UNSET,
                }],
            }],
        };
        assert!(!gw.vlan_configured());
        gw.devices[0].interfaces[0].segmentation_id = SegmentationId::new(10);
        assert!(gw.vlan_configured());
    }
}
