//! Request validation: device specs and network mappings

use serde::{Deserialize, Serialize};

use crate::error::{L2gwError, L2gwResult};
use crate::models::{DeviceSpec, NetworkMapping, SegmentationId};

/// Validate device specs before anything is written.
///
/// - device names are unique within the request (`DuplicateDeviceName`)
/// - every device needs at least one interface (`InterfaceRequired`)
/// - segmentation-id presence is uniform across one device's interfaces
///   (`SegmentationRequired`)
/// - ids fit the VLAN range and id lists are non-empty
///   (`InvalidSegmentationId`)
pub fn validate_devices(devices: &[DeviceSpec]) -> L2gwResult<()> {
    let mut seen = std::collections::HashSet::new();
    for device in devices {
        if !seen.insert(device.device_name.as_str()) {
            return Err(L2gwError::DuplicateDeviceName(device.device_name.clone()));
        }
        let Some(first) = device.interfaces.first() else {
            return Err(L2gwError::InterfaceRequired);
        };

        let tagged = first.segmentation_id.is_some();
        if device
            .interfaces
            .iter()
            .any(|i| i.segmentation_id.is_some() != tagged)
        {
            return Err(L2gwError::SegmentationRequired);
        }

        for interface in &device.interfaces {
            if let Some(ref ids) = interface.segmentation_id {
                if ids.as_slice().is_empty() {
                    return Err(L2gwError::InvalidSegmentationId(format!(
                        "empty segmentation id list on interface {}",
                        interface.name
                    )));
                }
                if let Some(bad) = ids.as_slice().iter().find(|id| !id.in_vlan_range()) {
                    return Err(L2gwError::InvalidSegmentationId(format!(
                        "{} is outside 0..={}",
                        bad.get(),
                        SegmentationId::MAX
                    )));
                }
            }
        }
    }
    Ok(())
}

/// Validate the device specs of a create request.
///
/// On top of [`validate_devices`], every device needs a non-blank name
/// (`DeviceNameRequired`).
pub fn validate_new_devices(devices: &[DeviceSpec]) -> L2gwResult<()> {
    if devices.iter().any(|d| d.device_name.trim().is_empty()) {
        return Err(L2gwError::DeviceNameRequired);
    }
    validate_devices(devices)
}

/// Checks a requested connection mapping against the gateway's vlan flag.
///
/// Returns the effective network id, or `InvalidMapping` with a message that
/// is surfaced to the caller verbatim.
pub trait NetworkMappingValidator: Send + Sync {
    fn validate(&self, mapping: &NetworkMapping, vlan_configured: bool) -> L2gwResult<String>;
}

/// Which side supplies the VLAN tag for a connection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentationRule {
    /// A connection carries a segmentation id exactly when the gateway's
    /// interfaces do.
    #[default]
    MatchInterfaces,
    /// The connection supplies the tag only for gateways whose interfaces
    /// carry none; tagged interfaces forbid a connection-level id.
    ComplementInterfaces,
}

/// Built-in network-mapping validator
#[derive(Debug, Clone, Default)]
pub struct DefaultMappingValidator {
    rule: SegmentationRule,
}

impl DefaultMappingValidator {
    pub fn new(rule: SegmentationRule) -> Self {
        Self { rule }
    }

    pub fn rule(&self) -> SegmentationRule {
        self.rule
    }
}

impl NetworkMappingValidator for DefaultMappingValidator {
    fn validate(&self, mapping: &NetworkMapping, vlan_configured: bool) -> L2gwResult<String> {
        let network_id = mapping.network_id.trim();
        if network_id.is_empty() {
            return Err(L2gwError::InvalidMapping(
                "A valid network identifier must be provided".to_string(),
            ));
        }

        let segmentation_id = mapping.segmentation_id.filter(|id| id.is_set());
        if let Some(id) = segmentation_id {
            if !id.in_vlan_range() {
                return Err(L2gwError::InvalidMapping(format!(
                    "Segmentation id {} is not a valid VLAN id",
                    id.get()
                )));
            }
        }

        let wants_segmentation = match self.rule {
            SegmentationRule::MatchInterfaces => vlan_configured,
            SegmentationRule::ComplementInterfaces => !vlan_configured,
        };

        match (wants_segmentation, segmentation_id.is_some()) {
            (true, false) => Err(L2gwError::InvalidMapping(
                "Segmentation id must be specified in create l2gateway connections".to_string(),
            )),
            (false, true) => Err(L2gwError::InvalidMapping(
                "Segmentation id must not be specified for this l2gateway connection".to_string(),
            )),
            _ => Ok(network_id.to_string()),
        }
    }
}
