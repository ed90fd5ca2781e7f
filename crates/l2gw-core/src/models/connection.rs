//! Gateway-to-network connection models

use serde::{Deserialize, Serialize};

use super::segmentation::SegmentationId;

/// Body of a connection create request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionCreate {
    pub l2_gateway_id: String,
    pub network_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segmentation_id: Option<SegmentationId>,
}

impl ConnectionCreate {
    pub fn new(l2_gateway_id: impl Into<String>, network_id: impl Into<String>) -> Self {
        Self {
            l2_gateway_id: l2_gateway_id.into(),
            network_id: network_id.into(),
            segmentation_id: None,
        }
    }

    pub fn with_segmentation_id(mut self, id: u32) -> Self {
        self.segmentation_id = Some(SegmentationId::new(id));
        self
    }

    /// The mapping handed to the network-mapping validator
    pub fn mapping(&self) -> NetworkMapping {
        NetworkMapping {
            l2_gateway_id: self.l2_gateway_id.clone(),
            network_id: self.network_id.clone(),
            segmentation_id: self.segmentation_id.filter(|id| id.is_set()),
        }
    }
}

/// Requested (network, segmentation id) mapping for a gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkMapping {
    pub l2_gateway_id: String,
    pub network_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segmentation_id: Option<SegmentationId>,
}

impl std::fmt::Display for NetworkMapping {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.segmentation_id {
            Some(seg) => write!(f, "{{network_id: {}, segmentation_id: {}}}", self.network_id, seg),
            None => write!(f, "{{network_id: {}}}", self.network_id),
        }
    }
}

/// A binding of one gateway to one network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub id: String,
    pub tenant_id: String,
    pub l2_gateway_id: String,
    pub network_id: String,
    /// `0` (rendered empty) means a flat mapping
    pub segmentation_id: SegmentationId,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_mapping_drops_sentinel() {
        let req = ConnectionCreate::new("gw", "net").with_segmentation_id(0);
        assert_eq!(req.mapping().segmentation_id, None);
        let req = ConnectionCreate::new("gw", "net").with_segmentation_id(100);
        assert_eq!(req.mapping().segmentation_id, Some(SegmentationId::new(100)));
    }

    #[test]
    fn test_flat_connection_renders_empty_segmentation() {
        let conn = Connection {
            id: "c1".into(),
            tenant_id: "t1".into(),
            l2_gateway_id: "gw".into(),
            network_id: "net".into(),
            segmentation_id: SegmentationId::UNSET,
        };
        let value = serde_json::to_value(&conn).unwrap();
        assert_eq!(value["segmentation_id"], json!(""));
    }
}
