//! Common error types for the gateway control service

use thiserror::Error;

/// Result type for control-service operations
pub type L2gwResult<T> = Result<T, L2gwError>;

/// Errors that can occur in the gateway control service
#[derive(Debug, Error)]
pub enum L2gwError {
    /// Caller is not an administrator
    #[error("{0}")]
    AdminRequired(String),

    /// Gateway not found
    #[error("L2 gateway {0} could not be found")]
    GatewayNotFound(String),

    /// A gateway with the requested id already exists
    #[error("L2 gateway {0} already exists")]
    GatewayExists(String),

    /// No device with the requested name exists on the gateway
    #[error("L2 gateway device {0} could not be found")]
    DeviceNotFound(String),

    /// Device name missing or not resolvable during an update
    #[error("L2 gateway device name {0:?} could not be found")]
    DeviceNameNotFound(String),

    /// Connection not found
    #[error("L2 gateway connection {0} could not be found")]
    ConnectionNotFound(String),

    /// A device was supplied with a blank name
    #[error("L2 gateway device name is required")]
    DeviceNameRequired,

    /// A device was supplied without any interface
    #[error("L2 gateway interface is required")]
    InterfaceRequired,

    /// The same device name appears twice in one request
    #[error("L2 gateway device {0} is listed more than once")]
    DuplicateDeviceName(String),

    /// Segmentation ids present on some interfaces of a device but not others
    #[error("L2 gateway segmentation id must be consistent for all the interfaces")]
    SegmentationRequired,

    /// Segmentation id outside the VLAN range or an empty id list
    #[error("Invalid segmentation id: {0}")]
    InvalidSegmentationId(String),

    /// Gateway still has network connections
    #[error("L2 gateway {0} still has active mappings with one or more networks")]
    InUse(String),

    /// Duplicate (network, segmentation id) mapping on a gateway
    #[error("The network mapping {mapping} already exists on L2 gateway {gateway_id}")]
    ConnectionExists { mapping: String, gateway_id: String },

    /// Rejected by the network-mapping validator (message kept verbatim)
    #[error("{0}")]
    InvalidMapping(String),

    /// Unknown filter, sort key or paging marker
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Storage layer failure
    #[error("Storage error: {0}")]
    Storage(String),
}

impl L2gwError {
    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            L2gwError::AdminRequired(_) => 403,
            L2gwError::GatewayNotFound(_) => 404,
            L2gwError::GatewayExists(_) => 409,
            L2gwError::DeviceNotFound(_) => 404,
            L2gwError::DeviceNameNotFound(_) => 404,
            L2gwError::ConnectionNotFound(_) => 404,
            L2gwError::DeviceNameRequired => 400,
            L2gwError::InterfaceRequired => 400,
            L2gwError::DuplicateDeviceName(_) => 400,
            L2gwError::SegmentationRequired => 400,
            L2gwError::InvalidSegmentationId(_) => 400,
            L2gwError::InUse(_) => 409,
            L2gwError::ConnectionExists { .. } => 409,
            L2gwError::InvalidMapping(_) => 400,
            L2gwError::InvalidQuery(_) => 400,
            L2gwError::Storage(_) => 500,
        }
    }

    /// Whether this error is one of the per-entity "not found" kinds
    pub fn is_not_found(&self) -> bool {
        self.status_code() == 404
    }
}
