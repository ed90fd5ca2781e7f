//! l2gw-core - Core traits and types for the L2 gateway control plane
//!
//! This crate provides the logical gateway model (gateways, devices,
//! interfaces, connections), the mirrored hardware-state rows, the error
//! taxonomy, and the capability traits that storage backends implement.

pub mod context;
pub mod error;
pub mod models;
pub mod plugin;
pub mod query;
pub mod validate;

pub use context::{Action, RequestContext};
pub use error::{L2gwError, L2gwResult};
pub use models::*;
pub use plugin::{ConnectionPlugin, GatewayPlugin};
pub use query::{ListQuery, Projection, SortDir, SortKey};
pub use validate::{DefaultMappingValidator, NetworkMappingValidator, SegmentationRule};
