//! l2gw-db - Entity store for the L2 gateway control plane
//!
//! SQLite-backed persistence for gateways, devices, interfaces, connections
//! and the mirrored hardware-state rows. Every public operation runs inside
//! exactly one transaction that commits on success and rolls back on any
//! error.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use l2gw_db::{L2GatewayDb, Store};
//!
//! let store = Arc::new(Store::open_in_memory()?);
//! let db = L2GatewayDb::new(store.clone());
//! let gw = db.create_gateway(&ctx, request)?;
//! ```

mod error;
mod gateway_db;
mod gateway_repo;
mod hardware;
mod schema;
mod store;

pub use error::{StoreError, StoreResult};
pub use gateway_db::L2GatewayDb;
pub use hardware::{HardwareStore, HardwareTx};
pub use store::Store;

// Re-export core types for convenience
pub use l2gw_core::{ConnectionPlugin, GatewayPlugin, L2gwError, L2gwResult, RequestContext};
