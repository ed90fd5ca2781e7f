//! Gateway and connection capability traits
//!
//! A storage backend implements both traits on one service type. The
//! northbound resource layer only ever talks to these traits.

use crate::context::RequestContext;
use crate::error::L2gwResult;
use crate::models::{Connection, ConnectionCreate, Gateway, GatewayCreate, GatewayUpdate};
use crate::query::{ListQuery, Projection};

/// Gateway CRUD capability.
///
/// Every method checks `RequestContext::check_admin` first, so a non-admin
/// caller sees `AdminRequired` even for ids that do not exist.
pub trait GatewayPlugin: Send + Sync {
    /// Create a gateway with its devices and interfaces in one transaction.
    ///
    /// Device specs are validated before anything is written
    /// (`InterfaceRequired`, `SegmentationRequired`).
    fn create_gateway(&self, ctx: &RequestContext, req: GatewayCreate) -> L2gwResult<Gateway>;

    /// Rename a gateway and/or rebuild the interfaces of named devices.
    ///
    /// Rejected with `InUse` whenever the gateway has any connection, even
    /// for a name-only change.
    fn update_gateway(
        &self,
        ctx: &RequestContext,
        id: &str,
        req: GatewayUpdate,
    ) -> L2gwResult<Gateway>;

    /// Delete a gateway and cascade to its devices and interfaces.
    fn delete_gateway(&self, ctx: &RequestContext, id: &str) -> L2gwResult<()>;

    /// Get one gateway, optionally restricted to `fields`.
    fn get_gateway(
        &self,
        ctx: &RequestContext,
        id: &str,
        fields: Option<&[String]>,
    ) -> L2gwResult<Projection>;

    /// List gateways with filters, sorting and marker paging.
    fn list_gateways(&self, ctx: &RequestContext, query: &ListQuery)
        -> L2gwResult<Vec<Projection>>;
}

/// Connection CRUD capability
pub trait ConnectionPlugin: Send + Sync {
    /// Admit a new gateway-to-network connection.
    ///
    /// The request is checked by the network-mapping validator against the
    /// gateway's vlan flag, then de-duplicated on
    /// `(network_id, segmentation_id)` in the same transaction as the insert.
    fn create_connection(
        &self,
        ctx: &RequestContext,
        req: ConnectionCreate,
    ) -> L2gwResult<Connection>;

    fn get_connection(
        &self,
        ctx: &RequestContext,
        id: &str,
        fields: Option<&[String]>,
    ) -> L2gwResult<Projection>;

    /// Delete a connection unconditionally.
    fn delete_connection(&self, ctx: &RequestContext, id: &str) -> L2gwResult<()>;

    fn list_connections(
        &self,
        ctx: &RequestContext,
        query: &ListQuery,
    ) -> L2gwResult<Vec<Projection>>;
}
