//! Gateway control service backed by the SQLite store

use std::sync::Arc;

use l2gw_core::query::{project, to_projection};
use l2gw_core::validate::{validate_devices, validate_new_devices};
use l2gw_core::{
    Action, Connection, ConnectionCreate, ConnectionPlugin, DefaultMappingValidator, DeviceRecord,
    DeviceSpec, Gateway, GatewayCreate, GatewayPlugin, GatewayUpdate, InterfaceRecord,
    InterfaceSpec, L2gwError, L2gwResult, ListQuery, NetworkMapping, NetworkMappingValidator,
    Projection, RequestContext, SegmentationId,
};
use rusqlite::Transaction;
use tracing::{debug, info};

use crate::gateway_repo::{self as repo, GatewayRow};
use crate::store::Store;

/// Attributes a gateway list may filter or sort on
const GATEWAY_KEYS: &[&str] = &["id", "name", "tenant_id"];

/// Attributes a connection list may filter or sort on
const CONNECTION_KEYS: &[&str] = &[
    "id",
    "tenant_id",
    "l2_gateway_id",
    "network_id",
    "segmentation_id",
];

fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// CRUD over gateways and connections.
///
/// Each public operation is one store transaction: it either commits every
/// row it touched or none of them.
pub struct L2GatewayDb {
    store: Arc<Store>,
    validator: Arc<dyn NetworkMappingValidator>,
}

impl L2GatewayDb {
    /// Service with the default network-mapping validator
    pub fn new(store: Arc<Store>) -> Self {
        Self::with_validator(store, Arc::new(DefaultMappingValidator::default()))
    }

    /// Service with a custom network-mapping validator
    pub fn with_validator(store: Arc<Store>, validator: Arc<dyn NetworkMappingValidator>) -> Self {
        Self { store, validator }
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    /// Device rows of a gateway in stored order
    pub fn devices_by_gateway(&self, gateway_id: &str) -> L2gwResult<Vec<DeviceRecord>> {
        self.store
            .read(|tx| repo::devices_for_gateway(tx, gateway_id).map_err(L2gwError::from))
    }

    /// Interface rows of a device in stored order
    pub fn interfaces_by_device(&self, device_id: &str) -> L2gwResult<Vec<InterfaceRecord>> {
        self.store
            .read(|tx| repo::interfaces_for_device(tx, device_id).map_err(L2gwError::from))
    }

    /// Whether any interface of the gateway carries a segmentation id
    pub fn vlan_configured(&self, gateway_id: &str) -> L2gwResult<bool> {
        self.store
            .read(|tx| repo::vlan_configured(tx, gateway_id).map_err(L2gwError::from))
    }
}

/// Write one interface row per expanded segmentation id
fn insert_interfaces(
    tx: &Transaction<'_>,
    device_id: &str,
    interfaces: &[InterfaceSpec],
) -> L2gwResult<()> {
    let mut position = 0;
    for spec in interfaces {
        for segmentation_id in spec.expanded_ids() {
            let record = InterfaceRecord {
                id: generate_id(),
                device_id: device_id.to_string(),
                interface_name: spec.name.clone(),
                segmentation_id,
            };
            repo::insert_interface(tx, &record, position)?;
            position += 1;
        }
    }
    Ok(())
}

/// Insert a gateway row; an id collision becomes `GatewayExists`
fn insert_gateway(tx: &Transaction<'_>, row: &GatewayRow) -> L2gwResult<()> {
    if repo::gateway(tx, &row.id)?.is_some() {
        return Err(L2gwError::GatewayExists(row.id.clone()));
    }
    repo::insert_gateway(tx, row).map_err(|e| {
        if e.is_unique_violation() {
            L2gwError::GatewayExists(row.id.clone())
        } else {
            L2gwError::from(e)
        }
    })
}

/// Insert a connection row; a uniqueness violation becomes `ConnectionExists`
fn insert_connection(
    tx: &Transaction<'_>,
    connection: &Connection,
    mapping: &NetworkMapping,
) -> L2gwResult<()> {
    repo::insert_connection(tx, connection).map_err(|e| {
        if e.is_unique_violation() {
            L2gwError::ConnectionExists {
                mapping: mapping.to_string(),
                gateway_id: connection.l2_gateway_id.clone(),
            }
        } else {
            L2gwError::from(e)
        }
    })
}

/// Rebuild the interfaces of each listed device from scratch
fn rebuild_devices(
    tx: &Transaction<'_>,
    gateway_id: &str,
    devices: &[DeviceSpec],
) -> L2gwResult<()> {
    for spec in devices {
        let device = repo::device_by_name(tx, gateway_id, &spec.device_name)?
            .ok_or_else(|| L2gwError::DeviceNotFound(spec.device_name.clone()))?;
        if device.device_name.trim().is_empty() {
            return Err(L2gwError::DeviceNameNotFound(spec.device_name.clone()));
        }
        let removed = repo::delete_interfaces_for_device(tx, &device.id)?;
        insert_interfaces(tx, &device.id, &spec.interfaces)?;
        debug!(
            gateway_id,
            device = %spec.device_name,
            removed,
            "Rebuilt device interfaces"
        );
    }
    Ok(())
}

impl GatewayPlugin for L2GatewayDb {
    fn create_gateway(&self, ctx: &RequestContext, req: GatewayCreate) -> L2gwResult<Gateway> {
        ctx.check_admin(Action::Create)?;
        validate_new_devices(&req.devices)?;

        let row = GatewayRow {
            id: req
                .id
                .filter(|id| !id.trim().is_empty())
                .unwrap_or_else(generate_id),
            tenant_id: ctx.tenant_for_create(req.tenant_id.as_deref()),
            name: req.name,
        };

        let gateway = self.store.write(|tx| -> L2gwResult<Gateway> {
            insert_gateway(tx, &row)?;
            for (position, spec) in req.devices.iter().enumerate() {
                let device = DeviceRecord {
                    id: generate_id(),
                    l2_gateway_id: row.id.clone(),
                    device_name: spec.device_name.clone(),
                };
                repo::insert_device(tx, &device, position)?;
                insert_interfaces(tx, &device.id, &spec.interfaces)?;
            }
            repo::load_gateway(tx, &row.id)?
                .ok_or_else(|| L2gwError::GatewayNotFound(row.id.clone()))
        })?;

        info!(
            gateway_id = %gateway.id,
            tenant_id = %gateway.tenant_id,
            devices = gateway.devices.len(),
            "L2 gateway created"
        );
        Ok(gateway)
    }

    fn update_gateway(
        &self,
        ctx: &RequestContext,
        id: &str,
        req: GatewayUpdate,
    ) -> L2gwResult<Gateway> {
        ctx.check_admin(Action::Update)?;

        let gateway = self.store.write(|tx| -> L2gwResult<Gateway> {
            if repo::gateway(tx, id)?.is_none() {
                return Err(L2gwError::GatewayNotFound(id.to_string()));
            }
            if repo::count_connections(tx, id)? > 0 {
                return Err(L2gwError::InUse(id.to_string()));
            }

            if let Some(ref devices) = req.devices {
                validate_devices(devices)?;
                rebuild_devices(tx, id, devices)?;
            }
            if let Some(ref name) = req.name {
                repo::rename_gateway(tx, id, name)?;
            }

            repo::load_gateway(tx, id)?.ok_or_else(|| L2gwError::GatewayNotFound(id.to_string()))
        })?;

        info!(gateway_id = %id, "L2 gateway updated");
        Ok(gateway)
    }

    fn delete_gateway(&self, ctx: &RequestContext, id: &str) -> L2gwResult<()> {
        ctx.check_admin(Action::Delete)?;

        self.store.write(|tx| -> L2gwResult<()> {
            if repo::gateway(tx, id)?.is_none() {
                return Err(L2gwError::GatewayNotFound(id.to_string()));
            }
            if repo::count_connections(tx, id)? > 0 {
                return Err(L2gwError::InUse(id.to_string()));
            }
            repo::delete_gateway(tx, id)?;
            Ok(())
        })?;

        info!(gateway_id = %id, "L2 gateway deleted");
        Ok(())
    }

    fn get_gateway(
        &self,
        ctx: &RequestContext,
        id: &str,
        fields: Option<&[String]>,
    ) -> L2gwResult<Projection> {
        ctx.check_admin(Action::Get)?;

        let gateway = self.store.read(|tx| -> L2gwResult<Gateway> {
            repo::load_gateway(tx, id)?.ok_or_else(|| L2gwError::GatewayNotFound(id.to_string()))
        })?;
        Ok(project(to_projection(&gateway)?, fields))
    }

    fn list_gateways(
        &self,
        ctx: &RequestContext,
        query: &ListQuery,
    ) -> L2gwResult<Vec<Projection>> {
        ctx.check_admin(Action::Get)?;

        let gateways = self
            .store
            .read(|tx| repo::load_all_gateways(tx).map_err(L2gwError::from))?;
        let items = gateways
            .iter()
            .map(to_projection)
            .collect::<L2gwResult<Vec<_>>>()?;
        query.apply(items, GATEWAY_KEYS)
    }
}

impl ConnectionPlugin for L2GatewayDb {
    fn create_connection(
        &self,
        ctx: &RequestContext,
        req: ConnectionCreate,
    ) -> L2gwResult<Connection> {
        ctx.check_admin(Action::Create)?;

        let mapping = req.mapping();
        let connection = self.store.write(|tx| -> L2gwResult<Connection> {
            let vlan_configured = repo::vlan_configured(tx, &req.l2_gateway_id)?;
            let network_id = self.validator.validate(&mapping, vlan_configured)?;

            let gateway = repo::gateway(tx, &req.l2_gateway_id)?
                .ok_or_else(|| L2gwError::GatewayNotFound(req.l2_gateway_id.clone()))?;

            let segmentation_id = mapping.segmentation_id.unwrap_or(SegmentationId::UNSET);
            if repo::find_connection(tx, &gateway.id, &network_id, segmentation_id)?.is_some() {
                return Err(L2gwError::ConnectionExists {
                    mapping: mapping.to_string(),
                    gateway_id: gateway.id.clone(),
                });
            }

            let connection = Connection {
                id: generate_id(),
                tenant_id: gateway.tenant_id.clone(),
                l2_gateway_id: gateway.id.clone(),
                network_id,
                segmentation_id,
            };
            insert_connection(tx, &connection, &mapping)?;
            Ok(connection)
        })?;

        info!(
            connection_id = %connection.id,
            gateway_id = %connection.l2_gateway_id,
            network_id = %connection.network_id,
            segmentation_id = %connection.segmentation_id,
            "L2 gateway connection created"
        );
        Ok(connection)
    }

    fn get_connection(
        &self,
        ctx: &RequestContext,
        id: &str,
        fields: Option<&[String]>,
    ) -> L2gwResult<Projection> {
        ctx.check_admin(Action::Get)?;

        let connection = self.store.read(|tx| -> L2gwResult<Connection> {
            repo::connection(tx, id)?.ok_or_else(|| L2gwError::ConnectionNotFound(id.to_string()))
        })?;
        Ok(project(to_projection(&connection)?, fields))
    }

    fn delete_connection(&self, ctx: &RequestContext, id: &str) -> L2gwResult<()> {
        ctx.check_admin(Action::Delete)?;

        self.store.write(|tx| -> L2gwResult<()> {
            if !repo::delete_connection(tx, id)? {
                return Err(L2gwError::ConnectionNotFound(id.to_string()));
            }
            Ok(())
        })?;

        info!(connection_id = %id, "L2 gateway connection deleted");
        Ok(())
    }

    fn list_connections(
        &self,
        ctx: &RequestContext,
        query: &ListQuery,
    ) -> L2gwResult<Vec<Projection>> {
        ctx.check_admin(Action::Get)?;

        let connections = self
            .store
            .read(|tx| repo::all_connections(tx).map_err(L2gwError::from))?;
        let items = connections
            .iter()
            .map(to_projection)
            .collect::<L2gwResult<Vec<_>>>()?;
        query.apply(items, CONNECTION_KEYS)
    }
}
