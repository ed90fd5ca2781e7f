//! Row-level SQL for gateways, devices, interfaces and connections.
//!
//! Every function runs against a caller-supplied transaction; the service
//! layer decides where the transaction boundary lies.

use l2gw_core::{
    Connection, Device, DeviceRecord, Gateway, Interface, InterfaceRecord, SegmentationId,
};
use rusqlite::{params, OptionalExtension, Row, Transaction};

use crate::error::StoreResult;

/// Gateway row without its devices
#[derive(Debug, Clone)]
pub(crate) struct GatewayRow {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
}

fn gateway_row(row: &Row<'_>) -> rusqlite::Result<GatewayRow> {
    Ok(GatewayRow {
        id: row.get(0)?,
        tenant_id: row.get(1)?,
        name: row.get(2)?,
    })
}

fn device_row(row: &Row<'_>) -> rusqlite::Result<DeviceRecord> {
    Ok(DeviceRecord {
        id: row.get(0)?,
        l2_gateway_id: row.get(1)?,
        device_name: row.get(2)?,
    })
}

fn interface_row(row: &Row<'_>) -> rusqlite::Result<InterfaceRecord> {
    Ok(InterfaceRecord {
        id: row.get(0)?,
        device_id: row.get(1)?,
        interface_name: row.get(2)?,
        segmentation_id: SegmentationId::new(row.get(3)?),
    })
}

fn connection_row(row: &Row<'_>) -> rusqlite::Result<Connection> {
    Ok(Connection {
        id: row.get(0)?,
        tenant_id: row.get(1)?,
        l2_gateway_id: row.get(2)?,
        network_id: row.get(3)?,
        segmentation_id: SegmentationId::new(row.get(4)?),
    })
}

// =============================================================================
// Gateways
// =============================================================================

pub(crate) fn insert_gateway(tx: &Transaction<'_>, row: &GatewayRow) -> StoreResult<()> {
    tx.execute(
        "INSERT INTO l2gateways (id, tenant_id, name) VALUES (?1, ?2, ?3)",
        params![row.id, row.tenant_id, row.name],
    )?;
    Ok(())
}

pub(crate) fn gateway(tx: &Transaction<'_>, id: &str) -> StoreResult<Option<GatewayRow>> {
    Ok(tx
        .query_row(
            "SELECT id, tenant_id, name FROM l2gateways WHERE id = ?1",
            params![id],
            gateway_row,
        )
        .optional()?)
}

pub(crate) fn all_gateways(tx: &Transaction<'_>) -> StoreResult<Vec<GatewayRow>> {
    let mut stmt = tx.prepare("SELECT id, tenant_id, name FROM l2gateways ORDER BY id")?;
    let rows = stmt.query_map([], gateway_row)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

pub(crate) fn rename_gateway(tx: &Transaction<'_>, id: &str, name: &str) -> StoreResult<()> {
    tx.execute(
        "UPDATE l2gateways SET name = ?2 WHERE id = ?1",
        params![id, name],
    )?;
    Ok(())
}

/// Delete a gateway; devices and interfaces go with it
pub(crate) fn delete_gateway(tx: &Transaction<'_>, id: &str) -> StoreResult<bool> {
    Ok(tx.execute("DELETE FROM l2gateways WHERE id = ?1", params![id])? > 0)
}

/// Assemble the full gateway view: devices and interfaces in stored order
pub(crate) fn load_gateway(tx: &Transaction<'_>, id: &str) -> StoreResult<Option<Gateway>> {
    let Some(row) = gateway(tx, id)? else {
        return Ok(None);
    };
    assemble(tx, row).map(Some)
}

pub(crate) fn load_all_gateways(tx: &Transaction<'_>) -> StoreResult<Vec<Gateway>> {
    all_gateways(tx)?
        .into_iter()
        .map(|row| assemble(tx, row))
        .collect()
}

fn assemble(tx: &Transaction<'_>, row: GatewayRow) -> StoreResult<Gateway> {
    let mut devices = Vec::new();
    for record in devices_for_gateway(tx, &row.id)? {
        let interfaces = interfaces_for_device(tx, &record.id)?
            .into_iter()
            .map(|i| Interface {
                name: i.interface_name,
                segmentation_id: i.segmentation_id,
            })
            .collect();
        devices.push(Device {
            id: record.id,
            device_name: record.device_name,
            interfaces,
        });
    }
    Ok(Gateway {
        id: row.id,
        name: row.name,
        tenant_id: row.tenant_id,
        devices,
    })
}

// =============================================================================
// Devices and interfaces
// =============================================================================

pub(crate) fn insert_device(
    tx: &Transaction<'_>,
    record: &DeviceRecord,
    position: usize,
) -> StoreResult<()> {
    tx.execute(
        "INSERT INTO l2gatewaydevices (id, l2_gateway_id, device_name, position)
         VALUES (?1, ?2, ?3, ?4)",
        params![record.id, record.l2_gateway_id, record.device_name, position as i64],
    )?;
    Ok(())
}

pub(crate) fn devices_for_gateway(
    tx: &Transaction<'_>,
    gateway_id: &str,
) -> StoreResult<Vec<DeviceRecord>> {
    let mut stmt = tx.prepare(
        "SELECT id, l2_gateway_id, device_name FROM l2gatewaydevices
         WHERE l2_gateway_id = ?1 ORDER BY position",
    )?;
    let rows = stmt.query_map(params![gateway_id], device_row)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

pub(crate) fn device_by_name(
    tx: &Transaction<'_>,
    gateway_id: &str,
    device_name: &str,
) -> StoreResult<Option<DeviceRecord>> {
    Ok(tx
        .query_row(
            "SELECT id, l2_gateway_id, device_name FROM l2gatewaydevices
             WHERE l2_gateway_id = ?1 AND device_name = ?2",
            params![gateway_id, device_name],
            device_row,
        )
        .optional()?)
}

pub(crate) fn insert_interface(
    tx: &Transaction<'_>,
    record: &InterfaceRecord,
    position: usize,
) -> StoreResult<()> {
    tx.execute(
        "INSERT INTO l2gatewayinterfaces (id, device_id, interface_name, segmentation_id, position)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            record.id,
            record.device_id,
            record.interface_name,
            record.segmentation_id.get(),
            position as i64
        ],
    )?;
    Ok(())
}

pub(crate) fn interfaces_for_device(
    tx: &Transaction<'_>,
    device_id: &str,
) -> StoreResult<Vec<InterfaceRecord>> {
    let mut stmt = tx.prepare(
        "SELECT id, device_id, interface_name, segmentation_id FROM l2gatewayinterfaces
         WHERE device_id = ?1 ORDER BY position",
    )?;
    let rows = stmt.query_map(params![device_id], interface_row)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

pub(crate) fn delete_interfaces_for_device(
    tx: &Transaction<'_>,
    device_id: &str,
) -> StoreResult<usize> {
    Ok(tx.execute(
        "DELETE FROM l2gatewayinterfaces WHERE device_id = ?1",
        params![device_id],
    )?)
}

/// True when any interface of the gateway carries a segmentation id
pub(crate) fn vlan_configured(tx: &Transaction<'_>, gateway_id: &str) -> StoreResult<bool> {
    Ok(tx.query_row(
        "SELECT EXISTS (
            SELECT 1 FROM l2gatewayinterfaces i
            JOIN l2gatewaydevices d ON d.id = i.device_id
            WHERE d.l2_gateway_id = ?1 AND i.segmentation_id > 0
         )",
        params![gateway_id],
        |r| r.get(0),
    )?)
}

// =============================================================================
// Connections
// =============================================================================

/// Insert a connection.
///
/// Returns the raw store error so callers can tell a uniqueness violation
/// apart from other failures.
pub(crate) fn insert_connection(tx: &Transaction<'_>, conn: &Connection) -> StoreResult<()> {
    tx.execute(
        "INSERT INTO l2gatewayconnections
             (id, tenant_id, l2_gateway_id, network_id, segmentation_id)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            conn.id,
            conn.tenant_id,
            conn.l2_gateway_id,
            conn.network_id,
            conn.segmentation_id.get()
        ],
    )?;
    Ok(())
}

pub(crate) fn connection(tx: &Transaction<'_>, id: &str) -> StoreResult<Option<Connection>> {
    Ok(tx
        .query_row(
            "SELECT id, tenant_id, l2_gateway_id, network_id, segmentation_id
             FROM l2gatewayconnections WHERE id = ?1",
            params![id],
            connection_row,
        )
        .optional()?)
}

pub(crate) fn find_connection(
    tx: &Transaction<'_>,
    gateway_id: &str,
    network_id: &str,
    segmentation_id: SegmentationId,
) -> StoreResult<Option<Connection>> {
    Ok(tx
        .query_row(
            "SELECT id, tenant_id, l2_gateway_id, network_id, segmentation_id
             FROM l2gatewayconnections
             WHERE l2_gateway_id = ?1 AND network_id = ?2 AND segmentation_id = ?3",
            params![gateway_id, network_id, segmentation_id.get()],
            connection_row,
        )
        .optional()?)
}

pub(crate) fn all_connections(tx: &Transaction<'_>) -> StoreResult<Vec<Connection>> {
    let mut stmt = tx.prepare(
        "SELECT id, tenant_id, l2_gateway_id, network_id, segmentation_id
         FROM l2gatewayconnections ORDER BY id",
    )?;
    let rows = stmt.query_map([], connection_row)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

pub(crate) fn count_connections(tx: &Transaction<'_>, gateway_id: &str) -> StoreResult<i64> {
    Ok(tx.query_row(
        "SELECT COUNT(*) FROM l2gatewayconnections WHERE l2_gateway_id = ?1",
        params![gateway_id],
        |r| r.get(0),
    )?)
}

pub(crate) fn delete_connection(tx: &Transaction<'_>, id: &str) -> StoreResult<bool> {
    Ok(tx.execute(
        "DELETE FROM l2gatewayconnections WHERE id = ?1",
        params![id],
    )? > 0)
}
