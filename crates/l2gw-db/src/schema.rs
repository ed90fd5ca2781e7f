//! Database schema

use rusqlite::Connection;

use crate::error::StoreResult;

/// Logical gateway model.
///
/// Devices and interfaces cascade on gateway delete. Connections reference
/// gateways without cascade, and the UNIQUE constraint on
/// `(l2_gateway_id, network_id, segmentation_id)` backs the application-level
/// duplicate check.
const GATEWAY_SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS l2gateways (
    id          TEXT PRIMARY KEY,
    tenant_id   TEXT NOT NULL,
    name        TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS l2gatewaydevices (
    id              TEXT PRIMARY KEY,
    l2_gateway_id   TEXT NOT NULL REFERENCES l2gateways(id) ON DELETE CASCADE,
    device_name     TEXT NOT NULL,
    position        INTEGER NOT NULL,
    UNIQUE (l2_gateway_id, device_name)
);

CREATE TABLE IF NOT EXISTS l2gatewayinterfaces (
    id              TEXT PRIMARY KEY,
    device_id       TEXT NOT NULL REFERENCES l2gatewaydevices(id) ON DELETE CASCADE,
    interface_name  TEXT NOT NULL,
    segmentation_id INTEGER NOT NULL DEFAULT 0,
    position        INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS l2gatewayconnections (
    id              TEXT PRIMARY KEY,
    tenant_id       TEXT NOT NULL,
    l2_gateway_id   TEXT NOT NULL REFERENCES l2gateways(id),
    network_id      TEXT NOT NULL,
    segmentation_id INTEGER NOT NULL DEFAULT 0,
    UNIQUE (l2_gateway_id, network_id, segmentation_id)
);

CREATE INDEX IF NOT EXISTS idx_l2gw_interfaces_device ON l2gatewayinterfaces(device_id);
";

/// Mirrored hardware state, keyed by `(ovsdb_identifier, uuid)`.
///
/// No foreign keys: rows of different kinds may arrive in any order.
const HARDWARE_SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS logical_switches (
    uuid                TEXT NOT NULL,
    ovsdb_identifier    TEXT NOT NULL,
    name                TEXT NOT NULL,
    key                 INTEGER,
    PRIMARY KEY (ovsdb_identifier, uuid)
);

CREATE TABLE IF NOT EXISTS physical_switches (
    uuid                TEXT NOT NULL,
    ovsdb_identifier    TEXT NOT NULL,
    name                TEXT NOT NULL,
    tunnel_ip           TEXT,
    switch_fault_status TEXT,
    PRIMARY KEY (ovsdb_identifier, uuid)
);

CREATE TABLE IF NOT EXISTS physical_ports (
    uuid                TEXT NOT NULL,
    ovsdb_identifier    TEXT NOT NULL,
    name                TEXT NOT NULL,
    physical_switch_id  TEXT,
    port_fault_status   TEXT,
    PRIMARY KEY (ovsdb_identifier, uuid)
);

CREATE TABLE IF NOT EXISTS physical_locators (
    uuid                TEXT NOT NULL,
    ovsdb_identifier    TEXT NOT NULL,
    dst_ip              TEXT NOT NULL,
    PRIMARY KEY (ovsdb_identifier, uuid)
);

CREATE TABLE IF NOT EXISTS vlan_bindings (
    ovsdb_identifier    TEXT NOT NULL,
    port_uuid           TEXT NOT NULL,
    vlan                INTEGER NOT NULL,
    logical_switch_uuid TEXT NOT NULL,
    PRIMARY KEY (ovsdb_identifier, port_uuid, vlan, logical_switch_uuid)
);

CREATE TABLE IF NOT EXISTS ucast_macs_locals (
    uuid                    TEXT NOT NULL,
    ovsdb_identifier        TEXT NOT NULL,
    mac                     TEXT NOT NULL,
    logical_switch_uuid     TEXT,
    physical_locator_uuid   TEXT,
    ip_address              TEXT,
    PRIMARY KEY (ovsdb_identifier, uuid)
);

CREATE TABLE IF NOT EXISTS ucast_macs_remotes (
    uuid                    TEXT NOT NULL,
    ovsdb_identifier        TEXT NOT NULL,
    mac                     TEXT NOT NULL,
    logical_switch_uuid     TEXT,
    physical_locator_uuid   TEXT,
    ip_address              TEXT,
    PRIMARY KEY (ovsdb_identifier, uuid)
);

CREATE INDEX IF NOT EXISTS idx_logical_switches_name ON logical_switches(name);
";

/// Create all tables if they do not exist yet
pub(crate) fn init(conn: &Connection) -> StoreResult<()> {
    conn.execute_batch(GATEWAY_SCHEMA)?;
    conn.execute_batch(HARDWARE_SCHEMA)?;
    Ok(())
}
