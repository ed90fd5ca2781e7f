//! Mirrored hardware-state rows
//!
//! [`HardwareTx`] gives keyed get/add/delete access inside one transaction and
//! is what the reconciliation engine writes through. [`HardwareStore`] is the
//! read side used by port-event handling and the API.

use std::sync::Arc;

use l2gw_core::{
    LogicalSwitch, MacTable, PhysicalLocator, PhysicalPort, PhysicalSwitch, UcastMac, VlanBinding,
};
use rusqlite::{params, OptionalExtension, Row, Transaction};

use crate::error::StoreResult;
use crate::store::Store;

fn logical_switch_row(row: &Row<'_>) -> rusqlite::Result<LogicalSwitch> {
    Ok(LogicalSwitch {
        uuid: row.get(0)?,
        ovsdb_identifier: row.get(1)?,
        name: row.get(2)?,
        key: row.get(3)?,
    })
}

fn physical_switch_row(row: &Row<'_>) -> rusqlite::Result<PhysicalSwitch> {
    Ok(PhysicalSwitch {
        uuid: row.get(0)?,
        ovsdb_identifier: row.get(1)?,
        name: row.get(2)?,
        tunnel_ip: row.get(3)?,
        switch_fault_status: row.get(4)?,
    })
}

fn physical_port_row(row: &Row<'_>) -> rusqlite::Result<PhysicalPort> {
    Ok(PhysicalPort {
        uuid: row.get(0)?,
        ovsdb_identifier: row.get(1)?,
        name: row.get(2)?,
        physical_switch_id: row.get(3)?,
        port_fault_status: row.get(4)?,
    })
}

fn physical_locator_row(row: &Row<'_>) -> rusqlite::Result<PhysicalLocator> {
    Ok(PhysicalLocator {
        uuid: row.get(0)?,
        ovsdb_identifier: row.get(1)?,
        dst_ip: row.get(2)?,
    })
}

fn vlan_binding_row(row: &Row<'_>) -> rusqlite::Result<VlanBinding> {
    Ok(VlanBinding {
        ovsdb_identifier: row.get(0)?,
        port_uuid: row.get(1)?,
        vlan: row.get(2)?,
        logical_switch_uuid: row.get(3)?,
    })
}

fn ucast_mac_row(row: &Row<'_>) -> rusqlite::Result<UcastMac> {
    Ok(UcastMac {
        uuid: row.get(0)?,
        ovsdb_identifier: row.get(1)?,
        mac: row.get(2)?,
        logical_switch_uuid: row.get(3)?,
        physical_locator_uuid: row.get(4)?,
        ip_address: row.get(5)?,
    })
}

const LOGICAL_SWITCH_COLUMNS: &str = "uuid, ovsdb_identifier, name, key";
const PHYSICAL_SWITCH_COLUMNS: &str =
    "uuid, ovsdb_identifier, name, tunnel_ip, switch_fault_status";
const PHYSICAL_PORT_COLUMNS: &str =
    "uuid, ovsdb_identifier, name, physical_switch_id, port_fault_status";
const PHYSICAL_LOCATOR_COLUMNS: &str = "uuid, ovsdb_identifier, dst_ip";
const VLAN_BINDING_COLUMNS: &str = "ovsdb_identifier, port_uuid, vlan, logical_switch_uuid";
const UCAST_MAC_COLUMNS: &str =
    "uuid, ovsdb_identifier, mac, logical_switch_uuid, physical_locator_uuid, ip_address";

/// Keyed access to the hardware tables inside one transaction
pub struct HardwareTx<'a> {
    tx: &'a Transaction<'a>,
}

impl<'a> HardwareTx<'a> {
    pub(crate) fn new(tx: &'a Transaction<'a>) -> Self {
        Self { tx }
    }

    fn get_one<T>(
        &self,
        table: &str,
        columns: &str,
        ovsdb_identifier: &str,
        uuid: &str,
        map: fn(&Row<'_>) -> rusqlite::Result<T>,
    ) -> StoreResult<Option<T>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE ovsdb_identifier = ?1 AND uuid = ?2",
            columns, table
        );
        Ok(self
            .tx
            .query_row(&sql, params![ovsdb_identifier, uuid], map)
            .optional()?)
    }

    fn list_for_source<T>(
        &self,
        table: &str,
        columns: &str,
        ovsdb_identifier: &str,
        map: fn(&Row<'_>) -> rusqlite::Result<T>,
    ) -> StoreResult<Vec<T>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE ovsdb_identifier = ?1 ORDER BY uuid",
            columns, table
        );
        let mut stmt = self.tx.prepare(&sql)?;
        let rows = stmt.query_map(params![ovsdb_identifier], map)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn delete_one(&self, table: &str, ovsdb_identifier: &str, uuid: &str) -> StoreResult<bool> {
        let sql = format!(
            "DELETE FROM {} WHERE ovsdb_identifier = ?1 AND uuid = ?2",
            table
        );
        Ok(self.tx.execute(&sql, params![ovsdb_identifier, uuid])? > 0)
    }

    // -------------------------------------------------------------------------
    // Logical switches
    // -------------------------------------------------------------------------

    pub fn logical_switch(
        &self,
        ovsdb_identifier: &str,
        uuid: &str,
    ) -> StoreResult<Option<LogicalSwitch>> {
        self.get_one(
            "logical_switches",
            LOGICAL_SWITCH_COLUMNS,
            ovsdb_identifier,
            uuid,
            logical_switch_row,
        )
    }

    pub fn logical_switches(&self, ovsdb_identifier: &str) -> StoreResult<Vec<LogicalSwitch>> {
        self.list_for_source(
            "logical_switches",
            LOGICAL_SWITCH_COLUMNS,
            ovsdb_identifier,
            logical_switch_row,
        )
    }

    /// Logical switches with the given name across every source device
    pub fn logical_switches_named(&self, name: &str) -> StoreResult<Vec<LogicalSwitch>> {
        let sql = format!(
            "SELECT {} FROM logical_switches WHERE name = ?1 ORDER BY ovsdb_identifier, uuid",
            LOGICAL_SWITCH_COLUMNS
        );
        let mut stmt = self.tx.prepare(&sql)?;
        let rows = stmt.query_map(params![name], logical_switch_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn add_logical_switch(&self, ls: &LogicalSwitch) -> StoreResult<()> {
        self.tx.execute(
            "INSERT INTO logical_switches (uuid, ovsdb_identifier, name, key)
             VALUES (?1, ?2, ?3, ?4)",
            params![ls.uuid, ls.ovsdb_identifier, ls.name, ls.key],
        )?;
        Ok(())
    }

    pub fn delete_logical_switch(&self, ovsdb_identifier: &str, uuid: &str) -> StoreResult<bool> {
        self.delete_one("logical_switches", ovsdb_identifier, uuid)
    }

    // -------------------------------------------------------------------------
    // Physical switches
    // -------------------------------------------------------------------------

    pub fn physical_switch(
        &self,
        ovsdb_identifier: &str,
        uuid: &str,
    ) -> StoreResult<Option<PhysicalSwitch>> {
        self.get_one(
            "physical_switches",
            PHYSICAL_SWITCH_COLUMNS,
            ovsdb_identifier,
            uuid,
            physical_switch_row,
        )
    }

    pub fn physical_switches(&self, ovsdb_identifier: &str) -> StoreResult<Vec<PhysicalSwitch>> {
        self.list_for_source(
            "physical_switches",
            PHYSICAL_SWITCH_COLUMNS,
            ovsdb_identifier,
            physical_switch_row,
        )
    }

    pub fn add_physical_switch(&self, ps: &PhysicalSwitch) -> StoreResult<()> {
        self.tx.execute(
            "INSERT INTO physical_switches
                 (uuid, ovsdb_identifier, name, tunnel_ip, switch_fault_status)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                ps.uuid,
                ps.ovsdb_identifier,
                ps.name,
                ps.tunnel_ip,
                ps.switch_fault_status
            ],
        )?;
        Ok(())
    }

    pub fn delete_physical_switch(&self, ovsdb_identifier: &str, uuid: &str) -> StoreResult<bool> {
        self.delete_one("physical_switches", ovsdb_identifier, uuid)
    }

    // -------------------------------------------------------------------------
    // Physical ports and their vlan bindings
    // -------------------------------------------------------------------------

    pub fn physical_port(
        &self,
        ovsdb_identifier: &str,
        uuid: &str,
    ) -> StoreResult<Option<PhysicalPort>> {
        self.get_one(
            "physical_ports",
            PHYSICAL_PORT_COLUMNS,
            ovsdb_identifier,
            uuid,
            physical_port_row,
        )
    }

    pub fn physical_ports(&self, ovsdb_identifier: &str) -> StoreResult<Vec<PhysicalPort>> {
        self.list_for_source(
            "physical_ports",
            PHYSICAL_PORT_COLUMNS,
            ovsdb_identifier,
            physical_port_row,
        )
    }

    pub fn add_physical_port(&self, port: &PhysicalPort) -> StoreResult<()> {
        self.tx.execute(
            "INSERT INTO physical_ports
                 (uuid, ovsdb_identifier, name, physical_switch_id, port_fault_status)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                port.uuid,
                port.ovsdb_identifier,
                port.name,
                port.physical_switch_id,
                port.port_fault_status
            ],
        )?;
        Ok(())
    }

    /// Delete a port row. Its vlan bindings are left in place.
    pub fn delete_physical_port(&self, ovsdb_identifier: &str, uuid: &str) -> StoreResult<bool> {
        self.delete_one("physical_ports", ovsdb_identifier, uuid)
    }

    pub fn vlan_binding(&self, binding: &VlanBinding) -> StoreResult<Option<VlanBinding>> {
        let sql = format!(
            "SELECT {} FROM vlan_bindings
             WHERE ovsdb_identifier = ?1 AND port_uuid = ?2
               AND vlan = ?3 AND logical_switch_uuid = ?4",
            VLAN_BINDING_COLUMNS
        );
        Ok(self
            .tx
            .query_row(
                &sql,
                params![
                    binding.ovsdb_identifier,
                    binding.port_uuid,
                    binding.vlan,
                    binding.logical_switch_uuid
                ],
                vlan_binding_row,
            )
            .optional()?)
    }

    pub fn vlan_bindings_for_port(
        &self,
        ovsdb_identifier: &str,
        port_uuid: &str,
    ) -> StoreResult<Vec<VlanBinding>> {
        let sql = format!(
            "SELECT {} FROM vlan_bindings WHERE ovsdb_identifier = ?1 AND port_uuid = ?2
             ORDER BY vlan, logical_switch_uuid",
            VLAN_BINDING_COLUMNS
        );
        let mut stmt = self.tx.prepare(&sql)?;
        let rows = stmt.query_map(params![ovsdb_identifier, port_uuid], vlan_binding_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn add_vlan_binding(&self, binding: &VlanBinding) -> StoreResult<()> {
        self.tx.execute(
            "INSERT INTO vlan_bindings (ovsdb_identifier, port_uuid, vlan, logical_switch_uuid)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                binding.ovsdb_identifier,
                binding.port_uuid,
                binding.vlan,
                binding.logical_switch_uuid
            ],
        )?;
        Ok(())
    }

    /// Remove every binding tied to a port; returns how many were removed
    pub fn delete_vlan_bindings_for_port(
        &self,
        ovsdb_identifier: &str,
        port_uuid: &str,
    ) -> StoreResult<usize> {
        Ok(self.tx.execute(
            "DELETE FROM vlan_bindings WHERE ovsdb_identifier = ?1 AND port_uuid = ?2",
            params![ovsdb_identifier, port_uuid],
        )?)
    }

    // -------------------------------------------------------------------------
    // Physical locators
    // -------------------------------------------------------------------------

    pub fn physical_locator(
        &self,
        ovsdb_identifier: &str,
        uuid: &str,
    ) -> StoreResult<Option<PhysicalLocator>> {
        self.get_one(
            "physical_locators",
            PHYSICAL_LOCATOR_COLUMNS,
            ovsdb_identifier,
            uuid,
            physical_locator_row,
        )
    }

    pub fn physical_locators(&self, ovsdb_identifier: &str) -> StoreResult<Vec<PhysicalLocator>> {
        self.list_for_source(
            "physical_locators",
            PHYSICAL_LOCATOR_COLUMNS,
            ovsdb_identifier,
            physical_locator_row,
        )
    }

    pub fn add_physical_locator(&self, locator: &PhysicalLocator) -> StoreResult<()> {
        self.tx.execute(
            "INSERT INTO physical_locators (uuid, ovsdb_identifier, dst_ip) VALUES (?1, ?2, ?3)",
            params![locator.uuid, locator.ovsdb_identifier, locator.dst_ip],
        )?;
        Ok(())
    }

    pub fn delete_physical_locator(&self, ovsdb_identifier: &str, uuid: &str) -> StoreResult<bool> {
        self.delete_one("physical_locators", ovsdb_identifier, uuid)
    }

    // -------------------------------------------------------------------------
    // Unicast MACs
    // -------------------------------------------------------------------------

    pub fn ucast_mac(
        &self,
        table: MacTable,
        ovsdb_identifier: &str,
        uuid: &str,
    ) -> StoreResult<Option<UcastMac>> {
        self.get_one(
            table.table_name(),
            UCAST_MAC_COLUMNS,
            ovsdb_identifier,
            uuid,
            ucast_mac_row,
        )
    }

    pub fn ucast_macs(
        &self,
        table: MacTable,
        ovsdb_identifier: &str,
    ) -> StoreResult<Vec<UcastMac>> {
        self.list_for_source(table.table_name(), UCAST_MAC_COLUMNS, ovsdb_identifier, ucast_mac_row)
    }

    pub fn add_ucast_mac(&self, table: MacTable, mac: &UcastMac) -> StoreResult<()> {
        let sql = format!(
            "INSERT INTO {} ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            table.table_name(),
            UCAST_MAC_COLUMNS
        );
        self.tx.execute(
            &sql,
            params![
                mac.uuid,
                mac.ovsdb_identifier,
                mac.mac,
                mac.logical_switch_uuid,
                mac.physical_locator_uuid,
                mac.ip_address
            ],
        )?;
        Ok(())
    }

    pub fn delete_ucast_mac(
        &self,
        table: MacTable,
        ovsdb_identifier: &str,
        uuid: &str,
    ) -> StoreResult<bool> {
        self.delete_one(table.table_name(), ovsdb_identifier, uuid)
    }
}

/// Read-only view of the mirrored hardware state.
///
/// Each call is its own read transaction.
#[derive(Clone)]
pub struct HardwareStore {
    store: Arc<Store>,
}

impl HardwareStore {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    fn read<T>(&self, f: impl FnOnce(&HardwareTx<'_>) -> StoreResult<T>) -> StoreResult<T> {
        self.store.read_hardware(f)
    }

    pub fn logical_switch(
        &self,
        ovsdb_identifier: &str,
        uuid: &str,
    ) -> StoreResult<Option<LogicalSwitch>> {
        self.read(|hw| hw.logical_switch(ovsdb_identifier, uuid))
    }

    pub fn logical_switches(&self, ovsdb_identifier: &str) -> StoreResult<Vec<LogicalSwitch>> {
        self.read(|hw| hw.logical_switches(ovsdb_identifier))
    }

    pub fn logical_switches_named(&self, name: &str) -> StoreResult<Vec<LogicalSwitch>> {
        self.read(|hw| hw.logical_switches_named(name))
    }

    pub fn physical_switch(
        &self,
        ovsdb_identifier: &str,
        uuid: &str,
    ) -> StoreResult<Option<PhysicalSwitch>> {
        self.read(|hw| hw.physical_switch(ovsdb_identifier, uuid))
    }

    pub fn physical_switches(&self, ovsdb_identifier: &str) -> StoreResult<Vec<PhysicalSwitch>> {
        self.read(|hw| hw.physical_switches(ovsdb_identifier))
    }

    pub fn physical_port(
        &self,
        ovsdb_identifier: &str,
        uuid: &str,
    ) -> StoreResult<Option<PhysicalPort>> {
        self.read(|hw| hw.physical_port(ovsdb_identifier, uuid))
    }

    pub fn physical_ports(&self, ovsdb_identifier: &str) -> StoreResult<Vec<PhysicalPort>> {
        self.read(|hw| hw.physical_ports(ovsdb_identifier))
    }

    pub fn vlan_bindings_for_port(
        &self,
        ovsdb_identifier: &str,
        port_uuid: &str,
    ) -> StoreResult<Vec<VlanBinding>> {
        self.read(|hw| hw.vlan_bindings_for_port(ovsdb_identifier, port_uuid))
    }

    pub fn physical_locator(
        &self,
        ovsdb_identifier: &str,
        uuid: &str,
    ) -> StoreResult<Option<PhysicalLocator>> {
        self.read(|hw| hw.physical_locator(ovsdb_identifier, uuid))
    }

    pub fn physical_locators(&self, ovsdb_identifier: &str) -> StoreResult<Vec<PhysicalLocator>> {
        self.read(|hw| hw.physical_locators(ovsdb_identifier))
    }

    pub fn ucast_mac(
        &self,
        table: MacTable,
        ovsdb_identifier: &str,
        uuid: &str,
    ) -> StoreResult<Option<UcastMac>> {
        self.read(|hw| hw.ucast_mac(table, ovsdb_identifier, uuid))
    }

    pub fn ucast_macs(
        &self,
        table: MacTable,
        ovsdb_identifier: &str,
    ) -> StoreResult<Vec<UcastMac>> {
        self.read(|hw| hw.ucast_macs(table, ovsdb_identifier))
    }
}
