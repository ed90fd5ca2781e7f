//! Reconciliation engine: applies change batches from a source device to the
//! mirrored hardware tables.

use std::collections::HashMap;
use std::sync::Arc;

use l2gw_core::MacTable;
use l2gw_db::{HardwareTx, Store};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info};

use crate::batch::{parse_payload, ChangeBatch, ChangeKind};
use crate::error::{ReconcileError, ReconcileResult};
use crate::records::{
    LogicalSwitchRecord, PhysicalLocatorRecord, PhysicalPortRecord, PhysicalSwitchRecord,
    UcastMacRecord, UuidRecord,
};

/// Applies the records of one kind; returns how many rows changed
type Handler = fn(&HardwareTx<'_>, &str, &[Value]) -> ReconcileResult<usize>;

/// Processes hardware-state changes reported by source devices.
///
/// A whole batch runs in one store transaction: it lands completely or not
/// at all.
pub struct OvsdbData {
    store: Arc<Store>,
    entry_table: HashMap<ChangeKind, Handler>,
}

impl OvsdbData {
    pub fn new(store: Arc<Store>) -> Self {
        let mut entry_table: HashMap<ChangeKind, Handler> = HashMap::new();
        entry_table.insert(ChangeKind::NewLogicalSwitches, process_new_logical_switches);
        entry_table.insert(ChangeKind::NewPhysicalSwitches, process_new_physical_switches);
        entry_table.insert(ChangeKind::NewPhysicalPorts, process_new_physical_ports);
        entry_table.insert(ChangeKind::NewPhysicalLocators, process_new_physical_locators);
        entry_table.insert(ChangeKind::NewLocalMacs, process_new_local_macs);
        entry_table.insert(ChangeKind::NewRemoteMacs, process_new_remote_macs);
        entry_table.insert(ChangeKind::ModifiedPhysicalPorts, process_modified_physical_ports);
        entry_table.insert(ChangeKind::DeletedLogicalSwitches, process_deleted_logical_switches);
        entry_table.insert(ChangeKind::DeletedPhysicalSwitches, process_deleted_physical_switches);
        entry_table.insert(ChangeKind::DeletedPhysicalPorts, process_deleted_physical_ports);
        entry_table.insert(ChangeKind::DeletedPhysicalLocators, process_deleted_physical_locators);
        entry_table.insert(ChangeKind::DeletedLocalMacs, process_deleted_local_macs);
        entry_table.insert(ChangeKind::DeletedRemoteMacs, process_deleted_remote_macs);

        Self { store, entry_table }
    }

    /// Apply one batch from `ovsdb_identifier`.
    ///
    /// Referentially incomplete batches are fine (a port may name a switch
    /// that has not been reported yet); only malformed records fail.
    pub fn apply_hardware_changes(
        &self,
        ovsdb_identifier: &str,
        batch: &ChangeBatch,
    ) -> ReconcileResult<()> {
        if ovsdb_identifier.trim().is_empty() {
            return Err(ReconcileError::InvalidBatch(
                "source identifier must not be empty".into(),
            ));
        }

        let changed = self.store.with_hardware(|hw| -> ReconcileResult<usize> {
            let mut changed = 0;
            for (kind, records) in batch.iter() {
                let handler = self
                    .entry_table
                    .get(&kind)
                    .ok_or_else(|| ReconcileError::UnknownKind(kind.to_string()))?;
                let n = handler(hw, ovsdb_identifier, records)?;
                debug!(
                    ovsdb_identifier,
                    kind = %kind,
                    records = records.len(),
                    changed = n,
                    "Processed change kind"
                );
                changed += n;
            }
            Ok(changed)
        })?;

        info!(
            ovsdb_identifier,
            kinds = batch.len(),
            records = batch.record_count(),
            changed,
            "Applied hardware changes"
        );
        Ok(())
    }

    /// Apply an ingress payload carrying its own `ovsdb_identifier`
    pub fn update_ovsdb_changes(&self, payload: &Value) -> ReconcileResult<()> {
        let (ovsdb_identifier, batch) = parse_payload(payload)?;
        self.apply_hardware_changes(&ovsdb_identifier, &batch)
    }
}

/// Parse every record of a kind, reporting the first bad one by position
fn parse_records<T: DeserializeOwned>(
    kind: ChangeKind,
    records: &[Value],
) -> ReconcileResult<Vec<T>> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            T::deserialize(record).map_err(|e| ReconcileError::Malformed {
                kind,
                index,
                reason: e.to_string(),
            })
        })
        .collect()
}

// =============================================================================
// new_*
// =============================================================================

fn process_new_logical_switches(
    hw: &HardwareTx<'_>,
    source: &str,
    records: &[Value],
) -> ReconcileResult<usize> {
    let mut added = 0;
    for record in parse_records::<LogicalSwitchRecord>(ChangeKind::NewLogicalSwitches, records)? {
        let row = record.into_row(source);
        if hw.logical_switch(source, &row.uuid)?.is_none() {
            hw.add_logical_switch(&row)?;
            added += 1;
        }
    }
    Ok(added)
}

fn process_new_physical_switches(
    hw: &HardwareTx<'_>,
    source: &str,
    records: &[Value],
) -> ReconcileResult<usize> {
    let mut added = 0;
    for record in parse_records::<PhysicalSwitchRecord>(ChangeKind::NewPhysicalSwitches, records)? {
        let row = record.into_row(source);
        if hw.physical_switch(source, &row.uuid)?.is_none() {
            hw.add_physical_switch(&row)?;
            added += 1;
        }
    }
    Ok(added)
}

fn process_new_physical_ports(
    hw: &HardwareTx<'_>,
    source: &str,
    records: &[Value],
) -> ReconcileResult<usize> {
    let mut added = 0;
    for record in parse_records::<PhysicalPortRecord>(ChangeKind::NewPhysicalPorts, records)? {
        let (port, bindings) = record.into_rows(source);
        if hw.physical_port(source, &port.uuid)?.is_none() {
            hw.add_physical_port(&port)?;
            added += 1;
        }
        for binding in bindings {
            if hw.vlan_binding(&binding)?.is_none() {
                hw.add_vlan_binding(&binding)?;
                added += 1;
            }
        }
    }
    Ok(added)
}

fn process_new_physical_locators(
    hw: &HardwareTx<'_>,
    source: &str,
    records: &[Value],
) -> ReconcileResult<usize> {
    let mut added = 0;
    let records =
        parse_records::<PhysicalLocatorRecord>(ChangeKind::NewPhysicalLocators, records)?;
    for record in records {
        let row = record.into_row(source);
        if hw.physical_locator(source, &row.uuid)?.is_none() {
            hw.add_physical_locator(&row)?;
            added += 1;
        }
    }
    Ok(added)
}

fn add_macs(
    hw: &HardwareTx<'_>,
    table: MacTable,
    kind: ChangeKind,
    source: &str,
    records: &[Value],
) -> ReconcileResult<usize> {
    let mut added = 0;
    for record in parse_records::<UcastMacRecord>(kind, records)? {
        let row = record.into_row(source);
        if hw.ucast_mac(table, source, &row.uuid)?.is_none() {
            hw.add_ucast_mac(table, &row)?;
            added += 1;
        }
    }
    Ok(added)
}

fn process_new_local_macs(
    hw: &HardwareTx<'_>,
    source: &str,
    records: &[Value],
) -> ReconcileResult<usize> {
    add_macs(hw, MacTable::Local, ChangeKind::NewLocalMacs, source, records)
}

fn process_new_remote_macs(
    hw: &HardwareTx<'_>,
    source: &str,
    records: &[Value],
) -> ReconcileResult<usize> {
    add_macs(hw, MacTable::Remote, ChangeKind::NewRemoteMacs, source, records)
}

// =============================================================================
// modified_physical_ports
// =============================================================================

/// Replace a known port's vlan bindings wholesale; insert an unknown port
fn process_modified_physical_ports(
    hw: &HardwareTx<'_>,
    source: &str,
    records: &[Value],
) -> ReconcileResult<usize> {
    let mut changed = 0;
    for record in parse_records::<PhysicalPortRecord>(ChangeKind::ModifiedPhysicalPorts, records)? {
        let (port, bindings) = record.into_rows(source);
        if hw.physical_port(source, &port.uuid)?.is_some() {
            changed += hw.delete_vlan_bindings_for_port(source, &port.uuid)?;
        } else {
            hw.add_physical_port(&port)?;
            changed += 1;
        }
        for binding in bindings {
            // duplicates within one message collapse onto one row
            if hw.vlan_binding(&binding)?.is_none() {
                hw.add_vlan_binding(&binding)?;
                changed += 1;
            }
        }
    }
    Ok(changed)
}

// =============================================================================
// deleted_*
// =============================================================================

fn delete_each(
    kind: ChangeKind,
    records: &[Value],
    mut delete: impl FnMut(&str) -> Result<bool, l2gw_db::StoreError>,
) -> ReconcileResult<usize> {
    let mut removed = 0;
    for record in parse_records::<UuidRecord>(kind, records)? {
        if delete(&record.uuid)? {
            removed += 1;
        }
    }
    Ok(removed)
}

fn process_deleted_logical_switches(
    hw: &HardwareTx<'_>,
    source: &str,
    records: &[Value],
) -> ReconcileResult<usize> {
    delete_each(ChangeKind::DeletedLogicalSwitches, records, |uuid| {
        hw.delete_logical_switch(source, uuid)
    })
}

fn process_deleted_physical_switches(
    hw: &HardwareTx<'_>,
    source: &str,
    records: &[Value],
) -> ReconcileResult<usize> {
    delete_each(ChangeKind::DeletedPhysicalSwitches, records, |uuid| {
        hw.delete_physical_switch(source, uuid)
    })
}

fn process_deleted_physical_ports(
    hw: &HardwareTx<'_>,
    source: &str,
    records: &[Value],
) -> ReconcileResult<usize> {
    delete_each(ChangeKind::DeletedPhysicalPorts, records, |uuid| {
        hw.delete_physical_port(source, uuid)
    })
}

fn process_deleted_physical_locators(
    hw: &HardwareTx<'_>,
    source: &str,
    records: &[Value],
) -> ReconcileResult<usize> {
    delete_each(ChangeKind::DeletedPhysicalLocators, records, |uuid| {
        hw.delete_physical_locator(source, uuid)
    })
}

fn process_deleted_local_macs(
    hw: &HardwareTx<'_>,
    source: &str,
    records: &[Value],
) -> ReconcileResult<usize> {
    delete_each(ChangeKind::DeletedLocalMacs, records, |uuid| {
        hw.delete_ucast_mac(MacTable::Local, source, uuid)
    })
}

fn process_deleted_remote_macs(
    hw: &HardwareTx<'_>,
    source: &str,
    records: &[Value],
) -> ReconcileResult<usize> {
    delete_each(ChangeKind::DeletedRemoteMacs, records, |uuid| {
        hw.delete_ucast_mac(MacTable::Remote, source, uuid)
    })
}
