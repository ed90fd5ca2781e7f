//! MAC agent used when no device agent is attached
//!
//! Records the calls it would make so operators can follow MAC table
//! maintenance in the logs.

use l2gw_ovsdb::{MacAgent, ReconcileResult, RemoteMacEntry};

pub struct LoggingMacAgent;

impl MacAgent for LoggingMacAgent {
    fn add_remote_mac(&self, entry: &RemoteMacEntry) -> ReconcileResult<()> {
        tracing::info!(
            ovsdb_identifier = %entry.ovsdb_identifier,
            logical_switch = %entry.logical_switch_uuid,
            port_id = %entry.port_id,
            mac = %entry.mac,
            ip = ?entry.ip_address,
            "add_remote_mac"
        );
        Ok(())
    }

    fn delete_remote_mac(&self, entry: &RemoteMacEntry) -> ReconcileResult<()> {
        tracing::info!(
            ovsdb_identifier = %entry.ovsdb_identifier,
            logical_switch = %entry.logical_switch_uuid,
            port_id = %entry.port_id,
            mac = %entry.mac,
            "delete_remote_mac"
        );
        Ok(())
    }
}
