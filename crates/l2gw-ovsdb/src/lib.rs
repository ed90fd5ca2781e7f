//! l2gw-ovsdb - Hardware-state reconciliation for the L2 gateway
//!
//! Source devices (hardware VTEP switches) report what changed in their
//! local database as batches keyed by change kind. [`OvsdbData`] applies each
//! batch to the mirrored tables in one transaction, idempotently, so a full
//! snapshot can be replayed safely.
//!
//! The crate also carries the port-event adapter: a [`PortEventBus`] the
//! eventing collaborator publishes on, and [`MacTableSync`], which turns port
//! events into remote-MAC calls on a [`MacAgent`].

mod batch;
mod data;
mod error;
mod mac_sync;
mod port_events;
mod records;

pub use batch::{parse_payload, ChangeBatch, ChangeKind, OVSDB_IDENTIFIER};
pub use data::OvsdbData;
pub use error::{ReconcileError, ReconcileResult};
pub use mac_sync::{MacAgent, MacTableSync, RemoteMacEntry};
pub use port_events::{
    register_port_callbacks, subscribe, FixedIp, Port, PortCallback, PortEventBus, PortEventKind,
    PortMacHandler,
};
