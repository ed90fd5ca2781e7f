//! Port events driving remote-MAC agent calls.

use std::sync::Arc;

use l2gw_db::{HardwareStore, Store};
use l2gw_ovsdb::{
    subscribe, ChangeBatch, ChangeKind, FixedIp, MacAgent, MacTableSync, OvsdbData, Port,
    PortEventBus, PortEventKind, ReconcileResult, RemoteMacEntry,
};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use serde_json::json;

#[derive(Default)]
struct RecordingAgent {
    calls: Mutex<Vec<(&'static str, RemoteMacEntry)>>,
}

impl MacAgent for RecordingAgent {
    fn add_remote_mac(&self, entry: &RemoteMacEntry) -> ReconcileResult<()> {
        self.calls.lock().push(("add", entry.clone()));
        Ok(())
    }

    fn delete_remote_mac(&self, entry: &RemoteMacEntry) -> ReconcileResult<()> {
        self.calls.lock().push(("delete", entry.clone()));
        Ok(())
    }
}

fn setup() -> (PortEventBus, Arc<RecordingAgent>) {
    let store = Arc::new(Store::open_in_memory().unwrap());
    let data = OvsdbData::new(store.clone());
    for source in ["ovsdb1", "ovsdb2"] {
        data.apply_hardware_changes(
            source,
            &ChangeBatch::new().with(
                ChangeKind::NewLogicalSwitches,
                vec![
                    json!({"uuid": format!("ls-{source}"), "name": "net-1"}),
                    json!({"uuid": "ls-other", "name": "net-2"}),
                ],
            ),
        )
        .unwrap();
    }

    let agent = Arc::new(RecordingAgent::default());
    let sync = Arc::new(MacTableSync::new(HardwareStore::new(store), agent.clone()));
    let bus = PortEventBus::new();
    subscribe(&bus, sync);
    (bus, agent)
}

fn port(network_id: &str, mac: Option<&str>) -> Port {
    Port {
        id: "port-1".into(),
        network_id: network_id.into(),
        mac_address: mac.map(str::to_string),
        fixed_ips: vec![FixedIp {
            subnet_id: None,
            ip_address: "10.0.0.5".into(),
        }],
    }
}

#[test]
fn test_create_adds_mac_on_every_matching_switch() {
    let (bus, agent) = setup();
    assert_eq!(
        bus.publish(PortEventKind::AfterCreate, &port("net-1", Some("fa:16:3e:aa:bb:cc"))),
        0
    );

    let calls = agent.calls.lock();
    assert_eq!(calls.len(), 2);
    assert!(calls.iter().all(|(op, _)| *op == "add"));
    let sources: Vec<_> = calls.iter().map(|(_, e)| e.ovsdb_identifier.as_str()).collect();
    assert_eq!(sources, vec!["ovsdb1", "ovsdb2"]);
    assert_eq!(calls[0].1.logical_switch_uuid, "ls-ovsdb1");
    assert_eq!(calls[0].1.mac, "fa:16:3e:aa:bb:cc");
    assert_eq!(calls[0].1.ip_address.as_deref(), Some("10.0.0.5"));
}

#[test]
fn test_update_and_delete_hooks() {
    let (bus, agent) = setup();
    bus.publish(PortEventKind::AfterUpdate, &port("net-2", Some("fa:16:3e:aa:bb:cc")));
    bus.publish(PortEventKind::AfterDelete, &port("net-2", Some("fa:16:3e:aa:bb:cc")));

    let ops: Vec<_> = agent.calls.lock().iter().map(|(op, _)| *op).collect();
    assert_eq!(ops, vec!["add", "add", "delete", "delete"]);
}

#[test]
fn test_no_calls_without_mac_or_switch() {
    let (bus, agent) = setup();
    bus.publish(PortEventKind::AfterCreate, &port("net-1", None));
    bus.publish(PortEventKind::AfterCreate, &port("net-unknown", Some("fa:16:3e:aa:bb:cc")));
    assert!(agent.calls.lock().is_empty());
}
