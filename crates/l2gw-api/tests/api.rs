//! End-to-end tests for the L2 gateway REST API
//!
//! Each test runs the router on an ephemeral port over an in-memory store.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use l2gw_api::{create_router, AppState};
use l2gw_db::{HardwareStore, L2GatewayDb, Store};
use l2gw_ovsdb::{
    subscribe, MacAgent, MacTableSync, OvsdbData, PortEventBus, ReconcileError, ReconcileResult,
    RemoteMacEntry,
};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use reqwest::StatusCode;
use serde_json::{json, Value};
use tokio::net::TcpListener;

const ADMIN_TENANT: &str = "admin-project";

#[derive(Default)]
struct RecordingAgent {
    added: Mutex<Vec<RemoteMacEntry>>,
    fail: bool,
}

impl MacAgent for RecordingAgent {
    fn add_remote_mac(&self, entry: &RemoteMacEntry) -> ReconcileResult<()> {
        if self.fail {
            return Err(ReconcileError::Agent("agent unreachable".into()));
        }
        self.added.lock().push(entry.clone());
        Ok(())
    }

    fn delete_remote_mac(&self, _entry: &RemoteMacEntry) -> ReconcileResult<()> {
        Ok(())
    }
}

struct TestServer {
    addr: SocketAddr,
    http: reqwest::Client,
    agent: Arc<RecordingAgent>,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    async fn start() -> Self {
        Self::start_with_agent(RecordingAgent::default()).await
    }

    async fn start_with_agent(agent: RecordingAgent) -> Self {
        let store = Arc::new(Store::open_in_memory().unwrap());
        let service = Arc::new(L2GatewayDb::new(store.clone()));
        let ovsdb = Arc::new(OvsdbData::new(store.clone()));

        let agent = Arc::new(agent);
        let bus = Arc::new(PortEventBus::new());
        let sync = Arc::new(MacTableSync::new(HardwareStore::new(store), agent.clone()));
        subscribe(&bus, sync);

        let router = create_router(AppState::new(service, ovsdb, bus));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .ok();
        });
        tokio::time::sleep(Duration::from_millis(10)).await;

        Self {
            addr,
            http: reqwest::Client::new(),
            agent,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    fn admin(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header("x-tenant-id", ADMIN_TENANT)
            .header("x-roles", "member,admin")
    }

    async fn get(&self, path: &str) -> (StatusCode, Value) {
        let resp = self.admin(self.http.get(self.url(path))).send().await.unwrap();
        read(resp).await
    }

    async fn post(&self, path: &str, body: Value) -> (StatusCode, Value) {
        let resp = self
            .admin(self.http.post(self.url(path)))
            .json(&body)
            .send()
            .await
            .unwrap();
        read(resp).await
    }

    async fn put(&self, path: &str, body: Value) -> (StatusCode, Value) {
        let resp = self
            .admin(self.http.put(self.url(path)))
            .json(&body)
            .send()
            .await
            .unwrap();
        read(resp).await
    }

    async fn delete(&self, path: &str) -> StatusCode {
        self.admin(self.http.delete(self.url(path)))
            .send()
            .await
            .unwrap()
            .status()
    }

    async fn create_gateway(&self, name: &str, interfaces: Value) -> String {
        let (status, body) = self
            .post(
                "/v2.0/l2-gateways",
                json!({"l2_gateway": {
                    "name": name,
                    "devices": [{"device_name": "switch1", "interfaces": interfaces}]
                }}),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body["l2_gateway"]["id"].as_str().unwrap().to_string()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

async fn read(resp: reqwest::Response) -> (StatusCode, Value) {
    let status = resp.status();
    let text = resp.text().await.unwrap();
    let body = if text.is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&text).unwrap_or(Value::String(text))
    };
    (status, body)
}

// =============================================================================
// Gateway routes
// =============================================================================

#[tokio::test]
async fn test_health() {
    let server = TestServer::start().await;
    let resp = server.http.get(server.url("/health")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_create_and_show_gateway() {
    let server = TestServer::start().await;
    let (status, body) = server
        .post(
            "/v2.0/l2-gateways",
            json!({"l2_gateway": {
                "name": "gw1",
                "devices": [{
                    "device_name": "switch1",
                    "interfaces": [{"name": "port1", "segmentation_id": ["111", "123"]}]
                }]
            }}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let gateway = &body["l2_gateway"];
    assert_eq!(gateway["name"], "gw1");
    assert_eq!(gateway["tenant_id"], ADMIN_TENANT);
    let interfaces = gateway["devices"][0]["interfaces"].as_array().unwrap();
    assert_eq!(interfaces.len(), 2);
    assert_eq!(interfaces[0]["segmentation_id"], 111);
    assert_eq!(interfaces[1]["segmentation_id"], 123);

    let id = gateway["id"].as_str().unwrap();
    let (status, shown) = server
        .get(&format!("/v2.0/l2-gateways/{}?fields=id&fields=name", id))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(shown, json!({"l2_gateway": {"id": id, "name": "gw1"}}));
}

#[tokio::test]
async fn test_missing_tenant_header_is_unauthorized() {
    let server = TestServer::start().await;
    let resp = server
        .http
        .get(server.url("/v2.0/l2-gateways"))
        .send()
        .await
        .unwrap();
    let (status, body) = read(resp).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
async fn test_non_admin_is_forbidden() {
    let server = TestServer::start().await;
    let resp = server
        .http
        .get(server.url("/v2.0/l2-gateways/does-not-exist"))
        .header("x-tenant-id", "tenant-a")
        .header("x-roles", "member")
        .send()
        .await
        .unwrap();
    let (status, body) = read(resp).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");
}

#[tokio::test]
async fn test_non_admin_is_forbidden_before_request_parsing() {
    let server = TestServer::start().await;
    let tenant = |builder: reqwest::RequestBuilder| {
        builder
            .header("x-tenant-id", "tenant-a")
            .header("x-roles", "member")
    };

    let resp = tenant(server.http.get(server.url("/v2.0/l2-gateways?limit=abc")))
        .send()
        .await
        .unwrap();
    let (status, body) = read(resp).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");

    let resp = tenant(server.http.post(server.url("/v2.0/l2-gateways")))
        .json(&json!({"l2_gateway": {
            "name": "gw1",
            "devices": [{
                "device_name": "switch1",
                "interfaces": [{"name": "port1", "segmentation_id": "vlan"}]
            }]
        }}))
        .send()
        .await
        .unwrap();
    let (status, body) = read(resp).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");
    assert_eq!(
        body["message"],
        "Cannot CREATE resource for non admin tenant"
    );

    let resp = tenant(server.http.post(server.url("/v2.0/l2-gateway-connections")))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    let (status, body) = read(resp).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let server = TestServer::start().await;

    let (status, body) = server
        .post(
            "/v2.0/l2-gateways",
            json!({"l2_gateway": {
                "name": "gw1",
                "devices": [{
                    "device_name": "switch1",
                    "interfaces": [{"name": "port1", "segmentation_id": "vlan"}]
                }]
            }}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
    assert!(body["message"].is_string());

    let resp = server
        .admin(server.http.put(server.url("/v2.0/l2-gateways/gw-1")))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    let (status, body) = read(resp).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");

    let resp = server
        .http
        .post(server.url("/v2.0/l2gw/port-events"))
        .header("content-type", "application/json")
        .body("[]")
        .send()
        .await
        .unwrap();
    let (status, body) = read(resp).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn test_duplicate_explicit_id_is_conflict() {
    let server = TestServer::start().await;
    let request = json!({"l2_gateway": {
        "id": "gw-fixed",
        "name": "gw1",
        "devices": [{"device_name": "switch1", "interfaces": [{"name": "port1"}]}]
    }});

    let (status, _) = server.post("/v2.0/l2-gateways", request.clone()).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = server.post("/v2.0/l2-gateways", request).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");
    assert_eq!(body["message"], "L2 gateway gw-fixed already exists");
}

#[tokio::test]
async fn test_create_without_interfaces_is_bad_request() {
    let server = TestServer::start().await;
    let (status, body) = server
        .post(
            "/v2.0/l2-gateways",
            json!({"l2_gateway": {
                "name": "gw1",
                "devices": [{"device_name": "switch1", "interfaces": []}]
            }}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");

    let (_, listed) = server.get("/v2.0/l2-gateways").await;
    assert_eq!(listed["l2_gateways"], json!([]));
}

#[tokio::test]
async fn test_update_and_delete_gateway() {
    let server = TestServer::start().await;
    let id = server
        .create_gateway("gw1", json!([{"name": "port1"}]))
        .await;

    let (status, body) = server
        .put(
            &format!("/v2.0/l2-gateways/{}", id),
            json!({"l2_gateway": {"name": "renamed"}}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["l2_gateway"]["name"], "renamed");
    assert_eq!(body["l2_gateway"]["devices"][0]["device_name"], "switch1");

    assert_eq!(
        server.delete(&format!("/v2.0/l2-gateways/{}", id)).await,
        StatusCode::NO_CONTENT
    );
    let (status, _) = server.get(&format!("/v2.0/l2-gateways/{}", id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_gateways_sorted_and_filtered() {
    let server = TestServer::start().await;
    server.create_gateway("b", json!([{"name": "p1"}])).await;
    server.create_gateway("a", json!([{"name": "p1"}])).await;
    server.create_gateway("c", json!([{"name": "p1"}])).await;

    let (status, body) = server
        .get("/v2.0/l2-gateways?sort_key=name&sort_dir=desc&fields=name")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["l2_gateways"],
        json!([{"name": "c"}, {"name": "b"}, {"name": "a"}])
    );

    let (_, body) = server
        .get("/v2.0/l2-gateways?name=a&name=c&sort_key=name&fields=name")
        .await;
    assert_eq!(body["l2_gateways"], json!([{"name": "a"}, {"name": "c"}]));

    let (status, _) = server.get("/v2.0/l2-gateways?limit=abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Connection routes
// =============================================================================

#[tokio::test]
async fn test_connection_lifecycle() {
    let server = TestServer::start().await;
    let gw = server
        .create_gateway("gw1", json!([{"name": "port1", "segmentation_id": [100, 200]}]))
        .await;

    let request = json!({"l2_gateway_connection": {
        "l2_gateway_id": gw,
        "network_id": "net-1",
        "segmentation_id": "100"
    }});
    let (status, body) = server.post("/v2.0/l2-gateway-connections", request.clone()).await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let conn = &body["l2_gateway_connection"];
    assert_eq!(conn["segmentation_id"], 100);
    assert_eq!(conn["tenant_id"], ADMIN_TENANT);
    let conn_id = conn["id"].as_str().unwrap().to_string();

    let (status, body) = server.post("/v2.0/l2-gateway-connections", request).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");

    // Gateway in use
    let (status, _) = server
        .put(
            &format!("/v2.0/l2-gateways/{}", gw),
            json!({"l2_gateway": {"name": "renamed"}}),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        server.delete(&format!("/v2.0/l2-gateways/{}", gw)).await,
        StatusCode::CONFLICT
    );

    let (_, listed) = server
        .get(&format!("/v2.0/l2-gateway-connections?l2_gateway_id={}", gw))
        .await;
    assert_eq!(listed["l2_gateway_connections"].as_array().unwrap().len(), 1);

    assert_eq!(
        server
            .delete(&format!("/v2.0/l2-gateway-connections/{}", conn_id))
            .await,
        StatusCode::NO_CONTENT
    );
    assert_eq!(
        server
            .delete(&format!("/v2.0/l2-gateway-connections/{}", conn_id))
            .await,
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        server.delete(&format!("/v2.0/l2-gateways/{}", gw)).await,
        StatusCode::NO_CONTENT
    );
}

#[tokio::test]
async fn test_connection_segmentation_follows_gateway_interfaces() {
    let server = TestServer::start().await;
    let untagged = server
        .create_gateway("gw1", json!([{"name": "port1"}]))
        .await;
    let tagged = server
        .create_gateway("gw2", json!([{"name": "port1", "segmentation_id": 100}]))
        .await;

    let (status, body) = server
        .post(
            "/v2.0/l2-gateway-connections",
            json!({"l2_gateway_connection": {
                "l2_gateway_id": untagged,
                "network_id": "net-1",
                "segmentation_id": 100
            }}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");

    let (status, _) = server
        .post(
            "/v2.0/l2-gateway-connections",
            json!({"l2_gateway_connection": {"l2_gateway_id": tagged, "network_id": "net-1"}}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = server
        .post(
            "/v2.0/l2-gateway-connections",
            json!({"l2_gateway_connection": {"l2_gateway_id": untagged, "network_id": "net-1"}}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["l2_gateway_connection"]["segmentation_id"], "");
}

#[tokio::test]
async fn test_connection_to_missing_gateway() {
    let server = TestServer::start().await;
    let (status, _) = server
        .post(
            "/v2.0/l2-gateway-connections",
            json!({"l2_gateway_connection": {
                "l2_gateway_id": "nope",
                "network_id": "net-1"
            }}),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Southbound ingress
// =============================================================================

#[tokio::test]
async fn test_ovsdb_changes_then_port_event_syncs_macs() {
    let server = TestServer::start().await;

    let (status, body) = server
        .post(
            "/v2.0/l2gw/ovsdb-changes",
            json!({
                "ovsdb_identifier": "ovsdb1",
                "new_logical_switches": [{"uuid": "ls-1", "name": "net-1", "key": 100}],
                "new_physical_switches": [
                    {"uuid": "ps-1", "name": "switch1", "tunnel_ip": "10.0.0.1"}
                ]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT, "{}", body);

    let (status, body) = server
        .post(
            "/v2.0/l2gw/port-events",
            json!({
                "event": "after_create",
                "port": {
                    "id": "port-1",
                    "network_id": "net-1",
                    "mac_address": "fa:16:3e:00:00:01",
                    "fixed_ips": [{"ip_address": "192.168.0.5"}]
                }
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["port_id"], "port-1");
    assert_eq!(body["subscribers"], 1);
    assert_eq!(body["failed"], 0);

    let added = server.agent.added.lock().clone();
    assert_eq!(added.len(), 1);
    assert_eq!(added[0].ovsdb_identifier, "ovsdb1");
    assert_eq!(added[0].logical_switch_uuid, "ls-1");
    assert_eq!(added[0].mac, "fa:16:3e:00:00:01");
}

#[tokio::test]
async fn test_ovsdb_changes_rejects_bad_batches() {
    let server = TestServer::start().await;

    let (status, _) = server
        .post(
            "/v2.0/l2gw/ovsdb-changes",
            json!({"new_logical_switches": []}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = server
        .post(
            "/v2.0/l2gw/ovsdb-changes",
            json!({"ovsdb_identifier": "ovsdb1", "renamed_switches": []}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn test_port_event_callback_failure_is_reported() {
    let server = TestServer::start_with_agent(RecordingAgent {
        fail: true,
        ..Default::default()
    })
    .await;

    server
        .post(
            "/v2.0/l2gw/ovsdb-changes",
            json!({
                "ovsdb_identifier": "ovsdb1",
                "new_logical_switches": [{"uuid": "ls-1", "name": "net-1"}]
            }),
        )
        .await;

    let (status, body) = server
        .post(
            "/v2.0/l2gw/port-events",
            json!({
                "event": "after_update",
                "port": {"id": "port-1", "network_id": "net-1", "mac_address": "fa:16:3e:00:00:02"}
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["failed"], 1);
}
