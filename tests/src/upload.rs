#![cfg(test)]
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use assetronics_common::config::ApiConfig;
use assetronics_common::error::UploadError;
use assetronics_common::network::device::{Device, ScanResult};
use assetronics_common::reporting::InventoryApi;
use assetronics_common::system::{Software, SystemInfo};
use assetronics_core::api::InventoryClient;

use crate::support::respond_once;

fn client(addr: SocketAddr, key: Option<&str>) -> InventoryClient {
    let cfg = ApiConfig {
        api_url: format!("http://{addr}/api/v1/"),
        api_key: key.map(str::to_string),
        tenant_id: Some("acme".to_string()),
        request_timeout: Duration::from_secs(5),
    };
    InventoryClient::new(&cfg).unwrap()
}

#[tokio::test]
async fn scan_upload_carries_tenant_auth_and_body() {
    let (addr, server) = respond_once(201).await;
    let result = ScanResult {
        range: "10.0.0.0/30".to_string(),
        devices: vec![
            Device::online(Ipv4Addr::new(10, 0, 0, 1)).with_ports(vec![80]),
            Device::online(Ipv4Addr::new(10, 0, 0, 2)),
        ],
    };

    client(addr, Some("s3cret"))
        .send_scan_results(&result)
        .await
        .unwrap();

    let request = server.await.unwrap();
    assert_eq!(request.request_line(), "post /api/v1/agent/scan http/1.1");
    assert_eq!(request.header("x-tenant-id"), Some("acme"));
    assert_eq!(request.header("authorization"), Some("bearer s3cret"));
    assert_eq!(request.header("content-type"), Some("application/json"));

    let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
    assert_eq!(body["range"], "10.0.0.0/30");
    assert_eq!(body["devices"][0]["open_ports"], serde_json::json!([80]));
    assert_eq!(body["devices"][1]["open_ports"], serde_json::json!([]));
    assert_eq!(body["devices"][1]["status"], "online");
}

#[tokio::test]
async fn check_in_posts_system_info_without_key() {
    let (addr, server) = respond_once(200).await;
    let info = SystemInfo {
        hostname: "ws-01".to_string(),
        installed_software: vec![Software::new("curl").with_version("8.5.0")],
        ..SystemInfo::default()
    };

    client(addr, None).check_in(&info).await.unwrap();

    let request = server.await.unwrap();
    assert_eq!(request.request_line(), "post /api/v1/agent/checkin http/1.1");
    assert_eq!(request.header("authorization"), None);

    let echoed: SystemInfo = serde_json::from_slice(&request.body).unwrap();
    assert_eq!(echoed, info);
}

#[tokio::test]
async fn server_error_is_reported_with_status() {
    let (addr, server) = respond_once(500).await;

    let err = client(addr, Some("k"))
        .send_scan_results(&ScanResult::empty("10.0.0.0/24"))
        .await
        .unwrap_err();
    server.await.unwrap();

    match err {
        UploadError::Status { url, status } => {
            assert_eq!(status, 500);
            assert!(url.ends_with("/api/v1/agent/scan"), "{url}");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}
