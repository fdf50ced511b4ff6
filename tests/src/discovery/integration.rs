#![cfg(test)]
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;

use assetronics_common::config::{ApiConfig, ProbeMethod, ScanConfig};
use assetronics_common::error::ScanError;
use assetronics_core::api::InventoryClient;
use assetronics_core::discovery::DiscoveryService;
use assetronics_core::scanner::NetworkScanner;

use crate::support::respond_once;

/// A port that was free a moment ago and is now closed again.
fn closed_port() -> u16 {
    let listener = std::net::TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
    listener.local_addr().unwrap().port()
}

fn tcp_only(port: u16) -> ScanConfig {
    ScanConfig {
        probe_method: ProbeMethod::Tcp,
        reachability_ports: vec![port],
        fingerprint_ports: vec![closed_port(), port],
        no_dns: true,
        ..ScanConfig::default()
    }
}

/// Verifies that the real probe pipeline finds a listening loopback service
/// and reports exactly the fingerprint port that accepts connections.
#[tokio::test]
async fn discovery_single_loopback() {
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let result = NetworkScanner::from_config(&tcp_only(port))
        .scan("127.0.0.1/32")
        .await
        .unwrap();

    assert_eq!(result.range, "127.0.0.1/32");
    assert_eq!(result.devices.len(), 1, "{result:?}");
    let device = &result.devices[0];
    assert_eq!(device.ip, Ipv4Addr::LOCALHOST);
    assert_eq!(device.ports, vec![port]);
    assert_eq!(device.hostname, "");
}

#[tokio::test]
async fn discovery_range_loopback_skips_boundaries() {
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let result = NetworkScanner::from_config(&tcp_only(port))
        .scan("127.0.0.0/30")
        .await
        .unwrap();

    // Only 127.0.0.1 has the listener. .0 and .3 are never probed.
    let ips: Vec<Ipv4Addr> = result.devices.iter().map(|d| d.ip).collect();
    assert_eq!(ips, vec![Ipv4Addr::LOCALHOST]);
}

#[tokio::test]
async fn invalid_ranges_fail_before_probing() {
    let scanner = NetworkScanner::from_config(&tcp_only(closed_port()));
    for input in ["not-a-cidr", "10.0.0.0/33"] {
        assert!(matches!(
            scanner.scan(input).await,
            Err(ScanError::InvalidRange { .. })
        ));
    }
}

#[tokio::test]
async fn discovered_devices_reach_inventory_service() {
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let (addr, server) = respond_once(200).await;

    let api = InventoryClient::new(&ApiConfig {
        api_url: format!("http://{addr}"),
        api_key: None,
        tenant_id: Some("acme".to_string()),
        request_timeout: Duration::from_secs(5),
    })
    .unwrap();
    let service = DiscoveryService::new(
        Box::new(NetworkScanner::from_config(&tcp_only(port))),
        Arc::new(api),
    );

    let result = service.perform_discovery("127.0.0.1/32").await.unwrap();
    service.report(&result).await.unwrap();

    let request = server.await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
    assert_eq!(body["devices"][0]["ip"], "127.0.0.1");
    assert_eq!(body["devices"][0]["open_ports"], serde_json::json!([port]));
}

#[tokio::test]
#[ignore]
async fn discovery_default_probe_reaches_loopback() {
    let result = NetworkScanner::from_config(&ScanConfig::default())
        .scan("127.0.0.1/32")
        .await
        .unwrap();
    assert_eq!(result.devices.len(), 1);
}
