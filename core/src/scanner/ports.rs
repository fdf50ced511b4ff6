//! Open-port fingerprinting of reachable hosts.

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use crate::network::tcp;

/// Probes a fixed list of well-known ports, one after the other.
#[derive(Debug, Clone)]
pub struct PortFingerprint {
    ports: Vec<u16>,
    connect_timeout: Duration,
}

impl PortFingerprint {
    /// Repeated ports are probed once, at their first position.
    pub fn new(ports: &[u16], connect_timeout: Duration) -> Self {
        let mut unique: Vec<u16> = Vec::with_capacity(ports.len());
        for &port in ports {
            if !unique.contains(&port) {
                unique.push(port);
            }
        }
        Self {
            ports: unique,
            connect_timeout,
        }
    }

    pub fn ports(&self) -> &[u16] {
        &self.ports
    }

    /// Ports that accepted a connection, in probe order. Closed and
    /// filtered ports are not told apart.
    pub async fn scan(&self, addr: Ipv4Addr) -> Vec<u16> {
        tcp::open_ports(IpAddr::V4(addr), &self.ports, self.connect_timeout).await
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;
    use assetronics_common::config::FINGERPRINT_PORTS;
    use tokio::net::TcpListener;

    #[test]
    fn duplicates_are_dropped_keeping_order() {
        let fingerprint = PortFingerprint::new(&[80, 22, 80, 443, 22], Duration::from_millis(500));
        assert_eq!(fingerprint.ports(), &[80, 22, 443]);

        let default = PortFingerprint::new(&FINGERPRINT_PORTS, Duration::from_millis(500));
        assert_eq!(default.ports(), &FINGERPRINT_PORTS);
    }

    #[tokio::test]
    async fn reports_only_listening_ports() {
        let first = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
        let second = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
        let closed = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();

        let first_port = first.local_addr().unwrap().port();
        let second_port = second.local_addr().unwrap().port();
        let closed_port = closed.local_addr().unwrap().port();
        drop(closed);

        let fingerprint = PortFingerprint::new(
            &[second_port, closed_port, first_port],
            Duration::from_millis(500),
        );
        assert_eq!(
            fingerprint.scan(Ipv4Addr::LOCALHOST).await,
            vec![second_port, first_port]
        );
    }
}
