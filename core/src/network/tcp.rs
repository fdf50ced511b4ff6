use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::trace;

/// Completes a TCP handshake against `addr` within `connect_timeout`.
///
/// Refused and timed-out connections are both reported as closed.
pub async fn handshake_probe(addr: SocketAddr, connect_timeout: Duration) -> bool {
    match timeout(connect_timeout, TcpStream::connect(addr)).await {
        Ok(Ok(_stream)) => true,
        Ok(Err(e)) => {
            trace!("{addr} refused: {e}");
            false
        }
        Err(_elapsed) => false,
    }
}

/// Tries `ports` in order and returns the first one that accepts.
pub async fn first_open_port(addr: IpAddr, ports: &[u16], connect_timeout: Duration) -> Option<u16> {
    for &port in ports {
        if handshake_probe(SocketAddr::new(addr, port), connect_timeout).await {
            return Some(port);
        }
    }
    None
}

/// Tries every port in order and keeps the ones that accept.
pub async fn open_ports(addr: IpAddr, ports: &[u16], connect_timeout: Duration) -> Vec<u16> {
    let mut open: Vec<u16> = Vec::new();
    for &port in ports {
        if handshake_probe(SocketAddr::new(addr, port), connect_timeout).await {
            open.push(port);
        }
    }
    open
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
