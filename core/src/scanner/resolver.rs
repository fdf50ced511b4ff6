use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use tokio::time::timeout;
use tracing::trace;

/// Reverse lookups through the system resolver.
#[derive(Debug, Clone)]
pub struct HostnameResolver {
    resolve_timeout: Duration,
}

impl HostnameResolver {
    pub fn new(resolve_timeout: Duration) -> Self {
        Self { resolve_timeout }
    }

    /// Name of `addr`, or an empty string when none can be found in time.
    pub async fn resolve(&self, addr: Ipv4Addr) -> String {
        let ip = IpAddr::V4(addr);
        let lookup = tokio::task::spawn_blocking(move || dns_lookup::lookup_addr(&ip));

        match timeout(self.resolve_timeout, lookup).await {
            Ok(Ok(Ok(name))) => normalize_hostname(&name, addr),
            Ok(Ok(Err(e))) => {
                trace!("no PTR record for {addr}: {e}");
                String::new()
            }
            Ok(Err(e)) => {
                trace!("reverse lookup task for {addr} failed: {e}");
                String::new()
            }
            Err(_elapsed) => {
                trace!("reverse lookup for {addr} timed out");
                String::new()
            }
        }
    }
}

/// Strips the DNS root dot. The resolver answers with the numeric address
/// itself when no PTR record exists, which counts as no name.
fn normalize_hostname(name: &str, addr: Ipv4Addr) -> String {
    let name = name.strip_suffix('.').unwrap_or(name);
    if name.parse::<Ipv4Addr>() == Ok(addr) {
        return String::new();
    }
    name.to_string()
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
