//! Capability traits the discovery engine is written against.
//!
//! The engine only knows these seams. Concrete probes live in
//! `assetronics-core`, fakes live in tests.

use std::net::Ipv4Addr;

use async_trait::async_trait;

use crate::error::ScanError;
use crate::network::device::ScanResult;

/// Decides whether a single address is present on the network.
///
/// "Unreachable" is a normal answer, so implementations return `false`
/// rather than an error when every attempt fails.
#[async_trait]
pub trait ReachabilityProbe: Send + Sync {
    async fn probe(&self, addr: Ipv4Addr) -> bool;

    /// Short label used in logs.
    fn name(&self) -> &'static str;
}

/// The three stages of one host pipeline.
#[async_trait]
pub trait HostProber: Send + Sync {
    async fn is_reachable(&self, addr: Ipv4Addr) -> bool;

    /// Best-effort name of a reachable host, empty when unknown.
    async fn resolve_hostname(&self, addr: Ipv4Addr) -> String;

    /// Fingerprint ports accepting connections, in probe order.
    async fn open_ports(&self, addr: Ipv4Addr) -> Vec<u16>;
}

/// Sweeps a CIDR range and returns the finished result.
#[async_trait]
pub trait RangeScanner: Send + Sync {
    async fn scan(&self, cidr: &str) -> Result<ScanResult, ScanError>;
}
