use std::net::Ipv4Addr;

use async_trait::async_trait;
use tracing::debug;

use assetronics_common::config::ScanConfig;
use assetronics_common::scanning::{HostProber, ReachabilityProbe};

use super::ports::PortFingerprint;
use super::reachability;
use super::resolver::HostnameResolver;

/// The production pipeline stages, talking to the real network.
pub struct NetworkProber {
    reachability: Box<dyn ReachabilityProbe>,
    resolver: Option<HostnameResolver>,
    fingerprint: PortFingerprint,
}

impl NetworkProber {
    pub fn new(
        reachability: Box<dyn ReachabilityProbe>,
        resolver: Option<HostnameResolver>,
        fingerprint: PortFingerprint,
    ) -> Self {
        Self {
            reachability,
            resolver,
            fingerprint,
        }
    }

    pub fn from_config(cfg: &ScanConfig) -> Self {
        let reachability = reachability::from_config(cfg);
        debug!("Reachability detection via {}", reachability.name());

        let resolver = (!cfg.no_dns).then(|| HostnameResolver::new(cfg.resolve_timeout));
        Self::new(
            reachability,
            resolver,
            PortFingerprint::new(&cfg.fingerprint_ports, cfg.connect_timeout),
        )
    }
}

#[async_trait]
impl HostProber for NetworkProber {
    async fn is_reachable(&self, addr: Ipv4Addr) -> bool {
        self.reachability.probe(addr).await
    }

    async fn resolve_hostname(&self, addr: Ipv4Addr) -> String {
        match &self.resolver {
            Some(resolver) => resolver.resolve(addr).await,
            None => String::new(),
        }
    }

    async fn open_ports(&self, addr: Ipv4Addr) -> Vec<u16> {
        self.fingerprint.scan(addr).await
    }
}
