//! Process-wide configuration.
//!
//! Built once at start-up by the CLI and handed down explicitly. Nothing in
//! the workspace reads configuration from global state.

use std::str::FromStr;
use std::time::Duration;

/// Upper bound of probe pipelines in flight at any instant.
pub const DEFAULT_MAX_CONCURRENCY: usize = 50;

/// Ports tried, in order, when the primary reachability probe fails.
pub const REACHABILITY_PORTS: [u16; 5] = [80, 443, 135, 445, 22];

/// FTP, SSH, Telnet, HTTP, HTTPS, SMB, RDP, alt-HTTP and raw printing.
pub const FINGERPRINT_PORTS: [u16; 9] = [21, 22, 23, 80, 443, 445, 3389, 8080, 9100];

pub const DEFAULT_API_URL: &str = "http://localhost:4000/api/v1";

/// How the reachability detector decides a host is present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProbeMethod {
    /// Raw ICMP when privileged, the `ping` utility otherwise. TCP fallback.
    #[default]
    Auto,
    /// Always shell out to `ping`, with TCP fallback.
    Ping,
    /// Always use a raw ICMP socket, with TCP fallback. Requires root.
    Icmp,
    /// TCP connects only.
    Tcp,
}

impl FromStr for ProbeMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "ping" => Ok(Self::Ping),
            "icmp" => Ok(Self::Icmp),
            "tcp" => Ok(Self::Tcp),
            _ => Err(format!("unknown probe method '{s}' (expected auto, ping, icmp or tcp)")),
        }
    }
}

/// Tuning of a single network sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    pub max_concurrency: usize,
    /// Wait for the single echo reply of the primary probe.
    pub ping_timeout: Duration,
    /// Applied to every TCP dial, for both fallback and fingerprinting.
    pub connect_timeout: Duration,
    pub resolve_timeout: Duration,
    pub reachability_ports: Vec<u16>,
    pub fingerprint_ports: Vec<u16>,
    pub probe_method: ProbeMethod,
    /// Disables reverse lookups. Hostnames stay empty.
    pub no_dns: bool,
    /// Whole-sweep bound. `None` waits for every pipeline.
    pub scan_deadline: Option<Duration>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            ping_timeout: Duration::from_secs(1),
            connect_timeout: Duration::from_millis(500),
            resolve_timeout: Duration::from_secs(2),
            reachability_ports: REACHABILITY_PORTS.to_vec(),
            fingerprint_ports: FINGERPRINT_PORTS.to_vec(),
            probe_method: ProbeMethod::Auto,
            no_dns: false,
            scan_deadline: None,
        }
    }
}

/// Connection settings for the inventory service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    pub tenant_id: Option<String>,
    pub request_timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: None,
            tenant_id: None,
            request_timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentConfig {
    /// Time between two check-ins in endpoint mode.
    pub interval: Duration,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(3600),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub api: ApiConfig,
    pub scan: ScanConfig,
    pub agent: AgentConfig,
    /// Print payloads instead of uploading them.
    pub dry_run: bool,
    pub quiet: u8,
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

    #[test]
    fn scan_defaults_match_agent_behaviour() {
        let cfg = ScanConfig::default();
        assert_eq!(cfg.max_concurrency, 50);
        assert_eq!(cfg.ping_timeout, Duration::from_secs(1));
        assert_eq!(cfg.connect_timeout, Duration::from_millis(500));
        assert_eq!(cfg.reachability_ports, vec![80, 443, 135, 445, 22]);
        assert_eq!(
            cfg.fingerprint_ports,
            vec![21, 22, 23, 80, 443, 445, 3389, 8080, 9100]
        );
        assert!(cfg.scan_deadline.is_none());
    }

    #[test]
    fn probe_method_from_str() {
        assert_eq!("auto".parse::<ProbeMethod>(), Ok(ProbeMethod::Auto));
        assert_eq!("PING".parse::<ProbeMethod>(), Ok(ProbeMethod::Ping));
        assert_eq!("Icmp".parse::<ProbeMethod>(), Ok(ProbeMethod::Icmp));
        assert_eq!("tcp".parse::<ProbeMethod>(), Ok(ProbeMethod::Tcp));
        assert!("arp".parse::<ProbeMethod>().is_err());
    }

    #[test]
    fn api_defaults() {
        let api = ApiConfig::default();
        assert_eq!(api.api_url, "http://localhost:4000/api/v1");
        assert_eq!(api.request_timeout, Duration::from_secs(10));
        assert!(api.tenant_id.is_none());
        assert_eq!(AgentConfig::default().interval, Duration::from_secs(3600));
    }
}
