//! # Reachability Detection
//!
//! Decides whether one address is present, tolerating networks that filter
//! ICMP. A primary probe (the platform `ping` utility or a raw ICMP socket)
//! is authoritative when it succeeds; otherwise a short list of commonly
//! open TCP ports is tried before the host is declared absent.

use std::net::{IpAddr, Ipv4Addr};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use is_root::is_root;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, trace, warn};

use assetronics_common::config::{ProbeMethod, ScanConfig};
use assetronics_common::scanning::ReachabilityProbe;

use crate::network::{tcp, transport};

/// Extra time granted to the `ping` process on top of its own wait, covering
/// process start-up. The child is killed once this runs out.
const PING_GRACE: Duration = Duration::from_millis(500);

/// Shells out to the platform `ping` utility for a single echo request.
pub struct PingCommand {
    wait: Duration,
}

impl PingCommand {
    pub fn new(wait: Duration) -> Self {
        Self { wait }
    }
}

#[async_trait]
impl ReachabilityProbe for PingCommand {
    async fn probe(&self, addr: Ipv4Addr) -> bool {
        let mut command = Command::new("ping");
        command
            .args(ping_args(addr, self.wait))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        match timeout(self.wait + PING_GRACE, command.status()).await {
            Ok(Ok(status)) => status.success(),
            Ok(Err(e)) => {
                debug!("could not run ping for {addr}: {e}");
                false
            }
            Err(_elapsed) => {
                trace!("ping for {addr} did not exit in time");
                false
            }
        }
    }

    fn name(&self) -> &'static str {
        "ping"
    }
}

/// Arguments for one echo request with roughly `wait` to answer.
fn ping_args(addr: Ipv4Addr, wait: Duration) -> Vec<String> {
    let target = addr.to_string();

    #[cfg(target_os = "windows")]
    {
        let millis = wait.as_millis().max(1).to_string();
        vec!["-n".into(), "1".into(), "-w".into(), millis, target]
    }
    #[cfg(target_os = "macos")]
    {
        let secs = wait.as_secs().max(1).to_string();
        vec!["-c".into(), "1".into(), "-t".into(), secs, target]
    }
    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        let secs = wait.as_secs().max(1).to_string();
        vec!["-c".into(), "1".into(), "-W".into(), secs, target]
    }
}

/// Raw ICMP echo. Needs root.
pub struct IcmpEcho {
    wait: Duration,
}

impl IcmpEcho {
    pub fn new(wait: Duration) -> Self {
        Self { wait }
    }
}

#[async_trait]
impl ReachabilityProbe for IcmpEcho {
    async fn probe(&self, addr: Ipv4Addr) -> bool {
        let wait = self.wait;
        match tokio::task::spawn_blocking(move || transport::icmp_echo(addr, wait)).await {
            Ok(Ok(answered)) => answered,
            Ok(Err(e)) => {
                debug!("ICMP echo to {addr} failed: {e:#}");
                false
            }
            Err(e) => {
                warn!("ICMP echo task for {addr} did not complete: {e}");
                false
            }
        }
    }

    fn name(&self) -> &'static str {
        "icmp"
    }
}

/// Present if any of `ports` completes a handshake. Stops at the first one.
pub struct TcpConnect {
    ports: Vec<u16>,
    connect_timeout: Duration,
}

impl TcpConnect {
    pub fn new(ports: Vec<u16>, connect_timeout: Duration) -> Self {
        Self {
            ports,
            connect_timeout,
        }
    }
}

#[async_trait]
impl ReachabilityProbe for TcpConnect {
    async fn probe(&self, addr: Ipv4Addr) -> bool {
        match tcp::first_open_port(IpAddr::V4(addr), &self.ports, self.connect_timeout).await {
            Some(port) => {
                trace!("{addr} answered on tcp/{port}");
                true
            }
            None => false,
        }
    }

    fn name(&self) -> &'static str {
        "tcp"
    }
}

/// Runs `primary`; only when it fails is `fallback` consulted.
pub struct Fallback {
    primary: Box<dyn ReachabilityProbe>,
    fallback: Box<dyn ReachabilityProbe>,
}

impl Fallback {
    pub fn new(primary: Box<dyn ReachabilityProbe>, fallback: Box<dyn ReachabilityProbe>) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait]
impl ReachabilityProbe for Fallback {
    async fn probe(&self, addr: Ipv4Addr) -> bool {
        if self.primary.probe(addr).await {
            return true;
        }
        trace!(
            "{addr} silent to {}, trying {}",
            self.primary.name(),
            self.fallback.name()
        );
        self.fallback.probe(addr).await
    }

    fn name(&self) -> &'static str {
        self.primary.name()
    }
}

/// Builds the detector selected by `cfg.probe_method`.
///
/// `Auto` prefers a raw ICMP socket when running as root and the `ping`
/// utility otherwise. Every method except `Tcp` keeps the TCP fallback.
pub fn from_config(cfg: &ScanConfig) -> Box<dyn ReachabilityProbe> {
    let tcp_fallback = TcpConnect::new(cfg.reachability_ports.clone(), cfg.connect_timeout);

    let primary: Box<dyn ReachabilityProbe> = match cfg.probe_method {
        ProbeMethod::Tcp => return Box::new(tcp_fallback),
        ProbeMethod::Icmp => Box::new(IcmpEcho::new(cfg.ping_timeout)),
        ProbeMethod::Ping => Box::new(PingCommand::new(cfg.ping_timeout)),
        ProbeMethod::Auto if is_root() => Box::new(IcmpEcho::new(cfg.ping_timeout)),
        ProbeMethod::Auto => Box::new(PingCommand::new(cfg.ping_timeout)),
    };

    Box::new(Fallback::new(primary, Box::new(tcp_fallback)))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
