//! # Discovery Models
//!
//! The records produced by a sweep and uploaded to the inventory service.
//! Serialized field names are part of the service contract.

use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

/// Only reachable hosts are ever recorded, so `Online` is the sole state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceStatus {
    #[default]
    Online,
}

/// One discovered host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub ip: Ipv4Addr,
    /// Reverse-resolved name, empty when resolution yielded nothing.
    pub hostname: String,
    /// Reserved. No ARP access is performed.
    pub mac: String,
    /// Fingerprint ports that accepted a connection, in probe order.
    #[serde(rename = "open_ports")]
    pub ports: Vec<u16>,
    /// Reserved. No OUI lookup is performed.
    pub vendor: String,
    pub status: DeviceStatus,
}

impl Device {
    /// A reachable host with nothing else known about it yet.
    pub fn online(ip: Ipv4Addr) -> Self {
        Self {
            ip,
            hostname: String::new(),
            mac: String::new(),
            ports: Vec::new(),
            vendor: String::new(),
            status: DeviceStatus::Online,
        }
    }

    pub fn with_hostname(mut self, hostname: String) -> Self {
        self.hostname = hostname;
        self
    }

    pub fn with_ports(mut self, ports: Vec<u16>) -> Self {
        self.ports = ports;
        self
    }
}

/// One completed sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
    /// The CIDR that was scanned, verbatim.
    pub range: String,
    /// Arrival order of the probe pipelines. Not sorted.
    pub devices: Vec<Device>,
}

impl ScanResult {
    pub fn empty(range: impl Into<String>) -> Self {
        Self {
            range: range.into(),
            devices: Vec::new(),
        }
    }

    pub fn device(&self, ip: Ipv4Addr) -> Option<&Device> {
        self.devices.iter().find(|device| device.ip == ip)
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
