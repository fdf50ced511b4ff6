//! # Host Facts
//!
//! The record an endpoint agent reports at every check-in.

use serde::{Deserialize, Serialize};

use crate::error::CollectionError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemInfo {
    pub hostname: String,
    pub username: String,
    pub serial_number: String,
    pub os: String,
    pub platform: String,
    pub ip_address: String,
    pub mac_address: String,
    pub make: String,
    pub model: String,
    pub cpu_model: String,
    pub cpu_cores: u32,
    pub ram_gb: u64,
    pub disk_total_gb: u64,
    pub disk_free_gb: u64,
    pub installed_software: Vec<Software>,
}

/// One installed package or application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Software {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    /// `YYYY-MM-DD`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install_date: Option<String>,
}

impl Software {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }
}

/// Gathers the facts of the local machine.
///
/// Collection is blocking (subprocesses, sysfs reads); async callers should
/// run it on the blocking pool.
pub trait HostCollector: Send + Sync {
    fn collect(&self) -> Result<SystemInfo, CollectionError>;
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
