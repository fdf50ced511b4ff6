//! # Host Facts Collector
//!
//! Gathers hardware, OS, network and software facts about the machine the
//! agent runs on. Everything here blocks (sysfs reads, package manager
//! subprocesses) and is meant to run on the blocking pool.
//!
//! Only a missing hostname is fatal. Every other fact degrades to an empty
//! or placeholder value.

use std::collections::HashMap;
use std::path::Path;
use std::process::Command;

use chrono::{DateTime, NaiveDate};
use pnet::datalink;
use serde::Deserialize;
use sysinfo::{CpuExt, DiskExt, System, SystemExt};
use tracing::{debug, warn};

use assetronics_common::error::CollectionError;
use assetronics_common::system::{HostCollector, Software, SystemInfo};
use assetronics_common::utils::interface::primary_address;

const GIB: u64 = 1024 * 1024 * 1024;
const UNKNOWN_SERIAL: &str = "UNKNOWN";

#[derive(Debug, Default)]
pub struct SystemCollector;

impl SystemCollector {
    pub fn new() -> Self {
        Self
    }
}

impl HostCollector for SystemCollector {
    fn collect(&self) -> Result<SystemInfo, CollectionError> {
        let sys = System::new_all();

        let hostname = sys.host_name().ok_or(CollectionError::Hostname)?;
        let mut info = SystemInfo {
            hostname,
            username: current_username(),
            os: os_name(&sys),
            platform: std::env::consts::OS.to_string(),
            ..SystemInfo::default()
        };

        match primary_address(&datalink::interfaces()) {
            Some(primary) => {
                info.ip_address = primary.ip.to_string();
                info.mac_address = primary.mac.map(|mac| mac.to_string()).unwrap_or_default();
            }
            None => debug!("No active network interface found"),
        }

        let hardware = hardware_identity();
        info.serial_number = hardware.serial;
        info.make = hardware.make;
        info.model = hardware.model;

        info.cpu_model = sys
            .cpus()
            .first()
            .map(|cpu| cpu.brand().trim().to_string())
            .filter(|brand| !brand.is_empty())
            .unwrap_or_else(|| "Unknown".to_string());
        let cores = sys.physical_core_count().unwrap_or(sys.cpus().len()).max(1);
        info.cpu_cores = u32::try_from(cores).unwrap_or(u32::MAX);
        info.ram_gb = sys.total_memory() / GIB;

        let root = Path::new(if cfg!(windows) { "C:\\" } else { "/" });
        if let Some(disk) = sys
            .disks()
            .iter()
            .find(|disk| disk.mount_point() == root)
            .or_else(|| sys.disks().first())
        {
            info.disk_total_gb = disk.total_space() / GIB;
            info.disk_free_gb = disk.available_space() / GIB;
        }

        info.installed_software = installed_software();
        debug!(
            "Collected facts for {} ({} packages)",
            info.hostname,
            info.installed_software.len()
        );
        Ok(info)
    }
}

fn current_username() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_default()
}

fn os_name(sys: &System) -> String {
    #[cfg(target_os = "linux")]
    {
        if let Some(name) = std::fs::read_to_string("/etc/os-release")
            .ok()
            .and_then(|content| parse_os_release(&content))
        {
            return name;
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(version) = sys.os_version() {
            return format!("macOS {version}");
        }
    }

    sys.long_os_version()
        .unwrap_or_else(|| std::env::consts::OS.to_string())
}

/// `PRETTY_NAME`, falling back to `NAME`.
fn parse_os_release(content: &str) -> Option<String> {
    let field = |key: &str| {
        content
            .lines()
            .filter_map(|line| line.split_once('='))
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.trim().trim_matches('"').trim_matches('\'').to_string())
            .filter(|v| !v.is_empty())
    };
    field("PRETTY_NAME").or_else(|| field("NAME"))
}

struct HardwareIdentity {
    serial: String,
    make: String,
    model: String,
}

#[cfg(target_os = "linux")]
fn hardware_identity() -> HardwareIdentity {
    let read = |name: &str| {
        std::fs::read_to_string(format!("/sys/class/dmi/id/{name}"))
            .map(|content| content.trim().to_string())
    };

    HardwareIdentity {
        serial: read("product_serial").unwrap_or_else(|e| {
            debug!("Serial number unavailable: {e}");
            UNKNOWN_SERIAL.to_string()
        }),
        make: read("sys_vendor").unwrap_or_default(),
        model: read("product_name").unwrap_or_default(),
    }
}

#[cfg(target_os = "macos")]
fn hardware_identity() -> HardwareIdentity {
    let serial = command_output("ioreg", &["-c", "IOPlatformExpertDevice", "-d", "2"])
        .as_deref()
        .and_then(parse_ioreg_serial)
        .unwrap_or_else(|| UNKNOWN_SERIAL.to_string());

    HardwareIdentity {
        serial,
        make: "Apple".to_string(),
        model: command_output("sysctl", &["-n", "hw.model"])
            .map(|model| model.trim().to_string())
            .unwrap_or_default(),
    }
}

#[cfg(target_os = "windows")]
fn hardware_identity() -> HardwareIdentity {
    let serial = command_output("wmic", &["bios", "get", "SerialNumber", "/format:csv"])
        .and_then(|output| parse_wmic_csv(&output).into_iter().next())
        .and_then(|mut row| row.remove("SerialNumber"))
        .filter(|serial| !serial.is_empty())
        .unwrap_or_else(|| {
            debug!("Serial number unavailable from wmic bios");
            UNKNOWN_SERIAL.to_string()
        });

    let mut product = command_output("wmic", &["csproduct", "get", "Vendor,Name", "/format:csv"])
        .and_then(|output| parse_wmic_csv(&output).into_iter().next())
        .unwrap_or_default();

    HardwareIdentity {
        serial,
        make: product.remove("Vendor").unwrap_or_default(),
        model: product.remove("Name").unwrap_or_default(),
    }
}

#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
fn hardware_identity() -> HardwareIdentity {
    HardwareIdentity {
        serial: UNKNOWN_SERIAL.to_string(),
        make: String::new(),
        model: String::new(),
    }
}

#[cfg(target_os = "macos")]
fn parse_ioreg_serial(output: &str) -> Option<String> {
    output
        .lines()
        .find(|line| line.contains("IOPlatformSerialNumber"))
        .and_then(|line| line.split_once('='))
        .map(|(_, value)| value.trim().trim_matches('"').to_string())
}

/// Stdout of a successful run, `None` otherwise.
#[cfg_attr(
    not(any(target_os = "linux", target_os = "macos", target_os = "windows")),
    allow(dead_code)
)]
fn command_output(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    Some(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[cfg(target_os = "linux")]
fn installed_software() -> Vec<Software> {
    if let Some(listing) = command_output("dpkg", &["-l"]) {
        return parse_dpkg(&listing);
    }
    let query = "%{NAME}|%{VERSION}|%{VENDOR}|%{INSTALLTIME}\n";
    if let Some(listing) = command_output("rpm", &["-qa", "--queryformat", query]) {
        return parse_rpm(&listing);
    }
    warn!("Failed to get software inventory: neither dpkg nor rpm is usable");
    Vec::new()
}

#[cfg(target_os = "macos")]
fn installed_software() -> Vec<Software> {
    if let Some(listing) = command_output("system_profiler", &["SPApplicationsDataType", "-json"]) {
        match parse_system_profiler(&listing) {
            Ok(software) => return software,
            Err(e) => warn!("Failed to parse system_profiler output: {e}"),
        }
    }

    match std::fs::read_dir("/Applications") {
        Ok(entries) => entries
            .filter_map(Result::ok)
            .filter_map(|entry| app_bundle_name(&entry.file_name().to_string_lossy()))
            .map(Software::new)
            .collect(),
        Err(e) => {
            warn!("Failed to get software inventory: {e}");
            Vec::new()
        }
    }
}

#[cfg(target_os = "windows")]
fn installed_software() -> Vec<Software> {
    let args = ["product", "get", "Name,Version,Vendor,InstallDate", "/format:csv"];
    let Some(listing) = command_output("wmic", &args) else {
        warn!("Failed to get software inventory: wmic product is not usable");
        return Vec::new();
    };

    parse_wmic_csv(&listing)
        .into_iter()
        .filter_map(|mut row| {
            let name = row.remove("Name").filter(|name| !name.is_empty())?;
            Some(Software {
                name,
                version: row.remove("Version").as_deref().and_then(non_empty),
                vendor: row.remove("Vendor").as_deref().and_then(non_empty),
                install_date: row.remove("InstallDate").as_deref().and_then(wmic_date),
            })
        })
        .collect()
}

#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
fn installed_software() -> Vec<Software> {
    debug!("No software inventory source on this platform");
    Vec::new()
}

/// Installed (`ii`) and held (`hi`) entries of `dpkg -l`.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn parse_dpkg(listing: &str) -> Vec<Software> {
    listing
        .lines()
        .filter(|line| line.starts_with("ii ") || line.starts_with("hi "))
        .filter_map(|line| {
            let mut fields = line.split_whitespace().skip(1);
            let name = fields.next()?;
            let version = fields.next()?;
            Some(Software::new(name).with_version(version))
        })
        .collect()
}

/// Lines of `NAME|VERSION|VENDOR|INSTALLTIME`, the last one in Unix seconds.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn parse_rpm(listing: &str) -> Vec<Software> {
    listing
        .lines()
        .filter_map(|line| {
            let parts: Vec<&str> = line.split('|').collect();
            if parts.len() < 4 {
                return None;
            }
            let install_date = parts[3]
                .trim()
                .parse::<i64>()
                .ok()
                .and_then(|secs| DateTime::from_timestamp(secs, 0))
                .map(|at| at.format("%Y-%m-%d").to_string());

            Some(Software {
                name: parts[0].to_string(),
                version: non_empty(parts[1]),
                vendor: non_empty(parts[2]),
                install_date,
            })
        })
        .collect()
}

#[cfg_attr(not(any(target_os = "linux", target_os = "windows")), allow(dead_code))]
fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty() && value != "(none)").then(|| value.to_string())
}

#[cfg_attr(not(target_os = "macos"), allow(dead_code))]
fn app_bundle_name(file_name: &str) -> Option<String> {
    file_name
        .strip_suffix(".app")
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}

#[cfg_attr(not(target_os = "macos"), allow(dead_code))]
#[derive(Debug, Deserialize)]
struct ApplicationsReport {
    #[serde(rename = "SPApplicationsDataType", default)]
    applications: Vec<ApplicationEntry>,
}

#[cfg_attr(not(target_os = "macos"), allow(dead_code))]
#[derive(Debug, Deserialize)]
struct ApplicationEntry {
    #[serde(rename = "_name")]
    name: Option<String>,
    path: Option<String>,
    version: Option<String>,
}

/// `system_profiler SPApplicationsDataType -json`. Entries without a
/// `_name` are named after their bundle path.
#[cfg_attr(not(target_os = "macos"), allow(dead_code))]
fn parse_system_profiler(json: &str) -> Result<Vec<Software>, serde_json::Error> {
    let report: ApplicationsReport = serde_json::from_str(json)?;

    Ok(report
        .applications
        .into_iter()
        .filter_map(|app| {
            let name = app
                .name
                .filter(|name| !name.trim().is_empty())
                .or_else(|| {
                    app.path
                        .as_deref()
                        .and_then(|path| path.rsplit('/').next())
                        .and_then(app_bundle_name)
                })?;
            Some(Software {
                name: name.trim().to_string(),
                version: app.version.filter(|v| !v.trim().is_empty()),
                vendor: None,
                install_date: None,
            })
        })
        .collect())
}

/// Rows of `wmic ... /format:csv`, keyed by the header row's column names.
///
/// wmic pads its output with blank lines and `\r\r\n` endings. Rows whose
/// field count differs from the header (unquoted commas in a value) are
/// skipped.
#[cfg_attr(not(target_os = "windows"), allow(dead_code))]
fn parse_wmic_csv(output: &str) -> Vec<HashMap<String, String>> {
    let mut lines = output.lines().map(str::trim).filter(|line| !line.is_empty());
    let Some(header) = lines.next() else {
        return Vec::new();
    };
    let columns: Vec<&str> = header.split(',').map(str::trim).collect();

    lines
        .filter_map(|line| {
            let fields: Vec<&str> = line.split(',').collect();
            if fields.len() != columns.len() {
                debug!("Skipping malformed wmic row: {line}");
                return None;
            }
            Some(
                columns
                    .iter()
                    .zip(fields)
                    .map(|(column, field)| (column.to_string(), field.trim().to_string()))
                    .collect(),
            )
        })
        .collect()
}

/// wmic `InstallDate` is `YYYYMMDD`.
#[cfg_attr(not(target_os = "windows"), allow(dead_code))]
fn wmic_date(value: &str) -> Option<String> {
    NaiveDate::parse_from_str(value.trim(), "%Y%m%d")
        .ok()
        .map(|date| date.format("%Y-%m-%d").to_string())
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
