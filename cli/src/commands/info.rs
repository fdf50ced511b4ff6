use assetronics_common::config::Config;
use assetronics_common::system::{HostCollector, SystemInfo};
use assetronics_core::system::SystemCollector;

use crate::terminal::print::{self, KEY_COLUMN};

const KEYS: [&str; 13] = [
    "Hostname", "User", "OS", "Platform", "IPv4", "MAC", "Serial", "Make", "Model", "CPU",
    "Cores", "Memory", "Disk",
];

pub async fn info(cfg: &Config) -> anyhow::Result<()> {
    let info = tokio::task::spawn_blocking(|| SystemCollector::new().collect()).await??;

    if cfg.dry_run {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    print_info(&info);
    Ok(())
}

fn print_info(info: &SystemInfo) {
    let key_width = KEYS.iter().map(|key| key.len()).max().unwrap_or(0);
    KEY_COLUMN.set(key_width);

    for (key, value) in KEYS.iter().zip(values(info)) {
        print::key_value(key, &value);
    }
    print::key_value(
        "Software",
        &format!("{} packages", info.installed_software.len()),
    );
    print::fat_separator();
}

fn values(info: &SystemInfo) -> [String; 13] {
    [
        info.hostname.clone(),
        info.username.clone(),
        info.os.clone(),
        info.platform.clone(),
        info.ip_address.clone(),
        info.mac_address.clone(),
        info.serial_number.clone(),
        info.make.clone(),
        info.model.clone(),
        info.cpu_model.clone(),
        info.cpu_cores.to_string(),
        format!("{} GB", info.ram_gb),
        format!("{} GB free of {} GB", info.disk_free_gb, info.disk_total_gb),
    ]
}
