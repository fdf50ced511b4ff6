use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use colored::*;
use indicatif::ProgressStyle;
use tracing::{Instrument, info_span};
use tracing_indicatif::span_ext::IndicatifSpanExt;

use crate::mprint;
use crate::terminal::{colors, print};
use assetronics_common::config::Config;
use assetronics_common::network::device::{Device, ScanResult};
use assetronics_common::network::range::HostRange;
use assetronics_common::success;
use assetronics_core::api::InventoryClient;
use assetronics_core::discovery::DiscoveryService;
use assetronics_core::scanner::NetworkScanner;

type Detail = (String, ColoredString);

pub async fn scan(target: &str, cfg: &Config) -> anyhow::Result<()> {
    let candidates = HostRange::parse(target)?.candidates().len();

    let span = info_span!("scan", indicatif.pb_show = true);
    span.pb_set_style(&ProgressStyle::with_template(
        "{spinner:.blue} {wide_bar:.green/white} {pos}/{len} hosts",
    )?);
    span.pb_set_length(candidates);

    let progress_span = span.clone();
    let scanner = NetworkScanner::from_config(&cfg.scan).with_progress(Arc::new(
        move |done: u64, _total: u64| progress_span.pb_set_position(done),
    ));
    let service = DiscoveryService::new(
        Box::new(scanner),
        Arc::new(InventoryClient::new(&cfg.api)?),
    );

    let start_time: Instant = Instant::now();
    let result: ScanResult = service.perform_discovery(target).instrument(span).await?;

    discovery_ends(&result, start_time.elapsed(), cfg);

    if cfg.dry_run {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }
    service.report(&result).await
}

fn discovery_ends(result: &ScanResult, total_time: Duration, cfg: &Config) {
    if result.devices.is_empty() {
        no_hosts_found(cfg);
        return;
    }

    if cfg.quiet > 0 {
        mprint!();
    }

    print::header("Network Discovery", cfg.quiet);
    let mut devices: Vec<&Device> = result.devices.iter().collect();
    devices.sort_by_key(|device| device.ip);
    print_devices(&devices, cfg);
    print_summary(devices.len(), total_time, cfg);
}

fn no_hosts_found(cfg: &Config) {
    print::header("ZERO HOSTS DETECTED", cfg.quiet);
    if cfg.quiet == 0 {
        print::no_results();
    }
}

fn print_devices(devices: &[&Device], cfg: &Config) {
    for (idx, device) in devices.iter().enumerate() {
        match cfg.quiet {
            2.. => {}
            _ => print_device_tree(device, idx),
        }
        if idx + 1 != devices.len() && cfg.quiet < 2 {
            mprint!();
        }
    }
}

fn print_summary(hosts_len: usize, total_time: Duration, cfg: &Config) {
    let active_hosts: ColoredString = format!("{hosts_len} active hosts").bold().green();
    let total_time: ColoredString = format!("{:.2}s", total_time.as_secs_f64()).bold().yellow();
    let output: &ColoredString = &format!("Discovery Complete: {active_hosts} identified in {total_time}")
        .color(colors::TEXT_DEFAULT);

    match cfg.quiet {
        0 => {
            print::fat_separator();
            print::centerln(output);
            print::fat_separator();
        }
        _ => {
            mprint!();
            success!("{}", output)
        }
    }
}

fn print_device_tree(device: &Device, idx: usize) {
    let name = if device.hostname.is_empty() {
        "No hostname"
    } else {
        device.hostname.as_str()
    };
    print::device_tree(idx, name, &device_details(device.ip, &device.ports));
}

fn device_details(ip: Ipv4Addr, ports: &[u16]) -> Vec<Detail> {
    let ports: ColoredString = if ports.is_empty() {
        "none".color(colors::EMPTY)
    } else {
        ports
            .iter()
            .map(u16::to_string)
            .collect::<Vec<String>>()
            .join(", ")
            .color(colors::PORTS)
    };

    vec![
        ("IPv4".to_string(), ip.to_string().color(colors::IPV4_ADDR)),
        ("Ports".to_string(), ports),
    ]
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
    fn details_list_ip_then_ports() {
        let details = device_details(Ipv4Addr::new(10, 0, 0, 1), &[22, 80]);
        assert_eq!(details[0].0, "IPv4");
        assert_eq!(&*details[0].1, "10.0.0.1");
        assert_eq!(&*details[1].1, "22, 80");
    }

    #[test]
    fn no_open_ports_reads_none() {
        let details = device_details(Ipv4Addr::new(10, 0, 0, 2), &[]);
        assert_eq!(&*details[1].1, "none");
    }
}
