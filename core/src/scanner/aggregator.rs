use std::collections::HashSet;
use std::net::Ipv4Addr;

use tracing::debug;

use assetronics_common::network::device::{Device, ScanResult};

/// Collects devices as pipelines report them and assembles the final result.
#[derive(Debug)]
pub struct Aggregator {
    range: String,
    devices: Vec<Device>,
    seen: HashSet<Ipv4Addr>,
}

impl Aggregator {
    pub fn new(range: impl Into<String>) -> Self {
        Self {
            range: range.into(),
            devices: Vec::new(),
            seen: HashSet::new(),
        }
    }

    /// Keeps the first record of every address.
    pub fn push(&mut self, device: Device) {
        if self.seen.insert(device.ip) {
            self.devices.push(device);
        } else {
            debug!("dropping duplicate record for {}", device.ip);
        }
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn finish(self) -> ScanResult {
        ScanResult {
            range: self.range,
            devices: self.devices,
        }
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_arrival_order_and_first_record() {
        let mut aggregator = Aggregator::new("10.0.0.0/29");
        aggregator.push(Device::online(Ipv4Addr::new(10, 0, 0, 3)).with_ports(vec![22]));
        aggregator.push(Device::online(Ipv4Addr::new(10, 0, 0, 1)));
        aggregator.push(Device::online(Ipv4Addr::new(10, 0, 0, 3)).with_ports(vec![80]));

        assert_eq!(aggregator.len(), 2);
        let result = aggregator.finish();
        assert_eq!(result.range, "10.0.0.0/29");
        assert_eq!(result.devices[0].ip, Ipv4Addr::new(10, 0, 0, 3));
        assert_eq!(result.devices[0].ports, vec![22]);
        assert_eq!(result.devices[1].ip, Ipv4Addr::new(10, 0, 0, 1));
    }

    #[test]
    fn empty_aggregation_yields_empty_result() {
        let aggregator = Aggregator::new("10.0.0.0/32");
        assert_eq!(aggregator.len(), 0);
        assert_eq!(aggregator.finish(), ScanResult::empty("10.0.0.0/32"));
    }
}
