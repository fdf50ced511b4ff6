use std::net::Ipv4Addr;

use pnet::datalink::{MacAddr, NetworkInterface};
use pnet::ipnetwork::{IpNetwork, Ipv4Network};

pub trait NetworkInterfaceExtension {
    fn get_ipv4_nets(&self) -> Vec<Ipv4Network>;
    /// First IPv4 address that is not a loopback address.
    fn get_routable_ipv4(&self) -> Option<Ipv4Addr>;
}

impl NetworkInterfaceExtension for NetworkInterface {
    fn get_ipv4_nets(&self) -> Vec<Ipv4Network> {
        self.ips
            .iter()
            .filter_map(|ip| {
                if let IpNetwork::V4(ipv4) = ip {
                    Some(*ipv4)
                } else {
                    None
                }
            })
            .collect()
    }

    fn get_routable_ipv4(&self) -> Option<Ipv4Addr> {
        self.get_ipv4_nets()
            .into_iter()
            .map(|net| net.ip())
            .find(|ip| !ip.is_loopback())
    }
}

/// Address and hardware address of the machine's primary interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrimaryAddress {
    pub ip: Ipv4Addr,
    pub mac: Option<MacAddr>,
}

/// Picks the first interface that is up, not a loopback, and carries a
/// routable IPv4 address.
pub fn primary_address(interfaces: &[NetworkInterface]) -> Option<PrimaryAddress> {
    interfaces
        .iter()
        .filter(|intf| intf.is_up() && !intf.is_loopback())
        .find_map(|intf| {
            intf.get_routable_ipv4().map(|ip| PrimaryAddress {
                ip,
                mac: intf.mac,
            })
        })
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
    use pnet::ipnetwork::Ipv6Network;
    use std::net::Ipv6Addr;

    const IFF_UP: u32 = 1;
    const IFF_LOOPBACK: u32 = 1 << 3;

    fn ni(name: &str, mac: Option<MacAddr>, ips: &[IpNetwork], flags: u32) -> NetworkInterface {
        NetworkInterface {
            name: name.into(),
            description: "".into(),
            index: 1,
            mac,
            ips: ips.to_vec(),
            flags,
        }
    }

    fn v4(a: u8, b: u8, c: u8, d: u8, p: u8) -> IpNetwork {
        IpNetwork::V4(Ipv4Network::new(Ipv4Addr::new(a, b, c, d), p).unwrap())
    }

    fn v6(s: &str, p: u8) -> IpNetwork {
        IpNetwork::V6(Ipv6Network::new(s.parse::<Ipv6Addr>().unwrap(), p).unwrap())
    }

    #[test]
    fn skips_loopback_down_and_v6_only_interfaces() {
        let mac = MacAddr::new(0x00, 0x1a, 0x2b, 0x3c, 0x4d, 0x5e);
        let interfaces = vec![
            ni("lo", None, &[v4(127, 0, 0, 1, 8)], IFF_UP | IFF_LOOPBACK),
            ni("eth1", Some(MacAddr::zero()), &[v4(10, 1, 0, 2, 24)], 0),
            ni("wg0", None, &[v6("fd00::1", 64)], IFF_UP),
            ni("eth0", Some(mac), &[v6("fe80::1", 64), v4(192, 168, 1, 20, 24)], IFF_UP),
        ];

        let primary = primary_address(&interfaces).unwrap();
        assert_eq!(primary.ip, Ipv4Addr::new(192, 168, 1, 20));
        assert_eq!(primary.mac, Some(mac));
    }

    #[test]
    fn none_without_routable_interface() {
        let interfaces = vec![ni("lo", None, &[v4(127, 0, 0, 1, 8)], IFF_UP | IFF_LOOPBACK)];
        assert!(primary_address(&interfaces).is_none());
    }
}
