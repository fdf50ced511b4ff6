//! # Address Range Expansion
//!
//! Turns a CIDR string such as `192.168.1.0/24` into the ordered sequence of
//! candidate hosts handed to the prober.
//!
//! The network and broadcast addresses are skipped with a fixed heuristic:
//! whenever a block holds more than two addresses its first and last entries
//! are dropped. A `/31` or `/32` is probed as-is.

use std::net::{Ipv4Addr, Ipv6Addr};

use pnet::ipnetwork::{IpNetworkError, Ipv4Network};

use crate::error::ScanError;

/// A continuous range of IPv4 addresses, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ipv4Range {
    pub start_addr: Ipv4Addr,
    pub end_addr: Ipv4Addr,
}

impl Ipv4Range {
    pub fn new(start_addr: Ipv4Addr, end_addr: Ipv4Addr) -> Self {
        Self {
            start_addr,
            end_addr,
        }
    }

    /// Walks the range by successor arithmetic, lowest address first.
    ///
    /// A range whose start lies after its end yields nothing.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = Ipv4Addr> + Clone + Send + 'static {
        let start: u32 = u32::from(self.start_addr);
        let end: u32 = u32::from(self.end_addr);
        (start..=end).map(Ipv4Addr::from)
    }

    pub fn len(&self) -> u64 {
        let start: u64 = u32::from(self.start_addr).into();
        let end: u64 = u32::from(self.end_addr).into();
        (end + 1).saturating_sub(start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Creates the range covering a whole network block (network through broadcast).
pub fn cidr_range(ip: Ipv4Addr, prefix: u8) -> Result<Ipv4Range, IpNetworkError> {
    let network = Ipv4Network::new(ip, prefix)?;
    Ok(Ipv4Range::new(network.network(), network.broadcast()))
}

/// A parsed scan range, remembering the text it was parsed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostRange {
    cidr: String,
    block: Ipv4Range,
}

impl HostRange {
    /// Parses `a.b.c.d/prefix`.
    ///
    /// A host address inside the block is accepted and masked down to the
    /// network address.
    ///
    /// Only IPv4 is swept. An IPv6 block is refused with its own reason
    /// instead of a generic parse failure.
    pub fn parse(cidr: &str) -> Result<Self, ScanError> {
        let invalid = |reason: String| ScanError::InvalidRange {
            range: cidr.to_string(),
            reason,
        };

        let Some((addr_str, prefix_str)) = cidr.split_once('/') else {
            return Err(invalid("missing '/prefix'".to_string()));
        };

        if addr_str.parse::<Ipv6Addr>().is_ok() {
            return Err(invalid("IPv6 ranges are not swept, use an IPv4 CIDR".to_string()));
        }

        let addr = addr_str
            .parse::<Ipv4Addr>()
            .map_err(|e| invalid(format!("invalid address '{addr_str}': {e}")))?;

        if prefix_str.is_empty() || !prefix_str.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid(format!("invalid prefix '{prefix_str}'")));
        }

        let prefix = prefix_str
            .parse::<u8>()
            .map_err(|e| invalid(format!("invalid prefix '{prefix_str}': {e}")))?;

        let block = cidr_range(addr, prefix).map_err(|e| invalid(e.to_string()))?;

        Ok(Self {
            cidr: cidr.to_string(),
            block,
        })
    }

    /// The range exactly as the caller wrote it.
    pub fn cidr(&self) -> &str {
        &self.cidr
    }

    /// The addresses that will actually be probed.
    pub fn candidates(&self) -> Ipv4Range {
        if self.block.len() > 2 {
            let start = Ipv4Addr::from(u32::from(self.block.start_addr) + 1);
            let end = Ipv4Addr::from(u32::from(self.block.end_addr) - 1);
            Ipv4Range::new(start, end)
        } else {
            self.block
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
