//! Raw ICMP echo over a pnet layer-4 transport channel.
//!
//! Opening the channel needs a raw socket, so this path is only usable with
//! root privileges. Every probe owns its own channel and filters the replies
//! it sees by source address and echo identifier.

use std::net::{IpAddr, Ipv4Addr};
use std::sync::atomic::{AtomicU16, Ordering};
use std::time::{Duration, Instant};

use anyhow::Context;
use pnet::packet::Packet;
use pnet::packet::icmp::echo_reply::EchoReplyPacket;
use pnet::packet::icmp::echo_request::MutableEchoRequestPacket;
use pnet::packet::icmp::{self, IcmpPacket, IcmpTypes};
use pnet::packet::ip::IpNextHeaderProtocols;
use pnet::transport::{
    self, TransportChannelType, TransportProtocol, TransportReceiver, TransportSender,
};

const TRANSPORT_BUFFER_SIZE: usize = 4096;
const ECHO_REQUEST_LEN: usize = 16;
const CHANNEL_TYPE_ICMP: TransportChannelType =
    TransportChannelType::Layer4(TransportProtocol::Ipv4(IpNextHeaderProtocols::Icmp));

static SEQUENCE: AtomicU16 = AtomicU16::new(0);

/// Sends one echo request to `target` and waits up to `wait` for the reply.
///
/// Blocking. Returns `Ok(false)` when no matching reply arrives in time and
/// an error only when the channel cannot be opened or written to.
pub fn icmp_echo(target: Ipv4Addr, wait: Duration) -> anyhow::Result<bool> {
    let (mut tx, mut rx) = open_channel()?;
    let identifier: u16 = std::process::id() as u16;
    let sequence: u16 = SEQUENCE.fetch_add(1, Ordering::Relaxed);

    let mut buffer = [0u8; ECHO_REQUEST_LEN];
    let request = create_echo_request(&mut buffer, identifier, sequence)?;
    tx.send_to(request, IpAddr::V4(target))
        .with_context(|| format!("sending echo request to {target}"))?;

    let deadline = Instant::now() + wait;
    let mut replies = transport::icmp_packet_iter(&mut rx);

    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Ok(false);
        }

        match replies.next_with_timeout(remaining)? {
            Some((packet, source)) => {
                if source == IpAddr::V4(target) && is_matching_reply(&packet, identifier, sequence)
                {
                    return Ok(true);
                }
            }
            None => return Ok(false),
        }
    }
}

fn open_channel() -> anyhow::Result<(TransportSender, TransportReceiver)> {
    let (tx, rx) = transport::transport_channel(TRANSPORT_BUFFER_SIZE, CHANNEL_TYPE_ICMP)
        .context("opening raw ICMP channel")?;
    Ok((tx, rx))
}

fn create_echo_request(
    buffer: &mut [u8],
    identifier: u16,
    sequence: u16,
) -> anyhow::Result<MutableEchoRequestPacket<'_>> {
    let mut request =
        MutableEchoRequestPacket::new(buffer).context("buffer too small for echo request")?;
    request.set_icmp_type(IcmpTypes::EchoRequest);
    request.set_identifier(identifier);
    request.set_sequence_number(sequence);

    let checksum: u16 = {
        let view = IcmpPacket::new(request.packet()).context("viewing echo request")?;
        icmp::checksum(&view)
    };
    request.set_checksum(checksum);
    Ok(request)
}

fn is_matching_reply(packet: &IcmpPacket, identifier: u16, sequence: u16) -> bool {
    if packet.get_icmp_type() != IcmpTypes::EchoReply {
        return false;
    }
    match EchoReplyPacket::new(packet.packet()) {
        Some(reply) => {
            reply.get_identifier() == identifier && reply.get_sequence_number() == sequence
        }
        None => false,
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
    use pnet::packet::icmp::echo_reply::MutableEchoReplyPacket;

    #[test]
    fn echo_request_is_well_formed() {
        let mut buffer = [0u8; ECHO_REQUEST_LEN];
        let request = create_echo_request(&mut buffer, 0x1234, 7).unwrap();

        let view = IcmpPacket::new(request.packet()).unwrap();
        assert_eq!(view.get_icmp_type(), IcmpTypes::EchoRequest);
        assert_eq!(view.get_checksum(), icmp::checksum(&view));
        assert_eq!(request.get_identifier(), 0x1234);
        assert_eq!(request.get_sequence_number(), 7);
    }

    #[test]
    fn only_matching_echo_replies_count() {
        let mut buffer = [0u8; ECHO_REQUEST_LEN];
        {
            let mut reply = MutableEchoReplyPacket::new(&mut buffer).unwrap();
            reply.set_icmp_type(IcmpTypes::EchoReply);
            reply.set_identifier(42);
            reply.set_sequence_number(3);
        }
        let packet = IcmpPacket::new(&buffer).unwrap();

        assert!(is_matching_reply(&packet, 42, 3));
        assert!(!is_matching_reply(&packet, 42, 4));
        assert!(!is_matching_reply(&packet, 41, 3));

        let mut request_buffer = [0u8; ECHO_REQUEST_LEN];
        let request = create_echo_request(&mut request_buffer, 42, 3).unwrap();
        let request_view = IcmpPacket::new(request.packet()).unwrap();
        assert!(!is_matching_reply(&request_view, 42, 3));
    }

    #[test]
    #[ignore]
    fn icmp_echo_reaches_loopback_as_root() {
        assert!(icmp_echo(Ipv4Addr::LOCALHOST, Duration::from_secs(1)).unwrap());
    }
}
