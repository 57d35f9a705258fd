//! Raw ICMPv4 echo over a pnet transport channel.
//!
//! Opening the channel needs a raw socket, i.e. root or `CAP_NET_RAW`.

use std::net::{IpAddr, Ipv4Addr};
use std::time::{Duration, Instant};

use anyhow::Context;
use pnet::{
    packet::{
        Packet,
        icmp::{
            self, IcmpCode, IcmpPacket, IcmpTypes, echo_reply::EchoReplyPacket,
            echo_request::MutableEchoRequestPacket,
        },
        ip::IpNextHeaderProtocols,
    },
    transport::{
        self,
        TransportChannelType,
        TransportProtocol,
        TransportReceiver,
        TransportSender,
    },
};
use tracing::trace;

const TRANSPORT_BUFFER_SIZE: usize = 4096;
const CHANNEL_TYPE_ICMP: TransportChannelType =
    TransportChannelType::Layer4(TransportProtocol::Ipv4(IpNextHeaderProtocols::Icmp));
const ECHO_HEADER_LEN: usize = 8;
const ECHO_PAYLOAD: &[u8; 32] = b"netroute reachability probe.....";

pub struct IcmpHandle {
    tx: TransportSender,
    rx: TransportReceiver,
}

impl IcmpHandle {
    pub fn open() -> anyhow::Result<Self> {
        let (tx, rx) = transport::transport_channel(TRANSPORT_BUFFER_SIZE, CHANNEL_TYPE_ICMP)
            .context("failed to open ICMP channel")?;
        Ok(Self { tx, rx })
    }

    /// Sends one echo request and blocks until a matching reply arrives or `timeout` elapses.
    ///
    /// Returns the source address of the reply, `None` on timeout.
    pub fn echo(
        &mut self,
        destination: Ipv4Addr,
        identifier: u16,
        sequence: u16,
        timeout: Duration,
    ) -> anyhow::Result<Option<Ipv4Addr>> {
        let request: Vec<u8> = create_echo_request(identifier, sequence)?;
        let packet = IcmpPacket::new(&request).context("truncated echo request")?;
        self.tx
            .send_to(packet, IpAddr::V4(destination))
            .with_context(|| format!("failed to send echo request to {destination}"))?;

        self.await_reply(identifier, sequence, timeout)
    }

    #[cfg(unix)]
    fn await_reply(
        &mut self,
        identifier: u16,
        sequence: u16,
        timeout: Duration,
    ) -> anyhow::Result<Option<Ipv4Addr>> {
        let deadline: Instant = Instant::now() + timeout;
        let mut replies = transport::icmp_packet_iter(&mut self.rx);
        loop {
            let remaining: Duration = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(None);
            }
            match replies.next_with_timeout(remaining)? {
                Some((reply, IpAddr::V4(source)))
                    if is_matching_reply(reply.packet(), identifier, sequence) =>
                {
                    return Ok(Some(source));
                }
                Some((_, source)) => trace!("ignoring unrelated ICMP packet from {source}"),
                None => return Ok(None),
            }
        }
    }

    // pnet only offers a bounded receive on unix.
    #[cfg(not(unix))]
    fn await_reply(
        &mut self,
        _identifier: u16,
        _sequence: u16,
        _timeout: Duration,
    ) -> anyhow::Result<Option<Ipv4Addr>> {
        let _ = &mut self.rx;
        anyhow::bail!("waiting for echo replies is not supported on this platform")
    }
}

pub fn create_echo_request(identifier: u16, sequence: u16) -> anyhow::Result<Vec<u8>> {
    let mut buf = vec![0u8; ECHO_HEADER_LEN + ECHO_PAYLOAD.len()];
    let mut echo =
        MutableEchoRequestPacket::new(&mut buf).context("failed to create echo request packet")?;

    echo.set_icmp_type(IcmpTypes::EchoRequest);
    echo.set_icmp_code(IcmpCode::new(0));
    echo.set_identifier(identifier);
    echo.set_sequence_number(sequence);
    echo.set_payload(ECHO_PAYLOAD);

    echo.set_checksum(0);
    let csm = icmp::checksum(&IcmpPacket::new(echo.packet()).context("failed to create ICMP packet")?);
    echo.set_checksum(csm);
    Ok(buf)
}

/// True for an echo reply carrying our identifier and sequence number.
///
/// Raw ICMP sockets see every ICMP packet the host receives, so anything else is noise.
pub fn is_matching_reply(bytes: &[u8], identifier: u16, sequence: u16) -> bool {
    let Some(reply) = EchoReplyPacket::new(bytes) else {
        return false;
    };
    reply.get_icmp_type() == IcmpTypes::EchoReply
        && reply.get_identifier() == identifier
        && reply.get_sequence_number() == sequence
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
