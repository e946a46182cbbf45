//! ICMP echo probe.
//!
//! Uses an unprivileged datagram ICMP socket when the kernel allows it
//! (`net.ipv4.ping_group_range` on Linux) and falls back to a raw socket
//! otherwise. The socket is driven through tokio so a probe never blocks a
//! runtime worker.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::atomic::{AtomicU16, Ordering};
use std::time::{Duration, Instant};

use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::UdpSocket;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use super::{IcmpStats, ProbeError};

const ICMPV4_ECHO_REQUEST: u8 = 8;
const ICMPV4_ECHO_REPLY: u8 = 0;
const ICMPV6_ECHO_REQUEST: u8 = 128;
const ICMPV6_ECHO_REPLY: u8 = 129;

/// ICMP header size (type, code, checksum, identifier, sequence).
const HEADER_SIZE: usize = 8;
/// Echo payload size.
const PAYLOAD_SIZE: usize = 24;

static NEXT_IDENTIFIER: AtomicU16 = AtomicU16::new(0);

/// Echo run parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IcmpSettings {
    /// Number of echo requests to send.
    pub count: u32,
    /// Delay between two requests.
    pub interval: Duration,
    /// Upper bound for the whole run; unanswered requests count as lost.
    pub timeout: Duration,
}

impl IcmpSettings {
    /// Settings for scheduled webhook cycles.
    pub fn push() -> Self {
        Self {
            count: 4,
            interval: Duration::from_secs(1),
            timeout: Duration::from_secs(10),
        }
    }

    /// Settings for synchronous status queries.
    pub fn query() -> Self {
        Self {
            count: 4,
            interval: Duration::from_millis(100),
            timeout: Duration::from_secs(2),
        }
    }
}

impl Default for IcmpSettings {
    fn default() -> Self {
        Self::push()
    }
}

/// ICMP echo prober.
#[derive(Debug, Clone)]
pub struct IcmpProbe {
    settings: IcmpSettings,
}

impl IcmpProbe {
    pub fn new(settings: IcmpSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &IcmpSettings {
        &self.settings
    }

    /// Send `count` echo requests to `host` and collect the replies.
    ///
    /// Returns once every request has been answered or the run timeout
    /// expires, whichever comes first.
    pub async fn run(&self, host: &str) -> Result<IcmpStats, ProbeError> {
        let ip = resolve(host).await?;
        let (socket, raw) = open_socket(ip)?;
        let dest = SocketAddr::new(ip, 0);
        let v6 = ip.is_ipv6();
        let ident = next_identifier();
        let count = self.settings.count;

        let deadline = tokio::time::sleep(self.settings.timeout);
        tokio::pin!(deadline);

        let mut ticker = tokio::time::interval(self.settings.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut in_flight: HashMap<u16, Instant> = HashMap::with_capacity(count as usize);
        let mut sent = 0u32;
        let mut received = 0u32;
        let mut total_rtt = Duration::ZERO;
        let mut buf = [0u8; 1500];

        while received < count {
            tokio::select! {
                _ = ticker.tick(), if sent < count => {
                    let seq = sent as u16;
                    let packet = echo_request(v6, ident, seq);
                    socket
                        .send_to(&packet, dest)
                        .await
                        .map_err(|source| ProbeError::Send {
                            addr: ip.to_string(),
                            source,
                        })?;
                    in_flight.insert(seq, Instant::now());
                    sent += 1;
                }
                res = socket.recv_from(&mut buf) => {
                    let (n, from) = res.map_err(ProbeError::Receive)?;
                    if from.ip() != ip {
                        continue;
                    }
                    let Some((reply_ident, seq)) = parse_reply(&buf[..n], v6) else {
                        continue;
                    };
                    // Raw sockets see every echo reply on the host
                    if raw && reply_ident != ident {
                        continue;
                    }
                    if let Some(sent_at) = in_flight.remove(&seq) {
                        let rtt = sent_at.elapsed();
                        debug!(host, seq, rtt_us = rtt.as_micros() as u64, "echo reply");
                        received += 1;
                        total_rtt += rtt;
                    }
                }
                _ = &mut deadline => break,
            }
        }

        let avg_rtt = if received > 0 {
            total_rtt / received
        } else {
            Duration::ZERO
        };

        Ok(IcmpStats {
            sent,
            received,
            avg_rtt,
        })
    }
}

/// Resolve a host to a single address, preferring IPv4.
async fn resolve(host: &str) -> Result<IpAddr, ProbeError> {
    if let Ok(ip) = host.parse::<IpAddr>() {
        return Ok(ip);
    }

    let addrs: Vec<SocketAddr> = tokio::net::lookup_host((host, 0))
        .await
        .map_err(|source| ProbeError::Resolve {
            host: host.to_string(),
            source,
        })?
        .collect();

    addrs
        .iter()
        .find(|a| a.is_ipv4())
        .or_else(|| addrs.first())
        .map(|a| a.ip())
        .ok_or_else(|| ProbeError::NoAddress {
            host: host.to_string(),
        })
}

/// Open an ICMP socket for `ip`. The flag is true for raw sockets.
fn open_socket(ip: IpAddr) -> Result<(UdpSocket, bool), ProbeError> {
    let (domain, protocol) = match ip {
        IpAddr::V4(_) => (Domain::IPV4, Protocol::ICMPV4),
        IpAddr::V6(_) => (Domain::IPV6, Protocol::ICMPV6),
    };

    let (socket, raw) = match Socket::new(domain, Type::DGRAM, Some(protocol)) {
        Ok(socket) => (socket, false),
        Err(_) => (
            Socket::new(domain, Type::RAW, Some(protocol)).map_err(ProbeError::Socket)?,
            true,
        ),
    };
    socket.set_nonblocking(true).map_err(ProbeError::Socket)?;

    let socket = UdpSocket::from_std(std::net::UdpSocket::from(socket)).map_err(ProbeError::Socket)?;
    Ok((socket, raw))
}

fn next_identifier() -> u16 {
    (std::process::id() as u16).wrapping_add(NEXT_IDENTIFIER.fetch_add(1, Ordering::Relaxed))
}

/// Build an echo request. The kernel fills in the ICMPv6 checksum.
fn echo_request(v6: bool, ident: u16, seq: u16) -> Vec<u8> {
    let mut packet = vec![0u8; HEADER_SIZE + PAYLOAD_SIZE];
    packet[0] = if v6 {
        ICMPV6_ECHO_REQUEST
    } else {
        ICMPV4_ECHO_REQUEST
    };
    packet[4..6].copy_from_slice(&ident.to_be_bytes());
    packet[6..8].copy_from_slice(&seq.to_be_bytes());
    for (i, byte) in packet[HEADER_SIZE..].iter_mut().enumerate() {
        *byte = i as u8;
    }

    if !v6 {
        let sum = checksum(&packet);
        packet[2..4].copy_from_slice(&sum.to_be_bytes());
    }
    packet
}

/// Extract `(identifier, sequence)` from an echo reply.
///
/// IPv4 replies may carry the IP header in front of the ICMP message (raw
/// sockets everywhere, datagram sockets on macOS). An echo reply starts with
/// type 0, so a leading version nibble of 4 can only be an IP header.
fn parse_reply(buf: &[u8], v6: bool) -> Option<(u16, u16)> {
    let icmp = if !v6 && buf.first()? >> 4 == 4 {
        let ihl = (buf.first()? & 0x0f) as usize * 4;
        buf.get(ihl..)?
    } else {
        buf
    };

    if icmp.len() < HEADER_SIZE {
        return None;
    }

    let expected = if v6 {
        ICMPV6_ECHO_REPLY
    } else {
        ICMPV4_ECHO_REPLY
    };
    if icmp[0] != expected {
        return None;
    }

    Some((
        u16::from_be_bytes([icmp[4], icmp[5]]),
        u16::from_be_bytes([icmp[6], icmp[7]]),
    ))
}

/// RFC 1071 internet checksum.
fn checksum(data: &[u8]) -> u16 {
    let mut sum: u32 = 0;
    let mut chunks = data.chunks_exact(2);
    for chunk in &mut chunks {
        sum += u16::from_be_bytes([chunk[0], chunk[1]]) as u32;
    }
    if let [last] = chunks.remainder() {
        sum += (*last as u32) << 8;
    }
    while sum >> 16 != 0 {
        sum = (sum & 0xffff) + (sum >> 16);
    }
    !(sum as u16)
}
