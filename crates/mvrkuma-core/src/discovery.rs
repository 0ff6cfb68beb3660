//! Art-Net network discovery.
//!
//! Broadcasts a single ArtPoll on UDP 6454 and collects ArtPollReply
//! packets until the timeout elapses. Each replying node becomes a
//! [`DiscoveredDevice`]; [`discovered_scene`] turns a scan into a minimal
//! MVR that can be imported directly or used as the source of a merge.

use std::collections::HashSet;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::LazyLock;
use std::time::Duration;

use mvrkuma_mvr::{MvrAddress, NewFixture, SceneBuilder, SceneDocument};
use regex::Regex;
use serde::Serialize;
use tokio::net::UdpSocket;
use tokio::time::Instant;
use tracing::{debug, info, trace};

use crate::error::CoreError;

pub const ARTNET_PORT: u16 = 6454;

/// Default output file name for a discovery export.
pub const DEFAULT_DISCOVERY_OUTPUT: &str = "discovered_devices.mvr";

/// Layer holding every discovered device in an export.
pub const DISCOVERY_LAYER: &str = "Network discovery";

pub const DEFAULT_DISCOVERY_TIMEOUT: Duration = Duration::from_millis(1500);

const ARTNET_ID: &[u8; 8] = b"Art-Net\0";
const OP_POLL: u16 = 0x2000;
const OP_POLL_REPLY: u16 = 0x2100;
const PROTOCOL_VERSION: u16 = 14;

const SHORT_NAME: std::ops::Range<usize> = 26..44;
const LONG_NAME: std::ops::Range<usize> = 44..108;

const UNNAMED: &str = "No Name";

static DMX_PATCH: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"DMX:\s*(\d+)\s*Universe:\s*(\d+)").ok());

/// A node that answered the poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoveredDevice {
    pub ip_address: IpAddr,
    pub short_name: String,
    pub long_name: String,
    pub universe: Option<u32>,
    pub address: Option<u32>,
}

// ── Packet codec ────────────────────────────────────────────────────

/// The ArtPoll broadcast: id, opcode (little-endian), protocol version
/// (big-endian), TalkToMe and priority flags.
pub fn art_poll_packet() -> Vec<u8> {
    let mut packet = Vec::with_capacity(14);
    packet.extend_from_slice(ARTNET_ID);
    packet.extend_from_slice(&OP_POLL.to_le_bytes());
    packet.extend_from_slice(&PROTOCOL_VERSION.to_be_bytes());
    packet.push(0);
    packet.push(0);
    packet
}

/// Decode an ArtPollReply received from `sender`. Anything else is `None`.
pub fn parse_poll_reply(data: &[u8], sender: IpAddr) -> Option<DiscoveredDevice> {
    if data.len() < LONG_NAME.end || !data.starts_with(ARTNET_ID) {
        return None;
    }
    let opcode = u16::from_le_bytes([data[8], data[9]]);
    if opcode != OP_POLL_REPLY {
        return None;
    }

    let short_name = match c_string(&data[SHORT_NAME]) {
        name if name.is_empty() => UNNAMED.to_string(),
        name => name,
    };
    let long_name = c_string(&data[LONG_NAME]);
    let (address, universe) = match extract_universe_dmx(&long_name) {
        Some((address, universe)) => (Some(address), Some(universe)),
        None => (None, None),
    };

    Some(DiscoveredDevice {
        ip_address: sender,
        short_name,
        long_name,
        universe,
        address,
    })
}

/// `(address, universe)` from a long name such as `"DMX: 17 Universe: 2"`.
pub fn extract_universe_dmx(long_name: &str) -> Option<(u32, u32)> {
    let captures = DMX_PATCH.as_ref()?.captures(long_name)?;
    let address = captures.get(1)?.as_str().parse().ok()?;
    let universe = captures.get(2)?.as_str().parse().ok()?;
    Some((address, universe))
}

fn c_string(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|b| *b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).trim().to_string()
}

// ── Scanner ─────────────────────────────────────────────────────────

/// One-shot Art-Net poller.
#[derive(Debug, Clone)]
pub struct ArtNetDiscovery {
    bind: Ipv4Addr,
    timeout: Duration,
    target: SocketAddr,
}

impl ArtNetDiscovery {
    pub fn new(bind: Ipv4Addr, timeout: Duration) -> Self {
        Self {
            bind,
            timeout,
            target: SocketAddr::from((Ipv4Addr::BROADCAST, ARTNET_PORT)),
        }
    }

    /// Send the poll somewhere other than the limited broadcast address.
    pub fn with_target(mut self, target: SocketAddr) -> Self {
        self.target = target;
        self
    }

    /// Poll and collect replies until the timeout. One device per ip,
    /// first reply wins.
    pub async fn discover(&self) -> Result<Vec<DiscoveredDevice>, CoreError> {
        let socket = self.open_socket().await?;
        socket
            .send_to(&art_poll_packet(), self.target)
            .await
            .map_err(|e| discovery_error("send ArtPoll", &e))?;
        debug!(target = %self.target, timeout_ms = self.timeout.as_millis(), "sent ArtPoll");

        let deadline = Instant::now() + self.timeout;
        let mut seen = HashSet::new();
        let mut devices = Vec::new();
        let mut buf = [0_u8; 1024];

        loop {
            let received =
                tokio::time::timeout_at(deadline, socket.recv_from(&mut buf)).await;
            let (len, from) = match received {
                Err(_elapsed) => break,
                Ok(Ok(packet)) => packet,
                Ok(Err(e)) => return Err(discovery_error("receive", &e)),
            };
            let Some(device) = parse_poll_reply(&buf[..len], from.ip()) else {
                trace!(%from, len, "ignoring non-reply packet");
                continue;
            };
            if seen.insert(device.ip_address) {
                debug!(ip = %device.ip_address, name = %device.short_name, "discovered device");
                devices.push(device);
            }
        }

        info!(devices = devices.len(), "discovery finished");
        Ok(devices)
    }

    async fn open_socket(&self) -> Result<UdpSocket, CoreError> {
        // Nodes answer on the Art-Net port; fall back to an ephemeral one
        // when another controller already holds it.
        let socket = match UdpSocket::bind(SocketAddr::from((self.bind, ARTNET_PORT))).await {
            Ok(socket) => socket,
            Err(e) => {
                debug!(error = %e, "Art-Net port busy, binding an ephemeral port");
                UdpSocket::bind(SocketAddr::from((self.bind, 0)))
                    .await
                    .map_err(|e| discovery_error(&format!("bind {}", self.bind), &e))?
            }
        };
        socket
            .set_broadcast(true)
            .map_err(|e| discovery_error("enable broadcast", &e))?;
        Ok(socket)
    }
}

impl Default for ArtNetDiscovery {
    fn default() -> Self {
        Self::new(Ipv4Addr::UNSPECIFIED, DEFAULT_DISCOVERY_TIMEOUT)
    }
}

fn discovery_error(step: &str, err: &std::io::Error) -> CoreError {
    CoreError::Discovery {
        message: format!("{step}: {err}"),
    }
}

// ── Export ──────────────────────────────────────────────────────────

/// A single-layer scene with one fixture per device.
pub fn discovered_scene(devices: &[DiscoveredDevice]) -> Result<SceneDocument, CoreError> {
    let fixtures = devices.iter().map(|device| NewFixture {
        name: device.short_name.clone(),
        ipv4: device.ip_address.to_string(),
        address: device.address.map(|address| MvrAddress {
            dmx_break: 0,
            universe: device.universe.filter(|u| *u > 0).unwrap_or(1),
            address: Some(address).filter(|a| *a > 0).unwrap_or(1),
        }),
    });
    Ok(SceneBuilder::new(DISCOVERY_LAYER).fixtures(fixtures).build()?)
}
