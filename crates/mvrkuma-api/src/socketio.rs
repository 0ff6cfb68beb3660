//! Engine.IO v4 / Socket.IO v5 text framing.
//!
//! Uptime Kuma speaks Socket.IO over a plain WebSocket transport. Only the
//! default namespace and text frames are used, so the codec here is a pure
//! string <-> [`Packet`] translation with no I/O.
//!
//! ```text
//! 0{"sid":..}          engine open
//! 2 / 3                engine ping / pong
//! 40                   socket connect (default namespace)
//! 42<id>["event",..]   event, optional ack id
//! 43<id>[..]           ack for a previously emitted event
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Error;

// ── Engine open payload ──────────────────────────────────────────────

/// Session parameters announced by the server in the engine open packet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenInfo {
    pub sid: String,
    #[serde(default)]
    pub upgrades: Vec<String>,
    pub ping_interval: u64,
    pub ping_timeout: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_payload: Option<u64>,
}

// ── Packet ───────────────────────────────────────────────────────────

/// One decoded text frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Packet {
    Open(OpenInfo),
    Close,
    Ping,
    Pong,
    Noop,
    Connect(Option<Value>),
    Disconnect,
    Event {
        id: Option<u64>,
        name: String,
        args: Vec<Value>,
    },
    Ack {
        id: u64,
        args: Vec<Value>,
    },
    ConnectError(Value),
}

/// Encode a packet into its text frame.
pub fn encode(packet: &Packet) -> String {
    match packet {
        Packet::Open(info) => format!("0{}", serde_json::to_value(info).unwrap_or(Value::Null)),
        Packet::Close => "1".into(),
        Packet::Ping => "2".into(),
        Packet::Pong => "3".into(),
        Packet::Noop => "6".into(),
        Packet::Connect(None) => "40".into(),
        Packet::Connect(Some(payload)) => format!("40{payload}"),
        Packet::Disconnect => "41".into(),
        Packet::Event { id, name, args } => {
            let mut items = Vec::with_capacity(args.len() + 1);
            items.push(Value::String(name.clone()));
            items.extend(args.iter().cloned());
            let id = id.map(|id| id.to_string()).unwrap_or_default();
            format!("42{id}{}", Value::Array(items))
        }
        Packet::Ack { id, args } => format!("43{id}{}", Value::Array(args.clone())),
        Packet::ConnectError(payload) => format!("44{payload}"),
    }
}

/// Decode a text frame.
pub fn decode(frame: &str) -> Result<Packet, Error> {
    let mut chars = frame.chars();
    let kind = chars
        .next()
        .ok_or_else(|| Error::Protocol("empty frame".into()))?;
    let rest = chars.as_str();

    match kind {
        '0' => Ok(Packet::Open(parse_json(rest)?)),
        '1' => Ok(Packet::Close),
        '2' => Ok(Packet::Ping),
        '3' => Ok(Packet::Pong),
        '4' => decode_socket(rest),
        '6' => Ok(Packet::Noop),
        other => Err(Error::Protocol(format!(
            "unknown engine packet type '{other}'"
        ))),
    }
}

fn decode_socket(body: &str) -> Result<Packet, Error> {
    let mut chars = body.chars();
    let kind = chars
        .next()
        .ok_or_else(|| Error::Protocol("empty socket packet".into()))?;
    let rest = strip_namespace(chars.as_str());

    match kind {
        '0' if rest.is_empty() => Ok(Packet::Connect(None)),
        '0' => Ok(Packet::Connect(Some(parse_json(rest)?))),
        '1' => Ok(Packet::Disconnect),
        '2' => {
            let (id, payload) = split_ack_id(rest);
            let mut items: Vec<Value> = parse_json(payload)?;
            if items.is_empty() {
                return Err(Error::Protocol("event without a name".into()));
            }
            let name = match items.remove(0) {
                Value::String(name) => name,
                other => {
                    return Err(Error::Protocol(format!("event name is not a string: {other}")));
                }
            };
            Ok(Packet::Event {
                id,
                name,
                args: items,
            })
        }
        '3' => {
            let (id, payload) = split_ack_id(rest);
            let id = id.ok_or_else(|| Error::Protocol("ack without an id".into()))?;
            Ok(Packet::Ack {
                id,
                args: parse_json(payload)?,
            })
        }
        '4' if rest.is_empty() => Ok(Packet::ConnectError(Value::Null)),
        '4' => Ok(Packet::ConnectError(parse_json(rest)?)),
        other => Err(Error::Protocol(format!(
            "unsupported socket packet type '{other}'"
        ))),
    }
}

/// Drop a leading `/namespace,` prefix. Only the default namespace is used.
fn strip_namespace(s: &str) -> &str {
    if s.starts_with('/') {
        s.split_once(',').map_or("", |(_, rest)| rest)
    } else {
        s
    }
}

fn split_ack_id(s: &str) -> (Option<u64>, &str) {
    let digits = s.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return (None, s);
    }
    let (id, rest) = s.split_at(digits);
    (id.parse().ok(), rest)
}

fn parse_json<T: serde::de::DeserializeOwned>(payload: &str) -> Result<T, Error> {
    serde_json::from_str(payload).map_err(|e| Error::Deserialization {
        message: e.to_string(),
        body: payload.to_owned(),
    })
}

// ── Tests ────────────────────────────────────────────────────────────
