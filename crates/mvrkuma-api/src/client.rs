// Uptime Kuma Socket.IO client
//
// One WebSocket, one caller. Calls are strictly sequential: emit an event
// with an ack id, then read frames until the matching ack arrives. While
// waiting, engine pings are answered and unsolicited pushes (`monitorList`,
// `info`, heartbeats, ...) are cached by event name so list reads can be
// served from the latest push.

use std::collections::HashMap;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio::time::Instant;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, trace};
use url::Url;

use crate::error::Error;
use crate::models::{AddMonitorRequest, MonitorRecord, TagRecord};
use crate::socketio::{self, Packet};
use crate::transport::TransportConfig;

type SocketStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

const MONITOR_LIST_EVENT: &str = "monitorList";

/// Authenticated-or-not Socket.IO session with an Uptime Kuma server.
pub struct KumaClient {
    socket: SocketStream,
    timeout: Duration,
    next_ack_id: u64,
    pushed: HashMap<String, Vec<Value>>,
    authenticated: bool,
    closed: bool,
}

impl KumaClient {
    /// Open the WebSocket and complete the Engine.IO / Socket.IO handshake.
    pub async fn connect(base_url: &Url, transport: &TransportConfig) -> Result<Self, Error> {
        let socket_url = transport.socket_url(base_url)?;
        info!(url = %socket_url, "connecting to Uptime Kuma");

        let connecting = tokio_tungstenite::connect_async(socket_url.as_str());
        let (socket, _response) = tokio::time::timeout(transport.timeout, connecting)
            .await
            .map_err(|_| Error::Timeout {
                waiting_for: "connect".into(),
                timeout_secs: transport.timeout.as_secs(),
            })?
            .map_err(|e| Error::Connect(e.to_string()))?;

        let mut client = Self {
            socket,
            timeout: transport.timeout,
            next_ack_id: 0,
            pushed: HashMap::new(),
            authenticated: false,
            closed: false,
        };
        client.handshake().await?;
        Ok(client)
    }

    /// Whether [`login`](Self::login) has succeeded on this session.
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    // ── Session ──────────────────────────────────────────────────────

    async fn handshake(&mut self) -> Result<(), Error> {
        let info = self
            .read_until("open", |packet| match packet {
                Packet::Open(info) => Ok(info),
                other => Err(other),
            })
            .await
            .map_err(|e| Error::Handshake(e.to_string()))?;
        debug!(sid = %info.sid, ping_interval = info.ping_interval, "engine session opened");

        self.send(&Packet::Connect(None)).await?;

        let outcome = self
            .read_until("connect", |packet| match packet {
                Packet::Connect(_) => Ok(Ok(())),
                Packet::ConnectError(reason) => Ok(Err(reason)),
                other => Err(other),
            })
            .await
            .map_err(|e| Error::Handshake(e.to_string()))?;

        outcome.map_err(|reason| Error::Handshake(format!("connect refused: {reason}")))?;
        debug!("socket.io namespace connected");
        Ok(())
    }

    /// Authenticate with username and password.
    ///
    /// On success the server starts pushing the monitor list; it is cached
    /// and served by [`get_monitors`](Self::get_monitors).
    pub async fn login(&mut self, username: &str, password: &SecretString) -> Result<(), Error> {
        debug!(username, "logging in");
        let body = self
            .emit(
                "login",
                vec![json!({
                    "username": username,
                    "password": password.expose_secret(),
                    "token": "",
                })],
            )
            .await?;

        if body["tokenRequired"].as_bool() == Some(true) {
            return Err(Error::Authentication {
                message: "two-factor token required".into(),
            });
        }
        if body["ok"].as_bool() != Some(true) {
            return Err(Error::Authentication {
                message: body["msg"]
                    .as_str()
                    .unwrap_or("login rejected")
                    .to_owned(),
            });
        }

        self.authenticated = true;
        debug!("login successful");
        Ok(())
    }

    /// Leave the namespace and close the WebSocket. Best effort.
    pub async fn disconnect(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.authenticated = false;

        if let Err(e) = self.send(&Packet::Disconnect).await {
            debug!(error = %e, "socket.io disconnect packet not sent");
        }
        if let Err(e) = self.socket.close(None).await {
            debug!(error = %e, "websocket close failed");
        }
        debug!("disconnected");
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// Monitors from the most recent `monitorList` push.
    pub async fn get_monitors(&mut self) -> Result<Vec<MonitorRecord>, Error> {
        self.ensure_authenticated()?;
        let payload = self.wait_for_push(MONITOR_LIST_EVENT).await?;
        parse_monitor_list(payload)
    }

    pub async fn get_tags(&mut self) -> Result<Vec<TagRecord>, Error> {
        let body = self.call("getTags", Vec::new()).await?;
        decode(body["tags"].clone())
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Create a monitor, returning the server-assigned id.
    pub async fn add_monitor(&mut self, request: &AddMonitorRequest) -> Result<u64, Error> {
        let body = self.call("add", vec![request.to_payload()]).await?;
        body["monitorID"]
            .as_u64()
            .ok_or_else(|| Error::Deserialization {
                message: "add response carries no monitorID".into(),
                body: body.to_string(),
            })
    }

    pub async fn delete_monitor(&mut self, monitor_id: u64) -> Result<(), Error> {
        self.call("deleteMonitor", vec![json!(monitor_id)]).await?;
        Ok(())
    }

    /// Create a tag, returning the server-assigned id.
    pub async fn add_tag(&mut self, name: &str, color: &str) -> Result<u64, Error> {
        let body = self
            .call(
                "addTag",
                vec![json!({ "name": name, "color": color, "new": true })],
            )
            .await?;
        body["tag"]["id"]
            .as_u64()
            .ok_or_else(|| Error::Deserialization {
                message: "addTag response carries no tag id".into(),
                body: body.to_string(),
            })
    }

    pub async fn delete_tag(&mut self, tag_id: u64) -> Result<(), Error> {
        self.call("deleteTag", vec![json!(tag_id)]).await?;
        Ok(())
    }

    pub async fn add_monitor_tag(
        &mut self,
        monitor_id: u64,
        tag_id: u64,
        value: &str,
    ) -> Result<(), Error> {
        self.call(
            "addMonitorTag",
            vec![json!(tag_id), json!(monitor_id), json!(value)],
        )
        .await?;
        Ok(())
    }

    pub async fn delete_monitor_tag(
        &mut self,
        monitor_id: u64,
        tag_id: u64,
        value: &str,
    ) -> Result<(), Error> {
        self.call(
            "deleteMonitorTag",
            vec![json!(tag_id), json!(monitor_id), json!(value)],
        )
        .await?;
        Ok(())
    }

    // ── Request / ack plumbing ───────────────────────────────────────

    /// Emit an authenticated call and fail on `{ ok: false }`.
    async fn call(&mut self, event: &str, args: Vec<Value>) -> Result<Value, Error> {
        self.ensure_authenticated()?;
        let body = self.emit(event, args).await?;
        if body["ok"].as_bool() == Some(false) {
            return Err(Error::Rejected {
                event: event.to_owned(),
                message: body["msg"].as_str().unwrap_or("no reason given").to_owned(),
            });
        }
        Ok(body)
    }

    /// Emit an event with a fresh ack id and return the first ack argument.
    async fn emit(&mut self, event: &str, args: Vec<Value>) -> Result<Value, Error> {
        let id = self.next_ack_id;
        self.next_ack_id += 1;
        trace!(event, ack_id = id, "emit");

        self.send(&Packet::Event {
            id: Some(id),
            name: event.to_owned(),
            args,
        })
        .await?;

        let response = self
            .read_until(event, |packet| match packet {
                Packet::Ack { id: ack, args } if ack == id => Ok(args),
                other => Err(other),
            })
            .await?;

        Ok(response.into_iter().next().unwrap_or(Value::Null))
    }

    /// Latest payload of a pushed event, waiting for it if none arrived yet.
    async fn wait_for_push(&mut self, event: &str) -> Result<Value, Error> {
        if let Some(args) = self.pushed.get(event) {
            return Ok(args.first().cloned().unwrap_or(Value::Null));
        }

        let args = self
            .read_until(event, |packet| match packet {
                Packet::Event { name, args, .. } if name == event => Ok(args),
                other => Err(other),
            })
            .await?;
        let first = args.first().cloned().unwrap_or(Value::Null);
        self.pushed.insert(event.to_owned(), args);
        Ok(first)
    }

    /// Read packets until `claim` accepts one. Unclaimed pings are answered,
    /// unclaimed events cached, a server disconnect aborts the wait.
    async fn read_until<T>(
        &mut self,
        waiting_for: &str,
        mut claim: impl FnMut(Packet) -> Result<T, Packet>,
    ) -> Result<T, Error> {
        let deadline = Instant::now() + self.timeout;
        loop {
            let packet = self.read_packet(waiting_for, deadline).await?;
            match claim(packet) {
                Ok(claimed) => return Ok(claimed),
                Err(Packet::Ping) => self.send(&Packet::Pong).await?,
                Err(Packet::Event { name, args, .. }) => {
                    trace!(event = %name, "caching pushed event");
                    self.pushed.insert(name, args);
                }
                Err(Packet::Close | Packet::Disconnect) => {
                    self.closed = true;
                    return Err(Error::Closed {
                        reason: format!("server ended the session while waiting for '{waiting_for}'"),
                    });
                }
                Err(other) => trace!(?other, "ignoring frame"),
            }
        }
    }

    async fn read_packet(&mut self, waiting_for: &str, deadline: Instant) -> Result<Packet, Error> {
        loop {
            let frame = tokio::time::timeout_at(deadline, self.socket.next())
                .await
                .map_err(|_| Error::Timeout {
                    waiting_for: waiting_for.to_owned(),
                    timeout_secs: self.timeout.as_secs(),
                })?;

            match frame {
                Some(Ok(Message::Text(text))) => return socketio::decode(text.as_str()),
                Some(Ok(Message::Close(frame))) => {
                    self.closed = true;
                    return Err(Error::Closed {
                        reason: frame.map_or_else(|| "close frame".into(), |f| f.reason.to_string()),
                    });
                }
                Some(Ok(_)) => {
                    // Binary, WebSocket-level ping/pong -- tungstenite answers pings itself
                }
                Some(Err(e)) => return Err(e.into()),
                None => {
                    self.closed = true;
                    return Err(Error::Closed {
                        reason: "stream ended".into(),
                    });
                }
            }
        }
    }

    async fn send(&mut self, packet: &Packet) -> Result<(), Error> {
        self.socket
            .send(Message::text(socketio::encode(packet)))
            .await
            .map_err(Error::from)
    }

    fn ensure_authenticated(&self) -> Result<(), Error> {
        if self.authenticated {
            Ok(())
        } else {
            Err(Error::NotAuthenticated)
        }
    }
}

/// `monitorList` is an object keyed by monitor id; older servers sent an array.
fn parse_monitor_list(payload: Value) -> Result<Vec<MonitorRecord>, Error> {
    let mut monitors: Vec<MonitorRecord> = match payload {
        Value::Object(map) => map
            .into_iter()
            .map(|(_, monitor)| decode(monitor))
            .collect::<Result<_, _>>()?,
        Value::Array(items) => items.into_iter().map(decode).collect::<Result<_, _>>()?,
        Value::Null => Vec::new(),
        other => {
            return Err(Error::Deserialization {
                message: "monitorList is neither an object nor an array".into(),
                body: other.to_string(),
            });
        }
    };
    monitors.sort_by_key(|m| m.id);
    Ok(monitors)
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, Error> {
    let body = value.to_string();
    serde_json::from_value(value).map_err(|e| Error::Deserialization {
        message: e.to_string(),
        body,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn monitor_list_object_is_sorted_by_id() {
        let payload = json!({
            "12": {"id": 12, "name": "b"},
            "3": {"id": 3, "name": "a"},
        });
        let monitors = parse_monitor_list(payload).unwrap();
        assert_eq!(monitors.iter().map(|m| m.id).collect::<Vec<_>>(), vec![3, 12]);
    }

    #[test]
    fn monitor_list_null_is_empty() {
        assert!(parse_monitor_list(Value::Null).unwrap().is_empty());
    }

    #[test]
    fn monitor_list_rejects_scalars() {
        assert!(matches!(
            parse_monitor_list(json!(5)),
            Err(Error::Deserialization { .. })
        ));
    }
}
