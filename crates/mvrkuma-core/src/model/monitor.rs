// ── Monitor domain types ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::tag::RemoteTag;

/// How a fixture is checked.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum MonitorKind {
    /// HTTP GET against `http://<ipv4>`.
    #[default]
    Http,
    /// ICMP ping of `<ipv4>`.
    Ping,
}

/// A tag link on a monitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagAttachment {
    pub tag_id: u64,
    pub name: String,
    pub value: String,
}

/// A monitor on the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Monitor {
    pub id: u64,
    /// Fixture uuid stored in the monitor description; empty if none.
    pub uuid: String,
    pub name: String,
    /// Names of attached tags, in server order.
    pub tags: Vec<String>,
    pub attachments: Vec<TagAttachment>,
    /// URL or hostname being checked.
    pub target: Option<String>,
}

impl Monitor {
    pub fn has_uuid(&self) -> bool {
        !self.uuid.trim().is_empty()
    }
}

/// A monitor to create for a fixture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMonitor {
    pub kind: MonitorKind,
    pub name: String,
    pub ipv4: String,
    /// Fixture uuid, stored as the description.
    pub description: String,
    pub interval: u32,
    pub retry_interval: u32,
    pub resend_interval: u32,
    pub max_retries: u32,
}

impl NewMonitor {
    /// What the server checks: a URL for HTTP, the bare address for ping.
    pub fn target(&self) -> String {
        match self.kind {
            MonitorKind::Http => format!("http://{}", self.ipv4),
            MonitorKind::Ping => self.ipv4.clone(),
        }
    }
}

/// Full snapshot of the server's monitors and tags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActualState {
    pub monitors: Vec<Monitor>,
    pub tags: Vec<RemoteTag>,
}

impl ActualState {
    pub fn monitor_by_uuid(&self, uuid: &str) -> Option<&Monitor> {
        if uuid.trim().is_empty() {
            return None;
        }
        self.monitors.iter().find(|m| m.uuid == uuid)
    }

    pub fn tag_by_name(&self, name: &str) -> Option<&RemoteTag> {
        self.tags.iter().find(|t| t.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_parses_case_insensitively() {
        assert_eq!("PING".parse::<MonitorKind>().ok(), Some(MonitorKind::Ping));
        assert_eq!(MonitorKind::Http.to_string(), "http");
    }

    #[test]
    fn target_depends_on_kind() {
        let mut m = NewMonitor {
            kind: MonitorKind::Http,
            name: "Spot".into(),
            ipv4: "10.0.0.5".into(),
            description: "U".into(),
            interval: 60,
            retry_interval: 60,
            resend_interval: 0,
            max_retries: 0,
        };
        assert_eq!(m.target(), "http://10.0.0.5");
        m.kind = MonitorKind::Ping;
        assert_eq!(m.target(), "10.0.0.5");
    }

    #[test]
    fn blank_uuid_finds_no_monitor() {
        let state = ActualState {
            monitors: vec![Monitor {
                id: 1,
                uuid: String::new(),
                name: "manual".into(),
                tags: vec![],
                attachments: vec![],
                target: None,
            }],
            tags: vec![],
        };
        assert!(state.monitor_by_uuid("").is_none());
    }
}
