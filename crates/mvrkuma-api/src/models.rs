// Uptime Kuma wire models
//
// Shapes of the JSON objects exchanged over the Socket.IO events. Only the
// fields the reconciler needs are typed; everything else the server sends
// is kept in `extra` so nothing is silently dropped.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Monitor as pushed in the `monitorList` event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorRecord {
    pub id: u64,
    pub name: String,
    /// Free-form description. Holds the originating fixture uuid for
    /// monitors created from a show file.
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "type")]
    pub monitor_type: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub tags: Vec<MonitorTagRecord>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A tag attached to a monitor (`monitor_tag` join row plus tag name).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorTagRecord {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub monitor_id: Option<u64>,
    pub tag_id: u64,
    #[serde(default)]
    pub value: Option<String>,
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

/// Tag as returned by `getTags`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagRecord {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

/// Monitor type understood by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MonitorType {
    Http,
    Ping,
}

/// Payload of the `add` event.
#[derive(Debug, Clone, Serialize)]
pub struct AddMonitorRequest {
    #[serde(rename = "type")]
    pub monitor_type: MonitorType,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    pub description: String,
    pub interval: u32,
    #[serde(rename = "retryInterval")]
    pub retry_interval: u32,
    #[serde(rename = "resendInterval")]
    pub resend_interval: u32,
    #[serde(rename = "maxretries")]
    pub max_retries: u32,
}

impl AddMonitorRequest {
    /// Full monitor object including the defaults the server's `add`
    /// handler expects to be present.
    pub fn to_payload(&self) -> Value {
        let mut payload = json!({
            "notificationIDList": {},
            "accepted_statuscodes": ["200-299"],
            "maxredirects": 10,
            "method": "GET",
            "ignoreTls": false,
            "upsideDown": false,
            "expiryNotification": false,
            "kafkaProducerBrokers": [],
            "kafkaProducerSaslOptions": {},
            "conditions": [],
        });
        if let (Some(base), Ok(Value::Object(fields))) =
            (payload.as_object_mut(), serde_json::to_value(self))
        {
            base.extend(fields);
        }
        payload
    }
}
