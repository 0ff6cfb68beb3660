// ── Collaborator-to-domain conversions ──
//
// Bridges `mvrkuma_mvr` scene views and `mvrkuma_api` wire records into
// the domain model, and domain requests back into wire requests.

use mvrkuma_api::models::{AddMonitorRequest, MonitorRecord, MonitorType, TagRecord};
use mvrkuma_mvr::{MvrAddress, MvrAuxEntry, MvrFixture, MvrLayer, MvrNetwork};

use crate::model::{
    DmxAddress, Fixture, FixtureAddresses, LayerFixtures, Monitor, MonitorKind, Network,
    NewMonitor, RemoteTag, Tag, TagAttachment, TagCategory,
};

// ── Show file → domain ─────────────────────────────────────────────

impl From<&MvrNetwork> for Network {
    fn from(n: &MvrNetwork) -> Self {
        Self {
            ipv4: n.ipv4.clone(),
            subnetmask: n.subnetmask.clone(),
            ipv6: n.ipv6.clone(),
            dhcp: n.dhcp.clone(),
            hostname: n.hostname.clone(),
            geometry: n.geometry.clone(),
        }
    }
}

impl From<&Network> for MvrNetwork {
    fn from(n: &Network) -> Self {
        Self {
            geometry: n.geometry.clone(),
            ipv4: n.ipv4.clone(),
            subnetmask: n.subnetmask.clone(),
            ipv6: n.ipv6.clone(),
            dhcp: n.dhcp.clone(),
            hostname: n.hostname.clone(),
        }
    }
}

impl From<&MvrAddress> for DmxAddress {
    fn from(a: &MvrAddress) -> Self {
        Self {
            dmx_break: a.dmx_break,
            universe: a.universe,
            address: a.address,
        }
    }
}

impl From<DmxAddress> for MvrAddress {
    fn from(a: DmxAddress) -> Self {
        Self {
            dmx_break: a.dmx_break,
            universe: a.universe,
            address: a.address,
        }
    }
}

/// Convert a parsed fixture, tagging it with the layer it came from.
pub fn fixture_from_mvr(fixture: &MvrFixture, layer_name: &str) -> Fixture {
    Fixture {
        uuid: fixture.uuid.clone(),
        name: fixture.name.clone(),
        layer_name: layer_name.to_owned(),
        fixture_id: fixture.fixture_id.clone(),
        position: fixture.position.clone(),
        classing: fixture.classing.clone(),
        addresses: FixtureAddresses {
            networks: fixture.networks.iter().map(Network::from).collect(),
            addresses: fixture.addresses.iter().map(DmxAddress::from).collect(),
        },
    }
}

impl From<&MvrLayer> for LayerFixtures {
    fn from(layer: &MvrLayer) -> Self {
        Self {
            layer: Tag::new(TagCategory::Layer, layer.uuid.clone(), layer.name.clone()),
            fixtures: layer
                .fixtures
                .iter()
                .map(|f| fixture_from_mvr(f, &layer.name))
                .collect(),
        }
    }
}

pub fn tag_from_aux(category: TagCategory, entry: &MvrAuxEntry) -> Tag {
    Tag::new(category, entry.uuid.clone(), entry.name.clone())
}

// ── Wire → domain ──────────────────────────────────────────────────

impl From<MonitorRecord> for Monitor {
    fn from(record: MonitorRecord) -> Self {
        let attachments: Vec<TagAttachment> = record
            .tags
            .into_iter()
            .map(|t| TagAttachment {
                tag_id: t.tag_id,
                name: t.name,
                value: t.value.unwrap_or_default(),
            })
            .collect();
        Self {
            id: record.id,
            uuid: record.description.unwrap_or_default().trim().to_owned(),
            name: record.name,
            tags: attachments.iter().map(|a| a.name.clone()).collect(),
            attachments,
            target: record
                .url
                .filter(|u| !u.is_empty() && u != "https://")
                .or(record.hostname),
        }
    }
}

impl From<TagRecord> for RemoteTag {
    fn from(record: TagRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            uuid: None,
            color: record.color,
        }
    }
}

// ── Domain → wire ──────────────────────────────────────────────────

impl From<&NewMonitor> for AddMonitorRequest {
    fn from(m: &NewMonitor) -> Self {
        let (monitor_type, url, hostname) = match m.kind {
            MonitorKind::Http => (MonitorType::Http, Some(m.target()), None),
            MonitorKind::Ping => (MonitorType::Ping, None, Some(m.target())),
        };
        Self {
            monitor_type,
            name: m.name.clone(),
            url,
            hostname,
            description: m.description.clone(),
            interval: m.interval,
            retry_interval: m.retry_interval,
            resend_interval: m.resend_interval,
            max_retries: m.max_retries,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn monitor_record_carries_uuid_and_tag_names() {
        let record: MonitorRecord = serde_json::from_value(json!({
            "id": 4,
            "name": "Spot",
            "description": " F-1 ",
            "url": "http://10.0.0.5",
            "tags": [
                {"tag_id": 1, "name": "Stage", "value": ""},
                {"tag_id": 2, "name": "Truss", "value": null}
            ]
        }))
        .unwrap();
        let monitor = Monitor::from(record);
        assert_eq!(monitor.uuid, "F-1");
        assert_eq!(monitor.tags, vec!["Stage", "Truss"]);
        assert_eq!(monitor.attachments[1].value, "");
        assert_eq!(monitor.target.as_deref(), Some("http://10.0.0.5"));
    }

    #[test]
    fn ping_request_uses_hostname() {
        let request = AddMonitorRequest::from(&NewMonitor {
            kind: MonitorKind::Ping,
            name: "Dimmer".into(),
            ipv4: "10.0.0.7".into(),
            description: "F-7".into(),
            interval: 30,
            retry_interval: 30,
            resend_interval: 0,
            max_retries: 2,
        });
        assert_eq!(request.monitor_type, MonitorType::Ping);
        assert_eq!(request.hostname.as_deref(), Some("10.0.0.7"));
        assert!(request.url.is_none());
        assert_eq!(request.max_retries, 2);
    }
}
