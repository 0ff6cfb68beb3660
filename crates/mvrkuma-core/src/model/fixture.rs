// ── Fixture domain types ──

use serde::{Deserialize, Serialize};

use super::tag::Tag;

/// A `Network` entry of a fixture.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Network {
    pub ipv4: Option<String>,
    pub subnetmask: Option<String>,
    pub ipv6: Option<String>,
    pub dhcp: Option<String>,
    pub hostname: Option<String>,
    pub geometry: Option<String>,
}

impl Network {
    pub fn with_ipv4(ipv4: impl Into<String>) -> Self {
        Self {
            ipv4: Some(ipv4.into()),
            ..Self::default()
        }
    }

    /// The ipv4 address if present and non-blank.
    pub fn ipv4(&self) -> Option<&str> {
        self.ipv4.as_deref().filter(|ip| !ip.trim().is_empty())
    }
}

/// DMX patch entry, 1-based universe and address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DmxAddress {
    pub dmx_break: u32,
    pub universe: u32,
    pub address: u32,
}

impl DmxAddress {
    /// Same patch point: equal `(address, universe)`. The break is ignored.
    pub fn same_patch(&self, other: &DmxAddress) -> bool {
        self.address == other.address && self.universe == other.universe
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureAddresses {
    pub networks: Vec<Network>,
    pub addresses: Vec<DmxAddress>,
}

/// A fixture from a show file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fixture {
    /// Stable identity; may be empty.
    pub uuid: String,
    pub name: String,
    pub layer_name: String,
    pub fixture_id: Option<String>,
    /// Uuid of the position tag this fixture belongs to.
    pub position: Option<String>,
    /// Uuid of the class tag this fixture belongs to.
    pub classing: Option<String>,
    pub addresses: FixtureAddresses,
}

impl Fixture {
    /// First network carrying an ipv4 address.
    pub fn ipv4_network(&self) -> Option<&Network> {
        self.addresses.networks.iter().find(|n| n.ipv4().is_some())
    }

    pub fn ipv4(&self) -> Option<&str> {
        self.ipv4_network().and_then(Network::ipv4)
    }

    /// First DMX address entry.
    pub fn dmx_address(&self) -> Option<&DmxAddress> {
        self.addresses.addresses.first()
    }

    pub fn has_uuid(&self) -> bool {
        !self.uuid.trim().is_empty()
    }

    /// Both uuids present and equal.
    pub fn same_identity(&self, other: &Fixture) -> bool {
        self.has_uuid() && self.uuid == other.uuid
    }

    /// Put `network` in place of the first ipv4 network, or append it.
    /// The replaced entry keeps its geometry when `network` names none.
    pub fn set_ipv4_network(&mut self, mut network: Network) {
        match self
            .addresses
            .networks
            .iter_mut()
            .find(|n| n.ipv4().is_some())
        {
            Some(existing) => {
                if network.geometry.is_none() {
                    network.geometry = existing.geometry.take();
                }
                *existing = network;
            }
            None => self.addresses.networks.push(network),
        }
    }
}

/// A layer tag and the fixtures flattened out of that layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerFixtures {
    pub layer: Tag,
    pub fixtures: Vec<Fixture>,
}
