// Typed views over scene description elements.

use crate::xml::Element;

/// Channels per DMX universe.
pub const UNIVERSE_SIZE: u32 = 512;

/// A fixture leaf as read from a layer's child list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MvrFixture {
    pub uuid: String,
    pub name: String,
    pub fixture_id: Option<String>,
    /// Uuid of the `AUXData/Class` this fixture belongs to.
    pub classing: Option<String>,
    /// Uuid of the `AUXData/Position` this fixture belongs to.
    pub position: Option<String>,
    pub addresses: Vec<MvrAddress>,
    pub networks: Vec<MvrNetwork>,
}

/// A DMX patch entry, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MvrAddress {
    pub dmx_break: u32,
    pub universe: u32,
    pub address: u32,
}

impl MvrAddress {
    /// Parse `"<universe>.<address>"` or an absolute 1-based channel.
    pub fn parse(dmx_break: u32, text: &str) -> Option<Self> {
        let text = text.trim();
        let (universe, address) = if let Some((universe, address)) = text.split_once('.') {
            (universe.trim().parse().ok()?, address.trim().parse().ok()?)
        } else {
            let absolute: u32 = text.parse().ok()?;
            if absolute == 0 {
                return None;
            }
            (
                (absolute - 1) / UNIVERSE_SIZE + 1,
                (absolute - 1) % UNIVERSE_SIZE + 1,
            )
        };
        Some(Self {
            dmx_break,
            universe,
            address,
        })
    }

    /// Absolute 1-based channel across universes.
    pub fn absolute(&self) -> u32 {
        self.universe.saturating_sub(1) * UNIVERSE_SIZE + self.address
    }
}

/// A `Network` entry of a fixture's `Addresses`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MvrNetwork {
    pub geometry: Option<String>,
    pub ipv4: Option<String>,
    pub subnetmask: Option<String>,
    pub ipv6: Option<String>,
    pub dhcp: Option<String>,
    pub hostname: Option<String>,
}

const NETWORK_ATTRIBUTES: [&str; 6] = ["geometry", "ipv4", "subnetmask", "ipv6", "dhcp", "hostname"];

impl MvrNetwork {
    pub fn with_ipv4(ipv4: impl Into<String>) -> Self {
        Self {
            ipv4: Some(ipv4.into()),
            ..Self::default()
        }
    }

    pub(crate) fn from_element(element: &Element) -> Self {
        let get = |key: &str| {
            element
                .attribute(key)
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_owned)
        };
        Self {
            geometry: get("geometry"),
            ipv4: get("ipv4"),
            subnetmask: get("subnetmask"),
            ipv6: get("ipv6"),
            dhcp: get("dhcp"),
            hostname: get("hostname"),
        }
    }

    /// Overwrite the network attributes of `element`, leaving others alone.
    /// An existing geometry is kept when this network names none.
    pub(crate) fn apply_to(&self, element: &mut Element) {
        let values = [
            &self.geometry,
            &self.ipv4,
            &self.subnetmask,
            &self.ipv6,
            &self.dhcp,
            &self.hostname,
        ];
        for (key, value) in NETWORK_ATTRIBUTES.iter().zip(values) {
            match value {
                Some(v) => element.set_attribute(key, v.as_str()),
                None if *key == "geometry" => {}
                None => element.remove_attribute(key),
            }
        }
    }

    pub(crate) fn to_element(&self) -> Element {
        let mut network = self.clone();
        network
            .geometry
            .get_or_insert_with(|| DEFAULT_NETWORK_GEOMETRY.to_owned());
        let mut element = Element::new("Network");
        network.apply_to(&mut element);
        element
    }
}

/// Geometry name used when a network entry names none.
pub const DEFAULT_NETWORK_GEOMETRY: &str = "NetworkInOut_1";

/// A layer and the fixtures flattened out of its child list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MvrLayer {
    pub uuid: String,
    pub name: String,
    pub fixtures: Vec<MvrFixture>,
}

/// A named `AUXData` entry (`Class` or `Position`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MvrAuxEntry {
    pub uuid: String,
    pub name: String,
}

impl MvrFixture {
    pub(crate) fn from_element(element: &Element) -> Self {
        let mut fixture = Self {
            uuid: element.attribute("uuid").unwrap_or_default().trim().to_owned(),
            name: element.attribute("name").unwrap_or_default().to_owned(),
            fixture_id: element.child_text("FixtureID"),
            classing: element.child_text("Classing"),
            position: element.child_text("Position"),
            ..Self::default()
        };

        if let Some(addresses) = element.child("Addresses") {
            for (_, child) in addresses.elements() {
                match child.name.as_str() {
                    "Address" => {
                        let dmx_break = child
                            .attribute("break")
                            .and_then(|b| b.trim().parse().ok())
                            .unwrap_or(0);
                        match MvrAddress::parse(dmx_break, &child.text()) {
                            Some(address) => fixture.addresses.push(address),
                            None => tracing::debug!(
                                fixture = %fixture.name,
                                value = %child.text(),
                                "ignoring unparsable DMX address"
                            ),
                        }
                    }
                    "Network" => fixture.networks.push(MvrNetwork::from_element(child)),
                    _ => {}
                }
            }
        }
        fixture
    }
}
