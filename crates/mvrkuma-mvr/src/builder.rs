// Fresh scene construction for network discovery exports.

use uuid::Uuid;

use crate::error::Error;
use crate::model::{MvrAddress, MvrNetwork};
use crate::scene::SceneDocument;
use crate::xml::Element;

const VERSION_MAJOR: &str = "1";
const VERSION_MINOR: &str = "6";
const PROVIDER: &str = "mvrkuma";

/// A fixture to place in a built scene.
#[derive(Debug, Clone)]
pub struct NewFixture {
    pub name: String,
    pub ipv4: String,
    pub address: Option<MvrAddress>,
}

/// Builds a single-layer scene description.
#[derive(Debug, Clone)]
pub struct SceneBuilder {
    layer_name: String,
    fixtures: Vec<NewFixture>,
}

impl SceneBuilder {
    pub fn new(layer_name: impl Into<String>) -> Self {
        Self {
            layer_name: layer_name.into(),
            fixtures: Vec::new(),
        }
    }

    pub fn fixture(mut self, fixture: NewFixture) -> Self {
        self.fixtures.push(fixture);
        self
    }

    pub fn fixtures(mut self, fixtures: impl IntoIterator<Item = NewFixture>) -> Self {
        self.fixtures.extend(fixtures);
        self
    }

    pub fn build(self) -> Result<SceneDocument, Error> {
        let mut child_list = Element::new("ChildList");
        for (index, fixture) in self.fixtures.iter().enumerate() {
            child_list = child_list.with_child(fixture_element(fixture, index + 1));
        }

        let layer = Element::new("Layer")
            .with_attribute("name", self.layer_name.as_str())
            .with_attribute("uuid", new_uuid())
            .with_child(child_list);

        let root = Element::new("GeneralSceneDescription")
            .with_attribute("verMajor", VERSION_MAJOR)
            .with_attribute("verMinor", VERSION_MINOR)
            .with_attribute("provider", PROVIDER)
            .with_attribute("providerVersion", env!("CARGO_PKG_VERSION"))
            .with_child(Element::new("UserData"))
            .with_child(
                Element::new("Scene")
                    .with_child(Element::new("AUXData"))
                    .with_child(Element::new("Layers").with_child(layer)),
            );

        SceneDocument::from_root(root)
    }
}

fn fixture_element(fixture: &NewFixture, fixture_id: usize) -> Element {
    let mut addresses = Element::new("Addresses");
    if let Some(address) = fixture.address {
        addresses = addresses.with_child(
            Element::new("Address")
                .with_attribute("break", address.dmx_break.to_string())
                .with_text(address.absolute().to_string()),
        );
    }
    addresses = addresses.with_child(MvrNetwork::with_ipv4(fixture.ipv4.as_str()).to_element());

    Element::new("Fixture")
        .with_attribute("name", fixture.name.as_str())
        .with_attribute("uuid", new_uuid())
        .with_child(Element::new("GDTFSpec"))
        .with_child(Element::new("GDTFMode"))
        .with_child(addresses)
        .with_child(Element::new("FixtureID").with_text(fixture_id.to_string()))
}

fn new_uuid() -> String {
    Uuid::new_v4().to_string().to_uppercase()
}
