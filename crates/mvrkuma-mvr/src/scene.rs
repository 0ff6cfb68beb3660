//! MVR archive and its scene description.
//!
//! [`SceneDocument`] owns the parsed `GeneralSceneDescription.xml` tree plus
//! every other archive member as raw bytes. Reads go through typed views
//! ([`MvrLayer`], [`MvrFixture`], [`MvrAuxEntry`]); the only mutation is
//! [`SceneDocument::set_network`]. [`SceneDocument::write`] serializes the
//! tree and copies the other members through unchanged.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::Error;
use crate::model::{MvrAuxEntry, MvrFixture, MvrLayer, MvrNetwork};
use crate::xml::{self, Element, Node};

/// Archive member holding the scene graph.
pub const SCENE_DESCRIPTION: &str = "GeneralSceneDescription.xml";

/// A non-scene archive member (GDTF files, 3D models, textures).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub name: String,
    pub data: Vec<u8>,
}

/// Child indices from the root element down to a fixture element.
type NodePath = Vec<usize>;

#[derive(Debug, Clone)]
pub struct SceneDocument {
    root: Element,
    resources: Vec<Resource>,
}

impl SceneDocument {
    /// Read an `.mvr` archive.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::io(path, e))?;
        let mut archive = ZipArchive::new(file)?;

        let mut scene_xml: Option<String> = None;
        let mut resources = Vec::new();
        for index in 0..archive.len() {
            let mut entry = archive.by_index(index)?;
            if entry.is_dir() {
                continue;
            }
            let name = entry.name().to_owned();
            let mut data = Vec::new();
            entry
                .read_to_end(&mut data)
                .map_err(|e| Error::io(path, e))?;

            if name == SCENE_DESCRIPTION {
                let text = String::from_utf8(data)
                    .map_err(|e| Error::Xml(format!("{SCENE_DESCRIPTION} is not UTF-8: {e}")))?;
                scene_xml = Some(text);
            } else {
                resources.push(Resource { name, data });
            }
        }

        let scene_xml = scene_xml.ok_or(Error::MissingSceneDescription)?;
        let mut document = Self::from_xml_str(&scene_xml)?;
        document.resources = resources;
        debug!(
            path = %path.display(),
            resources = document.resources.len(),
            "opened MVR archive"
        );
        Ok(document)
    }

    /// Parse a bare scene description (no archive, no resources).
    pub fn from_xml_str(scene_xml: &str) -> Result<Self, Error> {
        let root = xml::parse(scene_xml)?;
        Self::from_root(root)
    }

    pub(crate) fn from_root(root: Element) -> Result<Self, Error> {
        if root.name != "GeneralSceneDescription" {
            return Err(Error::InvalidScene(format!(
                "root element is <{}>, expected <GeneralSceneDescription>",
                root.name
            )));
        }
        Ok(Self {
            root,
            resources: Vec::new(),
        })
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    // ── Views ────────────────────────────────────────────────────────

    /// Layers in document order, each with its flattened fixtures.
    pub fn layers(&self) -> Vec<MvrLayer> {
        self.walk_layers()
            .into_iter()
            .map(|(layer, fixtures)| MvrLayer {
                uuid: layer.attribute("uuid").unwrap_or_default().to_owned(),
                name: layer.attribute("name").unwrap_or_default().to_owned(),
                fixtures: fixtures
                    .into_iter()
                    .map(|(_, element)| MvrFixture::from_element(element))
                    .collect(),
            })
            .collect()
    }

    /// Every fixture across all layers. Indices into this list are the
    /// fixture indices accepted by [`set_network`](Self::set_network).
    pub fn fixtures(&self) -> Vec<MvrFixture> {
        self.layers()
            .into_iter()
            .flat_map(|layer| layer.fixtures)
            .collect()
    }

    /// `AUXData/Class` entries.
    pub fn classes(&self) -> Vec<MvrAuxEntry> {
        self.aux_entries("Class")
    }

    /// `AUXData/Position` entries.
    pub fn positions(&self) -> Vec<MvrAuxEntry> {
        self.aux_entries("Position")
    }

    fn aux_entries(&self, kind: &str) -> Vec<MvrAuxEntry> {
        self.root
            .child("Scene")
            .and_then(|scene| scene.child("AUXData"))
            .map(|aux| {
                aux.children_named(kind)
                    .map(|e| MvrAuxEntry {
                        uuid: e.attribute("uuid").unwrap_or_default().to_owned(),
                        name: e.attribute("name").unwrap_or_default().to_owned(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    // ── Mutation ─────────────────────────────────────────────────────

    /// Put `network` on the fixture at `fixture_index`.
    ///
    /// The fixture's first network carrying an ipv4 address is overwritten;
    /// if there is none a new `Network` element is appended to its
    /// `Addresses` (created when missing).
    pub fn set_network(&mut self, fixture_index: usize, network: &MvrNetwork) -> Result<(), Error> {
        let paths: Vec<NodePath> = self
            .walk_layers()
            .into_iter()
            .flat_map(|(_, fixtures)| fixtures.into_iter().map(|(path, _)| path))
            .collect();
        let count = paths.len();
        let path = paths
            .into_iter()
            .nth(fixture_index)
            .ok_or(Error::FixtureIndexOutOfRange {
                index: fixture_index,
                count,
            })?;

        let fixture = element_at_path_mut(&mut self.root, &path).ok_or_else(|| {
            Error::InvalidScene(format!("fixture {fixture_index} vanished from the tree"))
        })?;

        if fixture.child("Addresses").is_none() {
            fixture.children.push(Node::Element(Element::new("Addresses")));
        }
        let addresses = fixture
            .child_mut("Addresses")
            .ok_or_else(|| Error::InvalidScene("Addresses element missing".into()))?;

        let existing = addresses.children.iter_mut().find_map(|node| match node {
            Node::Element(e)
                if e.name == "Network"
                    && e.attribute("ipv4").is_some_and(|ip| !ip.trim().is_empty()) =>
            {
                Some(e)
            }
            _ => None,
        });

        match existing {
            Some(element) => network.apply_to(element),
            None => addresses.children.push(Node::Element(network.to_element())),
        }
        Ok(())
    }

    // ── Output ───────────────────────────────────────────────────────

    pub fn to_xml_string(&self) -> String {
        xml::to_string(&self.root)
    }

    /// Write the archive: scene description first, then every resource.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| Error::io(path, e))?;
        let mut zip = ZipWriter::new(file);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        zip.start_file(SCENE_DESCRIPTION, options)?;
        zip.write_all(self.to_xml_string().as_bytes())
            .map_err(|e| Error::io(path, e))?;

        for resource in &self.resources {
            zip.start_file(resource.name.as_str(), options)?;
            zip.write_all(&resource.data)
                .map_err(|e| Error::io(path, e))?;
        }

        zip.finish()?;
        debug!(path = %path.display(), "wrote MVR archive");
        Ok(())
    }

    // ── Traversal ────────────────────────────────────────────────────

    /// Layers and their fixture elements with tree paths.
    ///
    /// Per child list: its fixtures in document order, then each group's
    /// subtree in document order. Uses an explicit stack.
    fn walk_layers(&self) -> Vec<(&Element, Vec<(NodePath, &Element)>)> {
        let Some(scene_index) = self.root.child_index("Scene") else {
            return Vec::new();
        };
        let Some(Node::Element(scene)) = self.root.children.get(scene_index) else {
            return Vec::new();
        };
        let Some(layers_index) = scene.child_index("Layers") else {
            return Vec::new();
        };
        let Some(Node::Element(layers)) = scene.children.get(layers_index) else {
            return Vec::new();
        };

        let mut result = Vec::new();
        for (layer_index, layer) in layers.elements().filter(|(_, e)| e.name == "Layer") {
            let base = vec![scene_index, layers_index, layer_index];
            let mut fixtures = Vec::new();

            let mut stack: Vec<(NodePath, &Element)> = Vec::new();
            if let Some(list_index) = layer.child_index("ChildList") {
                if let Some(Node::Element(list)) = layer.children.get(list_index) {
                    stack.push((extend(&base, list_index), list));
                }
            }

            while let Some((list_path, list)) = stack.pop() {
                let mut groups = Vec::new();
                for (index, child) in list.elements() {
                    match child.name.as_str() {
                        "Fixture" => fixtures.push((extend(&list_path, index), child)),
                        "GroupObject" => groups.push((index, child)),
                        _ => {}
                    }
                }
                for (group_index, group) in groups.into_iter().rev() {
                    let group_path = extend(&list_path, group_index);
                    if let Some(nested_index) = group.child_index("ChildList") {
                        if let Some(Node::Element(nested)) = group.children.get(nested_index) {
                            stack.push((extend(&group_path, nested_index), nested));
                        }
                    }
                }
            }
            result.push((layer, fixtures));
        }
        result
    }
}

fn extend(path: &[usize], index: usize) -> NodePath {
    let mut next = path.to_vec();
    next.push(index);
    next
}

fn element_at_path_mut<'a>(root: &'a mut Element, path: &[usize]) -> Option<&'a mut Element> {
    let mut current = root;
    for &index in path {
        current = current.element_at_mut(index)?;
    }
    Some(current)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    pub(crate) const NESTED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<GeneralSceneDescription verMajor="1" verMinor="6">
  <UserData><Data provider="Console" ver="1"><Note>keep</Note></Data></UserData>
  <Scene>
    <AUXData>
      <Class uuid="C-1" name="Wash"/>
      <Position uuid="P-1" name="Truss 1"/>
      <Position uuid="P-2" name="Floor"/>
    </AUXData>
    <Layers>
      <Layer name="Stage" uuid="L-1">
        <ChildList>
          <GroupObject name="Group A" uuid="G-A">
            <ChildList>
              <Fixture name="A1" uuid="F-A1"><Addresses><Address break="0">1.1</Address></Addresses></Fixture>
              <GroupObject name="Inner" uuid="G-I">
                <ChildList>
                  <Fixture name="I1" uuid="F-I1"/>
                </ChildList>
              </GroupObject>
            </ChildList>
          </GroupObject>
          <Fixture name="S1" uuid="F-S1">
            <Classing>C-1</Classing>
            <Position>P-1</Position>
            <Addresses>
              <Address break="0">517</Address>
              <Network geometry="NetworkInOut_1" ipv4="10.0.0.5" subnetmask="255.255.255.0"/>
            </Addresses>
          </Fixture>
          <GroupObject name="Group B" uuid="G-B">
            <ChildList>
              <Fixture name="B1" uuid="F-B1"/>
            </ChildList>
          </GroupObject>
        </ChildList>
      </Layer>
      <Layer name="FOH" uuid="L-2">
        <ChildList>
          <Fixture name="F1" uuid="F-F1"/>
        </ChildList>
      </Layer>
      <Layer name="Empty" uuid="L-3"/>
    </Layers>
  </Scene>
</GeneralSceneDescription>
"#;

    #[test]
    fn flattens_groups_in_deterministic_order() {
        let doc = SceneDocument::from_xml_str(NESTED).unwrap();
        let names: Vec<String> = doc.fixtures().into_iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["S1", "A1", "I1", "B1", "F1"]);

        let layers = doc.layers();
        assert_eq!(layers.len(), 3);
        assert_eq!(layers[0].name, "Stage");
        assert_eq!(layers[1].fixtures.len(), 1);
        assert!(layers[2].fixtures.is_empty());
    }

    #[test]
    fn reads_fixture_fields() {
        let doc = SceneDocument::from_xml_str(NESTED).unwrap();
        let s1 = doc.fixtures().into_iter().next().unwrap();
        assert_eq!(s1.uuid, "F-S1");
        assert_eq!(s1.classing.as_deref(), Some("C-1"));
        assert_eq!(s1.position.as_deref(), Some("P-1"));
        assert_eq!((s1.addresses[0].universe, s1.addresses[0].address), (2, 5));
        assert_eq!(s1.networks[0].ipv4.as_deref(), Some("10.0.0.5"));
        assert_eq!(s1.networks[0].subnetmask.as_deref(), Some("255.255.255.0"));
    }

    #[test]
    fn reads_aux_entries() {
        let doc = SceneDocument::from_xml_str(NESTED).unwrap();
        assert_eq!(doc.classes().len(), 1);
        let positions: Vec<String> = doc.positions().into_iter().map(|p| p.name).collect();
        assert_eq!(positions, vec!["Truss 1", "Floor"]);
    }

    #[test]
    fn set_network_appends_when_fixture_has_none() {
        let mut doc = SceneDocument::from_xml_str(NESTED).unwrap();
        // "I1" has no Addresses element at all
        doc.set_network(2, &MvrNetwork::with_ipv4("10.0.0.9")).unwrap();
        let i1 = &doc.fixtures()[2];
        assert_eq!(i1.name, "I1");
        assert_eq!(i1.networks.len(), 1);
        assert_eq!(i1.networks[0].ipv4.as_deref(), Some("10.0.0.9"));
    }

    #[test]
    fn set_network_replaces_existing_ipv4_entry() {
        let mut doc = SceneDocument::from_xml_str(NESTED).unwrap();
        doc.set_network(0, &MvrNetwork::with_ipv4("192.168.1.20")).unwrap();
        let s1 = &doc.fixtures()[0];
        assert_eq!(s1.networks.len(), 1);
        assert_eq!(s1.networks[0].ipv4.as_deref(), Some("192.168.1.20"));
        assert_eq!(s1.networks[0].subnetmask, None);
    }

    #[test]
    fn set_network_leaves_everything_else_untouched() {
        let mut doc = SceneDocument::from_xml_str(NESTED).unwrap();
        let before = doc.to_xml_string();
        doc.set_network(4, &MvrNetwork::with_ipv4("10.1.1.1")).unwrap();
        let after = doc.to_xml_string();

        let expected = before.replace(
            r#"<Fixture name="F1" uuid="F-F1"/>"#,
            r#"<Fixture name="F1" uuid="F-F1"><Addresses><Network geometry="NetworkInOut_1" ipv4="10.1.1.1"/></Addresses></Fixture>"#,
        );
        assert_eq!(after, expected);
        assert!(after.contains("<Note>keep</Note>"));
    }

    #[test]
    fn set_network_rejects_bad_index() {
        let mut doc = SceneDocument::from_xml_str(NESTED).unwrap();
        let err = doc
            .set_network(99, &MvrNetwork::with_ipv4("10.0.0.1"))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::FixtureIndexOutOfRange { index: 99, count: 5 }
        ));
    }

    #[test]
    fn rejects_foreign_root() {
        assert!(matches!(
            SceneDocument::from_xml_str("<Other/>"),
            Err(Error::InvalidScene(_))
        ));
    }
}
