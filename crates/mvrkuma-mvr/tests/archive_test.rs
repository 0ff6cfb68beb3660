#![allow(clippy::unwrap_used)]
// Archive-level tests: open, patch, write, reopen.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use pretty_assertions::assert_eq;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use mvrkuma_mvr::{Error, MvrNetwork, SceneBuilder, SceneDocument};

// ── Helpers ─────────────────────────────────────────────────────────

const SCENE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<GeneralSceneDescription verMajor="1" verMinor="6">
  <UserData><Data provider="Console"/></UserData>
  <Scene>
    <AUXData/>
    <Layers>
      <Layer name="Truss" uuid="L-1">
        <ChildList>
          <Fixture name="Spot 1" uuid="F-1">
            <GDTFSpec>Spot.gdtf</GDTFSpec>
            <Addresses><Address break="0">1.1</Address></Addresses>
          </Fixture>
        </ChildList>
      </Layer>
    </Layers>
  </Scene>
</GeneralSceneDescription>
"#;

const GDTF_BYTES: &[u8] = b"PK\x03\x04 not really a gdtf but opaque bytes";

fn write_archive(path: &Path, members: &[(&str, &[u8])]) {
    let mut zip = ZipWriter::new(File::create(path).unwrap());
    for (name, data) in members {
        zip.start_file(*name, SimpleFileOptions::default()).unwrap();
        zip.write_all(data).unwrap();
    }
    zip.finish().unwrap();
}

// ── Tests ───────────────────────────────────────────────────────────

#[test]
fn test_patch_and_write_preserves_resources() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("show.mvr");
    let output = dir.path().join("patched.mvr");
    write_archive(
        &input,
        &[
            ("GeneralSceneDescription.xml", SCENE.as_bytes()),
            ("Spot.gdtf", GDTF_BYTES),
        ],
    );

    let mut doc = SceneDocument::open(&input).unwrap();
    doc.set_network(0, &MvrNetwork::with_ipv4("10.0.0.5")).unwrap();
    doc.write(&output).unwrap();

    let reopened = SceneDocument::open(&output).unwrap();
    let fixtures = reopened.fixtures();
    assert_eq!(fixtures.len(), 1);
    assert_eq!(fixtures[0].networks[0].ipv4.as_deref(), Some("10.0.0.5"));
    assert_eq!(fixtures[0].addresses[0].address, 1);

    assert_eq!(reopened.resources().len(), 1);
    assert_eq!(reopened.resources()[0].name, "Spot.gdtf");
    assert_eq!(reopened.resources()[0].data, GDTF_BYTES);
    assert!(reopened.to_xml_string().contains(r#"<Data provider="Console"/>"#));
}

#[test]
fn test_archive_without_scene_description_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("broken.mvr");
    write_archive(&input, &[("Spot.gdtf", GDTF_BYTES)]);

    let err = SceneDocument::open(&input).unwrap_err();
    assert!(matches!(err, Error::MissingSceneDescription), "got: {err:?}");
}

#[test]
fn test_non_zip_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("plain.mvr");
    std::fs::write(&input, SCENE).unwrap();

    let err = SceneDocument::open(&input).unwrap_err();
    assert!(matches!(err, Error::Archive(_)), "got: {err:?}");
}

#[test]
fn test_missing_file_reports_path() {
    let err = SceneDocument::open("/nonexistent/show.mvr").unwrap_err();
    assert!(err.to_string().contains("/nonexistent/show.mvr"));
}

#[test]
fn test_built_scene_survives_archive_round() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("discovered.mvr");

    SceneBuilder::new("Network discovery")
        .fixture(mvrkuma_mvr::NewFixture {
            name: "Node".into(),
            ipv4: "2.0.0.1".into(),
            address: None,
        })
        .build()
        .unwrap()
        .write(&path)
        .unwrap();

    let layers = SceneDocument::open(&path).unwrap().layers();
    assert_eq!(layers[0].fixtures[0].name, "Node");
    assert_eq!(layers[0].fixtures[0].networks[0].ipv4.as_deref(), Some("2.0.0.1"));
}
