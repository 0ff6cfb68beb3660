// ── Desired-state store ──
//
// Fixtures and tags accumulated from imported show files. Owned by the
// caller and passed into the engine by reference; imports append, `clear`
// resets.

use std::path::Path;

use mvrkuma_mvr::SceneDocument;
use serde::Serialize;
use tracing::{debug, info};

use crate::convert::tag_from_aux;
use crate::error::CoreError;
use crate::model::{Fixture, LayerFixtures, Tag, TagCategory};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DesiredState {
    pub layers: Vec<LayerFixtures>,
    pub classes: Vec<Tag>,
    pub positions: Vec<Tag>,
}

/// What one import added.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub layers: usize,
    pub fixtures: usize,
    pub classes: usize,
    pub positions: usize,
}

impl DesiredState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a show file and append its layers and tags.
    ///
    /// The file is parsed completely before anything is appended, so a
    /// parse failure leaves the accumulated state untouched.
    pub fn import(&mut self, path: impl AsRef<Path>) -> Result<ImportSummary, CoreError> {
        let path = path.as_ref();
        let document = SceneDocument::open(path).map_err(|e| CoreError::ParseFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let summary = self.import_document(&document);
        info!(
            path = %path.display(),
            layers = summary.layers,
            fixtures = summary.fixtures,
            "imported show file"
        );
        Ok(summary)
    }

    /// Append the layers and tags of an already parsed scene.
    pub fn import_document(&mut self, document: &SceneDocument) -> ImportSummary {
        let layers: Vec<LayerFixtures> = document.layers().iter().map(LayerFixtures::from).collect();
        let classes: Vec<Tag> = document
            .classes()
            .iter()
            .map(|c| tag_from_aux(TagCategory::Class, c))
            .collect();
        let positions: Vec<Tag> = document
            .positions()
            .iter()
            .map(|p| tag_from_aux(TagCategory::Position, p))
            .collect();

        let summary = ImportSummary {
            layers: layers.len(),
            fixtures: layers.iter().map(|l| l.fixtures.len()).sum(),
            classes: classes.len(),
            positions: positions.len(),
        };

        self.layers.extend(layers);
        self.classes.extend(classes);
        self.positions.extend(positions);
        summary
    }

    pub fn clear(&mut self) {
        self.layers.clear();
        self.classes.clear();
        self.positions.clear();
        debug!("desired state cleared");
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty() && self.classes.is_empty() && self.positions.is_empty()
    }

    /// Every desired tag: classes, then positions, then layers.
    pub fn tags(&self) -> impl Iterator<Item = &Tag> {
        self.classes
            .iter()
            .chain(self.positions.iter())
            .chain(self.layers.iter().map(|l| &l.layer))
    }

    /// Every fixture across all layers.
    pub fn fixtures(&self) -> impl Iterator<Item = &Fixture> {
        self.layers.iter().flat_map(|l| l.fixtures.iter())
    }

    pub fn fixture_count(&self) -> usize {
        self.layers.iter().map(|l| l.fixtures.len()).sum()
    }

    /// Whether any desired fixture carries `uuid`.
    pub fn references_fixture(&self, uuid: &str) -> bool {
        !uuid.trim().is_empty() && self.fixtures().any(|f| f.uuid == uuid)
    }

    /// Whether any desired tag is named `name`.
    pub fn references_tag(&self, name: &str) -> bool {
        self.tags().any(|t| t.name == name)
    }

    /// Desired tags of `category` with the given uuid.
    pub(crate) fn tags_with_uuid<'a>(
        &'a self,
        category: TagCategory,
        uuid: &'a str,
    ) -> impl Iterator<Item = &'a Tag> {
        let pool: &[Tag] = match category {
            TagCategory::Class => &self.classes,
            TagCategory::Position => &self.positions,
            TagCategory::Layer => &[],
        };
        pool.iter().filter(move |t| t.uuid == uuid)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SCENE: &str = r#"<GeneralSceneDescription>
  <Scene>
    <AUXData><Class uuid="C-1" name="Wash"/><Position uuid="P-1" name="Truss"/></AUXData>
    <Layers>
      <Layer name="Stage" uuid="L-1"><ChildList>
        <Fixture name="S1" uuid="F-1"><Classing>C-1</Classing></Fixture>
      </ChildList></Layer>
    </Layers>
  </Scene>
</GeneralSceneDescription>"#;

    #[test]
    fn imports_accumulate_and_clear_resets() {
        let doc = SceneDocument::from_xml_str(SCENE).unwrap();
        let mut state = DesiredState::new();

        let summary = state.import_document(&doc);
        assert_eq!(summary.fixtures, 1);
        state.import_document(&doc);
        assert_eq!(state.layers.len(), 2);
        assert_eq!(state.fixture_count(), 2);
        assert_eq!(state.fixtures().next().unwrap().layer_name, "Stage");

        state.clear();
        assert!(state.is_empty());
    }

    #[test]
    fn tags_are_classes_then_positions_then_layers() {
        let mut state = DesiredState::new();
        state.import_document(&SceneDocument::from_xml_str(SCENE).unwrap());
        let names: Vec<&str> = state.tags().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Wash", "Truss", "Stage"]);
        assert!(state.references_tag("Truss"));
        assert!(state.references_fixture("F-1"));
        assert!(!state.references_fixture(""));
    }

    #[test]
    fn failed_import_leaves_state_untouched() {
        let mut state = DesiredState::new();
        state.import_document(&SceneDocument::from_xml_str(SCENE).unwrap());
        let before = state.clone();

        let err = state.import("/nonexistent/show.mvr").unwrap_err();
        assert!(matches!(err, CoreError::ParseFailed { .. }));
        assert_eq!(state, before);
    }
}
