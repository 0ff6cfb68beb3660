// ── Tag domain types ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// The three independent groupings a fixture can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TagCategory {
    Layer,
    Class,
    Position,
}

/// A desired tag taken from a show file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub uuid: String,
    pub name: String,
    pub category: TagCategory,
}

impl Tag {
    pub fn new(category: TagCategory, uuid: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            name: name.into(),
            category,
        }
    }
}

/// A tag that exists on the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteTag {
    pub id: u64,
    pub name: String,
    /// Uptime Kuma does not store tag uuids; kept for servers that might.
    pub uuid: Option<String>,
    pub color: Option<String>,
}

impl RemoteTag {
    /// Same tag as `desired`: equal name, or equal non-empty uuid.
    pub fn matches(&self, desired: &Tag) -> bool {
        self.name == desired.name
            || self
                .uuid
                .as_deref()
                .is_some_and(|uuid| !uuid.is_empty() && uuid == desired.uuid)
    }
}

/// Which tag categories take part in monitor tagging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCategories {
    pub layers: bool,
    pub classes: bool,
    pub positions: bool,
}

impl Default for TagCategories {
    fn default() -> Self {
        Self {
            layers: true,
            classes: true,
            positions: true,
        }
    }
}

impl TagCategories {
    pub fn includes(&self, category: TagCategory) -> bool {
        match category {
            TagCategory::Layer => self.layers,
            TagCategory::Class => self.classes,
            TagCategory::Position => self.positions,
        }
    }
}
